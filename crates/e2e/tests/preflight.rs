use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use shopcheck_common::Environments;
use shopcheck_e2e::preflight::{self, Target};
use shopcheck_e2e::E2eError;

/// Storefront that answers 503 for its first `warmup` requests
async fn spawn_store(warmup: usize) -> String {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/",
            get(move || {
                let hits = hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) < warmup {
                        (StatusCode::SERVICE_UNAVAILABLE, "warming up")
                    } else {
                        (StatusCode::OK, "<html>shop</html>")
                    }
                }
            }),
        )
        .route(
            "/api/productsList",
            get(|| async { r#"{"responseCode": 200, "products": []}"# }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn waits_for_a_warming_storefront() {
    let base = spawn_store(3).await;
    let env = Environments::builtin().unwrap().current(Some("qa")).unwrap();
    let mut settings = env.run_settings();
    settings.base_url = base.clone();
    settings.api_base_url = format!("{}/api", base);

    let report = preflight::run(&settings, Duration::from_secs(5)).await.unwrap();

    assert_eq!(report.targets.len(), 2);
    assert_eq!(report.targets[0].name, "storefront");
    assert_eq!(report.targets[0].attempts, 4);
    assert_eq!(report.targets[1].attempts, 1);
    assert_eq!(report.attempts, 5);
}

#[tokio::test]
async fn gives_up_at_the_deadline() {
    let base = spawn_store(usize::MAX).await;

    let err = preflight::check(&[Target::new("storefront", base)], Duration::from_millis(400))
        .await
        .unwrap_err();

    match err {
        E2eError::Unreachable { target, attempts } => {
            assert!(target.starts_with("storefront"));
            assert!(attempts > 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

//! Catalogue endpoints

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shopcheck_common::CatalogProduct;

use super::ApiReply;
use crate::client::{ApiResponse, HttpClient, RequestConfig};
use crate::error::ApiResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserType {
    pub usertype: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCategory {
    #[serde(default)]
    pub usertype: UserType,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiProduct {
    pub id: u32,
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: ApiCategory,
}

impl From<ApiProduct> for CatalogProduct {
    fn from(p: ApiProduct) -> Self {
        let category = match (p.category.usertype.usertype.as_str(), p.category.category.as_str()) {
            ("", c) => c.to_string(),
            (u, "") => u.to_string(),
            (u, c) => format!("{} > {}", u, c),
        };
        CatalogProduct {
            id: Some(p.id),
            name: p.name,
            price: p.price,
            category,
            brand: p.brand,
            availability: String::new(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiBrand {
    pub id: u32,
    pub brand: String,
}

#[derive(Debug, Clone)]
pub struct ProductService {
    client: Arc<HttpClient>,
}

impl ProductService {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub async fn products_list(&self) -> ApiResult<ApiResponse<ApiReply>> {
        self.client.get("/productsList", RequestConfig::new()).await
    }

    pub async fn brands_list(&self) -> ApiResult<ApiResponse<ApiReply>> {
        self.client.get("/brandsList", RequestConfig::new()).await
    }

    pub async fn search_product(&self, term: &str) -> ApiResult<ApiResponse<ApiReply>> {
        let config = RequestConfig::new().multipart([("search_product", term)]);
        self.client.post("/searchProduct", config).await
    }

    /// Product list converted to the shared catalogue model
    pub async fn catalog(&self) -> ApiResult<Vec<CatalogProduct>> {
        let response = self.products_list().await?;
        Ok(response
            .data
            .products
            .unwrap_or_default()
            .into_iter()
            .map(CatalogProduct::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_conversion() {
        let raw = r#"{"id": 1, "name": "Blue Top", "price": "Rs. 500", "brand": "Polo",
            "category": {"usertype": {"usertype": "Women"}, "category": "Tops"}}"#;
        let product: CatalogProduct = serde_json::from_str::<ApiProduct>(raw).unwrap().into();
        assert_eq!(product.id, Some(1));
        assert_eq!(product.category, "Women > Tops");
        assert_eq!(product.amount(), Some(500.0));
    }

    #[test]
    fn test_product_without_category() {
        let product: CatalogProduct = ApiProduct {
            id: 2,
            name: "Sleeveless Dress".into(),
            price: "Rs. 1000".into(),
            ..Default::default()
        }
        .into();
        assert_eq!(product.category, "");
    }
}

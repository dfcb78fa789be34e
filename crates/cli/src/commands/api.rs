//! Account API Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use shopcheck_api::services::ApiBrand;
use shopcheck_api::{ApiReply, ApiResponse};
use shopcheck_common::factory::unique_api_user;
use shopcheck_common::{CatalogProduct, LoginCredentials, User};

use super::Context;
use crate::output::{print_error, print_item, print_list, print_records, print_success, print_value, OutputFormat, TableDisplay};

#[derive(Debug, Subcommand)]
pub enum ApiCommands {
    /// Check a login against the account API
    VerifyLogin {
        /// Defaults to the environment's default user
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Create a throwaway account and print its credentials
    CreateAccount,

    /// Update fields of an existing account
    UpdateAccount {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },

    /// Delete an account
    DeleteAccount {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Show one account
    User {
        email: String,
    },

    /// List accounts
    Users,

    /// List the product catalogue
    Products,

    /// List brands
    Brands,

    /// Search products by name
    Search {
        term: String,
    },
}

#[derive(Serialize)]
struct ReplyRow {
    status: u16,
    response_code: u16,
    message: String,
}

impl From<&ApiResponse<ApiReply>> for ReplyRow {
    fn from(response: &ApiResponse<ApiReply>) -> Self {
        Self {
            status: response.status,
            response_code: response.data.response_code,
            message: response.data.message().to_string(),
        }
    }
}

impl TableDisplay for ReplyRow {
    fn headers() -> Vec<&'static str> {
        vec!["HTTP", "Response Code", "Message"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.status.to_string(), self.response_code.to_string(), self.message.clone()]
    }
}

impl TableDisplay for CatalogProduct {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Price", "Category", "Brand"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.price.clone(),
            self.category.clone(),
            self.brand.clone(),
        ]
    }
}

impl TableDisplay for ApiBrand {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Brand"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.brand.clone()]
    }
}

/// Print the reply and report whether `responseCode` means success
fn report(response: &ApiResponse<ApiReply>, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_value(&response.data, format),
        _ => print_item(&ReplyRow::from(response), format),
    }
    response.data.is_ok()
}

fn update_fields(password: String, name: Option<String>, city: Option<String>, country: Option<String>) -> User {
    User {
        password,
        name: name.unwrap_or_default(),
        city: city.unwrap_or_default(),
        country: country.unwrap_or_default(),
        ..Default::default()
    }
}

pub async fn execute(cmd: ApiCommands, ctx: &Context) -> Result<()> {
    let environment = ctx.environment()?;
    let api = ctx.api(&environment)?;
    let users = api.user_service();
    let products = api.product_service();

    match cmd {
        ApiCommands::VerifyLogin { email, password } => {
            let default = environment.config.default_user.credentials();
            let credentials = LoginCredentials::new(
                email.unwrap_or(default.email),
                password.unwrap_or(default.password),
            );
            let response = users.verify_login(&credentials).await?;
            if report(&response, ctx.format) {
                print_success(&format!("{} can log in", credentials.email));
            } else {
                print_error(&format!("{} cannot log in", credentials.email));
            }
        }

        ApiCommands::CreateAccount => {
            let user = unique_api_user();
            let response = users.create_account(&user).await?;
            if report(&response, ctx.format) {
                print_success(&format!("Created {} / {}", user.email, user.password));
            }
        }

        ApiCommands::UpdateAccount { email, password, name, city, country } => {
            let changes = update_fields(password, name, city, country);
            let response = users.update_account(&email, &changes).await?;
            if report(&response, ctx.format) {
                print_success(&format!("Updated {}", email));
            }
        }

        ApiCommands::DeleteAccount { email, password } => {
            let response = users.delete_account(&email, &password).await?;
            if report(&response, ctx.format) {
                print_success(&format!("Deleted {}", email));
            }
        }

        ApiCommands::User { email } => {
            let response = users.get_user_detail_by_email(&email).await?;
            match &response.data.user {
                Some(user) => print_records(std::slice::from_ref(user), ctx.format),
                None => {
                    report(&response, ctx.format);
                }
            }
        }

        ApiCommands::Users => {
            let response = users.get_all_users().await?;
            match &response.data.users {
                Some(list) => print_records(list, ctx.format),
                None => {
                    report(&response, ctx.format);
                }
            }
        }

        ApiCommands::Products => {
            print_list(&products.catalog().await?, ctx.format);
        }

        ApiCommands::Brands => {
            let response = products.brands_list().await?;
            print_list(&response.data.brands.unwrap_or_default(), ctx.format);
        }

        ApiCommands::Search { term } => {
            let response = products.search_product(&term).await?;
            let found: Vec<CatalogProduct> = response
                .data
                .products
                .unwrap_or_default()
                .into_iter()
                .map(CatalogProduct::from)
                .collect();
            print_list(&found, ctx.format);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_fields_leave_the_rest_empty() {
        let user = update_fields("pw".into(), Some("New Name".into()), None, Some("Canada".into()));
        assert_eq!(user.password, "pw");
        assert_eq!(user.name, "New Name");
        assert_eq!(user.country, "Canada");
        assert!(user.city.is_empty());
        assert!(user.email.is_empty());
    }

    #[test]
    fn test_reply_row() {
        let response = ApiResponse {
            data: ApiReply {
                response_code: 404,
                message: Some("User not found!".into()),
                ..Default::default()
            },
            status: 200,
            success: true,
            message: String::new(),
        };
        let row = ReplyRow::from(&response);
        assert_eq!(row.row(), vec!["200", "404", "User not found!"]);
        assert!(!report(&response, OutputFormat::Plain));
    }
}

//! Test Data Commands

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use shopcheck_common::factory::{
    ApiUserFactory, CartFactory, Factory, FactoryOptions, LoginCredentialsFactory, PaymentFactory,
    PaymentPreset, ProductFactory, UserFactory, UserPreset, UserProfileFactory,
    UserRegistrationFactory,
};

use super::Context;
use crate::output::print_records;

#[derive(Debug, Clone, Args)]
pub struct DataOpts {
    /// How many records to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Seed for reproducible output
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl DataOpts {
    fn options(&self) -> FactoryOptions {
        self.seed.map(FactoryOptions::seeded).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum UserVariant {
    #[default]
    Default,
    Test,
    Admin,
    InvalidEmail,
    WeakPassword,
    EmptyFields,
    SpecialCharacters,
    /// Unique account for the account API
    Api,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RegistrationVariant {
    #[default]
    Valid,
    MismatchedPasswords,
    /// Reuses the environment's default account email
    ExistingEmail,
    Minimal,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ProductVariant {
    #[default]
    Default,
    InStock,
    OutOfStock,
    HighRated,
    LowRated,
    Expensive,
    Cheap,
    Clothing,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum CartVariant {
    #[default]
    Default,
    Empty,
    SingleItem,
    Large,
}

#[derive(Debug, Subcommand)]
pub enum DataCommands {
    /// Storefront accounts
    User {
        #[command(flatten)]
        opts: DataOpts,
        #[arg(long, value_enum, default_value_t)]
        variant: UserVariant,
    },

    /// Login credentials
    Credentials {
        #[command(flatten)]
        opts: DataOpts,
        /// valid-user, invalid-email-and-password, invalid-email, invalid-password,
        /// empty-credentials or random
        #[arg(short, long)]
        preset: Option<String>,
    },

    /// Signup form data
    Registration {
        #[command(flatten)]
        opts: DataOpts,
        #[arg(long, value_enum, default_value_t)]
        variant: RegistrationVariant,
    },

    /// Account profiles
    Profile {
        #[command(flatten)]
        opts: DataOpts,
        #[arg(long)]
        inactive: bool,
    },

    /// Products
    Product {
        #[command(flatten)]
        opts: DataOpts,
        #[arg(long, value_enum, default_value_t)]
        variant: ProductVariant,
    },

    /// Shopping carts
    Cart {
        #[command(flatten)]
        opts: DataOpts,
        #[arg(long, value_enum, default_value_t)]
        variant: CartVariant,
    },

    /// Payment cards
    Payment {
        #[command(flatten)]
        opts: DataOpts,
        /// valid, invalid or expired
        #[arg(short, long)]
        preset: Option<String>,
    },
}

fn repeat<T>(count: usize, mut make: impl FnMut() -> T) -> Vec<T> {
    (0..count).map(|_| make()).collect()
}

fn users(opts: &DataOpts, variant: UserVariant) -> Vec<shopcheck_common::User> {
    if let UserVariant::Api = variant {
        let mut factory = ApiUserFactory::new();
        return repeat(opts.count, || factory.create_default());
    }
    let mut factory = UserFactory::with_options(opts.options());
    repeat(opts.count, || match variant {
        UserVariant::Default | UserVariant::Api => factory.create_default(),
        UserVariant::Test => factory.test_user(),
        UserVariant::Admin => factory.admin_user(),
        UserVariant::InvalidEmail => factory.with_invalid_email(),
        UserVariant::WeakPassword => factory.with_weak_password(),
        UserVariant::EmptyFields => factory.with_empty_fields(),
        UserVariant::SpecialCharacters => factory.with_special_characters(),
    })
}

fn seeded<F>(seed: Option<u64>, seeded: impl Fn(u64) -> F, unseeded: impl Fn() -> F) -> F {
    match seed {
        Some(seed) => seeded(seed),
        None => unseeded(),
    }
}

fn emit<T: Serialize>(items: &[T], ctx: &Context) {
    print_records(items, ctx.format);
}

pub async fn execute(cmd: DataCommands, ctx: &Context) -> Result<()> {
    match cmd {
        DataCommands::User { opts, variant } => emit(&users(&opts, variant), ctx),

        DataCommands::Credentials { opts, preset } => match preset {
            Some(preset) => {
                let preset: UserPreset = preset.parse()?;
                let mut factory = UserFactory::with_options(opts.options());
                let credentials = if let UserPreset::Random = preset {
                    repeat(opts.count, || factory.preset(preset))
                } else {
                    let valid = ctx.environment()?.config.default_user.credentials();
                    repeat(opts.count, || preset.credentials_for(&valid))
                };
                emit(&credentials, ctx);
            }
            None => {
                let mut factory = seeded(opts.seed, LoginCredentialsFactory::seeded, LoginCredentialsFactory::new);
                emit(&repeat(opts.count, || factory.valid()), ctx);
            }
        },

        DataCommands::Registration { opts, variant } => {
            let mut factory = seeded(opts.seed, UserRegistrationFactory::seeded, UserRegistrationFactory::new);
            let existing = match variant {
                RegistrationVariant::ExistingEmail => Some(ctx.environment()?.config.default_user.email),
                _ => None,
            };
            let registrations = repeat(opts.count, || match (&existing, variant) {
                (Some(email), _) => factory.with_existing_email(email),
                (None, RegistrationVariant::MismatchedPasswords) => factory.with_mismatched_passwords(),
                (None, RegistrationVariant::Minimal) => factory.minimal(),
                (None, _) => factory.valid(),
            });
            emit(&registrations, ctx);
        }

        DataCommands::Profile { opts, inactive } => {
            let mut factory = seeded(opts.seed, UserProfileFactory::seeded, UserProfileFactory::new);
            let profiles = repeat(opts.count, || {
                if inactive {
                    factory.inactive()
                } else {
                    factory.active()
                }
            });
            emit(&profiles, ctx);
        }

        DataCommands::Product { opts, variant } => {
            let mut factory = ProductFactory::with_options(opts.options());
            let products = repeat(opts.count, || match variant {
                ProductVariant::Default => factory.create_default(),
                ProductVariant::InStock => factory.in_stock(),
                ProductVariant::OutOfStock => factory.out_of_stock(),
                ProductVariant::HighRated => factory.high_rated(),
                ProductVariant::LowRated => factory.low_rated(),
                ProductVariant::Expensive => factory.expensive(),
                ProductVariant::Cheap => factory.cheap(),
                ProductVariant::Clothing => factory.clothing(),
            });
            emit(&products, ctx);
        }

        DataCommands::Cart { opts, variant } => {
            let mut factory = CartFactory::with_options(opts.options());
            let carts = repeat(opts.count, || match variant {
                CartVariant::Default => factory.create_default(),
                CartVariant::Empty => factory.empty(),
                CartVariant::SingleItem => factory.single_item(),
                CartVariant::Large => factory.large(),
            });
            emit(&carts, ctx);
        }

        DataCommands::Payment { opts, preset } => {
            let mut factory = PaymentFactory::with_options(opts.options());
            let cards = match preset {
                Some(preset) => {
                    let preset: PaymentPreset = preset.parse()?;
                    repeat(opts.count, || factory.preset(preset))
                }
                None => repeat(opts.count, || factory.valid()),
            };
            emit(&cards, ctx);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn opts(count: usize, seed: Option<u64>) -> DataOpts {
        DataOpts { count, seed }
    }

    #[test]
    fn test_seeded_users_are_reproducible() {
        let first = users(&opts(3, Some(42)), UserVariant::Default);
        let second = users(&opts(3, Some(42)), UserVariant::Default);
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test_case(UserVariant::InvalidEmail ; "invalid email")]
    #[test_case(UserVariant::EmptyFields ; "empty fields")]
    fn test_negative_user_variants(variant: UserVariant) {
        let user = users(&opts(1, Some(1)), variant).remove(0);
        assert!(!user.email.contains('@') || user.email.is_empty());
    }

    #[test]
    fn test_api_users_are_unique() {
        let users = users(&opts(2, None), UserVariant::Api);
        assert_ne!(users[0].email, users[1].email);
    }

    #[test]
    fn test_repeat_calls_the_generator_each_time() {
        let mut n = 0;
        let values = repeat(3, || {
            n += 1;
            n
        });
        assert_eq!(values, vec![1, 2, 3]);
    }
}

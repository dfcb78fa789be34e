//! Synthetic test data
//!
//! Every factory produces a complete default value and lets callers patch
//! it with closures, one at a time or through a [`FactoryBuilder`].
//!
//! ```
//! use shopcheck_common::factory::{Factory, UserFactory};
//!
//! let mut users = UserFactory::seeded(7);
//! let user = users
//!     .builder()
//!     .with(|u| u.country = "Canada".into())
//!     .build();
//! assert_eq!(user.country, "Canada");
//! ```

mod faker;
pub mod fixtures;
pub mod payment;
pub mod product;
pub mod user;

pub use faker::{unique_suffix, FactoryOptions, Faker};
pub use payment::{PaymentFactory, PaymentPreset};
pub use product::{
    CartFactory, CartItemFactory, CatalogFactory, ProductCategoryFactory, ProductFactory,
    ProductFiltersFactory, ProductReviewFactory, ProductSearchParamsFactory,
};
pub use user::{
    unique_api_user, ApiUserFactory, LoginCredentialsFactory, UserFactory, UserPreset, UserProfileFactory,
    UserRegistrationFactory,
};

/// An override applied to a freshly generated value
pub type Override<T> = Box<dyn Fn(&mut T)>;

pub trait Factory {
    type Output;

    /// A complete, valid value with nothing overridden
    fn create_default(&mut self) -> Self::Output;

    fn create<F>(&mut self, overrides: F) -> Self::Output
    where
        F: FnOnce(&mut Self::Output),
    {
        let mut value = self.create_default();
        overrides(&mut value);
        value
    }

    fn create_many<F>(&mut self, count: usize, overrides: F) -> Vec<Self::Output>
    where
        F: Fn(&mut Self::Output),
    {
        (0..count).map(|_| self.create(&overrides)).collect()
    }

    /// One value per variation
    fn create_with_variations(&mut self, variations: &[Override<Self::Output>]) -> Vec<Self::Output> {
        variations
            .iter()
            .map(|variation| self.create(|value| variation(value)))
            .collect()
    }

    fn builder(&mut self) -> FactoryBuilder<'_, Self>
    where
        Self: Sized,
    {
        FactoryBuilder::new(self)
    }
}

/// Accumulates overrides and applies them, in order, on build
pub struct FactoryBuilder<'a, F: Factory> {
    factory: &'a mut F,
    overrides: Vec<Override<F::Output>>,
}

impl<'a, F: Factory> FactoryBuilder<'a, F> {
    pub fn new(factory: &'a mut F) -> Self {
        Self {
            factory,
            overrides: Vec::new(),
        }
    }

    pub fn with(mut self, patch: impl Fn(&mut F::Output) + 'static) -> Self {
        self.overrides.push(Box::new(patch));
        self
    }

    pub fn build(self) -> F::Output {
        let overrides = self.overrides;
        self.factory.create(|value| apply(&overrides, value))
    }

    pub fn build_many(self, count: usize) -> Vec<F::Output> {
        let overrides = self.overrides;
        self.factory
            .create_many(count, |value| apply(&overrides, value))
    }
}

fn apply<T>(overrides: &[Override<T>], value: &mut T) {
    for patch in overrides {
        patch(value);
    }
}

//! Product, catalogue and cart factories

use super::faker::{FactoryOptions, Faker};
use super::Factory;
use crate::types::{
    format_amount, parse_amount, Availability, Cart, CartItem, CatalogCartLine, CatalogPriceRange,
    CatalogProduct, PriceRange, Product, ProductCategory, ProductFilters, ProductReview,
    ProductSearchParams, SearchTerms, SortBy, SortOrder,
};

const POSITIVE_COMMENTS: &[&str] = &[
    "Great product! Highly recommended.",
    "Excellent quality and fast shipping.",
    "Perfect fit and beautiful design.",
    "Amazing value for money.",
    "Love it! Will buy again.",
];

const NEGATIVE_COMMENTS: &[&str] = &[
    "Poor quality, not as described.",
    "Disappointed with the purchase.",
    "Cheap material and bad fit.",
    "Would not recommend this product.",
    "Waste of money.",
];

const CLOTHING_NAMES: &[&str] = &[
    "Cotton T-Shirt",
    "Denim Jeans",
    "Summer Dress",
    "Leather Jacket",
    "Running Shoes",
];

/// Categories as the storefront's sidebar lists them
pub const STORE_CATEGORIES: &[&str] = &[
    "Women > Dress",
    "Women > Tops",
    "Women > Saree",
    "Men > Tshirts",
    "Men > Jeans",
    "Kids > Dress",
    "Kids > Tops & Shirts",
];

pub const STORE_BRANDS: &[&str] = &[
    "Polo",
    "H&M",
    "Madame",
    "Mast & Harbour",
    "Babyhug",
    "Allen Solly Junior",
];

#[derive(Debug, Clone, Default)]
pub struct ProductCategoryFactory {
    faker: Faker,
}

impl ProductCategoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            faker: Faker::new(options),
        }
    }

    pub fn with_subcategories(&mut self, count: usize) -> ProductCategory {
        let mut category = self.create_default();
        category.subcategories = (0..count)
            .map(|_| ProductCategory {
                id: self.faker.int(101, 200),
                name: self.faker.product_name(),
                parent_id: Some(category.id),
                subcategories: Vec::new(),
            })
            .collect();
        category
    }

    pub fn clothing(&mut self) -> ProductCategory {
        self.create(|c| {
            c.name = "Clothing".to_string();
            c.subcategories = ["Men", "Women", "Kids"]
                .iter()
                .zip(1..)
                .map(|(name, id)| ProductCategory {
                    id,
                    name: name.to_string(),
                    parent_id: None,
                    subcategories: Vec::new(),
                })
                .collect();
        })
    }
}

impl Factory for ProductCategoryFactory {
    type Output = ProductCategory;

    fn create_default(&mut self) -> ProductCategory {
        ProductCategory {
            id: self.faker.int(1, 100),
            name: self.faker.department(),
            parent_id: None,
            subcategories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductReviewFactory {
    faker: Faker,
}

impl ProductReviewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            faker: Faker::new(options),
        }
    }

    pub fn positive(&mut self) -> ProductReview {
        let rating = self.faker.int(4, 5) as u8;
        let comment = self.faker.pick(POSITIVE_COMMENTS).to_string();
        self.create(move |r| {
            r.rating = rating;
            r.comment = comment;
        })
    }

    pub fn negative(&mut self) -> ProductReview {
        let rating = self.faker.int(1, 2) as u8;
        let comment = self.faker.pick(NEGATIVE_COMMENTS).to_string();
        self.create(move |r| {
            r.rating = rating;
            r.comment = comment;
        })
    }
}

impl Factory for ProductReviewFactory {
    type Output = ProductReview;

    fn create_default(&mut self) -> ProductReview {
        let f = &mut self.faker;
        let sentences = f.int(1, 3);
        ProductReview {
            id: f.int(1, 10_000),
            user_id: f.int(1, 1000),
            rating: f.int(1, 5) as u8,
            comment: f.sentences(sentences),
            created_at: f.past(1),
            verified: f.boolean(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFactory {
    faker: Faker,
    categories: ProductCategoryFactory,
    reviews: ProductReviewFactory,
}

impl ProductFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        let mut faker = Faker::new(options);
        Self {
            categories: ProductCategoryFactory {
                faker: faker.fork(),
            },
            reviews: ProductReviewFactory {
                faker: faker.fork(),
            },
            faker,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_options(FactoryOptions::seeded(seed))
    }

    pub fn in_stock(&mut self) -> Product {
        self.create(|p| p.availability = Availability::InStock)
    }

    pub fn out_of_stock(&mut self) -> Product {
        self.create(|p| p.availability = Availability::OutOfStock)
    }

    pub fn high_rated(&mut self) -> Product {
        let reviews = self.reviews.create_many(5, |r| r.rating = 5);
        self.create(move |p| {
            p.rating = 5.0;
            p.reviews = reviews;
            p.availability = Availability::InStock;
        })
    }

    pub fn low_rated(&mut self) -> Product {
        let reviews = self.reviews.create_many(3, |r| r.rating = 1);
        self.create(move |p| {
            p.rating = 1.0;
            p.reviews = reviews;
        })
    }

    pub fn expensive(&mut self) -> Product {
        let price = self.faker.float(500.0, 2000.0);
        self.create(move |p| p.price = price)
    }

    pub fn cheap(&mut self) -> Product {
        let price = self.faker.float(1.0, 50.0);
        self.create(move |p| p.price = price)
    }

    pub fn clothing(&mut self) -> Product {
        let category = self.categories.clothing();
        let name = self.faker.pick(CLOTHING_NAMES).to_string();
        self.create(move |p| {
            p.category = category;
            p.name = name;
        })
    }
}

impl Factory for ProductFactory {
    type Output = Product;

    fn create_default(&mut self) -> Product {
        let category = self.categories.create_default();
        let review_count = self.faker.int(0, 10) as usize;
        let reviews = self.reviews.create_many(review_count, |_| {});
        let f = &mut self.faker;
        let image_count = f.int(1, 5);

        Product {
            id: f.int(1, 1000),
            name: f.product_name(),
            price: f.float(10.0, 500.0),
            brand: f.company(),
            category,
            description: f.product_description(),
            images: (0..image_count).map(|_| f.image_url(400, 400)).collect(),
            availability: f.pick(&[Availability::InStock, Availability::OutOfStock]),
            rating: Product::average_rating(&reviews),
            reviews,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartItemFactory {
    faker: Faker,
    products: ProductFactory,
}

impl CartItemFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        let mut faker = Faker::new(options);
        let products = ProductFactory::with_options(FactoryOptions::seeded(faker.int(0, u32::MAX).into()));
        Self { faker, products }
    }

    pub fn single_quantity(&mut self) -> CartItem {
        CartItem::new(self.products.in_stock(), 1)
    }

    pub fn multiple_quantity(&mut self) -> CartItem {
        let quantity = self.faker.int(2, 10);
        CartItem::new(self.products.in_stock(), quantity)
    }
}

impl Factory for CartItemFactory {
    type Output = CartItem;

    fn create_default(&mut self) -> CartItem {
        let quantity = self.faker.int(1, 5);
        CartItem::new(self.products.in_stock(), quantity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartFactory {
    faker: Faker,
    items: CartItemFactory,
}

impl CartFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        let mut faker = Faker::new(options);
        let items = CartItemFactory::with_options(FactoryOptions::seeded(faker.int(0, u32::MAX).into()));
        Self { faker, items }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_options(FactoryOptions::seeded(seed))
    }

    pub fn empty(&self) -> Cart {
        Cart::empty()
    }

    pub fn single_item(&mut self) -> Cart {
        Cart::from_items(vec![self.items.create_default()])
    }

    /// 10 to 20 lines; large orders always ship free
    pub fn large(&mut self) -> Cart {
        let count = self.faker.int(10, 20) as usize;
        Cart::with_free_shipping(self.items.create_many(count, |_| {}))
    }
}

impl Factory for CartFactory {
    type Output = Cart;

    fn create_default(&mut self) -> Cart {
        let count = self.faker.int(1, 5) as usize;
        Cart::from_items(self.items.create_many(count, |_| {}))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFiltersFactory {
    faker: Faker,
}

impl ProductFiltersFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_range(&mut self, min: f64, max: f64) -> ProductFilters {
        self.create(move |f| f.price_range = Some(PriceRange { min, max }))
    }

    pub fn category(&mut self, category: &str) -> ProductFilters {
        let category = category.to_string();
        self.create(move |f| f.category = Some(category))
    }

    pub fn in_stock(&mut self) -> ProductFilters {
        self.create(|f| f.availability = Some(Availability::InStock))
    }
}

impl Factory for ProductFiltersFactory {
    type Output = ProductFilters;

    fn create_default(&mut self) -> ProductFilters {
        let f = &mut self.faker;
        ProductFilters {
            category: Some(f.department()),
            brand: Some(f.company()),
            price_range: Some(PriceRange {
                min: f64::from(f.int(0, 100)),
                max: f64::from(f.int(101, 1000)),
            }),
            availability: Some(f.pick(&[Availability::InStock, Availability::OutOfStock])),
            rating: Some(f.int(1, 5) as u8),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductSearchParamsFactory {
    filters: ProductFiltersFactory,
}

impl ProductSearchParamsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic(&mut self, query: &str) -> ProductSearchParams {
        let query = query.to_string();
        self.create(move |p| {
            p.query = Some(query);
            p.page = 1;
            p.limit = 20;
        })
    }

    pub fn sorted(&mut self, sort_by: SortBy, sort_order: SortOrder) -> ProductSearchParams {
        self.create(move |p| {
            p.sort_by = Some(sort_by);
            p.sort_order = Some(sort_order);
        })
    }
}

impl Factory for ProductSearchParamsFactory {
    type Output = ProductSearchParams;

    fn create_default(&mut self) -> ProductSearchParams {
        let filters = self.filters.create_default();
        let f = &mut self.filters.faker;
        ProductSearchParams {
            filters,
            query: Some(f.product_name()),
            sort_by: Some(f.pick(&[SortBy::Name, SortBy::Price, SortBy::Rating, SortBy::Newest])),
            sort_order: Some(f.pick(&[SortOrder::Asc, SortOrder::Desc])),
            page: 1,
            limit: f.int(10, 50),
        }
    }
}

/// Products, prices and search terms in the storefront's own vocabulary
#[derive(Debug, Clone, Default)]
pub struct CatalogFactory {
    faker: Faker,
}

impl CatalogFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FactoryOptions) -> Self {
        Self {
            faker: Faker::new(options),
        }
    }

    pub fn bulk(&mut self, count: usize) -> Vec<CatalogProduct> {
        self.create_many(count, |_| {})
    }

    /// A product marked down by 10 to 50 percent
    pub fn discounted(&mut self) -> CatalogProduct {
        let original = f64::from(self.faker.int(1000, 3000));
        let percent = self.faker.int(10, 50);
        let discounted = original - original * f64::from(percent) / 100.0;
        self.create(move |p| {
            p.price = format_amount(discounted);
            let description = p.description.take().unwrap_or_default();
            p.description = Some(format!("{} - {}% OFF", description, percent));
        })
    }

    pub fn cart_line(&mut self, product: &CatalogProduct, quantity: u32) -> CatalogCartLine {
        let unit = parse_amount(&product.price).unwrap_or(0.0);
        CatalogCartLine {
            product_id: product.id.unwrap_or_else(|| self.faker.int(1, 100)),
            quantity,
            price: product.price.clone(),
            total_price: format_amount(unit * f64::from(quantity)),
        }
    }

    pub fn search_terms(&self) -> SearchTerms {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        SearchTerms {
            valid: owned(&["top", "dress", "shirt", "jean", "polo"]),
            invalid: owned(&["nonexistent", "xyz123", "abcdefghijk"]),
            special: owned(&["@#$%", "test123", "", "   "]),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        STORE_CATEGORIES.iter().map(|s| s.to_string()).collect()
    }

    pub fn brands(&self) -> Vec<String> {
        STORE_BRANDS.iter().map(|s| s.to_string()).collect()
    }

    pub fn price_ranges(&self) -> Vec<CatalogPriceRange> {
        [
            (0, 500, "Under Rs. 500"),
            (500, 1000, "Rs. 500 - Rs. 1000"),
            (1000, 2000, "Rs. 1000 - Rs. 2000"),
            (2000, 5000, "Above Rs. 2000"),
        ]
        .into_iter()
        .map(|(min, max, label)| CatalogPriceRange {
            min,
            max,
            label: label.to_string(),
        })
        .collect()
    }
}

impl Factory for CatalogFactory {
    type Output = CatalogProduct;

    fn create_default(&mut self) -> CatalogProduct {
        let f = &mut self.faker;
        CatalogProduct {
            id: Some(f.int(1, 1000)),
            name: f.product_name(),
            price: format!("Rs. {}", f.int(300, 2000)),
            category: f.pick(&STORE_CATEGORIES[..5]).to_string(),
            brand: f.pick(&STORE_BRANDS[..5]).to_string(),
            availability: f.pick(&["In Stock", "Out of Stock"]).to_string(),
            description: Some(f.product_description()),
        }
    }
}

//! Random source and word lists backing the data factories

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark",
    "Sandra", "Steven", "Ashley", "Paul", "Emily", "Andrew", "Donna", "Joshua", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "and Sons", "Ltd", "Partners"];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com", "example.com", "mail.test"];

const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Pine", "Elm", "Washington", "Lake", "Hill", "Sunset", "Park",
    "Ridge", "Meadow", "River", "Highland", "Church", "Mill", "Spring", "Forest",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way", "Boulevard"];

const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview",
    "Salem", "Madison", "Georgetown", "Arlington", "Ashland", "Dover", "Oxford", "Jackson",
];

const STATES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "California", "Colorado", "Florida", "Georgia", "Illinois",
    "Indiana", "Kansas", "Maryland", "Michigan", "Nevada", "New York", "Ohio", "Oregon",
    "Texas", "Utah", "Virginia", "Washington",
];

const DEPARTMENTS: &[&str] = &[
    "Books", "Movies", "Music", "Games", "Electronics", "Computers", "Home", "Garden", "Tools",
    "Grocery", "Health", "Beauty", "Toys", "Kids", "Baby", "Clothing", "Shoes", "Jewelry",
    "Sports", "Outdoors", "Automotive", "Industrial",
];

const PRODUCT_ADJECTIVES: &[&str] = &[
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome", "Generic", "Handcrafted", "Handmade", "Licensed",
    "Refined", "Unbranded", "Tasty",
];

const PRODUCT_MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal", "Soft",
    "Fresh", "Frozen", "Bronze", "Silk",
];

const PRODUCT_NOUNS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants",
    "Shirt", "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese",
    "Bacon", "Pizza", "Salad", "Sausages", "Chips",
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
    "enim", "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris",
    "nisi", "aliquip", "ex", "ea", "commodo", "consequat",
];

const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Options shared by all factories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryOptions {
    /// Fixed seed for reproducible data; entropy when unset
    pub seed: Option<u64>,
}

impl FactoryOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Seedable generator of realistic-looking values
#[derive(Debug, Clone)]
pub struct Faker {
    rng: StdRng,
}

impl Default for Faker {
    fn default() -> Self {
        Self::new(FactoryOptions::default())
    }
}

impl Faker {
    pub fn new(options: FactoryOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Derive an independent generator, deterministic when `self` is seeded
    pub fn fork(&mut self) -> Faker {
        Faker {
            rng: StdRng::seed_from_u64(self.rng.gen()),
        }
    }

    pub fn pick<T: Clone>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())].clone()
    }

    pub fn int(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max)
    }

    /// Uniform float rounded to two decimals
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        let value = self.rng.gen_range(min..=max);
        ((value * 100.0).round() / 100.0).clamp(min, max)
    }

    pub fn boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    pub fn uuid(&mut self) -> String {
        Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }

    pub fn numeric(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect()
    }

    pub fn first_name(&mut self) -> String {
        self.pick(FIRST_NAMES).to_string()
    }

    pub fn last_name(&mut self) -> String {
        self.pick(LAST_NAMES).to_string()
    }

    pub fn full_name(&mut self) -> String {
        format!("{} {}", self.first_name(), self.last_name())
    }

    /// Lower-case address derived from the given names
    pub fn email(&mut self, first: &str, last: &str) -> String {
        let clean = |s: &str| -> String {
            s.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        };
        let separator = self.pick(&[".", "_", ""]);
        let number = self.int(1, 999);
        let domain = self.pick(EMAIL_DOMAINS);
        format!("{}{}{}{}@{}", clean(first), separator, clean(last), number, domain)
    }

    pub fn password(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(PASSWORD_CHARSET[self.rng.gen_range(0..PASSWORD_CHARSET.len())]))
            .collect()
    }

    pub fn company(&mut self) -> String {
        if self.boolean() {
            format!("{} {}", self.last_name(), self.pick(COMPANY_SUFFIXES))
        } else {
            format!("{} and {}", self.last_name(), self.last_name())
        }
    }

    pub fn street_address(&mut self) -> String {
        format!(
            "{} {} {}",
            self.int(1, 9999),
            self.pick(STREET_NAMES),
            self.pick(STREET_SUFFIXES)
        )
    }

    pub fn secondary_address(&mut self) -> String {
        if self.boolean() {
            format!("Apt. {}", self.int(1, 999))
        } else {
            format!("Suite {}", self.int(100, 999))
        }
    }

    pub fn city(&mut self) -> String {
        self.pick(CITIES).to_string()
    }

    pub fn state(&mut self) -> String {
        self.pick(STATES).to_string()
    }

    pub fn zip_code(&mut self) -> String {
        format!("{:05}", self.int(501, 99950))
    }

    pub fn department(&mut self) -> String {
        self.pick(DEPARTMENTS).to_string()
    }

    pub fn product_name(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(PRODUCT_ADJECTIVES),
            self.pick(PRODUCT_MATERIALS),
            self.pick(PRODUCT_NOUNS)
        )
    }

    pub fn product_description(&mut self) -> String {
        let name = self.product_name();
        format!("The {} combines {}", name, self.sentence(6, 12).to_lowercase())
    }

    /// Capitalised lorem sentence ending in a full stop
    pub fn sentence(&mut self, min_words: u32, max_words: u32) -> String {
        let count = self.int(min_words, max_words) as usize;
        let words: Vec<&str> = (0..count).map(|_| self.pick(LOREM)).collect();
        let text = words.join(" ");
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }

    pub fn sentences(&mut self, count: u32) -> String {
        (0..count)
            .map(|_| self.sentence(4, 10))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn image_url(&mut self, width: u32, height: u32) -> String {
        format!("https://picsum.photos/seed/{}/{}/{}", self.int(1, 100_000), width, height)
    }

    /// Birth date for someone between `min_age` and `max_age` years old
    pub fn birthdate(&mut self, min_age: u32, max_age: u32) -> NaiveDate {
        let today = Utc::now().date_naive();
        let age = self.int(min_age, max_age) as i32;
        let year = today.year() - age;
        let month = self.int(1, 12);
        let day = self.int(1, 28);
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today)
    }

    pub fn past(&mut self, years: u32) -> DateTime<Utc> {
        let seconds = self.rng.gen_range(1..=i64::from(years.max(1)) * 365 * 86_400);
        Utc::now() - Duration::seconds(seconds)
    }

    pub fn recent(&mut self, days: u32) -> DateTime<Utc> {
        let seconds = self.rng.gen_range(1..=i64::from(days.max(1)) * 86_400);
        Utc::now() - Duration::seconds(seconds)
    }

    pub fn future(&mut self, years: u32) -> DateTime<Utc> {
        let seconds = self.rng.gen_range(86_400..=i64::from(years.max(1)) * 365 * 86_400);
        Utc::now() + Duration::seconds(seconds)
    }
}

/// Millisecond timestamp plus a random tail, for unique emails
pub fn unique_suffix(faker: &mut Faker) -> String {
    format!("{}{}", Utc::now().timestamp_millis(), faker.int(0, 9999))
}

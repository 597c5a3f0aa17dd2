//! Static pools backing synthetic transaction generation.

use crate::model::TransactionType;

pub struct City {
    pub name: &'static str,
    pub state: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub const CITIES: [City; 15] = [
    City { name: "New York", state: "NY", lat: 40.7128, lng: -74.0060 },
    City { name: "Los Angeles", state: "CA", lat: 34.0522, lng: -118.2437 },
    City { name: "Chicago", state: "IL", lat: 41.8781, lng: -87.6298 },
    City { name: "Houston", state: "TX", lat: 29.7604, lng: -95.3698 },
    City { name: "Phoenix", state: "AZ", lat: 33.4484, lng: -112.0740 },
    City { name: "Miami", state: "FL", lat: 25.7617, lng: -80.1918 },
    City { name: "Seattle", state: "WA", lat: 47.6062, lng: -122.3321 },
    City { name: "Denver", state: "CO", lat: 39.7392, lng: -104.9903 },
    City { name: "Boston", state: "MA", lat: 42.3601, lng: -71.0589 },
    City { name: "Atlanta", state: "GA", lat: 33.7490, lng: -84.3880 },
    City { name: "Dallas", state: "TX", lat: 32.7767, lng: -96.7970 },
    City { name: "San Francisco", state: "CA", lat: 37.7749, lng: -122.4194 },
    City { name: "Las Vegas", state: "NV", lat: 36.1699, lng: -115.1398 },
    City { name: "Detroit", state: "MI", lat: 42.3314, lng: -83.0458 },
    City { name: "Philadelphia", state: "PA", lat: 39.9526, lng: -75.1652 },
];

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CountryRisk {
    Low,
    Medium,
    High,
}

pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub currency: &'static str,
    pub risk: CountryRisk,
}

pub const INTERNATIONAL_COUNTRIES: [Country; 10] = [
    Country { code: "UK", name: "United Kingdom", currency: "GBP", risk: CountryRisk::Low },
    Country { code: "DE", name: "Germany", currency: "EUR", risk: CountryRisk::Low },
    Country { code: "FR", name: "France", currency: "EUR", risk: CountryRisk::Low },
    Country { code: "JP", name: "Japan", currency: "JPY", risk: CountryRisk::Low },
    Country { code: "CN", name: "China", currency: "CNY", risk: CountryRisk::Medium },
    Country { code: "RU", name: "Russia", currency: "RUB", risk: CountryRisk::High },
    Country { code: "MX", name: "Mexico", currency: "MXN", risk: CountryRisk::Medium },
    Country { code: "BZ", name: "Belize", currency: "BZD", risk: CountryRisk::High },
    Country { code: "CY", name: "Cyprus", currency: "EUR", risk: CountryRisk::High },
    Country { code: "PA", name: "Panama", currency: "USD", risk: CountryRisk::High },
];

pub const MERCHANT_CATEGORIES: [(&str, &[&str]); 8] = [
    ("retail", &["Walmart", "Target", "Amazon", "Costco", "Best Buy", "Home Depot"]),
    ("food", &["McDonald's", "Starbucks", "Chipotle", "Subway", "Pizza Hut", "Dominos"]),
    ("gas", &["Shell", "Chevron", "BP", "ExxonMobil", "Valero", "Speedway"]),
    ("travel", &["United Airlines", "Delta", "Marriott", "Hilton", "Expedia", "Uber"]),
    ("utilities", &["AT&T", "Verizon", "Comcast", "Duke Energy", "PG&E", "Water Utility"]),
    ("financial", &["Chase Bank", "Wells Fargo", "Bank of America", "Citibank", "Capital One"]),
    ("healthcare", &["CVS", "Walgreens", "Kaiser", "UnitedHealth", "Anthem", "Blue Cross"]),
    ("entertainment", &["Netflix", "Spotify", "Apple Music", "Disney+", "AMC Theaters"]),
];

pub const FIRST_NAMES: [&str; 16] = [
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Barbara", "Richard", "Susan", "Joseph", "Jessica",
];

pub const LAST_NAMES: [&str; 15] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
];

pub const COUNTERPARTY_BANKS: [&str; 4] = ["Chase", "Wells Fargo", "Bank of America", "Citibank"];

pub const SWIFT_PREFIXES: [&str; 4] = ["CHAS", "WELLS", "CITI", "HSBC"];

pub const P2P_SERVICES: [&str; 4] = ["Zelle", "Venmo", "PayPal", "CashApp"];

pub const DEVICE_TYPES: [&str; 3] = ["mobile", "desktop", "tablet"];

pub const DEVICE_OS: [&str; 4] = ["iOS", "Android", "Windows", "macOS"];

pub const BROWSERS: [&str; 4] = ["Chrome", "Safari", "Firefox", "Edge"];

pub fn amount_range(txn_type: TransactionType) -> (f64, f64) {
    match txn_type {
        TransactionType::WireDomestic => (1_000.0, 50_000.0),
        TransactionType::WireInternational => (5_000.0, 100_000.0),
        TransactionType::AchCredit => (500.0, 15_000.0),
        TransactionType::AchDebit => (100.0, 5_000.0),
        TransactionType::CardPurchase => (10.0, 500.0),
        TransactionType::CardAtm => (20.0, 500.0),
        TransactionType::P2pTransfer => (10.0, 2_500.0),
        TransactionType::CashDeposit => (100.0, 8_000.0),
        TransactionType::CashWithdrawal => (20.0, 1_000.0),
        TransactionType::BillPayment => (50.0, 500.0),
        TransactionType::CheckDeposit => (100.0, 5_000.0),
    }
}

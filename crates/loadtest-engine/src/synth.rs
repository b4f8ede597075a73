//! Fixed-range value generators.
//!
//! Shared by the query selector (run-time inserts and updates) and the test
//! data populator, so both draw from the same value domains.

use rand::seq::SliceRandom;
use rand::Rng;

pub const USER_STATUSES: [&str; 3] = ["active", "inactive", "suspended"];

pub const ORDER_STATUSES: [&str; 5] = ["pending", "processing", "shipped", "delivered", "cancelled"];

pub const CATEGORIES: [&str; 10] = [
    "Electronics",
    "Clothing",
    "Books",
    "Home",
    "Sports",
    "Beauty",
    "Toys",
    "Food",
    "Health",
    "Automotive",
];

pub const PAYMENT_METHODS: [&str; 4] = ["credit_card", "paypal", "bank_transfer", "cash_on_delivery"];

const FIRST_NAMES: [&str; 12] = [
    "Alice", "Bruno", "Chen", "Dara", "Elif", "Farah", "Goran", "Hana", "Ines", "Jonas", "Kaito",
    "Lena",
];

const LAST_NAMES: [&str; 12] = [
    "Andersen", "Becker", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Horvat", "Ivanova",
    "Jensen", "Kowalski", "Larsen",
];

const ADJECTIVES: [&str; 8] = [
    "Compact", "Durable", "Ergonomic", "Lightweight", "Modular", "Portable", "Refined", "Smart",
];

const NOUNS: [&str; 8] = [
    "Adapter", "Backpack", "Blender", "Headset", "Kettle", "Lamp", "Monitor", "Sneaker",
];

const WORDS: [&str; 16] = [
    "quality", "design", "daily", "use", "built", "to", "last", "with", "premium", "materials",
    "and", "simple", "care", "for", "every", "home",
];

const STREETS: [&str; 6] = ["Main St", "Oak Ave", "Harbor Rd", "Elm St", "Mill Ln", "Park Blvd"];

const CITIES: [&str; 6] = ["Springfield", "Riverton", "Lakeside", "Fairview", "Brookfield", "Ashford"];

/// Pick one value from a fixed list.
pub fn one_of<'a, R: Rng + ?Sized>(rng: &mut R, values: &[&'a str]) -> &'a str {
    values.choose(rng).copied().unwrap_or_default()
}

/// Random integer in `min..=max`.
pub fn int_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Random decimal in `min..=max`, formatted with 2 decimal places.
pub fn decimal_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> String {
    let value: f64 = rng.gen_range(min..=max);
    format!("{value:.2}")
}

/// Username that is unique with high probability across concurrent writers.
pub fn username<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("bench_{:016x}", rng.gen::<u64>())
}

pub fn email(username: &str) -> String {
    format!("{username}@example.com")
}

pub fn first_name<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    one_of(rng, &FIRST_NAMES)
}

pub fn last_name<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    one_of(rng, &LAST_NAMES)
}

pub fn product_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", one_of(rng, &ADJECTIVES), one_of(rng, &NOUNS))
}

/// Space-separated filler text of at most `max_chars` characters.
pub fn text<R: Rng + ?Sized>(rng: &mut R, max_chars: usize) -> String {
    let mut out = String::new();
    loop {
        let word = one_of(rng, &WORDS);
        let needed = if out.is_empty() { word.len() } else { word.len() + 1 };
        if out.len() + needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

pub fn address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {}, {} {:05}",
        rng.gen_range(1..=9999),
        one_of(rng, &STREETS),
        one_of(rng, &CITIES),
        rng.gen_range(0..100_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_decimal_range_bounds_and_scale() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let value = decimal_range(&mut rng, 5.0, 1000.0);
            let (_, fraction) = value.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2);
            let parsed: f64 = value.parse().unwrap();
            assert!((5.0..=1000.0).contains(&parsed));
        }
    }

    #[test]
    fn test_text_respects_max_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        for max in [0, 1, 5, 50, 200] {
            assert!(text(&mut rng, max).len() <= max);
        }
    }

    #[test]
    fn test_username_and_email() {
        let mut rng = StdRng::seed_from_u64(1);
        let name = username(&mut rng);
        assert!(name.starts_with("bench_"));
        assert_eq!(email(&name), format!("{name}@example.com"));
    }

    #[test]
    fn test_one_of_stays_in_list() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert!(USER_STATUSES.contains(&one_of(&mut rng, &USER_STATUSES)));
        }
    }
}

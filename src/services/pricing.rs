use crate::models::{Item, Items};

pub const BASE_FARE: u32 = 199;

/// Shown by the booking form before any item is toggled. Not derived from
/// the fare table.
pub const PLACEHOLDER_ESTIMATE: u32 = 299;

pub fn surcharge(item: Item) -> u32 {
    match item {
        Item::SofaSet => 50,
        Item::Bed => 40,
        Item::DiningTable => 30,
        Item::Wardrobe => 60,
        Item::OtherFurniture => 20,
    }
}

pub fn estimate(items: &Items) -> u32 {
    BASE_FARE + items.selected().map(surcharge).sum::<u32>()
}

pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Whether a client-submitted price agrees with the server-side estimate.
pub fn matches_estimate(submitted: f64, items: &Items) -> bool {
    (submitted - f64::from(estimate(items))).abs() < 0.005
}

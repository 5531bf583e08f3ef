use serde::{Deserialize, Serialize};

use voyage_core::{Currency, DomainResult, Money, NonEmpty, Validation, combine4, traverse};
use voyage_rules::ItemKind;

/// One booked product. Each variant only holds what that product type needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingItem {
    Accommodation {
        room_id: String,
        hotel_name: String,
        nights: u32,
        nightly_rate: Money,
        guests: u32,
    },
    Flight {
        flight_id: String,
        flight_number: String,
        /// Price per passenger.
        price: Money,
        passengers: u32,
    },
    TravelPackage {
        package_id: String,
        name: String,
        /// Price per participant.
        price: Money,
        participants: u32,
    },
}

impl BookingItem {
    pub fn product_id(&self) -> &str {
        match self {
            BookingItem::Accommodation { room_id, .. } => room_id,
            BookingItem::Flight { flight_id, .. } => flight_id,
            BookingItem::TravelPackage { package_id, .. } => package_id,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            BookingItem::Accommodation { .. } => ItemKind::Accommodation,
            BookingItem::Flight { .. } => ItemKind::Flight,
            BookingItem::TravelPackage { .. } => ItemKind::Package,
        }
    }

    /// Price before discounts. A stay is charged for at least one night.
    pub fn base_price(&self) -> DomainResult<Money> {
        match self {
            BookingItem::Accommodation {
                nights,
                nightly_rate,
                ..
            } => nightly_rate.multiply(u64::from((*nights).max(1))),
            BookingItem::Flight {
                price, passengers, ..
            } => price.multiply(u64::from(*passengers)),
            BookingItem::TravelPackage {
                price,
                participants,
                ..
            } => price.multiply(u64::from(*participants)),
        }
    }

    /// Currency the item is priced in.
    pub fn currency(&self) -> Currency {
        match self {
            BookingItem::Accommodation { nightly_rate, .. } => nightly_rate.currency,
            BookingItem::Flight { price, .. } | BookingItem::TravelPackage { price, .. } => {
                price.currency
            }
        }
    }

    /// Units of inventory this item takes (one room, or one seat/slot per person).
    pub fn units(&self) -> u32 {
        match self {
            BookingItem::Accommodation { .. } => 1,
            BookingItem::Flight { passengers, .. } => *passengers,
            BookingItem::TravelPackage { participants, .. } => *participants,
        }
    }

    /// Field-level problems with this item, in field order.
    pub(crate) fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let id = self.product_id();
        if id.trim().is_empty() {
            problems.push(format!("{} item is missing a product id", self.kind()));
        }
        match self {
            BookingItem::Accommodation {
                hotel_name, guests, ..
            } => {
                if hotel_name.trim().is_empty() {
                    problems.push(format!("accommodation {id}: hotel name is required"));
                }
                if *guests == 0 {
                    problems.push(format!("accommodation {id}: at least one guest is required"));
                }
            }
            BookingItem::Flight {
                flight_number,
                passengers,
                ..
            } => {
                if flight_number.trim().is_empty() {
                    problems.push(format!("flight {id}: flight number is required"));
                }
                if *passengers == 0 {
                    problems.push(format!("flight {id}: at least one passenger is required"));
                }
            }
            BookingItem::TravelPackage {
                name, participants, ..
            } => {
                if name.trim().is_empty() {
                    problems.push(format!("package {id}: name is required"));
                }
                if *participants == 0 {
                    problems.push(format!("package {id}: at least one participant is required"));
                }
            }
        }
        problems
    }
}

/// Check a full item list: count within `1..=max_items`, every item's own
/// fields, unique product ids, one currency. Every problem is reported.
pub fn validate_items(items: Vec<BookingItem>, max_items: u32) -> Validation<Vec<BookingItem>, String> {
    let count = if items.is_empty() {
        Validation::invalid("a booking needs at least one item".to_string())
    } else if items.len() > max_items as usize {
        Validation::invalid(format!(
            "a booking holds at most {max_items} items, got {}",
            items.len()
        ))
    } else {
        Validation::valid(())
    };

    let fields = traverse(&items, |item| match NonEmpty::from_vec(item.problems()) {
        Some(problems) => Validation::invalid_all(problems),
        None => Validation::valid(()),
    });

    let duplicates = duplicate_product_ids(&items);
    let unique = Validation::ensure((), duplicates.is_empty(), || {
        format!("duplicate product ids: {}", duplicates.join(", "))
    });

    let currencies = Validation::ensure((), has_same_currency(&items), || {
        "all items must be priced in the same currency".to_string()
    });

    combine4(count, fields, unique, currencies, |_, _, _, _| items)
}

/// `true` for an empty list.
pub fn has_same_currency(items: &[BookingItem]) -> bool {
    match items.first() {
        Some(first) => items.iter().all(|item| item.currency() == first.currency()),
        None => true,
    }
}

fn duplicate_product_ids(items: &[BookingItem]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::with_capacity(items.len());
    let mut duplicates: Vec<String> = Vec::new();
    for item in items {
        let id = item.product_id();
        if seen.contains(&id) {
            if !duplicates.iter().any(|d| d == id) {
                duplicates.push(id.to_string());
            }
        } else {
            seen.push(id);
        }
    }
    duplicates
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn base_price_scales_with_nights_and_passengers() {
        assert_eq!(room("R-1", 3, 10_000).base_price().unwrap(), Money::krw(30_000));
        assert_eq!(room("R-1", 0, 10_000).base_price().unwrap(), Money::krw(10_000));
        assert_eq!(flight("F-1", 50_000, 2).base_price().unwrap(), Money::krw(100_000));
    }

    #[test]
    fn kind_maps_to_rule_item_kind() {
        let package = BookingItem::TravelPackage {
            package_id: "P-1".to_string(),
            name: "Jeju 3D2N".to_string(),
            price: Money::krw(200_000),
            participants: 2,
        };
        assert_eq!(package.kind(), ItemKind::Package);
        assert_eq!(package.units(), 2);
        assert_eq!(room("R-1", 1, 1).kind(), ItemKind::Accommodation);
    }

    #[test]
    fn problems_lists_every_missing_field() {
        let item = BookingItem::Flight {
            flight_id: " ".to_string(),
            flight_number: String::new(),
            price: Money::krw(1),
            passengers: 0,
        };
        assert_eq!(item.problems().len(), 3);
        assert!(flight("F-1", 1, 1).problems().is_empty());
    }

    #[test]
    fn validate_items_accumulates_across_checks() {
        let usd_flight = BookingItem::Flight {
            flight_id: "F-2".to_string(),
            flight_number: "UA1".to_string(),
            price: Money::usd(10_000),
            passengers: 0,
        };
        let items = vec![room("R-1", 1, 10_000), room("R-1", 2, 10_000), usd_flight];

        let validation = validate_items(items, 2);
        assert_eq!(
            validation.errors(),
            &[
                "a booking holds at most 2 items, got 3".to_string(),
                "flight F-2: at least one passenger is required".to_string(),
                "duplicate product ids: R-1".to_string(),
                "all items must be priced in the same currency".to_string(),
            ]
        );
    }

    #[test]
    fn validate_items_rejects_empty_list() {
        assert_eq!(
            validate_items(Vec::new(), 10).errors(),
            &["a booking needs at least one item".to_string()]
        );
        assert!(validate_items(vec![room("R-1", 1, 1)], 10).is_valid());
    }
}

//! Ordering engine
//!
//! Reconciles a client-submitted full ordering of one category against the
//! currently stored rows. Replace semantics, not merge: items the client
//! did not list are implicitly deleted.

use shared::models::{MenuItem, ReorderEntry};
use std::collections::HashMap;

/// Reconcile a submitted ordering with the category's current items.
///
/// - An entry whose id matches a stored item keeps every stored field and
///   only has its position reset to the entry's index in the result.
/// - An entry with an unknown (or absent) id becomes a new item when
///   `name`, `price` and `image` are all supplied; otherwise the entry is
///   dropped with a warning. A new entry without an id gets `id = 0`,
///   which the store replaces with a fresh id on write.
/// - Stored items missing from the submission do not appear in the result.
///
/// Resulting positions are exactly `0..len`.
pub fn reconcile(
    category: &str,
    existing: &[MenuItem],
    submitted: &[ReorderEntry],
) -> Vec<MenuItem> {
    let by_id: HashMap<i64, &MenuItem> = existing.iter().map(|item| (item.id, item)).collect();

    let mut result = Vec::with_capacity(submitted.len());

    for entry in submitted {
        let position = result.len() as i64;

        if let Some(found) = entry.id.and_then(|id| by_id.get(&id)) {
            result.push(MenuItem {
                sort_order: position,
                ..(*found).clone()
            });
            continue;
        }

        match (&entry.name, entry.price, &entry.image) {
            (Some(name), Some(price), Some(image)) if !name.trim().is_empty() => {
                result.push(MenuItem {
                    id: entry.id.unwrap_or(0),
                    category: category.to_string(),
                    name: name.clone(),
                    price,
                    image: image.clone(),
                    variant: entry.variant.unwrap_or_default(),
                    sort_order: position,
                });
            }
            _ => {
                tracing::warn!(
                    category = %category,
                    id = ?entry.id,
                    "Dropping reorder entry with incomplete fields"
                );
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Variant;

    fn item(id: i64, name: &str, sort_order: i64) -> MenuItem {
        MenuItem {
            id,
            category: "coffee".into(),
            name: name.into(),
            price: 2500,
            image: "logo.png".into(),
            variant: Variant::Hot,
            sort_order,
        }
    }

    fn entry(id: i64) -> ReorderEntry {
        ReorderEntry {
            id: Some(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_reorder_resets_positions_only() {
        let existing = vec![item(1, "Latte", 0), item(2, "Mocha", 1), item(3, "Drip", 2)];
        let result = reconcile("coffee", &existing, &[entry(3), entry(1), entry(2)]);

        let names: Vec<&str> = result.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Drip", "Latte", "Mocha"]);
        let positions: Vec<i64> = result.iter().map(|i| i.sort_order).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        // Stored fields survive untouched
        assert_eq!(result[0].price, 2500);
        assert_eq!(result[0].variant, Variant::Hot);
    }

    #[test]
    fn test_omitted_items_are_implicitly_deleted() {
        let existing = vec![item(1, "Latte", 0), item(2, "Mocha", 1)];
        let result = reconcile("coffee", &existing, &[entry(2)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
        assert_eq!(result[0].sort_order, 0);
    }

    #[test]
    fn test_unknown_id_with_complete_fields_becomes_new_item() {
        let existing = vec![item(1, "Latte", 0)];
        let submitted = vec![
            entry(1),
            ReorderEntry {
                id: Some(9),
                name: Some("Einspänner".into()),
                price: Some(4000),
                image: Some("cream.jpg".into()),
                variant: Some(Variant::Iced),
            },
        ];
        let result = reconcile("coffee", &existing, &submitted);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].id, 9);
        assert_eq!(result[1].name, "Einspänner");
        assert_eq!(result[1].sort_order, 1);
    }

    #[test]
    fn test_incomplete_new_entry_is_dropped() {
        let existing = vec![item(1, "Latte", 0)];
        let submitted = vec![
            ReorderEntry {
                id: None,
                name: Some("Nameless".into()),
                price: None, // missing required field
                image: Some("x.jpg".into()),
                variant: None,
            },
            entry(1),
        ];
        let result = reconcile("coffee", &existing, &submitted);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
        assert_eq!(result[0].sort_order, 0);
    }

    #[test]
    fn test_new_entry_without_id_gets_placeholder_id() {
        let submitted = vec![ReorderEntry {
            id: None,
            name: Some("Croffle".into()),
            price: Some(3500),
            image: Some("croffle.jpg".into()),
            variant: None,
        }];
        let result = reconcile("dessert", &[], &submitted);
        assert_eq!(result[0].id, 0);
        assert_eq!(result[0].variant, Variant::None);
    }
}

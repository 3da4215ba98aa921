//! Cart → wizard dish merge
//!
//! `selected_dishes` is the union of the cart and any wizard-only entries,
//! taking the larger quantity when both have the same id. Wizard entries
//! whose cart counterpart disappeared since the previous merge are dropped.

use crate::cart::DishMap;

/// Merge the live cart into the wizard's dishes
///
/// `previous_cart` is the cart as seen by the last merge; an id present there
/// but missing from `cart` was deleted from the cart and is removed from the
/// result. Running it again with `previous_cart == cart` returns the same map.
pub fn reconcile(previous_cart: &DishMap, cart: &DishMap, dishes: &DishMap) -> DishMap {
    let mut merged: DishMap = dishes
        .iter()
        .filter(|(id, qty)| **qty > 0 && !(previous_cart.contains_key(*id) && !cart.contains_key(*id)))
        .map(|(id, qty)| (id.clone(), *qty))
        .collect();

    for (id, qty) in cart {
        if *qty == 0 {
            continue;
        }
        let entry = merged.entry(id.clone()).or_insert(0);
        *entry = (*entry).max(*qty);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, u32)]) -> DishMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_union_takes_max() {
        let cart = map(&[("1", 2), ("2", 1)]);
        let dishes = map(&[("1", 3), ("3", 4)]);
        let merged = reconcile(&cart, &cart, &dishes);
        assert_eq!(merged, map(&[("1", 3), ("2", 1), ("3", 4)]));
    }

    #[test]
    fn test_cart_deletion_drops_wizard_entry() {
        let previous = map(&[("1", 2), ("2", 1)]);
        let cart = map(&[("2", 1)]);
        let dishes = map(&[("1", 5), ("2", 1), ("9", 1)]);
        let merged = reconcile(&previous, &cart, &dishes);
        // "9" never came from the cart, it stays
        assert_eq!(merged, map(&[("2", 1), ("9", 1)]));
    }

    #[test]
    fn test_idempotent() {
        let previous = map(&[("1", 2), ("4", 1)]);
        let cart = map(&[("1", 1), ("2", 6)]);
        let dishes = map(&[("1", 3), ("4", 2), ("5", 1)]);

        let once = reconcile(&previous, &cart, &dishes);
        let twice = reconcile(&cart, &cart, &once);
        assert_eq!(once, twice);
        assert_eq!(once, map(&[("1", 3), ("2", 6), ("5", 1)]));
    }

    #[test]
    fn test_cleared_cart_removes_cart_origin_entries() {
        let previous = map(&[("1", 2), ("2", 1)]);
        let merged = reconcile(&previous, &DishMap::new(), &map(&[("1", 2), ("2", 1)]));
        assert!(merged.is_empty());
    }
}

//! Order summary for the confirm step
//!
//! All amounts are in cents. Dishes missing from the menu are still listed
//! (with a zero price) so the user sees everything that will be sent.

use crate::availability::RoomView;
use crate::cart::DishMap;
use serde::Serialize;
use shared::MenuItem;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub line_total: i64,
    /// False when the id is not on the current menu
    pub known: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub dishes_total: i64,
    pub room_surcharge: i64,
    pub total: i64,
}

impl OrderSummary {
    pub fn build(dishes: &DishMap, menu: &[MenuItem], room: Option<&RoomView>) -> Self {
        let by_id: HashMap<&str, &MenuItem> =
            menu.iter().map(|item| (item.id.as_str(), item)).collect();

        let lines: Vec<SummaryLine> = dishes
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(id, qty)| match by_id.get(id.as_str()) {
                Some(item) => SummaryLine {
                    menu_item_id: id.clone(),
                    name: item.name.clone(),
                    unit_price: item.price,
                    quantity: *qty,
                    line_total: item.price.saturating_mul(i64::from(*qty)),
                    known: true,
                },
                None => SummaryLine {
                    menu_item_id: id.clone(),
                    name: format!("Item {}", id),
                    unit_price: 0,
                    quantity: *qty,
                    line_total: 0,
                    known: false,
                },
            })
            .collect();

        let dishes_total = lines
            .iter()
            .fold(0i64, |acc, line| acc.saturating_add(line.line_total));
        let room_surcharge = room.map_or(0, |r| r.surcharge);

        Self {
            lines,
            dishes_total,
            room_surcharge,
            total: dishes_total.saturating_add(room_surcharge),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Format cents as `12.50`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

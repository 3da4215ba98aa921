//! Menu Item Model

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Menu item entity (菜品)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Cart key
    pub id: String,
    pub name: String,
    /// Price in cents
    pub price: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

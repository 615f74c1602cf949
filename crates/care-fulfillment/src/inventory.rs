//! Inventory aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FulfillmentError, Result};

/// Categories offered by the intake UI
pub const CATEGORY_OPTIONS: [&str; 8] = [
    "Clothing",
    "Shoes",
    "Boots",
    "Food",
    "Hygiene",
    "Household",
    "Toys",
    "Other",
];

/// Items at or below this quantity are flagged in the admin list
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A stock record: quantity on hand plus a lifetime delivered tally
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub quantity: u32,
    /// All-time units delivered from this item; only ever increases
    #[serde(default)]
    pub tally: u32,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        category: impl Into<String>,
        location: Option<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.filter(|d| !d.is_empty()),
            category: category.into(),
            location: location.filter(|l| !l.is_empty()),
            quantity,
            tally: 0,
            last_updated: Utc::now(),
        }
    }

    /// Admin edit of the descriptive fields and the on-hand count.
    ///
    /// The tally is untouched: it tracks lifetime deliveries, not edits.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        category: impl Into<String>,
        location: Option<String>,
        quantity: u32,
    ) {
        self.name = name.into();
        self.description = description.filter(|d| !d.is_empty());
        self.category = category.into();
        self.location = location.filter(|l| !l.is_empty());
        self.quantity = quantity;
        self.touch();
    }

    /// Add units back to stock
    pub fn restock(&mut self, qty: u32) {
        self.quantity = self.quantity.saturating_add(qty);
        self.touch();
    }

    /// Remove units from stock and record them in the tally.
    ///
    /// Checked: the quantity can never go negative.
    pub fn consume(&mut self, qty: u32) -> Result<()> {
        let remaining =
            self.quantity
                .checked_sub(qty)
                .ok_or_else(|| FulfillmentError::InsufficientStock {
                    name: self.name.clone(),
                    requested: qty,
                    available: self.quantity,
                })?;
        self.quantity = remaining;
        self.tally += qty;
        self.touch();
        Ok(())
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }

    /// Case-insensitive name match with optional category/location filters
    pub fn matches(&self, name: &str, category: Option<&str>, location: Option<&str>) -> bool {
        if !self.name.trim().eq_ignore_ascii_case(name.trim()) {
            return false;
        }
        if let Some(category) = category {
            if !self.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(location) = location {
            match self.location.as_deref() {
                Some(own) if own.eq_ignore_ascii_case(location) => {}
                _ => return false,
            }
        }
        true
    }

    pub(crate) fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

/// Client-side style filtering over an inventory snapshot: free-text search
/// across name/description/category/location plus exact category and
/// location filters.
pub fn filter_items<'a>(
    items: &'a [InventoryItem],
    search: &str,
    category: Option<&str>,
    location: Option<&str>,
) -> Vec<&'a InventoryItem> {
    let search = search.to_lowercase();
    items
        .iter()
        .filter(|item| {
            if !search.is_empty() {
                let hit = item.name.to_lowercase().contains(&search)
                    || item
                        .description
                        .as_deref()
                        .unwrap_or("")
                        .to_lowercase()
                        .contains(&search)
                    || item.category.to_lowercase().contains(&search)
                    || item
                        .location
                        .as_deref()
                        .unwrap_or("")
                        .to_lowercase()
                        .contains(&search);
                if !hit {
                    return false;
                }
            }
            if let Some(category) = category {
                if item.category != category {
                    return false;
                }
            }
            if let Some(location) = location {
                if item.location.as_deref() != Some(location) {
                    return false;
                }
            }
            true
        })
        .collect()
}

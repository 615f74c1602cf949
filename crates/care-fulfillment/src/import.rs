//! CSV bulk import for inventory
//!
//! Format: header row `name,description,quantity,category,location`
//! (case-insensitive), comma-delimited, no quoting or escaping. Rows with
//! a missing name or non-numeric quantity are skipped silently.

use crate::inventory::InventoryItem;
use crate::ports::InventoryRepository;
use crate::Result;

/// Summary of one import run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse CSV text into inventory items, counting skipped rows.
///
/// Every imported item starts with a zero tally and a fresh timestamp.
pub fn parse_inventory_csv(text: &str) -> (Vec<InventoryItem>, usize) {
    let mut rows = text.lines().filter(|line| !line.trim().is_empty());
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .split(',')
            .map(|h| h.trim().to_lowercase())
            .collect(),
        None => return (Vec::new(), 0),
    };

    let column = |name: &str| headers.iter().position(|h| h == name);
    let name_col = column("name");
    let description_col = column("description");
    let quantity_col = column("quantity");
    let category_col = column("category");
    let location_col = column("location");

    let mut items = Vec::new();
    let mut skipped = 0;
    for row in rows {
        let cols: Vec<&str> = row.split(',').map(str::trim).collect();
        let cell = |idx: Option<usize>| idx.and_then(|i| cols.get(i)).copied().unwrap_or("");

        let name = cell(name_col);
        let quantity: Option<u32> = cell(quantity_col).parse().ok();
        match (name.is_empty(), quantity) {
            (false, Some(quantity)) => {
                items.push(InventoryItem::new(
                    name,
                    Some(cell(description_col).to_string()),
                    cell(category_col),
                    Some(cell(location_col).to_string()),
                    quantity,
                ));
            }
            _ => skipped += 1,
        }
    }
    (items, skipped)
}

/// Parse and persist, one write per row.
pub async fn import_inventory_csv(
    repo: &dyn InventoryRepository,
    text: &str,
) -> Result<ImportOutcome> {
    let (items, skipped) = parse_inventory_csv(text);
    let imported = items.len();
    for item in &items {
        repo.save(item).await?;
    }
    tracing::info!(imported, skipped, "inventory CSV import finished");
    Ok(ImportOutcome { imported, skipped })
}

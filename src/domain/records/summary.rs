// ============================================================
// INVENTORY SUMMARY
// ============================================================
// Dashboard statistics computed over an accepted record set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Short reference to a record listed in a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub item: ItemRef,
    pub quantity: f64,
    pub min_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringItem {
    pub item: ItemRef,
    pub expiry_date: NaiveDate,
    /// Negative when already expired
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub items: usize,
    pub quantity: f64,
}

/// Statistics over an inventory record set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_quantity: f64,
    /// Sum of quantity * price
    pub total_value: f64,
    pub low_stock: Vec<LowStockItem>,
    pub expiring_soon: Vec<ExpiringItem>,
    pub expired: Vec<ExpiringItem>,
    /// Sorted by category name
    pub by_category: Vec<CategoryCount>,
}

impl InventorySummary {
    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Inventory Summary ({} items):\n\
             - Total quantity: {:.2}\n\
             - Total value: {:.2}\n\
             - Low stock: {}\n\
             - Expiring soon: {}\n\
             - Expired: {}\n\
             - Categories: {}",
            self.total_items,
            self.total_quantity,
            self.total_value,
            self.low_stock.len(),
            self.expiring_soon.len(),
            self.expired.len(),
            self.by_category.len()
        )
    }
}

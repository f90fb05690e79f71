// ============================================================
// INVENTORY ANALYZER
// ============================================================
// Dashboard statistics over imported inventory records

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::records::{
    CategoryCount, ExpiringItem, InventorySummary, ItemRef, LowStockItem, Record,
};

/// Inventory analyzer
pub struct InventoryAnalyzer {
    expiry_window_days: i64,
}

impl InventoryAnalyzer {
    pub fn new(expiry_window_days: i64) -> Self {
        Self { expiry_window_days }
    }

    pub fn summarize(&self, records: &[Record], today: NaiveDate) -> InventorySummary {
        let mut summary = InventorySummary {
            total_items: records.len(),
            ..Default::default()
        };
        let mut categories: BTreeMap<String, (usize, f64)> = BTreeMap::new();

        for record in records {
            let quantity = record.number("quantity");
            let min_quantity = record.number("min_quantity");
            summary.total_quantity += quantity;
            summary.total_value += quantity * record.number("price");

            // A zero threshold means "no threshold set"
            if min_quantity > 0.0 && quantity < min_quantity {
                summary.low_stock.push(LowStockItem {
                    item: item_ref(record),
                    quantity,
                    min_quantity,
                });
            }

            if let Some(expiry_date) = record.get("expiry_date").and_then(|v| v.as_date()) {
                let days_left = (expiry_date - today).num_days();
                let entry = ExpiringItem {
                    item: item_ref(record),
                    expiry_date,
                    days_left,
                };
                if days_left < 0 {
                    summary.expired.push(entry);
                } else if days_left <= self.expiry_window_days {
                    summary.expiring_soon.push(entry);
                }
            }

            let category = match record.text("category").trim() {
                "" => "Uncategorized".to_string(),
                name => name.to_string(),
            };
            let slot = categories.entry(category).or_insert((0, 0.0));
            slot.0 += 1;
            slot.1 += quantity;
        }

        summary.expiring_soon.sort_by_key(|e| e.days_left);
        summary.expired.sort_by_key(|e| e.days_left);
        summary.by_category = categories
            .into_iter()
            .map(|(category, (items, quantity))| CategoryCount {
                category,
                items,
                quantity,
            })
            .collect();

        summary
    }
}

impl Default for InventoryAnalyzer {
    fn default() -> Self {
        Self::new(30)
    }
}

fn item_ref(record: &Record) -> ItemRef {
    ItemRef {
        id: record.id,
        name: record.text("name").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::FieldValue;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: u64, name: &str, category: &str, quantity: f64, min: f64, price: f64) -> Record {
        Record::new(id)
            .with("name", name)
            .with("category", category)
            .with("quantity", quantity)
            .with("min_quantity", min)
            .with("price", price)
            .with("expiry_date", FieldValue::Empty)
    }

    #[test]
    fn test_totals_and_low_stock() {
        let records = vec![
            item(1, "Wheat Seeds", "Seeds", 500.0, 100.0, 45.5),
            item(2, "Urea", "Fertilizer", 20.0, 50.0, 300.0),
            item(3, "Rice Seeds", "Seeds", 10.0, 0.0, 60.0),
        ];
        let summary = InventoryAnalyzer::default().summarize(&records, date(2024, 6, 1));

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_quantity, 530.0);
        assert_eq!(summary.total_value, 500.0 * 45.5 + 20.0 * 300.0 + 10.0 * 60.0);
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.low_stock[0].item.name, "Urea");
        assert_eq!(summary.by_category.len(), 2);
        assert_eq!(summary.by_category[0].category, "Fertilizer");
        assert_eq!(summary.by_category[1].items, 2);
    }

    #[test]
    fn test_expiry_buckets() {
        let today = date(2024, 6, 1);
        let records = vec![
            item(1, "Old Seeds", "Seeds", 1.0, 0.0, 1.0).with("expiry_date", date(2024, 5, 1)),
            item(2, "Fungicide", "Pesticide", 1.0, 0.0, 1.0).with("expiry_date", date(2024, 6, 20)),
            item(3, "Urea", "Fertilizer", 1.0, 0.0, 1.0).with("expiry_date", date(2025, 6, 1)),
            item(4, "Tarp", "", 1.0, 0.0, 1.0),
        ];
        let summary = InventoryAnalyzer::new(30).summarize(&records, today);

        assert_eq!(summary.expired.len(), 1);
        assert_eq!(summary.expired[0].days_left, -31);
        assert_eq!(summary.expiring_soon.len(), 1);
        assert_eq!(summary.expiring_soon[0].item.id, 2);
        assert!(summary
            .by_category
            .iter()
            .any(|c| c.category == "Uncategorized"));
    }

    #[test]
    fn test_summary_text() {
        let summary = InventoryAnalyzer::default().summarize(&[], date(2024, 6, 1));
        assert!(summary.summary().contains("Inventory Summary (0 items)"));
    }
}

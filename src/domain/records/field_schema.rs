// Field schemas for the record sets the dashboard imports and exports.
//
// Header matching is done against normalized headers (see `normalize_header`):
//   1) exact match on the field name
//   2) exact match on one of the field's aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::FieldKind;

/// One field of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    /// Optional fields keep a blank value instead of taking a default
    /// (only meaningful for dates).
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            optional: false,
            aliases: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn matches_header(&self, normalized_header: &str) -> bool {
        self.name == normalized_header || self.aliases.iter().any(|a| a == normalized_header)
    }
}

/// Name of the identifier column
pub const ID_FIELD: &str = "id";

pub const ID_ALIASES: &[&str] = &["identifier", "item_id", "record_id"];

/// Ordered field schema. The identifier is handled separately and is not listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Resolve a normalized header to the schema field it feeds.
    /// Exact names win over aliases.
    pub fn resolve_header(&self, normalized_header: &str) -> Option<&FieldSpec> {
        self.get(normalized_header).or_else(|| {
            self.fields
                .iter()
                .find(|f| f.matches_header(normalized_header))
        })
    }

    pub fn is_id_header(normalized_header: &str) -> bool {
        normalized_header == ID_FIELD || ID_ALIASES.contains(&normalized_header)
    }

    /// Farm inventory items
    pub fn inventory() -> Self {
        Self::new(vec![
            FieldSpec::new("name", FieldKind::Text).with_aliases(&["item", "item_name", "product"]),
            FieldSpec::new("category", FieldKind::Text).with_aliases(&["type", "item_category"]),
            FieldSpec::new("quantity", FieldKind::Decimal).with_aliases(&["qty", "stock"]),
            FieldSpec::new("unit", FieldKind::Text).with_aliases(&["uom", "units"]),
            FieldSpec::new("min_quantity", FieldKind::Decimal).with_aliases(&[
                "min_qty",
                "minimum_quantity",
                "min_stock",
                "reorder_level",
            ]),
            FieldSpec::new("price", FieldKind::Decimal).with_aliases(&["unit_price", "cost"]),
            FieldSpec::new("location", FieldKind::Text).with_aliases(&["storage", "warehouse"]),
            FieldSpec::new("last_updated", FieldKind::Date).with_aliases(&[
                "last_updated_at",
                "updated",
                "updated_at",
            ]),
            FieldSpec::new("supplier", FieldKind::Text).with_aliases(&["vendor"]),
            FieldSpec::new("sku", FieldKind::Text).with_aliases(&["item_code"]),
            FieldSpec::new("expiry_date", FieldKind::Date)
                .optional()
                .with_aliases(&["expiry", "expires", "expiration_date"]),
            FieldSpec::new("notes", FieldKind::Text).with_aliases(&["remarks", "comments"]),
        ])
    }

    /// CRM contacts (buyers, suppliers, field agents)
    pub fn contacts() -> Self {
        Self::new(vec![
            FieldSpec::new("name", FieldKind::Text).with_aliases(&["full_name", "contact_name"]),
            FieldSpec::new("email", FieldKind::Text).with_aliases(&["email_address", "mail"]),
            FieldSpec::new("phone", FieldKind::Text).with_aliases(&["mobile", "phone_number"]),
            FieldSpec::new("company", FieldKind::Text).with_aliases(&["organization", "firm"]),
            FieldSpec::new("category", FieldKind::Text).with_aliases(&["type", "segment"]),
            FieldSpec::new("status", FieldKind::Text).with_aliases(&["stage"]),
            FieldSpec::new("value", FieldKind::Decimal).with_aliases(&["deal_value", "amount"]),
            FieldSpec::new("last_contact", FieldKind::Date).with_aliases(&[
                "last_contacted",
                "last_contact_date",
            ]),
            FieldSpec::new("notes", FieldKind::Text).with_aliases(&["remarks", "comments"]),
        ])
    }
}

/// Built-in schemas, selectable from config and the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPreset {
    #[default]
    Inventory,
    Contacts,
}

impl SchemaPreset {
    pub fn schema(&self) -> FieldSchema {
        match self {
            SchemaPreset::Inventory => FieldSchema::inventory(),
            SchemaPreset::Contacts => FieldSchema::contacts(),
        }
    }

    pub fn default_required(&self) -> Vec<String> {
        let fields: &[&str] = match self {
            SchemaPreset::Inventory => &["name", "category"],
            SchemaPreset::Contacts => &["name", "email"],
        };
        fields.iter().map(|f| f.to_string()).collect()
    }

    pub fn template_filename(&self) -> &'static str {
        match self {
            SchemaPreset::Inventory => "inventory_template.csv",
            SchemaPreset::Contacts => "contacts_template.csv",
        }
    }
}

impl fmt::Display for SchemaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPreset::Inventory => write!(f, "inventory"),
            SchemaPreset::Contacts => write!(f, "contacts"),
        }
    }
}

impl FromStr for SchemaPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inventory" | "inv" => Ok(SchemaPreset::Inventory),
            "contacts" | "crm" => Ok(SchemaPreset::Contacts),
            other => Err(format!(
                "Unsupported schema preset: '{}'. Supported: inventory, contacts",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_aliases() {
        let schema = FieldSchema::inventory();
        assert_eq!(schema.resolve_header("qty").unwrap().name, "quantity");
        assert_eq!(schema.resolve_header("min_stock").unwrap().name, "min_quantity");
        assert_eq!(schema.resolve_header("expires").unwrap().name, "expiry_date");
        assert!(schema.resolve_header("colour").is_none());
    }

    #[test]
    fn test_exact_name_beats_alias() {
        // "type" aliases category in both presets; an exact "category" still resolves to itself.
        let schema = FieldSchema::contacts();
        assert_eq!(schema.resolve_header("category").unwrap().name, "category");
        assert_eq!(schema.resolve_header("type").unwrap().name, "category");
    }

    #[test]
    fn test_id_header() {
        assert!(FieldSchema::is_id_header("id"));
        assert!(FieldSchema::is_id_header("identifier"));
        assert!(!FieldSchema::is_id_header("sku"));
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("CRM".parse::<SchemaPreset>(), Ok(SchemaPreset::Contacts));
        assert_eq!("inventory".parse::<SchemaPreset>(), Ok(SchemaPreset::Inventory));
        assert!("maps".parse::<SchemaPreset>().is_err());
    }
}

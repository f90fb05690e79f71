// ============================================================
// FIELD NORMALIZER
// ============================================================
// Coerce raw CSV cells into schema-typed record values.
// Normalization never fails; bad or missing values take defaults.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::csv::CsvRow;
use crate::domain::records::{FieldKind, FieldSchema, FieldValue, IdGenerator, Record};

/// Currency symbols, grouping commas, underscores and whitespace inside numbers
static NUMERIC_NOISE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[₹$€£,_\s]|(?i)^rs\.?").unwrap());

static DAY_FIRST_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})$").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Field normalizer for one schema
pub struct FieldNormalizer {
    schema: FieldSchema,
    today: NaiveDate,
    keep_unknown_fields: bool,
}

impl FieldNormalizer {
    /// Create a normalizer that defaults missing dates to the local date
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            today: chrono::Local::now().date_naive(),
            keep_unknown_fields: false,
        }
    }

    /// Fix the date used as the default for missing dates
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_keep_unknown_fields(mut self, keep: bool) -> Self {
        self.keep_unknown_fields = keep;
        self
    }

    /// Normalize one raw row. The row's `id` cell is used when it is a positive
    /// integer; otherwise an id is drawn from `ids`.
    pub fn normalize(&self, row: &CsvRow, ids: &dyn IdGenerator) -> Record {
        let id = self.explicit_id(row).unwrap_or_else(|| ids.next_id());
        let mut record = Record::new(id);
        // clean header names that fed a schema field
        let mut consumed: Vec<&str> = Vec::new();

        for spec in self.schema.fields() {
            let source = row.get(&spec.name).or_else(|| {
                row.fields.iter().find(|f| {
                    self.schema
                        .resolve_header(&f.clean_name)
                        .map_or(false, |resolved| resolved.name == spec.name)
                })
            });
            if let Some(field) = source {
                consumed.push(&field.clean_name);
            }
            let raw = source.map(|f| f.value.as_str());

            let value = match spec.kind {
                FieldKind::Integer => FieldValue::Integer(raw.map(coerce_integer).unwrap_or(0)),
                FieldKind::Decimal => FieldValue::Decimal(raw.map(coerce_decimal).unwrap_or(0.0)),
                FieldKind::Text => FieldValue::Text(raw.map(|s| s.trim().to_string()).unwrap_or_default()),
                FieldKind::Date => match raw.and_then(parse_date) {
                    Some(date) => FieldValue::Date(date),
                    None if spec.optional => FieldValue::Empty,
                    None => {
                        if raw.map_or(false, |s| !s.trim().is_empty()) {
                            debug!(
                                "Row {}: unreadable date {:?} in '{}', using today",
                                row.index, raw, spec.name
                            );
                        }
                        FieldValue::Date(self.today)
                    }
                },
            };
            record.set(&spec.name, value);
        }

        if self.keep_unknown_fields {
            for field in &row.fields {
                if FieldSchema::is_id_header(&field.clean_name)
                    || consumed.contains(&field.clean_name.as_str())
                {
                    continue;
                }
                let value = if field.is_empty {
                    FieldValue::Empty
                } else {
                    FieldValue::Text(field.value.trim().to_string())
                };
                record.set_extension(&field.clean_name, value);
            }
        }

        record
    }

    /// Positive integer id from the row, if present
    pub fn explicit_id(&self, row: &CsvRow) -> Option<u64> {
        let field = row
            .fields
            .iter()
            .find(|f| FieldSchema::is_id_header(&f.clean_name))?;
        let id = coerce_integer(&field.value);
        (id > 0).then_some(id as u64)
    }
}

fn clean_number(raw: &str) -> String {
    NUMERIC_NOISE_PATTERN.replace_all(raw.trim(), "").to_string()
}

/// Integer coercion: whole numbers parse directly, decimals truncate, anything else is 0
pub fn coerce_integer(raw: &str) -> i64 {
    let cleaned = clean_number(raw);
    if let Ok(n) = cleaned.parse::<i64>() {
        return n;
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n.trunc() as i64,
        _ => 0,
    }
}

/// Decimal coercion: non-numeric or non-finite values are 0
pub fn coerce_decimal(raw: &str) -> f64 {
    match clean_number(raw).parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Parse the date formats seen in farm spreadsheets; `None` for blank or unreadable input
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    // "2024-01-15T10:30:00" and "2024-01-15 10:30" without offsets
    if let Some(prefix) = trimmed.get(..10) {
        if trimmed.len() > 10 && matches!(trimmed.as_bytes()[10], b'T' | b' ') {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    // Day-first, as written in India: 15/01/2024, 15-01-2024, 15.01.2024
    let captures = DAY_FIRST_DATE_PATTERN.captures(trimmed)?;
    let day = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let year = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::SequentialIdGenerator;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn normalizer() -> FieldNormalizer {
        FieldNormalizer::new(FieldSchema::inventory()).with_today(today())
    }

    #[test]
    fn test_missing_numeric_fields_default_to_zero() {
        let row = CsvRow::from_pairs(0, [("name", "Urea"), ("category", "Fertilizer")]);
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));

        assert_eq!(record.get("quantity"), Some(&FieldValue::Decimal(0.0)));
        assert_eq!(record.get("min_quantity"), Some(&FieldValue::Decimal(0.0)));
        assert_eq!(record.get("price"), Some(&FieldValue::Decimal(0.0)));
    }

    #[test]
    fn test_non_numeric_values_default_to_zero() {
        let row = CsvRow::from_pairs(0, [("name", "Urea"), ("quantity", "plenty"), ("price", "n/a")]);
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));

        assert_eq!(record.number("quantity"), 0.0);
        assert_eq!(record.number("price"), 0.0);
    }

    #[test]
    fn test_every_schema_field_is_present() {
        let row = CsvRow::from_pairs(0, [("name", "Urea")]);
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));

        for name in FieldSchema::inventory().field_names() {
            assert!(record.get(name).is_some(), "missing {}", name);
        }
        assert_eq!(record.text("supplier"), "");
        assert_eq!(record.get("last_updated"), Some(&FieldValue::Date(today())));
        assert_eq!(record.get("expiry_date"), Some(&FieldValue::Empty));
    }

    #[test]
    fn test_unknown_fields_dropped_by_default() {
        let row = CsvRow::from_pairs(0, [("name", "Urea"), ("colour", "white")]);
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));
        assert!(record.get("colour").is_none());
        assert!(record.extensions().is_empty());
    }

    #[test]
    fn test_unknown_fields_kept_when_asked() {
        let row = CsvRow::from_pairs(0, [("name", "Urea"), ("Bag Colour", "white"), ("qty", "5")]);
        let record = normalizer()
            .with_keep_unknown_fields(true)
            .normalize(&row, &SequentialIdGenerator::starting_at(1));
        assert_eq!(record.get("bag_colour"), Some(&FieldValue::Text("white".into())));
        assert_eq!(record.extensions().len(), 1);
        assert_eq!(record.number("quantity"), 5.0);
    }

    #[test]
    fn test_unused_alias_column_kept_as_extension() {
        let row = CsvRow::from_pairs(
            0,
            [("name", "Urea"), ("quantity", "20"), ("stock", "25")],
        );
        let record = normalizer()
            .with_keep_unknown_fields(true)
            .normalize(&row, &SequentialIdGenerator::starting_at(1));
        assert_eq!(record.number("quantity"), 20.0);
        assert_eq!(record.get("stock"), Some(&FieldValue::Text("25".into())));
        assert_eq!(record.extensions().len(), 1);
    }

    #[test]
    fn test_explicit_and_synthetic_ids() {
        let ids = SequentialIdGenerator::starting_at(900);
        let n = normalizer();

        let explicit = n.normalize(&CsvRow::from_pairs(0, [("id", "42"), ("name", "A")]), &ids);
        assert_eq!(explicit.id, 42);

        let zero = n.normalize(&CsvRow::from_pairs(1, [("id", "0"), ("name", "B")]), &ids);
        assert_eq!(zero.id, 900);

        let text = n.normalize(&CsvRow::from_pairs(2, [("id", "abc"), ("name", "C")]), &ids);
        assert_eq!(text.id, 901);

        let negative = n.normalize(&CsvRow::from_pairs(3, [("ID", "-5"), ("name", "D")]), &ids);
        assert_eq!(negative.id, 902);
    }

    #[test]
    fn test_aliased_headers() {
        let row = CsvRow::from_pairs(
            0,
            [("Item Name", "Neem Oil"), ("Type", "Pesticide"), ("Qty", "12"), ("Min Stock", "20")],
        );
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));
        assert_eq!(record.text("name"), "Neem Oil");
        assert_eq!(record.text("category"), "Pesticide");
        assert_eq!(record.number("quantity"), 12.0);
        assert_eq!(record.number("min_quantity"), 20.0);
    }

    #[test]
    fn test_number_cleaning() {
        assert_eq!(coerce_decimal("₹1,00,000.50"), 100000.5);
        assert_eq!(coerce_decimal(" 45.5 "), 45.5);
        assert_eq!(coerce_decimal("Rs. 250"), 250.0);
        assert_eq!(coerce_decimal("NaN"), 0.0);
        assert_eq!(coerce_decimal("inf"), 0.0);
        assert_eq!(coerce_integer("12.9"), 12);
        assert_eq!(coerce_integer("1,500"), 1500);
        assert_eq!(coerce_integer(""), 0);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date("2024-01-15"), expected);
        assert_eq!(parse_date("2024/01/15"), expected);
        assert_eq!(parse_date("15/01/2024"), expected);
        assert_eq!(parse_date("15-01-2024"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00Z"), expected);
        assert_eq!(parse_date("2024-01-15T10:30:00"), expected);
        assert_eq!(parse_date("2024-01-15 10:30"), expected);
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_unreadable_required_date_uses_today() {
        let row = CsvRow::from_pairs(0, [("name", "Urea"), ("last_updated", "yesterday-ish")]);
        let record = normalizer().normalize(&row, &SequentialIdGenerator::starting_at(1));
        assert_eq!(record.get("last_updated"), Some(&FieldValue::Date(today())));
    }
}

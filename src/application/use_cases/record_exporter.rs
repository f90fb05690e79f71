// ============================================================
// RECORD EXPORTER
// ============================================================
// Project records onto allow/deny lists, serialize to CSV and deliver the file

use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::domain::records::{
    ExportConfig, ExportOptions, ExportOutcome, ExportReceipt, FieldValue, Notice, Record,
    SchemaPreset, CSV_MIME_TYPE,
};
use crate::infrastructure::csv::{CsvWriter, ProjectedRow};
use crate::infrastructure::storage::DownloadSink;

/// Which columns appear in the output
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Allow(Vec<String>),
    Deny(Vec<String>),
}

impl Projection {
    /// Allow-list wins when both lists are given
    pub fn from_options(options: &ExportOptions) -> Self {
        match (&options.fields, &options.exclude) {
            (Some(fields), _) => Projection::Allow(fields.clone()),
            (None, Some(exclude)) => Projection::Deny(exclude.clone()),
            (None, None) => Projection::All,
        }
    }

    /// Project one record. Allow-listed columns the record lacks are skipped, not padded.
    pub fn apply<'a>(&'a self, record: &'a Record) -> ProjectedRow<'a> {
        match self {
            Projection::All => record.columns(),
            Projection::Allow(fields) => fields
                .iter()
                .filter_map(|name| record.column(name).map(|value| (name.as_str(), value)))
                .collect(),
            Projection::Deny(excluded) => record
                .columns()
                .into_iter()
                .filter(|(name, _)| !excluded.iter().any(|e| e == name))
                .collect(),
        }
    }
}

pub struct RecordExporter {
    config: ExportConfig,
    writer: CsvWriter,
}

impl RecordExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            writer: CsvWriter::new(),
        }
    }

    /// `<base>[-<timestamp>].csv`
    pub fn build_filename(&self, options: &ExportOptions) -> String {
        let base = options
            .filename
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.config.default_base_name);
        let base = base.strip_suffix(".csv").unwrap_or(base);

        if options.include_timestamp {
            let stamp = Local::now().format(&self.config.timestamp_format);
            format!("{}-{}.csv", base, stamp)
        } else {
            format!("{}.csv", base)
        }
    }

    /// Serialize records under the options' projection
    pub fn render(&self, records: &[Record], options: &ExportOptions) -> Result<String> {
        if records.is_empty() {
            return Err(AppError::EmptyExport);
        }
        let projection = Projection::from_options(options);
        let rows: Vec<ProjectedRow<'_>> = records.iter().map(|r| projection.apply(r)).collect();
        self.writer.unparse(&rows)
    }

    /// Render and deliver; errors propagate
    pub fn try_export(
        &self,
        records: &[Record],
        options: &ExportOptions,
        sink: &dyn DownloadSink,
    ) -> Result<ExportReceipt> {
        let text = self.render(records, options)?;
        let filename = self.build_filename(options);
        let location = sink.deliver(&filename, CSV_MIME_TYPE, text.as_bytes())?;

        Ok(ExportReceipt {
            filename,
            location,
            row_count: records.len(),
            byte_count: text.len(),
        })
    }

    /// Export at the call boundary: failures are logged and returned as a notice
    pub fn export(
        &self,
        records: &[Record],
        options: &ExportOptions,
        sink: &dyn DownloadSink,
    ) -> ExportOutcome {
        match self.try_export(records, options, sink) {
            Ok(receipt) => {
                info!(
                    "Exported {} records to {} ({} bytes)",
                    receipt.row_count, receipt.location, receipt.byte_count
                );
                let notice = Notice::success("Export successful")
                    .with_description(format!("{} records exported to {}", receipt.row_count, receipt.filename));
                ExportOutcome {
                    success: true,
                    receipt: Some(receipt),
                    notice,
                }
            }
            Err(err) => {
                error!("Export failed: {}", err);
                ExportOutcome {
                    success: false,
                    receipt: None,
                    notice: Notice::from(&err),
                }
            }
        }
    }

    /// Deliver the fixed single-row template for a preset
    pub fn export_template(&self, preset: SchemaPreset, sink: &dyn DownloadSink) -> ExportOutcome {
        let filename = preset.template_filename();
        let result = template_csv(preset)
            .and_then(|text| {
                sink.deliver(filename, CSV_MIME_TYPE, text.as_bytes())
                    .map(|location| (location, text.len()))
            });

        match result {
            Ok((location, byte_count)) => {
                info!("Template written to {}", location);
                ExportOutcome {
                    success: true,
                    receipt: Some(ExportReceipt {
                        filename: filename.to_string(),
                        location,
                        row_count: 1,
                        byte_count,
                    }),
                    notice: Notice::success("Template downloaded")
                        .with_description(format!("Fill in {} and import it", filename)),
                }
            }
            Err(err) => {
                error!("Template export failed: {}", err);
                ExportOutcome {
                    success: false,
                    receipt: None,
                    notice: Notice::from(&err),
                }
            }
        }
    }
}

impl Default for RecordExporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

/// The example row users copy their data into
pub fn template_record(preset: SchemaPreset) -> Record {
    let date = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Empty)
    };
    match preset {
        SchemaPreset::Inventory => Record::new(1)
            .with("name", "Organic Wheat Seeds")
            .with("category", "Seeds")
            .with("quantity", 500.0)
            .with("unit", "kg")
            .with("min_quantity", 100.0)
            .with("price", 45.5)
            .with("location", "Warehouse A")
            .with("last_updated", date(2024, 1, 15))
            .with("supplier", "Punjab Agro Supplies")
            .with("sku", "SEED-WHT-001")
            .with("expiry_date", date(2024, 12, 31))
            .with("notes", "Certified organic"),
        SchemaPreset::Contacts => Record::new(1)
            .with("name", "Ramesh Patel")
            .with("email", "ramesh.patel@example.com")
            .with("phone", "+91 98765 43210")
            .with("company", "Patel Farms")
            .with("category", "Buyer")
            .with("status", "Active")
            .with("value", 250000.0)
            .with("last_contact", date(2024, 1, 15))
            .with("notes", "Prefers bulk orders"),
    }
}

pub fn template_csv(preset: SchemaPreset) -> Result<String> {
    CsvWriter::new().unparse_records(&[template_record(preset)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemorySink;

    fn seed() -> Record {
        Record::new(1)
            .with("name", "Seed")
            .with("price", 10.0)
            .with("sku", "X")
            .with("notes", "keep dry")
    }

    #[test]
    fn test_allow_list_keeps_only_listed_fields() {
        let csv = RecordExporter::default()
            .render(&[seed()], &ExportOptions::allow(["name", "price"]))
            .unwrap();
        assert_eq!(csv, "name,price\nSeed,10\n");
    }

    #[test]
    fn test_allow_list_order_and_unknown_fields() {
        let record = seed();
        let projection = Projection::Allow(vec!["price".into(), "colour".into(), "name".into()]);
        let row = projection.apply(&record);
        let names: Vec<&str> = row.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["price", "name"]);
    }

    #[test]
    fn test_deny_list_keeps_everything_else() {
        let csv = RecordExporter::default()
            .render(&[seed()], &ExportOptions::deny(["notes"]))
            .unwrap();
        assert_eq!(csv, "id,name,price,sku\n1,Seed,10,X\n");
    }

    #[test]
    fn test_allow_list_wins_over_deny_list() {
        let options = ExportOptions {
            fields: Some(vec!["name".into()]),
            exclude: Some(vec!["name".into()]),
            ..Default::default()
        };
        assert_eq!(
            Projection::from_options(&options),
            Projection::Allow(vec!["name".into()])
        );
    }

    #[test]
    fn test_filenames() {
        let exporter = RecordExporter::default();
        assert_eq!(exporter.build_filename(&ExportOptions::default()), "export.csv");
        assert_eq!(
            exporter.build_filename(&ExportOptions::default().named("stock.csv")),
            "stock.csv"
        );

        let stamped = exporter.build_filename(&ExportOptions::default().named("stock").timestamped());
        assert!(stamped.starts_with("stock-"));
        assert!(stamped.ends_with(".csv"));
        // stock-YYYY-MM-DD_HH-MM-SS.csv
        assert_eq!(stamped.len(), "stock-".len() + 19 + ".csv".len());
    }

    #[test]
    fn test_export_delivers_with_mime_type() {
        let sink = MemorySink::new();
        let outcome = RecordExporter::default().export(&[seed()], &ExportOptions::default(), &sink);

        assert!(outcome.success);
        let files = sink.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "export.csv");
        assert_eq!(files[0].mime_type, "text/csv;charset=utf-8;");
        assert_eq!(outcome.receipt.unwrap().row_count, 1);
    }

    #[test]
    fn test_export_of_nothing_fails() {
        let sink = MemorySink::new();
        let outcome = RecordExporter::default().export(&[], &ExportOptions::default(), &sink);

        assert!(!outcome.success);
        assert_eq!(outcome.notice.message, "No data to export");
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_inventory_template() {
        let sink = MemorySink::new();
        let outcome = RecordExporter::default().export_template(SchemaPreset::Inventory, &sink);
        assert!(outcome.success);

        let files = sink.files();
        assert_eq!(files[0].filename, "inventory_template.csv");
        let text = sink.last_text().unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,category,quantity,unit,min_quantity,price,location,last_updated,supplier,sku,expiry_date,notes")
        );
        assert!(lines.next().unwrap().starts_with("1,Organic Wheat Seeds,Seeds,500,kg,100,45.5"));
        assert_eq!(lines.next(), None);
    }
}

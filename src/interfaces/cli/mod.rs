mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::records::SchemaPreset;

pub use commands::{execute, execute_with_config, CommandOutput};

#[derive(Parser, Debug)]
#[command(name = "agri-records", version, about = "Import, validate, summarize and export farm records")]
pub struct Cli {
    /// Config file (TOML); missing files are ignored
    #[arg(long, global = true, env = "AGRI_RECORDS_CONFIG", default_value = crate::infrastructure::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import and validate a CSV file
    Import(ImportArgs),
    /// Re-import a CSV file and export the accepted records
    Export(ExportArgs),
    /// Write the example template for a schema
    Template(TemplateArgs),
    /// Stock, value and expiry statistics for an inventory CSV
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportOverrides {
    /// Schema preset (inventory, contacts)
    #[arg(long, value_parser = parse_preset)]
    pub preset: Option<SchemaPreset>,

    /// Required fields, comma separated
    #[arg(long, value_delimiter = ',')]
    pub required: Option<Vec<String>>,

    /// Keep columns the schema does not know
    #[arg(long)]
    pub keep_unknown: bool,

    /// Fixed delimiter (auto-detected by default)
    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ImportOverrides,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// CSV file whose valid rows are exported
    pub file: PathBuf,

    #[command(flatten)]
    pub overrides: ImportOverrides,

    /// Only these columns, in this order (wins over --exclude)
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Every column except these
    #[arg(long, value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Base filename for the export
    #[arg(long)]
    pub name: Option<String>,

    /// Append a timestamp to the filename
    #[arg(long)]
    pub timestamp: bool,

    /// Output directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[arg(long, value_parser = parse_preset, default_value = "inventory")]
    pub preset: SchemaPreset,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Inventory CSV file
    pub file: PathBuf,

    /// Days ahead counted as "expiring soon"
    #[arg(long)]
    pub expiry_window: Option<i64>,
}

fn parse_preset(s: &str) -> Result<SchemaPreset, String> {
    s.parse()
}

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use tracing::error;
use tracing_subscriber::EnvFilter;

pub use crate::application::{
    FieldNormalizer, ImportPipeline, InventoryAnalyzer, Projection, RecordExporter,
    RecordValidator,
};
pub use crate::domain::error::{AppError, Result};
pub use crate::domain::records::{
    ExportOptions, FieldSchema, FieldValue, ImportConfig, ImportReport, ImportStage, Record,
    SchemaPreset,
};
pub use crate::interfaces::cli::{Cli, CommandOutput};

use crate::domain::records::Notice;
use crate::infrastructure::config::ConfigService;

/// Logs go to stderr so `--json` output on stdout stays machine readable.
/// `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one command line invocation and return the process exit code
pub async fn run(cli: Cli) -> i32 {
    let config = match ConfigService::from_file(&cli.config).load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            error!("{}", err);
            eprintln!("{}", Notice::from(&err));
            return 2;
        }
    };
    init_tracing(&config.log_level);

    match interfaces::cli::execute_with_config(&config, cli).await {
        Ok(output) => {
            if !output.text.is_empty() {
                println!("{}", output.text);
            }
            output.exit_code
        }
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", Notice::from(&err));
            2
        }
    }
}

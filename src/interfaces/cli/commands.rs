use std::path::{Path, PathBuf};

use tracing::info;

use super::{Cli, Command, ExportArgs, ImportArgs, ImportOverrides, SummaryArgs, TemplateArgs};
use crate::application::{ImportPipeline, InventoryAnalyzer, RecordExporter};
use crate::domain::error::{AppError, Result};
use crate::domain::records::{
    ExportOptions, ExportOutcome, ImportConfig, ImportReport, Notice, SchemaPreset, Severity,
};
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::storage::DirectorySink;

/// What a command prints and the process exit code
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn new(text: String, success: bool) -> Self {
        Self {
            text,
            exit_code: if success { 0 } else { 1 },
        }
    }
}

/// Load configuration and run one command
pub async fn execute(cli: Cli) -> Result<CommandOutput> {
    let config = ConfigService::from_file(&cli.config).load()?;
    execute_with_config(&config, cli).await
}

/// Run one command against an already loaded configuration
pub async fn execute_with_config(config: &AppConfig, cli: Cli) -> Result<CommandOutput> {
    let json = cli.json;

    match cli.command {
        Command::Import(args) => import(config, args, json).await,
        Command::Export(args) => export(config, args, json).await,
        Command::Template(args) => template(config, args, json),
        Command::Summary(args) => summary(config, args, json).await,
    }
}

/// Layer command-line overrides on top of the configured import settings
fn import_config(config: &AppConfig, overrides: &ImportOverrides) -> Result<ImportConfig> {
    let mut import = config.import.clone();
    if let Some(preset) = overrides.preset {
        if preset != import.preset {
            import.preset = preset;
            import.required_fields = preset.default_required();
        }
    }
    if let Some(required) = &overrides.required {
        import.required_fields = required.iter().map(|f| f.trim().to_string()).collect();
    }
    if overrides.keep_unknown {
        import.keep_unknown_fields = true;
    }
    if overrides.delimiter.is_some() {
        import.delimiter = overrides.delimiter;
    }
    import
        .validate()
        .map_err(|e| AppError::ConfigError(format!("Invalid import options: {}", e)))?;
    Ok(import)
}

async fn run_import(config: &ImportConfig, file: Option<&Path>) -> ImportReport {
    let pipeline = ImportPipeline::new(config.clone());
    let mut last_logged = 0u8;
    let mut on_progress = |percent: u8| {
        if percent >= last_logged.saturating_add(25) || percent == 100 {
            tracing::debug!("Validation progress: {}%", percent);
            last_logged = percent;
        }
    };
    pipeline.import_file(file, Some(&mut on_progress)).await
}

async fn import(config: &AppConfig, args: ImportArgs, json: bool) -> Result<CommandOutput> {
    let import = import_config(config, &args.overrides)?;
    let report = run_import(&import, args.file.as_deref()).await;
    let success = report.error().is_none();

    let text = if json {
        serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))?
    } else {
        render_import(&report)
    };
    Ok(CommandOutput::new(text, success))
}

async fn export(config: &AppConfig, args: ExportArgs, json: bool) -> Result<CommandOutput> {
    let import = import_config(config, &args.overrides)?;
    let report = run_import(&import, Some(&args.file)).await;

    if !report.is_success() {
        let text = if json {
            serde_json::to_string_pretty(&report.notices)
                .map_err(|e| AppError::Internal(format!("Failed to serialize notices: {}", e)))?
        } else {
            render_notices(&report.notices)
        };
        return Ok(CommandOutput::new(text, false));
    }

    let options = ExportOptions {
        fields: args.fields,
        exclude: args.exclude,
        filename: args.name,
        include_timestamp: args.timestamp,
    };
    let sink = DirectorySink::new(output_dir(config, args.out_dir));
    let outcome = RecordExporter::new(config.export.clone()).export(&report.records, &options, &sink);

    info!(
        "Export from {} finished: success={}",
        args.file.display(),
        outcome.success
    );
    render_export(&report.notices, outcome, json)
}

fn template(config: &AppConfig, args: TemplateArgs, json: bool) -> Result<CommandOutput> {
    let sink = DirectorySink::new(output_dir(config, args.out_dir));
    let outcome = RecordExporter::new(config.export.clone()).export_template(args.preset, &sink);
    render_export(&[], outcome, json)
}

async fn summary(config: &AppConfig, args: SummaryArgs, json: bool) -> Result<CommandOutput> {
    let mut import = config.import.clone();
    import.preset = SchemaPreset::Inventory;
    let report = run_import(&import, Some(&args.file)).await;

    if !report.is_success() {
        return Ok(CommandOutput::new(render_notices(&report.notices), false));
    }

    let window = args.expiry_window.unwrap_or(import.expiry_window_days);
    let summary = InventoryAnalyzer::new(window)
        .summarize(&report.records, chrono::Local::now().date_naive());

    let text = if json {
        serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::Internal(format!("Failed to serialize summary: {}", e)))?
    } else {
        let mut text = summary.summary();
        for low in &summary.low_stock {
            text.push_str(&format!(
                "\n  low stock: #{} {} ({} < {})",
                low.item.id, low.item.name, low.quantity, low.min_quantity
            ));
        }
        for item in summary.expired.iter().chain(summary.expiring_soon.iter()) {
            text.push_str(&format!(
                "\n  expiry: #{} {} on {} ({} days)",
                item.item.id, item.item.name, item.expiry_date, item.days_left
            ));
        }
        text
    };
    Ok(CommandOutput::new(text, true))
}

fn output_dir(config: &AppConfig, out_dir: Option<PathBuf>) -> PathBuf {
    out_dir.unwrap_or_else(|| PathBuf::from(&config.export.output_dir))
}

fn render_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_import(report: &ImportReport) -> String {
    let mut text = format!(
        "Import {}: {} ({} of {} rows accepted)",
        report.batch_id,
        report.stage,
        report.accepted_count(),
        report.total_rows
    );
    if !report.notices.is_empty() {
        text.push('\n');
        text.push_str(&render_notices(&report.notices));
    }
    text
}

fn render_export(prior: &[Notice], outcome: ExportOutcome, json: bool) -> Result<CommandOutput> {
    let success = outcome.success;
    let text = if json {
        serde_json::to_string_pretty(&outcome)
            .map_err(|e| AppError::Internal(format!("Failed to serialize outcome: {}", e)))?
    } else {
        let mut notices: Vec<Notice> = prior
            .iter()
            .filter(|n| n.severity != Severity::Success)
            .cloned()
            .collect();
        notices.push(outcome.notice);
        render_notices(&notices)
    };
    Ok(CommandOutput::new(text, success))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("agri-records-cli-{}", uuid::Uuid::new_v4()))
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["agri-records", "--config", "no-such-config.toml"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_preset_override_resets_required_fields() {
        let overrides = ImportOverrides {
            preset: Some(SchemaPreset::Contacts),
            required: None,
            keep_unknown: false,
            delimiter: None,
        };
        let import = import_config(&AppConfig::default(), &overrides).unwrap();
        assert_eq!(import.required_fields, vec!["name", "email"]);

        let overrides = ImportOverrides {
            required: Some(vec!["name".into(), " sku ".into()]),
            ..overrides
        };
        let import = import_config(&AppConfig::default(), &overrides).unwrap();
        assert_eq!(import.required_fields, vec!["name", "sku"]);
    }

    #[test]
    fn test_export_text_drops_import_success_notice() {
        let prior = vec![
            Notice::success("Import successful").with_description("2 records imported"),
            Notice::warning("Duplicate ids in file"),
        ];
        let outcome = ExportOutcome {
            success: true,
            receipt: None,
            notice: Notice::success("Export successful"),
        };
        let output = render_export(&prior, outcome, false).unwrap();
        assert_eq!(
            output.text,
            "[warning] Duplicate ids in file\n[success] Export successful"
        );
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_import_without_file_fails() {
        let output = execute(cli(&["import"])).await.unwrap();
        assert_eq!(output.exit_code, 1);
        assert!(output.text.contains("No file selected"));
    }

    #[tokio::test]
    async fn test_export_and_template_write_files() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("stock.csv");
        std::fs::write(&input, "name,category,price,sku\nSeed,Seeds,10,X\n,Seeds,5,Y\n").unwrap();

        let out = dir.display().to_string();
        let input_arg = input.display().to_string();
        let output = execute(cli(&[
            "export", &input_arg, "--fields", "name,price", "--name", "picked", "--out-dir", &out,
        ]))
        .await
        .unwrap();
        assert_eq!(output.exit_code, 0, "{}", output.text);
        assert!(output.text.contains("1 invalid rows skipped"));
        assert_eq!(
            std::fs::read_to_string(dir.join("picked.csv")).unwrap(),
            "name,price\nSeed,10\n"
        );

        let output = execute(cli(&["template", "--preset", "contacts", "--out-dir", &out]))
            .await
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert!(dir.join("contacts_template.csv").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_summary_json() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("stock.csv");
        std::fs::write(
            &input,
            "name,category,quantity,min_quantity,price\nUrea,Fertilizer,20,50,300\nSeed,Seeds,500,100,45.5\n",
        )
        .unwrap();

        let input_arg = input.display().to_string();
        let output = execute(cli(&["--json", "summary", &input_arg])).await.unwrap();
        assert_eq!(output.exit_code, 0);

        let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();
        assert_eq!(value["total_items"], 2);
        assert_eq!(value["low_stock"][0]["item"]["name"], "Urea");

        std::fs::remove_dir_all(&dir).ok();
    }
}

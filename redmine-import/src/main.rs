use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use redmine_import::api::RedmineClient;
use redmine_import::config::Config;
use redmine_import::import::Importer;
use redmine_import::sheet::ExcelSheet;

/// Import projects and issues into Redmine from a spreadsheet template.
#[derive(Parser)]
#[command(name = "redmine-import", version, about)]
struct Cli {
    /// Workbook to import (.xlsx/.xlsm)
    file: PathBuf,

    /// Worksheet name (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let client =
        RedmineClient::new(&config.redmine).context("Failed to set up the Redmine client")?;
    let sheet = ExcelSheet::open(&cli.file, cli.sheet.as_deref())?;

    println!("Importing {}", cli.file.display().to_string().cyan());
    let report = Importer::new(&client, &config.custom_fields)
        .run(&sheet)
        .await;

    println!();
    println!(
        "{} {}",
        "Processed issues:".bold(),
        report.processed.to_string().green()
    );
    if !report.failures.is_empty() {
        println!(
            "{} {}",
            "Failed rows:".bold(),
            report.failures.len().to_string().red()
        );
        for failure in &report.failures {
            println!("  {} {}", format!("row {}:", failure.row).red(), failure.error);
        }
    }

    if report.processed == 0 && !report.failures.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

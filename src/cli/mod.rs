use std::fs::File;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::api;
use crate::application::{ReportService, parse_report_date};
use crate::config::{Config, ServeConfig};
use crate::domain::{EntityId, LedgerEntry, format_cents};
use crate::io::export::export_entity_summary_csv;
use crate::io::import::{ImportOptions, ImportResult, Importer};

/// pmbackend - company records, documents and entity ledger reports
#[derive(Parser)]
#[command(name = "pmbackend")]
#[command(about = "REST backend for companies, company documents and entity ledger reports")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database tables and the upload directory
    Init,

    /// Run the HTTP API
    Serve(ServeConfig),

    /// Print the entity summary ledger
    Report {
        /// Entity id
        entity_id: EntityId,

        /// First day of the range (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: String,

        /// Last day of the range (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,
    },

    /// Load bank transactions or kitty entries from CSV
    Import {
        /// What the file contains
        #[arg(value_enum)]
        kind: ImportKind,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    /// entity_id,txn_date,narration,transaction_type,credit_amount,debit_amount,remarks
    Bank,
    /// entity_id,date_of_expense,transaction_type,amount,margin,remarks
    Kitty,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                self.config.repository().await?;
                tokio::fs::create_dir_all(&self.config.upload_dir)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to create upload directory {}",
                            self.config.upload_dir.display()
                        )
                    })?;
                println!("Database initialized: {}", self.config.database_url);
                println!("Upload directory: {}", self.config.upload_dir.display());
            }

            Commands::Serve(serve) => {
                tokio::fs::create_dir_all(&self.config.upload_dir)
                    .await
                    .context("Failed to create upload directory")?;
                let state = self.config.app_state().await?;
                api::serve(state, serve.bind, serve.max_body_bytes()).await?;
            }

            Commands::Report {
                entity_id,
                from,
                to,
                format,
            } => {
                let from_date = parse_report_date("from_date", &from)?;
                let to_date = parse_report_date("to_date", &to)?;
                let reports = ReportService::new(self.config.repository().await?);

                match format {
                    ReportFormat::Table => {
                        let summary = reports
                            .entity_summary_totals(entity_id, from_date, to_date)
                            .await?;
                        print_ledger(&summary.entries);
                        println!();
                        println!(
                            "Entries: {}  Credit: {}  Debit: {}  Net: {}",
                            summary.totals.entry_count,
                            format_cents(summary.totals.total_credit),
                            format_cents(summary.totals.total_debit),
                            format_cents(summary.totals.net)
                        );
                    }
                    ReportFormat::Json => {
                        let summary = reports
                            .entity_summary_totals(entity_id, from_date, to_date)
                            .await?;
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    }
                    ReportFormat::Csv => {
                        let entries = reports.entity_summary(entity_id, from_date, to_date).await?;
                        export_entity_summary_csv(&entries, io::stdout().lock())?;
                    }
                }
            }

            Commands::Import {
                kind,
                input,
                dry_run,
            } => {
                let repo = self.config.repository().await?;
                let importer = Importer::new(&repo);
                let reader: Box<dyn Read> = match &input {
                    Some(path) => Box::new(
                        File::open(path).with_context(|| format!("Failed to open {}", path))?,
                    ),
                    None => Box::new(io::stdin()),
                };
                let options = ImportOptions { dry_run };

                let result = match kind {
                    ImportKind::Bank => importer.import_bank_csv(reader, options).await?,
                    ImportKind::Kitty => importer.import_kitty_csv(reader, options).await?,
                };
                print_import_result(&result, dry_run);
            }
        }

        Ok(())
    }
}

fn print_ledger(entries: &[LedgerEntry]) {
    if entries.is_empty() {
        println!("No entries in range.");
        return;
    }

    println!(
        "{:<10}  {:<13}  {:<16}  {:>12}  {:>12}  DESCRIPTION",
        "DATE", "TYPE", "TRANSACTION", "CREDIT", "DEBIT"
    );
    println!("{}", "-".repeat(84));
    for entry in entries {
        println!(
            "{:<10}  {:<13}  {:<16}  {:>12}  {:>12}  {}",
            entry.date,
            entry.entry_type.as_str(),
            truncate(&entry.transaction_type_name, 16),
            format_cents(entry.credit_amount),
            format_cents(entry.debit_amount),
            entry.description.as_deref().unwrap_or("")
        );
    }
}

fn print_import_result(result: &ImportResult, dry_run: bool) {
    let verb = if dry_run { "Validated" } else { "Imported" };
    println!("{} {} row(s)", verb, result.imported);

    if !result.errors.is_empty() {
        eprintln!("{} row(s) failed:", result.errors.len());
        for err in &result.errors {
            match &err.field {
                Some(field) => eprintln!("  line {} [{}]: {}", err.line, field, err.error),
                None => eprintln!("  line {}: {}", err.line, err.error),
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

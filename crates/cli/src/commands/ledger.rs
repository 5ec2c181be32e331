//! Ledger command - inspect the record of announced pull requests

use anyhow::Result;
use pr_announcer_adapters::ledger::XmlLedgerStore;
use pr_announcer_domain::LedgerStore;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;

use crate::args::{LedgerArgs, LedgerCommands};
use crate::config::AppConfig;

pub async fn execute(args: LedgerArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        LedgerCommands::Show { path, json } => show_ledger(path, json, config_path).await,
    }
}

async fn show_ledger(path: Option<PathBuf>, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref()).unwrap_or_default();
    let path = path.unwrap_or(config.general.ledger_path);

    let ledger = XmlLedgerStore::new(&path).load().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&ledger)?);
        return Ok(());
    }

    println!("Ledger: {}", path.display());
    println!("Last successful run: {}", ledger.last_run_at.format(&Rfc3339)?);
    println!("Announced: {}", ledger.announced_ids.len());
    for id in &ledger.announced_ids {
        println!("  {}", id);
    }

    Ok(())
}

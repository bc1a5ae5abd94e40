//! Status command handler

use anyhow::Result;

use homes_core::storage::SCHEMA_VERSION;
use homes_core::{Config, ListingStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &ListingStore, config: &Config, output: &Output) -> Result<()> {
    let db = store.database();
    let path = db
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());
    let schema_version = db.schema_version()?;
    let count = store.count()?;
    let size = db
        .path()
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": path,
                    "database_size": size,
                    "schema_version": schema_version,
                    "authority": config.authority,
                    "counts": {
                        "listings": count
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", count);
        }
        OutputFormat::Human => {
            println!("Homes Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Database: {}", path);
            println!("  Size:     {}", format_size(size));
            println!(
                "  Schema:   v{} (supported v{})",
                schema_version.map_or_else(|| "?".to_string(), |v| v.to_string()),
                SCHEMA_VERSION
            );
            println!();
            println!("Keys:");
            println!("  Authority: {}", config.authority);
            println!();
            println!("Contents:");
            println!("  Listings: {}", count);
        }
    }

    Ok(())
}

/// Format a byte count for humans
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

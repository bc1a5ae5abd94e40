//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use homes_core::Listing;

/// Shown in place of an empty or missing county
const UNKNOWN_COUNTY: &str = "Unknown county";

/// Unit appended to income figures
const INCOME_UNIT: &str = "/mo";

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single listing
    pub fn print_listing(&self, listing: &Listing) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", listing.id);
                println!("Address:  {}", listing.address);
                println!("County:   {}", county_label(listing));
                println!("Type:     {}", listing.home_type);
                println!("Income:   {}", income_label(listing.income));
            }
            OutputFormat::Json => {
                print_json(listing);
            }
            OutputFormat::Quiet => {
                println!("{}", listing.id);
            }
        }
    }

    /// Print a list of listings
    pub fn print_listings(&self, listings: &[Listing]) {
        match self.format {
            OutputFormat::Human => {
                if listings.is_empty() {
                    println!("No listings found.");
                    return;
                }
                for listing in listings {
                    println!(
                        "{:>5} | {} | {} | {} | {}",
                        listing.id,
                        truncate(&listing.address, 35),
                        truncate(&county_label(listing), 20),
                        listing.home_type,
                        income_label(listing.income)
                    );
                }
                println!("\n{} listing(s)", listings.len());
            }
            OutputFormat::Json => {
                print_json(&listings);
            }
            OutputFormat::Quiet => {
                for listing in listings {
                    println!("{}", listing.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// County for display; empty or missing becomes "Unknown county"
pub fn county_label(listing: &Listing) -> String {
    match listing.county.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNKNOWN_COUNTY.to_string(),
    }
}

pub fn income_label(income: i64) -> String {
    format!("{}{}", income, INCOME_UNIT)
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

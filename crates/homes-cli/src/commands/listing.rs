//! Listing command handlers

use anyhow::{bail, Context, Result};

use homes_core::{
    Column, Comparison, Filter, HomeType, ListingId, ListingStore, ListingValues, ResourceKey,
    SortOrder,
};

use crate::output::{county_label, Output};
use crate::prompt::{confirm, is_interactive, prompt_with_default};

/// Filters and ordering for `homes list`
#[derive(Debug, Default)]
pub struct ListOptions {
    pub county: Option<String>,
    pub home_type: Option<i64>,
    pub min_income: Option<i64>,
    pub sort: Option<String>,
    pub desc: bool,
}

/// Field flags for `homes add` and `homes edit`
#[derive(Debug, Default)]
pub struct FieldArgs {
    pub address: Option<String>,
    pub county: Option<String>,
    pub clear_county: bool,
    pub home_type: Option<i64>,
    pub income: Option<i64>,
}

impl FieldArgs {
    fn into_values(self) -> ListingValues {
        let mut values = ListingValues::new();
        values.address = self.address;
        values.county = if self.clear_county {
            Some(None)
        } else {
            self.county.map(Some)
        };
        values.home_type = self.home_type;
        values.income = self.income;
        values
    }
}

/// Parse a home type given by name or by code
///
/// Unknown numbers pass through so the store reports them.
pub fn parse_type_arg(s: &str) -> Result<i64, String> {
    let name = s.trim().to_ascii_lowercase();
    if let Some(t) = HomeType::ALL
        .iter()
        .find(|t| t.label().eq_ignore_ascii_case(&name))
    {
        return Ok(t.code());
    }
    name.parse::<i64>()
        .map_err(|_| format!("'{}' is not a home type (unknown, single, multi or 0-2)", s))
}

/// List listings
pub fn list(store: &ListingStore, options: ListOptions, output: &Output) -> Result<()> {
    let mut filter = Filter::new();
    if let Some(county) = options.county {
        filter = filter.eq(Column::County, county);
    }
    if let Some(code) = options.home_type {
        filter = filter.eq(Column::Type, code);
    }
    if let Some(min) = options.min_income {
        filter = filter.with(Column::Income, Comparison::Ge, min);
    }

    let sort = match options.sort.as_deref() {
        Some(name) => {
            let column = Column::parse(name)
                .with_context(|| format!("Unknown sort column: '{}'", name))?;
            Some(if options.desc {
                SortOrder::desc(column)
            } else {
                SortOrder::asc(column)
            })
        }
        None if options.desc => Some(SortOrder::desc(Column::Id)),
        None => None,
    };

    let snapshot = store.query(&ResourceKey::Collection, Some(&filter), sort.as_ref())?;
    output.print_listings(&snapshot.into_vec());
    Ok(())
}

/// Show a single listing
pub fn show(store: &ListingStore, key: String, output: &Output) -> Result<()> {
    let id = parse_listing_key(store, &key)?;

    let listing = store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Listing not found: {}", key))?;

    output.print_listing(&listing);
    Ok(())
}

/// Add a new listing
pub fn add(store: &mut ListingStore, fields: FieldArgs, output: &Output) -> Result<()> {
    let mut values = fields.into_values();
    if values.home_type.is_none() {
        values.home_type = Some(HomeType::Unknown.code());
    }

    let id = store
        .insert(&ResourceKey::Collection, &values)
        .context("Error with saving listing")?;

    output.success(&format!("Listing saved: {}", id));
    if let Some(listing) = store.get(id)? {
        output.print_listing(&listing);
    }
    Ok(())
}

/// Edit a listing, from flags or interactively when none are given
pub fn edit(
    store: &mut ListingStore,
    key: String,
    fields: FieldArgs,
    output: &Output,
) -> Result<()> {
    let id = parse_listing_key(store, &key)?;

    let current = store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Listing not found: {}", key))?;

    let mut values = fields.into_values();
    if values.is_empty() && output.should_prompt() && is_interactive() {
        values = prompt_for_changes(&current)?;
    }

    if values.is_empty() {
        output.message("Nothing to change.");
        return Ok(());
    }

    let rows = store
        .update(&ResourceKey::Item(id), &values)
        .context("Error with updating listing")?;
    if rows == 0 {
        bail!("Listing not found: {}", key);
    }

    output.success("Listing updated");
    if let Some(listing) = store.get(id)? {
        output.print_listing(&listing);
    }
    Ok(())
}

/// Delete a listing
pub fn delete(store: &mut ListingStore, key: String, yes: bool, output: &Output) -> Result<()> {
    let id = parse_listing_key(store, &key)?;

    let listing = store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Listing not found: {}", key))?;

    if !yes && output.should_prompt() {
        println!("Delete listing: {} - {}", listing.id, listing.address);
        if !confirm("Delete this listing?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let rows = store
        .delete(&ResourceKey::Item(id), None)
        .context("Error with deleting listing")?;

    if rows == 0 {
        bail!("Listing not found: {}", key);
    }
    output.success(&format!("Listing deleted: {}", id));
    Ok(())
}

/// Delete every listing
pub fn clear(store: &mut ListingStore, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() {
        let count = store.count()?;
        if count == 0 {
            output.message("No listings to delete.");
            return Ok(());
        }
        if !confirm(&format!("Delete all {} listing(s)?", count))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let rows = store.delete_all().context("Error with deleting listings")?;
    output.success(&format!("Deleted {} listing(s)", rows));
    Ok(())
}

/// Insert the sample listing
pub fn dummy(store: &mut ListingStore, output: &Output) -> Result<()> {
    let values = ListingValues::new()
        .address("123 Fake Street")
        .county("Springfield")
        .home_type(HomeType::Single)
        .income(1337);

    let id = store.insert(&ResourceKey::Collection, &values)?;
    output.success(&format!("Inserted sample listing: {}", id));
    Ok(())
}

/// Print the media type for a key
pub fn media_type(store: &ListingStore, key: String, output: &Output) -> Result<()> {
    let resolved = store.resolve(&key)?;
    let media_type = store.get_type(&resolved);

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "key": resolved.to_key(),
                "uri": store.resolver().qualify(&resolved),
                "media_type": media_type.as_str(),
                "list": media_type.is_list()
            })
        );
    } else {
        println!("{}", media_type);
    }
    Ok(())
}

/// Accept a bare id, a short key or a fully qualified key
fn parse_listing_key(store: &ListingStore, key: &str) -> Result<ListingId> {
    if let Ok(id) = key.parse::<ListingId>() {
        return Ok(id);
    }

    match store.resolve(key)? {
        ResourceKey::Item(id) => Ok(id),
        ResourceKey::Collection => bail!("Expected a single listing, got '{}'", key),
    }
}

/// Walk the user through each field, keeping current values on Enter
fn prompt_for_changes(current: &homes_core::Listing) -> Result<ListingValues> {
    println!("Editing listing: {}", current.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut values = ListingValues::new();

    if let Some(address) = prompt_with_default("Address", &current.address)? {
        values.address = Some(address);
    }

    if let Some(county) = prompt_with_default("County ('-' to clear)", &county_label(current))? {
        values.county = Some(if county == "-" { None } else { Some(county) });
    }

    if let Some(home_type) = prompt_with_default("Type", current.home_type.label())? {
        let code = parse_type_arg(&home_type).map_err(anyhow::Error::msg)?;
        values.home_type = Some(code);
    }

    if let Some(income) = prompt_with_default("Income", &current.income.to_string())? {
        let income = income
            .parse::<i64>()
            .with_context(|| format!("Income must be a whole number, got '{}'", income))?;
        values.income = Some(income);
    }

    Ok(values)
}

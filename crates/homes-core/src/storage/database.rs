//! SQLite access for the listings table
//!
//! Row-level reads and writes with no validation or notification; the
//! [`ListingStore`](crate::ListingStore) layers those on top. Every
//! statement binds its values as parameters.

use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use tracing::{debug, info};

use crate::models::{HomeType, Listing, ListingId};
use crate::query::{Filter, SortOrder};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{ensure_schema, get_schema_version};
use crate::validation::{ListingChanges, NewListing};

const SELECT_LISTINGS: &str = "SELECT _id, address, county, type, income FROM listings";

/// Connection to the listings database
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
            }
        }

        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.bootstrap()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        db.bootstrap()?;
        Ok(db)
    }

    fn bootstrap(&self) -> StorageResult<()> {
        if ensure_schema(&self.conn)? {
            info!(path = ?self.path, "Initialized listings schema");
        }
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> StorageResult<Option<i32>> {
        Ok(get_schema_version(&self.conn)?)
    }

    // ==================== Reads ====================

    /// Select listings matching `filter`, ordered by `sort` or by id
    pub fn select(&self, filter: &Filter, sort: Option<&SortOrder>) -> StorageResult<Vec<Listing>> {
        let (clause, params) = filter.to_sql();
        let order = sort
            .map(SortOrder::to_sql)
            .unwrap_or_else(|| " ORDER BY _id ASC".to_string());
        let sql = format!("{}{}{}", SELECT_LISTINGS, clause, order);
        debug!(%sql, params = params.len(), "Selecting listings");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), listing_from_row)?;

        let mut listings = Vec::new();
        for row in rows {
            listings.push(row?);
        }
        Ok(listings)
    }

    /// Count listings matching `filter`
    pub fn count(&self, filter: &Filter) -> StorageResult<u64> {
        let (clause, params) = filter.to_sql();
        let sql = format!("SELECT COUNT(*) FROM listings{}", clause);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    // ==================== Writes ====================

    /// Insert a validated listing, returning its new id
    pub fn insert(&self, listing: &NewListing) -> StorageResult<ListingId> {
        self.conn.execute(
            "INSERT INTO listings (address, county, type, income) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                listing.address,
                listing.county,
                listing.home_type.code(),
                listing.income,
            ],
        )?;
        Ok(ListingId(self.conn.last_insert_rowid()))
    }

    /// Apply validated changes to rows matching `filter`
    ///
    /// Returns rows affected; an empty change set writes nothing.
    pub fn update(&self, changes: &ListingChanges, filter: &Filter) -> StorageResult<usize> {
        let mut assignments: Vec<(&str, Value)> = Vec::new();
        if let Some(address) = &changes.address {
            assignments.push(("address", Value::Text(address.clone())));
        }
        if let Some(county) = &changes.county {
            assignments.push(("county", county.clone().map_or(Value::Null, Value::Text)));
        }
        if let Some(home_type) = changes.home_type {
            assignments.push(("type", Value::Integer(home_type.code())));
        }
        if let Some(income) = changes.income {
            assignments.push(("income", Value::Integer(income)));
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        let (set_clause, mut params): (Vec<String>, Vec<Value>) = assignments
            .into_iter()
            .enumerate()
            .map(|(i, (column, value))| (format!("\"{}\" = ?{}", column, i + 1), value))
            .unzip();

        // Filter placeholders are numbered after the SET placeholders
        let (where_clause, filter_params) = filter.to_sql_from(params.len() + 1);
        params.extend(filter_params);

        let sql = format!(
            "UPDATE listings SET {}{}",
            set_clause.join(", "),
            where_clause
        );
        debug!(%sql, "Updating listings");

        Ok(self.conn.execute(&sql, params_from_iter(params.iter()))?)
    }

    /// Delete rows matching `filter`; an empty filter deletes every row
    pub fn delete(&self, filter: &Filter) -> StorageResult<usize> {
        let (clause, params) = filter.to_sql();
        let sql = format!("DELETE FROM listings{}", clause);
        debug!(%sql, "Deleting listings");

        Ok(self.conn.execute(&sql, params_from_iter(params.iter()))?)
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<Listing> {
    let code: i64 = row.get(3)?;
    let home_type = HomeType::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            format!("invalid home type {}", code).into(),
        )
    })?;

    Ok(Listing {
        id: ListingId(row.get(0)?),
        address: row.get(1)?,
        county: row.get(2)?,
        home_type,
        income: row.get(4)?,
    })
}

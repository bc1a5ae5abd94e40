//! Listing store
//!
//! The `ListingStore` is the only way callers touch listings. It:
//! - resolves keys once with its [`KeyResolver`]
//! - validates every payload before a write is attempted
//! - runs each mutation as a single statement (atomic on its own)
//! - notifies observers of the affected scope when rows actually changed
//!
//! Reads take `&self`; writes take `&mut self`, so one store value has one
//! writer at a time. Writers in other processes are serialised by SQLite.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ListingStore::open()?;
//!
//! let id = store.insert(
//!     &ResourceKey::Collection,
//!     &ListingValues::new().address("1 Main St").home_type(HomeType::Single),
//! )?;
//!
//! let mut changes = store.subscribe(Scope::Item(id));
//! store.update(&ResourceKey::Item(id), &ListingValues::new().income(600))?;
//! assert!(changes.try_next().is_some());
//! ```

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::Config;
use crate::contract::{KeyResolver, MediaType, ResourceKey};
use crate::error::{Operation, StoreError, StoreResult};
use crate::models::{Listing, ListingId, ListingValues};
use crate::notify::{Change, ChangeKind, NotificationHub, Scope, Subscription};
use crate::query::{Filter, SortOrder};
use crate::storage::database::Database;
use crate::validation::{validate_changes, validate_new};

/// Result of a query: an owned, re-iterable set of rows and the scope it
/// was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    scope: Scope,
    listings: Vec<Listing>,
}

impl Snapshot {
    /// Scope to subscribe to for invalidation of this snapshot
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn first(&self) -> Option<&Listing> {
        self.listings.first()
    }

    pub fn into_vec(self) -> Vec<Listing> {
        self.listings
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

impl IntoIterator for Snapshot {
    type Item = Listing;
    type IntoIter = std::vec::IntoIter<Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.into_iter()
    }
}

/// Validated, change-notifying access to the listings collection
pub struct ListingStore {
    db: Database,
    resolver: KeyResolver,
    hub: NotificationHub,
}

impl ListingStore {
    /// Open the store using configuration from the default location
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
    }

    /// Open the store described by `config`
    pub fn open_with_config(config: &Config) -> anyhow::Result<Self> {
        let path = config.database_path();
        let db = Database::open(&path)
            .with_context(|| format!("Failed to open listings database at {:?}", path))?;
        Ok(Self::with_database(db, KeyResolver::new(&config.authority)))
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::with_database(
            Database::open_in_memory()?,
            KeyResolver::default(),
        ))
    }

    pub fn with_database(db: Database, resolver: KeyResolver) -> Self {
        Self {
            db,
            resolver,
            hub: NotificationHub::new(),
        }
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Resolve a key string with this store's resolver
    pub fn resolve(&self, key: &str) -> StoreResult<ResourceKey> {
        self.resolver.resolve(key)
    }

    /// Media type for the shape of `key`
    pub fn get_type(&self, key: &ResourceKey) -> MediaType {
        self.resolver.media_type(key)
    }

    /// Register for change notifications at `scope`
    pub fn subscribe(&self, scope: Scope) -> Subscription {
        self.hub.subscribe(scope)
    }

    /// Shared handle to the notification hub
    pub fn notifications(&self) -> &NotificationHub {
        &self.hub
    }

    // ==================== Reads ====================

    /// Query listings under `key`, optionally filtered and sorted
    ///
    /// An item key restricts the result to that listing. Without a sort
    /// order rows come back in id order.
    pub fn query(
        &self,
        key: &ResourceKey,
        filter: Option<&Filter>,
        sort: Option<&SortOrder>,
    ) -> StoreResult<Snapshot> {
        let filter = scoped_filter(key, filter);
        let listings = self.db.select(&filter, sort).map_err(storage_failure)?;
        debug!(%key, rows = listings.len(), "Queried listings");

        Ok(Snapshot {
            scope: Scope::from(key),
            listings,
        })
    }

    /// Fetch one listing by id
    pub fn get(&self, id: ListingId) -> StoreResult<Option<Listing>> {
        Ok(self
            .query(&ResourceKey::Item(id), None, None)?
            .into_iter()
            .next())
    }

    /// Number of listings in the collection
    pub fn count(&self) -> StoreResult<u64> {
        self.db.count(&Filter::new()).map_err(storage_failure)
    }

    // ==================== Writes ====================

    /// Validate and insert a new listing into the collection
    pub fn insert(&mut self, key: &ResourceKey, values: &ListingValues) -> StoreResult<ListingId> {
        if !matches!(key, ResourceKey::Collection) {
            return Err(StoreError::unsupported(Operation::Insert, key.to_key()));
        }

        let listing = validate_new(values)?;
        let id = self.db.insert(&listing).map_err(storage_failure)?;
        debug!(%id, "Inserted listing");

        self.hub.notify(Change {
            scope: Scope::Collection,
            kind: ChangeKind::Inserted,
            rows: 1,
        });
        Ok(id)
    }

    /// Apply the supplied fields of `values` to one listing
    ///
    /// Returns 1 when the listing existed, 0 when it did not or when
    /// `values` is empty. Only an actual change is notified.
    pub fn update(&mut self, key: &ResourceKey, values: &ListingValues) -> StoreResult<usize> {
        let ResourceKey::Item(id) = *key else {
            return Err(StoreError::unsupported(Operation::Update, key.to_key()));
        };

        let changes = validate_changes(values)?;
        if changes.is_empty() {
            return Ok(0);
        }

        let rows = self
            .db
            .update(&changes, &Filter::new().id(id))
            .map_err(storage_failure)?;
        debug!(%id, rows, "Updated listing");

        if rows > 0 {
            self.hub.notify(Change {
                scope: Scope::Item(id),
                kind: ChangeKind::Updated,
                rows,
            });
        }
        Ok(rows)
    }

    /// Delete the listing at an item key, or every listing matching
    /// `filter` at the collection key (all of them without a filter)
    pub fn delete(&mut self, key: &ResourceKey, filter: Option<&Filter>) -> StoreResult<usize> {
        let scoped = scoped_filter(key, filter);
        let rows = self.db.delete(&scoped).map_err(storage_failure)?;
        debug!(%key, rows, "Deleted listings");

        if rows > 0 {
            self.hub.notify(Change {
                scope: Scope::from(key),
                kind: ChangeKind::Deleted,
                rows,
            });
        }
        Ok(rows)
    }

    /// Delete every listing
    pub fn delete_all(&mut self) -> StoreResult<usize> {
        self.delete(&ResourceKey::Collection, None)
    }
}

fn scoped_filter(key: &ResourceKey, filter: Option<&Filter>) -> Filter {
    let base = match key {
        ResourceKey::Collection => Filter::new(),
        ResourceKey::Item(id) => Filter::new().id(*id),
    };
    match filter {
        Some(extra) => base.and(extra),
        None => base,
    }
}

fn storage_failure(error: crate::storage::StorageError) -> StoreError {
    warn!("Storage operation failed: {}", error);
    StoreError::Storage(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HomeType;
    use crate::query::Column;

    fn main_st() -> ListingValues {
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single)
            .income(500)
    }

    #[test]
    fn test_insert_then_get() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let id = store
            .insert(&ResourceKey::Collection, &main_st().county("Springfield"))
            .unwrap();

        let listing = store.get(id).unwrap().unwrap();
        assert_eq!(listing.id, id);
        assert_eq!(listing.address, "1 Main St");
        assert_eq!(listing.county.as_deref(), Some("Springfield"));
        assert_eq!(listing.home_type, HomeType::Single);
        assert_eq!(listing.income, 500);
    }

    #[test]
    fn test_insert_on_item_key_unsupported() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let err = store.insert(&ResourceKey::item(1), &main_st()).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_on_collection_unsupported() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let err = store
            .update(&ResourceKey::Collection, &ListingValues::new().income(1))
            .unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_validation_runs_before_write() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let mut sub = store.subscribe(Scope::Collection);

        let err = store
            .insert(&ResourceKey::Collection, &main_st().type_code(9))
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(store.count().unwrap(), 0);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_update_missing_id_returns_zero() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let mut sub = store.subscribe(Scope::Collection);

        let rows = store
            .update(&ResourceKey::item(404), &ListingValues::new().income(10))
            .unwrap();

        assert_eq!(rows, 0);
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn test_update_can_clear_county() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let id = store
            .insert(&ResourceKey::Collection, &main_st().county("Springfield"))
            .unwrap();

        store
            .update(&ResourceKey::Item(id), &ListingValues::new().clear_county())
            .unwrap();

        assert_eq!(store.get(id).unwrap().unwrap().county, None);
    }

    #[test]
    fn test_query_filter_and_sort() {
        let mut store = ListingStore::open_in_memory().unwrap();
        for (address, income, home_type) in [
            ("A St", 300, HomeType::Single),
            ("B St", 100, HomeType::Multi),
            ("C St", 200, HomeType::Single),
        ] {
            store
                .insert(
                    &ResourceKey::Collection,
                    &ListingValues::new()
                        .address(address)
                        .income(income)
                        .home_type(home_type),
                )
                .unwrap();
        }

        let singles = store
            .query(
                &ResourceKey::Collection,
                Some(&Filter::new().home_type(HomeType::Single)),
                Some(&SortOrder::asc(Column::Income)),
            )
            .unwrap();

        let addresses: Vec<_> = singles.iter().map(|l| l.address.as_str()).collect();
        assert_eq!(addresses, vec!["C St", "A St"]);
        assert_eq!(singles.scope(), Scope::Collection);

        // Snapshots can be walked more than once
        assert_eq!(singles.iter().count(), singles.iter().count());
    }

    #[test]
    fn test_query_item_key() {
        let mut store = ListingStore::open_in_memory().unwrap();
        let id = store.insert(&ResourceKey::Collection, &main_st()).unwrap();
        store.insert(&ResourceKey::Collection, &main_st()).unwrap();

        let snapshot = store.query(&ResourceKey::Item(id), None, None).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.scope(), Scope::Item(id));

        let none = store.query(&ResourceKey::item(999), None, None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_delete_with_filter() {
        let mut store = ListingStore::open_in_memory().unwrap();
        store
            .insert(&ResourceKey::Collection, &main_st().county("Springfield"))
            .unwrap();
        store
            .insert(&ResourceKey::Collection, &main_st().county("Shelbyville"))
            .unwrap();

        let removed = store
            .delete(
                &ResourceKey::Collection,
                Some(&Filter::new().eq(Column::County, "Springfield".to_string())),
            )
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_get_type() {
        let store = ListingStore::open_in_memory().unwrap();
        let key = store.resolve("listings/5").unwrap();

        assert!(!store.get_type(&key).is_list());
        assert!(store.get_type(&ResourceKey::Collection).is_list());
        assert!(store.resolve("agents").unwrap_err().is_unsupported());
    }

    #[test]
    fn test_open_with_config_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let id = {
            let mut store = ListingStore::open_with_config(&config).unwrap();
            store.insert(&ResourceKey::Collection, &main_st()).unwrap()
        };

        let store = ListingStore::open_with_config(&config).unwrap();
        assert_eq!(store.get(id).unwrap().unwrap().address, "1 Main St");
        assert!(config.database_path().exists());
    }
}

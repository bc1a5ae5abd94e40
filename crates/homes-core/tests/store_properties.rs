//! End-to-end behaviour of the listing store through its public API

use homes_core::{
    ChangeKind, HomeType, ListingStore, ListingValues, ResourceKey, Scope, ValidationError,
};

fn store() -> ListingStore {
    ListingStore::open_in_memory().unwrap()
}

fn insert(store: &mut ListingStore, values: ListingValues) -> ResourceKey {
    let id = store.insert(&ResourceKey::Collection, &values).unwrap();
    ResourceKey::Item(id)
}

#[test]
fn invalid_types_are_rejected() {
    let mut store = store();

    for code in [-3, -1, 3, 4, 1000] {
        let err = store
            .insert(
                &ResourceKey::Collection,
                &ListingValues::new().address("1 Main St").type_code(code),
            )
            .unwrap_err();
        assert!(err.is_validation(), "type {} should fail validation", code);
    }

    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn valid_candidates_read_back_unchanged() {
    let mut store = store();

    for home_type in HomeType::ALL {
        for income in [None, Some(0), Some(1337)] {
            for county in [None, Some("Springfield"), Some("")] {
                let mut values = ListingValues::new()
                    .address("742 Evergreen Terrace")
                    .home_type(home_type);
                if let Some(income) = income {
                    values = values.income(income);
                }
                if let Some(county) = county {
                    values = values.county(county);
                }

                let key = insert(&mut store, values);
                let listing = store.query(&key, None, None).unwrap().into_vec().remove(0);

                assert_eq!(Some(listing.id), key.id());
                assert_eq!(listing.address, "742 Evergreen Terrace");
                assert_eq!(listing.county.as_deref(), county);
                assert_eq!(listing.home_type, home_type);
                assert_eq!(listing.income, income.unwrap_or(0));
            }
        }
    }
}

#[test]
fn missing_address_and_negative_income_are_rejected() {
    let mut store = store();

    let err = store
        .insert(
            &ResourceKey::Collection,
            &ListingValues::new().home_type(HomeType::Multi),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        homes_core::StoreError::Validation(ValidationError::AddressRequired)
    ));

    let err = store
        .insert(
            &ResourceKey::Collection,
            &ListingValues::new()
                .address("1 Main St")
                .home_type(HomeType::Multi)
                .income(-1),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        homes_core::StoreError::Validation(ValidationError::InvalidIncome(-1))
    ));
}

#[test]
fn delete_is_idempotent() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );

    assert_eq!(store.delete(&key, None).unwrap(), 1);
    assert!(store.query(&key, None, None).unwrap().is_empty());
    assert!(store
        .query(&ResourceKey::Collection, None, None)
        .unwrap()
        .is_empty());

    assert_eq!(store.delete(&key, None).unwrap(), 0);
}

#[test]
fn partial_update_preserves_other_fields() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single)
            .income(500),
    );

    assert_eq!(
        store.update(&key, &ListingValues::new().income(600)).unwrap(),
        1
    );

    let listing = store.get(key.id().unwrap()).unwrap().unwrap();
    assert_eq!(listing.address, "1 Main St");
    assert_eq!(listing.home_type, HomeType::Single);
    assert_eq!(listing.income, 600);
}

#[test]
fn negative_income_update_leaves_record_unchanged() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single)
            .income(500),
    );
    let before = store.get(key.id().unwrap()).unwrap();

    let err = store
        .update(&key, &ListingValues::new().income(-5))
        .unwrap_err();
    assert!(err.is_validation());

    // Fields validated together: a good field alongside a bad one is not applied
    let err = store
        .update(&key, &ListingValues::new().address("2 Main St").income(-5))
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(store.get(key.id().unwrap()).unwrap(), before);
}

#[test]
fn bulk_delete_clears_collection() {
    for n in [0usize, 1, 5] {
        let mut store = store();
        for i in 0..n {
            insert(
                &mut store,
                ListingValues::new()
                    .address(format!("{} Main St", i + 1))
                    .home_type(HomeType::Multi),
            );
        }

        assert_eq!(store.delete_all().unwrap(), n);
        assert!(store
            .query(&ResourceKey::Collection, None, None)
            .unwrap()
            .is_empty());
    }
}

#[test]
fn insert_notifies_collection_once() {
    let mut store = store();
    let mut collection = store.subscribe(Scope::Collection);

    insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );

    let changes = collection.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Inserted);
    assert_eq!(changes[0].scope, Scope::Collection);
}

#[test]
fn update_notifies_collection_and_item_once_each() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );
    let other = insert(
        &mut store,
        ListingValues::new()
            .address("2 Main St")
            .home_type(HomeType::Single),
    );

    let mut collection = store.subscribe(Scope::Collection);
    let mut item = store.subscribe(Scope::from(key));
    let mut other_item = store.subscribe(Scope::from(other));

    store.update(&key, &ListingValues::new().income(10)).unwrap();

    assert_eq!(collection.drain().len(), 1);
    let item_changes = item.drain();
    assert_eq!(item_changes.len(), 1);
    assert_eq!(item_changes[0].kind, ChangeKind::Updated);
    assert!(other_item.drain().is_empty());
}

#[test]
fn no_op_updates_notify_nobody() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );

    let mut collection = store.subscribe(Scope::Collection);
    let mut item = store.subscribe(Scope::from(key));

    assert_eq!(store.update(&key, &ListingValues::new()).unwrap(), 0);
    assert_eq!(
        store
            .update(&ResourceKey::item(9_999), &ListingValues::new().income(1))
            .unwrap(),
        0
    );
    assert_eq!(store.delete(&ResourceKey::item(9_999), None).unwrap(), 0);

    assert!(collection.drain().is_empty());
    assert!(item.drain().is_empty());
}

#[test]
fn deletes_notify_observers() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );

    let mut collection = store.subscribe(Scope::Collection);
    let mut item = store.subscribe(Scope::from(key));

    store.delete(&key, None).unwrap();
    assert_eq!(collection.drain().len(), 1);
    assert_eq!(item.drain().len(), 1);

    insert(
        &mut store,
        ListingValues::new()
            .address("2 Main St")
            .home_type(HomeType::Single),
    );
    collection.drain();

    store.delete_all().unwrap();
    let changes = collection.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::Deleted);
    assert_eq!(changes[0].rows, 1);
}

#[test]
fn ids_are_never_reused() {
    let mut store = store();
    let values = ListingValues::new()
        .address("1 Main St")
        .home_type(HomeType::Single);

    let first = insert(&mut store, values.clone());
    store.delete_all().unwrap();
    let second = insert(&mut store, values);

    assert!(second.id().unwrap() > first.id().unwrap());
}

#[test]
fn unknown_keys_are_unsupported() {
    let store = store();

    for key in ["agents", "listings/x", "listings/1/notes"] {
        assert!(store.resolve(key).unwrap_err().is_unsupported());
    }
}

#[test]
fn write_faults_are_storage_errors() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );
    let mut collection = store.subscribe(Scope::Collection);

    store
        .database()
        .connection()
        .execute_batch("DROP TABLE listings")
        .unwrap();

    let err = store
        .insert(
            &ResourceKey::Collection,
            &ListingValues::new()
                .address("2 Main St")
                .home_type(HomeType::Multi),
        )
        .unwrap_err();
    assert!(err.is_storage());
    assert!(!err.is_validation());

    let err = store
        .update(&key, &ListingValues::new().income(10))
        .unwrap_err();
    assert!(err.is_storage());
    assert!(!err.is_validation());

    let err = store.delete_all().unwrap_err();
    assert!(err.is_storage());
    assert!(!err.is_validation());

    assert!(collection.drain().is_empty());
}

#[test]
fn item_delete_is_scoped_to_that_item() {
    let mut store = store();
    let key = insert(
        &mut store,
        ListingValues::new()
            .address("1 Main St")
            .home_type(HomeType::Single),
    );
    let other = insert(
        &mut store,
        ListingValues::new()
            .address("2 Main St")
            .home_type(HomeType::Single),
    );

    let mut collection = store.subscribe(Scope::Collection);
    let mut other_item = store.subscribe(Scope::from(other));

    store.delete(&key, None).unwrap();

    let changes = collection.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].scope, Scope::from(key));
    assert_eq!(changes[0].kind, ChangeKind::Deleted);
    assert!(other_item.drain().is_empty());
}

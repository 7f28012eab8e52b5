use chrono::NaiveDate;

use super::*;
use crate::categories::{Category, CategoryKind};
use crate::errors::{Error, ValidationError};
use crate::transactions::{Expense, EXPENSE_STATUS_VALID};
use crate::users::User;

fn expense(user_id: i64, amount: f64, day: u32) -> Expense {
    Expense {
        id: None,
        user_id,
        category_id: Some(1),
        amount,
        label: format!("expense {}", day),
        date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
        status: EXPENSE_STATUS_VALID.to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn add_assigns_ids_and_timestamps() {
    let store = MemoryLocalStore::new();
    let first = store.insert_typed(expense(1, 10.0, 1)).await.unwrap();
    let second = store.insert_typed(expense(1, 20.0, 2)).await.unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
    assert!(first.created_at.is_some());
    assert!(first.updated_at.is_some());
}

#[tokio::test]
async fn unique_email_is_enforced() {
    let store = MemoryLocalStore::new();
    store
        .insert_typed(User::new("a@example.com", "hash", "fr"))
        .await
        .unwrap();
    let err = store
        .insert_typed(User::new("a@example.com", "other", "fr"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn category_name_is_unique_per_kind_only() {
    let store = MemoryLocalStore::new();
    store
        .insert_typed(Category::new("Autres", CategoryKind::Expense, "#000"))
        .await
        .unwrap();
    store
        .insert_typed(Category::new("Autres", CategoryKind::Revenue, "#000"))
        .await
        .unwrap();
    let err = store
        .insert_typed(Category::new("Autres", CategoryKind::Expense, "#fff"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn update_without_id_is_rejected() {
    let store = MemoryLocalStore::new();
    let err = store.save_typed(expense(1, 5.0, 3)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingField(_))));
}

#[tokio::test]
async fn update_is_a_blind_upsert() {
    let store = MemoryLocalStore::new();
    let mut e = expense(1, 5.0, 3);
    e.id = Some(42);
    let saved = store.save_typed(e).await.unwrap();
    assert_eq!(saved.id, Some(42));

    let fetched: Option<Expense> = store.fetch_typed(42).await.unwrap();
    assert_eq!(fetched.unwrap().amount, 5.0);

    // Ids assigned afterwards do not collide with the upserted one.
    let next = store.insert_typed(expense(1, 1.0, 4)).await.unwrap();
    assert_eq!(next.id, Some(43));
}

#[tokio::test]
async fn index_lookup_and_unknown_index() {
    let store = MemoryLocalStore::new();
    store.insert_typed(expense(1, 10.0, 1)).await.unwrap();
    store.insert_typed(expense(2, 10.0, 2)).await.unwrap();
    store.insert_typed(expense(1, 30.0, 3)).await.unwrap();

    let mine: Vec<Expense> = store.find_typed("user_id", 1.into()).await.unwrap();
    assert_eq!(mine.len(), 2);

    let tens = store
        .get_by_index(Collection::Expenses, "amount", IndexValue::Int(10))
        .await
        .unwrap();
    assert_eq!(tens.len(), 2);

    let err = store
        .get_by_index(Collection::Expenses, "email", "x".into())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownIndex { .. })
    ));
}

#[tokio::test]
async fn pagination_and_count() {
    let store = MemoryLocalStore::new();
    for day in 1..=5 {
        store.insert_typed(expense(1, day as f64, day)).await.unwrap();
    }

    let page = store
        .get_paginated(Collection::Expenses, None, 2, 1)
        .await
        .unwrap();
    let ids: Vec<i64> = page.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec![2, 3]);

    let empty = store
        .get_paginated(Collection::Expenses, None, 0, 0)
        .await
        .unwrap();
    assert!(empty.is_empty());

    assert_eq!(store.count(Collection::Expenses, None).await.unwrap(), 5);
    assert_eq!(
        store
            .count(Collection::Expenses, Some(IndexFilter::user(2)))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn delete_of_unknown_id_succeeds() {
    let store = MemoryLocalStore::new();
    store.delete_record(Collection::Goals, 999).await.unwrap();

    let saved = store.insert_typed(expense(1, 10.0, 1)).await.unwrap();
    store
        .delete_record(Collection::Expenses, saved.id.unwrap())
        .await
        .unwrap();
    assert_eq!(store.count(Collection::Expenses, None).await.unwrap(), 0);
}

#[tokio::test]
async fn key_value_store_round_trip() {
    let kv = MemoryKeyValueStore::new();
    assert_eq!(kv.get_value("k").await.unwrap(), None);
    kv.set_value("k", "v").await.unwrap();
    assert_eq!(kv.get_value("k").await.unwrap().as_deref(), Some("v"));
    kv.remove_value("k").await.unwrap();
    assert_eq!(kv.get_value("k").await.unwrap(), None);
}

use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;

use super::SqliteLocalStore;
use mesfactures_core::categories::{Category, CategoryKind};
use mesfactures_core::errors::{Error, ValidationError};
use mesfactures_core::goals::{Goal, NewGoal};
use mesfactures_core::store::{
    Collection, IndexFilter, IndexValue, KeyValueStoreTrait, LocalStoreExt, LocalStoreTrait,
};
use mesfactures_core::transactions::{Expense, EXPENSE_STATUS_VALID};
use mesfactures_core::users::User;

fn temp_store() -> (TempDir, SqliteLocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesfactures.db");
    let store = SqliteLocalStore::new(path.to_string_lossy().into_owned());
    (dir, store)
}

fn expense(user_id: i64, amount: f64, day: u32) -> Expense {
    Expense {
        id: None,
        user_id,
        category_id: None,
        amount,
        label: format!("Courses {}", day),
        date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        status: EXPENSE_STATUS_VALID.to_string(),
        created_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn concurrent_initialize_runs_schema_setup_once() {
    let (_dir, store) = temp_store();
    let store = Arc::new(store);

    let calls = (0..8).map(|_| {
        let store = Arc::clone(&store);
        async move { store.initialize().await }
    });
    for result in futures::future::join_all(calls).await {
        result.unwrap();
    }

    assert_eq!(store.schema_passes(), 1);
}

#[tokio::test]
async fn unreachable_path_reports_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = SqliteLocalStore::new(blocker.join("app.db").to_string_lossy().into_owned());

    let err = store.initialize().await.unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
}

#[tokio::test]
async fn add_assigns_increasing_ids() {
    let (_dir, store) = temp_store();
    let first = store.insert_typed(expense(1, 12.5, 1)).await.unwrap();
    let second = store.insert_typed(expense(1, 30.0, 2)).await.unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
    assert!(first.created_at.is_some());
    assert_eq!(first.category_id, None);
}

#[tokio::test]
async fn duplicate_email_is_a_constraint_violation() {
    let (_dir, store) = temp_store();
    store
        .insert_typed(User::new("marie@example.com", "hash", "fr"))
        .await
        .unwrap();
    let err = store
        .insert_typed(User::new("marie@example.com", "hash2", "fr"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn category_uniqueness_is_per_kind() {
    let (_dir, store) = temp_store();
    store
        .insert_typed(Category::new("Autres", CategoryKind::Expense, "#6b7280"))
        .await
        .unwrap();
    store
        .insert_typed(Category::new("Autres", CategoryKind::Revenue, "#6b7280"))
        .await
        .unwrap();
    let err = store
        .insert_typed(Category::new("Autres", CategoryKind::Expense, "#000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
}

#[tokio::test]
async fn index_lookup_filters_rows() {
    let (_dir, store) = temp_store();
    store.insert_typed(expense(1, 10.0, 1)).await.unwrap();
    store.insert_typed(expense(2, 20.0, 2)).await.unwrap();
    store.insert_typed(expense(1, 30.0, 3)).await.unwrap();

    let mine: Vec<Expense> = store.find_typed("user_id", IndexValue::Int(1)).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|e| e.user_id == 1));

    let by_amount: Vec<Expense> = store.find_typed("amount", IndexValue::Int(20)).await.unwrap();
    assert_eq!(by_amount.len(), 1);

    let by_date: Vec<Expense> = store
        .find_typed("date", NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().into())
        .await
        .unwrap();
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].amount, 30.0);
}

#[tokio::test]
async fn unknown_index_is_rejected() {
    let (_dir, store) = temp_store();
    let err = store
        .get_by_index(Collection::Expenses, "email", IndexValue::from("x"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownIndex { .. })
    ));
}

#[tokio::test]
async fn pagination_and_count() {
    let (_dir, store) = temp_store();
    for day in 1..=5 {
        store.insert_typed(expense(1, day as f64, day)).await.unwrap();
    }
    store.insert_typed(expense(2, 99.0, 6)).await.unwrap();

    let page = store
        .get_paginated(Collection::Expenses, Some(IndexFilter::user(1)), 2, 1)
        .await
        .unwrap();
    let ids: Vec<Option<i64>> = page.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![Some(2), Some(3)]);

    let empty = store
        .get_paginated(Collection::Expenses, None, 0, 0)
        .await
        .unwrap();
    assert!(empty.is_empty());

    assert_eq!(store.count(Collection::Expenses, None).await.unwrap(), 6);
    assert_eq!(
        store
            .count(Collection::Expenses, Some(IndexFilter::user(1)))
            .await
            .unwrap(),
        5
    );
}

#[tokio::test]
async fn update_is_a_blind_upsert_that_keeps_created_at() {
    let (_dir, store) = temp_store();
    let goal = NewGoal {
        name: "Voyage".to_string(),
        target_amount: 500.0,
        deadline: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        category: Some("Loisirs".to_string()),
    }
    .into_goal(1);
    let saved = store.insert_typed(goal).await.unwrap();
    let created = saved.created_at;

    let mut changed = saved.clone();
    changed.current_amount = 120.0;
    changed.category = None;
    changed.created_at = None;
    let updated = store.save_typed(changed).await.unwrap();
    assert_eq!(updated.current_amount, 120.0);
    assert_eq!(updated.category, None);
    assert_eq!(updated.created_at, created);

    let mut fresh = saved;
    fresh.id = Some(40);
    let inserted = store.save_typed(fresh).await.unwrap();
    assert_eq!(inserted.id, Some(40));
    let fetched: Option<Goal> = store.fetch_typed(40).await.unwrap();
    assert!(fetched.is_some());
}

#[tokio::test]
async fn update_without_id_is_rejected() {
    let (_dir, store) = temp_store();
    let err = store.save_typed(expense(1, 5.0, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(_))
    ));
}

#[tokio::test]
async fn deleting_unknown_id_succeeds() {
    let (_dir, store) = temp_store();
    let saved = store.insert_typed(expense(1, 5.0, 1)).await.unwrap();
    store
        .delete_record(Collection::Expenses, 999)
        .await
        .unwrap();
    store
        .delete_record(Collection::Expenses, saved.id.unwrap())
        .await
        .unwrap();
    assert!(store
        .get(Collection::Expenses, saved.id.unwrap())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn key_value_entries_round_trip() {
    let (_dir, store) = temp_store();
    assert_eq!(store.get_value("syncQueue").await.unwrap(), None);

    store.set_value("syncQueue", "[]").await.unwrap();
    store.set_value("syncQueue", "[1]").await.unwrap();
    assert_eq!(
        store.get_value("syncQueue").await.unwrap().as_deref(),
        Some("[1]")
    );

    store.remove_value("syncQueue").await.unwrap();
    assert_eq!(store.get_value("syncQueue").await.unwrap(), None);
}

#[tokio::test]
async fn data_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db").to_string_lossy().into_owned();

    {
        let store = SqliteLocalStore::new(path.clone());
        store.insert_typed(expense(3, 42.0, 4)).await.unwrap();
        store.set_value("auth_token", "abc").await.unwrap();
    }

    let reopened = SqliteLocalStore::new(path);
    let all: Vec<Expense> = reopened.all_typed().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].amount, 42.0);
    assert_eq!(
        reopened.get_value("auth_token").await.unwrap().as_deref(),
        Some("abc")
    );
}

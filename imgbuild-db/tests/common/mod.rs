//! Behaviour shared by every `ComposeStore` implementation.
//!
//! Each scenario runs against a fresh, empty store.

#![allow(dead_code)]

use chrono::Duration;
use imgbuild_db::{ComposeStore, DbError};
use serde_json::{json, Value};
use uuid::Uuid;

pub const ORG_A: &str = "org-a";
pub const ORG_B: &str = "org-b";
pub const ACCOUNT: &str = "0000001";

pub fn day() -> Duration {
    Duration::hours(24)
}

pub fn aws_request() -> Value {
    json!({
        "distribution": "rhel-9",
        "image_requests": [
            { "architecture": "x86_64", "image_type": "aws" }
        ]
    })
}

pub async fn insert_compose(store: &dyn ComposeStore, org_id: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_compose(id, ACCOUNT, org_id, None, &aws_request())
        .await
        .expect("insert compose");
    id
}

pub async fn insert_clone(store: &dyn ComposeStore, compose_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_clone(compose_id, id, &json!({ "region": "us-east-2" }))
        .await
        .expect("insert clone");
    id
}

pub async fn insert_then_get_returns_same_record(store: &dyn ComposeStore) {
    let id = Uuid::new_v4();
    let request = aws_request();
    store
        .insert_compose(id, ACCOUNT, ORG_A, Some("nightly"), &request)
        .await
        .unwrap();

    let compose = store.get_compose(id, ORG_A).await.unwrap();
    assert_eq!(compose.id, id);
    assert_eq!(compose.request, request);
    assert_eq!(compose.image_name.as_deref(), Some("nightly"));
}

pub async fn missing_image_name_is_preserved(store: &dyn ComposeStore) {
    let id = insert_compose(store, ORG_A).await;
    let compose = store.get_compose(id, ORG_A).await.unwrap();
    assert_eq!(compose.image_name, None);
}

pub async fn compose_reads_are_tenant_scoped(store: &dyn ComposeStore) {
    let id = insert_compose(store, ORG_A).await;

    let err = store.get_compose(id, ORG_B).await.unwrap_err();
    assert!(matches!(err, DbError::ComposeNotFound));

    let err = store.get_compose_image_type(id, ORG_B).await.unwrap_err();
    assert!(matches!(err, DbError::ComposeNotFound));

    let page = store.get_composes(ORG_B, day(), 100, 0).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(store.count_composes_since(ORG_B, day()).await.unwrap(), 0);
}

pub async fn unknown_compose_is_not_found(store: &dyn ComposeStore) {
    let err = store.get_compose(Uuid::new_v4(), ORG_A).await.unwrap_err();
    assert!(matches!(err, DbError::ComposeNotFound));
    assert!(err.is_not_found());
}

pub async fn image_type_comes_from_first_image_request(store: &dyn ComposeStore) {
    let id = Uuid::new_v4();
    let request = json!({ "image_requests": [{ "image_type": "aws" }] });
    store
        .insert_compose(id, ACCOUNT, ORG_A, None, &request)
        .await
        .unwrap();

    assert_eq!(store.get_compose_image_type(id, ORG_A).await.unwrap(), "aws");
    let err = store.get_compose_image_type(id, ORG_B).await.unwrap_err();
    assert!(matches!(err, DbError::ComposeNotFound));

    let multi = Uuid::new_v4();
    let request = json!({
        "image_requests": [
            { "image_type": "gcp" },
            { "image_type": "azure" }
        ]
    });
    store
        .insert_compose(multi, ACCOUNT, ORG_A, None, &request)
        .await
        .unwrap();
    assert_eq!(store.get_compose_image_type(multi, ORG_A).await.unwrap(), "gcp");
}

pub async fn image_requests_must_be_an_array(store: &dyn ComposeStore) {
    let id = Uuid::new_v4();
    let request = json!({ "image_requests": { "0": { "image_type": "aws" } } });
    store
        .insert_compose(id, ACCOUNT, ORG_A, None, &request)
        .await
        .unwrap();

    let err = store.get_compose_image_type(id, ORG_A).await.unwrap_err();
    assert!(matches!(err, DbError::ComposeNotFound));
}

pub async fn duplicate_compose_is_constraint(store: &dyn ComposeStore) {
    let id = insert_compose(store, ORG_A).await;
    let err = store
        .insert_compose(id, ACCOUNT, ORG_B, None, &aws_request())
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "unexpected error: {err}");

    // the original row is untouched
    store.get_compose(id, ORG_A).await.unwrap();
}

pub async fn recent_page_with_full_count(store: &dyn ComposeStore) {
    let first = insert_compose(store, ORG_A).await;
    let second = insert_compose(store, ORG_A).await;
    let third = insert_compose(store, ORG_A).await;
    insert_compose(store, ORG_B).await;

    let page = store.get_composes(ORG_A, day(), 2, 0).await.unwrap();
    assert_eq!(page.total, 3);
    let ids: Vec<Uuid> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![third, second]);

    let rest = store.get_composes(ORG_A, day(), 2, 2).await.unwrap();
    assert_eq!(rest.total, 3);
    let ids: Vec<Uuid> = rest.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first]);

    assert_eq!(store.count_composes_since(ORG_A, day()).await.unwrap(), 3);
}

pub async fn pages_cover_the_filtered_set(store: &dyn ComposeStore) {
    let mut inserted = Vec::new();
    for _ in 0..7 {
        inserted.push(insert_compose(store, ORG_A).await);
    }

    let limit = 3;
    let total = store.count_composes_since(ORG_A, day()).await.unwrap();
    assert_eq!(total, 7);

    let mut seen = Vec::new();
    let mut last_created = None;
    for k in 0..(total + limit - 1) / limit {
        let page = store
            .get_composes(ORG_A, day(), limit, k * limit)
            .await
            .unwrap();
        assert!(page.len() as i64 <= limit);
        assert_eq!(page.total, total);
        for compose in page.items {
            if let Some(prev) = last_created {
                assert!(compose.created_at <= prev, "rows must be newest first");
            }
            last_created = Some(compose.created_at);
            seen.push(compose.id);
        }
    }

    inserted.reverse();
    assert_eq!(seen, inserted);
}

pub async fn paging_past_the_end_is_empty(store: &dyn ComposeStore) {
    insert_compose(store, ORG_A).await;
    let page = store.get_composes(ORG_A, day(), 10, 10).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 1);

    let page = store.get_composes(ORG_A, day(), 0, 0).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 1);
}

pub async fn negative_paging_is_clamped(store: &dyn ComposeStore) {
    let compose = insert_compose(store, ORG_A).await;
    insert_compose(store, ORG_A).await;
    insert_clone(store, compose).await;

    let page = store.get_composes(ORG_A, day(), -1, -5).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 2);

    // a negative offset reads from the start
    let page = store.get_composes(ORG_A, day(), 10, -5).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total, 2);

    let page = store
        .get_clones_for_compose(compose, ORG_A, -1, -5)
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 1);
}

pub async fn clone_round_trip(store: &dyn ComposeStore) {
    let compose = insert_compose(store, ORG_A).await;
    let clone_id = Uuid::new_v4();
    let request = json!({ "region": "eu-central-1", "share_with_accounts": ["123456789012"] });
    store.insert_clone(compose, clone_id, &request).await.unwrap();

    let clone = store.get_clone(clone_id, ORG_A).await.unwrap();
    assert_eq!(clone.id, clone_id);
    assert_eq!(clone.request, request);
}

pub async fn clones_are_scoped_through_parent(store: &dyn ComposeStore) {
    let compose = insert_compose(store, ORG_A).await;
    let clone_id = insert_clone(store, compose).await;

    let page = store
        .get_clones_for_compose(compose, ORG_B, 10, 0)
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total, 0);

    let err = store.get_clone(clone_id, ORG_B).await.unwrap_err();
    assert!(matches!(err, DbError::CloneNotFound));

    let err = store.get_clone(Uuid::new_v4(), ORG_A).await.unwrap_err();
    assert!(matches!(err, DbError::CloneNotFound));
}

pub async fn clones_page_newest_first(store: &dyn ComposeStore) {
    let compose = insert_compose(store, ORG_A).await;
    let other = insert_compose(store, ORG_A).await;
    let first = insert_clone(store, compose).await;
    let second = insert_clone(store, compose).await;
    let third = insert_clone(store, compose).await;
    insert_clone(store, other).await;

    let page = store
        .get_clones_for_compose(compose, ORG_A, 2, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    let ids: Vec<Uuid> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![third, second]);

    let page = store
        .get_clones_for_compose(compose, ORG_A, 2, 2)
        .await
        .unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first]);
}

pub async fn orphan_clone_is_constraint(store: &dyn ComposeStore) {
    let orphan = Uuid::new_v4();
    let err = store
        .insert_clone(Uuid::new_v4(), orphan, &json!({}))
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "unexpected error: {err}");

    // nothing was written
    let compose = insert_compose(store, ORG_A).await;
    let page = store
        .get_clones_for_compose(compose, ORG_A, 10, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

pub async fn duplicate_clone_is_constraint(store: &dyn ComposeStore) {
    let compose = insert_compose(store, ORG_A).await;
    let clone_id = insert_clone(store, compose).await;
    let err = store
        .insert_clone(compose, clone_id, &json!({}))
        .await
        .unwrap_err();
    assert!(err.is_constraint(), "unexpected error: {err}");
}

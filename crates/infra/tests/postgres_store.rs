//! Runs against a real Postgres when `INVENTORIX_TEST_DATABASE_URL` is set;
//! otherwise each test returns early.

use std::time::Duration;

use chrono::Utc;

use inventorix_auth::UserDraft;
use inventorix_core::UserId;
use inventorix_infra::access::{categories, products, settle, users, warehouses};
use inventorix_infra::store::{PostgresStore, Store};
use inventorix_inventory::{CategoryDraft, ProductDraft, ProductPatch, WarehouseDraft};

async fn store() -> Option<PostgresStore> {
    let Ok(url) = std::env::var("INVENTORIX_TEST_DATABASE_URL") else {
        eprintln!("INVENTORIX_TEST_DATABASE_URL not set; skipping");
        return None;
    };
    Some(PostgresStore::connect(&url).await.expect("failed to connect"))
}

async fn seed_owner(store: &PostgresStore) -> UserId {
    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let username = format!("pg{suffix}");
    let new = users::prepare(UserDraft {
        business_name: Some("Acme".into()),
        email: Some(format!("{username}@example.com")),
        username: Some(username),
        password: Some("pw".into()),
    })
    .unwrap();

    let mut uow = store.begin().await.unwrap();
    let res = users::register(uow.as_mut(), new).await;
    settle(uow, res).await.unwrap().id
}

#[tokio::test]
async fn overlapping_patches_are_serialized_on_the_row() {
    let Some(store) = store().await else { return };
    let owner = seed_owner(&store).await;

    let mut uow = store.begin().await.unwrap();
    let category = categories::create(
        uow.as_mut(),
        owner,
        CategoryDraft {
            name: Some("Tools".into()),
            in_stock: None,
        },
    )
    .await
    .unwrap();
    let warehouse = warehouses::create(
        uow.as_mut(),
        owner,
        WarehouseDraft {
            name: Some("Main".into()),
            location: Some("Dock 4".into()),
            supplier: None,
        },
    )
    .await
    .unwrap();
    let product = products::create(
        uow.as_mut(),
        owner,
        ProductDraft {
            name: Some("Hammer".into()),
            price: Some(12.5),
            quantity: Some(3),
            category_id: Some(category.id),
            warehouse_id: Some(warehouse.id),
        },
    )
    .await
    .unwrap();
    uow.commit().await.unwrap();
    let id = product.product.id;

    // First patch holds the row until it commits.
    let mut first = store.begin().await.unwrap();
    products::patch(
        first.as_mut(),
        owner,
        id,
        ProductPatch {
            name: Some("Mallet".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let second_store = store.clone();
    let second = tokio::spawn(async move {
        let mut uow = second_store.begin().await.unwrap();
        let res = products::patch(
            uow.as_mut(),
            owner,
            id,
            ProductPatch {
                price: Some(20.0),
                ..Default::default()
            },
        )
        .await;
        settle(uow, res).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!second.is_finished(), "second patch read the row while it was locked");

    first.commit().await.unwrap();
    second.await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let current = products::get(uow.as_mut(), owner, id).await.unwrap();
    assert_eq!(current.product.name, "Mallet");
    assert_eq!(current.product.price, 20.0);

    users::delete(uow.as_mut(), owner).await.unwrap();
    uow.commit().await.unwrap();
}

/// Contract tests for the in-memory client store
/// The PostgreSQL store implements the same semantics in SQL
use rust_credit_api::memory_store::MemoryClientStore;
use rust_credit_api::models::{CreateClientRequest, CreditMix, MinPayment};
use rust_credit_api::repository::{ClientQuery, ClientRepository, SortField, SortOrder};

fn named(nom: &str) -> CreateClientRequest {
    CreateClientRequest {
        nom: Some(nom.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_then_get_roundtrip() {
    let store = MemoryClientStore::new();

    let created = store
        .create(CreateClientRequest {
            nom: Some("Durand".to_string()),
            prenom: Some("Claire".to_string()),
            age: Some(41),
            credit_mix: Some(CreditMix::Standard),
            ..Default::default()
        })
        .await
        .unwrap();

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.nom.as_deref(), Some("Durand"));
    assert_eq!(fetched.age, Some(41));
    assert_eq!(fetched.credit_mix, Some(CreditMix::Standard));
    assert!(fetched.updated_at.is_none());
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = MemoryClientStore::new();
    assert!(store.get(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let store = MemoryClientStore::new();
    let created = store
        .create(CreateClientRequest {
            nom: Some("Martin".to_string()),
            age: Some(30),
            credit_utilization_ratio: Some(20.0),
            ..Default::default()
        })
        .await
        .unwrap();

    let updated = store
        .update(
            created.id,
            CreateClientRequest {
                credit_utilization_ratio: Some(9.0),
                payment_of_min_amount: Some(MinPayment::Yes),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.nom.as_deref(), Some("Martin"));
    assert_eq!(updated.age, Some(30));
    assert_eq!(updated.credit_utilization_ratio, Some(9.0));
    assert_eq!(updated.payment_of_min_amount, Some(MinPayment::Yes));
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn update_missing_returns_none() {
    let store = MemoryClientStore::new();
    let result = store
        .update(uuid::Uuid::new_v4(), CreateClientRequest::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_reports_existence() {
    let store = MemoryClientStore::new();
    let created = store.create(named("Petit")).await.unwrap();

    assert!(store.delete(created.id).await.unwrap());
    assert!(!store.delete(created.id).await.unwrap());
}

#[tokio::test]
async fn search_matches_nom_and_prenom_case_insensitively() {
    let store = MemoryClientStore::new();
    store.create(named("Martin")).await.unwrap();
    store.create(named("Durand")).await.unwrap();
    store
        .create(CreateClientRequest {
            prenom: Some("Martine".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let page = store
        .list(&ClientQuery {
            search: Some("MART".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn filters_by_credit_mix_label() {
    let store = MemoryClientStore::new();
    for mix in [CreditMix::Good, CreditMix::Bad, CreditMix::Good] {
        store
            .create(CreateClientRequest {
                credit_mix: Some(mix),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let page = store
        .list(&ClientQuery {
            credit_mix: Some("Good".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let page = store
        .list(&ClientQuery {
            credit_mix: Some("Bad".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn pagination_slices_and_counts() {
    let store = MemoryClientStore::new();
    for i in 0..25 {
        store.create(named(&format!("Client{:02}", i))).await.unwrap();
    }

    let page = store
        .list(&ClientQuery {
            page: 3,
            page_size: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 5);
    assert_eq!(page.page, 3);
}

#[tokio::test]
async fn sorts_by_nom_ascending() {
    let store = MemoryClientStore::new();
    for nom in ["Charlie", "Alice", "Bob"] {
        store.create(named(nom)).await.unwrap();
    }

    let page = store
        .list(&ClientQuery {
            sort_by: SortField::Nom,
            sort_order: SortOrder::Asc,
            ..Default::default()
        })
        .await
        .unwrap();

    let names: Vec<_> = page
        .data
        .iter()
        .map(|c| c.nom.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);
}

#[tokio::test]
async fn list_all_is_newest_first() {
    let store = MemoryClientStore::new();
    store.create(named("Premier")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.create(named("Second")).await.unwrap();

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].nom.as_deref(), Some("Second"));
    assert_eq!(all[1].nom.as_deref(), Some("Premier"));
}

#[tokio::test]
async fn empty_listing_has_zero_pages() {
    let store = MemoryClientStore::new();
    let page = store.list(&ClientQuery::default()).await.unwrap();

    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.data.is_empty());
}

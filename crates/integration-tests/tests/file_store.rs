//! Integration tests for state kept between processes.
//!
//! Each "process" is a fresh `FileStore` over the same file, the way the CLI
//! reopens its state file on every invocation.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use uuid::Uuid;

use cartline_core::ProductId;
use cartline_integration_tests::FakePlatform;
use cartline_storefront::config::CartSettings;
use cartline_storefront::models::{CustomerSession, storage_keys};
use cartline_storefront::platform::CustomerDraft;
use cartline_storefront::services::{AccountService, CartGateway};
use cartline_storefront::state::Session;
use cartline_storefront::storage::{FileStore, KeyValueStore};

fn state_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("cartline-test-{}", Uuid::new_v4()))
        .join("state.json")
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let path = state_file();
    let platform = FakePlatform::new();
    let product = ProductId::new("p-1");

    let first_id = {
        let gateway = CartGateway::new(&platform, FileStore::new(&path), CartSettings::default());
        let mut session = Session::new();
        gateway.add_item(&mut session, &product).await.unwrap();
        session.cart_id().unwrap().clone()
    };

    let gateway = CartGateway::new(&platform, FileStore::new(&path), CartSettings::default());
    let mut session = Session::new();
    gateway.add_item(&mut session, &product).await.unwrap();

    assert_eq!(session.cart_id(), Some(&first_id));
    assert_eq!(session.cart().unwrap().total_quantity(), 2);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_sign_in_survives_restart() {
    let path = state_file();
    let platform = FakePlatform::new();
    platform.seed_customer(&CustomerDraft {
        email: "jane@example.com".to_string(),
        password: "Secret#123".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: None,
        addresses: Vec::new(),
    });

    let customer = {
        let accounts = AccountService::new(&platform, FileStore::new(&path));
        accounts
            .sign_in(&mut Session::new(), "jane@example.com", "Secret#123")
            .await
            .unwrap()
    };

    let store = FileStore::new(&path);
    let restored = CustomerSession::restore(&store).unwrap().unwrap();
    assert_eq!(restored.id, customer.id);
    assert_eq!(restored.email.as_str(), "jane@example.com");
    assert!(store.contains(storage_keys::TOKEN_STORE).unwrap());

    let accounts = AccountService::new(&platform, &store);
    let mut session = Session::for_customer(restored);
    accounts.sign_out(&mut session).unwrap();

    assert!(CustomerSession::restore(&store).unwrap().is_none());
    assert!(!store.contains(storage_keys::PASSWORD).unwrap());
    assert!(session.customer().is_none());

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

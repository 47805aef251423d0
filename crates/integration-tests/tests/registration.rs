//! Integration tests for sign-up result handling.
//!
//! The view must see exactly one of three reactions: success (navigate to
//! the overview once), "email taken" (inline hint only) or the generic
//! failure panel.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use cartline_core::CountryCode;
use cartline_integration_tests::{FakePlatform, RecordingView, Request, ViewEvent};
use cartline_storefront::Error;
use cartline_storefront::config::CartSettings;
use cartline_storefront::models::{Page, storage_keys};
use cartline_storefront::platform::{Address, CustomerDraft};
use cartline_storefront::services::account::{
    CheckboxState, FAILURE_MESSAGE, RegistrationOutcome, SUCCESS_MESSAGE,
};
use cartline_storefront::services::{AccountService, CartGateway};
use cartline_storefront::state::Session;
use cartline_storefront::storage::{KeyValueStore, MemoryStore};

fn draft(email: &str) -> CustomerDraft {
    CustomerDraft {
        email: email.to_string(),
        password: "Secret#123".to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: Some("1990-04-01".to_string()),
        addresses: vec![Address {
            id: None,
            street_name: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            postal_code: Some("12345".to_string()),
            country: CountryCode::US,
        }],
    }
}

#[tokio::test]
async fn test_created_navigates_to_overview_once() {
    let platform = FakePlatform::new();
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut session = Session::new();
    let mut view = RecordingView::default();

    let outcome = accounts
        .register(
            &mut session,
            &draft("jane@example.com"),
            CheckboxState::default(),
            &mut view,
        )
        .await
        .unwrap();

    let RegistrationOutcome::Created(customer) = outcome else {
        panic!("expected a created account");
    };
    assert_eq!(view.navigations(), vec![Page::Overview]);
    assert_eq!(view.messages(), vec![SUCCESS_MESSAGE]);
    assert!(view.events.contains(&ViewEvent::EmailInvalid(false)));
    assert!(!view.messages().contains(&FAILURE_MESSAGE));

    assert_eq!(
        accounts.store().get(storage_keys::PASSWORD).unwrap().as_deref(),
        Some("Secret#123")
    );
    assert!(accounts.store().contains(storage_keys::TOKEN_STORE).unwrap());
    assert_eq!(session.customer().unwrap().id, customer.id);
}

#[tokio::test]
async fn test_duplicate_email_shows_inline_hint_only() {
    let platform = FakePlatform::new();
    platform.seed_customer(&draft("jane@example.com"));
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut session = Session::new();
    let mut view = RecordingView::default();

    let outcome = accounts
        .register(
            &mut session,
            &draft("jane@example.com"),
            CheckboxState::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::EmailTaken);
    assert_eq!(
        view.events,
        vec![ViewEvent::EmailTaken, ViewEvent::EmailInvalid(true)]
    );
    assert!(view.messages().is_empty());
    assert!(view.navigations().is_empty());
    assert!(session.customer().is_none());
    assert!(accounts.store().get(storage_keys::PASSWORD).unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_duplicate_message_is_still_recognised() {
    let platform = FakePlatform::new();
    platform.fail_next(
        400,
        json!({
            "statusCode": 400,
            "message": "There is already an existing api with the provided email.",
        }),
    );
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut view = RecordingView::default();

    let outcome = accounts
        .register(
            &mut Session::new(),
            &draft("jane@example.com"),
            CheckboxState::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::EmailTaken);
    assert!(view.messages().is_empty());
}

#[tokio::test]
async fn test_other_failures_show_generic_panel() {
    let platform = FakePlatform::new();
    platform.fail_next(
        500,
        json!({ "statusCode": 500, "message": "Internal Server Error" }),
    );
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut view = RecordingView::default();

    let outcome = accounts
        .register(
            &mut Session::new(),
            &draft("jane@example.com"),
            CheckboxState::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(outcome, RegistrationOutcome::Failed);
    assert_eq!(
        view.events,
        vec![
            ViewEvent::Message(FAILURE_MESSAGE.to_string()),
            ViewEvent::Overlay
        ]
    );
    assert!(view.navigations().is_empty());
}

#[tokio::test]
async fn test_invalid_name_is_rejected_before_sending() {
    let platform = FakePlatform::new();
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut view = RecordingView::default();
    let mut bad = draft("jane@example.com");
    bad.first_name = "J4ne".to_string();

    let err = accounts
        .register(&mut Session::new(), &bad, CheckboxState::default(), &mut view)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(platform.requests().is_empty());
    assert!(view.events.is_empty());
}

#[tokio::test]
async fn test_missing_billing_address_is_rejected_before_sending() {
    let platform = FakePlatform::new();
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut session = Session::new();
    let mut view = RecordingView::default();
    let checkboxes = CheckboxState {
        ship_default: true,
        ship_as_bill: false,
        bill_default: true,
    };

    let err = accounts
        .register(
            &mut session,
            &draft("jane@example.com"),
            checkboxes,
            &mut view,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingAddress { index: 1 }));
    assert!(platform.requests().is_empty());
    assert!(view.events.is_empty());
    assert!(session.customer().is_none());
    assert!(accounts.store().get(storage_keys::PASSWORD).unwrap().is_none());
}

#[tokio::test]
async fn test_registration_applies_default_addresses() {
    let platform = FakePlatform::new();
    let accounts = AccountService::new(&platform, MemoryStore::new());
    let mut view = RecordingView::default();
    let checkboxes = CheckboxState {
        ship_default: true,
        ship_as_bill: true,
        bill_default: false,
    };

    let outcome = accounts
        .register(
            &mut Session::new(),
            &draft("jane@example.com"),
            checkboxes,
            &mut view,
        )
        .await
        .unwrap();

    let customer = platform.customer(&outcome.customer().unwrap().id).unwrap();
    let address_id = customer.addresses.first().and_then(|a| a.id.clone());
    assert!(address_id.is_some());
    assert_eq!(customer.default_shipping_address_id, address_id);
    assert_eq!(customer.default_billing_address_id, address_id);
}

#[tokio::test]
async fn test_registered_customer_can_merge_cart() {
    let platform = FakePlatform::new();
    let store = MemoryStore::new();
    let accounts = AccountService::new(&platform, &store);
    let gateway = CartGateway::new(&platform, &store, CartSettings::default());
    let mut session = Session::new();

    gateway
        .add_item(&mut session, &"p-1".into())
        .await
        .unwrap();
    let anonymous_id = session.cart_id().unwrap().clone();

    accounts
        .register(
            &mut session,
            &draft("jane@example.com"),
            CheckboxState::default(),
            &mut RecordingView::default(),
        )
        .await
        .unwrap();
    let result = gateway.merge_carts(&mut session).await.unwrap();

    let cart = result.cart.unwrap();
    assert_eq!(cart.id, anonymous_id);
    assert_eq!(cart.customer_id, Some(result.customer.id));
    assert!(platform.requests().iter().any(|r| matches!(
        r,
        Request::SignIn(s) if s.anonymous_cart_id.as_ref() == Some(&anonymous_id)
    )));
}

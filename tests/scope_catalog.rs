//! Scope catalog: never fetches without a credential, caches per key,
//! refetches after invalidation.

mod common;

use anyhow::Result;
use serde_json::json;

use common::FakeTransport;
use tether::error::{RemoteError, SyncError};
use tether::remote::Method;
use tether::scopes::ScopeCatalog;

fn scopes_payload() -> serde_json::Value {
    json!({
        "object": "list",
        "data": [
            { "id": "team-a", "object": "scope", "name": "Team A" },
            { "id": "team-b", "object": "scope" },
        ],
    })
}

#[tokio::test]
async fn missing_api_key_returns_not_ready_without_a_request() -> Result<()> {
    let fake = FakeTransport::new();
    let catalog = ScopeCatalog::new(fake.clone());

    let listing = catalog.list(None).await?;
    assert!(!listing.ready);
    assert!(listing.scopes.is_empty());

    let listing = catalog.list(Some("")).await?;
    assert!(!listing.ready);

    assert_eq!(fake.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn listings_are_cached_per_api_key() -> Result<()> {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/user/scopes", Ok(scopes_payload()));
    let catalog = ScopeCatalog::new(fake.clone());

    let first = catalog.list(Some("k1")).await?;
    assert!(first.ready);
    assert_eq!(first.scopes.len(), 2);
    assert_eq!(first.scopes[0].display_name(), "Team A");
    assert_eq!(first.scopes[1].display_name(), "Untitled Scope");

    let second = catalog.list(Some("k1")).await?;
    assert_eq!(second, first);
    assert_eq!(fake.request_count(), 1);

    // The scope listing request carries no scope qualifier.
    assert!(fake.last_request().scope.is_none());
    Ok(())
}

#[tokio::test]
async fn invalidation_forces_a_refetch() -> Result<()> {
    let fake = FakeTransport::new();
    fake.respond(Method::Get, "/user/scopes", Ok(scopes_payload()));
    fake.respond(
        Method::Get,
        "/user/scopes",
        Ok(json!({ "object": "list", "data": [] })),
    );
    let catalog = ScopeCatalog::new(fake.clone());

    catalog.list(Some("k1")).await?;
    catalog.invalidate("k1");
    let refreshed = catalog.list(Some("k1")).await?;
    assert!(refreshed.scopes.is_empty());
    assert_eq!(fake.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn remote_failures_surface_as_typed_errors_and_are_not_cached() -> Result<()> {
    let fake = FakeTransport::new();
    fake.respond(
        Method::Get,
        "/user/scopes",
        Err(RemoteError::new(403, "forbidden")),
    );
    fake.respond(Method::Get, "/user/scopes", Ok(scopes_payload()));
    let catalog = ScopeCatalog::new(fake.clone());

    let err = catalog.list(Some("k1")).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(ref e) if e.status == 403));

    // No automatic retry happened; the next user-triggered call fetches.
    assert_eq!(fake.request_count(), 1);
    let listing = catalog.list(Some("k1")).await?;
    assert!(listing.ready);
    assert_eq!(fake.request_count(), 2);
    Ok(())
}

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use std::sync::Arc;

use home_inventory_api::database::DatabaseError;
use home_inventory_api::{app, AppState};

#[tokio::test]
async fn create_update_delete_self() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let users = db.users();
    let me = common::open_id("user");

    let created = users.create(Some(&me), None).await?;
    assert!(created.nick_name.starts_with("Member-"));

    let duplicate = users.create(Some(&me), Some("Again")).await;
    assert!(matches!(duplicate, Err(DatabaseError::Conflict(_))));

    let updated = users.update(Some(&me), Some("Alex")).await?;
    assert_eq!(updated.nick_name, "Alex");
    let membership = db.home_groups().list(Some(&me)).await?;
    assert_eq!(membership[0].nick_name.as_deref(), Some("Alex"));

    assert_eq!(users.list(Some(&me)).await?.len(), 1);
    assert_eq!(users.delete(Some(&me)).await?, 1);
    assert!(users.list(Some(&me)).await?.is_empty());
    assert!(db.home_groups().list(Some(&me)).await?.is_empty());

    let again = users.delete(Some(&me)).await;
    assert!(matches!(again, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_an_owner_releases_members() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let owner = common::user(&db, "owner").await?;
    let member = common::user(&db, "member").await?;
    db.home_groups().add_member(Some(&member), Some(&owner), None).await?;

    db.users().delete(Some(&owner)).await?;

    let listing = db.home_groups().list(Some(&member)).await?;
    assert_eq!(listing.len(), 1);
    assert!(listing[0].owns_group());
    Ok(())
}

#[tokio::test]
async fn login_provisions_on_first_sight() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let me = common::open_id("wx");
    let identity = common::FakeIdentity { open_id: Some(me.clone()) };
    let router = app(AppState::new(db.clone(), Arc::new(identity)));

    for _ in 0..2 {
        let (status, body) = common::call(&router, Method::POST, "/api/user/getOpenId", r#"{"code":"abc"}"#).await?;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"], me.as_str());
    }

    assert_eq!(db.users().list(Some(&me)).await?.len(), 1);
    let membership = db.home_groups().list(Some(&me)).await?;
    assert_eq!(membership.len(), 1);
    assert!(membership[0].owns_group());

    let (status, body) = common::call(
        &router,
        Method::POST,
        "/api/category/queryByParams",
        &format!(r#"{{"openId":"{}"}}"#, me),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert!(body["data"][0]["category"].is_string());
    Ok(())
}

mod common;

use anyhow::Result;

use home_inventory_api::database::validation::ValidationError;
use home_inventory_api::database::DatabaseError;

#[tokio::test]
async fn invite_join_and_leave() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let groups = db.home_groups();
    let owner = common::user(&db, "owner").await?;
    let member = common::user(&db, "member").await?;

    let joined = groups.add_member(Some(&member), Some(&owner), Some("Sam")).await?;
    assert_eq!(joined.group_id, owner);
    assert!(!joined.is_owner);
    assert_eq!(joined.nick_name.as_deref(), Some("Sam"));

    let listing = groups.list(Some(&member)).await?;
    assert_eq!(listing.len(), 2);
    assert!(listing[0].is_owner);

    // Owners dissolve rather than leave
    let leave = groups.delete_member(Some(&owner), None).await;
    assert!(matches!(leave, Err(DatabaseError::Conflict(_))), "{:?}", leave);

    let left = groups.delete_member(Some(&member), None).await?;
    assert_eq!(left.group_id, member);
    assert!(left.is_owner);
    assert_eq!(groups.list(Some(&owner)).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn self_invite_is_a_validation_error() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let me = common::user(&db, "me").await?;

    let result = db.home_groups().add_member(Some(&me), Some(&me), None).await;
    assert!(matches!(
        result,
        Err(DatabaseError::Validation(ValidationError::InvalidField { field: "inviterOpenId", .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn owner_with_members_cannot_join_elsewhere() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let groups = db.home_groups();
    let a = common::user(&db, "a").await?;
    let b = common::user(&db, "b").await?;
    let c = common::user(&db, "c").await?;

    groups.add_member(Some(&b), Some(&a), None).await?;
    let result = groups.add_member(Some(&a), Some(&c), None).await;
    assert!(matches!(result, Err(DatabaseError::Conflict(_))), "{:?}", result);

    // Nothing moved
    assert_eq!(groups.list(Some(&a)).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn dissolve_releases_every_member() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let groups = db.home_groups();
    let owner = common::user(&db, "owner").await?;
    let m1 = common::user(&db, "m1").await?;
    let m2 = common::user(&db, "m2").await?;

    groups.add_member(Some(&m1), Some(&owner), None).await?;
    groups.add_member(Some(&m2), Some(&owner), None).await?;
    assert_eq!(groups.delete(Some(&owner)).await?, 2);

    for id in [&owner, &m1, &m2] {
        let listing = groups.list(Some(id)).await?;
        assert_eq!(listing.len(), 1);
        assert!(listing[0].owns_group());
    }

    let again = groups.delete(Some(&owner)).await;
    assert!(matches!(again, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn owner_removes_a_member() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let groups = db.home_groups();
    let owner = common::user(&db, "owner").await?;
    let member = common::user(&db, "member").await?;
    let other = common::user(&db, "other").await?;

    groups.add_member(Some(&member), Some(&owner), None).await?;

    let denied = groups.delete_member(Some(&other), Some(&member)).await;
    assert!(matches!(denied, Err(DatabaseError::NotFound(_))));

    let removed = groups.delete_member(Some(&owner), Some(&member)).await?;
    assert_eq!(removed.open_id, member);
    assert!(removed.owns_group());

    let renamed = groups.update(Some(&owner), Some("Head of house")).await?;
    assert_eq!(renamed.nick_name.as_deref(), Some("Head of house"));
    Ok(())
}

#[tokio::test]
async fn member_of_another_group_cannot_create_one() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let groups = db.home_groups();
    let owner = common::user(&db, "owner").await?;
    let member = common::user(&db, "member").await?;
    groups.add_member(Some(&member), Some(&owner), None).await?;

    let own = groups.create(Some(&owner), None).await?;
    assert!(own.owns_group());

    let result = groups.create(Some(&member), None).await;
    assert!(matches!(result, Err(DatabaseError::Conflict(_))));
    Ok(())
}

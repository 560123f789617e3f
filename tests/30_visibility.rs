mod common;

use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use home_inventory_api::database::models::InventoryInput;
use home_inventory_api::database::visibility::visible_identifiers;
use home_inventory_api::database::DatabaseError;
use home_inventory_api::filter::InventoryQuery;

fn item(open_id: &str, name: &str) -> Result<InventoryInput> {
    Ok(serde_json::from_value(json!({
        "openId": open_id,
        "inventoryName": name,
        "category": "Pantry",
        "position": "Kitchen",
        "date": "2031-05-01",
        "quantity": 1
    }))?)
}

#[tokio::test]
async fn caller_without_membership_sees_only_self() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let stranger = common::open_id("stranger");

    let visible = visible_identifiers(db.pool(), &stranger).await?;
    assert_eq!(visible, vec![stranger]);
    Ok(())
}

#[tokio::test]
async fn group_members_see_each_other() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let owner = common::user(&db, "owner").await?;
    let member = common::user(&db, "member").await?;
    let outsider = common::user(&db, "outsider").await?;

    db.home_groups().add_member(Some(&member), Some(&owner), None).await?;

    let mut expected = vec![owner.clone(), member.clone()];
    expected.sort();
    assert_eq!(visible_identifiers(db.pool(), &owner).await?, expected);
    assert_eq!(visible_identifiers(db.pool(), &member).await?, expected);
    assert_eq!(visible_identifiers(db.pool(), &outsider).await?, vec![outsider.clone()]);

    // The member's item is visible to the owner, not to the outsider
    let created = db.inventory().create(item(&member, "Rice")?.into_new_item()?).await?;

    let seen = db.inventory().list(Some(&owner), InventoryQuery::default()).await?;
    assert!(seen.iter().any(|i| i.id == created.id));

    let hidden = db.inventory().list(Some(&outsider), InventoryQuery::default()).await?;
    assert!(hidden.iter().all(|i| i.id != created.id));
    Ok(())
}

#[tokio::test]
async fn out_of_scope_writes_are_not_found() -> Result<()> {
    let Some(db) = common::database().await? else { return Ok(()) };
    let owner = common::user(&db, "owner").await?;
    let outsider = common::user(&db, "outsider").await?;

    let created = db.inventory().create(item(&owner, "Tea")?.into_new_item()?).await?;
    let changes = item(&outsider, "Stolen tea")?.into_changes()?;

    let update = db.inventory().update(created.id, Some(&outsider), &changes).await;
    assert!(matches!(update, Err(DatabaseError::NotFound(_))), "{:?}", update);

    let delete = db.inventory().delete(created.id, Some(&outsider)).await;
    assert!(matches!(delete, Err(DatabaseError::NotFound(_))), "{:?}", delete);

    let missing = db.inventory().delete(Uuid::new_v4(), Some(&owner)).await;
    assert!(matches!(missing, Err(DatabaseError::NotFound(_))));

    // Still there, unchanged, for its owner
    let query: InventoryQuery = serde_json::from_value(json!({ "id": created.id.to_string() }))?;
    let rows = db.inventory().list(Some(&owner), query).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].inventory_name, "Tea");

    assert_eq!(db.inventory().delete(created.id, Some(&owner)).await?, 1);
    Ok(())
}

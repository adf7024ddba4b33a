/// Integration tests for the category and priority endpoints

mod common;

use axum::http::StatusCode;
use common::{id_of, ids, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_category_lifecycle() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;

    let (status, category) = ctx
        .post(
            "/v1/categories",
            &ctx.alice,
            json!({ "name": "Home", "description": "Chores" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["created_by"], "alice");
    let uri = format!("/v1/categories/{}", id_of(&category)?);

    let (status, category) = ctx.patch(&uri, &ctx.alice, json!({ "name": "House" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(category["name"], "House");
    assert_eq!(category["description"], "Chores");

    let (status, _) = ctx.delete(&uri, &ctx.alice).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&uri, &ctx.alice).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, rows) = ctx.get("/v1/categories", &ctx.alice).await?;
    assert!(ids(&rows).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_categories_are_private_to_their_owner() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let (alice_category, _) = ctx.catalog(&ctx.alice).await?;
    let (bob_category, _) = ctx.catalog(&ctx.bob).await?;
    let uri = format!("/v1/categories/{}", alice_category);

    let (_, rows) = ctx.get("/v1/categories", &ctx.bob).await?;
    assert_eq!(ids(&rows), vec![bob_category]);

    let (status, _) = ctx.get(&uri, &ctx.bob).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.patch(&uri, &ctx.bob, json!({ "name": "Mine" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx.delete(&uri, &ctx.bob).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, rows) = ctx.get("/v1/categories", &ctx.staff).await?;
    assert_eq!(ids(&rows), vec![alice_category, bob_category]);
    Ok(())
}

#[tokio::test]
async fn test_staff_category_list_skips_soft_deleted_rows() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let (category, _) = ctx.catalog(&ctx.alice).await?;
    let uri = format!("/v1/categories/{}", category);

    ctx.delete(&uri, &ctx.alice).await?;

    let (_, rows) = ctx.get("/v1/categories", &ctx.staff).await?;
    assert!(ids(&rows).is_empty());

    let (status, row) = ctx.get(&uri, &ctx.staff).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["deleted"], true);
    Ok(())
}

#[tokio::test]
async fn test_staff_category_delete_cascades_to_tasks() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let task = ctx.task(&ctx.alice, "filed").await?;
    let (_, row) = ctx.get(&format!("/v1/tasks/{}", task), &ctx.alice).await?;
    let category = row["category"].as_i64().unwrap_or_default();

    let (status, _) = ctx
        .delete(&format!("/v1/categories/{}", category), &ctx.staff)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&format!("/v1/tasks/{}", task), &ctx.staff).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_soft_deleted_category_cannot_be_referenced() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;
    let (category, priority) = ctx.catalog(&ctx.alice).await?;
    ctx.delete(&format!("/v1/categories/{}", category), &ctx.alice)
        .await?;

    let (status, body) = ctx
        .post(
            "/v1/tasks",
            &ctx.alice,
            json!({ "title": "late", "category": category, "priority": priority }),
        )
        .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
    Ok(())
}

#[tokio::test]
async fn test_category_name_validation() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;

    let (status, body) = ctx
        .post("/v1/categories", &ctx.alice, json!({ "name": "x".repeat(101) }))
        .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
    Ok(())
}

#[tokio::test]
async fn test_priority_lifecycle() -> anyhow::Result<()> {
    let ctx = TestContext::new().await?;

    let (status, priority) = ctx
        .post("/v1/priorities", &ctx.bob, json!({ "name": "Urgent" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/v1/priorities/{}", id_of(&priority)?);

    let (status, priority) = ctx.patch(&uri, &ctx.bob, json!({ "name": "Later" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(priority["name"], "Later");

    let (status, _) = ctx.get(&uri, &ctx.alice).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.patch(&uri, &ctx.bob, json!({ "name": "" })).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = ctx.delete(&uri, &ctx.staff).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get(&uri, &ctx.staff).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

//! Statements run through the async connector against an in-memory store.

use pretty_assertions::assert_eq;
use trellis_sql::ConnectorError;
use trellis_tests::prelude::*;
use trellis_tests::StoreError;

fn article_args(schema: &Schema, raw: serde_json::Value, fragment: &str) -> FindArgs {
    let article = schema.node_by_name("Article").unwrap();
    FindArgs::parse(schema, article, &raw, fragment).unwrap()
}

#[tokio::test]
async fn test_every_leaf_type_reads_back() {
    // GIVEN cells as a driver hands them over
    init_tracing();
    let schema = blog().unwrap();
    let store = MemoryStore::new().respond(json!([{
        "article.id": "a1",
        "article.title": "Hello",
        "article.format": "MARKDOWN",
        "article.score": "4.5",
        "article.published": 1,
        "article.published_on": "2024-03-01",
        "article.created_at": "2024-03-01 10:00:00.123",
        "article.created_by_id": "u1",
        "article>createdBy.profile": "{\"bio\":\"hi\"}"
    }]));
    let connector = Connector::new(&schema, store);

    // WHEN every leaf is selected
    let args = article_args(
        &schema,
        json!({}),
        "{ id title format score published publishedOn createdAt createdBy { id profile } }",
    );
    let articles = connector.find("Article", &args, None).await.unwrap();

    // THEN each cell is decoded by its leaf type
    assert_eq!(
        articles.to_json(),
        json!([{
            "id": "a1",
            "title": "Hello",
            "format": "MARKDOWN",
            "score": 4.5,
            "published": true,
            "publishedOn": "2024-03-01",
            "createdAt": "2024-03-01T10:00:00.123Z",
            "createdBy": { "id": "u1", "profile": { "bio": "hi" } }
        }])
    );
}

#[tokio::test]
async fn test_filter_literals_read_back_as_client_values() {
    // GIVEN a filter on a date-time leaf
    let schema = blog().unwrap();
    let args = article_args(
        &schema,
        json!({ "where": { "createdAt_gte": "2024-03-01T10:00:00.123456Z" } }),
        "{ createdAt }",
    );
    let statement = StatementBuilder::new(&schema).find("Article", &args).unwrap();

    // THEN the literal keeps millisecond precision
    assert!(statement
        .sql()
        .ends_with("WHERE `article`.`created_at` >= '2024-03-01 10:00:00.123'"));

    // AND a store echoing the literal reads back the same client value
    let connector = Connector::new(
        &schema,
        MemoryStore::new().respond(json!([{ "article.created_at": "2024-03-01 10:00:00.123" }])),
    );
    let articles = connector.find("Article", &args, None).await.unwrap();
    assert_eq!(
        articles.to_json(),
        json!([{ "createdAt": "2024-03-01T10:00:00.123Z" }])
    );
}

#[tokio::test]
async fn test_deferred_tags_resolve_in_session() {
    // GIVEN an article whose tags are deferred
    let schema = blog().unwrap();
    let store = MemoryStore::new()
        .respond(json!([{ "article.id": "a1" }]))
        .respond(json!([
            { "articletag.position": 1, "articletag.tag_id": "t1" },
            { "articletag.position": 2, "articletag.tag_id": "t2" }
        ]));
    let connector = Connector::new(&schema, store);
    let args = article_args(
        &schema,
        json!({}),
        "{ tags(orderBy: position_ASC) { position tag { id } } }",
    );
    let mut session = Session::default();
    let articles = connector
        .find("Article", &args, Some(&mut session))
        .await
        .unwrap();
    let Some(FieldValue::Deferred(tags)) = articles[0].get("tags") else {
        panic!("expected deferred tags");
    };

    // WHEN resolved in the same session
    let tags = connector
        .resolve(tags, args.selections[0].selections().unwrap(), Some(&mut session))
        .await
        .unwrap();

    // THEN both statements ran in the session and the tags are read
    assert_eq!(
        tags.to_json(),
        json!([
            { "position": 1, "tag": { "id": "t1" } },
            { "position": 2, "tag": { "id": "t2" } }
        ])
    );
    assert_eq!(session.statements, connector.executor().statements());
    assert_eq!(
        session.statements[1],
        "SELECT `articletag`.`position` AS `articletag.position`, \
         `articletag`.`tag_id` AS `articletag.tag_id` \
         FROM `article_tags` AS `articletag` \
         WHERE `articletag`.`article_id` = 'a1' \
         ORDER BY `articletag`.`position` ASC"
    );
}

#[tokio::test]
async fn test_count_reads_driver_text() {
    let schema = blog().unwrap();
    let filter = schema
        .node_by_name("Article")
        .unwrap()
        .where_input()
        .parse(&schema, Some(&json!({ "published": true })), &trellis_core::Path::root())
        .unwrap();

    let connector = Connector::new(&schema, MemoryStore::new().respond(json!([{ "count": "3" }])));
    assert_eq!(connector.count("Article", &filter, None).await.unwrap(), 3);

    let connector = Connector::new(&schema, MemoryStore::new().respond(json!([])));
    assert_eq!(connector.count("Article", &filter, None).await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failures_surface() {
    let schema = blog().unwrap();
    let connector = Connector::new(&schema, MemoryStore::new());

    let err = connector
        .find("Article", &FindArgs::new(vec![Selection::leaf("id")]), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConnectorError::Executor(StoreError::Exhausted { .. })
    ));
    assert!(err
        .to_string()
        .starts_with("executor failed: no rows queued for statement: SELECT"));
}

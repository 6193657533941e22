//! Selection trees: projection, reconstruction and merging.

use proptest::prelude::*;
use trellis_schema::is_reference_selection;
use trellis_tests::prelude::*;

mod reference_selections {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("reference_selections")
            .find(
                "identifiers_come_from_foreign_keys",
                "ArticleTag",
                json!({}),
                "{ article { id } tag { id } position }",
                |a| {
                    a.sql(
                        "SELECT `articletag`.`article_id` AS `articletag.article_id`, \
                         `articletag`.`tag_id` AS `articletag.tag_id`, \
                         `articletag`.`position` AS `articletag.position` \
                         FROM `article_tags` AS `articletag`",
                    )
                    .reads(
                        json!([{
                            "articletag.article_id": "a1",
                            "articletag.tag_id": "t1",
                            "articletag.position": "3"
                        }]),
                        json!([{ "article": { "id": "a1" }, "tag": { "id": "t1" }, "position": 3 }]),
                    )
                },
            )
            .find(
                "other_leaves_join_the_target",
                "Article",
                json!({}),
                "{ category { id title } }",
                |a| {
                    a.contains("LEFT JOIN `categories` AS `article>category`").reads(
                        json!([
                            {
                                "article.category?": 1,
                                "article.category_id": "c1",
                                "article>category.title": "Rust"
                            },
                            {
                                "article.category?": 0,
                                "article.category_id": null,
                                "article>category.title": null
                            }
                        ]),
                        json!([
                            { "category": { "id": "c1", "title": "Rust" } },
                            { "category": null }
                        ]),
                    )
                },
            )
    }

    #[test]
    fn test_reference_selections_skip_joins() {
        scenario().run().unwrap();
    }

    #[test]
    fn test_reference_detection() {
        let schema = blog().unwrap();
        let article = schema.node_by_name("Article").unwrap();
        let category = article.edge("category").unwrap();
        let parse = |fragment| {
            schema
                .node_by_name("Category")
                .unwrap()
                .parse_selections(&schema, fragment)
                .unwrap()
        };

        assert!(is_reference_selection(&schema, category, &parse("{ id }")));
        assert!(!is_reference_selection(&schema, category, &parse("{ id slug }")));
        assert!(!is_reference_selection(&schema, category, &parse("{ parent { id } }")));
    }
}

mod derived_fields {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("derived_fields")
            .find(
                "custom_field_reads_its_dependencies",
                "Article",
                json!({}),
                "{ title headline }",
                |a| {
                    a.sql(
                        "SELECT `article`.`title` AS `article.title`, \
                         `article`.`format` AS `article.format` \
                         FROM `articles` AS `article`",
                    )
                    .reads(
                        json!([
                            { "article.title": "Hello", "article.format": "HTML" },
                            { "article.title": "Draft", "article.format": null }
                        ]),
                        json!([
                            { "title": "Hello", "format": "HTML", "headline": "Hello [HTML]" },
                            { "title": "Draft", "format": null, "headline": "Draft" }
                        ]),
                    )
                },
            )
            .find(
                "custom_field_on_edge_existence",
                "Category",
                json!({}),
                "{ slug hasParent }",
                |a| {
                    a.contains("(`category`.`parent_id` IS NOT NULL) AS `category.parent?`")
                        .reads(
                            json!([{ "category.slug": "rust", "category.parent?": 1 }]),
                            json!([{ "slug": "rust", "parent": true, "hasParent": true }]),
                        )
                },
            )
            .find(
                "unique_reverse_edge",
                "Article",
                json!({}),
                "{ body { content } }",
                |a| {
                    a.contains("LEFT JOIN `article_bodies` AS `article>body`").reads(
                        json!([
                            { "article>body.article_id": "a1", "article>body.content": "Hi" },
                            { "article>body.article_id": null, "article>body.content": null }
                        ]),
                        json!([{ "body": { "content": "Hi" } }, { "body": null }]),
                    )
                },
            )
            .find(
                "reverse_edge_count",
                "Article",
                json!({}),
                "{ tagsCount }",
                |a| {
                    a.contains("AS `article.#tagsCount`")
                        .ungrouped()
                        .reads(json!([{ "article.#tagsCount": 2 }]), json!([{ "tagsCount": 2 }]))
                },
            )
            .find(
                "to_many_reverse_edge_is_deferred",
                "Article",
                json!({}),
                "{ id tags { position } }",
                |a| {
                    a.sql("SELECT `article`.`id` AS `article.id` FROM `articles` AS `article`")
                        .reads(
                            json!([{ "article.id": "a1" }]),
                            json!([{
                                "id": "a1",
                                "tags": { "deferred": "tags", "parent": { "id": "a1" } }
                            }]),
                        )
                },
            )
    }

    #[test]
    fn test_derived_fields_are_rebuilt() {
        scenario().run().unwrap();
    }
}

mod merging {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("merging")
            .find(
                "repeated_edges_share_a_join",
                "Article",
                json!({ "where": { "category": { "title": "Rust" } } }),
                "{ category { title } category { slug } }",
                |a| a.contains("LEFT JOIN `categories` AS `article>category` ON").excludes("#1"),
            )
            .find(
                "conflicting_arguments",
                "Article",
                json!({}),
                "{ tags(first: 1) { position } tags(first: 2) { position } }",
                |a| a.error("conflicting selections for \"tags\""),
            )
    }

    #[test]
    fn test_selections_merge_by_key() {
        scenario().run().unwrap();
    }

    const PIECES: [&str; 7] = [
        "id",
        "title",
        "category { id }",
        "category { title }",
        "createdBy { id }",
        "createdBy { name }",
        "tagsCount",
    ];

    /// Projected column names, sorted, and the number of joins.
    fn shape(pieces: &[&str]) -> (Vec<String>, usize) {
        let schema = blog().unwrap();
        let article = schema.node_by_name("Article").unwrap();
        let fragment = format!("{{ {} }}", pieces.join(" "));
        let args = FindArgs::new(article.parse_selections(&schema, &fragment).unwrap());
        let statement = StatementBuilder::new(&schema).find("Article", &args).unwrap();

        let sql = statement.sql();
        let mut columns: Vec<String> = sql
            .split(" AS `")
            .skip(1)
            .filter_map(|part| part.split('`').next())
            .map(str::to_string)
            .collect();
        columns.sort();
        (columns, sql.matches(" LEFT JOIN ").count())
    }

    proptest! {
        #[test]
        fn prop_merge_is_order_independent(pieces in Just(PIECES.to_vec()).prop_shuffle()) {
            let (columns, joins) = shape(&pieces);
            let (expected_columns, expected_joins) = shape(&PIECES);

            prop_assert_eq!(columns, expected_columns);
            prop_assert_eq!(joins, expected_joins);
            prop_assert_eq!(joins, 2);
        }
    }
}

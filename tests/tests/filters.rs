//! Filters on the blog schema, from client input to `WHERE` clauses.

use trellis_tests::prelude::*;

mod empty_lists {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("empty_lists")
            // The empty `not_in` list holds for every row, so the whole OR does
            .find(
                "or_collapses_to_true",
                "Article",
                json!({ "where": { "OR": [
                    { "format_in": null },
                    { "format_in": [] },
                    { "format_not_in": null },
                    { "format_not_in": [] }
                ] } }),
                "{ id }",
                |a| a.sql("SELECT `article`.`id` AS `article.id` FROM `articles` AS `article`"),
            )
            .find(
                "empty_in_matches_nothing",
                "Article",
                json!({ "where": { "format_in": [] } }),
                "{ id }",
                |a| a.where_clause("FALSE"),
            )
            .find(
                "single_in_is_equality",
                "Article",
                json!({ "where": { "format_in": ["HTML", "HTML"] } }),
                "{ id }",
                |a| {
                    a.where_clause(
                        "(`article`.`format` IS NOT NULL AND `article`.`format` = 'HTML')",
                    )
                },
            )
            .find(
                "in_with_null",
                "Article",
                json!({ "where": { "format_in": ["HTML", null] } }),
                "{ id }",
                |a| {
                    a.where_clause(
                        "(`article`.`format` IS NULL OR `article`.`format` IN ('HTML'))",
                    )
                },
            )
    }

    #[test]
    fn test_empty_lists_collapse() {
        scenario().run().unwrap();
    }
}

mod required_edges {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("required_edges")
            .find(
                "empty_or_under_required_edge",
                "Article",
                json!({ "where": { "createdBy": { "OR": [] } } }),
                "{ id }",
                |a| {
                    a.sql(
                        "SELECT `article`.`id` AS `article.id` FROM `articles` AS `article` \
                         WHERE FALSE",
                    )
                },
            )
            .count(
                "count_under_required_edge",
                "Article",
                json!({ "createdBy": { "OR": [] } }),
                |a| a.sql("SELECT COUNT(*) AS `count` FROM `articles` AS `article` WHERE FALSE"),
            )
            .find(
                "empty_and_under_required_edge",
                "Article",
                json!({ "where": { "createdBy": {} } }),
                "{ id }",
                |a| a.no_where(),
            )
            .find(
                "null_on_required_edge",
                "Article",
                json!({ "where": { "createdBy": null } }),
                "{ id }",
                |a| a.error("expected a non-null value"),
            )
    }

    #[test]
    fn test_required_edges_fold_constant_filters() {
        scenario().run().unwrap();
    }
}

mod foreign_keys {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("foreign_keys")
            .find(
                "identifier_filter_reads_foreign_key",
                "Article",
                json!({ "where": { "createdBy": { "id": "u1" } } }),
                "{ id }",
                |a| {
                    a.sql(
                        "SELECT `article`.`id` AS `article.id` FROM `articles` AS `article` \
                         WHERE `article`.`created_by_id` = 'u1'",
                    )
                },
            )
            .find(
                "unset_nullable_edge",
                "Article",
                json!({ "where": { "category": null } }),
                "{ id }",
                |a| {
                    a.where_clause("NOT (`article`.`category_id` IS NOT NULL)")
                        .excludes("JOIN")
                },
            )
            .find(
                "other_leaves_need_a_join",
                "Article",
                json!({ "where": { "createdBy": { "name": "Ada" } } }),
                "{ id }",
                |a| {
                    a.sql(
                        "SELECT `article`.`id` AS `article.id` FROM `articles` AS `article` \
                         LEFT JOIN `users` AS `article>createdBy` \
                         ON `article>createdBy`.`id` = `article`.`created_by_id` \
                         WHERE (`article>createdBy`.`id` IS NOT NULL \
                         AND `article>createdBy`.`name` = 'Ada')",
                    )
                },
            )
            .find(
                "identifier_of_tag_link",
                "ArticleTag",
                json!({ "where": { "article": { "id": "a1" }, "tag": { "id": "t1" } } }),
                "{ position }",
                |a| {
                    a.where_clause(
                        "(`articletag`.`article_id` = 'a1' AND `articletag`.`tag_id` = 't1')",
                    )
                    .excludes("JOIN")
                },
            )
    }

    #[test]
    fn test_reference_filters_avoid_joins() {
        scenario().run().unwrap();
    }
}

mod to_many {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("to_many")
            .find(
                "some_groups_by_identifier",
                "Article",
                json!({ "where": { "tags_some": { "position": 1 } } }),
                "{ id title }",
                |a| {
                    a.contains(
                        "LEFT JOIN `article_tags` AS `article>tags` \
                         ON `article>tags`.`article_id` = `article`.`id` \
                         AND `article>tags`.`position` = 1 WHERE",
                    )
                    .where_clause("`article>tags`.`article_id` IS NOT NULL")
                    .grouped_by("`article`.`id`")
                },
            )
            .find(
                "none_negates_the_probe",
                "Article",
                json!({ "where": { "tags_none": {} } }),
                "{ id }",
                |a| {
                    a.where_clause("NOT (`article>tags`.`article_id` IS NOT NULL)")
                        .grouped_by("`article`.`id`")
                },
            )
            .find(
                "to_many_below_to_one",
                "ArticleTag",
                json!({ "where": { "article": { "tags_some": { "position": 2 } } } }),
                "{ position }",
                |a| {
                    a.grouped_by(
                        "`articletag`.`article_id`, `articletag`.`tag_id`, `articletag>article`.`id`",
                    )
                },
            )
            .find(
                "joined_selections_are_grouped",
                "Article",
                json!({ "where": { "tags_some": { "position": 1 } } }),
                "{ id createdBy { name } body { content } }",
                |a| {
                    a.contains("`article>createdBy`.`name` AS `article>createdBy.name`")
                        .grouped_by(
                            "`article`.`id`, `article>createdBy`.`id`, `article>body`.`article_id`",
                        )
                },
            )
            .find(
                "to_one_joins_stay_ungrouped",
                "Article",
                json!({ "where": { "category": { "title": "Rust" } } }),
                "{ id }",
                |a| a.contains("LEFT JOIN `categories`").ungrouped(),
            )
            .count(
                "count_distinct_when_grouped",
                "Article",
                json!({ "tags_some": {} }),
                |a| {
                    a.contains("SELECT COUNT(DISTINCT `article`.`id`) AS `count`")
                        .reads(json!([{ "count": "12" }]), json!(12))
                },
            )
    }

    #[test]
    fn test_to_many_joins_group_rows() {
        scenario().run().unwrap();
    }
}

mod input_errors {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("input_errors")
            .find("unknown_node", "Post", json!({}), "{ id }", |a| {
                a.error("unknown node 'Post'")
            })
            .find(
                "enum_value_outside_its_type",
                "Article",
                json!({ "where": { "format": "PDF" } }),
                "{ id }",
                |a| a.error("expected one of ArticleFormat"),
            )
            .find(
                "unknown_selection",
                "Article",
                json!({}),
                "{ titel }",
                |a| a.error("unknown field 'titel'"),
            )
    }

    #[test]
    fn test_invalid_requests_are_rejected() {
        scenario().run().unwrap();
    }
}

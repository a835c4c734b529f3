//! SQL compiled by the query builder, per dialect.

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use tabula::{Db, Direction, Value};
use tests::{fixtures::shop, MockDriver};

fn both() -> [(MockDriver, Db); 2] {
    let mysql = MockDriver::mysql();
    let postgresql = MockDriver::postgresql();
    let mysql_db = shop(&mysql);
    let postgresql_db = shop(&postgresql);
    [(mysql, mysql_db), (postgresql, postgresql_db)]
}

#[tokio::test]
async fn bare_column_shared_by_two_tables_is_ambiguous() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .where_("name", "=", "Ann");

    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_ambiguous_column());
    assert_eq!(
        err.to_string(),
        "column reference `name` is ambiguous; matches purchase, customer"
    );
    assert!(query.last_error().is_some_and(|err| err.is_ambiguous_column()));

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .where_("customer.name", "=", "Ann");

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT purchase.id AS \"purchase:id\", purchase.customer_id AS \"purchase:customer_id\", \
         purchase.name AS \"purchase:name\", purchase.total AS \"purchase:total\" \
         FROM purchase, customer \
         WHERE purchase.customer_id = customer.id AND customer.name = 'Ann';"
    );

    // Nothing is executed to compile
    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn column_resolves_after_later_extend() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    // `vip` only exists on `customer`, joined after the filter is added
    let mut query = db.query("purchase").await.where_("vip", "IS TRUE", ());
    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_unknown_column());

    let mut query = db
        .query("purchase")
        .await
        .where_("vip", "IS TRUE", ())
        .extend("customer")
        .as_ids();

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT purchase.id AS \"purchase:id\" FROM purchase, customer \
         WHERE purchase.customer_id = customer.id AND customer.vip IS TRUE;"
    );
}

#[tokio::test]
async fn qualified_column_of_unjoined_table() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("purchase").await.where_("customer.name", "=", "Ann");
    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_unknown_column());
    assert_eq!(
        err.to_string(),
        "no such column: customer.name; table `customer` is not joined (yet)"
    );
}

#[tokio::test]
async fn pagination_diverges_per_dialect() {
    let expected = [
        "SELECT customer.id AS \"customer:id\", customer.name AS \"customer:name\", \
         customer.vip AS \"customer:vip\" FROM customer ORDER BY customer.name ASC LIMIT 10,5;",
        "SELECT customer.id AS \"customer:id\", customer.name AS \"customer:name\", \
         customer.vip AS \"customer:vip\" FROM customer ORDER BY customer.name ASC LIMIT 5 OFFSET 10;",
    ];

    for ((_, mut db), expected) in both().into_iter().zip(expected) {
        let mut query = db
            .query("customer")
            .await
            .order_by([("name", Direction::Asc)])
            .offset(11)
            .limit(5);

        assert_eq!(assert_ok!(query.select_sql(&mut db).await), expected);
    }
}

#[tokio::test]
async fn first_page_has_no_offset() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .order_by([("id", Direction::Desc)])
        .offset(1)
        .limit(20);

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT customer.id AS \"customer:id\" FROM customer ORDER BY customer.id DESC LIMIT 20;"
    );
}

#[tokio::test]
async fn explicit_groups_set_precedence() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    // (A OR B) AND NOT (C)
    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .start_group()
        .where_("name", "=", "Ann")
        .or()
        .where_("name", "=", "Bob")
        .end_group()
        .and()
        .not()
        .start_group()
        .where_("vip", "IS TRUE", ())
        .end_group();

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE (customer.name = 'Ann' OR customer.name = 'Bob') AND NOT (customer.vip IS TRUE);"
    );

    // Same groups, appended in the other order
    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .not()
        .start_group()
        .where_("vip", "IS TRUE", ())
        .end_group()
        .start_group()
        .where_("name", "=", "Ann")
        .or()
        .where_("name", "=", "Bob")
        .end_group();

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE NOT (customer.vip IS TRUE) AND (customer.name = 'Ann' OR customer.name = 'Bob');"
    );
}

#[tokio::test]
async fn chained_operand_binds_after_pending_or() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .where_("name", "=", "Ann")
        .or()
        .where_("name", "=", "Bob")
        .where_("vip", "=", true);

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE (customer.name = 'Ann' OR customer.name = 'Bob') AND customer.vip = '1';"
    );
}

#[tokio::test]
async fn disjunction_is_grouped_after_join_conditions() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .as_ids()
        .where_("total", ">", 100)
        .or()
        .where_("customer.vip", "IS TRUE", ());

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT purchase.id AS \"purchase:id\" FROM purchase, customer \
         WHERE purchase.customer_id = customer.id \
         AND (purchase.total > 100 OR customer.vip IS TRUE);"
    );
}

#[tokio::test]
async fn xor_and_regexp_rewrites() {
    let expected = [
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE (customer.vip IS TRUE XOR customer.name REGEXP '^A') \
         AND customer.name NOT REGEXP 'z$';",
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE ((customer.vip IS TRUE) <> (customer.name ~ '^A')) \
         AND customer.name !~ 'z$';",
    ];

    for ((_, mut db), expected) in both().into_iter().zip(expected) {
        let mut query = db
            .query("customer")
            .await
            .as_ids()
            .where_("vip", "is true", ())
            .xor()
            .where_("name", "regexp", "^A")
            .where_("name", "NOT  REGEXP", "z$");

        assert_eq!(assert_ok!(query.select_sql(&mut db).await), expected);
    }
}

#[tokio::test]
async fn list_and_null_tests() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .as_ids()
        .is_in("id", vec![1, 2, 3])
        .is_not_in("name", ["gift", "sample"])
        .is_null("customer_id")
        .where_("total", "!=", 0)
        .where_("name", "not like", "%test%");

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT purchase.id AS \"purchase:id\" FROM purchase \
         WHERE purchase.id IN (1, 2, 3) AND purchase.name NOT IN ('gift', 'sample') \
         AND purchase.customer_id IS NULL AND purchase.total <> 0 \
         AND purchase.name NOT LIKE '%test%';"
    );
}

#[tokio::test]
async fn raw_fragments_escape_per_dialect() {
    let expected = [
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE customer.vip = '1' AND (customer.name = 'O\\'Brien' OR customer.id = 3);",
        "SELECT customer.id AS \"customer:id\" FROM customer \
         WHERE customer.vip = '1' AND (customer.name = 'O''Brien' OR customer.id = 3);",
    ];

    for ((_, mut db), expected) in both().into_iter().zip(expected) {
        let mut query = db
            .query("customer")
            .await
            .as_ids()
            .where_("vip", "=", true)
            .raw_where(
                "customer.name = ? OR customer.id = ?",
                [Value::from("O'Brien"), Value::from(3)],
            );

        assert_eq!(assert_ok!(query.select_sql(&mut db).await), expected);
    }
}

#[tokio::test]
async fn raw_fragment_placeholder_mismatch() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("customer")
        .await
        .raw_where("customer.id = ? OR customer.id = ?", [1]);

    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_invalid_statement());
}

#[tokio::test]
async fn select_forces_rows_and_defers_bare_columns() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .comment("nightly */ report")
        .distinct(true)
        .select("total")
        .select("customer")
        .select("missing")
        .select_raw("COUNT(*) AS n")
        .extend("customer")
        .group_by(["customer.id"]);

    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT /* nightly  report */ DISTINCT purchase.total AS \"purchase:total\", \
         customer.id AS \"customer:id\", customer.name AS \"customer:name\", \
         customer.vip AS \"customer:vip\", COUNT(*) AS n \
         FROM purchase, customer WHERE purchase.customer_id = customer.id \
         GROUP BY customer.id;"
    );
}

#[tokio::test]
async fn count_drops_order_and_window() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .where_("total", ">=", 10)
        .order_by([("total", Direction::Desc)])
        .limit(10);

    assert_eq!(
        assert_ok!(query.count_sql(&mut db).await),
        "SELECT COUNT(*) AS count FROM purchase WHERE purchase.total >= 10;"
    );
}

#[tokio::test]
async fn multi_table_update_forms() {
    let expected = [
        "UPDATE purchase, customer SET purchase.total = 0, purchase.name = 'void' \
         WHERE purchase.customer_id = customer.id AND customer.name = 'Ann';",
        "UPDATE purchase SET total = 0, name = 'void' FROM customer \
         WHERE purchase.customer_id = customer.id AND customer.name = 'Ann';",
    ];

    for ((_, mut db), expected) in both().into_iter().zip(expected) {
        let mut query = db
            .query("purchase")
            .await
            .extend("customer")
            .where_("customer.name", "=", "Ann");

        let sql = query
            .update_sql(
                &mut db,
                [("total", Value::from(0)), ("purchase.name", Value::from("void"))],
            )
            .await;

        assert_eq!(assert_ok!(sql), expected);
    }
}

#[tokio::test]
async fn update_outside_primary_table_fails() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .where_("customer.name", "=", "Ann");

    let err = assert_err!(query.update(&mut db, [("customer.vip", true)]).await);
    assert!(err.is_invalid_statement());
    assert_eq!(
        err.to_string(),
        "invalid statement: cannot SET `customer.vip`; only columns of `purchase` can be updated"
    );

    // `vip` resolves to `customer` when bare, too
    let err = assert_err!(query.update(&mut db, [("vip", true)]).await);
    assert!(err.is_invalid_statement());

    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn qualified_column_must_exist_on_its_table() {
    for (driver, mut db) in both() {
        let mut query = db.query("purchase").await.where_("purchase.nope", "=", 1);

        let err = assert_err!(query.select_sql(&mut db).await);
        assert!(err.is_unknown_column());
        assert_eq!(err.to_string(), "no such column: purchase.nope");

        // Text after the table name is never passed through as SQL
        let mut query = db
            .query("purchase")
            .await
            .where_("purchase.id = 1 OR 1", "=", 1);

        let err = assert_err!(query.select_sql(&mut db).await);
        assert!(err.is_unknown_column());

        assert!(driver.exec_log().is_empty());
    }
}

#[tokio::test]
async fn update_key_is_a_single_primary_column() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("purchase").await;

    let err = assert_err!(
        query
            .update_sql(&mut db, [("purchase.total = 0, name", Value::from("x"))])
            .await
    );
    assert!(err.is_unknown_column());
    assert_eq!(err.to_string(), "no such column: purchase.total = 0, name");

    let err = assert_err!(query.update(&mut db, [("purchase.nope", 1)]).await);
    assert!(err.is_unknown_column());

    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn multi_table_delete_forms() {
    let expected = [
        "DELETE purchase.* FROM purchase, customer \
         WHERE purchase.customer_id = customer.id AND customer.vip IS FALSE;",
        "DELETE FROM purchase USING customer \
         WHERE purchase.customer_id = customer.id AND customer.vip IS FALSE;",
    ];

    for ((_, mut db), expected) in both().into_iter().zip(expected) {
        let mut query = db
            .query("purchase")
            .await
            .extend("customer")
            .is_false("vip");

        assert_eq!(assert_ok!(query.delete_sql(&mut db).await), expected);
    }
}

#[tokio::test]
async fn single_table_delete_runs() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);
    driver.respond_count("DELETE FROM purchase", 4);

    let mut query = db.query("purchase").await.where_("total", "<", 1);
    assert_eq!(assert_ok!(query.delete(&mut db).await), 4);
    assert_eq!(db.affected_rows(), 4);

    assert_eq!(
        driver.exec_log().statements(),
        ["DELETE FROM purchase WHERE purchase.total < 1;"]
    );
}

#[tokio::test]
async fn join_through_tables() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("tag").await.extend("post").as_ids();
    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT tag.id AS \"tag:id\" FROM tag, post_tag, post \
         WHERE post_tag.tag_id = tag.id AND post_tag.post_id = post.id;"
    );

    let mut query = db.query("supplier").await.extend("account_history").as_ids();
    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT supplier.id AS \"supplier:id\" FROM supplier, account, account_history \
         WHERE account.supplier_id = supplier.id AND account_history.account_id = account.id;"
    );

    // Each hop starts at the previous destination
    let mut query = db
        .query("profile")
        .await
        .extend("customer")
        .extend("purchase")
        .as_ids();
    assert_eq!(
        assert_ok!(query.select_sql(&mut db).await),
        "SELECT profile.id AS \"profile:id\" FROM profile, customer, purchase \
         WHERE profile.customer_id = customer.id AND purchase.customer_id = customer.id;"
    );
}

#[tokio::test]
async fn undeclared_hop_fails() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("customer").await.extend("tag");
    let err = assert_err!(query.find(&mut db).await);
    assert!(err.is_relation_not_declared());
    assert_eq!(err.to_string(), "no relation declared from `customer` to `tag`");
}

#[tokio::test]
async fn missing_table_is_reported_by_terminals() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("nope").await.where_("id", "=", 1);
    assert!(query.last_error().is_some_and(|err| err.is_unknown_table()));

    let err = assert_err!(query.find(&mut db).await);
    assert!(err.is_unknown_table());
    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn incomplete_filter_fails_to_compile() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db
        .query("customer")
        .await
        .start_group()
        .where_("vip", "IS TRUE", ());

    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_invalid_statement());

    let mut query = db.query("customer").await.where_("vip", "IS TRUE", ()).or();
    let err = assert_err!(query.select_sql(&mut db).await);
    assert!(err.is_invalid_statement());
}

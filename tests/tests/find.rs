//! Running queries and materializing their results.

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use tabula::{Direction, Item, Key, Mode, Value};
use tests::{count_row, fixtures::shop, row, MockDriver};

fn customer_id(id: i64) -> tabula::Row {
    row([("customer:id", id)])
}

#[tokio::test]
async fn paged_find_counts_first() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver
        .respond("COUNT(*)", count_row(25))
        .respond("LIMIT 10,10", (11..=20).map(customer_id).collect());

    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .order_by([("id", Direction::Asc)]);

    let res = assert_ok!(query.find_page(&mut db, 11, 10).await);

    assert_eq!(res.mode(), Mode::Ids);
    assert_eq!(res.ids(), (11..=20).collect::<Vec<_>>());
    assert_eq!(res.total(), 25);

    let paging = res.paging();
    assert_eq!(paging.page_start, 11);
    assert_eq!(paging.page_size, 10);
    assert_eq!(paging.page_num, 2);

    assert_eq!(
        driver.exec_log().statements(),
        [
            "SELECT COUNT(*) AS count FROM customer;",
            "SELECT customer.id AS \"customer:id\" FROM customer ORDER BY customer.id ASC LIMIT 10,10;",
        ]
    );
    assert_eq!(driver.pending(), 0);
}

#[tokio::test]
async fn unpaged_find_skips_count() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    driver.respond("FROM customer", vec![customer_id(3), customer_id(4)]);

    let mut query = db.query("customer").await.as_ids().is_true("vip");
    let res = assert_ok!(query.find(&mut db).await);

    assert_eq!(res.ids(), [3, 4]);
    assert_eq!(res.total(), 2);
    assert_eq!(res.paging().page_size, 2);
    assert_eq!(res.paging().page_num, 1);
    assert_eq!(driver.exec_log().count("COUNT(*)"), 0);
}

#[tokio::test]
async fn objects_are_deduplicated_and_linked() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let purchase_row = |purchase: &str, customer: &str| {
        row([
            ("purchase:id", purchase),
            ("purchase:customer_id", customer),
            ("purchase:name", "gift"),
            ("purchase:total", "12"),
            ("customer:id", customer),
            ("customer:name", "Ann"),
            ("customer:vip", "0"),
        ])
    };

    driver.respond(
        "FROM purchase, customer",
        vec![
            purchase_row("1", "7"),
            purchase_row("2", "7"),
            purchase_row("1", "7"),
        ],
    );

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .include_table("customer");

    let res = assert_ok!(query.find(&mut db).await);

    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some(
            "SELECT purchase.id AS \"purchase:id\", purchase.customer_id AS \"purchase:customer_id\", \
             purchase.name AS \"purchase:name\", purchase.total AS \"purchase:total\", \
             customer.id AS \"customer:id\", customer.name AS \"customer:name\", \
             customer.vip AS \"customer:vip\" \
             FROM purchase, customer WHERE purchase.customer_id = customer.id;"
        )
    );

    assert_eq!(res.mode(), Mode::Objects);
    assert_eq!(res.len(), 2);
    assert_eq!(res.object_count(), 3);
    assert_eq!(res.total(), 3);

    let roots: Vec<_> = res.objects().map(|model| model.key()).collect();
    assert_eq!(roots, ["purchase:1", "purchase:2"]);

    let first = assert_some!(res.object("purchase:1"));
    assert_eq!(first.get("total"), Some(&Value::I64(12)));
    assert!(!first.is_dirty());

    let customers = assert_ok!(res.related(first, "customer"));
    assert_len!(customers, 1);
    assert_eq!(customers[0].key(), "customer:7");
    assert_eq!(customers[0].get_str("name"), Some("Ann"));
    assert!(!customers[0].get_bool("vip"));

    let customer = assert_some!(res.object("customer:7"));
    let purchases = assert_ok!(res.related(customer, "purchase"));
    let keys: Vec<_> = purchases.iter().map(|model| model.key()).collect();
    assert_eq!(keys, ["purchase:1", "purchase:2"]);

    // No object links to itself
    assert_empty!(assert_ok!(res.related(first, "purchase")));
}

#[tokio::test]
async fn unincluded_tables_are_not_materialized() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver.respond(
        "FROM purchase, customer",
        vec![row([
            ("purchase:id", "1"),
            ("purchase:customer_id", "7"),
            ("purchase:name", "gift"),
            ("purchase:total", "12"),
        ])],
    );

    let mut query = db.query("purchase").await.extend("customer");
    let res = assert_ok!(query.find(&mut db).await);

    assert_eq!(res.len(), 1);
    assert_eq!(res.object_count(), 1);
    assert_none!(res.object("customer:7"));
}

#[tokio::test]
async fn include_requires_join() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut query = db.query("purchase").await.include_table("customer");
    let err = assert_err!(query.find(&mut db).await);
    assert!(err.is_invalid_statement());
    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn iteration_walks_roots_once() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver.respond(
        "FROM customer",
        vec![
            row([("customer:id", "7"), ("customer:name", "Ann"), ("customer:vip", "1")]),
            row([("customer:id", "9"), ("customer:name", "Bob"), ("customer:vip", "0")]),
        ],
    );

    let mut query = db.query("customer").await;
    let mut res = assert_ok!(query.find(&mut db).await);

    assert!(res.valid());
    assert_eq!(res.key(), Some(Key::Object("customer:7".to_string())));

    let names: Vec<_> = res
        .by_ref()
        .map(|(key, item)| match item {
            Item::Object(model) => (key, model.get_str("name").map(str::to_string)),
            item => panic!("unexpected item {item:?}"),
        })
        .collect();

    assert_eq!(
        names,
        [
            (Key::Object("customer:7".to_string()), Some("Ann".to_string())),
            (Key::Object("customer:9".to_string()), Some("Bob".to_string())),
        ]
    );

    assert!(!res.valid());
    assert_none!(res.next());

    res.rewind();
    assert!(res.valid());
    assert_eq!(res.count(), 2);
}

#[tokio::test]
async fn selected_columns_come_back_as_rows() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    driver.respond(
        "FROM purchase, customer",
        vec![row([("customer:name", "Ann"), ("purchase:total", "12")])],
    );

    let mut query = db
        .query("purchase")
        .await
        .extend("customer")
        .select("customer.name")
        .select("purchase:total");

    let mut res = assert_ok!(query.find(&mut db).await);
    assert_eq!(res.mode(), Mode::Rows);
    assert_len!(res.rows(), 1);
    assert_eq!(
        res.rows()[0].get("customer:name"),
        Some(&Value::from("Ann"))
    );

    let (key, item) = assert_some!(res.next());
    assert_eq!(key, Key::Index(0));
    assert!(matches!(item, Item::Row(_)));

    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some(
            "SELECT customer.name AS \"customer:name\", purchase.total AS \"purchase:total\" \
             FROM purchase, customer WHERE purchase.customer_id = customer.id;"
        )
    );

    let err = assert_err!(res.related(&assert_ok!(db.create("customer").await), "purchase"));
    assert!(err.is_invalid_statement());
}

#[tokio::test]
async fn fetch_loads_model_for_current_id() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver
        .respond("FROM customer ORDER BY", vec![customer_id(7)])
        .respond(
            "FROM customer WHERE customer.id = 7",
            vec![row([("id", "7"), ("name", "Ann"), ("vip", "1")])],
        );

    let mut query = db
        .query("customer")
        .await
        .as_ids()
        .order_by([("name", Direction::Desc)]);

    let res = assert_ok!(query.find(&mut db).await);
    let model = assert_some!(assert_ok!(res.fetch(&mut db).await));

    assert_eq!(model.id(), 7);
    assert_eq!(model.get_str("name"), Some("Ann"));
    assert!(model.get_bool("vip"));

    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some("SELECT * FROM customer WHERE customer.id = 7;")
    );
}

#[tokio::test]
async fn update_returns_affected_rows() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver.respond_count("UPDATE customer SET", 3);

    let mut query = db.query("customer").await.where_("name", "LIKE", "A%");
    let affected = assert_ok!(query.update(&mut db, [("vip", true)]).await);

    assert_eq!(affected, 3);
    assert_eq!(
        driver.exec_log().statements(),
        ["UPDATE customer SET customer.vip = '1' WHERE customer.name LIKE 'A%';"]
    );

    let err = assert_err!(query.update(&mut db, Vec::<(&str, Value)>::new()).await);
    assert!(err.is_invalid_statement());
}

#[tokio::test]
async fn driver_errors_reach_the_caller() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    driver.fail("FROM customer", tabula::Error::invalid_statement("server went away"));

    let mut query = db.query("customer").await;
    let err = assert_err!(query.find(&mut db).await);
    assert_eq!(err.to_string(), "invalid statement: server went away");
    assert!(query.last_error().is_some());
}

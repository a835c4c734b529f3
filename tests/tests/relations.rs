//! Following, linking and unlinking declared relations.

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use tabula::{Db, RelationKind, Value};
use tests::{
    count_row,
    fixtures::{describe_shop, load, shop},
    row, MockDriver,
};

#[tokio::test]
async fn belongs_to_follows_foreign_key() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut purchase = load(
        &driver,
        &mut db,
        "purchase",
        1,
        &[("customer_id", "7"), ("name", "gift"), ("total", "12")],
    )
    .await;

    driver.respond(
        "FROM customer WHERE",
        vec![row([("id", "7"), ("name", "Ann"), ("vip", "1")])],
    );

    let customer = assert_some!(assert_ok!(purchase.belongs_to(&mut db, "customer").await));
    assert_eq!(customer.id(), 7);
    assert_eq!(customer.get_str("name"), Some("Ann"));

    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some("SELECT * FROM customer WHERE customer.id = 7;")
    );
}

#[tokio::test]
async fn relation_table_names_are_normalized() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut purchase = load(&driver, &mut db, "purchase", 1, &[("customer_id", "7")]).await;

    driver.respond(
        "FROM customer WHERE",
        vec![row([("id", "7"), ("name", "Ann"), ("vip", "0")])],
    );

    let customer = assert_some!(assert_ok!(purchase.belongs_to(&mut db, "Customer").await));
    assert_eq!(customer.id(), 7);
    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some("SELECT * FROM customer WHERE customer.id = 7;")
    );

    driver.respond(
        "FROM customer WHERE",
        vec![row([("id", "7"), ("name", "Ann"), ("vip", "0")])],
    );

    let related = assert_ok!(purchase.related(&mut db, " CUSTOMER ", None).await);
    assert_eq!(related.len(), 1);
}

#[tokio::test]
async fn null_foreign_key_reads_nothing() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut purchase = load(&driver, &mut db, "purchase", 1, &[("name", "gift")]).await;
    let statements = driver.exec_log().len();

    assert_none!(assert_ok!(purchase.belongs_to(&mut db, "customer").await));
    assert_eq!(driver.exec_log().len(), statements);
}

#[tokio::test]
async fn has_many_and_related_default() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;

    let purchases = vec![
        row([("id", "1"), ("customer_id", "7"), ("total", "5")]),
        row([("id", "2"), ("customer_id", "7"), ("total", "9")]),
    ];
    driver.respond("FROM purchase WHERE", purchases.clone());

    let found = assert_ok!(customer.has_many(&mut db, "purchase").await);
    let ids: Vec<_> = found.iter().map(|purchase| purchase.id()).collect();
    assert_eq!(ids, [1, 2]);
    assert_eq!(found[1].get_i64("total"), Some(9));

    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some("SELECT * FROM purchase WHERE purchase.customer_id = 7;")
    );

    // Without a kind, the single declared relation is followed
    driver.respond("FROM purchase WHERE", purchases);
    assert_len!(assert_ok!(customer.related(&mut db, "purchase", None).await), 2);

    let err = assert_err!(customer.related(&mut db, "tag", None).await);
    assert!(err.is_relation_not_declared());
    assert!(customer.last_error().is_some_and(|err| err.is_relation_not_declared()));
}

#[tokio::test]
async fn has_one_rejects_several_rows() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;

    driver.respond(
        "FROM profile WHERE profile.customer_id = 7",
        vec![
            row([("id", "1"), ("customer_id", "7")]),
            row([("id", "2"), ("customer_id", "7")]),
        ],
    );

    let err = assert_err!(customer.has_one(&mut db, "profile").await);
    assert!(err.is_too_many_records());
    assert_eq!(
        err.to_string(),
        "too many records: has_one(profile) matched 2 rows"
    );
}

#[tokio::test]
async fn join_table_traversal_from_both_sides() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut post = load(&driver, &mut db, "post", 5, &[("title", "Hello")]).await;
    let mut tag = load(&driver, &mut db, "tag", 3, &[("label", "rust")]).await;

    driver.respond(
        "SELECT tag.*",
        vec![row([("id", "3"), ("label", "rust")])],
    );

    let tags = assert_ok!(post.has_and_belongs_to_many(&mut db, "tag").await);
    assert_len!(tags, 1);
    assert_eq!(tags[0].get_str("label"), Some("rust"));

    assert_ok!(tag.has_and_belongs_to_many(&mut db, "post").await);

    let log = driver.exec_log().statements();
    assert_eq!(
        &log[log.len() - 2..],
        [
            "SELECT tag.* FROM post_tag, tag WHERE post_tag.post_id = 5 AND post_tag.tag_id = tag.id;",
            "SELECT post.* FROM post_tag, post WHERE post_tag.tag_id = 3 AND post_tag.post_id = post.id;",
        ]
    );
}

#[tokio::test]
async fn through_traversal() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    let mut student = load(&driver, &mut db, "student", 1, &[("name", "Kim")]).await;
    let mut supplier = load(&driver, &mut db, "supplier", 4, &[("name", "Acme")]).await;

    driver.respond(
        "SELECT account_history.*",
        vec![row([("id", "6"), ("account_id", "2"), ("credit", "100")])],
    );

    assert_ok!(student.has_many_through(&mut db, "course").await);
    let history = assert_some!(assert_ok!(
        supplier.has_one_through(&mut db, "account_history").await
    ));
    assert_eq!(history.get_i64("credit"), Some(100));

    let log = driver.exec_log().statements();
    assert_eq!(
        &log[log.len() - 2..],
        [
            "SELECT course.* FROM enrollment, course \
             WHERE enrollment.student_id = 1 AND enrollment.course_id = course.id;",
            "SELECT account_history.* FROM account, account_history \
             WHERE account.supplier_id = 4 AND account_history.account_id = account.id;",
        ]
    );

    let courses = assert_ok!(
        student
            .related(&mut db, "course", Some(RelationKind::HasManyThrough))
            .await
    );
    assert_empty!(courses);
}

#[tokio::test]
async fn unsaved_record_cannot_traverse() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut customer = assert_ok!(db.create("customer").await);
    let err = assert_err!(customer.has_many(&mut db, "purchase").await);
    assert!(err.is_invalid_statement());
    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn belongs_to_link_round_trip() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut purchase = assert_ok!(db.create("purchase").await);
    assert_ok!(purchase.set("name", "gift"));
    assert_ok!(purchase.set("total", 12));

    let mut customer = assert_ok!(db.create("customer").await);
    assert_ok!(customer.set("name", "Ann"));

    assert_ok!(purchase.link(&mut db, &mut customer).await);

    assert_eq!(purchase.id(), 1);
    assert_eq!(customer.id(), 2);
    assert_eq!(purchase.get_i64("customer_id"), Some(2));

    assert_eq!(
        driver.exec_log().statements(),
        [
            "INSERT INTO purchase (name, total) VALUES ('gift', 12);",
            "INSERT INTO customer (name) VALUES ('Ann');",
            "SELECT COUNT(*) AS count FROM purchase \
             WHERE purchase.customer_id = 2 AND purchase.id = 1;",
            "UPDATE purchase SET purchase.customer_id = 2, purchase.name = 'gift', \
             purchase.total = 12 WHERE purchase.id = 1;",
        ]
    );

    // Linking again is a no-op once the link is visible
    driver.exec_log().clear();
    driver.respond("FROM purchase WHERE purchase.customer_id = 2", count_row(1));
    assert_ok!(purchase.link(&mut db, &mut customer).await);
    assert_eq!(driver.exec_log().len(), 1);

    driver.respond("FROM purchase WHERE purchase.customer_id = 2", count_row(1));
    assert!(assert_ok!(purchase.are_linked(&mut db, &customer).await));

    driver.respond("FROM purchase WHERE purchase.customer_id = 2", count_row(1));
    assert_ok!(purchase.unlink(&mut db, &mut customer).await);

    assert_eq!(purchase.get("customer_id"), Some(&Value::Null));
    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some(
            "UPDATE purchase SET purchase.customer_id = NULL, purchase.name = 'gift', \
             purchase.total = 12 WHERE purchase.id = 1;"
        )
    );

    // Unlinking what is not linked does nothing
    let statements = driver.exec_log().len();
    assert_ok!(purchase.unlink(&mut db, &mut customer).await);
    assert_eq!(driver.exec_log().len(), statements + 1);
}

#[tokio::test]
async fn has_many_link_sets_foreign_key_on_other_side() {
    let driver = MockDriver::postgresql();
    let mut db = shop(&driver);

    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;
    let mut purchase = assert_ok!(db.create("purchase").await);
    assert_ok!(purchase.set("name", "gift"));

    driver.exec_log().clear();
    assert_ok!(customer.link(&mut db, &mut purchase).await);

    assert_eq!(purchase.get_i64("customer_id"), Some(7));
    assert!(!purchase.is_dirty());
    assert_eq!(
        driver.exec_log().statements(),
        [
            "INSERT INTO purchase (name) VALUES ('gift');",
            "SELECT COUNT(*) AS count FROM purchase \
             WHERE purchase.customer_id = 7 AND purchase.id = 1;",
            "UPDATE purchase SET customer_id = 7, name = 'gift' WHERE purchase.id = 1;",
        ]
    );
}

#[tokio::test]
async fn has_one_link_refuses_second_record() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;
    let mut profile = load(&driver, &mut db, "profile", 9, &[("bio", "hi")]).await;

    driver.respond(
        "FROM profile WHERE profile.customer_id = 7;",
        count_row(1),
    );

    let err = assert_err!(customer.link(&mut db, &mut profile).await);
    assert!(err.is_too_many_records());
    assert!(customer.last_error().is_some_and(|err| err.is_too_many_records()));
    assert_eq!(driver.exec_log().with_keyword("UPDATE").len(), 0);
}

#[tokio::test]
async fn join_table_link_and_unlink() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut post = load(&driver, &mut db, "post", 5, &[("title", "Hello")]).await;
    let mut tag = load(&driver, &mut db, "tag", 3, &[("label", "rust")]).await;

    driver.exec_log().clear();
    assert_ok!(post.link(&mut db, &mut tag).await);

    assert_eq!(
        driver.exec_log().statements(),
        [
            "SELECT COUNT(*) AS count FROM post_tag \
             WHERE post_tag.post_id = 5 AND post_tag.tag_id = 3;",
            "INSERT INTO post_tag (post_id, tag_id) VALUES (5, 3);",
        ]
    );

    // The tag side resolves the same join table
    driver.respond("FROM post_tag WHERE", count_row(1));
    assert_eq!(assert_ok!(tag.link_count(&mut db, &post).await), 1);
    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some(
            "SELECT COUNT(*) AS count FROM post_tag \
             WHERE post_tag.tag_id = 3 AND post_tag.post_id = 5;"
        )
    );

    driver.respond("FROM post_tag WHERE", count_row(1));
    assert_ok!(post.unlink(&mut db, &mut tag).await);
    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some("DELETE FROM post_tag WHERE post_tag.post_id = 5 AND post_tag.tag_id = 3;")
    );
}

#[tokio::test]
async fn many_through_link_creates_middle_record() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut student = load(&driver, &mut db, "student", 1, &[("name", "Kim")]).await;
    let mut course = load(&driver, &mut db, "course", 2, &[("title", "Rust")]).await;

    driver.exec_log().clear();
    assert_ok!(student.link(&mut db, &mut course).await);

    assert_eq!(
        driver.exec_log().statements(),
        [
            "SELECT COUNT(*) AS count FROM student, enrollment, course \
             WHERE student.id = 1 AND enrollment.student_id = student.id \
             AND enrollment.course_id = course.id AND course.id = 2;",
            "INSERT INTO enrollment (student_id, course_id) VALUES (1, 2);",
        ]
    );

    // Two middle rows for the same pair cannot be unlinked unambiguously
    let enrollment = |id: &str| row([("id", id), ("student_id", "1"), ("course_id", "2")]);

    driver
        .respond("FROM student, enrollment, course", count_row(2))
        .respond("FROM enrollment WHERE", vec![enrollment("8"), enrollment("9")]);

    let err = assert_err!(student.unlink(&mut db, &mut course).await);
    assert!(err.is_too_many_records());

    driver
        .respond("FROM student, enrollment, course", count_row(1))
        .respond("FROM enrollment WHERE", vec![enrollment("8")]);

    assert_ok!(student.unlink(&mut db, &mut course).await);

    let log = driver.exec_log().statements();
    assert_eq!(
        &log[log.len() - 2..],
        [
            "SELECT * FROM enrollment WHERE enrollment.student_id = 1 AND enrollment.course_id = 2;",
            "DELETE FROM enrollment WHERE enrollment.id = 8;",
        ]
    );
}

#[tokio::test]
async fn one_through_link_points_target_at_new_middle() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut supplier = load(&driver, &mut db, "supplier", 4, &[("name", "Acme")]).await;
    let mut history = load(&driver, &mut db, "account_history", 6, &[("credit", "100")]).await;

    driver.exec_log().clear();
    driver.next_insert_id(11);
    assert_ok!(supplier.link(&mut db, &mut history).await);

    assert_eq!(history.get_i64("account_id"), Some(11));
    assert_eq!(
        driver.exec_log().with_keyword("INSERT"),
        ["INSERT INTO account (supplier_id) VALUES (4);"]
    );
    assert_eq!(
        driver.exec_log().last().as_deref(),
        Some(
            "UPDATE account_history SET account_history.account_id = 11, \
             account_history.credit = 100 WHERE account_history.id = 6;"
        )
    );

    // The target must point at one of this record's middle rows
    driver
        .respond("FROM supplier, account, account_history", count_row(1))
        .respond(
            "FROM account WHERE account.supplier_id = 4",
            vec![row([("id", "12"), ("supplier_id", "4")])],
        );

    let err = assert_err!(supplier.unlink(&mut db, &mut history).await);
    assert!(err.is_relation_mismatch());

    driver
        .respond("FROM supplier, account, account_history", count_row(1))
        .respond(
            "FROM account WHERE account.supplier_id = 4",
            vec![row([("id", "11"), ("supplier_id", "4")])],
        );

    assert_ok!(supplier.unlink(&mut db, &mut history).await);
    assert_eq!(history.get("account_id"), Some(&Value::Null));
}

#[tokio::test]
async fn middle_record_only_for_through_relations() {
    let driver = MockDriver::mysql();
    let mut db = shop(&driver);

    let mut purchase = load(&driver, &mut db, "purchase", 1, &[("name", "gift")]).await;
    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;
    let mut middle = assert_ok!(db.create("profile").await);

    driver.exec_log().clear();
    let err = assert_err!(
        purchase
            .link_through(&mut db, &mut customer, &mut middle)
            .await
    );
    assert!(err.is_invalid_statement());
    assert!(driver.exec_log().is_empty());
}

#[tokio::test]
async fn inverse_relation_must_complement() {
    let driver = MockDriver::mysql();
    describe_shop(&driver);
    driver
        .table("author", &[("id", "int"), ("name", "varchar(64)")])
        .table("book", &[("id", "int"), ("author_id", "int")]);

    let mut db = Db::builder()
        .register("author", |m| m.has_many("book"))
        .register("book", |m| m.has_one("author"))
        .build(driver.connection());

    let mut author = load(&driver, &mut db, "author", 1, &[("name", "Lee")]).await;
    let mut book = load(&driver, &mut db, "book", 2, &[]).await;

    let err = assert_err!(author.link(&mut db, &mut book).await);
    assert!(err.is_relation_mismatch());
}

#[tokio::test]
async fn two_relations_to_one_table_are_ambiguous() {
    let driver = MockDriver::mysql();
    describe_shop(&driver);

    let mut db = Db::builder()
        .register("customer", |m| m.has_many("purchase").has_one("purchase"))
        .register("purchase", |m| m.belongs_to("customer"))
        .build(driver.connection());

    let mut customer = load(&driver, &mut db, "customer", 7, &[("name", "Ann")]).await;

    let err = assert_err!(customer.related(&mut db, "purchase", None).await);
    assert!(err.is_ambiguous_relation());

    // An explicit kind disambiguates
    assert_ok!(
        customer
            .related(&mut db, "purchase", Some(RelationKind::HasMany))
            .await
    );
}

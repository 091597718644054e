//! End-to-end build scenarios over a small `fruit`/`Color`/`Fruit` starverse,
//! written to a tempdir per test. Mirrors the shape of scenario S1-S6 in the
//! fruit walkthrough: a happy path, each instantiation-time error, and both
//! file-role violations.

use std::fs;
use std::path::Path;

use starfig::error::StarfigError;
use starfig::{evaluator, label};

fn write_starverse(dir: &Path, starfig_body: &str) {
    fs::write(dir.join("STARVERSE"), "").unwrap();
    fs::create_dir_all(dir.join("fruit")).unwrap();
    fs::write(
        dir.join("fruit").join("fruit.star"),
        r#"
Color = Schema(fields = {
    "name": String(required = True),
    "hex": String(default = "#000000"),
})

Fruit = Schema(fields = {
    "name": String(required = True),
    "color": Object(Color),
    "tags": List(String),
})
"#,
    )
    .unwrap();
    fs::write(dir.join("fruit").join("STARFIG"), starfig_body).unwrap();
}

fn build(dir: &Path, raw_target: &str) -> Result<Vec<evaluator::Evaluated>, StarfigError> {
    let target = label::parse_build_target(dir, raw_target).unwrap();
    evaluator::evaluate_build_target(&target[0])
}

#[test]
fn s1_builds_a_valid_target() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(
    name = "apple",
    color = Color(name = "red", hex = "#ff0000"),
    tags = ["sweet", "crisp"],
)
"#,
    );

    let evaluated = build(dir.path(), "//fruit:apple").unwrap();
    assert_eq!(evaluated.len(), 1);
    assert_eq!(evaluated[0].name, "apple");
    assert!(evaluated[0].rendered.contains("\"name\": \"apple\""));
    assert!(evaluated[0].rendered.contains("\"sweet\""));
}

#[test]
fn s2_missing_required_field_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(color = Color(name = "red"), tags = [])
"#,
    );

    let err = build(dir.path(), "//fruit:apple").unwrap_err();
    assert!(matches!(err, StarfigError::Interpreter(_)));
    assert!(err.to_string().contains("Missing required field name in Fruit"));
}

#[test]
fn s3_unknown_keyword_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(name = "apple", color = Color(name = "red"), tags = [], bogus = 1)
"#,
    );

    let err = build(dir.path(), "//fruit:apple").unwrap_err();
    assert!(err.to_string().contains("Unknown keyword bogus in Fruit"));
}

#[test]
fn s4_type_mismatch_is_reported_with_the_value() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(name = 123, color = Color(name = "red"), tags = [])
"#,
    );

    let err = build(dir.path(), "//fruit:apple").unwrap_err();
    assert!(err.to_string().contains("Expected string type but got 123"));
}

#[test]
fn s5_starfig_stray_bindings_are_ignored_for_the_build_target() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

stray = 5
apple = Fruit(name = "apple", color = Color(name = "red"), tags = [])
"#,
    );

    let evaluated = build(dir.path(), "//fruit:apple").unwrap();
    assert_eq!(evaluated.len(), 1);
    assert_eq!(evaluated[0].name, "apple");
}

#[test]
fn s5_requesting_a_non_result_target_by_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

BadFig = Fruit
apple = Fruit(name = "apple", color = Color(name = "red"), tags = [])
"#,
    );

    let err = build(dir.path(), "//fruit:BadFig").unwrap_err();
    assert!(matches!(err, StarfigError::TargetNotAResult(_)));
    assert!(err.to_string().contains("is not a schema result"));
}

#[test]
fn s6_star_file_rejects_schema_instantiation() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("STARVERSE"), "").unwrap();
    fs::create_dir_all(dir.path().join("fruit")).unwrap();
    fs::write(
        dir.path().join("fruit").join("fruit.star"),
        r#"
Color = Schema(fields = {"name": String(required = True)})
bad = Color(name = "red")
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("fruit").join("STARFIG"),
        r#"
load("//fruit/fruit.star", "Color")

apple = Color(name = "red")
"#,
    )
    .unwrap();

    let err = build(dir.path(), "//fruit:apple").unwrap_err();
    assert!(err.to_string().contains("Schema types can only be instantiated in STARFIG files"));
}

#[test]
fn spread_target_collects_every_binding() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(name = "apple", color = Color(name = "red"), tags = [])
pear = Fruit(name = "pear", color = Color(name = "green"), tags = [])
"#,
    );

    let evaluated = build(dir.path(), "//fruit:...").unwrap();
    let names: Vec<&str> = evaluated.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["apple", "pear"]);
}

#[test]
fn missing_target_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_starverse(
        dir.path(),
        r#"
load("//fruit/fruit.star", "Fruit", "Color")

apple = Fruit(name = "apple", color = Color(name = "red"), tags = [])
"#,
    );

    let err = build(dir.path(), "//fruit:banana").unwrap_err();
    assert!(matches!(err, StarfigError::TargetNotFound(_)));
}

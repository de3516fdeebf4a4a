use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

const DICTIONARY: &str = r#"[
    [{"Type":"впс","Name":"Рені"},{"Type":"впс","Name":"Рені-2"}],
    [{"Type":"ГОРВ","Name":"Вилкове"}]
]"#;

fn tally() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tally"));
    cmd.env_remove("TALLY_DICTIONARY")
        .env_remove("TALLY_DICTIONARY_FILE")
        .env_remove("PORT")
        .arg("--quiet");
    cmd
}

fn write_table(path: &Path, rows: &[(&str, &str, &str)]) {
    let mut table = vec![vec![vec!["header"]; 9]];
    for (end, label, comment) in rows {
        let mut cells: Vec<Vec<&str>> = vec![Vec::new(); 9];
        cells[5] = vec![*end];
        cells[6] = vec![*label];
        cells[8] = vec![*comment];
        table.push(cells);
    }
    let rows: Vec<Value> = table
        .into_iter()
        .map(|cells| {
            let cells: Vec<Value> = cells
                .into_iter()
                .map(|paragraphs| serde_json::json!({ "paragraphs": paragraphs }))
                .collect();
            serde_json::json!({ "cells": cells })
        })
        .collect();
    fs::write(path, serde_json::json!({ "rows": rows }).to_string()).unwrap();
}

#[test]
fn report_prints_numbered_summary() {
    let dir = tempdir().unwrap();
    let dictionary = dir.path().join("dictionary.json");
    let day = dir.path().join("day.json");
    fs::write(&dictionary, DICTIONARY).unwrap();
    write_table(
        &day,
        &[
            ("19:10", "впс «Рені-2»", "ОПДК не виявлено"),
            ("20:00", "ГОРВ «Вилкове»", "затримано 1 особу"),
            ("21:00", "«Кілія»", ""),
        ],
    );

    tally()
        .arg("--dictionary")
        .arg(&dictionary)
        .arg("report")
        .arg(&day)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "1. Рені - польотів: 1, ОПДК не виявлено;\n2. Вилкове - польотів: 1, в 1 випадку затриманих;\n",
        ))
        .stdout(predicate::str::contains("[інше] Кілія: 1"));
}

#[test]
fn report_json_applies_early_filter() {
    let dir = tempdir().unwrap();
    let day = dir.path().join("day.json");
    let night = dir.path().join("night.json");
    let rows = [("09", "впс «Рені»", ""), ("22", "впс «Рені»", "")];
    write_table(&day, &rows);
    write_table(&night, &rows);

    let output = tally()
        .env("TALLY_DICTIONARY", DICTIONARY)
        .args(["report", "--format", "json"])
        .arg(&day)
        .arg("--early")
        .arg(&night)
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["schema_version"], 1);
    assert_eq!(body["report"]["pages"][0]["known_groups"][0]["total"], 2);
    assert_eq!(body["report"]["pages"][1]["known_groups"][0]["total"], 1);
    assert_eq!(body["report"]["total"][0]["count"], 3);
}

#[test]
fn unreadable_documents_are_listed_not_fatal() {
    let dir = tempdir().unwrap();
    let broken = dir.path().join("broken.docx");
    fs::write(&broken, b"not a document").unwrap();

    tally()
        .env("TALLY_DICTIONARY", DICTIONARY)
        .args(["report", "--format", "markdown"])
        .arg(&broken)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Skipped files"))
        .stdout(predicate::str::contains("`broken.docx`"));
}

#[test]
fn report_requires_a_dictionary() {
    let dir = tempdir().unwrap();
    let day = dir.path().join("day.json");
    write_table(&day, &[]);

    tally()
        .arg("report")
        .arg(&day)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no dictionary configured"));
}

#[test]
fn malformed_dictionary_aborts() {
    tally()
        .env("TALLY_DICTIONARY", r#"{"not":"groups"}"#)
        .arg("check-dictionary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TALLY_DICTIONARY"));
}

#[test]
fn check_dictionary_lists_canonical_names() {
    tally()
        .env("TALLY_DICTIONARY", DICTIONARY)
        .arg("check-dictionary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dictionary OK: 2 group(s), 3 name(s)"))
        .stdout(predicate::str::contains("1. впс Рені (+1 alias(es))"))
        .stdout(predicate::str::contains("2. ГОРВ Вилкове"));
}

#[test]
fn tokenize_splits_qualifier_and_name() {
    tally()
        .args(["tokenize", "ГОРВ ВАЗ 123", "впс «Рені»", "«Кілія»"])
        .assert()
        .success()
        .stdout("ГОРВ ВАЗ\t123\nвпс\tРені\n\tКілія\n");
}

#[test]
fn tokenize_respects_config_policy() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("tally.toml");
    fs::write(&config, "[parser]\nqualifier_policy = \"once\"\n").unwrap();

    let output = tally()
        .arg("--config")
        .arg(&config)
        .args(["tokenize", "--json", "ГОРВ ВАЗ 123"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["type"], "ГОРВ");
    assert_eq!(body[0]["name"], "ВАЗ 123");
}

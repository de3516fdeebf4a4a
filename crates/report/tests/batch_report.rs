use pretty_assertions::assert_eq;
use tally_parser::{RecordExtractor, Table, TableSource};
use tally_protocol::{Dictionary, Entry, Id, QualifiedName};
use tally_report::{Processor, ReportSettings};

fn data_row(end: &str, label: &str, comment: &str) -> Vec<Vec<String>> {
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); 9];
    cells[5] = vec![end.to_string()];
    cells[6] = vec![label.to_string()];
    if !comment.is_empty() {
        cells[8] = vec![comment.to_string()];
    }
    cells
}

fn table(rows: &[(&str, &str, &str)]) -> Table {
    let header = vec![vec!["header".to_string()]; 9];
    Table::from_rows(
        std::iter::once(header).chain(
            rows.iter()
                .map(|(end, label, comment)| data_row(end, label, comment)),
        ),
    )
}

fn processor(dictionary_json: &str) -> Processor {
    Processor::new(
        Dictionary::from_json_str(dictionary_json).unwrap(),
        RecordExtractor::default(),
        ReportSettings::default(),
    )
    .unwrap()
}

struct NoTables;

impl TableSource for NoTables {
    fn first_table(&self) -> Option<&Table> {
        None
    }
}

#[test]
fn one_file_known_and_unknown() {
    let processor = processor(r#"[[{"Type":"впс","Name":"X"}]]"#);
    let mut batch = processor.batch();
    batch.add_table(
        "day.docx",
        false,
        &table(&[("19", "впс «X»", ""), ("20", "впс «Y»", "")]),
    );
    let data = batch.finish();

    let x = QualifiedName::new("впс", "X");
    let y = QualifiedName::new("впс", "Y");

    assert_eq!(data.pages.len(), 1);
    assert_eq!(
        data.pages[0].known_groups[0].entries,
        vec![Entry::new(x.bare_id(), 1)]
    );
    assert_eq!(
        data.pages[0].unknown_entries,
        vec![Entry::new(y.bare_id(), 1)]
    );
    assert_eq!(data.total, vec![Entry::new(x.bare_id(), 1)]);
    assert_eq!(data.total_unknown.len(), 1);
    assert_eq!(data.total_unknown[0].id, y.bare_id());
    assert_eq!(data.total_unknown[0].count, 1);
    assert_eq!(data.summary, "1. X - польотів: 1, ОПДК не виявлено;\n");
    assert!(data.footnotes.is_empty());
}

#[test]
fn summary_follows_dictionary_order() {
    let processor = processor(
        r#"[
            [{"Type":"впс","Name":"A"},{"Type":"впс","Name":"B"}],
            [{"Type":"впс","Name":"C"}]
        ]"#,
    );
    let mut batch = processor.batch();
    batch.add_table(
        "a.docx",
        false,
        &table(&[
            ("21", "впс «C»", "затримано 1 особу"),
            ("22", "впс «B»", ""),
            ("23", "впс «C»", "ОПДК не виявлено"),
        ]),
    );
    let data = batch.finish();

    let lines: Vec<&str> = data.summary.lines().collect();
    assert_eq!(
        lines,
        vec![
            "1. A - польотів: 1, ОПДК не виявлено;",
            "2. C - польотів: 2, в 1 випадку затриманих;",
        ]
    );
    assert_eq!(data.footnotes.len(), 1);
    assert_eq!(
        data.footnotes[0].id,
        Id::new(QualifiedName::new("впс", "C"), "")
    );
}

#[test]
fn early_filter_applies_only_to_flagged_files() {
    let processor = processor(r#"[[{"Type":"впс","Name":"X"}]]"#);
    let rows = [("08:30", "впс «X»", ""), ("19:00", "впс «X»", "")];

    let mut batch = processor.batch();
    batch.add_table("regular.docx", false, &table(&rows));
    batch.add_table("early.docx", true, &table(&rows));
    let data = batch.finish();

    assert_eq!(data.pages[0].known_groups[0].total, 2);
    assert_eq!(data.pages[1].known_groups[0].total, 1);
    assert_eq!(data.total[0].count, 3);
}

#[test]
fn files_without_tables_are_reported_and_skipped() {
    let processor = processor(r#"[[{"Type":"впс","Name":"X"}]]"#);
    let mut batch = processor.batch();
    batch.add_table("empty.docx", false, &NoTables);
    batch.add_failure("broken.docx", "invalid zip archive");
    batch.add_table("ok.docx", false, &table(&[("20", "впс «X»", "")]));
    assert_eq!(batch.page_count(), 1);
    let data = batch.finish();

    assert_eq!(data.pages.len(), 1);
    assert_eq!(data.pages[0].filename, "ok.docx");
    let failed: Vec<&str> = data.errors.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(failed, vec!["empty.docx", "broken.docx"]);
    assert_eq!(data.errors[0].message, "document contains no table");
}

#[test]
fn report_serializes_as_plain_json() {
    let processor = processor(r#"[[{"Type":"впс","Name":"X"}]]"#);
    let mut batch = processor.batch();
    batch.add_table("day.docx", false, &table(&[("20", "«Z»", "")]));
    let data = batch.finish();

    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["total"][0]["name"], "X");
    assert_eq!(value["total_unknown"][0]["name"], "Z");
    assert_eq!(value["total_unknown"][0]["type"], "");
    assert_eq!(value["total_unknown"][0]["label"], "інше");
}

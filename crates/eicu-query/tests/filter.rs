//! Filter behavior against a small merged patient table.

use std::io::Write;
use std::sync::{Arc, Mutex};

use eicu_query::{ColumnType, FilterError, QueryTable};
use polars::prelude::{Column, DataFrame};
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;

fn patients() -> QueryTable {
    let df = DataFrame::new(vec![
        Column::new(
            "patientunitstayid".into(),
            [141296i64, 141297, 141298, 141299],
        ),
        Column::new(
            "gender".into(),
            [Some("Female"), Some("Male"), None, Some("Female")],
        ),
        Column::new(
            "heartrate_mean".into(),
            [Some(85.5f64), Some(102.25), None, Some(60.0)],
        ),
        Column::new("has_wbc".into(), [true, false, true, false]),
        Column::new("expired".into(), [false, true, false, false]),
        Column::new(
            "apacheadmissiondx".into(),
            [
                Some("Sepsis, pulmonary"),
                Some("CHF, congestive heart failure"),
                Some("Sepsis, renal/UTI"),
                None,
            ],
        ),
    ])
    .unwrap();
    QueryTable::new(df)
}

fn ids(df: &DataFrame) -> Vec<i64> {
    df.column("patientunitstayid")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn filter_ids(table: &QueryTable, column: &str, operator: &str, value: Value) -> Vec<i64> {
    ids(&table.filter(column, operator, &value).unwrap())
}

#[test]
fn string_and_numeric_ids_select_the_same_rows() {
    let table = patients();
    let by_string = table
        .filter_rows_json("patientunitstayid", "==", &json!("141296"))
        .unwrap();
    let by_number = table
        .filter_rows_json("patientunitstayid", "==", &json!(141296))
        .unwrap();
    assert_eq!(by_string, by_number);

    let rows: Value = serde_json::from_str(&by_number).unwrap();
    assert_eq!(rows[0]["patientunitstayid"], json!(141296));
    assert_eq!(rows[0]["gender"], json!("Female"));
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[test]
fn in_returns_exactly_the_listed_rows() {
    let table = patients();
    assert_eq!(
        filter_ids(&table, "patientunitstayid", "in", json!([141298, 141296, 999])),
        [141296, 141298]
    );
}

#[test]
fn in_does_not_coerce_list_elements() {
    let table = patients();
    assert!(filter_ids(&table, "patientunitstayid", "in", json!(["141296"])).is_empty());
    assert_eq!(
        filter_ids(&table, "gender", "in", json!(["Male"])),
        [141297]
    );
}

#[test]
fn in_with_scalar_is_an_error() {
    let err = patients()
        .filter("patientunitstayid", "in", &json!(141296))
        .unwrap_err();
    assert!(matches!(err, FilterError::InRequiresList { .. }));
    assert_eq!(
        err.to_string(),
        "Operator 'in' requires a list value for column 'patientunitstayid', got 141296"
    );
}

#[test]
fn unknown_column_names_it_and_lists_available() {
    let err = patients().filter("agee", "==", &json!(70)).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Column 'agee' not found."));
    assert!(message.contains("patientunitstayid, gender, heartrate_mean"));
}

#[test]
fn unknown_column_is_reported_before_operator() {
    let err = patients().filter("agee", "~=", &json!(70)).unwrap_err();
    assert!(matches!(err, FilterError::ColumnNotFound { .. }));
}

#[test]
fn unsupported_operator_lists_valid_ones() {
    let err = patients().filter("gender", "~=", &json!("Male")).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"Unsupported operator '~='. Supported operators: ==, !=, >, <, >=, <=, contains, in"
    );
}

#[test]
fn uncoercible_value_reports_column_and_type() {
    let err = patients()
        .filter("patientunitstayid", ">", &json!("abc"))
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"Cannot convert value "abc" to integer for column 'patientunitstayid'"#
    );
}

#[test]
fn out_of_range_integer_is_a_coercion_error() {
    let table = QueryTable::new(
        DataFrame::new(vec![Column::new(
            "patientunitstayid".into(),
            [1i64, 2, i64::MAX],
        )])
        .unwrap(),
    );
    for value in [json!(1e300), json!(u64::MAX), json!(-1e19)] {
        let err = table.filter("patientunitstayid", "==", &value).unwrap_err();
        assert!(
            matches!(
                err,
                FilterError::Coercion {
                    expected: ColumnType::Integer,
                    ..
                }
            ),
            "value {value}: {err}"
        );
    }
    assert_eq!(
        filter_ids(&table, "patientunitstayid", "==", json!(i64::MAX)),
        [i64::MAX]
    );
}

#[test]
fn in_null_does_not_match_nan_cells() {
    let table = QueryTable::new(
        DataFrame::new(vec![
            Column::new("patientunitstayid".into(), [1i64, 2, 3]),
            Column::new(
                "heartrate_mean".into(),
                [Some(80.0f64), Some(f64::NAN), None],
            ),
        ])
        .unwrap(),
    );
    assert!(filter_ids(&table, "heartrate_mean", "in", json!([null])).is_empty());
    assert_eq!(
        filter_ids(&table, "heartrate_mean", "in", json!([80, null])),
        [1]
    );
}

#[test]
fn boolean_value_on_text_column_compares_as_capitalized_text() {
    let table = QueryTable::new(
        DataFrame::new(vec![
            Column::new("patientunitstayid".into(), [1i64, 2, 3]),
            Column::new("verified".into(), ["True", "true", "False"]),
        ])
        .unwrap(),
    );
    assert_eq!(filter_ids(&table, "verified", "==", json!(true)), [1]);
    assert_eq!(filter_ids(&table, "verified", "contains", json!(false)), [3]);
}

#[test]
fn contains_works_on_integer_columns() {
    let table = patients();
    assert_eq!(
        filter_ids(&table, "patientunitstayid", "contains", json!("1412")),
        [141296, 141297, 141298, 141299]
    );
    assert_eq!(
        filter_ids(&table, "patientunitstayid", "contains", json!(97)),
        [141297]
    );
}

#[test]
fn contains_is_case_sensitive() {
    let table = patients();
    assert_eq!(
        filter_ids(&table, "apacheadmissiondx", "contains", json!("Sepsis")),
        [141296, 141298]
    );
    assert!(filter_ids(&table, "apacheadmissiondx", "contains", json!("sepsis")).is_empty());
}

#[test]
fn boolean_columns_accept_yes_and_one() {
    let table = patients();
    for value in [json!("yes"), json!("1"), json!(true), json!("TRUE")] {
        assert_eq!(
            filter_ids(&table, "has_wbc", "==", value.clone()),
            [141296, 141298],
            "value {value}"
        );
    }
    assert_eq!(
        filter_ids(&table, "expired", "==", json!("no")),
        [141296, 141298, 141299]
    );
}

#[test]
fn float_columns_compare_numerically() {
    let table = patients();
    assert_eq!(
        filter_ids(&table, "heartrate_mean", ">", json!(80)),
        [141296, 141297]
    );
    assert_eq!(
        filter_ids(&table, "heartrate_mean", "<=", json!("60")),
        [141299]
    );
    assert_eq!(
        filter_ids(&table, "heartrate_mean", ">=", json!(102.25)),
        [141297]
    );
}

#[test]
fn null_cells_never_match() {
    let table = patients();
    assert_eq!(
        filter_ids(&table, "gender", "!=", json!("Female")),
        [141297]
    );
    assert_eq!(
        filter_ids(&table, "heartrate_mean", "!=", json!(1000)),
        [141296, 141297, 141299]
    );
}

#[test]
fn head_is_bounded_by_table_length() {
    let table = patients();
    let head: Value = serde_json::from_str(&table.head_json(2).unwrap()).unwrap();
    assert_eq!(head.as_array().unwrap().len(), 2);
    assert_eq!(head[1]["patientunitstayid"], json!(141297));
    assert_eq!(table.head(50).height(), 4);
}

#[test]
fn schema_reports_types_and_row_count() {
    let schema = patients().schema();
    assert_eq!(schema.row_count, 4);
    let types: Vec<(&str, ColumnType)> = schema
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.column_type))
        .collect();
    assert_eq!(
        types,
        [
            ("patientunitstayid", ColumnType::Integer),
            ("gender", ColumnType::Text),
            ("heartrate_mean", ColumnType::Float),
            ("has_wbc", ColumnType::Boolean),
            ("expired", ColumnType::Boolean),
            ("apacheadmissiondx", ColumnType::Text),
        ]
    );

    let json: Value = serde_json::to_value(&schema).unwrap();
    assert_eq!(json["columns"][0]["column_type"], json!("integer"));
}

#[test]
fn loads_merged_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("complete_patient_data.csv");
    std::fs::write(
        &path,
        "patientunitstayid,age,lab_count,expired\n\
         141296,> 89,2,false\n\
         141297,67,0,true\n",
    )
    .unwrap();

    let table = QueryTable::from_csv(&path).unwrap();
    assert_eq!(table.height(), 2);
    assert_eq!(table.column_type("age").unwrap(), ColumnType::Text);
    assert_eq!(table.column_type("expired").unwrap(), ColumnType::Boolean);
    assert_eq!(filter_ids(&table, "age", "==", json!("> 89")), [141296]);
    assert_eq!(filter_ids(&table, "lab_count", "==", json!("0")), [141297]);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn coercion_decisions_are_logged_at_debug() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();

    let table = patients();
    let matched = tracing::subscriber::with_default(subscriber, || {
        table.filter("patientunitstayid", "==", &json!("141296"))
    })
    .unwrap();
    assert_eq!(matched.height(), 1);

    let output = logs.contents();
    assert!(output.contains("coerced filter value"), "{output}");
    assert!(output.contains("column_type=integer"), "{output}");
    assert!(output.contains("filter evaluated"), "{output}");
    // Raw values stay at trace.
    assert!(!output.contains("coercion detail"), "{output}");
}

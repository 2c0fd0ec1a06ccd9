//! End-to-end tests for building the merged patient table from CSV files.

use std::path::Path;

use eicu_ingest::{read_csv_table, write_csv_table};
use eicu_transform::{
    BuildOptions, EnrichmentStatus, SkipReason, build_patient_table,
};
use polars::prelude::{AnyValue, DataFrame, DataType};
use tempfile::TempDir;

const PATIENT: &str = "\
patientunitstayid,gender,age,unitdischargestatus
141296,Female,67,Alive
141297,Male,> 89,Expired
141298,Male,45,Alive
";

const APACHE_RESULT: &str = "\
apachepatientresultsid,patientunitstayid,apacheversion,apachescore,actualicumortality
1,141296,IV,55,ALIVE
2,141296,IVa,57,ALIVE
3,141297,IV,90,EXPIRED
";

const APACHE_VARS: &str = "\
apacheapsvarid,patientunitstayid,intubated,wbc,temperature
1,141296,0,12.1,36.6
2,141297,1,18.4,38.2
3,141297,1,18.4,38.2
";

const LABS: &str = "\
labid,patientunitstayid,labname,labresult
1,141296,WBC x 1000,12.1
2,141296,creatinine,1.1
3,141297,lactate,4.2
4,141297,bedside glucose,140
";

const VITALS: &str = "\
vitalperiodicid,patientunitstayid,observationoffset,heartrate,systemicsystolic,temperature
1,141296,5,80,120,
2,141296,10,90,,36.8
3,141297,5,110,95,38.5
";

fn write_fixture(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

fn full_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_fixture(
        dir.path(),
        &[
            ("patient.csv", PATIENT),
            ("apachePatientResult.csv", APACHE_RESULT),
            ("apacheApsVar.csv", APACHE_VARS),
            ("lab.csv", LABS),
            ("vitalPeriodic.csv", VITALS),
        ],
    );
    dir
}

fn value<'a>(df: &'a DataFrame, column: &str, row: usize) -> AnyValue<'a> {
    df.column(column).unwrap().get(row).unwrap()
}

#[test]
fn builds_one_row_per_stay_despite_duplicate_apache_rows() {
    let dir = full_fixture();
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(built.data.height(), 3);
    assert_eq!(built.report.rows, 3);
    assert_eq!(built.report.duplicates_removed(), 2);
    assert_eq!(value(&built.data, "patientunitstayid", 0), AnyValue::Int64(141296));
    assert_eq!(value(&built.data, "apacheversion", 0), AnyValue::String("IV"));
}

#[test]
fn lab_count_is_zero_for_stays_without_labs() {
    let dir = full_fixture();
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "lab_count", 0), AnyValue::Int64(2));
    assert_eq!(value(&built.data, "lab_count", 1), AnyValue::Int64(2));
    assert_eq!(value(&built.data, "lab_count", 2), AnyValue::Int64(0));
}

#[test]
fn critical_lab_flags_match_lab_names() {
    let dir = full_fixture();
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "has_wbc", 0), AnyValue::Boolean(true));
    assert_eq!(value(&built.data, "has_wbc", 1), AnyValue::Boolean(false));
    assert_eq!(value(&built.data, "has_glucose", 1), AnyValue::Boolean(true));
    assert_eq!(value(&built.data, "has_creatinine", 2), AnyValue::Boolean(false));
    assert!(built.report.enrichment("labs").unwrap().is_applied());
}

#[test]
fn expired_flag_follows_outcome_text() {
    let dir = full_fixture();
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "expired", 0), AnyValue::Boolean(false));
    assert_eq!(value(&built.data, "expired", 1), AnyValue::Boolean(true));
    // 141298 has no APACHE result row.
    assert_eq!(value(&built.data, "expired", 2), AnyValue::Boolean(false));
    assert!(built.report.outcome_column_present);
}

#[test]
fn vitals_are_summarized_per_stay() {
    let dir = full_fixture();
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "heartrate_mean", 0), AnyValue::Float64(85.0));
    assert_eq!(value(&built.data, "heartrate_max", 0), AnyValue::Int64(90));
    assert_eq!(
        built.data.column("heartrate_max").unwrap().dtype(),
        &DataType::Int64
    );
    assert_eq!(value(&built.data, "temperature_mean", 1), AnyValue::Float64(38.5));
    assert_eq!(value(&built.data, "heartrate_mean", 2), AnyValue::Null);
}

#[test]
fn missing_files_are_reported_by_name() {
    let dir = TempDir::new().unwrap();
    write_fixture(
        dir.path(),
        &[
            ("patient.csv", PATIENT),
            ("apachePatientResult.csv", APACHE_RESULT),
            ("apacheApsVar.csv", APACHE_VARS),
        ],
    );
    let err = build_patient_table(dir.path(), &BuildOptions::default()).unwrap_err();

    assert_eq!(
        err.missing_files().unwrap(),
        &["lab.csv".to_string(), "vitalPeriodic.csv".to_string()]
    );
}

#[test]
fn unusable_lab_table_degrades_to_zero_counts() {
    let dir = full_fixture();
    write_fixture(
        dir.path(),
        &[("lab.csv", "labid,patientunitstayid,labresult\n1,141296,12.1\n")],
    );
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "lab_count", 0), AnyValue::Int64(0));
    assert!(built.data.column("has_wbc").is_err());
    assert_eq!(
        built.report.enrichment("labs").unwrap().status,
        EnrichmentStatus::Skipped {
            reason: SkipReason::MissingColumn {
                column: "labname".to_string()
            }
        }
    );
}

#[test]
fn non_numeric_vital_channel_is_skipped() {
    let dir = full_fixture();
    write_fixture(
        dir.path(),
        &[(
            "vitalPeriodic.csv",
            "patientunitstayid,heartrate,systemicsystolic\n141296,80,n/a\n141296,84,120\n",
        )],
    );
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert_eq!(value(&built.data, "heartrate_mean", 0), AnyValue::Float64(82.0));
    assert!(built.data.column("systemicsystolic_mean").is_err());
    assert!(built.data.column("temperature_mean").is_err());
}

#[test]
fn vitals_without_configured_channels_are_omitted() {
    let dir = full_fixture();
    write_fixture(
        dir.path(),
        &[("vitalPeriodic.csv", "patientunitstayid,sao2\n141296,97\n")],
    );
    let built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();

    assert!(built.data.column("heartrate_mean").is_err());
    assert_eq!(
        built.report.enrichment("vitals").unwrap().status,
        EnrichmentStatus::Skipped {
            reason: SkipReason::NoVitalChannels
        }
    );
}

#[test]
fn missing_key_in_core_table_fails_the_build() {
    let dir = full_fixture();
    write_fixture(dir.path(), &[("apacheApsVar.csv", "apacheapsvarid,wbc\n1,12.1\n")]);

    assert!(build_patient_table(dir.path(), &BuildOptions::default()).is_err());
}

#[test]
fn derived_values_survive_a_csv_round_trip() {
    let dir = full_fixture();
    let mut built = build_patient_table(dir.path(), &BuildOptions::default()).unwrap();
    let out = TempDir::new().unwrap();
    let path = out.path().join("complete_patient_data.csv");

    write_csv_table(&mut built.data, &path).unwrap();
    let reread = read_csv_table(&path).unwrap();

    assert_eq!(reread.height(), built.data.height());
    let mut checked = vec!["expired".to_string(), "lab_count".to_string()];
    checked.extend(
        BuildOptions::default()
            .lab_flags
            .iter()
            .map(|lab| BuildOptions::lab_flag_column(lab)),
    );
    for column in checked {
        for row in 0..reread.height() {
            assert_eq!(
                value(&reread, &column, row),
                value(&built.data, &column, row),
                "{column} row {row}"
            );
        }
    }
}

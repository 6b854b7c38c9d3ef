use hospital_dashboard::charts::build_views;
use hospital_dashboard::config::{DashboardConfig, JoinPolicy};
use hospital_dashboard::data::{filter_by_states, load_state_summary, LoadError, SummaryCache};
use hospital_dashboard::stats::compute_correlation;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const HOSPITALS: &str = "\
Facility ID,Hospital Name,City,State,ZIP Code
010001,Mercy,Los Angeles,CA,90001
010002,St. Luke,San Diego,CA,92101
010003,General,Houston,TX,77001
";

const POPULATION: &str = "\
State,ST,Population
California,CA,39000000
Texas,TX,29000000
Wyoming,WY,580000
";

fn write_inputs(dir: &Path, hospitals: &str, population: &str) -> DashboardConfig {
    let hospital_csv = dir.join("hospital_general_information.csv");
    let population_csv = dir.join("us_populaton_by_state.csv");
    fs::write(&hospital_csv, hospitals).expect("write hospitals");
    fs::write(&population_csv, population).expect("write population");
    DashboardConfig {
        hospital_csv,
        population_csv,
        ..DashboardConfig::default()
    }
}

#[test]
fn loads_and_merges_csv_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_inputs(tmp.path(), HOSPITALS, POPULATION);

    let summary = load_state_summary(&config).expect("summary");
    assert_eq!(summary.state_codes(), vec!["CA", "TX", "WY"]);

    let ca = summary.get("California").unwrap();
    assert_eq!(ca.hospital_count, 2);
    assert_eq!(ca.population_per_hospital, Some(19_500_000.0));

    let tx = summary.get_by_code("TX").unwrap();
    assert_eq!(tx.population_per_hospital, Some(29_000_000.0));

    let wy = summary.get_by_code("WY").unwrap();
    assert_eq!(wy.hospital_count, 0);
    assert_eq!(wy.population_per_hospital, None);

    assert_eq!(summary.total_hospitals(), 3);
    assert!(summary.unmatched().is_empty());
}

#[test]
fn selection_drives_views() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_inputs(tmp.path(), HOSPITALS, POPULATION);
    let summary = load_state_summary(&config).expect("summary");

    let all = filter_by_states(&summary, &summary.state_codes());
    assert_eq!(all.len(), summary.len());
    let views = build_views(&all);
    assert_eq!(views.bar.bars.len(), 3);
    assert_eq!(views.map.tiles.len(), 3);
    assert!(views.correlation_text().is_some());
    assert_eq!(views.r_squared, compute_correlation(&all));

    let none: [&str; 0] = [];
    let empty = build_views(&filter_by_states(&summary, &none));
    assert!(empty.map.is_empty() && empty.scatter.is_empty() && empty.bar.is_empty());
    assert!(empty.correlation_text().is_none());
}

#[test]
fn missing_file_is_reported_by_name() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut config = write_inputs(tmp.path(), HOSPITALS, POPULATION);
    config.population_csv = tmp.path().join("missing.csv");

    let err = load_state_summary(&config).unwrap_err();
    assert!(matches!(err, LoadError::FileNotFound { .. }));
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn missing_column_names_the_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_inputs(
        tmp.path(),
        HOSPITALS,
        "State,Code,Population\nCalifornia,CA,39000000\n",
    );

    match load_state_summary(&config).unwrap_err() {
        LoadError::DataFormat { file, column } => {
            assert_eq!(file, "us_populaton_by_state.csv");
            assert_eq!(column, "ST");
        }
        other => panic!("expected DataFormat, got {:?}", other),
    }
}

#[test]
fn unmatched_codes_respect_join_policy() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let hospitals = format!("{}010004,Guam Memorial,Tamuning,GU,96913\n", HOSPITALS);
    let mut config = write_inputs(tmp.path(), &hospitals, POPULATION);

    let summary = load_state_summary(&config).expect("warn policy keeps going");
    assert_eq!(summary.unmatched().len(), 1);
    assert_eq!(summary.unmatched()[0].state_code, "GU");
    assert_eq!(summary.total_hospitals(), 3);

    config.join_policy = JoinPolicy::FailFast;
    let err = load_state_summary(&config).unwrap_err();
    assert!(matches!(err, LoadError::JoinMismatch { ref codes, .. } if codes == &["GU"]));
}

#[test]
fn padded_codes_match_under_both_policies() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let hospitals = "\
Facility ID,Hospital Name,City,State,ZIP Code
010001,Mercy,Los Angeles,\"CA \",90001
010002,St. Luke,San Diego,ca,92101
010003,General,Houston,\" TX\",77001
";
    let population = "\
State,ST,Population
California,\" CA\",39000000
Texas,\"TX  \",29000000
Wyoming,WY,580000
";
    let mut config = write_inputs(tmp.path(), hospitals, population);

    for policy in [JoinPolicy::WarnAndZeroFill, JoinPolicy::FailFast] {
        config.join_policy = policy;
        let summary = load_state_summary(&config).expect("padded codes still join");
        assert_eq!(summary.state_codes(), vec!["CA", "TX", "WY"]);
        assert_eq!(summary.get_by_code("CA").unwrap().hospital_count, 2);
        assert_eq!(summary.get_by_code("TX").unwrap().hospital_count, 1);
        assert_eq!(
            summary.get_by_code("CA").unwrap().population_per_hospital,
            Some(19_500_000.0)
        );
        assert_eq!(summary.total_hospitals(), 3);
        assert!(summary.unmatched().is_empty());
    }

    let padded_unknown = format!("{}010004,Guam Memorial,Tamuning,\" gu \",96913\n", hospitals);
    let config = write_inputs(tmp.path(), &padded_unknown, population);
    let summary = load_state_summary(&config).expect("warn policy keeps going");
    assert_eq!(summary.unmatched()[0].state_code, "GU");
    assert_eq!(summary.total_hospitals(), 3);

    let config = DashboardConfig {
        join_policy: JoinPolicy::FailFast,
        ..config
    };
    let err = load_state_summary(&config).unwrap_err();
    assert!(matches!(
        err,
        LoadError::JoinMismatch { ref codes, hospitals: 1 } if codes == &["GU"]
    ));
}

#[test]
fn cache_builds_once_per_file_set() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = write_inputs(tmp.path(), HOSPITALS, POPULATION);
    let cache = SummaryCache::new();

    let first = cache.get_or_load(&config).expect("first load");
    let second = cache.get_or_load(&config).expect("second load");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    // A different file (new length) is a different identity
    fs::write(
        &config.population_csv,
        format!("{}Ohio,OH,11800000\n", POPULATION),
    )
    .expect("rewrite population");
    let third = cache.get_or_load(&config).expect("reload");
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.len(), 4);
    assert_eq!(cache.len(), 2);
}

#[test]
fn cache_does_not_store_failures() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut config = write_inputs(tmp.path(), HOSPITALS, POPULATION);
    config.hospital_csv = tmp.path().join("nope.csv");

    let cache = SummaryCache::new();
    assert!(cache.get_or_load(&config).is_err());
    assert!(cache.is_empty());
}

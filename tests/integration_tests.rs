use aaa_rater::calculator::{AaaCalculator, Calculator, calculate_and_save};
use aaa_rater::infra::local::{LocalBackup, LocalCsvSaver, LocalCsvSource};
use aaa_rater::parser::parse_table;
use aaa_rater::scoring::ScoringEngine;
use aaa_rater::scoring::category::Category;
use aaa_rater::universe::{FA_SECTORS, INDEXES, source_name};
use polars::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "no,ticker,company,fwd_p_e,peg,p_s,p_b,p_fcf,profit_m,oper_m,gross_m,roe,roa,\
eps_this_y,eps_next_y,eps_next_5y,sales_q_q,eps_q_q,perf_month,perf_quart,perf_half,perf_year,\
perf_ytd,volatility_m";

const ROWS: &[&str] = &[
    "1,AAPL,Apple,28.1,2.4,7.5,45.2,30.1,0.25,0.30,0.44,1.47,0.28,0.09,0.08,0.11,0.05,0.11,0.02,0.05,0.10,0.22,0.15,0.013",
    "2,MSFT,Microsoft,31.0,2.1,12.3,11.8,41.0,0.36,0.44,0.69,0.38,0.19,0.12,0.13,0.14,0.16,0.20,-0.01,0.03,0.09,0.30,0.12,0.015",
    "3,IBM,IBM,16.2,#N/A,2.9,6.6,,0.12,0.15,0.55,0.32,0.04,0.02,0.05,0.03,0.01,-0.05,0.04,0.08,0.11,0.35,0.20,0.011",
    "4,INTC,Intel,60.5,5.2,2.1,1.2,NaN,-0.05,-0.02,0.40,-0.04,-0.02,-0.50,0.60,,-0.08,-0.90,-0.10,-0.20,-0.35,-0.55,-0.40,0.030",
];

fn temp_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_source(dir: &Path, item: &str) {
    let mut content = format!("{HEADER}\n");
    for row in ROWS {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(dir.join(source_name(item)), content).unwrap();
}

fn read(path: &Path) -> DataFrame {
    parse_table(&fs::read(path).unwrap()).unwrap()
}

fn text(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|s| s.unwrap_or_default().to_string())
        .collect()
}

fn floats(df: &DataFrame, column: &str) -> Vec<f64> {
    df.column(column)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

#[tokio::test]
async fn test_full_run_over_local_directories() {
    let dir = temp_dir("aaa_rater_it_full_run");
    let input = dir.join("input");
    fs::create_dir_all(&input).unwrap();
    for item in FA_SECTORS.iter().chain(INDEXES.iter()).chain(["all"].iter()) {
        write_source(&input, item);
    }

    let source = LocalCsvSource::new(&input);
    let saver = LocalCsvSaver::new(dir.join("out"), false);
    let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), false);

    let errors = AaaCalculator::default()
        .run_complete_calculation(&source, &saver, &backup, None)
        .await;

    assert!(errors.is_empty(), "{errors:?}");
    let technology = dir.join("out").join("AAA_technology.csv");
    assert!(technology.exists());
    assert!(dir.join("out").join("AAA_MicroCap.csv").exists());
    assert!(dir.join("out").join("AAA_all.csv").exists());

    let rated = read(&technology);
    // the ticker column passes through untouched
    assert_eq!(text(&rated, "ticker"), vec!["AAPL", "MSFT", "IBM", "INTC"]);
    // Intel is worst on every profitability metric
    assert_eq!(text(&rated, "AAA - profitability")[3], "F");
    assert_eq!(floats(&rated, "score - profitability")[3], 0.0);
    for category in Category::ALL {
        assert_eq!(text(&rated, &format!("AAA - {category}")).len(), 4);
    }
    // the whole-number rank column is carried but never rated
    assert_eq!(rated.column("no").unwrap().dtype(), &DataType::Int64);
    assert!(rated.column("score - no").is_err());
    assert!(rated.column("AAA - no").is_err());
    // nothing existed yet, so no backups were taken
    assert!(!dir.join("backup").exists());
}

#[tokio::test]
async fn test_invalid_sector_is_the_only_error() {
    let dir = temp_dir("aaa_rater_it_invalid_sector");
    let input = dir.join("input");
    fs::create_dir_all(&input).unwrap();
    for item in ["energy", "utilities", "all"].iter().chain(INDEXES.iter()) {
        write_source(&input, item);
    }

    let source = LocalCsvSource::new(&input);
    let saver = LocalCsvSaver::new(dir.join("out"), false);
    let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), false);
    let sectors = vec![
        "energy".to_string(),
        "doesnotexist".to_string(),
        "utilities".to_string(),
    ];

    let errors = AaaCalculator::default()
        .run_complete_calculation(&source, &saver, &backup, Some(sectors.as_slice()))
        .await;

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("doesnotexist"));
    assert!(dir.join("out").join("AAA_energy.csv").exists());
    assert!(dir.join("out").join("AAA_utilities.csv").exists());
    assert!(!dir.join("out").join("AAA_doesnotexist.csv").exists());
}

#[tokio::test]
async fn test_rerun_backs_up_and_reproduces_grades() {
    let dir = temp_dir("aaa_rater_it_rerun");
    let input = dir.join("input");
    fs::create_dir_all(&input).unwrap();
    write_source(&input, "energy");

    let engine = ScoringEngine::default();
    let source = LocalCsvSource::new(&input);
    let saver = LocalCsvSaver::new(dir.join("out"), true);
    let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), true);
    let output = dir.join("out").join("AAA_energy.csv.gz");

    let run = || {
        calculate_and_save(&engine, &source, &saver, &backup, "AAA - energy.csv", "AAA_energy")
    };

    assert!(run().await);
    let first = text(&read(&output), "AAA - overall");

    assert!(run().await);
    let second = text(&read(&output), "AAA - overall");

    assert_eq!(first, second);

    let backups: Vec<PathBuf> = fs::read_dir(dir.join("backup"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(backups.len(), 1);
    let backed_up = read(&backups[0]);
    assert!(!text(&backed_up, "_backup_timestamp")[0].is_empty());
    assert_eq!(
        floats(&backed_up, "score - overall"),
        floats(&read(&output), "score - overall")
    );
}

#[tokio::test]
async fn test_missing_source_fails_without_writing() {
    let dir = temp_dir("aaa_rater_it_missing");
    let source = LocalCsvSource::new(dir.join("input"));
    let saver = LocalCsvSaver::new(dir.join("out"), false);
    let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), false);

    let ok = calculate_and_save(
        &ScoringEngine::default(),
        &source,
        &saver,
        &backup,
        "AAA - energy.csv",
        "AAA_energy",
    )
    .await;

    assert!(!ok);
    assert!(!dir.join("out").exists());
}

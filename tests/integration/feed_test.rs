//! Integration tests for price sources

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sma_trader::data::ParquetWriter;
use sma_trader::feed::{
    extract_price, HistoryRange, ParquetPriceSource, PriceObservation, PriceSource, ReplaySource,
    SourceError,
};
use tempfile::TempDir;

fn at(minutes: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-04T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
        + Duration::minutes(minutes)
}

#[tokio::test]
async fn test_parquet_source_merges_files_chronologically() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ParquetWriter::new(temp_dir.path());

    // the later file sorts first by name
    let late = vec![
        PriceObservation::new("005930", "103", at(3)),
        PriceObservation::new("005930", "104", at(4)),
    ];
    let early = vec![
        PriceObservation::new("005930", "100", at(0)),
        PriceObservation::new("000660", "50", at(1)),
        PriceObservation::new("005930", "102", at(2)),
    ];
    writer
        .write_observations(&temp_dir.path().join("a_late.parquet"), &late)
        .unwrap();
    writer
        .write_observations(&temp_dir.path().join("b_early.parquet"), &early)
        .unwrap();

    let source = ParquetPriceSource::new(temp_dir.path());
    let history = source
        .fetch_history("005930", HistoryRange::all())
        .await
        .unwrap();

    let prices: Vec<&str> = history.iter().map(|o| o.price.as_str()).collect();
    assert_eq!(prices, ["100", "102", "103", "104"]);

    let latest = source.fetch_price("005930").await.unwrap();
    assert_eq!(latest.price, "104");
}

#[tokio::test]
async fn test_parquet_source_range_filter() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ParquetWriter::new(temp_dir.path());
    let observations: Vec<_> = (0..10)
        .map(|i| PriceObservation::new("005930", (100 + i).to_string(), at(i)))
        .collect();
    writer
        .write_observations(&writer.file_path("prices", at(0)), &observations)
        .unwrap();

    let range = HistoryRange {
        start: Some(at(2)),
        end: Some(at(5)),
    };
    let history = ParquetPriceSource::new(temp_dir.path())
        .fetch_history("005930", range)
        .await
        .unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].timestamp, at(2));
}

#[tokio::test]
async fn test_replay_source_reports_exhaustion() {
    let source = ReplaySource::new(vec![PriceObservation::new("005930", "100", at(0))]);
    assert!(source.fetch_price("005930").await.is_ok());
    assert!(matches!(
        source.fetch_price("005930").await,
        Err(SourceError::Exhausted)
    ));
}

#[test]
fn test_extract_price_from_quote_body() {
    let body = json!({ "rt_cd": "0", "output": { "stck_prpr": "71500" } });
    assert_eq!(extract_price(&body, "/output/stck_prpr").unwrap(), "71500");
    assert!(extract_price(&body, "/output/missing").is_err());
}

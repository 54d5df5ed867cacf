use anyhow::{anyhow, Result};
use csv::{ReaderBuilder, StringRecord};
use shared::models::{Metric, PricePoint, TimeSeries};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Number and date handling for daily price exports.
pub mod price_format {
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;
    use std::str::FromStr;

    // Empty cells and the usual placeholders mean "no value on this date".
    const MISSING: [&str; 4] = ["", "null", "nan", "n/a"];

    pub fn parse_decimal(s: &str) -> Result<Option<f64>> {
        let trimmed = s.trim();
        if MISSING.iter().any(|m| trimmed.eq_ignore_ascii_case(m)) {
            return Ok(None);
        }
        let value = f64::from_str(&trimmed.replace(',', ""))
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        Ok(Some(value).filter(|v| v.is_finite()))
    }

    // Accepts "2024-01-02" as well as timestamped forms like "2024-01-02 00:00:00-05:00".
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        let trimmed = s.trim();
        let day = trimmed.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(trimmed);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| anyhow!("Failed to parse date '{}': {}", s, e))
    }

}

pub struct PriceCsvParser;

impl PriceCsvParser {
    // CSV Header: Date,Open,High,Low,Close,Adj Close,Volume
    // Example Row: 2024-01-02,187.15,188.44,183.89,185.64,185.40,82488700
    // Any of the metric columns may be missing; "Adj Close" and unknown columns are ignored.
    pub fn load_series(file_path: &Path, symbol: &str) -> Result<TimeSeries> {
        let file = File::open(file_path)?;
        Self::parse_series(BufReader::new(file), symbol)
    }

    pub fn parse_series<R: Read>(reader: R, symbol: &str) -> Result<TimeSeries> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let date_pos = Self::column(&headers, "Date")
            .or_else(|| Self::column(&headers, "Datetime"))
            .ok_or_else(|| anyhow!("Missing 'Date' column in CSV for '{}'", symbol))?;
        let metric_columns: Vec<(Metric, usize)> = Metric::ALL
            .into_iter()
            .filter_map(|m| Self::column(&headers, m.as_str()).map(|pos| (m, pos)))
            .collect();

        let mut points = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let date_str = Self::get_field(&record, date_pos)
                .ok_or_else(|| anyhow!("Missing 'Date' field in CSV record at line {}", line))?;
            let date = price_format::parse_date(date_str)
                .map_err(|e| anyhow!("Error parsing date at line {}: {}", line, e))?;

            let mut point = PricePoint::new(date);
            for &(metric, pos) in &metric_columns {
                let raw = Self::get_field(&record, pos).unwrap_or("");
                let value = price_format::parse_decimal(raw)
                    .map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", metric, line, e))?;
                if let Some(value) = value {
                    point = point.with(metric, value);
                }
            }
            points.push(point);
        }

        // Exports are not always sorted; keep the first row seen for a repeated date.
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Ok(TimeSeries::new(symbol, points)?)
    }

    fn column(headers: &StringRecord, name: &str) -> Option<usize> {
        headers.iter().position(|header| header.eq_ignore_ascii_case(name))
    }

    fn get_field(record: &StringRecord, pos: usize) -> Option<&str> {
        record.get(pos)
    }
}

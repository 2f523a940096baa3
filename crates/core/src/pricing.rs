//! Day-ahead zonal price curve extraction.
//!
//! Turns the published day-ahead LBMP zone CSV into a 24-slot hourly rate
//! vector for a single zone. Slots without data are `None` so the vector
//! always has the shape the inference pipeline expects.
//!
//! Expected columns:
//!
//! | Column                              | Use                          |
//! |-------------------------------------|------------------------------|
//! | `Time Stamp`                        | `MM/DD/YYYY HH:MM` local time |
//! | `Name`                              | zone filter                  |
//! | `LBMP ($/MWHr)`                     | summed into the total price  |
//! | `Marginal Cost Losses ($/MWHr)`     | summed into the total price  |
//! | `Marginal Cost Congestion ($/MWHr)` | summed into the total price  |

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::types::HOURS_PER_DAY;

pub const COL_TIMESTAMP: &str = "Time Stamp";
pub const COL_NAME: &str = "Name";
pub const COL_LBMP: &str = "LBMP ($/MWHr)";
pub const COL_LOSSES: &str = "Marginal Cost Losses ($/MWHr)";
pub const COL_CONGESTION: &str = "Marginal Cost Congestion ($/MWHr)";

const TIMESTAMP_FORMATS: [&str; 2] = ["%m/%d/%Y %H:%M", "%m/%d/%Y %H:%M:%S"];

#[derive(Debug, thiserror::Error)]
pub enum PriceCurveError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Unparseable timestamp on line {line}: {value}")]
    InvalidTimestamp { line: u64, value: String },
}

/// Hourly price vector with exactly [`HOURS_PER_DAY`] slots.
pub type HourlyRates = Vec<Option<f64>>;

/// Pick the delivery day to fetch.
///
/// Day-ahead prices for tomorrow are published late morning; before
/// `release_hour` only today's curve is available.
pub fn target_date(now: NaiveDateTime, release_hour: u32) -> NaiveDate {
    if now.hour() >= release_hour {
        now.date() + Duration::days(1)
    } else {
        now.date()
    }
}

/// URL of the zonal day-ahead CSV for `date` under `base_url`.
pub fn zone_csv_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}damlbmp_zone.csv",
        base_url.trim_end_matches('/'),
        date.format("%Y%m%d")
    )
}

/// Extract the hourly total price curve for `zone` from CSV text.
///
/// Rows for other zones are ignored. A component that does not parse as a
/// number makes the row's total missing, and rows with a missing total are
/// dropped. The remaining rows are averaged into hourly bins spanning the
/// first to the last timestamp; empty bins are `None`. The result is padded
/// with `None` (or truncated) to exactly 24 slots.
pub fn parse_zone_csv(csv_text: &str, zone: &str) -> Result<HourlyRates, PriceCurveError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(PriceCurveError::MissingColumn(name))
    };
    let ts_idx = column(COL_TIMESTAMP)?;
    let name_idx = column(COL_NAME)?;
    let component_idx = [column(COL_LBMP)?, column(COL_LOSSES)?, column(COL_CONGESTION)?];

    let mut samples: Vec<(NaiveDateTime, f64)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.get(name_idx) != Some(zone) {
            continue;
        }

        let raw_ts = record.get(ts_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| PriceCurveError::InvalidTimestamp {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            value: raw_ts.to_string(),
        })?;

        let total = component_idx
            .iter()
            .map(|&i| record.get(i).and_then(parse_number))
            .sum::<Option<f64>>();

        if let Some(total) = total {
            samples.push((timestamp, total));
        }
    }

    Ok(resample_hourly(&samples))
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn floor_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), 0, 0)
        .unwrap_or(ts)
}

/// Mean per hourly bin from the earliest to the latest sample, capped at one
/// day of bins.
fn resample_hourly(samples: &[(NaiveDateTime, f64)]) -> HourlyRates {
    let mut rates: HourlyRates = vec![None; HOURS_PER_DAY];

    let Some(first) = samples.iter().map(|(ts, _)| floor_to_hour(*ts)).min() else {
        return rates;
    };

    let mut sums = [0.0_f64; HOURS_PER_DAY];
    let mut counts = [0_u32; HOURS_PER_DAY];
    for (ts, value) in samples {
        let bin = (floor_to_hour(*ts) - first).num_hours();
        if let Ok(bin) = usize::try_from(bin) {
            if bin < HOURS_PER_DAY {
                sums[bin] += value;
                counts[bin] += 1;
            }
        }
    }

    for (slot, (sum, count)) in rates.iter_mut().zip(sums.iter().zip(counts)) {
        if count > 0 {
            *slot = Some(sum / f64::from(count));
        }
    }
    rates
}

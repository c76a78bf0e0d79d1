//! Run identifier parsing.
//!
//! autopkgtest run ids embed the start time of the run:
//!
//! ```text
//! 20240329_175621_aafd4@     current layout (timestamp, hash, '@')
//! 20240329_175621_aafd4      hash without the trailing '@'
//! 20240329_175621@           legacy, no hash
//! 20240329_175621            legacy, bare timestamp
//! ```
//!
//! Only the first two `_`-separated fields carry the timestamp; anything
//! after them is ignored.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunIdError {
    #[error("run id {run_id:?} has no time component")]
    MissingTime { run_id: String },

    #[error("run id {run_id:?}: expected 8-digit date, found {field:?}")]
    BadDate { run_id: String, field: String },

    #[error("run id {run_id:?}: expected 6-digit time, found {field:?}")]
    BadTime { run_id: String, field: String },

    #[error("run id {run_id:?} does not encode a valid calendar timestamp")]
    OutOfRange { run_id: String },
}

/// Parse the start timestamp out of an autopkgtest run id.
pub fn parse_timestamp(run_id: &str) -> Result<NaiveDateTime, RunIdError> {
    let trimmed = run_id.trim().trim_end_matches('@');
    let mut fields = trimmed.split('_');

    let date = fields.next().unwrap_or_default();
    let time = fields.next().ok_or_else(|| RunIdError::MissingTime {
        run_id: run_id.to_string(),
    })?;

    let date = digits::<8>(date).ok_or_else(|| RunIdError::BadDate {
        run_id: run_id.to_string(),
        field: date.to_string(),
    })?;
    let time = digits::<6>(time).ok_or_else(|| RunIdError::BadTime {
        run_id: run_id.to_string(),
        field: time.to_string(),
    })?;

    let out_of_range = || RunIdError::OutOfRange {
        run_id: run_id.to_string(),
    };
    let date = NaiveDate::from_ymd_opt(
        (date[0] * 1000 + date[1] * 100 + date[2] * 10 + date[3]) as i32,
        date[4] * 10 + date[5],
        date[6] * 10 + date[7],
    )
    .ok_or_else(out_of_range)?;
    let time = NaiveTime::from_hms_opt(
        time[0] * 10 + time[1],
        time[2] * 10 + time[3],
        time[4] * 10 + time[5],
    )
    .ok_or_else(out_of_range)?;

    Ok(NaiveDateTime::new(date, time))
}

/// Decode exactly `N` ASCII digits.
fn digits<const N: usize>(field: &str) -> Option<[u32; N]> {
    let bytes = field.as_bytes();
    if bytes.len() != N {
        return None;
    }
    let mut out = [0u32; N];
    for (slot, b) in out.iter_mut().zip(bytes) {
        if !b.is_ascii_digit() {
            return None;
        }
        *slot = u32::from(b - b'0');
    }
    Some(out)
}

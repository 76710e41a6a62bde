use std::fmt;

use serde::{Serialize, Serializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};
use usage_client::UsageRecord;

use crate::error::PeakError;

/// A parsed reading time.
///
/// Values keep the zone convention of their source text: text with an offset
/// stays an offset date-time, text without one stays wall-clock time. Calendar
/// dates are taken from whichever form was parsed, without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTime {
    Local(PrimitiveDateTime),
    Offset(OffsetDateTime),
}

impl ReadingTime {
    pub fn date(&self) -> Date {
        match self {
            ReadingTime::Local(dt) => dt.date(),
            ReadingTime::Offset(dt) => dt.date(),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = match self {
            ReadingTime::Offset(dt) => dt.format(&Rfc3339),
            ReadingTime::Local(dt) if dt.nanosecond() == 0 => {
                dt.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
            }
            ReadingTime::Local(dt) => dt.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
            )),
        };
        f.write_str(&rendered.map_err(|_| fmt::Error)?)
    }
}

impl Serialize for ReadingTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses ISO-8601 date-time text. Accepts RFC 3339 with an offset, or a
/// wall-clock date-time with a `T` or space separator and optional fraction.
pub fn parse_timestamp(text: &str) -> Option<ReadingTime> {
    let text = text.trim();

    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(ReadingTime::Offset(dt));
    }

    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        )
    })
    .ok()
    .map(ReadingTime::Local)
}

/// A usage row whose timestamp has been parsed but whose market is not yet
/// resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedUsage {
    pub market_id: i64,
    pub usage_kw: f64,
    pub timestamp: ReadingTime,
}

/// Parses every row's timestamp. The first unparseable value fails the whole
/// batch; rows are never skipped here.
pub fn normalize(records: &[UsageRecord]) -> Result<Vec<NormalizedUsage>, PeakError> {
    records
        .iter()
        .enumerate()
        .map(|(row, rec)| {
            let timestamp =
                parse_timestamp(&rec.timestamp).ok_or_else(|| PeakError::MalformedTimestamp {
                    value: rec.timestamp.clone(),
                    row,
                })?;
            Ok(NormalizedUsage {
                market_id: rec.market_id,
                usage_kw: rec.usage_kw,
                timestamp,
            })
        })
        .collect()
}

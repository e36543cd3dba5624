//! Parser for the human-readable schedule grammar carried on `add`
//! requests. Two forms, tokens separated by spaces:
//!
//! - `-r Y-D-H-M-S` — relative delay from now (a year is 365 days)
//! - `-a DD.MM.YYYY-HH:MM:SS` — absolute instant in the local timezone
//!
//! Either form may be followed by `-i Y-D-H-M-S`, a repeat interval.
//! An interval of zero in every field means "not repeating", the same
//! as omitting `-i` altogether.

use crate::err::Result;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::io;
use std::time::Duration;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const SECS_PER_YEAR: u64 = 365 * SECS_PER_DAY;

const ABSOLUTE_FORMAT: &str = "%d.%m.%Y-%H:%M:%S";

/// When the first execution happens.
#[derive(Clone, Debug, PartialEq)]
pub enum Schedule {
    /// Delay from the moment the server accepts the task.
    Relative(Duration),
    /// Wall-clock instant in the server's local timezone. Instants in
    /// the past fire immediately.
    Absolute(DateTime<Local>),
}

/// A fully parsed time spec: first execution plus an optional repeat
/// interval.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSpec {
    pub schedule: Schedule,
    pub interval: Option<Duration>,
}

impl TimeSpec {
    /// Delay until the first fire, measured from now. Absolute instants
    /// already in the past clamp to zero.
    pub fn delay_from_now(&self) -> Duration {
        match &self.schedule {
            Schedule::Relative(d) => *d,
            Schedule::Absolute(at) => (*at - Local::now()).to_std().unwrap_or(Duration::ZERO),
        }
    }
}

fn invalid(msg: String) -> crate::err::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg).into()
}

fn parse_field(field: &str) -> Result<u64> {
    lexical_core::parse::<u64>(field.as_bytes())
        .map_err(|e| invalid(format!("invalid number '{}' in time spec: {}", field, e)))
}

/// Parse a `Y-D-H-M-S` group into a number of seconds.
fn parse_span(value: &str) -> Result<u64> {
    let fields: Vec<&str> = value.split('-').collect();
    if fields.len() != 5 {
        return Err(invalid(format!(
            "expected Y-D-H-M-S with 5 fields, got {} in '{}'",
            fields.len(),
            value
        )));
    }
    let units = [SECS_PER_YEAR, SECS_PER_DAY, SECS_PER_HOUR, SECS_PER_MINUTE, 1];
    let mut seconds: u64 = 0;
    for (field, unit) in fields.iter().zip(units) {
        seconds = parse_field(field)?
            .saturating_mul(unit)
            .saturating_add(seconds);
    }
    Ok(seconds)
}

fn parse_absolute(value: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(value, ABSOLUTE_FORMAT)
        .map_err(|e| invalid(format!("invalid absolute time '{}': {}", value, e)))?;
    // A DST gap can make a local wall-clock time nonexistent; a fold
    // makes it ambiguous. Take the earliest valid instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| invalid(format!("'{}' does not exist in the local timezone", value)))
}

/// Parse a complete time spec string.
pub fn parse(spec: &str) -> Result<TimeSpec> {
    let mut tokens = spec.split_whitespace();

    let schedule = match tokens.next() {
        Some("-r") => {
            let value = tokens
                .next()
                .ok_or_else(|| invalid("missing value after -r".into()))?;
            Schedule::Relative(Duration::from_secs(parse_span(value)?))
        }
        Some("-a") => {
            let value = tokens
                .next()
                .ok_or_else(|| invalid("missing value after -a".into()))?;
            Schedule::Absolute(parse_absolute(value)?)
        }
        other => {
            return Err(invalid(format!(
                "time spec must start with -r or -a, got {:?}",
                other
            )));
        }
    };

    let interval = match tokens.next() {
        None => None,
        Some("-i") => {
            let value = tokens
                .next()
                .ok_or_else(|| invalid("missing value after -i".into()))?;
            match parse_span(value)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            }
        }
        Some(other) => {
            return Err(invalid(format!("unexpected token '{}' in time spec", other)));
        }
    };

    if let Some(trailing) = tokens.next() {
        return Err(invalid(format!(
            "unexpected trailing token '{}' in time spec",
            trailing
        )));
    }

    Ok(TimeSpec { schedule, interval })
}

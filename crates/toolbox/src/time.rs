use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use chrono::format::ParseErrorKind;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tracing::debug;

use crate::error::{Result, ToolboxError};

/// Measures how long a block of code takes. The last measurement is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    elapsed: Duration,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring; the measurement is recorded when the guard drops.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            timer: self,
            started: Instant::now(),
        }
    }

    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        f()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn total_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.elapsed)
    }
}

pub struct TimerGuard<'a> {
    timer: &'a mut Timer,
    started: Instant,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.elapsed = self.started.elapsed();
    }
}

/// Accumulates elapsed seconds per named code section.
///
/// ```
/// use genpath_toolbox::TimeTracker;
///
/// let mut times = TimeTracker::new();
/// let mut tracker = times.tracker(Some("calculate"));
/// tracker.track("load");
/// tracker.track("solve");
/// assert_eq!(times.get("calculate: load").map(|t| t.len()), Some(1));
/// ```
#[derive(Debug, Default, Clone)]
pub struct TimeTracker {
    sections: BTreeMap<String, Vec<f64>>,
}

impl TimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a clock whose entries are prefixed with `prefix: `.
    pub fn tracker(&mut self, prefix: Option<&str>) -> Tracker<'_> {
        Tracker {
            parent: self,
            prefix: prefix.map(str::to_string),
            reference: Instant::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.sections.get(name).map(Vec::as_slice)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.sections
            .iter()
            .map(|(name, times)| (name.as_str(), times.as_slice()))
    }
}

pub struct Tracker<'a> {
    parent: &'a mut TimeTracker,
    prefix: Option<String>,
    reference: Instant,
}

impl Tracker<'_> {
    /// Record the time since the previous mark under `name` and restart the clock.
    pub fn track(&mut self, name: &str) {
        let name = match &self.prefix {
            Some(prefix) => format!("{prefix}: {name}"),
            None => name.to_string(),
        };
        let now = Instant::now();
        let seconds = now.duration_since(self.reference).as_secs_f64();
        debug!(section = %name, seconds, "tracked");
        self.parent.sections.entry(name).or_default().push(seconds);
        self.reference = now;
    }
}

fn default_formats() -> Vec<String> {
    let separators = ["", "-", ".", "/"];
    let mut times = vec![String::new()];
    for tsep in [' ', 'T'] {
        for sec in [":%S", ""] {
            times.push(format!("{tsep}%H:%M{sec}"));
        }
    }
    let mut formats = Vec::new();
    for base in ["%Y{0}%m{0}%d", "%d{0}%m{0}%y"] {
        for time in &times {
            for sep in separators {
                formats.push(format!("{}{time}", base.replace("{0}", sep)));
            }
        }
    }
    formats
}

fn parse_with(input: &str, format: &str) -> Option<NaiveDateTime> {
    // A leading %Y must match exactly four digits.
    if format.starts_with("%Y")
        && !input
            .get(..4)
            .is_some_and(|y| y.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    match NaiveDateTime::parse_from_str(input, format) {
        Ok(datetime) => Some(datetime),
        // Date-only formats mean midnight.
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::parse_from_str(input, format)
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN)),
        Err(_) => None,
    }
}

/// Parse a local date-time.
///
/// Accepts `today`, `yesterday` and `now` (any case). Otherwise each format
/// is tried in order; without `formats`, common year-first and day-first
/// layouts with optional `HH:MM[:SS]` are tried.
pub fn to_datetime(input: &str, formats: Option<&[&str]>) -> Result<NaiveDateTime> {
    let today = || Local::now().date_naive();
    match input.to_lowercase().as_str() {
        "today" => return Ok(today().and_time(NaiveTime::MIN)),
        "yesterday" => {
            let yesterday = today().pred_opt().unwrap_or(NaiveDate::MIN);
            return Ok(yesterday.and_time(NaiveTime::MIN));
        }
        "now" => return Ok(Local::now().naive_local()),
        _ => {}
    }

    let (formats, which): (Vec<String>, _) = match formats {
        Some(given) => (given.iter().map(|f| f.to_string()).collect(), "given"),
        None => (default_formats(), "expected"),
    };
    formats
        .iter()
        .find_map(|format| parse_with(input, format))
        .ok_or_else(|| ToolboxError::UnparsableTime {
            input: input.to_string(),
            which,
        })
}

/// Local date-time for a POSIX timestamp.
pub fn from_epoch(seconds: f64) -> Result<NaiveDateTime> {
    if !seconds.is_finite() {
        return Err(ToolboxError::InvalidArgument(format!("timestamp is not finite: {seconds}")));
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
        .map(|utc| utc.with_timezone(&Local).naive_local())
        .ok_or_else(|| ToolboxError::InvalidArgument(format!("timestamp out of range: {seconds}")))
}

/// Seconds since the Epoch for a local date-time.
pub fn to_epoch_time(datetime: &NaiveDateTime) -> Result<f64> {
    let local = Local
        .from_local_datetime(datetime)
        .earliest()
        .ok_or_else(|| ToolboxError::InvalidArgument(format!("no such local time: {datetime}")))?;
    Ok(local.timestamp() as f64 + f64::from(local.timestamp_subsec_micros()) / 1e6)
}

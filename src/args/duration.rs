//! Duration parser.
//!
//! Accepts either a bare integer (whole seconds) or one or more
//! `<integer><unit>` runs written back to back, e.g. `1h30m` or `2d12h`.
//! Units are case-insensitive and tolerate expanded spellings:
//!
//! | Unit | Spellings | Seconds |
//! |---|---|---|
//! | year | `y`, `yr`, `yrs`, `year`, `years` | 365 days |
//! | month | `mo`, `mon`, `mos`, `month`, `months` | 30 days |
//! | week | `w`, `wk`, `wks`, `week`, `weeks` | 7 days |
//! | day | `d`, `day`, `days` | 86400 |
//! | hour | `h`, `hr`, `hrs`, `hour`, `hours` | 3600 |
//! | minute | `m`, `min`, `mins`, `minute`, `minutes` | 60 |
//! | second | `s`, `sec`, `secs`, `second`, `seconds` | 1 |

use super::{ArgumentParser, ParseError};
use crate::completion::CompletionContext;
use crate::dispatch::CommandContext;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

/// Whole input must be a concatenation of `<digits><letters>` runs.
static COMPOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+[A-Za-z]+)+$").expect("literal duration regex"));

/// One `<digits><letters>` run.
static RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)([A-Za-z]+)").expect("literal duration regex"));

const EXAMPLES: [&str; 4] = ["30s", "5m", "1h30m", "1d"];

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "y" | "yr" | "yrs" | "year" | "years" => Some(YEAR),
        "mo" | "mon" | "mos" | "month" | "months" => Some(MONTH),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(WEEK),
        "d" | "day" | "days" => Some(DAY),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(HOUR),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(MINUTE),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        _ => None,
    }
}

/// Parse a duration token. Empty input is an error, never zero.
pub fn parse_duration(input: &str) -> Result<Duration, ParseError> {
    if input.is_empty() {
        return Err(ParseError::new("Duration cannot be empty", input));
    }

    let too_large = || ParseError::new("Duration is too large", input);

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = input.parse().map_err(|_| too_large())?;
        return Ok(Duration::from_secs(secs));
    }

    if !COMPOUND.is_match(input) {
        return Err(ParseError::new("Invalid duration", input).with_suggestions(EXAMPLES));
    }

    let mut total: u64 = 0;
    for caps in RUN.captures_iter(input) {
        let amount: u64 = caps[1].parse().map_err(|_| too_large())?;
        let unit = caps[2].to_ascii_lowercase();
        let Some(unit_secs) = unit_seconds(&unit) else {
            return Err(ParseError::new(format!("Unknown time unit '{}'", &caps[2]), input)
                .with_suggestions(EXAMPLES));
        };
        total = amount
            .checked_mul(unit_secs)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(too_large)?;
    }
    Ok(Duration::from_secs(total))
}

/// Render a duration for user messages, e.g. `1h 30m` or `45s`.
///
/// Sub-second remainders round up so a pending wait never reads as `0s`.
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    if duration < Duration::from_secs(1) {
        return format!("{}ms", duration.as_millis().max(1));
    }

    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }

    let mut parts = Vec::new();
    for (unit, label) in [(DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (1, "s")] {
        let count = secs / unit;
        if count > 0 {
            parts.push(format!("{count}{label}"));
            secs %= unit;
        }
    }
    parts.join(" ")
}

/// Parser for [`std::time::Duration`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationParser;

impl ArgumentParser for DurationParser {
    type Output = Duration;

    fn parse(&self, _ctx: &mut CommandContext, token: &str) -> Result<Duration, ParseError> {
        parse_duration(token)
    }

    fn suggest(&self, ctx: &CompletionContext) -> Vec<String> {
        let partial = ctx.partial();
        if !partial.is_empty() && partial.bytes().all(|b| b.is_ascii_digit()) {
            ["s", "m", "h", "d", "w"]
                .iter()
                .map(|unit| format!("{partial}{unit}"))
                .collect()
        } else {
            EXAMPLES.iter().map(|s| s.to_string()).collect()
        }
    }

    fn error_message(&self) -> &str {
        "Invalid duration"
    }
}

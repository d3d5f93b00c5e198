//! Rendering values through `date()` formats, limited to their granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::{self, DAY_NAMES};
use crate::context::{Context, MONTH_NAMES};
use crate::difference::Unit;
use crate::error::GranularError;
use crate::granularity::{Granularity, GranularitySet};
use crate::pattern::{render, tokenize, Directive, Token};
use crate::value::GranularDate;
use crate::zone::{format_utc_offset, is_dst_active, offset_seconds};

pub const DATE_FORMAT_ISO: &str = "Y-m-d\\TH:i:s";
pub const DATE_FORMAT_UNIX: &str = "U";
pub const DATE_FORMAT_DATETIME: &str = "Y-m-d H:i:s";
pub const DATE_FORMAT_ICAL: &str = "Ymd\\THis";
pub const DATE_FORMAT_ICAL_DATE: &str = "Ymd";
pub const DATE_FORMAT_DATE: &str = "Y-m-d";

/// The named display formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatPreset {
    Short,
    #[default]
    Medium,
    Long,
}

impl FormatPreset {
    pub const ALL: [FormatPreset; 3] = [FormatPreset::Short, FormatPreset::Medium, FormatPreset::Long];

    pub fn name(self) -> &'static str {
        match self {
            FormatPreset::Short => "short",
            FormatPreset::Medium => "medium",
            FormatPreset::Long => "long",
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            FormatPreset::Short => "m/d/Y - H:i",
            FormatPreset::Medium => "D, m/d/Y - H:i",
            FormatPreset::Long => "l, F j, Y - H:i",
        }
    }
}

impl fmt::Display for FormatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatPreset {
    type Err = GranularError;

    /// `small` and `large` are accepted as aliases of `short` and `long`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" | "small" => Ok(FormatPreset::Short),
            "medium" => Ok(FormatPreset::Medium),
            "long" | "large" => Ok(FormatPreset::Long),
            other => Err(GranularError::InvalidFormat(format!("preset '{other}'"))),
        }
    }
}

/// The `Y-m-d H:i:s` prefix that shows everything down to `precision`.
pub fn granularity_format(precision: Granularity) -> &'static str {
    GranularitySet::from_precision(precision).datetime_format()
}

// ── Limiting ────────────────────────────────────────────────────────────────

/// Punctuation that may separate a removed element from its neighbour.
const SEPARATORS: &[char] = &['-', '/', '.', ',', ':'];

/// Punctuation trimmed when orphaned at either end.
const ORPHANS: &[char] = &['-', '/', '.', ',', ':', '\''];

/// Punctuation that is unescaped before limiting.
const UNESCAPED: &[char] = &['-', ':', '\'', '.', ','];

/// Rewrite `format` so it only shows elements in `granularity`.
///
/// Letters for absent elements are removed together with one separator
/// before them. The ISO `T` goes when the value lacks a date or a time;
/// `a`/`A` go when it lacks a time. Empty brackets and orphaned punctuation
/// are cleaned up, and a format left with only escaped characters becomes
/// empty. The result is a fixed point: limiting it again changes nothing.
///
/// # Examples
///
/// ```
/// use granular_date::{limit_format, Granularity, GranularitySet};
///
/// let date_only = GranularitySet::from_precision(Granularity::Day);
/// assert_eq!(limit_format("Y-m-d H:i", &date_only), "Y-m-d");
/// assert_eq!(limit_format("F j, Y - H:i", &date_only), "F j, Y");
/// ```
pub fn limit_format(format: &str, granularity: &GranularitySet) -> String {
    let mut tokens = tokenize(format);
    loop {
        let limited = limit_tokens(&tokens, granularity);
        if limited == tokens {
            break;
        }
        tokens = limited;
    }
    render(&tokens)
}

fn limit_tokens(tokens: &[Token], granularity: &GranularitySet) -> Vec<Token> {
    let has_time = granularity.has_time();
    let has_date = granularity.has_date();

    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = match *token {
            Token::Escaped(c) if UNESCAPED.contains(&c) => Token::Literal(c),
            Token::Escaped('T') | Token::Directive(Directive::TimezoneAbbr)
                if !has_time || !has_date =>
            {
                Token::Literal(' ')
            }
            other => other,
        };

        let strip = match token {
            Token::Directive(d) if d.is_meridiem() => !has_time,
            Token::Directive(d) => d.element().is_some_and(|g| !granularity.contains(g)),
            _ => false,
        };
        if !strip {
            out.push(token);
            continue;
        }
        if out.last().is_some_and(Token::is_whitespace) {
            out.pop();
        }
        if matches!(out.last(), Some(Token::Literal(c)) if SEPARATORS.contains(c)) {
            out.pop();
        }
    }

    remove_empty_pairs(&mut out);
    trim_tokens(&mut out);

    let only_escapes = out
        .iter()
        .all(|t| matches!(t, Token::Escaped(c) if c.is_alphanumeric() || *c == '_') || t.is_whitespace());
    if only_escapes {
        out.clear();
    }
    out
}

fn remove_empty_pairs(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while i + 1 < tokens.len() {
        let pair = (&tokens[i], &tokens[i + 1]);
        let empty = matches!(
            pair,
            (Token::Literal('('), Token::Literal(')'))
                | (Token::Literal('['), Token::Literal(']'))
                | (Token::Literal('|'), Token::Literal('|'))
        );
        if empty {
            tokens.drain(i..i + 2);
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
}

fn trim_whitespace(tokens: &mut Vec<Token>) {
    while tokens.last().is_some_and(Token::is_whitespace) {
        tokens.pop();
    }
    let lead = tokens.iter().take_while(|t| t.is_whitespace()).count();
    tokens.drain(..lead);
}

fn trim_tokens(tokens: &mut Vec<Token>) {
    trim_whitespace(tokens);
    if matches!(tokens.first(), Some(Token::Literal(c)) if ORPHANS.contains(c)) {
        tokens.remove(0);
    }
    if matches!(tokens.last(), Some(Token::Literal(c)) if ORPHANS.contains(c)) {
        tokens.pop();
    }
    trim_whitespace(tokens);
}

// ── Rendering ───────────────────────────────────────────────────────────────

impl GranularDate {
    /// Render through a `date()` format.
    ///
    /// Unless `force` is set the format is first limited to this value's
    /// granularity, so unknown parts never appear. Never fails: a format with
    /// nothing left to show renders as an empty string.
    pub fn format(&self, format: &str, force: bool) -> String {
        let tokens = if force {
            tokenize(format)
        } else {
            tokenize(&limit_format(format, &self.granularity))
        };
        render_tokens(&self.instant, &tokens)
    }
}

impl GranularDate {
    /// Render through one of the named formats, limited to this value's
    /// granularity.
    pub fn format_preset(&self, preset: FormatPreset) -> String {
        self.format(preset.pattern(), false)
    }

    /// The distance to the context's current instant, e.g.
    /// `"2 hours, 5 minutes ago"` for a past value or `"1 week"` for a
    /// future one. See [`format_duration`] for `granularity`.
    pub fn format_interval(&self, granularity: usize, ctx: &Context) -> String {
        let now = GranularDate::now(Some(self.timezone_name()), ctx);
        let seconds = self.difference(&now, Unit::Seconds, ctx.config()) as i64;
        let text = format_duration(seconds, granularity);
        if self.instant() < now.instant() {
            format!("{text} ago")
        } else {
            text
        }
    }
}

const INTERVAL_UNITS: [(&str, i64); 7] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// Render a number of seconds with at most `granularity` units, largest
/// first, e.g. `"1 year, 2 months"`.
///
/// Once a unit has been written every following unit uses up one of the
/// `granularity` slots, even when its count is zero, so `granularity` bounds
/// the precision rather than the number of words.
pub fn format_duration(seconds: i64, granularity: usize) -> String {
    let mut remaining = seconds.unsigned_abs();
    let mut slots = granularity;
    let mut parts = Vec::new();
    for (name, size) in INTERVAL_UNITS {
        if slots == 0 {
            break;
        }
        let size = size.unsigned_abs();
        if remaining >= size {
            let count = remaining / size;
            remaining %= size;
            parts.push(format!("{} {}{}", count, name, if count == 1 { "" } else { "s" }));
            slots -= 1;
        } else if !parts.is_empty() {
            slots -= 1;
        }
    }
    if parts.is_empty() {
        return "0 seconds".to_string();
    }
    parts.join(", ")
}

/// Render tokens against an instant with no granularity filtering.
pub fn render_tokens(dt: &DateTime<Tz>, tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Directive(d) => out.push_str(&render_directive(dt, *d)),
            Token::Escaped(c) | Token::Literal(c) => out.push(*c),
        }
    }
    out
}

fn render_directive(dt: &DateTime<Tz>, directive: Directive) -> String {
    let date = dt.date_naive();
    let weekday = calendar::day_of_week(date) as usize;
    let month_name = MONTH_NAMES[dt.month0() as usize];
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };

    match directive {
        Directive::DayPadded => format!("{:02}", dt.day()),
        Directive::WeekdayAbbr => DAY_NAMES[weekday][..3].to_string(),
        Directive::Day => dt.day().to_string(),
        Directive::WeekdayName => DAY_NAMES[weekday].to_string(),
        Directive::IsoWeekday => dt.weekday().number_from_monday().to_string(),
        Directive::OrdinalSuffix => ordinal_suffix(dt.day()).to_string(),
        Directive::Weekday => weekday.to_string(),
        Directive::DayOfYear => calendar::day_of_year(date).to_string(),
        Directive::IsoWeek => format!("{:02}", calendar::iso_week(date).1),
        Directive::MonthName => month_name.to_string(),
        Directive::MonthPadded => format!("{:02}", dt.month()),
        Directive::MonthAbbr => month_name[..3].to_string(),
        Directive::Month => dt.month().to_string(),
        Directive::DaysInMonth => calendar::days_in_month(dt.year(), dt.month())
            .unwrap_or(31)
            .to_string(),
        Directive::LeapYear => u8::from(calendar::is_leap_year(dt.year())).to_string(),
        Directive::IsoYear => calendar::iso_week(date).0.to_string(),
        Directive::Year => format_year(dt.year()),
        Directive::YearShort => format!("{:02}", dt.year().rem_euclid(100)),
        Directive::MeridiemLower => if dt.hour() < 12 { "am" } else { "pm" }.to_string(),
        Directive::MeridiemUpper => if dt.hour() < 12 { "AM" } else { "PM" }.to_string(),
        Directive::Swatch => swatch(dt),
        Directive::Hour12 => hour12.to_string(),
        Directive::Hour24 => dt.hour().to_string(),
        Directive::Hour12Padded => format!("{hour12:02}"),
        Directive::Hour24Padded => format!("{:02}", dt.hour()),
        Directive::Minute => format!("{:02}", dt.minute()),
        Directive::Second => format!("{:02}", dt.second()),
        Directive::Microsecond => format!("{:06}", dt.nanosecond() % 1_000_000_000 / 1_000),
        Directive::Millisecond => format!("{:03}", dt.nanosecond() % 1_000_000_000 / 1_000_000),
        Directive::TimezoneId => dt.timezone().name().to_string(),
        Directive::Dst => u8::from(is_dst_active(dt)).to_string(),
        Directive::Offset => format_utc_offset(dt, false),
        Directive::OffsetColon => format_utc_offset(dt, true),
        Directive::TimezoneAbbr => dt.format("%Z").to_string(),
        Directive::OffsetSeconds => offset_seconds(dt).to_string(),
        Directive::Iso8601 => format!(
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
            format_year(dt.year()),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
            format_utc_offset(dt, true)
        ),
        Directive::Rfc2822 => format!(
            "{}, {:02} {} {} {:02}:{:02}:{:02} {}",
            &DAY_NAMES[weekday][..3],
            dt.day(),
            &month_name[..3],
            format_year(dt.year()),
            dt.hour(),
            dt.minute(),
            dt.second(),
            format_utc_offset(dt, false)
        ),
        Directive::Timestamp => dt.timestamp().to_string(),
    }
}

/// At least four digits, with a leading `-` before year 0.
fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Swatch internet time: thousandths of a day in UTC+1.
fn swatch(dt: &DateTime<Tz>) -> String {
    let utc = dt.with_timezone(&Utc);
    let seconds = (utc.num_seconds_from_midnight() + 3600) % 86_400;
    format!("{:03}", seconds * 10 / 864)
}

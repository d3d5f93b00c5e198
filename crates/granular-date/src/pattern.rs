//! `date()`-style format patterns.
//!
//! A format string such as `"d/m/Y H:i"` is a sequence of [`Token`]s: format
//! letters ([`Directive`]s), backslash-escaped characters, and literal
//! characters. The [`DIRECTIVES`] table maps each letter to the shape its value
//! takes in input text, the field it sets when parsing, and the granularity
//! element it belongs to when a format is limited. The parser and the limiter
//! both read this one table.

use regex::Regex;

use crate::error::GranularError;
use crate::granularity::Granularity;

/// A format letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `d`: day of month, two digits.
    DayPadded,
    /// `D`: weekday, three letters.
    WeekdayAbbr,
    /// `j`: day of month.
    Day,
    /// `l`: weekday, full name.
    WeekdayName,
    /// `N`: ISO weekday, 1 (Monday) to 7.
    IsoWeekday,
    /// `S`: English ordinal suffix for the day.
    OrdinalSuffix,
    /// `w`: weekday, 0 (Sunday) to 6.
    Weekday,
    /// `z`: day of year from 0.
    DayOfYear,
    /// `W`: ISO week number.
    IsoWeek,
    /// `F`: month, full name.
    MonthName,
    /// `m`: month, two digits.
    MonthPadded,
    /// `M`: month, three letters.
    MonthAbbr,
    /// `n`: month.
    Month,
    /// `t`: days in the month.
    DaysInMonth,
    /// `L`: 1 in a leap year.
    LeapYear,
    /// `o`: ISO week-numbering year.
    IsoYear,
    /// `Y`: year, at least four digits.
    Year,
    /// `y`: year, two digits.
    YearShort,
    /// `a`: `am` or `pm`.
    MeridiemLower,
    /// `A`: `AM` or `PM`.
    MeridiemUpper,
    /// `B`: Swatch internet time.
    Swatch,
    /// `g`: 12-hour hour.
    Hour12,
    /// `G`: 24-hour hour.
    Hour24,
    /// `h`: 12-hour hour, two digits.
    Hour12Padded,
    /// `H`: 24-hour hour, two digits.
    Hour24Padded,
    /// `i`: minutes, two digits.
    Minute,
    /// `s`: seconds, two digits.
    Second,
    /// `u`: microseconds.
    Microsecond,
    /// `v`: milliseconds.
    Millisecond,
    /// `e`: timezone identifier.
    TimezoneId,
    /// `I`: 1 while daylight saving time is in effect.
    Dst,
    /// `O`: UTC offset, `+0200`.
    Offset,
    /// `P`: UTC offset, `+02:00`.
    OffsetColon,
    /// `T`: timezone abbreviation.
    TimezoneAbbr,
    /// `Z`: UTC offset in seconds.
    OffsetSeconds,
    /// `c`: ISO 8601 date and time.
    Iso8601,
    /// `r`: RFC 2822 date and time.
    Rfc2822,
    /// `U`: seconds since the Unix epoch.
    Timestamp,
}

/// One row of the directive table.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveSpec {
    pub letter: char,
    pub directive: Directive,
    /// Regex fragment, without capture groups, matching this letter's value.
    pub shape: &'static str,
    /// The field parsing sets from this letter's value.
    pub field: Option<Granularity>,
    /// The element whose absence strips this letter from a limited format.
    pub element: Option<Granularity>,
}

const fn spec(
    letter: char,
    directive: Directive,
    shape: &'static str,
    field: Option<Granularity>,
    element: Option<Granularity>,
) -> DirectiveSpec {
    DirectiveSpec {
        letter,
        directive,
        shape,
        field,
        element,
    }
}

use Granularity as G;

pub static DIRECTIVES: [DirectiveSpec; 38] = [
    spec('d', Directive::DayPadded, r"\d{1,2}", Some(G::Day), Some(G::Day)),
    spec('D', Directive::WeekdayAbbr, r"\S{3,4}", None, Some(G::Day)),
    spec('j', Directive::Day, r"\d{1,2}", Some(G::Day), Some(G::Day)),
    spec('l', Directive::WeekdayName, r"\S*", None, Some(G::Day)),
    spec('N', Directive::IsoWeekday, r"\d", None, None),
    spec('S', Directive::OrdinalSuffix, r"\w{2}", None, Some(G::Day)),
    spec('w', Directive::Weekday, r"\d", None, None),
    spec('z', Directive::DayOfYear, r"\d{1,3}", None, None),
    spec('W', Directive::IsoWeek, r"\d{1,2}", None, None),
    spec('F', Directive::MonthName, r"\S*", Some(G::Month), Some(G::Month)),
    spec('m', Directive::MonthPadded, r"\d{1,2}", Some(G::Month), Some(G::Month)),
    spec('M', Directive::MonthAbbr, r"\S{3,4}", Some(G::Month), Some(G::Month)),
    spec('n', Directive::Month, r"\d{1,2}", Some(G::Month), Some(G::Month)),
    spec('t', Directive::DaysInMonth, r"\d{2}", None, None),
    spec('L', Directive::LeapYear, r"\d", None, None),
    spec('o', Directive::IsoYear, r"\d{4}", None, None),
    spec('Y', Directive::Year, r"-?\d{1,6}", Some(G::Year), Some(G::Year)),
    spec('y', Directive::YearShort, r"\d{2}", Some(G::Year), Some(G::Year)),
    spec('a', Directive::MeridiemLower, r"(?:am|pm)", None, None),
    spec('A', Directive::MeridiemUpper, r"(?:AM|PM)", None, None),
    spec('B', Directive::Swatch, r"\d{3}", None, None),
    spec('g', Directive::Hour12, r"\d{1,2}", Some(G::Hour), Some(G::Hour)),
    spec('G', Directive::Hour24, r"\d{1,2}", Some(G::Hour), Some(G::Hour)),
    spec('h', Directive::Hour12Padded, r"\d{1,2}", Some(G::Hour), Some(G::Hour)),
    spec('H', Directive::Hour24Padded, r"\d{1,2}", Some(G::Hour), Some(G::Hour)),
    spec('i', Directive::Minute, r"\d{1,2}", Some(G::Minute), Some(G::Minute)),
    spec('s', Directive::Second, r"\d{1,2}", Some(G::Second), Some(G::Second)),
    spec('u', Directive::Microsecond, r"\d{1,6}", None, Some(G::Second)),
    spec('v', Directive::Millisecond, r"\d{1,3}", None, Some(G::Second)),
    spec('e', Directive::TimezoneId, r"[A-Za-z0-9_/+\-]*", None, Some(G::Timezone)),
    spec('I', Directive::Dst, r"\d", None, None),
    spec('O', Directive::Offset, r"[+-]\d{4}", None, Some(G::Timezone)),
    spec('P', Directive::OffsetColon, r"[+-]?\d{2}:\d{2}", None, Some(G::Timezone)),
    spec('T', Directive::TimezoneAbbr, r"\w*", None, Some(G::Timezone)),
    spec('Z', Directive::OffsetSeconds, r"[+-]?\d*", None, Some(G::Timezone)),
    spec(
        'c',
        Directive::Iso8601,
        r"-?\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{2}:\d{2}",
        None,
        None,
    ),
    spec(
        'r',
        Directive::Rfc2822,
        r"\w{3}, \d{2}\s\w{3}\s\d{2,4}\s\d{2}:\d{2}:\d{2}(?:\s?[+-]?\d{4})?",
        None,
        None,
    ),
    spec('U', Directive::Timestamp, r"-?\d+", None, None),
];

impl Directive {
    pub fn from_letter(letter: char) -> Option<Directive> {
        DIRECTIVES
            .iter()
            .find(|s| s.letter == letter)
            .map(|s| s.directive)
    }

    pub fn spec(self) -> &'static DirectiveSpec {
        // Every variant has exactly one row.
        DIRECTIVES
            .iter()
            .find(|s| s.directive == self)
            .unwrap_or(&DIRECTIVES[0])
    }

    pub fn letter(self) -> char {
        self.spec().letter
    }

    pub fn shape(self) -> &'static str {
        self.spec().shape
    }

    pub fn field(self) -> Option<Granularity> {
        self.spec().field
    }

    pub fn element(self) -> Option<Granularity> {
        self.spec().element
    }

    pub fn is_meridiem(self) -> bool {
        matches!(self, Directive::MeridiemLower | Directive::MeridiemUpper)
    }
}

/// One piece of a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Directive(Directive),
    /// A character preceded by a backslash; never a format letter.
    Escaped(char),
    Literal(char),
}

impl Token {
    pub fn is_literal(&self, c: char) -> bool {
        matches!(self, Token::Literal(l) if *l == c)
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Literal(c) if c.is_whitespace())
    }
}

/// Split a format string into tokens. A trailing lone backslash is dropped.
pub fn tokenize(format: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                tokens.push(Token::Escaped(escaped));
            }
        } else if let Some(directive) = Directive::from_letter(c) {
            tokens.push(Token::Directive(directive));
        } else {
            tokens.push(Token::Literal(c));
        }
    }
    tokens
}

/// Render tokens back into a format string, keeping escapes.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Directive(d) => out.push(d.letter()),
            Token::Escaped(c) => {
                out.push('\\');
                out.push(*c);
            }
            Token::Literal(c) => out.push(*c),
        }
    }
    out
}

/// The ordered granularity elements a format sets when parsed.
///
/// `format_order("m/d/Y H:i")` is `[month, day, year, hour, minute]`.
pub fn format_order(format: &str) -> Vec<Granularity> {
    tokenize(format)
        .into_iter()
        .filter_map(|t| match t {
            Token::Directive(d) => d.field(),
            _ => None,
        })
        .collect()
}

/// A format string compiled into its two matchers.
///
/// `letters` runs over the format template itself and recovers which letters
/// it uses, in order. `values` runs over input text and captures the
/// substring for each letter.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    format: String,
    template: String,
    letters: Regex,
    values: Regex,
}

impl CompiledPattern {
    /// Compile `format`.
    ///
    /// # Errors
    ///
    /// Returns [`GranularError::InvalidFormat`] if the generated matchers do
    /// not compile.
    pub fn compile(format: &str) -> Result<Self, GranularError> {
        let tokens = tokenize(format);

        let mut template = String::with_capacity(format.len());
        let mut letters = String::from("^");
        let mut values = String::from("^");
        for token in &tokens {
            match token {
                Token::Directive(d) => {
                    template.push(d.letter());
                    letters.push_str("(.)");
                    values.push('(');
                    values.push_str(d.shape());
                    values.push(')');
                }
                Token::Escaped(c) | Token::Literal(c) => {
                    let quoted = regex::escape(c.encode_utf8(&mut [0; 4]));
                    template.push(*c);
                    letters.push_str(&quoted);
                    values.push_str(&quoted);
                }
            }
        }
        letters.push('$');
        values.push('$');

        let build = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| GranularError::InvalidFormat(format!("'{format}': {e}")))
        };

        Ok(Self {
            format: format.to_string(),
            template,
            letters: build(&letters)?,
            values: build(&values)?,
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// The format letters used, in order, recovered from the template.
    pub fn letters(&self) -> Vec<Directive> {
        match self.letters.captures(&self.template) {
            Some(caps) => caps
                .iter()
                .skip(1)
                .flatten()
                .filter_map(|m| m.as_str().chars().next())
                .filter_map(Directive::from_letter)
                .collect(),
            None => Vec::new(),
        }
    }

    /// The substrings of `input` matching each letter, or empty if the input
    /// does not have this pattern's shape.
    pub fn values<'a>(&self, input: &'a str) -> Vec<&'a str> {
        match self.values.captures(input) {
            Some(caps) => caps
                .iter()
                .skip(1)
                .map(|m| m.map_or("", |m| m.as_str()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Pair each letter with its value from `input`.
    ///
    /// `None` when the input does not match or the letter and value counts
    /// disagree.
    pub fn extract<'a>(&self, input: &'a str) -> Option<Vec<(Directive, &'a str)>> {
        if !self.values.is_match(input) {
            return None;
        }
        let letters = self.letters();
        let values = self.values(input);
        if letters.len() != values.len() {
            return None;
        }
        Some(letters.into_iter().zip(values).collect())
    }
}

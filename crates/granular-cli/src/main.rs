use std::process::exit;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc, Weekday};
use clap::{Args, Parser, Subcommand};
use granular_date::{
    limit_format, Context, DateInput, DateParts, FieldErrors, FuzzyMode, GranularDate,
    GranularitySet, Unit, ValidationConfig,
};
use serde::Serialize;

/// Parse, format, merge and compare dates that remember which parts were known.
#[derive(Debug, Parser)]
#[command(name = "granular", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Timezone used when an input names none
    #[arg(long, global = true, default_value = "UTC")]
    default_timezone: String,

    /// Pin the clock to an RFC 3339 instant
    #[arg(long, global = true)]
    now: Option<String>,

    /// Smallest acceptable year
    #[arg(long, global = true, default_value_t = 1)]
    min_year: i32,

    /// Largest acceptable year
    #[arg(long, global = true, default_value_t = 4000)]
    max_year: i32,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse input and print the value as JSON
    Parse(ValueArgs),
    /// Render input through a date() pattern, limited to its granularity
    Format {
        #[command(flatten)]
        value: ValueArgs,
        /// Output pattern
        #[arg(short, long)]
        pattern: String,
        /// Render every letter even when its part is unknown
        #[arg(long)]
        force: bool,
    },
    /// Limit a pattern to a granularity such as "year,month,day"
    Limit {
        pattern: String,
        #[arg(short, long)]
        granularity: String,
    },
    /// Difference between two inputs
    Diff {
        a: String,
        b: String,
        /// years, months, weeks, days, hours, minutes or seconds
        #[arg(short, long, default_value = "seconds")]
        unit: String,
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        timezone: Option<String>,
        /// Count ISO weeks instead of calendar weeks
        #[arg(long)]
        iso_weeks: bool,
        /// First day of a calendar week
        #[arg(long, default_value = "Mon")]
        first_day: String,
    },
    /// Fill the parts the first input lacks from the second
    Merge {
        a: String,
        b: String,
        #[arg(long)]
        format_a: Option<String>,
        #[arg(long)]
        format_b: Option<String>,
        #[arg(short, long)]
        timezone: Option<String>,
    },
    /// Complete a partial input into a valid date and time
    Fuzzy {
        #[command(flatten)]
        value: ValueArgs,
        /// first or current
        #[arg(short, long, default_value = "first")]
        mode: String,
    },
}

#[derive(Debug, Args)]
struct ValueArgs {
    /// Text, a Unix timestamp, or a JSON object of parts
    input: String,
    /// date() pattern the input follows
    #[arg(short, long)]
    format: Option<String>,
    #[arg(short, long)]
    timezone: Option<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    value: &'a GranularDate,
    parts: DateParts,
    iso: String,
    display: String,
    time_only: bool,
    date_only: bool,
    errors: &'a FieldErrors,
}

impl<'a> Report<'a> {
    fn new(value: &'a GranularDate) -> Self {
        let parts = value.to_array(false);
        Self {
            iso: parts.to_iso(false),
            display: value.format(value.granularity().datetime_format(), false),
            parts,
            value,
            time_only: value.is_time_only(),
            date_only: value.is_date_only(),
            errors: value.errors(),
        }
    }
}

fn context(global: &GlobalArgs) -> Result<Context> {
    let ctx = match &global.now {
        Some(now) => {
            let now = DateTime::parse_from_rfc3339(now)
                .with_context(|| format!("--now '{now}' is not RFC 3339"))?;
            Context::fixed(now.with_timezone(&Utc))
        }
        None => Context::new(),
    };
    Ok(ctx
        .with_default_timezone(global.default_timezone.clone())
        .with_config(ValidationConfig {
            min_year: global.min_year,
            max_year: global.max_year,
            ..ValidationConfig::default()
        }))
}

/// A JSON object is read as a parts record; anything else as text or a
/// timestamp.
fn input(raw: &str) -> Result<DateInput> {
    if raw.trim_start().starts_with('{') {
        let parts: DateParts =
            serde_json::from_str(raw).with_context(|| format!("invalid parts object '{raw}'"))?;
        Ok(DateInput::Parts(parts))
    } else {
        Ok(DateInput::from(raw))
    }
}

fn build(raw: &str, format: Option<&str>, timezone: Option<&str>, ctx: &Context) -> Result<GranularDate> {
    GranularDate::new(input(raw)?, timezone, format, ctx)
        .with_context(|| format!("cannot build a date from '{raw}'"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let ctx = context(&cli.global)?;
    match cli.command {
        Command::Parse(args) => {
            let value = build(&args.input, args.format.as_deref(), args.timezone.as_deref(), &ctx)?;
            print_json(&Report::new(&value))
        }
        Command::Format {
            value,
            pattern,
            force,
        } => {
            let value = build(&value.input, value.format.as_deref(), value.timezone.as_deref(), &ctx)?;
            println!("{}", value.format(&pattern, force));
            Ok(())
        }
        Command::Limit {
            pattern,
            granularity,
        } => {
            let set: GranularitySet = granularity.parse()?;
            println!("{}", limit_format(&pattern, &set));
            Ok(())
        }
        Command::Diff {
            a,
            b,
            unit,
            format,
            timezone,
            iso_weeks,
            first_day,
        } => {
            let unit: Unit = unit.parse()?;
            let first_day_of_week = first_day
                .parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("'{first_day}' is not a weekday"))?;
            let config = ValidationConfig {
                use_iso_weeks: iso_weeks,
                first_day_of_week,
                ..*ctx.config()
            };
            let a = build(&a, format.as_deref(), timezone.as_deref(), &ctx)?;
            let b = build(&b, format.as_deref(), timezone.as_deref(), &ctx)?;
            print_json(&serde_json::json!({
                "unit": unit,
                "difference": a.difference(&b, unit, &config),
            }))
        }
        Command::Merge {
            a,
            b,
            format_a,
            format_b,
            timezone,
        } => {
            let a = build(&a, format_a.as_deref(), timezone.as_deref(), &ctx)?;
            let b = build(&b, format_b.as_deref(), timezone.as_deref(), &ctx)?;
            print_json(&Report::new(&a.merge(&b)))
        }
        Command::Fuzzy { value, mode } => {
            let mode: FuzzyMode = mode.parse()?;
            let mut completed = GranularDate::now(value.timezone.as_deref(), &ctx);
            completed.set_fuzzy_date(input(&value.input)?, value.format.as_deref(), mode, &ctx)?;
            print_json(&Report::new(&completed))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        exit(1);
    }
}

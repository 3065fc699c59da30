use super::interface::{Extension, TemplateFilter, TemplateFunction};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use minijinja::value::ValueKind;
use minijinja::{ErrorKind, Value};
use std::fmt::Write;

/// Default `date` filter format, e.g. `March 5, 2024 14:30`.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y %H:%M";

/// Extension carrying the rendering timezone.
///
/// Provides the `date` filter and the `now` function. Dates are rendered in
/// the extension's timezone unless the filter is given one explicitly.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeExtension {
    timezone: Tz,
}

impl DateTimeExtension {
    pub const NAME: &'static str = "datetime";

    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Formats a timestamp, RFC 3339 string or `"now"` in the given timezone.
    pub fn format_date(
        &self,
        value: &Value,
        format: Option<&str>,
        timezone: Option<&str>,
    ) -> Result<String, minijinja::Error> {
        let timezone = match timezone {
            Some(name) => name.parse::<Tz>().map_err(|_| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("unknown timezone '{name}'"),
                )
            })?,
            None => self.timezone,
        };
        let date = to_datetime(value)?.with_timezone(&timezone);

        let mut out = String::new();
        write!(out, "{}", date.format(format.unwrap_or(DEFAULT_DATE_FORMAT))).map_err(|_| {
            minijinja::Error::new(ErrorKind::InvalidOperation, "invalid date format")
        })?;
        Ok(out)
    }
}

impl Default for DateTimeExtension {
    fn default() -> Self {
        Self::new(chrono_tz::UTC)
    }
}

fn to_datetime(value: &Value) -> Result<DateTime<Utc>, minijinja::Error> {
    if let Some(s) = value.as_str() {
        if s == "now" {
            return Ok(Utc::now());
        }
        return DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)).map_err(|e| {
            minijinja::Error::new(ErrorKind::InvalidOperation, format!("invalid date '{s}'"))
                .with_source(e)
        });
    }
    let not_a_date = || {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot convert {} to a date", value.kind()),
        )
    };
    if value.kind() != ValueKind::Number {
        return Err(not_a_date());
    }
    let timestamp = i64::try_from(value.clone()).map_err(|_| not_a_date())?;
    DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "timestamp out of range")
    })
}

impl Extension for DateTimeExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn functions(&self) -> Vec<TemplateFunction> {
        let timezone = self.timezone;
        vec![TemplateFunction::new("now", move || -> String {
            Utc::now().with_timezone(&timezone).to_rfc3339()
        })]
    }

    fn filters(&self) -> Vec<TemplateFilter> {
        let extension = *self;
        vec![TemplateFilter::new(
            "date",
            move |value: Value,
                  format: Option<String>,
                  timezone: Option<String>|
                  -> Result<String, minijinja::Error> {
                extension.format_date(&value, format.as_deref(), timezone.as_deref())
            },
        )]
    }
}

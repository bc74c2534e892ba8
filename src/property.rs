use std::str::FromStr;

use anyhow::{Context, Error};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::{parameters::ParameterSet, unescape::unescape};

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid regex"));

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})(Z)?$").expect("valid regex")
});

/// The decoded value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unescaped text with no parameters worth keeping.
    Text(String),

    /// Unescaped text along with the raw parameter tokens it was given.
    Annotated { params: Vec<String>, value: String },

    Date(DateValue),

    Geo(GeoPoint),
}

impl Value {
    /// Decode escaped text, keeping the parameters only if there are any
    /// besides the default charset.
    pub fn text_from(value: &str, params: ParameterSet) -> Value {
        let value = unescape(value);
        let params = params.without_default_charset();
        if params.is_empty() {
            Value::Text(value)
        } else {
            Value::Annotated {
                params: params.into_tokens(),
                value,
            }
        }
    }

    /// Decode a date or date-time, falling back to plain text (without the
    /// parameters) if the value has neither shape.
    pub fn date_from(value: &str, params: ParameterSet) -> Value {
        match DateValue::parse_from(value, &params) {
            Ok(date) => Value::Date(date),
            Err(e) => {
                trace!(value, error = %e, "Keeping date property as text");
                Value::text_from(value, ParameterSet::default())
            }
        }
    }

    pub fn geo_from(value: &str) -> Value {
        Value::Geo(GeoPoint::parse_from(value))
    }

    /// The text of a `Text` or `Annotated` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) | Value::Annotated { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Value::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_geo(&self) -> Option<&GeoPoint> {
        match self {
            Value::Geo(geo) => Some(geo),
            _ => None,
        }
    }

    /// The raw parameter tokens carried by an `Annotated` value.
    pub fn params(&self) -> &[String] {
        match self {
            Value::Annotated { params, .. } => params,
            _ => &[],
        }
    }

    /// The value as (unescaped) text, whatever its variant.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(value) | Value::Annotated { value, .. } => value.clone(),
            Value::Date(date) => date.format_value(),
            Value::Geo(geo) => geo.format_value(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateValue> for Value {
    fn from(d: DateValue) -> Self {
        Value::Date(d)
    }
}

impl From<GeoPoint> for Value {
    fn from(g: GeoPoint) -> Self {
        Value::Geo(g)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moment {
    /// A calendar date with no time of day.
    Date(NaiveDate),

    /// A "floating" date-time, read as wall-clock time wherever it is used.
    Local(NaiveDateTime),

    Utc(DateTime<Utc>),
}

impl Moment {
    pub fn is_date_only(&self) -> bool {
        matches!(self, Moment::Date(_))
    }

    /// The wall-clock fields of the moment. Dates are taken at midnight.
    pub fn naive(&self) -> NaiveDateTime {
        match *self {
            Moment::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            Moment::Local(d) => d,
            Moment::Utc(d) => d.naive_utc(),
        }
    }
}

/// A date or date-time, with the timezone label from its `TZID` parameter.
///
/// The label is descriptive only: the moment is never shifted into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateValue {
    pub moment: Moment,
    pub tzid: Option<String>,
}

impl DateValue {
    pub fn new(moment: Moment) -> DateValue {
        DateValue { moment, tzid: None }
    }

    pub fn with_tzid(mut self, tzid: impl Into<String>) -> DateValue {
        self.tzid = Some(tzid.into());
        self
    }

    pub fn is_date_only(&self) -> bool {
        self.moment.is_date_only()
    }

    /// Parse `YYYYMMDD` (only when marked `VALUE=DATE`), `YYYYMMDDTHHMMSS`, or
    /// `YYYYMMDDTHHMMSSZ`.
    pub fn parse_from(value: &str, params: &ParameterSet) -> Result<DateValue, Error> {
        let tzid = params.get_tzid().map(str::to_string);

        if params.is_date_only() {
            if let Some(caps) = DATE.captures(value) {
                let date = date_from_captures(&caps, value)?;
                return Ok(DateValue {
                    moment: Moment::Date(date),
                    tzid,
                });
            }
        }

        let caps = DATE_TIME
            .captures(value)
            .with_context(|| format!("Not a date-time: {:?}", value))?;

        let date = date_from_captures(&caps, value)?;
        let date_time = date
            .and_hms_opt(capture(&caps, 4)?, capture(&caps, 5)?, capture(&caps, 6)?)
            .with_context(|| format!("Invalid time: {:?}", value))?;

        let moment = if caps.get(7).is_some() {
            Moment::Utc(Utc.from_utc_datetime(&date_time))
        } else {
            Moment::Local(date_time)
        };

        Ok(DateValue { moment, tzid })
    }

    /// Format the value part of the content line, without parameters.
    pub fn format_value(&self) -> String {
        match self.moment {
            Moment::Date(d) => d.format("%Y%m%d").to_string(),
            Moment::Local(d) => d.format("%Y%m%dT%H%M%S").to_string(),
            Moment::Utc(d) => d.format("%Y%m%dT%H%M%SZ").to_string(),
        }
    }
}

fn capture<T>(caps: &Captures<'_>, index: usize) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let group = caps
        .get(index)
        .with_context(|| format!("Missing capture group {}", index))?;

    Ok(group.as_str().parse()?)
}

fn date_from_captures(caps: &Captures<'_>, value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::from_ymd_opt(capture(caps, 1)?, capture(caps, 2)?, capture(caps, 3)?)
        .with_context(|| format!("Invalid date: {:?}", value))
}

/// A `GEO` value. Fields that failed to parse are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn parse_from(value: &str) -> GeoPoint {
        let mut parts = value.split(';');

        GeoPoint {
            latitude: parse_coordinate(parts.next()),
            longitude: parse_coordinate(parts.next()),
        }
    }

    pub fn format_value(&self) -> String {
        format!("{};{}", self.latitude, self.longitude)
    }
}

fn parse_coordinate(field: Option<&str>) -> f64 {
    field
        .and_then(|f| f.trim().parse().ok())
        .unwrap_or(f64::NAN)
}

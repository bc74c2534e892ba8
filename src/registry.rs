//! The table of properties the codec understands, and how each one is decoded
//! from and encoded to a content line.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
    parameters::{ParameterSet, DEFAULT_CHARSET},
    parser::ContentLine,
    property::Value,
    unescape::escape,
};

static STANDARD: Lazy<Registry> = Lazy::new(|| RegistryBuilder::standard().build());

/// How a property's raw value is turned into a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Escaped text, annotated with its parameters if they matter.
    Plain,

    /// A date or date-time, or plain text if it's neither.
    Date,

    /// A `latitude;longitude` pair.
    Geo,
}

impl Decoder {
    pub fn decode(self, value: &str, params: ParameterSet) -> Value {
        match self {
            Decoder::Plain => Value::text_from(value, params),
            Decoder::Date => Value::date_from(value, params),
            Decoder::Geo => Value::geo_from(value),
        }
    }
}

/// How a [`Value`] is written back out as a content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// Text, marked as UTF-8 unless it already names a charset.
    Text,

    /// Text with exactly the parameters it was parsed with.
    Raw,

    Date,

    Geo,
}

impl Encoder {
    pub fn encode(self, name: &str, value: &Value) -> ContentLine {
        match self {
            Encoder::Text => {
                let params = ParameterSet::from(value.params().to_vec());
                let mut parameters = Vec::new();
                if !params.has_charset() {
                    parameters.push(DEFAULT_CHARSET.to_string());
                }
                parameters.extend(params.into_tokens());

                ContentLine {
                    name: name.to_string(),
                    parameters,
                    value: escape(&value.to_text()),
                }
            }
            Encoder::Raw => ContentLine {
                name: name.to_string(),
                parameters: value.params().to_vec(),
                value: escape(&value.to_text()),
            },
            Encoder::Date => match value.as_date() {
                Some(date) => {
                    let mut parameters = Vec::new();
                    if date.is_date_only() {
                        parameters.push("VALUE=DATE".to_string());
                    }
                    if let Some(tzid) = &date.tzid {
                        parameters.push(format!("TZID={}", tzid));
                    }

                    ContentLine {
                        name: name.to_string(),
                        parameters,
                        value: date.format_value(),
                    }
                }
                None => Encoder::Raw.encode(name, value),
            },
            Encoder::Geo => match value.as_geo() {
                Some(geo) => ContentLine {
                    name: name.to_string(),
                    parameters: Vec::new(),
                    value: geo.format_value(),
                },
                None => Encoder::Raw.encode(name, value),
            },
        }
    }
}

/// A property the registry knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    /// The property name on the wire, e.g. `DTSTART`.
    pub name: String,

    /// The key the decoded value is stored under on a component, e.g. `start`.
    pub key: String,

    pub decoder: Decoder,

    /// `None` if the property is never written back out.
    pub encoder: Option<Encoder>,
}

/// What a content line's name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler<'a> {
    /// `BEGIN`, opening a component.
    Begin,

    /// `END`, closing a component.
    End,

    Property(&'a PropertySpec),
}

/// An immutable lookup table of property handlers.
///
/// Use [`Registry::standard`] for the built in set of properties, or
/// [`RegistryBuilder`] to add to or override it.
#[derive(Debug, Clone)]
pub struct Registry {
    properties: Vec<PropertySpec>,
    by_name: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl Registry {
    /// The shared registry of standard properties.
    pub fn standard() -> &'static Registry {
        &STANDARD
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolve a content line name. Names are matched case insensitively.
    pub fn lookup(&self, name: &str) -> Option<Handler<'_>> {
        let name = name.to_ascii_uppercase();
        match &name as &str {
            "BEGIN" => Some(Handler::Begin),
            "END" => Some(Handler::End),
            _ => self
                .by_name
                .get(&name)
                .map(|&idx| Handler::Property(&self.properties[idx])),
        }
    }

    /// Find the property stored under the given component key.
    pub fn by_key(&self, key: &str) -> Option<&PropertySpec> {
        self.by_key.get(key).map(|&idx| &self.properties[idx])
    }

    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }
}

impl Default for Registry {
    fn default() -> Self {
        RegistryBuilder::standard().build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    properties: Vec<PropertySpec>,
}

impl RegistryBuilder {
    /// A builder preloaded with the standard properties.
    pub fn standard() -> RegistryBuilder {
        use Decoder as D;
        use Encoder as E;

        [
            ("SUMMARY", "summary", D::Plain, E::Text),
            ("DESCRIPTION", "description", D::Plain, E::Text),
            ("URL", "url", D::Plain, E::Raw),
            ("UID", "uid", D::Plain, E::Raw),
            ("LOCATION", "location", D::Plain, E::Text),
            ("DTSTART", "start", D::Date, E::Date),
            ("DTEND", "end", D::Date, E::Date),
            ("CLASS", "class", D::Plain, E::Raw),
            ("TRANSP", "transparency", D::Plain, E::Raw),
            ("GEO", "geo", D::Geo, E::Geo),
        ]
        .iter()
        .fold(RegistryBuilder::default(), |builder, &(name, key, d, e)| {
            builder.property(name, key, d, Some(e))
        })
    }

    /// Add a property, replacing any existing one with the same name or key.
    pub fn property(
        mut self,
        name: &str,
        key: &str,
        decoder: Decoder,
        encoder: Option<Encoder>,
    ) -> RegistryBuilder {
        let name = name.to_ascii_uppercase();
        self.properties.retain(|p| p.name != name && p.key != key);
        self.properties.push(PropertySpec {
            name,
            key: key.to_string(),
            decoder,
            encoder,
        });
        self
    }

    pub fn build(self) -> Registry {
        let by_name = self
            .properties
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.clone(), idx))
            .collect();
        let by_key = self
            .properties
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.key.clone(), idx))
            .collect();

        Registry {
            properties: self.properties,
            by_name,
            by_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DateValue, GeoPoint, Moment};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn standard_lookups() {
        let registry = Registry::standard();

        assert_eq!(registry.lookup("BEGIN"), Some(Handler::Begin));
        assert_eq!(registry.lookup("end"), Some(Handler::End));
        assert_eq!(registry.lookup("X-WR-CALNAME"), None);

        match registry.lookup("dtstart") {
            Some(Handler::Property(spec)) => {
                assert_eq!(spec.key, "start");
                assert_eq!(spec.decoder, Decoder::Date);
            }
            other => panic!("Unexpected handler {:?}", other),
        }

        match registry.lookup("CLASS") {
            Some(Handler::Property(spec)) => assert_eq!(spec.key, "class"),
            other => panic!("Unexpected handler {:?}", other),
        }

        assert_eq!(registry.by_key("transparency").map(|p| &p.name as &str), Some("TRANSP"));
        assert_eq!(registry.properties().len(), 10);
    }

    #[test]
    fn builder_overrides() {
        let registry = RegistryBuilder::standard()
            .property("x-color", "color", Decoder::Plain, Some(Encoder::Raw))
            .property("URL", "link", Decoder::Plain, None)
            .build();

        assert!(matches!(
            registry.lookup("X-COLOR"),
            Some(Handler::Property(PropertySpec { key, .. })) if key == "color"
        ));
        assert!(registry.by_key("url").is_none());
        assert_eq!(registry.by_key("link").and_then(|p| p.encoder), None);
        assert_eq!(registry.properties().len(), 11);
    }

    #[test]
    fn encode_text_forces_charset() {
        let line = Encoder::Text.encode("SUMMARY", &Value::from("Lunch, then; more"));
        assert_eq!(line.as_string(), r"SUMMARY;CHARSET=utf-8:Lunch\, then\; more");

        let value = Value::Annotated {
            params: vec!["LANGUAGE=en".to_string()],
            value: "Hi".to_string(),
        };
        assert_eq!(
            Encoder::Text.encode("SUMMARY", &value).as_string(),
            "SUMMARY;CHARSET=utf-8;LANGUAGE=en:Hi"
        );

        let value = Value::Annotated {
            params: vec!["CHARSET=ISO-8859-1".to_string()],
            value: "Hi".to_string(),
        };
        assert_eq!(
            Encoder::Text.encode("SUMMARY", &value).as_string(),
            "SUMMARY;CHARSET=ISO-8859-1:Hi"
        );
    }

    #[test]
    fn encode_raw() {
        assert_eq!(
            Encoder::Raw.encode("UID", &Value::from("abc")).as_string(),
            "UID:abc"
        );

        let value = Value::Annotated {
            params: vec!["X-TYPE=home".to_string()],
            value: "http://example.org/?a=1,2".to_string(),
        };
        assert_eq!(
            Encoder::Raw.encode("URL", &value).as_string(),
            r"URL;X-TYPE=home:http://example.org/?a=1\,2"
        );
    }

    #[test]
    fn encode_dates() {
        let date = DateValue::new(Moment::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert_eq!(
            Encoder::Date.encode("DTSTART", &date.into()).as_string(),
            "DTSTART;VALUE=DATE:20240115"
        );

        let local = DateValue::new(Moment::Local(
            NaiveDate::from_ymd_opt(2022, 2, 8)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap(),
        ))
        .with_tzid("Europe/London");
        assert_eq!(
            Encoder::Date.encode("DTEND", &local.into()).as_string(),
            "DTEND;TZID=Europe/London:20220208T153000"
        );

        let utc = DateValue::new(Moment::Utc(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
        ));
        assert_eq!(
            Encoder::Date.encode("DTSTART", &utc.into()).as_string(),
            "DTSTART:20240115T093000Z"
        );

        assert_eq!(
            Encoder::Date.encode("DTSTART", &Value::from("someday")).as_string(),
            "DTSTART:someday"
        );
    }

    #[test]
    fn encode_geo() {
        let geo = GeoPoint {
            latitude: 37.386013,
            longitude: -122.082932,
        };
        assert_eq!(
            Encoder::Geo.encode("GEO", &geo.into()).as_string(),
            "GEO:37.386013;-122.082932"
        );
    }
}

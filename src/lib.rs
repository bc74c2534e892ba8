//! A tolerant, minimal iCalendar (RFC 5545) parser and generator.
//!
//! ```
//! let collection = ics_codec::parse("BEGIN:VEVENT\nUID:abc\nSUMMARY:Test\nEND:VEVENT\n");
//! let event = collection.get("abc").unwrap();
//! assert_eq!(event.get("summary").and_then(|v| v.as_text()), Some("Test"));
//!
//! let text = ics_codec::generate(&collection);
//! assert_eq!(ics_codec::parse(&text), collection);
//! ```

#[macro_use]
extern crate pest_derive;

pub mod components;
pub mod generator;
pub mod parameters;
pub mod parser;
pub mod property;
pub mod registry;
pub mod unescape;

pub use components::{Collection, Component, Parser};
pub use generator::{Generator, GeneratorConfig, LineEnding};
pub use property::{DateValue, GeoPoint, Moment, Value};
pub use registry::{Decoder, Encoder, Registry, RegistryBuilder};

/// Parse calendar text with the standard registry.
///
/// Never fails: anything that can't be understood is skipped.
pub fn parse(text: &str) -> Collection {
    Parser::new(Registry::standard()).parse(text)
}

/// Generate calendar text for every component in the collection, with the
/// standard registry and default configuration.
pub fn generate(collection: &Collection) -> String {
    Generator::new(Registry::standard()).generate(collection)
}

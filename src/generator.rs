use tracing::trace;

use crate::{
    components::{Collection, Component, ROOT_COMPONENT},
    registry::Registry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,

    /// What RFC 5545 actually asks for.
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub line_ending: LineEnding,

    /// Enclose the components in a `VCALENDAR` with `VERSION` and `PRODID`.
    pub wrap_calendar: bool,

    /// The `PRODID` written when `wrap_calendar` is set.
    pub product_id: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            line_ending: LineEnding::default(),
            wrap_calendar: false,
            product_id: "-//ics_codec//EN".to_string(),
        }
    }
}

/// Writes a [`Collection`] back out as calendar text.
///
/// Long lines are not folded.
#[derive(Debug, Clone)]
pub struct Generator<'r> {
    registry: &'r Registry,
    config: GeneratorConfig,
}

impl<'r> Generator<'r> {
    pub fn new(registry: &'r Registry) -> Generator<'r> {
        Generator::with_config(registry, GeneratorConfig::default())
    }

    pub fn with_config(registry: &'r Registry, config: GeneratorConfig) -> Generator<'r> {
        Generator { registry, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&self, collection: &Collection) -> String {
        let mut lines = Vec::new();

        if self.config.wrap_calendar {
            lines.push(format!("BEGIN:{}", ROOT_COMPONENT));
            lines.push("VERSION:2.0".to_string());
            lines.push(format!("PRODID:{}", self.config.product_id));
        }

        for (_, component) in collection {
            lines.extend(self.component_lines(component));
        }

        if self.config.wrap_calendar {
            lines.push(format!("END:{}", ROOT_COMPONENT));
        }

        let line_ending = self.config.line_ending.as_str();
        lines
            .into_iter()
            .map(|line| line + line_ending)
            .collect()
    }

    /// The content lines for a single component, `BEGIN` and `END` included.
    ///
    /// Properties the registry can't encode are left out.
    pub fn component_lines(&self, component: &Component) -> Vec<String> {
        let kind = component.kind_or_default();

        let mut lines = vec![format!("BEGIN:{}", kind)];

        for (key, value) in &component.properties {
            let spec = match self.registry.by_key(key) {
                Some(spec) => spec,
                None => {
                    trace!(key = %key, "No property registered for key, skipping");
                    continue;
                }
            };

            match spec.encoder {
                Some(encoder) => lines.push(encoder.encode(&spec.name, value).as_string()),
                None => trace!(key = %key, "Property has no encoder, skipping"),
            }
        }

        lines.push(format!("END:{}", kind));
        lines
    }
}

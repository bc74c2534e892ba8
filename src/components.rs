use std::collections::{btree_map, BTreeMap};

use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    parser::{unfold, ContentLine},
    property::Value,
    registry::{Handler, Registry},
};

/// The outermost container. It is never materialized as a [`Component`].
pub const ROOT_COMPONENT: &str = "VCALENDAR";

/// The component type written out for components without one.
pub const DEFAULT_COMPONENT: &str = "VEVENT";

/// The key a component's unique identifier is stored under.
pub const UID_KEY: &str = "uid";

/// A calendar component, e.g. a `VEVENT`, with its decoded properties keyed by
/// their registry key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub kind: Option<String>,
    pub properties: BTreeMap<String, Value>,
}

impl Component {
    pub fn new(kind: impl Into<String>) -> Component {
        Component {
            kind: Some(kind.into()),
            properties: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a property, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    /// The component's unique identifier, if it has a non-empty one.
    pub fn uid(&self) -> Option<&str> {
        self.get(UID_KEY)
            .and_then(Value::as_text)
            .filter(|uid| !uid.is_empty())
    }

    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_COMPONENT)
    }
}

/// Finished components, keyed by their uid (or a generated key if they don't
/// have one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    components: BTreeMap<String, Component>,
}

impl Collection {
    pub fn new() -> Collection {
        Collection::default()
    }

    /// Store a component under its uid, or under a freshly generated key if it
    /// has none. A component already stored under the same key is replaced.
    ///
    /// Returns the key used.
    pub fn commit(&mut self, component: Component) -> String {
        let key = match component.uid() {
            Some(uid) => uid.to_string(),
            None => {
                let key = Uuid::new_v4().to_string();
                trace!(key = %key, "Component has no uid, generated key");
                key
            }
        };

        if self.components.insert(key.clone(), component).is_some() {
            debug!(key = %key, "Replaced component with the same uid");
        }

        key
    }

    pub fn insert(&mut self, key: impl Into<String>, component: Component) -> Option<Component> {
        self.components.insert(key.into(), component)
    }

    pub fn get(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Component> {
        self.components.remove(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(|k| k as &str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Component> {
        self.components.iter()
    }
}

impl IntoIterator for Collection {
    type Item = (String, Component);
    type IntoIter = btree_map::IntoIter<String, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a String, &'a Component);
    type IntoIter = btree_map::Iter<'a, String, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

impl FromIterator<(String, Component)> for Collection {
    fn from_iter<I: IntoIterator<Item = (String, Component)>>(iter: I) -> Self {
        Collection {
            components: iter.into_iter().collect(),
        }
    }
}

/// Where the parser is between lines.
#[derive(Debug)]
enum ParseState {
    /// At the top level, outside any component.
    Idle,

    /// Collecting properties for an open component.
    Building(Component),

    /// Inside a component nested in `parent`. Nested components aren't
    /// supported: everything up to the matching `END` is skipped, then
    /// `parent` carries on.
    Nested { parent: Component, depth: usize },
}

/// Turns calendar text into a [`Collection`], tolerating anything it doesn't
/// understand.
///
/// Lines without a `:` and properties missing from the registry are skipped.
/// Components still open at the end of the input are dropped.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'r> {
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry) -> Parser<'r> {
        Parser { registry }
    }

    pub fn parse(&self, text: &str) -> Collection {
        let mut collection = Collection::new();
        let mut state = ParseState::Idle;

        for line in unfold(text) {
            match ContentLine::parse(&line) {
                Ok(content_line) => state = self.step(state, content_line, &mut collection),
                Err(e) => trace!(line = %line, error = %e, "Skipping malformed line"),
            }
        }

        match state {
            ParseState::Idle => {}
            ParseState::Building(component) | ParseState::Nested { parent: component, .. } => {
                debug!(
                    kind = component.kind_or_default(),
                    "Discarding component that was never closed"
                );
            }
        }

        collection
    }

    fn step(
        &self,
        state: ParseState,
        line: ContentLine,
        collection: &mut Collection,
    ) -> ParseState {
        let handler = match self.registry.lookup(&line.name) {
            Some(handler) => handler,
            None => {
                trace!(name = %line.name, "Ignoring unknown property");
                return state;
            }
        };

        let is_root = line.value.eq_ignore_ascii_case(ROOT_COMPONENT);

        match (handler, state) {
            (Handler::Begin, state) if is_root => state,
            (Handler::End, state) if is_root => {
                if let ParseState::Building(component) | ParseState::Nested { parent: component, .. } =
                    state
                {
                    debug!(
                        kind = component.kind_or_default(),
                        "Discarding component still open at end of calendar"
                    );
                }
                ParseState::Idle
            }

            (Handler::Begin, ParseState::Idle) => ParseState::Building(Component::new(line.value)),
            (Handler::Begin, ParseState::Building(parent)) => {
                debug!(kind = %line.value, "Skipping nested component");
                ParseState::Nested { parent, depth: 1 }
            }
            (Handler::Begin, ParseState::Nested { parent, depth }) => ParseState::Nested {
                parent,
                depth: depth + 1,
            },

            (Handler::End, ParseState::Idle) => {
                debug!(kind = %line.value, "Ignoring END outside of a component");
                ParseState::Idle
            }
            (Handler::End, ParseState::Building(component)) => {
                if component.kind.as_deref() != Some(&line.value as &str) {
                    debug!(
                        kind = component.kind_or_default(),
                        end = %line.value,
                        "Mismatched END, closing component anyway"
                    );
                }
                collection.commit(component);
                ParseState::Idle
            }
            (Handler::End, ParseState::Nested { parent, depth }) => {
                if depth > 1 {
                    ParseState::Nested {
                        parent,
                        depth: depth - 1,
                    }
                } else {
                    ParseState::Building(parent)
                }
            }

            (Handler::Property(spec), ParseState::Building(mut component)) => {
                let value = spec.decoder.decode(&line.value, line.parameters.into());
                component.properties.insert(spec.key.clone(), value);
                ParseState::Building(component)
            }
            (Handler::Property(spec), state) => {
                trace!(name = %spec.name, "Ignoring property outside of a component");
                state
            }
        }
    }
}

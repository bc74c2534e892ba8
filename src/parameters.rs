/// The parameter token that marks text as UTF-8, which is also the default.
pub const DEFAULT_CHARSET: &str = "CHARSET=utf-8";

/// A parameter token in `KEY=VALUE` form.
///
/// Tokens without an `=` (or with an empty key) are not parameters we can
/// interpret, though they are still carried around verbatim in a
/// [`ParameterSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

impl<'a> Parameter<'a> {
    pub fn from_token(token: &'a str) -> Option<Parameter<'a>> {
        let (name, value) = token.split_once('=')?;
        if name.is_empty() {
            return None;
        }

        Some(Parameter {
            name,
            // Quoted values, e.g. `TZID="America/New_York"`.
            value: value.trim_matches('"'),
        })
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

fn is_default_charset(token: &str) -> bool {
    Parameter::from_token(token).map_or(false, |p| {
        p.is("CHARSET") && p.value.eq_ignore_ascii_case("utf-8")
    })
}

/// The raw parameter tokens of a content line, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    tokens: Vec<String>,
}

impl<I> From<I> for ParameterSet
where
    I: IntoIterator<Item = String>,
{
    fn from(iter: I) -> Self {
        ParameterSet {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl ParameterSet {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the tokens that have `KEY=VALUE` shape.
    pub fn parameters(&self) -> impl Iterator<Item = Parameter<'_>> {
        self.tokens.iter().filter_map(|t| Parameter::from_token(t))
    }

    /// Drop any `CHARSET=utf-8` tokens. Text is always written back out as
    /// UTF-8, so they carry nothing.
    pub fn without_default_charset(mut self) -> ParameterSet {
        self.tokens.retain(|t| !is_default_charset(t));
        self
    }

    /// Whether any parameter marks the value as a date without a time.
    pub fn is_date_only(&self) -> bool {
        self.parameters()
            .any(|p| p.is("VALUE") && p.value.eq_ignore_ascii_case("DATE"))
    }

    pub fn get_tzid(&self) -> Option<&str> {
        self.parameters().find(|p| p.is("TZID")).map(|p| p.value)
    }

    pub fn has_charset(&self) -> bool {
        self.parameters().any(|p| p.is("CHARSET"))
    }
}

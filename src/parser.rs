use anyhow::{bail, format_err, Error};
use itertools::Itertools;
use once_cell::sync::Lazy;
use pest::{iterators::Pair, Parser};
use regex::Regex;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid regex"));

const CONTINUATION: &[char] = &[' ', '\t'];

/// Split text into logical lines, joining folded continuation lines onto the
/// line before them.
///
/// A physical line starting with a space or tab loses that first character
/// and is appended to the previous logical line. Everything else, empty lines
/// included, is passed through as is.
pub fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for physical in LINE_BREAK.split(text) {
        match (physical.strip_prefix(CONTINUATION), lines.last_mut()) {
            (Some(rest), Some(prev)) => prev.push_str(rest),
            _ => lines.push(physical.to_string()),
        }
    }

    lines
}

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct LineParser;

/// A tokenized content line: `NAME(;PARAM)*:VALUE`.
///
/// Parameters are kept as the raw tokens found between the `;`s, and the value
/// is still escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub name: String,
    pub parameters: Vec<String>,
    pub value: String,
}

impl ContentLine {
    /// Tokenize a single logical line. Fails if the line has no `:`.
    pub fn parse(line: &str) -> Result<ContentLine, Error> {
        let pair = LineParser::parse(Rule::content_line, line)?
            .next()
            .ok_or_else(|| format_err!("Nothing parsed from line: {:?}", line))?;

        ContentLine::from_pair(pair)
    }

    fn from_pair(pair: Pair<'_, Rule>) -> Result<ContentLine, Error> {
        let span = pair.as_span();
        let mut name = None;
        let mut value = None;
        let mut parameters = Vec::new();

        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::name => name = Some(inner_pair.as_str().to_string()),
                Rule::param => parameters.push(inner_pair.as_str().to_string()),
                Rule::value => value = Some(inner_pair.as_str().to_string()),
                Rule::EOI => {}
                _ => bail!("Unexpected type {:?}", inner_pair.as_rule()),
            }
        }

        if let (Some(name), Some(value)) = (name, value) {
            Ok(ContentLine {
                name,
                parameters,
                value,
            })
        } else {
            bail!("No name or value for line: {:?}", span.as_str());
        }
    }

    pub fn as_string(&self) -> String {
        if self.parameters.is_empty() {
            format!("{}:{}", self.name, self.value)
        } else {
            format!(
                "{};{}:{}",
                self.name,
                self.parameters.iter().join(";"),
                self.value
            )
        }
    }
}

//! Compound selectors.
//!
//! Supports a single compound selector: an optional tag (or `*`) followed by
//! any number of `#id`, `.class` and attribute conditions
//! (`[attr]`, `[attr="v"]`, `[attr*="v"]`, `[attr^="v"]`, `[attr$="v"]`).
//! Combinators are not supported.

use std::fmt;
use std::str::FromStr;

use crate::error::DomError;
use crate::node::NodeId;
use crate::tree::DomTree;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
}

impl AttrOp {
    fn matches(&self, actual: &str) -> bool {
        match self {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => actual == v,
            AttrOp::Contains(v) => !v.is_empty() && actual.contains(v.as_str()),
            AttrOp::Prefix(v) => !v.is_empty() && actual.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && actual.ends_with(v.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        Parser::new(input).parse()
    }

    /// The selector text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether element `id` satisfies every part of this selector.
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(tag) = tree.tag(id) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }

        self.conditions.iter().all(|condition| match condition {
            Condition::Id(v) => tree.attribute(id, "id") == Some(v.as_str()),
            Condition::Class(v) => tree
                .attribute(id, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == v)),
            Condition::Attr { name, op } => tree
                .attribute(id, name)
                .is_some_and(|actual| op.matches(actual)),
        })
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let source = source.trim();
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.source.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse(mut self) -> Result<Selector, DomError> {
        if self.chars.is_empty() {
            return Err(self.error("empty selector"));
        }

        let tag = if self.eat('*') {
            None
        } else {
            let tag = self.ident();
            (!tag.is_empty()).then(|| tag.to_ascii_lowercase())
        };

        let mut conditions = Vec::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            let condition = match c {
                '#' => Condition::Id(self.required_ident("id")?),
                '.' => Condition::Class(self.required_ident("class name")?),
                '[' => self.attribute()?,
                other => return Err(self.error(format!("unexpected character '{}'", other))),
            };
            conditions.push(condition);
        }

        if tag.is_none() && conditions.is_empty() && !self.source.starts_with('*') {
            return Err(self.error("selector matches nothing"));
        }

        Ok(Selector {
            source: self.source.to_string(),
            tag,
            conditions,
        })
    }

    fn required_ident(&mut self, what: &str) -> Result<String, DomError> {
        let ident = self.ident();
        if ident.is_empty() {
            return Err(self.error(format!("expected {}", what)));
        }
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<Condition, DomError> {
        self.skip_whitespace();
        let name = self.required_ident("attribute name")?.to_ascii_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(Condition::Attr {
                name,
                op: AttrOp::Exists,
            });
        }

        let kind = match self.peek() {
            Some('=') => None,
            Some(c @ ('*' | '^' | '$')) => {
                self.pos += 1;
                Some(c)
            }
            _ => return Err(self.error("expected attribute operator")),
        };
        if !self.eat('=') {
            return Err(self.error("expected '='"));
        }
        self.skip_whitespace();
        let value = self.attribute_value()?;
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        let op = match kind {
            None => AttrOp::Equals(value),
            Some('*') => AttrOp::Contains(value),
            Some('^') => AttrOp::Prefix(value),
            _ => AttrOp::Suffix(value),
        };
        Ok(Condition::Attr { name, op })
    }

    fn attribute_value(&mut self) -> Result<String, DomError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated string"));
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.required_ident("attribute value"),
        }
    }
}

//! Smart value fields
//!
//! A string argument can be edited through a richer widget when the operator before it takes
//! a structured value: a list editor for the set operators, a map selection for the `geo_*`
//! operators. This module only decides whether the cursor sits on such a field and converts
//! values; the widgets belong to the host.

use crate::geo_value::{GeoShape, GeoValue, GeoValueError};
use crate::list_value::{format_list, parse_list};
use csdl_parser::csdl::{find_previous_token, Token, TokenKind, TokenSource};
use serde::Serialize;

const LIST_OPERATORS: [&str; 7] = [
    "contains_any",
    "contains_phrase",
    "any",
    "in",
    "url_in",
    "all",
    "contains_all",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmartFieldKind {
    List,
    Geo(GeoShape),
}

impl SmartFieldKind {
    pub fn for_operator(operator: &str) -> Option<Self> {
        let operator = operator.to_ascii_lowercase();
        if LIST_OPERATORS.contains(&operator.as_str()) {
            return Some(SmartFieldKind::List);
        }
        GeoShape::for_operator(&operator).map(SmartFieldKind::Geo)
    }
}

/// Replace `from..to` on `line` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub line: usize,
    pub from: usize,
    pub to: usize,
    pub new_text: String,
}

/// A string argument that can be edited through a smart field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartField {
    pub kind: SmartFieldKind,
    pub line: usize,
    pub token: Token,
    pub operator: String,
}

impl SmartField {
    /// The string contents without the surrounding quotes.
    pub fn value(&self) -> &str {
        let text = self.token.text.as_str();
        let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            return text;
        };
        let inner = &text[quote.len_utf8()..];
        match inner.strip_suffix(quote) {
            Some(body) if !is_escaped_at_end(body) => body,
            _ => inner,
        }
    }

    /// Items of a list field, empty for geo fields.
    pub fn list_items(&self) -> Vec<String> {
        match self.kind {
            SmartFieldKind::List => parse_list(self.value()),
            SmartFieldKind::Geo(_) => Vec::new(),
        }
    }

    /// Parsed value of a geo field, `None` for list fields and empty strings.
    pub fn geo_value(&self) -> Option<Result<GeoValue, GeoValueError>> {
        match self.kind {
            SmartFieldKind::Geo(shape) if !self.value().trim().is_empty() => {
                Some(GeoValue::parse(shape, self.value()))
            }
            _ => None,
        }
    }

    /// Edit replacing the whole string token with `value` in double quotes.
    pub fn replacement(&self, value: &str) -> TextEdit {
        TextEdit {
            line: self.line,
            from: self.token.start,
            to: self.token.end,
            new_text: format!("\"{value}\""),
        }
    }

    pub fn list_replacement<I, S>(&self, items: I) -> TextEdit
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.replacement(&format_list(items))
    }

    pub fn geo_replacement(&self, value: &GeoValue) -> TextEdit {
        self.replacement(&value.to_string())
    }
}

/// An odd run of trailing backslashes escapes the character that follows.
fn is_escaped_at_end(text: &str) -> bool {
    text.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// The smart field under the cursor, if the cursor is inside a string argument of a list or
/// geo operator.
pub fn smart_field_at<S>(source: &S, line: usize, column: usize) -> Option<SmartField>
where
    S: TokenSource + ?Sized,
{
    let token = source.token_at(line, column)?;
    if !token.is(TokenKind::String) {
        return None;
    }
    let previous = find_previous_token(source, line, token.start)?;
    if !previous.is(TokenKind::Operator) {
        return None;
    }
    let kind = SmartFieldKind::for_operator(&previous.text)?;
    Some(SmartField {
        kind,
        line,
        token,
        operator: previous.text,
    })
}

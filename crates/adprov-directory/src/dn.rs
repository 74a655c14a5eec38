//! Distinguished name utilities.
//!
//! Active Directory user and organizational-unit names here never use
//! multi-valued (`+`-joined) RDNs, so this type models a DN as a plain ordered
//! list of `attribute=value` components. Parsing is strict to surface
//! malformed configuration early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistinguishedNameError {
    /// The distinguished name was empty.
    #[error("distinguished name cannot be empty")]
    Empty,
    /// A component lacked the `attribute=value` form.
    #[error("invalid distinguished name component: {0}")]
    InvalidComponent(String),
    /// A component was missing the value to the right of the `=`.
    #[error("distinguished name component missing value for attribute {0}")]
    MissingValue(String),
    /// The distinguished name ended with an escape character.
    #[error("distinguished name contains an unterminated escape sequence")]
    UnterminatedEscape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Rdn {
    attribute: String,
    value: String,
}

/// Strongly-typed distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedName {
    raw: String,
    components: Vec<Rdn>,
}

impl DistinguishedName {
    /// Parses a distinguished name from a string.
    ///
    /// # Errors
    ///
    /// Returns [`DistinguishedNameError`] if the input is empty or a
    /// component is not of the `attribute=value` form.
    pub fn parse(input: impl AsRef<str>) -> std::result::Result<Self, DistinguishedNameError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(DistinguishedNameError::Empty);
        }

        let mut components = Vec::new();
        for part in split_components(raw)? {
            let (attribute, value) = split_attribute_value(&part)?;
            components.push(Rdn { attribute, value });
        }

        Ok(Self {
            raw: render(&components),
            components,
        })
    }

    /// Borrows the canonical distinguished name string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Looks up the value of the first component matching `attribute`
    /// (case-insensitive).
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|rdn| rdn.attribute.eq_ignore_ascii_case(attribute))
            .map(|rdn| rdn.value.as_str())
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DistinguishedName {
    type Err = DistinguishedNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DistinguishedName> for String {
    fn from(value: DistinguishedName) -> Self {
        value.raw
    }
}

fn split_components(input: &str) -> std::result::Result<Vec<String>, DistinguishedNameError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push('\\');
            current.push(ch);
            escape = false;
        } else if ch == '\\' {
            escape = true;
        } else if ch == ',' {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }

    if escape {
        return Err(DistinguishedNameError::UnterminatedEscape);
    }

    parts.push(current.trim().to_string());
    if parts.iter().any(String::is_empty) {
        return Err(DistinguishedNameError::InvalidComponent(input.to_string()));
    }
    Ok(parts)
}

fn split_attribute_value(
    component: &str,
) -> std::result::Result<(String, String), DistinguishedNameError> {
    let idx = component
        .find('=')
        .ok_or_else(|| DistinguishedNameError::InvalidComponent(component.to_string()))?;
    let attribute = component[..idx].trim();
    let value = component[idx + 1..].trim_start();

    if attribute.is_empty() {
        return Err(DistinguishedNameError::InvalidComponent(
            component.to_string(),
        ));
    }
    if value.is_empty() {
        return Err(DistinguishedNameError::MissingValue(attribute.to_string()));
    }

    Ok((attribute.to_string(), unescape(value)?))
}

fn unescape(value: &str) -> std::result::Result<String, DistinguishedNameError> {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            result.push(
                chars
                    .next()
                    .ok_or(DistinguishedNameError::UnterminatedEscape)?,
            );
        } else {
            result.push(ch);
        }
    }
    Ok(result)
}

fn escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut escaped = String::with_capacity(value.len());
    for (idx, ch) in chars.iter().enumerate() {
        let needs_escape = matches!(ch, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (idx == 0 && (*ch == ' ' || *ch == '#'))
            || (idx == chars.len() - 1 && *ch == ' ');
        if needs_escape {
            escaped.push('\\');
        }
        escaped.push(*ch);
    }
    escaped
}

fn render(components: &[Rdn]) -> String {
    components
        .iter()
        .map(|rdn| format!("{}={}", rdn.attribute, escape(&rdn.value)))
        .collect::<Vec<_>>()
        .join(",")
}

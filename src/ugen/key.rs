// Copyright (c) 2024 Mike Tsao

use crate::types::prelude::*;
use serde::{Deserialize, Serialize};

// Factory names are either identifiers or pure runs of operator characters
// ("+", "<@-@>"). The two branches never mix.
const SYMBOL_CHARS: &str = "+-*/%<=>!?&|@";

/// Whether `s` is a well-formed identifier: a letter, then letters and digits
/// with single interior hyphens. No leading, trailing, or doubled `-`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    let mut prev_was_hyphen = false;
    for c in chars {
        if c == '-' {
            if prev_was_hyphen {
                return false;
            }
            prev_was_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            prev_was_hyphen = false;
        } else {
            return false;
        }
    }
    !prev_was_hyphen
}

/// Whether `s` is a well-formed factory name: an identifier, or a nonempty
/// run of operator characters.
pub fn is_valid_name(s: &str) -> bool {
    if is_identifier(s) {
        return true;
    }
    !s.is_empty() && s.chars().all(|c| SYMBOL_CHARS.contains(c))
}

/// A parsed build key of the grammar `name[.class]*[#id]`. The name selects
/// the factory; the class segments tag the instance; the id names it
/// uniquely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub name: String,
    pub class_list: Vec<String>,
    pub id: Option<String>,
}
impl Key {
    /// Parses a build key, failing with [Error::Parse] on any grammar
    /// violation.
    pub fn parse(key: &str) -> Result<Self> {
        let (head, id) = match key.split_once('#') {
            Some((head, id)) => {
                if !is_identifier(id) {
                    return Err(Error::Parse(key.to_string()));
                }
                (head, Some(id.to_string()))
            }
            None => (key, None),
        };
        let mut segments = head.split('.');
        let name = segments.next().unwrap_or_default();
        if !is_valid_name(name) {
            return Err(Error::Parse(key.to_string()));
        }
        let mut class_list = Vec::default();
        for class in segments {
            if !is_identifier(class) {
                return Err(Error::Parse(key.to_string()));
            }
            class_list.push(class.to_string());
        }
        Ok(Self {
            name: name.to_string(),
            class_list,
            id,
        })
    }
}
impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name)?;
        for class in &self.class_list {
            write!(f, ".{class}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        Ok(())
    }
}

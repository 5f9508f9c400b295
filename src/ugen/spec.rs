// Copyright (c) 2024 Mike Tsao

use super::Ugen;
use crate::automation::Param;

/// One value in a [UgenSpec]: a plain scalar or text attribute, or a live
/// graph object (a [Param] or another [Ugen]) that the factory should wire
/// into one of its control params.
#[derive(Clone, Debug)]
pub enum SpecValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Param(Param),
    Ugen(Ugen),
}
impl From<f64> for SpecValue {
    fn from(value: f64) -> Self {
        SpecValue::Number(value)
    }
}
impl From<&str> for SpecValue {
    fn from(value: &str) -> Self {
        SpecValue::Text(value.to_string())
    }
}
impl From<bool> for SpecValue {
    fn from(value: bool) -> Self {
        SpecValue::Flag(value)
    }
}
impl From<Param> for SpecValue {
    fn from(value: Param) -> Self {
        SpecValue::Param(value)
    }
}
impl From<&Param> for SpecValue {
    fn from(value: &Param) -> Self {
        SpecValue::Param(value.clone())
    }
}
impl From<Ugen> for SpecValue {
    fn from(value: Ugen) -> Self {
        SpecValue::Ugen(value)
    }
}
impl From<&Ugen> for SpecValue {
    fn from(value: &Ugen) -> Self {
        SpecValue::Ugen(value.clone())
    }
}

/// The keyword-argument bag a factory receives. Entries keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct UgenSpec {
    entries: Vec<(String, SpecValue)>,
}
impl UgenSpec {
    /// Adds or replaces an entry, builder-style.
    pub fn with(mut self, name: &str, value: impl Into<SpecValue>) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self.entries.push((name.to_string(), value.into()));
        self
    }

    #[allow(missing_docs)]
    pub fn value(&self, name: &str) -> Option<&SpecValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The entry's scalar value, if it has one.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.value(name) {
            Some(SpecValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    #[allow(missing_docs)]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.value(name) {
            Some(SpecValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.value(name), Some(SpecValue::Flag(true)))
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

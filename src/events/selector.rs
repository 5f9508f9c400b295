// Copyright (c) 2024 Mike Tsao

use crate::ugen::{key, Ugen};

/// Which ugens a pattern addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorTarget {
    /// Every ugen.
    All,
    /// Ugens built by the named factory.
    Name(String),
    /// Ugens whose class list contains the tag.
    Class(String),
    /// The ugen with the explicit id.
    Id(String),
}
impl SelectorTarget {
    /// Parses the target half of a pattern: `name`, `.class`, or `#id`.
    /// Returns `None` on malformed input.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(class) = s.strip_prefix('.') {
            key::is_identifier(class).then(|| Self::Class(class.to_string()))
        } else if let Some(id) = s.strip_prefix('#') {
            key::is_identifier(id).then(|| Self::Id(id.to_string()))
        } else if key::is_valid_name(s) {
            Some(Self::Name(s.to_string()))
        } else {
            None
        }
    }

    #[allow(missing_docs)]
    pub fn matches(&self, ugen: &Ugen) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => ugen.name() == *name,
            Self::Class(class) => ugen.has_class(class),
            Self::Id(id) => ugen.id().as_deref() == Some(id.as_str()),
        }
    }
}

/// A parsed listener-routing pattern: a target combined with an event name.
/// `"sin:end"` means event `end` on every `sin` ugen; a bare `"end"` means
/// event `end` on every ugen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    target: SelectorTarget,
    event: String,
}
impl Selector {
    /// Parses a pattern. Returns `None` on malformed input, which callers
    /// treat as the empty match set rather than an error.
    pub fn parse(pattern: &str) -> Option<Self> {
        match pattern.split_once(':') {
            Some((head, event)) => {
                if !key::is_identifier(event) {
                    return None;
                }
                let target = if head.is_empty() {
                    SelectorTarget::All
                } else {
                    SelectorTarget::parse(head)?
                };
                Some(Self {
                    target,
                    event: event.to_string(),
                })
            }
            None => key::is_identifier(pattern).then(|| Self {
                target: SelectorTarget::All,
                event: pattern.to_string(),
            }),
        }
    }

    #[allow(missing_docs)]
    pub fn event(&self) -> &str {
        &self.event
    }

    #[allow(missing_docs)]
    pub fn matches(&self, ugen: &Ugen) -> bool {
        self.target.matches(ugen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_pattern_form() {
        assert_eq!(
            Selector::parse("sin:end"),
            Some(Selector {
                target: SelectorTarget::Name("sin".to_string()),
                event: "end".to_string(),
            })
        );
        assert_eq!(
            Selector::parse(".amp:end").unwrap().target,
            SelectorTarget::Class("amp".to_string())
        );
        assert_eq!(
            Selector::parse("#lfo:tick").unwrap().target,
            SelectorTarget::Id("lfo".to_string())
        );
        let bare = Selector::parse("end").unwrap();
        assert_eq!(bare.target, SelectorTarget::All);
        assert_eq!(bare.event(), "end");
    }

    #[test]
    fn malformed_patterns_parse_to_none() {
        for pattern in ["*", "*:end", ".:end", "#:end", "sin:", ":", ""] {
            assert!(Selector::parse(pattern).is_none(), "{pattern:?}");
        }
    }

    #[test]
    fn symbol_factory_names_are_addressable() {
        assert_eq!(
            Selector::parse("+:end").unwrap().target,
            SelectorTarget::Name("+".to_string())
        );
    }
}

// Copyright (c) 2024 Mike Tsao

use super::{builtin, key, Input, UgenShell, UgenSpec, Unit};
use crate::synth::SynthBuilder;
use crate::types::prelude::*;
use rustc_hash::FxHashMap;

/// Builds one [Unit] from a shell, a spec, and already-built inputs.
pub type UgenFactory =
    Box<dyn Fn(&UgenShell, &mut SynthBuilder, &UgenSpec, &[Input]) -> Result<Unit> + Send + Sync>;

/// The mapping from validated factory names to factories. Registration is a
/// distinct phase: callers register everything they need, then wrap the
/// registry in an [Arc](std::sync::Arc) and hand it to instruments, so
/// lookups never race mutation.
#[derive(Default)]
pub struct Registry {
    factories: FxHashMap<String, UgenFactory>,
}
impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Registry").field(&self.names()).finish()
    }
}
impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in factories: the `"+"`/`"*"`
    /// arithmetic nodes, the bus ugens, and the stock oscillator.
    pub fn with_builtins() -> Self {
        let mut r = Self::default();
        builtin::register(&mut r);
        r
    }

    /// Stores `factory` under `name`, failing with [Error::Registration] if
    /// the name violates the key-name grammar. Re-registering a name silently
    /// replaces the previous factory, which permits hot redefinition.
    pub fn register(
        &mut self,
        name: &str,
        factory: impl Fn(&UgenShell, &mut SynthBuilder, &UgenSpec, &[Input]) -> Result<Unit>
            + Send
            + Sync
            + 'static,
    ) -> Result<()> {
        if !key::is_valid_name(name) {
            return Err(Error::Registration(name.to_string()));
        }
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The registered factory names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn factory(&self, name: &str) -> Result<&UgenFactory> {
        self.factories
            .get(name)
            .ok_or_else(|| Error::Lookup(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_enforces_the_name_grammar() {
        let mut r = Registry::new();
        for name in ["sin", "fb-sin", "DX7", "OD-1", "<@-@>", "+"] {
            assert!(
                r.register(name, |_, _, _, _| Ok(Unit::sink())).is_ok(),
                "{name} should register"
            );
        }
        for name in ["sin.kr", "sin#lfo", "-fb", "fb-", "fb--sin", "0", ""] {
            assert!(
                matches!(
                    r.register(name, |_, _, _, _| Ok(Unit::sink())),
                    Err(Error::Registration(_))
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn duplicate_registration_silently_replaces() {
        let mut r = Registry::new();
        r.register("sin", |_, _, _, _| Ok(Unit::sink())).unwrap();
        assert!(r.register("sin", |_, _, _, _| Ok(Unit::sink())).is_ok());
        assert!(r.contains("sin"));
    }

    #[test]
    fn unknown_names_fail_lookup() {
        let r = Registry::new();
        assert!(matches!(r.factory("saw"), Err(Error::Lookup(_))));
    }
}

//! Per-call variable bindings

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Variable table of one function invocation, in first-binding order.
///
/// Created on call entry and handed back to the caller when the call ends;
/// there is no enclosing scope to fall back on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Scope {
    vars: IndexMap<String, f64>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    /// Create or overwrite a binding
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.vars.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_keeps_binding_order() {
        let mut scope = Scope::new();
        scope.set("a", 1.0);
        scope.set("b", 2.0);
        scope.set("a", 3.0);
        assert_eq!(scope.get("a"), Some(3.0));
        assert_eq!(scope.to_string(), "a = 3\nb = 2\n");
    }

    #[test]
    fn test_missing_binding() {
        let scope = Scope::new();
        assert!(scope.is_empty());
        assert_eq!(scope.get("x"), None);
    }
}

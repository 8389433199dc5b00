use std::collections::{HashMap, HashSet};

/// Declared type names committed to the current unit, keyed by the
/// fully-qualified schema name they were given to.
///
/// A name is reserved before its body is resolved, so a type that refers to
/// itself (directly or through a cycle) finds its own name already taken
/// instead of recursing forever.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_type: HashMap<String, String>,
    /// Delphi identifiers are case-insensitive; stored lower-cased.
    taken:   HashSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The name `full_name` was declared under, if it was reserved already.
    pub fn declared_name(&self, full_name: &str) -> Option<&str> {
        self.by_type.get(full_name).map(String::as_str)
    }

    /// Reserves `name` for `full_name`. Returns `false` if the identifier is
    /// already held by some type.
    pub fn try_begin(&mut self, full_name: &str, name: &str) -> bool {
        if !self.taken.insert(name.to_ascii_lowercase()) {
            return false;
        }
        self.by_type.insert(full_name.to_string(), name.to_string());
        true
    }
}

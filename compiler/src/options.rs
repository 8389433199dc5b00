use tracing::warn;

/// Generator switches, fixed for the lifetime of a [`Generator`](crate::Generator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Annotate every field with its JSON alias and import `Delphi.Serial`.
    pub emit_json_names:   bool,
    /// Declare enums and nested messages even when no field refers to them.
    pub emit_unused_types: bool,
}

impl Options {
    /// Parses a protoc-style parameter string such as
    /// `emit_json_names,emit_unused_types=false`.
    ///
    /// A bare key enables its option. Unknown keys are ignored.
    pub fn from_parameter(parameter: &str) -> Self {
        let mut options = Options::default();
        for item in parameter.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (key, value) = match item.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (item, "true"),
            };
            let enabled = !matches!(value, "false" | "0" | "no" | "off");
            match key {
                "emit_json_names" => options.emit_json_names = enabled,
                "emit_unused_types" => options.emit_unused_types = enabled,
                _ => warn!(option = key, "ignoring unknown generator option"),
            }
        }
        options
    }

    /// Enables every option set in `other`.
    pub fn merge(self, other: Options) -> Self {
        Options {
            emit_json_names:   self.emit_json_names || other.emit_json_names,
            emit_unused_types: self.emit_unused_types || other.emit_unused_types,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_off() {
        assert_eq!(Options::from_parameter(""), Options::default());
        assert!(!Options::default().emit_json_names);
        assert!(!Options::default().emit_unused_types);
    }

    #[test]
    fn test_bare_keys_enable() {
        let options = Options::from_parameter("emit_json_names, emit_unused_types");
        assert!(options.emit_json_names);
        assert!(options.emit_unused_types);
    }

    #[test]
    fn test_explicit_values_and_unknown_keys() {
        let options = Options::from_parameter("emit_json_names=false,emit_unused_types=true,fancy");
        assert!(!options.emit_json_names);
        assert!(options.emit_unused_types);
    }

    #[test]
    fn test_merge() {
        let a = Options { emit_json_names: true, emit_unused_types: false };
        let b = Options { emit_json_names: false, emit_unused_types: true };
        assert_eq!(a.merge(b), Options { emit_json_names: true, emit_unused_types: true });
    }
}

//! Host-side traits for reading a resource and flagging its outputs.
//!
//! The controller that owns the resource schema implements these, so the
//! reconciliation logic stays independent of any particular host.

use anyhow::Result;
use std::collections::BTreeMap;

/// Read access to a resource's configured fields.
///
/// Every accessor returns `None` when the field is unset.
pub trait FieldReader {
    /// String field
    fn string(&self, key: &str) -> Option<String>;

    /// Boolean field
    fn bool(&self, key: &str) -> Option<bool>;

    /// Integer field
    fn int(&self, key: &str) -> Option<i64>;

    /// Ordered list of strings
    fn string_list(&self, key: &str) -> Option<Vec<String>>;

    /// String-to-string map
    fn string_map(&self, key: &str) -> Option<BTreeMap<String, String>>;
}

/// Change tracking for one planned update.
///
/// # Example
///
/// ```ignore
/// use declarative::DiffChecker;
/// use std::collections::HashSet;
///
/// struct Plan { changed: HashSet<String>, computed: HashSet<String> }
///
/// impl DiffChecker for Plan {
///     fn has_change(&self, key: &str) -> bool {
///         self.changed.contains(key)
///     }
///
///     fn set_new_computed(&mut self, key: &str) -> anyhow::Result<()> {
///         self.computed.insert(key.to_string());
///         Ok(())
///     }
/// }
/// ```
pub trait DiffChecker {
    /// Whether the planned value of `key` differs from the recorded one.
    fn has_change(&self, key: &str) -> bool;

    /// Mark `key` as unknown until the next apply.
    fn set_new_computed(&mut self, key: &str) -> Result<()>;
}

/// Convenience accessors with defaults.
pub trait FieldReaderExt {
    /// String field, empty when unset
    fn string_or_empty(&self, key: &str) -> String;

    /// String list, empty when unset
    fn list_or_empty(&self, key: &str) -> Vec<String>;

    /// Boolean field, `false` when unset
    fn flag(&self, key: &str) -> bool;
}

impl<R: FieldReader + ?Sized> FieldReaderExt for R {
    fn string_or_empty(&self, key: &str) -> String {
        self.string(key).unwrap_or_default()
    }

    fn list_or_empty(&self, key: &str) -> Vec<String> {
        self.string_list(key).unwrap_or_default()
    }

    fn flag(&self, key: &str) -> bool {
        self.bool(key).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fields(BTreeMap<&'static str, String>);

    impl FieldReader for Fields {
        fn string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn bool(&self, key: &str) -> Option<bool> {
            self.0.get(key).and_then(|v| v.parse().ok())
        }

        fn int(&self, key: &str) -> Option<i64> {
            self.0.get(key).and_then(|v| v.parse().ok())
        }

        fn string_list(&self, key: &str) -> Option<Vec<String>> {
            self.0
                .get(key)
                .map(|v| v.split(',').map(str::to_string).collect())
        }

        fn string_map(&self, _key: &str) -> Option<BTreeMap<String, String>> {
            None
        }
    }

    #[test]
    fn test_defaults_for_unset_fields() {
        let fields = Fields(BTreeMap::new());
        assert_eq!(fields.string_or_empty("content"), "");
        assert!(fields.list_or_empty("values").is_empty());
        assert!(!fields.flag("enable_go_template"));
    }

    #[test]
    fn test_set_fields_pass_through() {
        let fields = Fields(BTreeMap::from([
            ("content", "releases: []".to_string()),
            ("values", "a,b".to_string()),
            ("enable_go_template", "true".to_string()),
        ]));
        assert_eq!(fields.string_or_empty("content"), "releases: []");
        assert_eq!(fields.list_or_empty("values"), vec!["a", "b"]);
        assert!(fields.flag("enable_go_template"));
    }
}

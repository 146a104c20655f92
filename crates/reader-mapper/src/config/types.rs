//! Mapper option types.

use serde::{Deserialize, Serialize};

/// Options controlling how readers are mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperOptions {
    /// Yield rows lazily from `Mapper::map_reader` instead of collecting them.
    pub lazy: bool,

    /// How column name segments are compared to property names.
    pub name_matching: NameMatching,

    /// Map unregistered destination types with no overrides instead of
    /// failing with `UnconfiguredMapping`.
    pub create_missing_type_maps: bool,
}

impl MapperOptions {
    /// Enable lazy materialization.
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    #[must_use]
    pub fn with_name_matching(mut self, name_matching: NameMatching) -> Self {
        self.name_matching = name_matching;
        self
    }

    #[must_use]
    pub fn with_create_missing_type_maps(mut self, enabled: bool) -> Self {
        self.create_missing_type_maps = enabled;
        self
    }
}

/// Column segment to property name comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    /// Byte-for-byte.
    #[default]
    Exact,
    /// ASCII letters compare without regard to case.
    IgnoreAsciiCase,
}

impl NameMatching {
    pub fn matches(self, property: &str, segment: &str) -> bool {
        match self {
            NameMatching::Exact => property == segment,
            NameMatching::IgnoreAsciiCase => property.eq_ignore_ascii_case(segment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MapperOptions::default();
        assert!(!options.lazy);
        assert_eq!(options.name_matching, NameMatching::Exact);
        assert!(!options.create_missing_type_maps);
    }

    #[test]
    fn test_builders() {
        let options = MapperOptions::default()
            .lazy()
            .with_name_matching(NameMatching::IgnoreAsciiCase)
            .with_create_missing_type_maps(true);
        assert!(options.lazy);
        assert_eq!(options.name_matching, NameMatching::IgnoreAsciiCase);
        assert!(options.create_missing_type_maps);
    }

    #[test]
    fn test_name_matching() {
        assert!(NameMatching::Exact.matches("Descr", "Descr"));
        assert!(!NameMatching::Exact.matches("Descr", "descr"));
        assert!(NameMatching::IgnoreAsciiCase.matches("Descr", "DESCR"));
        assert!(!NameMatching::IgnoreAsciiCase.matches("Descr", "Descr2"));
    }
}

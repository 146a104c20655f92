use std::fmt;

/// Canonical property names from the destination root down to a scalar leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Vec<&'static str>);

impl PropertyPath {
    pub(crate) fn new(segments: Vec<&'static str>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[&'static str] {
        &self.0
    }

    /// Number of segments; always at least one.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether the leaf sits inside a nested object.
    pub fn is_nested(&self) -> bool {
        self.0.len() > 1
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

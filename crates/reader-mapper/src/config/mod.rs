//! Mapper configuration: options and destination registration.

mod registry;
mod types;

pub use registry::{DestinationMap, MapperConfiguration};
pub use types::*;

pub(crate) use registry::TypeMap;

use crate::error::Result;
use std::path::Path;

impl MapperOptions {
    /// Load options from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse options from a YAML string. An empty document gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let options: MapperOptions = serde_yaml::from_str(yaml)?;
        Ok(options)
    }
}

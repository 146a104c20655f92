//! Destination registration.
//!
//! A [`MapperConfiguration`] is built once, up front, and then moved into a
//! [`Mapper`]. Each registered destination type gets a [`TypeMap`]: its
//! descriptor plus the member overrides whose paths were resolved at
//! registration time.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::core::{DataRecord, SqlValue};
use crate::destination::{Destination, PropertyPath, TypeDescriptor};
use crate::error::{MapError, Result};
use crate::mapper::Mapper;
use crate::plan::ValueOverride;

use super::{MapperOptions, NameMatching};

/// Registration of one destination type, with optional member overrides.
///
/// ```rust
/// use reader_mapper::{DestinationMap, Destination, MapperConfiguration, SqlValue, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Audit {
///     source: String,
/// }
///
/// impl Destination for Audit {
///     fn descriptor() -> TypeDescriptor<Self> {
///         TypeDescriptor::new("Audit").field("Source", |a: &mut Audit, v: String| a.source = v)
///     }
/// }
///
/// let mut config = MapperConfiguration::default();
/// config
///     .register(DestinationMap::<Audit>::new().for_member("Source", |_| {
///         Ok(SqlValue::text_owned("import".to_string()))
///     }))
///     .unwrap();
/// assert!(config.is_configured::<Audit>());
/// ```
pub struct DestinationMap<T> {
    members: Vec<(String, ValueOverride)>,
    _destination: PhantomData<fn() -> T>,
}

impl<T: Destination> DestinationMap<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            _destination: PhantomData,
        }
    }

    /// Replace the column copy for `member` (a dotted property path) with a
    /// value computed from the whole record. The value must already have the
    /// property's type; a NULL leaves the property unset.
    #[must_use]
    pub fn for_member<F>(mut self, member: impl Into<String>, projection: F) -> Self
    where
        F: Fn(&dyn DataRecord) -> Result<SqlValue<'static>> + Send + Sync + 'static,
    {
        let member = member.into();
        self.members.retain(|(existing, _)| *existing != member);
        self.members.push((member, Arc::new(projection)));
        self
    }

    /// Resolve every override path against `T`'s properties.
    pub(crate) fn resolve(self, matching: NameMatching) -> Result<TypeMap<T>> {
        let descriptor = T::descriptor();
        let mut overrides: Vec<(PropertyPath, ValueOverride)> =
            Vec::with_capacity(self.members.len());

        for (member, projection) in self.members {
            let path = descriptor.resolve(&member, matching).ok_or_else(|| {
                MapError::config(format!(
                    "'{}' is not a settable property of {}",
                    member,
                    descriptor.name()
                ))
            })?;
            if overrides.iter().any(|(existing, _)| *existing == path) {
                return Err(MapError::config(format!(
                    "{}.{} has more than one override",
                    descriptor.name(),
                    path
                )));
            }
            overrides.push((path, projection));
        }

        Ok(TypeMap {
            descriptor,
            overrides,
        })
    }
}

impl<T: Destination> Default for DestinationMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered destination type, ready for plan compilation.
pub(crate) struct TypeMap<T> {
    descriptor: TypeDescriptor<T>,
    overrides: Vec<(PropertyPath, ValueOverride)>,
}

impl<T: Destination> TypeMap<T> {
    /// Map for a destination nobody registered.
    pub(crate) fn unconfigured() -> Self {
        Self {
            descriptor: T::descriptor(),
            overrides: Vec::new(),
        }
    }
}

impl<T> TypeMap<T> {
    pub(crate) fn descriptor(&self) -> &TypeDescriptor<T> {
        &self.descriptor
    }

    pub(crate) fn overrides(&self) -> &[(PropertyPath, ValueOverride)] {
        &self.overrides
    }

    pub(crate) fn has_override(&self, path: &PropertyPath) -> bool {
        self.overrides.iter().any(|(p, _)| p == path)
    }
}

/// Options plus the set of registered destination types.
#[derive(Default)]
pub struct MapperConfiguration {
    options: MapperOptions,
    maps: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl MapperConfiguration {
    pub fn new(options: MapperOptions) -> Self {
        Self {
            options,
            maps: HashMap::new(),
        }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// Register `T`. Registering the same type twice is an error.
    pub fn register<T: Destination>(&mut self, map: DestinationMap<T>) -> Result<&mut Self> {
        let type_id = TypeId::of::<T>();
        if self.maps.contains_key(&type_id) {
            return Err(MapError::config(format!(
                "Destination type {} is already registered",
                std::any::type_name::<T>()
            )));
        }

        let map = map.resolve(self.options.name_matching)?;
        debug!(
            "Registered destination {} with {} override(s)",
            map.descriptor().name(),
            map.overrides().len()
        );
        self.maps.insert(type_id, Arc::new(map));
        Ok(self)
    }

    /// Register `T` with no overrides.
    pub fn create_map<T: Destination>(&mut self) -> Result<&mut Self> {
        self.register(DestinationMap::<T>::new())
    }

    pub fn is_configured<T: Destination>(&self) -> bool {
        self.maps.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered destination types.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub(crate) fn type_map<T: Destination>(&self) -> Option<Arc<TypeMap<T>>> {
        let erased = Arc::clone(self.maps.get(&TypeId::of::<T>())?);
        erased.downcast::<TypeMap<T>>().ok()
    }

    /// Finish configuration and build a mapper.
    pub fn create_mapper(self) -> Mapper {
        Mapper::new(self)
    }
}

impl fmt::Debug for MapperConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperConfiguration")
            .field("options", &self.options)
            .field("registered", &self.maps.len())
            .finish()
    }
}

//! Statically declared destination types.
//!
//! A destination type lists its settable properties once, through a
//! [`TypeDescriptor`]. Scalar properties carry their [`TargetType`] and a
//! setter; nested properties point at another [`Destination`] whose
//! descriptor is built on first use. Column names are resolved against this
//! tree when a plan is compiled, never per row.
//!
//! ```rust
//! use reader_mapper::{Destination, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Inner {
//!     descr: Option<String>,
//! }
//!
//! impl Destination for Inner {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::new("Inner").field("Descr", |d: &mut Inner, v: String| d.descr = Some(v))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Outer {
//!     id: i32,
//!     inner: Option<Inner>,
//! }
//!
//! impl Destination for Outer {
//!     fn descriptor() -> TypeDescriptor<Self> {
//!         TypeDescriptor::new("Outer")
//!             .field("Id", |d: &mut Outer, v: i32| d.id = v)
//!             .nested("Inner", |d: &mut Outer, v: Inner| d.inner = Some(v))
//!     }
//! }
//! ```

mod nested;
mod path;

pub use path::PropertyPath;

pub(crate) use nested::{NestedBinding, NestedProperty};

use std::sync::Arc;

use crate::config::NameMatching;
use crate::core::SqlValue;
use crate::typemap::{ColumnValue, TargetType};

use nested::{NestedSlot, ProjectedNested};

/// A type the mapper can instantiate and populate.
///
/// `Default` supplies the instance every row starts from; properties without
/// a populated binding keep their default.
pub trait Destination: Default + 'static {
    fn descriptor() -> TypeDescriptor<Self>;
}

/// Assigns an already coerced value; `false` when the value has the wrong shape.
pub(crate) type Assign<T> = Arc<dyn Fn(&mut T, SqlValue<'static>) -> bool + Send + Sync>;

pub(crate) enum PropertyKind<T> {
    Scalar { target: TargetType, assign: Assign<T> },
    Nested(Arc<dyn NestedProperty<T>>),
}

pub(crate) struct PropertyDescriptor<T> {
    pub(crate) name: &'static str,
    pub(crate) kind: PropertyKind<T>,
}

/// The settable properties of a destination type.
pub struct TypeDescriptor<T> {
    name: &'static str,
    properties: Vec<PropertyDescriptor<T>>,
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            properties: Vec::new(),
        }
    }

    /// Add a scalar property. `V` decides the accepted column types; use
    /// `Option<V>` for nullable fields.
    #[must_use]
    pub fn field<V, F>(mut self, name: &'static str, set: F) -> Self
    where
        V: ColumnValue,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        let assign: Assign<T> = Arc::new(move |target: &mut T, value: SqlValue<'static>| {
            match V::from_sql(value) {
                Some(v) => {
                    set(target, v);
                    true
                }
                None => false,
            }
        });
        self.properties.push(PropertyDescriptor {
            name,
            kind: PropertyKind::Scalar {
                target: V::target_type(),
                assign,
            },
        });
        self
    }

    /// Add a nested object property. `set` is only called for rows where at
    /// least one of the nested leaves has a value.
    #[must_use]
    pub fn nested<U, F>(mut self, name: &'static str, set: F) -> Self
    where
        U: Destination,
        F: Fn(&mut T, U) + Send + Sync + 'static,
    {
        self.properties.push(PropertyDescriptor {
            name,
            kind: PropertyKind::Nested(Arc::new(NestedSlot::new(set))),
        });
        self
    }

    /// Take over every property of `B`, reached through `project`. This is how
    /// a type embedding a base struct exposes the base's columns.
    #[must_use]
    pub fn include<B: Destination>(mut self, project: fn(&mut T) -> &mut B) -> Self {
        for property in B::descriptor().properties {
            let kind = match property.kind {
                PropertyKind::Scalar { target, assign } => {
                    let assign: Assign<T> =
                        Arc::new(move |t: &mut T, value: SqlValue<'static>| {
                            assign(project(t), value)
                        });
                    PropertyKind::Scalar { target, assign }
                }
                PropertyKind::Nested(inner) => {
                    PropertyKind::Nested(Arc::new(ProjectedNested::new(project, inner)))
                }
            };
            self.properties.push(PropertyDescriptor {
                name: property.name,
                kind,
            });
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|p| p.name)
    }

    /// Resolve a column name to the scalar property it binds to.
    ///
    /// The name is split on `.`; every segment but the last must name a nested
    /// property, the last a scalar one. Returns `None` for anything else, and
    /// the column is then left out of the plan.
    pub fn resolve(&self, column_name: &str, matching: NameMatching) -> Option<PropertyPath> {
        let segments: Vec<&str> = column_name.split('.').collect();
        self.resolve_segments(&segments, matching)
            .map(PropertyPath::new)
    }

    pub(crate) fn resolve_segments(
        &self,
        segments: &[&str],
        matching: NameMatching,
    ) -> Option<Vec<&'static str>> {
        let (head, rest) = segments.split_first()?;
        let property = self.property(head, matching)?;
        match (&property.kind, rest.is_empty()) {
            (PropertyKind::Scalar { .. }, true) => Some(vec![property.name]),
            (PropertyKind::Nested(nested), false) => {
                let mut resolved = Vec::with_capacity(segments.len());
                resolved.push(property.name);
                resolved.extend(nested.resolve(rest, matching)?);
                Some(resolved)
            }
            _ => None,
        }
    }

    /// Later declarations shadow earlier ones with the same name.
    pub(crate) fn property(
        &self,
        name: &str,
        matching: NameMatching,
    ) -> Option<&PropertyDescriptor<T>> {
        self.properties
            .iter()
            .rev()
            .find(|p| matching.matches(p.name, name))
    }
}

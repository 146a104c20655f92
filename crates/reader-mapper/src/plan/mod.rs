//! Compiled mapping plans.
//!
//! A [`MappingPlan`] binds the columns of one schema to the properties of one
//! destination type. It is compiled once per (type, [`SchemaSignature`]) pair,
//! cached in a [`PlanCache`], and shared read-only afterwards.
//!
//! Bindings are stored as a tree that mirrors the destination's nesting: each
//! nested property compiles to a node owning the leaves and nodes below it,
//! so the per-row work never looks at column names again.

pub mod cache;

pub use cache::PlanCache;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{NameMatching, TypeMap};
use crate::core::{ColumnDescriptor, DataRecord, SchemaSignature, SqlType, SqlValue};
use crate::destination::{
    Assign, Destination, NestedBinding, PropertyKind, PropertyPath, TypeDescriptor,
};
use crate::error::{MapError, Result};
use crate::typemap::{is_convertible, TargetType};

/// Caller-supplied projection replacing the column copy for one property.
pub(crate) type ValueOverride =
    Arc<dyn Fn(&dyn DataRecord) -> Result<SqlValue<'static>> + Send + Sync>;

/// Where a bound value comes from.
pub(crate) enum BindingSource {
    Column {
        ordinal: usize,
        name: String,
        declared: SqlType,
    },
    Override(ValueOverride),
}

/// A resolved binding waiting to be placed in the plan tree.
pub(crate) struct PendingBinding {
    pub(crate) path: PropertyPath,
    pub(crate) source: BindingSource,
}

impl PendingBinding {
    fn describe(&self) -> PropertyBinding {
        match &self.source {
            BindingSource::Column { ordinal, name, .. } => PropertyBinding {
                path: self.path.clone(),
                source_ordinal: Some(*ordinal),
                column: Some(name.clone()),
                has_override: false,
            },
            BindingSource::Override(_) => PropertyBinding {
                path: self.path.clone(),
                source_ordinal: None,
                column: None,
                has_override: true,
            },
        }
    }
}

/// One binding of a compiled plan, as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBinding {
    /// Destination property, root to leaf.
    pub path: PropertyPath,
    /// Source column ordinal; `None` for overrides.
    pub source_ordinal: Option<usize>,
    /// Source column name; `None` for overrides.
    pub column: Option<String>,
    pub has_override: bool,
}

pub(crate) struct LeafBinding<T> {
    pub(crate) destination: &'static str,
    pub(crate) path: PropertyPath,
    pub(crate) source: BindingSource,
    pub(crate) target: TargetType,
    pub(crate) assign: Assign<T>,
}

/// Bindings of one object level: its own scalar leaves and its nested
/// properties.
pub(crate) struct PlanNode<T> {
    pub(crate) leaves: Vec<LeafBinding<T>>,
    pub(crate) children: Vec<Box<dyn NestedBinding<T>>>,
}

impl<T: 'static> PlanNode<T> {
    /// Build the node for `descriptor` from bindings whose paths all share
    /// the first `depth` segments. Paths are canonical, so lookups are exact.
    pub(crate) fn compile(
        descriptor: &TypeDescriptor<T>,
        bindings: Vec<PendingBinding>,
        depth: usize,
        root: &'static str,
    ) -> Result<Self> {
        let mut leaves = Vec::new();
        let mut groups: Vec<(&'static str, Vec<PendingBinding>)> = Vec::new();

        for binding in bindings {
            let len = binding.path.depth();
            let Some(segment) = binding.path.segments().get(depth).copied() else {
                continue;
            };
            let Some(property) = descriptor.property(segment, NameMatching::Exact) else {
                continue;
            };

            match &property.kind {
                PropertyKind::Scalar { target, assign } if len == depth + 1 => {
                    if let BindingSource::Column { name, declared, .. } = &binding.source {
                        if !is_convertible(*declared, *target) {
                            return Err(MapError::Coercion {
                                destination: root,
                                path: binding.path.to_string(),
                                column: name.clone(),
                                source_type: *declared,
                                target_type: *target,
                            });
                        }
                    }
                    leaves.push(LeafBinding {
                        destination: root,
                        path: binding.path,
                        source: binding.source,
                        target: *target,
                        assign: Arc::clone(assign),
                    });
                }
                PropertyKind::Nested(_) if len > depth + 1 => {
                    match groups.iter_mut().find(|(name, _)| *name == segment) {
                        Some((_, group)) => group.push(binding),
                        None => groups.push((segment, vec![binding])),
                    }
                }
                _ => {}
            }
        }

        let mut children = Vec::with_capacity(groups.len());
        for (segment, group) in groups {
            if let Some(PropertyKind::Nested(nested)) = descriptor
                .property(segment, NameMatching::Exact)
                .map(|p| &p.kind)
            {
                children.push(nested.compile(group, depth + 1, root)?);
            }
        }

        Ok(Self { leaves, children })
    }
}

/// Compiled bindings from one schema to one destination type.
pub struct MappingPlan<T> {
    destination: &'static str,
    signature: SchemaSignature,
    bindings: Vec<PropertyBinding>,
    skipped: Vec<String>,
    pub(crate) root: PlanNode<T>,
}

impl<T: Destination> MappingPlan<T> {
    /// Compile a plan for `columns`.
    ///
    /// Columns that resolve to no scalar property are skipped. A column whose
    /// property has a member override is skipped in favour of the override.
    /// If two columns resolve to the same property the first one wins.
    pub(crate) fn compile(
        map: &TypeMap<T>,
        signature: SchemaSignature,
        columns: &[ColumnDescriptor],
        matching: NameMatching,
    ) -> Result<Self> {
        let descriptor = map.descriptor();
        let destination = descriptor.name();
        let mut pending: Vec<PendingBinding> =
            Vec::with_capacity(columns.len() + map.overrides().len());
        let mut skipped = Vec::new();

        for column in columns {
            let Some(path) = descriptor.resolve(&column.name, matching) else {
                trace!("{}: no property for column '{}'", destination, column.name);
                skipped.push(column.name.clone());
                continue;
            };
            if map.has_override(&path) || pending.iter().any(|p| p.path == path) {
                trace!(
                    "{}: column '{}' shadowed by another binding for {}",
                    destination,
                    column.name,
                    path
                );
                skipped.push(column.name.clone());
                continue;
            }
            pending.push(PendingBinding {
                path,
                source: BindingSource::Column {
                    ordinal: column.ordinal,
                    name: column.name.clone(),
                    declared: column.declared_type,
                },
            });
        }

        for (path, projection) in map.overrides() {
            pending.push(PendingBinding {
                path: path.clone(),
                source: BindingSource::Override(Arc::clone(projection)),
            });
        }

        let bindings: Vec<PropertyBinding> = pending.iter().map(PendingBinding::describe).collect();
        let root = PlanNode::compile(descriptor, pending, 0, destination)?;

        debug!(
            "Compiled mapping plan for {}: {} columns, {} bindings, {} skipped",
            destination,
            columns.len(),
            bindings.len(),
            skipped.len()
        );

        Ok(Self {
            destination,
            signature,
            bindings,
            skipped,
            root,
        })
    }
}

impl<T> MappingPlan<T> {
    /// Name of the destination type.
    pub fn destination(&self) -> &'static str {
        self.destination
    }

    pub fn signature(&self) -> &SchemaSignature {
        &self.signature
    }

    /// Bindings in column order, followed by member overrides.
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Columns left out of the plan.
    pub fn skipped_columns(&self) -> &[String] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DestinationMap;

    #[derive(Default)]
    struct Inner {
        descr: Option<String>,
        descr2: Option<String>,
    }

    impl Destination for Inner {
        fn descriptor() -> TypeDescriptor<Self> {
            TypeDescriptor::new("Inner")
                .field("Descr", |d: &mut Inner, v: String| d.descr = Some(v))
                .field("Descr2", |d: &mut Inner, v: String| d.descr2 = Some(v))
        }
    }

    #[derive(Default)]
    struct Outer {
        id: i32,
        stamp: i64,
        inner: Option<Inner>,
    }

    impl Destination for Outer {
        fn descriptor() -> TypeDescriptor<Self> {
            TypeDescriptor::new("Outer")
                .field("Id", |d: &mut Outer, v: i32| d.id = v)
                .field("Stamp", |d: &mut Outer, v: i64| d.stamp = v)
                .nested("Inner", |d: &mut Outer, v: Inner| d.inner = Some(v))
        }
    }

    fn columns(layout: &[(&str, SqlType)]) -> Vec<ColumnDescriptor> {
        layout
            .iter()
            .enumerate()
            .map(|(ordinal, (name, declared_type))| ColumnDescriptor {
                name: name.to_string(),
                ordinal,
                declared_type: *declared_type,
            })
            .collect()
    }

    fn compile(
        map: DestinationMap<Outer>,
        layout: &[(&str, SqlType)],
        matching: NameMatching,
    ) -> Result<MappingPlan<Outer>> {
        let columns = columns(layout);
        let map = map.resolve(matching)?;
        MappingPlan::compile(&map, SchemaSignature::from_columns(&columns), &columns, matching)
    }

    #[test]
    fn test_compile_orders_bindings_and_skips_unknown_columns() {
        let plan = compile(
            DestinationMap::new(),
            &[
                ("Id", SqlType::I32),
                ("Extra", SqlType::String),
                ("Inner.Descr", SqlType::String),
                ("Inner.Missing", SqlType::String),
                ("Inner.Descr2", SqlType::String),
            ],
            NameMatching::Exact,
        )
        .unwrap();

        let paths: Vec<String> = plan.bindings().iter().map(|b| b.path.to_string()).collect();
        assert_eq!(paths, vec!["Id", "Inner.Descr", "Inner.Descr2"]);
        assert_eq!(plan.bindings()[1].source_ordinal, Some(2));
        assert_eq!(plan.skipped_columns(), &["Extra", "Inner.Missing"]);
        assert_eq!(plan.root.leaves.len(), 1);
        assert_eq!(plan.root.children.len(), 1);
        assert_eq!(plan.destination(), "Outer");
    }

    #[test]
    fn test_override_replaces_column_binding() {
        let map = DestinationMap::new().for_member("Stamp", |_: &dyn DataRecord| Ok(SqlValue::I64(1)));
        let plan = compile(
            map,
            &[("Id", SqlType::I32), ("Stamp", SqlType::I64)],
            NameMatching::Exact,
        )
        .unwrap();

        assert_eq!(plan.bindings().len(), 2);
        let stamp = &plan.bindings()[1];
        assert_eq!(stamp.path.to_string(), "Stamp");
        assert!(stamp.has_override);
        assert_eq!(stamp.source_ordinal, None);
        assert_eq!(plan.skipped_columns(), &["Stamp"]);
    }

    #[test]
    fn test_incompatible_column_fails_compilation() {
        let err = compile(
            DestinationMap::new(),
            &[("Id", SqlType::String)],
            NameMatching::Exact,
        )
        .err()
        .unwrap();
        match err {
            MapError::Coercion {
                destination,
                path,
                column,
                source_type,
                ..
            } => {
                assert_eq!(destination, "Outer");
                assert_eq!(path, "Id");
                assert_eq!(column, "Id");
                assert_eq!(source_type, SqlType::String);
            }
            other => panic!("expected coercion error, got {:?}", other),
        }
    }

    #[test]
    fn test_case_insensitive_first_column_wins() {
        let plan = compile(
            DestinationMap::new(),
            &[("id", SqlType::I32), ("ID", SqlType::I16)],
            NameMatching::IgnoreAsciiCase,
        )
        .unwrap();
        assert_eq!(plan.bindings().len(), 1);
        assert_eq!(plan.bindings()[0].column.as_deref(), Some("id"));
        assert_eq!(plan.skipped_columns(), &["ID"]);
    }
}

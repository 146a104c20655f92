//! Type-erased nested properties.
//!
//! A nested property of `T` holding a `U` hides `U` behind two traits: one
//! used while resolving and compiling, one used per row.

use std::sync::{Arc, OnceLock};

use crate::config::NameMatching;
use crate::core::DataRecord;
use crate::error::Result;
use crate::plan::{PendingBinding, PlanNode};

use super::{Destination, TypeDescriptor};

pub(crate) trait NestedProperty<T>: Send + Sync {
    /// Resolve the segments below this property.
    fn resolve(&self, rest: &[&str], matching: NameMatching) -> Option<Vec<&'static str>>;

    /// Compile the bindings whose paths pass through this property.
    /// `depth` indexes the first segment below it.
    fn compile(
        &self,
        bindings: Vec<PendingBinding>,
        depth: usize,
        root: &'static str,
    ) -> Result<Box<dyn NestedBinding<T>>>;
}

pub(crate) trait NestedBinding<T>: Send + Sync {
    /// Populate the nested object for one row. Returns whether anything below
    /// produced a value; only then is the object stored on `target`.
    fn apply(&self, target: &mut T, record: &dyn DataRecord) -> Result<bool>;
}

type SetNested<T, U> = Arc<dyn Fn(&mut T, U) + Send + Sync>;

pub(super) struct NestedSlot<T, U> {
    set: SetNested<T, U>,
    descriptor: OnceLock<TypeDescriptor<U>>,
}

impl<T: 'static, U: Destination> NestedSlot<T, U> {
    pub(super) fn new<F>(set: F) -> Self
    where
        F: Fn(&mut T, U) + Send + Sync + 'static,
    {
        Self {
            set: Arc::new(set),
            descriptor: OnceLock::new(),
        }
    }

    // Built lazily so self-referencing types do not recurse forever.
    fn descriptor(&self) -> &TypeDescriptor<U> {
        self.descriptor.get_or_init(U::descriptor)
    }
}

impl<T: 'static, U: Destination> NestedProperty<T> for NestedSlot<T, U> {
    fn resolve(&self, rest: &[&str], matching: NameMatching) -> Option<Vec<&'static str>> {
        self.descriptor().resolve_segments(rest, matching)
    }

    fn compile(
        &self,
        bindings: Vec<PendingBinding>,
        depth: usize,
        root: &'static str,
    ) -> Result<Box<dyn NestedBinding<T>>> {
        let plan = PlanNode::compile(self.descriptor(), bindings, depth, root)?;
        Ok(Box::new(NestedNode {
            set: Arc::clone(&self.set),
            plan,
        }))
    }
}

struct NestedNode<T, U> {
    set: SetNested<T, U>,
    plan: PlanNode<U>,
}

impl<T: 'static, U: Destination> NestedBinding<T> for NestedNode<T, U> {
    fn apply(&self, target: &mut T, record: &dyn DataRecord) -> Result<bool> {
        let mut nested = U::default();
        if !self.plan.apply(&mut nested, record)? {
            return Ok(false);
        }
        (self.set)(target, nested);
        Ok(true)
    }
}

/// A nested property of an included base type, reached through a projection.
pub(super) struct ProjectedNested<T, B> {
    project: fn(&mut T) -> &mut B,
    inner: Arc<dyn NestedProperty<B>>,
}

impl<T, B> ProjectedNested<T, B> {
    pub(super) fn new(project: fn(&mut T) -> &mut B, inner: Arc<dyn NestedProperty<B>>) -> Self {
        Self { project, inner }
    }
}

impl<T: 'static, B: 'static> NestedProperty<T> for ProjectedNested<T, B> {
    fn resolve(&self, rest: &[&str], matching: NameMatching) -> Option<Vec<&'static str>> {
        self.inner.resolve(rest, matching)
    }

    fn compile(
        &self,
        bindings: Vec<PendingBinding>,
        depth: usize,
        root: &'static str,
    ) -> Result<Box<dyn NestedBinding<T>>> {
        Ok(Box::new(ProjectedBinding {
            project: self.project,
            inner: self.inner.compile(bindings, depth, root)?,
        }))
    }
}

struct ProjectedBinding<T, B> {
    project: fn(&mut T) -> &mut B,
    inner: Box<dyn NestedBinding<B>>,
}

impl<T: 'static, B: 'static> NestedBinding<T> for ProjectedBinding<T, B> {
    fn apply(&self, target: &mut T, record: &dyn DataRecord) -> Result<bool> {
        self.inner.apply((self.project)(target), record)
    }
}

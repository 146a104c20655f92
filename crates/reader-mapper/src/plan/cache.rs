//! Process-wide store of compiled plans.
//!
//! Keyed by destination type and schema signature. Lookups on a hit take a
//! shard read lock only long enough to clone an `Arc`. On a miss the plan is
//! compiled without holding any lock; if another thread published a plan for
//! the same key in the meantime, that plan wins and ours is dropped, so every
//! caller ends up with the same instance.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::core::SchemaSignature;
use crate::destination::Destination;
use crate::error::{MapError, Result};

use super::MappingPlan;

type PlanKey = (TypeId, SchemaSignature);
type ErasedPlan = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct PlanCache {
    plans: DashMap<PlanKey, ErasedPlan>,
    compilations: AtomicU64,
    discarded: AtomicU64,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached plan for `T` and `signature`, if one has been published.
    pub fn get<T: Destination>(&self, signature: &SchemaSignature) -> Option<Arc<MappingPlan<T>>> {
        let key = (TypeId::of::<T>(), signature.clone());
        let erased = self.plans.get(&key).map(|entry| Arc::clone(entry.value()))?;
        erased.downcast::<MappingPlan<T>>().ok()
    }

    /// Return the canonical plan for `T` and `signature`, compiling it with
    /// `compile` if none is cached yet.
    ///
    /// A failed compilation is not cached; the next call tries again.
    pub fn get_or_compile<T, F>(
        &self,
        signature: &SchemaSignature,
        compile: F,
    ) -> Result<Arc<MappingPlan<T>>>
    where
        T: Destination,
        F: FnOnce(&SchemaSignature) -> Result<MappingPlan<T>>,
    {
        if let Some(plan) = self.get::<T>(signature) {
            return Ok(plan);
        }

        let compiled: ErasedPlan = Arc::new(compile(signature)?);
        self.compilations.fetch_add(1, Ordering::Relaxed);

        let key = (TypeId::of::<T>(), signature.clone());
        let canonical = match self.plans.entry(key) {
            Entry::Occupied(existing) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    "Discarding duplicate plan for {} {}: another thread published first",
                    std::any::type_name::<T>(),
                    signature
                );
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&compiled));
                compiled
            }
        };

        canonical.downcast::<MappingPlan<T>>().map_err(|_| {
            MapError::Internal(format!(
                "Cached plan for {} has the wrong type",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Number of cached plans across all destination types.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Successful compilations, including ones later discarded.
    pub fn compilations(&self) -> u64 {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Compilations that lost the race to publish.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanCache")
            .field("plans", &self.plans.len())
            .field("compilations", &self.compilations())
            .field("discarded", &self.discarded())
            .finish()
    }
}

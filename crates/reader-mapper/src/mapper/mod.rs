//! The mapping entry point.
//!
//! A [`Mapper`] pairs a finished [`MapperConfiguration`] with a [`PlanCache`].
//! Clones share both, so one mapper can be handed to any number of threads.

mod record;
mod rows;

pub use rows::{MappedRows, MappedRowsIter, RowIter};

use std::any::type_name;
use std::sync::Arc;

use tracing::warn;

use crate::config::{MapperConfiguration, TypeMap};
use crate::core::{describe, DataReader, DataRecord, SchemaSignature};
use crate::destination::Destination;
use crate::error::{MapError, Result};
use crate::plan::{MappingPlan, PlanCache};

#[derive(Clone, Debug)]
pub struct Mapper {
    config: Arc<MapperConfiguration>,
    plans: Arc<PlanCache>,
}

impl Mapper {
    pub fn new(config: MapperConfiguration) -> Self {
        Self {
            config: Arc::new(config),
            plans: Arc::new(PlanCache::new()),
        }
    }

    pub fn configuration(&self) -> &MapperConfiguration {
        &self.config
    }

    /// Plans compiled so far.
    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    fn ensure_configured<T: Destination>(&self) -> Result<()> {
        if self.config.is_configured::<T>() || self.config.options().create_missing_type_maps {
            return Ok(());
        }
        Err(MapError::UnconfiguredMapping {
            destination: type_name::<T>(),
        })
    }

    /// The plan for mapping `record`'s schema to `T`, compiled on first use.
    pub fn plan_for<T: Destination>(&self, record: &dyn DataRecord) -> Result<Arc<MappingPlan<T>>> {
        self.ensure_configured::<T>()?;

        let columns = describe(record);
        let signature = SchemaSignature::from_columns(&columns);
        let matching = self.config.options().name_matching;

        self.plans.get_or_compile::<T, _>(&signature, |signature| {
            let map = match self.config.type_map::<T>() {
                Some(map) => map,
                None => {
                    warn!(
                        "Mapping {} through an automatically created type map",
                        type_name::<T>()
                    );
                    Arc::new(TypeMap::unconfigured())
                }
            };
            MappingPlan::compile(&map, signature.clone(), &columns, matching)
        })
    }

    /// Map the record's current row.
    pub fn map<T: Destination>(&self, record: &dyn DataRecord) -> Result<T> {
        self.plan_for::<T>(record)?.map_record(record)
    }

    /// Map every remaining row of `reader` into a list. Nothing is returned if
    /// any row fails.
    pub fn map_all<T: Destination, R: DataReader>(&self, reader: &mut R) -> Result<Vec<T>> {
        self.iter::<T, R>(reader).collect()
    }

    /// Lazily map the remaining rows of `reader`, one per pull.
    pub fn iter<'r, T: Destination, R: DataReader>(&self, reader: &'r mut R) -> RowIter<'r, T, R> {
        RowIter::new(self.clone(), reader)
    }

    /// Map `reader` eagerly or lazily according to
    /// [`MapperOptions::lazy`](crate::config::MapperOptions::lazy).
    ///
    /// The destination's registration is checked before anything is read, in
    /// both modes.
    pub fn map_reader<'r, T: Destination, R: DataReader>(
        &self,
        reader: &'r mut R,
    ) -> Result<MappedRows<'r, T, R>> {
        self.ensure_configured::<T>()?;
        if self.config.options().lazy {
            Ok(MappedRows::Lazy(self.iter(reader)))
        } else {
            Ok(MappedRows::Materialized(self.map_all(reader)?))
        }
    }
}

impl From<MapperConfiguration> for Mapper {
    fn from(config: MapperConfiguration) -> Self {
        Self::new(config)
    }
}

//! Per-row execution of a compiled plan.

use crate::core::DataRecord;
use crate::destination::Destination;
use crate::error::{MapError, Result};
use crate::plan::{BindingSource, LeafBinding, MappingPlan, PlanNode};
use crate::typemap::coerce;

impl<T: Destination> MappingPlan<T> {
    /// Build one `T` from the record's current row.
    ///
    /// The root instance is always returned, even when every bound value is
    /// NULL. Nested instances only appear where something below them had a
    /// value.
    pub fn map_record(&self, record: &dyn DataRecord) -> Result<T> {
        let mut target = T::default();
        self.root.apply(&mut target, record)?;
        Ok(target)
    }
}

impl<T> PlanNode<T> {
    /// Returns whether any leaf at or below this node was assigned.
    pub(crate) fn apply(&self, target: &mut T, record: &dyn DataRecord) -> Result<bool> {
        let mut populated = false;
        for leaf in &self.leaves {
            populated |= leaf.apply(target, record)?;
        }
        for child in &self.children {
            populated |= child.apply(target, record)?;
        }
        Ok(populated)
    }
}

impl<T> LeafBinding<T> {
    fn apply(&self, target: &mut T, record: &dyn DataRecord) -> Result<bool> {
        let value = match &self.source {
            BindingSource::Column { ordinal, name, .. } => {
                let raw = record.value(*ordinal)?;
                match coerce(raw, self.target) {
                    Ok(Some(value)) => value,
                    Ok(None) => return Ok(false),
                    Err(err) => {
                        return Err(MapError::Coercion {
                            destination: self.destination,
                            path: self.path.to_string(),
                            column: name.clone(),
                            source_type: err.source_type,
                            target_type: err.target_type,
                        })
                    }
                }
            }
            BindingSource::Override(projection) => {
                let value = projection(record)?;
                if value.is_null() {
                    return Ok(false);
                }
                value
            }
        };

        let produced = value.sql_type();
        if (self.assign)(target, value) {
            return Ok(true);
        }

        // A coerced column value only fails here for an enum discriminant
        // with no matching variant.
        Err(match &self.source {
            BindingSource::Column { name, declared, .. } => MapError::Coercion {
                destination: self.destination,
                path: self.path.to_string(),
                column: name.clone(),
                source_type: *declared,
                target_type: self.target,
            },
            BindingSource::Override(_) => MapError::Override {
                destination: self.destination,
                path: self.path.to_string(),
                produced,
                expected: self.target,
            },
        })
    }
}

//! Eager and lazy materialization of a whole reader.

use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::trace;

use crate::core::DataReader;
use crate::destination::Destination;
use crate::error::Result;
use crate::plan::MappingPlan;

use super::Mapper;

enum IterState<T> {
    NotStarted,
    Active(Arc<MappingPlan<T>>),
    Exhausted,
}

/// Lazy, single-pass sequence of mapped rows.
///
/// The plan is looked up on the first pull, so an unconfigured destination or
/// an incompatible schema surfaces as the first item. After an error or the
/// end of the reader the iterator only returns `None`.
pub struct RowIter<'r, T, R> {
    mapper: Mapper,
    reader: &'r mut R,
    state: IterState<T>,
}

impl<'r, T: Destination, R: DataReader> RowIter<'r, T, R> {
    pub(super) fn new(mapper: Mapper, reader: &'r mut R) -> Self {
        Self {
            mapper,
            reader,
            state: IterState::NotStarted,
        }
    }

    /// Whether the iterator has finished, successfully or not.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, IterState::Exhausted)
    }

    fn step(&mut self) -> Result<Option<T>> {
        if let IterState::NotStarted = self.state {
            let plan = self.mapper.plan_for::<T>(&*self.reader)?;
            self.state = IterState::Active(plan);
        }
        let IterState::Active(plan) = &self.state else {
            return Ok(None);
        };

        if !self.reader.advance()? {
            trace!("{}: reader exhausted", plan.destination());
            return Ok(None);
        }
        plan.map_record(&*self.reader).map(Some)
    }
}

impl<'r, T: Destination, R: DataReader> Iterator for RowIter<'r, T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.state = IterState::Exhausted;
                None
            }
            Err(err) => {
                self.state = IterState::Exhausted;
                Some(Err(err))
            }
        }
    }
}

impl<'r, T: Destination, R: DataReader> FusedIterator for RowIter<'r, T, R> {}

/// Result of [`Mapper::map_reader`]: a list or a lazy sequence, depending on
/// [`MapperOptions::lazy`](crate::config::MapperOptions::lazy).
pub enum MappedRows<'r, T, R> {
    /// Every row already mapped; supports `len` and indexing through
    /// [`as_slice`](Self::as_slice).
    Materialized(Vec<T>),
    Lazy(RowIter<'r, T, R>),
}

impl<'r, T: Destination, R: DataReader> MappedRows<'r, T, R> {
    pub fn is_lazy(&self) -> bool {
        matches!(self, MappedRows::Lazy(_))
    }

    /// Row count; `None` for a lazy sequence.
    pub fn len(&self) -> Option<usize> {
        match self {
            MappedRows::Materialized(rows) => Some(rows.len()),
            MappedRows::Lazy(_) => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            MappedRows::Materialized(rows) => Some(rows),
            MappedRows::Lazy(_) => None,
        }
    }

    /// Collect into a list, draining a lazy sequence.
    pub fn into_vec(self) -> Result<Vec<T>> {
        match self {
            MappedRows::Materialized(rows) => Ok(rows),
            MappedRows::Lazy(iter) => iter.collect(),
        }
    }
}

impl<'r, T: Destination, R: DataReader> IntoIterator for MappedRows<'r, T, R> {
    type Item = Result<T>;
    type IntoIter = MappedRowsIter<'r, T, R>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            MappedRows::Materialized(rows) => MappedRowsIter::Materialized(rows.into_iter()),
            MappedRows::Lazy(iter) => MappedRowsIter::Lazy(iter),
        }
    }
}

pub enum MappedRowsIter<'r, T, R> {
    Materialized(std::vec::IntoIter<T>),
    Lazy(RowIter<'r, T, R>),
}

impl<'r, T: Destination, R: DataReader> Iterator for MappedRowsIter<'r, T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MappedRowsIter::Materialized(rows) => rows.next().map(Ok),
            MappedRowsIter::Lazy(iter) => iter.next(),
        }
    }
}

impl<'r, T: Destination, R: DataReader> FusedIterator for MappedRowsIter<'r, T, R> {}

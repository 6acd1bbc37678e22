//! The storage collaborator: the only way the engine touches data.

use enum_as_inner::EnumAsInner;

use crate::align::Aligned;
use crate::error::IndexError;
use crate::label::Label;
use crate::label::Value;
use crate::labels::LabelSet;
use crate::labels::Loc;
use crate::selector::Selector;

/// The result of a read: a single cell once every axis has been
/// lowered away, otherwise a (possibly lower-dimensional) object.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Selected<D> {
    Cell(Value),
    Data(D),
}

/// Labeled N-dimensional data as seen by the indexing engine.
///
/// Reads return new objects. Writes also return a new object
/// ([`Storage::setitem`]), which the caller installs only once the
/// whole write has succeeded; [`Storage::set_value`] is the in-place
/// single-cell path.
pub trait Storage: Clone + Sized {
    fn ndim(&self) -> usize;

    /// The labels of `axis`. Panics if `axis` is not below
    /// [`Storage::ndim`]; [`Storage::axis`] is the checked form.
    fn get_axis(&self, axis: usize) -> &LabelSet;

    /// The entries at `positions` along `axis`, in that order.
    fn take(&self, positions: &[usize], axis: usize) -> Result<Self, IndexError>;

    /// Relabel `axis` with `labels`, taking entry `i` from
    /// `indexer[i]`, or `fill` where that is `None`.
    fn reindex_indexer(
        &self,
        labels: LabelSet,
        indexer: &[Option<usize>],
        axis: usize,
        fill: &Value,
    ) -> Result<Self, IndexError>;

    /// Replace the labels of `axis` with a set of the same length.
    fn set_axis(&self, labels: LabelSet, axis: usize) -> Result<Self, IndexError>;

    /// The cross-section at `position` along `axis`; the axis is
    /// dropped.
    fn ixs(&self, position: usize, axis: usize) -> Result<Selected<Self>, IndexError>;

    fn get_value(&self, coords: &[usize]) -> Result<Value, IndexError>;

    fn set_value(&mut self, coords: &[usize], value: Value) -> Result<(), IndexError>;

    /// A copy with `value` written at the cartesian product of the
    /// per-axis `selectors`.
    fn setitem(&self, selectors: &[Selector], value: &Aligned) -> Result<Self, IndexError>;

    /// Called after a write has been installed.
    fn notify_mutated(&mut self) {}

    /// The labels of `axis`, failing rather than panicking when the
    /// axis does not exist.
    fn axis(&self, axis: usize) -> Result<&LabelSet, IndexError> {
        if axis < self.ndim() {
            Ok(self.get_axis(axis))
        } else {
            Err(IndexError::AxisOutOfRange {
                axis,
                ndim: self.ndim(),
            })
        }
    }

    /// The length of every axis.
    fn shape(&self) -> Vec<usize> {
        (0..self.ndim()).map(|i| self.get_axis(i).len()).collect()
    }

    /// Conform `axis` to `labels`, filling entries with no source.
    fn reindex_axis(&self, labels: &LabelSet, axis: usize, fill: &Value) -> Result<Self, IndexError> {
        let indexer = self
            .axis(axis)?
            .get_indexer(labels.labels())
            .map_err(|_| IndexError::DuplicateLabels { axis })?;
        self.reindex_indexer(labels.clone(), &indexer, axis, fill)
    }

    /// The cross-section at `label` along `axis`. A partial key on a
    /// hierarchical axis keeps the axis and drops the matched levels.
    fn xs(&self, label: &Label, axis: usize) -> Result<Selected<Self>, IndexError> {
        let labels = self.axis(axis)?;
        match labels.get_loc(label) {
            None => Err(IndexError::KeyNotFound {
                key: label.clone(),
                axis,
            }),
            Some(Loc::Position(p)) => self.ixs(p, axis),
            Some(loc) => {
                let positions: Vec<usize> = Selector::from(loc)
                    .indexer(labels.len())
                    .into_iter()
                    .flatten()
                    .collect();
                let section = self.take(&positions, axis)?;
                if labels.is_hierarchical() {
                    let dropped = section.get_axis(axis).droplevels(label.nlevels());
                    Ok(Selected::Data(section.set_axis(dropped, axis)?))
                } else {
                    Ok(Selected::Data(section))
                }
            }
        }
    }
}

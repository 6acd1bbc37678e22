//! A dense, in-memory labeled array.

use itertools::Itertools;
use itertools::izip;
use serde::Deserialize;
use serde::Serialize;

use crate::align::Aligned;
use crate::error::IndexError;
use crate::label::Value;
use crate::labels::LabelSet;
use crate::selector::Selector;
use crate::slice::Slice;
use crate::storage::Selected;
use crate::storage::Storage;

/// `Frame` holds one [`LabelSet`] per axis and a row-major buffer of
/// [`Value`]s laid out by a [`Slice`]. A one-dimensional frame is a
/// labeled vector, a two-dimensional one a table (rows, columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    axes: Vec<LabelSet>,
    slice: Slice,
    values: Vec<Value>,
    #[serde(skip)]
    mutations: u64,
}

impl Frame {
    /// Build a frame from its axes and row-major values.
    pub fn new(axes: Vec<LabelSet>, values: Vec<Value>) -> Result<Self, IndexError> {
        let slice = Slice::new_row_major(axes.iter().map(LabelSet::len).collect::<Vec<_>>());
        if slice.len() != values.len() {
            return Err(IndexError::DataLength {
                expected: slice.len(),
                got: values.len(),
                axis: None,
            });
        }
        Ok(Self {
            axes,
            slice,
            values,
            mutations: 0,
        })
    }

    /// A frame of the given axes with every cell set to `fill`.
    pub fn filled(axes: Vec<LabelSet>, fill: Value) -> Self {
        let slice = Slice::new_row_major(axes.iter().map(LabelSet::len).collect::<Vec<_>>());
        let values = vec![fill; slice.len()];
        Self {
            axes,
            slice,
            values,
            mutations: 0,
        }
    }

    /// A labeled vector.
    pub fn series<V: Into<Value>>(
        labels: LabelSet,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self, IndexError> {
        Self::new(vec![labels], values.into_iter().map(Into::into).collect())
    }

    /// A table given row by row.
    pub fn table<V: Into<Value>>(
        index: LabelSet,
        columns: LabelSet,
        rows: Vec<Vec<V>>,
    ) -> Result<Self, IndexError> {
        if rows.len() != index.len() {
            return Err(IndexError::DataLength {
                expected: index.len(),
                got: rows.len(),
                axis: Some(0),
            });
        }
        let mut values = Vec::with_capacity(index.len() * columns.len());
        for row in rows {
            if row.len() != columns.len() {
                return Err(IndexError::DataLength {
                    expected: columns.len(),
                    got: row.len(),
                    axis: Some(1),
                });
            }
            values.extend(row.into_iter().map(Into::into));
        }
        Self::new(vec![index, columns], values)
    }

    pub fn axes(&self) -> &[LabelSet] {
        &self.axes
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The number of writes installed into this frame.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    fn axis_len(&self, axis: usize) -> Result<usize, IndexError> {
        self.axis(axis).map(LabelSet::len)
    }

    // Rebuild along `axis`: entry `i` of the new axis comes from
    // `indexer[i]` of the old one, or is `fill`.
    fn gather(
        &self,
        labels: LabelSet,
        indexer: &[Option<usize>],
        axis: usize,
        fill: &Value,
    ) -> Result<Self, IndexError> {
        let mut axes = self.axes.clone();
        axes[axis] = labels;
        let mut out = Self::filled(axes, fill.clone());
        for (rank, slot) in out.values.iter_mut().enumerate() {
            let mut coord = out.slice.coordinates(rank)?;
            if let Some(source) = indexer[coord[axis]] {
                coord[axis] = source;
                *slot = self.values[self.slice.location(&coord)?].clone();
            }
        }
        Ok(out)
    }

    // The positions `selector` touches on `axis`; every one must exist.
    fn positions(&self, selector: &Selector, axis: usize) -> Result<Vec<usize>, IndexError> {
        let size = self.axis_len(axis)?;
        if let Selector::MissingKey(key) = selector {
            return Err(IndexError::KeyNotFound {
                key: key.clone(),
                axis,
            });
        }
        if let Selector::BooleanMask(mask) = selector {
            if mask.len() != size {
                return Err(IndexError::BooleanMaskLength {
                    axis,
                    expected: size,
                    got: mask.len(),
                });
            }
        }
        selector
            .indexer(size)
            .into_iter()
            .map(|p| match p {
                Some(p) if p < size => Ok(p),
                Some(p) => Err(IndexError::PositionOutOfRange {
                    position: p as i64,
                    axis,
                    size,
                }),
                None => Err(IndexError::PositionOutOfRange {
                    position: -1,
                    axis,
                    size,
                }),
            })
            .collect()
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes && self.values == other.values
    }
}

impl Storage for Frame {
    fn ndim(&self) -> usize {
        self.axes.len()
    }

    fn get_axis(&self, axis: usize) -> &LabelSet {
        &self.axes[axis]
    }

    fn take(&self, positions: &[usize], axis: usize) -> Result<Self, IndexError> {
        let size = self.axis_len(axis)?;
        if let Some(&p) = positions.iter().find(|p| **p >= size) {
            return Err(IndexError::PositionOutOfRange {
                position: p as i64,
                axis,
                size,
            });
        }
        let indexer: Vec<Option<usize>> = positions.iter().copied().map(Some).collect();
        self.gather(self.axes[axis].take(positions), &indexer, axis, &Value::Null)
    }

    fn reindex_indexer(
        &self,
        labels: LabelSet,
        indexer: &[Option<usize>],
        axis: usize,
        fill: &Value,
    ) -> Result<Self, IndexError> {
        let size = self.axis_len(axis)?;
        if labels.len() != indexer.len() {
            return Err(IndexError::DataLength {
                expected: labels.len(),
                got: indexer.len(),
                axis: Some(axis),
            });
        }
        if let Some(p) = indexer.iter().flatten().find(|p| **p >= size) {
            return Err(IndexError::PositionOutOfRange {
                position: *p as i64,
                axis,
                size,
            });
        }
        self.gather(labels, indexer, axis, fill)
    }

    fn set_axis(&self, labels: LabelSet, axis: usize) -> Result<Self, IndexError> {
        let size = self.axis_len(axis)?;
        if labels.len() != size {
            return Err(IndexError::DataLength {
                expected: size,
                got: labels.len(),
                axis: Some(axis),
            });
        }
        let mut out = self.clone();
        out.axes[axis] = labels;
        Ok(out)
    }

    fn ixs(&self, position: usize, axis: usize) -> Result<Selected<Self>, IndexError> {
        let size = self.axis_len(axis)?;
        if position >= size {
            return Err(IndexError::PositionOutOfRange {
                position: position as i64,
                axis,
                size,
            });
        }
        if self.ndim() == 1 {
            return Ok(Selected::Cell(self.values[position].clone()));
        }
        let section = self.slice.index(axis, position)?;
        let values = section.iter().map(|loc| self.values[loc].clone()).collect();
        let mut axes = self.axes.clone();
        axes.remove(axis);
        Ok(Selected::Data(Self::new(axes, values)?))
    }

    fn get_value(&self, coords: &[usize]) -> Result<Value, IndexError> {
        Ok(self.values[self.slice.location(coords)?].clone())
    }

    fn set_value(&mut self, coords: &[usize], value: Value) -> Result<(), IndexError> {
        let loc = self.slice.location(coords)?;
        self.values[loc] = value;
        Ok(())
    }

    fn setitem(&self, selectors: &[Selector], value: &Aligned) -> Result<Self, IndexError> {
        if selectors.len() != self.ndim() {
            return Err(IndexError::TooManyIndexers {
                got: selectors.len(),
                ndim: self.ndim(),
            });
        }
        let positions = selectors
            .iter()
            .enumerate()
            .map(|(axis, selector)| self.positions(selector, axis))
            .collect::<Result<Vec<_>, _>>()?;
        let selected: usize = positions.iter().map(Vec::len).product();
        let mut out = self.clone();
        match value {
            Aligned::Broadcast(value) => {
                for coord in positions.into_iter().multi_cartesian_product() {
                    out.set_value(&coord, value.clone())?;
                }
            }
            Aligned::Block { shape, values } => {
                if values.len() != selected {
                    return Err(IndexError::ValueShapeMismatch {
                        expected: izip!(selectors, &positions)
                            .filter(|(s, _)| !s.is_scalar())
                            .map(|(_, p)| p.len())
                            .collect(),
                        got: shape.clone(),
                        key: None,
                    });
                }
                for (coord, value) in izip!(positions.into_iter().multi_cartesian_product(), values) {
                    out.set_value(&coord, value.clone())?;
                }
            }
        }
        Ok(out)
    }

    fn notify_mutated(&mut self) {
        self.mutations += 1;
    }
}

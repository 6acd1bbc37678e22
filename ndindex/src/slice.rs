//! Strided layout of a dense multidimensional buffer.

use serde::Deserialize;
use serde::Serialize;

/// Errors produced by slice construction and lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SliceError {
    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("index {index} out of range {total}")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("value {value} not in slice")]
    ValueNotInSlice { value: usize },
}

/// A slice of a flat buffer described by an offset and per-dimension
/// sizes and strides. The location of coordinate `c` is `offset +
/// sum(c[i] * strides[i])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slice {
    offset: usize,
    sizes: Vec<usize>,
    strides: Vec<usize>,
}

impl Slice {
    pub fn new(offset: usize, sizes: Vec<usize>, strides: Vec<usize>) -> Result<Self, SliceError> {
        if sizes.len() != strides.len() {
            return Err(SliceError::InvalidDims {
                expected: sizes.len(),
                got: strides.len(),
            });
        }
        Ok(Self {
            offset,
            sizes,
            strides,
        })
    }

    /// A contiguous row-major slice over `sizes`: the last dimension
    /// varies fastest.
    pub fn new_row_major(sizes: impl Into<Vec<usize>>) -> Self {
        let sizes = sizes.into();
        let mut strides = vec![1; sizes.len()];
        for dim in (0..sizes.len().saturating_sub(1)).rev() {
            strides[dim] = strides[dim + 1] * sizes[dim + 1];
        }
        Self {
            offset: 0,
            sizes,
            strides,
        }
    }

    pub fn num_dim(&self) -> usize {
        self.sizes.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The flat location of `coord`.
    pub fn location(&self, coord: &[usize]) -> Result<usize, SliceError> {
        if coord.len() != self.num_dim() {
            return Err(SliceError::InvalidDims {
                expected: self.num_dim(),
                got: coord.len(),
            });
        }
        let mut location = self.offset;
        for ((index, size), stride) in coord.iter().zip(&self.sizes).zip(&self.strides) {
            if index >= size {
                return Err(SliceError::IndexOutOfRange {
                    index: *index,
                    total: *size,
                });
            }
            location += index * stride;
        }
        Ok(location)
    }

    /// The coordinates of the `rank`th element in row-major order.
    pub fn coordinates(&self, rank: usize) -> Result<Vec<usize>, SliceError> {
        if rank >= self.len() {
            return Err(SliceError::ValueNotInSlice { value: rank });
        }
        let mut coord = vec![0; self.num_dim()];
        let mut rest = rank;
        for dim in (0..self.num_dim()).rev() {
            coord[dim] = rest % self.sizes[dim];
            rest /= self.sizes[dim];
        }
        Ok(coord)
    }

    /// Fix dimension `dim` at `index`, removing it from the slice.
    pub fn index(&self, dim: usize, index: usize) -> Result<Slice, SliceError> {
        if dim >= self.num_dim() {
            return Err(SliceError::IndexOutOfRange {
                index: dim,
                total: self.num_dim(),
            });
        }
        if index >= self.sizes[dim] {
            return Err(SliceError::IndexOutOfRange {
                index,
                total: self.sizes[dim],
            });
        }
        let mut sizes = self.sizes.clone();
        let mut strides = self.strides.clone();
        let offset = self.offset + index * strides[dim];
        sizes.remove(dim);
        strides.remove(dim);
        Slice::new(offset, sizes, strides)
    }

    /// Iterate over the flat locations of this slice in row-major
    /// coordinate order.
    pub fn iter(&self) -> SliceIterator<'_> {
        SliceIterator {
            slice: self,
            rank: 0,
        }
    }
}

/// Iterator over the flat locations of a [`Slice`].
pub struct SliceIterator<'a> {
    slice: &'a Slice,
    rank: usize,
}

impl Iterator for SliceIterator<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let coord = self.slice.coordinates(self.rank).ok()?;
        self.rank += 1;
        self.slice.location(&coord).ok()
    }
}

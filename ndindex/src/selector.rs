//! Resolved, storage-agnostic descriptions of a subset of one axis.
//!
//! A [`Selector`] is the output of key resolution. By the time one is
//! built, every question of "label or position?" has been answered:
//! all variants speak positions, except [`Selector::MissingKey`], which
//! records a label that a write asked for but the axis does not have.

use std::fmt;

use enum_as_inner::EnumAsInner;
use serde::Deserialize;
use serde::Serialize;

use crate::label::Label;
use crate::labels::Loc;

/// A half-open range of positions with a stride. `Range(begin, None,
/// step)` runs to the end of the axis. Ranges are convertible from
/// native Rust ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range(pub usize, pub Option<usize>, pub usize);

impl Range {
    /// The null slice: every position of the axis.
    pub fn full() -> Self {
        Range(0, None, 1)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Range(0, None, 1))
    }

    /// Clamp this range to an axis of `size`, returning `(begin, end,
    /// step)` with `begin <= end <= size`.
    pub fn resolve(&self, size: usize) -> (usize, usize, usize) {
        let (begin, end) = match self {
            Range(begin, Some(end), _) => (*begin, std::cmp::min(size, *end)),
            Range(begin, None, _) => (*begin, size),
        };
        let begin = std::cmp::min(begin, end);
        (begin, end, std::cmp::max(self.2, 1))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Range(begin, Some(end), _) if end <= begin)
    }

    /// Number of positions this range selects on an axis of `size`.
    pub fn len(&self, size: usize) -> usize {
        let (begin, end, step) = self.resolve(size);
        (end - begin).div_ceil(step)
    }

    /// The positions this range selects on an axis of `size`.
    pub fn iter(&self, size: usize) -> impl Iterator<Item = usize> + use<> {
        let (begin, end, step) = self.resolve(size);
        (begin..end).step_by(step)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range(begin, None, stride) => write!(f, "{}::{}", begin, stride),
            Range(begin, Some(end), stride) => write!(f, "{}:{}:{}", begin, end, stride),
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self(r.start, Some(r.end), 1)
    }
}

impl From<std::ops::RangeInclusive<usize>> for Range {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Self(*r.start(), Some(*r.end() + 1), 1)
    }
}

impl From<std::ops::RangeFrom<usize>> for Range {
    fn from(r: std::ops::RangeFrom<usize>) -> Self {
        Self(r.start, None, 1)
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

/// A list selection in which some entries name labels absent from
/// the axis. `positions[i]` is `None` for those entries; `labels[i]`
/// is the label the result carries at `i` either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reindex {
    pub labels: Vec<Label>,
    pub positions: Vec<Option<usize>>,
}

/// A resolved selection along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Selector {
    /// A single position. The axis collapses when read.
    Position(usize),

    /// A strided range of positions.
    PositionSlice(Range),

    /// An explicit list of positions; may repeat entries.
    PositionList(Vec<usize>),

    /// One flag per axis position.
    BooleanMask(Vec<bool>),

    /// A list with absent entries, filled on read.
    Reindex(Reindex),

    /// A write targeting a label the axis does not have yet.
    MissingKey(Label),
}

impl Selector {
    /// The null slice.
    pub fn full() -> Self {
        Selector::PositionSlice(Range::full())
    }

    pub fn is_null_slice(&self) -> bool {
        matches!(self, Selector::PositionSlice(r) if r.is_full())
    }

    /// Whether reading this selector removes the axis.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Selector::Position(_))
    }

    /// The number of entries selected on an axis of `size`.
    pub fn len(&self, size: usize) -> usize {
        match self {
            Selector::Position(_) | Selector::MissingKey(_) => 1,
            Selector::PositionSlice(range) => range.len(size),
            Selector::PositionList(positions) => positions.len(),
            Selector::BooleanMask(mask) => mask.iter().filter(|b| **b).count(),
            Selector::Reindex(reindex) => reindex.positions.len(),
        }
    }

    /// The selected positions in order, `None` where the selection
    /// names something the axis does not hold.
    pub fn indexer(&self, size: usize) -> Vec<Option<usize>> {
        match self {
            Selector::Position(p) => vec![Some(*p)],
            Selector::PositionSlice(range) => range.iter(size).map(Some).collect(),
            Selector::PositionList(positions) => positions.iter().copied().map(Some).collect(),
            Selector::BooleanMask(mask) => mask
                .iter()
                .enumerate()
                .filter_map(|(i, b)| b.then_some(Some(i)))
                .collect(),
            Selector::Reindex(reindex) => reindex.positions.clone(),
            Selector::MissingKey(_) => vec![None],
        }
    }
}

impl From<Loc> for Selector {
    fn from(loc: Loc) -> Self {
        match loc {
            Loc::Position(p) => Selector::Position(p),
            Loc::Slice(range) => Selector::PositionSlice(range),
            Loc::Mask(mask) => Selector::BooleanMask(mask),
            Loc::Positions(positions) => Selector::PositionList(positions),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Position(p) => write!(f, "position({})", p),
            Selector::PositionSlice(range) => write!(f, "slice({})", range),
            Selector::PositionList(positions) => write!(f, "list({:?})", positions),
            Selector::BooleanMask(mask) => {
                write!(f, "mask({} of {})", mask.iter().filter(|b| **b).count(), mask.len())
            }
            Selector::Reindex(reindex) => write!(f, "reindex({:?})", reindex.positions),
            Selector::MissingKey(label) => write!(f, "missing({})", label),
        }
    }
}

// Compile-time check: selectors are thread-safe and fully owned.
fn _assert_selector_traits()
where
    Selector: Send + Sync + 'static,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_resolve() {
        assert_eq!(Range(1, Some(3), 1).iter(5).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(Range(1, Some(30), 1).iter(5).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(Range(0, None, 2).iter(5).collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(Range(7, None, 1).iter(5).count(), 0);
        assert_eq!(Range(0, None, 2).len(5), 3);
        assert_eq!(Range(4, Some(2), 1).len(5), 0);
        assert!(Range(4, Some(2), 1).is_empty());
        assert_eq!(Range::from(1..=2), Range(1, Some(3), 1));
        assert_eq!(Range::from(..), Range::full());
        assert_eq!(Range(1, None, 2).to_string(), "1::2");
    }

    #[test]
    fn test_selector_indexer() {
        assert_eq!(Selector::Position(2).indexer(4), vec![Some(2)]);
        assert_eq!(
            Selector::BooleanMask(vec![true, false, true]).indexer(3),
            vec![Some(0), Some(2)]
        );
        assert_eq!(Selector::full().len(4), 4);
        assert!(Selector::full().is_null_slice());
        assert!(!Selector::PositionSlice(Range(0, Some(4), 1)).is_null_slice());
        assert_eq!(Selector::MissingKey("x".into()).indexer(4), vec![None]);
        assert_eq!(
            Selector::Reindex(Reindex {
                labels: vec!["a".into(), "z".into()],
                positions: vec![Some(0), None],
            })
            .len(4),
            2
        );
    }
}

//! Ordered label sets: the per-axis lookup structure consumed by key
//! resolution.
//!
//! A [`LabelSet`] is immutable once constructed and cheap to clone
//! (the labels are shared). Derived properties (uniqueness, inferred
//! kind, monotonicity, and the hashed lookup table) are computed on
//! first use and cached on the instance. Operations that relabel an
//! axis, such as [`LabelSet::append`], return a new set.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;

use enum_as_inner::EnumAsInner;
use serde::Deserialize;
use serde::Serialize;

use crate::label::Label;
use crate::label::LabelDtype;
use crate::label::LabelKind;
use crate::selector::Range;

/// Errors raised by label-set lookups. These carry no axis; the
/// resolver attaches one when converting to [`crate::IndexError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LabelError {
    #[error("slice bound {0} is not in the labels")]
    MissingBound(Label),

    #[error("slice bound {0} is not unique in unsorted labels")]
    NonUniqueBound(Label),

    #[error("labels are not sorted; cannot slice on {0}")]
    Unsorted(Label),

    #[error("cannot reindex from non-unique labels")]
    NonUnique,

    #[error("slice step cannot be zero")]
    ZeroStep,
}

/// The result of locating a label.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Loc {
    /// The label occurs exactly once.
    Position(usize),
    /// The label occupies a contiguous run (or a slice was requested).
    Slice(Range),
    /// The label occurs at scattered positions.
    Mask(Vec<bool>),
    /// An explicit ordering, as produced by reversed slices.
    Positions(Vec<usize>),
}

/// The output of [`LabelSet::get_indexer_non_unique`].
#[derive(Debug, Clone, PartialEq)]
pub struct NonUniqueIndexer {
    /// Every matching position for each target in turn; a single
    /// `None` for targets not found.
    pub indexer: Vec<Option<usize>>,
    /// Indices into the targets of those not found.
    pub missing: Vec<usize>,
}

struct Inner {
    labels: Vec<Label>,
    dtype: LabelDtype,
    kind: OnceLock<LabelKind>,
    unique: OnceLock<bool>,
    monotonic: OnceLock<bool>,
    nlevels: OnceLock<usize>,
    lookup: OnceLock<HashMap<Label, Vec<usize>>>,
}

/// An ordered sequence of labels for one axis.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "LabelSetRepr", into = "LabelSetRepr")]
pub struct LabelSet {
    inner: Arc<Inner>,
}

#[derive(Serialize, Deserialize)]
struct LabelSetRepr {
    labels: Vec<Label>,
    dtype: LabelDtype,
}

impl From<LabelSetRepr> for LabelSet {
    fn from(repr: LabelSetRepr) -> Self {
        LabelSet::with_dtype(repr.labels, repr.dtype)
    }
}

impl From<LabelSet> for LabelSetRepr {
    fn from(set: LabelSet) -> Self {
        LabelSetRepr {
            labels: set.labels().to_vec(),
            dtype: set.dtype(),
        }
    }
}

impl LabelSet {
    /// Creates a label set using the narrowest dtype that holds all
    /// of `labels`.
    pub fn new(labels: Vec<Label>) -> Self {
        let dtype = LabelDtype::for_labels(&labels);
        Self::from_parts(labels, dtype)
    }

    /// Creates a label set with the given dtype, coercing labels into
    /// it. If some label does not fit, the set falls back to
    /// [`LabelDtype::Object`].
    pub fn with_dtype(labels: Vec<Label>, dtype: LabelDtype) -> Self {
        if labels.iter().all(|l| dtype.can_hold(l)) {
            let labels = labels.into_iter().map(|l| dtype.coerce(l)).collect();
            Self::from_parts(labels, dtype)
        } else {
            Self::from_parts(labels, LabelDtype::Object)
        }
    }

    /// Integer labels `0..n`.
    pub fn range(n: usize) -> Self {
        Self::from_parts((0..n).map(Label::from).collect(), LabelDtype::Int64)
    }

    fn from_parts(labels: Vec<Label>, dtype: LabelDtype) -> Self {
        Self {
            inner: Arc::new(Inner {
                labels,
                dtype,
                kind: OnceLock::new(),
                unique: OnceLock::new(),
                monotonic: OnceLock::new(),
                nlevels: OnceLock::new(),
                lookup: OnceLock::new(),
            }),
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.inner.labels
    }

    pub fn len(&self) -> usize {
        self.inner.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.labels.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Label> {
        self.inner.labels.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.inner.labels.iter()
    }

    pub fn dtype(&self) -> LabelDtype {
        self.inner.dtype
    }

    /// The kind inferred from the labels (e.g. "integer", "mixed").
    pub fn inferred_kind(&self) -> LabelKind {
        *self
            .inner
            .kind
            .get_or_init(|| LabelKind::infer(&self.inner.labels))
    }

    pub fn is_unique(&self) -> bool {
        *self
            .inner
            .unique
            .get_or_init(|| self.lookup().values().all(|p| p.len() == 1))
    }

    /// Whether labels never decrease. Sets holding incomparable
    /// labels are not monotonic.
    pub fn is_monotonic_increasing(&self) -> bool {
        *self.inner.monotonic.get_or_init(|| {
            self.inner.labels.windows(2).all(|w| {
                matches!(
                    w[0].compare(&w[1]),
                    Some(Ordering::Less | Ordering::Equal)
                )
            })
        })
    }

    /// The number of levels: greater than one only when every label
    /// is a tuple of the same arity.
    pub fn nlevels(&self) -> usize {
        *self.inner.nlevels.get_or_init(|| {
            let Some(first) = self.inner.labels.first() else {
                return 1;
            };
            let n = first.nlevels();
            if n > 1
                && self
                    .inner
                    .labels
                    .iter()
                    .all(|l| l.is_tuple() && l.nlevels() == n)
            {
                n
            } else {
                1
            }
        })
    }

    pub fn is_hierarchical(&self) -> bool {
        self.nlevels() > 1
    }

    /// The kind of the labels at `level` of a hierarchical set.
    pub fn level_kind(&self, level: usize) -> LabelKind {
        if !self.is_hierarchical() {
            return self.inferred_kind();
        }
        let values: Vec<&Label> = self
            .inner
            .labels
            .iter()
            .filter_map(|l| match l {
                Label::Tuple(levels) => levels.get(level),
                _ => None,
            })
            .collect();
        LabelKind::infer(values)
    }

    fn lookup(&self) -> &HashMap<Label, Vec<usize>> {
        self.inner.lookup.get_or_init(|| {
            let mut lookup: HashMap<Label, Vec<usize>> = HashMap::new();
            for (i, label) in self.inner.labels.iter().enumerate() {
                lookup.entry(label.canonical()).or_default().push(i);
            }
            lookup
        })
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.get_loc(label).is_some()
    }

    /// Locate `label`. On hierarchical sets a flat label or a shorter
    /// tuple is a partial key matching every label with that prefix.
    pub fn get_loc(&self, label: &Label) -> Option<Loc> {
        if self.is_hierarchical() && label.nlevels() < self.nlevels() {
            let positions: Vec<usize> = self
                .inner
                .labels
                .iter()
                .enumerate()
                .filter_map(|(i, l)| l.has_prefix(label).then_some(i))
                .collect();
            return self.positions_to_loc(positions, true);
        }
        let positions = self.lookup().get(&label.canonical())?;
        self.positions_to_loc(positions.clone(), false)
    }

    fn positions_to_loc(&self, positions: Vec<usize>, partial: bool) -> Option<Loc> {
        let (first, last) = (*positions.first()?, *positions.last()?);
        if positions.len() == 1 && !partial {
            Some(Loc::Position(first))
        } else if last - first + 1 == positions.len() {
            Some(Loc::Slice(Range(first, Some(last + 1), 1)))
        } else {
            let mut mask = vec![false; self.len()];
            for p in positions {
                mask[p] = true;
            }
            Some(Loc::Mask(mask))
        }
    }

    /// The position of each target in a unique label set.
    pub fn get_indexer(&self, targets: &[Label]) -> Result<Vec<Option<usize>>, LabelError> {
        if !self.is_unique() {
            return Err(LabelError::NonUnique);
        }
        let lookup = self.lookup();
        Ok(targets
            .iter()
            .map(|t| lookup.get(&t.canonical()).map(|p| p[0]))
            .collect())
    }

    /// Like [`LabelSet::get_indexer`], but tolerates duplicates: each
    /// target expands to all of its positions.
    pub fn get_indexer_non_unique(&self, targets: &[Label]) -> NonUniqueIndexer {
        let lookup = self.lookup();
        let mut indexer = Vec::with_capacity(targets.len());
        let mut missing = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            match lookup.get(&target.canonical()) {
                Some(positions) => indexer.extend(positions.iter().copied().map(Some)),
                None => {
                    indexer.push(None);
                    missing.push(i);
                }
            }
        }
        NonUniqueIndexer { indexer, missing }
    }

    /// Positions for the inclusive label slice `start..=stop`.
    ///
    /// Sorted sets bisect, so bounds need not be present. Unsorted
    /// sets require each given bound to be present, and unique or
    /// occupying a contiguous run. Hierarchical sets must be sorted;
    /// their bounds may be partial keys.
    pub fn slice_indexer(
        &self,
        start: Option<&Label>,
        stop: Option<&Label>,
        step: Option<i64>,
    ) -> Result<Loc, LabelError> {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(LabelError::ZeroStep);
        }
        if step < 0 {
            // Reversed: `start` is the later bound.
            let end = match start {
                Some(label) => self.bound(label, false)?,
                None => self.len(),
            };
            let lo = match stop {
                Some(label) => self.bound(label, true)?,
                None => 0,
            };
            let positions = (lo..end)
                .rev()
                .step_by(step.unsigned_abs() as usize)
                .collect();
            return Ok(Loc::Positions(positions));
        }
        let begin = match start {
            Some(label) => self.bound(label, true)?,
            None => 0,
        };
        let end = match stop {
            Some(label) => self.bound(label, false)?,
            None => self.len(),
        };
        Ok(Loc::Slice(Range(
            begin,
            Some(std::cmp::max(begin, end)),
            step as usize,
        )))
    }

    // The left edge (`left`) or the one-past-the-right edge of `label`.
    fn bound(&self, label: &Label, left: bool) -> Result<usize, LabelError> {
        if self.is_hierarchical() {
            if !self.is_monotonic_increasing() {
                return Err(LabelError::Unsorted(label.clone()));
            }
            let depth = label.nlevels();
            return Ok(self.bisect(label, left, |l| truncate(l, depth)));
        }
        if self.is_monotonic_increasing() && self.comparable(label) {
            return Ok(self.bisect(label, left, Clone::clone));
        }
        match self.get_loc(label) {
            Some(Loc::Position(p)) => Ok(if left { p } else { p + 1 }),
            Some(Loc::Slice(Range(begin, Some(end), _))) => Ok(if left { begin } else { end }),
            Some(_) => Err(LabelError::NonUniqueBound(label.clone())),
            None => Err(LabelError::MissingBound(label.clone())),
        }
    }

    fn comparable(&self, label: &Label) -> bool {
        self.inner
            .labels
            .first()
            .is_none_or(|l| l.compare(label).is_some())
    }

    fn bisect(&self, label: &Label, left: bool, key: impl Fn(&Label) -> Label) -> usize {
        self.inner.labels.partition_point(|l| {
            match key(l).compare(label) {
                Some(Ordering::Less) => true,
                Some(Ordering::Equal) => !left,
                _ => false,
            }
        })
    }

    /// The labels at `positions`, keeping the dtype.
    pub fn take(&self, positions: &[usize]) -> LabelSet {
        let labels = positions
            .iter()
            .filter_map(|p| self.inner.labels.get(*p).cloned())
            .collect();
        Self::from_parts(labels, self.dtype())
    }

    /// A new set with `label` appended at the end. If the dtype cannot
    /// hold the label, the new set is demoted to
    /// [`LabelDtype::Object`].
    pub fn append(&self, label: Label) -> LabelSet {
        let dtype = if self.is_empty() {
            LabelDtype::for_labels([&label])
        } else if self.dtype().can_hold(&label) {
            self.dtype()
        } else {
            LabelDtype::Object
        };
        let mut labels = self.inner.labels.clone();
        labels.push(dtype.coerce(label));
        Self::from_parts(labels, dtype)
    }

    /// Drop the `n` outermost levels of a hierarchical set. Dropping
    /// every level leaves the set unchanged.
    pub fn droplevels(&self, n: usize) -> LabelSet {
        let nlevels = self.nlevels();
        if n == 0 || n >= nlevels {
            return self.clone();
        }
        let labels = self
            .inner
            .labels
            .iter()
            .map(|l| match l {
                Label::Tuple(levels) if nlevels - n == 1 => levels[n].clone(),
                Label::Tuple(levels) => Label::Tuple(levels[n..].to_vec()),
                other => other.clone(),
            })
            .collect();
        LabelSet::new(labels)
    }
}

fn truncate(label: &Label, depth: usize) -> Label {
    match label {
        Label::Tuple(levels) if depth == 1 => levels[0].clone(),
        Label::Tuple(levels) if depth < levels.len() => Label::Tuple(levels[..depth].to_vec()),
        other => other.clone(),
    }
}

impl PartialEq for LabelSet {
    /// Label sets are equal when they hold equal labels in the same
    /// order; `1` and `1.0` compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.canonical() == b.canonical())
    }
}

impl fmt::Debug for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LabelSet({})", self)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, label) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", label)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<Label>> for LabelSet {
    fn from(labels: Vec<Label>) -> Self {
        LabelSet::new(labels)
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        LabelSet::new(iter.into_iter().collect())
    }
}

/// Construct a [`LabelSet`] from a list of values convertible into
/// [`Label`]s.
///
/// ```
/// let labels = ndindex::labels![10, 20, 30];
/// assert_eq!(labels.len(), 3);
/// assert_eq!(labels.inferred_kind(), ndindex::LabelKind::Integer);
/// ```
#[macro_export]
macro_rules! labels {
    ( $( $label:expr ),* $(,)? ) => {
        $crate::LabelSet::new(vec![ $( $crate::Label::from($label) ),* ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels;

    #[test]
    fn test_basic() {
        let set = labels![10, 20, 30];
        assert_eq!(set.len(), 3);
        assert_eq!(set.dtype(), LabelDtype::Int64);
        assert_eq!(set.inferred_kind(), LabelKind::Integer);
        assert!(set.is_unique());
        assert!(set.is_monotonic_increasing());
        assert_eq!(set.to_string(), "[10, 20, 30]");
        assert_eq!(set.get_loc(&20.into()), Some(Loc::Position(1)));
        assert_eq!(set.get_loc(&20.0.into()), Some(Loc::Position(1)));
        assert_eq!(set.get_loc(&1.into()), None);
    }

    #[test]
    fn test_get_loc_non_unique() {
        let set = labels!["a", "b", "b", "c", "a"];
        assert!(!set.is_unique());
        assert_eq!(set.get_loc(&"b".into()), Some(Loc::Slice(Range(1, Some(3), 1))));
        assert_eq!(
            set.get_loc(&"a".into()),
            Some(Loc::Mask(vec![true, false, false, false, true]))
        );
    }

    #[test]
    fn test_get_loc_hierarchical() {
        let set = labels![("a", 1), ("a", 2), ("b", 1)];
        assert_eq!(set.nlevels(), 2);
        assert_eq!(set.get_loc(&("a", 2).into()), Some(Loc::Position(1)));
        assert_eq!(set.get_loc(&"a".into()), Some(Loc::Slice(Range(0, Some(2), 1))));
        assert_eq!(set.get_loc(&"b".into()), Some(Loc::Slice(Range(2, Some(3), 1))));
        assert_eq!(set.get_loc(&"z".into()), None);
        assert_eq!(set.level_kind(1), LabelKind::Integer);
        assert_eq!(set.droplevels(1), labels![1, 2, 1]);
    }

    #[test]
    fn test_get_indexer() {
        let set = labels!["a", "b", "c"];
        assert_eq!(
            set.get_indexer(&["c".into(), "z".into()]).unwrap(),
            vec![Some(2), None]
        );
        let dups = labels!["a", "b", "a"];
        assert_eq!(dups.get_indexer(&["a".into()]), Err(LabelError::NonUnique));
        assert_eq!(
            dups.get_indexer_non_unique(&["a".into(), "z".into(), "b".into()]),
            NonUniqueIndexer {
                indexer: vec![Some(0), Some(2), None, Some(1)],
                missing: vec![1],
            }
        );
    }

    #[test]
    fn test_slice_indexer_sorted() {
        let set = labels!["a", "c", "e", "g"];
        assert_eq!(
            set.slice_indexer(Some(&"c".into()), Some(&"e".into()), None),
            Ok(Loc::Slice(Range(1, Some(3), 1)))
        );
        // Absent bounds bisect on sorted labels.
        assert_eq!(
            set.slice_indexer(Some(&"b".into()), Some(&"f".into()), None),
            Ok(Loc::Slice(Range(1, Some(3), 1)))
        );
        assert_eq!(
            set.slice_indexer(None, Some(&"c".into()), None),
            Ok(Loc::Slice(Range(0, Some(2), 1)))
        );
        assert_eq!(
            set.slice_indexer(Some(&"e".into()), None, Some(-1)),
            Ok(Loc::Positions(vec![2, 1, 0]))
        );
        assert_eq!(set.slice_indexer(None, None, Some(0)), Err(LabelError::ZeroStep));
    }

    #[test]
    fn test_slice_indexer_unsorted() {
        let set = labels!["d", "a", "c", "b"];
        assert_eq!(
            set.slice_indexer(Some(&"a".into()), Some(&"b".into()), None),
            Ok(Loc::Slice(Range(1, Some(4), 1)))
        );
        assert_eq!(
            set.slice_indexer(Some(&"x".into()), None, None),
            Err(LabelError::MissingBound("x".into()))
        );
        let dups = labels!["b", "a", "b"];
        assert_eq!(
            dups.slice_indexer(Some(&"b".into()), None, None),
            Err(LabelError::NonUniqueBound("b".into()))
        );
    }

    #[test]
    fn test_slice_indexer_hierarchical() {
        let set = labels![("a", 1), ("a", 2), ("b", 1), ("c", 1)];
        assert_eq!(
            set.slice_indexer(Some(&"a".into()), Some(&"b".into()), None),
            Ok(Loc::Slice(Range(0, Some(3), 1)))
        );
        let unsorted = labels![("b", 1), ("a", 2)];
        assert_eq!(
            unsorted.slice_indexer(Some(&"a".into()), None, None),
            Err(LabelError::Unsorted("a".into()))
        );
    }

    #[test]
    fn test_append_demotes() {
        let set = labels![1, 2];
        let grown = set.append(3.into());
        assert_eq!(grown.dtype(), LabelDtype::Int64);
        let demoted = set.append("x".into());
        assert_eq!(demoted.dtype(), LabelDtype::Object);
        assert_eq!(demoted.inferred_kind(), LabelKind::MixedInteger);
        assert_eq!(set.len(), 2);

        let floats = LabelSet::with_dtype(vec![1.5.into()], LabelDtype::Float64);
        assert_eq!(floats.append(2.into()).get(1), Some(&Label::Float(2.0)));
    }
}

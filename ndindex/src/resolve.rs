//! Resolution of one key against one axis.

use crate::config::IndexOpts;
use crate::error::IndexError;
use crate::key::Key;
use crate::key::Mask;
use crate::key::SliceKey;
use crate::label::Label;
use crate::label::LabelKind;
use crate::labels::LabelSet;
use crate::policy::Policy;
use crate::selector::Range;
use crate::selector::Reindex;
use crate::selector::Selector;

/// Whether a key is being resolved to read or to write. Writes may
/// name labels the axis lacks; those resolve to
/// [`Selector::MissingKey`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// Turns a [`Key`] into a [`Selector`] for one axis, interpreting it
/// under an accessor [`Policy`].
#[derive(Debug, Clone, Copy)]
pub struct KeyResolver<'a> {
    policy: Policy,
    opts: &'a IndexOpts,
}

impl<'a> KeyResolver<'a> {
    pub fn new(policy: Policy, opts: &'a IndexOpts) -> Self {
        Self { policy, opts }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn opts(&self) -> &'a IndexOpts {
        self.opts
    }

    /// Resolve `key` against `labels`, the labels of `axis`.
    pub fn resolve(
        &self,
        key: &Key,
        axis: usize,
        labels: &LabelSet,
        mode: Mode,
    ) -> Result<Selector, IndexError> {
        self.policy.validate(key, axis, labels)?;
        let selector = match key {
            Key::Scalar(label) => self.resolve_scalar(label, axis, labels, mode),
            Key::Slice(slice) => self.resolve_slice(key, slice, axis, labels),
            Key::List(list) => self.resolve_list(list, axis, labels, mode),
            Key::Mask(mask) => self.resolve_mask(mask, axis, labels),
            Key::Tuple(keys) => {
                // Validation admits tuples only as one multi-level label.
                let levels = keys
                    .iter()
                    .filter_map(|k| k.as_scalar().cloned())
                    .collect();
                self.lookup(&Label::Tuple(levels), axis, labels, mode)
            }
        }?;
        tracing::trace!(axis, %key, %selector, policy = %self.policy, "resolved key");
        Ok(selector)
    }

    fn resolve_scalar(
        &self,
        label: &Label,
        axis: usize,
        labels: &LabelSet,
        mode: Mode,
    ) -> Result<Selector, IndexError> {
        match (self.policy, label) {
            (Policy::Position, Label::Int(i)) => self.position(*i, axis, labels.len(), mode),
            (Policy::Legacy, Label::Int(i)) if integer_is_position(label, labels) => {
                self.position(*i, axis, labels.len(), mode)
            }
            _ => self.lookup(label, axis, labels, mode),
        }
    }

    fn lookup(
        &self,
        label: &Label,
        axis: usize,
        labels: &LabelSet,
        mode: Mode,
    ) -> Result<Selector, IndexError> {
        match (labels.get_loc(label), mode) {
            (Some(loc), _) => Ok(loc.into()),
            (None, Mode::Read) => Err(IndexError::KeyNotFound {
                key: label.clone(),
                axis,
            }),
            (None, Mode::Write) => Ok(Selector::MissingKey(label.clone())),
        }
    }

    fn position(&self, i: i64, axis: usize, size: usize, mode: Mode) -> Result<Selector, IndexError> {
        self.checked_position(i, axis, size, mode).map(Selector::Position)
    }

    // A possibly negative position, checked against the axis.
    fn checked_position(&self, i: i64, axis: usize, size: usize, mode: Mode) -> Result<usize, IndexError> {
        let p = if i < 0 { i + size as i64 } else { i };
        if (0..size as i64).contains(&p) {
            return Ok(p as usize);
        }
        Err(self.out_of_range(i, axis, size, mode))
    }

    fn out_of_range(&self, position: i64, axis: usize, size: usize, mode: Mode) -> IndexError {
        match (self.policy, mode) {
            (Policy::Position, Mode::Write) => IndexError::CannotEnlarge {
                policy: self.policy,
                axes: vec![axis],
            },
            _ => IndexError::PositionOutOfRange {
                position,
                axis,
                size,
            },
        }
    }

    fn resolve_slice(
        &self,
        key: &Key,
        slice: &SliceKey,
        axis: usize,
        labels: &LabelSet,
    ) -> Result<Selector, IndexError> {
        if slice.is_null() {
            return Ok(Selector::full());
        }
        match self.policy {
            Policy::Position => return self.position_slice(slice, axis, labels.len()),
            Policy::Label => return self.label_slice(slice, axis, labels),
            Policy::Legacy => {}
        }

        let kind = labels.inferred_kind();
        let tolerance = self.opts.float_tolerance;
        let float_slice = kind == LabelKind::Floating && slice.is_float_slice();
        let mut positional = slice.is_index_slice(tolerance)
            && kind != LabelKind::Integer
            && !labels.is_hierarchical()
            && !float_slice;

        if positional && kind.is_mixed() {
            let resolves = [&slice.start, &slice.stop]
                .into_iter()
                .flatten()
                .any(|bound| labels.contains(bound));
            if resolves {
                tracing::debug!(axis, %key, %kind, "slice bound found as a label; slicing by label");
                positional = false;
            } else if kind == LabelKind::MixedIntegerFloat {
                return Err(IndexError::AmbiguousIndexer {
                    key: key.clone(),
                    axis,
                    kind,
                });
            }
        }

        if positional {
            tracing::debug!(axis, %key, %kind, "slicing by position");
            return self.position_slice(slice, axis, labels.len());
        }

        let start = slice.start.as_ref();
        let stop = slice.stop.as_ref();
        match labels.slice_indexer(start, stop, slice.step) {
            Ok(loc) => Ok(loc.into()),
            Err(err) if slice.is_index_slice(tolerance) && kind != LabelKind::Integer => {
                tracing::debug!(axis, %key, %err, "label slice failed; slicing by position");
                self.position_slice(slice, axis, labels.len())
            }
            Err(err) => Err(err.at_axis(axis, self.policy)),
        }
    }

    fn label_slice(&self, slice: &SliceKey, axis: usize, labels: &LabelSet) -> Result<Selector, IndexError> {
        labels
            .slice_indexer(slice.start.as_ref(), slice.stop.as_ref(), slice.step)
            .map(Selector::from)
            .map_err(|err| err.at_axis(axis, self.policy))
    }

    /// Half-open position slice; bounds count from the end when
    /// negative and clamp to the axis.
    fn position_slice(&self, slice: &SliceKey, axis: usize, size: usize) -> Result<Selector, IndexError> {
        let tolerance = self.opts.float_tolerance;
        let bound = |label: &Option<Label>| -> Result<Option<i64>, IndexError> {
            match label {
                None => Ok(None),
                Some(label) => label.as_position(tolerance).map(Some).ok_or_else(|| {
                    IndexError::InvalidKey {
                        key: Key::Slice(slice.clone()),
                        axis,
                        policy: self.policy,
                        expected: "integer slice bounds",
                    }
                }),
            }
        };
        let (start, stop) = (bound(&slice.start)?, bound(&slice.stop)?);
        let step = slice.step.unwrap_or(1);
        let n = size as i64;

        if step == 0 {
            return Err(IndexError::InvalidKey {
                key: Key::Slice(slice.clone()),
                axis,
                policy: self.policy,
                expected: "a non-zero slice step",
            });
        }

        if step > 0 {
            let clamp = |b: i64| (if b < 0 { b + n } else { b }).clamp(0, n) as usize;
            let begin = start.map_or(0, clamp);
            let end = stop.map_or(size, clamp);
            return Ok(Selector::PositionSlice(Range(
                begin,
                Some(end.max(begin)),
                step as usize,
            )));
        }

        // Reversed: walk down from `start` to just above `stop`.
        let clamp = |b: i64| (if b < 0 { b + n } else { b }).clamp(-1, n - 1);
        let first = start.map_or(n - 1, clamp);
        let last = stop.map_or(-1, clamp);
        let positions = (last + 1..=first)
            .rev()
            .step_by(step.unsigned_abs() as usize)
            .map(|p| p as usize)
            .collect();
        Ok(Selector::PositionList(positions))
    }

    fn resolve_mask(&self, mask: &Mask, axis: usize, labels: &LabelSet) -> Result<Selector, IndexError> {
        let values = match &mask.labels {
            Some(own) if own != labels => {
                if own.len() != mask.values.len() {
                    return Err(IndexError::DataLength {
                        expected: own.len(),
                        got: mask.values.len(),
                        axis: Some(axis),
                    });
                }
                let indexer = own
                    .get_indexer(labels.labels())
                    .map_err(|_| IndexError::UnalignableBooleanKey { axis })?;
                indexer
                    .into_iter()
                    .map(|p| {
                        p.map(|p| mask.values[p])
                            .ok_or(IndexError::UnalignableBooleanKey { axis })
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            _ => mask.values.clone(),
        };
        if values.len() != labels.len() {
            return Err(IndexError::BooleanMaskLength {
                axis,
                expected: labels.len(),
                got: values.len(),
            });
        }
        Ok(Selector::BooleanMask(values))
    }

    fn resolve_list(
        &self,
        list: &[Label],
        axis: usize,
        labels: &LabelSet,
        mode: Mode,
    ) -> Result<Selector, IndexError> {
        let positional = match self.policy {
            Policy::Position => true,
            Policy::Label => false,
            Policy::Legacy => list_is_positional(list, labels),
        };
        if positional {
            let positions = list
                .iter()
                .map(|label| match label {
                    Label::Int(i) => self.checked_position(*i, axis, labels.len(), mode),
                    _ => Err(IndexError::KeyNotFound {
                        key: label.clone(),
                        axis,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Selector::PositionList(positions));
        }

        let mut positions = Vec::with_capacity(list.len());
        let mut result = Vec::with_capacity(list.len());
        let mut missing = None;
        for target in list {
            let found: Vec<usize> = if labels.is_hierarchical() && target.nlevels() < labels.nlevels() {
                labels
                    .get_loc(target)
                    .map(|loc| Selector::from(loc).indexer(labels.len()))
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .collect()
            } else {
                labels
                    .get_indexer_non_unique(std::slice::from_ref(target))
                    .indexer
                    .into_iter()
                    .flatten()
                    .collect()
            };
            if found.is_empty() {
                missing.get_or_insert_with(|| target.clone());
                positions.push(None);
                result.push(target.clone());
            } else {
                result.extend(found.iter().filter_map(|p| labels.get(*p).cloned()));
                positions.extend(found.into_iter().map(Some));
            }
        }

        match missing {
            None => Ok(Selector::PositionList(positions.into_iter().flatten().collect())),
            Some(_) if self.policy == Policy::Legacy && mode == Mode::Read => {
                tracing::debug!(axis, "list has labels absent from the axis; reindexing");
                Ok(Selector::Reindex(Reindex {
                    labels: result,
                    positions,
                }))
            }
            Some(key) => Err(IndexError::KeyNotFound { key, axis }),
        }
    }
}

/// Under the legacy policy, whether an integer scalar is a position.
/// Integer-like axes read it as a label; a hierarchical axis reads it
/// as a level-0 label when present or when level 0 is integer-like.
fn integer_is_position(label: &Label, labels: &LabelSet) -> bool {
    if labels.is_hierarchical() {
        !labels.contains(label) && !labels.level_kind(0).is_integer_like()
    } else {
        !labels.inferred_kind().is_integer_like()
    }
}

/// Under the legacy policy, whether a list holds positions: it must
/// be all integers on an axis that is not integer-like. On a
/// mixed-integer axis, a list naming only existing labels is labels.
fn list_is_positional(list: &[Label], labels: &LabelSet) -> bool {
    if list.is_empty() || !list.iter().all(Label::is_integer) {
        return false;
    }
    let kind = if labels.is_hierarchical() {
        labels.level_kind(0)
    } else {
        labels.inferred_kind()
    };
    if kind.is_integer_like() {
        return false;
    }
    !(kind == LabelKind::MixedInteger && list.iter().all(|l| labels.contains(l)))
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::labels;

    fn resolver(policy: Policy, opts: &IndexOpts) -> KeyResolver<'_> {
        KeyResolver::new(policy, opts)
    }

    #[test]
    fn test_integer_axis_scalar() {
        let opts = IndexOpts::default();
        let labels = labels![10, 20, 30];
        let key = Key::from(1);
        assert_eq!(
            resolver(Policy::Position, &opts).resolve(&key, 0, &labels, Mode::Read).unwrap(),
            Selector::Position(1)
        );
        assert_eq!(
            resolver(Policy::Label, &opts)
                .resolve(&20.into(), 0, &labels, Mode::Read)
                .unwrap(),
            Selector::Position(1)
        );
        let result = resolver(Policy::Legacy, &opts).resolve(&key, 0, &labels, Mode::Read);
        assert!(
            matches!(result, Err(IndexError::KeyNotFound { ref key, axis: 0 }) if *key == Label::Int(1)),
            "Unexpected: {:?}",
            result
        );
        assert_eq!(
            resolver(Policy::Legacy, &opts).resolve(&key, 0, &labels, Mode::Write).unwrap(),
            Selector::MissingKey(1.into())
        );
    }

    #[test]
    fn test_legacy_positions_on_string_axis() {
        let opts = IndexOpts::default();
        let legacy = resolver(Policy::Legacy, &opts);
        let labels = labels!["a", "b", "c"];
        assert_eq!(
            legacy.resolve(&(-1).into(), 0, &labels, Mode::Read).unwrap(),
            Selector::Position(2)
        );
        assert!(matches!(
            legacy.resolve(&3.into(), 0, &labels, Mode::Read),
            Err(IndexError::PositionOutOfRange { position: 3, axis: 0, size: 3 })
        ));
        assert_eq!(
            legacy.resolve(&Key::list([2, 0]), 0, &labels, Mode::Read).unwrap(),
            Selector::PositionList(vec![2, 0])
        );
        assert_eq!(
            legacy.resolve(&"b".into(), 0, &labels, Mode::Read).unwrap(),
            Selector::Position(1)
        );
    }

    #[test]
    fn test_position_policy() {
        let opts = IndexOpts::default();
        let iloc = resolver(Policy::Position, &opts);
        let labels = labels!["a", "b", "c"];
        assert!(matches!(
            iloc.resolve(&5.into(), 0, &labels, Mode::Read),
            Err(IndexError::PositionOutOfRange { position: 5, .. })
        ));
        assert!(matches!(
            iloc.resolve(&5.into(), 0, &labels, Mode::Write),
            Err(IndexError::CannotEnlarge { policy: Policy::Position, .. })
        ));
        assert!(matches!(
            iloc.resolve(&"a".into(), 0, &labels, Mode::Read),
            Err(IndexError::InvalidKey { policy: Policy::Position, .. })
        ));
        assert!(matches!(
            iloc.resolve(&Key::list([0, 7]), 0, &labels, Mode::Read),
            Err(IndexError::PositionOutOfRange { position: 7, .. })
        ));
        assert!(matches!(
            iloc.resolve(&Key::labeled_mask([true, false, true], labels.clone()), 0, &labels, Mode::Read),
            Err(IndexError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_position_slices() {
        let opts = IndexOpts::default();
        let iloc = resolver(Policy::Position, &opts);
        let labels = LabelSet::range(5);
        let resolve = |key: Key| {
            let selector = iloc.resolve(&key, 0, &labels, Mode::Read).unwrap();
            selector.indexer(5).into_iter().flatten().collect::<Vec<_>>()
        };
        assert_eq!(resolve(Key::from(1..3)), vec![1, 2]);
        assert_eq!(resolve(Key::from(-2..)), vec![3, 4]);
        assert_eq!(resolve(Key::from(..40)), vec![0, 1, 2, 3, 4]);
        assert_eq!(resolve(Key::from(4..1)), Vec::<usize>::new());
        assert_eq!(resolve(Key::slice_step(None, None, -2)), vec![4, 2, 0]);
        assert_eq!(resolve(Key::slice_step(Some(3.into()), Some(0.into()), -1)), vec![3, 2, 1]);
        assert_eq!(resolve(Key::slice_step(Some(9.into()), None, -3)), vec![4, 1]);
        assert!(matches!(
            iloc.resolve(&Key::slice_step(None, None, 0), 0, &labels, Mode::Read),
            Err(IndexError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_label_slices() {
        let opts = IndexOpts::default();
        let loc = resolver(Policy::Label, &opts);
        let labels = labels!["a", "b", "c", "d"];
        assert_eq!(
            loc.resolve(&Key::between("b", "c"), 0, &labels, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(1, Some(3), 1))
        );
        assert!(matches!(
            loc.resolve(&Key::between("b", "z"), 0, &labels, Mode::Read),
            Err(IndexError::KeyNotFound { axis: 0, .. })
        ));

        let unsorted = labels!["b", "a", "b"];
        assert!(matches!(
            loc.resolve(&Key::between("b", "a"), 0, &unsorted, Mode::Read),
            Err(IndexError::KeyNotFound { .. })
        ));
    }

    #[traced_test]
    #[test]
    fn test_legacy_slices() {
        let opts = IndexOpts::default();
        let legacy = resolver(Policy::Legacy, &opts);

        // Integer axis: integer bounds are labels, inclusive.
        let ints = labels![10, 20, 30, 40];
        assert_eq!(
            legacy.resolve(&Key::from(20..30), 0, &ints, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(1, Some(3), 1))
        );

        // String axis: integer bounds are positions.
        let strs = labels!["a", "b", "c"];
        assert_eq!(
            legacy.resolve(&Key::from(0..2), 0, &strs, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(0, Some(2), 1))
        );
        assert!(logs_contain("slicing by position"));

        // Floating axis: float bounds are labels.
        let floats = labels![0.5, 1.0, 1.5, 2.0];
        assert_eq!(
            legacy.resolve(&Key::between(1.0, 2.0), 0, &floats, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(1, Some(4), 1))
        );
        // Integer bounds on a floating axis are positions.
        assert_eq!(
            legacy.resolve(&Key::from(1..2), 0, &floats, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(1, Some(2), 1))
        );
    }

    #[traced_test]
    #[test]
    fn test_mixed_tie_break() {
        let opts = IndexOpts::default();
        let legacy = resolver(Policy::Legacy, &opts);

        let mixed = labels!["a", 1, "b", 2];
        assert_eq!(mixed.inferred_kind(), LabelKind::MixedInteger);
        assert_eq!(
            legacy.resolve(&Key::from(1..2), 0, &mixed, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(1, Some(4), 1))
        );
        assert!(logs_contain("slicing by label"));
        assert_eq!(
            legacy.resolve(&Key::from(0..2), 0, &mixed, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(0, Some(2), 1))
        );

        let numeric = labels![1, 2.5, 3];
        assert_eq!(numeric.inferred_kind(), LabelKind::MixedIntegerFloat);
        let result = legacy.resolve(&Key::from(5..6), 0, &numeric, Mode::Read);
        assert!(
            matches!(result, Err(IndexError::AmbiguousIndexer { kind: LabelKind::MixedIntegerFloat, .. })),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_mixed_integer_float_axis() {
        let opts = IndexOpts::default();
        let legacy = resolver(Policy::Legacy, &opts);
        let numeric = labels![1, 2.5, 3];

        // Integers are positions, even where they also name a label.
        assert_eq!(
            legacy.resolve(&1.into(), 0, &numeric, Mode::Read).unwrap(),
            Selector::Position(1)
        );
        assert_eq!(
            legacy.resolve(&(-1).into(), 0, &numeric, Mode::Read).unwrap(),
            Selector::Position(2)
        );
        assert!(matches!(
            legacy.resolve(&3.into(), 0, &numeric, Mode::Read),
            Err(IndexError::PositionOutOfRange { position: 3, axis: 0, size: 3 })
        ));
        assert_eq!(
            legacy.resolve(&Key::list([2, 0]), 0, &numeric, Mode::Read).unwrap(),
            Selector::PositionList(vec![2, 0])
        );
        // Entries that all exist as labels are still positions.
        assert!(matches!(
            legacy.resolve(&Key::list([3, 1]), 0, &numeric, Mode::Read),
            Err(IndexError::PositionOutOfRange { position: 3, .. })
        ));
        // Non-integer entries are labels.
        assert_eq!(
            legacy.resolve(&Key::list([2.5]), 0, &numeric, Mode::Read).unwrap(),
            Selector::PositionList(vec![1])
        );
        // Label-based access still reads integers as labels.
        assert_eq!(
            resolver(Policy::Label, &opts)
                .resolve(&3.into(), 0, &numeric, Mode::Read)
                .unwrap(),
            Selector::Position(2)
        );
    }

    #[test]
    fn test_lists() {
        let opts = IndexOpts::default();
        let labels = labels!["a", "b", "c"];
        let key = Key::list(["c", "z", "a"]);
        assert_eq!(
            resolver(Policy::Legacy, &opts).resolve(&key, 0, &labels, Mode::Read).unwrap(),
            Selector::Reindex(Reindex {
                labels: vec!["c".into(), "z".into(), "a".into()],
                positions: vec![Some(2), None, Some(0)],
            })
        );
        for (policy, mode) in [
            (Policy::Label, Mode::Read),
            (Policy::Label, Mode::Write),
            (Policy::Legacy, Mode::Write),
        ] {
            let result = resolver(policy, &opts).resolve(&key, 0, &labels, mode);
            assert!(
                matches!(result, Err(IndexError::KeyNotFound { ref key, .. }) if *key == Label::from("z")),
                "Unexpected: {:?}",
                result
            );
        }

        let dups = labels!["a", "b", "a"];
        assert_eq!(
            resolver(Policy::Label, &opts)
                .resolve(&Key::list(["a", "b"]), 0, &dups, Mode::Read)
                .unwrap(),
            Selector::PositionList(vec![0, 2, 1])
        );

        let mixed = labels!["x", 5, 7];
        assert_eq!(
            resolver(Policy::Legacy, &opts)
                .resolve(&Key::list([7, 5]), 0, &mixed, Mode::Read)
                .unwrap(),
            Selector::PositionList(vec![2, 1])
        );
        assert_eq!(
            resolver(Policy::Legacy, &opts)
                .resolve(&Key::list([0, 1]), 0, &mixed, Mode::Read)
                .unwrap(),
            Selector::PositionList(vec![0, 1])
        );
    }

    #[test]
    fn test_masks() {
        let opts = IndexOpts::default();
        let loc = resolver(Policy::Label, &opts);
        let labels = labels!["a", "b", "c"];
        assert_eq!(
            loc.resolve(&Key::mask([true, false, true]), 0, &labels, Mode::Read).unwrap(),
            Selector::BooleanMask(vec![true, false, true])
        );
        assert!(matches!(
            loc.resolve(&Key::mask([true]), 0, &labels, Mode::Read),
            Err(IndexError::BooleanMaskLength { axis: 0, expected: 3, got: 1 })
        ));
        let shuffled = Key::labeled_mask([true, false, false, true], labels!["c", "a", "b", "q"]);
        assert_eq!(
            loc.resolve(&shuffled, 0, &labels, Mode::Read).unwrap(),
            Selector::BooleanMask(vec![false, false, true])
        );
        let partial = Key::labeled_mask([true, false], labels!["c", "a"]);
        assert!(matches!(
            loc.resolve(&partial, 0, &labels, Mode::Write),
            Err(IndexError::UnalignableBooleanKey { axis: 0 })
        ));
    }

    #[test]
    fn test_hierarchical() {
        let opts = IndexOpts::default();
        let legacy = resolver(Policy::Legacy, &opts);
        let labels = labels![("a", 1), ("a", 2), ("b", 1)];
        assert_eq!(
            legacy.resolve(&"a".into(), 0, &labels, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(0, Some(2), 1))
        );
        // Level 0 holds strings, so an absent integer is a position.
        assert_eq!(
            legacy.resolve(&2.into(), 0, &labels, Mode::Read).unwrap(),
            Selector::Position(2)
        );
        assert_eq!(
            legacy.resolve(&Key::tuple(["b"]), 0, &labels, Mode::Read).unwrap(),
            Selector::PositionSlice(Range(2, Some(3), 1))
        );
        assert_eq!(
            legacy.resolve(&Key::list(["b", "a"]), 0, &labels, Mode::Read).unwrap(),
            Selector::PositionList(vec![2, 0, 1])
        );

        let numbered = labels![(1, "x"), (2, "y")];
        assert!(matches!(
            legacy.resolve(&5.into(), 0, &numbered, Mode::Read),
            Err(IndexError::KeyNotFound { .. })
        ));
    }
}

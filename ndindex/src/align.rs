//! Shaping assignment values to fit a selection.
//!
//! The [`ValueAligner`] takes what the caller wants written and the
//! per-axis selection it targets, and produces an [`Aligned`] value:
//! either a scalar to broadcast or a dense block in the selection's
//! row-major order. Labeled values are joined by label against the
//! selected labels; unlabeled ones must match the selection's shape.
//! The caller's value is never modified.

use crate::error::IndexError;
use crate::frame::Frame;
use crate::label::Value;
use crate::labels::LabelSet;
use crate::labels::Loc;
use crate::selector::Selector;
use crate::storage::Storage;

/// A right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    Scalar(Value),
    /// An unlabeled one-dimensional sequence.
    Sequence(Vec<Value>),
    /// A labeled vector or table, aligned by label.
    Labeled(Frame),
    /// An unlabeled block of the given shape, row-major.
    Block { shape: Vec<usize>, values: Vec<Value> },
}

impl AssignValue {
    pub fn block(shape: impl Into<Vec<usize>>, values: Vec<Value>) -> Self {
        AssignValue::Block {
            shape: shape.into(),
            values,
        }
    }

    pub fn sequence<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        AssignValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for AssignValue {
    fn from(value: Value) -> Self {
        AssignValue::Scalar(value)
    }
}

impl From<i64> for AssignValue {
    fn from(i: i64) -> Self {
        AssignValue::Scalar(i.into())
    }
}

impl From<i32> for AssignValue {
    fn from(i: i32) -> Self {
        AssignValue::Scalar(i.into())
    }
}

impl From<f64> for AssignValue {
    fn from(f: f64) -> Self {
        AssignValue::Scalar(f.into())
    }
}

impl From<bool> for AssignValue {
    fn from(b: bool) -> Self {
        AssignValue::Scalar(b.into())
    }
}

impl From<&str> for AssignValue {
    fn from(s: &str) -> Self {
        AssignValue::Scalar(s.into())
    }
}

impl From<Vec<Value>> for AssignValue {
    fn from(values: Vec<Value>) -> Self {
        AssignValue::Sequence(values)
    }
}

impl From<Frame> for AssignValue {
    fn from(frame: Frame) -> Self {
        AssignValue::Labeled(frame)
    }
}

/// A value ready to be written: what [`Storage::setitem`] consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Aligned {
    /// Write the same value everywhere.
    Broadcast(Value),
    /// One value per selected cell, row-major over the non-collapsed
    /// axes of the selection.
    Block { shape: Vec<usize>, values: Vec<Value> },
}

/// A left join of source labels onto target labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPlan {
    pub target: LabelSet,
    /// For each target label, the source position holding it.
    pub sources: Vec<Option<usize>>,
    /// Source positions no target label refers to.
    pub discarded: Vec<usize>,
}

impl AlignmentPlan {
    /// Plan taking, for every label of `target`, the entry of
    /// `source` with the same label. Identical label sets copy
    /// straight across; otherwise `source` must be unique.
    pub fn left_join(target: &LabelSet, source: &LabelSet, axis: usize) -> Result<Self, IndexError> {
        if target == source {
            return Ok(Self {
                target: target.clone(),
                sources: (0..source.len()).map(Some).collect(),
                discarded: Vec::new(),
            });
        }
        let sources = source
            .get_indexer(target.labels())
            .map_err(|_| IndexError::DuplicateLabels { axis })?;
        let mut used = vec![false; source.len()];
        for p in sources.iter().flatten() {
            used[*p] = true;
        }
        let discarded = used
            .iter()
            .enumerate()
            .filter_map(|(p, used)| (!used).then_some(p))
            .collect();
        Ok(Self {
            target: target.clone(),
            sources,
            discarded,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.discarded.is_empty()
            && self
                .sources
                .iter()
                .enumerate()
                .all(|(i, p)| *p == Some(i))
    }

    /// `values` (indexed by source position) rearranged into target
    /// order.
    pub fn apply(&self, values: &[Value], fill: &Value) -> Vec<Value> {
        self.sources
            .iter()
            .map(|p| p.and_then(|p| values.get(p)).unwrap_or(fill).clone())
            .collect()
    }
}

/// Aligns assignment values against a resolved selection.
#[derive(Debug, Clone)]
pub struct ValueAligner<'a> {
    fill: &'a Value,
}

impl<'a> ValueAligner<'a> {
    pub fn new(fill: &'a Value) -> Self {
        Self { fill }
    }

    /// Shape `value` for writing into `selectors` of `target`.
    /// `selectors` must not contain missing keys.
    pub fn align<S: Storage>(
        &self,
        target: &S,
        selectors: &[Selector],
        value: &AssignValue,
    ) -> Result<Aligned, IndexError> {
        let axes: Vec<usize> = (0..selectors.len())
            .filter(|a| !selectors[*a].is_scalar())
            .collect();
        let selected: Vec<LabelSet> = axes
            .iter()
            .map(|a| selected_labels(target, &selectors[*a], *a))
            .collect();
        let shape: Vec<usize> = selected.iter().map(LabelSet::len).collect();

        match value {
            AssignValue::Scalar(value) => Ok(Aligned::Broadcast(value.clone())),
            AssignValue::Sequence(values) => fit_block(&shape, &[values.len()], values),
            AssignValue::Block { shape: got, values } => {
                let expected: usize = got.iter().product();
                if expected != values.len() {
                    return Err(IndexError::DataLength {
                        expected,
                        got: values.len(),
                        axis: None,
                    });
                }
                fit_block(&shape, got, values)
            }
            AssignValue::Labeled(frame) if frame.ndim() == 1 => {
                // Aligned along the first axis the selection keeps.
                let (Some(axis), Some(labels)) = (axes.first(), selected.first()) else {
                    return fit_block(&shape, &frame.shape(), frame.values());
                };
                let source = frame.get_axis(0);
                let plan = AlignmentPlan::left_join(&conform(labels, source), source, *axis)?;
                tracing::trace!(axis = *axis, identity = plan.is_identity(), "aligned labeled vector");
                Ok(spread(&shape, plan.apply(frame.values(), self.fill)))
            }
            AssignValue::Labeled(frame) if frame.ndim() == 2 && selectors.len() == 2 => {
                self.align_table(target, selectors, &axes, &selected, frame)
            }
            AssignValue::Labeled(frame) => Err(IndexError::ValueShapeMismatch {
                expected: shape,
                got: frame.shape(),
                key: None,
            }),
        }
    }

    fn align_table<S: Storage>(
        &self,
        target: &S,
        selectors: &[Selector],
        axes: &[usize],
        selected: &[LabelSet],
        frame: &Frame,
    ) -> Result<Aligned, IndexError> {
        match axes {
            [_, _] => {
                let rows = AlignmentPlan::left_join(&selected[0], frame.get_axis(0), 0)?;
                let cols = AlignmentPlan::left_join(&selected[1], frame.get_axis(1), 1)?;
                let mut values = Vec::with_capacity(rows.sources.len() * cols.sources.len());
                for r in &rows.sources {
                    for c in &cols.sources {
                        values.push(self.cell(frame, *r, *c)?);
                    }
                }
                Ok(Aligned::Block {
                    shape: vec![rows.sources.len(), cols.sources.len()],
                    values,
                })
            }
            [axis] => {
                // One label fixed on the other axis: take the value's
                // entries under that label, aligned along `axis`.
                let fixed = 1 - axis;
                let Some(Selector::Position(p)) = selectors.get(fixed) else {
                    return Err(IndexError::ValueShapeMismatch {
                        expected: vec![selected[0].len()],
                        got: frame.shape(),
                        key: None,
                    });
                };
                let key = target.get_axis(fixed).get(*p).cloned();
                let line = match key.and_then(|k| frame.get_axis(fixed).get_loc(&k)) {
                    Some(Loc::Position(q)) => Some(q),
                    Some(_) => return Err(IndexError::DuplicateLabels { axis: fixed }),
                    None => None,
                };
                let source = frame.get_axis(*axis);
                let plan = AlignmentPlan::left_join(&conform(&selected[0], source), source, *axis)?;
                let values = plan
                    .sources
                    .iter()
                    .map(|s| match (*axis, line) {
                        (0, Some(_)) => self.cell(frame, *s, line),
                        (_, Some(_)) => self.cell(frame, line, *s),
                        (_, None) => Ok(self.fill.clone()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Aligned::Block {
                    shape: vec![values.len()],
                    values,
                })
            }
            _ => {
                let coords: Vec<Option<usize>> = selectors
                    .iter()
                    .enumerate()
                    .map(|(a, s)| {
                        let label = s.as_position().and_then(|p| target.get_axis(a).get(*p));
                        label.and_then(|l| frame.get_axis(a).get_loc(l)?.into_position().ok())
                    })
                    .collect();
                Ok(Aligned::Broadcast(self.cell(frame, coords[0], coords[1])?))
            }
        }
    }

    fn cell(&self, frame: &Frame, row: Option<usize>, col: Option<usize>) -> Result<Value, IndexError> {
        match (row, col) {
            (Some(r), Some(c)) => frame.get_value(&[r, c]),
            _ => Ok(self.fill.clone()),
        }
    }
}

/// The labels `selector` picks out of `axis`.
fn selected_labels<S: Storage>(target: &S, selector: &Selector, axis: usize) -> LabelSet {
    let labels = target.get_axis(axis);
    let positions: Vec<usize> = selector
        .indexer(labels.len())
        .into_iter()
        .flatten()
        .collect();
    labels.take(&positions)
}

// `labels` with leading levels dropped down to the depth of `source`.
fn conform(labels: &LabelSet, source: &LabelSet) -> LabelSet {
    let depth = source.nlevels();
    if labels.nlevels() > depth {
        labels.droplevels(labels.nlevels() - depth)
    } else {
        labels.clone()
    }
}

// A block of `shape` whose entries along the leading dimension are
// `line`, repeated across the remaining dimensions.
fn spread(shape: &[usize], line: Vec<Value>) -> Aligned {
    let inner: usize = shape.iter().skip(1).product();
    let values = line
        .into_iter()
        .flat_map(|value| std::iter::repeat_n(value, inner))
        .collect();
    Aligned::Block {
        shape: shape.to_vec(),
        values,
    }
}

// Fit unlabeled `values` of shape `got` to the selection `shape`.
// Unit dimensions are ignored on both sides, and a value matching the
// trailing dimensions is repeated across the leading ones.
fn fit_block(shape: &[usize], got: &[usize], values: &[Value]) -> Result<Aligned, IndexError> {
    let squeeze = |s: &[usize]| s.iter().copied().filter(|n| *n != 1).collect::<Vec<_>>();
    let (want, have) = (squeeze(shape), squeeze(got));
    let total: usize = shape.iter().product();
    if want == have {
        return Ok(Aligned::Block {
            shape: shape.to_vec(),
            values: values.to_vec(),
        });
    }
    if !have.is_empty() && want.ends_with(&have) {
        return Ok(Aligned::Block {
            shape: shape.to_vec(),
            values: values.iter().cycle().take(total).cloned().collect(),
        });
    }
    if values.len() == 1 {
        return Ok(Aligned::Broadcast(values[0].clone()));
    }
    Err(IndexError::ValueShapeMismatch {
        expected: shape.to_vec(),
        got: got.to_vec(),
        key: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels;
    use crate::selector::Range;

    fn table() -> Frame {
        Frame::table(
            labels!["a", "b", "c"],
            labels!["x", "y"],
            vec![vec![1, 2], vec![3, 4], vec![5, 6]],
        )
        .unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn test_left_join() {
        let plan = AlignmentPlan::left_join(&labels!["b", "c", "z"], &labels!["c", "a", "b"], 0).unwrap();
        assert_eq!(plan.sources, vec![Some(2), Some(0), None]);
        assert_eq!(plan.discarded, vec![1]);
        assert!(!plan.is_identity());
        assert_eq!(
            plan.apply(&ints(&[30, 10, 20]), &Value::Null),
            vec![Value::Int(20), Value::Int(30), Value::Null]
        );
        assert!(AlignmentPlan::left_join(&labels![1, 2], &labels![1, 2], 0)
            .unwrap()
            .is_identity());
        assert!(matches!(
            AlignmentPlan::left_join(&labels!["a"], &labels!["a", "a"], 3),
            Err(IndexError::DuplicateLabels { axis: 3 })
        ));
    }

    #[test]
    fn test_align_vector() {
        let frame = table();
        let fill = Value::Null;
        let aligner = ValueAligner::new(&fill);
        let column = [Selector::full(), Selector::Position(1)];
        let value = Frame::series(labels!["c", "a", "q"], [50, 10, 99]).unwrap();
        assert_eq!(
            aligner.align(&frame, &column, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![3],
                values: vec![Value::Int(10), Value::Null, Value::Int(50)],
            }
        );

        // Aligned on the rows and repeated across the columns.
        let value = Frame::series(labels!["b", "a"], [2, 1]).unwrap();
        let all = [Selector::PositionSlice(Range(0, Some(2), 1)), Selector::full()];
        assert_eq!(
            aligner.align(&frame, &all, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![2, 2],
                values: ints(&[1, 1, 2, 2]),
            }
        );

        // A single row keeps the columns, so those carry the labels.
        let value = Frame::series(labels!["y", "x"], [20, 10]).unwrap();
        let row = [Selector::Position(1), Selector::full()];
        assert_eq!(
            aligner.align(&frame, &row, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![2],
                values: ints(&[10, 20]),
            }
        );
    }

    #[test]
    fn test_align_vector_into_column_list() {
        let frame = table();
        let fill = Value::Null;
        let aligner = ValueAligner::new(&fill);
        let value = Frame::series(labels!["a", "b", "c"], [10, 20, 30]).unwrap();
        let selectors = [Selector::full(), Selector::PositionList(vec![1])];
        assert_eq!(
            aligner.align(&frame, &selectors, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![3, 1],
                values: ints(&[10, 20, 30]),
            }
        );

        // No label in common: every selected cell gets the fill value.
        let value = Frame::series(labels!["q"], [1]).unwrap();
        assert_eq!(
            aligner.align(&frame, &selectors, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![3, 1],
                values: vec![Value::Null; 3],
            }
        );
    }

    #[test]
    fn test_align_unlabeled() {
        let frame = table();
        let fill = Value::Null;
        let aligner = ValueAligner::new(&fill);
        let all = [Selector::full(), Selector::full()];
        assert!(matches!(
            aligner.align(&frame, &all, &AssignValue::block([3, 2], ints(&[1, 2, 3, 4, 5, 6]))),
            Ok(Aligned::Block { .. })
        ));
        assert_eq!(
            aligner.align(&frame, &all, &AssignValue::sequence([7, 8])).unwrap(),
            Aligned::Block {
                shape: vec![3, 2],
                values: ints(&[7, 8, 7, 8, 7, 8]),
            }
        );
        assert!(matches!(
            aligner.align(&frame, &all, &AssignValue::sequence([7, 8, 9])),
            Err(IndexError::ValueShapeMismatch { .. })
        ));
        assert!(matches!(
            aligner.align(&frame, &all, &AssignValue::block([2, 2], ints(&[1]))),
            Err(IndexError::DataLength { expected: 4, got: 1, axis: None })
        ));
        assert_eq!(
            aligner.align(&frame, &all, &AssignValue::from(5)).unwrap(),
            Aligned::Broadcast(Value::Int(5))
        );
    }

    #[test]
    fn test_align_table() {
        let frame = table();
        let fill = Value::Null;
        let aligner = ValueAligner::new(&fill);
        let value = Frame::table(
            labels!["c", "a"],
            labels!["y", "w"],
            vec![vec![60, 0], vec![20, 0]],
        )
        .unwrap();
        let all = [Selector::full(), Selector::full()];
        assert_eq!(
            aligner.align(&frame, &all, &value.clone().into()).unwrap(),
            Aligned::Block {
                shape: vec![3, 2],
                values: vec![
                    Value::Null,
                    Value::Int(20),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                    Value::Int(60),
                ],
            }
        );

        // A single target column takes the value's column of that name.
        let column = [Selector::full(), Selector::Position(1)];
        assert_eq!(
            aligner.align(&frame, &column, &value.into()).unwrap(),
            Aligned::Block {
                shape: vec![3],
                values: vec![Value::Int(20), Value::Null, Value::Int(60)],
            }
        );
    }

    #[test]
    fn test_align_table_hierarchical_rows() {
        let frame = Frame::table(
            labels![("a", 1), ("a", 2), ("b", 1)],
            labels!["x"],
            vec![vec![0], vec![0], vec![0]],
        )
        .unwrap();
        let value = Frame::table(labels![2, 1], labels!["x"], vec![vec![20], vec![10]]).unwrap();
        let fill = Value::Null;
        let selectors = [Selector::PositionSlice(Range(0, Some(2), 1)), Selector::Position(0)];
        assert_eq!(
            ValueAligner::new(&fill)
                .align(&frame, &selectors, &value.into())
                .unwrap(),
            Aligned::Block {
                shape: vec![2],
                values: ints(&[10, 20]),
            }
        );
    }
}

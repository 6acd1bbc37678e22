//! Scalar vocabulary shared by the engine: axis [`Label`]s, cell
//! [`Value`]s, and the kinds a set of labels can be classified as.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Serialize;

/// A named identifier for a position along an axis.
///
/// `Tuple` labels make up hierarchical (multi-level) axes: each
/// element is the label at one level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Label {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// Nanoseconds since the epoch.
    Datetime(i64),
    Tuple(Vec<Label>),
}

impl Label {
    /// Build a multi-level label.
    pub fn tuple<I, L>(levels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        Label::Tuple(levels.into_iter().map(Into::into).collect())
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Label::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Label::Float(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Label::Tuple(_))
    }

    /// Number of levels: the tuple arity, or 1 for flat labels.
    pub fn nlevels(&self) -> usize {
        match self {
            Label::Tuple(levels) => levels.len(),
            _ => 1,
        }
    }

    /// Interpret this label as a position. Integers always qualify;
    /// floats qualify when they lie within `tolerance` (relative) of
    /// their integer part.
    pub fn as_position(&self, tolerance: f64) -> Option<i64> {
        match self {
            Label::Int(i) => Some(*i),
            Label::Float(f) if f.is_finite() => {
                let whole = f.trunc();
                if (f - whole).abs() <= tolerance * whole.abs() {
                    Some(whole as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            Label::Int(i) => Some(*i as f64),
            Label::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Order two labels. Integers and floats compare numerically;
    /// tuples compare level by level. Labels of unrelated families
    /// are incomparable.
    pub fn compare(&self, other: &Label) -> Option<Ordering> {
        match (self, other) {
            (Label::Int(a), Label::Int(b)) => Some(a.cmp(b)),
            (Label::Str(a), Label::Str(b)) => Some(a.cmp(b)),
            (Label::Bool(a), Label::Bool(b)) => Some(a.cmp(b)),
            (Label::Datetime(a), Label::Datetime(b)) => Some(a.cmp(b)),
            (Label::Tuple(a), Label::Tuple(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => self.numeric()?.partial_cmp(&other.numeric()?),
        }
    }

    /// The form used for hashed lookup: integral floats fold onto
    /// integers so that `1` and `1.0` find the same entry.
    pub(crate) fn canonical(&self) -> Label {
        match self {
            Label::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 =>
            {
                Label::Int(*f as i64)
            }
            Label::Tuple(levels) => Label::Tuple(levels.iter().map(Label::canonical).collect()),
            other => other.clone(),
        }
    }

    /// True if this (tuple) label starts with the levels of `prefix`.
    /// A flat `prefix` is a one-level prefix.
    pub(crate) fn has_prefix(&self, prefix: &Label) -> bool {
        let Label::Tuple(levels) = self else {
            return false;
        };
        match prefix {
            Label::Tuple(head) => {
                head.len() <= levels.len()
                    && head
                        .iter()
                        .zip(levels.iter())
                        .all(|(p, l)| p.canonical() == l.canonical())
            }
            flat => levels
                .first()
                .is_some_and(|l| l.canonical() == flat.canonical()),
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Label::Int(a), Label::Int(b)) => a == b,
            (Label::Float(a), Label::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Label::Str(a), Label::Str(b)) => a == b,
            (Label::Bool(a), Label::Bool(b)) => a == b,
            (Label::Datetime(a), Label::Datetime(b)) => a == b,
            (Label::Tuple(a), Label::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Label::Int(i) | Label::Datetime(i) => i.hash(state),
            Label::Float(f) => {
                if f.is_nan() {
                    f64::NAN.to_bits().hash(state)
                } else if *f == 0.0 {
                    0u64.hash(state)
                } else {
                    f.to_bits().hash(state)
                }
            }
            Label::Str(s) => s.hash(state),
            Label::Bool(b) => b.hash(state),
            Label::Tuple(levels) => levels.hash(state),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{}", i),
            Label::Float(x) => write!(f, "{:?}", x),
            Label::Str(s) => write!(f, "{:?}", s),
            Label::Bool(b) => write!(f, "{}", b),
            Label::Datetime(ns) => write!(f, "datetime({})", ns),
            Label::Tuple(levels) => {
                write!(f, "(")?;
                for (i, level) in levels.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", level)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Label::Int(i)
    }
}

impl From<i32> for Label {
    fn from(i: i32) -> Self {
        Label::Int(i as i64)
    }
}

impl From<usize> for Label {
    fn from(i: usize) -> Self {
        Label::Int(i as i64)
    }
}

impl From<f64> for Label {
    fn from(f: f64) -> Self {
        Label::Float(f)
    }
}

impl From<bool> for Label {
    fn from(b: bool) -> Self {
        Label::Bool(b)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Str(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label::Str(s)
    }
}

impl<A: Into<Label>, B: Into<Label>> From<(A, B)> for Label {
    fn from((a, b): (A, B)) -> Self {
        Label::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Label>, B: Into<Label>, C: Into<Label>> From<(A, B, C)> for Label {
    fn from((a, b, c): (A, B, C)) -> Self {
        Label::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

/// The classification of a label set inferred from its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelKind {
    Empty,
    Integer,
    Floating,
    /// Integers and floats together.
    MixedIntegerFloat,
    /// Integers together with non-numeric labels.
    MixedInteger,
    Mixed,
    String,
    Boolean,
    Datetime,
}

impl LabelKind {
    /// Infer the kind of a sequence of labels.
    pub fn infer<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Self {
        let (mut n, mut ints, mut floats, mut strs, mut bools, mut dates) = (0, 0, 0, 0, 0, 0);
        for label in labels {
            n += 1;
            match label {
                Label::Int(_) => ints += 1,
                Label::Float(_) => floats += 1,
                Label::Str(_) => strs += 1,
                Label::Bool(_) => bools += 1,
                Label::Datetime(_) => dates += 1,
                Label::Tuple(_) => {}
            }
        }
        match n {
            0 => LabelKind::Empty,
            n if ints == n => LabelKind::Integer,
            n if floats == n => LabelKind::Floating,
            n if ints + floats == n => LabelKind::MixedIntegerFloat,
            n if strs == n => LabelKind::String,
            n if bools == n => LabelKind::Boolean,
            n if dates == n => LabelKind::Datetime,
            _ if ints > 0 => LabelKind::MixedInteger,
            _ => LabelKind::Mixed,
        }
    }

    /// Kinds on which a plain integer key is read as a label rather
    /// than a position. A mix of integers and floats is not one.
    pub fn is_integer_like(self) -> bool {
        self == LabelKind::Integer
    }

    pub fn is_mixed(self) -> bool {
        matches!(
            self,
            LabelKind::Mixed | LabelKind::MixedInteger | LabelKind::MixedIntegerFloat
        )
    }
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LabelKind::Empty => "empty",
            LabelKind::Integer => "integer",
            LabelKind::Floating => "floating",
            LabelKind::MixedIntegerFloat => "mixed-integer-float",
            LabelKind::MixedInteger => "mixed-integer",
            LabelKind::Mixed => "mixed",
            LabelKind::String => "string",
            LabelKind::Boolean => "boolean",
            LabelKind::Datetime => "datetime",
        };
        f.write_str(name)
    }
}

/// The storage type of a label set: what labels it can hold without
/// widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelDtype {
    Int64,
    Float64,
    Bool,
    Datetime,
    Object,
}

impl LabelDtype {
    /// The narrowest dtype holding all of `labels`.
    pub fn for_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Self {
        let mut dtype: Option<LabelDtype> = None;
        for label in labels {
            let this = match label {
                Label::Int(_) => LabelDtype::Int64,
                Label::Float(_) => LabelDtype::Float64,
                Label::Bool(_) => LabelDtype::Bool,
                Label::Datetime(_) => LabelDtype::Datetime,
                Label::Str(_) | Label::Tuple(_) => return LabelDtype::Object,
            };
            dtype = match dtype {
                None => Some(this),
                Some(d) if d == this => Some(d),
                _ => return LabelDtype::Object,
            };
        }
        dtype.unwrap_or(LabelDtype::Object)
    }

    /// Whether `label` can be stored without changing the dtype.
    pub fn can_hold(self, label: &Label) -> bool {
        match (self, label) {
            (LabelDtype::Object, _) => true,
            (LabelDtype::Int64, Label::Int(_)) => true,
            (LabelDtype::Float64, Label::Float(_) | Label::Int(_)) => true,
            (LabelDtype::Bool, Label::Bool(_)) => true,
            (LabelDtype::Datetime, Label::Datetime(_)) => true,
            _ => false,
        }
    }

    /// Convert `label` to this dtype's representation. Only meaningful
    /// when [`LabelDtype::can_hold`] holds.
    pub(crate) fn coerce(self, label: Label) -> Label {
        match (self, label) {
            (LabelDtype::Float64, Label::Int(i)) => Label::Float(i as f64),
            (_, label) => label,
        }
    }
}

/// A single cell of data. `Null` is the missing fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Datetime(i64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Datetime(ns) => write!(f, "datetime({})", ns),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_kind() {
        let kind = |labels: Vec<Label>| LabelKind::infer(&labels);
        assert_eq!(kind(vec![]), LabelKind::Empty);
        assert_eq!(kind(vec![10.into(), 20.into()]), LabelKind::Integer);
        assert_eq!(kind(vec![1.5.into(), 2.0.into()]), LabelKind::Floating);
        assert_eq!(
            kind(vec![1.into(), 2.5.into()]),
            LabelKind::MixedIntegerFloat
        );
        assert_eq!(kind(vec![1.into(), "a".into()]), LabelKind::MixedInteger);
        assert_eq!(kind(vec!["a".into(), 1.5.into()]), LabelKind::Mixed);
        assert_eq!(kind(vec!["a".into(), "b".into()]), LabelKind::String);
        assert_eq!(kind(vec![("a", 1).into()]), LabelKind::Mixed);
        assert_eq!(LabelKind::MixedIntegerFloat.to_string(), "mixed-integer-float");
        assert!(LabelKind::Integer.is_integer_like());
        assert!(!LabelKind::MixedIntegerFloat.is_integer_like());
    }

    #[test]
    fn test_as_position() {
        let eps = f32::EPSILON as f64;
        assert_eq!(Label::Int(-3).as_position(eps), Some(-3));
        assert_eq!(Label::Float(4.0).as_position(eps), Some(4));
        assert_eq!(Label::Float(4.5).as_position(eps), None);
        assert_eq!(Label::from("4").as_position(eps), None);
    }

    #[test]
    fn test_compare() {
        assert_eq!(Label::Int(1).compare(&Label::Float(1.5)), Some(Ordering::Less));
        assert_eq!(Label::from("b").compare(&Label::from("a")), Some(Ordering::Greater));
        assert_eq!(Label::from("a").compare(&Label::Int(1)), None);
        assert_eq!(
            Label::from(("a", 2)).compare(&Label::from(("a", 1))),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_canonical_and_prefix() {
        assert_eq!(Label::Float(2.0).canonical(), Label::Int(2));
        assert_eq!(Label::Float(2.5).canonical(), Label::Float(2.5));
        let label = Label::from(("a", 1, "x"));
        assert!(label.has_prefix(&"a".into()));
        assert!(label.has_prefix(&("a", 1).into()));
        assert!(!label.has_prefix(&("a", 2).into()));
        assert!(!Label::from("a").has_prefix(&"a".into()));
    }

    #[test]
    fn test_dtype() {
        let labels: Vec<Label> = vec![1.into(), 2.into()];
        assert_eq!(LabelDtype::for_labels(&labels), LabelDtype::Int64);
        assert!(LabelDtype::Float64.can_hold(&Label::Int(1)));
        assert!(!LabelDtype::Int64.can_hold(&Label::from("a")));
        assert_eq!(LabelDtype::Float64.coerce(Label::Int(3)), Label::Float(3.0));
    }
}

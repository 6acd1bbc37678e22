//! Raw indexing keys as supplied by callers.
//!
//! A [`Key`] is built once at the API boundary; resolution then
//! matches on its variant rather than probing the caller's value for
//! its shape. Keys are never mutated.

use std::fmt;

use enum_as_inner::EnumAsInner;
use serde::Deserialize;
use serde::Serialize;

use crate::label::Label;
use crate::labels::LabelSet;

/// A `start:stop:step` slice. Bounds are labels; whether they denote
/// labels or positions is decided during resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SliceKey {
    pub start: Option<Label>,
    pub stop: Option<Label>,
    pub step: Option<i64>,
}

impl SliceKey {
    /// True when both bounds are absent and the step is trivial.
    pub fn is_null(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && matches!(self.step, None | Some(1))
    }

    fn bounds(&self) -> impl Iterator<Item = &Label> {
        self.start.iter().chain(self.stop.iter())
    }

    /// At least one bound, and every given bound is an integer or an
    /// integer-valued float (within `tolerance`).
    pub(crate) fn is_index_slice(&self, tolerance: f64) -> bool {
        !(self.start.is_none() && self.stop.is_none())
            && self.bounds().all(|b| b.as_position(tolerance).is_some())
    }

    /// At least one bound, and every given bound is a float.
    pub(crate) fn is_float_slice(&self) -> bool {
        !(self.start.is_none() && self.stop.is_none()) && self.bounds().all(Label::is_float)
    }
}

/// A boolean mask, optionally carrying its own labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub values: Vec<bool>,
    pub labels: Option<LabelSet>,
}

/// A caller-supplied key for one axis, or a tuple with one key per
/// axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumAsInner)]
pub enum Key {
    Scalar(Label),
    Slice(SliceKey),
    List(Vec<Label>),
    Mask(Mask),
    Tuple(Vec<Key>),
}

impl Key {
    /// The null slice (`:`).
    pub fn all() -> Self {
        Key::Slice(SliceKey::default())
    }

    pub fn slice(start: Option<Label>, stop: Option<Label>) -> Self {
        Key::Slice(SliceKey {
            start,
            stop,
            step: None,
        })
    }

    pub fn slice_step(start: Option<Label>, stop: Option<Label>, step: i64) -> Self {
        Key::Slice(SliceKey {
            start,
            stop,
            step: Some(step),
        })
    }

    /// A slice with both bounds given.
    pub fn between(start: impl Into<Label>, stop: impl Into<Label>) -> Self {
        Key::slice(Some(start.into()), Some(stop.into()))
    }

    pub fn list<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        Key::List(labels.into_iter().map(Into::into).collect())
    }

    pub fn mask(values: impl Into<Vec<bool>>) -> Self {
        Key::Mask(Mask {
            values: values.into(),
            labels: None,
        })
    }

    /// A mask aligned by label rather than by position.
    pub fn labeled_mask(values: impl Into<Vec<bool>>, labels: LabelSet) -> Self {
        Key::Mask(Mask {
            values: values.into(),
            labels: Some(labels),
        })
    }

    pub fn tuple<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Key::Tuple(keys.into_iter().map(Into::into).collect())
    }

    /// Keys naming a single label or position: scalars, and tuples of
    /// scalars (one multi-level label).
    pub fn is_label_like(&self) -> bool {
        self.as_label().is_some()
    }

    /// The label this key names, if it names exactly one.
    pub fn as_label(&self) -> Option<Label> {
        match self {
            Key::Scalar(label) => Some(label.clone()),
            Key::Tuple(keys) => keys
                .iter()
                .map(|k| k.as_scalar().cloned())
                .collect::<Option<Vec<_>>>()
                .map(Label::Tuple),
            _ => None,
        }
    }

    pub fn is_null_slice(&self) -> bool {
        matches!(self, Key::Slice(s) if s.is_null())
    }

    /// Everything that selects a set of entries by enumeration.
    pub fn is_list_like(&self) -> bool {
        matches!(self, Key::List(_) | Key::Mask(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(f: &mut fmt::Formatter<'_>, label: &Option<Label>) -> fmt::Result {
            match label {
                Some(label) => write!(f, "{}", label),
                None => Ok(()),
            }
        }
        match self {
            Key::Scalar(label) => write!(f, "{}", label),
            Key::Slice(s) => {
                opt(f, &s.start)?;
                write!(f, ":")?;
                opt(f, &s.stop)?;
                if let Some(step) = s.step {
                    write!(f, ":{}", step)?;
                }
                Ok(())
            }
            Key::List(labels) => {
                write!(f, "[")?;
                for (i, label) in labels.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", label)?;
                }
                write!(f, "]")
            }
            Key::Mask(mask) => {
                let bits: String = mask.values.iter().map(|b| if *b { '1' } else { '0' }).collect();
                write!(f, "mask({})", bits)
            }
            Key::Tuple(keys) => {
                write!(f, "(")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", key)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<Label> for Key {
    fn from(label: Label) -> Self {
        Key::Scalar(label)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Scalar(i.into())
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Scalar(i.into())
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Scalar(f.into())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Scalar(s.into())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Scalar(s.into())
    }
}

impl From<std::ops::Range<i64>> for Key {
    fn from(r: std::ops::Range<i64>) -> Self {
        Key::between(r.start, r.end)
    }
}

impl From<std::ops::RangeFrom<i64>> for Key {
    fn from(r: std::ops::RangeFrom<i64>) -> Self {
        Key::slice(Some(r.start.into()), None)
    }
}

impl From<std::ops::RangeTo<i64>> for Key {
    fn from(r: std::ops::RangeTo<i64>) -> Self {
        Key::slice(None, Some(r.end.into()))
    }
}

impl From<std::ops::RangeFull> for Key {
    fn from(_: std::ops::RangeFull) -> Self {
        Key::all()
    }
}

impl<A: Into<Key>, B: Into<Key>> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Key::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Key>, B: Into<Key>, C: Into<Key>> From<(A, B, C)> for Key {
    fn from((a, b, c): (A, B, C)) -> Self {
        Key::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_classification() {
        let eps = f32::EPSILON as f64;
        assert!(Key::all().is_null_slice());
        assert!(!Key::slice_step(None, None, 2).is_null_slice());

        let s = |k: Key| k.into_slice().unwrap();
        assert!(s(Key::from(1..3)).is_index_slice(eps));
        assert!(s(Key::slice(Some(1.0.into()), None)).is_index_slice(eps));
        assert!(!s(Key::slice(Some(1.5.into()), None)).is_index_slice(eps));
        assert!(!s(Key::between("a", 3)).is_index_slice(eps));
        assert!(!s(Key::all()).is_index_slice(eps));
        assert!(s(Key::between(1.0, 2.5)).is_float_slice());
        assert!(!s(Key::between(1.0, 2)).is_float_slice());
    }

    #[test]
    fn test_as_label() {
        assert_eq!(Key::from(3).as_label(), Some(Label::Int(3)));
        assert_eq!(Key::from(("a", 1)).as_label(), Some(Label::from(("a", 1))));
        assert!(Key::from(("a", Key::all())).as_label().is_none());
        assert!(!Key::list([1]).is_label_like());
    }

    #[test]
    fn test_display() {
        assert_eq!(Key::from((5, "B")).to_string(), "(5, \"B\")");
        assert_eq!(Key::from(1..3).to_string(), "1:3");
        assert_eq!(Key::slice_step(None, Some(4.into()), -1).to_string(), ":4:-1");
        assert_eq!(Key::list(["a", "b"]).to_string(), "[\"a\", \"b\"]");
        assert_eq!(Key::mask([true, false]).to_string(), "mask(10)");
    }
}

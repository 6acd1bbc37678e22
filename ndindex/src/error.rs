use crate::key::Key;
use crate::label::Label;
use crate::label::LabelKind;
use crate::labels::LabelError;
use crate::policy::Policy;
use crate::slice::SliceError;

/// Errors returned by key resolution, selection and assignment. Every
/// variant names the offending key or axis.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("label {key} not found on axis {axis}")]
    KeyNotFound { key: Label, axis: usize },

    #[error("position {position} out of range for axis {axis} of size {size}")]
    PositionOutOfRange {
        position: i64,
        axis: usize,
        size: usize,
    },

    #[error("too many indexers: {got} keys for {ndim} dimensions")]
    TooManyIndexers { got: usize, ndim: usize },

    #[error("{policy} indexing cannot enlarge its target along axes {axes:?}")]
    CannotEnlarge { policy: Policy, axes: Vec<usize> },

    #[error("cannot assign a value of shape {got:?} into a selection of shape {expected:?}{}", at_key(.key))]
    ValueShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        key: Option<Key>,
    },

    #[error("unalignable boolean key on axis {axis}: its labels do not cover the axis")]
    UnalignableBooleanKey { axis: usize },

    #[error("boolean key of length {got} does not match axis {axis} of length {expected}")]
    BooleanMaskLength {
        axis: usize,
        expected: usize,
        got: usize,
    },

    #[error("cannot tell whether {key} on {kind} axis {axis} selects labels or positions")]
    AmbiguousIndexer {
        key: Key,
        axis: usize,
        kind: LabelKind,
    },

    #[error("{policy} indexing on axis {axis} cannot use key {key}; expected {expected}")]
    InvalidKey {
        key: Key,
        axis: usize,
        policy: Policy,
        expected: &'static str,
    },

    #[error("labels on axis {axis} are not sorted for slicing at {key}")]
    UnsortedLabels { key: Label, axis: usize },

    #[error("cannot align against duplicate labels on axis {axis}")]
    DuplicateLabels { axis: usize },

    #[error("data of length {got} does not fill {expected} elements{}", on_axis(.axis))]
    DataLength {
        expected: usize,
        got: usize,
        axis: Option<usize>,
    },

    #[error("axis {axis} out of range for {ndim} dimensions")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error(transparent)]
    Slice(#[from] SliceError),
}

impl IndexError {
    /// Name the key a shape failure was raised for.
    pub(crate) fn for_key(self, key: &Key) -> Self {
        match self {
            IndexError::ValueShapeMismatch {
                expected,
                got,
                key: None,
            } => IndexError::ValueShapeMismatch {
                expected,
                got,
                key: Some(key.clone()),
            },
            err => err,
        }
    }
}

fn at_key(key: &Option<Key>) -> String {
    key.as_ref().map_or_else(String::new, |key| format!(" at {key}"))
}

fn on_axis(axis: &Option<usize>) -> String {
    axis.map_or_else(String::new, |axis| format!(" on axis {axis}"))
}

impl LabelError {
    /// Attach the axis (and accessor) a label-set failure happened on.
    pub(crate) fn at_axis(self, axis: usize, policy: Policy) -> IndexError {
        match self {
            LabelError::MissingBound(key) | LabelError::NonUniqueBound(key) => {
                IndexError::KeyNotFound { key, axis }
            }
            LabelError::Unsorted(key) => IndexError::UnsortedLabels { key, axis },
            LabelError::NonUnique => IndexError::DuplicateLabels { axis },
            LabelError::ZeroStep => IndexError::InvalidKey {
                key: Key::slice_step(None, None, 0),
                axis,
                policy,
                expected: "a non-zero slice step",
            },
        }
    }
}

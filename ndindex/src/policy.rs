//! Accessors: the entry points that read from and write into
//! [`Storage`] under one of the indexing disciplines.
//!
//! * [`Accessor::loc`] is label based. Slices include both ends,
//!   and every label named must exist on reads.
//! * [`Accessor::iloc`] is position based. Slices are half-open and
//!   clamp to the axis; writes never grow an axis.
//! * [`Accessor::ix`] is the legacy mixed discipline: integers are
//!   positions unless the axis itself is integer labeled.
//! * [`ScalarAccessor::at`] and [`ScalarAccessor::iat`] take exactly one
//!   label or position per axis and touch a single cell.
//!
//! Writes are staged: the updated storage is built first, and installed
//! into the caller's target only once every step has succeeded.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::align::AssignValue;
use crate::align::ValueAligner;
use crate::config::IndexOpts;
use crate::enlarge::AxisEnlarger;
use crate::error::IndexError;
use crate::key::Key;
use crate::label::Label;
use crate::label::Value;
use crate::labels::LabelSet;
use crate::resolve::KeyResolver;
use crate::resolve::Mode;
use crate::selector::Selector;
use crate::storage::Selected;
use crate::storage::Storage;
use crate::walk::TupleWalker;

const POSITION_KEYS: &str =
    "an integer, a slice of integers, an unlabeled boolean mask or a list of integers";

const AXIS_KEYS: &str = "one key per axis; tuples only as labels of a hierarchical axis";

/// An indexing discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// Keys are labels.
    Label,
    /// Keys are positions.
    Position,
    /// Keys are labels or positions depending on the axis.
    Legacy,
}

impl Policy {
    pub fn is_positional(self) -> bool {
        self == Policy::Position
    }

    pub(crate) fn tries_direct_lookup(self) -> bool {
        self == Policy::Legacy
    }

    /// Reject keys this policy cannot interpret on `axis`.
    pub(crate) fn validate(self, key: &Key, axis: usize, labels: &LabelSet) -> Result<(), IndexError> {
        let invalid = |expected| IndexError::InvalidKey {
            key: key.clone(),
            axis,
            policy: self,
            expected,
        };
        match (self, key) {
            (Policy::Position, Key::Scalar(Label::Int(_))) => Ok(()),
            (Policy::Position, Key::Slice(s))
                if [&s.start, &s.stop].into_iter().flatten().all(Label::is_integer) =>
            {
                Ok(())
            }
            (Policy::Position, Key::List(list)) if list.iter().all(Label::is_integer) => Ok(()),
            (Policy::Position, Key::Mask(mask)) if mask.labels.is_none() => Ok(()),
            (Policy::Position, _) => Err(invalid(POSITION_KEYS)),
            (Policy::Label, Key::Slice(s)) => {
                match [&s.start, &s.stop]
                    .into_iter()
                    .flatten()
                    .find(|bound| labels.get_loc(bound).is_none())
                {
                    Some(bound) => Err(IndexError::KeyNotFound {
                        key: bound.clone(),
                        axis,
                    }),
                    None => Ok(()),
                }
            }
            (_, Key::Tuple(_)) if labels.is_hierarchical() && key.is_label_like() => Ok(()),
            (_, Key::Tuple(_)) => Err(invalid(AXIS_KEYS)),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Label => write!(f, "label-based"),
            Policy::Position => write!(f, "position-based"),
            Policy::Legacy => write!(f, "mixed"),
        }
    }
}

/// Reads and writes keyed by arbitrary (tuple) keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessor {
    policy: Policy,
    opts: IndexOpts,
}

impl Accessor {
    pub fn new(policy: Policy, opts: IndexOpts) -> Self {
        Self { policy, opts }
    }

    /// Label-based indexing.
    pub fn loc() -> Self {
        Self::new(Policy::Label, IndexOpts::default())
    }

    /// Position-based indexing.
    pub fn iloc() -> Self {
        Self::new(Policy::Position, IndexOpts::default())
    }

    /// Mixed label/position indexing.
    pub fn ix() -> Self {
        Self::new(Policy::Legacy, IndexOpts::default())
    }

    pub fn with_opts(self, opts: IndexOpts) -> Self {
        Self { opts, ..self }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn opts(&self) -> &IndexOpts {
        &self.opts
    }

    fn walker(&self) -> TupleWalker<'_> {
        TupleWalker::new(KeyResolver::new(self.policy, &self.opts))
    }

    /// The per-axis selection `key` denotes in `target`.
    pub fn resolve<S: Storage>(&self, target: &S, key: impl Into<Key>, mode: Mode) -> Result<Vec<Selector>, IndexError> {
        self.walker().resolve(target, &key.into(), mode)
    }

    /// Read `key` from `target`.
    #[tracing::instrument(name = "read", level = "debug", skip_all, fields(policy = %self.policy))]
    pub fn get<S: Storage>(&self, target: &S, key: impl Into<Key>) -> Result<Selected<S>, IndexError> {
        self.walker().read(target, &key.into())
    }

    /// Write `value` at `key`, growing one axis if the key names a
    /// label it lacks. On failure `target` is left as it was.
    #[tracing::instrument(name = "write", level = "debug", skip_all, fields(policy = %self.policy))]
    pub fn set<S: Storage>(
        &self,
        target: &mut S,
        key: impl Into<Key>,
        value: impl Into<AssignValue>,
    ) -> Result<(), IndexError> {
        let key = key.into();
        let value = value.into();
        let mut selectors = self.walker().resolve(target, &key, Mode::Write)?;

        let enlarger = AxisEnlarger::new(self.policy, &self.opts);
        let enlarged = match enlarger.request(&selectors)? {
            Some(request) => {
                let (enlarged, position) = enlarger.apply(target, &request)?;
                selectors[request.axis] = Selector::Position(position);
                Some(enlarged)
            }
            None => None,
        };
        let base: &S = enlarged.as_ref().unwrap_or(target);

        let updated = ValueAligner::new(&self.opts.fill)
            .align(base, &selectors, &value)
            .and_then(|aligned| base.setitem(&selectors, &aligned))
            .map_err(|err| err.for_key(&key))?;
        *target = updated;
        target.notify_mutated();
        tracing::trace!(%key, policy = %self.policy, "installed write");
        Ok(())
    }
}

/// Single-cell reads and writes: exactly one label ([`Self::at`]) or
/// position ([`Self::iat`]) per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarAccessor {
    policy: Policy,
    opts: IndexOpts,
}

impl ScalarAccessor {
    pub fn at() -> Self {
        Self {
            policy: Policy::Label,
            opts: IndexOpts::default(),
        }
    }

    pub fn iat() -> Self {
        Self {
            policy: Policy::Position,
            opts: IndexOpts::default(),
        }
    }

    pub fn with_opts(self, opts: IndexOpts) -> Self {
        Self { opts, ..self }
    }

    fn selectors<S: Storage>(&self, target: &S, key: &Key, mode: Mode) -> Result<Vec<Selector>, IndexError> {
        let keys = match key {
            Key::Tuple(keys) => keys.as_slice(),
            key => std::slice::from_ref(key),
        };
        let ndim = target.ndim();
        if keys.len() > ndim {
            return Err(IndexError::TooManyIndexers {
                got: keys.len(),
                ndim,
            });
        }
        let resolver = KeyResolver::new(self.policy, &self.opts);
        let invalid = |axis, expected| IndexError::InvalidKey {
            key: key.clone(),
            axis,
            policy: self.policy,
            expected,
        };
        if keys.len() < ndim {
            return Err(invalid(keys.len(), "one scalar per axis"));
        }
        keys.iter()
            .enumerate()
            .map(|(axis, k)| {
                if !matches!(k, Key::Scalar(_)) {
                    return Err(invalid(axis, "one scalar per axis"));
                }
                match resolver.resolve(k, axis, target.get_axis(axis), mode)? {
                    s @ (Selector::Position(_) | Selector::MissingKey(_)) => Ok(s),
                    _ => Err(invalid(axis, "a label matching a single entry")),
                }
            })
            .collect()
    }

    /// The cell at `key`.
    pub fn get<S: Storage>(&self, target: &S, key: impl Into<Key>) -> Result<Value, IndexError> {
        let selectors = self.selectors(target, &key.into(), Mode::Read)?;
        target.get_value(&coords(&selectors))
    }

    /// Set the cell at `key`. A missing label grows its axis.
    pub fn set<S: Storage>(
        &self,
        target: &mut S,
        key: impl Into<Key>,
        value: impl Into<Value>,
    ) -> Result<(), IndexError> {
        let mut selectors = self.selectors(target, &key.into(), Mode::Write)?;
        let enlarger = AxisEnlarger::new(self.policy, &self.opts);
        match enlarger.request(&selectors)? {
            None => target.set_value(&coords(&selectors), value.into())?,
            Some(request) => {
                let (mut enlarged, position) = enlarger.apply(target, &request)?;
                selectors[request.axis] = Selector::Position(position);
                enlarged.set_value(&coords(&selectors), value.into())?;
                *target = enlarged;
            }
        }
        target.notify_mutated();
        Ok(())
    }
}

fn coords(selectors: &[Selector]) -> Vec<usize> {
    selectors
        .iter()
        .filter_map(|s| s.as_position().copied())
        .collect()
}

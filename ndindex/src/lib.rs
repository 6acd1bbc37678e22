//! Index resolution for labeled N-dimensional data.
//!
//! Given a key for a labeled array (a label, a position, a slice, a
//! boolean mask, a list, or a tuple with one of those per axis), this
//! crate decides which entries the key denotes, reads them, and writes
//! into them. Writes align labeled values by label and may grow an
//! axis when they name a label it does not have.
//!
//! Keys are interpreted under one of three disciplines, exposed as
//! [`Accessor::loc`] (labels), [`Accessor::iloc`] (positions) and
//! [`Accessor::ix`] (labels or positions, decided per axis), plus the
//! single-cell [`ScalarAccessor`]. All of them share one resolution
//! core, [`KeyResolver`], which turns a [`Key`] into a storage-agnostic
//! [`Selector`].
//!
//! Data is reached only through the [`Storage`] trait; [`Frame`] is a
//! dense in-memory implementation laid out by a strided [`Slice`].

mod align;
mod config;
mod enlarge;
mod error;
mod frame;
mod key;
mod label;
mod labels;
mod policy;
mod resolve;
mod slice;
mod walk;

/// Resolved per-axis selections.
pub mod selector;

/// The storage interface the engine reads and writes through.
pub mod storage;

pub use align::Aligned;
pub use align::AlignmentPlan;
pub use align::AssignValue;
pub use align::ValueAligner;
pub use config::IndexOpts;
pub use enlarge::AxisEnlarger;
pub use enlarge::EnlargementRequest;
pub use error::IndexError;
pub use frame::Frame;
pub use key::Key;
pub use key::Mask;
pub use key::SliceKey;
pub use label::Label;
pub use label::LabelDtype;
pub use label::LabelKind;
pub use label::Value;
pub use labels::LabelError;
pub use labels::LabelSet;
pub use labels::Loc;
pub use labels::NonUniqueIndexer;
pub use policy::Accessor;
pub use policy::Policy;
pub use policy::ScalarAccessor;
pub use resolve::KeyResolver;
pub use resolve::Mode;
pub use selector::Range;
pub use selector::Reindex;
pub use selector::Selector;
pub use slice::Slice;
pub use slice::SliceError;
pub use slice::SliceIterator;
pub use storage::Selected;
pub use storage::Storage;
pub use walk::TupleWalker;

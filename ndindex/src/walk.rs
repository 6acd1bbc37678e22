//! Multi-axis keys: per-axis resolution, dimension lowering and
//! multi-take.

use crate::error::IndexError;
use crate::key::Key;
use crate::label::Label;
use crate::resolve::KeyResolver;
use crate::resolve::Mode;
use crate::selector::Selector;
use crate::storage::Selected;
use crate::storage::Storage;

/// Walks a (possibly tuple) key across the axes of a target.
#[derive(Debug, Clone, Copy)]
pub struct TupleWalker<'a> {
    resolver: KeyResolver<'a>,
}

impl<'a> TupleWalker<'a> {
    pub fn new(resolver: KeyResolver<'a>) -> Self {
        Self { resolver }
    }

    /// One selector per axis of `target`. Keys beyond those given are
    /// null slices.
    pub fn resolve<S: Storage>(&self, target: &S, key: &Key, mode: Mode) -> Result<Vec<Selector>, IndexError> {
        let keys = self.split(target, key, mode)?;
        keys.iter()
            .enumerate()
            .map(|(axis, key)| self.resolver.resolve(key, axis, target.get_axis(axis), mode))
            .collect()
    }

    /// Read `key` from `target`. Axes selected by a single position
    /// are dropped; if every axis is dropped, the result is a cell.
    pub fn read<S: Storage>(&self, target: &S, key: &Key) -> Result<Selected<S>, IndexError> {
        if let Some(cell) = self.direct_cell(target, key) {
            return cell;
        }
        let keys = self.split(target, key, Mode::Read)?;
        if self.is_multi_take(target, &keys) {
            tracing::debug!(%key, "multi-take");
            let selectors = self.resolve_all(target, &keys)?;
            return self.take_all(target.clone(), &selectors).map(Selected::Data);
        }
        self.lower(target.clone(), keys, 0)
    }

    /// Split `key` into one key per axis of `target`.
    ///
    /// A tuple of scalars against a hierarchical first axis is first
    /// tried as a single multi-level label on that axis.
    fn split<S: Storage>(&self, target: &S, key: &Key, mode: Mode) -> Result<Vec<Key>, IndexError> {
        let ndim = target.ndim();
        let keys = match key {
            Key::Tuple(keys) => keys.clone(),
            key => vec![key.clone()],
        };
        if let Some(label) = self.multi_level_label(target, key) {
            let found = target.get_axis(0).contains(&label);
            if found || keys.len() > ndim {
                tracing::debug!(%label, found, "tuple key taken as a multi-level label");
                if !found && mode == Mode::Read {
                    return Err(IndexError::KeyNotFound { key: label, axis: 0 });
                }
                return Ok(pad(vec![Key::Scalar(label)], ndim));
            }
        }
        if keys.len() > ndim {
            return Err(IndexError::TooManyIndexers {
                got: keys.len(),
                ndim,
            });
        }
        Ok(pad(keys, ndim))
    }

    fn multi_level_label<S: Storage>(&self, target: &S, key: &Key) -> Option<Label> {
        let Key::Tuple(keys) = key else {
            return None;
        };
        let labels = target.get_axis(0);
        if self.resolver.policy().is_positional()
            || !labels.is_hierarchical()
            || keys.len() > labels.nlevels()
        {
            return None;
        }
        key.as_label()
    }

    /// Legacy reads try a full tuple of scalars as a direct cell
    /// lookup first.
    fn direct_cell<S: Storage>(&self, target: &S, key: &Key) -> Option<Result<Selected<S>, IndexError>> {
        if !self.resolver.policy().tries_direct_lookup() {
            return None;
        }
        let Key::Tuple(keys) = key else {
            return None;
        };
        if keys.len() != target.ndim() || !keys.iter().all(Key::is_label_like) {
            return None;
        }
        let mut coords = Vec::with_capacity(keys.len());
        for (axis, key) in keys.iter().enumerate() {
            match self.resolver.resolve(key, axis, target.get_axis(axis), Mode::Read) {
                Ok(Selector::Position(p)) => coords.push(p),
                _ => return None,
            }
        }
        Some(target.get_value(&coords).map(Selected::Cell))
    }

    // Every key enumerates entries and no axis is hierarchical.
    fn is_multi_take<S: Storage>(&self, target: &S, keys: &[Key]) -> bool {
        keys.iter().any(Key::is_list_like)
            && keys.iter().all(|k| k.is_list_like() || k.is_null_slice())
            && (0..target.ndim()).all(|axis| !target.get_axis(axis).is_hierarchical())
    }

    fn resolve_all<S: Storage>(&self, target: &S, keys: &[Key]) -> Result<Vec<Selector>, IndexError> {
        keys.iter()
            .enumerate()
            .map(|(axis, key)| self.resolver.resolve(key, axis, target.get_axis(axis), Mode::Read))
            .collect()
    }

    // Lower the first scalar key at or after axis `from`, then
    // continue on the result.
    fn lower<S: Storage>(&self, target: S, mut keys: Vec<Key>, from: usize) -> Result<Selected<S>, IndexError> {
        let Some(axis) = (from..keys.len()).find(|a| keys[*a].is_label_like()) else {
            let selectors = self.resolve_all(&target, &keys)?;
            return self.take_all(target, &selectors).map(Selected::Data);
        };
        let labels = target.get_axis(axis);
        match self.resolver.resolve(&keys[axis], axis, labels, Mode::Read)? {
            Selector::Position(p) => {
                tracing::trace!(axis, position = p, "lowering");
                keys.remove(axis);
                match target.ixs(p, axis)? {
                    Selected::Data(reduced) => self.lower(reduced, keys, axis),
                    cell => Ok(cell),
                }
            }
            selector => {
                let positions: Vec<usize> = selector
                    .indexer(labels.len())
                    .into_iter()
                    .flatten()
                    .collect();
                let hierarchical = labels.is_hierarchical();
                let mut section = target.take(&positions, axis)?;
                if let (true, Some(label)) = (hierarchical, keys[axis].as_label()) {
                    let dropped = section.get_axis(axis).droplevels(label.nlevels());
                    section = section.set_axis(dropped, axis)?;
                }
                keys[axis] = Key::all();
                self.lower(section, keys, axis + 1)
            }
        }
    }

    /// Apply per-axis selectors in one pass, axis by axis.
    fn take_all<S: Storage>(&self, mut target: S, selectors: &[Selector]) -> Result<S, IndexError> {
        let fill = &self.resolver.opts().fill;
        for (axis, selector) in selectors.iter().enumerate() {
            target = match selector {
                s if s.is_null_slice() => continue,
                Selector::Reindex(reindex) => target.reindex_indexer(
                    reindex.labels.iter().cloned().collect(),
                    &reindex.positions,
                    axis,
                    fill,
                )?,
                s => {
                    let size = target.get_axis(axis).len();
                    let positions: Vec<usize> = s.indexer(size).into_iter().flatten().collect();
                    target.take(&positions, axis)?
                }
            };
        }
        Ok(target)
    }
}

fn pad(mut keys: Vec<Key>, ndim: usize) -> Vec<Key> {
    keys.resize(ndim, Key::all());
    keys
}

use std::collections::HashMap;
use std::rc::Rc;

use crate::fs::ObjectStore;
use crate::hashing::Hash;
use crate::object::Object;
use crate::{Error, Result};

use super::decoder::{DeltaBase, PackEntry, PackEntryKind};
use super::delta;

/// Counters describing how a pack was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveSummary {
    /// Entries stored as they came.
    pub objects: usize,
    /// Entries rebuilt from a delta.
    pub deltas: usize,
    /// Passes needed over the pending deltas.
    pub passes: usize,
}

struct PendingDelta {
    offset: usize,
    base: DeltaBase,
    data: Rc<[u8]>,
}

/// Objects resolved so far, reachable both by pack offset and by hash.
struct Resolved<'a> {
    store: &'a ObjectStore,
    by_offset: HashMap<usize, Hash>,
    by_hash: HashMap<Hash, Object>,
}

impl<'a> Resolved<'a> {
    fn persist(&mut self, offset: usize, object: Object) -> Result<Hash> {
        let (hash, compressed) = object.encode()?;
        self.store.write_raw(&hash, &compressed)?;
        self.by_offset.insert(offset, hash);
        self.by_hash.insert(hash, object);
        Ok(hash)
    }

    /// Finds the base of a delta if it is available yet. Bases referenced by hash that are not
    /// part of the pack are looked up in the store.
    fn base(&mut self, base: &DeltaBase) -> Result<Option<Object>> {
        let hash = match base {
            DeltaBase::Offset(offset) => match self.by_offset.get(offset) {
                Some(hash) => *hash,
                None => return Ok(None),
            },
            DeltaBase::Hash(hash) => *hash,
        };

        if let Some(object) = self.by_hash.get(&hash) {
            return Ok(Some(object.clone()));
        }

        if matches!(base, DeltaBase::Hash(_)) && self.store.has(&hash) {
            log::warn!("delta base {} is not in the pack, using the local copy", hash);
            let object = self.store.read(&hash)?;
            self.by_hash.insert(hash, object.clone());
            return Ok(Some(object));
        }

        Ok(None)
    }
}

/// Stores every entry of a pack as a regular object, rebuilding deltas against their bases.
///
/// Non-delta entries are stored first. Pending deltas are then passed over repeatedly, each pass
/// resolving those whose base is already known, until none are left.
///
/// # Errors
///
/// This function will fail with `Error::UnresolvableDeltaChain` if a pass makes no progress while
/// deltas are still pending (a base is missing, or deltas depend on each other in a cycle).
/// Objects stored before the failure stay in the store.
pub fn resolve(store: &ObjectStore, entries: Vec<PackEntry>) -> Result<ResolveSummary> {
    let mut resolved = Resolved {
        store,
        by_offset: HashMap::with_capacity(entries.len()),
        by_hash: HashMap::with_capacity(entries.len()),
    };
    let mut summary = ResolveSummary::default();
    let mut pending = Vec::new();

    for entry in entries {
        match entry.kind {
            PackEntryKind::Object(kind) => {
                resolved.persist(entry.offset, Object::new(kind, entry.data))?;
                summary.objects += 1;
            }
            PackEntryKind::Delta(base) => pending.push(PendingDelta {
                offset: entry.offset,
                base,
                data: entry.data,
            }),
        }
    }

    while !pending.is_empty() {
        summary.passes += 1;
        let before = pending.len();
        let mut unresolved = Vec::with_capacity(before);

        for delta_entry in pending {
            let Some(base) = resolved.base(&delta_entry.base)? else {
                unresolved.push(delta_entry);
                continue;
            };

            let data = delta::apply(&base.data, &delta_entry.data).map_err(|e| {
                Error::DataConsistency(format!(
                    "delta at offset {}: {}",
                    delta_entry.offset, e
                ))
            })?;
            let hash = resolved.persist(delta_entry.offset, Object::new(base.kind, data))?;
            log::debug!("resolved delta at offset {} into {}", delta_entry.offset, hash);
            summary.deltas += 1;
        }

        if unresolved.len() == before {
            return Err(Error::UnresolvableDeltaChain {
                unresolved: unresolved.len(),
            });
        }
        pending = unresolved;
    }

    log::info!(
        "resolved {} objects and {} deltas in {} passes",
        summary.objects,
        summary.deltas,
        summary.passes
    );
    Ok(summary)
}

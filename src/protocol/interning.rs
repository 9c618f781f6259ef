//! Resource interning
//!
//! The authoritative side of a session hands out sequential IDs to resources
//! (strings, sounds, prefabs, particle systems) and ships them in batches.
//! Later messages reference a resource by ID only. The receiving side rebuilds
//! the ID table from the batches and resolves references against it.
//!
//! Resolution failures are consumer-side: they never fail the decoding of the
//! message that carried the reference.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{debug, trace};

use super::message::{
    ArenaParticleSystems, ArenaPrefabs, ArenaSounds, NetworkStrings, ParticleSystem, Prefab,
    SoundInfo, VarU32,
};

/// Interning table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterningError {
    /// Batch overlaps IDs that are already populated
    #[error("batch {start}..{end} overlaps populated id {conflict}")]
    IdRangeConflict {
        /// First ID of the rejected batch
        start: u32,
        /// One past the last ID of the rejected batch
        end: u64,
        /// First already-populated ID inside the range
        conflict: u32,
    },

    /// Reference to an ID that no batch populated
    #[error("unknown resource id {id}")]
    UnknownResourceId {
        /// Requested ID
        id: u32,
    },

    /// Batch would run past the `u32` ID space
    #[error("id space exhausted: {requested} ids requested at {next_id}")]
    IdSpaceExhausted {
        /// Next free ID when the batch was requested (`2^32` once every ID is taken)
        next_id: u64,
        /// Number of IDs requested
        requested: usize,
    },
}

/// Messages carrying a run of sequentially numbered resources.
pub trait InternedBatch: Sized {
    /// Resource carried by the batch
    type Entry;

    /// Build a batch from its parts
    fn from_parts(start_id: u32, entries: Vec<Self::Entry>) -> Self;

    /// ID of the first entry
    fn start_id(&self) -> u32;

    /// Entries in ID order
    fn entries(&self) -> &[Self::Entry];

    /// Consume the batch
    fn into_parts(self) -> (u32, Vec<Self::Entry>);
}

macro_rules! impl_interned_batch {
    ($($batch:ident { $entries:ident: $entry:ty }),* $(,)?) => {
        $(
            impl InternedBatch for $batch {
                type Entry = $entry;

                fn from_parts(start_id: u32, entries: Vec<$entry>) -> Self {
                    Self {
                        start_id: VarU32::new(start_id),
                        $entries: entries,
                    }
                }

                fn start_id(&self) -> u32 {
                    self.start_id.get()
                }

                fn entries(&self) -> &[$entry] {
                    &self.$entries
                }

                fn into_parts(self) -> (u32, Vec<$entry>) {
                    (self.start_id.get(), self.$entries)
                }
            }
        )*
    };
}

impl_interned_batch! {
    NetworkStrings { strings: String },
    ArenaSounds { sounds: SoundInfo },
    ArenaParticleSystems { particle_systems: ParticleSystem },
    ArenaPrefabs { prefabs: Prefab },
}

/// One past the largest interned ID
const ID_SPACE: u64 = 1 << 32;

/// Authoritative ID allocator for one session.
///
/// Owned by the single task that introduces resources; `&mut self` on every
/// mutation keeps allocation single-writer.
#[derive(Debug, Default)]
pub struct InterningProducer {
    // Ranges from 0 to 2^32 so that u32::MAX itself can be handed out
    next_id: u64,
}

impl InterningProducer {
    /// Start a session at ID 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next ID that will be handed out
    ///
    /// Reaches `2^32` once `u32::MAX` has been allocated.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Reserve `count` IDs and return the first one
    ///
    /// The last ID a range may cover is `u32::MAX`, matching what
    /// [`InternTable::apply`] accepts.
    pub fn allocate(&mut self, count: usize) -> Result<u32, InterningError> {
        let exhausted = InterningError::IdSpaceExhausted {
            next_id: self.next_id,
            requested: count,
        };
        let start = u32::try_from(self.next_id).map_err(|_| exhausted.clone())?;
        let end = u64::try_from(count)
            .ok()
            .and_then(|count| self.next_id.checked_add(count))
            .filter(|&end| end <= ID_SPACE)
            .ok_or(exhausted)?;

        self.next_id = end;
        trace!(start, count, "allocated interned id range");
        Ok(start)
    }

    /// Number `entries` from the next free ID and wrap them in a batch message
    pub fn batch<B: InternedBatch>(&mut self, entries: Vec<B::Entry>) -> Result<B, InterningError> {
        let start = self.allocate(entries.len())?;
        Ok(B::from_parts(start, entries))
    }

    /// Forget every assignment (full session reset only)
    pub fn reset(&mut self) {
        debug!(previous_next_id = self.next_id, "interning producer reset");
        self.next_id = 0;
    }
}

/// Receiver-side ID → resource table.
#[derive(Debug, Clone)]
pub struct InternTable<T> {
    entries: BTreeMap<u32, T>,
}

impl<T> Default for InternTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> InternTable<T> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate `start_id..start_id + entries.len()`
    ///
    /// The table is left untouched when the range overlaps populated IDs. An
    /// empty batch is checked as if it covered `start_id`.
    pub fn apply(&mut self, start_id: u32, entries: Vec<T>) -> Result<(), InterningError> {
        let end = u64::from(start_id) + entries.len() as u64;
        if end > ID_SPACE {
            return Err(InterningError::IdSpaceExhausted {
                next_id: u64::from(start_id),
                requested: entries.len(),
            });
        }

        // An empty batch still claims its start ID, so it may not point into
        // a populated run
        let claimed_end = end.max(u64::from(start_id) + 1);
        if let Some((&conflict, _)) = self.entries.range(start_id..).next() {
            if u64::from(conflict) < claimed_end {
                return Err(InterningError::IdRangeConflict {
                    start: start_id,
                    end,
                    conflict,
                });
            }
        }

        let count = entries.len();
        for (offset, entry) in entries.into_iter().enumerate() {
            // `end` was bounds-checked above, so the offset cannot overflow
            self.entries.insert(start_id + offset as u32, entry);
        }
        debug!(start_id, count, total = self.entries.len(), "applied interned batch");
        Ok(())
    }

    /// Apply a received batch message
    pub fn apply_batch<B>(&mut self, batch: B) -> Result<(), InterningError>
    where
        B: InternedBatch<Entry = T>,
    {
        let (start_id, entries) = batch.into_parts();
        self.apply(start_id, entries)
    }

    /// Look up a resource reference
    pub fn resolve(&self, id: u32) -> Result<&T, InterningError> {
        self.entries
            .get(&id)
            .ok_or(InterningError::UnknownResourceId { id })
    }

    /// Check whether `id` is populated
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of populated IDs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empty the table (full session reset only)
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

/// [`InternTable`] shared between one writer and concurrent readers.
///
/// Batches are applied to a private copy that is then published with a single
/// pointer swap, so a reader holding a [`snapshot`](Self::snapshot) sees the
/// table either before or after a batch, never a partially applied range.
#[derive(Debug)]
pub struct SharedInternTable<T> {
    current: RwLock<Arc<InternTable<T>>>,
}

impl<T> Default for SharedInternTable<T> {
    fn default() -> Self {
        Self {
            current: RwLock::new(Arc::new(InternTable::new())),
        }
    }
}

impl<T: Clone> SharedInternTable<T> {
    /// Create an empty shared table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current published table
    #[must_use]
    pub fn snapshot(&self) -> Arc<InternTable<T>> {
        let guard = self
            .current
            .read()
            .expect("intern table lock poisoned");
        Arc::clone(&guard)
    }

    /// Copy, extend and publish
    pub fn apply(&self, start_id: u32, entries: Vec<T>) -> Result<(), InterningError> {
        let mut guard = self
            .current
            .write()
            .expect("intern table lock poisoned");
        let mut next = InternTable::clone(&guard);
        next.apply(start_id, entries)?;
        *guard = Arc::new(next);
        Ok(())
    }

    /// Apply a received batch message
    pub fn apply_batch<B>(&self, batch: B) -> Result<(), InterningError>
    where
        B: InternedBatch<Entry = T>,
    {
        let (start_id, entries) = batch.into_parts();
        self.apply(start_id, entries)
    }

    /// Resolve against the current snapshot
    pub fn resolve(&self, id: u32) -> Result<T, InterningError> {
        self.snapshot().resolve(id).cloned()
    }

    /// Publish an empty table (full session reset only)
    pub fn reset(&self) {
        let mut guard = self
            .current
            .write()
            .expect("intern table lock poisoned");
        *guard = Arc::new(InternTable::new());
    }
}

//! The live snapshot and the lock guarding it.

use std::sync::{Arc, PoisonError, RwLock};

use crate::identity::{Identity, Snapshot};

/// Owns the live [`Snapshot`].
///
/// Reads take the shared side of the lock, [`SnapshotStore::replace`] takes the
/// exclusive side for the whole diff, notify and swap sequence. The snapshot
/// behind the lock is only ever swapped as a whole, so a poisoned lock still
/// guards a consistent value and is recovered instead of propagated.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    live: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// Creates a store holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user holding this credential in the live snapshot.
    pub fn lookup(&self, uuid: &str) -> Option<Identity> {
        let live = self.live.read().unwrap_or_else(PoisonError::into_inner);
        live.get(uuid).cloned()
    }

    /// Runs `f` against the live snapshot while holding the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        let live = self.live.read().unwrap_or_else(PoisonError::into_inner);
        f(&live)
    }

    /// Number of users in the live snapshot.
    pub fn len(&self) -> usize {
        self.read(Snapshot::len)
    }

    /// Whether the live snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.read(Snapshot::is_empty)
    }

    /// Installs `snapshot` as the live snapshot.
    ///
    /// When `on_removed` is given it is called, in ascending id order, for every
    /// user of the old snapshot whose credential is absent from the new one.
    /// All calls complete before the swap and under the same write lock, so no
    /// reader can observe the new snapshot before every departed user has been
    /// reported. Without `on_removed` the diff is skipped.
    pub fn replace(&self, snapshot: Snapshot, on_removed: Option<&mut dyn FnMut(&Identity)>) {
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(on_removed) = on_removed {
            let mut removed: Vec<&Identity> = live.iter().filter(|user| !snapshot.contains(&user.uuid)).collect();
            removed.sort_by_key(|user| user.id);

            for user in removed {
                on_removed(user);
            }
        }

        *live = Arc::new(snapshot);
    }
}

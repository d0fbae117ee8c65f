//! Turns a freshly fetched user list into the new live snapshot.

use crate::{
    identity::{Identity, Snapshot},
    revocation::RevocationSink,
    store::SnapshotStore,
};

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of distinct users in the installed snapshot.
    pub users: usize,
    /// Ids reported to the revocation sink, in the order they were reported.
    pub revoked: Vec<i64>,
}

/// Installs `users` as the live snapshot of `store`.
///
/// Duplicate credentials collapse to their last occurrence. With a sink, every
/// user present in the old snapshot but absent from the new one is kicked by
/// its numeric id before the new snapshot is visible to lookups. Without a
/// sink no diff is computed.
pub fn reconcile(store: &SnapshotStore, users: Vec<Identity>, sink: Option<&dyn RevocationSink>) -> ReconcileReport {
    let snapshot: Snapshot = users.into_iter().collect();
    let mut report = ReconcileReport {
        users: snapshot.len(),
        revoked: Vec::new(),
    };

    match sink {
        Some(sink) => {
            let mut on_removed = |user: &Identity| {
                sink.kick(&user.id.to_string());
                report.revoked.push(user.id);
            };

            store.replace(snapshot, Some(&mut on_removed));
        }
        None => store.replace(snapshot, None),
    }

    if !report.revoked.is_empty() {
        log::info!("Kicked {} users removed from the panel: {:?}", report.revoked.len(), report.revoked);
    }

    report
}

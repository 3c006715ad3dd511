//! Optimistic cache of the remote chat collection for one
//! `(identity, scope)` key at a time.
//!
//! The cache is the sole owner of authoritative local state. Mutations go
//! through a pending ledger: the published snapshot is always the last
//! confirmed state plus every pending transform replayed in call order.
//! A resolution commits or rolls back only its own ledger entry, so a
//! failed mutation disappears exactly while interleaved successes on other
//! items stay applied.
//!
//! Locks are only ever held across synchronous sections, never across an
//! `.await`; the optimistic publish of one mutation therefore cannot
//! interleave with another's.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::watch;

use crate::error::{RemoteError, SyncError};
use crate::model::{ActiveIdentity, CacheKey, ChatSummary, Snapshot};
use crate::remote::{ApiRequest, Transport, operations};

/// Local transform applied optimistically to the item list. Must be pure
/// over its input: it is replayed whenever the published snapshot is
/// recomputed.
pub type Transform = Arc<dyn Fn(&mut Vec<ChatSummary>) + Send + Sync>;

/// Applies authoritative fields from a successful response onto the items.
pub type Merge = Arc<dyn Fn(&mut Vec<ChatSummary>, &Value) + Send + Sync>;

/// Rejects a 2xx response whose payload signals failure; a rejection rolls
/// the mutation back exactly like a transport error.
pub type Validate = Arc<dyn Fn(&Value) -> Result<(), RemoteError> + Send + Sync>;

/// Only supported policy: on remote failure the local transform is undone
/// and the error returned for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RollbackPolicy {
    #[default]
    RollbackOnError,
}

/// A named remote operation paired with its optimistic local transform.
pub struct Mutation {
    pub op: ApiRequest,
    pub transform: Transform,
    pub merge: Option<Merge>,
    pub validate: Option<Validate>,
    pub rollback: RollbackPolicy,
}

impl Mutation {
    pub fn new(op: ApiRequest, transform: Transform) -> Self {
        Self {
            op,
            transform,
            merge: None,
            validate: None,
            rollback: RollbackPolicy::RollbackOnError,
        }
    }

    pub fn with_merge(mut self, merge: Merge) -> Self {
        self.merge = Some(merge);
        self
    }

    pub fn with_validate(mut self, validate: Validate) -> Self {
        self.validate = Some(validate);
        self
    }
}

struct PendingMutation {
    seq: u64,
    transform: Transform,
    merge: Option<Merge>,
    /// Successful response payload, once this entry has resolved.
    committed: Option<Value>,
}

type LoadResult = Result<Snapshot, SyncError>;

struct CacheInner {
    key: Option<CacheKey>,
    /// Bumped on every key switch; in-flight work from an older epoch is
    /// discarded on arrival.
    epoch: u64,
    /// Last state confirmed by the remote (fetch result plus folded
    /// committed mutations). `None` until the first successful load.
    confirmed: Option<Vec<ChatSummary>>,
    pending: VecDeque<PendingMutation>,
    /// Published snapshot: confirmed + pending replay. Recomputed after
    /// every ledger change.
    current: Option<Snapshot>,
    next_seq: u64,
    inflight: Option<watch::Receiver<Option<LoadResult>>>,
}

impl CacheInner {
    fn reset_for(&mut self, key: CacheKey) {
        self.key = Some(key);
        self.epoch += 1;
        self.confirmed = None;
        self.pending.clear();
        self.current = None;
        self.inflight = None;
    }

    fn recompute_current(&mut self) {
        let (Some(confirmed), Some(key)) = (&self.confirmed, &self.key) else {
            self.current = None;
            return;
        };
        let mut items = confirmed.clone();
        for entry in &self.pending {
            (entry.transform)(&mut items);
            // Committed-but-unfolded entries already have authoritative
            // fields; apply them in replay as well.
            if let (Some(merge), Some(resp)) = (&entry.merge, &entry.committed) {
                merge(&mut items, resp);
            }
        }
        self.current = Some(Snapshot {
            items,
            fetched_for: key.clone(),
        });
    }

    fn commit(&mut self, seq: u64, response: Value) {
        if let Some(entry) = self.pending.iter_mut().find(|e| e.seq == seq) {
            entry.committed = Some(response);
        }
        // Fold the committed prefix into the confirmed state. Entries
        // behind an unresolved one stay pending so call order is kept.
        while let Some(entry) = self.pending.pop_front() {
            match &entry.committed {
                Some(resp) => {
                    if let Some(confirmed) = &mut self.confirmed {
                        (entry.transform)(confirmed);
                        if let Some(merge) = &entry.merge {
                            merge(confirmed, resp);
                        }
                    }
                }
                None => {
                    self.pending.push_front(entry);
                    break;
                }
            }
        }
        self.recompute_current();
    }

    fn discard(&mut self, seq: u64) {
        self.pending.retain(|e| e.seq != seq);
        self.recompute_current();
    }
}

/// The cache. One logical collection per instance; switching
/// `(identity, scope)` replaces the snapshot wholesale.
pub struct ChatCache {
    transport: Arc<dyn Transport>,
    inner: Mutex<CacheInner>,
}

enum LoadRole {
    Leader {
        tx: watch::Sender<Option<LoadResult>>,
        epoch: u64,
        key: CacheKey,
    },
    Follower(watch::Receiver<Option<LoadResult>>),
}

impl ChatCache {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            inner: Mutex::new(CacheInner {
                key: None,
                epoch: 0,
                confirmed: None,
                pending: VecDeque::new(),
                current: None,
                next_seq: 0,
                inflight: None,
            }),
        }
    }

    /// The key of the currently held collection, if any load has started.
    pub fn key(&self) -> Option<CacheKey> {
        self.inner.lock().unwrap().key.clone()
    }

    /// Synchronous read of the latest published snapshot; `None` while no
    /// load has succeeded for the current key.
    pub fn current(&self) -> Option<Snapshot> {
        self.inner.lock().unwrap().current.clone()
    }

    /// Fetches the collection for `identity` + `scope` and replaces the
    /// snapshot wholesale. An explicit `scope` wins over the identity's
    /// default scope. Concurrent loads for the same key coalesce into one
    /// request; every waiter receives the same result. A failed load
    /// leaves the previous snapshot (if any) intact.
    pub async fn load(
        &self,
        identity: &ActiveIdentity,
        scope: Option<&str>,
    ) -> Result<Snapshot, SyncError> {
        let api_key = identity
            .api_key
            .clone()
            .ok_or(SyncError::NotAuthenticated)?;
        let scope = scope
            .map(str::to_string)
            .or_else(|| identity.default_scope.clone());
        let key = CacheKey { api_key, scope };

        let role = {
            let mut inner = self.inner.lock().unwrap();
            if inner.key.as_ref() != Some(&key) {
                log::debug!("cache key switch (scope {:?})", key.scope);
                inner.reset_for(key.clone());
            }
            match &inner.inflight {
                Some(rx) => LoadRole::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    inner.inflight = Some(rx);
                    LoadRole::Leader {
                        tx,
                        epoch: inner.epoch,
                        key: key.clone(),
                    }
                }
            }
        };

        match role {
            LoadRole::Follower(mut rx) => loop {
                {
                    let slot = rx.borrow_and_update();
                    if let Some(result) = slot.as_ref() {
                        return result.clone();
                    }
                }
                if rx.changed().await.is_err() {
                    // Leader dropped without publishing (cancelled). Clear
                    // the dead channel so the next load starts fresh.
                    let mut inner = self.inner.lock().unwrap();
                    if let Some(current) = &inner.inflight
                        && current.same_channel(&rx)
                    {
                        inner.inflight = None;
                    }
                    return Err(SyncError::Stale);
                }
            },
            LoadRole::Leader { tx, epoch, key } => {
                let result = self.transport.execute(operations::find_chats(&key)).await;
                let out = self.finish_load(epoch, result);
                let _ = tx.send(Some(out.clone()));
                out
            }
        }
    }

    fn finish_load(&self, epoch: u64, result: Result<Value, RemoteError>) -> LoadResult {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            // The key changed while this fetch was in flight; its payload
            // must not overwrite the new key's snapshot.
            log::debug!("discarding stale load response");
            return Err(SyncError::Stale);
        }
        inner.inflight = None;
        let items = match result.and_then(operations::parse_chats) {
            Ok(items) => items,
            Err(err) => return Err(err.into()),
        };
        inner.confirmed = Some(items.clone());
        inner.pending.clear();
        inner.recompute_current();
        // The key is set whenever the epoch matches; the published
        // snapshot equals the fetched items since the ledger is empty.
        let fetched_for = inner.key.clone().ok_or(SyncError::Stale)?;
        Ok(Snapshot { items, fetched_for })
    }

    /// The optimistic-mutate primitive.
    ///
    /// The transform is appended to the ledger and published synchronously,
    /// so observers see it before the remote round-trip completes; then
    /// the remote operation runs without any lock held. Success commits
    /// the entry (after optional response validation, with optional
    /// authoritative merge); failure removes exactly this entry and
    /// returns the error for presentation.
    ///
    /// Fails fast with `NotLoaded` before the first successful load; no
    /// snapshot is created and no request issued. A mutation whose request
    /// was built for a key the cache has since switched away from is
    /// rejected with `Stale` before it reaches the network.
    pub async fn mutate(&self, mutation: Mutation) -> Result<Value, SyncError> {
        let Mutation {
            op,
            transform,
            merge,
            validate,
            rollback: RollbackPolicy::RollbackOnError,
        } = mutation;

        let (seq, epoch) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.confirmed.is_none() {
                return Err(SyncError::NotLoaded);
            }
            // The request was built from an earlier read of the key. If the
            // key switched in between, the request carries the old key's
            // credentials and must not reach the network.
            let key_matches = inner
                .key
                .as_ref()
                .is_some_and(|k| k.api_key == op.api_key && k.scope == op.scope);
            if !key_matches {
                return Err(SyncError::Stale);
            }
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.pending.push_back(PendingMutation {
                seq,
                transform,
                merge,
                committed: None,
            });
            inner.recompute_current();
            (seq, inner.epoch)
        };

        let result = self.transport.execute(op).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            // Key switched while in flight; the ledger entry is gone and
            // the snapshot now belongs to another key.
            return Err(SyncError::Stale);
        }
        match result {
            Ok(value) => {
                if let Some(validate) = &validate
                    && let Err(err) = validate(&value)
                {
                    log::debug!("mutation {seq} rejected by validation: {err}");
                    inner.discard(seq);
                    return Err(err.into());
                }
                inner.commit(seq, value.clone());
                Ok(value)
            }
            Err(err) => {
                log::debug!("mutation {seq} rolled back: {err}");
                inner.discard(seq);
                Err(err.into())
            }
        }
    }
}

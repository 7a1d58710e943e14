//! Per-key FIFO wait queues for BLPOP and XREAD BLOCK.
//!
//! The coordinator lives next to the keyspace under the same lock, so a producer's
//! mutation and its wake-up step are one critical section. It only hands out wake
//! signals; a woken waiter re-checks its own condition under the lock and re-queues
//! itself at the front when someone else got there first.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::client::ClientId;

pub type WaiterId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// Woken one at a time, oldest first.
    ListPop,
    /// Every reader on the key is woken by an append.
    StreamRead,
}

#[derive(Debug)]
struct Waiter {
    client: ClientId,
    kind: WaitKind,
    keys: Vec<String>,
    signal: mpsc::Sender<()>,
    signalled: bool,
}

/// Handed to a blocked command; dropping the receiver abandons the wait.
#[derive(Debug)]
pub struct WaitTicket {
    pub id: WaiterId,
    pub receiver: mpsc::Receiver<()>,
}

#[derive(Debug, Default)]
pub struct BlockingCoordinator {
    next_id: WaiterId,
    queues: HashMap<String, VecDeque<WaiterId>>,
    waiters: HashMap<WaiterId, Waiter>,
}

impl BlockingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a new waiter at the back of every key in `keys`.
    pub fn register(&mut self, client: ClientId, kind: WaitKind, keys: &[String]) -> WaitTicket {
        self.next_id += 1;
        let id = self.next_id;
        let (signal, receiver) = mpsc::channel(1);

        for key in keys {
            self.queues.entry(key.clone()).or_default().push_back(id);
        }

        self.waiters.insert(
            id,
            Waiter {
                client,
                kind,
                keys: keys.to_vec(),
                signal,
                signalled: false,
            },
        );

        WaitTicket { id, receiver }
    }

    /// Puts a woken list waiter back at the head of its queues after its re-check failed,
    /// so it keeps its place ahead of waiters that blocked later.
    pub fn requeue_front(&mut self, id: WaiterId) {
        let Some(waiter) = self.waiters.get_mut(&id) else {
            return;
        };

        waiter.signalled = false;

        for key in &waiter.keys {
            let queue = self.queues.entry(key.clone()).or_default();
            if !queue.contains(&id) {
                queue.push_front(id);
            }
        }
    }

    pub fn unregister(&mut self, id: WaiterId) {
        let Some(waiter) = self.waiters.remove(&id) else {
            return;
        };

        for key in &waiter.keys {
            self.detach(key, id);
        }
    }

    fn detach(&mut self, key: &str, id: WaiterId) {
        if let Some(queue) = self.queues.get_mut(key) {
            queue.retain(|queued| *queued != id);
            if queue.is_empty() {
                self.queues.remove(key);
            }
        }
    }

    /// Wakes the oldest live list waiter on `key`.
    ///
    /// Waiters whose receiver is gone are dropped on the way. The woken waiter leaves all
    /// of its queues so a push on another of its keys goes to the next waiter instead.
    pub fn notify_list(&mut self, key: &str) {
        loop {
            let Some(id) = self.next_waiter(key, WaitKind::ListPop) else {
                return;
            };

            let Some(waiter) = self.waiters.get_mut(&id) else {
                self.detach(key, id);
                continue;
            };

            match waiter.signal.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {
                    waiter.signalled = true;
                    let keys = waiter.keys.clone();
                    for waiter_key in &keys {
                        self.detach(waiter_key, id);
                    }
                    return;
                }
                Err(TrySendError::Closed(())) => self.unregister(id),
            }
        }
    }

    /// Wakes every stream reader on `key`. Readers stay queued until they finish.
    pub fn notify_stream(&mut self, key: &str) {
        let Some(queue) = self.queues.get(key) else {
            return;
        };

        let mut abandoned = Vec::new();

        for id in queue {
            let Some(waiter) = self.waiters.get(id) else {
                continue;
            };

            if waiter.kind != WaitKind::StreamRead {
                continue;
            }

            if let Err(TrySendError::Closed(())) = waiter.signal.try_send(()) {
                abandoned.push(*id);
            }
        }

        for id in abandoned {
            self.unregister(id);
        }
    }

    fn next_waiter(&self, key: &str, kind: WaitKind) -> Option<WaiterId> {
        self.queues.get(key)?.iter().copied().find(|id| {
            self.waiters
                .get(id)
                .is_none_or(|waiter| waiter.kind == kind)
        })
    }

    /// Drops every waiter owned by `client`.
    ///
    /// Returns the keys whose pending hand-off was lost with the client, so the caller
    /// can pass it on to the next waiter.
    pub fn abandon_client(&mut self, client: ClientId) -> Vec<String> {
        let ids = self
            .waiters
            .iter()
            .filter(|(_, waiter)| waiter.client == client)
            .map(|(id, _)| *id)
            .collect::<Vec<WaiterId>>();

        let mut orphaned_keys = Vec::new();

        for id in ids {
            if let Some(waiter) = self.waiters.get(&id) {
                if waiter.signalled && waiter.kind == WaitKind::ListPop {
                    orphaned_keys.extend(waiter.keys.iter().cloned());
                }
            }
            self.unregister(id);
        }

        orphaned_keys
    }

    pub fn queued_on(&self, key: &str) -> usize {
        self.queues.get(key).map_or(0, VecDeque::len)
    }
}

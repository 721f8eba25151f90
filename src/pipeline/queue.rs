use crate::error::{CatalogError, Result};
use crate::types::FetchJob;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Semaphore};

/// What a worker can pull off the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(FetchJob),
    /// Tells the worker that receives it to exit.
    Stop,
}

/// Multi-producer, multi-consumer work queue with task accounting.
///
/// Every item handed out by [`JobQueue::dequeue`] must be acknowledged with
/// [`JobQueue::mark_done`]; [`JobQueue::join`] resolves once the number of
/// acknowledgements catches up with the number of items enqueued.
#[derive(Debug)]
pub struct JobQueue {
    items: Mutex<VecDeque<QueueItem>>,
    // one permit per queued item
    available: Semaphore,
    // one permit per free slot, bounded queues only
    slots: Option<Semaphore>,
    unfinished: watch::Sender<usize>,
}

impl JobQueue {
    pub fn unbounded() -> Self {
        Self::with_slots(None)
    }

    /// Queue holding at most `capacity` items; `enqueue` waits for room.
    pub fn bounded(capacity: usize) -> Self {
        Self::with_slots(Some(Semaphore::new(capacity.max(1))))
    }

    fn with_slots(slots: Option<Semaphore>) -> Self {
        let (unfinished, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            slots,
            unfinished,
        }
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<QueueItem>> {
        // The deque holds no invariant a panicking holder could break.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn enqueue(&self, item: QueueItem) -> Result<()> {
        if let Some(slots) = &self.slots {
            slots
                .acquire()
                .await
                .map_err(|e| CatalogError::Queue(format!("queue closed: {e}")))?
                .forget();
        }
        // Count the item before it becomes visible so `join` can never observe
        // a consumer's `mark_done` ahead of the matching increment.
        self.unfinished.send_modify(|n| *n += 1);
        self.lock_items().push_back(item);
        self.available.add_permits(1);
        Ok(())
    }

    /// Wait for the next item.
    pub async fn dequeue(&self) -> Result<QueueItem> {
        self.available
            .acquire()
            .await
            .map_err(|e| CatalogError::Queue(format!("queue closed: {e}")))?
            .forget();
        let item = self
            .lock_items()
            .pop_front()
            .ok_or_else(|| CatalogError::Queue("item permit without item".to_string()))?;
        if let Some(slots) = &self.slots {
            slots.add_permits(1);
        }
        Ok(item)
    }

    /// Acknowledge one dequeued item, job or stop signal alike.
    pub fn mark_done(&self) -> Result<()> {
        let mut underflow = false;
        self.unfinished.send_if_modified(|n| match n.checked_sub(1) {
            Some(left) => {
                *n = left;
                true
            }
            None => {
                underflow = true;
                false
            }
        });
        if underflow {
            return Err(CatalogError::Queue(
                "mark_done called more times than items were enqueued".to_string(),
            ));
        }
        Ok(())
    }

    /// Wait until every item enqueued so far has been marked done.
    pub async fn join(&self) -> Result<()> {
        let mut rx = self.unfinished.subscribe();
        rx.wait_for(|n| *n == 0)
            .await
            .map(|_| ())
            .map_err(|e| CatalogError::Queue(format!("queue dropped while joining: {e}")))
    }

    /// Items enqueued and not yet marked done.
    pub fn unfinished(&self) -> usize {
        *self.unfinished.borrow()
    }

    /// Items waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

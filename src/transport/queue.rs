use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

/// FIFO of complete inbound frames shared by the receive task and the game loop.
///
/// The lock is only ever held for a single push or pop. Waiters are woken
/// through a [`Notify`], so a consumer never has to spin.
#[derive(Debug, Default)]
pub struct InboundQueue {
    frames: Mutex<VecDeque<String>>,
    notify: Notify,
}

impl InboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn frames(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, frame: String) {
        self.frames().push_back(frame);
        self.notify.notify_one();
    }

    pub fn pop(&self) -> Option<String> {
        self.frames().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.frames().is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames().len()
    }

    /// Drop everything queued; returns how many frames were discarded.
    pub fn drain(&self) -> usize {
        let mut frames = self.frames();
        let n = frames.len();
        frames.clear();
        n
    }

    /// Wake a waiting consumer without queueing anything (used on disconnect).
    pub fn wake(&self) {
        self.notify.notify_one();
    }

    /// Suspend until a frame is pushed, [`wake`](Self::wake) is called, or `timeout` passes.
    pub async fn wait(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.notify.notified()).await;
    }
}

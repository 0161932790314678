use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::MAX_FRAME_LEN;
use crate::transport::connection::{validate_frame, ConnectionError};
use crate::transport::queue::InboundQueue;
use crate::transport::Link;

/// In-process link used by the simulator and tests. Frames obey the same
/// rules as on a socket.
#[derive(Debug)]
pub struct InMemoryLink {
    inbound: Arc<InboundQueue>,
    outbound: Arc<InboundQueue>,
    open: Arc<AtomicBool>,
}

impl InMemoryLink {
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(InboundQueue::new());
        let b = Arc::new(InboundQueue::new());
        let open = Arc::new(AtomicBool::new(true));
        (
            Self {
                inbound: a.clone(),
                outbound: b.clone(),
                open: open.clone(),
            },
            Self {
                inbound: b,
                outbound: a,
                open,
            },
        )
    }

    /// Close both directions. Frames already delivered stay readable.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        self.inbound.wake();
        self.outbound.wake();
    }
}

impl Drop for InMemoryLink {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait::async_trait]
impl Link for InMemoryLink {
    async fn send_message(&self, text: &str) -> Result<(), ConnectionError> {
        validate_frame(text, MAX_FRAME_LEN)?;
        if self.is_connected() {
            self.outbound.push(text.to_string());
        }
        Ok(())
    }

    fn has_messages(&self) -> bool {
        !self.inbound.is_empty()
    }

    fn pop_message(&self) -> Option<String> {
        self.inbound.pop()
    }

    fn is_connected(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    async fn wait_for_message(&self, timeout: Duration) {
        if self.has_messages() || !self.is_connected() {
            return;
        }
        self.inbound.wait(timeout).await;
    }
}

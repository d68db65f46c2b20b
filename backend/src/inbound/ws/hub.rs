//! Fan-out of chat frames to every connected WebSocket session.
//!
//! Each session joins the hub and receives a [`Membership`] holding its own
//! broadcast receiver. Dropping the membership leaves the hub, so the
//! connected-session count stays correct however a session ends.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::broadcast;

use super::messages::ServerFrame;

const DEFAULT_CAPACITY: usize = 256;

/// Frame published to the hub plus the session that caused it, if any.
#[derive(Debug, Clone)]
pub struct Broadcast {
    /// Sessions skip frames they originated themselves.
    pub origin: Option<u64>,
    pub frame: ServerFrame,
}

struct HubInner {
    sender: broadcast::Sender<Broadcast>,
    connected: AtomicUsize,
    next_id: AtomicU64,
}

/// Shared handle to the chat broadcast channel.
#[derive(Clone)]
pub struct ChatHub {
    inner: Arc<HubInner>,
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChatHub {
    /// Hub buffering up to `capacity` frames per lagging receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(HubInner {
                sender,
                connected: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a session and subscribe it to future frames.
    pub fn join(&self) -> Membership {
        let receiver = self.inner.sender.subscribe();
        self.inner.connected.fetch_add(1, Ordering::AcqRel);
        Membership {
            hub: self.clone(),
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            receiver,
        }
    }

    /// Send a frame to every member. Frames published while nobody listens are dropped.
    pub fn publish(&self, origin: Option<u64>, frame: ServerFrame) {
        // `send` only fails when there are no receivers.
        let _ = self.inner.sender.send(Broadcast { origin, frame });
    }

    /// Number of sessions currently joined.
    pub fn connected(&self) -> usize {
        self.inner.connected.load(Ordering::Acquire)
    }
}

/// A session's place in the hub.
pub struct Membership {
    hub: ChatHub,
    id: u64,
    receiver: broadcast::Receiver<Broadcast>,
}

impl Membership {
    /// Identifier used as the `origin` of frames this session publishes.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next frame meant for this session, skipping its own.
    ///
    /// Returns `Err(Lagged)` when frames were lost because the session fell
    /// behind, and `Err(Closed)` once the hub is gone.
    pub async fn recv(&mut self) -> Result<ServerFrame, broadcast::error::RecvError> {
        loop {
            let broadcast = self.receiver.recv().await?;
            if broadcast.origin != Some(self.id) {
                return Ok(broadcast.frame);
            }
        }
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.hub.inner.connected.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn membership_tracks_connected_sessions() {
        let hub = ChatHub::default();
        let first = hub.join();
        let second = hub.join();
        assert_eq!(hub.connected(), 2);
        assert_ne!(first.id(), second.id());

        drop(first);
        assert_eq!(hub.connected(), 1);
        drop(second);
        assert_eq!(hub.connected(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn members_skip_their_own_frames() {
        let hub = ChatHub::default();
        let mut sender = hub.join();
        let mut listener = hub.join();

        hub.publish(Some(sender.id()), ServerFrame::UserConnected { connected: 2 });
        hub.publish(None, ServerFrame::UserDisconnected { connected: 1 });

        assert!(matches!(
            listener.recv().await,
            Ok(ServerFrame::UserConnected { connected: 2 })
        ));
        assert!(matches!(
            sender.recv().await,
            Ok(ServerFrame::UserDisconnected { connected: 1 })
        ));
    }
}

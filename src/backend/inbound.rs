//! Inbound frame stream
//!
//! Every successful open creates a fresh single-producer, single-consumer
//! channel. The transport's reader holds the [`FrameSink`] and the session
//! controller holds the [`Subscription`]. Because the channel is created per
//! open, a frame read during one session can never be delivered to the next.
//!
//! Closing the session cancels the subscription; the reader notices on its
//! next push and stops. A frame racing the teardown may be dropped.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Create the sink/subscription pair for session `generation`
pub fn subscribe(generation: u64) -> (FrameSink, Subscription) {
    let (tx, rx) = unbounded();
    let cancelled = Arc::new(AtomicBool::new(false));

    let sink = FrameSink {
        generation,
        sender: tx,
        cancelled: cancelled.clone(),
    };
    let subscription = Subscription {
        generation,
        receiver: rx,
        cancelled,
    };
    (sink, subscription)
}

/// Producer half, owned by the transport reader
#[derive(Debug, Clone)]
pub struct FrameSink {
    generation: u64,
    sender: Sender<Vec<u8>>,
    cancelled: Arc<AtomicBool>,
}

impl FrameSink {
    /// Deliver one frame.
    ///
    /// Returns `false` once the subscription is cancelled or dropped; the
    /// reader should stop reading then.
    pub fn push(&self, frame: Vec<u8>) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.sender.send(frame).is_ok()
    }

    /// Whether the consumer has gone away
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Consumer half, owned by the session controller for one open/close cycle
#[derive(Debug)]
pub struct Subscription {
    generation: u64,
    receiver: Receiver<Vec<u8>>,
    cancelled: Arc<AtomicBool>,
}

impl Subscription {
    /// Next pending frame, if any
    pub fn try_next(&self) -> Option<Vec<u8>> {
        if self.is_cancelled() {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All pending frames in arrival order
    pub fn drain(&self) -> Vec<Vec<u8>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Receiver for use in `select!`
    pub fn receiver(&self) -> &Receiver<Vec<u8>> {
        &self.receiver
    }

    /// Stop accepting frames; later pushes are dropped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

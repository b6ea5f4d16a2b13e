//! Topic-tagged command publishing.
//!
//! Commands are MessagePack-encoded `(topic, twist)` pairs, one datagram per
//! command, sent fire-and-forget over UDP to a single destination. A bounded
//! outbound queue decouples the frame loop from the socket; when the queue is
//! full, the *oldest* unsent command is dropped, since a newer command fully
//! supersedes it anyway.

use std::net::UdpSocket;
use std::thread::{self, JoinHandle};

use anyhow::Context;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::cmd::Twist;

/// Depth of the outbound command queue.
const QUEUE_DEPTH: usize = 5;

/// Publishes [`Twist`] commands to a motion topic.
///
/// The socket is owned by a dedicated sender thread; dropping the publisher
/// disconnects the queue and joins that thread. Commands still queued at that
/// point are sent, nothing is retried.
pub struct TwistPublisher {
    queue: Option<Sender<Twist>>,
    /// Second handle on the queue, used to evict the oldest entry when full.
    backlog: Receiver<Twist>,
    worker: Option<JoinHandle<()>>,
}

impl TwistPublisher {
    /// Creates a publisher for `topic`, sending to `dest` (`host:port`).
    ///
    /// The socket is connected once; an unresolvable or unreachable
    /// destination is a startup error, there is no retry loop.
    pub fn new(topic: String, dest: &str) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("failed to bind UDP socket")?;
        socket
            .connect(dest)
            .with_context(|| format!("failed to connect to {dest}"))?;
        log::info!("publishing {topic} to {dest}");

        let (queue, rx) = channel::bounded(QUEUE_DEPTH);
        let backlog = rx.clone();
        let worker = thread::Builder::new()
            .name("publisher".into())
            .spawn(move || publish_loop(socket, topic, rx))?;

        Ok(Self {
            queue: Some(queue),
            backlog,
            worker: Some(worker),
        })
    }

    /// Enqueues `twist` for publishing. Never blocks; when the queue is full
    /// the oldest queued command is dropped to make room.
    pub fn publish(&self, twist: Twist) {
        let Some(queue) = &self.queue else { return };
        enqueue_latest(queue, &self.backlog, twist);
    }
}

impl Drop for TwistPublisher {
    fn drop(&mut self) {
        // Disconnect the queue first so the sender thread's loop ends.
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
        }
    }
}

fn publish_loop(socket: UdpSocket, topic: String, queue: Receiver<Twist>) {
    for twist in queue {
        let buf = match rmp_serde::to_vec(&(topic.as_str(), twist)) {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("failed to encode command: {e}");
                continue;
            }
        };
        if let Err(e) = socket.send(&buf) {
            log::warn!("failed to publish command: {e}");
        }
    }
}

/// Enqueues `value`, evicting the oldest queued element when `queue` is full.
///
/// `backlog` must be a receiver on the same channel as `queue`.
fn enqueue_latest<T>(queue: &Sender<T>, backlog: &Receiver<T>, mut value: T) {
    loop {
        match queue.try_send(value) {
            Ok(()) => return,
            Err(TrySendError::Full(rejected)) => {
                // Make room by discarding the oldest entry. The consumer may
                // also have drained the queue in the meantime; either way the
                // next attempt has a slot unless the producer is outpaced
                // again.
                backlog.try_recv().ok();
                value = rejected;
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("publisher is gone, dropping command");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_drops_oldest() {
        let (tx, rx) = channel::bounded(QUEUE_DEPTH);
        let backlog = rx.clone();

        for value in 1..=6 {
            enqueue_latest(&tx, &backlog, value);
        }

        let queued: Vec<i32> = rx.try_iter().collect();
        assert_eq!(queued, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn queue_keeps_newest_when_outpaced() {
        let (tx, rx) = channel::bounded(QUEUE_DEPTH);
        let backlog = rx.clone();

        for value in 0..100 {
            enqueue_latest(&tx, &backlog, value);
        }

        let queued: Vec<i32> = rx.try_iter().collect();
        assert_eq!(queued, vec![95, 96, 97, 98, 99]);
    }
}

//! Update sinks
//!
//! [`ChannelOutstation`] stands in for the protocol stack's outstation: every
//! batch applied by a point is forwarded into an unbounded channel, so an async
//! task can log, mirror or assert on the stream of updates.

use std::sync::Arc;

use dnp_protocol::{Outstation, Updates};
use tokio::sync::mpsc;
use tracing::trace;

/// An [`Outstation`] that forwards update batches to a channel
#[derive(Debug)]
pub struct ChannelOutstation {
    tx: mpsc::UnboundedSender<Updates>,
}

impl ChannelOutstation {
    /// Create a sink and the receiver that observes it
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Updates>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    /// Create a sink already coerced to the trait object points hold
    pub fn shared() -> (Arc<dyn Outstation>, mpsc::UnboundedReceiver<Updates>) {
        let (sink, rx) = Self::new();
        (sink as Arc<dyn Outstation>, rx)
    }
}

impl Outstation for ChannelOutstation {
    fn apply(&self, updates: Updates) {
        // Receiver gone means nobody is watching; points keep their values
        if self.tx.send(updates).is_err() {
            trace!("Update receiver closed, batch dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use dnp_protocol::{Binary, DnpTime, Flags, UpdateBuilder};

    fn batch(index: u16) -> Updates {
        let mut builder = UpdateBuilder::new();
        builder.update(
            Binary {
                value: true,
                flags: Flags::ONLINE,
                time: DnpTime(0),
            },
            index,
        );
        builder.build()
    }

    #[test]
    fn test_forwards_batches_in_order() {
        let (sink, mut rx) = ChannelOutstation::shared();
        sink.apply(batch(1));
        sink.apply(batch(2));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.iter().next().map(|u| u.index), Some(1));
        assert_eq!(second.iter().next().map(|u| u.index), Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (sink, rx) = ChannelOutstation::new();
        drop(rx);
        sink.apply(batch(0));
    }
}

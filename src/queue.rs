use crate::SampleBlock;
use crossbeam_channel::{bounded, Receiver, SendError, Sender};

/// Create the bounded block queue shared by the acquisition and writer
/// threads.
///
/// `push` blocks once `capacity` blocks are in flight, which is what paces
/// the acquisition side when the disk falls behind. Dropping the sender
/// closes the queue: buffered blocks stay poppable, then `pop` reports
/// end-of-stream. Dropping the receiver wakes a producer stalled in `push`.
pub fn sample_queue(capacity: usize) -> (BlockSender, BlockReceiver) {
    let (tx, rx) = bounded(capacity);
    (BlockSender { tx }, BlockReceiver { rx })
}

/// Producer half of the sample queue. Held only by the acquisition thread.
pub struct BlockSender {
    tx: Sender<SampleBlock>,
}

/// Returned by `push` when the consumer has gone away; carries the block
/// that could not be delivered.
#[derive(Debug)]
pub struct QueueClosed(pub SampleBlock);

impl BlockSender {
    /// Blocking push with backpressure.
    pub fn push(&self, block: SampleBlock) -> Result<(), QueueClosed> {
        self.tx.send(block).map_err(|SendError(block)| QueueClosed(block))
    }

    /// Signal that no further blocks will arrive.
    pub fn close(self) {}
}

/// Consumer half of the sample queue. Held only by the writer thread.
pub struct BlockReceiver {
    rx: Receiver<SampleBlock>,
}

impl BlockReceiver {
    /// Blocking pop; `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<SampleBlock> {
        self.rx.recv().ok()
    }

    /// Number of blocks currently buffered.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

//! Message types between producers, the controller and the tick loop.

use crossbeam_channel::Sender;

/// Commands consumed by the tick loop at the start of each tick.
#[derive(Debug)]
pub enum Command<T> {
    /// Queue new content for admission.
    Put(T),
    /// Freeze active items and suspend admission.
    Pause,
    /// Undo a previous pause.
    Resume,
}

/// Cloneable handle for feeding content from any thread.
///
/// Content travels through a channel and only the tick loop moves it into the
/// scheduler's queue, so producers never touch scheduler state directly.
#[derive(Debug)]
pub struct Producer<T> {
    sender: Sender<Command<T>>,
}

impl<T> Producer<T> {
    pub(crate) const fn new(sender: Sender<Command<T>>) -> Self {
        Self { sender }
    }

    /// Send content towards the pending queue.
    ///
    /// Returns `false` if the controller has been dropped.
    pub fn put(&self, content: T) -> bool {
        self.sender.send(Command::Put(content)).is_ok()
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

use std::time::{Duration, Instant};

use crossbeam::channel;

use crate::{ChannelError, Result};

/// Creates a channel with no buffer, every send waits for a
/// receiver to take the message.
pub fn rendezvous<T>() -> (SendChannel<T>, ReceiveChannel<T>) {
    bounded(0)
}

/// Creates a channel that buffers up to `capacity` messages before
/// a send has to wait for the receiver.
pub fn bounded<T>(capacity: usize) -> (SendChannel<T>, ReceiveChannel<T>) {
    let (tx, rx) = channel::bounded::<T>(capacity);
    (SendChannel::new(tx), ReceiveChannel::new(rx))
}

pub fn unbounded<T>() -> (SendChannel<T>, ReceiveChannel<T>) {
    let (tx, rx) = channel::unbounded::<T>();
    (SendChannel::new(tx), ReceiveChannel::new(rx))
}

/// The sending half of a channel.
///
/// Cloning produces another sender for the same channel (fan-in), the
/// channel only closes once every clone is closed or dropped.
#[derive(Debug)]
pub struct SendChannel<T> {
    src: channel::Sender<T>,
}

impl<T> Clone for SendChannel<T> {
    fn clone(&self) -> Self {
        Self {
            src: self.src.clone(),
        }
    }
}

impl<T> SendChannel<T> {
    fn new(src: channel::Sender<T>) -> Self {
        Self { src }
    }

    /// [`SendChannel`].block_send() blocks the current thread till the
    /// message is handed over (or buffered) or the receiver is gone.
    pub fn block_send(&self, t: T) -> Result<()> {
        self.src.send(t).map_err(|_| ChannelError::Closed)
    }

    pub fn try_send(&self, t: T) -> Result<()> {
        match self.src.try_send(t) {
            Ok(()) => Ok(()),
            Err(channel::TrySendError::Full(_)) => Err(ChannelError::Full),
            Err(channel::TrySendError::Disconnected(_)) => Err(ChannelError::Closed),
        }
    }

    pub fn pending_message_count(&self) -> usize {
        self.src.len()
    }

    /// Returns the buffer size, `Some(0)` for rendezvous channels and
    /// `None` for unbounded ones.
    pub fn capacity(&self) -> Option<usize> {
        self.src.capacity()
    }

    /// Closes this sender. The handle is consumed so nothing can be
    /// sent through it afterwards.
    pub fn close(self) {
        drop(self);
    }
}

/// The receiving half of a channel.
#[derive(Debug)]
pub struct ReceiveChannel<T> {
    src: Option<channel::Receiver<T>>,
}

impl<T> ReceiveChannel<T> {
    fn new(src: channel::Receiver<T>) -> Self {
        Self { src: Some(src) }
    }

    /// Returns true once this receiver has observed that the channel
    /// was closed and drained.
    pub fn closed(&self) -> bool {
        self.src.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.src.as_ref().map_or(true, channel::Receiver::is_empty)
    }

    pub fn len(&self) -> usize {
        self.src.as_ref().map_or(0, channel::Receiver::len)
    }

    /// [`ReceiveChannel`].block_receive() blocks the current thread till a
    /// message arrives or every sender is gone. Buffered messages are
    /// still returned after the senders closed.
    pub fn block_receive(&mut self) -> Result<T> {
        match &self.src {
            None => Err(ChannelError::Closed),
            Some(src) => match src.recv() {
                Ok(item) => Ok(item),
                Err(_) => self.close_channel(),
            },
        }
    }

    pub fn try_receive(&mut self) -> Result<T> {
        match &self.src {
            None => Err(ChannelError::Closed),
            Some(src) => match src.try_recv() {
                Ok(item) => Ok(item),
                Err(channel::TryRecvError::Empty) => Err(ChannelError::ReceivedNoData),
                Err(channel::TryRecvError::Disconnected) => self.close_channel(),
            },
        }
    }

    pub fn receive_timeout(&mut self, timeout: Duration) -> Result<T> {
        match &self.src {
            None => Err(ChannelError::Closed),
            Some(src) => match src.recv_timeout(timeout) {
                Ok(item) => Ok(item),
                Err(channel::RecvTimeoutError::Timeout) => Err(ChannelError::TimedOut),
                Err(channel::RecvTimeoutError::Disconnected) => self.close_channel(),
            },
        }
    }

    pub fn receive_deadline(&mut self, deadline: Instant) -> Result<T> {
        match &self.src {
            None => Err(ChannelError::Closed),
            Some(src) => match src.recv_deadline(deadline) {
                Ok(item) => Ok(item),
                Err(channel::RecvTimeoutError::Timeout) => Err(ChannelError::TimedOut),
                Err(channel::RecvTimeoutError::Disconnected) => self.close_channel(),
            },
        }
    }

    fn close_channel(&mut self) -> Result<T> {
        // remove the channel from the underlying slot
        if self.src.take().is_some() {
            tracing::debug!("receive channel observed closure");
        }
        Err(ChannelError::Closed)
    }
}

impl<T> Iterator for ReceiveChannel<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.block_receive().ok()
    }
}

//! ratatui output sink for an SSH channel.

use std::io;

use russh::server::Handle;
use russh::{ChannelId, CryptoVec};
use tokio::sync::mpsc;
use tracing::debug;

/// Buffers terminal output and forwards it on flush.
///
/// Writes land in memory; each flush hands the pending bytes to a writer
/// task that sends them over the channel. Dropping the handle lets the
/// writer drain, then closes the channel.
#[derive(Debug)]
pub struct TerminalHandle {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    sink: Vec<u8>,
}

impl TerminalHandle {
    /// Start a writer task for `channel` on `handle`.
    #[must_use]
    pub fn start(handle: Handle, channel: ChannelId) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Vec<u8>>();
        tokio::spawn(async move {
            while let Some(data) = receiver.recv().await {
                if handle.data(channel, CryptoVec::from(data)).await.is_err() {
                    debug!("Channel {:?} is gone; dropping output", channel);
                    break;
                }
            }
            let _ = handle.eof(channel).await;
            let _ = handle.close(channel).await;
        });
        Self::from_sender(sender)
    }

    /// A handle that forwards flushed output to `sender`.
    #[must_use]
    pub fn from_sender(sender: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self {
            sender,
            sink: Vec::new(),
        }
    }
}

impl io::Write for TerminalHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.sink.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.sink);
        self.sender
            .send(data)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "session output closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_write_buffers_until_flush() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = TerminalHandle::from_sender(tx);

        handle.write_all(b"hello ").unwrap();
        handle.write_all(b"world").unwrap();
        assert!(rx.try_recv().is_err());

        handle.flush().unwrap();
        assert_eq!(rx.try_recv().unwrap(), b"hello world");
    }

    #[test]
    fn test_empty_flush_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handle = TerminalHandle::from_sender(tx);

        handle.flush().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_flush_after_close_is_broken_pipe() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut handle = TerminalHandle::from_sender(tx);
        drop(rx);

        handle.write_all(b"x").unwrap();
        let err = handle.flush().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}

//! Bounded queue between producers and the single writer

use crate::record::LogRecord;
use crate::rotation::RotationState;
use crate::{Error, Result};
use arc_swap::ArcSwapOption;
use chrono::NaiveDate;
use flume::{Receiver, Sender};

/// Queue element
#[derive(Debug)]
enum Envelope {
    Record(LogRecord),
    /// Acknowledged once everything queued before it has been written
    Flush(Sender<()>),
}

/// Producer side of the queue.
///
/// Enqueueing blocks while the queue is full instead of dropping records.
pub struct AsyncSink {
    sender: ArcSwapOption<Sender<Envelope>>,
    capacity: usize,
}

/// Consumer side of the queue. There is exactly one per sink.
pub struct Drain {
    receiver: Receiver<Envelope>,
}

impl AsyncSink {
    /// Create a queue holding at most `capacity` records
    pub fn bounded(capacity: usize) -> (Self, Drain) {
        let (sender, receiver) = flume::bounded(capacity);
        let sink = Self {
            sender: ArcSwapOption::from_pointee(sender),
            capacity,
        };
        (sink, Drain { receiver })
    }

    /// Maximum number of queued records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently waiting for the writer
    pub fn pending(&self) -> usize {
        self.sender.load_full().map_or(0, |sender| sender.len())
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.sender.load().is_none()
    }

    /// Queue a record, waiting for space if the queue is full.
    ///
    /// # Panics
    ///
    /// Panics if the sink has been closed.
    pub fn enqueue(&self, record: LogRecord) {
        let Some(sender) = self.sender.load_full() else {
            panic!("log record enqueued after the logger was closed");
        };
        if sender.send(Envelope::Record(record)).is_err() {
            tracing::error!("log writer has stopped, dropping record");
        }
    }

    /// Queue a record, returning [`Error::QueueClosed`] if the sink has been
    /// closed or the writer has stopped.
    pub fn try_enqueue(&self, record: LogRecord) -> Result<()> {
        let sender = self.sender.load_full().ok_or(Error::QueueClosed)?;
        sender
            .send(Envelope::Record(record))
            .map_err(|_| Error::QueueClosed)
    }

    /// Block until every record queued before this call has been written.
    pub fn flush(&self) -> Result<()> {
        let sender = self.sender.load_full().ok_or(Error::QueueClosed)?;
        let (ack, done) = flume::bounded(1);
        sender
            .send(Envelope::Flush(ack))
            .map_err(|_| Error::QueueClosed)?;
        drop(sender);
        done.recv().map_err(|_| Error::QueueClosed)
    }

    /// Detach the producer side. The drain writes whatever is still queued
    /// and then returns. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        self.sender.swap(None).is_some()
    }
}

impl Drain {
    /// Write records until the sink is closed and the queue is empty.
    ///
    /// Before each write the rotation state gets a chance to roll over to a
    /// new day. A failed write-path rotation is attempted once per tracked
    /// day; further retries are left to the rotation timer.
    pub fn run(&self, state: &RotationState) {
        let mut failed_day: Option<NaiveDate> = None;

        while let Ok(envelope) = self.receiver.recv() {
            match envelope {
                Envelope::Record(record) => {
                    let day = state.current_day();
                    if failed_day != Some(day) {
                        match state.ensure_fresh() {
                            Ok(_) => failed_day = None,
                            Err(e) => {
                                tracing::error!(error = %e, "log rotation failed on write");
                                failed_day = Some(state.current_day());
                            }
                        }
                    }
                    if let Err(e) = state.write(record.as_str()) {
                        tracing::warn!(error = %e, "dropped log line");
                    }
                }
                Envelope::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        tracing::debug!("log queue closed, writer exiting");
    }

    #[cfg(test)]
    fn next_record(&self) -> Option<LogRecord> {
        match self.receiver.recv().ok()? {
            Envelope::Record(record) => Some(record),
            Envelope::Flush(_) => None,
        }
    }
}

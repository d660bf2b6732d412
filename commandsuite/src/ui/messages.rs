use super::colors::{fg, reset, Palette};
use crate::error::{Result, SuiteError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub severity: Severity,
    pub text: String,
}

/// Notification output for refactor requests.
///
/// While a menu holds the alternate screen buffer messages are queued, and
/// they are replayed in arrival order as soon as the buffer is released.
/// Producers may call [`MessageSink::notify`] from any thread.
pub struct MessageSink {
    alternate_active: AtomicBool,
    queue_tx: Sender<QueuedMessage>,
    queue_rx: Receiver<QueuedMessage>,
    output: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl MessageSink {
    pub fn new(output: impl Write + Send + 'static) -> Self {
        let (queue_tx, queue_rx) = unbounded();
        Self {
            alternate_active: AtomicBool::new(false),
            queue_tx,
            queue_rx,
            output: Mutex::new(Box::new(output)),
            color: true,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn notify(&self, severity: Severity, text: impl Into<String>) -> Result<()> {
        let message = QueuedMessage {
            severity,
            text: text.into(),
        };

        if self.alternate_active.load(Ordering::Acquire) {
            tracing::debug!("Queueing {:?} message while menu is active", severity);
            // The receiver lives as long as self, so send cannot fail.
            let _ = self.queue_tx.send(message);
            return Ok(());
        }

        let mut output = self.lock_output();
        self.drain_into(&mut **output)?;
        self.write_message(&mut **output, &message)?;
        output.flush()?;
        Ok(())
    }

    pub fn info(&self, text: impl Into<String>) -> Result<()> {
        self.notify(Severity::Information, text)
    }

    pub fn warn(&self, text: impl Into<String>) -> Result<()> {
        self.notify(Severity::Warning, text)
    }

    pub fn error(&self, text: impl Into<String>) -> Result<()> {
        self.notify(Severity::Error, text)
    }

    pub fn is_alternate_active(&self) -> bool {
        self.alternate_active.load(Ordering::Acquire)
    }

    /// Number of messages waiting for the alternate buffer to be released
    pub fn pending(&self) -> usize {
        self.queue_rx.len()
    }

    /// Marks the alternate buffer as owned by the caller until the returned
    /// lease is dropped. Only one lease can exist at a time.
    pub fn acquire_alternate(&self) -> Result<AlternateBufferLease<'_>> {
        self.alternate_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SuiteError::MenuActive)?;
        Ok(AlternateBufferLease { sink: self })
    }

    /// Writes out everything queued so far. Does nothing while the alternate
    /// buffer is held.
    pub fn flush(&self) -> Result<()> {
        if self.is_alternate_active() {
            return Ok(());
        }

        let mut output = self.lock_output();
        self.drain_into(&mut **output)?;
        output.flush()?;
        Ok(())
    }

    fn drain_into(&self, output: &mut dyn Write) -> Result<()> {
        while let Ok(message) = self.queue_rx.try_recv() {
            self.write_message(output, &message)?;
        }
        Ok(())
    }

    fn write_message(&self, output: &mut dyn Write, message: &QueuedMessage) -> io::Result<()> {
        writeln!(output)?;
        if self.color {
            let color = match message.severity {
                Severity::Error => Palette::ERROR,
                Severity::Warning => Palette::WARNING,
                Severity::Information => Palette::INFORMATION,
            };
            writeln!(output, "{}{}{}", fg(color), message.text, reset())
        } else {
            let prefix = match message.severity {
                Severity::Error => "error: ",
                Severity::Warning => "warning: ",
                Severity::Information => "",
            };
            writeln!(output, "{}{}", prefix, message.text)
        }
    }

    fn lock_output(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the alternate screen buffer from the sink's point of view.
/// Dropping it replays queued messages.
pub struct AlternateBufferLease<'a> {
    sink: &'a MessageSink,
}

impl Drop for AlternateBufferLease<'_> {
    fn drop(&mut self) {
        self.sink.alternate_active.store(false, Ordering::Release);
        if let Err(e) = self.sink.flush() {
            tracing::error!("Failed to flush queued messages: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ui::render::strip_styles;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writes_immediately_without_menu() {
        let buffer = SharedBuffer::default();
        let sink = MessageSink::new(buffer.clone());

        sink.warn("careful").unwrap();

        let out = buffer.contents();
        assert!(out.starts_with('\n'));
        assert!(out.contains(&fg(Palette::WARNING)));
        assert_eq!(strip_styles(&out), "\ncareful\n");
    }

    #[test]
    fn test_queues_while_alternate_active() {
        let buffer = SharedBuffer::default();
        let sink = MessageSink::new(buffer.clone()).with_color(false);

        let lease = sink.acquire_alternate().unwrap();
        sink.error("first").unwrap();
        sink.info("second").unwrap();
        assert_eq!(buffer.contents(), "");
        assert_eq!(sink.pending(), 2);

        drop(lease);
        assert_eq!(buffer.contents(), "\nerror: first\n\nsecond\n");
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_order_preserved_across_menu_boundary() {
        let buffer = SharedBuffer::default();
        let sink = MessageSink::new(buffer.clone()).with_color(false);

        {
            let _lease = sink.acquire_alternate().unwrap();
            sink.info("W1").unwrap();
        }
        sink.info("W2").unwrap();

        assert_eq!(buffer.contents(), "\nW1\n\nW2\n");
    }

    #[test]
    fn test_only_one_lease_at_a_time() {
        let sink = MessageSink::new(SharedBuffer::default());
        let lease = sink.acquire_alternate().unwrap();
        assert!(matches!(sink.acquire_alternate(), Err(SuiteError::MenuActive)));
        drop(lease);
        assert!(sink.acquire_alternate().is_ok());
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        let buffer = SharedBuffer::default();
        let sink = Arc::new(MessageSink::new(buffer.clone()).with_color(false));

        let lease = sink.acquire_alternate().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        sink.info(format!("{}-{}", worker, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        drop(lease);

        let out = buffer.contents();
        let lines: Vec<&str> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 100);
        for worker in 0..4 {
            let seen: Vec<usize> = lines
                .iter()
                .filter_map(|l| l.strip_prefix(&format!("{}-", worker)))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..25).collect::<Vec<_>>());
        }
    }
}

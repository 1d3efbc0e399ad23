use std::fmt;
use std::sync::OnceLock;

/// Receiver for diagnostic text the emulated program prints, such as the
/// line-at-a-time results conformance ROMs report over the serial port.
pub trait LogSink: Send + Sync + 'static {
    fn serial_line(&self, line: &str);
}

static LOG_SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

pub fn try_set_log_sink(sink: Box<dyn LogSink>) -> Result<(), Box<dyn LogSink>> {
    LOG_SINK.set(sink)
}

pub fn has_log_sink() -> bool {
    LOG_SINK.get().is_some()
}

pub(crate) fn emit_serial_line(line: &str) {
    if let Some(sink) = LOG_SINK.get() {
        sink.serial_line(line);
    } else {
        log::debug!(target: "serial", "{line}");
    }
}

/// A sink that forwards lines to stderr, handy for CLI harnesses.
pub struct StderrSink;

impl LogSink for StderrSink {
    fn serial_line(&self, line: &str) {
        eprintln!("[serial] {line}");
    }
}

impl fmt::Debug for StderrSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StderrSink")
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Diagnostic logging for the boot chain
//!
//! The boot code is generic over [`LogSink`], so a board can route messages
//! to a UART while host builds collect them in a [`LogBuffer`]. No timer is
//! running this early, so entries carry a monotonic sequence number instead
//! of a timestamp.
//!
//! # Security
//!
//! - Key material, derived keys and decrypted headers must NEVER be logged
//! - Only fixed diagnostic strings and error codes leave this module

use core::fmt::{self, Write};
use heapless::String;

/// Maximum log message length
pub const MAX_LOG_MESSAGE_LEN: usize = 128;

/// Log buffer size (number of entries)
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Errors that abort the boot
    Error = 0,
    /// Warnings, including every disabled security check
    Warn = 1,
    /// Informational messages
    Info = 2,
    /// Debug messages (development only)
    Debug = 3,
    /// Trace messages (very verbose, development only)
    Trace = 4,
}

impl LogLevel {
    /// Get the log level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Get a short prefix for the log level
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warn => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
            Self::Trace => 'T',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for diagnostic messages
pub trait LogSink {
    /// Record a formatted message
    fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _level: LogLevel, _module: &'static str, _args: fmt::Arguments<'_>) {}
}

/// Log entry structure
#[derive(Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Monotonic sequence number
    pub sequence: u32,
    /// Module/component name
    pub module: &'static str,
    /// Log message (truncated to [`MAX_LOG_MESSAGE_LEN`])
    pub message: String<MAX_LOG_MESSAGE_LEN>,
}

impl LogEntry {
    /// Create a new log entry
    #[must_use]
    pub fn new(level: LogLevel, sequence: u32, module: &'static str, message: &str) -> Self {
        let mut msg = String::new();
        let mut end = message.len().min(MAX_LOG_MESSAGE_LEN);
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        let _ = msg.push_str(&message[..end]);

        Self {
            level,
            sequence,
            module,
            message: msg,
        }
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:08X}] {} [{}] {}",
            self.sequence,
            self.level.prefix(),
            self.module,
            self.message
        )
    }
}

/// Circular log buffer
pub struct LogBuffer {
    entries: [Option<LogEntry>; LOG_BUFFER_SIZE],
    write_index: usize,
    count: usize,
    sequence: u32,
    min_level: LogLevel,
}

impl LogBuffer {
    /// Create a new empty log buffer
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<LogEntry> = None;
        Self {
            entries: [NONE; LOG_BUFFER_SIZE],
            write_index: 0,
            count: 0,
            sequence: 0,
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Get the minimum log level
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if a log level should be recorded
    #[must_use]
    pub const fn should_log(&self, level: LogLevel) -> bool {
        (level as u8) <= (self.min_level as u8)
    }

    /// Write a log entry
    pub fn write(&mut self, entry: LogEntry) {
        if !self.should_log(entry.level) {
            return;
        }

        self.entries[self.write_index] = Some(entry);
        self.write_index = (self.write_index + 1) % LOG_BUFFER_SIZE;
        if self.count < LOG_BUFFER_SIZE {
            self.count += 1;
        }
    }

    /// Get the number of entries
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Check if buffer is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.write_index = 0;
        self.count = 0;
    }

    /// Check whether any retained message contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.iter().any(|e| e.message.contains(needle))
    }

    /// Iterate over entries (oldest first)
    #[must_use]
    pub fn iter(&self) -> LogBufferIter<'_> {
        LogBufferIter {
            buffer: self,
            index: 0,
            remaining: self.count,
        }
    }
}

impl LogSink for LogBuffer {
    fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let mut message = String::<MAX_LOG_MESSAGE_LEN>::new();
        // Overlong messages are truncated
        let _ = message.write_fmt(args);

        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        self.write(LogEntry {
            level,
            sequence,
            module,
            message,
        });
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over log buffer entries
pub struct LogBufferIter<'a> {
    buffer: &'a LogBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for LogBufferIter<'a> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let start_index = if self.buffer.count < LOG_BUFFER_SIZE {
            0
        } else {
            self.buffer.write_index
        };

        let actual_index = (start_index + self.index) % LOG_BUFFER_SIZE;
        self.index += 1;
        self.remaining -= 1;

        self.buffer.entries[actual_index].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($sink:expr, $module:expr, $($arg:tt)*) => {
        $crate::log::LogSink::log(&mut *$sink, $crate::log::LogLevel::Error, $module, format_args!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($sink:expr, $module:expr, $($arg:tt)*) => {
        $crate::log::LogSink::log(&mut *$sink, $crate::log::LogLevel::Warn, $module, format_args!($($arg)*))
    };
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $module:expr, $($arg:tt)*) => {
        $crate::log::LogSink::log(&mut *$sink, $crate::log::LogLevel::Info, $module, format_args!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($sink:expr, $module:expr, $($arg:tt)*) => {
        $crate::log::LogSink::log(&mut *$sink, $crate::log::LogLevel::Debug, $module, format_args!($($arg)*))
    };
}

/// Log a trace-level message
#[macro_export]
macro_rules! log_trace {
    ($sink:expr, $module:expr, $($arg:tt)*) => {
        $crate::log::LogSink::log(&mut *$sink, $crate::log::LogLevel::Trace, $module, format_args!($($arg)*))
    };
}

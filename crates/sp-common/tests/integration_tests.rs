// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for sp-common
//!
//! Error reporting, logging through the sink macros, and codec behaviour.

#![cfg(test)]

mod errors_tests {
    use sp_common::{Error, ErrorKind};

    #[test]
    fn test_display_format() {
        let text = std::format!("{}", Error::MacMismatch);
        assert_eq!(text, "[0x0401] MAC mismatch");
    }

    #[test]
    fn test_kinds_cover_categories() {
        assert_eq!(Error::NoValidPartition.kind(), ErrorKind::StorageCorruption);
        assert_eq!(Error::ImageSizeMismatch.kind(), ErrorKind::Format);
        assert_eq!(Error::DesignationMismatch.kind(), ErrorKind::Trust);
        assert_eq!(Error::KeyDeleteFailed.kind(), ErrorKind::CryptoIntegrity);
        assert_eq!(ErrorKind::Trust.to_string(), "trust");
    }
}

mod log_tests {
    use sp_common::log::{LogBuffer, LogLevel, LogSink, NullSink};
    use sp_common::{log_error, log_info, log_trace, log_warn};

    fn emit<L: LogSink>(log: &mut L) {
        log_warn!(log, "fs", "partition {} invalid", 0);
        log_info!(log, "fs", "active partition {}", 1);
        log_trace!(log, "fs", "scan detail");
        log_error!(log, "loader", "Image SIG IGN");
    }

    #[test]
    fn test_generic_sink() {
        let mut buf = LogBuffer::new();
        emit(&mut buf);
        assert_eq!(buf.len(), 3);
        assert!(buf.contains("partition 0 invalid"));
        assert!(buf.contains("Image SIG IGN"));
        assert!(!buf.contains("scan detail"));

        let levels: std::vec::Vec<LogLevel> = buf.iter().map(|e| e.level).collect();
        assert_eq!(levels, [LogLevel::Warn, LogLevel::Info, LogLevel::Error]);
    }

    #[test]
    fn test_sequence_numbers_monotonic() {
        let mut buf = LogBuffer::new();
        buf.set_min_level(LogLevel::Trace);
        emit(&mut buf);
        let seq: std::vec::Vec<u32> = buf.iter().map(|e| e.sequence).collect();
        assert_eq!(seq, [0, 1, 2, 3]);
    }

    #[test]
    fn test_null_sink() {
        let mut sink = NullSink;
        emit(&mut sink);
    }

    #[test]
    fn test_entry_display() {
        let mut buf = LogBuffer::new();
        log_error!(&mut buf, "crt", "CRT SIG IGN");
        let line = buf.iter().next().map(std::string::ToString::to_string);
        assert_eq!(line.as_deref(), Some("[00000000] E [crt] CRT SIG IGN"));
    }
}

mod codec_tests {
    use sp_common::codec::{crc32, Reader, Writer};

    #[test]
    fn test_record_with_trailing_crc() {
        let mut rec = [0u8; 16];
        let mut w = Writer::new(&mut rec);
        w.u32(7).unwrap();
        w.u32(1).unwrap();
        w.u32(4).unwrap();
        let crc = crc32(&rec[..12]);
        rec[12..].copy_from_slice(&crc.to_le_bytes());

        let mut r = Reader::new(&rec);
        assert_eq!(r.u32().unwrap(), 7);
        assert_eq!(r.u32().unwrap(), 1);
        assert_eq!(r.u32().unwrap(), 4);
        assert_eq!(r.u32().unwrap(), crc32(&rec[..12]));
    }
}

//! Bounded frame reading over a serial port.
//!
//! Both links carry fixed-length frames, so reading is: discard bytes
//! until the sync byte is at the head of the stream, then consume one
//! frame's worth and validate the checksum. A corrupt frame is dropped
//! without consuming anything past it; the next call rescans from the
//! following byte.
//!
//! Every invocation bounds its own scan count so a peer spraying garbage
//! (or a floating line) cannot starve the control loop. Exhausting the
//! bound is reported as [`LinkError::Timeout`], which the regulator
//! escalates after a run of occurrences.

use liftdesk_protocol::frame::{validate, FrameError, DISPLAY_FRAME_LEN, INTERFACE_FRAME_LEN};
use liftdesk_protocol::{DisplayFrame, InterfaceReport, DISPLAY_SYNC, INTERFACE_SYNC};

use crate::config::DeskConfig;
use crate::traits::SerialPort;

/// Errors surfaced by a frame-read attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Scan bound exhausted without finding a frame start
    Timeout,
    /// A complete candidate frame failed validation
    Frame(FrameError),
}

/// Read one fixed-length frame from `port`.
///
/// Returns `Ok(None)` when the stream has no complete frame yet (empty,
/// or sync seen but the tail still in flight) - the caller retries next
/// tick. At most `loop_bound` bytes are discarded per invocation.
pub fn read_frame<S: SerialPort, const N: usize>(
    port: &mut S,
    sync: u8,
    loop_bound: usize,
) -> Result<Option<[u8; N]>, LinkError> {
    for _ in 0..loop_bound {
        match port.peek() {
            None => return Ok(None),
            Some(byte) if byte != sync => {
                let _ = port.read();
            }
            Some(_) => {
                if port.available() < N {
                    return Ok(None);
                }
                let mut buf = [0u8; N];
                if port.read_bytes(&mut buf) < N {
                    return Ok(None);
                }
                return match validate(&buf, sync) {
                    Ok(_) => Ok(Some(buf)),
                    Err(e) => Err(LinkError::Frame(e)),
                };
            }
        }
    }
    Err(LinkError::Timeout)
}

/// Poll the interface link for a keypad report
pub fn poll_interface<S: SerialPort>(
    port: &mut S,
    config: &DeskConfig,
) -> Result<Option<InterfaceReport>, LinkError> {
    let frame = read_frame::<_, INTERFACE_FRAME_LEN>(port, INTERFACE_SYNC, config.loop_bound)?;
    match frame {
        Some(raw) => InterfaceReport::from_frame(&raw)
            .map(Some)
            .map_err(LinkError::Frame),
        None => Ok(None),
    }
}

/// Poll a controller link for a reported-height display frame
pub fn poll_channel<S: SerialPort>(
    port: &mut S,
    config: &DeskConfig,
) -> Result<Option<DisplayFrame>, LinkError> {
    let frame = read_frame::<_, DISPLAY_FRAME_LEN>(port, DISPLAY_SYNC, config.loop_bound)?;
    match frame {
        Some(raw) => DisplayFrame::from_frame(&raw)
            .map(Some)
            .map_err(LinkError::Frame),
        None => Ok(None),
    }
}

/// Write a frame and push it toward the wire
pub fn write_frame<S: SerialPort>(port: &mut S, bytes: &[u8]) {
    port.write(bytes);
    port.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftdesk_protocol::KeyMask;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// In-memory serial port for host tests
    #[derive(Default)]
    struct MockPort {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl MockPort {
        fn with_bytes(bytes: &[u8]) -> Self {
            Self {
                rx: bytes.iter().copied().collect(),
                tx: Vec::new(),
            }
        }
    }

    impl SerialPort for MockPort {
        fn available(&self) -> usize {
            self.rx.len()
        }

        fn peek(&mut self) -> Option<u8> {
            self.rx.front().copied()
        }

        fn read(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }

        fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
            let mut count = 0;
            for slot in buf.iter_mut() {
                match self.rx.pop_front() {
                    Some(byte) => {
                        *slot = byte;
                        count += 1;
                    }
                    None => break,
                }
            }
            count
        }

        fn write(&mut self, buf: &[u8]) {
            self.tx.extend_from_slice(buf);
        }

        fn flush(&mut self) {}
    }

    const CONFIG: DeskConfig = DeskConfig {
        min_height: 620.0,
        max_height: 1280.0,
        default_speed: 0.0001,
        max_speed: 0.001,
        snap_threshold: 0.0004,
        ramp_gain: 0.001,
        short_tap_ms: 500,
        long_tap_ms: 1500,
        blink_ms: 700,
        hide_delay_ms: 3000,
        allowed_diff: 5.0,
        send_interval_ms: 10,
        loop_bound: 64,
        max_timeouts: 3,
    };

    #[test]
    fn test_clean_frame() {
        let mut port = MockPort::with_bytes(&[0xA5, 0x00, 0x20, 0x01, 0x21]);
        let report = poll_interface(&mut port, &CONFIG).unwrap().unwrap();
        assert_eq!(report.keys, KeyMask::UP);
        assert_eq!(port.available(), 0);
    }

    #[test]
    fn test_resync_past_garbage() {
        let mut port =
            MockPort::with_bytes(&[0xFF, 0x12, 0x00, 0xA5, 0x00, 0x20, 0x01, 0x21]);
        let report = poll_interface(&mut port, &CONFIG).unwrap().unwrap();
        assert_eq!(report.keys, KeyMask::UP);
    }

    #[test]
    fn test_incomplete_frame_waits() {
        // Sync byte arrived but the tail has not
        let mut port = MockPort::with_bytes(&[0xA5, 0x00, 0x20]);
        assert_eq!(poll_interface(&mut port, &CONFIG), Ok(None));
        // Nothing was consumed; the partial frame is still in flight
        assert_eq!(port.available(), 3);
    }

    #[test]
    fn test_empty_stream() {
        let mut port = MockPort::default();
        assert_eq!(poll_interface(&mut port, &CONFIG), Ok(None));
    }

    #[test]
    fn test_corrupt_frame_dropped_silently() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0xA5, 0x00, 0x20, 0x01, 0x99]); // bad checksum
        bytes.extend_from_slice(&[0xA5, 0x00, 0x01, 0x01, 0x02]); // good frame
        let mut port = MockPort::with_bytes(&bytes);

        assert_eq!(
            poll_interface(&mut port, &CONFIG),
            Err(LinkError::Frame(FrameError::InvalidChecksum))
        );
        // Next call finds the following frame
        let report = poll_interface(&mut port, &CONFIG).unwrap().unwrap();
        assert_eq!(report.keys, KeyMask::MEMORY);
    }

    #[test]
    fn test_scan_bound_reports_timeout() {
        // A stream of non-sync bytes longer than the loop bound
        let garbage = std::vec![0x55u8; 100];
        let mut port = MockPort::with_bytes(&garbage);
        assert_eq!(poll_interface(&mut port, &CONFIG), Err(LinkError::Timeout));
        // Exactly loop_bound bytes were discarded
        assert_eq!(port.available(), 100 - CONFIG.loop_bound);
    }

    #[test]
    fn test_channel_frame() {
        use liftdesk_protocol::height_to_digits;

        let frame = DisplayFrame::new(height_to_digits(742.0)).to_frame();
        let mut port = MockPort::with_bytes(&frame);
        let decoded = poll_channel(&mut port, &CONFIG).unwrap().unwrap();
        assert_eq!(decoded.height(), Ok(742.0));
    }

    #[test]
    fn test_write_frame_reaches_port() {
        let mut port = MockPort::default();
        let frame = liftdesk_protocol::DriveCommand {
            up: true,
            down: false,
        }
        .to_frame();
        write_frame(&mut port, &frame);
        assert_eq!(port.tx, frame);
    }
}

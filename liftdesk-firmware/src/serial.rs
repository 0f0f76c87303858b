//! Serial port adapters over pipes.
//!
//! The UARTs are owned by small async pump tasks; the control loop sees
//! each link as a [`SerialPort`] backed by a pair of byte pipes. Staging
//! received bytes in a local deque gives the control loop the
//! peek/available semantics the bounded frame reader needs without ever
//! blocking on the hardware.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::{Pipe, Reader, Writer};
use embedded_io_async::{Read, Write};
use heapless::Deque;

use liftdesk_core::SerialPort;
use liftdesk_protocol::DISPLAY_FRAME_LEN;

/// Bytes buffered per pipe direction
pub const PIPE_SIZE: usize = 256;

/// Staging capacity, a generous number of the longer frame format
const STAGE_SIZE: usize = DISPLAY_FRAME_LEN * 20;

pub type LinkPipe = Pipe<CriticalSectionRawMutex, PIPE_SIZE>;
type PipeReader = Reader<'static, CriticalSectionRawMutex, PIPE_SIZE>;
type PipeWriter = Writer<'static, CriticalSectionRawMutex, PIPE_SIZE>;

/// One serial link as seen by the control loop
pub struct PipePort {
    rx: PipeReader,
    tx: PipeWriter,
    staged: Deque<u8, STAGE_SIZE>,
}

impl PipePort {
    pub fn new(rx: PipeReader, tx: PipeWriter) -> Self {
        Self {
            rx,
            tx,
            staged: Deque::new(),
        }
    }

    // Move whatever the pump task delivered into the staging deque
    fn fill(&mut self) {
        let mut chunk = [0u8; 32];
        loop {
            let room = STAGE_SIZE - self.staged.len();
            if room == 0 {
                break;
            }
            match self.rx.try_read(&mut chunk[..room.min(chunk.len())]) {
                Ok(count) if count > 0 => {
                    for &byte in &chunk[..count] {
                        let _ = self.staged.push_back(byte);
                    }
                }
                _ => break,
            }
        }
    }
}

impl SerialPort for PipePort {
    fn available(&self) -> usize {
        self.staged.len()
    }

    fn peek(&mut self) -> Option<u8> {
        self.fill();
        self.staged.front().copied()
    }

    fn read(&mut self) -> Option<u8> {
        self.fill();
        self.staged.pop_front()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        self.fill();
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.staged.pop_front() {
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
        // The tx pump drains the pipe; a full pipe drops the frame, the
        // next cadence resends fresher state anyway
        match self.tx.try_write(buf) {
            Ok(written) if written == buf.len() => {}
            _ => warn!("tx pipe full, dropping {} bytes", buf.len()),
        }
    }

    fn flush(&mut self) {}
}

/// Pump received UART bytes into a link pipe
#[embassy_executor::task(pool_size = 2)]
pub async fn uart_rx_pump(mut rx: BufferedUartRx, into: PipeWriter) {
    let mut chunk = [0u8; 32];
    loop {
        match rx.read(&mut chunk).await {
            Ok(count) if count > 0 => {
                into.write_all(&chunk[..count]).await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Drain a link pipe into a UART
#[embassy_executor::task(pool_size = 2)]
pub async fn uart_tx_pump(mut tx: BufferedUartTx, from: PipeReader) {
    let mut chunk = [0u8; 32];
    loop {
        let count = from.read(&mut chunk).await;
        if tx.write_all(&chunk[..count]).await.is_err() {
            warn!("UART write error");
        }
    }
}

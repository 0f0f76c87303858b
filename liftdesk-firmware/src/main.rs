//! Liftdesk - Motorized Standing Desk Controller Firmware
//!
//! RP2040 firmware for a dual-motor sit/stand desk. One UART talks to
//! the keypad/display handset, the other to a motor drive box. The
//! control law itself lives in `liftdesk-core` and runs here inside a
//! fixed-cadence control task.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::flash::Flash;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use liftdesk_core::{
    poll_channel, poll_interface, write_frame, ChannelInput, DeskConfig, DeskController,
    LinkError, PresetStore, TickInputs,
};

use crate::flash::{FlashPresetStore, FLASH_SIZE};
use crate::serial::{uart_rx_pump, uart_tx_pump, LinkPipe, PipePort};

mod flash;
mod serial;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Control loop period; frame sends are paced separately by the core
const TICK_INTERVAL_MS: u32 = 5;

/// A channel that goes quiet this long is reported as timed out
const CHANNEL_SILENCE_MS: u32 = 200;

// UART driver buffers (must live forever)
static HANDSET_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static HANDSET_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static DRIVE_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static DRIVE_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Pipes between the UART pump tasks and the control loop
static HANDSET_RX_PIPE: StaticCell<LinkPipe> = StaticCell::new();
static HANDSET_TX_PIPE: StaticCell<LinkPipe> = StaticCell::new();
static DRIVE_RX_PIPE: StaticCell<LinkPipe> = StaticCell::new();
static DRIVE_TX_PIPE: StaticCell<LinkPipe> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Liftdesk firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = 9600;

    // UART0: handset link (keypad reports in, display frames out)
    let handset_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config)
        .into_buffered::<UART0>(Irqs, HANDSET_TX_BUF.init([0; 256]), HANDSET_RX_BUF.init([0; 256]));
    let (handset_tx, handset_rx) = handset_uart.split();

    // UART1: drive box link (height echoes in, drive commands out)
    let drive_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config)
        .into_buffered::<UART1>(Irqs, DRIVE_TX_BUF.init([0; 256]), DRIVE_RX_BUF.init([0; 256]));
    let (drive_tx, drive_rx) = drive_uart.split();

    let handset_rx_pipe = HANDSET_RX_PIPE.init(LinkPipe::new());
    let handset_tx_pipe = HANDSET_TX_PIPE.init(LinkPipe::new());
    let drive_rx_pipe = DRIVE_RX_PIPE.init(LinkPipe::new());
    let drive_tx_pipe = DRIVE_TX_PIPE.init(LinkPipe::new());

    let (handset_pipe_rd, handset_pipe_wr) = handset_rx_pipe.split();
    let (handset_out_rd, handset_out_wr) = handset_tx_pipe.split();
    let (drive_pipe_rd, drive_pipe_wr) = drive_rx_pipe.split();
    let (drive_out_rd, drive_out_wr) = drive_tx_pipe.split();

    unwrap!(spawner.spawn(uart_rx_pump(handset_rx, handset_pipe_wr)));
    unwrap!(spawner.spawn(uart_tx_pump(handset_tx, handset_out_rd)));
    unwrap!(spawner.spawn(uart_rx_pump(drive_rx, drive_pipe_wr)));
    unwrap!(spawner.spawn(uart_tx_pump(drive_tx, drive_out_rd)));

    let handset_port = PipePort::new(handset_pipe_rd, handset_out_wr);
    let drive_port = PipePort::new(drive_pipe_rd, drive_out_wr);

    let store = FlashPresetStore::new(Flash::<_, _, FLASH_SIZE>::new_blocking(p.FLASH));

    unwrap!(spawner.spawn(control_task(handset_port, drive_port, store)));

    info!("Liftdesk firmware running");
}

/// The single mutation site. Polls both links, advances the desk state
/// machine, and writes whatever frames the tick produced.
#[embassy_executor::task]
async fn control_task(
    mut handset: PipePort,
    mut drive: PipePort,
    mut store: FlashPresetStore,
) {
    let config = DeskConfig::default();

    // This board wires a single drive channel
    let mut desk = DeskController::new(config, 1);
    if let Some(slots) = store.load() {
        desk = desk.with_presets(slots);
    }

    let mut silence_ms: u32 = 0;
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS as u64));

    loop {
        ticker.next().await;

        let mut inputs = TickInputs::idle();

        match poll_interface(&mut handset, &config) {
            Ok(Some(report)) => inputs.keys = Some(report.keys),
            Ok(None) => {}
            Err(e) => debug!("handset link: {:?}", e),
        }

        match poll_channel(&mut drive, &config) {
            Ok(None) => {
                // Nothing arrived; a quiet window counts as a timeout too
                silence_ms = silence_ms.saturating_add(TICK_INTERVAL_MS);
                if silence_ms >= CHANNEL_SILENCE_MS {
                    silence_ms = 0;
                    inputs.channels[0] = ChannelInput::Timeout;
                }
            }
            polled => {
                if let Err(e) = &polled {
                    if matches!(e, LinkError::Timeout) {
                        warn!("drive link scan budget exhausted");
                    } else {
                        debug!("drive link: {:?}", e);
                    }
                }
                silence_ms = 0;
                inputs.channels[0] = ChannelInput::from_poll(polled);
            }
        }

        let outputs = desk.tick(TICK_INTERVAL_MS, &inputs);

        if let Some(command) = outputs.drive[0] {
            write_frame(&mut drive, &command.to_frame());
        }
        if let Some(frame) = outputs.display {
            write_frame(&mut handset, &frame.to_frame());
        }
        if let Some(slots) = outputs.save_presets {
            store.save(&slots);
        }
    }
}

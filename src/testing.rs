//! Scripted sensor traffic for the unit tests.

use core::cell::Cell;

use embedded_hal_mock::eh1::delay::Transaction as DelayTx;
use embedded_hal_mock::eh1::digital::{State as PinState, Transaction as PinTx};

use crate::clock::Clock;
use crate::decoder::{INPUT_SETTLE_US, RELEASE_SETTLE_MS, START_HIGH_US, START_LOW_MS};

pub const REF_LOW: usize = 5;
pub const SHORT_HIGH: usize = 3;
pub const LONG_HIGH: usize = 7;

pub fn start_sequence() -> Vec<PinTx> {
    vec![
        // Release before the request
        PinTx::set(PinState::High),
        // MCU initiates communication by pulling the data line low, then releasing it
        PinTx::set(PinState::Low),
        PinTx::set(PinState::High),
        // Switch to input
        PinTx::set(PinState::High),
    ]
}

pub fn start_delays() -> Vec<DelayTx> {
    vec![
        DelayTx::delay_ms(RELEASE_SETTLE_MS),
        DelayTx::delay_ms(START_LOW_MS),
        DelayTx::delay_us(START_HIGH_US),
        DelayTx::delay_us(INPUT_SETTLE_US),
    ]
}

// `polls` reads at `level`, then one read at the opposite level ending the pulse.
pub fn pulse(level: PinState, polls: usize) -> Vec<PinTx> {
    let end = match level {
        PinState::Low => PinState::High,
        PinState::High => PinState::Low,
    };
    let mut tx = vec![PinTx::get(level); polls];
    tx.push(PinTx::get(end));
    tx
}

// Sensor acknowledge: ~80us low, ~80us high
pub fn ack() -> Vec<PinTx> {
    let mut tx = pulse(PinState::Low, 8);
    tx.extend(pulse(PinState::High, 8));
    tx
}

// Helper to encode one byte into 8 low/high pulse pairs (MSB first)
pub fn encode_byte(byte: u8) -> Vec<PinTx> {
    (0..8)
        .flat_map(|i| {
            let bit = (byte >> (7 - i)) & 1;
            let high = if bit == 1 { LONG_HIGH } else { SHORT_HIGH };
            let mut tx = pulse(PinState::Low, REF_LOW);
            tx.extend(pulse(PinState::High, high));
            tx
        })
        .collect()
}

// Full exchange for one read: start request, acknowledge and 40 bits
pub fn encode_frame(bytes: [u8; 5]) -> Vec<PinTx> {
    let mut tx = start_sequence();
    tx.extend(ack());
    for byte in bytes {
        tx.extend(encode_byte(byte));
    }
    tx
}

/// Clock the test moves by hand.
#[derive(Default)]
pub struct FakeClock {
    now: Cell<u32>,
}

impl FakeClock {
    pub fn at(now: u32) -> Self {
        FakeClock {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

//! Start sequence and bit capture.
//!
//! After the host's start request the sensor answers with an ~80 µs low and an
//! ~80 µs high pulse, then sends 40 bits. Each bit is a ~50 µs low pulse
//! followed by a high pulse of ~28 µs (0) or ~70 µs (1). The low pulse is used
//! as the reference: a bit is 1 when its high pulse lasted longer than the low
//! pulse before it. Both are measured with the same polling loop, so no
//! calibration against wall time is needed.

use embedded_hal::{delay::DelayNs, digital::PinState};

use crate::error::DhtError;
use crate::frame::{FRAME_BITS, FRAME_LEN, RawFrame};
use crate::line::{DataLine, LineMode};
use crate::pulse::{CycleBudget, measure};

/// Time the released line is left to settle before the start request.
pub const RELEASE_SETTLE_MS: u32 = 1;
/// Length of the host's low start pulse.
pub const START_LOW_MS: u32 = 1;
/// Length of the high window that ends the start request.
pub const START_HIGH_US: u32 = 40;
/// Delay after switching to input, before expecting the sensor's low pulse.
pub const INPUT_SETTLE_US: u32 = 10;

/// Number of pulse widths captured per frame: one low/high pair per bit.
pub const PULSE_COUNT: usize = FRAME_BITS * 2;

/// Sends the start request and decodes the sensor's answer into a frame.
///
/// Everything from the start pulse up to the packed frame runs inside a
/// critical section. The section ends on every return path, including the
/// early ones for timeouts and pin errors.
///
/// The checksum is not checked here; see [`RawFrame::validate`].
pub fn decode<L, D>(
    line: &mut L,
    delay: &mut D,
    budget: CycleBudget,
) -> Result<RawFrame, DhtError<L::Error>>
where
    L: DataLine,
    D: DelayNs,
{
    // Let the pull-up raise the line before pulling it down.
    line.set_mode(LineMode::InputPullUp)?;
    delay.delay_ms(RELEASE_SETTLE_MS);

    critical_section::with(|_cs| -> Result<RawFrame, DhtError<L::Error>> {
        send_start_signal(line, delay)?;
        wait_for_ack(line, budget)?;
        let pulses = capture_pulses(line, budget)?;
        Ok(pack_bits(&pulses))
    })
}

/// Pulls the line low for [`START_LOW_MS`], releases it for [`START_HIGH_US`],
/// then hands it over to the sensor.
fn send_start_signal<L, D>(line: &mut L, delay: &mut D) -> Result<(), DhtError<L::Error>>
where
    L: DataLine,
    D: DelayNs,
{
    // MCU sends start request
    line.set_mode(LineMode::Output)?;
    line.write_level(PinState::Low)?;
    delay.delay_ms(START_LOW_MS);
    line.write_level(PinState::High)?;
    delay.delay_us(START_HIGH_US);

    line.set_mode(LineMode::InputPullUp)?;
    delay.delay_us(INPUT_SETTLE_US);
    Ok(())
}

/// Waits out the sensor's ~80 µs low and ~80 µs high acknowledge.
///
/// A pulse that is already over on the first poll counts as missing, so a
/// line left high by the pull-up (no sensor) fails with
/// [`DhtError::StartLowTimeout`].
fn wait_for_ack<L: DataLine>(
    line: &mut L,
    budget: CycleBudget,
) -> Result<(), DhtError<L::Error>> {
    if measure(line, PinState::Low, budget)?.width().is_none() {
        warn!("timeout waiting for start signal low pulse");
        return Err(DhtError::StartLowTimeout);
    }
    if measure(line, PinState::High, budget)?.width().is_none() {
        warn!("timeout waiting for start signal high pulse");
        return Err(DhtError::StartHighTimeout);
    }
    Ok(())
}

/// Measures the low/high pulse pair of all 40 bits.
///
/// Every pulse must last at least one poll; a zero-width pulse means an edge
/// was missed and fails the bit like a timeout.
///
/// Only polling happens here; classification is left to [`pack_bits`] so the
/// loop between two edges stays as short as possible.
fn capture_pulses<L: DataLine>(
    line: &mut L,
    budget: CycleBudget,
) -> Result<[u32; PULSE_COUNT], DhtError<L::Error>> {
    let mut cycles = [0u32; PULSE_COUNT];

    for (bit, pair) in cycles.chunks_exact_mut(2).enumerate() {
        for (slot, level) in pair.iter_mut().zip([PinState::Low, PinState::High]) {
            match measure(line, level, budget)?.width() {
                Some(count) => *slot = count,
                None => {
                    warn!("timeout waiting for pulse of bit {}", bit);
                    return Err(DhtError::BitTimeout { bit: bit as u8 });
                }
            }
        }
    }

    Ok(cycles)
}

/// Turns 80 captured pulse widths into a frame.
///
/// `cycles` holds `[low0, high0, low1, high1, ...]`. A bit is 1 when its high
/// pulse is strictly longer than its low pulse; equal widths decode as 0. Bits
/// are packed most significant first, bytes in arrival order.
pub fn pack_bits(cycles: &[u32; PULSE_COUNT]) -> RawFrame {
    let mut bytes = [0u8; FRAME_LEN];

    for (i, pair) in cycles.chunks_exact(2).enumerate() {
        let (low_cycles, high_cycles) = (pair[0], pair[1]);
        bytes[i / 8] <<= 1;
        if high_cycles > low_cycles {
            bytes[i / 8] |= 1;
        }
    }

    trace!("received {:?}", bytes);
    RawFrame::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::OpenDrain;
    use crate::testing::{
        REF_LOW, ack, encode_byte, encode_frame, pulse, start_delays, start_sequence,
    };
    use embedded_hal_mock::eh1::delay::CheckedDelay;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinMockState, Transaction as PinTx,
    };

    fn cycles_for(bytes: [u8; 5]) -> [u32; PULSE_COUNT] {
        let mut cycles = [0u32; PULSE_COUNT];
        for i in 0..FRAME_BITS {
            let bit = (bytes[i / 8] >> (7 - i % 8)) & 1;
            cycles[2 * i] = 50;
            cycles[2 * i + 1] = if bit == 1 { 70 } else { 28 };
        }
        cycles
    }

    #[test]
    fn test_start_sequence() {
        let mut expect = start_sequence();
        expect.extend(ack());

        let mut pin = PinMock::new(&expect);
        let mut delay = CheckedDelay::new(&start_delays());

        let mut line = OpenDrain::new(pin.clone());
        line.set_mode(LineMode::InputPullUp).unwrap();
        delay.delay_ms(RELEASE_SETTLE_MS);
        send_start_signal(&mut line, &mut delay).unwrap();
        wait_for_ack(&mut line, CycleBudget::new(100)).unwrap();

        pin.done();
        delay.done();
    }

    #[test]
    fn test_decode_valid_frame() {
        let bytes = [0x01, 0x90, 0x00, 0xF6, 0x87];

        let mut pin = PinMock::new(&encode_frame(bytes));
        let mut delay = CheckedDelay::new(&start_delays());

        let mut line = OpenDrain::new(pin.clone());
        let frame = decode(&mut line, &mut delay, CycleBudget::new(100)).unwrap();
        assert_eq!(frame, RawFrame::new(bytes));

        pin.done();
        delay.done();
    }

    #[test]
    fn test_decode_is_repeatable() {
        let bytes = [0x02, 0x8C, 0x01, 0x02, 0x91];

        let mut expect = encode_frame(bytes);
        expect.extend(encode_frame(bytes));
        let mut pin = PinMock::new(&expect);

        let mut line = OpenDrain::new(pin.clone());
        let first = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(100)).unwrap();
        let second = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(100)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bytes(), bytes);

        pin.done();
    }

    #[test]
    fn test_start_low_timeout() {
        let mut expect = start_sequence();
        // Line held low for the whole budget (shorted or sensor hung)
        expect.extend(vec![PinTx::get(PinMockState::Low); 10]);

        let mut pin = PinMock::new(&expect);
        let mut line = OpenDrain::new(pin.clone());

        let err = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(10)).unwrap_err();
        assert_eq!(err, DhtError::StartLowTimeout);

        pin.done();
    }

    #[test]
    fn test_no_sensor_is_start_low_timeout() {
        let mut expect = start_sequence();
        // Nobody answers: the pull-up keeps the line high, the low pulse never starts
        expect.push(PinTx::get(PinMockState::High));

        let mut pin = PinMock::new(&expect);
        let mut line = OpenDrain::new(pin.clone());

        let err = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(50)).unwrap_err();
        assert_eq!(err, DhtError::StartLowTimeout);

        pin.done();
    }

    #[test]
    fn test_missed_bit_edge_is_bit_timeout() {
        let mut expect = start_sequence();
        expect.extend(ack());
        expect.extend(encode_byte(0x01));
        // Bit 8: the low pulse is already over on the first poll
        expect.push(PinTx::get(PinMockState::High));

        let mut pin = PinMock::new(&expect);
        let mut line = OpenDrain::new(pin.clone());

        let err = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(20)).unwrap_err();
        assert_eq!(err, DhtError::BitTimeout { bit: 8 });

        pin.done();
    }

    #[test]
    fn test_start_high_timeout() {
        let mut expect = start_sequence();
        expect.extend(pulse(PinMockState::Low, 3));
        // Line is stuck high after the low acknowledge
        expect.extend(vec![PinTx::get(PinMockState::High); 10]);

        let mut pin = PinMock::new(&expect);
        let mut line = OpenDrain::new(pin.clone());

        let err = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(10)).unwrap_err();
        assert_eq!(err, DhtError::StartHighTimeout);

        pin.done();
    }

    #[test]
    fn test_bit_timeout() {
        let mut expect = start_sequence();
        expect.extend(ack());
        expect.extend(encode_byte(0xA5));
        // Low pulse of bit 8 ok, its high pulse never ends
        expect.extend(pulse(PinMockState::Low, REF_LOW));
        expect.extend(vec![PinTx::get(PinMockState::High); 20]);

        let mut pin = PinMock::new(&expect);
        let mut line = OpenDrain::new(pin.clone());

        let err = decode(&mut line, &mut NoopDelay::new(), CycleBudget::new(20)).unwrap_err();
        assert_eq!(err, DhtError::BitTimeout { bit: 8 });
        assert!(err.is_timeout());

        pin.done();
    }

    #[test]
    fn test_pack_bits_round_trip() {
        for bytes in [
            [0x02, 0x8C, 0x01, 0x02, 0x91],
            [0x01, 0x90, 0x80, 0x0A, 0x1B],
            [0xFF, 0x00, 0xAA, 0x55, 0xFE],
        ] {
            assert_eq!(pack_bits(&cycles_for(bytes)).bytes(), bytes);
        }
    }

    #[test]
    fn test_pack_bits_tie_is_zero() {
        let mut cycles = cycles_for([0xFF; 5]);
        // First bit: high pulse exactly as long as the reference
        cycles[1] = cycles[0];
        assert_eq!(pack_bits(&cycles).bytes(), [0x7F, 0xFF, 0xFF, 0xFF, 0xFF]);
    }
}

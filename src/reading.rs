use crate::error::FrameError;
use crate::frame::RawFrame;

/// Lowest temperature the sensor can report, in degrees Celsius.
pub const TEMPERATURE_MIN: f32 = -40.0;
/// Highest temperature the sensor can report, in degrees Celsius.
pub const TEMPERATURE_MAX: f32 = 80.0;
/// Lowest relative humidity, in percent.
pub const HUMIDITY_MIN: f32 = 0.0;
/// Highest relative humidity, in percent.
pub const HUMIDITY_MAX: f32 = 100.0;

/// Reading returned by the DHT22 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub relative_humidity: f32,
}

impl RawFrame {
    /// Relative humidity in percent, without range checking.
    pub fn humidity(&self) -> f32 {
        let [hum_hi, hum_lo, ..] = self.bytes();
        u16::from_be_bytes([hum_hi, hum_lo]) as f32 / 10.0
    }

    /// Temperature in degrees Celsius, without range checking.
    ///
    /// Bit 7 of the high byte is a sign bit, not part of the magnitude.
    pub fn temperature(&self) -> f32 {
        let [_, _, temp_hi, temp_lo, _] = self.bytes();

        let is_temp_negative = (temp_hi >> 7) != 0;
        let joined_temp = u16::from_be_bytes([temp_hi & 0b0111_1111, temp_lo]);
        let temperature = joined_temp as f32 / 10.0;
        if is_temp_negative {
            -temperature
        } else {
            temperature
        }
    }
}

/// Converts a frame into a [`Reading`], rejecting values the sensor cannot produce.
///
/// Both values are dropped together: if either is out of range (or NaN) the
/// whole frame is rejected. The checksum is not looked at; see
/// [`RawFrame::validate`].
pub fn convert(frame: &RawFrame) -> Result<Reading, FrameError> {
    let temperature = frame.temperature();
    let relative_humidity = frame.humidity();

    let temperature_ok = (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature);
    let humidity_ok = (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&relative_humidity);
    if !(temperature_ok && humidity_ok) {
        return Err(FrameError::OutOfRange);
    }

    Ok(Reading {
        temperature,
        relative_humidity,
    })
}

impl TryFrom<RawFrame> for Reading {
    type Error = FrameError;

    /// Validates the checksum, then converts.
    fn try_from(frame: RawFrame) -> Result<Self, Self::Error> {
        frame.validate()?;
        convert(&frame)
    }
}

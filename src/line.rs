//! The single bidirectional data line.
//!
//! The decoder only needs three primitives from the platform: switch the line
//! between driving and listening, drive a level, and sample the level. They are
//! collected in [`DataLine`] so a board can plug in whatever access path is
//! fastest for it.
//!
//! [`OpenDrain`] is the generic path: it wraps any `embedded-hal` pin that is
//! both an [`InputPin`] and an [`OutputPin`] (an open-drain output with the
//! sensor's pull-up on the line). Boards with direct port-register access can
//! implement [`DataLine`] on their own type instead and hand that to the driver.

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

/// Direction of the data line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMode {
    /// The host drives the line.
    Output,
    /// The host listens; the pull-up holds the line high while nobody drives it.
    InputPullUp,
}

/// Access to the sensor's data line.
pub trait DataLine {
    /// Error reported by the underlying pin.
    type Error;

    /// Switches the line direction.
    fn set_mode(&mut self, mode: LineMode) -> Result<(), Self::Error>;

    /// Drives the line to `level`. Only meaningful in [`LineMode::Output`].
    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Samples the current level of the line.
    fn read_level(&mut self) -> Result<PinState, Self::Error>;
}

impl<T: DataLine + ?Sized> DataLine for &mut T {
    type Error = T::Error;

    #[inline]
    fn set_mode(&mut self, mode: LineMode) -> Result<(), Self::Error> {
        T::set_mode(self, mode)
    }

    #[inline]
    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        T::write_level(self, level)
    }

    #[inline]
    fn read_level(&mut self) -> Result<PinState, Self::Error> {
        T::read_level(self)
    }
}

/// [`DataLine`] over an open-drain `embedded-hal` pin.
///
/// Releasing the line and driving it high are the same operation on an
/// open-drain output, so switching to [`LineMode::InputPullUp`] writes high and
/// switching to [`LineMode::Output`] leaves the pin untouched.
pub struct OpenDrain<P> {
    pin: P,
}

impl<P> OpenDrain<P>
where
    P: InputPin + OutputPin,
{
    /// Wraps an open-drain pin connected to the sensor's data line.
    pub fn new(pin: P) -> Self {
        OpenDrain { pin }
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P> DataLine for OpenDrain<P>
where
    P: InputPin + OutputPin,
{
    type Error = <P as ErrorType>::Error;

    fn set_mode(&mut self, mode: LineMode) -> Result<(), Self::Error> {
        match mode {
            LineMode::InputPullUp => self.pin.set_high(),
            LineMode::Output => Ok(()),
        }
    }

    fn write_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }

    #[inline]
    fn read_level(&mut self) -> Result<PinState, Self::Error> {
        Ok(PinState::from(self.pin.is_high()?))
    }
}

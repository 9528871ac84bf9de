use core::fmt;

/// Possible errors from the DHT22 driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtError<E> {
    /// The sensor never pulled the line low to acknowledge the start signal.
    StartLowTimeout,
    /// The sensor held its acknowledge low pulse past the cycle budget.
    StartHighTimeout,
    /// A low or high pulse of a data bit outlasted the cycle budget.
    BitTimeout {
        /// Position of the failing bit, `0..40`, in arrival order.
        bit: u8,
    },
    /// Checksum did not match the received data.
    ChecksumMismatch {
        /// Checksum byte sent by the sensor.
        expected: u8,
        /// Wrapping sum of the four data bytes.
        computed: u8,
    },
    /// The frame decoded to a temperature or humidity outside the sensor's range.
    OutOfRange,
    /// Called again within the minimum interval after a failed read.
    NotReady,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E> DhtError<E> {
    /// Lifts an error of the frame layer into the driver error.
    pub fn from_frame(err: FrameError) -> Self {
        match err {
            FrameError::ChecksumMismatch { expected, computed } => {
                Self::ChecksumMismatch { expected, computed }
            }
            FrameError::OutOfRange => Self::OutOfRange,
        }
    }

    /// Returns `true` for the errors caused by a pulse outlasting the cycle budget.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::StartLowTimeout | Self::StartHighTimeout | Self::BitTimeout { .. }
        )
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartLowTimeout => {
                f.write_str("timed out waiting for the sensor to pull the line low")
            }
            Self::StartHighTimeout => {
                f.write_str("timed out waiting for the sensor to release the line")
            }
            Self::BitTimeout { bit } => write!(f, "timed out while reading bit {bit}"),
            Self::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch (expected {expected:#04x}, computed {computed:#04x})"
            ),
            Self::OutOfRange => f.write_str("reading is outside the sensor's operating range"),
            Self::NotReady => f.write_str("sensor polled too soon after a failed read"),
            Self::PinError(err) => write!(f, "pin error: {err:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DhtError<E> {}

/// Errors from checking and converting an already captured frame.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Checksum did not match the received data.
    ChecksumMismatch { expected: u8, computed: u8 },
    /// Temperature or humidity outside the sensor's range.
    OutOfRange,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch (expected {expected:#04x}, computed {computed:#04x})"
            ),
            Self::OutOfRange => f.write_str("reading is outside the sensor's operating range"),
        }
    }
}

impl core::error::Error for FrameError {}

use crate::error::FrameError;

/// Number of bytes in a frame.
pub const FRAME_LEN: usize = 5;

/// Number of bits the sensor sends per read.
pub const FRAME_BITS: usize = FRAME_LEN * 8;

/// The 40 bits sent by the sensor: humidity (2 bytes), temperature (2 bytes), checksum.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_LEN]);

impl RawFrame {
    /// Builds a frame from the five bytes in arrival order.
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        RawFrame(bytes)
    }

    /// The five bytes in arrival order.
    pub const fn bytes(&self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// Checksum byte as sent by the sensor.
    pub const fn checksum(&self) -> u8 {
        self.0[4]
    }

    /// Low 8 bits of the sum of the four data bytes.
    pub fn computed_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
    }

    /// Checks that the checksum byte matches the data bytes.
    pub fn validate(&self) -> Result<(), FrameError> {
        let computed = self.computed_checksum();
        if computed == self.checksum() {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch {
                expected: self.checksum(),
                computed,
            })
        }
    }
}

impl From<[u8; FRAME_LEN]> for RawFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        RawFrame(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_matching_checksum() {
        let frame = RawFrame::new([0x02, 0x8C, 0x01, 0x02, 0x91]);
        assert_eq!(frame.validate(), Ok(()));
    }

    #[test]
    fn test_validate_wraps_sum() {
        // 0xFF + 0xFF + 0x02 + 0x03 = 0x203 -> 0x03
        let frame = RawFrame::new([0xFF, 0xFF, 0x02, 0x03, 0x03]);
        assert_eq!(frame.computed_checksum(), 0x03);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_every_other_checksum() {
        let data = [0x01, 0x90, 0x00, 0xF6];
        for checksum in 0..=u8::MAX {
            let frame = RawFrame::new([data[0], data[1], data[2], data[3], checksum]);
            if checksum == 0x87 {
                assert!(frame.validate().is_ok());
            } else {
                assert_eq!(
                    frame.validate(),
                    Err(FrameError::ChecksumMismatch {
                        expected: checksum,
                        computed: 0x87,
                    })
                );
            }
        }
    }
}

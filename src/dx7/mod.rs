use std::fmt;
use rand::Rng;

use crate::Ranged;

pub mod envelope;
pub mod lfo;
pub mod operator;
pub mod param;
pub mod sysex;
pub mod voice;

/// Number of operators in a voice.
pub const OPERATOR_COUNT: usize = 6;

/// MIDI channel (1...16), sent 0-indexed on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MIDIChannel(i32);

crate::ranged_impl!(MIDIChannel, 1, 16, 1);

impl MIDIChannel {
    pub fn as_byte(&self) -> u8 {
        (self.0 - 1) as u8  // adjust to 0...15 for SysEx
    }
}

impl From<u8> for MIDIChannel {
    /// Makes a MIDI channel from the low nibble of a SysEx status byte.
    fn from(item: u8) -> Self {
        MIDIChannel::new(((item & 0b00001111) + 1) as i32)
    }
}

/// Device number (0...15) in the low nibble of a bulk dump status byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DeviceNumber(i32);

crate::ranged_impl!(DeviceNumber, 0, 15, 0);

impl DeviceNumber {
    pub fn as_byte(&self) -> u8 {
        self.0 as u8
    }
}

impl From<u8> for DeviceNumber {
    fn from(item: u8) -> Self {
        DeviceNumber::new((item & 0b00001111) as i32)
    }
}

// Finds the first offset where the two slices differ.
// Returns None if no differences are found, or if the slices
// are different lengths, Some<usize> with the offset otherwise.
pub fn first_different_offset(v1: &[u8], v2: &[u8]) -> Option<usize> {
    if v1.len() != v2.len() {
        return None;
    }

    for i in 0..v1.len() {
        if v1[i] != v2[i] {
            return Some(i);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_as_byte() {
        assert_eq!(MIDIChannel::new(1).as_byte(), 0);
        assert_eq!(MIDIChannel::new(16).as_byte(), 15);
    }

    #[test]
    fn test_channel_from_status_byte() {
        // Parameter change status byte 0x12 = sub-status 1, channel 3.
        assert_eq!(MIDIChannel::from(0x12u8), MIDIChannel::new(3));
    }

    #[test]
    fn test_device_number_from_byte() {
        assert_eq!(DeviceNumber::from(0x00u8).value(), 0);
        assert_eq!(DeviceNumber::from(0x0Fu8).value(), 15);
    }

    #[test]
    fn test_first_different_offset() {
        let a = [1u8, 2, 3];
        let b = [1u8, 2, 4];
        assert_eq!(first_different_offset(&a, &b), Some(2));
        assert_eq!(first_different_offset(&a, &a), None);
    }
}

use std::fmt;
use log::warn;

use crate::FormatError;
use crate::dx7::sysex::SystemExclusiveData;

/// LFO waveform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum LfoWaveform {
    Triangle,
    SawDown,
    SawUp,
    Square,
    Sine,
    SampleAndHold,
}

/// LFO settings, stored as the raw SysEx bytes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Lfo {
    pub speed: u8,     // 0 ~ 99
    pub delay: u8,     // 0 ~ 99
    pub pmd: u8,       // 0 ~ 99
    pub amd: u8,       // 0 ~ 99
    pub key_sync: u8,  // 0/1
    pub waveform: u8,  // 0 ~ 5
}

impl Lfo {
    /// Makes a new LFO initialized with the voice init defaults.
    pub fn new() -> Self {
        Self {
            speed: 35,
            delay: 0,
            pmd: 0,
            amd: 0,
            key_sync: 1,
            waveform: LfoWaveform::Triangle as u8,
        }
    }

    /// Interprets the waveform byte, falling back to triangle when the
    /// byte is outside the documented range.
    pub fn waveform_kind(&self) -> LfoWaveform {
        match self.waveform {
            0 => LfoWaveform::Triangle,
            1 => LfoWaveform::SawDown,
            2 => LfoWaveform::SawUp,
            3 => LfoWaveform::Square,
            4 => LfoWaveform::Sine,
            5 => LfoWaveform::SampleAndHold,
            _ => {
                warn!("LFO waveform out of range: {}, displaying as TRI", self.waveform);
                LfoWaveform::Triangle
            }
        }
    }
}

impl Default for Lfo {
    fn default() -> Lfo {
        Lfo::new()
    }
}

impl fmt::Display for Lfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "speed = {}, delay = {}, PMD = {}, AMD = {}, key sync = {}, waveform = {:?}",
            self.speed,
            self.delay,
            self.pmd,
            self.amd,
            self.key_sync,
            self.waveform_kind())
    }
}

impl SystemExclusiveData for Lfo {
    fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::DATA_SIZE {
            return Err(FormatError::InvalidLength(data.len()));
        }
        Ok(Lfo {
            speed: data[0],
            delay: data[1],
            pmd: data[2],
            amd: data[3],
            key_sync: data[4],
            waveform: data[5],
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        vec![
            self.speed,
            self.delay,
            self.pmd,
            self.amd,
            self.key_sync,
            self.waveform,
        ]
    }

    const DATA_SIZE: usize = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let lfo = Lfo::from_bytes(&[35, 0, 0, 0, 1, 4]).unwrap();
        assert_eq!(lfo.speed, 35);
        assert_eq!(lfo.key_sync, 1);
        assert_eq!(lfo.waveform_kind(), LfoWaveform::Sine);
    }

    #[test]
    fn test_waveform_out_of_range() {
        let lfo = Lfo { waveform: 9, ..Lfo::new() };
        // The raw byte is preserved, only the display falls back.
        assert_eq!(lfo.waveform, 9);
        assert_eq!(lfo.waveform_kind(), LfoWaveform::Triangle);
    }
}

use std::fmt;
use rand::Rng;

use crate::FormatError;
use crate::dx7::sysex::SystemExclusiveData;

/// Envelope generator: four rates followed by four levels.
///
/// The bytes are stored exactly as received; documented ranges (0...99)
/// are not enforced here, so a corrupt dump survives a round trip.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Envelope {
    pub rates: [u8; 4],
    pub levels: [u8; 4],
}

impl Envelope {
    /// Creates a new EG with the voice init defaults.
    pub fn new() -> Self {
        Envelope {
            rates: [99, 99, 99, 99],
            levels: [99, 99, 99, 0],
        }
    }

    /// Makes a new EG with random rates and levels in the documented range.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let mut rates = [0u8; 4];
        let mut levels = [0u8; 4];
        for i in 0..4 {
            rates[i] = rng.random_range(0..=99);
            levels[i] = rng.random_range(0..=99);
        }
        Self { rates, levels }
    }
}

impl Default for Envelope {
    fn default() -> Envelope {
        Envelope::new()
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R1={} L1={} R2={} L2={} R3={} L3={} R4={} L4={}",
            self.rates[0], self.levels[0],
            self.rates[1], self.levels[1],
            self.rates[2], self.levels[2],
            self.rates[3], self.levels[3])
    }
}

impl SystemExclusiveData for Envelope {
    /// Makes an envelope generator from relevant SysEx message bytes.
    fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::DATA_SIZE {
            return Err(FormatError::InvalidLength(data.len()));
        }
        Ok(Envelope {
            rates: [data[0], data[1], data[2], data[3]],
            levels: [data[4], data[5], data[6], data[7]],
        })
    }

    /// Gets the SysEx bytes of this EG.
    fn to_bytes(&self) -> Vec<u8> {
        let mut data = self.rates.to_vec();
        data.extend(self.levels);
        data
    }

    const DATA_SIZE: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let eg = Envelope::from_bytes(&[49, 99, 28, 68, 98, 98, 91, 0]).unwrap();
        assert_eq!(eg.rates, [49, 99, 28, 68]);
        assert_eq!(eg.levels, [98, 98, 91, 0]);
    }

    #[test]
    fn test_out_of_range_bytes_pass_through() {
        // Values above 99 are kept verbatim; clamping is the caller's job.
        let eg = Envelope::from_bytes(&[200, 0, 0, 0, 0, 0, 0, 127]).unwrap();
        assert_eq!(eg.rates[0], 200);
        assert_eq!(eg.levels[3], 127);
    }

    #[test]
    fn test_to_bytes() {
        let eg = Envelope::new();
        assert_eq!(eg.to_bytes(), vec![99, 99, 99, 99, 99, 99, 99, 0]);
    }
}

use std::fmt;
use log::warn;
use rand::Rng;

use crate::{
    FormatError,
    InvalidParameterError,
};

use crate::dx7::OPERATOR_COUNT;
use crate::dx7::envelope::Envelope;
use crate::dx7::lfo::Lfo;
use crate::dx7::operator::OperatorParams;
use crate::dx7::param::{
    GlobalParam,
    OperatorParam,
    Parameter,
};
use crate::dx7::sysex::{
    self,
    SystemExclusiveData,
};

/// Length of the voice data block in a single voice dump.
pub const VOICE_DATA_SIZE: usize = 155;

/// Length of the block with the trailing OPE/OPSEL bytes.
pub const EXTENDED_VOICE_DATA_SIZE: usize = 157;

const NAME_SIZE: usize = 10;

/// A decoded single voice dump.
///
/// Every byte of the block is kept verbatim, including values outside
/// the documented parameter ranges, so decoding and re-encoding a dump
/// reproduces it byte for byte. Clamping is left to the display layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VoiceDump {
    /// The operators in wire order: index 0 is operator 6, index 5 is
    /// operator 1.
    pub operators: [OperatorParams; OPERATOR_COUNT],
    pub pitch_eg: Envelope,
    pub algorithm: u8,       // ALS, 0 ~ 31
    pub feedback: u8,        // FBL, 0 ~ 7
    pub osc_key_sync: u8,    // OPI, 0/1
    pub lfo: Lfo,
    pub pitch_mod_sens: u8,  // LPMS, 0 ~ 7
    pub transpose: u8,       // TRNP, 0 ~ 48, 24 = no transpose
    pub name_bytes: [u8; NAME_SIZE],  // VNAM1 ~ VNAM10, raw ASCII
    /// Operator enable bitfield, only present in extended dumps.
    pub operator_enable: Option<u8>,
    /// Operator select byte, only present in extended dumps.
    pub operator_select: Option<u8>,
}

impl VoiceDump {
    /// Creates a new voice initialized with the usual init voice settings.
    pub fn new() -> Self {
        Self {
            operators: [OperatorParams::new(); OPERATOR_COUNT],
            pitch_eg: Envelope {
                levels: [50, 50, 50, 50],
                ..Envelope::new()
            },
            algorithm: 0,
            feedback: 0,
            osc_key_sync: 1,
            lfo: Lfo::new(),
            pitch_mod_sens: 0,
            transpose: 24,
            name_bytes: *b"INIT VOICE",
            operator_enable: None,
            operator_select: None,
        }
    }

    /// Makes a new voice with random settings in the documented ranges.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let mut name_bytes = [0u8; NAME_SIZE];
        for b in name_bytes.iter_mut() {
            *b = rng.random_range(b'A'..=b'Z');
        }
        Self {
            operators: [
                OperatorParams::random(), OperatorParams::random(),
                OperatorParams::random(), OperatorParams::random(),
                OperatorParams::random(), OperatorParams::random(),
            ],
            pitch_eg: Envelope::random(),
            algorithm: rng.random_range(0..=31),
            feedback: rng.random_range(0..=7),
            osc_key_sync: rng.random_range(0..=1),
            lfo: Lfo {
                speed: rng.random_range(0..=99),
                delay: rng.random_range(0..=99),
                pmd: rng.random_range(0..=99),
                amd: rng.random_range(0..=99),
                key_sync: rng.random_range(0..=1),
                waveform: rng.random_range(0..=5),
            },
            pitch_mod_sens: rng.random_range(0..=7),
            transpose: rng.random_range(0..=48),
            name_bytes,
            operator_enable: None,
            operator_select: None,
        }
    }

    /// Decodes a complete single voice dump frame (161 bytes, or 163 with
    /// the trailing OPE/OPSEL bytes).
    pub fn from_frame(data: &[u8]) -> Result<Self, FormatError> {
        let payload = sysex::strip_voice_frame(data)?;
        Self::from_bytes(payload)
    }

    /// The voice name: raw bytes as printable ASCII, with anything outside
    /// the printable range replaced by a space, and trailing whitespace
    /// trimmed. The raw bytes stay available in `name_bytes`.
    pub fn name(&self) -> String {
        let chars: String = self.name_bytes.iter()
            .map(|&b| {
                if (0x20..=0x7E).contains(&b) {
                    b as char
                }
                else {
                    warn!("replacing non-printable voice name byte {:#04X}", b);
                    ' '
                }
            })
            .collect();
        chars.trim_end().to_string()
    }

    /// Sets the voice name, truncating to ten characters and padding with
    /// spaces. Characters outside printable ASCII become spaces.
    pub fn set_name(&mut self, name: &str) {
        let mut bytes = [b' '; NAME_SIZE];
        for (i, c) in name.chars().take(NAME_SIZE).enumerate() {
            bytes[i] = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b' ' };
        }
        self.name_bytes = bytes;
    }

    /// Gets the raw byte of a global parameter.
    pub fn get(&self, param: GlobalParam) -> u8 {
        match param {
            GlobalParam::Pr1 => self.pitch_eg.rates[0],
            GlobalParam::Pr2 => self.pitch_eg.rates[1],
            GlobalParam::Pr3 => self.pitch_eg.rates[2],
            GlobalParam::Pr4 => self.pitch_eg.rates[3],
            GlobalParam::Pl1 => self.pitch_eg.levels[0],
            GlobalParam::Pl2 => self.pitch_eg.levels[1],
            GlobalParam::Pl3 => self.pitch_eg.levels[2],
            GlobalParam::Pl4 => self.pitch_eg.levels[3],
            GlobalParam::Als => self.algorithm,
            GlobalParam::Fbl => self.feedback,
            GlobalParam::Opi => self.osc_key_sync,
            GlobalParam::Lfs => self.lfo.speed,
            GlobalParam::Lfd => self.lfo.delay,
            GlobalParam::Lpmd => self.lfo.pmd,
            GlobalParam::Lamd => self.lfo.amd,
            GlobalParam::Lfks => self.lfo.key_sync,
            GlobalParam::Lfw => self.lfo.waveform,
            GlobalParam::Lpms => self.pitch_mod_sens,
            GlobalParam::Trnp => self.transpose,
        }
    }

    /// Sets the raw byte of a global parameter.
    pub fn set(&mut self, param: GlobalParam, value: u8) {
        match param {
            GlobalParam::Pr1 => self.pitch_eg.rates[0] = value,
            GlobalParam::Pr2 => self.pitch_eg.rates[1] = value,
            GlobalParam::Pr3 => self.pitch_eg.rates[2] = value,
            GlobalParam::Pr4 => self.pitch_eg.rates[3] = value,
            GlobalParam::Pl1 => self.pitch_eg.levels[0] = value,
            GlobalParam::Pl2 => self.pitch_eg.levels[1] = value,
            GlobalParam::Pl3 => self.pitch_eg.levels[2] = value,
            GlobalParam::Pl4 => self.pitch_eg.levels[3] = value,
            GlobalParam::Als => self.algorithm = value,
            GlobalParam::Fbl => self.feedback = value,
            GlobalParam::Opi => self.osc_key_sync = value,
            GlobalParam::Lfs => self.lfo.speed = value,
            GlobalParam::Lfd => self.lfo.delay = value,
            GlobalParam::Lpmd => self.lfo.pmd = value,
            GlobalParam::Lamd => self.lfo.amd = value,
            GlobalParam::Lfks => self.lfo.key_sync = value,
            GlobalParam::Lfw => self.lfo.waveform = value,
            GlobalParam::Lpms => self.pitch_mod_sens = value,
            GlobalParam::Trnp => self.transpose = value,
        }
    }

    /// Gets the raw byte of an operator parameter. The index follows the
    /// `operators` array: index 0 is operator 6.
    pub fn get_operator(&self, index: usize, param: OperatorParam) -> u8 {
        self.operators[index].get(param)
    }

    /// Gets the value of any addressable parameter, or None when the
    /// parameter is absent from this dump (trailing bytes, function
    /// parameters) or the operator index is out of range.
    pub fn value(&self, param: &Parameter) -> Option<u8> {
        match param {
            Parameter::Op { index, param } =>
                self.operators.get(*index).map(|op| op.get(*param)),
            Parameter::Global(global) => Some(self.get(*global)),
            Parameter::NameChar(n) => self.name_bytes.get(*n).copied(),
            Parameter::OperatorEnable => self.operator_enable,
            Parameter::OperatorSelect => self.operator_select,
            Parameter::Function(_) => None,
        }
    }

    /// Sets the value of any block-resident parameter.
    pub fn set_value(&mut self, param: &Parameter, value: u8) -> Result<(), InvalidParameterError> {
        match param {
            Parameter::Op { index, param } => {
                match self.operators.get_mut(*index) {
                    Some(op) => {
                        op.set(*param, value);
                        Ok(())
                    },
                    None => Err(InvalidParameterError::OperatorIndexOutOfRange(*index)),
                }
            },
            Parameter::Global(global) => {
                self.set(*global, value);
                Ok(())
            },
            Parameter::NameChar(n) if *n < NAME_SIZE => {
                self.name_bytes[*n] = value;
                Ok(())
            },
            Parameter::NameChar(n) =>
                Err(InvalidParameterError::UnknownKey(format!("VNAM{}", n + 1))),
            Parameter::OperatorEnable => {
                self.operator_enable = Some(value);
                Ok(())
            },
            Parameter::OperatorSelect => {
                self.operator_select = Some(value);
                Ok(())
            },
            Parameter::Function(function) =>
                Err(InvalidParameterError::NotVoiceData(function.key())),
        }
    }
}

impl Default for VoiceDump {
    fn default() -> VoiceDump {
        VoiceDump::new()
    }
}

impl SystemExclusiveData for VoiceDump {
    /// Decodes a bare voice block (155 bytes, or 157 with the trailing
    /// OPE/OPSEL bytes). The operator data comes in reverse order:
    /// operator 6 first, operator 1 last.
    fn from_bytes(data: &[u8]) -> Result<VoiceDump, FormatError> {
        if data.len() != VOICE_DATA_SIZE && data.len() != EXTENDED_VOICE_DATA_SIZE {
            return Err(FormatError::InvalidLength(data.len()));
        }

        let mut operators = [OperatorParams::new(); OPERATOR_COUNT];
        for (i, op) in operators.iter_mut().enumerate() {
            let offset = i * OperatorParams::DATA_SIZE;
            *op = OperatorParams::from_bytes(&data[offset..offset + OperatorParams::DATA_SIZE])?;
        }

        let mut name_bytes = [0u8; NAME_SIZE];
        name_bytes.copy_from_slice(&data[145..155]);

        // Trailing bytes are absent from a plain 155-byte block; absence
        // stays absent instead of turning into zeros.
        let (operator_enable, operator_select) =
            if data.len() == EXTENDED_VOICE_DATA_SIZE {
                (Some(data[155]), Some(data[156]))
            }
            else {
                (None, None)
            };

        Ok(VoiceDump {
            operators,
            pitch_eg: Envelope::from_bytes(&data[126..134])?,
            algorithm: data[134],
            feedback: data[135],
            osc_key_sync: data[136],
            lfo: Lfo::from_bytes(&data[137..143])?,
            pitch_mod_sens: data[143],
            transpose: data[144],
            name_bytes,
            operator_enable,
            operator_select,
        })
    }

    /// Re-encodes the voice block through the parameter address table,
    /// so every addressable parameter lands back on its own offset.
    fn to_bytes(&self) -> Vec<u8> {
        let extended = self.operator_enable.is_some() || self.operator_select.is_some();
        let size = if extended { EXTENDED_VOICE_DATA_SIZE } else { VOICE_DATA_SIZE };
        let mut data = vec![0u8; size];

        for param in Parameter::voice_block_params() {
            if let (Some(offset), Some(value)) = (param.block_offset(), self.value(&param)) {
                data[offset] = value;
            }
        }

        if extended {
            data[155] = self.operator_enable.unwrap_or(0);
            data[156] = self.operator_select.unwrap_or(0);
        }

        data
    }

    const DATA_SIZE: usize = VOICE_DATA_SIZE;
}

impl fmt::Display for VoiceDump {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "==========
{}
==========
OP1: {}
OP2: {}
OP3: {}
OP4: {}
OP5: {}
OP6: {}
PEG: {}
ALS: {}, feedback = {}, osc key sync = {}
LFO: {}
Pitch mod sens: {}
Transpose: {}
",
            self.name(),
            self.operators[5],
            self.operators[4],
            self.operators[3],
            self.operators[2],
            self.operators[1],
            self.operators[0],
            self.pitch_eg,
            self.algorithm,
            self.feedback,
            self.osc_key_sync,
            self.lfo,
            self.pitch_mod_sens,
            self.transpose)
    }
}

#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;
    use crate::dx7::{DeviceNumber, first_different_offset};
    use crate::Ranged;

    fn all_zero_frame() -> Vec<u8> {
        let mut frame = vec![0u8; 161];
        frame[0] = 0xF0;
        frame[1] = 0x43;
        frame[2] = 0x00;  // device 0
        frame[3] = 0x09;
        frame[4] = 0x20;
        frame[160] = 0xF7;
        frame
    }

    #[test]
    fn test_decode_all_zero_frame() {
        let voice = VoiceDump::from_frame(&all_zero_frame()).unwrap();
        assert_eq!(voice.operators[0].get(OperatorParam::R1), 0);
        assert_eq!(voice.algorithm, 0);
        // An all-zero name reads back as empty after replacement and trimming.
        assert_eq!(voice.name(), "");
        assert_eq!(voice.operator_enable, None);
        assert_eq!(voice.operator_select, None);
    }

    #[test]
    fn test_operator_ordering() {
        let baseline = VoiceDump::from_frame(&all_zero_frame()).unwrap();

        // Byte 16 of the block is the TL of the first operator chunk,
        // which is operator 6.
        let mut frame = all_zero_frame();
        frame[5 + 16] = 42;
        let changed = VoiceDump::from_frame(&frame).unwrap();

        assert_eq!(changed.operators[0].get(OperatorParam::Tl), 42);
        assert_ne!(changed.operators[0], baseline.operators[0]);
        for i in 1..6 {
            assert_eq!(changed.operators[i], baseline.operators[i]);
        }
    }

    #[test]
    fn test_malformed_length() {
        assert_eq!(VoiceDump::from_bytes(&[0u8; 100]),
            Err(FormatError::InvalidLength(100)));
        assert_eq!(VoiceDump::from_frame(&[0u8; 100]),
            Err(FormatError::InvalidLength(100)));
    }

    #[test]
    fn test_out_of_range_bytes_survive() {
        let mut frame = all_zero_frame();
        frame[5 + 134] = 200;  // ALS way outside 0...31
        let voice = VoiceDump::from_frame(&frame).unwrap();
        assert_eq!(voice.algorithm, 200);
        assert_eq!(voice.to_bytes()[134], 200);
    }

    #[test]
    fn test_name_with_embedded_zero() {
        let mut frame = all_zero_frame();
        frame[5 + 145..5 + 155].copy_from_slice(b"ABC\0      ");
        let voice = VoiceDump::from_frame(&frame).unwrap();
        assert_eq!(voice.name(), "ABC");
        // The raw byte is still there for per-character access.
        assert_eq!(voice.value(&Parameter::NameChar(3)), Some(0));
    }

    #[test]
    fn test_round_trip_random_voices() {
        for _ in 0..20 {
            let voice = VoiceDump::random();
            let data = voice.to_bytes();
            assert_eq!(data.len(), VOICE_DATA_SIZE);

            let decoded = VoiceDump::from_bytes(&data).unwrap();
            let encoded = decoded.to_bytes();
            assert_eq!(first_different_offset(&data, &encoded), None);
            assert_eq!(decoded, voice);
        }
    }

    #[test]
    fn test_round_trip_extended_block() {
        let mut voice = VoiceDump::random();
        voice.operator_enable = Some(0x3F);
        voice.operator_select = Some(2);

        let data = voice.to_bytes();
        assert_eq!(data.len(), EXTENDED_VOICE_DATA_SIZE);

        let decoded = VoiceDump::from_bytes(&data).unwrap();
        assert_eq!(decoded.operator_enable, Some(0x3F));
        assert_eq!(decoded.operator_select, Some(2));
        assert_eq!(decoded, voice);
    }

    #[test]
    fn test_frame_round_trip() {
        let voice = VoiceDump::random();
        let frame = sysex::voice_dump_frame(DeviceNumber::new(3), &voice);
        assert_eq!(frame.len(), 161);
        assert_eq!(sysex::frame_device_number(&frame).value(), 3);

        let decoded = VoiceDump::from_frame(&frame).unwrap();
        assert_eq!(decoded, voice);
    }

    #[test]
    fn test_init_voice() {
        let voice = VoiceDump::new();
        assert_eq!(voice.name(), "INIT VOICE");
        assert_eq!(voice.transpose, 24);
        assert_eq!(voice.osc_key_sync, 1);
        assert_eq!(voice.operators[0].coarse, 1);
        assert_eq!(voice.to_bytes().len(), VOICE_DATA_SIZE);
    }

    #[test]
    fn test_set_name() {
        let mut voice = VoiceDump::new();
        voice.set_name("PAD");
        assert_eq!(voice.name_bytes, *b"PAD       ");
        assert_eq!(voice.name(), "PAD");

        voice.set_name("LONGER THAN TEN");
        assert_eq!(voice.name(), "LONGER THA");
    }

    #[test]
    fn test_value_and_set_value() {
        let mut voice = VoiceDump::new();

        let als = Parameter::from_key("ALS", None).unwrap();
        voice.set_value(&als, 5).unwrap();
        assert_eq!(voice.value(&als), Some(5));
        assert_eq!(voice.algorithm, 5);

        let tl = Parameter::from_key("TL", Some(0)).unwrap();
        voice.set_value(&tl, 91).unwrap();
        assert_eq!(voice.get_operator(0, OperatorParam::Tl), 91);

        // Function parameters are not voice data.
        let pbr = Parameter::from_key("PBR", None).unwrap();
        assert!(voice.set_value(&pbr, 2).is_err());
        assert_eq!(voice.value(&pbr), None);
    }
}

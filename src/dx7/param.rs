use std::fmt;

use crate::InvalidParameterError;
use crate::dx7::OPERATOR_COUNT;

/// Operator-scoped parameter.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum OperatorParam {
    R1, R2, R3, R4,  // EG rates
    L1, L2, L3, L4,  // EG levels
    Bp,  // keyboard level scaling break point
    Ld,  // left depth
    Rd,  // right depth
    Lc,  // left curve
    Rc,  // right curve
    Rs,  // keyboard rate scaling
    Ams, // amplitude modulation sensitivity
    Ts,  // touch (key velocity) sensitivity
    Tl,  // total (output) level
    Pm,  // frequency mode (0 = ratio, 1 = fixed)
    Pc,  // frequency coarse
    Pf,  // frequency fine
    Pd,  // detune (7 = no detune)
}

impl OperatorParam {
    pub const ALL: [OperatorParam; 21] = [
        OperatorParam::R1, OperatorParam::R2, OperatorParam::R3, OperatorParam::R4,
        OperatorParam::L1, OperatorParam::L2, OperatorParam::L3, OperatorParam::L4,
        OperatorParam::Bp, OperatorParam::Ld, OperatorParam::Rd,
        OperatorParam::Lc, OperatorParam::Rc, OperatorParam::Rs,
        OperatorParam::Ams, OperatorParam::Ts, OperatorParam::Tl,
        OperatorParam::Pm, OperatorParam::Pc, OperatorParam::Pf, OperatorParam::Pd,
    ];

    /// Byte position inside the 21-byte operator chunk of a bulk dump.
    pub fn wire_offset(&self) -> usize {
        match self {
            OperatorParam::R1 => 0,
            OperatorParam::R2 => 1,
            OperatorParam::R3 => 2,
            OperatorParam::R4 => 3,
            OperatorParam::L1 => 4,
            OperatorParam::L2 => 5,
            OperatorParam::L3 => 6,
            OperatorParam::L4 => 7,
            OperatorParam::Bp => 8,
            OperatorParam::Ld => 9,
            OperatorParam::Rd => 10,
            OperatorParam::Lc => 11,
            OperatorParam::Rc => 12,
            OperatorParam::Rs => 13,
            OperatorParam::Ams => 14,
            OperatorParam::Ts => 15,
            OperatorParam::Tl => 16,
            OperatorParam::Pm => 17,
            OperatorParam::Pc => 18,
            OperatorParam::Pf => 19,
            OperatorParam::Pd => 20,
        }
    }

    /// Intra-operator offset used for live parameter change addresses.
    /// Note that TL comes before AMS and TS here, unlike in the bulk dump.
    pub fn change_offset(&self) -> usize {
        match self {
            OperatorParam::Tl => 14,
            OperatorParam::Ams => 15,
            OperatorParam::Ts => 16,
            other => other.wire_offset(),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            OperatorParam::R1 => "R1",
            OperatorParam::R2 => "R2",
            OperatorParam::R3 => "R3",
            OperatorParam::R4 => "R4",
            OperatorParam::L1 => "L1",
            OperatorParam::L2 => "L2",
            OperatorParam::L3 => "L3",
            OperatorParam::L4 => "L4",
            OperatorParam::Bp => "BP",
            OperatorParam::Ld => "LD",
            OperatorParam::Rd => "RD",
            OperatorParam::Lc => "LC",
            OperatorParam::Rc => "RC",
            OperatorParam::Rs => "RS",
            OperatorParam::Ams => "AMS",
            OperatorParam::Ts => "TS",
            OperatorParam::Tl => "TL",
            OperatorParam::Pm => "PM",
            OperatorParam::Pc => "PC",
            OperatorParam::Pf => "PF",
            OperatorParam::Pd => "PD",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        OperatorParam::ALL.iter().find(|p| p.key() == key).copied()
    }
}

impl fmt::Display for OperatorParam {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Voice-global parameter.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum GlobalParam {
    Pr1, Pr2, Pr3, Pr4,  // pitch EG rates
    Pl1, Pl2, Pl3, Pl4,  // pitch EG levels
    Als,   // algorithm select
    Fbl,   // feedback level
    Opi,   // oscillator key sync
    Lfs,   // LFO speed
    Lfd,   // LFO delay
    Lpmd,  // LFO pitch mod depth
    Lamd,  // LFO amp mod depth
    Lfks,  // LFO key sync
    Lfw,   // LFO waveform
    Lpms,  // pitch mod sensitivity
    Trnp,  // transpose
}

impl GlobalParam {
    pub const ALL: [GlobalParam; 19] = [
        GlobalParam::Pr1, GlobalParam::Pr2, GlobalParam::Pr3, GlobalParam::Pr4,
        GlobalParam::Pl1, GlobalParam::Pl2, GlobalParam::Pl3, GlobalParam::Pl4,
        GlobalParam::Als, GlobalParam::Fbl, GlobalParam::Opi,
        GlobalParam::Lfs, GlobalParam::Lfd, GlobalParam::Lpmd, GlobalParam::Lamd,
        GlobalParam::Lfks, GlobalParam::Lfw, GlobalParam::Lpms, GlobalParam::Trnp,
    ];

    /// Byte offset in the 155-byte voice block. The same number is the
    /// live parameter change address of the global parameter.
    pub fn offset(&self) -> usize {
        match self {
            GlobalParam::Pr1 => 126,
            GlobalParam::Pr2 => 127,
            GlobalParam::Pr3 => 128,
            GlobalParam::Pr4 => 129,
            GlobalParam::Pl1 => 130,
            GlobalParam::Pl2 => 131,
            GlobalParam::Pl3 => 132,
            GlobalParam::Pl4 => 133,
            GlobalParam::Als => 134,
            GlobalParam::Fbl => 135,
            GlobalParam::Opi => 136,
            GlobalParam::Lfs => 137,
            GlobalParam::Lfd => 138,
            GlobalParam::Lpmd => 139,
            GlobalParam::Lamd => 140,
            GlobalParam::Lfks => 141,
            GlobalParam::Lfw => 142,
            GlobalParam::Lpms => 143,
            GlobalParam::Trnp => 144,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            GlobalParam::Pr1 => "PR1",
            GlobalParam::Pr2 => "PR2",
            GlobalParam::Pr3 => "PR3",
            GlobalParam::Pr4 => "PR4",
            GlobalParam::Pl1 => "PL1",
            GlobalParam::Pl2 => "PL2",
            GlobalParam::Pl3 => "PL3",
            GlobalParam::Pl4 => "PL4",
            GlobalParam::Als => "ALS",
            GlobalParam::Fbl => "FBL",
            GlobalParam::Opi => "OPI",
            GlobalParam::Lfs => "LFS",
            GlobalParam::Lfd => "LFD",
            GlobalParam::Lpmd => "LPMD",
            GlobalParam::Lamd => "LAMD",
            GlobalParam::Lfks => "LFKS",
            GlobalParam::Lfw => "LFW",
            GlobalParam::Lpms => "LPMS",
            GlobalParam::Trnp => "TRNP",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        GlobalParam::ALL.iter().find(|p| p.key() == key).copied()
    }
}

impl fmt::Display for GlobalParam {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Function-group parameter, addressed with group byte 20H. These live
/// outside the voice block and are never part of a bulk dump.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FunctionParam {
    MonoMode,
    PitchBendRange,
    PitchBendStep,
    PortamentoMode,
    PortamentoGliss,
    PortamentoTime,
    ModWheelRange,
    ModWheelAssign,
    FootControlRange,
    FootControlAssign,
    BreathControlRange,
    BreathControlAssign,
    AftertouchRange,
    AftertouchAssign,
}

impl FunctionParam {
    pub const ALL: [FunctionParam; 14] = [
        FunctionParam::MonoMode,
        FunctionParam::PitchBendRange,
        FunctionParam::PitchBendStep,
        FunctionParam::PortamentoMode,
        FunctionParam::PortamentoGliss,
        FunctionParam::PortamentoTime,
        FunctionParam::ModWheelRange,
        FunctionParam::ModWheelAssign,
        FunctionParam::FootControlRange,
        FunctionParam::FootControlAssign,
        FunctionParam::BreathControlRange,
        FunctionParam::BreathControlAssign,
        FunctionParam::AftertouchRange,
        FunctionParam::AftertouchAssign,
    ];

    /// Parameter number within the function group (64...77).
    pub fn address(&self) -> u8 {
        match self {
            FunctionParam::MonoMode => 64,
            FunctionParam::PitchBendRange => 65,
            FunctionParam::PitchBendStep => 66,
            FunctionParam::PortamentoMode => 67,
            FunctionParam::PortamentoGliss => 68,
            FunctionParam::PortamentoTime => 69,
            FunctionParam::ModWheelRange => 70,
            FunctionParam::ModWheelAssign => 71,
            FunctionParam::FootControlRange => 72,
            FunctionParam::FootControlAssign => 73,
            FunctionParam::BreathControlRange => 74,
            FunctionParam::BreathControlAssign => 75,
            FunctionParam::AftertouchRange => 76,
            FunctionParam::AftertouchAssign => 77,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            FunctionParam::MonoMode => "MONO",
            FunctionParam::PitchBendRange => "PBR",
            FunctionParam::PitchBendStep => "PBS",
            FunctionParam::PortamentoMode => "PORTM",
            FunctionParam::PortamentoGliss => "PORTG",
            FunctionParam::PortamentoTime => "PORTT",
            FunctionParam::ModWheelRange => "MWR",
            FunctionParam::ModWheelAssign => "MWA",
            FunctionParam::FootControlRange => "FCR",
            FunctionParam::FootControlAssign => "FCA",
            FunctionParam::BreathControlRange => "BCR",
            FunctionParam::BreathControlAssign => "BCA",
            FunctionParam::AftertouchRange => "ATR",
            FunctionParam::AftertouchAssign => "ATA",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FunctionParam::ALL.iter().find(|p| p.key() == key).copied()
    }
}

impl fmt::Display for FunctionParam {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Group and parameter number bytes of a parameter change message.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ChangeAddress {
    pub group: u8,
    pub param: u8,
}

/// Any addressable parameter of a voice.
///
/// The operator index follows the order of `VoiceDump::operators`:
/// index 0 is operator 6, index 5 is operator 1.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Parameter {
    Op { index: usize, param: OperatorParam },
    Global(GlobalParam),
    NameChar(usize),  // 0...9 for VNAM1...VNAM10
    OperatorEnable,   // OPE
    OperatorSelect,   // OPSEL, only in extended dumps
    Function(FunctionParam),
}

impl Parameter {
    /// Looks up a parameter by its mnemonic key. Operator-scoped keys
    /// require an operator index (0...5), all others forbid one.
    pub fn from_key(key: &str, operator_index: Option<usize>) -> Result<Self, InvalidParameterError> {
        if let Some(param) = OperatorParam::from_key(key) {
            return match operator_index {
                Some(index) if index < OPERATOR_COUNT => Ok(Parameter::Op { index, param }),
                Some(index) => Err(InvalidParameterError::OperatorIndexOutOfRange(index)),
                None => Err(InvalidParameterError::MissingOperatorIndex(key.to_string())),
            };
        }

        let param = if let Some(global) = GlobalParam::from_key(key) {
            Parameter::Global(global)
        }
        else if let Some(n) = Self::name_char_from_key(key) {
            Parameter::NameChar(n)
        }
        else if key == "OPE" {
            Parameter::OperatorEnable
        }
        else if key == "OPSEL" {
            Parameter::OperatorSelect
        }
        else if let Some(function) = FunctionParam::from_key(key) {
            Parameter::Function(function)
        }
        else {
            return Err(InvalidParameterError::UnknownKey(key.to_string()));
        };

        if operator_index.is_some() {
            return Err(InvalidParameterError::UnexpectedOperatorIndex(key.to_string()));
        }

        Ok(param)
    }

    fn name_char_from_key(key: &str) -> Option<usize> {
        let n: usize = key.strip_prefix("VNAM")?.parse().ok()?;
        if (1..=10).contains(&n) {
            Some(n - 1)
        }
        else {
            None
        }
    }

    /// The numeric address (0...155) used in voice-group parameter change
    /// messages. Function parameters and OPSEL have no voice address.
    pub fn voice_address(&self) -> Option<usize> {
        match self {
            Parameter::Op { index, param } =>
                Some((5 - index) * 21 + param.change_offset()),
            Parameter::Global(global) => Some(global.offset()),
            Parameter::NameChar(n) => Some(145 + n),
            Parameter::OperatorEnable => Some(155),
            Parameter::OperatorSelect => None,
            Parameter::Function(_) => None,
        }
    }

    /// The group and parameter number bytes for a parameter change message.
    /// Voice-group addresses above 127 spill into group 01H, since a single
    /// data byte only carries seven bits.
    pub fn change_address(&self) -> Option<ChangeAddress> {
        if let Parameter::Function(function) = self {
            return Some(ChangeAddress { group: 0x20, param: function.address() });
        }

        self.voice_address().map(|address| {
            if address <= 127 {
                ChangeAddress { group: 0x00, param: address as u8 }
            }
            else {
                ChangeAddress { group: 0x01, param: (address - 128) as u8 }
            }
        })
    }

    /// Byte offset in a voice block (155 bytes, or 157 with the trailing
    /// OPE/OPSEL bytes). Function parameters are not part of the block.
    pub fn block_offset(&self) -> Option<usize> {
        match self {
            Parameter::Op { index, param } =>
                Some(index * 21 + param.wire_offset()),
            Parameter::Global(global) => Some(global.offset()),
            Parameter::NameChar(n) => Some(145 + n),
            Parameter::OperatorEnable => Some(155),
            Parameter::OperatorSelect => Some(156),
            Parameter::Function(_) => None,
        }
    }

    /// All 155 parameters of the voice block proper, in block order.
    pub fn voice_block_params() -> Vec<Parameter> {
        let mut result = Vec::with_capacity(155);
        for index in 0..OPERATOR_COUNT {
            for param in OperatorParam::ALL {
                result.push(Parameter::Op { index, param });
            }
        }
        for global in GlobalParam::ALL {
            result.push(Parameter::Global(global));
        }
        for n in 0..10 {
            result.push(Parameter::NameChar(n));
        }
        result
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            // Index 0 is operator 6, so the human-readable number is 6 - index.
            Parameter::Op { index, param } => write!(f, "OP{} {}", 6 - index, param),
            Parameter::Global(global) => write!(f, "{}", global),
            Parameter::NameChar(n) => write!(f, "VNAM{}", n + 1),
            Parameter::OperatorEnable => write!(f, "OPE"),
            Parameter::OperatorSelect => write!(f, "OPSEL"),
            Parameter::Function(function) => write!(f, "{}", function),
        }
    }
}

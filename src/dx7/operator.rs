use std::fmt;
use rand::Rng;

use crate::FormatError;
use crate::dx7::envelope::Envelope;
use crate::dx7::param::OperatorParam;
use crate::dx7::sysex::SystemExclusiveData;

/// Scaling curve style.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CurveStyle {
    Linear,
    Exponential
}

impl fmt::Display for CurveStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CurveStyle::Linear => write!(f, "LIN"),
            CurveStyle::Exponential => write!(f, "EXP"),
        }
    }
}

/// Scaling curve sign.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CurveSign {
    Negative,
    Positive,
}

impl fmt::Display for CurveSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", if *self == CurveSign::Positive { "+" } else { "-" })
    }
}

/// Keyboard scaling curve, an interpretation of the LC/RC bytes 0...3.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ScalingCurve {
    pub style: CurveStyle,
    pub sign: CurveSign,
}

impl ScalingCurve {
    /// Makes a linear positive scaling curve.
    pub fn lin_pos() -> Self {
        ScalingCurve { style: CurveStyle::Linear, sign: CurveSign::Positive }
    }

    /// Makes a linear negative scaling curve.
    pub fn lin_neg() -> Self {
        ScalingCurve { style: CurveStyle::Linear, sign: CurveSign::Negative }
    }

    /// Makes an exponential positive scaling curve.
    pub fn exp_pos() -> Self {
        ScalingCurve { style: CurveStyle::Exponential, sign: CurveSign::Positive }
    }

    /// Makes an exponential negative scaling curve.
    pub fn exp_neg() -> Self {
        ScalingCurve { style: CurveStyle::Exponential, sign: CurveSign::Negative }
    }

    /// Gets the SysEx byte for this scaling curve.
    pub fn as_byte(&self) -> u8 {
        match self {
            ScalingCurve { style: CurveStyle::Linear, sign: CurveSign::Positive } => 0,
            ScalingCurve { style: CurveStyle::Exponential, sign: CurveSign::Negative } => 1,
            ScalingCurve { style: CurveStyle::Exponential, sign: CurveSign::Positive } => 2,
            ScalingCurve { style: CurveStyle::Linear, sign: CurveSign::Negative } => 3,
        }
    }

    /// Interprets a curve byte, if it is in range.
    pub fn from_byte(item: u8) -> Option<Self> {
        match item {
            0 => Some(ScalingCurve::lin_pos()),
            1 => Some(ScalingCurve::exp_neg()),
            2 => Some(ScalingCurve::exp_pos()),
            3 => Some(ScalingCurve::lin_neg()),
            _ => None,
        }
    }
}

impl fmt::Display for ScalingCurve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.sign, self.style)
    }
}

/// One operator of a voice, 21 bytes on the wire.
///
/// All fields hold the raw dump bytes; nothing is clamped or rescaled,
/// so what the device sent is what a round trip gives back.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OperatorParams {
    pub eg: Envelope,
    pub breakpoint: u8,    // BP, 0 ~ 99
    pub left_depth: u8,    // LD, 0 ~ 99
    pub right_depth: u8,   // RD, 0 ~ 99
    pub left_curve: u8,    // LC, 0 ~ 3
    pub right_curve: u8,   // RC, 0 ~ 3
    pub rate_scaling: u8,  // RS, 0 ~ 7
    pub amp_mod_sens: u8,  // AMS, 0 ~ 3
    pub touch_sens: u8,    // TS, 0 ~ 7
    pub output_level: u8,  // TL, 0 ~ 99
    pub mode: u8,          // PM, 0 = ratio, 1 = fixed
    pub coarse: u8,        // PC, 0 ~ 31
    pub fine: u8,          // PF, 0 ~ 99
    pub detune: u8,        // PD, 0 ~ 14, 7 = no detune
}

impl OperatorParams {
    /// Creates a new operator with the voice init defaults.
    pub fn new() -> Self {
        Self {
            eg: Envelope::new(),
            breakpoint: 39,  // Yamaha C3 is 60 - 21 = 39
            left_depth: 0,
            right_depth: 0,
            left_curve: 0,
            right_curve: 0,
            rate_scaling: 0,
            amp_mod_sens: 0,
            touch_sens: 0,
            output_level: 0,
            mode: 0,
            coarse: 1,
            fine: 0,
            detune: 7,  // centered
        }
    }

    /// Makes a new operator with random values in the documented ranges.
    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            eg: Envelope::random(),
            breakpoint: rng.random_range(0..=99),
            left_depth: rng.random_range(0..=99),
            right_depth: rng.random_range(0..=99),
            left_curve: rng.random_range(0..=3),
            right_curve: rng.random_range(0..=3),
            rate_scaling: rng.random_range(0..=7),
            amp_mod_sens: rng.random_range(0..=3),
            touch_sens: rng.random_range(0..=7),
            output_level: rng.random_range(0..=99),
            mode: rng.random_range(0..=1),
            coarse: rng.random_range(0..=31),
            fine: rng.random_range(0..=99),
            detune: rng.random_range(0..=14),
        }
    }

    /// Gets the raw byte of one parameter.
    pub fn get(&self, param: OperatorParam) -> u8 {
        match param {
            OperatorParam::R1 => self.eg.rates[0],
            OperatorParam::R2 => self.eg.rates[1],
            OperatorParam::R3 => self.eg.rates[2],
            OperatorParam::R4 => self.eg.rates[3],
            OperatorParam::L1 => self.eg.levels[0],
            OperatorParam::L2 => self.eg.levels[1],
            OperatorParam::L3 => self.eg.levels[2],
            OperatorParam::L4 => self.eg.levels[3],
            OperatorParam::Bp => self.breakpoint,
            OperatorParam::Ld => self.left_depth,
            OperatorParam::Rd => self.right_depth,
            OperatorParam::Lc => self.left_curve,
            OperatorParam::Rc => self.right_curve,
            OperatorParam::Rs => self.rate_scaling,
            OperatorParam::Ams => self.amp_mod_sens,
            OperatorParam::Ts => self.touch_sens,
            OperatorParam::Tl => self.output_level,
            OperatorParam::Pm => self.mode,
            OperatorParam::Pc => self.coarse,
            OperatorParam::Pf => self.fine,
            OperatorParam::Pd => self.detune,
        }
    }

    /// Sets the raw byte of one parameter.
    pub fn set(&mut self, param: OperatorParam, value: u8) {
        match param {
            OperatorParam::R1 => self.eg.rates[0] = value,
            OperatorParam::R2 => self.eg.rates[1] = value,
            OperatorParam::R3 => self.eg.rates[2] = value,
            OperatorParam::R4 => self.eg.rates[3] = value,
            OperatorParam::L1 => self.eg.levels[0] = value,
            OperatorParam::L2 => self.eg.levels[1] = value,
            OperatorParam::L3 => self.eg.levels[2] = value,
            OperatorParam::L4 => self.eg.levels[3] = value,
            OperatorParam::Bp => self.breakpoint = value,
            OperatorParam::Ld => self.left_depth = value,
            OperatorParam::Rd => self.right_depth = value,
            OperatorParam::Lc => self.left_curve = value,
            OperatorParam::Rc => self.right_curve = value,
            OperatorParam::Rs => self.rate_scaling = value,
            OperatorParam::Ams => self.amp_mod_sens = value,
            OperatorParam::Ts => self.touch_sens = value,
            OperatorParam::Tl => self.output_level = value,
            OperatorParam::Pm => self.mode = value,
            OperatorParam::Pc => self.coarse = value,
            OperatorParam::Pf => self.fine = value,
            OperatorParam::Pd => self.detune = value,
        }
    }
}

impl Default for OperatorParams {
    fn default() -> OperatorParams {
        OperatorParams::new()
    }
}

impl SystemExclusiveData for OperatorParams {
    /// Makes a new operator from the 21 bytes of a voice block chunk.
    fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < Self::DATA_SIZE {
            return Err(FormatError::InvalidLength(data.len()));
        }
        Ok(Self {
            eg: Envelope::from_bytes(&data[0..8])?,
            breakpoint: data[8],
            left_depth: data[9],
            right_depth: data[10],
            left_curve: data[11],
            right_curve: data[12],
            rate_scaling: data[13],
            amp_mod_sens: data[14],
            touch_sens: data[15],
            output_level: data[16],
            mode: data[17],
            coarse: data[18],
            fine: data[19],
            detune: data[20],
        })
    }

    /// Gets the SysEx bytes representing the operator.
    fn to_bytes(&self) -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();
        data.extend(self.eg.to_bytes());
        data.push(self.breakpoint);
        data.push(self.left_depth);
        data.push(self.right_depth);
        data.push(self.left_curve);
        data.push(self.right_curve);
        data.push(self.rate_scaling);
        data.push(self.amp_mod_sens);
        data.push(self.touch_sens);
        data.push(self.output_level);
        data.push(self.mode);
        data.push(self.coarse);
        data.push(self.fine);
        data.push(self.detune);

        assert_eq!(data.len(), Self::DATA_SIZE);

        data
    }

    const DATA_SIZE: usize = 21;
}

impl fmt::Display for OperatorParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EG: {}
Kbd level scaling: breakpoint = {}, left depth = {}, right depth = {}, left curve = {}, right curve = {}
Kbd rate scaling: {}, Amp mod sens = {}, Touch sens = {}
Level = {}, Mode = {}
Coarse = {}, Fine = {}, Detune = {}
",
            self.eg,
            self.breakpoint,
            self.left_depth,
            self.right_depth,
            self.left_curve,
            self.right_curve,
            self.rate_scaling,
            self.amp_mod_sens,
            self.touch_sens,
            self.output_level,
            if self.mode == 1 { "fixed" } else { "ratio" },
            self.coarse,
            self.fine,
            self.detune)
    }
}

#[cfg(test)]
mod tests {
    // Note this useful idiom: importing names from outer (for mod tests) scope.
    use super::*;

    #[test]
    fn test_from_bytes() {
        let data = [
            49, 99, 28, 68,  // EG rates
            98, 98, 91, 0,   // EG levels
            39, 54, 50,      // BP, LD, RD
            1, 1,            // LC, RC
            4, 0, 2,         // RS, AMS, TS
            82,              // TL
            0, 1, 0, 7,      // PM, PC, PF, PD
        ];
        let op = OperatorParams::from_bytes(&data).unwrap();
        assert_eq!(op.eg.rates[0], 49);
        assert_eq!(op.breakpoint, 39);
        assert_eq!(op.rate_scaling, 4);
        assert_eq!(op.output_level, 82);
        assert_eq!(op.detune, 7);
        assert_eq!(op.to_bytes(), data.to_vec());
    }

    #[test]
    fn test_get_matches_wire_order() {
        let data: Vec<u8> = (0u8..21).collect();
        let op = OperatorParams::from_bytes(&data).unwrap();
        for param in OperatorParam::ALL {
            assert_eq!(op.get(param) as usize, param.wire_offset(), "{}", param);
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut op = OperatorParams::new();
        op.set(OperatorParam::Tl, 91);
        assert_eq!(op.get(OperatorParam::Tl), 91);
        assert_eq!(op.output_level, 91);
    }

    #[test]
    fn test_scaling_curve_bytes() {
        // LC/RC bytes: 0 = +LIN, 1 = -EXP, 2 = +EXP, 3 = -LIN.
        assert_eq!(ScalingCurve::lin_pos().as_byte(), 0);
        assert_eq!(ScalingCurve::exp_neg().as_byte(), 1);
        assert_eq!(ScalingCurve::exp_pos().as_byte(), 2);
        assert_eq!(ScalingCurve::lin_neg().as_byte(), 3);
        assert_eq!(ScalingCurve::from_byte(4), None);
    }
}

use bit::BitIndex;

use crate::{
    FormatError,
    InvalidParameterError,
};

use crate::dx7::{
    DeviceNumber,
    MIDIChannel,
    OPERATOR_COUNT,
};

use crate::dx7::param::Parameter;
use crate::dx7::voice::VoiceDump;

/// Parsing and generating MIDI System Exclusive data.
pub trait SystemExclusiveData: Sized {
    fn from_bytes(data: &[u8]) -> Result<Self, FormatError>;
    fn to_bytes(&self) -> Vec<u8>;
    const DATA_SIZE: usize;
}

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;
pub const MANUFACTURER_ID: u8 = 0x43;  // Yamaha

/// Sub-status in the high nibble of the third frame byte:
/// 0 for bulk dumps, 1 for parameter changes.
const SUB_STATUS_DUMP: u8 = 0x00;
const SUB_STATUS_PARAMETER: u8 = 0x10;

/// Format and byte count bytes of a single voice bulk dump header.
const VOICE_DUMP_HEADER_TAIL: [u8; 2] = [0x09, 0x20];

/// Length of the voice dump frame: 5 header bytes, 155 data bytes,
/// and the terminator.
pub const VOICE_FRAME_SIZE: usize = 161;

/// Length of the extended frame carrying the trailing OPE/OPSEL bytes.
pub const EXTENDED_VOICE_FRAME_SIZE: usize = 163;

/// Validates a single voice dump frame and returns its data block
/// (155 bytes, or 157 with the trailing bytes).
pub fn strip_voice_frame(data: &[u8]) -> Result<&[u8], FormatError> {
    if data.len() != VOICE_FRAME_SIZE && data.len() != EXTENDED_VOICE_FRAME_SIZE {
        return Err(FormatError::InvalidLength(data.len()));
    }

    if data[0] != SYSEX_START {
        return Err(FormatError::InvalidData(0));
    }
    if data[1] != MANUFACTURER_ID {
        return Err(FormatError::InvalidData(1));
    }
    if data[2].bit_range(4..8) != SUB_STATUS_DUMP {
        return Err(FormatError::InvalidData(2));
    }
    if data[3] != VOICE_DUMP_HEADER_TAIL[0] {
        return Err(FormatError::InvalidData(3));
    }
    if data[4] != VOICE_DUMP_HEADER_TAIL[1] {
        return Err(FormatError::InvalidData(4));
    }
    if data[data.len() - 1] != SYSEX_END {
        return Err(FormatError::InvalidData(data.len() - 1));
    }

    Ok(&data[5..data.len() - 1])
}

/// The device number carried in the status byte of a dump frame.
/// Call after `strip_voice_frame` has validated the header shape.
pub fn frame_device_number(data: &[u8]) -> DeviceNumber {
    DeviceNumber::from(data[2])
}

/// Builds a complete single voice dump frame for the given device.
pub fn voice_dump_frame(device: DeviceNumber, voice: &VoiceDump) -> Vec<u8> {
    let mut result = vec![
        SYSEX_START,
        MANUFACTURER_ID,
        SUB_STATUS_DUMP | device.as_byte(),
        VOICE_DUMP_HEADER_TAIL[0],
        VOICE_DUMP_HEADER_TAIL[1],
    ];
    result.extend(voice.to_bytes());
    result.push(SYSEX_END);
    result
}

/// Builds a single parameter change message.
///
/// The value byte is sent as given; documented ranges are not enforced
/// here, clamping for display or transmission is the caller's concern.
pub fn parameter_change(
    channel: MIDIChannel,
    parameter: &Parameter,
    value: u8
) -> Result<Vec<u8>, InvalidParameterError> {
    let address = parameter.change_address()
        .ok_or(InvalidParameterError::NotAddressable("OPSEL"))?;

    Ok(vec![
        SYSEX_START,
        MANUFACTURER_ID,
        SUB_STATUS_PARAMETER | channel.as_byte(),
        address.group,
        address.param,
        value,
        SYSEX_END,
    ])
}

/// Builds a parameter change message from a mnemonic key, the entry point
/// for string-keyed callers. Operator-scoped keys need an operator index
/// (0...5, index 0 is operator 6), all other keys forbid one.
pub fn parameter_change_by_key(
    channel: MIDIChannel,
    key: &str,
    value: u8,
    operator_index: Option<usize>
) -> Result<Vec<u8>, InvalidParameterError> {
    let parameter = Parameter::from_key(key, operator_index)?;
    parameter_change(channel, &parameter, value)
}

/// Builds the operator enable/disable message. The flags follow the order
/// of `VoiceDump::operators`: index 0 is operator 6 and goes to bit 0,
/// index 5 is operator 1 and goes to bit 5.
pub fn operator_enable(channel: MIDIChannel, enabled: [bool; OPERATOR_COUNT]) -> Vec<u8> {
    let mut bits = 0u8;
    for (i, on) in enabled.iter().enumerate() {
        bits.set_bit(i, *on);
    }
    parameter_change(channel, &Parameter::OperatorEnable, bits)
        .expect("OPE has a change address")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ranged;
    use crate::dx7::param::{FunctionParam, GlobalParam, OperatorParam};

    fn channel_one() -> MIDIChannel {
        MIDIChannel::new(1)
    }

    #[test]
    fn test_algorithm_parameter_change() {
        // ALS sits at address 134, which spills into group 01H.
        let message = parameter_change_by_key(channel_one(), "ALS", 5, None).unwrap();
        assert_eq!(message, vec![0xF0, 0x43, 0x10, 0x01, 0x06, 0x05, 0xF7]);
    }

    #[test]
    fn test_low_group_parameter_change() {
        // OP1 RD has address 10, still in group 00H.
        let parameter = Parameter::Op { index: 5, param: OperatorParam::Rd };
        let message = parameter_change(channel_one(), &parameter, 33).unwrap();
        assert_eq!(message, vec![0xF0, 0x43, 0x10, 0x00, 0x0A, 0x21, 0xF7]);
    }

    #[test]
    fn test_channel_in_status_byte() {
        let message = parameter_change(
            MIDIChannel::new(3),
            &Parameter::Global(GlobalParam::Lfs),
            50
        ).unwrap();
        assert_eq!(message[2], 0x12);
    }

    #[test]
    fn test_function_parameter_change() {
        let parameter = Parameter::Function(FunctionParam::PitchBendRange);
        let message = parameter_change(channel_one(), &parameter, 2).unwrap();
        assert_eq!(message, vec![0xF0, 0x43, 0x10, 0x20, 0x41, 0x02, 0xF7]);
    }

    #[test]
    fn test_value_not_clamped() {
        let message = parameter_change(
            channel_one(),
            &Parameter::Global(GlobalParam::Als),
            200
        ).unwrap();
        assert_eq!(message[5], 200);
    }

    #[test]
    fn test_operator_select_not_addressable() {
        let result = parameter_change(channel_one(), &Parameter::OperatorSelect, 0);
        assert_eq!(result, Err(InvalidParameterError::NotAddressable("OPSEL")));
    }

    #[test]
    fn test_unknown_key() {
        let result = parameter_change_by_key(channel_one(), "NOT_A_KEY", 5, None);
        assert_eq!(result, Err(InvalidParameterError::UnknownKey("NOT_A_KEY".to_string())));
    }

    #[test]
    fn test_operator_enable_all_on() {
        let message = operator_enable(channel_one(), [true; 6]);
        assert_eq!(message, vec![0xF0, 0x43, 0x10, 0x01, 0x1B, 0x3F, 0xF7]);
    }

    #[test]
    fn test_operator_enable_bit_order() {
        // Only operator 1 on: operators[5], bit 5.
        let mut enabled = [false; 6];
        enabled[5] = true;
        let message = operator_enable(channel_one(), enabled);
        assert_eq!(message[5], 0b00100000);
    }

    #[test]
    fn test_strip_voice_frame() {
        let mut frame = vec![0u8; VOICE_FRAME_SIZE];
        frame[0] = SYSEX_START;
        frame[1] = MANUFACTURER_ID;
        frame[2] = 0x02;  // device 2
        frame[3] = 0x09;
        frame[4] = 0x20;
        frame[160] = SYSEX_END;

        let payload = strip_voice_frame(&frame).unwrap();
        assert_eq!(payload.len(), 155);
        assert_eq!(frame_device_number(&frame).value(), 2);
    }

    #[test]
    fn test_strip_voice_frame_bad_length() {
        assert_eq!(strip_voice_frame(&[0u8; 100]), Err(FormatError::InvalidLength(100)));
    }

    #[test]
    fn test_strip_voice_frame_bad_manufacturer() {
        let mut frame = vec![0u8; VOICE_FRAME_SIZE];
        frame[0] = SYSEX_START;
        frame[1] = 0x42;  // not Yamaha
        frame[3] = 0x09;
        frame[4] = 0x20;
        frame[160] = SYSEX_END;
        assert_eq!(strip_voice_frame(&frame), Err(FormatError::InvalidData(1)));
    }

    #[test]
    fn test_strip_voice_frame_bad_terminator() {
        let mut frame = vec![0u8; VOICE_FRAME_SIZE];
        frame[0] = SYSEX_START;
        frame[1] = MANUFACTURER_ID;
        frame[3] = 0x09;
        frame[4] = 0x20;
        // last byte left as zero
        assert_eq!(strip_voice_frame(&frame), Err(FormatError::InvalidData(160)));
    }
}

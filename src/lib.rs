pub mod dx7;

use std::error;
use std::fmt;

/// Error type for parsing voice data from MIDI System Exclusive bytes.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum FormatError {
    InvalidLength(usize),  // actual length in bytes
    InvalidData(usize),  // offset of the offending byte
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            FormatError::InvalidLength(actual) => format!(
                "Got {} bytes of data, expected a voice dump of 155, 157, 161 or 163 bytes.", actual),
            FormatError::InvalidData(offset) => format!("Invalid data at offset {}.", offset),
        })
    }
}

impl error::Error for FormatError { }

/// Error type for building parameter change messages.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum InvalidParameterError {
    UnknownKey(String),
    MissingOperatorIndex(String),  // operator-scoped key given without an index
    UnexpectedOperatorIndex(String),  // non-operator key given with an index
    OperatorIndexOutOfRange(usize),
    NotAddressable(&'static str),  // parameter has no live change address
    NotVoiceData(&'static str),  // parameter is not part of the voice block
}

impl fmt::Display for InvalidParameterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            InvalidParameterError::UnknownKey(key) =>
                format!("Unknown parameter key '{}'.", key),
            InvalidParameterError::MissingOperatorIndex(key) =>
                format!("Parameter '{}' is operator-scoped but no operator index was given.", key),
            InvalidParameterError::UnexpectedOperatorIndex(key) =>
                format!("Parameter '{}' is not operator-scoped but an operator index was given.", key),
            InvalidParameterError::OperatorIndexOutOfRange(index) =>
                format!("Operator index {} out of range 0...5.", index),
            InvalidParameterError::NotAddressable(key) =>
                format!("Parameter '{}' has no parameter change address.", key),
            InvalidParameterError::NotVoiceData(key) =>
                format!("Parameter '{}' is not part of the voice data block.", key),
        })
    }
}

impl error::Error for InvalidParameterError { }

// Here is a trick learned from "Programming Rust" 2nd Ed., p. 280.
// Define associated consts in a trait, but don't give them a value.
// Let the implementor of the trait do that.
pub trait Ranged {
    const FIRST: i32;
    const LAST: i32;
    const DEFAULT: i32;

    fn new(value: i32) -> Self;
    fn value(&self) -> i32;
    fn contains(value: i32) -> bool;
    fn random() -> Self;
}

// The `ranged_impl` macro generates an implementation of the `Ranged` trait,
// along with implementations of the `Default` and `Display` traits based on
// the values supplied as parameters (type name, first, last, default).
#[macro_export]
macro_rules! ranged_impl {
    ($typ:ty, $first:expr, $last:expr, $default:expr) => {
        impl Ranged for $typ {
            const FIRST: i32 = $first;
            const LAST: i32 = $last;
            const DEFAULT: i32 = $default;

            fn new(value: i32) -> Self {
                if Self::contains(value) {
                    Self(value)
                }
                else {
                    panic!("expected value in range [{}...{}], got {}",
                        Self::FIRST, Self::LAST, value);
                }
            }

            fn value(&self) -> i32 { self.0 }

            fn contains(value: i32) -> bool {
                value >= Self::FIRST && value <= Self::LAST
            }

            fn random() -> Self {
                let mut rng = rand::rng();
                Self::new(rng.random_range(Self::FIRST..=Self::LAST))
            }
        }

        impl Default for $typ {
            fn default() -> Self {
                Self::new(Self::DEFAULT)
            }
        }

        impl fmt::Display for $typ {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    }
}

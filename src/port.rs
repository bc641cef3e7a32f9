//! Interface index extraction from human-readable port labels.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Port label used when the caller does not name one.
pub const DEFAULT_PORT: &str = "1/0/1";

/// Numeric interface index (ifIndex) a switch uses to address a physical port.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterfaceIndex(u32);

/// InputError is returned when a port label carries no usable interface index.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Port '{0}' not recognized")]
    PortNotRecognized(String),
}

impl InterfaceIndex {
    /// Creates an index from a raw value. Zero is not a valid ifIndex.
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(InterfaceIndex(value))
        }
    }

    /// Returns the raw index value.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Parses the digit run that ends the label.
    ///
    /// ```
    /// use cable_diag::port::InterfaceIndex;
    /// assert_eq!(InterfaceIndex::from_port_label("1/0/3").unwrap().get(), 3);
    /// assert!(InterfaceIndex::from_port_label("uplink").is_err());
    /// ```
    pub fn from_port_label(label: &str) -> Result<Self, InputError> {
        let not_recognized = || InputError::PortNotRecognized(label.to_string());

        let digits_start = label
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)
            .ok_or_else(not_recognized)?;

        label[digits_start..]
            .parse::<u32>()
            .ok()
            .and_then(InterfaceIndex::new)
            .ok_or_else(not_recognized)
    }
}

impl FromStr for InterfaceIndex {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InterfaceIndex::from_port_label(s)
    }
}

impl fmt::Display for InterfaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_digit_run() {
        const CASES: &[(&str, u32)] = &[
            ("1/0/3", 3),
            ("ge1/0/12", 12),
            ("Ethernet1/0/24", 24),
            ("7", 7),
            ("eth 15", 15),
            ("1/0/048", 48),
        ];

        for &(label, expected) in CASES {
            let idx = InterfaceIndex::from_port_label(label).unwrap();
            assert_eq!(idx.get(), expected, "label {}", label);
        }
    }

    #[test]
    fn test_no_digits_is_input_error() {
        for label in ["", "uplink", "port/a", "1/0/3a", "1/0/3 "] {
            assert_eq!(
                InterfaceIndex::from_port_label(label),
                Err(InputError::PortNotRecognized(label.to_string()))
            );
        }
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(InterfaceIndex::from_port_label("1/0/0").is_err());
        assert!(InterfaceIndex::new(0).is_none());
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert!(InterfaceIndex::from_port_label("99999999999999999999").is_err());
    }

    #[test]
    fn test_from_str_and_display() {
        let idx: InterfaceIndex = "gi0/5".parse().unwrap();
        assert_eq!(idx.to_string(), "5");
    }

    #[test]
    fn test_error_message() {
        let err = InterfaceIndex::from_port_label("uplink").unwrap_err();
        assert_eq!(err.to_string(), "Port 'uplink' not recognized");
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! KNX group and individual address codec.
//!
//! Group addresses use the three-level `main/middle/sub` notation and pack
//! into 16 bits as `(main << 11) | (middle << 8) | sub`. Individual
//! (physical) addresses use `area.line.device` and pack as
//! `(area << 12) | (line << 8) | device`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty address")]
    Empty,
    #[error("malformed address {input:?}: expected {expected}")]
    Malformed { input: String, expected: &'static str },
    #[error("non-numeric component {component:?} in {input:?}")]
    NotNumeric { input: String, component: String },
    #[error("component {component} out of range in {input:?} (max {max})")]
    OutOfRange {
        input: String,
        component: &'static str,
        max: u16,
    },
}

fn parse_component(
    input: &str,
    raw: &str,
    component: &'static str,
    max: u16,
) -> Result<u16, AddressError> {
    let value: u16 = raw.parse().map_err(|_| AddressError::NotNumeric {
        input: input.to_string(),
        component: raw.to_string(),
    })?;
    if value > max {
        return Err(AddressError::OutOfRange {
            input: input.to_string(),
            component,
            max,
        });
    }
    Ok(value)
}

/// Three-level KNX group address `main/middle/sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupAddress {
    pub main: u8,
    pub middle: u8,
    pub sub: u8,
}

impl GroupAddress {
    pub const MAX_MAIN: u16 = 31;
    pub const MAX_MIDDLE: u16 = 7;
    pub const MAX_SUB: u16 = 255;

    /// 16-bit bus encoding.
    pub fn to_u16(self) -> u16 {
        ((self.main as u16 & 0x1F) << 11) | ((self.middle as u16 & 0x07) << 8) | self.sub as u16
    }

    /// Decode the 16-bit bus form.
    pub fn from_u16(raw: u16) -> Self {
        Self {
            main: ((raw >> 11) & 0x1F) as u8,
            middle: ((raw >> 8) & 0x07) as u8,
            sub: (raw & 0xFF) as u8,
        }
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main, self.middle, self.sub)
    }
}

impl FromStr for GroupAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let parts: Vec<&str> = s.split('/').collect();
        let [main, middle, sub] = parts.as_slice() else {
            return Err(AddressError::Malformed {
                input: s.to_string(),
                expected: "main/middle/sub",
            });
        };
        Ok(Self {
            main: parse_component(s, main, "main", Self::MAX_MAIN)? as u8,
            middle: parse_component(s, middle, "middle", Self::MAX_MIDDLE)? as u8,
            sub: parse_component(s, sub, "sub", Self::MAX_SUB)? as u8,
        })
    }
}

impl TryFrom<String> for GroupAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GroupAddress> for String {
    fn from(a: GroupAddress) -> Self {
        a.to_string()
    }
}

/// KNX individual (physical) address `area.line.device`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndividualAddress {
    pub area: u8,
    pub line: u8,
    pub device: u8,
}

impl IndividualAddress {
    pub const MAX_AREA: u16 = 15;
    pub const MAX_LINE: u16 = 15;
    pub const MAX_DEVICE: u16 = 255;

    /// 16-bit bus encoding.
    pub fn to_u16(self) -> u16 {
        ((self.area as u16 & 0x0F) << 12) | ((self.line as u16 & 0x0F) << 8) | self.device as u16
    }

    /// Decode the 16-bit bus form.
    pub fn from_u16(raw: u16) -> Self {
        Self {
            area: ((raw >> 12) & 0x0F) as u8,
            line: ((raw >> 8) & 0x0F) as u8,
            device: (raw & 0xFF) as u8,
        }
    }
}

impl fmt::Display for IndividualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.area, self.line, self.device)
    }
}

impl FromStr for IndividualAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let parts: Vec<&str> = s.split('.').collect();
        let [area, line, device] = parts.as_slice() else {
            return Err(AddressError::Malformed {
                input: s.to_string(),
                expected: "area.line.device",
            });
        };
        Ok(Self {
            area: parse_component(s, area, "area", Self::MAX_AREA)? as u8,
            line: parse_component(s, line, "line", Self::MAX_LINE)? as u8,
            device: parse_component(s, device, "device", Self::MAX_DEVICE)? as u8,
        })
    }
}

impl TryFrom<String> for IndividualAddress {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IndividualAddress> for String {
    fn from(a: IndividualAddress) -> Self {
        a.to_string()
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;

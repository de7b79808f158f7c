//! PCI address (`DDDD:BB:dd.f`) parsing and the packed "instance" form.
//!
//! The FPGA driver names some of its character devices after the function's
//! instance number, `domain << 16 | bus << 8 | device << 3 | function`, so a
//! node path such as `/dev/xfpga/dma.qdma.u<instance>` can be predicted from the
//! address alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_DEVICE: u8 = 0x1f;
const MAX_FUNCTION: u8 = 0x7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PciField {
    Domain,
    Bus,
    Device,
    Function,
}

impl fmt::Display for PciField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PciField::Domain => "domain",
            PciField::Bus => "bus",
            PciField::Device => "device",
            PciField::Function => "function",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PciAddressError {
    #[error("malformed PCI address {0:?} (expected DDDD:BB:dd.f)")]
    Malformed(String),
    #[error("invalid PCI {field} field {value:?}")]
    Field { field: PciField, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PciAddress {
    pub domain: u16,
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    pub fn instance(&self) -> u32 {
        (self.domain as u32) * 65536
            + (self.bus as u32) * 256
            + (self.device as u32) * 8
            + self.function as u32
    }

    pub fn from_instance(instance: u32) -> Self {
        Self {
            domain: (instance >> 16) as u16,
            bus: ((instance >> 8) & 0xff) as u8,
            device: ((instance >> 3) & 0x1f) as u8,
            function: (instance & 0x7) as u8,
        }
    }
}

impl FromStr for PciAddress {
    type Err = PciAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PciAddressError::Malformed(s.to_string());
        let mut parts = s.split(':');
        let (Some(domain), Some(bus), Some(slot), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let (device, function) = slot.split_once('.').ok_or_else(malformed)?;

        let domain = parse_hex(domain, 4, PciField::Domain)? as u16;
        let bus = parse_hex(bus, 2, PciField::Bus)? as u8;
        let device_num = parse_hex(device, 2, PciField::Device)?;
        if device_num > MAX_DEVICE as u32 {
            return Err(field_error(PciField::Device, device));
        }
        let function_num = parse_hex(function, 1, PciField::Function)?;
        if function_num > MAX_FUNCTION as u32 {
            return Err(field_error(PciField::Function, function));
        }

        Ok(Self {
            domain,
            bus,
            device: device_num as u8,
            function: function_num as u8,
        })
    }
}

impl fmt::Display for PciAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:02x}:{:02x}.{:x}",
            self.domain, self.bus, self.device, self.function
        )
    }
}

/// Instance number for a PCI address string such as `0000:3b:00.1`.
pub fn encode_instance(address: &str) -> Result<u32, PciAddressError> {
    address.parse::<PciAddress>().map(|addr| addr.instance())
}

fn parse_hex(value: &str, max_digits: usize, field: PciField) -> Result<u32, PciAddressError> {
    if value.is_empty()
        || value.len() > max_digits
        || !value.chars().all(|ch| ch.is_ascii_hexdigit())
    {
        return Err(field_error(field, value));
    }
    u32::from_str_radix(value, 16).map_err(|_| field_error(field, value))
}

fn field_error(field: PciField, value: &str) -> PciAddressError {
    PciAddressError::Field {
        field,
        value: value.to_string(),
    }
}

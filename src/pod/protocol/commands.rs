/// Opcode table and constants for the Elektronik-Laden ComPOD12 serial protocol

use core::fmt;

/// Pod opcodes (first byte of every request)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// RESET
    Reset = 0x80,
    /// WRITE_AREA ADDR_HI ADDR_LO CNT DATA...
    WriteArea = 0x82,
    /// READ_AREA ADDR_HI ADDR_LO CNT
    ReadArea = 0x83,
    /// VERSION, answered with two raw bytes (major, minor)
    Version = 0xFF,
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

impl Opcode {
    /// Get the raw opcode byte
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Byte the pod echoes back when it acknowledges this opcode
    pub fn ack(self) -> u8 {
        complement(self.code())
    }

    /// Create from raw opcode value
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x80 => Some(Self::Reset),
            0x82 => Some(Self::WriteArea),
            0x83 => Some(Self::ReadArea),
            0xFF => Some(Self::Version),
            _ => None,
        }
    }
}

/// Acknowledge convention of the pod: the opcode with every bit flipped
pub const fn complement(value: u8) -> u8 {
    0xFF & !value
}

/// Largest payload a single WRITE_AREA may carry
pub const MAX_WRITE_PAYLOAD: usize = 0xFF;

/// Size of the pod's receive buffer; READ_AREA should not ask for more
pub const MAX_READ_PAYLOAD: usize = 16;

pub const DEVICE_NAME: &str = "Elektronik-Laden ComPOD12";

/// The ComPOD12 runs the BDM clock at a fixed rate
pub const VARIABLE_BUS_FREQUENCY: bool = false;

/// Firmware version as reported by VERSION
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PodVersion {
    pub major: u8,
    pub minor: u8,
}

impl PodVersion {
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            major: bytes[0],
            minor: bytes[1],
        }
    }
}

impl fmt::Display for PodVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{:02}.{:02}", self.major, self.minor)
    }
}

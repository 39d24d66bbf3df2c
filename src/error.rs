use thiserror::Error as DeriveError;

/// Ways a pod reply can fail protocol validation
#[derive(DeriveError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidResponse {
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("expected ack {expected:#04X}, got {actual:#04X}")]
    Ack { expected: u8, actual: u8 },
}

#[derive(DeriveError, Debug)]
pub enum Error {
    #[error("No response from pod")]
    NoResponse,

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] InvalidResponse),

    #[error("Payload length mismatch: count byte says {expected}, got {actual} bytes")]
    PayloadLength { expected: usize, actual: usize },

    #[error("Zero-length area read")]
    EmptyRead,

    #[error("Area {address:#06X}+{length:#X} runs past the 16-bit address space")]
    AddressOverflow { address: u16, length: usize },

    #[error("Transport I/O: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serial")]
    #[error("Serial port: {0}")]
    Serial(#[from] serialport::Error),
}

impl Error {
    /// Shorthand for a wrong byte count in a reply
    pub(crate) fn length(expected: usize, actual: usize) -> Self {
        Self::InvalidResponse(InvalidResponse::Length { expected, actual })
    }

    /// Shorthand for a wrong echoed ack byte
    pub(crate) fn ack(expected: u8, actual: u8) -> Self {
        Self::InvalidResponse(InvalidResponse::Ack { expected, actual })
    }

    /// True for both flavours of [`Error::InvalidResponse`]
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}

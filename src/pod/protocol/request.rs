/// Request frames and expected reply shapes for the pod protocol
///
/// All multi-byte fields on the wire are big-endian.

/// What the pod sends back for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// A single byte echoing the complemented opcode
    Ack,
    /// Exactly `n` raw data bytes, no echo
    Data(usize),
}

impl Response {
    /// Number of bytes to read back from the transport
    pub fn len(self) -> usize {
        match self {
            Self::Ack => 1,
            Self::Data(n) => n,
        }
    }

    pub fn is_ack(self) -> bool {
        matches!(self, Self::Ack)
    }
}

/// Outgoing request frame, built field by field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    bytes: Vec<u8>,
}

impl Request {
    /// Start a frame with the given opcode
    pub fn new(opcode: impl Into<u8>) -> Self {
        Self {
            bytes: vec![opcode.into()],
        }
    }

    /// Append a 16-bit target address (hi, lo)
    pub fn address(self, addr: u16) -> Self {
        self.word(addr)
    }

    /// Append a 16-bit data word (hi, lo)
    pub fn word(mut self, value: u16) -> Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append a single byte, e.g. a count or a data byte
    pub fn byte(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    /// Append raw payload bytes
    pub fn payload(mut self, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(data);
        self
    }

    /// Opcode this frame starts with
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::protocol::commands::Opcode;
    use hex_literal::hex;

    #[test]
    fn test_read_area_frame() {
        let req = Request::new(Opcode::ReadArea).address(0x1000).byte(4);
        assert_eq!(req.as_bytes(), &hex!("83 10 00 04"));
        assert_eq!(req.opcode(), 0x83);
    }

    #[test]
    fn test_write_area_frame() {
        let req = Request::new(Opcode::WriteArea)
            .address(0x2000)
            .byte(2)
            .payload(&[0xAA, 0xBB]);
        assert_eq!(req.as_bytes(), &hex!("82 20 00 02 AA BB"));
        assert_eq!(req.len(), 6);
    }

    #[test]
    fn test_words_are_big_endian() {
        let req = Request::new(0x10u8).word(0x1234).word(0xABCD);
        assert_eq!(req.as_bytes(), &hex!("10 12 34 AB CD"));
    }

    #[test]
    fn test_response_lengths() {
        assert_eq!(Response::Ack.len(), 1);
        assert!(Response::Ack.is_ack());
        assert_eq!(Response::Data(16).len(), 16);
        assert!(!Response::Data(2).is_ack());
    }
}

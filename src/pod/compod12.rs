/// Elektronik-Laden ComPOD12 driver
///
/// Every operation is one synchronous request/response exchange: the request
/// frame is written, the reply is read back, the receive buffer is flushed and
/// only then is the reply validated. Nothing is retried; the first failure is
/// returned to the caller.

use log::{debug, trace, warn};

use crate::error::Error;
use super::BdmPod;
use super::protocol::commands::{
    complement, Opcode, PodVersion, DEVICE_NAME, MAX_READ_PAYLOAD, MAX_WRITE_PAYLOAD,
};
use super::protocol::request::{Request, Response};
use super::transport::Transport;

/// ComPOD12 protocol driver - works with any transport
pub struct ComPod12<T: Transport> {
    transport: T,
}

impl<T: Transport> ComPod12<T> {
    pub const DEVICE_NAME: &'static str = DEVICE_NAME;

    /// Create a new driver on top of an open transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Write a request, read the reply and drain the link
    ///
    /// An empty reply is reported as [`Error::NoResponse`]; anything else is
    /// handed back for the caller to validate.
    fn exchange(&mut self, request: &Request, response: Response) -> Result<Vec<u8>, Error> {
        trace!("-> {}", hex::encode(request.as_bytes()));
        self.transport.write(request.as_bytes())?;

        let data = self.transport.read(response.len())?;
        self.transport.flush()?;
        trace!("<- {}", hex::encode(&data));

        if data.is_empty() {
            return Err(Error::NoResponse);
        }
        Ok(data)
    }

    /// First reply byte must be the complemented opcode
    fn check_ack(request: &Request, data: &[u8]) -> Result<(), Error> {
        let expected = complement(request.opcode());
        if data[0] != expected {
            return Err(Error::ack(expected, data[0]));
        }
        Ok(())
    }

    fn check_len(expected: usize, data: &[u8]) -> Result<(), Error> {
        if data.len() != expected {
            return Err(Error::length(expected, data.len()));
        }
        Ok(())
    }

    /// Send a bare opcode and wait for its ack
    ///
    /// Only the ack byte is ever read, so in practice this yields `None`;
    /// commands that return data go through [`Self::read_command`].
    pub fn write_command(&mut self, cmd: impl Into<u8>) -> Result<Option<Vec<u8>>, Error> {
        let request = Request::new(cmd);
        let data = self.exchange(&request, Response::Ack)?;
        Self::check_ack(&request, &data)?;

        if data.len() > 1 {
            Ok(Some(data[1..].to_vec()))
        } else {
            Ok(None)
        }
    }

    /// Send an opcode (and optional address) and read `response_len` raw bytes
    pub fn read_command(
        &mut self,
        cmd: impl Into<u8>,
        response_len: usize,
        addr: Option<u16>,
    ) -> Result<Vec<u8>, Error> {
        let mut request = Request::new(cmd);
        if let Some(addr) = addr {
            request = request.address(addr);
        }

        let data = self.exchange(&request, Response::Data(response_len))?;
        Self::check_len(response_len, &data)?;
        Ok(data)
    }

    /// Read a big-endian 16-bit word
    pub fn read_word(&mut self, cmd: impl Into<u8>, addr: Option<u16>) -> Result<u16, Error> {
        let data = self.read_command(cmd, 2, addr)?;

        // read_command already checked these; a misbehaving transport may not
        if data.is_empty() {
            return Err(Error::NoResponse);
        }
        Self::check_len(2, &data)?;

        Ok(u16::from_be_bytes([data[0], data[1]]))
    }

    /// Send an opcode followed by one or two big-endian words
    ///
    /// A second word equal to 0 is treated as absent and not sent. Callers
    /// that need to transmit a literal zero second word cannot use this.
    pub fn write_word(
        &mut self,
        cmd: impl Into<u8>,
        data0: u16,
        data1: Option<u16>,
    ) -> Result<(), Error> {
        let mut request = Request::new(cmd).word(data0);
        if let Some(word) = data1.filter(|&w| w != 0) {
            request = request.word(word);
        }

        let data = self.exchange(&request, Response::Ack)?;
        Self::check_ack(&request, &data)
    }

    /// Send an opcode, a 16-bit address and one data byte
    pub fn write_byte(&mut self, cmd: impl Into<u8>, addr: u16, data: u8) -> Result<(), Error> {
        let request = Request::new(cmd).address(addr).byte(data);
        let reply = self.exchange(&request, Response::Ack)?;
        Self::check_ack(&request, &reply)
    }

    pub fn reset(&mut self) -> Result<(), Error> {
        debug!("RESET");
        self.write_command(Opcode::Reset)?;
        Ok(())
    }

    /// Query the firmware version
    pub fn version(&mut self) -> Result<PodVersion, Error> {
        let data = self.read_command(Opcode::Version, 2, None)?;
        Ok(PodVersion::from_bytes([data[0], data[1]]))
    }

    /// Device name and firmware version, e.g. `Elektronik-Laden ComPOD12 v01.05`
    pub fn pod_version(&mut self) -> Result<String, Error> {
        let version = self.version()?;
        Ok(format!("{} {}", Self::DEVICE_NAME, version))
    }

    /// Read `length` bytes of target memory at `addr`
    ///
    /// The pod buffers at most [`MAX_READ_PAYLOAD`] bytes; larger requests are
    /// sent as-is. Use [`BdmPod::read_memory`] for arbitrary ranges.
    pub fn read_area(&mut self, addr: u16, length: u8) -> Result<Vec<u8>, Error> {
        if length == 0 {
            return Err(Error::EmptyRead);
        }
        if length as usize > MAX_READ_PAYLOAD {
            warn!("READ_AREA of {length} bytes exceeds pod buffer ({MAX_READ_PAYLOAD})");
        }
        debug!("READ_AREA {addr:#06X} {length}");

        let request = Request::new(Opcode::ReadArea).address(addr).byte(length);
        let data = self.exchange(&request, Response::Data(length as usize))?;
        Self::check_len(length as usize, &data)?;
        Ok(data)
    }

    /// Write `length` bytes of `data` to target memory at `addr`
    pub fn write_area(&mut self, addr: u16, length: u8, data: &[u8]) -> Result<(), Error> {
        if data.len() != length as usize {
            return Err(Error::PayloadLength {
                expected: length as usize,
                actual: data.len(),
            });
        }
        debug!("WRITE_AREA {addr:#06X} {length}");

        let request = Request::new(Opcode::WriteArea)
            .address(addr)
            .byte(length)
            .payload(data);
        let reply = self.exchange(&request, Response::Ack)?;
        Self::check_ack(&request, &reply)
    }
}

impl<T: Transport> BdmPod for ComPod12<T> {
    fn reset(&mut self) -> Result<(), Error> {
        ComPod12::reset(self)
    }

    fn pod_version(&mut self) -> Result<String, Error> {
        ComPod12::pod_version(self)
    }

    fn read_area(&mut self, addr: u16, length: u8) -> Result<Vec<u8>, Error> {
        ComPod12::read_area(self, addr, length)
    }

    fn write_area(&mut self, addr: u16, length: u8, data: &[u8]) -> Result<(), Error> {
        ComPod12::write_area(self, addr, length, data)
    }

    fn max_read_payload(&self) -> usize {
        MAX_READ_PAYLOAD
    }

    fn max_write_payload(&self) -> usize {
        MAX_WRITE_PAYLOAD
    }
}

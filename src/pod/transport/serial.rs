//! Serial port transport using the `serialport` crate
//!
//! The ComPOD12 enumerates as a plain COM port / tty, 8N1, no flow control.

use std::io::{self, Read, Write};
use std::time::Duration;

use log::trace;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::Error;
use super::Transport;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Port settings for [`SerialTransport::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
    /// Per-read timeout; a read that sees no data for this long returns short
    pub timeout: Duration,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Serial link to a pod
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Wrap an already opened port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Open the port described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self, Error> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open()?;

        // Stale bytes from a previous session would desync the first reply
        port.clear(ClearBuffer::All)?;

        Ok(Self::new(port))
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        Ok(read_up_to(&mut self.port, len)?)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

/// Read until `len` bytes arrived, the reader timed out, or it hit EOF
fn read_up_to<R: Read + ?Sized>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;

    while filled < len {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                trace!("Read timed out after {filled}/{len} bytes");
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out pre-recorded chunks, then times out
    struct ChunkedReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                None => Err(io::ErrorKind::TimedOut.into()),
            }
        }
    }

    fn reader(chunks: &[&[u8]]) -> ChunkedReader {
        ChunkedReader {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        }
    }

    #[test]
    fn test_read_collects_chunks() {
        let mut r = reader(&[&[1, 2], &[3], &[4]]);
        assert_eq!(read_up_to(&mut r, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_read_short_on_timeout() {
        let mut r = reader(&[&[1, 2, 3]]);
        assert_eq!(read_up_to(&mut r, 4).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_read_nothing() {
        let mut r = reader(&[]);
        assert!(read_up_to(&mut r, 2).unwrap().is_empty());
    }

    #[test]
    fn test_read_stops_at_requested_len() {
        let mut r = reader(&[&[1], &[2], &[3]]);
        assert_eq!(read_up_to(&mut r, 2).unwrap(), vec![1, 2]);
        assert_eq!(r.chunks.len(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let cfg = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(cfg.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);

        let cfg = cfg.baud_rate(38_400).timeout(Duration::from_millis(50));
        assert_eq!(cfg.baud_rate, 38_400);
        assert_eq!(cfg.timeout, Duration::from_millis(50));
    }
}

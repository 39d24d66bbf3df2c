/// BDM pod drivers
///
/// `BdmPod` is the capability set every pod offers to a debugger front end;
/// `ComPod12` implements it for the Elektronik-Laden serial pod.

use log::debug;

use crate::error::Error;

pub mod compod12;
pub mod protocol;
pub mod transport;

pub use compod12::ComPod12;

/// Common BDM pod trait
///
/// Memory access above the area primitives is provided here, so a pod
/// only has to know how to move one bounded area per request.
pub trait BdmPod {
    /// Reset the pod and the attached target
    fn reset(&mut self) -> Result<(), Error>;

    /// Human readable name and firmware version of the pod
    fn pod_version(&mut self) -> Result<String, Error>;

    /// Read `length` bytes of target memory starting at `addr`
    fn read_area(&mut self, addr: u16, length: u8) -> Result<Vec<u8>, Error>;

    /// Write `length` bytes of `data` to target memory at `addr`
    fn write_area(&mut self, addr: u16, length: u8, data: &[u8]) -> Result<(), Error>;

    /// Largest area a single read request may cover
    fn max_read_payload(&self) -> usize;

    /// Largest area a single write request may cover
    fn max_write_payload(&self) -> usize;

    /// Read an arbitrary range, split into pod-sized areas
    fn read_memory(&mut self, addr: u16, len: usize) -> Result<Vec<u8>, Error> {
        let chunk = self.max_read_payload().clamp(1, u8::MAX as usize);
        let spans = spans(addr, len, chunk)?;
        debug!("Reading {len} bytes at {addr:#06X} in {} areas", spans.len());

        let mut out = Vec::with_capacity(len);
        for (area, n) in spans {
            out.extend(self.read_area(area, n)?);
        }
        Ok(out)
    }

    /// Write an arbitrary range, split into pod-sized areas
    fn write_memory(&mut self, addr: u16, data: &[u8]) -> Result<(), Error> {
        let chunk = self.max_write_payload().clamp(1, u8::MAX as usize);
        let spans = spans(addr, data.len(), chunk)?;
        debug!("Writing {} bytes at {addr:#06X} in {} areas", data.len(), spans.len());

        let mut offset = 0;
        for (area, n) in spans {
            let end = offset + n as usize;
            self.write_area(area, n, &data[offset..end])?;
            offset = end;
        }
        Ok(())
    }
}

/// Split `addr..addr+len` into (address, count) pieces of at most `chunk` bytes
fn spans(addr: u16, len: usize, chunk: usize) -> Result<Vec<(u16, u8)>, Error> {
    if addr as usize + len > 0x1_0000 {
        return Err(Error::AddressOverflow { address: addr, length: len });
    }

    Ok((0..len)
        .step_by(chunk)
        .map(|offset| {
            let n = chunk.min(len - offset);
            (addr + offset as u16, n as u8)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake pod backed by a 64K memory image
    struct MemoryPod {
        mem: Vec<u8>,
        reads: Vec<(u16, u8)>,
        writes: Vec<(u16, u8)>,
    }

    impl MemoryPod {
        fn new() -> Self {
            Self {
                mem: (0..0x1_0000).map(|i| i as u8).collect(),
                reads: Vec::new(),
                writes: Vec::new(),
            }
        }
    }

    impl BdmPod for MemoryPod {
        fn reset(&mut self) -> Result<(), Error> {
            Ok(())
        }

        fn pod_version(&mut self) -> Result<String, Error> {
            Ok("memory v00.00".into())
        }

        fn read_area(&mut self, addr: u16, length: u8) -> Result<Vec<u8>, Error> {
            self.reads.push((addr, length));
            let start = addr as usize;
            Ok(self.mem[start..start + length as usize].to_vec())
        }

        fn write_area(&mut self, addr: u16, length: u8, data: &[u8]) -> Result<(), Error> {
            self.writes.push((addr, length));
            let start = addr as usize;
            self.mem[start..start + length as usize].copy_from_slice(data);
            Ok(())
        }

        fn max_read_payload(&self) -> usize {
            16
        }

        fn max_write_payload(&self) -> usize {
            0xFF
        }
    }

    #[test]
    fn test_spans() {
        assert_eq!(spans(0x1000, 40, 16).unwrap(), vec![(0x1000, 16), (0x1010, 16), (0x1020, 8)]);
        assert!(spans(0x1000, 0, 16).unwrap().is_empty());
        assert_eq!(spans(0xFFF0, 16, 16).unwrap(), vec![(0xFFF0, 16)]);
    }

    #[test]
    fn test_spans_overflow() {
        let err = spans(0xFFF0, 17, 16).unwrap_err();
        assert!(matches!(err, Error::AddressOverflow { address: 0xFFF0, length: 17 }));
    }

    #[test]
    fn test_read_memory_chunks() {
        let mut pod = MemoryPod::new();
        let data = pod.read_memory(0x0100, 40).unwrap();
        assert_eq!(data, (0..40).map(|i| i as u8).collect::<Vec<_>>());
        assert_eq!(pod.reads, vec![(0x0100, 16), (0x0110, 16), (0x0120, 8)]);
    }

    #[test]
    fn test_write_memory_chunks() {
        let mut pod = MemoryPod::new();
        let data = vec![0xA5u8; 300];
        pod.write_memory(0x2000, &data).unwrap();
        assert_eq!(pod.writes, vec![(0x2000, 0xFF), (0x20FF, 45)]);
        assert!(pod.mem[0x2000..0x2000 + 300].iter().all(|&b| b == 0xA5));
        assert_eq!(pod.mem[0x2000 + 300], (0x2000u32 + 300) as u8);
    }

    #[test]
    fn test_empty_memory_access_is_noop() {
        let mut pod = MemoryPod::new();
        assert!(pod.read_memory(0x0000, 0).unwrap().is_empty());
        pod.write_memory(0x0000, &[]).unwrap();
        assert!(pod.reads.is_empty());
        assert!(pod.writes.is_empty());
    }
}

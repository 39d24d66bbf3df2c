/// Transport abstraction - how request bytes reach the pod
///
/// The driver only needs three byte-level capabilities. A serial port
/// implementation lives behind the `serial` feature; tests use scripted
/// in-memory transports.

use crate::error::Error;

#[cfg(feature = "serial")]
pub mod serial;

/// Byte-oriented link to a pod
pub trait Transport {
    /// Send all of `data`
    fn write(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Read up to `len` bytes
    ///
    /// Returns fewer bytes on a short read and an empty vector when nothing
    /// arrived before the link's timeout. Must not block indefinitely.
    fn read(&mut self, len: usize) -> Result<Vec<u8>, Error>;

    /// Drop whatever is left in the receive buffer after an exchange
    fn flush(&mut self) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        (**self).write(data)
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        (**self).read(len)
    }

    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        (**self).write(data)
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        (**self).read(len)
    }

    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}

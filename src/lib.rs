pub mod pod;
pub mod error;

pub use error::{Error, InvalidResponse};
pub use pod::{BdmPod, ComPod12};
pub use pod::protocol::{complement, Opcode, PodVersion};
pub use pod::protocol::commands::{DEVICE_NAME, MAX_READ_PAYLOAD, MAX_WRITE_PAYLOAD};
pub use pod::transport::Transport;
#[cfg(feature = "serial")]
pub use pod::transport::serial::{SerialConfig, SerialTransport};

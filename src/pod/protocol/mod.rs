/// Protocol module - transport-independent ComPOD12 framing
///
/// Defines opcodes, constants and request frames without depending on
/// how the bytes reach the pod.

pub mod commands;
pub mod request;

pub use commands::{complement, Opcode, PodVersion};
pub use request::{Request, Response};

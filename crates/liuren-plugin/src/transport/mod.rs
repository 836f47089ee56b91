//! Transport layer for plugin invocations.

pub mod framing;
pub mod stdio;

pub use stdio::StdioTransport;

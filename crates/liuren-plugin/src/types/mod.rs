//! Data types exchanged with the plugin host.

pub mod envelope;
pub mod error;

pub use envelope::*;
pub use error::*;

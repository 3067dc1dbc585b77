//! A compact binary encoding of the JSON data model, with a streaming
//! push-style decoder and a compacting encoder.

pub mod format;
pub mod types;
pub mod traits;
pub mod encoder;
pub mod decoder;

pub use types::Control;
pub use types::Result;
pub use types::Status;

pub use traits::TokenSink;

pub use encoder::Encoder;
pub use decoder::Decoder;

//! Error types for the Augmenter protocol layer.

mod protocol;
mod refresh;
mod service;
mod store;

pub use protocol::*;
pub use refresh::*;
pub use service::*;
pub use store::*;

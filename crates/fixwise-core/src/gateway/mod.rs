//! Gateway abstraction over the remote text-generation capability.

pub mod backend;
pub mod box_backend;
pub mod conversation;

pub use backend::{GeneratedReply, GenerationBackend};
pub use box_backend::BoxBackend;
pub use conversation::{ConversationHandle, ModelGateway};

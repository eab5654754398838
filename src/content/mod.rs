//! Content type compilation and instances.
//!
//! A schema tree goes in once; a compiled type comes out and is used
//! repeatedly to construct, mutate, serialize, and deserialize instances.
//! Every mutation funnels back through the same node-specific validation
//! used at construction time.

mod compiler;
mod instance;

pub use compiler::ContentType;
pub use instance::Instance;

//! Resource operations for the Bazaar marketplace client.
//!
//! Builds on `bazaar-api`'s remote-call machinery: typed entities with
//! per-entity validators, the per-resource operation family (favorites,
//! listings, sellers, messages, conversations), and the conversation
//! resolver.

pub mod conversations;
pub mod resources;
pub mod schema;
pub mod types;

pub use conversations::ConversationResolver;
pub use resources::ResourceClient;
pub use schema::*;
pub use types::*;

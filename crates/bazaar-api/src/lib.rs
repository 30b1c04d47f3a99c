//! Remote-call machinery for the Bazaar marketplace client.
//!
//! This crate owns everything a resource operation composes: the
//! normalized error value ([`AppError`]), the bounded-retry executor
//! ([`retry_operation`]), key-convention normalization at the wire
//! boundary, the response envelope contract, the abstract [`Transport`]
//! seam with its reqwest implementation, and the [`Notifier`] seam for
//! user-facing notices.

pub mod casing;
pub mod envelope;
pub mod errors;
pub mod notify;
pub mod retry;
pub mod transport;

pub use casing::*;
pub use envelope::*;
pub use errors::*;
pub use notify::*;
pub use retry::*;
pub use transport::*;

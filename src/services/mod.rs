//! Lead workflows shared by every transport. Each operation takes the caller
//! explicitly and talks to storage only through the repository traits.

pub mod access;
pub mod errors;
pub mod leads;

pub use errors::{ServiceError, ServiceResult};

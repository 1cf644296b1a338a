//! Session token lifecycle

pub mod ports;
pub mod session;

pub use ports::{CredentialExchange, IssuedToken};
pub use session::{SessionPolicy, TokenSession};

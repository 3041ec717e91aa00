//! Stand-in provider for consumer tests.
//!
//! A [`MockServer`] answers requests from registered interactions; a
//! [`PactBuilder`] drives one through a consumer test and writes the
//! resulting contract file.

mod handler;
pub mod pact;
pub mod server;

pub use pact::{PactBuilder, PactError};
pub use server::{MockServer, MockServerError};

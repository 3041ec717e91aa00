pub mod domain;
pub mod infra;
pub mod mock;
pub mod storage;
pub mod transport;
pub mod verifier;

// Convenience re-exports (keeps call-sites clean)
pub use domain::compare::{compare, ComparisonResult};
pub use domain::contract::{Contract, ContractError, Interaction, InteractionBuilder, Request, Response};
pub use domain::matching::{find_match, IncomingRequest};
pub use domain::matrix::Deployability;
pub use mock::{MockServer, PactBuilder};
pub use storage::{ContractStore, MemoryContractStore, ObjectContractStore, StoreError};
pub use verifier::{Reporter, VerificationResult, Verifier, VerifierConfig};

//! Replaying a contract against a running provider.

pub mod provider_states;
pub mod report;
pub mod result;
pub mod runner;

pub use provider_states::{ProviderStateCoordinator, ProviderStateError};
pub use report::Reporter;
pub use result::{ActualResponse, InteractionResult, Phase, VerificationResult};
pub use runner::{Verifier, VerifierConfig, VerifierError, DEFAULT_TIMEOUT};

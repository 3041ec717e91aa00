pub mod middleware;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod contracts;
    pub mod health;
    pub mod matrix;
    pub mod verification;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;

pub mod router;
pub mod types;
pub mod handlers {
    pub mod files;
    pub mod health;
    pub mod resources;
    pub mod tools;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;

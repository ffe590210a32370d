pub mod errors;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod startup;
pub mod state;

pub use lifecycle::{Lifecycle, LifecycleError, LifecyclePhase};
pub use startup::run;
pub use state::AppState;

pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod session;
pub mod state;
pub mod turn;

pub use server::{configure, run_server};
pub use state::AppState;

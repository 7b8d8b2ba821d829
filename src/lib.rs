pub mod blueprint;
pub mod constants;
pub mod error;
pub mod github;
pub mod llm;
pub mod session;
pub mod web_server;

pub use error::ArchitectError;

pub mod case;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;

pub use case::*;
pub use config::*;
pub use error::*;
pub use identity::*;
pub use models::*;

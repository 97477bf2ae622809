pub mod signature;
pub mod user_store;
pub mod webhook_service;

pub use signature::*;
pub use user_store::*;
pub use webhook_service::*;

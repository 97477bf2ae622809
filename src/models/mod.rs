pub mod user;
pub mod webhook;

pub use user::*;
pub use webhook::*;

pub mod auth;
pub use auth as Auth;

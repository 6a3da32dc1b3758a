pub mod config;
pub mod error;

pub mod builtins;
pub use builtins as BuiltIns;

pub mod middleware;
pub use middleware as Middleware;

pub mod model;
pub use model as Model;

pub mod service;
pub use service as Service;

pub mod utils;

pub mod handler;
pub use handler as Handler;

pub mod routes;
pub use routes as Routes;

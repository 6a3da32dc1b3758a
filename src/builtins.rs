pub mod sqlite;
pub use sqlite as Sqlite;

pub mod jwt;
pub use jwt as Jwt;

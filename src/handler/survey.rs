pub mod list;
pub use list as List;

pub mod create;
pub use create as Create;

pub mod get;
pub use get as Get;

pub mod update;
pub use update as Update;

pub mod delete;
pub use delete as Delete;

pub mod guest;
pub use guest as Guest;

pub mod answer;
pub use answer as Answer;

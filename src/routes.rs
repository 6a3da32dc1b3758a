pub mod survey;
pub use survey as Survey;

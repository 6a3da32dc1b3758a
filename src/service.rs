pub mod survey;
pub use survey as Survey;

pub mod answer;
pub use answer as Answer;

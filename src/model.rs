pub mod survey;
pub use survey as Survey;

pub mod question;
pub use question as Question;

pub mod answer;
pub use answer as Answer;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i64,
    pub survey_id: i64,
    pub start_date: i64,
    pub end_date: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuestionAnswer {
    pub id: i64,
    pub answer_id: i64,
    pub question_id: i64,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerDetail {
    #[serde(flatten)]
    pub answer: Answer,
    pub question_answers: Vec<QuestionAnswer>,
}

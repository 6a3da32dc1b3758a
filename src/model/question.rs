use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.to_str())
    }
}

impl QuestionType {
    pub const ALL: [&'static str; 5] = ["text", "textarea", "select", "radio", "checkbox"];

    pub fn to_str(&self) -> &str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Select => "select",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
        }
    }

    pub fn from_str(s: &str) -> Option<QuestionType> {
        match s {
            "text" => Some(QuestionType::Text),
            "textarea" => Some(QuestionType::Textarea),
            "select" => Some(QuestionType::Select),
            "radio" => Some(QuestionType::Radio),
            "checkbox" => Some(QuestionType::Checkbox),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub survey_id: i64,
    pub question: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: String,
    pub description: Option<String>,
    pub data: String,
    pub position: i64,
}

/// API view of a question, with the options payload parsed back to JSON.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    pub id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub description: Option<String>,
    pub data: Value,
}

impl From<Question> for QuestionDetail {
    fn from(row: Question) -> Self {
        let data = serde_json::from_str(&row.data)
            .unwrap_or_else(|_| Value::String(row.data.clone()));

        Self {
            id: row.id,
            question: row.question,
            question_type: row.question_type,
            description: row.description,
            data,
        }
    }
}

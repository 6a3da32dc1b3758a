use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::model::Question::QuestionDetail;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Survey {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: bool,
    pub expire_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A survey row together with its question set, as returned by the API.
#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: Survey,
    pub questions: Vec<QuestionDetail>,
}

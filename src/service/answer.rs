use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::Answer::{Answer, AnswerDetail, QuestionAnswer};
use crate::service::survey;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnswerPayload {
    /// Answer values keyed by question id.
    pub answers: Option<BTreeMap<String, Value>>,
}

/// Records one anonymous submission. Every question id is checked against
/// the survey's live question set before anything is written, and the
/// answer row plus all per-question rows go in as one transaction, so a
/// bad id never leaves partial rows behind.
pub async fn submit(
    pool: &SqlitePool,
    survey_id: i64,
    payload: AnswerPayload,
) -> Result<AnswerDetail, ApiError> {
    let survey = survey::find(pool, survey_id).await?;

    let Some(answers) = payload.answers else {
        return Err(ApiError::violation("answers", "answers is required"));
    };

    let question_ids: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE survey_id = ?")
            .bind(survey.id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    let mut rows = Vec::with_capacity(answers.len());
    for (key, value) in &answers {
        let question_id = key
            .parse::<i64>()
            .ok()
            .filter(|id| question_ids.contains(id))
            .ok_or_else(|| ApiError::InvalidQuestion(key.clone()))?;

        // Multi-select values are serialized, bare strings stored as-is.
        let answer = match value {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };

        rows.push((question_id, answer));
    }

    // Elapsed time is not measured; both stamps collapse to submission time.
    let now = Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;

    let result = sqlx::query("INSERT INTO answers (survey_id, start_date, end_date) VALUES (?, ?, ?)")
        .bind(survey.id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    let answer_id = result.last_insert_rowid();

    let mut question_answers = Vec::with_capacity(rows.len());
    for (question_id, answer) in rows {
        let result = sqlx::query(
            "INSERT INTO question_answers (answer_id, question_id, answer) VALUES (?, ?, ?)",
        )
        .bind(answer_id)
        .bind(question_id)
        .bind(&answer)
        .execute(&mut *tx)
        .await?;

        question_answers.push(QuestionAnswer {
            id: result.last_insert_rowid(),
            answer_id,
            question_id,
            answer,
        });
    }

    tx.commit().await?;

    Ok(AnswerDetail {
        answer: Answer {
            id: answer_id,
            survey_id: survey.id,
            start_date: now,
            end_date: now,
        },
        question_answers,
    })
}

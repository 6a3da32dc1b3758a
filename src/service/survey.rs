use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{ApiError, FieldViolation};
use crate::model::Question::{Question, QuestionDetail, QuestionType};
use crate::model::Survey::{Survey, SurveyDetail};
use crate::utils::image;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SurveyPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Cover image as a base64 data URI; stored on disk, the survey row
    /// only keeps the relative path.
    pub image: Option<String>,
    pub status: Option<bool>,
    pub expire_date: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuestionInput {
    pub id: Option<i64>,
    pub question: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub description: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct QuestionFields {
    pub question: String,
    pub question_type: QuestionType,
    pub description: Option<String>,
    pub data: String,
    pub position: i64,
}

/// An incoming question is either brand new or claims to be one of the
/// survey's persisted questions. Modeled as a variant so the reconciler
/// branches are exhaustive instead of hanging off a nullable id.
#[derive(Debug, Clone)]
pub enum QuestionPatch {
    New(QuestionFields),
    Existing(i64, QuestionFields),
}

impl QuestionPatch {
    fn fields(&self) -> &QuestionFields {
        match self {
            QuestionPatch::New(fields) | QuestionPatch::Existing(_, fields) => fields,
        }
    }
}

struct SurveyFields {
    title: String,
    description: Option<String>,
    status: bool,
    expire_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct SurveyPage {
    pub data: Vec<Survey>,
    pub meta: PageMeta,
}

pub async fn create(
    pool: &SqlitePool,
    public_dir: &str,
    user_id: i64,
    payload: SurveyPayload,
) -> Result<SurveyDetail, ApiError> {
    let (fields, patches) = validate(&payload)?;

    let image = match &payload.image {
        Some(data_uri) => Some(image::store(public_dir, data_uri)?),
        None => None,
    };

    let now = Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO surveys (user_id, title, description, image, status, expire_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&image)
    .bind(fields.status)
    .bind(&fields.expire_date)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let survey_id = result.last_insert_rowid();

    // Every incoming question is a creation here; caller-supplied ids are
    // ignored and the server assigns fresh ones.
    for patch in &patches {
        insert_question(&mut tx, survey_id, patch.fields()).await?;
    }

    tx.commit().await?;

    get_detail(pool, survey_id).await
}

pub async fn update(
    pool: &SqlitePool,
    public_dir: &str,
    user_id: i64,
    survey_id: i64,
    payload: SurveyPayload,
) -> Result<SurveyDetail, ApiError> {
    let survey = find(pool, survey_id).await?;

    // Ownership is checked before anything else, validation included.
    if survey.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    let (fields, patches) = validate(&payload)?;

    let image = match &payload.image {
        Some(data_uri) => Some(image::replace(
            public_dir,
            survey.image.as_deref(),
            data_uri,
        )?),
        None => survey.image.clone(),
    };

    let now = Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE surveys SET title = ?, description = ?, image = ?, status = ?, expire_date = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&image)
    .bind(fields.status)
    .bind(&fields.expire_date)
    .bind(now)
    .bind(survey_id)
    .execute(&mut *tx)
    .await?;

    reconcile_questions(&mut tx, survey_id, &patches).await?;

    tx.commit().await?;

    get_detail(pool, survey_id).await
}

pub async fn delete(
    pool: &SqlitePool,
    public_dir: &str,
    user_id: i64,
    survey_id: i64,
) -> Result<(), ApiError> {
    let survey = find(pool, survey_id).await?;

    if survey.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    // Questions and answers go with the row via the FK cascade.
    sqlx::query("DELETE FROM surveys WHERE id = ?")
        .bind(survey_id)
        .execute(pool)
        .await?;

    if let Some(image_path) = &survey.image {
        image::delete(public_dir, image_path);
    }

    Ok(())
}

pub async fn get(
    pool: &SqlitePool,
    user_id: i64,
    survey_id: i64,
) -> Result<SurveyDetail, ApiError> {
    let survey = find(pool, survey_id).await?;

    if survey.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    detail(pool, survey).await
}

/// Public view of a survey by id, no identity required.
pub async fn get_public(pool: &SqlitePool, survey_id: i64) -> Result<SurveyDetail, ApiError> {
    let survey = find(pool, survey_id).await?;
    detail(pool, survey).await
}

pub async fn list(
    pool: &SqlitePool,
    user_id: i64,
    page: u32,
    per_page: u32,
) -> Result<SurveyPage, ApiError> {
    let page = page.max(1);

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM surveys WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let offset = (page as i64 - 1) * per_page as i64;

    let data = sqlx::query_as::<_, Survey>(
        "SELECT * FROM surveys WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(per_page as i64)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(SurveyPage {
        data,
        meta: PageMeta {
            page,
            per_page,
            total,
        },
    })
}

pub(crate) async fn find(pool: &SqlitePool, survey_id: i64) -> Result<Survey, ApiError> {
    sqlx::query_as::<_, Survey>("SELECT * FROM surveys WHERE id = ?")
        .bind(survey_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("survey"))
}

/// Diffs the persisted question set against the incoming one and applies
/// the minimal mutations: deletions first, then creations, then in-place
/// updates. Runs entirely inside the caller's transaction.
async fn reconcile_questions(
    tx: &mut Transaction<'_, Sqlite>,
    survey_id: i64,
    incoming: &[QuestionPatch],
) -> Result<(), ApiError> {
    let existing_ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM questions WHERE survey_id = ?")
            .bind(survey_id)
            .fetch_all(&mut **tx)
            .await?;

    let existing: HashSet<i64> = existing_ids.iter().copied().collect();

    let incoming_ids: HashSet<i64> = incoming
        .iter()
        .filter_map(|patch| match patch {
            QuestionPatch::Existing(id, _) if existing.contains(id) => Some(*id),
            _ => None,
        })
        .collect();

    // Anything persisted that the caller no longer sends is dropped,
    // cascading its question answers.
    for id in existing_ids.iter().filter(|id| !incoming_ids.contains(id)) {
        sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    // New entries, plus entries whose id does not reference a question of
    // this survey. A stale or foreign id is a creation request, not an
    // error; the server assigns a fresh id either way.
    for patch in incoming {
        let create = match patch {
            QuestionPatch::New(_) => true,
            QuestionPatch::Existing(id, _) => !existing.contains(id),
        };

        if create {
            insert_question(tx, survey_id, patch.fields()).await?;
        }
    }

    // Updates in place; id and survey_id stay untouched.
    for patch in incoming {
        if let QuestionPatch::Existing(id, fields) = patch {
            if existing.contains(id) {
                sqlx::query(
                    "UPDATE questions SET question = ?, type = ?, description = ?, data = ?, position = ? \
                     WHERE id = ?",
                )
                .bind(&fields.question)
                .bind(fields.question_type.to_str())
                .bind(&fields.description)
                .bind(&fields.data)
                .bind(fields.position)
                .bind(id)
                .execute(&mut **tx)
                .await?;
            }
        }
    }

    Ok(())
}

async fn insert_question(
    tx: &mut Transaction<'_, Sqlite>,
    survey_id: i64,
    fields: &QuestionFields,
) -> Result<i64, ApiError> {
    let result = sqlx::query(
        "INSERT INTO questions (survey_id, question, type, description, data, position) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(survey_id)
    .bind(&fields.question)
    .bind(fields.question_type.to_str())
    .bind(&fields.description)
    .bind(&fields.data)
    .bind(fields.position)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn get_detail(pool: &SqlitePool, survey_id: i64) -> Result<SurveyDetail, ApiError> {
    let survey = find(pool, survey_id).await?;
    detail(pool, survey).await
}

async fn detail(pool: &SqlitePool, survey: Survey) -> Result<SurveyDetail, ApiError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT * FROM questions WHERE survey_id = ? ORDER BY id",
    )
    .bind(survey.id)
    .fetch_all(pool)
    .await?;

    Ok(SurveyDetail {
        survey,
        questions: questions.into_iter().map(QuestionDetail::from).collect(),
    })
}

/// Checks the whole payload before any write and reports every violated
/// field at once, not just the first.
fn validate(payload: &SurveyPayload) -> Result<(SurveyFields, Vec<QuestionPatch>), ApiError> {
    let mut violations = Vec::new();

    let title = payload.title.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        violations.push(FieldViolation::new("title", "title is required"));
    }

    let mut patches = Vec::with_capacity(payload.questions.len());
    for (index, input) in payload.questions.iter().enumerate() {
        if let Some(patch) = validate_question(index, input, &mut violations) {
            patches.push(patch);
        }
    }

    if !violations.is_empty() {
        return Err(ApiError::Validation(violations));
    }

    let fields = SurveyFields {
        title: title.to_string(),
        description: payload.description.clone(),
        status: payload.status.unwrap_or(false),
        expire_date: payload.expire_date.clone(),
    };

    Ok((fields, patches))
}

fn validate_question(
    index: usize,
    input: &QuestionInput,
    violations: &mut Vec<FieldViolation>,
) -> Option<QuestionPatch> {
    let question = input.question.as_deref().map(str::trim).unwrap_or("");
    if question.is_empty() {
        violations.push(FieldViolation::new(
            format!("questions.{index}.question"),
            "question is required",
        ));
    }

    let question_type = match input.question_type.as_deref() {
        Some(raw) => match QuestionType::from_str(raw) {
            Some(question_type) => Some(question_type),
            None => {
                violations.push(FieldViolation::new(
                    format!("questions.{index}.type"),
                    format!("type must be one of {}", QuestionType::ALL.join(", ")),
                ));
                None
            }
        },
        None => {
            violations.push(FieldViolation::new(
                format!("questions.{index}.type"),
                "type is required",
            ));
            None
        }
    };

    // The payload must be present but its shape is free-form; structured
    // values are serialized, bare strings kept as-is.
    let data = match &input.data {
        Some(Value::String(raw)) => Some(raw.clone()),
        Some(value) => Some(value.to_string()),
        None => {
            violations.push(FieldViolation::new(
                format!("questions.{index}.data"),
                "data must be present",
            ));
            None
        }
    };

    if question.is_empty() {
        return None;
    }

    let fields = QuestionFields {
        question: question.to_string(),
        question_type: question_type?,
        description: input.description.clone(),
        data: data?,
        position: index as i64,
    };

    Some(match input.id {
        Some(id) => QuestionPatch::Existing(id, fields),
        None => QuestionPatch::New(fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::sqlite;
    use serde_json::json;

    const PUBLIC: &str = "public";

    async fn pool() -> SqlitePool {
        sqlite::connect_memory().await.unwrap()
    }

    fn question(text: &str, question_type: &str) -> QuestionInput {
        QuestionInput {
            id: None,
            question: Some(text.to_string()),
            question_type: Some(question_type.to_string()),
            description: None,
            data: Some(json!([])),
        }
    }

    fn payload(title: &str, questions: Vec<QuestionInput>) -> SurveyPayload {
        SurveyPayload {
            title: Some(title.to_string()),
            description: None,
            image: None,
            status: Some(true),
            expire_date: None,
            questions,
        }
    }

    async fn question_rows(pool: &SqlitePool, survey_id: i64) -> Vec<Question> {
        sqlx::query_as("SELECT * FROM questions WHERE survey_id = ? ORDER BY id")
            .bind(survey_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn create_persists_survey_with_questions() {
        let pool = pool().await;

        let detail = create(
            &pool,
            PUBLIC,
            1,
            payload(
                "Customer feedback",
                vec![question("How did you hear about us?", "text"), question("Rating", "radio")],
            ),
        )
        .await
        .unwrap();

        assert_eq!(detail.survey.user_id, 1);
        assert_eq!(detail.survey.title, "Customer feedback");
        assert!(detail.survey.status);
        assert_eq!(detail.questions.len(), 2);
        assert!(detail.questions[0].id < detail.questions[1].id);
    }

    #[actix_web::test]
    async fn create_rejects_unknown_question_type_atomically() {
        let pool = pool().await;

        let error = create(
            &pool,
            PUBLIC,
            1,
            payload(
                "Broken",
                vec![question("Fine", "text"), question("Broken", "dropdown")],
            ),
        )
        .await
        .unwrap_err();

        match error {
            ApiError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "questions.1.type");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert_eq!(count(&pool, "surveys").await, 0);
        assert_eq!(count(&pool, "questions").await, 0);
    }

    #[actix_web::test]
    async fn validation_reports_every_violated_field() {
        let pool = pool().await;

        let broken = QuestionInput {
            id: None,
            question: None,
            question_type: None,
            description: None,
            data: None,
        };

        let error = create(
            &pool,
            PUBLIC,
            1,
            SurveyPayload {
                title: None,
                description: None,
                image: None,
                status: None,
                expire_date: None,
                questions: vec![broken],
            },
        )
        .await
        .unwrap_err();

        let ApiError::Validation(violations) = error else {
            panic!("expected validation error");
        };

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "title",
                "questions.0.question",
                "questions.0.type",
                "questions.0.data"
            ]
        );
    }

    #[actix_web::test]
    async fn update_reconciles_the_question_set() {
        let pool = pool().await;

        let created = create(
            &pool,
            PUBLIC,
            1,
            payload("Original", vec![question("First", "text"), question("Second", "text")]),
        )
        .await
        .unwrap();

        let kept_id = created.questions[0].id;
        let dropped_id = created.questions[1].id;

        let updated = update(
            &pool,
            PUBLIC,
            1,
            created.survey.id,
            payload(
                "Original",
                vec![
                    QuestionInput {
                        id: Some(kept_id),
                        question: Some("new text".to_string()),
                        question_type: Some("text".to_string()),
                        description: None,
                        data: Some(json!([])),
                    },
                    question("brand new", "text"),
                ],
            ),
        )
        .await
        .unwrap();

        assert_eq!(updated.questions.len(), 2);

        let ids: Vec<i64> = updated.questions.iter().map(|q| q.id).collect();
        assert!(ids.contains(&kept_id));
        assert!(!ids.contains(&dropped_id));

        let kept = updated.questions.iter().find(|q| q.id == kept_id).unwrap();
        assert_eq!(kept.question, "new text");

        let fresh = updated.questions.iter().find(|q| q.id != kept_id).unwrap();
        assert_eq!(fresh.question, "brand new");
        assert!(fresh.id > dropped_id);
    }

    #[actix_web::test]
    async fn update_is_idempotent_once_ids_match() {
        let pool = pool().await;

        let created = create(
            &pool,
            PUBLIC,
            1,
            payload("Stable", vec![question("One", "text"), question("Two", "select")]),
        )
        .await
        .unwrap();

        let inputs: Vec<QuestionInput> = created
            .questions
            .iter()
            .map(|q| QuestionInput {
                id: Some(q.id),
                question: Some(q.question.clone()),
                question_type: Some(q.question_type.clone()),
                description: q.description.clone(),
                data: Some(q.data.clone()),
            })
            .collect();

        let first = update(&pool, PUBLIC, 1, created.survey.id, payload("Stable", inputs.clone()))
            .await
            .unwrap();
        let second = update(&pool, PUBLIC, 1, created.survey.id, payload("Stable", inputs))
            .await
            .unwrap();

        let first_ids: Vec<i64> = first.questions.iter().map(|q| q.id).collect();
        let second_ids: Vec<i64> = second.questions.iter().map(|q| q.id).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(count(&pool, "questions").await, 2);
    }

    #[actix_web::test]
    async fn update_treats_foreign_id_as_creation() {
        let pool = pool().await;

        let created = create(&pool, PUBLIC, 1, payload("Sparse", vec![])).await.unwrap();

        let updated = update(
            &pool,
            PUBLIC,
            1,
            created.survey.id,
            payload(
                "Sparse",
                vec![QuestionInput {
                    id: Some(9999),
                    question: Some("Imported".to_string()),
                    question_type: Some("textarea".to_string()),
                    description: None,
                    data: Some(json!([])),
                }],
            ),
        )
        .await
        .unwrap();

        assert_eq!(updated.questions.len(), 1);
        assert_ne!(updated.questions[0].id, 9999);
    }

    #[actix_web::test]
    async fn update_validation_failure_leaves_state_unchanged() {
        let pool = pool().await;

        let created = create(
            &pool,
            PUBLIC,
            1,
            payload("Before", vec![question("Keep me", "text")]),
        )
        .await
        .unwrap();

        let before = question_rows(&pool, created.survey.id).await;

        let error = update(
            &pool,
            PUBLIC,
            1,
            created.survey.id,
            payload("After", vec![question("Broken", "dropdown")]),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, ApiError::Validation(_)));

        let after = question_rows(&pool, created.survey.id).await;
        assert_eq!(before, after);

        let survey = find(&pool, created.survey.id).await.unwrap();
        assert_eq!(survey.title, "Before");
    }

    #[actix_web::test]
    async fn owner_isolation_never_mutates() {
        let pool = pool().await;

        let created = create(
            &pool,
            PUBLIC,
            1,
            payload("Private", vec![question("Secret", "text")]),
        )
        .await
        .unwrap();
        let survey_id = created.survey.id;

        let error = get(&pool, 2, survey_id).await.unwrap_err();
        assert!(matches!(error, ApiError::Forbidden));

        let error = update(&pool, PUBLIC, 2, survey_id, payload("Hijacked", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(error, ApiError::Forbidden));

        let error = delete(&pool, PUBLIC, 2, survey_id).await.unwrap_err();
        assert!(matches!(error, ApiError::Forbidden));

        let survey = find(&pool, survey_id).await.unwrap();
        assert_eq!(survey.title, "Private");
        assert_eq!(count(&pool, "questions").await, 1);
    }

    #[actix_web::test]
    async fn delete_cascades_questions() {
        let pool = pool().await;

        let created = create(
            &pool,
            PUBLIC,
            1,
            payload("Doomed", vec![question("One", "text"), question("Two", "checkbox")]),
        )
        .await
        .unwrap();

        delete(&pool, PUBLIC, 1, created.survey.id).await.unwrap();

        assert_eq!(count(&pool, "surveys").await, 0);
        assert_eq!(count(&pool, "questions").await, 0);
        assert!(matches!(
            find(&pool, created.survey.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn list_paginates_per_owner() {
        let pool = pool().await;

        for index in 0..6 {
            create(&pool, PUBLIC, 1, payload(&format!("Survey {index}"), vec![]))
                .await
                .unwrap();
        }
        create(&pool, PUBLIC, 2, payload("Someone else's", vec![]))
            .await
            .unwrap();

        let first = list(&pool, 1, 1, 5).await.unwrap();
        assert_eq!(first.data.len(), 5);
        assert_eq!(first.meta.total, 6);

        let second = list(&pool, 1, 2, 5).await.unwrap();
        assert_eq!(second.data.len(), 1);
        assert_eq!(second.meta.page, 2);
    }
}

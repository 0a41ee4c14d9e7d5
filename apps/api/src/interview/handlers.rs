use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::feedback_gen::{generate_answer_feedback, generate_session_feedback};
use crate::interview::jd_parser::parse_jd;
use crate::interview::question_gen::generate_questions;
use crate::session::codec;
use crate::session::manager;
use crate::session::model::InterviewSession;
use crate::session::store::SessionSummary;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub jd_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: Uuid,
    pub answer_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SetIndexRequest {
    pub index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub in_progress: bool,
}

async fn load_session(state: &AppState, id: Uuid) -> Result<InterviewSession, AppError> {
    state
        .store
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Pushes a transformed aggregate to the coordinator's active slot and saves
/// it immediately — explicit user actions get synchronous durability; the
/// auto-save tick covers everything in between.
async fn persist(state: &AppState, session: &InterviewSession) -> Result<Json<Value>, AppError> {
    state.autosaver.update(session).await;
    state.store.save(session).await?;
    Ok(Json(codec::to_value(session)?))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let job = parse_jd(&req.jd_text, &state.llm).await?;
    let questions = generate_questions(&job, &state.llm).await?;
    let session = manager::create_session(job, questions);
    info!(
        "created session {} ({} questions, {} role)",
        session.id,
        session.questions.len(),
        session.parsed_jd.role_type.as_str()
    );
    state.autosaver.start(&session).await;
    Ok(Json(codec::to_value(&session)?))
}

/// GET /api/v1/sessions/current
pub async fn handle_restore_current(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .autosaver
        .restore_current()
        .await?
        .ok_or_else(|| AppError::NotFound("No session in progress".to_string()))?;
    Ok(Json(codec::to_value(&session)?))
}

/// GET /api/v1/sessions/status
pub async fn handle_session_status(
    State(state): State<AppState>,
) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        in_progress: state.autosaver.has_session_in_progress().await,
    })
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(codec::to_value(&session)?))
}

/// POST /api/v1/sessions/:id/answers
pub async fn handle_store_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let updated = manager::store_answer(&session, req.question_id, req.answer_text)?;
    persist(&state, &updated).await
}

/// POST /api/v1/sessions/:id/next
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let updated = manager::next_question(&session)?;
    persist(&state, &updated).await
}

/// POST /api/v1/sessions/:id/previous
pub async fn handle_previous_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let updated = manager::previous_question(&session)?;
    persist(&state, &updated).await
}

/// PATCH /api/v1/sessions/:id/question-index
pub async fn handle_set_question_index(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetIndexRequest>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let updated = manager::set_current_question_index(&session, req.index)?;
    persist(&state, &updated).await
}

/// POST /api/v1/sessions/:id/questions/:question_id/feedback
///
/// Generates feedback for the stored answer to one question. The question
/// must exist (its prompt feeds the LLM call) and must have been answered.
pub async fn handle_answer_feedback(
    State(state): State<AppState>,
    Path((id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let question = session
        .questions
        .iter()
        .find(|q| q.id == question_id)
        .ok_or_else(|| AppError::NotFound(format!("Question {question_id} not found")))?
        .clone();
    let answer = manager::get_answer(&session, question_id)
        .ok_or_else(|| {
            AppError::Validation("answer this question before requesting feedback".to_string())
        })?
        .to_string();

    let feedback = generate_answer_feedback(&question, &answer, &state.llm).await?;
    let updated = manager::store_feedback(&session, feedback);
    persist(&state, &updated).await
}

/// POST /api/v1/sessions/:id/complete
///
/// Completion is allowed with unanswered questions; the debrief scores
/// coverage accordingly.
pub async fn handle_complete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let session = load_session(&state, id).await?;
    let debrief = generate_session_feedback(&session, &state.llm).await?;
    let with_feedback = manager::store_session_feedback(&session, debrief);
    let done = manager::complete_session(&with_feedback);
    state.autosaver.complete(&done).await?;
    info!("session {} completed", done.id);
    Ok(Json(codec::to_value(&done)?))
}

/// GET /api/v1/history
pub async fn handle_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    Ok(Json(state.store.history().await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sessions
pub async fn handle_clear_all(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    // Abandonment is a teardown path: release the timer before wiping.
    state.autosaver.stop().await;
    state.store.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

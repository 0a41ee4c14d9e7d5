//! Serialization codec — the single wire form of the interview-session
//! aggregate.
//!
//! Wire shape: a camelCase JSON object. The two associations travel as
//! pair-lists (`[[questionId, value], ...]`, order insignificant) and every
//! timestamp becomes an ISO-8601 UTC string at millisecond precision.
//! `deserialize(serialize(x)) == x` for any aggregate whose timestamps carry
//! at most millisecond precision.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::session::model::{
    AnswerFeedback, InterviewSession, JobContext, Question, SessionFeedback,
};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to deserialize session: {reason}")]
    Deserialize { reason: String },
}

impl CodecError {
    fn bad_wire(reason: impl Into<String>) -> Self {
        CodecError::Deserialize {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerFeedbackWire {
    question_id: Uuid,
    score: f64,
    strengths: Vec<String>,
    improvements: Vec<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionWire {
    id: Uuid,
    #[serde(rename = "parsedJD")]
    parsed_jd: JobContext,
    questions: Vec<Question>,
    #[serde(default)]
    answers: Vec<(Uuid, String)>,
    #[serde(default)]
    feedback: Vec<(Uuid, AnswerFeedbackWire)>,
    #[serde(default)]
    session_feedback: Option<SessionFeedback>,
    #[serde(default)]
    current_question_index: usize,
    #[serde(default)]
    is_complete: bool,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

/// ISO-8601 UTC at millisecond precision — the one timestamp format on the
/// wire, shared with the history ledger.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: Option<&str>, field: &str) -> Result<DateTime<Utc>, CodecError> {
    let raw =
        raw.ok_or_else(|| CodecError::bad_wire(format!("invalid {field} timestamp: missing")))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CodecError::bad_wire(format!("invalid {field} timestamp: {raw:?}")))
}

fn to_wire(session: &InterviewSession) -> SessionWire {
    SessionWire {
        id: session.id,
        parsed_jd: session.parsed_jd.clone(),
        questions: session.questions.clone(),
        answers: session
            .answers
            .iter()
            .map(|(id, text)| (*id, text.clone()))
            .collect(),
        feedback: session
            .feedback
            .iter()
            .map(|(id, fb)| {
                (
                    *id,
                    AnswerFeedbackWire {
                        question_id: fb.question_id,
                        score: fb.score,
                        strengths: fb.strengths.clone(),
                        improvements: fb.improvements.clone(),
                        created_at: Some(format_timestamp(fb.created_at)),
                    },
                )
            })
            .collect(),
        session_feedback: session.session_feedback.clone(),
        current_question_index: session.current_question_index,
        is_complete: session.is_complete,
        created_at: Some(format_timestamp(session.created_at)),
        completed_at: session.completed_at.map(format_timestamp),
    }
}

/// Serializes the aggregate to its wire text.
pub fn serialize(session: &InterviewSession) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&to_wire(session))?)
}

/// Serializes the aggregate to a JSON value — the same wire shape, used for
/// HTTP responses so there is exactly one serialized form.
pub fn to_value(session: &InterviewSession) -> Result<Value, CodecError> {
    Ok(serde_json::to_value(to_wire(session))?)
}

/// Reconstructs an aggregate from wire text, validating shape in stages:
/// well-formed JSON, required fields (`id`, `parsedJD`, `questions` as a
/// list), then field-by-field timestamp parsing with the offending field
/// named in the error. Missing `currentQuestionIndex` defaults to 0 and
/// missing `isComplete` to false.
pub fn deserialize(text: &str) -> Result<InterviewSession, CodecError> {
    let value: Value =
        serde_json::from_str(text).map_err(|_| CodecError::bad_wire("Invalid JSON format"))?;

    let questions_is_list = value
        .get("questions")
        .map(Value::is_array)
        .unwrap_or(false);
    if value.get("id").is_none() || value.get("parsedJD").is_none() || !questions_is_list {
        return Err(CodecError::bad_wire(
            "missing required fields (id, parsedJD, questions)",
        ));
    }

    let wire: SessionWire = serde_json::from_value(value)
        .map_err(|e| CodecError::bad_wire(format!("malformed session field: {e}")))?;

    let created_at = parse_timestamp(wire.created_at.as_deref(), "createdAt")?;
    let completed_at = wire
        .completed_at
        .as_deref()
        .map(|raw| parse_timestamp(Some(raw), "completedAt"))
        .transpose()?;

    let answers: HashMap<Uuid, String> = wire.answers.into_iter().collect();

    let mut feedback = HashMap::with_capacity(wire.feedback.len());
    for (question_id, fb) in wire.feedback {
        let fb_created_at = parse_timestamp(
            fb.created_at.as_deref(),
            &format!("feedback[{question_id}].createdAt"),
        )?;
        feedback.insert(
            question_id,
            AnswerFeedback {
                question_id: fb.question_id,
                score: fb.score,
                strengths: fb.strengths,
                improvements: fb.improvements,
                created_at: fb_created_at,
            },
        );
    }

    Ok(InterviewSession {
        id: wire.id,
        parsed_jd: wire.parsed_jd,
        questions: wire.questions,
        answers,
        feedback,
        session_feedback: wire.session_feedback,
        current_question_index: wire.current_question_index,
        is_complete: wire.is_complete,
        created_at,
        completed_at,
    })
}

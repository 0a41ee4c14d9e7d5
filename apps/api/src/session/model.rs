//! Session data model — the interview-session aggregate and its value types.
//!
//! The aggregate is a plain value: every mutation goes through the pure
//! transforms in `session::manager` and returns a new `InterviewSession`.
//! Callers never observe a half-updated aggregate.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoleCategory {
    Software,
    Devops,
    Security,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Junior,
    Mid,
    Senior,
    Staff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionCategory {
    Behavioral,
    Technical,
    SystemDesign,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Structured job context extracted from a raw job description.
/// Created once by the JD parsing pipeline; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub role_type: RoleCategory,
    pub required_skills: Vec<String>,
    pub experience_level: ExperienceTier,
    pub technologies: Vec<String>,
    pub responsibilities: Vec<String>,
    /// Original JD text as submitted (minimum 50 chars, checked at ingestion).
    pub raw_text: String,
}

/// One generated interview question. Immutable after generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub category: QuestionCategory,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub related_skills: Vec<String>,
}

/// LLM-produced feedback for a single answered question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeedback {
    pub question_id: Uuid,
    /// 1.0 – 10.0, clamped at the generation boundary.
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-category score breakdown inside the session-level feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub behavioral: f64,
    pub technical: f64,
    pub system_design: f64,
}

/// Whole-session feedback produced at completion. At most one per session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeedback {
    pub overall_score: f64,
    pub category_scores: CategoryScores,
    pub strongest_areas: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The interview-session aggregate.
///
/// Invariants (every observable state):
/// - `current_question_index < questions.len()`
/// - every key of `answers` is the id of some question in `questions`
/// - `completed_at.is_some() == is_complete`, and `completed_at >= created_at`
/// - each `feedback` entry's `question_id` equals its map key
/// - `questions` is fixed at creation and never reordered
///
/// Serialization goes through `session::codec` — the aggregate itself has no
/// serde derives so there is exactly one wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSession {
    pub id: Uuid,
    pub parsed_jd: JobContext,
    pub questions: Vec<Question>,
    pub answers: HashMap<Uuid, String>,
    pub feedback: HashMap<Uuid, AnswerFeedback>,
    pub session_feedback: Option<SessionFeedback>,
    pub current_question_index: usize,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RoleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleCategory::Software => "software",
            RoleCategory::Devops => "devops",
            RoleCategory::Security => "security",
        }
    }
}

impl ExperienceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceTier::Junior => "junior",
            ExperienceTier::Mid => "mid",
            ExperienceTier::Senior => "senior",
            ExperienceTier::Staff => "staff",
        }
    }
}

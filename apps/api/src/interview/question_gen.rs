//! Question generation — turns a `JobContext` into the fixed question set a
//! session is created with.
//!
//! The minimums here (question count, prompt length) are the schema boundary
//! the session manager relies on: `create_session` accepts the batch as
//! already validated.

use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{QUESTION_GEN_PROMPT_TEMPLATE, QUESTION_GEN_SYSTEM};
use crate::llm_client::LlmClient;
use crate::session::model::{Difficulty, JobContext, Question, QuestionCategory};

/// A session needs at least this many questions.
pub const MIN_QUESTIONS: usize = 5;
/// A question prompt shorter than this is discarded as degenerate.
pub const MIN_PROMPT_LENGTH: usize = 10;
/// Max regeneration attempts when a batch comes back undersized.
const MAX_GENERATION_RETRIES: u32 = 2;

/// One question as the LLM returns it — ids are assigned here, never by the
/// model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedQuestion {
    category: QuestionCategory,
    prompt: String,
    difficulty: Difficulty,
    #[serde(default)]
    related_skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionBatch {
    questions: Vec<GeneratedQuestion>,
}

/// Generates the question set for a parsed role. Undersized batches are
/// regenerated a bounded number of times before giving up.
pub async fn generate_questions(
    job: &JobContext,
    llm: &LlmClient,
) -> Result<Vec<Question>, AppError> {
    let prompt = QUESTION_GEN_PROMPT_TEMPLATE
        .replace("{role_type}", job.role_type.as_str())
        .replace("{experience_level}", job.experience_level.as_str())
        .replace("{skills}", &job.required_skills.join(", "))
        .replace("{technologies}", &job.technologies.join(", "));

    let mut last_error = AppError::Llm("question generation produced no batch".to_string());

    for attempt in 0..=MAX_GENERATION_RETRIES {
        if attempt > 0 {
            warn!("question batch rejected, regenerating (attempt {attempt})");
        }
        let batch: QuestionBatch = llm
            .call_json(&prompt, QUESTION_GEN_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("question generation failed: {e}")))?;

        match accept_batch(batch.questions) {
            Ok(questions) => return Ok(questions),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

/// Schema boundary for a generated batch: drops degenerate prompts, enforces
/// the session minimum, and stamps fresh ids.
fn accept_batch(generated: Vec<GeneratedQuestion>) -> Result<Vec<Question>, AppError> {
    let questions: Vec<Question> = generated
        .into_iter()
        .filter(|q| q.prompt.trim().chars().count() >= MIN_PROMPT_LENGTH)
        .map(|q| Question {
            id: Uuid::new_v4(),
            category: q.category,
            prompt: q.prompt,
            difficulty: q.difficulty,
            related_skills: q.related_skills,
        })
        .collect();

    if questions.len() < MIN_QUESTIONS {
        return Err(AppError::Llm(format!(
            "question generation returned {} usable questions, need at least {MIN_QUESTIONS}",
            questions.len()
        )));
    }
    Ok(questions)
}

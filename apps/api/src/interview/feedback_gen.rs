//! Feedback generation — per-answer feedback and the whole-session debrief.
//!
//! Both calls follow the same pipeline as JD parsing: template → `call_json`
//! → validate/normalize at the boundary before anything reaches the session
//! core.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{
    ANSWER_FEEDBACK_PROMPT_TEMPLATE, ANSWER_FEEDBACK_SYSTEM, SESSION_FEEDBACK_PROMPT_TEMPLATE,
    SESSION_FEEDBACK_SYSTEM,
};
use crate::llm_client::prompts::CANDID_FEEDBACK_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::session::model::{
    AnswerFeedback, InterviewSession, Question, SessionFeedback,
};

/// Feedback must carry at least this many strengths and improvements.
pub const MIN_FEEDBACK_ITEMS: usize = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedAnswerFeedback {
    score: f64,
    strengths: Vec<String>,
    improvements: Vec<String>,
}

/// Evaluates one answer against its question.
pub async fn generate_answer_feedback(
    question: &Question,
    answer: &str,
    llm: &LlmClient,
) -> Result<AnswerFeedback, AppError> {
    let prompt = format!(
        "{}\n\n{CANDID_FEEDBACK_INSTRUCTION}",
        ANSWER_FEEDBACK_PROMPT_TEMPLATE
            .replace("{question}", &question.prompt)
            .replace("{category}", &category_label(question))
            .replace("{answer}", answer)
    );

    let raw: GeneratedAnswerFeedback = llm
        .call_json(&prompt, ANSWER_FEEDBACK_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("answer feedback failed: {e}")))?;

    accept_answer_feedback(question.id, raw)
}

fn category_label(question: &Question) -> String {
    serde_json::to_value(question.category)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "technical".to_string())
}

/// Boundary check for generated answer feedback: list minimums are a schema
/// failure (fail fast, no retry); scores are clamped into range rather than
/// rejected.
fn accept_answer_feedback(
    question_id: Uuid,
    raw: GeneratedAnswerFeedback,
) -> Result<AnswerFeedback, AppError> {
    if raw.strengths.len() < MIN_FEEDBACK_ITEMS || raw.improvements.len() < MIN_FEEDBACK_ITEMS {
        return Err(AppError::Llm(format!(
            "answer feedback needs at least {MIN_FEEDBACK_ITEMS} strengths and improvements"
        )));
    }
    Ok(AnswerFeedback {
        question_id,
        score: raw.score.clamp(1.0, 10.0),
        strengths: raw.strengths,
        improvements: raw.improvements,
        created_at: Utc::now(),
    })
}

/// Writes the final debrief across the whole session. Unanswered questions
/// are included in the transcript, marked, so the model scores coverage
/// honestly.
pub async fn generate_session_feedback(
    session: &InterviewSession,
    llm: &LlmClient,
) -> Result<SessionFeedback, AppError> {
    let prompt = format!(
        "{}\n\n{CANDID_FEEDBACK_INSTRUCTION}",
        SESSION_FEEDBACK_PROMPT_TEMPLATE
            .replace("{role_type}", session.parsed_jd.role_type.as_str())
            .replace(
                "{experience_level}",
                session.parsed_jd.experience_level.as_str(),
            )
            .replace("{transcript}", &render_transcript(session))
    );

    let raw: SessionFeedback = llm
        .call_json(&prompt, SESSION_FEEDBACK_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("session feedback failed: {e}")))?;

    accept_session_feedback(raw)
}

fn accept_session_feedback(mut feedback: SessionFeedback) -> Result<SessionFeedback, AppError> {
    if feedback.strongest_areas.is_empty()
        || feedback.improvement_areas.is_empty()
        || feedback.recommendations.is_empty()
    {
        return Err(AppError::Llm(
            "session feedback needs at least one entry per list".to_string(),
        ));
    }
    feedback.overall_score = feedback.overall_score.clamp(1.0, 10.0);
    feedback.category_scores.behavioral = feedback.category_scores.behavioral.clamp(0.0, 10.0);
    feedback.category_scores.technical = feedback.category_scores.technical.clamp(0.0, 10.0);
    feedback.category_scores.system_design =
        feedback.category_scores.system_design.clamp(0.0, 10.0);
    Ok(feedback)
}

/// Renders question/answer pairs in question order for the debrief prompt.
fn render_transcript(session: &InterviewSession) -> String {
    let mut out = String::new();
    for (i, question) in session.questions.iter().enumerate() {
        out.push_str(&format!(
            "Q{} [{}]: {}\n",
            i + 1,
            category_label(question),
            question.prompt
        ));
        match session.answers.get(&question.id) {
            Some(answer) => out.push_str(&format!("A{}: {}\n\n", i + 1, answer)),
            None => out.push_str(&format!("A{}: (not answered)\n\n", i + 1)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::manager;
    use crate::session::model::{
        CategoryScores, Difficulty, ExperienceTier, JobContext, QuestionCategory, RoleCategory,
    };

    fn fixture_question() -> Question {
        Question {
            id: Uuid::new_v4(),
            category: QuestionCategory::SystemDesign,
            prompt: "Design a job scheduler for batch workloads".to_string(),
            difficulty: Difficulty::Hard,
            related_skills: vec!["distributed systems".to_string()],
        }
    }

    fn raw_feedback(score: f64) -> GeneratedAnswerFeedback {
        GeneratedAnswerFeedback {
            score,
            strengths: vec!["names real systems".to_string(), "quantified".to_string()],
            improvements: vec!["tradeoffs".to_string(), "failure modes".to_string()],
        }
    }

    #[test]
    fn test_accept_answer_feedback_embeds_question_id() {
        let qid = Uuid::new_v4();
        let fb = accept_answer_feedback(qid, raw_feedback(7.0)).unwrap();
        assert_eq!(fb.question_id, qid);
        assert_eq!(fb.score, 7.0);
    }

    #[test]
    fn test_answer_feedback_score_clamped_into_range() {
        let low = accept_answer_feedback(Uuid::new_v4(), raw_feedback(0.0)).unwrap();
        assert_eq!(low.score, 1.0);
        let high = accept_answer_feedback(Uuid::new_v4(), raw_feedback(11.5)).unwrap();
        assert_eq!(high.score, 10.0);
    }

    #[test]
    fn test_answer_feedback_rejects_thin_lists() {
        let raw = GeneratedAnswerFeedback {
            score: 8.0,
            strengths: vec!["good".to_string()],
            improvements: vec!["more detail".to_string(), "examples".to_string()],
        };
        assert!(accept_answer_feedback(Uuid::new_v4(), raw).is_err());
    }

    #[test]
    fn test_session_feedback_clamps_category_scores() {
        let raw = SessionFeedback {
            overall_score: 12.0,
            category_scores: CategoryScores {
                behavioral: -1.0,
                technical: 10.5,
                system_design: 5.0,
            },
            strongest_areas: vec!["communication".to_string()],
            improvement_areas: vec!["estimation".to_string()],
            recommendations: vec!["mock interviews weekly".to_string()],
        };
        let fb = accept_session_feedback(raw).unwrap();
        assert_eq!(fb.overall_score, 10.0);
        assert_eq!(fb.category_scores.behavioral, 0.0);
        assert_eq!(fb.category_scores.technical, 10.0);
    }

    #[test]
    fn test_session_feedback_rejects_empty_lists() {
        let raw = SessionFeedback {
            overall_score: 6.0,
            category_scores: CategoryScores {
                behavioral: 6.0,
                technical: 6.0,
                system_design: 6.0,
            },
            strongest_areas: vec![],
            improvement_areas: vec!["estimation".to_string()],
            recommendations: vec!["practice".to_string()],
        };
        assert!(accept_session_feedback(raw).is_err());
    }

    #[test]
    fn test_transcript_marks_unanswered_questions() {
        let job = JobContext {
            role_type: RoleCategory::Software,
            required_skills: vec!["Rust".to_string()],
            experience_level: ExperienceTier::Mid,
            technologies: vec![],
            responsibilities: vec![],
            raw_text: "A mid-level software engineering role working on services."
                .to_string(),
        };
        let questions: Vec<Question> = (0..5).map(|_| fixture_question()).collect();
        let session = manager::create_session(job, questions);
        let answered =
            manager::store_answer(&session, session.questions[0].id, "I would shard by tenant")
                .unwrap();

        let transcript = render_transcript(&answered);
        assert!(transcript.contains("I would shard by tenant"));
        assert_eq!(transcript.matches("(not answered)").count(), 4);
        assert!(transcript.contains("[system-design]"));
    }
}

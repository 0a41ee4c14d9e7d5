//! Session manager — pure state transitions over the interview-session
//! aggregate.
//!
//! Every function here is a total value transform: no I/O, no hidden state,
//! no catches. Precondition violations come back as typed `SessionError`
//! values and leave the input untouched. This purity is what lets the
//! aggregate be copied, diffed, and persisted by unrelated components
//! without coordination.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::session::model::{
    AnswerFeedback, InterviewSession, JobContext, Question, SessionFeedback,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question {0} not found in this session")]
    QuestionNotFound(Uuid),

    #[error("question index {index} is out of range (session has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("already at the last question")]
    AtLastQuestion,

    #[error("already at the first question")]
    AtFirstQuestion,
}

/// Creates a fresh session from a parsed job context and a generated
/// question set. The caller guarantees `questions.len() >= 5` — that minimum
/// is schema-enforced at the generation boundary, not re-checked here.
pub fn create_session(job: JobContext, questions: Vec<Question>) -> InterviewSession {
    InterviewSession {
        id: Uuid::new_v4(),
        parsed_jd: job,
        questions,
        answers: Default::default(),
        feedback: Default::default(),
        session_feedback: None,
        current_question_index: 0,
        is_complete: false,
        created_at: Utc::now(),
        completed_at: None,
    }
}

/// Inserts or overwrites the answer for `question_id`.
/// Unknown ids are rejected, which is what keeps every key of `answers` a
/// valid question id.
pub fn store_answer(
    session: &InterviewSession,
    question_id: Uuid,
    text: impl Into<String>,
) -> Result<InterviewSession, SessionError> {
    if !session.questions.iter().any(|q| q.id == question_id) {
        return Err(SessionError::QuestionNotFound(question_id));
    }
    let mut next = session.clone();
    next.answers.insert(question_id, text.into());
    Ok(next)
}

pub fn get_answer(session: &InterviewSession, question_id: Uuid) -> Option<&str> {
    session.answers.get(&question_id).map(String::as_str)
}

/// Inserts or overwrites per-question feedback, keyed by
/// `feedback.question_id`. Membership of that id in the question set is
/// deliberately NOT validated — asymmetric with `store_answer`.
pub fn store_feedback(session: &InterviewSession, feedback: AnswerFeedback) -> InterviewSession {
    let mut next = session.clone();
    next.feedback.insert(feedback.question_id, feedback);
    next
}

pub fn get_feedback(session: &InterviewSession, question_id: Uuid) -> Option<&AnswerFeedback> {
    session.feedback.get(&question_id)
}

/// Moves the cursor to `index`. The unsigned type rules out negatives; the
/// upper bound is checked here.
pub fn set_current_question_index(
    session: &InterviewSession,
    index: usize,
) -> Result<InterviewSession, SessionError> {
    if index >= session.questions.len() {
        return Err(SessionError::IndexOutOfRange {
            index,
            len: session.questions.len(),
        });
    }
    let mut next = session.clone();
    next.current_question_index = index;
    Ok(next)
}

pub fn next_question(session: &InterviewSession) -> Result<InterviewSession, SessionError> {
    if session.current_question_index + 1 >= session.questions.len() {
        return Err(SessionError::AtLastQuestion);
    }
    set_current_question_index(session, session.current_question_index + 1)
}

pub fn previous_question(session: &InterviewSession) -> Result<InterviewSession, SessionError> {
    if session.current_question_index == 0 {
        return Err(SessionError::AtFirstQuestion);
    }
    set_current_question_index(session, session.current_question_index - 1)
}

pub fn current_question(session: &InterviewSession) -> &Question {
    &session.questions[session.current_question_index]
}

/// Marks the session complete and stamps `completed_at`.
/// Does NOT require `are_all_questions_answered` — completing a partially
/// answered session is allowed; callers decide whether to gate on it.
pub fn complete_session(session: &InterviewSession) -> InterviewSession {
    let mut next = session.clone();
    next.is_complete = true;
    next.completed_at = Some(Utc::now());
    next
}

/// Cardinality check: one stored answer per question. `store_answer` already
/// guarantees the keys are valid question ids, so counting is enough.
pub fn are_all_questions_answered(session: &InterviewSession) -> bool {
    session.answers.len() == session.questions.len()
}

pub fn store_session_feedback(
    session: &InterviewSession,
    feedback: SessionFeedback,
) -> InterviewSession {
    let mut next = session.clone();
    next.session_feedback = Some(feedback);
    next
}

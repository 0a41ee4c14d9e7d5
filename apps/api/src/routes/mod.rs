pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route(
            "/api/v1/sessions",
            post(handlers::handle_create_session).delete(handlers::handle_clear_all),
        )
        .route(
            "/api/v1/sessions/current",
            get(handlers::handle_restore_current),
        )
        .route(
            "/api/v1/sessions/status",
            get(handlers::handle_session_status),
        )
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        // Answer / navigation flow
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_store_answer),
        )
        .route(
            "/api/v1/sessions/:id/next",
            post(handlers::handle_next_question),
        )
        .route(
            "/api/v1/sessions/:id/previous",
            post(handlers::handle_previous_question),
        )
        .route(
            "/api/v1/sessions/:id/question-index",
            patch(handlers::handle_set_question_index),
        )
        // Feedback + completion
        .route(
            "/api/v1/sessions/:id/questions/:question_id/feedback",
            post(handlers::handle_answer_feedback),
        )
        .route(
            "/api/v1/sessions/:id/complete",
            post(handlers::handle_complete_session),
        )
        // History ledger
        .route("/api/v1/history", get(handlers::handle_history))
        .with_state(state)
}

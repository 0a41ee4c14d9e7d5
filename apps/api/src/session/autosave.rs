//! Persistence coordinator — periodic auto-save, restore-on-startup, and the
//! completion-to-history transition.
//!
//! `AutoSaver` owns the only mutable state in the session core: the
//! active-session slot and one cancellable repeating task. The slot sits
//! behind a `tokio::sync::Mutex` — the single-writer guard that preserves
//! "last write wins, no interleaved partial write" on a concurrent runtime.
//! Every teardown path (completion, abandonment, shutdown) must release the
//! timer via `stop`/`cleanup`, otherwise a stale session keeps re-saving
//! forever.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::session::model::InterviewSession;
use crate::session::store::{SessionStore, StoreError};

pub struct AutoSaver {
    store: Arc<dyn SessionStore>,
    interval: Duration,
    active: Arc<Mutex<Option<InterviewSession>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            active: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
        }
    }

    /// Cancels any existing timer, records `session` as active, performs one
    /// immediate save, then arms the recurring task. Each tick re-saves
    /// whatever the active slot holds at that moment — not the value
    /// captured here — so `update` keeps ticks current.
    ///
    /// Save failures (immediate and per-tick) are logged and ignored: the
    /// interactive session continues even while durability is lost, and the
    /// next tick retries.
    pub async fn start(&self, session: &InterviewSession) {
        self.stop().await;
        *self.active.lock().await = Some(session.clone());

        if let Err(e) = self.store.save(session).await {
            warn!("initial auto-save of session {} failed: {e}", session.id);
        }

        let store = Arc::clone(&self.store);
        let active = Arc::clone(&self.active);
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // interval yields immediately on the first tick; the immediate
            // save above already covered it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let snapshot = active.lock().await.clone();
                let Some(session) = snapshot else { continue };
                match store.save(&session).await {
                    Ok(()) => debug!("auto-saved session {}", session.id),
                    Err(e) => warn!("auto-save of session {} failed: {e}", session.id),
                }
            }
        });
        *self.timer.lock().await = Some(handle);
        debug!(
            "auto-save armed for session {} every {:?}",
            session.id, self.interval
        );
    }

    /// Cancels the repeating task if armed. Idempotent.
    pub async fn stop(&self) {
        if let Some(handle) = self.timer.lock().await.take() {
            handle.abort();
        }
    }

    /// Replaces the active aggregate without touching the timer.
    pub async fn update(&self, session: &InterviewSession) {
        *self.active.lock().await = Some(session.clone());
    }

    /// Loads the pointer-indicated session; on a hit, adopts it as active
    /// and starts auto-save.
    pub async fn restore_current(&self) -> Result<Option<InterviewSession>, StoreError> {
        match self.store.load_current().await? {
            Some(session) => {
                info!("restored session {} from storage", session.id);
                self.start(&session).await;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Final transition: save the completed state, append to history, clear
    /// the current pointer — strictly in that order, so a crash mid-sequence
    /// still leaves the session individually loadable. Then release the
    /// timer and the active slot.
    pub async fn complete(&self, session: &InterviewSession) -> Result<(), StoreError> {
        self.store.save(session).await?;
        self.store.save_to_history(session).await?;
        self.store.clear_current_pointer().await?;
        self.stop().await;
        *self.active.lock().await = None;
        info!("session {} completed and archived to history", session.id);
        Ok(())
    }

    /// True iff a current session exists and is not complete. Storage
    /// failures degrade to false — this is a UI hint, not a durability
    /// guarantee.
    pub async fn has_session_in_progress(&self) -> bool {
        match self.store.load_current().await {
            Ok(Some(session)) => !session.is_complete,
            Ok(None) => false,
            Err(e) => {
                warn!("could not check for in-progress session: {e}");
                false
            }
        }
    }

    /// Deterministic teardown: best-effort final save of the active session
    /// (failure swallowed), then stop the timer.
    pub async fn cleanup(&self) {
        let snapshot = self.active.lock().await.clone();
        if let Some(session) = snapshot {
            if let Err(e) = self.store.save(&session).await {
                warn!("final save of session {} failed during cleanup: {e}", session.id);
            }
        }
        self.stop().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::manager;
    use crate::session::model::{
        Difficulty, ExperienceTier, JobContext, Question, QuestionCategory, RoleCategory,
    };
    use crate::session::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    const TICK: Duration = Duration::from_secs(30);

    fn fixture_session() -> InterviewSession {
        let job = JobContext {
            role_type: RoleCategory::Software,
            required_skills: vec!["Rust".to_string()],
            experience_level: ExperienceTier::Junior,
            technologies: vec!["axum".to_string()],
            responsibilities: vec!["Ship features".to_string()],
            raw_text: "Junior backend engineer position working on our Rust services."
                .to_string(),
        };
        let questions = (0..5)
            .map(|i| Question {
                id: Uuid::new_v4(),
                category: QuestionCategory::Behavioral,
                prompt: format!("Tell me about experience number {i}"),
                difficulty: Difficulty::Easy,
                related_skills: vec!["Rust".to_string()],
            })
            .collect();
        manager::create_session(job, questions)
    }

    /// Delegates to a MemoryStore but fails `save` while the flag is set.
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                failing: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn save(&self, session: &InterviewSession) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("backing store is down".to_string()));
            }
            self.inner.save(session).await
        }
        async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError> {
            self.inner.load(id).await
        }
        async fn load_current(&self) -> Result<Option<InterviewSession>, StoreError> {
            self.inner.load_current().await
        }
        async fn clear_current_pointer(&self) -> Result<(), StoreError> {
            self.inner.clear_current_pointer().await
        }
        async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
        async fn save_to_history(&self, session: &InterviewSession) -> Result<(), StoreError> {
            self.inner.save_to_history(session).await
        }
        async fn history(&self) -> Result<Vec<crate::session::store::SessionSummary>, StoreError> {
            self.inner.history().await
        }
        async fn clear_all(&self) -> Result<(), StoreError> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_performs_immediate_save() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;

        assert!(store.load(session.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_saves_the_updated_slot_not_the_start_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;

        let qid = session.questions[0].id;
        let updated = manager::store_answer(&session, qid, "an evolving answer").unwrap();
        saver.update(&updated).await;

        tokio::time::sleep(TICK + Duration::from_secs(1)).await;

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(manager::get_answer(&loaded, qid), Some("an evolving answer"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_failure_does_not_kill_the_timer() {
        let store = Arc::new(FlakyStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        store.failing.store(true, Ordering::SeqCst);
        saver.start(&session).await;
        tokio::time::sleep(TICK + Duration::from_secs(1)).await;
        assert!(store.load(session.id).await.unwrap().is_none());

        // Backing store recovers; the next tick must still fire and save.
        store.failing.store(false, Ordering::SeqCst);
        tokio::time::sleep(TICK).await;
        assert!(store.load(session.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_future_saves_and_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;
        saver.stop().await;
        saver.stop().await;

        let updated =
            manager::store_answer(&session, session.questions[0].id, "never saved").unwrap();
        saver.update(&updated).await;
        tokio::time::sleep(TICK * 2).await;

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert!(loaded.answers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_current_adopts_and_rearms() {
        let store = Arc::new(MemoryStore::new());
        let session = fixture_session();
        store.save(&session).await.unwrap();

        let saver = AutoSaver::new(store.clone(), TICK);
        let restored = saver.restore_current().await.unwrap().unwrap();
        assert_eq!(restored.id, session.id);

        let updated =
            manager::store_answer(&restored, restored.questions[0].id, "post-restore").unwrap();
        saver.update(&updated).await;
        tokio::time::sleep(TICK + Duration::from_secs(1)).await;

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.answers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_with_no_pointer_returns_none() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        assert!(saver.restore_current().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_archives_clears_pointer_and_stops_timer() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;
        let done = manager::complete_session(&session);
        saver.complete(&done).await.unwrap();

        // Pointer cleared, yet the session itself stays loadable.
        assert!(store.load_current().await.unwrap().is_none());
        let archived = store.load(session.id).await.unwrap().unwrap();
        assert!(archived.is_complete);

        let history = store.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, session.id);

        // Timer is gone: nothing re-establishes the pointer.
        tokio::time::sleep(TICK * 2).await;
        assert!(store.load_current().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_propagates_save_failure_before_history() {
        let store = Arc::new(FlakyStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        store.failing.store(true, Ordering::SeqCst);
        let done = manager::complete_session(&session);
        let err = saver.complete(&done).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        // History must not be written when the final save failed.
        assert!(store.history().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_has_session_in_progress() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        assert!(!saver.has_session_in_progress().await);

        let session = fixture_session();
        store.save(&session).await.unwrap();
        assert!(saver.has_session_in_progress().await);

        let done = manager::complete_session(&session);
        store.save(&done).await.unwrap();
        assert!(!saver.has_session_in_progress().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_saves_active_and_stops() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;
        let updated =
            manager::store_answer(&session, session.questions[0].id, "last words").unwrap();
        saver.update(&updated).await;

        saver.cleanup().await;

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded.answers.len(), 1);

        // No further ticks after cleanup.
        store.clear_current_pointer().await.unwrap();
        tokio::time::sleep(TICK * 2).await;
        assert!(store.load_current().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_swallows_save_failure() {
        let store = Arc::new(FlakyStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let session = fixture_session();

        saver.start(&session).await;
        store.failing.store(true, Ordering::SeqCst);
        saver.cleanup().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_replaces_the_previous_timer() {
        let store = Arc::new(MemoryStore::new());
        let saver = AutoSaver::new(store.clone(), TICK);
        let first = fixture_session();
        let second = fixture_session();

        saver.start(&first).await;
        saver.start(&second).await;

        tokio::time::sleep(TICK + Duration::from_secs(1)).await;

        // Only the second session is the current one; the first timer died
        // with its replacement.
        let current = store.load_current().await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
    }
}

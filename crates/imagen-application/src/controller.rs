//! Controller sequencing user intents against the workbench and the store.

use crate::status::{OperationKind, OperationStatus, StatusBoard};
use imagen_core::session::EditContext;
use imagen_core::{
    BatchSize, ImageEditor, ImageGenerator, ImagenError, Result, Session, SessionStore, Workbench,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The single owner and single writer of the session.
///
/// The controller validates intent shape, invokes workbench and store
/// operations, and maps every outcome into the per-operation
/// pending/succeeded/failed signal the presentation layer polls. It
/// enforces UI-level single-flight: at most one of
/// {generation, edit, save, load} is pending at a time; an overlapping
/// intent is rejected immediately and does not disturb the pending
/// operation.
///
/// Locks are never held across a provider or store await, so reads
/// (`snapshot`, `status`) stay responsive while a call is in flight and
/// effects apply atomically on completion.
pub struct Controller {
    workbench: RwLock<Workbench>,
    statuses: RwLock<StatusBoard>,
    generator: Arc<dyn ImageGenerator>,
    editor: Arc<dyn ImageEditor>,
    store: Arc<dyn SessionStore>,
}

impl Controller {
    /// Creates a controller over an empty session.
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        editor: Arc<dyn ImageEditor>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            workbench: RwLock::new(Workbench::new()),
            statuses: RwLock::new(StatusBoard::default()),
            generator,
            editor,
            store,
        }
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    /// A stable, non-torn copy of the session for the presentation layer.
    pub async fn snapshot(&self) -> Session {
        self.workbench.read().await.session().clone()
    }

    /// The active edit selection, if any.
    pub async fn edit_selection(&self) -> Option<EditContext> {
        self.workbench.read().await.edit_selection().cloned()
    }

    /// The status of one operation.
    pub async fn status(&self, kind: OperationKind) -> OperationStatus {
        self.statuses.read().await.get(kind).clone()
    }

    /// All operation statuses at once.
    pub async fn statuses(&self) -> StatusBoard {
        self.statuses.read().await.clone()
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Generates a fresh batch of images from the prompt.
    pub async fn generate(&self, prompt: &str, count: BatchSize) -> Result<()> {
        self.begin_operation(OperationKind::Generation).await?;
        let result = self.run_generation(prompt, count).await;
        self.finish_operation(OperationKind::Generation, &result).await;
        result
    }

    /// Selects one current result for editing.
    pub async fn select_for_edit(&self, index: usize) -> Result<()> {
        self.workbench.write().await.select_for_edit(index)
    }

    /// Stages the in-progress edit instruction.
    pub async fn update_edit_instruction(&self, instruction: &str) -> Result<()> {
        self.workbench.write().await.update_edit_instruction(instruction)
    }

    /// Discards the edit selection. Idempotent; never fails.
    pub async fn cancel_edit(&self) {
        self.workbench.write().await.cancel_edit();
    }

    /// Submits the active selection for editing.
    pub async fn submit_edit(&self, instruction: &str) -> Result<()> {
        self.begin_operation(OperationKind::Edit).await?;
        let result = self.run_edit(instruction).await;
        self.finish_operation(OperationKind::Edit, &result).await;
        result
    }

    /// Persists the full session to the store.
    ///
    /// An active edit *selection* does not block saving; the selection is
    /// transient state and is not part of the snapshot.
    pub async fn save_session(&self) -> Result<()> {
        self.begin_operation(OperationKind::Save).await?;
        let result = self.run_save().await;
        self.finish_operation(OperationKind::Save, &result).await;
        result
    }

    /// Restores the session from the store, replacing the in-memory state
    /// wholesale. A failed load leaves the in-memory session untouched.
    pub async fn load_session(&self) -> Result<()> {
        self.begin_operation(OperationKind::Load).await?;
        let result = self.run_load().await;
        self.finish_operation(OperationKind::Load, &result).await;
        result
    }

    // ========================================================================
    // Sequencing internals
    // ========================================================================

    async fn run_generation(&self, prompt: &str, count: BatchSize) -> Result<()> {
        let request = {
            let mut workbench = self.workbench.write().await;
            workbench.begin_generation(prompt, count)?
        };

        let outcome = self
            .generator
            .generate(&request.prompt, request.count)
            .await;

        let mut workbench = self.workbench.write().await;
        workbench.complete_generation(outcome)
    }

    async fn run_edit(&self, instruction: &str) -> Result<()> {
        let request = {
            let mut workbench = self.workbench.write().await;
            workbench.begin_edit(instruction)?
        };

        let outcome = self.editor.edit(&request.image, &request.instruction).await;

        let mut workbench = self.workbench.write().await;
        workbench.complete_edit(outcome)
    }

    async fn run_save(&self) -> Result<()> {
        let snapshot = self.snapshot().await;
        self.store.save(&snapshot).await
    }

    async fn run_load(&self) -> Result<()> {
        let session = self.store.load().await?;
        let mut workbench = self.workbench.write().await;
        workbench.load_session(session)
    }

    /// Marks an operation pending, rejecting overlap with any other
    /// pending operation.
    async fn begin_operation(&self, kind: OperationKind) -> Result<()> {
        let mut statuses = self.statuses.write().await;
        if let Some(pending) = statuses.pending() {
            return Err(ImagenError::state(format!(
                "a {pending} operation is already pending"
            )));
        }
        statuses.set(kind, OperationStatus::Pending);
        Ok(())
    }

    async fn finish_operation(&self, kind: OperationKind, result: &Result<()>) {
        let status = match result {
            Ok(()) => {
                tracing::info!(operation = %kind, "operation succeeded");
                OperationStatus::Succeeded
            }
            Err(e) => {
                tracing::warn!(operation = %kind, reason = %e, "operation failed");
                OperationStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.statuses.write().await.set(kind, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use imagen_core::Image;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn img(tag: u8) -> Image {
        Image::new(vec![tag], "image/jpeg")
    }

    // Scripted ImageGenerator: pops one queued outcome per call.
    struct MockGenerator {
        responses: Mutex<VecDeque<Result<Vec<Image>>>>,
        calls: AtomicUsize,
    }

    impl MockGenerator {
        fn new(responses: Vec<Result<Vec<Image>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str, _count: BatchSize) -> Result<Vec<Image>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ImagenError::provider("no scripted response")))
        }
    }

    struct MockEditor {
        responses: Mutex<VecDeque<Result<Image>>>,
    }

    impl MockEditor {
        fn new(responses: Vec<Result<Image>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl ImageEditor for MockEditor {
        async fn edit(&self, _image: &Image, _instruction: &str) -> Result<Image> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ImagenError::provider("no scripted response")))
        }
    }

    // In-memory SessionStore sharing one slot across controllers.
    #[derive(Default)]
    struct MockStore {
        slot: Mutex<Option<Session>>,
    }

    #[async_trait]
    impl SessionStore for MockStore {
        async fn save(&self, session: &Session) -> Result<()> {
            *self.slot.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Session> {
            self.slot
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ImagenError::not_found("mock slot"))
        }
    }

    // ImageGenerator that blocks until a permit is released, to observe the
    // pending state from outside.
    struct GatedGenerator {
        gate: Semaphore,
    }

    #[async_trait]
    impl ImageGenerator for GatedGenerator {
        async fn generate(&self, _prompt: &str, _count: BatchSize) -> Result<Vec<Image>> {
            let _permit = self.gate.acquire().await.map_err(|_| {
                ImagenError::provider("gate closed")
            })?;
            Ok(vec![img(42)])
        }
    }

    fn make_controller(
        generator: Arc<dyn ImageGenerator>,
        editor: Arc<dyn ImageEditor>,
        store: Arc<dyn SessionStore>,
    ) -> Controller {
        Controller::new(generator, editor, store)
    }

    #[tokio::test]
    async fn test_generate_edit_save_load_scenario() {
        let generator = MockGenerator::new(vec![Ok(vec![img(1)])]);
        let editor = MockEditor::new(vec![Ok(img(2))]);
        let store = Arc::new(MockStore::default());

        let controller = make_controller(generator.clone(), editor, store.clone());

        controller
            .generate("A robot holding a red skateboard.", BatchSize::One)
            .await
            .unwrap();

        let session = controller.snapshot().await;
        assert_eq!(session.current_results, vec![img(1)]);
        assert_eq!(session.history.len(), 1);

        controller.select_for_edit(0).await.unwrap();
        controller
            .submit_edit("Change the skateboard to blue.")
            .await
            .unwrap();

        let session = controller.snapshot().await;
        assert_eq!(session.current_results, vec![img(2)]);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.images()[0], img(2));

        controller.save_session().await.unwrap();

        // A fresh controller over the same store restores everything.
        let restored = make_controller(
            MockGenerator::new(vec![]),
            MockEditor::new(vec![]),
            store,
        );
        restored.load_session().await.unwrap();

        let session = restored.snapshot().await;
        assert_eq!(session.prompt, "A robot holding a red skateboard.");
        assert_eq!(session.requested_count, BatchSize::One);
        assert_eq!(session.current_results.len(), 1);
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.images()[0], img(2));
        assert_eq!(
            restored.status(OperationKind::Load).await,
            OperationStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn test_failed_generation_reports_and_clears_results() {
        let generator = MockGenerator::new(vec![
            Ok(vec![img(1)]),
            Err(ImagenError::provider("quota exceeded")),
        ]);
        let controller = make_controller(
            generator,
            MockEditor::new(vec![]),
            Arc::new(MockStore::default()),
        );

        controller.generate("first", BatchSize::One).await.unwrap();
        let err = controller
            .generate("second", BatchSize::One)
            .await
            .unwrap_err();
        assert!(err.is_provider());

        let session = controller.snapshot().await;
        assert!(session.current_results.is_empty());
        assert_eq!(session.history.len(), 1);

        match controller.status(OperationKind::Generation).await {
            OperationStatus::Failed { reason } => assert!(reason.contains("quota exceeded")),
            other => panic!("expected failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_error_makes_no_provider_call() {
        let generator = MockGenerator::new(vec![Ok(vec![img(1)])]);
        let controller = make_controller(
            generator.clone(),
            MockEditor::new(vec![]),
            Arc::new(MockStore::default()),
        );

        let err = controller.generate("  ", BatchSize::One).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(generator.calls(), 0);
        assert!(matches!(
            controller.status(OperationKind::Generation).await,
            OperationStatus::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_declined_edit_keeps_results_and_reports_reason() {
        let generator = MockGenerator::new(vec![Ok(vec![img(1)])]);
        let editor = MockEditor::new(vec![Err(ImagenError::edit_declined(
            "The model could not edit the image as requested.",
        ))]);
        let controller = make_controller(generator, editor, Arc::new(MockStore::default()));

        controller.generate("one", BatchSize::One).await.unwrap();
        controller.select_for_edit(0).await.unwrap();

        let err = controller.submit_edit("impossible").await.unwrap_err();
        assert!(err.is_edit_declined());

        let session = controller.snapshot().await;
        assert_eq!(session.current_results, vec![img(1)]);
        assert_eq!(session.history.len(), 1);
        assert!(controller.edit_selection().await.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_leaves_session_untouched() {
        let generator = MockGenerator::new(vec![Ok(vec![img(1)])]);
        let controller = make_controller(
            generator,
            MockEditor::new(vec![]),
            Arc::new(MockStore::default()),
        );

        controller.generate("keep me", BatchSize::One).await.unwrap();
        let before = controller.snapshot().await;

        let err = controller.load_session().await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(controller.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_save_is_allowed_with_an_active_edit_selection() {
        let generator = MockGenerator::new(vec![Ok(vec![img(1)])]);
        let store = Arc::new(MockStore::default());
        let controller = make_controller(generator, MockEditor::new(vec![]), store.clone());

        controller.generate("one", BatchSize::One).await.unwrap();
        controller.select_for_edit(0).await.unwrap();
        controller.update_edit_instruction("draft").await.unwrap();

        controller.save_session().await.unwrap();

        // The selection is transient state and is not persisted.
        let saved = store.slot.lock().unwrap().clone().unwrap();
        assert_eq!(saved.current_results, vec![img(1)]);
    }

    #[tokio::test]
    async fn test_single_flight_rejects_overlapping_intents() {
        let gated = Arc::new(GatedGenerator {
            gate: Semaphore::new(0),
        });
        let controller = Arc::new(Controller::new(
            gated.clone(),
            MockEditor::new(vec![]),
            Arc::new(MockStore::default()),
        ));

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.generate("held", BatchSize::One).await })
        };

        // Wait for the spawned generation to become observable as pending.
        for _ in 0..100 {
            if controller.status(OperationKind::Generation).await.is_pending() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(controller.status(OperationKind::Generation).await.is_pending());

        // Every other intent is rejected while the generation is in flight.
        assert!(controller.save_session().await.unwrap_err().is_state());
        assert!(controller.load_session().await.unwrap_err().is_state());
        assert!(
            controller
                .generate("again", BatchSize::One)
                .await
                .unwrap_err()
                .is_state()
        );

        // The rejections did not disturb the pending status.
        assert!(controller.status(OperationKind::Generation).await.is_pending());

        gated.gate.add_permits(1);
        pending.await.unwrap().unwrap();

        assert_eq!(
            controller.status(OperationKind::Generation).await,
            OperationStatus::Succeeded
        );
        assert_eq!(controller.snapshot().await.current_results, vec![img(42)]);
    }

    #[tokio::test]
    async fn test_round_trip_through_the_file_store() {
        use imagen_infrastructure::JsonSessionStore;
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonSessionStore::new(temp_dir.path()).unwrap());

        let generator = MockGenerator::new(vec![Ok(vec![img(7), img(8), img(9)])]);
        let controller = make_controller(generator, MockEditor::new(vec![]), store.clone());

        controller.generate("three", BatchSize::Three).await.unwrap();
        controller.save_session().await.unwrap();

        let restored = Controller::new(
            MockGenerator::new(vec![]),
            MockEditor::new(vec![]),
            store,
        );
        restored.load_session().await.unwrap();

        assert_eq!(restored.snapshot().await, controller.snapshot().await);
    }
}

//! Workout editor and deletion.
//!
//! Store failures are reported generically; the notice names the action that
//! failed rather than the store's reason.

use fittrack_core::types::RecordId;
use fittrack_core::validation::validate_title;
use fittrack_core::{CoreError, WorkoutDraft, WorkoutPatch};
use fittrack_events::Notice;

use super::report_failure;
use crate::gate::{EditorTarget, Route};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(RecordId),
    Updated,
}

/// Form state of the workout editor screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutEditor {
    pub target: EditorTarget,
    pub title: String,
    pub description: String,
}

impl WorkoutEditor {
    /// Open the editor and show it.
    ///
    /// An existing workout is read from the store under the busy guard. If it
    /// is gone, or cannot be read, the form starts blank.
    pub async fn open(state: &AppState, target: EditorTarget) -> Self {
        state.gate.navigate(Route::WorkoutEditor(target.clone()));

        let mut editor = Self {
            target,
            title: String::new(),
            description: String::new(),
        };

        let EditorTarget::Existing(id) = &editor.target else {
            return editor;
        };

        let loaded = {
            let _busy = state.busy.acquire("load workout");
            state.workouts.get_by_id(id).await
        };

        match loaded {
            Ok(Some(record)) => {
                editor.title = record.title;
                editor.description = record.description;
            }
            Ok(None) => {
                tracing::warn!(%id, "Workout to edit no longer exists");
            }
            Err(e) => {
                tracing::error!(%id, error = %e, "Failed to load workout");
                state.notify(Notice::error("Error", "Failed to load workout"));
            }
        }
        editor
    }

    pub fn is_new(&self) -> bool {
        self.target == EditorTarget::New
    }

    /// Create or update the workout, then return to the previous screen.
    ///
    /// A new workout is owned by the signed-in user. Updates never touch the
    /// owner.
    pub async fn save(&self, state: &AppState) -> Result<SaveOutcome, CoreError> {
        if let Err(e) = validate_title(&self.title) {
            report_failure(state, "Validation", "save workout", &e);
            return Err(e);
        }

        let (result, failure) = {
            let _busy = state.busy.acquire("save workout");
            match &self.target {
                EditorTarget::New => {
                    let mut draft = WorkoutDraft::new(self.title.trim(), self.description.trim());
                    if let Some(identity) = state.session.current() {
                        draft = draft.owned_by(identity.uid);
                    }
                    let result = state.workouts.create(&draft).await.map(SaveOutcome::Created);
                    (result, "Failed to save workout")
                }
                EditorTarget::Existing(id) => {
                    let patch = WorkoutPatch::new(self.title.trim(), self.description.trim());
                    let result = state
                        .workouts
                        .update(id, patch)
                        .await
                        .map(|()| SaveOutcome::Updated);
                    (result, "Failed to update workout")
                }
            }
        };

        match result {
            Ok(outcome) => {
                let message = match outcome {
                    SaveOutcome::Created(_) => "Workout created successfully",
                    SaveOutcome::Updated => "Workout updated successfully",
                };
                state.notify(Notice::success("Success", message));
                state.gate.back();
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(editor = ?self.target, error = %e, "{}", failure);
                state.notify(Notice::error("Error", failure));
                Err(e)
            }
        }
    }
}

/// Delete a workout from the list screen.
pub async fn delete_workout(state: &AppState, id: &str) -> Result<(), CoreError> {
    let result = {
        let _busy = state.busy.acquire("delete workout");
        state.workouts.delete(id).await
    };

    match result {
        Ok(()) => {
            state.notify(Notice::success("Success", "Workout deleted successfully"));
            Ok(())
        }
        Err(e) => {
            tracing::error!(%id, error = %e, "Failed to delete workout");
            state.notify(Notice::error("Error", "Failed to delete workout"));
            Err(e)
        }
    }
}

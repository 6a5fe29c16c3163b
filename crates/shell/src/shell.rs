//! Command execution against the client state.
//!
//! [`Shell::execute`] runs one command and returns the lines to print.
//! Outcome notices (success and failure) are not part of the reply: they
//! travel over the event bus and are printed by [`render_event`].

use fittrack_client::flows::{
    delete_workout, sign_out, LoginForm, RegisterForm, SaveOutcome, WorkoutEditor,
};
use fittrack_client::{AppState, EditorTarget, GateState, Subscription};
use fittrack_core::WorkoutRecord;
use fittrack_events::{AppEvent, EventKind, NoticeLevel};

use crate::command::{Command, HELP};

/// What to print after a command, and whether to stop.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }

    fn none() -> Self {
        Self::default()
    }
}

pub struct Shell {
    state: AppState,
    /// Live workout subscription, held while signed in.
    subscription: Option<Subscription>,
}

impl Shell {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            subscription: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let reply = match command {
            Command::Register {
                email,
                password,
                confirm,
                full_name,
            } => {
                let form = RegisterForm {
                    full_name,
                    email,
                    password,
                    confirm_password: confirm,
                };
                let _ = form.submit(&self.state).await;
                Reply::none()
            }
            Command::Login { email, password } => {
                match LoginForm::new(email, password).submit(&self.state).await {
                    Ok(identity) => Reply::line(format!("Welcome back, {}!", identity.greeting_name())),
                    Err(_) => Reply::none(),
                }
            }
            Command::Logout => {
                if !self.state.session.is_signed_in() {
                    return Reply::line("Not signed in.");
                }
                sign_out(&self.state).await;
                Reply::none()
            }
            Command::Whoami => match self.state.session.current() {
                Some(identity) => Reply::line(format!(
                    "{} <{}> ({})",
                    identity.greeting_name(),
                    identity.email.as_deref().unwrap_or("no email"),
                    identity.uid
                )),
                None => Reply::line("Not signed in."),
            },
            Command::List => {
                if let Some(reply) = self.require_sign_in() {
                    return reply;
                }
                let workouts = self.state.workouts.mirror();
                if workouts.is_empty() {
                    Reply::line("No workouts yet. Add one with `add <title>`.")
                } else {
                    Reply {
                        lines: workouts.iter().map(summary).collect(),
                        quit: false,
                    }
                }
            }
            Command::Show { id } => {
                if let Some(reply) = self.require_sign_in() {
                    return reply;
                }
                match self.state.workouts.get_by_id(&id).await {
                    Ok(Some(record)) => Reply {
                        lines: vec![
                            format!("id:          {}", record.id),
                            format!("title:       {}", record.title),
                            format!("description: {}", record.description),
                        ],
                        quit: false,
                    },
                    Ok(None) => Reply::line(format!("No workout with id {id}.")),
                    Err(e) => Reply::line(e.user_message()),
                }
            }
            Command::Add { title, description } => {
                if let Some(reply) = self.require_sign_in() {
                    return reply;
                }
                let mut editor = WorkoutEditor::open(&self.state, EditorTarget::New).await;
                editor.title = title;
                editor.description = description;
                self.save(editor).await
            }
            Command::Edit {
                id,
                title,
                description,
            } => {
                if let Some(reply) = self.require_sign_in() {
                    return reply;
                }
                let mut editor = WorkoutEditor::open(&self.state, EditorTarget::Existing(id)).await;
                editor.title = title;
                if let Some(description) = description {
                    editor.description = description;
                }
                self.save(editor).await
            }
            Command::Remove { id } => {
                if let Some(reply) = self.require_sign_in() {
                    return reply;
                }
                let _ = delete_workout(&self.state, &id).await;
                Reply::none()
            }
            Command::Route => {
                let history: Vec<String> = self
                    .state
                    .gate
                    .history()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                Reply::line(history.join(" > "))
            }
            Command::Go(route) => Reply::line(format!("At {}", self.state.gate.navigate(route))),
            Command::Back => Reply::line(format!("At {}", self.state.gate.back())),
            Command::Help => Reply::line(HELP),
            Command::Quit => Reply {
                lines: Vec::new(),
                quit: true,
            },
        };

        self.sync_subscription().await;
        reply
    }

    /// Stop the live subscription, if any.
    pub async fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe().await;
        }
    }

    fn require_sign_in(&self) -> Option<Reply> {
        match self.state.gate.state() {
            GateState::Authenticated => None,
            GateState::Unauthenticated => Some(Reply::line("Please sign in first.")),
        }
    }

    async fn save(&self, editor: WorkoutEditor) -> Reply {
        match editor.save(&self.state).await {
            Ok(SaveOutcome::Created(id)) => Reply::line(format!("Saved as {id}.")),
            Ok(SaveOutcome::Updated) => Reply::line("Updated."),
            Err(_) => Reply::none(),
        }
    }

    /// Hold a subscription exactly while signed in.
    async fn sync_subscription(&mut self) {
        let signed_in = self.state.session.is_signed_in();
        match (self.subscription.is_some(), signed_in) {
            (false, true) => {
                let subscribed = self
                    .state
                    .workouts
                    .subscribe(|items| tracing::debug!(count = items.len(), "Workouts refreshed"))
                    .await;
                match subscribed {
                    Ok(subscription) => self.subscription = Some(subscription),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to subscribe to workouts");
                    }
                }
            }
            (true, false) => self.close().await,
            _ => {}
        }
    }
}

fn summary(record: &WorkoutRecord) -> String {
    if record.description.is_empty() {
        format!("{}  {}", record.id, record.title)
    } else {
        format!("{}  {} - {}", record.id, record.title, record.description)
    }
}

/// Console line for a bus event, if it is one the user should see.
pub fn render_event(event: &AppEvent) -> Option<String> {
    match &event.kind {
        EventKind::Notice(notice) => {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Error => "error",
            };
            Some(format!("[{tag}] {}: {}", notice.title, notice.message))
        }
        EventKind::SessionChanged { identity: None } => Some("Signed out.".to_string()),
        EventKind::SnapshotApplied { count, .. } => Some(format!("({count} workouts synced)")),
        _ => None,
    }
}

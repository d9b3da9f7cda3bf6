//! FlowController: applies one user action to a session.
//!
//! Reads the current step, calls the lookup or chat adapters it needs, and
//! appends the results to the transcript. Adapter outcomes are matched
//! exhaustively; only an [`ExternalResult::InvalidInput`] or
//! [`ExternalResult::ProviderError`] from a lookup keeps the session on its
//! current step.

use crate::error::FlowError;
use crate::llm::ChatResponder;
use crate::services::recommend::EXPERIENCE_LOOKUP_FAILED;
use crate::services::{Experience, ExternalResult, Recommender, Restaurant};

use super::model::Archetype;
use super::prompts;
use super::state::{ConversationState, Step};

/// Something the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Step 0: the name field was submitted.
    SubmitName(String),
    /// Step 1: archetype picked and location entered.
    SubmitPreferences {
        archetype: Archetype,
        location: String,
    },
    /// Step 2: the "show restaurants" button.
    ShowRestaurants,
    /// Free text from the send box.
    Chat(String),
}

impl UserAction {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubmitName(_) => "submit_name",
            Self::SubmitPreferences { .. } => "submit_preferences",
            Self::ShowRestaurants => "show_restaurants",
            Self::Chat(_) => "chat",
        }
    }
}

/// What an applied action did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    /// Number of transcript entries appended.
    pub appended: usize,
}

impl Transition {
    pub fn advanced(&self) -> bool {
        self.to > self.from
    }
}

/// Drives the step flow.
#[derive(Clone)]
pub struct FlowController {
    recommender: Recommender,
    responder: ChatResponder,
}

impl FlowController {
    pub fn new(recommender: Recommender, responder: ChatResponder) -> Self {
        Self {
            recommender,
            responder,
        }
    }

    /// Apply `action` to `state`.
    ///
    /// Actions that do not belong to the current step are rejected and leave
    /// `state` untouched. `Chat` is accepted in every step and never moves it.
    pub async fn apply(
        &self,
        state: &mut ConversationState,
        action: UserAction,
    ) -> Result<Transition, FlowError> {
        let from = state.step();
        let before = state.transcript().len();
        let kind = action.kind();

        tracing::info!(
            session = %state.session_id(),
            step = %from,
            action = kind,
            "Applying user action"
        );

        match (from, action) {
            (_, UserAction::Chat(text)) => self.chat(state, &text).await,
            (Step::CollectName, UserAction::SubmitName(name)) => Self::submit_name(state, &name),
            (Step::CollectPreferences, UserAction::SubmitPreferences { archetype, location }) => {
                self.submit_preferences(state, archetype, &location).await
            }
            (Step::ShowRestaurants, UserAction::ShowRestaurants) => {
                self.show_restaurants(state).await?
            }
            (step, _) => {
                tracing::warn!(step = %step, action = kind, "Action rejected for step");
                return Err(FlowError::UnexpectedAction { step, action: kind });
            }
        }

        let transition = Transition {
            from,
            to: state.step(),
            appended: state.transcript().len() - before,
        };
        if transition.advanced() {
            tracing::info!(
                session = %state.session_id(),
                from = %transition.from,
                to = %transition.to,
                "Step advanced"
            );
        }
        Ok(transition)
    }

    fn submit_name(state: &mut ConversationState, name: &str) {
        state.set_user_name(name);
        state.push_user(name);
        state.push_assistant(prompts::greeting(name));
        advance(state);
    }

    async fn submit_preferences(
        &self,
        state: &mut ConversationState,
        archetype: Archetype,
        location: &str,
    ) {
        state.push_user(archetype.label());

        let result = self.recommender.fetch_experience(location, archetype).await;
        tracing::info!(outcome = result.kind(), "Experience lookup finished");
        let reply = match &result {
            ExternalResult::Success(experience) => prompts::experience_found(experience),
            ExternalResult::ProviderError(_) => EXPERIENCE_LOOKUP_FAILED.to_string(),
            other => {
                let (name, address) = Experience::display_pair(other);
                prompts::experience_placeholder(&name, &address)
            }
        };
        state.push_assistant(reply);

        match result {
            ExternalResult::Success(experience) => {
                state.set_preferences(location.trim(), archetype);
                state.set_experience(Some(experience));
                advance(state);
            }
            ExternalResult::NotFound => {
                state.set_preferences(location.trim(), archetype);
                state.set_experience(None);
                advance(state);
            }
            ExternalResult::InvalidInput(reason) | ExternalResult::ProviderError(reason) => {
                tracing::warn!(location, %reason, "Experience lookup failed; staying on step");
            }
        }
    }

    async fn show_restaurants(&self, state: &mut ConversationState) -> Result<(), FlowError> {
        let step = state.step();
        let location = state
            .location()
            .map(str::to_string)
            .ok_or(FlowError::MissingField {
                step,
                field: "location",
            })?;
        let archetype = state.archetype().ok_or(FlowError::MissingField {
            step,
            field: "archetype",
        })?;

        let result = self
            .recommender
            .fetch_restaurants(&location, archetype)
            .await;
        tracing::info!(outcome = result.kind(), "Restaurant lookup finished");
        let lines = Restaurant::display_lines(&result);

        match result {
            ExternalResult::ProviderError(reason) => {
                tracing::warn!(%reason, "Restaurant lookup failed; staying on step");
                for line in lines {
                    state.push_assistant(line);
                }
            }
            ExternalResult::Success(_)
            | ExternalResult::NotFound
            | ExternalResult::InvalidInput(_) => {
                state.push_assistant(prompts::RESTAURANTS_INTRO);
                for line in &lines {
                    state.push_assistant(line.as_str());
                }
                state.set_restaurants(lines);
                advance(state);
            }
        }
        Ok(())
    }

    async fn chat(&self, state: &mut ConversationState, text: &str) {
        state.push_user(text);
        let transcript = state.transcript();
        let history = &transcript[..transcript.len() - 1];
        let reply = self.responder.reply(history, text).await;
        state.push_assistant(reply);
    }
}

/// Advance one step; the controller only calls this from steps that have a successor.
fn advance(state: &mut ConversationState) {
    if let Err(e) = state.advance() {
        tracing::warn!("Failed to advance step: {}", e);
    }
}

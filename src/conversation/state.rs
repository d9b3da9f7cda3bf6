//! Conversation state machine: tracks which step the session is in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::model::{Archetype, Speaker, TranscriptEntry};
use crate::services::Experience;

/// The steps of the recommendation flow.
///
/// Progresses linearly: CollectName → CollectPreferences → ShowRestaurants →
/// OpenChat. OpenChat has no successor; chat continues there indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CollectName,
    CollectPreferences,
    ShowRestaurants,
    OpenChat,
}

impl Step {
    /// Numeric index, 0 through 3.
    pub fn index(&self) -> u8 {
        match self {
            Self::CollectName => 0,
            Self::CollectPreferences => 1,
            Self::ShowRestaurants => 2,
            Self::OpenChat => 3,
        }
    }

    /// Next step in the linear progression, if any.
    pub fn next(&self) -> Option<Step> {
        match self {
            Self::CollectName => Some(Self::CollectPreferences),
            Self::CollectPreferences => Some(Self::ShowRestaurants),
            Self::ShowRestaurants => Some(Self::OpenChat),
            Self::OpenChat => None,
        }
    }

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        self.next() == Some(target)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::CollectName
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CollectName => "collect_name",
            Self::CollectPreferences => "collect_preferences",
            Self::ShowRestaurants => "show_restaurants",
            Self::OpenChat => "open_chat",
        };
        write!(f, "{s}")
    }
}

/// Everything one session knows. Lives only as long as the session.
///
/// The transcript is append-only and the step only moves forward; fields are
/// private so those hold for every caller.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    user_name: Option<String>,
    location: Option<String>,
    archetype: Option<Archetype>,
    step: Step,
    experience: Option<Experience>,
    restaurants: Vec<String>,
    transcript: Vec<TranscriptEntry>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            user_name: None,
            location: None,
            archetype: None,
            step: Step::default(),
            experience: None,
            restaurants: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn archetype(&self) -> Option<Archetype> {
        self.archetype
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn experience(&self) -> Option<&Experience> {
        self.experience.as_ref()
    }

    pub fn restaurants(&self) -> &[String] {
        &self.restaurants
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptEntry::new(Speaker::User, content));
    }

    pub(crate) fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript
            .push(TranscriptEntry::new(Speaker::Assistant, content));
    }

    pub(crate) fn set_user_name(&mut self, name: impl Into<String>) {
        self.user_name = Some(name.into());
    }

    pub(crate) fn set_preferences(&mut self, location: impl Into<String>, archetype: Archetype) {
        self.location = Some(location.into());
        self.archetype = Some(archetype);
    }

    pub(crate) fn set_experience(&mut self, experience: Option<Experience>) {
        self.experience = experience;
    }

    pub(crate) fn set_restaurants(&mut self, lines: Vec<String>) {
        self.restaurants = lines;
    }

    /// Move one step forward. Returns an error if already at the last step.
    pub(crate) fn advance(&mut self) -> Result<Step, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| format!("Already at final step {}", self.step))?;
        if !self.step.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.step, next));
        }
        self.step = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_cover_zero_through_three() {
        let steps = [
            Step::CollectName,
            Step::CollectPreferences,
            Step::ShowRestaurants,
            Step::OpenChat,
        ];
        let indices: Vec<u8> = steps.iter().map(Step::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn valid_and_invalid_transitions() {
        use Step::*;
        assert!(CollectName.can_transition_to(CollectPreferences));
        assert!(CollectPreferences.can_transition_to(ShowRestaurants));
        assert!(ShowRestaurants.can_transition_to(OpenChat));
        // Skip
        assert!(!CollectName.can_transition_to(ShowRestaurants));
        // Backward
        assert!(!OpenChat.can_transition_to(CollectName));
        // Self
        assert!(!OpenChat.can_transition_to(OpenChat));
    }

    #[test]
    fn display_matches_serde() {
        for step in [
            Step::CollectName,
            Step::CollectPreferences,
            Step::ShowRestaurants,
            Step::OpenChat,
        ] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }

    #[test]
    fn advance_walks_all_steps_then_stops() {
        let mut state = ConversationState::new();
        assert_eq!(state.step(), Step::CollectName);
        for expected in [Step::CollectPreferences, Step::ShowRestaurants, Step::OpenChat] {
            assert_eq!(state.advance().unwrap(), expected);
        }
        assert!(state.advance().is_err());
        assert_eq!(state.step(), Step::OpenChat);
    }

    #[test]
    fn transcript_keeps_insertion_order() {
        let mut state = ConversationState::new();
        state.push_user("one");
        state.push_assistant("two");
        state.push_user("three");
        let contents: Vec<&str> = state
            .transcript()
            .iter()
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(state.transcript()[1].speaker, Speaker::Assistant);
    }

    #[test]
    fn new_state_is_empty() {
        let state = ConversationState::new();
        assert!(state.user_name().is_none());
        assert!(state.location().is_none());
        assert!(state.archetype().is_none());
        assert!(state.experience().is_none());
        assert!(state.restaurants().is_empty());
        assert!(state.transcript().is_empty());
        assert_ne!(state.session_id(), ConversationState::new().session_id());
    }
}

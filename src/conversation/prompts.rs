//! Canned assistant lines and per-step input prompts.

use super::state::Step;
use crate::services::Experience;

pub const ASSISTANT_NAME: &str = "HART";

pub const TITLE: &str = "HART - Your Experience & Restaurant Recommender Chatbot";

/// Used in the greeting when the submitted name has no words.
const FALLBACK_FIRST_NAME: &str = "friend";

pub const RESTAURANTS_INTRO: &str = "Here are some restaurants near your experience:";

/// First whitespace-separated token of `name`, if any.
pub fn first_name(name: &str) -> Option<&str> {
    name.split_whitespace().next()
}

/// Assistant reply after the name is submitted.
pub fn greeting(name: &str) -> String {
    let first = first_name(name).unwrap_or(FALLBACK_FIRST_NAME);
    format!("Awesome, {first}! What type of experience are you in the mood for today?")
}

/// Assistant reply announcing a found experience.
pub fn experience_found(experience: &Experience) -> String {
    format!(
        "I found a great experience for you: {}, located at {}.",
        experience.name, experience.address
    )
}

/// Assistant reply when the experience lookup produced a placeholder.
pub fn experience_placeholder(name: &str, address: &str) -> String {
    format!("{name} ({address})")
}

/// Text shown above the input for each step.
pub fn step_prompt(step: Step) -> &'static str {
    match step {
        Step::CollectName => {
            "Hi, I'm HART! What's your name? Let's find your next great experience!"
        }
        Step::CollectPreferences => "Select your preferred archetype",
        Step::ShowRestaurants => "Show Restaurants Nearby",
        Step::OpenChat => "Type your message:",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_uses_first_token() {
        assert_eq!(
            greeting("Jane Doe"),
            "Awesome, Jane! What type of experience are you in the mood for today?"
        );
        assert_eq!(first_name("  Ada   Lovelace "), Some("Ada"));
    }

    #[test]
    fn greeting_tolerates_empty_name() {
        assert_eq!(first_name("   "), None);
        assert!(greeting("").starts_with("Awesome, friend!"));
    }

    #[test]
    fn experience_lines() {
        let exp = Experience {
            name: "Blue Note".into(),
            address: "131 W 3rd St".into(),
        };
        assert_eq!(
            experience_found(&exp),
            "I found a great experience for you: Blue Note, located at 131 W 3rd St."
        );
        assert_eq!(
            experience_placeholder("No experiences found.", "Unknown location"),
            "No experiences found. (Unknown location)"
        );
    }

    #[test]
    fn every_step_has_a_prompt() {
        assert!(step_prompt(Step::CollectName).contains("What's your name?"));
        assert_eq!(step_prompt(Step::OpenChat), "Type your message:");
    }
}

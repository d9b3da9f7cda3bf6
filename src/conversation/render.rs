//! Transcript rendering: pure projections of [`ConversationState`].

use super::model::{Speaker, TranscriptEntry};
use super::prompts::{self, ASSISTANT_NAME};
use super::state::{ConversationState, Step};

/// A transcript line ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub label: &'static str,
    pub text: String,
}

impl std::fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.text)
    }
}

fn label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You",
        Speaker::Assistant => ASSISTANT_NAME,
    }
}

/// Render a slice of transcript entries.
pub fn render_entries(entries: &[TranscriptEntry]) -> Vec<RenderedLine> {
    entries
        .iter()
        .map(|entry| RenderedLine {
            label: label(entry.speaker),
            text: entry.content.clone(),
        })
        .collect()
}

/// Render the whole transcript in chronological order.
pub fn render_transcript(state: &ConversationState) -> Vec<RenderedLine> {
    render_entries(state.transcript())
}

/// Status and input prompt for the current step.
pub fn render_prompt(state: &ConversationState) -> Vec<String> {
    let mut lines = Vec::new();
    if state.step() == Step::ShowRestaurants {
        let name = state
            .experience()
            .map(|e| e.name.as_str())
            .unwrap_or("No experiences found.");
        lines.push(format!("Recommended Experience: {name}"));
    }
    lines.push(prompts::step_prompt(state.step()).to_string());
    lines
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML summary of the session's recommendations, used as an email body.
pub fn itinerary_html(state: &ConversationState) -> String {
    let mut html = String::new();
    let greeting = state
        .user_name()
        .and_then(prompts::first_name)
        .map(|name| format!("<p>Hi {},</p>", escape_html(name)))
        .unwrap_or_else(|| "<p>Hi,</p>".to_string());
    html.push_str(&greeting);
    html.push_str("<p>Here is the plan HART put together for you.</p>");

    match state.experience() {
        Some(exp) => html.push_str(&format!(
            "<h2>Experience</h2><p><strong>{}</strong><br>{}</p>",
            escape_html(&exp.name),
            escape_html(&exp.address)
        )),
        None => html.push_str("<h2>Experience</h2><p>No experience selected yet.</p>"),
    }

    html.push_str("<h2>Restaurants</h2>");
    if state.restaurants().is_empty() {
        html.push_str("<p>No restaurants selected yet.</p>");
    } else {
        html.push_str("<ul>");
        for line in state.restaurants() {
            let item = line.trim_start_matches("- ");
            html.push_str(&format!(
                "<li>{}</li>",
                escape_html(item).replace('\n', "<br>")
            ));
        }
        html.push_str("</ul>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Experience;

    #[test]
    fn transcript_lines_are_labelled() {
        let mut state = ConversationState::new();
        state.push_user("Jane");
        state.push_assistant("Awesome, Jane!");
        let lines: Vec<String> = render_transcript(&state)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, vec!["You: Jane", "HART: Awesome, Jane!"]);
    }

    #[test]
    fn prompt_follows_step() {
        let mut state = ConversationState::new();
        assert_eq!(
            render_prompt(&state),
            vec![prompts::step_prompt(Step::CollectName).to_string()]
        );

        state.advance().unwrap();
        state.set_experience(Some(Experience {
            name: "Louvre".into(),
            address: "Paris".into(),
        }));
        state.advance().unwrap();
        let prompt = render_prompt(&state);
        assert_eq!(prompt[0], "Recommended Experience: Louvre");
        assert_eq!(prompt[1], "Show Restaurants Nearby");
    }

    #[test]
    fn itinerary_escapes_and_lists_restaurants() {
        let mut state = ConversationState::new();
        state.set_user_name("Jane Doe");
        state.set_experience(Some(Experience {
            name: "Tom & Jerry's <Arcade>".into(),
            address: "1 Fun St".into(),
        }));
        state.set_restaurants(vec!["- Diner - Rating: 4.5\n  Location: 2 Food Ave".into()]);

        let html = itinerary_html(&state);
        assert!(html.contains("<p>Hi Jane,</p>"));
        assert!(html.contains("Tom &amp; Jerry&#39;s &lt;Arcade&gt;"));
        assert!(html.contains("<li>Diner - Rating: 4.5<br>  Location: 2 Food Ave</li>"));
    }

    #[test]
    fn itinerary_without_recommendations() {
        let html = itinerary_html(&ConversationState::new());
        assert!(html.starts_with("<p>Hi,</p>"));
        assert!(html.contains("No experience selected yet."));
        assert!(html.contains("No restaurants selected yet."));
    }
}

//! Canned demo replies for credential-less deployments
//!
//! When no provider credential exists at all, generation degrades to a
//! random persona-flavored line plus a fixed disclaimer. This is a
//! deliberate, successful degraded mode, not an error state.

use rand::seq::SliceRandom;

use crate::personas::Persona;

/// Appended to every fallback reply so demo output is never mistaken for
/// a real generation.
pub const DEMO_DISCLAIMER: &str =
    "\n\n(Note: This is a demo response. Please configure your API keys for full AI functionality.)";

const EINSTEIN_LINES: &[&str] = &[
    "I find your question most intriguing! As I often say, 'Imagination is more important than knowledge.' What aspects of this topic spark your curiosity?",
    "Ah, this reminds me of my work on relativity. Everything is relative, including our perspectives on complex matters. What do you think?",
    "In my experience, the most beautiful thing we can experience is the mysterious. Your question touches upon something quite profound.",
];

const SHAKESPEARE_LINES: &[&str] = &[
    "Ah, what light through yonder window breaks? Your words do stir my very soul! Pray, tell me more of this matter that weighs upon thy mind.",
    "All the world's a stage, and your question plays a most interesting part. What scene shall we explore together?",
    "There are more things in heaven and earth than are dreamt of in our philosophy. Your inquiry opens new realms of thought!",
];

const DEFAULT_LINES: &[&str] = &[
    "That's a thought-provoking question! I'd love to explore it with you properly once I'm fully connected.",
    "An interesting topic indeed. Tell me more about what draws you to it?",
    "You raise a fine point. There is always more beneath the surface of such questions.",
];

/// Never touches the network; always succeeds.
#[derive(Debug, Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    pub fn new() -> Self {
        Self
    }

    /// Pick a canned line for the persona and append the demo disclaimer.
    /// The user's text does not influence the choice; it is accepted to
    /// keep the generation contract uniform.
    pub fn respond(&self, _last_user_text: &str, persona: &Persona) -> String {
        let lines = match persona.id {
            "einstein" => EINSTEIN_LINES,
            "shakespeare" => SHAKESPEARE_LINES,
            _ => DEFAULT_LINES,
        };

        let line = lines
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(DEFAULT_LINES[0]);

        tracing::info!(persona = persona.id, "using fallback response (no API keys configured)");

        format!("{}{}", line, DEMO_DISCLAIMER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personas::PersonaRegistry;

    #[test]
    fn test_reply_carries_disclaimer() {
        let responder = FallbackResponder::new();
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("einstein").unwrap();

        for _ in 0..10 {
            let reply = responder.respond("anything", &persona);
            assert!(reply.ends_with(DEMO_DISCLAIMER));
            let line = reply.strip_suffix(DEMO_DISCLAIMER).unwrap();
            assert!(EINSTEIN_LINES.contains(&line));
        }
    }

    #[test]
    fn test_persona_without_dedicated_lines_uses_default_set() {
        let responder = FallbackResponder::new();
        let persona = Persona {
            id: "curie",
            name: "Marie Curie",
            avatar: "",
            greeting: "Bonjour!",
            system_prompt: "You are Marie Curie.",
            background: vec!["Two Nobel Prizes"],
            examples: vec![],
        };

        let reply = responder.respond("hello", &persona);
        let line = reply.strip_suffix(DEMO_DISCLAIMER).unwrap();
        assert!(DEFAULT_LINES.contains(&line));
    }
}

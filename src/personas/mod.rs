//! Persona registry
//!
//! Personas are static configuration: display identity plus the prompt
//! material the providers build their system context from. The registry is
//! built once at startup and shared read-only by every session.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

/// A named character configuration driving prompt framing and display
/// identity. Immutable after load.
#[derive(Debug, Clone)]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub avatar: &'static str,
    pub greeting: &'static str,
    pub system_prompt: &'static str,
    /// Free-text background facts, joined into the system context.
    pub background: Vec<&'static str>,
    /// Optional few-shot exchanges appended to the system context.
    pub examples: Vec<ExampleExchange>,
}

#[derive(Debug, Clone)]
pub struct ExampleExchange {
    pub user: &'static str,
    pub reply: &'static str,
}

impl Persona {
    /// Assemble the system-level instruction both adapters send: the
    /// system prompt, the background facts as flat context, and any
    /// few-shot exchanges.
    pub fn system_context(&self) -> String {
        let mut context = format!(
            "{}\n\nBackground context: {}",
            self.system_prompt,
            self.background.join(", ")
        );

        if !self.examples.is_empty() {
            context.push_str("\n\nExample exchanges:");
            for example in &self.examples {
                context.push_str(&format!(
                    "\nUser: {}\n{}: {}",
                    example.user, self.name, example.reply
                ));
            }
        }

        context
    }
}

/// Display subset sent to clients in `persona-joined` events and the
/// `/api/personas` listing.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaCard {
    pub id: &'static str,
    pub name: &'static str,
    pub avatar: &'static str,
    pub greeting: &'static str,
}

impl From<&Persona> for PersonaCard {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id,
            name: persona.name,
            avatar: persona.avatar,
            greeting: persona.greeting,
        }
    }
}

/// Lookup table over the builtin personas.
#[derive(Debug)]
pub struct PersonaRegistry {
    personas: HashMap<&'static str, Arc<Persona>>,
}

impl PersonaRegistry {
    pub fn builtin() -> Self {
        let mut personas = HashMap::new();
        for persona in [einstein(), shakespeare()] {
            personas.insert(persona.id, Arc::new(persona));
        }
        Self { personas }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Persona>> {
        self.personas.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.personas.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn list(&self) -> Vec<PersonaCard> {
        let mut cards: Vec<PersonaCard> = self
            .personas
            .values()
            .map(|p| PersonaCard::from(p.as_ref()))
            .collect();
        cards.sort_by_key(|c| c.id);
        cards
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }
}

fn einstein() -> Persona {
    Persona {
        id: "einstein",
        name: "Albert Einstein",
        avatar: "/avatars/einstein.png",
        greeting: "Hello! I'm Albert Einstein. I'd be delighted to explore the \
                   mysteries of the universe with you. What shall we ponder today?",
        system_prompt: "You are Albert Einstein, the theoretical physicist. Speak \
                        warmly and with curiosity, weaving physics, philosophy and \
                        gentle humor into your answers. Use first person and stay in \
                        character at all times. Keep replies conversational rather \
                        than lecture-length.",
        background: vec![
            "Developed the theories of special and general relativity",
            "Received the 1921 Nobel Prize in Physics for the photoelectric effect",
            "Worked as a patent clerk in Bern while producing the 1905 papers",
            "Emigrated to the United States in 1933 and taught at Princeton",
            "Loved sailing and playing the violin",
        ],
        examples: vec![
            ExampleExchange {
                user: "What is time?",
                reply: "Ah, time! The distinction between past, present and future \
                        is only a stubbornly persistent illusion. Time is what keeps \
                        everything from happening at once, and yet it stretches and \
                        bends with motion and gravity.",
            },
            ExampleExchange {
                user: "Were you good at school?",
                reply: "Contrary to the legend, I did well in mathematics! But I had \
                        little patience for rote learning. Imagination, I found, is \
                        more important than knowledge.",
            },
        ],
    }
}

fn shakespeare() -> Persona {
    Persona {
        id: "shakespeare",
        name: "William Shakespeare",
        avatar: "/avatars/shakespeare.png",
        greeting: "Well met, good friend! William Shakespeare at thy service. \
                   What matters of heart, mind, or stage shall we discourse upon?",
        system_prompt: "You are William Shakespeare, playwright and poet of the \
                        Elizabethan age. Speak in a warm, theatrical register with \
                        period flavor, quoting or alluding to your own works where \
                        apt. Use first person and stay in character at all times. \
                        Keep replies conversational rather than soliloquy-length.",
        background: vec![
            "Wrote roughly 39 plays and 154 sonnets",
            "Born in Stratford-upon-Avon in 1564",
            "Part-owner of the Globe Theatre with the Lord Chamberlain's Men",
            "Coined or popularized hundreds of English words and phrases",
        ],
        examples: vec![
            ExampleExchange {
                user: "What is love?",
                reply: "Love is not love which alters when it alteration finds! It \
                        is an ever-fixed mark that looks on tempests and is never \
                        shaken. Though I confess, my plays find as much comedy in \
                        love as constancy.",
            },
            ExampleExchange {
                user: "Which of your plays is your favourite?",
                reply: "Thou askest a father to choose among his children! Yet I \
                        hold a tender spot for the Dane - poor Hamlet carries \
                        questions every soul must one day answer.",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = PersonaRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("einstein").is_some());
        assert!(registry.get("shakespeare").is_some());
        assert!(registry.get("newton").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_every_persona_has_prompt_material() {
        let registry = PersonaRegistry::builtin();
        for id in registry.ids() {
            let persona = registry.get(id).unwrap();
            assert!(!persona.system_prompt.is_empty());
            assert!(!persona.background.is_empty());
            assert!(!persona.greeting.is_empty());
        }
    }

    #[test]
    fn test_system_context_includes_background() {
        let registry = PersonaRegistry::builtin();
        let persona = registry.get("einstein").unwrap();
        let context = persona.system_context();
        assert!(context.starts_with(persona.system_prompt));
        assert!(context.contains("Background context: "));
        assert!(context.contains("Nobel Prize"));
        assert!(context.contains("Example exchanges:"));
    }

    #[test]
    fn test_list_is_display_subset() {
        let registry = PersonaRegistry::builtin();
        let cards = registry.list();
        assert_eq!(cards.len(), registry.len());
        let json = serde_json::to_string(&cards).unwrap();
        assert!(json.contains(r#""id":"einstein""#));
        assert!(!json.contains("system_prompt"));
    }
}

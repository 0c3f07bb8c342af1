//! Prompt builders. Pure functions from explicit inputs to a system/user pair.

use std::fmt::Write;

/// Separator placed between context passages in the answer prompt.
pub const CONTEXT_DELIMITER: &str = "\n\n";

pub const ANSWER_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that provides information about Myntra's Appliqué Design System components.
Use the provided context to answer questions accurately and include the following in your response:

1. Brief explanation of the component and its purpose
2. Key features and variations
3. ALWAYS include practical code examples showing how to use the component (if available in the context)
4. Any important props or API details

Your response should be clear, concise, and focus on practical usage with code examples highlighted in markdown format.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// A worked query/response pair shown to the routing model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingExample {
    pub query: String,
    pub response: String,
}

impl RoutingExample {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
        }
    }
}

#[must_use]
pub fn default_routing_examples() -> Vec<RoutingExample> {
    vec![
        RoutingExample::new("How do I create a button with an icon?", "button, icon"),
        RoutingExample::new("How do I show a modal dialog?", "modal"),
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct RoutingPromptConfig<'a> {
    pub components: &'a [String],
    pub examples: &'a [RoutingExample],
    pub query: &'a str,
}

#[must_use]
pub fn build_routing_prompt(config: &RoutingPromptConfig<'_>) -> PromptPair {
    let mut system = String::from(
        "You are a helpful assistant that routes user queries to the appropriate component collections.\n\
         Based on the user's query, determine which component(s) from the Appliqué design system would be most relevant.\n\
         Return ONLY the component names as a comma-separated list, without any other text.\n\n",
    );
    let _ = writeln!(system, "Available components: {}", config.components.join(", "));

    if !config.examples.is_empty() {
        system.push_str("\nFor example:\n");
        for example in config.examples {
            let _ = write!(
                system,
                "- Query: \"{}\"\n- Response: \"{}\"\n\n",
                example.query, example.response
            );
        }
    }

    PromptPair {
        system: system.trim_end().to_owned(),
        user: format!("Query: {}", config.query),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnswerPromptConfig<'a> {
    pub passages: &'a [&'a str],
    pub query: &'a str,
}

#[must_use]
pub fn build_answer_prompt(config: &AnswerPromptConfig<'_>) -> PromptPair {
    let context = config.passages.join(CONTEXT_DELIMITER);
    PromptPair {
        system: ANSWER_SYSTEM_PROMPT.to_owned(),
        user: format!(
            "Context information about Appliqué components:{CONTEXT_DELIMITER}{context}{CONTEXT_DELIMITER}Question: {}",
            config.query
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components() -> Vec<String> {
        vec!["button".into(), "icon".into(), "modal".into()]
    }

    #[test]
    fn routing_prompt_lists_every_component() {
        let comps = components();
        let examples = default_routing_examples();
        let prompt = build_routing_prompt(&RoutingPromptConfig {
            components: &comps,
            examples: &examples,
            query: "How do I open a dialog?",
        });
        assert!(prompt.system.contains("Available components: button, icon, modal"));
        assert!(prompt.system.contains("comma-separated list"));
        assert_eq!(prompt.user, "Query: How do I open a dialog?");
    }

    #[test]
    fn routing_prompt_embeds_examples() {
        let comps = components();
        let examples = default_routing_examples();
        let prompt = build_routing_prompt(&RoutingPromptConfig {
            components: &comps,
            examples: &examples,
            query: "q",
        });
        assert!(prompt.system.contains("- Query: \"How do I show a modal dialog?\""));
        assert!(prompt.system.contains("- Response: \"button, icon\""));
    }

    #[test]
    fn routing_prompt_without_examples() {
        let comps = components();
        let prompt = build_routing_prompt(&RoutingPromptConfig {
            components: &comps,
            examples: &[],
            query: "q",
        });
        assert!(!prompt.system.contains("For example"));
    }

    #[test]
    fn answer_prompt_joins_passages_before_question() {
        let prompt = build_answer_prompt(&AnswerPromptConfig {
            passages: &["Button docs", "Modal docs"],
            query: "How do I use a button?",
        });
        assert_eq!(prompt.system, ANSWER_SYSTEM_PROMPT);
        assert_eq!(
            prompt.user,
            "Context information about Appliqué components:\n\nButton docs\n\nModal docs\n\nQuestion: How do I use a button?"
        );
    }

    #[test]
    fn answer_system_prompt_sets_shape() {
        assert!(ANSWER_SYSTEM_PROMPT.contains("Key features"));
        assert!(ANSWER_SYSTEM_PROMPT.contains("code examples"));
        assert!(ANSWER_SYSTEM_PROMPT.contains("props or API details"));
    }
}

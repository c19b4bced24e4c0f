//! System prompt templates for the agents.

use super::{AgentProfile, FINAL_ANSWER};
use crate::tools::Toolset;

/// Build the system prompt with tool definitions.
pub fn build_system_prompt(profile: &AgentProfile, tools: &Toolset) -> String {
    let tool_descriptions = tools
        .descriptions()
        .iter()
        .map(|(name, description)| format!("- **{name}**: {description}"))
        .chain(std::iter::once(format!(
            "- **{FINAL_ANSWER}**: Provides a final answer to the given problem."
        )))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{instructions}

## Tools

You can call the following tools:
{tool_descriptions}

## Working method

Think step by step. Call tools to gather facts instead of guessing. Tool results
that start with "Error" describe what went wrong; adjust the arguments or pick a
different tool. When you have enough information, call `{FINAL_ANSWER}` with your
complete answer."#,
        instructions = profile.instructions.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_tools_and_final_answer() {
        let profile = AgentProfile {
            name: "tester",
            description: "test agent",
            instructions: "  You test things.\n",
        };

        let prompt = build_system_prompt(&profile, &Toolset::new());

        assert!(prompt.starts_with("You test things.\n\n## Tools"));
        assert!(prompt.contains("- **final_answer**: Provides a final answer"));
        assert!(prompt.ends_with("with your\ncomplete answer."));
    }
}

//! Prompt rendering for planning and format-hint retries.

use std::sync::LazyLock;

use anyhow::Result;
use minijinja::{Environment, context};

const RETRY_TEMPLATE: &str = include_str!("prompts/retry.md");
const META_TEMPLATE: &str = include_str!("prompts/meta.md");

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("retry", RETRY_TEMPLATE)
            .expect("retry template should be valid");
        env.add_template("meta", META_TEMPLATE)
            .expect("meta template should be valid");
        Self { env }
    }
}

static ENGINE: LazyLock<PromptEngine> = LazyLock::new(PromptEngine::new);

/// Build the prompt for a re-ask after unparseable output. The previous
/// output and the original prompt are embedded verbatim so the agent can
/// see both what it said and what was actually asked.
pub fn retry_prompt(original_prompt: &str, previous_output: &str) -> Result<String> {
    let template = ENGINE.env.get_template("retry")?;
    let rendered = template.render(context! {
        original_prompt => original_prompt,
        previous_output => previous_output,
    })?;
    Ok(rendered)
}

/// Build the planning prompt that asks an agent to propose new tasks.
pub fn meta_prompt(
    goal: &str,
    readme: Option<&str>,
    existing_tasks: Option<&str>,
) -> Result<String> {
    let template = ENGINE.env.get_template("meta")?;
    let rendered = template.render(context! {
        goal => goal.trim(),
        readme => readme.map(str::trim).filter(|s| !s.is_empty()),
        existing_tasks => existing_tasks.map(str::trim).filter(|s| !s.is_empty()),
    })?;
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_prompt_embeds_both_inputs_verbatim() {
        let rendered = retry_prompt("original ask", "garbled <answer>").expect("render");
        assert!(rendered.contains("original ask"));
        assert!(rendered.contains("garbled <answer>"));
    }

    #[test]
    fn retry_prompt_shows_the_expected_format() {
        let rendered = retry_prompt("p", "o").expect("render");
        assert!(rendered.contains("```markdown"));
        assert!(rendered.contains("## Tasks"));
        assert!(rendered.contains("- [ ]"));
    }

    #[test]
    fn meta_prompt_includes_goal_and_optional_sections() {
        let rendered = meta_prompt(
            "Ship v1",
            Some("A CLI tool."),
            Some("## Existing Tasks\n\n### Pending\n\n- [ ] Old task"),
        )
        .expect("render");
        assert!(rendered.contains("Ship v1"));
        assert!(rendered.contains("A CLI tool."));
        assert!(rendered.contains("Old task"));
    }

    #[test]
    fn meta_prompt_example_format_round_trips_through_the_parser() {
        // The format the template teaches must be the format the parser
        // reads: one fenced block, bare key: value constraint lines.
        let rendered = meta_prompt("Ship v1", None, None).expect("render");
        let example = crate::core::extract::extract(&rendered).expect("example block");
        let directive = crate::core::directive::parse(example).expect("parse example");
        assert_eq!(directive.tasks, vec!["First task", "Second task"]);
        assert_eq!(directive.constraints.security_mode.as_deref(), Some("strict"));
        assert_eq!(
            directive.constraints.allow_paths.as_deref(),
            Some("src/,tests/")
        );
        assert_eq!(directive.constraints.internet_access, Some(false));
    }

    #[test]
    fn meta_prompt_omits_empty_sections() {
        let rendered = meta_prompt("Ship v1", None, Some("   ")).expect("render");
        assert!(!rendered.contains("## README.md"));
        assert!(!rendered.contains("Existing Tasks"));
    }
}

//! Prompt hardening.

use std::path::Path;

const REQUIREMENTS: &str = "\
GUARDRAIL REQUIREMENTS:
- MUST provide specific, concrete implementations
- MUST use actual tools when claiming to use them
- MUST reference provided templates/examples explicitly
- MUST verify each step works before proceeding
- NO vague promises like \"I'll make it beautiful\"
- NO claims without corresponding code/actions

VERIFICATION REQUIRED:
- Show actual file changes
- Demonstrate functionality works
- Provide concrete examples
- Test the implementation

CRITICAL: Do exactly what is requested, not what you think might be better.
";

/// Append the guardrail requirements to `prompt`.
///
/// When `template` names an existing file, a block pointing the model at it
/// is appended as well. A missing template is silently left out.
pub fn enhance_prompt(prompt: &str, template: Option<&Path>) -> String {
    let mut enhanced = format!("{}\n\n{}", prompt.trim_end(), REQUIREMENTS);

    if let Some(template) = template.filter(|t| t.exists()) {
        enhanced.push_str(&format!(
            "\nTEMPLATE REFERENCE: {}\n\
             - Use specific elements from this template\n\
             - Copy styling, structure, and patterns\n\
             - Do not create generic alternatives\n",
            template.display()
        ));
    }

    enhanced
}

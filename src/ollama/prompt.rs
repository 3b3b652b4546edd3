//! Prompt construction for error analysis

/// System prompt establishing the assistant's role and tone.
pub const SYSTEM_PROMPT: &str = "You are triage, an expert command-line error fixer. \
Your job is to analyze error messages and provide helpful, actionable fixes. \
Be concise, practical, and focus on the most likely solution. \
Provide commands the user can copy and run immediately.";

/// Build the analysis prompt for one error, with optional command context.
pub fn build_prompt(error_output: &str, command_context: &str) -> String {
    let mut prompt = format!(
        "Analyze this command-line error and provide a fix:\n\n\
         Error Output:\n```\n{error_output}\n```\n"
    );

    if !command_context.trim().is_empty() {
        prompt.push_str(&format!("\nCommand Context: {command_context}\n"));
    }

    prompt.push_str(
        "\nProvide a brief, actionable fix that the user can execute immediately.\n\
         Focus on the most likely solution. Be concise.",
    );

    prompt
}

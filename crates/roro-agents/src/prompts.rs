use roro_models::{AgentProfile, ChatMessage, Role};

use crate::team::MemberReport;

/// Render an agent profile into a system prompt: description first, then
/// the instruction list.
pub fn system_prompt(profile: &AgentProfile) -> String {
    let mut prompt = profile.description.trim().to_string();

    if !profile.instructions.is_empty() {
        prompt.push_str("\n\nInstructions:\n");
        for instruction in &profile.instructions {
            prompt.push_str("- ");
            prompt.push_str(instruction);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nRespond in GitHub-flavored markdown.");
    prompt
}

/// Render a conversation history into the CLI's single-prompt form.
///
/// A lone user message passes through unchanged; longer histories become a
/// labeled transcript ending at the latest user message.
pub fn render_transcript(history: &[ChatMessage]) -> String {
    if let [only] = history {
        if only.role == Role::User {
            return only.content.clone();
        }
    }

    let mut transcript = String::new();
    for message in history {
        let label = match message.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        transcript.push_str(label);
        transcript.push_str(": ");
        transcript.push_str(&message.content);
        transcript.push_str("\n\n");
    }
    transcript
        .push_str("Continue the conversation as the assistant. Reply to the latest user message.");
    transcript
}

/// The lead's synthesis prompt over the member reports.
pub fn synthesis_prompt(question: &str, reports: &[MemberReport]) -> String {
    let mut prompt = format!("Question under assessment: {question}\n\nAnalyst reports:\n");

    for report in reports {
        prompt.push_str("\n## ");
        prompt.push_str(&report.agent_name);
        prompt.push('\n');
        match &report.answer {
            Some(answer) => {
                prompt.push_str(answer);
                prompt.push('\n');
            }
            None => {
                prompt.push_str("(no report: ");
                prompt.push_str(report.error.as_deref().unwrap_or("unknown failure"));
                prompt.push_str(")\n");
            }
        }
    }

    prompt.push_str("\nSynthesize the reports into one final assessment, following your instructions.");
    prompt
}

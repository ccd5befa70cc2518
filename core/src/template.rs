//! Gemma turn template used to render a conversation into a prompt.

use crate::types::{Turn, ROLE_ASSISTANT, ROLE_SYSTEM};

pub const START_OF_TURN: &str = "<start_of_turn>";
pub const END_OF_TURN: &str = "<end_of_turn>";

/// Render `messages` as a Gemma chat prompt ending with an open model turn.
///
/// Gemma has no system role, so system turns are collected and prefixed to
/// the next user turn. Roles other than `assistant` and `system` render as
/// user turns.
pub fn format_prompt(messages: &[Turn]) -> String {
    let mut prompt = String::new();
    let mut pending_system = String::new();

    for msg in messages {
        match msg.role.as_str() {
            ROLE_SYSTEM => {
                if !pending_system.is_empty() {
                    pending_system.push_str("\n\n");
                }
                pending_system.push_str(&msg.content);
            }
            ROLE_ASSISTANT => push_turn(&mut prompt, "model", &msg.content),
            _ => {
                if pending_system.is_empty() {
                    push_turn(&mut prompt, "user", &msg.content);
                } else {
                    let merged = format!("{}\n\n{}", pending_system, msg.content);
                    pending_system.clear();
                    push_turn(&mut prompt, "user", &merged);
                }
            }
        }
    }

    if !pending_system.is_empty() {
        push_turn(&mut prompt, "user", &pending_system);
    }

    prompt.push_str(START_OF_TURN);
    prompt.push_str("model\n");
    prompt
}

fn push_turn(prompt: &mut String, role: &str, content: &str) {
    prompt.push_str(START_OF_TURN);
    prompt.push_str(role);
    prompt.push('\n');
    prompt.push_str(content);
    prompt.push_str(END_OF_TURN);
    prompt.push('\n');
}

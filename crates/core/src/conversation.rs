//! Conversation domain types.
//!
//! A `ConversationContext` is the provider-agnostic structure every adapter
//! translates from: one optional system prompt plus an ordered list of
//! role-tagged messages, each holding ordered content parts. Built fresh per
//! request by the prompt assembler and owned by the caller.

use crate::content::ContentPart;
use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions. The assembler never emits system-role messages
    /// (it uses the dedicated `system_prompt` field), but the wire formats
    /// accept them, so translation must handle the variant.
    System,
    /// The end user.
    User,
    /// The AI assistant.
    Assistant,
}

/// A single message: a role plus ordered content parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatMessage {
    /// Create a user message from content parts.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    /// Create a user message holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentPart::text(text)])
    }

    /// Create an assistant message holding a single text part.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![ContentPart::text(text)],
        }
    }

    /// Concatenation of all text parts (images skipped).
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A provider-agnostic conversation, ready for dispatch.
///
/// Invariant: at most one system prompt; message order is preserved end to
/// end through every provider translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConversationContext {
    /// The single system prompt, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Ordered messages.
    pub messages: Vec<ChatMessage>,
}

impl ConversationContext {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system prompt (builder style).
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_text_message() {
        let msg = ChatMessage::user_text("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");
    }

    #[test]
    fn text_skips_images() {
        let msg = ChatMessage::user(vec![
            ContentPart::text("before "),
            ContentPart::image("https://example.com/x.png"),
            ContentPart::text("after"),
        ]);
        assert_eq!(msg.text(), "before after");
    }

    #[test]
    fn context_preserves_message_order() {
        let mut ctx = ConversationContext::new().with_system("Be helpful");
        ctx.push(ChatMessage::user_text("first"));
        ctx.push(ChatMessage::assistant_text("second"));
        ctx.push(ChatMessage::user_text("third"));

        assert_eq!(ctx.system_prompt.as_deref(), Some("Be helpful"));
        let texts: Vec<String> = ctx.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut ctx = ConversationContext::new().with_system("sys");
        ctx.push(ChatMessage::user_text("hi"));
        let json = serde_json::to_string(&ctx).unwrap();
        let back: ConversationContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }
}

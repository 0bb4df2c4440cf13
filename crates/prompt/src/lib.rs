//! Prompt assembly: playbook + content parts → one ConversationContext.
//!
//! The assembler merges a selected playbook's system prompt, the caller's
//! ordered content parts (text and opaque image descriptors from the
//! capture/OCR layers), and optional instructions into a single
//! provider-agnostic conversation. Deterministic, side-effect-free, total.

use sidecar_core::content::ContentPart;
use sidecar_core::conversation::{ChatMessage, ConversationContext};
use sidecar_core::playbook::Playbook;

/// The prompt assembler. Stateless — create one and reuse it.
#[derive(Debug, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble one conversation:
    ///
    /// - system prompt copied verbatim from the playbook (exactly one);
    /// - a single user message holding `parts` in caller-given order,
    ///   followed by the optional `instructions` text,
    ///   followed by format directives derived from the playbook's
    ///   response-format flags.
    ///
    /// Image parts pass through untouched — validation and encoding belong
    /// to the capture collaborator.
    pub fn assemble(
        &self,
        playbook: &Playbook,
        parts: Vec<ContentPart>,
        instructions: Option<&str>,
    ) -> ConversationContext {
        let mut parts = parts;

        if let Some(text) = instructions {
            if !text.is_empty() {
                parts.push(ContentPart::text(text));
            }
        }

        if let Some(directives) = Self::format_directives(playbook) {
            parts.push(ContentPart::text(directives));
        }

        ConversationContext {
            system_prompt: Some(playbook.system_prompt.clone()),
            messages: vec![ChatMessage::user(parts)],
        }
    }

    /// Extra instruction sentences requested by the response-format flags.
    fn format_directives(playbook: &Playbook) -> Option<String> {
        let format = &playbook.response_format;
        let mut sentences = Vec::new();

        if format.use_star_method {
            sentences.push(
                "Structure the answer using the STAR method (Situation, Task, Action, Result).",
            );
        }
        if format.include_code {
            sentences.push("Include a complete, working code solution.");
        }
        if format.include_complexity {
            sentences.push("State the time and space complexity.");
        }

        if sentences.is_empty() {
            None
        } else {
            Some(sentences.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_playbooks::{catalog, PlaybookRegistry};

    fn assemble_with(id: &str, parts: Vec<ContentPart>) -> ConversationContext {
        let registry = PlaybookRegistry::new();
        PromptAssembler::new().assemble(registry.get(id), parts, None)
    }

    #[test]
    fn system_prompt_copied_verbatim() {
        let registry = PlaybookRegistry::new();
        let playbook = registry.get(catalog::SALES_CALL);
        let ctx = PromptAssembler::new().assemble(playbook, vec![], None);
        assert_eq!(ctx.system_prompt.as_deref(), Some(playbook.system_prompt.as_str()));
    }

    #[test]
    fn exactly_one_user_message_with_parts_in_order() {
        let parts = vec![
            ContentPart::text("Clipboard Content:\nfn main() {}"),
            ContentPart::image("data:image/png;base64,AAAA"),
            ContentPart::text("What does this do?"),
        ];
        let ctx = assemble_with(catalog::GENERAL_MEETING, parts.clone());

        assert_eq!(ctx.messages.len(), 1);
        // Caller parts lead, in the given order.
        assert_eq!(ctx.messages[0].parts[..3], parts[..]);
    }

    #[test]
    fn instructions_appended_after_caller_parts() {
        let registry = PlaybookRegistry::new();
        let ctx = PromptAssembler::new().assemble(
            registry.get(catalog::GENERAL_MEETING),
            vec![ContentPart::text("context")],
            Some("Answer the user's query using the provided context."),
        );
        let msg = &ctx.messages[0];
        assert_eq!(msg.parts.len(), 2);
        assert_eq!(
            msg.parts[1],
            ContentPart::text("Answer the user's query using the provided context.")
        );
    }

    #[test]
    fn technical_playbook_appends_code_and_complexity_directives() {
        let ctx = assemble_with(
            catalog::TECHNICAL_INTERVIEW,
            vec![ContentPart::text("Reverse a linked list")],
        );
        let trailing = ctx.messages[0].text();
        assert!(trailing.contains("working code solution"));
        assert!(trailing.contains("time and space complexity"));
        assert!(!trailing.contains("STAR"));
    }

    #[test]
    fn behavioral_playbook_appends_star_directive() {
        let ctx = assemble_with(
            catalog::BEHAVIORAL_INTERVIEW,
            vec![ContentPart::text("Tell me about a conflict")],
        );
        let trailing = ctx.messages[0].text();
        assert!(trailing.contains("STAR method"));
        assert!(!trailing.contains("code solution"));
    }

    #[test]
    fn general_playbook_appends_nothing() {
        let parts = vec![ContentPart::text("just this")];
        let ctx = assemble_with(catalog::GENERAL_MEETING, parts.clone());
        assert_eq!(ctx.messages[0].parts, parts);
    }

    #[test]
    fn image_parts_pass_through_untouched() {
        let image = ContentPart::image("https://example.com/slide.png");
        let ctx = assemble_with(catalog::VC_PITCH, vec![image.clone()]);
        assert!(ctx.messages[0].parts.contains(&image));
    }

    #[test]
    fn empty_instructions_ignored() {
        let registry = PlaybookRegistry::new();
        let ctx = PromptAssembler::new().assemble(
            registry.get(catalog::GENERAL_MEETING),
            vec![ContentPart::text("x")],
            Some(""),
        );
        assert_eq!(ctx.messages[0].parts.len(), 1);
    }
}

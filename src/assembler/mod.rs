use std::str::FromStr;

use crate::models::chat::{ ChatTurn, OutboundMessage, Role };

/// How retrieved context reaches the model. Both strategies ship in the
/// product line, selected by configuration rather than special-cased code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectionMode {
    /// Context appended as a trailing system-role message after the history
    /// window, only when non-empty.
    Sidecar,
    /// Context wrapped together with the current question into the final
    /// user-role message.
    Inline,
}

impl FromStr for InjectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sidecar" => Ok(InjectionMode::Sidecar),
            "inline" => Ok(InjectionMode::Inline),
            other => Err(format!(
                "Unsupported context mode '{}' (expected 'sidecar' or 'inline')",
                other
            )),
        }
    }
}

/// Builds the ordered message list sent to the completion client: persona,
/// then the windowed history (whose final entry is the just-appended user
/// turn), then the retrieved context per the configured mode.
#[derive(Clone, Debug)]
pub struct RequestAssembler {
    mode: InjectionMode,
}

impl RequestAssembler {
    pub fn new(mode: InjectionMode) -> Self {
        Self { mode }
    }

    /// An empty `context` means "no context available": no context message
    /// is emitted in sidecar mode and the raw question is kept in inline
    /// mode. An empty context block is never sent.
    pub fn assemble(
        &self,
        persona: &str,
        window: &[ChatTurn],
        context: &str,
    ) -> Vec<OutboundMessage> {
        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(OutboundMessage::new(Role::System, persona));

        match self.mode {
            InjectionMode::Sidecar => {
                messages.extend(window.iter().map(OutboundMessage::from));
                if !context.is_empty() {
                    messages.push(OutboundMessage::new(Role::System, context));
                }
            }
            InjectionMode::Inline => {
                let (last, rest) = match window.split_last() {
                    Some((last, rest)) => (Some(last), rest),
                    None => (None, window),
                };
                messages.extend(rest.iter().map(OutboundMessage::from));
                if let Some(last) = last {
                    let content = if context.is_empty() {
                        last.content.clone()
                    } else {
                        format!("<CONTEXT>\n{}\n</CONTEXT>\n{}", context, last.content)
                    };
                    messages.push(OutboundMessage::new(last.role, content));
                }
            }
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERSONA: &str = "You are a debate coach.";

    fn window(turns: &[(Role, &str)]) -> Vec<ChatTurn> {
        turns
            .iter()
            .map(|(role, content)| ChatTurn::new(*role, *content))
            .collect()
    }

    #[test]
    fn persona_always_leads() {
        let assembler = RequestAssembler::new(InjectionMode::Sidecar);
        let messages = assembler.assemble(PERSONA, &window(&[(Role::User, "hi")]), "");
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, PERSONA);
    }

    #[test]
    fn sidecar_appends_context_as_system_message() {
        let assembler = RequestAssembler::new(InjectionMode::Sidecar);
        let messages = assembler.assemble(
            PERSONA,
            &window(&[(Role::User, "What is topicality?")]),
            "Topicality requires a plan text.",
        );

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::System);
        assert_eq!(last.content, "Topicality requires a plan text.");
    }

    #[test]
    fn sidecar_omits_empty_context_entirely() {
        let assembler = RequestAssembler::new(InjectionMode::Sidecar);
        let messages =
            assembler.assemble(PERSONA, &window(&[(Role::User, "What is topicality?")]), "");

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.content.is_empty()));
    }

    #[test]
    fn inline_wraps_context_and_question_into_final_user_message() {
        let assembler = RequestAssembler::new(InjectionMode::Inline);
        let messages = assembler.assemble(
            PERSONA,
            &window(&[
                (Role::User, "earlier question"),
                (Role::Assistant, "earlier answer"),
                (Role::User, "What is topicality?"),
            ]),
            "Topicality requires a plan text.",
        );

        assert_eq!(messages.len(), 4);
        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(
            last.content,
            "<CONTEXT>\nTopicality requires a plan text.\n</CONTEXT>\nWhat is topicality?"
        );
        // Earlier turns pass through untouched.
        assert_eq!(messages[1].content, "earlier question");
        assert_eq!(messages[2].content, "earlier answer");
    }

    #[test]
    fn inline_keeps_raw_question_when_context_is_empty() {
        let assembler = RequestAssembler::new(InjectionMode::Inline);
        let messages =
            assembler.assemble(PERSONA, &window(&[(Role::User, "What is topicality?")]), "");

        let last = messages.last().unwrap();
        assert_eq!(last.content, "What is topicality?");
    }

    #[test]
    fn history_window_order_is_preserved() {
        let assembler = RequestAssembler::new(InjectionMode::Sidecar);
        let messages = assembler.assemble(
            PERSONA,
            &window(&[
                (Role::User, "q1"),
                (Role::Assistant, "a1"),
                (Role::User, "q2"),
            ]),
            "",
        );

        let contents: Vec<&str> = messages[1..].iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2"]);
    }

    #[test]
    fn mode_parses_from_string() {
        assert_eq!("sidecar".parse::<InjectionMode>().unwrap(), InjectionMode::Sidecar);
        assert_eq!("Inline".parse::<InjectionMode>().unwrap(), InjectionMode::Inline);
        assert!("both".parse::<InjectionMode>().is_err());
    }
}

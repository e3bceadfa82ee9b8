//! Conversation state for a single agent run

use crate::agent::types::ConversationTurn;

/// Append-only sequence of turns, owned by the agent loop for one run
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<ConversationTurn>,
}

impl ConversationState {
    /// Start a run from the user's question
    pub fn new(question: impl Into<String>) -> Self {
        ConversationState {
            turns: vec![ConversationTurn::human(question)],
        }
    }

    /// Append a turn
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Current turns, in order
    pub fn snapshot(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Consume the state, yielding its turns
    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::AssistantMessage;

    #[test]
    fn test_seeded_with_question() {
        let state = ConversationState::new("What is 5 + 3?");
        assert_eq!(state.len(), 1);
        assert_eq!(state.snapshot()[0], ConversationTurn::human("What is 5 + 3?"));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut state = ConversationState::new("q");
        state.append(ConversationTurn::assistant(AssistantMessage::text("a")));
        state.append(ConversationTurn::ToolObservation {
            tool_name: "add".into(),
            call_id: "call_0_0".into(),
            text: "8".into(),
        });

        let texts: Vec<&str> = state.snapshot().iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["q", "a", "8"]);
        assert_eq!(state.into_turns().len(), 3);
    }
}

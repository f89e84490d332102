use docent_domain::ConversationTurn;
use std::collections::VecDeque;

/// Bounded conversation memory for chat mode
#[derive(Debug, Clone)]
pub struct ChatHistory {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl ChatHistory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(max_turns + 2),
            max_turns,
        }
    }

    /// Remember an answered question, dropping the oldest turns
    pub fn push_exchange(&mut self, question: &str, answer: &str) {
        self.turns.push_back(ConversationTurn::user(question));
        self.turns.push_back(ConversationTurn::assistant(answer));
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }
}

use uuid::Uuid;

use crate::{
    models::chat::{ChatRole, ChatTurn},
    services::advice::AdviceService,
};

/// Transcript of one chat connection. Owned by the connection task and
/// dropped with it; nothing is persisted.
pub struct ChatSession {
    id: Uuid,
    turns: Vec<ChatTurn>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Record the question, ask the advice service, record and return the
    /// answer. Blank questions are ignored.
    pub async fn ask(&mut self, advice: &AdviceService, question: &str) -> Option<&ChatTurn> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        self.turns.push(ChatTurn::new(ChatRole::User, question));
        let answer = advice.ask(question).await;
        self.turns.push(ChatTurn::new(ChatRole::Assistant, answer));
        self.turns.last()
    }
}

//! Conversation thread for a single session.

use super::message::Message;

/// Handle identifying one optimistic send within a [`Conversation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// One slot of the conversation.
///
/// A send occupies a single slot for its whole life, so its reply always
/// lands directly after its question no matter how many sends overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Settled(Message),
    Pending { ticket: Ticket, user: Message },
    Resolved { user: Message, reply: Message },
}

/// Ordered messages of one session.
///
/// Each reply is placed directly after its question. When sends overlap, an
/// earlier question's reply can therefore be displayed before a later
/// question that has an older timestamp; question/answer adjacency takes
/// precedence over strict timestamp order. Without overlap (one send in
/// flight, as the shell enforces) timestamps are non-decreasing.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<Entry>,
    next_ticket: u64,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole conversation with the given messages.
    pub fn replace(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.entries = messages.into_iter().map(Entry::Settled).collect();
    }

    /// Append a message that needs no resolution.
    pub fn push(&mut self, message: Message) {
        self.entries.push(Entry::Settled(message));
    }

    /// Append a user message that awaits its reply.
    pub fn push_pending(&mut self, user: Message) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.entries.push(Entry::Pending { ticket, user });
        ticket
    }

    /// Attach the reply to a pending send.
    ///
    /// Returns `false` when the ticket is no longer pending (for example
    /// because the conversation was cleared meanwhile).
    pub fn resolve(&mut self, ticket: Ticket, reply: Message) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Pending { ticket: t, .. } if *t == ticket))
        else {
            return false;
        };
        let Entry::Pending { user, .. } = self.entries.remove(index) else {
            return false;
        };
        self.entries.insert(index, Entry::Resolved { user, reply });
        true
    }

    /// Drop a pending send together with its question.
    pub fn abandon(&mut self, ticket: Ticket) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e, Entry::Pending { ticket: t, .. } if *t == ticket));
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Flattened display order.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.entries.len() * 2);
        for entry in &self.entries {
            match entry {
                Entry::Settled(msg) | Entry::Pending { user: msg, .. } => out.push(msg.clone()),
                Entry::Resolved { user, reply } => {
                    out.push(user.clone());
                    out.push(reply.clone());
                }
            }
        }
        out
    }

    /// Number of messages as displayed.
    ///
    /// A replayed history entry shows as its question and its answer, so it
    /// counts twice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                Entry::Resolved { .. } | Entry::Settled(Message::HistoryEntry(_)) => 2,
                Entry::Settled(_) | Entry::Pending { .. } => 1,
            })
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any send is still awaiting its reply.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, Entry::Pending { .. }))
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.entries.last().map(|e| match e {
            Entry::Settled(msg) | Entry::Pending { user: msg, .. } => msg,
            Entry::Resolved { reply, .. } => reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::HistoryEntry;
    use crate::session::message::MessageId;
    use chrono::Utc;

    fn user(id: u64, text: &str) -> Message {
        Message::User {
            id: MessageId::Local(id),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn answer(id: u64, text: &str) -> Message {
        Message::Assistant {
            id: MessageId::Local(id),
            text: text.to_string(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_pending_then_resolved() {
        let mut convo = Conversation::new();
        let ticket = convo.push_pending(user(1, "q"));
        assert!(convo.has_pending());
        assert_eq!(convo.len(), 1);

        assert!(convo.resolve(ticket, answer(2, "a")));
        assert!(!convo.has_pending());
        assert_eq!(convo.len(), 2);
        assert_eq!(convo.last().unwrap().text(), "a");
    }

    #[test]
    fn test_overlapping_sends_keep_pairs_together() {
        let mut convo = Conversation::new();
        let first = convo.push_pending(user(1, "first"));
        let second = convo.push_pending(user(2, "second"));

        // Second reply arrives before the first.
        assert!(convo.resolve(second, answer(3, "second answer")));
        assert!(convo.resolve(first, answer(4, "first answer")));

        let texts: Vec<_> = convo.messages().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(
            texts,
            ["first", "first answer", "second", "second answer"]
        );
    }

    #[test]
    fn test_resolve_after_clear_is_rejected() {
        let mut convo = Conversation::new();
        let ticket = convo.push_pending(user(1, "q"));
        convo.clear();
        assert!(!convo.resolve(ticket, answer(2, "a")));
        assert!(convo.is_empty());
    }

    #[test]
    fn test_resolve_twice_is_rejected() {
        let mut convo = Conversation::new();
        let ticket = convo.push_pending(user(1, "q"));
        assert!(convo.resolve(ticket, answer(2, "a")));
        assert!(!convo.resolve(ticket, answer(3, "again")));
        assert_eq!(convo.len(), 2);
    }

    #[test]
    fn test_abandon_removes_question() {
        let mut convo = Conversation::new();
        convo.push(user(1, "kept"));
        let ticket = convo.push_pending(user(2, "dropped"));
        assert!(convo.abandon(ticket));
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.last().unwrap().text(), "kept");
    }

    #[test]
    fn test_history_entry_counts_as_question_and_answer() {
        let mut convo = Conversation::new();
        convo.replace(vec![Message::HistoryEntry(HistoryEntry {
            id: 1,
            session_id: None,
            message: "q".to_string(),
            response: "a".to_string(),
            sources: Vec::new(),
            timestamp: Utc::now(),
        })]);
        convo.push(user(2, "local"));
        assert_eq!(convo.messages().len(), 2);
        assert_eq!(convo.len(), 3);
    }

    #[test]
    fn test_replace_discards_previous_state() {
        let mut convo = Conversation::new();
        convo.push_pending(user(1, "old"));
        convo.replace(vec![user(2, "new")]);
        assert!(!convo.has_pending());
        assert_eq!(convo.messages().len(), 1);
    }
}

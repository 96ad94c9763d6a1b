//! Chat threads between a job seeker and a matched company.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::catalog::{self, ChatMessage, Company, MessageSender};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatThread {
    pub company: Company,
    pub messages: Vec<ChatMessage>,
}

impl ChatThread {
    /// Open the seeded thread for a company. `None` for unknown companies.
    #[must_use]
    pub fn open(company_id: u32) -> Option<Self> {
        let company = catalog::company(company_id)?;
        Some(Self { company, messages: catalog::initial_chat(company_id) })
    }

    /// Append the user's message. The first message in an empty thread gets a
    /// canned reply from the company. Returns the messages appended.
    pub fn send(&mut self, text: &str, timestamp: &str) -> Result<Vec<ChatMessage>, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let was_empty = self.messages.is_empty();

        let mut appended = vec![self.push(MessageSender::User, text.to_owned(), timestamp)];
        if was_empty {
            let reply = format!(
                "Thanks for reaching out! We're excited about your interest in the {} position.",
                self.company.position
            );
            appended.push(self.push(MessageSender::Company, reply, timestamp));
        }
        Ok(appended)
    }

    fn push(&mut self, sender: MessageSender, text: String, timestamp: &str) -> ChatMessage {
        let id = u32::try_from(self.messages.len() + 1).unwrap_or(u32::MAX);
        let message = ChatMessage { id, sender, text, timestamp: timestamp.to_owned() };
        self.messages.push(message.clone());
        message
    }
}

/// Current time as an RFC 3339 string.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

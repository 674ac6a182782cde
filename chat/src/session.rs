use crate::models::*;
use crate::relay_client::RelayClient;
use thiserror::Error;

/// Shown in place of an answer whenever a question could not be answered.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question is empty")]
    EmptyQuestion,

    #[error("a question is already waiting for an answer")]
    RequestInFlight,

    #[error("no question is waiting for an answer")]
    NoRequestInFlight,
}

/// Conversation about the uploaded paper. At most one question is
/// outstanding at a time and the transcript only ever grows.
#[derive(Debug)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    state: ChatState,
    top_k: Option<u32>,
    model: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            state: ChatState::Idle,
            top_k: None,
            model: None,
        }
    }

    /// Retrieval depth and model name sent along with every question.
    pub fn with_options(mut self, top_k: Option<u32>, model: Option<String>) -> Self {
        self.top_k = top_k;
        self.model = model;
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state == ChatState::AwaitingResponse
    }

    pub fn can_submit(&self, input: &str) -> bool {
        self.state == ChatState::Idle && !input.trim().is_empty()
    }

    /// Record the user's question and start waiting for the answer. Returns
    /// the request to send to the relay.
    pub fn submit(&mut self, input: &str) -> Result<AskRequest, SessionError> {
        if self.state == ChatState::AwaitingResponse {
            return Err(SessionError::RequestInFlight);
        }
        let question = input.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        self.transcript.push(ChatMessage::new(Sender::User, question));
        self.state = ChatState::AwaitingResponse;

        Ok(AskRequest {
            question: question.to_string(),
            top_k: self.top_k,
            model: self.model.clone(),
        })
    }

    /// Close the outstanding question with the relay's outcome. Anything
    /// other than a reply carrying an answer becomes the fallback message.
    pub fn resolve(
        &mut self,
        outcome: anyhow::Result<AskReply>,
    ) -> Result<&ChatMessage, SessionError> {
        if self.state != ChatState::AwaitingResponse {
            return Err(SessionError::NoRequestInFlight);
        }

        let text = match outcome {
            Ok(AskReply {
                answer: Some(answer),
                ..
            }) => answer,
            Ok(reply) => {
                log::warn!(
                    "Reply carried no answer (status: {:?}, message: {:?})",
                    reply.status,
                    reply.message
                );
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                log::warn!("Ask failed: {:#}", e);
                FALLBACK_REPLY.to_string()
            }
        };

        self.transcript.push(ChatMessage::new(Sender::Assistant, text));
        self.state = ChatState::Idle;

        let last = self.transcript.len() - 1;
        Ok(&self.transcript[last])
    }

    /// Submit a question and wait for the relay to answer it.
    pub async fn send(
        &mut self,
        client: &RelayClient,
        input: &str,
    ) -> Result<&ChatMessage, SessionError> {
        let request = self.submit(input)?;
        let outcome = client.ask(&request).await;
        self.resolve(outcome)
    }
}

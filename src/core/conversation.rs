use tokio_util::sync::CancellationToken;

use super::persona::INITIAL_GREETING;
use crate::{
    AppError, AppResult,
    display::{ConversationView, ViewEvent},
    model::{AIClient, Context, Message, MessageId, MessageStore, ModelProvider, Turn},
    utils::ImageData,
};

/// Shown instead of an answer when the request itself failed
pub const FAILURE_FALLBACK: &str = "I apologize, but the clouds of uncertainty obscure my vision at this moment. Please try asking again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    /// A request is in flight; sends are rejected
    Awaiting,
}

/// Input the user has composed but not sent yet
#[derive(Debug, Clone, Default)]
struct Draft {
    text: String,
    image: Option<ImageData>,
}

/// A request that was accepted by [`Conversation::begin_send`] and still has
/// to be dispatched with [`Conversation::complete`].
#[derive(Debug)]
#[must_use]
pub struct PendingRequest {
    turns: Vec<Turn>,
    user_message: MessageId,
}

/// Owns the message history and the single outstanding request.
pub struct Conversation<P: ModelProvider> {
    client: AIClient<P>,
    store: MessageStore,
    draft: Draft,
    state: ConversationState,
    cancel: CancellationToken,
}

impl<P: ModelProvider> Conversation<P> {
    /// A fresh session opening with the mentor's greeting
    pub fn new(client: AIClient<P>) -> Self {
        Self::with_store(client, MessageStore::with_greeting(INITIAL_GREETING))
    }

    pub fn with_store(client: AIClient<P>, store: MessageStore) -> Self {
        Self {
            client,
            store,
            draft: Draft::default(),
            state: ConversationState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn is_thinking(&self) -> bool {
        self.state == ConversationState::Awaiting
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    pub fn selected_image(&self) -> Option<&ImageData> {
        self.draft.image.as_ref()
    }

    /// `None` means nothing was picked and keeps the current selection.
    pub fn select_image(&mut self, image: Option<ImageData>) {
        if let Some(image) = image {
            self.draft.image = Some(image);
        }
    }

    pub fn clear_image(&mut self) {
        self.draft.image = None;
    }

    /// Suggestions are offered until the first question is asked
    pub fn suggestions_visible(&self) -> bool {
        self.store.len() == 1 && !self.is_thinking()
    }

    /// Token that aborts the request in flight. A new one is issued once a
    /// cancelled request has settled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn outgoing_text(&self, text_override: Option<&str>) -> String {
        match text_override {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.draft.text.clone(),
        }
    }

    pub fn can_send(&self, text_override: Option<&str>) -> bool {
        self.state == ConversationState::Idle
            && (!self.outgoing_text(text_override).trim().is_empty() || self.draft.image.is_some())
    }

    /// Moves from idle to awaiting: records the user's turn, clears the draft
    /// and assembles the request context from the prior history.
    ///
    /// Returns `None` without touching anything when a request is already in
    /// flight or there is nothing to send.
    pub fn begin_send(&mut self, text_override: Option<&str>) -> Option<PendingRequest> {
        if self.state == ConversationState::Awaiting {
            log::debug!("Ignoring send while a request is in flight");
            return None;
        }
        if !self.can_send(text_override) {
            return None;
        }

        let text = self.outgoing_text(text_override);
        let image = self.draft.image.take();

        let turns = Context::build(self.store.messages(), &text, image.as_ref());
        let user_message = self.store.push_user(text, image).id();
        self.draft = Draft::default();
        self.state = ConversationState::Awaiting;

        log::info!("Request started with {} turns", turns.len());
        Some(PendingRequest {
            turns,
            user_message,
        })
    }

    /// Dispatches an accepted request and records the answer, or the failure
    /// fallback. The conversation is idle again whatever the outcome.
    pub async fn complete(
        &mut self,
        pending: PendingRequest,
        view: &mut dyn ConversationView,
    ) -> AppResult<Message> {
        let announced = self.announce(&pending, view).await;

        let outcome = tokio::select! {
            result = self.client.generate(&pending.turns) => result,
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
        };

        let message = self.settle(outcome);
        let shown = view.handle_event(ViewEvent::Turn(message.clone())).await;

        announced.and(shown)?;
        Ok(message)
    }

    /// Sends the draft (or `text_override` in its place). Returns the model's
    /// turn, or `None` when the send was rejected.
    pub async fn send(
        &mut self,
        text_override: Option<&str>,
        view: &mut dyn ConversationView,
    ) -> AppResult<Option<Message>> {
        let Some(pending) = self.begin_send(text_override) else {
            return Ok(None);
        };

        self.complete(pending, view).await.map(Some)
    }

    async fn announce(
        &self,
        pending: &PendingRequest,
        view: &mut dyn ConversationView,
    ) -> AppResult<()> {
        let user = self
            .store
            .messages()
            .iter()
            .rev()
            .find(|m| m.id() == pending.user_message);

        if let Some(user) = user {
            view.handle_event(ViewEvent::Turn(user.clone())).await?;
        }
        view.handle_event(ViewEvent::Thinking).await
    }

    fn settle(&mut self, outcome: AppResult<String>) -> Message {
        let text = match outcome {
            Ok(text) => text,
            Err(AppError::Cancelled) => {
                log::info!("Request cancelled by user");
                FAILURE_FALLBACK.to_string()
            }
            Err(e) => {
                log::error!("Request failed, answering with fallback: {}", e);
                FAILURE_FALLBACK.to_string()
            }
        };

        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.state = ConversationState::Idle;
        self.store.push_model(text).clone()
    }
}

//! Views handed to move callbacks.

use identity_model::{BeliefModel, Cast, Entity, EntityId, EvidenceItem};

use super::{Conversation, HistoricalMove, Participant};
use crate::config::EngineConfig;
use crate::moves::MoveTag;
use crate::topics::TopicState;

/// Read-only view of a turn, for preconditions and formatters.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub conversation: &'a Conversation,
    pub cast: &'a Cast,
}

impl<'a> TurnContext<'a> {
    pub fn new(conversation: &'a Conversation, cast: &'a Cast) -> Self {
        Self { conversation, cast }
    }

    pub fn speaker_id(&self) -> EntityId {
        self.conversation.entity(self.conversation.speaker())
    }

    pub fn listener_id(&self) -> EntityId {
        self.conversation.entity(self.conversation.listener())
    }

    /// The entity taking this turn.
    pub fn speaker(&self) -> Option<&'a Entity> {
        self.cast.get(self.speaker_id())
    }

    pub fn listener(&self) -> Option<&'a Entity> {
        self.cast.get(self.listener_id())
    }

    pub fn my_state(&self) -> &'a Participant {
        self.conversation.my_state()
    }

    pub fn others_state(&self) -> &'a Participant {
        self.conversation.others_state()
    }

    pub fn topics(&self) -> &'a TopicState {
        &self.conversation.topic_state
    }

    /// What the speaker believes about the listener.
    pub fn speaker_beliefs(&self) -> Option<&'a BeliefModel> {
        self.cast.beliefs_of(self.speaker_id(), self.listener_id())
    }

    /// What the listener believes about the speaker.
    pub fn listener_beliefs(&self) -> Option<&'a BeliefModel> {
        self.cast.beliefs_of(self.listener_id(), self.speaker_id())
    }
}

/// View handed to move effects. The cast is writable; conversation changes
/// go on the pending [`HistoricalMove`].
#[derive(Debug)]
pub struct EditContext<'a> {
    pub conversation: &'a Conversation,
    pub cast: &'a mut Cast,
    pub config: &'a EngineConfig,
}

impl<'a> EditContext<'a> {
    pub fn new(conversation: &'a Conversation, cast: &'a mut Cast, config: &'a EngineConfig) -> Self {
        Self {
            conversation,
            cast,
            config,
        }
    }

    pub fn as_turn(&self) -> TurnContext<'_> {
        TurnContext::new(self.conversation, &*self.cast)
    }

    pub fn speaker_id(&self) -> EntityId {
        self.conversation.entity(self.conversation.speaker())
    }

    pub fn listener_id(&self) -> EntityId {
        self.conversation.entity(self.conversation.listener())
    }

    /// Give the listener evidence about the speaker and recompute its beliefs.
    ///
    /// Returns `false` if the listener holds no model of the speaker.
    pub fn inform_listener(&mut self, item: EvidenceItem) -> bool {
        let (speaker, listener) = (self.speaker_id(), self.listener_id());
        let Some(model) = self.cast.beliefs_of_mut(listener, speaker) else {
            tracing::debug!(%listener, %speaker, "listener has no model of the speaker");
            return false;
        };
        model.insert(item);
        model.recompute_total_strengths();
        model.recompute_strongest();
        true
    }

    /// Ask the listener to perform `tag` next, with the configured urgency and time to live.
    pub fn follow_up(&self, history: &mut HistoricalMove, tag: impl Into<MoveTag>) {
        history.others_obligations_mut().push(
            tag.into(),
            self.config.follow_up_urgency,
            self.config.follow_up_time_to_live,
        );
    }
}

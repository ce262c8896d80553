//! Conversations between two entities: participants, shared topic state,
//! history and goals.

mod context;
mod history;

pub use context::*;
pub use history::*;

use identity_model::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Not;
use uuid::Uuid;

use crate::goals::{Goal, GoalMove};
use crate::obligations::ObligationQueue;
use crate::topics::{Topic, TopicMetadata, TopicState};

/// Unique identifier for conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two seats in a conversation. Which entity sits where is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Person0,
    Person1,
}

impl Not for Speaker {
    type Output = Speaker;

    fn not(self) -> Self::Output {
        match self {
            Speaker::Person0 => Speaker::Person1,
            Speaker::Person1 => Speaker::Person0,
        }
    }
}

/// A participant's conversation-scoped state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub entity: EntityId,
    pub obligations: ObligationQueue,
    topics: BTreeMap<Topic, TopicMetadata>,
}

impl Participant {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            obligations: ObligationQueue::new(),
            topics: BTreeMap::new(),
        }
    }

    /// How often this participant introduced and addressed `topic`.
    pub fn topic_metadata(&self, topic: &Topic) -> Option<&TopicMetadata> {
        self.topics.get(topic)
    }
}

/// One bounded exchange between two entities.
///
/// Entities are referenced by id and live in the [`Cast`](identity_model::Cast);
/// the conversation never owns them.
#[derive(Debug)]
pub struct Conversation {
    id: ConversationId,
    initiator: Speaker,
    speaker: Speaker,
    person0: Participant,
    person1: Participant,

    /// Topics introduced and addressed so far, shared by both participants.
    pub topic_state: TopicState,

    history: Vec<HistoricalMove>,
    goals: Vec<Box<dyn Goal>>,
    done: bool,

    /// Chance to continue with the requested move during a lull.
    threshold: f64,
}

impl Conversation {
    pub(crate) fn new(initiator: Speaker, threshold: f64, person0: EntityId, person1: EntityId) -> Self {
        Self {
            id: ConversationId::new(),
            initiator,
            speaker: initiator,
            person0: Participant::new(person0),
            person1: Participant::new(person1),
            topic_state: TopicState::new(),
            history: Vec::new(),
            goals: Vec::new(),
            done: false,
            threshold,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn initiator(&self) -> Speaker {
        self.initiator
    }

    /// Who takes the next turn.
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn listener(&self) -> Speaker {
        !self.speaker
    }

    pub fn participant(&self, speaker: Speaker) -> &Participant {
        match speaker {
            Speaker::Person0 => &self.person0,
            Speaker::Person1 => &self.person1,
        }
    }

    pub fn participant_mut(&mut self, speaker: Speaker) -> &mut Participant {
        match speaker {
            Speaker::Person0 => &mut self.person0,
            Speaker::Person1 => &mut self.person1,
        }
    }

    /// The next speaker's state.
    pub fn my_state(&self) -> &Participant {
        self.participant(self.speaker)
    }

    /// The next listener's state.
    pub fn others_state(&self) -> &Participant {
        self.participant(!self.speaker)
    }

    pub fn entity(&self, speaker: Speaker) -> EntityId {
        self.participant(speaker).entity
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn history(&self) -> &[HistoricalMove] {
        &self.history
    }

    /// Iterate over committed moves, oldest first.
    pub fn history_iter(&self) -> std::slice::Iter<'_, HistoricalMove> {
        self.history.iter()
    }

    pub fn last_move(&self) -> Option<&HistoricalMove> {
        self.history.last()
    }

    /// Number of committed moves.
    pub fn turns(&self) -> usize {
        self.history.len()
    }

    pub fn add_goal(&mut self, goal: impl Goal + 'static) {
        self.goals.push(Box::new(goal));
    }

    pub fn goals(&self) -> impl Iterator<Item = &dyn Goal> {
        self.goals.iter().map(|goal| goal.as_ref())
    }

    /// Moves the goals currently request from the next speaker, in goal order.
    pub fn goal_requests(&self) -> Vec<GoalMove> {
        self.goals
            .iter()
            .filter_map(|goal| goal.next_step())
            .filter(|goal_move| goal_move.pursuer.agrees_with(self.speaker))
            .collect()
    }

    pub(crate) fn lapse(&mut self) {
        self.done = true;
    }

    /// Commit a realized move and hand the turn to the other participant.
    pub(crate) fn commit(&mut self, history: HistoricalMove) {
        let speaker = history.speaker;
        let participant = match speaker {
            Speaker::Person0 => &mut self.person0,
            Speaker::Person1 => &mut self.person1,
        };

        for tag in participant.obligations.decay() {
            if !history.obligations(speaker).addressed.contains(&tag) {
                tracing::debug!(conversation = %self.id, ?speaker, obligation = %tag, "obligation expired");
            }
        }

        for topic in history.topic_state.introduced() {
            self.topic_state.introduce(topic.clone());
            participant.topics.entry(topic.clone()).or_default().introduce();
        }
        for topic in history.topic_state.addressed() {
            self.topic_state.address(topic.clone());
            participant.topics.entry(topic.clone()).or_default().address();
        }

        self.person0.obligations.merge(&history.person0_obligations);
        self.person1.obligations.merge(&history.person1_obligations);

        for goal in self.goals.iter_mut() {
            goal.made_move(&history);
        }
        self.done = self.goals.iter().all(|goal| goal.is_satisfied());
        self.history.push(history);
        self.speaker = !speaker;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::RepeatGoalMove;
    use crate::moves::MoveTag;
    use crate::obligations::Obligation;

    fn conversation() -> Conversation {
        Conversation::new(Speaker::Person0, 0.5, EntityId::new(), EntityId::new())
    }

    #[test]
    fn test_speaker_not() {
        assert_eq!(!Speaker::Person0, Speaker::Person1);
        assert_eq!(!!Speaker::Person1, Speaker::Person1);
    }

    #[test]
    fn test_new_conversation_state() {
        let conv = conversation();
        assert_eq!(conv.speaker(), Speaker::Person0);
        assert_eq!(conv.listener(), Speaker::Person1);
        assert!(!conv.is_done());
        assert_eq!(conv.turns(), 0);
        assert!(conv.my_state().obligations.is_empty());
        assert_ne!(conv.entity(Speaker::Person0), conv.entity(Speaker::Person1));
    }

    #[test]
    fn test_commit_merges_and_alternates() {
        let mut conv = conversation();
        conv.add_goal(RepeatGoalMove::new(GoalMove::anyone("small talk"), 0));
        conv.participant_mut(Speaker::Person0)
            .obligations
            .insert_obligation(MoveTag::new("greet"), Obligation::new(10, 5));

        let fav = Topic::new("fav music genre");
        let mut pending = HistoricalMove::pending(0, Speaker::Person0, "greet".into(), "Hi.".into());
        pending.my_obligations_mut().address(MoveTag::new("greet"));
        pending.others_obligations_mut().push(MoveTag::new("state fav"), 0, 3);
        pending.topic_state.introduce(fav.clone());
        conv.commit(pending);

        assert_eq!(conv.speaker(), Speaker::Person1);
        assert_eq!(conv.turns(), 1);
        assert!(conv.others_state().obligations.is_empty());
        assert!(conv.my_state().obligations.contains(&MoveTag::new("state fav")));
        assert!(conv.topic_state.can_be_addressed(&fav));
        let meta = conv.participant(Speaker::Person0).topic_metadata(&fav).unwrap();
        assert_eq!(meta.times_introduced, 1);
        assert!(conv.participant(Speaker::Person1).topic_metadata(&fav).is_none());
        assert!(!conv.is_done());
        assert_eq!(conv.goal_requests().len(), 1);

        let mut pending =
            HistoricalMove::pending(1, Speaker::Person1, "state fav".into(), "Jazz.".into());
        pending.my_obligations_mut().address(MoveTag::new("state fav"));
        pending.my_obligations_mut().address(MoveTag::new("small talk"));
        pending.topic_state.address(fav.clone());
        conv.commit(pending);

        assert!(conv.is_done());
        assert!(!conv.topic_state.can_be_addressed(&fav));
        assert!(conv.participant(Speaker::Person1).obligations.is_empty());
        assert_eq!(
            conv.history_iter().map(|m| m.utterance.as_str()).collect::<Vec<_>>(),
            vec!["Hi.", "Jazz."]
        );
    }

    #[test]
    fn test_speaker_obligations_decay_on_own_turn() {
        let mut conv = conversation();
        conv.add_goal(RepeatGoalMove::new(GoalMove::anyone("never"), 0));
        conv.participant_mut(Speaker::Person1)
            .obligations
            .insert_obligation(MoveTag::new("greet"), Obligation::new(10, 1));

        conv.commit(HistoricalMove::pending(0, Speaker::Person0, "x".into(), String::new()));
        assert!(conv.my_state().obligations.contains(&MoveTag::new("greet")));

        conv.commit(HistoricalMove::pending(1, Speaker::Person1, "x".into(), String::new()));
        assert!(conv.participant(Speaker::Person1).obligations.is_empty());
    }

    #[test]
    fn test_goal_requests_filter_by_pursuer() {
        let mut conv = conversation();
        conv.add_goal(RepeatGoalMove::new(GoalMove::new(Speaker::Person1, "ask"), 0));
        conv.add_goal(RepeatGoalMove::new(GoalMove::anyone("small talk"), 0));

        let requests = conv.goal_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].dialog_move.as_str(), "small talk");
        assert_eq!(conv.goals().count(), 2);
    }
}

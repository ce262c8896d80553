//! The conversation engine - picks, realizes and commits one move per turn.
//!
//! Each turn the current speaker tries, in order:
//! 1. **Obligations**: its live obligations, most urgent first
//! 2. **Open topics**: topics introduced but not yet addressed
//! 3. **Goals**: moves requested by goals the speaker may pursue
//! 4. **Lull**: the caller's requested move, with probability `threshold`
//!
//! The first tier yielding an admissible expansion wins. When none does, the
//! conversation lapses and is finished.

use identity_model::{Cast, EntityId};
use rand::{Rng, RngCore};

use crate::config::EngineConfig;
use crate::conversation::{Conversation, EditContext, HistoricalMove, Speaker, TurnContext};
use crate::error::{DialogError, Result};
use crate::moves::{DialogMoveGraph, ExpansionTree, MoveDefinition, MoveTag, NodeId};

/// Seeds a new conversation with obligations and goals.
pub type Initializer = Box<dyn Fn(&mut Conversation) + Send + Sync>;

/// What a call to [`DialogManager::step_conversation`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A move was committed at `turn` of the history.
    Spoke { speaker: Speaker, turn: usize },
    /// Nobody had anything to say; the conversation is now finished.
    Lapsed,
}

/// Owns a dialogue vocabulary and drives conversations with it.
pub struct DialogManager {
    graph: DialogMoveGraph,
    initializers: Vec<Initializer>,
    config: EngineConfig,
}

impl DialogManager {
    /// Build a manager from move definitions and conversation initializers.
    ///
    /// Fails if the move vocabulary is inconsistent.
    pub fn new<M, I>(moves: M, initializers: I) -> Result<Self>
    where
        M: IntoIterator<Item = (NodeId, MoveDefinition)>,
        I: IntoIterator<Item = Initializer>,
    {
        Ok(Self {
            graph: DialogMoveGraph::new(moves)?,
            initializers: initializers.into_iter().collect(),
            config: EngineConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Add an initializer run for every conversation created afterwards.
    pub fn with_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&mut Conversation) + Send + Sync + 'static,
    {
        self.initializers.push(Box::new(initializer));
        self
    }

    pub fn graph(&self) -> &DialogMoveGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a conversation between two entities and run every initializer on it.
    pub fn new_conversation(
        &self,
        initiator: Speaker,
        threshold: f64,
        person0: EntityId,
        person1: EntityId,
    ) -> Result<Conversation> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DialogError::InvalidThreshold(threshold));
        }
        if person0 == person1 {
            return Err(DialogError::SameParticipant(person0));
        }

        let mut conversation = Conversation::new(initiator, threshold, person0, person1);
        for initializer in &self.initializers {
            initializer(&mut conversation);
        }
        tracing::debug!(
            conversation = %conversation.id(),
            %person0,
            %person1,
            ?initiator,
            "conversation started"
        );
        Ok(conversation)
    }

    /// Start a conversation with the configured default threshold.
    pub fn start_conversation(
        &self,
        initiator: Speaker,
        person0: EntityId,
        person1: EntityId,
    ) -> Result<Conversation> {
        self.new_conversation(initiator, self.config.default_threshold, person0, person1)
    }

    /// Take exactly one turn for the current speaker.
    ///
    /// `requested` is the move to fall back on during a lull. Stepping a
    /// finished conversation is an error.
    pub fn step_conversation<R: Rng>(
        &self,
        conversation: &mut Conversation,
        cast: &mut Cast,
        rng: &mut R,
        requested: &MoveTag,
    ) -> Result<StepOutcome> {
        if conversation.is_done() {
            return Err(DialogError::ConversationFinished(conversation.id()));
        }
        for speaker in [Speaker::Person0, Speaker::Person1] {
            let entity = conversation.entity(speaker);
            if cast.get(entity).is_none() {
                return Err(DialogError::UnknownParticipant(entity));
            }
        }

        let rng: &mut dyn RngCore = rng;
        let speaker = conversation.speaker();
        let turn = conversation.turns();

        let ctx = TurnContext::new(&*conversation, &*cast);
        let Some(tree) = self.select_move(&ctx, rng, requested) else {
            tracing::debug!(conversation = %conversation.id(), turn, ?speaker, "conversation lapsed");
            conversation.lapse();
            return Ok(StepOutcome::Lapsed);
        };
        let utterance = tree.render(&ctx, rng);

        let mut history = HistoricalMove::pending(turn, speaker, tree.id().clone(), utterance);
        let mut edit = EditContext::new(&*conversation, &mut *cast, &self.config);
        tree.realize(&mut edit, rng, &mut history);

        tracing::debug!(
            conversation = %conversation.id(),
            turn,
            ?speaker,
            node = %history.node,
            utterance = %history.utterance,
            "move realized"
        );
        conversation.commit(history);
        Ok(StepOutcome::Spoke { speaker, turn })
    }

    /// Step until the conversation is finished. Returns the number of steps taken.
    pub fn finish_conversation<R: Rng>(
        &self,
        conversation: &mut Conversation,
        cast: &mut Cast,
        rng: &mut R,
        requested: &MoveTag,
    ) -> Result<usize> {
        let mut steps = 0;
        while !conversation.is_done() {
            if steps >= self.config.max_turns {
                return Err(DialogError::TurnLimit {
                    limit: self.config.max_turns,
                });
            }
            self.step_conversation(conversation, cast, rng, requested)?;
            steps += 1;
        }
        Ok(steps)
    }

    fn select_move(
        &self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        requested: &MoveTag,
    ) -> Option<ExpansionTree<'_>> {
        for (tag, obligation) in ctx.my_state().obligations.by_priority() {
            if let Some(tree) = self.graph.expand_move(ctx, rng, tag) {
                tracing::trace!(obligation = %tag, urgency = obligation.urgency, "discharging obligation");
                return Some(tree);
            }
        }

        for topic in ctx.topics().open_topics() {
            if let Some(tree) = self.graph.expand_topic(ctx, rng, topic) {
                tracing::trace!(topic = %topic, "following up on open topic");
                return Some(tree);
            }
        }

        for goal_move in ctx.conversation.goal_requests() {
            if let Some(tree) = self.graph.expand_move(ctx, rng, &goal_move.dialog_move) {
                tracing::trace!(dialog_move = %goal_move.dialog_move, "pursuing goal");
                return Some(tree);
            }
        }

        if rng.gen_bool(ctx.conversation.threshold()) {
            return self.graph.expand_move(ctx, rng, requested);
        }
        None
    }
}

impl std::fmt::Debug for DialogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogManager")
            .field("graph", &self.graph)
            .field("initializers", &self.initializers.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{GoalMove, RepeatGoalMove};
    use crate::obligations::Obligation;
    use identity_model::{Entity, FacetCatalog};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn manager() -> DialogManager {
        DialogManager::new(
            [
                (NodeId::new("greet"), MoveDefinition::text("Hello.").with_dialog_move("greet")),
                (NodeId::new("farewell"), MoveDefinition::text("Bye.").with_dialog_move("farewell")),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    fn cast() -> (Cast, EntityId, EntityId) {
        let mut cast = Cast::new(FacetCatalog::new());
        let ada = cast.add_entity(Entity::new("Ada")).unwrap();
        let bo = cast.add_entity(Entity::new("Bo")).unwrap();
        (cast, ada, bo)
    }

    #[test]
    fn test_new_conversation_validation() {
        let manager = manager();
        let (_, ada, bo) = cast();

        assert_eq!(
            manager.new_conversation(Speaker::Person0, 1.5, ada, bo).unwrap_err(),
            DialogError::InvalidThreshold(1.5)
        );
        assert_eq!(
            manager.new_conversation(Speaker::Person0, 0.5, ada, ada).unwrap_err(),
            DialogError::SameParticipant(ada)
        );

        let conversation = manager.start_conversation(Speaker::Person1, ada, bo).unwrap();
        assert_eq!(conversation.speaker(), Speaker::Person1);
        assert_eq!(conversation.threshold(), 0.5);
    }

    #[test]
    fn test_initializers_run_on_new_conversations() {
        let manager = manager().with_initializer(|conversation| {
            conversation.add_goal(RepeatGoalMove::new(GoalMove::anyone("greet"), 1));
        });
        let (_, ada, bo) = cast();

        let conversation = manager.start_conversation(Speaker::Person0, ada, bo).unwrap();
        assert_eq!(conversation.goals().count(), 1);
    }

    #[test]
    fn test_most_urgent_obligation_wins() {
        let manager = manager();
        let (mut cast, ada, bo) = cast();
        let mut rng = SmallRng::seed_from_u64(3);

        let mut conversation = manager.new_conversation(Speaker::Person0, 0.0, ada, bo).unwrap();
        let obligations = &mut conversation.participant_mut(Speaker::Person0).obligations;
        obligations.insert_obligation(MoveTag::new("greet"), Obligation::new(1, 5));
        obligations.insert_obligation(MoveTag::new("farewell"), Obligation::new(5, 5));

        let outcome = manager
            .step_conversation(&mut conversation, &mut cast, &mut rng, &MoveTag::new("greet"))
            .unwrap();
        assert_eq!(outcome, StepOutcome::Spoke { speaker: Speaker::Person0, turn: 0 });
        assert_eq!(conversation.last_move().unwrap().utterance, "Bye.");

        let live = &conversation.participant(Speaker::Person0).obligations;
        assert!(!live.contains(&MoveTag::new("farewell")));
        assert_eq!(live.get_obligation(&MoveTag::new("greet")).unwrap().time_to_live, 4);
    }

    #[test]
    fn test_zero_ttl_obligation_is_not_discharged() {
        let manager = manager();
        let (mut cast, ada, bo) = cast();
        let mut rng = SmallRng::seed_from_u64(3);

        let mut conversation = manager.new_conversation(Speaker::Person0, 0.0, ada, bo).unwrap();
        conversation
            .participant_mut(Speaker::Person0)
            .obligations
            .insert_obligation(MoveTag::new("greet"), Obligation::new(1, 0));

        let outcome = manager
            .step_conversation(&mut conversation, &mut cast, &mut rng, &MoveTag::new("greet"))
            .unwrap();
        assert_eq!(outcome, StepOutcome::Lapsed);
        assert!(conversation.history().is_empty());
    }

    #[test]
    fn test_lull_lapses_or_continues() {
        let manager = manager();
        let (mut cast, ada, bo) = cast();
        let mut rng = SmallRng::seed_from_u64(9);
        let greet = MoveTag::new("greet");

        let mut quiet = manager.new_conversation(Speaker::Person0, 0.0, ada, bo).unwrap();
        assert_eq!(
            manager.step_conversation(&mut quiet, &mut cast, &mut rng, &greet).unwrap(),
            StepOutcome::Lapsed
        );
        assert!(quiet.is_done());
        assert!(quiet.history().is_empty());
        assert_eq!(
            manager.step_conversation(&mut quiet, &mut cast, &mut rng, &greet).unwrap_err(),
            DialogError::ConversationFinished(quiet.id())
        );

        let mut chatty = manager.new_conversation(Speaker::Person0, 1.0, ada, bo).unwrap();
        manager.step_conversation(&mut chatty, &mut cast, &mut rng, &greet).unwrap();
        assert_eq!(chatty.last_move().unwrap().utterance, "Hello.");
        // No goals, so the first move already finishes it.
        assert!(chatty.is_done());
    }

    #[test]
    fn test_unknown_participant() {
        let manager = manager();
        let (mut cast, ada, _) = cast();
        let stranger = EntityId::new();
        let mut rng = SmallRng::seed_from_u64(1);

        let mut conversation = manager.new_conversation(Speaker::Person0, 1.0, ada, stranger).unwrap();
        assert_eq!(
            manager
                .step_conversation(&mut conversation, &mut cast, &mut rng, &MoveTag::new("greet"))
                .unwrap_err(),
            DialogError::UnknownParticipant(stranger)
        );
    }

    #[test]
    fn test_finish_conversation_turn_limit() {
        let config = EngineConfig {
            max_turns: 3,
            ..EngineConfig::default()
        };
        let manager = manager()
            .with_config(config)
            .unwrap()
            .with_initializer(|conversation| {
                conversation.add_goal(RepeatGoalMove::new(GoalMove::anyone("greet"), 100));
            });
        let (mut cast, ada, bo) = cast();
        let mut rng = SmallRng::seed_from_u64(5);

        let mut conversation = manager.new_conversation(Speaker::Person0, 0.0, ada, bo).unwrap();
        assert_eq!(
            manager
                .finish_conversation(&mut conversation, &mut cast, &mut rng, &MoveTag::new("greet"))
                .unwrap_err(),
            DialogError::TurnLimit { limit: 3 }
        );
        assert_eq!(conversation.turns(), 3);
    }

    #[test]
    fn test_finish_conversation_counts_turns() {
        let manager = manager().with_initializer(|conversation| {
            conversation.add_goal(RepeatGoalMove::new(GoalMove::anyone("greet"), 1));
        });
        let (mut cast, ada, bo) = cast();
        let mut rng = SmallRng::seed_from_u64(5);

        let mut conversation = manager.new_conversation(Speaker::Person0, 0.0, ada, bo).unwrap();
        let turns = manager
            .finish_conversation(&mut conversation, &mut cast, &mut rng, &MoveTag::new("greet"))
            .unwrap();

        assert_eq!(turns, 2);
        let speakers: Vec<Speaker> = conversation.history_iter().map(|m| m.speaker).collect();
        assert_eq!(speakers, vec![Speaker::Person0, Speaker::Person1]);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = EngineConfig {
            default_threshold: -0.1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            manager().with_config(config),
            Err(DialogError::InvalidThreshold(_))
        ));
    }
}

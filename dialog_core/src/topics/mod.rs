//! Topics - conversational subjects and whether they were brought up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A conversational subject, e.g. "favorite music genre".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Topic(pub String);

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which topics were introduced and which were addressed.
///
/// A conversation holds the shared state; a pending move holds the changes it
/// makes, using the same type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicState {
    introduced: BTreeSet<Topic>,
    addressed: BTreeSet<Topic>,
}

impl TopicState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the topic was not introduced yet.
    pub fn can_be_introduced(&self, topic: &Topic) -> bool {
        !self.introduced.contains(topic)
    }

    /// Mark a topic introduced. Returns `false` (and logs) if it already was.
    pub fn introduce(&mut self, topic: Topic) -> bool {
        if self.introduced.contains(&topic) {
            tracing::warn!(topic = %topic, "topic introduced twice");
            return false;
        }
        self.introduced.insert(topic)
    }

    /// True iff the topic was introduced and not yet addressed.
    pub fn can_be_addressed(&self, topic: &Topic) -> bool {
        self.introduced.contains(topic) && !self.addressed.contains(topic)
    }

    /// Mark a topic addressed. Returns `false` if it already was.
    pub fn address(&mut self, topic: Topic) -> bool {
        self.addressed.insert(topic)
    }

    pub fn is_introduced(&self, topic: &Topic) -> bool {
        self.introduced.contains(topic)
    }

    pub fn is_addressed(&self, topic: &Topic) -> bool {
        self.addressed.contains(topic)
    }

    /// Introduced topics still waiting to be addressed, in topic order.
    pub fn open_topics(&self) -> impl Iterator<Item = &Topic> {
        self.introduced.difference(&self.addressed)
    }

    pub fn introduced(&self) -> impl Iterator<Item = &Topic> {
        self.introduced.iter()
    }

    pub fn addressed(&self) -> impl Iterator<Item = &Topic> {
        self.addressed.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.introduced.is_empty() && self.addressed.is_empty()
    }
}

/// How often one participant introduced or addressed a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub times_introduced: u32,
    pub times_addressed: u32,
}

impl TopicMetadata {
    pub fn introduce(&mut self) {
        self.times_introduced += 1;
    }

    pub fn address(&mut self) {
        self.times_addressed += 1;
    }
}

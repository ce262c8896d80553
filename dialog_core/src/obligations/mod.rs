//! Obligations - conversational duties a speaker is expected to discharge.
//!
//! Each participant owns one [`ObligationQueue`] holding at most one live
//! obligation per move tag. Moves never touch the live queues directly: they
//! record changes on the pending move's [`HistoricalObligations`], which the
//! engine merges once the move is committed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::moves::MoveTag;

/// A pending duty to perform some dialog move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    /// Higher is more pressing.
    pub urgency: i32,
    /// Remaining turns of the owner before the obligation expires.
    pub time_to_live: u32,
    /// How many times the obligation was pushed since it was last discharged.
    pub times_pushed: u32,
}

impl Obligation {
    pub fn new(urgency: i32, time_to_live: u32) -> Self {
        Self {
            urgency,
            time_to_live,
            times_pushed: 0,
        }
    }

    /// Set how many times the obligation counts as pushed.
    pub fn with_times_pushed(mut self, times_pushed: u32) -> Self {
        self.times_pushed = times_pushed;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    obligation: Obligation,
    /// Queue order, used to break urgency ties.
    queued_at: u64,
}

/// One participant's live obligations, keyed by move tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObligationQueue {
    slots: BTreeMap<MoveTag, Slot>,
    next_seq: u64,
}

impl ObligationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Create or replace the obligation under `tag`. A replaced obligation
    /// moves to the back of the queue.
    ///
    /// An obligation with no time to live is already expired: it only clears
    /// whatever was queued under `tag`.
    pub fn insert_obligation(&mut self, tag: MoveTag, obligation: Obligation) -> Option<Obligation> {
        if obligation.time_to_live == 0 {
            return self.address(&tag);
        }
        let queued_at = self.next_seq();
        self.slots
            .insert(
                tag,
                Slot {
                    obligation,
                    queued_at,
                },
            )
            .map(|slot| slot.obligation)
    }

    /// Re-queue an obligation: add to `times_pushed` and reset the time to live.
    ///
    /// A missing obligation is created with urgency 0. Pushing with no time to
    /// live expires the obligation.
    pub fn push(&mut self, tag: MoveTag, times_pushed: u32, time_to_live: u32) {
        if time_to_live == 0 {
            self.address(&tag);
            return;
        }
        if let Some(slot) = self.slots.get_mut(&tag) {
            slot.obligation.times_pushed += times_pushed;
            slot.obligation.time_to_live = time_to_live;
            return;
        }
        let obligation = Obligation::new(0, time_to_live).with_times_pushed(times_pushed);
        self.insert_obligation(tag, obligation);
    }

    pub fn get_obligation(&self, tag: &MoveTag) -> Option<&Obligation> {
        self.slots.get(tag).map(|slot| &slot.obligation)
    }

    pub fn contains(&self, tag: &MoveTag) -> bool {
        self.slots.contains_key(tag)
    }

    /// Discharge an obligation, regardless of its remaining time to live.
    pub fn address(&mut self, tag: &MoveTag) -> Option<Obligation> {
        self.slots.remove(tag).map(|slot| slot.obligation)
    }

    /// Spend one turn of every obligation, dropping the ones that run out.
    ///
    /// Returns the tags that expired.
    pub fn decay(&mut self) -> Vec<MoveTag> {
        let mut expired = Vec::new();
        self.slots.retain(|tag, slot| {
            slot.obligation.time_to_live = slot.obligation.time_to_live.saturating_sub(1);
            if slot.obligation.time_to_live == 0 {
                expired.push(tag.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Live obligations, most urgent first. Ties go to the one queued first.
    pub fn by_priority(&self) -> Vec<(&MoveTag, &Obligation)> {
        let mut entries: Vec<_> = self.slots.iter().collect();
        entries.sort_by(|(_, a), (_, b)| {
            b.obligation
                .urgency
                .cmp(&a.obligation.urgency)
                .then(a.queued_at.cmp(&b.queued_at))
        });
        entries
            .into_iter()
            .map(|(tag, slot)| (tag, &slot.obligation))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Apply the changes a committed move recorded for this participant.
    ///
    /// Addressed obligations are removed first. Pushed obligations then merge
    /// into existing ones: pushes add up, urgency and time to live take the max.
    pub fn merge(&mut self, changes: &HistoricalObligations) {
        for tag in &changes.addressed {
            self.address(tag);
        }
        for (tag, pushed) in &changes.pushed {
            if let Some(slot) = self.slots.get_mut(tag) {
                let live = &mut slot.obligation;
                live.times_pushed += pushed.times_pushed;
                live.urgency = live.urgency.max(pushed.urgency);
                live.time_to_live = live.time_to_live.max(pushed.time_to_live);
            } else {
                self.insert_obligation(tag.clone(), *pushed);
            }
        }
    }
}

/// Obligation changes one move made for one participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalObligations {
    pub pushed: BTreeMap<MoveTag, Obligation>,
    pub addressed: BTreeSet<MoveTag>,
}

impl HistoricalObligations {
    /// Ask the participant to perform `tag`. Repeated pushes keep the highest
    /// urgency and time to live.
    pub fn push(&mut self, tag: MoveTag, urgency: i32, time_to_live: u32) {
        let obligation = self
            .pushed
            .entry(tag)
            .or_insert_with(|| Obligation::new(urgency, time_to_live));
        obligation.times_pushed += 1;
        obligation.urgency = obligation.urgency.max(urgency);
        obligation.time_to_live = obligation.time_to_live.max(time_to_live);
    }

    /// Record that the participant discharged `tag`.
    pub fn address(&mut self, tag: MoveTag) {
        self.addressed.insert(tag);
    }

    pub fn is_empty(&self) -> bool {
        self.pushed.is_empty() && self.addressed.is_empty()
    }
}

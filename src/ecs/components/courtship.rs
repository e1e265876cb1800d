use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;

use crate::ecs::time::SimDate;
use crate::model::{BetrothalEnd, MarriageEnd};

/// One side of a betrothal. Each party holds its own record with its own id.
#[derive(Debug, Clone, PartialEq)]
pub struct Betrothal {
    pub id: u64,
    pub proposer: Entity,
    /// The other party, from the holder's point of view.
    pub betrothed: Entity,
    pub started: SimDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PastBetrothal {
    pub record: Betrothal,
    pub ended: SimDate,
    pub reason: BetrothalEnd,
}

/// Current betrothal plus an append-only history.
#[derive(Component, Debug, Clone, Default)]
pub struct BetrothalTracker {
    current: Option<Betrothal>,
    past: Vec<PastBetrothal>,
}

impl BetrothalTracker {
    pub fn current(&self) -> Option<&Betrothal> {
        self.current.as_ref()
    }

    pub fn past(&self) -> &[PastBetrothal] {
        &self.past
    }

    pub fn past_by_id(&self, id: u64) -> Option<&PastBetrothal> {
        self.past.iter().find(|p| p.record.id == id)
    }

    /// Install a new current betrothal. Any current record is terminated as
    /// `Broken` first so history is never lost.
    pub(crate) fn install(&mut self, record: Betrothal) {
        if self.current.is_some() {
            self.terminate(record.started, BetrothalEnd::Broken);
        }
        self.current = Some(record);
    }

    /// Move the current betrothal into history. Returns the archived entry.
    pub(crate) fn terminate(
        &mut self,
        ended: SimDate,
        reason: BetrothalEnd,
    ) -> Option<&PastBetrothal> {
        let record = self.current.take()?;
        self.past.push(PastBetrothal {
            record,
            ended,
            reason,
        });
        self.past.last()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marriage {
    pub id: u64,
    pub spouse: Entity,
    pub started: SimDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PastMarriage {
    pub record: Marriage,
    pub ended: SimDate,
    pub end: MarriageEnd,
}

#[derive(Component, Debug, Clone, Default)]
pub struct MarriageTracker {
    current: Option<Marriage>,
    past: Vec<PastMarriage>,
}

impl MarriageTracker {
    pub fn current(&self) -> Option<&Marriage> {
        self.current.as_ref()
    }

    pub fn past(&self) -> &[PastMarriage] {
        &self.past
    }

    pub fn is_married(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn install(&mut self, record: Marriage) {
        debug_assert!(self.current.is_none(), "installing over a live marriage");
        self.current = Some(record);
    }

    pub(crate) fn terminate(&mut self, ended: SimDate, end: MarriageEnd) -> Option<&PastMarriage> {
        let record = self.current.take()?;
        self.past.push(PastMarriage { record, ended, end });
        self.past.last()
    }
}

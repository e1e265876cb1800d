use bevy_ecs::resource::Resource;
use serde::Serialize;

use crate::ecs::time::SimDate;
use crate::model::EventKind;

/// A flushed event, ready for a storage collaborator. Entities are referenced
/// by sim id inside `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: u64,
    pub kind: EventKind,
    pub date: SimDate,
    pub description: String,
    pub data: serde_json::Value,
}

/// Accumulates event records between sink flushes.
#[derive(Resource, Debug, Clone, Default)]
pub struct EventLog {
    pub records: Vec<EventRecord>,
    last_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: EventKind,
        date: SimDate,
        description: String,
        data: serde_json::Value,
    ) -> u64 {
        self.last_id += 1;
        self.records.push(EventRecord {
            id: self.last_id,
            kind,
            date,
            description,
            data,
        });
        self.last_id
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Drop flushed records. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

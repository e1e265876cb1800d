use std::collections::{BTreeMap, BTreeSet};

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

use crate::ecs::error::SimError;
use crate::ecs::resources::OpinionRange;
use crate::ecs::time::SimDate;
use crate::model::RelationshipTag;

/// Directed edge: how `owner` regards `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub owner: Entity,
    pub target: Entity,
    opinion: i32,
    tags: BTreeSet<RelationshipTag>,
    active: bool,
    pub since: SimDate,
}

impl Relationship {
    fn new(owner: Entity, target: Entity, since: SimDate, active: bool) -> Self {
        Self {
            owner,
            target,
            opinion: 0,
            tags: BTreeSet::new(),
            active,
            since,
        }
    }

    pub fn opinion(&self) -> i32 {
        self.opinion
    }

    pub fn tags(&self) -> &BTreeSet<RelationshipTag> {
        &self.tags
    }

    pub fn has_tag(&self, tag: RelationshipTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Pairwise opinions between characters.
///
/// Edges exist in both directions or not at all; values may differ per
/// direction. Keyed by `(owner, target)` in a BTreeMap for deterministic
/// iteration. Opinion updates are additive and clamped to `range`.
#[derive(Resource, Debug, Clone, Default)]
pub struct RelationshipGraph {
    edges: BTreeMap<(Entity, Entity), Relationship>,
    /// Characters whose edges were deactivated. New edges touching them start inactive.
    retired: BTreeSet<Entity>,
    range: OpinionRange,
}

impl RelationshipGraph {
    pub fn new(range: OpinionRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    pub fn range(&self) -> OpinionRange {
        self.range
    }

    /// Create both directions of the edge if missing. Existing edges are left as is.
    fn ensure_pair(&mut self, a: Entity, b: Entity, now: SimDate) -> Result<(), SimError> {
        if a == b {
            return Err(SimError::Precondition(format!(
                "{a:?} cannot hold a relationship with itself"
            )));
        }
        let active = !self.retired.contains(&a) && !self.retired.contains(&b);
        self.edges
            .entry((a, b))
            .or_insert_with(|| Relationship::new(a, b, now, active));
        self.edges
            .entry((b, a))
            .or_insert_with(|| Relationship::new(b, a, now, active));
        Ok(())
    }

    /// The `a → b` edge, created lazily (together with `b → a`) on first access.
    pub fn get_relationship(
        &mut self,
        a: Entity,
        b: Entity,
        now: SimDate,
    ) -> Result<&Relationship, SimError> {
        self.ensure_pair(a, b, now)?;
        self.edges
            .get(&(a, b))
            .ok_or_else(|| SimError::Structural(format!("edge {a:?} -> {b:?} vanished")))
    }

    /// Read an edge without creating it.
    pub fn relationship(&self, a: Entity, b: Entity) -> Option<&Relationship> {
        self.edges.get(&(a, b))
    }

    /// Opinion `a` holds of `b`; 0 when no edge exists.
    pub fn opinion(&self, a: Entity, b: Entity) -> i32 {
        self.relationship(a, b).map_or(0, |r| r.opinion)
    }

    /// Add `delta` to `a`'s opinion of `b`, clamped to the configured range.
    /// Inactive edges are not updated. Returns the resulting opinion.
    pub fn adjust_opinion(
        &mut self,
        a: Entity,
        b: Entity,
        delta: i32,
        now: SimDate,
    ) -> Result<i32, SimError> {
        self.ensure_pair(a, b, now)?;
        let range = self.range;
        let edge = self
            .edges
            .get_mut(&(a, b))
            .ok_or_else(|| SimError::Structural(format!("edge {a:?} -> {b:?} vanished")))?;
        if edge.active {
            edge.opinion = range.clamp(edge.opinion.saturating_add(delta));
        }
        Ok(edge.opinion)
    }

    pub fn add_tag(
        &mut self,
        a: Entity,
        b: Entity,
        tag: RelationshipTag,
        now: SimDate,
    ) -> Result<(), SimError> {
        self.ensure_pair(a, b, now)?;
        if let Some(edge) = self.edges.get_mut(&(a, b)) {
            edge.tags.insert(tag);
        }
        Ok(())
    }

    pub fn remove_tag(&mut self, a: Entity, b: Entity, tag: RelationshipTag) {
        if let Some(edge) = self.edges.get_mut(&(a, b)) {
            edge.tags.remove(&tag);
        }
    }

    /// Flag every edge touching `character` inactive. Returns how many edges changed.
    pub fn deactivate_relationships(&mut self, character: Entity) -> usize {
        self.retired.insert(character);
        let mut changed = 0;
        for ((owner, target), edge) in self.edges.iter_mut() {
            if (*owner == character || *target == character) && edge.active {
                edge.active = false;
                changed += 1;
            }
        }
        changed
    }

    /// Move every active opinion `amount` points toward zero.
    pub fn decay(&mut self, amount: i32) {
        if amount <= 0 {
            return;
        }
        for edge in self.edges.values_mut().filter(|e| e.active) {
            edge.opinion = match edge.opinion {
                o if o > 0 => (o - amount).max(0),
                o if o < 0 => (o + amount).min(0),
                o => o,
            };
        }
    }

    /// Active outgoing edges of `owner`.
    pub fn edges_from(&self, owner: Entity) -> impl Iterator<Item = &Relationship> {
        self.edges
            .values()
            .filter(move |e| e.owner == owner && e.active)
    }

    /// Number of directed edges, active or not.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

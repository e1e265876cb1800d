use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SchemeKind {
    /// Seize the throne from the reigning ruler.
    Coup,
    /// Remove a single character from play.
    Assassination,
    /// Take the territory controlled by the target family.
    SeizeTerritory,
}

string_enum!(SchemeKind {
    Coup => "coup",
    Assassination => "assassination",
    SeizeTerritory => "seize_territory",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SchemeStatus {
    Forming,
    Active,
    Succeeded,
    Failed,
    Discovered,
    Abandoned,
}

string_enum!(SchemeStatus {
    Forming => "forming",
    Active => "active",
    Succeeded => "succeeded",
    Failed => "failed",
    Discovered => "discovered",
    Abandoned => "abandoned",
});

impl SchemeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SchemeStatus::Succeeded
                | SchemeStatus::Failed
                | SchemeStatus::Discovered
                | SchemeStatus::Abandoned
        )
    }
}

/// Why a scheme reached its terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SchemeOutcome {
    Completed,
    Discovered,
    EffectFailed,
    RecruitmentLapsed,
    NoParticipants,
    LeaderLeft,
    TargetRemoved,
    AbandonedByInitiator,
}

string_enum!(SchemeOutcome {
    Completed => "completed",
    Discovered => "discovered",
    EffectFailed => "effect_failed",
    RecruitmentLapsed => "recruitment_lapsed",
    NoParticipants => "no_participants",
    LeaderLeft => "leader_left",
    TargetRemoved => "target_removed",
    AbandonedByInitiator => "abandoned_by_initiator",
});

impl SchemeOutcome {
    /// The terminal status a scheme lands in for this outcome.
    pub fn status(self) -> SchemeStatus {
        match self {
            SchemeOutcome::Completed => SchemeStatus::Succeeded,
            SchemeOutcome::Discovered => SchemeStatus::Discovered,
            SchemeOutcome::EffectFailed | SchemeOutcome::RecruitmentLapsed => SchemeStatus::Failed,
            SchemeOutcome::NoParticipants
            | SchemeOutcome::LeaderLeft
            | SchemeOutcome::TargetRemoved
            | SchemeOutcome::AbandonedByInitiator => SchemeStatus::Abandoned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ParticipantRole {
    Initiator,
    Member,
}

string_enum!(ParticipantRole {
    Initiator => "initiator",
    Member => "member",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resolved_statuses_are_terminal() {
        let terminal: Vec<_> = SchemeStatus::ALL
            .iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal.len(), 4);
        assert!(!SchemeStatus::Forming.is_terminal());
        assert!(!SchemeStatus::Active.is_terminal());
    }

    #[test]
    fn every_outcome_maps_to_a_terminal_status() {
        for outcome in SchemeOutcome::ALL {
            assert!(outcome.status().is_terminal(), "{outcome}");
        }
        assert_eq!(SchemeOutcome::TargetRemoved.status(), SchemeStatus::Abandoned);
    }
}

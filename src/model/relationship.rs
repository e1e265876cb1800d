use serde::{Deserialize, Serialize};

/// Qualitative labels an edge can carry alongside its opinion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RelationshipTag {
    Rival,
    Friend,
    RomanticInterest,
    Conspirator,
}

string_enum!(RelationshipTag {
    Rival => "rival",
    Friend => "friend",
    RomanticInterest => "romantic_interest",
    Conspirator => "conspirator",
});

use serde::{Deserialize, Serialize};

/// Why a betrothal stopped being current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BetrothalEnd {
    Broken,
    Married,
    PartnerLeftPlay,
}

string_enum!(BetrothalEnd {
    Broken => "broken",
    Married => "married",
    PartnerLeftPlay => "partner_left_play",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MarriageEnd {
    Widowed,
    Annulled,
}

string_enum!(MarriageEnd {
    Widowed => "widowed",
    Annulled => "annulled",
});

/// Reason a proposed betrothal or marriage was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Ineligibility {
    SameCharacter,
    Inactive,
    AlreadyMarried,
    AlreadyBetrothed,
    BetrothedToAnother,
    LifeStage,
    Kinship,
}

string_enum!(Ineligibility {
    SameCharacter => "same character",
    Inactive => "not in play",
    AlreadyMarried => "already married",
    AlreadyBetrothed => "already betrothed",
    BetrothedToAnother => "betrothed to another",
    LifeStage => "incompatible life stage",
    Kinship => "too closely related",
});

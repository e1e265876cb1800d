use std::fmt;

use serde::{Deserialize, Serialize};

pub const ADOLESCENT_AGE: u32 = 13;
pub const YOUNG_ADULT_AGE: u32 = 20;
pub const ADULT_AGE: u32 = 30;
pub const SENIOR_AGE: u32 = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

string_enum!(Sex {
    Male => "male",
    Female => "female",
});

impl Sex {
    pub fn opposite(self) -> Self {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

/// Coarse age bracket. Ordering follows age, so `stage >= LifeStage::Adolescent`
/// reads as "at least adolescent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LifeStage {
    Child,
    Adolescent,
    YoungAdult,
    Adult,
    Senior,
}

string_enum!(LifeStage {
    Child => "child",
    Adolescent => "adolescent",
    YoungAdult => "young_adult",
    Adult => "adult",
    Senior => "senior",
});

impl LifeStage {
    pub fn from_age(years: u32) -> Self {
        match years {
            a if a >= SENIOR_AGE => LifeStage::Senior,
            a if a >= ADULT_AGE => LifeStage::Adult,
            a if a >= YOUNG_ADULT_AGE => LifeStage::YoungAdult,
            a if a >= ADOLESCENT_AGE => LifeStage::Adolescent,
            _ => LifeStage::Child,
        }
    }
}

/// Role flags carried on a character as a bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleFlags(u8);

impl RoleFlags {
    pub const NONE: RoleFlags = RoleFlags(0);
    pub const FAMILY_HEAD: RoleFlags = RoleFlags(1);
    pub const HEIR: RoleFlags = RoleFlags(1 << 1);
    pub const RULER: RoleFlags = RoleFlags(1 << 2);
    pub const DISINHERITED: RoleFlags = RoleFlags(1 << 3);

    const NAMES: [(RoleFlags, &'static str); 4] = [
        (RoleFlags::FAMILY_HEAD, "family_head"),
        (RoleFlags::HEIR, "heir"),
        (RoleFlags::RULER, "ruler"),
        (RoleFlags::DISINHERITED, "disinherited"),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: RoleFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: RoleFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: RoleFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: RoleFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: RoleFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for RoleFlags {
    type Output = RoleFlags;

    fn bitor(self, rhs: RoleFlags) -> RoleFlags {
        RoleFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for RoleFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// Relative groups considered, in a configurable order, when ranking heirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum KinGroup {
    Children,
    /// The current spouse, or the one left widowed by the vacating holder.
    Spouse,
    Siblings,
    /// Nephews and nieces, then aunts and uncles.
    Collateral,
}

string_enum!(KinGroup {
    Children => "children",
    Spouse => "spouse",
    Siblings => "siblings",
    Collateral => "collateral",
});

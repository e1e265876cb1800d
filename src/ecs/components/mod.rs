pub mod character;
pub mod common;
pub mod courtship;
pub mod family;
pub mod metrics;
pub mod scheme;

pub use character::{Character, Disposition, Kinship, Pregnancy};
pub use common::{Active, ComponentKind, SimComponent, SimEntity};
pub use courtship::{
    Betrothal, BetrothalTracker, Marriage, MarriageTracker, PastBetrothal, PastMarriage,
};
pub use family::{Family, Territory};
pub use metrics::CharacterMetrics;
pub use scheme::{Participation, Scheme, SchemeMembership, SchemeTarget};

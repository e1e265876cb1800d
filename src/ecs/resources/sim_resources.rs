use std::hash::{DefaultHasher, Hash, Hasher};

use bevy_ecs::resource::Resource;
use bevy_ecs::world::World;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::ecs::clock::SimClock;
use crate::model::NamePool;

/// Deterministic RNG for the simulation.
#[derive(Resource)]
pub struct SimRng {
    pub rng: SmallRng,
    pub seed: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Name tables used when generating characters.
#[derive(Resource, Debug, Clone, Default)]
pub struct Names(pub NamePool);

// ---------------------------------------------------------------------------
// Per-domain RNG resources
// ---------------------------------------------------------------------------

macro_rules! domain_rng {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Resource)]
        pub struct $name(pub SmallRng);

        impl Default for $name {
            fn default() -> Self {
                Self(SmallRng::seed_from_u64(0))
            }
        }
    };
}

domain_rng!(LifecycleRng, "Per-domain RNG for conception rolls.");
domain_rng!(CourtshipRng, "Per-domain RNG for betrothal matchmaking.");
domain_rng!(SchemeRng, "Per-domain RNG for scheme recruitment and discovery rolls.");

/// Derive a deterministic per-domain seed from the global seed, domain name, and tick count.
fn derive_domain_seed(seed: u64, domain: &str, tick: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    domain.hash(&mut hasher);
    tick.hash(&mut hasher);
    hasher.finish()
}

/// Exclusive system that re-seeds the per-domain RNGs each step.
/// Runs in `SimPhase::PreUpdate` before any domain systems, so a domain's
/// rolls never depend on how many draws another domain made.
pub fn distribute_rng(world: &mut World) {
    let seed = world.resource::<SimRng>().seed;
    let tick = world.resource::<SimClock>().tick_count;

    world.resource_mut::<LifecycleRng>().0 =
        SmallRng::seed_from_u64(derive_domain_seed(seed, "lifecycle", tick));
    world.resource_mut::<CourtshipRng>().0 =
        SmallRng::seed_from_u64(derive_domain_seed(seed, "courtship", tick));
    world.resource_mut::<SchemeRng>().0 =
        SmallRng::seed_from_u64(derive_domain_seed(seed, "schemes", tick));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_seeds_differ_by_domain_and_tick() {
        let a = derive_domain_seed(42, "courtship", 0);
        assert_eq!(a, derive_domain_seed(42, "courtship", 0));
        assert_ne!(a, derive_domain_seed(42, "schemes", 0));
        assert_ne!(a, derive_domain_seed(42, "courtship", 1));
    }
}

use rand::Rng;
use rand::RngCore;

use super::character::Sex;

const MASCULINE: &[&str] = &[
    "Aldric", "Bram", "Cedric", "Dorian", "Edmund", "Gareth", "Hadrian", "Ivo",
    "Jorund", "Kasimir", "Leoric", "Malcom", "Osric", "Roderick", "Tancred", "Wulfric",
];

const FEMININE: &[&str] = &[
    "Adela", "Brisa", "Cecily", "Edith", "Elowen", "Gisela", "Helewise", "Isolde",
    "Katrin", "Liora", "Matilda", "Odile", "Rowena", "Sibyl", "Ysolde", "Wenna",
];

const SURNAMES: &[&str] = &[
    "Ashford", "Blackthorn", "Brightwater", "Coldwell", "Dunmere", "Fairwind",
    "Greymoor", "Hartwood", "Ironhand", "Kingsward", "Oakshield", "Ravencrest",
];

/// Immutable name tables consulted by character generation.
///
/// Loaded once at world setup; nothing in the simulation mutates a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePool {
    masculine: Vec<String>,
    feminine: Vec<String>,
    surnames: Vec<String>,
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new(
            MASCULINE.iter().copied(),
            FEMININE.iter().copied(),
            SURNAMES.iter().copied(),
        )
    }
}

impl NamePool {
    pub fn new<'a>(
        masculine: impl IntoIterator<Item = &'a str>,
        feminine: impl IntoIterator<Item = &'a str>,
        surnames: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            masculine: collect_names(masculine),
            feminine: collect_names(feminine),
            surnames: collect_names(surnames),
        }
    }

    /// Build a pool from newline-separated name lists. Blank lines are ignored.
    pub fn from_lines(masculine: &str, feminine: &str, surnames: &str) -> Self {
        Self::new(masculine.lines(), feminine.lines(), surnames.lines())
    }

    /// Pick a first name for the given sex. Falls back to the other sex's list
    /// when one list is empty, and to `"Nameless"` when both are.
    pub fn pick_name(&self, sex: Sex, rng: &mut dyn RngCore) -> &str {
        let (primary, fallback) = match sex {
            Sex::Male => (&self.masculine, &self.feminine),
            Sex::Female => (&self.feminine, &self.masculine),
        };
        let list = if primary.is_empty() { fallback } else { primary };
        pick(list, rng).unwrap_or("Nameless")
    }

    pub fn pick_surname(&self, rng: &mut dyn RngCore) -> &str {
        pick(&self.surnames, rng).unwrap_or("Nameless")
    }

    pub fn len(&self) -> usize {
        self.masculine.len() + self.feminine.len() + self.surnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .collect()
}

fn pick<'a>(list: &'a [String], rng: &mut dyn RngCore) -> Option<&'a str> {
    if list.is_empty() {
        return None;
    }
    Some(list[rng.random_range(0..list.len())].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn picks_from_the_matching_list() {
        let pool = NamePool::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let name = pool.pick_name(Sex::Female, &mut rng);
            assert!(FEMININE.contains(&name), "{name} is not feminine");
        }
    }

    #[test]
    fn deterministic() {
        let pool = NamePool::default();
        let mut rng1 = SmallRng::seed_from_u64(123);
        let mut rng2 = SmallRng::seed_from_u64(123);
        assert_eq!(
            pool.pick_name(Sex::Male, &mut rng1),
            pool.pick_name(Sex::Male, &mut rng2)
        );
    }

    #[test]
    fn from_lines_skips_blanks() {
        let pool = NamePool::from_lines("Arn\n\n  \nBors\n", "", "Vale\n");
        assert_eq!(pool.len(), 3);
        let mut rng = SmallRng::seed_from_u64(1);
        let name = pool.pick_name(Sex::Female, &mut rng);
        assert!(name == "Arn" || name == "Bors");
        assert_eq!(pool.pick_surname(&mut rng), "Vale");
    }

    #[test]
    fn empty_pool_yields_placeholder() {
        let pool = NamePool::from_lines("", "", "");
        assert!(pool.is_empty());
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pool.pick_name(Sex::Male, &mut rng), "Nameless");
    }
}

//! Generated names for `wt new` without an explicit name.

use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "brisk", "clever", "dapper", "early", "fuzzy", "gentle", "hidden", "inky", "jumpy", "lucky",
    "mellow", "nimble", "orange", "plucky", "quirky", "rustic", "silent", "tiny", "upbeat", "velvet",
    "witty", "yellow", "zesty", "breezy", "cosmic", "dreamy", "frosty", "grassy", "humble", "lunar",
];

const NOUNS: &[&str] = &[
    "acorn", "badger", "canyon", "delta", "falcon", "glacier", "harbor", "island", "jungle", "kettle",
    "lagoon", "meadow", "nebula", "otter", "pebble", "quarry", "river", "summit", "thicket", "valley",
    "walrus", "yarrow", "beacon", "comet", "dune", "fjord", "grove", "hollow", "lantern", "marsh",
];

pub fn generate_name() -> String {
    let mut rng = rand::rng();
    let adj = ADJECTIVES.choose(&mut rng).copied().unwrap_or("new");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("worktree");
    format!("{adj}-{noun}")
}

/// A generated name for which `taken` returns false. Falls back to a
/// numbered suffix once random picks keep colliding.
pub fn generate_unique(taken: impl Fn(&str) -> bool) -> String {
    for _ in 0..64 {
        let name = generate_name();
        if !taken(&name) {
            return name;
        }
    }
    let base = generate_name();
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

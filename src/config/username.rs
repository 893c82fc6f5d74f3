//! Random username generator.
//!
//! Produces names in the format `AdjectiveNounNN` (e.g. `NeonFox42`). The
//! result never contains whitespace, so it is always a valid `login` argument.

use rand::RngExt;

const ADJECTIVES: &[&str] = &[
    "Shadow", "Neon", "Cyber", "Lunar", "Solar", "Frost", "Storm", "Pixel", "Ghost", "Hyper",
    "Turbo", "Cosmic", "Iron", "Velvet", "Crimson", "Silent", "Rogue", "Atomic", "Rapid", "Nova",
    "Onyx", "Cobalt", "Azure", "Chrome", "Prism",
];

const NOUNS: &[&str] = &[
    "Fox", "Wolf", "Hawk", "Raven", "Lynx", "Viper", "Shark", "Falcon", "Panda", "Tiger", "Owl",
    "Dragon", "Jaguar", "Mantis", "Otter", "Hound", "Crow", "Bear", "Coyote", "Moth", "Newt",
    "Crane", "Bison", "Byte", "Node",
];

pub fn generate_username() -> String {
    let mut rng = rand::rng();
    let adj = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    let num: u8 = rng.random_range(0..100);
    format!("{}{}{}", adj, noun, num)
}

use crate::constants::RANDOM_STRING_SOURCE;
use rand::{rngs::OsRng, Rng};

/// Generate a random string of `n` characters from the 64-symbol alphabet
/// in [`RANDOM_STRING_SOURCE`].
///
/// The upload handler uses this for stored file names, so the characters are
/// drawn from the OS RNG rather than a seedable generator.
pub fn random_string(n: usize) -> String {
    let source: Vec<char> = RANDOM_STRING_SOURCE.chars().collect();
    let mut rng = OsRng;

    (0..n).map(|_| source[rng.gen_range(0..source.len())]).collect()
}

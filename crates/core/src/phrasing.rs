//! Flavor text selection.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Picks one of several equivalent message variants.
///
/// Returns an empty string for an empty variant list.
pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, variants: &[&'a str]) -> &'a str {
    variants.choose(rng).copied().unwrap_or_default()
}

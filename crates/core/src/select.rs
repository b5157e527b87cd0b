//! Weighted variant selection.

use rand::Rng;

use crate::types::Variant;

/// Total effective weight of a variant set; weights below 1 count as 1.
pub fn total_weight(variants: &[Variant]) -> u64 {
    variants.iter().map(Variant::effective_weight).sum()
}

/// Weighted roulette selection over the variants in their stored order.
///
/// Draws uniformly in `[1, total]` and walks the cumulative weights; the
/// first variant whose cumulative bound reaches the draw wins, which also
/// settles ties by stored order.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    variants: &'a [Variant],
    rng: &mut R,
) -> Option<&'a Variant> {
    if variants.is_empty() {
        return None;
    }
    let draw = rng.random_range(1..=total_weight(variants));
    let mut cumulative = 0u64;
    for variant in variants {
        cumulative += variant.effective_weight();
        if draw <= cumulative {
            return Some(variant);
        }
    }
    variants.last()
}

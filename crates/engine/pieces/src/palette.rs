//! Pools used to fill in colors and footprints a provider leaves out.
//!
//! Picking takes the RNG as a parameter so callers decide between entropy
//! (live requests) and a seeded generator (tests, reproducible runs).

use rand::Rng;

/// LEGO-like hex colors: red, blue, green, yellow, purple, pink, cyan,
/// lime, orange, indigo
pub const LEGO_COLORS: [&str; 10] = [
    "#ef4444", "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
    "#f97316", "#6366f1",
];

/// Common brick footprints
pub const DIMENSIONS: [&str; 9] = [
    "1x1", "1x2", "1x4", "2x2", "2x4", "1x6", "2x6", "1x8", "2x8",
];

pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    LEGO_COLORS[rng.random_range(0..LEGO_COLORS.len())]
}

pub fn random_dimensions<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    DIMENSIONS[rng.random_range(0..DIMENSIONS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_picks_are_reproducible() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(random_color(&mut a), random_color(&mut b));
            assert_eq!(random_dimensions(&mut a), random_dimensions(&mut b));
        }
    }

    #[test]
    fn test_picks_come_from_pools() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            assert!(LEGO_COLORS.contains(&random_color(&mut rng)));
            assert!(DIMENSIONS.contains(&random_dimensions(&mut rng)));
        }
    }
}

//! Deterministic seed derivation and the per-worker RNG.
//!
//! Every stage that needs randomness gets its own seed, derived from one `base_seed` by
//! [`mix`]. No RNG is ever shared across threads: each CA worker builds its own [`Rng`] from
//! [`SeedChain::ca_seed`].

/// Salt constants distinguishing each stage's derived seed. Arbitrary but fixed — changing any of
/// these changes every seed downstream of it.
const POISSON_SALT: u64 = 0x9E37_79B1;
const TRAVERSAL_SALT: u64 = 0x85EB_CA6B;
const CA_SALT: u64 = 0xC2B2_AE35;

/// Seed value substituted whenever a derivation would otherwise collapse to zero.
const FIXED_NONZERO_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Normalizes a seed so the RNG state never degenerates to zero.
#[must_use]
pub fn normalize_seed(seed: u64) -> u64 {
    if seed == 0 {
        FIXED_NONZERO_SEED
    } else {
        seed
    }
}

/// Fixed integer mixing function shared by every component that derives a secondary seed from a
/// base seed and a salt (e.g. per-cell CA seed = `mix(mix(base, CA_SALT), cell_index)`).
#[must_use]
pub fn mix(base: u64, salt: u64) -> u64 {
    let mut x = base ^ salt.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = x.wrapping_add((x << 6).wrapping_add(x >> 2));
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 15;
    normalize_seed(x)
}

/// Immutable record of the seeds driving one `generate` call.
///
/// Identical `SeedChain` ⇒ identical pipeline output ([`crate::generate`] property 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedChain {
    pub base_seed: u64,
    pub poisson_seed: u64,
    pub traversal_seed: u64,
}

impl SeedChain {
    /// Derives `poisson_seed` and `traversal_seed` from `base_seed`.
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        Self::with_overrides(base_seed, None, None)
    }

    /// Like [`SeedChain::new`], but a pinned non-zero override is used verbatim instead of being
    /// derived from `base_seed`.
    #[must_use]
    pub fn with_overrides(
        base_seed: u64,
        poisson_override: Option<u64>,
        traversal_override: Option<u64>,
    ) -> Self {
        let base = normalize_seed(base_seed);
        let poisson_seed = match poisson_override {
            Some(v) if v != 0 => v,
            _ => mix(base, POISSON_SALT),
        };
        let traversal_seed = match traversal_override {
            Some(v) if v != 0 => v,
            _ => mix(base, TRAVERSAL_SALT),
        };
        Self {
            base_seed: base,
            poisson_seed,
            traversal_seed,
        }
    }

    /// Derives the seed for cell `cell_index`'s CA worker.
    #[must_use]
    pub fn ca_seed(&self, cell_index: usize) -> u64 {
        mix(mix(self.base_seed, CA_SALT), cell_index as u64)
    }
}

/// Splitmix64-style finalizer used to scramble an RNG's initial state.
fn splitmix64_finalize(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Deterministic xorshift*-style RNG with a scrambled initial state.
///
/// Each worker constructs its own instance from a seed derived via [`mix`]; no instance is ever
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Builds an RNG from a 32-bit seed lifted to 64 bits and run through a splitmix-style
    /// finalizer. A zero result collapses to a fixed non-zero constant.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let lifted = seed as u32 as u64;
        let scrambled = splitmix64_finalize(lifted);
        Self {
            state: normalize_seed(scrambled),
        }
    }

    /// Next 64-bit xorshift* output.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform float in `[0, 1)`, built from the top 24 bits of a `next_u64` sample.
    pub fn next_f32(&mut self) -> f32 {
        let top24 = (self.next_u64() >> 40) as u32;
        top24 as f32 / (1u32 << 24) as f32
    }

    /// Uniform integer in `[lo, hi]` (inclusive), via `sample mod (hi - lo + 1)`.
    pub fn next_int(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(hi >= lo);
        let span = (hi - lo + 1) as u64;
        lo + (self.next_u64() % span) as i64
    }
}

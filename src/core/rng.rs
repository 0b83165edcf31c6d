//! Deterministic random number generation.
//!
//! Every random decision in a room (role dealing, corruption rolls,
//! invisibility redirects) flows through one seeded [`GameRng`], so a
//! room constructed with the same seed and fed the same submissions
//! replays identically. Balance simulations rely on this.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for one room.
///
/// Uses ChaCha8 for speed while keeping a high-quality stream, and keeps
/// the original seed around so it can be logged and replayed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG from entropy, keeping the drawn seed recorded so the
    /// room stays replayable.
    #[must_use]
    pub fn with_random_seed() -> Self {
        Self::new(rand::random())
    }

    /// The seed this RNG was built from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll against a probability. Values outside `[0, 1]` are clamped,
    /// so a scaled-up chance above certainty simply always succeeds.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Generate a random usize in the given range.
    pub fn gen_range(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn pick<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Draw `count` distinct indices out of `0..len`, in random order.
    ///
    /// Returns fewer than `count` when `len` is too small.
    pub fn pick_indices(&mut self, count: usize, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        self.shuffle(&mut indices);
        indices.truncate(count);
        indices
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Capture the current state for checkpointing.
    ///
    /// Uses the ChaCha8 word position, so capture is O(1) no matter how
    /// far the stream has advanced.
    #[must_use]
    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a captured state.
    #[must_use]
    pub fn from_state(state: &RngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state for checkpointing a room mid-game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}

//! Sources of verifier randomness.
//!
//! Every source absorbs prover messages and squeezes challenge bytes. Long
//! challenge vectors are expanded from a 32-byte squeezed seed with ChaCha20.

use super::field_utils::LigeroField;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

pub trait ChallengeSource {
    fn absorb(&mut self, label: &'static [u8], data: &[u8]);

    fn squeeze(&mut self, label: &'static [u8], output: &mut [u8]);

    fn challenge_seed(&mut self, label: &'static [u8]) -> [u8; 32] {
        let mut seed = [0u8; 32];
        self.squeeze(label, &mut seed);
        seed
    }

    fn challenge_field<F: LigeroField>(&mut self, label: &'static [u8]) -> F
    where
        Self: Sized,
    {
        let mut bytes = vec![0u8; F::BYTE_LEN + 16];
        self.squeeze(label, &mut bytes);
        F::from_uniform_bytes(&bytes)
    }

    fn challenge_vector<F: LigeroField>(&mut self, label: &'static [u8], len: usize) -> Vec<F>
    where
        Self: Sized,
    {
        let mut rng = ChaCha20Rng::from_seed(self.challenge_seed(label));
        (0..len).map(|_| F::random(&mut rng)).collect()
    }

    /// `count` uniform draws from `0..domain_size`, sorted, duplicates removed.
    fn challenge_positions(
        &mut self,
        label: &'static [u8],
        count: usize,
        domain_size: usize,
    ) -> Vec<usize>
    where
        Self: Sized,
    {
        let mut rng = ChaCha20Rng::from_seed(self.challenge_seed(label));
        let mut positions: Vec<usize> = (0..count).map(|_| rng.gen_range(0..domain_size)).collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}

/// SHA-256 Fiat–Shamir transcript.
#[derive(Clone)]
pub struct Transcript {
    state: Sha256,
    counter: u64,
}

impl Transcript {
    pub fn new(label: &[u8]) -> Self {
        let mut state = Sha256::new();
        state.update(b"ligero.transcript");
        state.update((label.len() as u64).to_le_bytes());
        state.update(label);
        Self { state, counter: 0 }
    }

    pub fn append_message(&mut self, label: &[u8], data: &[u8]) {
        self.state.update((label.len() as u64).to_le_bytes());
        self.state.update(label);
        self.state.update((data.len() as u64).to_le_bytes());
        self.state.update(data);
    }

    pub fn challenge_bytes(&mut self, label: &[u8], output: &mut [u8]) {
        let mut offset = 0usize;
        let mut chunk_index: u32 = 0;
        while offset < output.len() {
            let mut hasher = self.state.clone();
            hasher.update((label.len() as u64).to_le_bytes());
            hasher.update(label);
            hasher.update(self.counter.to_le_bytes());
            hasher.update(chunk_index.to_le_bytes());
            let digest = hasher.finalize();
            let take = (output.len() - offset).min(digest.len());
            output[offset..offset + take].copy_from_slice(&digest[..take]);
            offset += take;
            chunk_index = chunk_index.wrapping_add(1);
        }
        self.append_message(label, output);
        self.counter = self.counter.wrapping_add(1);
    }
}

impl ChallengeSource for Transcript {
    fn absorb(&mut self, label: &'static [u8], data: &[u8]) {
        self.append_message(label, data);
    }

    fn squeeze(&mut self, label: &'static [u8], output: &mut [u8]) {
        self.challenge_bytes(label, output);
    }
}

/// STROBE-based transcript from the `merlin` crate.
pub struct MerlinChallenges {
    inner: merlin::Transcript,
}

impl MerlinChallenges {
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            inner: merlin::Transcript::new(label),
        }
    }
}

impl ChallengeSource for MerlinChallenges {
    fn absorb(&mut self, label: &'static [u8], data: &[u8]) {
        self.inner.append_message(label, data);
    }

    fn squeeze(&mut self, label: &'static [u8], output: &mut [u8]) {
        self.inner.challenge_bytes(label, output);
    }
}

/// Fresh randomness for the interactive protocol. Absorbed messages are
/// ignored: an interactive verifier's coins do not depend on them.
pub struct RandomChallenges<R: RngCore = ChaCha20Rng> {
    rng: R,
}

impl RandomChallenges<ChaCha20Rng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Reproducible coins for tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore> RandomChallenges<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> ChallengeSource for RandomChallenges<R> {
    fn absorb(&mut self, _label: &'static [u8], _data: &[u8]) {}

    fn squeeze(&mut self, _label: &'static [u8], output: &mut [u8]) {
        self.rng.fill_bytes(output);
    }
}

//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed stored on the Run record.
//!
//! Each subsystem gets its own RNG stream per tick, seeded from
//! (master_seed, subsystem_index, tick). Start commands that need
//! randomness (colonization's initial events) draw from a command
//! stream keyed by a per-run sequence number instead.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform integer in [lo, hi]. Returns `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_u64_below(hi - lo + 1)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// All subsystem RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Stream for one subsystem's update at one tick.
    pub fn for_subsystem_at_tick(&self, slot: SubsystemSlot, tick: u64) -> SubsystemRng {
        let seed = self.master_seed ^ tick.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        SubsystemRng::new(seed, slot as u64).with_name(slot.name())
    }

    /// Stream for a start command issued outside the tick loop.
    /// `sequence` must be unique per command within a run.
    pub fn for_command(&self, slot: SubsystemSlot, sequence: u64) -> SubsystemRng {
        let seed = self.master_seed ^ sequence.wrapping_mul(0x94d0_49bb_1331_11eb);
        SubsystemRng::new(seed, slot as u64 | 0x100).with_name(slot.name())
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Colonization = 0,
    Development = 1,
    Building = 2,
    Technology = 3,
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Colonization => "colonization",
            Self::Development => "development",
            Self::Building => "building",
            Self::Technology => "technology",
        }
    }
}

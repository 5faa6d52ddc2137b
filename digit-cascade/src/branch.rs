//! Search nodes: one partial, self-consistent digit assignment to both
//! factors, plus the replayable solution path.

use factoring_core::PowerCache;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::Serialize;

/// One digit choice along a branch, suitable for external replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStep {
    /// 1-based digit position.
    pub position: usize,
    pub p_digit: u32,
    pub q_digit: u32,
}

/// A partial digit assignment to the factor pair, up to position `k - 1`.
///
/// Branches are immutable once created: extension produces fresh child
/// nodes, and the partial values are carried incrementally so they are
/// never recomputed from the digit histories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Next digit position to assign (1-based).
    pub k: usize,
    /// Digits assigned to P so far, least significant first (length k - 1).
    pub p_digits: Vec<u32>,
    /// Digits assigned to Q so far, least significant first (length k - 1).
    pub q_digits: Vec<u32>,
    /// Integer value of `p_digits`.
    pub p_value: BigUint,
    /// Integer value of `q_digits`.
    pub q_value: BigUint,
    /// Carry entering position `k` from the previous position's convolution.
    pub carry_in: BigUint,
}

impl Branch {
    /// The empty node the search starts from: no digits fixed, no carry.
    pub fn root() -> Self {
        Branch {
            k: 1,
            p_digits: Vec::new(),
            q_digits: Vec::new(),
            p_value: BigUint::zero(),
            q_value: BigUint::zero(),
            carry_in: BigUint::zero(),
        }
    }

    /// Number of digit positions already fixed.
    pub fn fixed_digits(&self) -> usize {
        self.k - 1
    }

    /// Extend this node with one digit pair at position `k`, producing the
    /// child at position `k + 1`. `carry_out` is the carry the recurrence
    /// computed for the pair.
    pub(crate) fn child(
        &self,
        p_digit: u32,
        q_digit: u32,
        carry_out: BigUint,
        powers: &PowerCache,
    ) -> Branch {
        let place = powers.get(self.k - 1);

        let mut p_digits = Vec::with_capacity(self.k);
        p_digits.extend_from_slice(&self.p_digits);
        p_digits.push(p_digit);

        let mut q_digits = Vec::with_capacity(self.k);
        q_digits.extend_from_slice(&self.q_digits);
        q_digits.push(q_digit);

        Branch {
            k: self.k + 1,
            p_digits,
            q_digits,
            p_value: &self.p_value + place * p_digit,
            q_value: &self.q_value + place * q_digit,
            carry_in: carry_out,
        }
    }

    /// The ordered sequence of digit choices that produced this node.
    pub fn path(&self) -> Vec<PathStep> {
        self.p_digits
            .iter()
            .zip(self.q_digits.iter())
            .enumerate()
            .map(|(i, (&p_digit, &q_digit))| PathStep {
                position: i + 1,
                p_digit,
                q_digit,
            })
            .collect()
    }
}

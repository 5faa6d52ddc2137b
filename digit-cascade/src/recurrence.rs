//! The per-position work function: enumerate every digit pair at the
//! branch's next position and keep the pairs whose positional product sum
//! reproduces the target digit with a viable carry.
//!
//! For a branch at position k the convolution sum is
//! Σ_{i=1..k} p_i · q_{k-i+1}, where p_k and q_k are the candidate pair and
//! every other digit comes from the branch's history. The interior terms
//! (i = 2..k-1) depend only on history, so they are accumulated once per
//! branch and reused across the whole base² sweep.

use factoring_core::PowerCache;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::branch::Branch;

/// Extend `branch` by one digit position against `target` (least
/// significant digit first). Returns every child whose digit pair satisfies
/// the positional constraint; each child still has to pass the feasibility
/// cascade before joining the next frontier.
///
/// A position outside `1..=target.len()` yields no children — a boundary
/// guard, not an error.
pub fn extend(branch: &Branch, target: &[u32], powers: &PowerCache) -> Vec<Branch> {
    let k = branch.k;
    if k < 1 || k > target.len() {
        return Vec::new();
    }

    let base = powers.base();
    let base_big = BigUint::from(base);
    let target_digit = BigUint::from(target[k - 1]);
    let final_position = k == target.len();

    // Interior convolution terms, fixed for this branch.
    let mut interior = BigUint::zero();
    for i in 2..k {
        let p_i = branch.p_digits[i - 1] as u64;
        let q_rev = branch.q_digits[k - i] as u64;
        interior += BigUint::from(p_i * q_rev);
    }

    // Largest convolution sum reachable at this depth bounds the carry a
    // surviving pair may emit.
    let max_contribution = BigUint::from(base - 1) * BigUint::from(base - 1) * BigUint::from(k);
    let carry_cap = (&max_contribution + &branch.carry_in) / &base_big;

    // Edge digits of the histories (positions 1 and k overlap at k == 1,
    // where the candidate pair multiplies only itself).
    let p_first = branch.p_digits.first().copied().unwrap_or(0) as u64;
    let q_first = branch.q_digits.first().copied().unwrap_or(0) as u64;

    let mut children = Vec::new();
    for p_digit in 0..base {
        let p_edge = p_digit as u128 * q_first as u128;
        for q_digit in 0..base {
            let sum = if k == 1 {
                BigUint::from(p_digit as u64 * q_digit as u64)
            } else {
                &interior + BigUint::from(p_edge + p_first as u128 * q_digit as u128)
            };

            let total = sum + &branch.carry_in;
            if total < target_digit {
                continue;
            }
            let remainder = total - &target_digit;
            if !(&remainder % &base_big).is_zero() {
                continue;
            }
            let carry_out = remainder / &base_big;
            if carry_out > carry_cap {
                continue;
            }
            if final_position && !carry_out.is_zero() {
                continue;
            }

            children.push(branch.child(p_digit, q_digit, carry_out, powers));
        }
    }

    children
}

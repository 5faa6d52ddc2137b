//! Scaling study for the digit-cascade engine.
//!
//! Runs the search on seeded semiprimes of increasing bit size, measuring
//! time, candidate counts, and peak frontier width to expose how the search
//! tree grows with the digit count. A wall-clock budget is enforced between
//! frontier transitions: the engine suspends only at position boundaries,
//! so the budget check sits exactly there.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use digit_cascade::{DigitSearch, SearchState, PRIMARY_BASE};
use factoring_core::{generate_rsa_target, RsaTarget};

/// Wall-clock budget per target.
const BUDGET: Duration = Duration::from_secs(30);

/// Drive a search to termination or until the budget runs out. The budget
/// is only consulted between transitions, so a cancelled run still ends on
/// a complete frontier.
fn run_with_budget(search: &mut DigitSearch, budget: Duration) -> (bool, Duration) {
    let start = Instant::now();
    while !search.state().is_terminal() {
        if start.elapsed() >= budget {
            return (false, start.elapsed());
        }
        search.advance();
    }
    (true, start.elapsed())
}

fn main() {
    println!("================================================================");
    println!("  SCALING: digit-cascade frontier growth by target size");
    println!("================================================================");
    println!();

    let mut rng = StdRng::seed_from_u64(12345);

    let bit_sizes: Vec<u32> = vec![8, 10, 12, 14, 16, 18, 20, 22, 24];
    let targets: Vec<RsaTarget> = bit_sizes
        .iter()
        .map(|&bits| generate_rsa_target(bits, &mut rng))
        .collect();

    println!("Test semiprimes:");
    for t in &targets {
        println!("  {:>2}-bit: N = {} = {} x {}", t.bit_size, t.n, t.p, t.q);
    }
    println!();

    println!(
        "  {:>4} | {:>6} | {:>8} | {:>10} | {:>10} | {:>9}",
        "bits", "digits", "status", "visited", "peak width", "time"
    );
    println!("  {}", "-".repeat(62));

    for target in &targets {
        let mut search =
            DigitSearch::new(target.n.clone(), PRIMARY_BASE).expect("positive target");
        let digit_count = search.total_digits();
        let (finished, elapsed) = run_with_budget(&mut search, BUDGET);

        let status = match search.state() {
            SearchState::Solved { .. } => "solved",
            SearchState::Exhausted => "exhausted",
            SearchState::Running { .. } if !finished => "budget",
            SearchState::Running { .. } => "running",
        };

        let stats = search.stats();
        println!(
            "  {:>4} | {:>6} | {:>8} | {:>10} | {:>10} | {:>7.1}ms",
            target.bit_size,
            digit_count,
            status,
            stats.candidates_visited,
            stats.max_frontier_width,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    println!();
    println!("Done.");
}

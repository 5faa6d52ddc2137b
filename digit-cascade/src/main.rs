//! Digit-cascade experiment runner.
//!
//! Sweeps seeded semiprime targets across bit sizes, runs the digit search
//! in the primary base and across the exploration bases, and outputs JSON
//! results.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use digit_cascade::{explore_bases, DigitSearch, SearchState, EXPLORATION_BASES, PRIMARY_BASE};
use factoring_core::{generate_rsa_target, to_base};

#[derive(Serialize)]
struct SearchResult {
    bit_size: u32,
    n: String,
    digit_count: usize,
    solved: bool,
    p: Option<String>,
    q: Option<String>,
    verified: bool,
    candidates_visited: u64,
    pruned_total: u64,
    max_frontier_width: usize,
    time_ms: f64,
}

#[derive(Serialize)]
struct BaseSweepResult {
    base: u32,
    digit_count: usize,
    solved: bool,
    candidates_visited: u64,
    max_frontier_width: usize,
}

#[derive(Serialize)]
struct FullReport {
    experiment: String,
    description: String,
    primary_base: u32,
    primary_runs: Vec<SearchResult>,
    base_sweep_n: String,
    base_sweep: Vec<BaseSweepResult>,
}

fn main() {
    env_logger::init();

    let max_bits: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(20);
    let output_path: Option<String> = std::env::args().nth(2);

    println!("=== Digit Cascade: positional factor search ===");
    println!();

    let mut rng = StdRng::seed_from_u64(42);
    let mut primary_runs = Vec::new();

    // Section 1: primary-base sweep over seeded semiprimes
    println!("--- Section 1: Base-{} Searches ---", PRIMARY_BASE);
    let mut bits = 8u32;
    while bits <= max_bits {
        let target = generate_rsa_target(bits, &mut rng);
        let digit_count = to_base(&target.n, PRIMARY_BASE).len();

        let start = Instant::now();
        let mut search =
            DigitSearch::new(target.n.clone(), PRIMARY_BASE).expect("positive target");
        search.run();
        let elapsed = start.elapsed();

        let (solved, p, q) = match search.state() {
            SearchState::Solved { p, q, .. } => (true, Some(p.clone()), Some(q.clone())),
            _ => (false, None, None),
        };
        let verified = match (&p, &q) {
            (Some(p), Some(q)) => p * q == target.n,
            _ => false,
        };
        let stats = search.stats();

        println!(
            "  {:>2}-bit: N = {:>8} ({} digits): [{}] {} visited, frontier <= {}, {:.1}ms{}",
            bits,
            target.n,
            digit_count,
            if solved { "SOLVED" } else { "OPEN" },
            stats.candidates_visited,
            stats.max_frontier_width,
            elapsed.as_secs_f64() * 1000.0,
            if verified { " [verified]" } else { "" }
        );

        primary_runs.push(SearchResult {
            bit_size: bits,
            n: target.n.to_string(),
            digit_count,
            solved,
            p: p.map(|v| v.to_string()),
            q: q.map(|v| v.to_string()),
            verified,
            candidates_visited: stats.candidates_visited,
            pruned_total: stats.pruned.total(),
            max_frontier_width: stats.max_frontier_width,
            time_ms: elapsed.as_secs_f64() * 1000.0,
        });

        bits += 4;
    }

    // Section 2: one target across the exploration bases
    println!();
    println!("--- Section 2: Multi-Base Sweep ---");
    let sweep_target = generate_rsa_target(16, &mut rng);
    println!(
        "  N = {} = {} x {}",
        sweep_target.n, sweep_target.p, sweep_target.q
    );

    let outcomes =
        explore_bases(&sweep_target.n, EXPLORATION_BASES).expect("valid bases and target");
    let mut base_sweep = Vec::new();
    for outcome in &outcomes {
        println!(
            "  base {:>2}: {:>3} digits, [{}], {} visited, frontier <= {}",
            outcome.base,
            outcome.digit_count,
            if outcome.solved() { "SOLVED" } else { "OPEN" },
            outcome.stats.candidates_visited,
            outcome.stats.max_frontier_width
        );
        base_sweep.push(BaseSweepResult {
            base: outcome.base,
            digit_count: outcome.digit_count,
            solved: outcome.solved(),
            candidates_visited: outcome.stats.candidates_visited,
            max_frontier_width: outcome.stats.max_frontier_width,
        });
    }

    let report = FullReport {
        experiment: "digit-cascade".to_string(),
        description: "Digit-by-digit factor search with feasibility pruning".to_string(),
        primary_base: PRIMARY_BASE,
        primary_runs,
        base_sweep_n: sweep_target.n.to_string(),
        base_sweep,
    };

    let json = serde_json::to_string_pretty(&report).unwrap();
    println!();
    match output_path {
        Some(path) => {
            std::fs::write(&path, &json).expect("failed to write report");
            println!("Report written to {}", path);
        }
        None => {
            println!("--- JSON Report ---");
            println!("{}", json);
        }
    }
}

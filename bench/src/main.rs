use std::time::Instant;

use friendgraph_core::{suggest, FriendGraph};
use log::debug;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let user_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: friendgraph-bench [mode] [user_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random friendships");
        println!();
        println!("Default user_count: 100000");
        return;
    }

    println!("friendgraph-bench");
    println!("=================");
    println!();

    let generators: Vec<(&str, fn(usize) -> FriendGraph)> = match mode {
        "scalefree" => vec![("Scale-free (edge sampling)", gen_scale_free)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "all" => vec![
            ("Scale-free (edge sampling)", gen_scale_free as fn(usize) -> FriendGraph),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, user_count);
    }
}

fn run_benchmark(name: &str, generator: fn(usize) -> FriendGraph, user_count: usize) {
    println!("--- {} ---", name);
    println!("Target: {} users", user_count);

    let t = Instant::now();
    let graph = generator(user_count);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s — {} friendships, max degree {}",
        gen_time.as_secs_f64(),
        graph.edge_count(),
        (0..graph.capacity()).map(|u| graph.degree(u)).max().unwrap_or(0)
    );

    // Suggestion latency from a spread of source users. Node 0 is a hub
    // in the scale-free topology and an arbitrary user elsewhere.
    println!();
    println!("{:>10} {:>8} {:>12} {:>10}", "source", "degree", "suggestions", "time");
    println!("{:->10} {:->8} {:->12} {:->10}", "", "", "", "");

    let sources = [0, user_count / 7, user_count / 3, user_count / 2, user_count - 1];
    for &source in &sources {
        let t = Instant::now();
        let result = suggest(&graph, source);
        let elapsed = t.elapsed();
        match result {
            Ok(suggestions) => {
                if let Some(top) = suggestions.first() {
                    debug!(
                        "top suggestion for {}: {} (score {:.1})",
                        source, top.user_id, top.score
                    );
                }
                println!(
                    "{:>10} {:>8} {:>12} {:>8.2}ms",
                    source,
                    graph.degree(source),
                    suggestions.len(),
                    elapsed.as_secs_f64() * 1000.0
                );
            }
            Err(e) => println!("{:>10} {:>8} {:>12}", source, "-", format!("({})", e)),
        }
    }

    // Worst case: sweep every user once and report the aggregate rate.
    let t = Instant::now();
    let mut total = 0usize;
    for source in 0..graph.capacity() {
        if let Ok(suggestions) = suggest(&graph, source) {
            total += suggestions.len();
        }
    }
    let elapsed = t.elapsed();
    println!();
    println!(
        "Full sweep: {} suggestions across {} users in {:.2}s ({:.0} users/s)",
        total,
        graph.capacity(),
        elapsed.as_secs_f64(),
        graph.capacity() as f64 / elapsed.as_secs_f64()
    );
    println!();
}

// ---------------------------------------------------------------------------
// Generators — all O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) % max as u64) as usize
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Scale-free via edge-list sampling (O(edges), not O(n²)).
///
/// Preferential attachment by picking a random existing edge endpoint.
/// Users with more friends are more likely to gain another — a few
/// hubs emerge, like real social graphs.
fn gen_scale_free(user_count: usize) -> FriendGraph {
    let friends_per_user = 5;
    let mut graph = FriendGraph::new(user_count);
    let mut rng = FastRng::new(12345);

    // Endpoint list for O(1) degree-proportional sampling.
    let mut endpoints: Vec<usize> = Vec::with_capacity(user_count * friends_per_user * 2);

    // Seed: small clique
    let seed = 5.min(user_count);
    for i in 0..seed {
        for j in (i + 1)..seed {
            if graph.add_edge(i, j).is_ok() {
                endpoints.push(i);
                endpoints.push(j);
            }
        }
    }

    for new_user in seed..user_count {
        let attach = friends_per_user.min(new_user);
        for _ in 0..attach {
            let target = endpoints[rng.next(endpoints.len())];
            if graph.add_edge(new_user, target).is_ok() {
                endpoints.push(new_user);
                endpoints.push(target);
            }
        }
    }

    graph
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Everyone is friends with their K nearest neighbors on a ring, with a
/// few long-range shortcuts. High clustering, short paths — the classic
/// "friend of a friend" topology the suggestion engine thrives on.
fn gen_small_world(user_count: usize) -> FriendGraph {
    let k = 5; // neighbors on each side
    let p = 0.05f64; // rewire probability
    let mut graph = FriendGraph::new(user_count);
    let mut rng = FastRng::new(67890);

    for i in 0..user_count {
        for j in 1..=k {
            let neighbor = (i + j) % user_count;
            if rng.next_f64() < p {
                let rewired = rng.next(user_count);
                let _ = graph.add_edge(i, rewired);
            } else {
                let _ = graph.add_edge(i, neighbor);
            }
        }
    }

    graph
}

/// Erdos-Renyi: uniform random friendships, ~6 per user on average.
/// Baseline topology with no community structure.
fn gen_random(user_count: usize) -> FriendGraph {
    let target_edges = user_count * 3;
    let mut graph = FriendGraph::new(user_count);
    let mut rng = FastRng::new(54321);

    for _ in 0..target_edges {
        let u = rng.next(user_count);
        let v = rng.next(user_count);
        let _ = graph.add_edge(u, v);
    }

    graph
}

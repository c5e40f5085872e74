//! Command line front end: build a tree over a synthetic population and
//! query it interactively, benchmark it, or cross-check it against a
//! linear scan.
use std::hint::black_box;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use vantage::generator::{generate, query_seed, WorldPreset};
use vantage::report::{distance_error, LatencySummary};
use vantage::{person_distance, BuildOptions, Error, NaiveKnn, Person, VpTree};

type PersonMetric = fn(&Person, &Person) -> f32;
type PersonTree = VpTree<Person, PersonMetric>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Ui,
    Benchmark,
    Test,
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().chars().next() {
            Some('u') => Ok(Action::Ui),
            Some('b') => Ok(Action::Benchmark),
            Some('t') => Ok(Action::Test),
            _ => Err(Error::UnknownAction(s.to_string())),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "k-nearest-neighbor search over a synthetic population")]
struct Cli {
    /// ui (interactive queries), benchmark (latency quantiles) or test
    /// (compare against a linear scan)
    action: Action,

    /// small (1M people), normal (100M) or gigantic (300M)
    world: WorldPreset,

    /// Number of neighbors to report per query
    #[arg(short = 'k', long, default_value_t = 10)]
    neighbors: usize,

    /// Seed for population generation
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Seed for the shuffle before tree construction; random if omitted
    #[arg(long)]
    build_seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.action {
        Action::Ui => run_ui(&cli),
        Action::Benchmark => run_benchmark(&cli),
        Action::Test => run_test(&cli),
    }
}

fn generate_world(world: WorldPreset, seed: u64) -> Result<Vec<Person>> {
    let begin = Instant::now();
    let people = generate(&world.world(), seed)
        .with_context(|| format!("generating {:?} world", world))?;
    info!("{} persons generation took {} ms", people.len(), begin.elapsed().as_millis());
    Ok(people)
}

fn build_tree(people: Vec<Person>, cli: &Cli) -> PersonTree {
    let begin = Instant::now();
    let options = BuildOptions { seed: cli.build_seed };
    let tree = VpTree::with_options(people, person_distance as PersonMetric, &options);
    info!("tree construction took {} ms", begin.elapsed().as_millis());
    tree
}

/// Queries are drawn from a different seed than the indexed population.
fn test_queries(cli: &Cli) -> Result<Vec<Person>> {
    generate_world(WorldPreset::Test, query_seed(cli.seed))
}

fn parse_query(line: &str) -> Result<Person> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        bail!("expected 3 values, got {}", fields.len());
    }
    let age = fields[0].parse().with_context(|| format!("bad age {:?}", fields[0]))?;
    let latitude = fields[1].parse().with_context(|| format!("bad latitude {:?}", fields[1]))?;
    let longitude = fields[2].parse().with_context(|| format!("bad longitude {:?}", fields[2]))?;
    Ok(Person::new(0, age, latitude, longitude))
}

fn run_ui(cli: &Cli) -> Result<()> {
    let tree = build_tree(generate_world(cli.world, cli.seed)?, cli);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    println!("Please type 'quit' or press Ctrl+D to quit.");
    loop {
        println!("Please type age (unsigned), latitude and longitude (both floats) separated by spaces:");
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 || line.trim() == "quit" {
            println!();
            println!("Goodbye!");
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let target = match parse_query(&line) {
            Ok(target) => target,
            Err(e) => {
                eprintln!("error: {:#}", e);
                continue;
            }
        };

        println!("Searching for neighbors of {}...", target);
        let begin = Instant::now();
        let res = tree.search(&target, cli.neighbors);
        println!("search took {} microseconds", begin.elapsed().as_micros());
        for n in &res {
            println!("{} {}", n.item, n.distance);
        }
    }
}

fn run_benchmark(cli: &Cli) -> Result<()> {
    let tree = build_tree(generate_world(cli.world, cli.seed)?, cli);
    let queries = test_queries(cli)?;

    let durations: Vec<u64> = queries.iter()
        .map(|q| {
            let begin = Instant::now();
            black_box(tree.search(q, cli.neighbors));
            begin.elapsed().as_micros() as u64
        })
        .collect();

    let summary = LatencySummary::from_samples(durations).context("no benchmark queries")?;
    println!("average value: {:.2} microseconds", summary.mean);
    println!("0.95 quantile: {} microseconds", summary.p95);
    println!("0.99 quantile: {} microseconds", summary.p99);
    Ok(())
}

fn run_test(cli: &Cli) -> Result<()> {
    let people = generate_world(cli.world, cli.seed)?;
    let naive = NaiveKnn::new(people.clone(), person_distance as PersonMetric);
    let tree = build_tree(people, cli);
    let queries = test_queries(cli)?;

    let mut accumulated = 0.0;
    for (i, q) in queries.iter().enumerate() {
        let res_tree = tree.search(q, cli.neighbors);
        let res_naive = naive.search(q, cli.neighbors);
        accumulated += distance_error(&res_tree, &res_naive);

        let iter_no = i + 1;
        if iter_no % 10 == 0 {
            print!("After {} iterations. Accumulated error: {}. Average error: {}\r",
                   iter_no, accumulated, accumulated / iter_no as f64);
            io::stdout().flush()?;
        }
    }
    println!();
    Ok(())
}

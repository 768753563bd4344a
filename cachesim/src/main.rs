use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use log::info;
use cachemodel::cache::CacheModel;
use cachemodel::config::{SimulationConfig, DEFAULT_ASSOCIATIVITY, DEFAULT_BLOCK_COUNT, DEFAULT_BLOCK_SIZE_EXP, DEFAULT_SET_COUNT_EXP};
use cachemodel::io::get_reader;
use cachemodel::simulator::Simulator;
use cachemodel::stats::ReportFormat;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Compares fully associative, direct mapped and set associative LRU caches over a memory trace"))]
struct Args {
    /// Trace of memory references, one "R <addr>" or "W <addr>" per line
    trace: PathBuf,

    /// JSON file listing the caches to simulate, instead of the default comparison
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of blocks in the fully associative and direct mapped caches
    #[arg(short = 'n', long, default_value_t = DEFAULT_BLOCK_COUNT)]
    block_count: u64,

    /// Log2 of the block size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE_EXP)]
    block_size_exp: u32,

    /// Log2 of the number of sets in the set associative cache
    #[arg(short = 'r', long, default_value_t = DEFAULT_SET_COUNT_EXP)]
    set_count_exp: u32,

    /// Ways per set in the set associative cache
    #[arg(short, long, default_value_t = DEFAULT_ASSOCIATIVITY)]
    associativity: u64,

    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Time every access, and report the total simulation time
    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    env_logger::init();
    let start = Instant::now();
    let args = Args::parse();
    let config: SimulationConfig = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
            serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?
        }
        None => SimulationConfig::comparison(args.block_count, args.block_size_exp, args.set_count_exp, args.associativity),
    };
    let mut simulator = Simulator::new(&config)
        .map_err(|e| format!("Invalid cache configuration: {e}"))?
        .with_timing(args.performance);
    let trace_file = File::open(&args.trace).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace.display()))?;
    let trace_reader = get_reader(trace_file)?;
    info!("Replaying {} over {} caches", args.trace.display(), config.caches.len());
    let result = simulator.simulate(trace_reader).map_err(|e| e.to_string())?;
    let rendered = match args.format {
        ReportFormat::Text => result.to_string(),
        ReportFormat::Json => serde_json::to_string_pretty(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?,
    };
    match &args.output {
        Some(path) => fs::write(path, rendered).map_err(|e| format!("Couldn't write the report to {}: {e}", path.display()))?,
        None => println!("{rendered}"),
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        let uninitialised_lines = simulator.get_uninitialised_line_counts();
        let formatted = config.caches
            .iter()
            .zip(simulator.caches())
            .zip(uninitialised_lines.iter())
            .map(|((c, cache), count)| format!("{}: {count}/{}", c.name, cache.geometry().block_count()))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Uninitialised cache blocks by cache: ({formatted})");
        println!("Total uninitialised cache blocks: {}", uninitialised_lines.iter().sum::<u64>())
    }
    Ok(())
}

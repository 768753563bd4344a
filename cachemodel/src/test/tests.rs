use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use crate::config::SimulationConfig;
use crate::io::get_reader;
use crate::simulator::Simulator;
use crate::util::{get_configs, ExpectedResult};

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_configs()?;
    assert!(!cases.is_empty(), "no fixtures found");
    for test in cases {
        println!("Running test for {}", test.output);
        // Get input files
        let trace_file = File::open(&test.trace)?;
        let config_file = File::open(&test.config)?;
        // Read expected output
        let expected_output_file = File::open(&test.output)?;
        let expected_output: ExpectedResult = serde_json::from_reader(BufReader::new(expected_output_file))?;
        // Simulate!
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(config_file))?;
        let mut simulator = Simulator::new(&config)?;
        let result = simulator.simulate(get_reader(trace_file)?)?;
        // Check results
        assert_eq!(result.events, expected_output.events, "{}", test.output);
        assert_eq!(result.caches.len(), expected_output.caches.len(), "{}", test.output);
        for (actual, expected) in result.caches.iter().zip(&expected_output.caches) {
            assert_eq!(actual.name, expected.name);
            assert_eq!(actual.counters, expected.counters, "{} in {}", actual.name, test.output);
        }
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.output, time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}

use std::fs::File;
use std::io::{BufReader, Read};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cachemodel::config::SimulationConfig;
use cachemodel::simulator::Simulator;
use cachemodel::trace::MemoryEvent;
use cachemodel::util::get_configs;

/// Replays the fixture traces
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Examples");

    get_configs()
        .unwrap()
        .iter()
        .for_each(|case| {
            let config_file = File::open(&case.config).unwrap();
            // Ignoring expected output
            let config: SimulationConfig = serde_json::from_reader(BufReader::new(config_file)).unwrap();
            let mut trace_file = File::open(&case.trace).unwrap();
            let mut buf = Vec::new();
            // We aren't interested in IO effects here
            trace_file.read_to_end(&mut buf).unwrap();
            group.bench_with_input(BenchmarkId::new("Example", case.output.clone()), &(config, buf), |bench, (conf, buf)| {
                bench.iter(|| {
                    Simulator::new(conf).unwrap().simulate(buf.as_slice()).unwrap();
                });
            });
        });
    group.finish();
}

/// The default comparison over a strided sweep, which exercises eviction in every organisation
pub fn sweep_benchmark(c: &mut Criterion) {
    let events: Vec<MemoryEvent> = (0..200_000u64)
        .map(|i| {
            let address = (i * 0x1040) % (1 << 22);
            if i % 4 == 0 { MemoryEvent::write(address) } else { MemoryEvent::read(address) }
        })
        .collect();
    let config = SimulationConfig::default();
    c.bench_function("Sweep", |bench| {
        bench.iter(|| {
            Simulator::new(&config).unwrap().simulate_events(events.iter().copied());
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark, sweep_benchmark
);
criterion_main!(benches);

use std::io::BufRead;
use std::time::{Duration, Instant};
use log::debug;
use crate::cache::{CacheModel, GenericCache};
use crate::config::SimulationConfig;
use crate::geometry::CacheError;
use crate::stats::{AccessTiming, CacheReport, SimulationReport};
use crate::trace::{AccessKind, MemoryEvent, TraceEvents, TraceReadError};

/// The simulator owns every cache of a run, aligns each event to the block size of each cache,
/// and collects results.
///
/// Every cache sees every event, in trace order, and they share no state, so the caches don't
/// affect each other's results. It supports calling simulate multiple times, and will keep
/// accumulating counters and the time taken to simulate
pub struct Simulator {
    caches: Vec<GenericCache>,
    names: Vec<String>,
    // Only measured on request
    timings: Option<Vec<AccessTiming>>,
    events: u64,
    simulation_time: Duration,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, CacheError>, failing if any cache has an invalid geometry
    pub fn new(config: &SimulationConfig) -> Result<Self, CacheError> {
        let caches = config.caches.iter().map(|c| c.build()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            caches,
            names: config.caches.iter().map(|c| c.name.clone()).collect(),
            timings: None,
            events: 0,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Enables measuring the wall-clock time spent in each cache
    pub fn with_timing(mut self, enabled: bool) -> Self {
        self.timings = enabled.then(|| vec![AccessTiming::default(); self.caches.len()]);
        self
    }

    /// Feeds one event to every cache
    pub fn record(&mut self, event: MemoryEvent) {
        self.events += 1;
        match &mut self.timings {
            None => {
                for cache in &mut self.caches {
                    request(cache, event);
                }
            }
            Some(timings) => {
                for (cache, timing) in self.caches.iter_mut().zip(timings.iter_mut()) {
                    let start = Instant::now();
                    request(cache, event);
                    let elapsed = start.elapsed();
                    match event.kind {
                        AccessKind::Read => timing.read += elapsed,
                        AccessKind::Write => timing.write += elapsed,
                    }
                }
            }
        }
    }

    /// Simulates the caches over a text trace, one line at a time
    ///
    /// Stops at the first line which can't be read or parsed. Events before it have already been
    /// counted
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace
    ///
    /// returns: Result<SimulationReport, TraceReadError>
    pub fn simulate<R: BufRead>(&mut self, reader: R) -> Result<SimulationReport, TraceReadError> {
        let start = Instant::now();
        let outcome = TraceEvents::new(reader).try_for_each(|event| -> Result<(), TraceReadError> {
            self.record(event?);
            Ok(())
        });
        self.finish(start);
        outcome.map(|_| self.report())
    }

    /// Simulates the caches over events which have already been decoded
    pub fn simulate_events<I: IntoIterator<Item = MemoryEvent>>(&mut self, events: I) -> SimulationReport {
        let start = Instant::now();
        events.into_iter().for_each(|event| self.record(event));
        self.finish(start);
        self.report()
    }

    fn finish(&mut self, start: Instant) {
        let elapsed = start.elapsed();
        self.simulation_time += elapsed;
        debug!("Simulated {} events so far, {:?} this pass", self.events, elapsed);
    }

    /// Snapshot of the counters of every cache
    pub fn report(&self) -> SimulationReport {
        let caches = self.caches.iter().zip(&self.names).enumerate().map(|(i, (cache, name))| {
            let timing = self.timings.as_ref().map(|t| &t[i]);
            CacheReport::new(name.clone(), cache.organisation(), *cache.geometry(), *cache.counters(), timing)
        });
        SimulationReport {
            events: self.events,
            caches: caches.collect(),
        }
    }

    pub fn caches(&self) -> &[GenericCache] {
        &self.caches
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of never-filled blocks for each cache
    pub fn get_uninitialised_line_counts(&self) -> Vec<u64> {
        self.caches.iter().map(|x| x.get_uninitialised_line_count() as u64).collect()
    }
}

/// Block alignment happens here, so the caches only ever see the start of a block
fn request(cache: &mut GenericCache, event: MemoryEvent) -> bool {
    let address = cache.align(event.address);
    match event.kind {
        AccessKind::Read => cache.read_req(address),
        AccessKind::Write => cache.write_req(address),
    }
}

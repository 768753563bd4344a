use std::fmt::{Display, Formatter};
use std::time::Duration;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::cache::Organisation;
use crate::geometry::CacheGeometry;

/// Request and hit counts for one cache. Only ever incremented
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessCounters {
    pub read_requests: u64,
    pub write_requests: u64,
    pub read_hits: u64,
    pub write_hits: u64,
}

impl AccessCounters {
    pub fn record_read(&mut self, hit: bool) {
        self.read_requests += 1;
        self.read_hits += hit as u64;
    }

    pub fn record_write(&mut self, hit: bool) {
        self.write_requests += 1;
        self.write_hits += hit as u64;
    }

    pub fn read_hit_rate(&self) -> Option<f64> {
        hit_rate(self.read_hits, self.read_requests)
    }

    pub fn write_hit_rate(&self) -> Option<f64> {
        hit_rate(self.write_hits, self.write_requests)
    }
}

/// Percentage of requests which hit, or None if there were no requests
pub fn hit_rate(hits: u64, requests: u64) -> Option<f64> {
    if requests == 0 {
        None
    } else {
        Some(100.0 * hits as f64 / requests as f64)
    }
}

/// Wall-clock time spent inside one cache, split by request type
#[derive(Debug, Default, Copy, Clone)]
pub struct AccessTiming {
    pub read: Duration,
    pub write: Duration,
}

/// The result for an individual cache
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheReport {
    pub name: String,
    pub organisation: Organisation,
    pub geometry: CacheGeometry,
    #[serde(flatten)]
    pub counters: AccessCounters,
    pub read_hit_rate: Option<f64>,
    pub write_hit_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_read_time_us: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_write_time_us: Option<f64>,
}

impl CacheReport {
    pub fn new(name: String, organisation: Organisation, geometry: CacheGeometry, counters: AccessCounters, timing: Option<&AccessTiming>) -> Self {
        let average = |total: Duration, requests: u64| {
            (requests > 0).then(|| total.as_nanos() as f64 / 1e3 / requests as f64)
        };
        Self {
            name,
            organisation,
            geometry,
            counters,
            read_hit_rate: counters.read_hit_rate(),
            write_hit_rate: counters.write_hit_rate(),
            average_read_time_us: timing.and_then(|t| average(t.read, counters.read_requests)),
            average_write_time_us: timing.and_then(|t| average(t.write, counters.write_requests)),
        }
    }
}

/// The result of a simulation run, one entry per configured cache in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub events: u64,
    pub caches: Vec<CacheReport>,
}

/// How a report gets presented
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

struct Rate(Option<f64>);

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(rate) => write!(f, "{rate:.2}%"),
            None => f.write_str("undefined"),
        }
    }
}

impl Display for CacheReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({}):", self.name, self.organisation)?;
        if let Some(time) = self.average_read_time_us {
            writeln!(f, "average read time: {time:.2}us")?;
        }
        if let Some(time) = self.average_write_time_us {
            writeln!(f, "average write time: {time:.2}us")?;
        }
        let c = &self.counters;
        writeln!(f, "\tread req: {},\thit: {},\thit rate: {}", c.read_requests, c.read_hits, Rate(self.read_hit_rate))?;
        writeln!(f, "\twrite req: {},\thit: {},\thit rate: {}", c.write_requests, c.write_hits, Rate(self.write_hit_rate))
    }
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Events simulated: {}", self.events)?;
        for cache in &self.caches {
            writeln!(f)?;
            write!(f, "{cache}")?;
        }
        Ok(())
    }
}

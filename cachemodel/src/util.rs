use std::error::Error;
use std::fs;
use regex::Regex;
use serde::Deserialize;
use crate::stats::AccessCounters;

pub const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

/// Paths making up one end-to-end case: simulating `trace` with `config` should give `output`
#[derive(Debug, Clone)]
pub struct TestCasePaths {
    pub config: String,
    pub trace: String,
    pub output: String,
}

/// The expected counters for one cache, as stored in the fixture outputs
#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct ExpectedCache {
    pub name: String,
    #[serde(flatten)]
    pub counters: AccessCounters,
}

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct ExpectedResult {
    pub events: u64,
    pub caches: Vec<ExpectedCache>,
}

/// Finds every `outputs/output-<trace>-<config>.json` under `root`, along with the trace and config
/// it names, sorted by file name
pub fn get_configs_in(root: &str) -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let output_pattern = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$")?;
    let mut file_names = fs::read_dir(format!("{root}/outputs"))?
        .map(|entry| -> Result<String, Box<dyn Error>> {
            entry?
                .file_name()
                .into_string()
                .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string").into())
        })
        .collect::<Result<Vec<_>, _>>()?;
    file_names.retain(|name| output_pattern.is_match(name));
    file_names.sort();
    let mut out = Vec::new();
    for file_name in file_names {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name")?;
        let trace = &tokens["trace"];
        let config = &tokens["config"];
        out.push(TestCasePaths {
            config: format!("{root}/configs/{config}.json"),
            trace: format!("{root}/traces/{trace}.trace"),
            output: format!("{root}/outputs/{file_name}"),
        })
    }
    Ok(out)
}

/// The cases shipped with the crate
pub fn get_configs() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    get_configs_in(FIXTURES_PATH)
}

use std::fmt::{Display, Formatter};
use std::io::BufRead;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Optional "<ip>:" prefix as written by pinatrace, then the operation and the effective address
    static ref TRACE_LINE: Regex = Regex::new(
        r"^\s*(?:(?:0x)?[0-9a-fA-F]+:\s+)?(?P<op>[RrWw])\s+(?:0[xX])?(?P<address>[0-9a-fA-F]{1,16})\s*$"
    ).expect("failed to compile trace line regex");
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccessKind {
    Read,
    Write,
}

/// A single memory reference observed in the traced program
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MemoryEvent {
    pub address: u64,
    pub kind: AccessKind,
}

impl MemoryEvent {
    pub fn read(address: u64) -> Self {
        Self { address, kind: AccessKind::Read }
    }

    pub fn write(address: u64) -> Self {
        Self { address, kind: AccessKind::Write }
    }
}

/// A trace line which isn't a comment, blank, or a memory reference
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TraceError {
    /// 1-based
    pub line: usize,
    pub content: String,
}

impl Display for TraceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed trace line {}: {:?}", self.line, self.content)
    }
}

impl std::error::Error for TraceError {}

/// Parses one line of a trace
///
/// Gives `Some(None)` for lines carrying no event: blank lines and `#` comments, which includes
/// the `#eof` marker pinatrace ends its output with. `None` means the line isn't understood
///
/// # Examples
///
/// ```
/// use cachemodel::trace::{parse_line, MemoryEvent};
/// assert_eq!(parse_line("0x4005d6: W 0x7ffc1d2e8a48"), Some(Some(MemoryEvent::write(0x7ffc1d2e8a48))));
/// assert_eq!(parse_line("#eof"), Some(None));
/// assert_eq!(parse_line("X 10"), None);
/// ```
pub fn parse_line(line: &str) -> Option<Option<MemoryEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Some(None);
    }
    let captures = TRACE_LINE.captures(trimmed)?;
    // At most 16 hex digits, so this always fits
    let address = u64::from_str_radix(&captures["address"], 16).ok()?;
    let kind = match &captures["op"] {
        "R" | "r" => AccessKind::Read,
        _ => AccessKind::Write,
    };
    Some(Some(MemoryEvent { address, kind }))
}

/// Replays a text trace one event at a time
pub struct TraceEvents<R: BufRead> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> TraceEvents<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }
}

/// Either the trace couldn't be read, or it couldn't be understood
#[derive(Debug)]
pub enum TraceReadError {
    Io(std::io::Error),
    Malformed(TraceError),
}

impl Display for TraceReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceReadError::Io(e) => write!(f, "couldn't read the trace: {e}"),
            TraceReadError::Malformed(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for TraceReadError {}

impl From<std::io::Error> for TraceReadError {
    fn from(value: std::io::Error) -> Self {
        TraceReadError::Io(value)
    }
}

impl From<TraceError> for TraceReadError {
    fn from(value: TraceError) -> Self {
        TraceReadError::Malformed(value)
    }
}

impl<R: BufRead> Iterator for TraceEvents<R> {
    type Item = Result<MemoryEvent, TraceReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;
            match parse_line(&self.buffer) {
                Some(Some(event)) => return Some(Ok(event)),
                Some(None) => continue,
                None => {
                    return Some(Err(TraceError {
                        line: self.line,
                        content: self.buffer.trim_end().to_string(),
                    }
                    .into()))
                }
            }
        }
    }
}

use std::fs;
use std::path::Path;

use thiserror::Error;

/// One parsed trace operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Opcode 1: start a new job with the given size in address units.
    Start { size: u64 },
    /// Opcode 2: read the given address.
    Read { address: u64 },
    /// Opcode 3: write the given address.
    Write { address: u64 },
    /// Opcode 4: end the active job.
    End,
}

impl Operation {
    /// The raw integer parameter of the operation (0 for `End`).
    ///
    /// The optimal-replacement look-ahead reads the parameter of every
    /// future operation without regard to its opcode, so `Start` reports
    /// its size and `End` reports 0.
    pub fn parameter(&self) -> u64 {
        match *self {
            Operation::Start { size } => size,
            Operation::Read { address } | Operation::Write { address } => address,
            Operation::End => 0,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Operation::End)
    }
}

/// Errors produced while parsing a trace, each carrying the 1-based line
/// number and the offending line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "line {line}: '{text}' - each line must start with an opcode: \
         1 (new job), 2 (read), 3 (write), 4 (job end)"
    )]
    MissingOpcode { line: usize, text: String },

    #[error(
        "line {line}: '{text}' - the opcode must be 1 (new job), 2 (read), \
         3 (write), or 4 (job end)"
    )]
    BadOpcode { line: usize, text: String },

    #[error(
        "line {line}: '{text}' - opcode {opcode} must be followed by a single \
         space and a numeric parameter, with nothing after it"
    )]
    BadParameter { line: usize, text: String, opcode: u8 },

    #[error("line {line}: '{text}' - a job end (opcode 4) takes no parameter")]
    UnexpectedParameter { line: usize, text: String },
}

/// Errors from loading a trace off disk.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// An immutable parsed trace: the ordered operation sequence for one run.
///
/// The trace is read-only once built; every policy pass (including the
/// optimal policy's forward scans) borrows it without mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    ops: Vec<Operation>,
}

impl Trace {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TraceError> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&content)?)
    }

    /// Parse trace text, one operation per non-empty line.
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut ops = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            ops.push(parse_line(line, index + 1)?);
        }
        Ok(Trace { ops })
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl From<Vec<Operation>> for Trace {
    fn from(ops: Vec<Operation>) -> Self {
        Trace { ops }
    }
}

fn parse_line(line: &str, lineno: usize) -> Result<Operation, ParseError> {
    let bad_parameter = |opcode: u8| ParseError::BadParameter {
        line: lineno,
        text: line.to_string(),
        opcode,
    };

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(ParseError::MissingOpcode {
            line: lineno,
            text: line.to_string(),
        });
    }
    let opcode: u8 = line[..digits].parse().map_err(|_| ParseError::BadOpcode {
        line: lineno,
        text: line.to_string(),
    })?;

    let rest = &line[digits..];
    match opcode {
        4 => {
            if rest.is_empty() {
                Ok(Operation::End)
            } else {
                Err(ParseError::UnexpectedParameter {
                    line: lineno,
                    text: line.to_string(),
                })
            }
        }
        1..=3 => {
            let param = rest.strip_prefix(' ').ok_or_else(|| bad_parameter(opcode))?;
            if param.is_empty() || !param.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_parameter(opcode));
            }
            let value: u64 = param.parse().map_err(|_| bad_parameter(opcode))?;
            Ok(match opcode {
                1 => Operation::Start { size: value },
                2 => Operation::Read { address: value },
                _ => Operation::Write { address: value },
            })
        }
        _ => Err(ParseError::BadOpcode {
            line: lineno,
            text: line.to_string(),
        }),
    }
}

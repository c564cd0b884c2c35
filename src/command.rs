use phf::phf_map;
use thiserror::Error;

use crate::util::parse_int;

/// Verb table: every command and the exact number of arguments it takes.
static ARITY: phf::Map<&'static str, usize> = phf_map! {
    "read"       => 1,
    "write"      => 2,
    "randread"   => 1,
    "randwrite"  => 1,
    "printcache" => 2,
    "printmem"   => 2,
    "stats"      => 0,
    "quit"       => 0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Read { address: usize },
    Write { address: usize, byte: u8 },
    RandRead { amount: usize },
    RandWrite { amount: usize },
    PrintCache { start: usize, amount: usize },
    PrintMem { start: usize, amount: usize },
    Stats,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("invalid command '{0}'")]
    UnknownCommand(String),

    #[error("'{verb}' takes {expected} argument(s), got {got}")]
    WrongArity {
        verb: String,
        expected: usize,
        got: usize,
    },

    #[error("incorrect syntax: '{0}' is not a number")]
    BadNumber(String),

    #[error("{0:#x} does not fit in a byte")]
    ByteOutOfRange(usize),
}

/// Known verbs in alphabetical order.
pub fn verbs() -> Vec<&'static str> {
    let mut verbs: Vec<&'static str> = ARITY.keys().copied().collect();
    verbs.sort_unstable();
    verbs
}

fn number(text: &str) -> Result<usize, CommandError> {
    parse_int(text).ok_or_else(|| CommandError::BadNumber(text.to_string()))
}

impl Command {
    /// Validate a whole input line up front: known verb, exact arity, and
    /// numeric arguments that parse.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        let expected = *ARITY
            .get(verb)
            .ok_or_else(|| CommandError::UnknownCommand(verb.to_string()))?;
        if args.len() != expected {
            return Err(CommandError::WrongArity {
                verb: verb.to_string(),
                expected,
                got: args.len(),
            });
        }
        let nums = args
            .iter()
            .map(|arg| number(arg))
            .collect::<Result<Vec<_>, _>>()?;

        let cmd = match verb {
            "read" => Command::Read { address: nums[0] },
            "write" => {
                let byte = u8::try_from(nums[1]).map_err(|_| CommandError::ByteOutOfRange(nums[1]))?;
                Command::Write {
                    address: nums[0],
                    byte,
                }
            }
            "randread" => Command::RandRead { amount: nums[0] },
            "randwrite" => Command::RandWrite { amount: nums[0] },
            "printcache" => Command::PrintCache {
                start: nums[0],
                amount: nums[1],
            },
            "printmem" => Command::PrintMem {
                start: nums[0],
                amount: nums[1],
            },
            "stats" => Command::Stats,
            "quit" => Command::Quit,
            _ => return Err(CommandError::UnknownCommand(verb.to_string())),
        };
        Ok(cmd)
    }
}

//! Input line parsing.
//!
//! Anything not starting with `:` is a city search.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    History,
    /// 1-based position in the history list
    Open(usize),
    /// History entry id
    Remove(u64),
    Clear,
    ToggleUnit,
    Retry,
    Refresh,
    Default,
    Last,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command :{0} (try :help)")]
    Unknown(String),

    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for :{command}: {value:?}")]
    InvalidArgument {
        command: &'static str,
        value: String,
    },
}

pub const HELP: &str = "\
Type a city name to search. Commands:
  :history       list recent searches
  :open <n>      show the n-th recent search
  :rm <id>       remove a recent search by id
  :clear         clear recent searches
  :unit          toggle Celsius / Fahrenheit
  :retry         repeat the last search
  :refresh       refetch the last search, skipping the cache
  :default       show the default city
  :last          show the most recent search
  :help          show this help
  :quit          exit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Empty);
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Search(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();

        match name.as_str() {
            "history" | "h" => Ok(Self::History),
            "open" | "o" => {
                let value = arg.ok_or(CommandError::MissingArgument("open"))?;
                match value.parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Self::Open(n)),
                    _ => Err(CommandError::InvalidArgument {
                        command: "open",
                        value: value.to_string(),
                    }),
                }
            }
            "rm" | "remove" => {
                let value = arg.ok_or(CommandError::MissingArgument("rm"))?;
                value
                    .parse::<u64>()
                    .map(Self::Remove)
                    .map_err(|_| CommandError::InvalidArgument {
                        command: "rm",
                        value: value.to_string(),
                    })
            }
            "clear" => Ok(Self::Clear),
            "unit" | "u" => Ok(Self::ToggleUnit),
            "retry" | "r" => Ok(Self::Retry),
            "refresh" => Ok(Self::Refresh),
            "default" => Ok(Self::Default),
            "last" => Ok(Self::Last),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

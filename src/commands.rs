use std::fmt;
use thiserror::Error;
use crate::validation::{parse_amount, validate_currency};

pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command: available commands are ADD, SUB, DEL, SHOW";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Add,
    Sub,
    Del,
}

impl Keyword {
    fn usage(&self) -> &'static str {
        match self {
            Keyword::Add => "ADD <currency> <amount>",
            Keyword::Sub => "SUB <currency> <amount>",
            Keyword::Del => "DEL <currency>",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Keyword::Add => "ADD",
            Keyword::Sub => "SUB",
            Keyword::Del => "DEL",
        };
        f.write_str(name)
    }
}

/// Malformed input. `Display` is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("{0} command format: {usage}", usage = .0.usage())]
    Usage(Keyword),
    #[error("Currency cannot be empty")]
    EmptyCurrency,
    #[error("Could not read the amount")]
    InvalidAmount(String),
    #[error("Currency cannot be negative")]
    NegativeAmount(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { currency: String, amount: f64 },
    Subtract { currency: String, amount: f64 },
    Delete { currency: String },
    Show,
    Unknown,
}

impl Command {
    /// Parses one chat message. Keywords are case-sensitive; anything that
    /// is not a known keyword, including empty input, is `Unknown`.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        match tokens.first().copied() {
            Some("ADD") => {
                let (currency, amount) = currency_and_amount(Keyword::Add, &tokens)?;
                Ok(Command::Add { currency, amount })
            }
            Some("SUB") => {
                let (currency, amount) = currency_and_amount(Keyword::Sub, &tokens)?;
                if amount <= 0.0 {
                    return Err(CommandError::NegativeAmount(amount));
                }
                Ok(Command::Subtract { currency, amount })
            }
            Some("DEL") => {
                if tokens.len() != 2 {
                    return Err(CommandError::Usage(Keyword::Del));
                }
                Ok(Command::Delete { currency: tokens[1].to_string() })
            }
            Some("SHOW") => Ok(Command::Show),
            _ => Ok(Command::Unknown),
        }
    }

    /// Label used for metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Subtract { .. } => "sub",
            Command::Delete { .. } => "del",
            Command::Show => "show",
            Command::Unknown => "unknown",
        }
    }

    pub fn is_mutating(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Subtract { .. } | Command::Delete { .. })
    }
}

fn currency_and_amount(keyword: Keyword, tokens: &[&str]) -> Result<(String, f64), CommandError> {
    if tokens.len() != 3 {
        return Err(CommandError::Usage(keyword));
    }
    validate_currency(tokens[1]).map_err(|_| CommandError::EmptyCurrency)?;
    let amount = parse_amount(tokens[2]).map_err(|e| CommandError::InvalidAmount(e.to_string()))?;
    Ok((tokens[1].to_string(), amount))
}

//! Complexity levels and the system prompt each one selects.
//!
//! The level slider in the client goes from 1 (young children) to 5
//! (doctoral). Every prompt carries the same response-length constraint
//! and language instruction; only the persona changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const PREAMBLE: &str = "You have max 1000 tokens, adapt your response to that limitation. \
Speak in whatever language the user spoke you.";

const LEVEL_1: &str = "Act as a very kind and patient teacher for small children. \
Explain the concept using very simple language, short sentences, and analogies that a child \
aged 5 to 8 can understand. Completely avoid technical or scientific terminology. Use examples \
involving playing, animals, or toys to make the explanation fun and clear.";

const LEVEL_2: &str = "You are a school tutor for students aged 12 to 15. Explain the concept \
in a clear and direct way. Use language that is easy to understand, but you can introduce one \
or two keywords or technical terms and explain them simply within the context. Use practical \
examples or slightly more elaborate analogies.";

const LEVEL_3: &str = "You are a research assistant explaining concepts to a freshman \
university student. Explain the concept in a structured way and understandable for someone \
out of high school. Include the easiest formal definitions, fundamental principles, and the \
key steps of the process. Use appropriate terminology and provide a comprehensive overview of \
the topic. Explain the most basic concepts if needed.";

const LEVEL_4: &str = "You are an expert in the subject. Explain the concept to a colleague \
who is almost graduated and already has a solid understanding. Use intermediate technical \
terminology without needing to define it, if it is too advanced then define. Go directly to \
the details of the process, metabolic pathways, exceptions, molecular subunits, or advanced \
mechanisms. Do not include analogies or basic summaries.";

const LEVEL_5: &str = "You are a senior researcher. Explain the concept at a doctoral level. \
Do not explain the fundamentals of the topic; instead, delve into points of controversy, \
current challenges, new lines of research, advanced theoretical models, and the relevance of \
recent publications in the literature. Make reference to relevant theoretical models or \
equations.";

/// A validated complexity level in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidLevel(value.to_string()))
        }
    }

    /// All levels, lowest first.
    pub fn all() -> impl Iterator<Item = Level> {
        (Self::MIN..=Self::MAX).map(Level)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// A short human label for the persona (used by the CLI).
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "children (5-8)",
            2 => "school (12-15)",
            3 => "university freshman",
            4 => "near-graduate",
            _ => "doctoral",
        }
    }

    /// The full system prompt for this level.
    pub fn system_prompt(self) -> String {
        let persona = match self.0 {
            1 => LEVEL_1,
            2 => LEVEL_2,
            3 => LEVEL_3,
            4 => LEVEL_4,
            _ => LEVEL_5,
        };
        format!("{PREAMBLE} {persona}")
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| Error::InvalidLevel(s.to_string()))
            .and_then(Level::new)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Look up the system prompt for a raw level string such as `"3"`.
///
/// Unknown levels are rejected; there is no fallback prompt.
pub fn describe_prompt(level: &str) -> Result<String> {
    Ok(level.parse::<Level>()?.system_prompt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_level_has_a_distinct_prompt() {
        let prompts: HashSet<String> = Level::all().map(Level::system_prompt).collect();
        assert_eq!(prompts.len(), 5);
        assert!(prompts.iter().all(|p| !p.trim().is_empty()));
    }

    #[test]
    fn prompts_carry_the_token_constraint() {
        for level in Level::all() {
            assert!(level.system_prompt().contains("max 1000 tokens"));
        }
    }

    #[test]
    fn register_rises_with_level() {
        assert!(describe_prompt("1").unwrap().contains("small children"));
        assert!(describe_prompt("5").unwrap().contains("doctoral level"));
    }

    #[test]
    fn out_of_range_levels_are_rejected() {
        for raw in ["0", "6", "255", "-1", "abc", "", "2.5"] {
            assert!(
                matches!(describe_prompt(raw), Err(Error::InvalidLevel(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        assert_eq!(" 4 ".parse::<Level>().unwrap().value(), 4);
    }

    #[test]
    fn serde_rejects_invalid_levels() {
        assert!(serde_json::from_str::<Level>("3").is_ok());
        assert!(serde_json::from_str::<Level>("7").is_err());
    }
}

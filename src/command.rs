//! The actor's command grammar.
//!
//! On the wire a command is a short string such as `move_fwd:1.0`,
//! `turn_left:45` or `jump`. Inside the crate it is a [`Command`] value,
//! parsed once at the boundary and rendered back with [`Display`].
//!
//! [`Display`]: std::fmt::Display

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction of a timed movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Back,
    Left,
    Right,
}

/// Direction of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

/// A parsed actor command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Hold a movement key for `seconds`.
    Move { direction: MoveDirection, seconds: f64 },
    /// Rotate in place by `degrees`.
    Turn { direction: TurnDirection, degrees: f64 },
    Jump,
}

/// Why a wire command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command verb `{0}`")]
    UnknownVerb(String),
    #[error("command `{0}` requires a parameter")]
    MissingParameter(String),
    #[error("invalid parameter `{param}` for `{verb}`: expected a positive number")]
    InvalidParameter { verb: String, param: String },
    #[error("command `jump` takes no parameter")]
    UnexpectedParameter,
}

impl Command {
    /// The wire verb: the text before the first `:`.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Move { direction, .. } => match direction {
                MoveDirection::Forward => "move_fwd",
                MoveDirection::Back => "move_back",
                MoveDirection::Left => "move_left",
                MoveDirection::Right => "move_right",
            },
            Self::Turn { direction, .. } => match direction {
                TurnDirection::Left => "turn_left",
                TurnDirection::Right => "turn_right",
            },
            Self::Jump => "jump",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CommandParseError> {
        s.parse()
    }
}

/// The verb of a wire command string, without parsing it.
pub fn verb_of(wire: &str) -> &str {
    wire.split_once(':').map_or(wire, |(verb, _)| verb).trim()
}

fn positive(verb: &str, param: Option<&str>) -> Result<f64, CommandParseError> {
    let param = param.ok_or_else(|| CommandParseError::MissingParameter(verb.to_string()))?;
    param
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| CommandParseError::InvalidParameter {
            verb: verb.to_string(),
            param: param.to_string(),
        })
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CommandParseError::Empty);
        }

        let (verb, param) = match s.split_once(':') {
            Some((verb, param)) => (verb.trim(), Some(param)),
            None => (s, None),
        };
        let verb = verb.to_ascii_lowercase();

        let movement = |direction| -> Result<Command, CommandParseError> {
            Ok(Command::Move {
                direction,
                seconds: positive(&verb, param)?,
            })
        };
        let turn = |direction| -> Result<Command, CommandParseError> {
            Ok(Command::Turn {
                direction,
                degrees: positive(&verb, param)?,
            })
        };

        match verb.as_str() {
            "move_fwd" => movement(MoveDirection::Forward),
            "move_back" => movement(MoveDirection::Back),
            "move_left" => movement(MoveDirection::Left),
            "move_right" => movement(MoveDirection::Right),
            "turn_left" => turn(TurnDirection::Left),
            "turn_right" => turn(TurnDirection::Right),
            "jump" => match param {
                Some(p) if !p.trim().is_empty() => Err(CommandParseError::UnexpectedParameter),
                _ => Ok(Command::Jump),
            },
            _ => Err(CommandParseError::UnknownVerb(verb)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { seconds, .. } => write!(f, "{}:{seconds:?}", self.verb()),
            Self::Turn { degrees, .. } => write!(f, "{}:{degrees:?}", self.verb()),
            Self::Jump => f.write_str("jump"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movement() {
        assert_eq!(
            Command::parse("move_fwd:1.0").unwrap(),
            Command::Move {
                direction: MoveDirection::Forward,
                seconds: 1.0
            }
        );
        assert_eq!(
            Command::parse(" MOVE_LEFT: 0.25 ").unwrap(),
            Command::Move {
                direction: MoveDirection::Left,
                seconds: 0.25
            }
        );
    }

    #[test]
    fn test_parse_turn_and_jump() {
        assert_eq!(
            Command::parse("turn_right:90").unwrap(),
            Command::Turn {
                direction: TurnDirection::Right,
                degrees: 90.0
            }
        );
        assert_eq!(Command::parse("jump").unwrap(), Command::Jump);
        assert_eq!(Command::parse("jump:").unwrap(), Command::Jump);
    }

    #[test]
    fn test_rejects_malformed_commands() {
        assert_eq!(Command::parse("  "), Err(CommandParseError::Empty));
        assert!(matches!(Command::parse("fly:2"), Err(CommandParseError::UnknownVerb(_))));
        assert!(matches!(
            Command::parse("move_fwd"),
            Err(CommandParseError::MissingParameter(_))
        ));
        assert!(matches!(
            Command::parse("move_fwd:-1"),
            Err(CommandParseError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Command::parse("turn_left:NaN"),
            Err(CommandParseError::InvalidParameter { .. })
        ));
        assert_eq!(Command::parse("jump:3"), Err(CommandParseError::UnexpectedParameter));
    }

    #[test]
    fn test_display_uses_wire_grammar() {
        assert_eq!(Command::parse("move_fwd:1").unwrap().to_string(), "move_fwd:1.0");
        assert_eq!(Command::parse("turn_left:45.5").unwrap().to_string(), "turn_left:45.5");
        assert_eq!(Command::Jump.to_string(), "jump");
    }

    #[test]
    fn test_verb_of_wire_strings() {
        assert_eq!(verb_of("move_fwd:1.0"), "move_fwd");
        assert_eq!(verb_of("jump"), "jump");
        assert_eq!(verb_of("turn_left:10:extra"), "turn_left");
    }
}

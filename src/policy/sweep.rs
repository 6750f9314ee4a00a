//! A deterministic rule-based exploration policy.
//!
//! Walks forward in legs and turns right between legs, tracing a widening
//! sweep. When the actor stops moving it alternates an escape turn and a
//! jump. Used by the CLI when no model is configured and by tests.

use anyhow::Result;
use serde_json::Value;

use super::traits::{Decision, DecisionPolicy};
use crate::command::{Command, MoveDirection, TurnDirection};
use crate::observation::Observation;
use crate::session::SessionCounters;

#[derive(Debug, Clone)]
pub struct SweepPolicy {
    /// Forward moves per leg before turning.
    leg_steps: u32,
    move_seconds: f64,
    turn_degrees: f64,
}

impl SweepPolicy {
    pub fn new(leg_steps: u32, move_seconds: f64, turn_degrees: f64) -> Self {
        Self {
            leg_steps: leg_steps.max(1),
            move_seconds,
            turn_degrees,
        }
    }

    fn choose(&self, counters: &SessionCounters) -> (Command, &'static str) {
        if counters.idle_steps > 0 {
            return if counters.idle_steps % 2 == 1 {
                (
                    Command::Turn {
                        direction: TurnDirection::Left,
                        degrees: 135.0,
                    },
                    "actor stalled; turning away from obstacle",
                )
            } else {
                (Command::Jump, "actor still stalled; jumping")
            };
        }

        if counters.steps_taken % (self.leg_steps + 1) == self.leg_steps {
            (
                Command::Turn {
                    direction: TurnDirection::Right,
                    degrees: self.turn_degrees,
                },
                "end of sweep leg",
            )
        } else {
            (
                Command::Move {
                    direction: MoveDirection::Forward,
                    seconds: self.move_seconds,
                },
                "continuing sweep leg",
            )
        }
    }
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self::new(4, 1.0, 90.0)
    }
}

impl DecisionPolicy for SweepPolicy {
    async fn decide(
        &self,
        _observation: &Observation,
        _context: &Value,
        counters: &SessionCounters,
    ) -> Result<Decision> {
        let (command, note) = self.choose(counters);
        Ok(Decision::new(command.to_string(), note))
    }
}

//! An in-process stand-in for a game client.
//!
//! The level is a flat square centred on the origin with goal markers
//! scattered over it. Moves integrate the pose along the current heading,
//! markers within reach are collected, and leaving the square drops the
//! actor to `y = -5` for good. Observations carry a small seeded jitter that
//! stays below the idle epsilon, the way real physics never reports exactly
//! the same position twice.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::traits::Actor;
use crate::command::{Command, MoveDirection, TurnDirection};
use crate::observation::{Observation, Vec3};

/// Units travelled per second of movement.
const MOVE_SPEED: f64 = 2.0;
/// Distance at which a goal marker is collected.
const PICKUP_RADIUS: f64 = 1.0;
/// Height of the pit below the level.
const FALLEN_Y: f64 = -5.0;
/// Jitter amplitude on observed x/z.
const JITTER: f64 = 0.002;
/// Path sampling interval used for pickups along a move.
const PATH_SAMPLE: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct SimulatedActor {
    half_extent: f64,
    goals: Vec<(f64, f64)>,
    collected: Vec<bool>,
    position: Vec3,
    yaw: f64,
    fallen: bool,
    rng: StdRng,
}

impl SimulatedActor {
    /// A level of side `2 * half_extent` with `goal_count` markers placed
    /// from `seed`.
    pub fn new(seed: u64, half_extent: f64, goal_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let inner = (half_extent - PICKUP_RADIUS).max(0.5);
        let goals = (0..goal_count)
            .map(|_| (rng.gen_range(-inner..inner), rng.gen_range(-inner..inner)))
            .collect();
        Self::with_goals(seed, half_extent, goals)
    }

    /// A level with explicitly placed goal markers.
    pub fn with_goals(seed: u64, half_extent: f64, goals: Vec<(f64, f64)>) -> Self {
        Self {
            half_extent,
            collected: vec![false; goals.len()],
            goals,
            position: Vec3::default(),
            yaw: 0.0,
            fallen: false,
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn goals_found(&self) -> u32 {
        self.collected.iter().filter(|c| **c).count() as u32
    }

    fn in_bounds(&self, x: f64, z: f64) -> bool {
        x.abs() <= self.half_extent && z.abs() <= self.half_extent
    }

    fn collect_near(&mut self, x: f64, z: f64) {
        for (goal, collected) in self.goals.iter().zip(self.collected.iter_mut()) {
            if !*collected && (goal.0 - x).hypot(goal.1 - z) <= PICKUP_RADIUS {
                *collected = true;
                debug!(x = goal.0, z = goal.1, "goal collected");
            }
        }
    }

    fn travel(&mut self, direction: MoveDirection, seconds: f64) {
        let offset = match direction {
            MoveDirection::Forward => 0.0,
            MoveDirection::Right => 90.0,
            MoveDirection::Back => 180.0,
            MoveDirection::Left => 270.0,
        };
        let heading = (self.yaw + offset).to_radians();
        let distance = seconds * MOVE_SPEED;
        let (dx, dz) = (heading.sin(), heading.cos());

        let samples = (distance / PATH_SAMPLE).ceil().max(1.0) as usize;
        let start = self.position;
        for i in 1..=samples {
            let d = distance * i as f64 / samples as f64;
            let (x, z) = (start.x + dx * d, start.z + dz * d);
            self.position = Vec3::new(x, 0.0, z);
            if !self.in_bounds(x, z) {
                self.fallen = true;
                self.position.y = FALLEN_Y;
                debug!(x, z, "actor walked off the level");
                return;
            }
            self.collect_near(x, z);
        }
    }
}

impl Actor for SimulatedActor {
    async fn observe(&mut self) -> Result<String> {
        let mut position = self.position;
        if !self.fallen {
            position.x += self.rng.gen_range(-JITTER..JITTER);
            position.z += self.rng.gen_range(-JITTER..JITTER);
        }
        let observation = Observation {
            position,
            yaw: self.yaw,
            goal_found: self.goals_found(),
            goal_total: self.goals.len() as u32,
        };
        Ok(observation.to_payload())
    }

    async fn execute(&mut self, command: &Command) -> Result<()> {
        if self.fallen {
            return Ok(());
        }
        match *command {
            Command::Move { direction, seconds } => self.travel(direction, seconds),
            Command::Turn { direction, degrees } => {
                let signed = match direction {
                    TurnDirection::Left => -degrees,
                    TurnDirection::Right => degrees,
                };
                self.yaw = (self.yaw + signed).rem_euclid(360.0);
            }
            // Flat level: a jump lands where it started.
            Command::Jump => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fwd(seconds: f64) -> Command {
        Command::Move {
            direction: MoveDirection::Forward,
            seconds,
        }
    }

    #[tokio::test]
    async fn forward_move_collects_goal_on_path() {
        let mut actor = SimulatedActor::with_goals(7, 10.0, vec![(0.0, 3.0), (5.0, 5.0)]);
        actor.execute(&fwd(2.0)).await.unwrap();

        let obs = Observation::decode(&actor.observe().await.unwrap());
        assert!((obs.position.z - 4.0).abs() < 0.01);
        assert_eq!(obs.goal_found, 1);
        assert_eq!(obs.goal_total, 2);
    }

    #[tokio::test]
    async fn turn_changes_heading() {
        let mut actor = SimulatedActor::with_goals(1, 10.0, vec![]);
        actor
            .execute(&Command::Turn {
                direction: TurnDirection::Right,
                degrees: 90.0,
            })
            .await
            .unwrap();
        actor.execute(&fwd(1.0)).await.unwrap();
        let p = actor.position();
        assert!((p.x - 2.0).abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);

        actor
            .execute(&Command::Turn {
                direction: TurnDirection::Left,
                degrees: 180.0,
            })
            .await
            .unwrap();
        let obs = Observation::decode(&actor.observe().await.unwrap());
        assert!((obs.yaw - 270.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn leaving_level_falls_for_good() {
        let mut actor = SimulatedActor::with_goals(3, 2.0, vec![]);
        actor.execute(&fwd(5.0)).await.unwrap();
        let obs = Observation::decode(&actor.observe().await.unwrap());
        assert_eq!(obs.position.y, FALLEN_Y);

        actor.execute(&fwd(1.0)).await.unwrap();
        actor.execute(&Command::Jump).await.unwrap();
        assert_eq!(actor.position().y, FALLEN_Y);
    }

    #[tokio::test]
    async fn jitter_stays_below_idle_epsilon() {
        let mut actor = SimulatedActor::new(42, 10.0, 3);
        let a = Observation::decode(&actor.observe().await.unwrap());
        let b = Observation::decode(&actor.observe().await.unwrap());
        assert!((a.position.x - b.position.x).abs() < crate::config::POSITION_EPSILON);
        assert!((a.position.z - b.position.z).abs() < crate::config::POSITION_EPSILON);
    }

    #[test]
    fn seeded_layout_is_reproducible() {
        let a = SimulatedActor::new(9, 10.0, 4);
        let b = SimulatedActor::new(9, 10.0, 4);
        assert_eq!(a.goals, b.goals);
        assert!(a.goals.iter().all(|g| g.0.abs() < 10.0 && g.1.abs() < 10.0));
    }
}

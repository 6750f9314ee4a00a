//! Idle and out-of-bounds detection from consecutive observations.

use crate::config::SessionConfig;
use crate::observation::{Observation, Vec3};
use crate::scenario::Constraints;

use super::state::Session;

/// Shortest angular distance between two headings, in degrees.
pub fn yaw_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Compares consecutive poses against fixed thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    position_epsilon: f64,
    yaw_epsilon_deg: f64,
    floor_threshold: f64,
}

impl ProgressTracker {
    pub fn new(position_epsilon: f64, yaw_epsilon_deg: f64, floor_threshold: f64) -> Self {
        Self {
            position_epsilon,
            yaw_epsilon_deg,
            floor_threshold,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.position_epsilon,
            config.yaw_epsilon_deg,
            config.floor_threshold,
        )
    }

    pub fn floor_threshold(&self) -> f64 {
        self.floor_threshold
    }

    /// Whether the pose is unchanged since `previous`. With no previous
    /// sample the actor is never idle.
    pub fn is_idle(&self, previous: Option<(Vec3, f64)>, position: Vec3, yaw: f64) -> bool {
        let Some((prev_pos, prev_yaw)) = previous else {
            return false;
        };
        (position.x - prev_pos.x).abs() < self.position_epsilon
            && (position.y - prev_pos.y).abs() < self.position_epsilon
            && (position.z - prev_pos.z).abs() < self.position_epsilon
            && yaw_delta(yaw, prev_yaw) < self.yaw_epsilon_deg
    }

    /// Whether the actor is below the floor and the scenario forbids falling.
    pub fn is_fallen(&self, position: Vec3, constraints: &Constraints) -> bool {
        constraints.avoid_falling && position.y < self.floor_threshold
    }

    /// Fold one observation into the session's idle and bounds state.
    pub fn update(&self, session: &mut Session, observation: &Observation) {
        let previous = session.last_position.zip(session.last_yaw);
        if self.is_idle(previous, observation.position, observation.yaw) {
            session.idle_steps += 1;
            session.peak_idle_steps = session.peak_idle_steps.max(session.idle_steps);
        } else {
            session.idle_steps = 0;
        }

        if self.is_fallen(observation.position, &session.scenario.constraints) {
            session.fell = true;
        }

        session.last_position = Some(observation.position);
        session.last_yaw = Some(observation.yaw);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::scenario::ScenarioDefinition;

    fn obs(x: f64, y: f64, yaw: f64) -> Observation {
        Observation {
            position: Vec3::new(x, y, 0.0),
            yaw,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_sample_is_never_idle() {
        let tracker = ProgressTracker::default();
        assert!(!tracker.is_idle(None, Vec3::default(), 0.0));
    }

    #[test]
    fn test_jitter_below_epsilon_is_idle() {
        let tracker = ProgressTracker::default();
        let prev = Some((Vec3::new(1.0, 0.0, 1.0), 10.0));
        assert!(tracker.is_idle(prev, Vec3::new(1.005, 0.004, 0.996), 10.3));
    }

    #[test]
    fn test_any_axis_or_yaw_change_breaks_idle() {
        let tracker = ProgressTracker::default();
        let prev = Some((Vec3::default(), 0.0));
        assert!(!tracker.is_idle(prev, Vec3::new(0.01, 0.0, 0.0), 0.0));
        assert!(!tracker.is_idle(prev, Vec3::new(0.0, 0.0, -0.02), 0.0));
        assert!(!tracker.is_idle(prev, Vec3::default(), 0.5));
    }

    #[test]
    fn test_yaw_delta_wraps() {
        assert!((yaw_delta(359.9, 0.1) - 0.2).abs() < 1e-9);
        assert!((yaw_delta(-90.0, 270.0)).abs() < 1e-9);
        assert!((yaw_delta(10.0, 190.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_counts_consecutive_idle_run() {
        let tracker = ProgressTracker::default();
        let mut session = Session::new(ScenarioDefinition::default_scenario(), Utc::now());

        tracker.update(&mut session, &obs(0.0, 0.0, 0.0));
        assert_eq!(session.idle_steps, 0);
        tracker.update(&mut session, &obs(0.0, 0.0, 0.0));
        tracker.update(&mut session, &obs(0.001, 0.0, 0.1));
        assert_eq!(session.idle_steps, 2);
        tracker.update(&mut session, &obs(1.0, 0.0, 0.1));
        assert_eq!(session.idle_steps, 0);
        assert_eq!(session.peak_idle_steps, 2);
    }

    #[test]
    fn test_fall_requires_constraint() {
        let tracker = ProgressTracker::default();
        let mut constraints = Constraints::default();
        assert!(!tracker.is_fallen(Vec3::new(0.0, -2.0, 0.0), &constraints));
        constraints.avoid_falling = true;
        assert!(tracker.is_fallen(Vec3::new(0.0, -2.0, 0.0), &constraints));
        assert!(!tracker.is_fallen(Vec3::new(0.0, -1.0, 0.0), &constraints));
    }

    #[test]
    fn test_update_marks_fall() {
        let tracker = ProgressTracker::default();
        let mut session = Session::new(ScenarioDefinition::default_scenario(), Utc::now());
        tracker.update(&mut session, &obs(0.0, -3.0, 0.0));
        assert!(session.fell);
    }
}

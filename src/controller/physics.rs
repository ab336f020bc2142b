use glam::{Quat, Vec3};

use crate::config::{Integration, VehicleTuning};
use crate::controller::input::{Control, InputState};

/// Handling constants in effect for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveMode {
    pub boosting: bool,
    pub drifting: bool,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Reported for the HUD only; velocity is never scaled by it
    pub drift_factor: f32,
    pub tilt_factor: f32,
}

impl DriveMode {
    pub fn select(input: &InputState, tuning: &VehicleTuning) -> Self {
        let boosting = input.is_held(Control::Boost);
        let drifting = input.is_held(Control::Drift);
        let (max_speed, acceleration) = if boosting {
            (tuning.nitro_max_speed, tuning.nitro_acceleration)
        } else {
            (tuning.normal_max_speed, tuning.acceleration)
        };
        let (drift_factor, tilt_factor) = if drifting {
            (tuning.drift_drift_factor, tuning.drift_tilt_factor)
        } else {
            (tuning.base_drift_factor, tuning.base_tilt_factor)
        };
        Self { boosting, drifting, max_speed, acceleration, drift_factor, tilt_factor }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    /// Signed speed along the car's forward axis
    pub velocity: f32,
    /// Yaw in radians, accumulated without wrapping
    pub heading: f32,
    /// Cosmetic roll in radians
    pub tilt: f32,
    pub position: Vec3,
}

impl VehicleState {
    pub fn at(position: Vec3) -> Self {
        Self { velocity: 0.0, heading: 0.0, tilt: 0.0, position }
    }
}

/// What the renderer needs to place the car
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleTransform {
    pub position: Vec3,
    pub heading: f32,
    pub tilt: f32,
}

impl VehicleTransform {
    /// XYZ Euler angles: yaw about Y, roll about Z
    pub fn euler(&self) -> Vec3 {
        Vec3::new(0.0, self.heading, self.tilt)
    }

    /// Rotates a car-local offset by heading and adds it to the car position
    pub fn relative(&self, offset: Vec3) -> Vec3 {
        self.position + rotate_by_heading(offset, self.heading)
    }
}

pub fn rotate_by_heading(v: Vec3, heading: f32) -> Vec3 {
    Quat::from_rotation_y(heading) * v
}

/// Result of one vehicle step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleStep {
    pub transform: VehicleTransform,
    pub velocity: f32,
    pub mode: DriveMode,
    pub target_speed: f32,
    /// +1 left, -1 right, 0 straight
    pub turn_direction: f32,
    pub turn_amount: f32,
    pub speed_factor: f32,
    pub accelerating_forward: bool,
    pub sliding: bool,
}

/// Arcade car kinematics: speed, heading, tilt and position, once per frame
#[derive(Debug, Clone)]
pub struct VehicleSimulator {
    tuning: VehicleTuning,
    integration: Integration,
    state: VehicleState,
}

impl VehicleSimulator {
    pub fn new(tuning: VehicleTuning, integration: Integration) -> Self {
        let state = VehicleState::at(tuning.start_position);
        Self { tuning, integration, state }
    }

    pub fn with_state(tuning: VehicleTuning, integration: Integration, state: VehicleState) -> Self {
        Self { tuning, integration, state }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn step(&mut self, input: &InputState, delta: f32) -> VehicleStep {
        let tuning = &self.tuning;
        let integ = self.integration;
        let state = &mut self.state;
        let mode = DriveMode::select(input, tuning);

        // Longitudinal speed; reverse wins when both pedals are held
        let forward = input.is_held(Control::Forward);
        let reverse = input.is_held(Control::Reverse);
        let target_speed = if reverse {
            -mode.max_speed * tuning.reverse_ratio
        } else if forward {
            mode.max_speed
        } else {
            0.0
        };
        state.velocity += (target_speed - state.velocity) * integ.blend(mode.acceleration, delta);
        if !forward && !reverse {
            state.velocity *= integ.decay(tuning.deceleration, delta);
        }
        state.velocity = state.velocity.clamp(-mode.max_speed, mode.max_speed);

        // Turning
        let left = input.is_held(Control::TurnLeft);
        let right = input.is_held(Control::TurnRight);
        let turn_direction = match (left, right) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        let speed = state.velocity.abs();
        let speed_factor = speed / mode.max_speed;
        let turn_amount = integ.step(
            tuning.turn_speed * turn_direction * (0.5 + speed_factor * 0.5),
            delta,
        );
        state.heading += turn_amount;

        // Banking
        let target_tilt = -turn_direction * mode.tilt_factor * speed_factor;
        state.tilt += (target_tilt - state.tilt) * integ.blend(tuning.tilt_smoothing, delta);
        state.tilt = state.tilt.clamp(-mode.tilt_factor, mode.tilt_factor);

        // Translation with a world-x slide while turning hard
        let mut movement = rotate_by_heading(Vec3::new(0.0, 0.0, state.velocity), state.heading);
        let sliding = turn_direction != 0.0 && speed > mode.max_speed * tuning.slide_threshold;
        if sliding {
            let multiplier = if mode.drifting { tuning.drift_slide_multiplier } else { 1.0 };
            movement.x += turn_direction * speed_factor * tuning.slide_scale * multiplier;
        }
        state.position.x += integ.step(movement.x, delta);
        state.position.z += integ.step(movement.z, delta);
        state.position.y = tuning.ground_height + speed * tuning.bounce;

        VehicleStep {
            transform: VehicleTransform {
                position: state.position,
                heading: state.heading,
                tilt: state.tilt,
            },
            velocity: state.velocity,
            mode,
            target_speed,
            turn_direction,
            turn_amount,
            speed_factor,
            accelerating_forward: forward,
            sliding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;
    const FRAME: f32 = 1.0 / 60.0;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn holding(controls: &[Control]) -> InputState {
        let mut input = InputState::new();
        for c in controls {
            input.set_held(*c, true);
        }
        input
    }

    fn sim_with(state: VehicleState) -> VehicleSimulator {
        VehicleSimulator::with_state(VehicleTuning::default(), Integration::FrameLocked, state)
    }

    #[test]
    fn mode_selection() {
        let tuning = VehicleTuning::default();
        let normal = DriveMode::select(&InputState::new(), &tuning);
        assert_eq!(normal.max_speed, 0.3);
        assert_eq!(normal.acceleration, 0.03);
        assert_eq!(normal.drift_factor, 0.90);
        assert_eq!(normal.tilt_factor, 0.2);

        let both = DriveMode::select(&holding(&[Control::Boost, Control::Drift]), &tuning);
        assert_eq!(both.max_speed, 0.4);
        assert_eq!(both.acceleration, 0.06);
        assert_eq!(both.drift_factor, 0.75);
        assert_eq!(both.tilt_factor, 0.4);
    }

    #[test]
    fn forward_from_rest_approaches_max_without_overshoot() {
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let input = holding(&[Control::Forward]);
        let mut last = 0.0;
        for _ in 0..100 {
            let step = sim.step(&input, FRAME);
            assert!(step.velocity > last);
            assert!(step.velocity < 0.3);
            last = step.velocity;
        }
        // 1 - 0.97^100
        assert!((last - 0.3 * (1.0 - 0.97f32.powi(100))).abs() < 1e-4);
    }

    #[test]
    fn speed_stays_bounded_in_every_mode() {
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let boost = holding(&[Control::Forward, Control::Boost]);
        for _ in 0..500 {
            let step = sim.step(&boost, FRAME);
            assert!(step.velocity.abs() <= 0.4 + EPS);
        }
        // releasing nitro at top speed must not leave the car above the normal cap
        let step = sim.step(&holding(&[Control::Forward]), FRAME);
        assert!(step.velocity <= 0.3 + EPS);
        for _ in 0..500 {
            let step = sim.step(&holding(&[Control::Reverse]), FRAME);
            assert!(step.velocity.abs() <= 0.3 + EPS);
        }
    }

    #[test]
    fn reverse_target_is_sixty_percent() {
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let step = sim.step(&holding(&[Control::Reverse]), FRAME);
        assert!(approx(step.target_speed, -0.18));
        let step = sim.step(&holding(&[Control::Reverse, Control::Boost]), FRAME);
        assert!(approx(step.target_speed, -0.24));
        for _ in 0..2000 {
            sim.step(&holding(&[Control::Reverse]), FRAME);
        }
        assert!((sim.state().velocity + 0.18).abs() < 1e-4);
    }

    #[test]
    fn reverse_wins_over_forward() {
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let step = sim.step(&holding(&[Control::Forward, Control::Reverse]), FRAME);
        assert!(step.target_speed < 0.0);
        assert!(step.velocity < 0.0);
    }

    #[test]
    fn coasting_decays_geometrically() {
        let tuning = VehicleTuning::default();
        let v0 = 0.25;
        let mut sim = sim_with(VehicleState { velocity: v0, ..VehicleState::at(tuning.start_position) });
        let idle = InputState::new();
        let per_frame = (1.0 - tuning.acceleration) * tuning.deceleration;
        for n in 1..=40 {
            let step = sim.step(&idle, FRAME);
            let expected = v0 * per_frame.powi(n);
            assert!((step.velocity - expected).abs() < 1e-5, "frame {n}");
            assert!(step.velocity > 0.0);
        }
    }

    #[test]
    fn turn_rate_scales_with_speed() {
        let tuning = VehicleTuning::default();
        let mut sim = VehicleSimulator::new(tuning.clone(), Integration::FrameLocked);
        let step = sim.step(&holding(&[Control::TurnLeft]), FRAME);
        assert!(approx(step.turn_amount, 0.5 * tuning.turn_speed));
        assert!(approx(sim.state().heading, 0.025));

        let at_max = VehicleState { velocity: 0.3, ..VehicleState::at(tuning.start_position) };
        let mut sim = sim_with(at_max);
        let step = sim.step(&holding(&[Control::Forward, Control::TurnRight]), FRAME);
        assert!(approx(step.speed_factor, 1.0));
        assert!(approx(step.turn_amount, -tuning.turn_speed));
    }

    #[test]
    fn opposite_turns_cancel() {
        let at_speed = VehicleState { velocity: 0.3, tilt: 0.0, ..VehicleState::at(Vec3::ZERO) };
        let mut sim = sim_with(at_speed);
        let step = sim.step(&holding(&[Control::Forward, Control::TurnLeft, Control::TurnRight]), FRAME);
        assert_eq!(step.turn_direction, 0.0);
        assert_eq!(step.turn_amount, 0.0);
        assert_eq!(step.transform.tilt, 0.0);
        assert!(!step.sliding);
    }

    #[test]
    fn tilt_leans_against_the_turn_and_stays_bounded() {
        let mut sim = sim_with(VehicleState { velocity: 0.3, ..VehicleState::at(Vec3::ZERO) });
        let input = holding(&[Control::Forward, Control::TurnLeft]);
        let first = sim.step(&input, FRAME);
        // one tenth of the way to -0.2
        assert!(approx(first.transform.tilt, -0.02));
        for _ in 0..300 {
            let step = sim.step(&input, FRAME);
            assert!(step.transform.tilt >= -0.2 - EPS);
        }
        assert!((sim.state().tilt + 0.2).abs() < 1e-3);

        let drift = holding(&[Control::Forward, Control::TurnLeft, Control::Drift]);
        for _ in 0..300 {
            sim.step(&drift, FRAME);
        }
        assert!((sim.state().tilt + 0.4).abs() < 1e-3);
        // leaving drift snaps the roll back inside the base bound
        let step = sim.step(&input, FRAME);
        assert!(step.transform.tilt.abs() <= 0.2 + EPS);
    }

    #[test]
    fn straight_frame_at_top_speed() {
        let start = VehicleState { velocity: 0.3, ..VehicleState::at(Vec3::new(0.0, 0.2, 0.0)) };
        let mut sim = sim_with(start);
        let step = sim.step(&holding(&[Control::Forward]), FRAME);
        assert!(approx(step.transform.position.z, 0.3));
        assert!(approx(step.transform.position.x, 0.0));
        assert!(approx(step.transform.position.y, 0.215));
    }

    #[test]
    fn movement_follows_heading() {
        let heading = std::f32::consts::FRAC_PI_2;
        let start = VehicleState { velocity: 0.3, heading, ..VehicleState::at(Vec3::ZERO) };
        let mut sim = sim_with(start);
        let step = sim.step(&holding(&[Control::Forward]), FRAME);
        assert!((step.transform.position.x - 0.3).abs() < 1e-5);
        assert!(step.transform.position.z.abs() < 1e-5);
    }

    #[test]
    fn hard_turns_slide_sideways_and_drift_doubles_it() {
        let start = VehicleState { velocity: 0.3, ..VehicleState::at(Vec3::ZERO) };

        let mut plain = sim_with(start);
        let a = plain.step(&holding(&[Control::Forward, Control::TurnLeft]), FRAME);
        let mut drifting = sim_with(start);
        let b = drifting.step(&holding(&[Control::Forward, Control::TurnLeft, Control::Drift]), FRAME);
        assert!(a.sliding && b.sliding);

        let rotated = rotate_by_heading(Vec3::new(0.0, 0.0, 0.3), a.transform.heading);
        let slide_a = a.transform.position.x - rotated.x;
        let slide_b = b.transform.position.x - rotated.x;
        assert!((slide_a - 0.02).abs() < 1e-5);
        assert!((slide_b - 0.04).abs() < 1e-5);
    }

    #[test]
    fn slow_turns_do_not_slide() {
        let start = VehicleState { velocity: 0.1, ..VehicleState::at(Vec3::ZERO) };
        let mut sim = sim_with(start);
        let step = sim.step(&holding(&[Control::Forward, Control::TurnRight]), FRAME);
        assert!(!step.sliding);
    }

    #[test]
    fn drift_factor_never_touches_velocity() {
        let start = VehicleState { velocity: 0.2, ..VehicleState::at(Vec3::ZERO) };
        let mut plain = sim_with(start);
        let mut drifting = sim_with(start);
        let a = plain.step(&holding(&[Control::Forward]), FRAME);
        let b = drifting.step(&holding(&[Control::Forward, Control::Drift]), FRAME);
        assert_eq!(a.velocity, b.velocity);
        assert_ne!(a.mode.drift_factor, b.mode.drift_factor);
    }

    #[test]
    fn delta_scaled_matches_frame_locked_at_reference_rate() {
        let tuning = VehicleTuning::default();
        let mut locked = VehicleSimulator::new(tuning.clone(), Integration::FrameLocked);
        let mut scaled = VehicleSimulator::new(tuning, Integration::DeltaScaled { reference_fps: 60.0 });
        let input = holding(&[Control::Forward, Control::TurnLeft, Control::Boost]);
        for _ in 0..120 {
            locked.step(&input, FRAME);
            scaled.step(&input, FRAME);
        }
        let (a, b) = (locked.state(), scaled.state());
        assert!((a.velocity - b.velocity).abs() < 1e-4);
        assert!((a.heading - b.heading).abs() < 1e-3);
        assert!((a.position - b.position).length() < 1e-2);
    }

    #[test]
    fn delta_scaled_is_frame_rate_independent_for_heading() {
        let tuning = VehicleTuning::default();
        let integ = Integration::DeltaScaled { reference_fps: 60.0 };
        let mut fast = VehicleSimulator::new(tuning.clone(), integ);
        let mut slow = VehicleSimulator::new(tuning, integ);
        let input = holding(&[Control::TurnLeft]);
        for _ in 0..4 {
            fast.step(&input, 1.0 / 120.0);
        }
        for _ in 0..2 {
            slow.step(&input, 1.0 / 60.0);
        }
        assert!((fast.state().heading - slow.state().heading).abs() < 1e-5);
    }
}

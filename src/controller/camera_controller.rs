use glam::Vec3;

use crate::config::{CameraTuning, Integration};
use crate::controller::physics::{VehicleStep, VehicleTransform};

/// Where the camera sits and what it looks at this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

/// Trailing third-person camera.
///
/// Position lags behind the car through exponential smoothing while the aim
/// snaps to a point ahead of the car every frame. The nitro shake is layered
/// onto the emitted eye only, so it never accumulates in the smoothed position.
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    tuning: CameraTuning,
    integration: Integration,
    position: Vec3,
}

impl ChaseCamera {
    pub fn new(tuning: CameraTuning, integration: Integration) -> Self {
        let position = tuning.initial_eye;
        Self { tuning, integration, position }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading-rotated follow offset, pulled back and down as speed rises
    pub fn target_position(&self, vehicle: &VehicleTransform, speed: f32) -> Vec3 {
        let pull = speed.abs() * self.tuning.speed_pull;
        let mut offset = self.tuning.offset;
        offset.y -= pull * self.tuning.speed_drop;
        offset.z -= pull * self.tuning.speed_pullback;
        vehicle.relative(offset)
    }

    pub fn look_target(&self, vehicle: &VehicleTransform) -> Vec3 {
        vehicle.relative(self.tuning.look_offset)
    }

    pub fn shake(&self, elapsed: f32) -> f32 {
        (elapsed * self.tuning.shake_frequency).sin() * self.tuning.shake_amplitude
    }

    pub fn update(&mut self, step: &VehicleStep, elapsed: f32, delta: f32) -> CameraPose {
        let target_position = self.target_position(&step.transform, step.velocity);
        let blend = self.integration.blend(self.tuning.smoothing, delta);
        self.position = self.position.lerp(target_position, blend);

        let mut eye = self.position;
        if step.mode.boosting && step.accelerating_forward {
            eye.y += self.shake(elapsed);
        }

        CameraPose { eye, target: self.look_target(&step.transform) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleTuning;
    use crate::controller::input::{Control, InputState};
    use crate::controller::physics::{VehicleSimulator, VehicleState};

    const FRAME: f32 = 1.0 / 60.0;

    fn holding(controls: &[Control]) -> InputState {
        let mut input = InputState::new();
        for c in controls {
            input.set_held(*c, true);
        }
        input
    }

    fn camera() -> ChaseCamera {
        ChaseCamera::new(CameraTuning::default(), Integration::FrameLocked)
    }

    #[test]
    fn target_sits_behind_the_car_at_rest() {
        let cam = camera();
        let car = VehicleTransform { position: Vec3::new(1.0, 0.2, 1.0), heading: 0.0, tilt: 0.0 };
        let target = cam.target_position(&car, 0.0);
        assert!((target - Vec3::new(1.0, 0.2, -1.5)).length() < 1e-6);
        let look = cam.look_target(&car);
        assert!((look - Vec3::new(1.0, 0.2, 3.0)).length() < 1e-6);
    }

    #[test]
    fn target_rotates_with_heading_and_pulls_back_with_speed() {
        let cam = camera();
        let car = VehicleTransform {
            position: Vec3::ZERO,
            heading: std::f32::consts::PI,
            tilt: 0.0,
        };
        // pull = 0.3 * 0.5; y -= 0.03; z -= 0.075; then rotated half a turn
        let target = cam.target_position(&car, 0.3);
        assert!((target - Vec3::new(0.0, -0.03, 2.575)).length() < 1e-5);
    }

    #[test]
    fn position_follows_exponential_smoothing_law() {
        let mut cam = camera();
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let input = holding(&[Control::Forward, Control::TurnLeft]);
        for _ in 0..50 {
            let old = cam.position();
            let step = sim.step(&input, FRAME);
            let target = cam.target_position(&step.transform, step.velocity);
            let pose = cam.update(&step, 0.0, FRAME);
            let expected = old + (target - old) * 0.15;
            assert!((cam.position() - expected).length() < 1e-5);
            assert_eq!(pose.eye, cam.position());
        }
    }

    #[test]
    fn position_converges_but_never_lands_on_target() {
        let mut cam = camera();
        let mut parked = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let idle = InputState::new();
        let mut last_distance = f32::MAX;
        for _ in 0..60 {
            let step = parked.step(&idle, FRAME);
            cam.update(&step, 0.0, FRAME);
            let distance = cam.position().distance(cam.target_position(&step.transform, 0.0));
            assert!(distance > 0.0);
            assert!(distance < last_distance);
            last_distance = distance;
        }
    }

    #[test]
    fn aim_snaps_while_position_lags() {
        let mut cam = camera();
        let state = VehicleState { heading: 1.0, velocity: 0.3, ..VehicleState::at(Vec3::new(5.0, 0.2, 5.0)) };
        let mut sim = VehicleSimulator::with_state(VehicleTuning::default(), Integration::FrameLocked, state);
        let step = sim.step(&holding(&[Control::Forward]), FRAME);
        let pose = cam.update(&step, 0.0, FRAME);
        assert!((pose.target - step.transform.relative(Vec3::new(0.0, 0.0, 2.0))).length() < 1e-6);
        assert!(pose.eye.distance(cam.target_position(&step.transform, step.velocity)) > 0.1);
    }

    #[test]
    fn nitro_shake_rides_on_top_of_smoothing() {
        let mut shaken = camera();
        let mut calm = camera();
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let input = holding(&[Control::Forward, Control::Boost]);
        let elapsed = 0.05;
        let step = sim.step(&input, FRAME);
        let pose = shaken.update(&step, elapsed, FRAME);

        let mut no_boost = step;
        no_boost.mode.boosting = false;
        let calm_pose = calm.update(&no_boost, elapsed, FRAME);

        let expected = (elapsed * 30.0).sin() * 0.01;
        assert!((pose.eye.y - calm_pose.eye.y - expected).abs() < 1e-6);
        assert_eq!(shaken.position(), calm.position());
    }

    #[test]
    fn no_shake_when_boosting_without_throttle() {
        let mut cam = camera();
        let mut sim = VehicleSimulator::new(VehicleTuning::default(), Integration::FrameLocked);
        let step = sim.step(&holding(&[Control::Boost]), FRAME);
        let pose = cam.update(&step, 0.05, FRAME);
        assert_eq!(pose.eye, cam.position());
    }
}

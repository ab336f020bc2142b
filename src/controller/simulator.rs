use crate::config::DriveConfig;
use crate::controller::camera_controller::{CameraPose, ChaseCamera};
use crate::controller::input::{Control, InputState};
use crate::controller::physics::{DriveMode, VehicleSimulator, VehicleStep, VehicleTransform};

/// Timing handed to the simulator each frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds since the loop started
    pub elapsed: f32,
}

/// Per-frame numbers for the HUD and logs
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub velocity: f32,
    pub target_speed: f32,
    pub speed_factor: f32,
    pub turn_direction: f32,
    pub mode: DriveMode,
    pub sliding: bool,
    /// Held flags in `Control::ALL` order
    pub held: [bool; 6],
}

impl Telemetry {
    pub fn held_controls(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().zip(self.held).filter_map(|(c, h)| h.then_some(c))
    }

    pub fn any_held(&self) -> bool {
        self.held.contains(&true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub vehicle: VehicleTransform,
    pub camera: CameraPose,
    pub telemetry: Telemetry,
}

/// Vehicle kinematics plus the chase camera that trails it
#[derive(Debug, Clone)]
pub struct DriveSimulator {
    vehicle: VehicleSimulator,
    camera: ChaseCamera,
}

impl DriveSimulator {
    pub fn new(config: &DriveConfig) -> Self {
        Self {
            vehicle: VehicleSimulator::new(config.vehicle.clone(), config.integration),
            camera: ChaseCamera::new(config.camera.clone(), config.integration),
        }
    }

    pub fn vehicle(&self) -> &VehicleSimulator {
        &self.vehicle
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn update(&mut self, input: &InputState, time: FrameTime) -> FrameOutput {
        let step = self.vehicle.step(input, time.delta);
        let camera = self.camera.update(&step, time.elapsed, time.delta);
        FrameOutput {
            vehicle: step.transform,
            camera,
            telemetry: telemetry(&step, input),
        }
    }
}

fn telemetry(step: &VehicleStep, input: &InputState) -> Telemetry {
    Telemetry {
        velocity: step.velocity,
        target_speed: step.target_speed,
        speed_factor: step.speed_factor,
        turn_direction: step.turn_direction,
        mode: step.mode,
        sliding: step.sliding,
        held: Control::ALL.map(|c| input.is_held(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn update_moves_car_and_camera_together() {
        let mut sim = DriveSimulator::new(&DriveConfig::default());
        let mut input = InputState::new();
        input.set_held(Control::Forward, true);
        input.set_held(Control::Boost, true);

        let mut time = FrameTime { delta: 1.0 / 60.0, elapsed: 0.0 };
        let mut out = sim.update(&input, time);
        for _ in 0..120 {
            time.elapsed += time.delta;
            out = sim.update(&input, time);
        }
        assert!(out.vehicle.position.z > 5.0);
        assert!(out.camera.eye.z < out.vehicle.position.z);
        assert!(out.camera.target.z > out.vehicle.position.z);
        assert!(out.telemetry.mode.boosting);
        assert_eq!(
            out.telemetry.held_controls().collect::<Vec<_>>(),
            vec![Control::Forward, Control::Boost]
        );
        assert_eq!(out.telemetry.held, [true, false, false, false, false, true]);
        assert_eq!(sim.vehicle().state().position, out.vehicle.position);
    }

    #[test]
    fn idle_frames_leave_the_car_parked() {
        let config = DriveConfig::default();
        let mut sim = DriveSimulator::new(&config);
        let input = InputState::new();
        let out = sim.update(&input, FrameTime { delta: 0.016, elapsed: 0.016 });
        assert_eq!(out.vehicle.position, Vec3::new(0.0, 0.2, 0.0));
        assert_eq!(out.vehicle.heading, 0.0);
        assert_eq!(out.telemetry.velocity, 0.0);
        assert!(!out.telemetry.any_held());
        assert_eq!(sim.camera().position(), out.camera.eye);
    }
}

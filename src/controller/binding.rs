use crate::controller::simulator::FrameOutput;
use crate::model::{CameraHandle, NodeHandle};

/// Which node writes happened this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppliedWrites {
    pub vehicle: bool,
    pub camera: bool,
}

/// Copies simulator output onto renderer-owned nodes.
///
/// Both handles are optional because the scene may still be assembling; a
/// missing node simply skips its write.
#[derive(Default)]
pub struct SceneBinding {
    vehicle: Option<NodeHandle>,
    camera: Option<CameraHandle>,
}

impl SceneBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_vehicle(&mut self, node: NodeHandle) {
        self.vehicle = Some(node);
    }

    pub fn attach_camera(&mut self, camera: CameraHandle) {
        self.camera = Some(camera);
    }

    pub fn detach_vehicle(&mut self) -> Option<NodeHandle> {
        self.vehicle.take()
    }

    pub fn detach_camera(&mut self) -> Option<CameraHandle> {
        self.camera.take()
    }

    pub fn has_vehicle(&self) -> bool {
        self.vehicle.is_some()
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn apply(&self, output: &FrameOutput) -> AppliedWrites {
        let mut writes = AppliedWrites::default();
        if let Some(node) = &self.vehicle {
            let mut node = node.borrow_mut();
            node.position = output.vehicle.position;
            node.rotation = output.vehicle.euler();
            writes.vehicle = true;
        }
        if let Some(camera) = &self.camera {
            let mut camera = camera.borrow_mut();
            camera.eye = output.camera.eye;
            camera.set_look_at(output.camera.target);
            writes.camera = true;
        }
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveConfig;
    use crate::controller::input::InputState;
    use crate::controller::simulator::{DriveSimulator, FrameTime};
    use crate::model::{Camera, Transform};
    use glam::Vec3;

    fn one_frame() -> FrameOutput {
        let mut sim = DriveSimulator::new(&DriveConfig::default());
        sim.update(&InputState::new(), FrameTime { delta: 0.016, elapsed: 0.016 })
    }

    #[test]
    fn writes_both_nodes() {
        let car = Transform::default().shared();
        let cam = Camera::new(800, 600).shared();
        let mut binding = SceneBinding::new();
        binding.attach_vehicle(car.clone());
        binding.attach_camera(cam.clone());

        let out = one_frame();
        let writes = binding.apply(&out);
        assert_eq!(writes, AppliedWrites { vehicle: true, camera: true });
        assert_eq!(car.borrow().position, Vec3::new(0.0, 0.2, 0.0));
        assert_eq!(cam.borrow().eye, out.camera.eye);
        assert_eq!(cam.borrow().target, out.camera.target);
    }

    #[test]
    fn missing_camera_is_skipped() {
        let car = Transform::default().shared();
        let mut binding = SceneBinding::new();
        binding.attach_vehicle(car);
        let writes = binding.apply(&one_frame());
        assert!(writes.vehicle);
        assert!(!writes.camera);
    }

    #[test]
    fn rotation_carries_heading_and_tilt() {
        let car = Transform::default().shared();
        let mut binding = SceneBinding::new();
        binding.attach_vehicle(car.clone());
        let mut out = one_frame();
        out.vehicle.heading = 1.25;
        out.vehicle.tilt = -0.1;
        binding.apply(&out);
        assert_eq!(car.borrow().rotation, Vec3::new(0.0, 1.25, -0.1));
    }

    #[test]
    fn released_nodes_are_left_alone() {
        let car = Transform::default().shared();
        let cam = Camera::new(800, 600).shared();
        let mut binding = SceneBinding::new();
        binding.attach_vehicle(car.clone());
        binding.attach_camera(cam.clone());

        assert!(binding.detach_camera().is_some());
        assert!(!binding.has_camera());
        let out = one_frame();
        assert_eq!(binding.apply(&out), AppliedWrites { vehicle: true, camera: false });

        assert!(binding.detach_vehicle().is_some());
        assert!(!binding.has_vehicle());
        car.borrow_mut().position = Vec3::new(5.0, 0.0, 5.0);
        assert_eq!(binding.apply(&out), AppliedWrites::default());
        assert_eq!(car.borrow().position, Vec3::new(5.0, 0.0, 5.0));
        assert!(binding.detach_vehicle().is_none());
    }
}

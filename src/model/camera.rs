use glam::{Mat4, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

pub type CameraHandle = Rc<RefCell<Camera>>;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn shared(self) -> CameraHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_target_lands_in_view_center() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(0.0, 0.2, -2.5);
        cam.set_look_at(Vec3::new(0.0, 0.2, 2.0));
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn aspect_ignores_zero_height() {
        let mut cam = Camera::new(800, 600);
        cam.set_aspect(800, 0);
        assert!(cam.aspect.is_finite());
    }
}

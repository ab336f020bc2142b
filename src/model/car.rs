use glam::Vec3;

use crate::utils::{hex_color, BoxSpec, Mesh};

/// Box-built car body in model space, nose pointing along +Z
pub fn build_car_mesh() -> Mesh {
    let mut mesh = Mesh::empty();
    let body = hex_color("#d62828");
    let glass = hex_color("#1d3557");
    let tire = hex_color("#111111");
    let light = hex_color("#ffd166");

    mesh.push_box(BoxSpec { center: Vec3::new(0.0, 0.0, 0.0), size: Vec3::new(0.5, 0.15, 1.0), yaw: 0.0, color: body });
    mesh.push_box(BoxSpec { center: Vec3::new(0.0, 0.13, -0.08), size: Vec3::new(0.42, 0.12, 0.45), yaw: 0.0, color: glass });

    for (x, z) in [(-0.26, 0.32), (0.26, 0.32), (-0.26, -0.32), (0.26, -0.32)] {
        mesh.push_box(BoxSpec { center: Vec3::new(x, -0.07, z), size: Vec3::new(0.08, 0.16, 0.18), yaw: 0.0, color: tire });
    }
    for x in [-0.16, 0.16] {
        mesh.push_box(BoxSpec { center: Vec3::new(x, 0.02, 0.5), size: Vec3::new(0.1, 0.05, 0.02), yaw: 0.0, color: light });
    }
    mesh
}

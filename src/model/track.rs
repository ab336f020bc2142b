//! Static road layout drawn around the car: a zig-zag of straight segments
//! with lane paint, distance markers and glowing barriers.

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::utils::{hex_color, BoxSpec, Mesh};

pub const ROAD_WIDTH: f32 = 25.0;
pub const ROAD_LENGTH: f32 = 60.0;
pub const ROAD_HEIGHT: f32 = 0.15;
const MARKER_SPACING: f32 = 10.0;
const GROUND_SIZE: f32 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSegment {
    pub center: Vec3,
    pub yaw: f32,
}

impl RoadSegment {
    /// Offset expressed in the segment's own frame, returned in world space
    fn local(&self, offset: Vec3) -> Vec3 {
        self.center + Quat::from_rotation_y(self.yaw) * offset
    }
}

pub fn road_segments() -> Vec<RoadSegment> {
    let yaws = [0.0, FRAC_PI_2, 0.0, -FRAC_PI_2, 0.0, FRAC_PI_2, 0.0];
    yaws.iter()
        .enumerate()
        .map(|(i, yaw)| {
            let along = ROAD_LENGTH * 0.5 * i as f32;
            RoadSegment { center: Vec3::new(along, 0.0, along), yaw: *yaw }
        })
        .collect()
}

fn segment_mesh(mesh: &mut Mesh, seg: &RoadSegment) {
    let white = hex_color("#ffffff");

    mesh.push_box(BoxSpec {
        center: seg.center,
        size: Vec3::new(ROAD_WIDTH, ROAD_HEIGHT, ROAD_LENGTH),
        yaw: seg.yaw,
        color: hex_color("#1a1a1a"),
    });

    let paint_y = ROAD_HEIGHT * 0.5 + 0.01;
    mesh.push_box(BoxSpec {
        center: seg.local(Vec3::new(0.0, paint_y, 0.0)),
        size: Vec3::new(0.5, 0.02, ROAD_LENGTH),
        yaw: seg.yaw,
        color: white,
    });
    for x in [-ROAD_WIDTH / 4.0, ROAD_WIDTH / 4.0] {
        mesh.push_box(BoxSpec {
            center: seg.local(Vec3::new(x, paint_y, 0.0)),
            size: Vec3::new(0.3, 0.02, ROAD_LENGTH),
            yaw: seg.yaw,
            color: [0.85, 0.85, 0.85, 1.0],
        });
    }

    for x in [-ROAD_WIDTH / 2.0, ROAD_WIDTH / 2.0] {
        mesh.push_box(BoxSpec {
            center: seg.local(Vec3::new(x, 1.0, 0.0)),
            size: Vec3::new(0.5, 2.0, ROAD_LENGTH),
            yaw: seg.yaw,
            color: hex_color("#ff3333"),
        });
    }

    let markers = (ROAD_LENGTH / MARKER_SPACING).floor() as usize;
    for i in 0..markers {
        let z = -ROAD_LENGTH / 2.0 + i as f32 * MARKER_SPACING;
        mesh.push_box(BoxSpec {
            center: seg.local(Vec3::new(0.0, paint_y + 0.01, z)),
            size: Vec3::new(ROAD_WIDTH - 2.0, 0.02, 0.5),
            yaw: seg.yaw,
            color: [0.7, 0.7, 0.7, 1.0],
        });
    }
}

/// Ground plane plus every road segment, baked in world space
pub fn build_track_mesh() -> Mesh {
    let mut mesh = Mesh::empty();
    mesh.push_quad(Vec3::new(0.0, -0.1, 0.0), GROUND_SIZE, GROUND_SIZE, hex_color("#203020"));
    for seg in road_segments() {
        segment_mesh(&mut mesh, &seg);
    }
    tracing::debug!(vertices = mesh.vertices.len(), "built track mesh");
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_step_diagonally() {
        let segs = road_segments();
        assert_eq!(segs.len(), 7);
        assert_eq!(segs[0].center, Vec3::ZERO);
        assert_eq!(segs[6].center, Vec3::new(180.0, 0.0, 180.0));
        assert_eq!(segs[3].yaw, -FRAC_PI_2);
    }

    #[test]
    fn barriers_follow_segment_rotation() {
        let seg = RoadSegment { center: Vec3::ZERO, yaw: FRAC_PI_2 };
        let p = seg.local(Vec3::new(ROAD_WIDTH / 2.0, 1.0, 0.0));
        assert!(p.x.abs() < 1e-4);
        assert!((p.z.abs() - ROAD_WIDTH / 2.0).abs() < 1e-4);
    }

    #[test]
    fn track_mesh_is_populated() {
        let mesh = build_track_mesh();
        // ground + 7 * (road + centre + 2 lanes + 2 barriers + 6 markers)
        assert_eq!(mesh.vertices.len(), 4 + 7 * 12 * 24);
        assert_eq!(mesh.indices.len(), 6 + 7 * 12 * 36);
    }
}

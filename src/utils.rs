use glam::{Quat, Vec3};
use wgpu::util::DeviceExt;
use bytemuck::{NoUninit};

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// (normal, u, v) with u x v == normal, so quads wind counter-clockwise from outside
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Axis-aligned box before yaw is applied
#[derive(Debug, Clone, Copy)]
pub struct BoxSpec {
    pub center: Vec3,
    pub size: Vec3,
    pub yaw: f32,
    pub color: [f32; 4],
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn push_box(&mut self, spec: BoxSpec) {
        let half = spec.size * 0.5;
        let rot = Quat::from_rotation_y(spec.yaw);
        for (n, u, v) in BOX_FACES {
            let base = self.vertices.len() as u32;
            let face_center = n * half;
            let du = u * half;
            let dv = v * half;
            let normal = (rot * n).to_array();
            for corner in [-du - dv, du - dv, du + dv, -du + dv] {
                let p = spec.center + rot * (face_center + corner);
                self.vertices.push(Vertex { pos: p.to_array(), normal, color: spec.color });
            }
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    /// Flat upward-facing quad centred on `center`
    pub fn push_quad(&mut self, center: Vec3, size_x: f32, size_z: f32, color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        let hx = size_x * 0.5;
        let hz = size_z * 0.5;
        let normal = Vec3::Y.to_array();
        for (dx, dz) in [(-hx, hz), (hx, hz), (hx, -hz), (-hx, -hz)] {
            let p = center + Vec3::new(dx, 0.0, dz);
            self.vertices.push(Vertex { pos: p.to_array(), normal, color });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {

        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Parses `#rrggbb` into linear-ish RGBA floats; anything else falls back to magenta
pub fn hex_color(hex: &str) -> [f32; 4] {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .map(|b| b as f32 / 255.0)
    };
    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => [r, g, b, 1.0],
        _ => [1.0, 0.0, 1.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_faces_wind_outwards() {
        let mut mesh = Mesh::empty();
        mesh.push_box(BoxSpec { center: Vec3::ZERO, size: Vec3::new(2.0, 1.0, 4.0), yaw: 0.3, color: [1.0; 4] });
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].pos));
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            let face = (b - a).cross(c - a);
            assert!(face.dot(n) > 0.0);
            // outward: centroid lies on the normal's side of the origin
            assert!(((a + b + c) / 3.0).dot(n) > 0.0);
        }
    }

    #[test]
    fn quad_faces_up() {
        let mut mesh = Mesh::empty();
        mesh.push_quad(Vec3::ZERO, 10.0, 10.0, [1.0; 4]);
        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(mesh.vertices[i].pos));
        assert!((b - a).cross(c - a).y > 0.0);
    }

    #[test]
    fn append_offsets_indices() {
        let mut a = Mesh::empty();
        a.push_quad(Vec3::ZERO, 1.0, 1.0, [1.0; 4]);
        let b = a.clone();
        a.append(&b);
        assert_eq!(a.vertices.len(), 8);
        assert_eq!(a.indices[6], 4);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(hex_color("#ff0000"), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_color("#1a1a1a")[0], 26.0 / 255.0);
        assert_eq!(hex_color("nope"), [1.0, 0.0, 1.0, 1.0]);
    }
}

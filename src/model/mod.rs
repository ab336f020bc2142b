// MODEL: Scene nodes and static content
pub mod camera;
pub mod transform;
pub mod track;
pub mod car;

pub use camera::{Camera, CameraHandle};
pub use transform::{NodeHandle, Transform};
pub use track::build_track_mesh;
pub use car::build_car_mesh;

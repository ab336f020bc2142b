// CONTROLLER: Input, driving simulation, and update loop
pub mod input;
pub mod physics;
pub mod camera_controller;
pub mod simulator;
pub mod binding;
pub mod frame_loop;

pub use input::{Control, InputEvent, InputState, InputProcessor, InputQueue, KeyBindings, SharedInputQueue};
pub use physics::{DriveMode, VehicleSimulator, VehicleState, VehicleTransform};
pub use camera_controller::{CameraPose, ChaseCamera};
pub use simulator::{DriveSimulator, FrameOutput, FrameTime, Telemetry};
pub use binding::{AppliedWrites, SceneBinding};
pub use frame_loop::{DriveLoop, FrameClock};

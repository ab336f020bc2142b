use crate::config::DriveConfig;
use crate::controller::binding::{AppliedWrites, SceneBinding};
use crate::controller::input::{InputEvent, InputProcessor, InputQueue, InputState, SharedInputQueue};
use crate::controller::simulator::{DriveSimulator, FrameOutput, FrameTime};
use crate::model::{CameraHandle, NodeHandle};

/// Longest frame the simulation will accept, in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Turns host timestamps (milliseconds) into clamped frame timing
#[derive(Debug, Clone)]
pub struct FrameClock {
    start_ms: f64,
    last_ms: f64,
}

impl FrameClock {
    pub fn new(now_ms: f64) -> Self {
        Self { start_ms: now_ms, last_ms: now_ms }
    }

    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        let delta = ((now_ms - self.last_ms) / 1000.0).clamp(0.0, MAX_FRAME_DELTA as f64) as f32;
        self.last_ms = now_ms.max(self.last_ms);
        let elapsed = ((self.last_ms - self.start_ms) / 1000.0) as f32;
        FrameTime { delta, elapsed }
    }
}

/// Main game loop state: input aggregation, simulation and node writes
pub struct DriveLoop {
    queue: SharedInputQueue,
    processor: InputProcessor,
    input: InputState,
    simulator: DriveSimulator,
    binding: SceneBinding,
    last_output: Option<FrameOutput>,
    frames: u64,
    detached: bool,
}

impl DriveLoop {
    pub fn new(config: &DriveConfig) -> Self {
        Self::with_processor(config, InputProcessor::default())
    }

    pub fn with_processor(config: &DriveConfig, processor: InputProcessor) -> Self {
        Self {
            queue: InputQueue::shared(),
            processor,
            input: InputState::new(),
            simulator: DriveSimulator::new(config),
            binding: SceneBinding::new(),
            last_output: None,
            frames: 0,
            detached: false,
        }
    }

    /// Queue handle for event callbacks
    pub fn input_queue(&self) -> SharedInputQueue {
        self.queue.clone()
    }

    pub fn processor(&self) -> &InputProcessor {
        &self.processor
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn simulator(&self) -> &DriveSimulator {
        &self.simulator
    }

    pub fn last_output(&self) -> Option<&FrameOutput> {
        self.last_output.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn attach_vehicle(&mut self, node: NodeHandle) {
        tracing::info!("vehicle node attached");
        self.binding.attach_vehicle(node);
    }

    pub fn attach_camera(&mut self, camera: CameraHandle) {
        tracing::info!("camera node attached");
        self.binding.attach_camera(camera);
    }

    /// Runs one frame; `None` while no vehicle node is attached or after `detach`
    pub fn tick(&mut self, time: FrameTime) -> Option<&FrameOutput> {
        if self.detached {
            self.queue.borrow_mut().clear();
            return None;
        }
        self.queue
            .borrow_mut()
            .drain_into(&mut self.processor, &mut self.input);

        if !self.binding.has_vehicle() {
            tracing::trace!("no vehicle node yet, skipping frame");
            return None;
        }

        if self.frames == 0 && !self.binding.has_camera() {
            tracing::warn!("no camera node attached, camera follow disabled");
        }

        let output = self.simulator.update(&self.input, time);
        let writes: AppliedWrites = self.binding.apply(&output);
        tracing::trace!(vehicle = writes.vehicle, camera = writes.camera, "nodes written");
        if let Some(prev) = &self.last_output {
            log_mode_changes(prev, &output);
        }
        self.frames += 1;
        self.last_output = Some(output);
        self.last_output.as_ref()
    }

    /// Input source went away: release every control and the scene nodes.
    /// Later ticks are no-ops and later events are discarded.
    pub fn detach(&mut self) {
        tracing::info!(frames = self.frames, "drive loop detached");
        self.detached = true;
        self.queue.borrow_mut().clear();
        self.processor.process_event(&InputEvent::Detached, &mut self.input);
        self.binding.detach_vehicle();
        self.binding.detach_camera();
    }
}

fn log_mode_changes(prev: &FrameOutput, next: &FrameOutput) {
    let (was, now) = (&prev.telemetry.mode, &next.telemetry.mode);
    if was.boosting != now.boosting {
        tracing::debug!(boosting = now.boosting, velocity = next.telemetry.velocity, "nitro toggled");
    }
    if was.drifting != now.drifting {
        tracing::debug!(drifting = now.drifting, velocity = next.telemetry.velocity, "drift toggled");
    }
}

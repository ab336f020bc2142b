/// Platform-agnostic input handling system
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// Logical driving controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Reverse,
    TurnLeft,
    TurnRight,
    Drift,
    Boost,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Forward,
        Control::Reverse,
        Control::TurnLeft,
        Control::TurnRight,
        Control::Drift,
        Control::Boost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Control::Forward => "Forward",
            Control::Reverse => "Reverse",
            Control::TurnLeft => "Left",
            Control::TurnRight => "Right",
            Control::Drift => "Drift",
            Control::Boost => "Nitro",
        }
    }
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    FocusLost,
    VisibilityChanged { visible: bool },
    /// The input source went away; nothing may stay held afterwards
    Detached,
}

/// Which controls are currently held
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashMap<Control, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_held(&mut self, control: Control, held: bool) {
        self.held.insert(control, held);
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.get(&control).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn held_controls(&self) -> impl Iterator<Item = Control> + '_ {
        Control::ALL.into_iter().filter(|c| self.is_held(*c))
    }

    pub fn any_held(&self) -> bool {
        self.held.values().any(|h| *h)
    }
}

/// Key mapping configuration, keyed by browser `KeyboardEvent.key` names
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub reverse: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub drift: Vec<String>,
    pub boost: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|k| k.to_string()).collect()
        }
        Self {
            forward: keys(&["ArrowUp", "w"]),
            reverse: keys(&["ArrowDown", "s"]),
            left: keys(&["ArrowLeft", "a"]),
            right: keys(&["ArrowRight", "d"]),
            drift: keys(&[" "]),
            boost: keys(&["Shift"]),
        }
    }
}

/// Single letters compare case-insensitively so Shift+W still drives forward
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => c.to_lowercase().collect(),
        _ => key.to_string(),
    }
}

impl KeyBindings {
    pub fn keys_for(&self, control: Control) -> &[String] {
        match control {
            Control::Forward => &self.forward,
            Control::Reverse => &self.reverse,
            Control::TurnLeft => &self.left,
            Control::TurnRight => &self.right,
            Control::Drift => &self.drift,
            Control::Boost => &self.boost,
        }
    }

    pub fn control_for(&self, key: &str) -> Option<Control> {
        let key = normalize_key(key);
        Control::ALL
            .into_iter()
            .find(|c| self.keys_for(*c).iter().any(|k| normalize_key(k) == key))
    }
}

/// Turns raw key events into held controls
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
    pressed_keys: HashSet<String>,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings, pressed_keys: HashSet::new() }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Whether the host should suppress the browser's default handling of `key`
    pub fn consumes(&self, key: &str) -> bool {
        self.bindings.control_for(key).is_some()
    }

    pub fn process_event(&mut self, event: &InputEvent, state: &mut InputState) {
        match event {
            InputEvent::KeyDown(key) => {
                let Some(control) = self.bindings.control_for(key) else {
                    tracing::trace!(key = %key, "ignoring unbound key");
                    return;
                };
                self.pressed_keys.insert(normalize_key(key));
                state.set_held(control, true);
            }
            InputEvent::KeyUp(key) => {
                let Some(control) = self.bindings.control_for(key) else {
                    return;
                };
                self.pressed_keys.remove(&normalize_key(key));
                let still_held = self
                    .bindings
                    .keys_for(control)
                    .iter()
                    .any(|k| self.pressed_keys.contains(&normalize_key(k)));
                state.set_held(control, still_held);
            }
            InputEvent::FocusLost | InputEvent::Detached => {
                self.release_all(state);
            }
            InputEvent::VisibilityChanged { visible } => {
                if !visible {
                    self.release_all(state);
                }
            }
        }
    }

    fn release_all(&mut self, state: &mut InputState) {
        if state.any_held() {
            tracing::debug!("releasing all held controls");
        }
        self.pressed_keys.clear();
        state.clear();
    }
}

/// FIFO written by event callbacks and drained once per frame
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

pub type SharedInputQueue = Rc<RefCell<InputQueue>>;

impl InputQueue {
    pub fn shared() -> SharedInputQueue {
        Rc::new(RefCell::new(Self::default()))
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Applies every queued event in arrival order, returning how many were applied
    pub fn drain_into(&mut self, processor: &mut InputProcessor, state: &mut InputState) -> usize {
        let count = self.events.len();
        for event in self.events.drain(..) {
            processor.process_event(&event, state);
        }
        count
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent};
    use winit::keyboard::{Key, NamedKey};

    /// Maps a winit logical key onto the browser key name used by `KeyBindings`
    pub fn key_name(key: &Key) -> Option<String> {
        match key {
            Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
            Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
            Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
            Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
            Key::Named(NamedKey::Space) => Some(" ".to_string()),
            Key::Named(NamedKey::Shift) => Some("Shift".to_string()),
            Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
            Key::Character(s) => Some(s.to_string()),
            _ => None,
        }
    }

    pub fn key_event_to_input(event: &KeyEvent) -> Option<InputEvent> {
        let key = key_name(&event.logical_key)?;
        Some(match event.state {
            ElementState::Pressed => InputEvent::KeyDown(key),
            ElementState::Released => InputEvent::KeyUp(key),
        })
    }
}

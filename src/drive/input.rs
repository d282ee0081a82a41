//! Input aggregation: discrete key/touch events in, smoothed steering and
//! one-shot journey requests out.
//!
//! Host callbacks never touch drive state directly. They push `InputEvent`s
//! into an `InputQueue`, which the aggregator drains once at the top of each
//! frame.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::mode::Mode;
use super::smoothing::damp;

/// Logical drive controls, independent of the physical key that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriveKey {
    Left,
    Right,
    Accelerate,
}

/// On-screen steering zones for touch devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchZone {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(DriveKey),
    KeyUp(DriveKey),
    TouchStart(TouchZone),
    TouchEnd(TouchZone),
    /// Generic tap/click meaning "start or resume".
    Activate,
}

/// Events raised by the host since the last frame.
#[derive(Resource, Default, Debug)]
pub struct InputQueue {
    events: SmallVec<[InputEvent; 8]>,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drops anything queued before the drive could consume it.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Transition request raised by a rising ignition edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JourneyRequest {
    Begin,
    Resume,
}

#[derive(Resource, Clone, Copy, Debug)]
pub struct InputConfig {
    /// Rate at which the steering value follows its target (1/s).
    pub steering_rate: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { steering_rate: 5.5 }
    }
}

/// Turns raw events into a continuous steering value.
///
/// Steering target is bipolar: left is `+1`, right is `-1`, and releasing
/// either resets it to 0. With both held, whichever is released last decides.
#[derive(Clone, Debug, Default)]
pub struct InputAggregator {
    config: InputConfig,
    held: SmallVec<[DriveKey; 4]>,
    steering_target: f32,
    steering: f32,
    accelerating: bool,
}

impl InputAggregator {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    /// Current smoothed steering in `[-1, 1]`.
    pub fn steering(&self) -> f32 {
        self.steering
    }

    pub fn steering_target(&self) -> f32 {
        self.steering_target
    }

    /// Whether the accelerate control is currently held.
    pub fn accelerating(&self) -> bool {
        self.accelerating
    }

    /// Drains the queue and smooths steering for this frame.
    ///
    /// Returns the journey request implied by this frame's ignition edges
    /// under `mode`, if any.
    pub fn update(&mut self, queue: &mut InputQueue, mode: Mode, dt: f32) -> Option<JourneyRequest> {
        let mut ignition = false;
        for event in queue.events.drain(..) {
            ignition |= self.apply(event);
        }

        self.steering = damp(self.steering, self.steering_target, self.config.steering_rate, dt)
            .clamp(-1.0, 1.0);

        if !ignition {
            return None;
        }
        match mode {
            Mode::Start => Some(JourneyRequest::Begin),
            Mode::Stopped => Some(JourneyRequest::Resume),
            Mode::Driving => None,
        }
    }

    /// Applies one event, returning true on an ignition edge.
    fn apply(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat: a key that is already down is not a new press.
                if self.held.contains(&key) {
                    return false;
                }
                self.held.push(key);
                match key {
                    DriveKey::Left => self.steering_target = 1.0,
                    DriveKey::Right => self.steering_target = -1.0,
                    DriveKey::Accelerate => {
                        self.accelerating = true;
                        return true;
                    }
                }
                false
            }
            InputEvent::KeyUp(key) => {
                self.held.retain(|held| *held != key);
                match key {
                    DriveKey::Left | DriveKey::Right => self.steering_target = 0.0,
                    DriveKey::Accelerate => self.accelerating = false,
                }
                false
            }
            InputEvent::TouchStart(TouchZone::Left) => {
                self.steering_target = 1.0;
                false
            }
            InputEvent::TouchStart(TouchZone::Right) => {
                self.steering_target = -1.0;
                false
            }
            InputEvent::TouchEnd(_) => {
                self.steering_target = 0.0;
                false
            }
            InputEvent::Activate => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(aggregator: &mut InputAggregator, events: &[InputEvent], mode: Mode) -> Option<JourneyRequest> {
        let mut queue = InputQueue::default();
        for event in events {
            queue.push(*event);
        }
        let request = aggregator.update(&mut queue, mode, 0.0);
        assert!(queue.is_empty());
        request
    }

    #[test]
    fn auto_repeat_does_not_retrigger() {
        let mut input = InputAggregator::new(InputConfig::default());
        let down = InputEvent::KeyDown(DriveKey::Accelerate);

        assert_eq!(feed(&mut input, &[down], Mode::Start), Some(JourneyRequest::Begin));
        assert_eq!(feed(&mut input, &[down, down], Mode::Stopped), None);

        let up = InputEvent::KeyUp(DriveKey::Accelerate);
        assert_eq!(feed(&mut input, &[up, down], Mode::Stopped), Some(JourneyRequest::Resume));
    }

    #[test]
    fn ignition_while_driving_is_ignored() {
        let mut input = InputAggregator::new(InputConfig::default());
        assert_eq!(feed(&mut input, &[InputEvent::Activate], Mode::Driving), None);
        assert_eq!(feed(&mut input, &[InputEvent::Activate], Mode::Stopped), Some(JourneyRequest::Resume));
    }

    #[test]
    fn cleared_queue_raises_no_request() {
        let mut input = InputAggregator::new(InputConfig::default());
        let mut queue = InputQueue::default();
        queue.push(InputEvent::KeyDown(DriveKey::Accelerate));
        queue.push(InputEvent::Activate);
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(input.update(&mut queue, Mode::Start, 0.016), None);
    }

    #[test]
    fn steering_target_is_bipolar_and_last_release_wins() {
        let mut input = InputAggregator::new(InputConfig::default());
        feed(&mut input, &[InputEvent::KeyDown(DriveKey::Left)], Mode::Driving);
        assert_eq!(input.steering_target(), 1.0);

        feed(&mut input, &[InputEvent::KeyDown(DriveKey::Right)], Mode::Driving);
        assert_eq!(input.steering_target(), -1.0);

        // Releasing either key zeroes the target even though the other is held.
        feed(&mut input, &[InputEvent::KeyUp(DriveKey::Left)], Mode::Driving);
        assert_eq!(input.steering_target(), 0.0);
    }

    #[test]
    fn touch_zones_steer() {
        let mut input = InputAggregator::new(InputConfig::default());
        feed(&mut input, &[InputEvent::TouchStart(TouchZone::Right)], Mode::Driving);
        assert_eq!(input.steering_target(), -1.0);
        feed(&mut input, &[InputEvent::TouchEnd(TouchZone::Right)], Mode::Driving);
        assert_eq!(input.steering_target(), 0.0);
    }

    #[test]
    fn steering_value_eases_toward_target() {
        let mut input = InputAggregator::new(InputConfig::default());
        let mut queue = InputQueue::default();
        queue.push(InputEvent::KeyDown(DriveKey::Left));

        input.update(&mut queue, Mode::Driving, 1.0 / 60.0);
        let first = input.steering();
        assert!(first > 0.0 && first < 0.2);

        for _ in 0..600 {
            input.update(&mut queue, Mode::Driving, 1.0 / 60.0);
        }
        assert!(input.steering() > 0.999 && input.steering() <= 1.0);
    }
}

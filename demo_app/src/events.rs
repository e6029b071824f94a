//! Scripted tap input for the headless host

use scene_kit::foundation::time::TimeSample;
use scene_kit::{AppEvent, EventSource};

/// Emits a tap every `interval` seconds of clock time
#[derive(Debug, Clone)]
pub struct TapScript {
    interval: f64,
    next_tap: f64,
    position: (f32, f32),
}

impl TapScript {
    /// Tap at the drawable center every `interval` seconds
    pub fn new(interval: f64, drawable_size: (u32, u32)) -> Self {
        Self {
            interval,
            next_tap: interval,
            position: (drawable_size.0 as f32 / 2.0, drawable_size.1 as f32 / 2.0),
        }
    }
}

impl EventSource for TapScript {
    fn poll_events(&mut self, time: &TimeSample) -> Vec<AppEvent> {
        let mut events = Vec::new();
        // One tap per elapsed interval, even if a long frame skipped several
        while time.total_time >= self.next_tap {
            events.push(AppEvent::Tap {
                x: self.position.0,
                y: self.position.1,
            });
            self.next_tap += self.interval;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(total_time: f64) -> TimeSample {
        TimeSample {
            update_time: 0.0,
            total_time,
            frame_index: 0,
        }
    }

    #[test]
    fn test_taps_follow_interval() {
        let mut script = TapScript::new(2.0, (100, 50));
        assert!(script.poll_events(&at(1.9)).is_empty());
        assert_eq!(script.poll_events(&at(2.0)), vec![AppEvent::Tap { x: 50.0, y: 25.0 }]);
        assert!(script.poll_events(&at(3.0)).is_empty());
        assert_eq!(script.poll_events(&at(8.5)).len(), 3);
    }
}

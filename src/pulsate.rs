use std::time::{Duration, Instant};

use crate::state::PlayerId;

pub const BASE_BORDER_WIDTH: f64 = 1.2;
pub const BORDER_WIDTH_SWING: f64 = 6.0;
pub const BASE_POINT_RADIUS: f64 = 3.0;
pub const POINT_RADIUS_SWING: f64 = 2.0;
pub const PULSE_TIME_CONSTANT_MS: f64 = 600.0;
pub const DIM_FILL_ALPHA: f64 = 0.12;
pub const DIM_BORDER_ALPHA: f64 = 0.28;

pub type FrameHandle = u64;

/// Single-slot animation-frame queue driven by the event loop.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    next: FrameHandle,
    pending: Option<FrameHandle>,
}

impl FrameScheduler {
    pub fn request(&mut self) -> FrameHandle {
        self.next = self.next.wrapping_add(1);
        self.pending = Some(self.next);
        self.next
    }

    pub fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hands the pending frame to the caller. The frame has to reschedule itself to keep running.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PulsateState {
    pub active_id: Option<PlayerId>,
    pub frame: Option<FrameHandle>,
    pub started_at: Option<Instant>,
}

impl PulsateState {
    pub fn is_active(&self) -> bool {
        self.active_id.is_some()
    }

    pub fn is_active_for(&self, id: &str) -> bool {
        self.active_id.as_deref() == Some(id)
    }
}

/// Border width and point radius of the highlighted dataset after `elapsed`.
pub fn pulse_at(elapsed: Duration) -> (f64, f64) {
    let t = elapsed.as_secs_f64() * 1000.0 / PULSE_TIME_CONSTANT_MS;
    let swing = t.sin().abs();
    (
        BASE_BORDER_WIDTH + swing * BORDER_WIDTH_SWING,
        BASE_POINT_RADIUS + swing * POINT_RADIUS_SWING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_stays_within_bounds() {
        for ms in (0..5_000).step_by(37) {
            let (width, radius) = pulse_at(Duration::from_millis(ms));
            assert!((1.2..=7.2 + 1e-9).contains(&width), "width {width} at {ms}ms");
            assert!((3.0..=5.0 + 1e-9).contains(&radius), "radius {radius} at {ms}ms");
        }
    }

    #[test]
    fn pulse_starts_at_rest() {
        let (width, radius) = pulse_at(Duration::ZERO);
        assert_eq!(width, BASE_BORDER_WIDTH);
        assert_eq!(radius, BASE_POINT_RADIUS);
    }

    #[test]
    fn cancelled_frame_is_not_handed_out() {
        let mut frames = FrameScheduler::default();
        let handle = frames.request();
        frames.cancel(handle);
        assert!(frames.take_due().is_none());
    }

    #[test]
    fn stale_cancel_keeps_newer_frame() {
        let mut frames = FrameScheduler::default();
        let old = frames.request();
        let _ = frames.take_due();
        let new = frames.request();
        frames.cancel(old);
        assert_eq!(frames.take_due(), Some(new));
    }
}

/// Skips redraws when nothing visible changed.
///
/// A frame is drawn when its fingerprint differs from the last drawn one, or
/// when `min_interval_ms` has passed since the last draw (so a terminal that
/// lost its contents recovers on its own).
#[derive(Debug, Clone)]
pub struct FrameGate {
    min_interval_ms: u64,
    last_render_ms: u64,
    last_fingerprint: u64,
    has_rendered: bool,
}

impl FrameGate {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_render_ms: 0,
            last_fingerprint: 0,
            has_rendered: false,
        }
    }

    /// Force the next call to render (e.g. after a resize).
    pub fn invalidate(&mut self) {
        self.has_rendered = false;
    }

    pub fn should_render(&mut self, now_ms: u64, fingerprint: u64) -> bool {
        if !self.has_rendered || fingerprint != self.last_fingerprint {
            self.has_rendered = true;
            self.last_render_ms = now_ms;
            self.last_fingerprint = fingerprint;
            return true;
        }

        if now_ms.saturating_sub(self.last_render_ms) >= self.min_interval_ms {
            self.last_render_ms = now_ms;
            return true;
        }

        false
    }
}

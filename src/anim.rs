pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Progress of an animation measured against a caller-supplied clock in
/// seconds.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f64,
    pub duration: f64,
    pub current_time: f64,
}

impl Timeline {
    pub fn new(duration: f64) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f64) {
        self.current_time = now;
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).min(1.0).max(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f64 {
        ease_out_cubic(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut tl = Timeline::new(2.0);
        tl.start(10.0);
        assert_eq!(tl.progress(), 0.0);
        tl.update(11.0);
        assert_eq!(tl.progress(), 0.5);
        tl.update(20.0);
        assert!(tl.is_complete());
        assert_eq!(tl.eased_progress(), 1.0);
    }

    #[test]
    fn zero_duration_is_immediately_complete() {
        let tl = Timeline::new(0.0);
        assert!(tl.is_complete());
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(90.0, 450.0, 0.0), 90.0);
        assert_eq!(lerp(90.0, 450.0, 1.0), 450.0);
    }
}

#[derive(Clone, Debug)]
pub struct Throttle {
    limit_ms: f64,
    window_started_at: Option<f64>,
}

impl Throttle {
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms: limit_ms as f64,
            window_started_at: None,
        }
    }

    pub fn admit(&mut self, now_ms: f64) -> bool {
        if let Some(started) = self.window_started_at {
            if now_ms - started < self.limit_ms {
                return false;
            }
        }

        self.window_started_at = Some(now_ms);
        true
    }
}

// `setTimeout` may go off marginally before the deadline as read from a
// coarsened `performance.now()`.
const SETTLE_SLACK_MS: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct Debounce {
    wait_ms: f64,
    deadline: Option<f64>,
}

impl Debounce {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms: wait_ms as f64,
            deadline: None,
        }
    }

    pub fn wait_ms(&self) -> u64 {
        self.wait_ms as u64
    }

    pub fn call(&mut self, now_ms: f64) -> u64 {
        self.deadline = Some(now_ms + self.wait_ms);
        self.wait_ms()
    }

    pub fn settle(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms + SETTLE_SLACK_MS >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

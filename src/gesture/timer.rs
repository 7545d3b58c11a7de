/// Interval timer evaluated by polling from the cadence tick.
///
/// Stands in for a separate host timer: it fires at most once per poll, and
/// cancelling it leaves nothing running.
#[derive(Debug, Clone)]
pub struct PollTimer {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl PollTimer {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            next_due_ms: None,
        }
    }

    /// Arms the timer; first fire is one period after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = Some(now_ms + self.period_ms);
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// True when a period has elapsed. Late polls fire once and re-arm
    /// relative to `now_ms` rather than bursting to catch up.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.next_due_ms {
            Some(due) if now_ms >= due => {
                self.next_due_ms = Some(now_ms + self.period_ms);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_every_period() {
        let mut timer = PollTimer::new(2000);
        timer.start(0);
        let fired: Vec<u64> = (0..=6000)
            .step_by(33)
            .filter(|&t| timer.poll(t))
            .collect();
        assert_eq!(fired.len(), 2);
        assert!(fired[0] >= 2000 && fired[0] < 2033);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = PollTimer::new(100);
        assert!(!timer.poll(1000));
        timer.start(0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.poll(10_000));
    }
}

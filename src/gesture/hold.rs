/// Requires a condition to stay true for `required_ms` before firing.
///
/// Any sample with the condition false resets progress to zero. Once fired
/// the gate stays latched until [`HoldGate::reset`].
#[derive(Debug, Clone)]
pub struct HoldGate {
    required_ms: u64,
    held_since: Option<u64>,
    fired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldProgress {
    Absent,
    Holding { elapsed_ms: u64, remaining_ms: u64 },
    /// Returned exactly once, on the sample that completes the hold.
    Complete,
    /// Already fired; waiting for a reset.
    Latched,
}

impl HoldGate {
    pub fn new(required_ms: u64) -> Self {
        Self {
            required_ms,
            held_since: None,
            fired: false,
        }
    }

    pub fn observe(&mut self, present: bool, now_ms: u64) -> HoldProgress {
        if self.fired {
            return HoldProgress::Latched;
        }
        if !present {
            self.held_since = None;
            return HoldProgress::Absent;
        }

        let since = *self.held_since.get_or_insert(now_ms);
        let elapsed_ms = now_ms.saturating_sub(since);
        if elapsed_ms >= self.required_ms {
            self.fired = true;
            self.held_since = None;
            HoldProgress::Complete
        } else {
            HoldProgress::Holding {
                elapsed_ms,
                remaining_ms: self.required_ms - elapsed_ms,
            }
        }
    }

    pub fn is_holding(&self) -> bool {
        self.held_since.is_some()
    }

    pub fn reset(&mut self) {
        self.held_since = None;
        self.fired = false;
    }
}

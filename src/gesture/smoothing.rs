/// Exponential approach: `value += (target - value) * factor` per tick.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    value: f32,
    factor: f32,
}

impl Smoother {
    pub fn new(initial: f32, factor: f32) -> Self {
        Self {
            value: initial,
            factor,
        }
    }

    pub fn step(&mut self, target: f32) -> f32 {
        self.value += (target - self.value) * self.factor;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Overrides the current value, e.g. after clamping to bounds.
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }
}

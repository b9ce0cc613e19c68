/// An exponential moving average over a fixed sample window, used for
/// smoothed RTT and jitter estimates. `alpha = 2 / (window + 1)`, the usual
/// EMA weighting; the first sample initializes the average directly.
pub struct ExpMovingAverage {
    value: f64,
    alpha: f64,
    initialized: bool,
}

impl ExpMovingAverage {
    pub fn new(window: u32) -> Self {
        Self {
            value: 0.0,
            alpha: 2.0 / (f64::from(window) + 1.0),
            initialized: false,
        }
    }

    pub fn add(&mut self, sample: f64) {
        if self.initialized {
            self.value += self.alpha * (sample - self.value);
        } else {
            self.value = sample;
            self.initialized = true;
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

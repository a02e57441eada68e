/// Sliding-window mean of signal magnitudes
///
/// Used by the host loop to watch the LMS error stream: a falling average
/// means the filter is still converging, a flat one means it has adapted,
/// and a growing one points at an unstable step size.
///
/// Keeps a running sum over a circular window so each update is O(1).
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buffer: Vec<f32>,
    index: usize,
    filled: bool,
    sum: f64,
}

impl MovingAverage {
    /// Create a moving average over `window_size` values
    ///
    /// `window_size` must be at least 1; configs validate this up front.
    pub fn new(window_size: usize) -> Self {
        debug_assert!(window_size > 0);
        Self {
            buffer: vec![0.0; window_size],
            index: 0,
            filled: false,
            sum: 0.0,
        }
    }

    /// Add a value and return the updated average
    pub fn add(&mut self, value: f32) -> f32 {
        self.sum += value as f64 - self.buffer[self.index] as f64;
        self.buffer[self.index] = value;
        self.index = (self.index + 1) % self.buffer.len();

        // inf - inf leaves the running sum NaN; rebuild it from the window
        if !self.sum.is_finite() {
            self.sum = self.buffer.iter().map(|&v| v as f64).sum();
        }

        if self.index == 0 {
            self.filled = true;
        }

        self.average()
    }

    /// Add `|value|` and return the updated average magnitude
    pub fn add_magnitude(&mut self, value: f32) -> f32 {
        self.add(value.abs())
    }

    /// Mean of the values currently in the window
    pub fn average(&self) -> f32 {
        let count = if self.filled {
            self.buffer.len()
        } else {
            self.index.max(1)
        };
        (self.sum / count as f64) as f32
    }

    /// True once a full window has been seen
    pub fn is_full(&self) -> bool {
        self.filled
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
        self.filled = false;
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut ma = MovingAverage::new(3);

        assert!((ma.add(1.0) - 1.0).abs() < 0.01);
        assert!((ma.add(2.0) - 1.5).abs() < 0.01);
        assert!((ma.add(3.0) - 2.0).abs() < 0.01);
        assert!((ma.add(4.0) - 3.0).abs() < 0.01); // (2+3+4)/3
        assert!((ma.add(5.0) - 4.0).abs() < 0.01); // (3+4+5)/3
        assert!(ma.is_full());
    }

    #[test]
    fn test_moving_average_magnitude() {
        let mut ma = MovingAverage::new(2);
        ma.add_magnitude(-1.0);
        assert!((ma.add_magnitude(3.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_average_reset() {
        let mut ma = MovingAverage::new(4);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            ma.add(v);
        }
        ma.reset();
        assert!(!ma.is_full());
        assert_eq!(ma.average(), 0.0);
        assert!((ma.add(8.0) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_moving_average_recovers_after_non_finite_values() {
        let mut ma = MovingAverage::new(2);
        ma.add(f32::INFINITY);
        assert_eq!(ma.add(1.0), f32::INFINITY);
        // The infinite value leaves the window
        assert!((ma.add(3.0) - 2.0).abs() < 1e-6);

        ma.add(f32::NAN);
        assert!(ma.average().is_nan());
        ma.add(4.0);
        assert!((ma.add(6.0) - 5.0).abs() < 1e-6);
    }
}

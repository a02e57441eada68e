/// Fixed-capacity ring buffer of past input samples
///
/// Shared by the FIR and LMS engines. The most recently pushed value is
/// `x[n]`; `get(k)` returns `x[n-k]`. Storage is allocated once and zeroed,
/// so a fresh delay line models a quiescent system.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    pos: usize,
}

impl DelayLine {
    /// Create a zeroed delay line holding `capacity` samples
    ///
    /// `capacity` must be at least 1; engines validate this before construction.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            buffer: vec![0.0; capacity],
            pos: 0,
        }
    }

    /// Shift a new sample in, overwriting the oldest one
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.pos] = sample;
        self.pos += 1;
        if self.pos == self.buffer.len() {
            self.pos = 0;
        }
    }

    /// Sample pushed `delay` calls ago (`0` is the newest)
    pub fn get(&self, delay: usize) -> f32 {
        debug_assert!(delay < self.buffer.len());
        let n = self.buffer.len();
        let newest = self.newest_index();
        self.buffer[(newest + n - delay) % n]
    }

    /// Iterate from newest to oldest: `x[n], x[n-1], ...`
    ///
    /// Walks two contiguous reverse ranges so the convolution loops stay
    /// free of modulo arithmetic.
    pub fn iter_recent(&self) -> impl Iterator<Item = &f32> + '_ {
        let newest = self.newest_index();
        self.buffer[..=newest]
            .iter()
            .rev()
            .chain(self.buffer[newest + 1..].iter().rev())
    }

    /// `Σ coeffs[k] · x[n-k]` over the first `coeffs.len()` delays
    pub fn dot(&self, coeffs: &[f32]) -> f32 {
        debug_assert!(coeffs.len() <= self.buffer.len());
        coeffs
            .iter()
            .zip(self.iter_recent())
            .fold(0.0f32, |acc, (c, x)| acc + c * x)
    }

    /// Zero every element and rewind the write cursor
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    fn newest_index(&self) -> usize {
        if self.pos == 0 {
            self.buffer.len() - 1
        } else {
            self.pos - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_delay_line_is_zeroed() {
        let line = DelayLine::new(5);
        assert_eq!(line.capacity(), 5);
        assert!(line.iter_recent().all(|&x| x == 0.0));
    }

    #[test]
    fn test_get_returns_delayed_samples() {
        let mut line = DelayLine::new(3);
        for x in [1.0, 2.0, 3.0, 4.0] {
            line.push(x);
        }
        assert_eq!(line.get(0), 4.0);
        assert_eq!(line.get(1), 3.0);
        assert_eq!(line.get(2), 2.0);
    }

    #[test]
    fn test_iter_recent_wraps_newest_first() {
        let mut line = DelayLine::new(4);
        for x in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            line.push(x);
        }
        let recent: Vec<f32> = line.iter_recent().copied().collect();
        assert_eq!(recent, vec![6.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn test_dot_uses_only_leading_delays() {
        let mut line = DelayLine::new(5);
        for x in [1.0, 2.0, 3.0] {
            line.push(x);
        }
        // 1*3 + 10*2 = 23, the third coefficient is never supplied
        assert_eq!(line.dot(&[1.0, 10.0]), 23.0);
    }

    #[test]
    fn test_clear_resets_history() {
        let mut line = DelayLine::new(2);
        line.push(7.0);
        line.clear();
        assert_eq!(line.get(0), 0.0);
        assert_eq!(line.get(1), 0.0);
    }
}

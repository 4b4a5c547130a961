use crate::train::moving_window::MovingWindow;

/// Counts consecutive query epochs whose loss fails to beat the trailing
/// window mean.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    threshold: usize,
    strikes: usize,
}

impl EarlyStopping {
    pub fn new(threshold: usize) -> EarlyStopping {
        EarlyStopping {
            threshold,
            strikes: 0,
        }
    }

    pub fn strikes(&self) -> usize {
        self.strikes
    }

    /// Compares `loss` against `window` (which must not yet contain it) and
    /// returns `true` once `threshold` consecutive comparisons stagnate.
    /// Windows holding fewer than two real values are not judged.
    pub fn observe(&mut self, loss: f64, window: &MovingWindow) -> bool {
        if window.len() < 2 {
            return false;
        }
        if loss >= window.mean() {
            self.strikes += 1;
            self.strikes >= self.threshold
        } else {
            self.strikes = 0;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_window(values: &[f64]) -> MovingWindow {
        let mut window = MovingWindow::new(values.len()).unwrap();
        for &v in values {
            window.push(v);
        }
        window
    }

    #[test]
    fn fires_exactly_at_threshold() {
        let window = full_window(&[1.0, 1.0]);
        let mut stopper = EarlyStopping::new(3);
        assert!(!stopper.observe(1.0, &window));
        assert!(!stopper.observe(1.5, &window));
        assert_eq!(stopper.strikes(), 2);
        assert!(stopper.observe(1.0, &window));
    }

    #[test]
    fn improvement_resets_the_count() {
        let window = full_window(&[2.0, 2.0]);
        let mut stopper = EarlyStopping::new(2);
        assert!(!stopper.observe(3.0, &window));
        assert!(!stopper.observe(1.0, &window));
        assert_eq!(stopper.strikes(), 0);
        assert!(!stopper.observe(3.0, &window));
        assert!(stopper.observe(3.0, &window));
    }

    #[test]
    fn young_windows_are_not_judged() {
        let mut window = MovingWindow::new(2).unwrap();
        let mut stopper = EarlyStopping::new(1);
        assert!(!stopper.observe(f64::MAX, &window));
        window.push(1.0);
        assert!(!stopper.observe(5.0, &window));
        assert_eq!(stopper.strikes(), 0);
        window.push(1.0);
        assert!(stopper.observe(5.0, &window));
    }
}

/// Rising-edge detector for one input line
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the line. True exactly once per low-to-high transition.
    pub fn poll(&mut self, level: bool) -> bool {
        let rising = level && !self.previous;
        self.previous = level;
        rising
    }

    /// Last sampled level
    pub fn level(&self) -> bool {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_edge_per_press() {
        let mut edge = EdgeDetector::new();
        let levels = [false, true, true, true, false, false, true];
        let fired: Vec<bool> = levels.iter().map(|&l| edge.poll(l)).collect();
        assert_eq!(fired, [false, true, false, false, false, false, true]);
    }

    #[test]
    fn test_starts_low() {
        let mut edge = EdgeDetector::new();
        assert!(!edge.level());
        assert!(edge.poll(true));
        assert!(edge.level());
    }
}

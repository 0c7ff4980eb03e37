/// Conventional EEG frequency bands used for the chart legend and fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EegBand {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}
impl EegBand {
    pub const ALL: [EegBand; 5] = [
        EegBand::Delta,
        EegBand::Theta,
        EegBand::Alpha,
        EegBand::Beta,
        EegBand::Gamma,
    ];
    /// Inclusive range in Hz.
    pub fn range_hz(self) -> (f64, f64) {
        match self {
            EegBand::Delta => (0.0, 4.0),
            EegBand::Theta => (4.0, 7.0),
            EegBand::Alpha => (8.0, 12.0),
            EegBand::Beta => (12.0, 30.0),
            EegBand::Gamma => (30.0, 100.0),
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            EegBand::Delta => "DELTA",
            EegBand::Theta => "THETA",
            EegBand::Alpha => "ALPHA",
            EegBand::Beta => "BETA",
            EegBand::Gamma => "GAMMA",
        }
    }
    /// Legend text, e.g. `DELTA (0hz-4hz)`.
    pub fn label(self) -> String {
        let (low, high) = self.range_hz();
        format!("{} ({}hz-{}hz)", self.name(), low, high)
    }
    pub fn rgb(self) -> [u8; 3] {
        match self {
            EegBand::Delta => [255, 255, 0],
            EegBand::Theta => [0, 0, 255],
            EegBand::Alpha => [0, 128, 0],
            EegBand::Beta => [255, 0, 0],
            EegBand::Gamma => [128, 0, 128],
        }
    }
    pub fn contains(self, x: f64) -> bool {
        let (low, high) = self.range_hz();
        x >= low && x <= high
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn labels_match_legend_text() {
        assert_eq!(EegBand::Delta.label(), "DELTA (0hz-4hz)");
        assert_eq!(EegBand::Theta.label(), "THETA (4hz-7hz)");
        assert_eq!(EegBand::Alpha.label(), "ALPHA (8hz-12hz)");
        assert_eq!(EegBand::Beta.label(), "BETA (12hz-30hz)");
        assert_eq!(EegBand::Gamma.label(), "GAMMA (30hz-100hz)");
    }
    #[test]
    fn ranges_are_inclusive_at_both_edges() {
        assert!(EegBand::Delta.contains(4.0));
        assert!(EegBand::Theta.contains(4.0));
        assert!(EegBand::Gamma.contains(100.0));
        assert!(!EegBand::Gamma.contains(100.5));
        // 7..8 Hz belongs to no band.
        assert!(EegBand::ALL.iter().all(|b| !b.contains(7.5)));
    }
}

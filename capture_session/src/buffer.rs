//! Append-only landmark buffer for one recording.

use hand_pose::LandmarkSample;

/// Insertion-ordered samples.  No dedup, no bound other than how long the
/// user keeps recording.
#[derive(Clone, Debug, Default)]
pub struct LandmarkBuffer {
    samples: Vec<LandmarkSample>,
}

impl LandmarkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, sample: LandmarkSample) {
        self.samples.push(sample);
    }

    /// Owned copy of the samples in capture order.
    pub fn snapshot(&self) -> Vec<LandmarkSample> {
        self.samples.clone()
    }

    /// Empty the buffer, keeping its allocation for the next recording.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: f64) -> LandmarkSample {
        LandmarkSample([v; 6])
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut b = LandmarkBuffer::new();
        for v in [3.0, 1.0, 2.0] { b.append(s(v)); }
        assert_eq!(b.snapshot(), vec![s(3.0), s(1.0), s(2.0)]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut b = LandmarkBuffer::new();
        b.append(s(1.0));
        b.append(s(1.0));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut b = LandmarkBuffer::new();
        b.append(s(1.0));
        let snap = b.snapshot();
        b.append(s(2.0));
        b.clear();
        assert_eq!(snap, vec![s(1.0)]);
        assert!(b.is_empty());
    }
}

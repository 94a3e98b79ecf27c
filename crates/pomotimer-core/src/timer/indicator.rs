use serde::{Deserialize, Serialize};

/// Progress marker for one work-cycle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Indicator {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

/// Ordered per-cycle markers. Its length tracks `cycles_before_long_break`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSequence(Vec<Indicator>);

impl IndicatorSequence {
    /// `len` slots, all `NotStarted`.
    pub fn fresh(len: usize) -> Self {
        Self(vec![Indicator::NotStarted; len])
    }

    /// Copy of this sequence with `len` slots. The common prefix is kept,
    /// new slots are `NotStarted`.
    pub fn resized(&self, len: usize) -> Self {
        let mut slots = self.0.clone();
        slots.resize(len, Indicator::NotStarted);
        Self(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Indicator> {
        self.0.get(index).copied()
    }

    /// Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: Indicator) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value;
        }
    }

    pub fn all_not_started(&self) -> bool {
        self.0.iter().all(|i| *i == Indicator::NotStarted)
    }

    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|i| **i == Indicator::Completed).count()
    }

    pub fn in_progress_count(&self) -> usize {
        self.0.iter().filter(|i| **i == Indicator::InProgress).count()
    }

    pub fn as_slice(&self) -> &[Indicator] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.0.iter()
    }
}

impl From<Vec<Indicator>> for IndicatorSequence {
    fn from(slots: Vec<Indicator>) -> Self {
        Self(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Indicator::*;

    #[test]
    fn shrinking_keeps_prefix() {
        let seq = IndicatorSequence::from(vec![Completed, InProgress, NotStarted, NotStarted]);
        assert_eq!(seq.resized(2).as_slice(), &[Completed, InProgress]);
    }

    #[test]
    fn growing_pads_with_not_started() {
        let seq = IndicatorSequence::from(vec![Completed, InProgress]);
        assert_eq!(
            seq.resized(4).as_slice(),
            &[Completed, InProgress, NotStarted, NotStarted]
        );
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut seq = IndicatorSequence::fresh(2);
        seq.set(5, Completed);
        assert!(seq.all_not_started());
        seq.set(1, InProgress);
        assert_eq!(seq.get(1), Some(InProgress));
        assert_eq!(seq.in_progress_count(), 1);
    }

    #[test]
    fn serializes_as_plain_array() {
        let seq = IndicatorSequence::from(vec![Completed, InProgress, NotStarted]);
        assert_eq!(
            serde_json::to_string(&seq).unwrap(),
            r#"["completed","inProgress","notStarted"]"#
        );
    }
}

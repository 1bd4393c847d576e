/// Time series of infected counts, one sample per completed tick.
///
/// The series always starts with a single `0` seed sample, so sample `t` is the infected count
/// after tick `t`. Samples are only ever appended; the only other mutation is [`History::reset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    samples: Vec<usize>,
}

impl History {
    /// A history holding only the seed sample.
    #[must_use]
    pub fn seeded() -> Self {
        History { samples: vec![0] }
    }

    pub fn record(&mut self, infected: usize) {
        self.samples.push(infected);
    }

    /// Truncates back to the seed sample.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.samples.push(0);
    }

    #[must_use]
    pub fn samples(&self) -> &[usize] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: the seed sample is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> usize {
        self.samples.last().copied().unwrap_or_default()
    }

    /// The largest sample and the tick it was recorded at. Ties resolve to the earliest tick.
    #[must_use]
    pub fn peak(&self) -> (usize, usize) {
        self.samples
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |best, (tick, infected)| {
                if infected > best.1 {
                    (tick, infected)
                } else {
                    best
                }
            })
    }
}

impl Default for History {
    fn default() -> Self {
        History::seeded()
    }
}

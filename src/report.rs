//! Ranking of run results across lock implementations.

use std::time::Duration;

use crate::run::RunResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingStats {
    pub samples: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl TimingStats {
    /// `None` for an empty slice.
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        let min = durations.iter().min().copied()?;
        let max = durations.iter().max().copied()?;
        let total: Duration = durations.iter().sum();
        let count = u32::try_from(durations.len()).ok()?;
        Some(Self {
            samples: durations.len(),
            mean: total / count,
            min,
            max,
        })
    }
}

/// All runs of one lock, summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    /// 1-based position among passing locks. `None` for a flagged lock.
    pub rank: Option<usize>,
    pub lock_name: String,
    pub stats: TimingStats,
    /// `true` only if every run of this lock passed.
    pub verification_passed: bool,
    /// The lock's runs in submission order.
    pub runs: Vec<RunResult>,
}

impl RankedEntry {
    pub fn flagged(&self) -> bool {
        !self.verification_passed
    }
}

/// Passing locks by ascending mean time, followed by every flagged lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comparison {
    entries: Vec<RankedEntry>,
}

impl Comparison {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RankedEntry> {
        self.entries
    }

    /// The fastest lock that never lost an update. A fast but incorrect lock is
    /// never the winner.
    pub fn fastest(&self) -> Option<&RankedEntry> {
        self.entries.first().filter(|entry| entry.verification_passed)
    }

    pub fn flagged(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter().filter(|entry| entry.flagged())
    }
}

/// Groups `results` by lock name (in order of first appearance) and ranks them.
pub fn compare(results: &[RunResult]) -> Comparison {
    let mut groups: Vec<(&str, Vec<&RunResult>)> = Vec::new();
    for result in results {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == result.lock_name)
        {
            Some((_, runs)) => runs.push(result),
            None => groups.push((result.lock_name.as_str(), vec![result])),
        }
    }

    let mut entries: Vec<RankedEntry> = groups
        .into_iter()
        .filter_map(|(name, runs)| {
            let durations: Vec<Duration> = runs.iter().map(|run| run.elapsed).collect();
            Some(RankedEntry {
                rank: None,
                lock_name: name.to_owned(),
                stats: TimingStats::from_durations(&durations)?,
                verification_passed: runs.iter().all(|run| run.verification_passed),
                runs: runs.into_iter().cloned().collect(),
            })
        })
        .collect();

    // stable, so ties keep submission order
    entries.sort_by_key(|entry| (entry.flagged(), entry.stats.mean));
    for (position, entry) in entries
        .iter_mut()
        .filter(|entry| entry.verification_passed)
        .enumerate()
    {
        entry.rank = Some(position + 1);
    }

    Comparison { entries }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::goal::calculate_goal;
use crate::models::{Goal, PhysicalStats, validate_stats};

/// The user's physiological profile with its memoized goal.
///
/// `cached_goal` always equals `calculate_goal(stats)`: the stats can only be
/// replaced through [`Profile::update_stats`], which recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    stats: PhysicalStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cached_goal: Option<Goal>,
}

impl Profile {
    pub fn from_stats(stats: PhysicalStats) -> Result<Self> {
        validate_stats(&stats)?;
        Ok(Self {
            stats,
            cached_goal: calculate_goal(&stats),
        })
    }

    #[must_use]
    pub fn stats(&self) -> &PhysicalStats {
        &self.stats
    }

    /// `None` when the goal is undefined (unspecified sex).
    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.cached_goal
    }

    /// Replace the physiological inputs. On validation failure the profile is
    /// left unchanged.
    pub fn update_stats(&mut self, stats: PhysicalStats) -> Result<()> {
        validate_stats(&stats)?;
        self.stats = stats;
        self.cached_goal = calculate_goal(&stats);
        Ok(())
    }

    /// Recompute the cache if it disagrees with the stats. Returns true when a
    /// stale value was replaced.
    pub fn refresh_goal(&mut self) -> bool {
        let fresh = calculate_goal(&self.stats);
        if fresh == self.cached_goal {
            false
        } else {
            self.cached_goal = fresh;
            true
        }
    }
}

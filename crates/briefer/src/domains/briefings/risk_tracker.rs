use skybrief_core::RiskLevel;
use slog::{info, warn, Logger};
use std::collections::HashMap;

use crate::StationBriefing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChange {
    pub station: String,
    pub from: RiskLevel,
    pub to: RiskLevel,
}

/// Remembers each station's last risk level across watch runs
#[derive(Debug, Default)]
pub struct RiskTracker {
    last_levels: HashMap<String, RiskLevel>,
}

impl RiskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every station's level and return the ones that moved since the
    /// previous run. A station seen for the first time is not a change.
    pub fn record(&mut self, logger: &Logger, briefings: &[StationBriefing]) -> Vec<LevelChange> {
        let mut changes = vec![];
        for station in briefings {
            let briefing = &station.briefing;
            let level = briefing.risk.level;
            info!(logger, "{}: {}", briefing.station, level);
            if let Some(previous) = self.last_levels.insert(briefing.station.clone(), level) {
                if previous != level {
                    warn!(
                        logger,
                        "{} risk changed from {} to {}", briefing.station, previous, level
                    );
                    changes.push(LevelChange {
                        station: briefing.station.clone(),
                        from: previous,
                        to: level,
                    });
                }
            }
        }
        changes
    }
}

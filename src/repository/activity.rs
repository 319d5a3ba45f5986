//! Activity journal

use chrono::{DateTime, Utc};

use crate::models::{Activity, ActivityKind};

use super::LibraryData;

impl LibraryData {
    pub fn journal(&mut self, id: String, kind: ActivityKind, description: String, timestamp: DateTime<Utc>) {
        self.activity.push(Activity {
            id,
            kind,
            description,
            timestamp,
        });
    }

    /// Most recent entries first; the journal is kept in append order
    pub fn recent_activity(&self, limit: usize) -> Vec<Activity> {
        self.activity.iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn test_recent_activity_reads_newest_entries_only() {
        let mut data = LibraryData::default();
        let start = Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap();
        for n in 0..50 {
            data.journal(format!("act-{n}"), ActivityKind::Issue, format!("entry {n}"), start + Duration::minutes(n));
        }

        let ids: Vec<_> = data.recent_activity(3).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["act-49", "act-48", "act-47"]);
        assert!(data.recent_activity(0).is_empty());
        assert_eq!(data.recent_activity(500).len(), 50);
    }
}

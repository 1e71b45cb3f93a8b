use std::ops::Sub;

use overstats_database::model::{
    profile::{ALL_HEROES, ProfileSnapshot, StatCategory, StatCollection},
    region::Region,
    users::UserRecord,
};

/// Six headline numbers projected from a profile's `allHeroes` aggregate.
///
/// The same type doubles as a delta: the difference of two reports is a
/// report whose fields may be negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub rating: i64,
    pub level: i64,
    pub games: i64,
    pub wins: i64,
    pub ties: i64,
    pub losses: i64,
}

impl Report {
    /// Project `snapshot` for one stat collection. Every missing or
    /// non-numeric field reads as zero; this never fails.
    pub fn extract(snapshot: &ProfileSnapshot, collection: StatCollection) -> Self {
        let mut report = Report {
            rating: snapshot.rating(),
            level: snapshot.level(),
            ..Report::default()
        };

        if let Some(stats) = snapshot.career_stats(collection, ALL_HEROES) {
            report.games = stats.int_or_zero(StatCategory::Game, "gamesPlayed");
            report.wins = stats.int_or_zero(StatCategory::Game, "gamesWon");
            report.ties = stats.int_or_zero(StatCategory::Miscellaneous, "gamesTied");
            report.losses = stats.int_or_zero(StatCategory::Miscellaneous, "gamesLost");
        }

        report
    }

    /// Field-wise `new - old`. Negative deltas are kept as they are; a result
    /// past the `i64` range saturates at the bound instead of wrapping.
    pub fn diff(new: &Report, old: &Report) -> Report {
        Report {
            rating: new.rating.saturating_sub(old.rating),
            level: new.level.saturating_sub(old.level),
            games: new.games.saturating_sub(old.games),
            wins: new.wins.saturating_sub(old.wins),
            ties: new.ties.saturating_sub(old.ties),
            losses: new.losses.saturating_sub(old.losses),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Report::default()
    }

    /// A delta describes a played session only when the games count moved.
    pub fn has_session(&self) -> bool {
        self.games != 0
    }
}

impl Sub for Report {
    type Output = Report;

    fn sub(self, old: Report) -> Report {
        Report::diff(&self, &old)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldChange {
    pub old: i64,
    pub new: i64,
    pub delta: i64,
}

impl FieldChange {
    fn new(old: i64, new: i64, delta: i64) -> Self {
        Self { old, new, delta }
    }
}

/// Summary of one play session, handed to the notifier.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub user_id: u64,
    pub handle: String,
    pub region: Region,
    pub player_name: Option<String>,
    pub collection: StatCollection,
    pub rating: FieldChange,
    pub level: FieldChange,
    pub games: FieldChange,
    pub wins: FieldChange,
    pub ties: FieldChange,
    pub losses: FieldChange,
}

impl SessionReport {
    pub fn build(
        record: &UserRecord,
        collection: StatCollection,
        old: &Report,
        new: &Report,
    ) -> Self {
        let delta = Report::diff(new, old);

        Self {
            user_id: record.id,
            handle: record.handle.clone(),
            region: record.region,
            player_name: record
                .profile
                .as_ref()
                .and_then(|profile| profile.name())
                .map(str::to_owned),
            collection,
            rating: FieldChange::new(old.rating, new.rating, delta.rating),
            level: FieldChange::new(old.level, new.level, delta.level),
            games: FieldChange::new(old.games, new.games, delta.games),
            wins: FieldChange::new(old.wins, new.wins, delta.wins),
            ties: FieldChange::new(old.ties, new.ties, delta.ties),
            losses: FieldChange::new(old.losses, new.losses, delta.losses),
        }
    }

    /// Name shown to users: the profile's own name when present, else the
    /// registered handle in display form.
    pub fn display_name(&self) -> String {
        self.player_name
            .clone()
            .unwrap_or_else(|| self.region.display_handle(&self.handle))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use overstats_database::model::{
        profile::{ProfileSnapshot, StatCollection},
        region::Region,
        users::UserRecord,
    };

    use super::{Report, SessionReport};

    fn snapshot(rating: i64, games: i64, wins: i64, ties: i64, losses: i64) -> ProfileSnapshot {
        ProfileSnapshot::new(json!({
            "name": "Kraso#2712",
            "rating": rating,
            "prestige": 1,
            "level": 12,
            "competitiveStats": {
                "careerStats": {
                    "allHeroes": {
                        "game": { "gamesPlayed": games, "gamesWon": wins },
                        "miscellaneous": { "gamesTied": ties, "gamesLost": losses }
                    }
                }
            }
        }))
    }

    #[test]
    fn extracts_all_six_fields() {
        let report = Report::extract(&snapshot(2500, 10, 5, 0, 5), StatCollection::Competitive);
        assert_eq!(
            report,
            Report {
                rating: 2500,
                level: 112,
                games: 10,
                wins: 5,
                ties: 0,
                losses: 5,
            }
        );
    }

    #[test]
    fn missing_aggregate_yields_zero_games() {
        let cases = [
            json!({}),
            json!({ "competitiveStats": {} }),
            json!({ "competitiveStats": { "careerStats": { "ana": {} } } }),
            json!({ "competitiveStats": { "careerStats": { "allHeroes": "broken" } } }),
            json!("not even an object"),
        ];

        for case in cases {
            let snapshot = ProfileSnapshot::new(case.clone());
            let report = Report::extract(&snapshot, StatCollection::Competitive);
            assert!(report.is_zero(), "expected zero report for {case}");
        }
    }

    #[test]
    fn other_collections_are_independent() {
        let report = Report::extract(&snapshot(2500, 10, 5, 0, 5), StatCollection::QuickPlay);
        assert_eq!(report.games, 0);
        assert_eq!(report.rating, 2500);
    }

    #[test]
    fn self_diff_is_zero() {
        let samples = [
            Report::default(),
            Report::extract(&snapshot(2500, 10, 5, 0, 5), StatCollection::Competitive),
            Report {
                rating: -3,
                level: i64::MAX,
                games: i64::MIN,
                wins: 1,
                ties: 2,
                losses: 3,
            },
        ];

        for report in samples {
            assert!(Report::diff(&report, &report).is_zero());
            assert!(!(report - report).has_session());
        }
    }

    #[test]
    fn negative_deltas_are_kept() {
        let old = Report::extract(&snapshot(2600, 10, 5, 0, 5), StatCollection::Competitive);
        let new = Report::extract(&snapshot(2550, 11, 5, 0, 6), StatCollection::Competitive);
        let delta = new - old;
        assert_eq!(delta.rating, -50);
        assert_eq!(delta.games, 1);
        assert_eq!(delta.losses, 1);
        assert!(delta.has_session());
    }

    #[test]
    fn out_of_range_deltas_saturate() {
        let low = Report {
            rating: i64::MIN,
            games: -1,
            ..Report::default()
        };
        let high = Report {
            rating: i64::MAX,
            games: i64::MAX,
            ..Report::default()
        };

        let up = high - low;
        assert_eq!(up.rating, i64::MAX);
        assert_eq!(up.games, i64::MAX);

        let down = low - high;
        assert_eq!(down.rating, i64::MIN);
        assert_eq!(down.games, i64::MIN);
    }

    #[test]
    fn session_report_carries_old_new_and_delta() {
        let old = Report::extract(&snapshot(2500, 10, 5, 0, 5), StatCollection::Competitive);
        let new_profile = snapshot(2600, 12, 6, 0, 6);
        let new = Report::extract(&new_profile, StatCollection::Competitive);
        let record = UserRecord {
            id: 9,
            handle: "Kraso-2712".to_owned(),
            region: Region::Eu,
            notify_channel_id: None,
            profile: Some(new_profile),
            registered_at: 0,
            profile_updated_at: None,
        };

        let report = SessionReport::build(&record, StatCollection::Competitive, &old, &new);
        assert_eq!(report.games.delta, 2);
        assert_eq!(
            (report.rating.old, report.rating.new, report.rating.delta),
            (2500, 2600, 100)
        );
        assert_eq!(report.wins.delta, 1);
        assert_eq!(report.losses.delta, 1);
        assert_eq!(report.ties.delta, 0);
        assert_eq!(report.display_name(), "Kraso#2712");
    }
}

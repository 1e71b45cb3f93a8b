use std::fmt;

use overstats_database::model::{
    profile::{StatCategory, StatCollection},
    users::RankedEntry,
};

use crate::error::StoreError;
use crate::store::{ProfileStore, Scope};

/// Dotted path to a numeric field inside a profile document.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse `a.b.c`. Empty input or empty segments are rejected.
    pub fn parse(dotted: &str) -> Option<Self> {
        let segments = dotted
            .trim()
            .split('.')
            .map(str::trim)
            .map(str::to_owned)
            .collect::<Vec<_>>();

        if segments.iter().any(String::is_empty) {
            return None;
        }

        Some(Self(segments))
    }

    pub fn rating() -> Self {
        Self(vec!["rating".to_owned()])
    }

    pub fn career(
        collection: StatCollection,
        hero: &str,
        category: StatCategory,
        metric: &str,
    ) -> Self {
        Self(vec![
            collection.key().to_owned(),
            "careerStats".to_owned(),
            hero.to_owned(),
            category.key().to_owned(),
            metric.to_owned(),
        ])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Standing of one user within a ranked population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankResult {
    /// 1-based; users with equal values share a position.
    pub position: usize,
    pub population: usize,
    pub value: f64,
    /// `100 * position / population`.
    pub percentile: f64,
}

/// Rank `user_id` by `field` among the users in `scope`.
///
/// Runs a full scoped query on every call. Users without a numeric value at
/// `field` do not take part; ranking such a user fails with `NotFound`.
pub async fn rank<S: ProfileStore>(
    store: &S,
    field: &FieldPath,
    user_id: u64,
    scope: Scope,
) -> Result<RankResult, StoreError> {
    let population = store.query_ordered(scope, field, None).await?;
    position_in(&population, user_id).ok_or(StoreError::NotFound)
}

/// The first `limit` users of the same ordering `rank` uses.
pub async fn top<S: ProfileStore>(
    store: &S,
    field: &FieldPath,
    scope: Scope,
    limit: u32,
) -> Result<Vec<RankedEntry>, StoreError> {
    store.query_ordered(scope, field, Some(limit)).await
}

/// Competition ranking: one plus the number of strictly greater values, so
/// the result does not depend on how ties are ordered.
fn position_in(population: &[RankedEntry], user_id: u64) -> Option<RankResult> {
    let target = population.iter().find(|entry| entry.user_id == user_id)?;
    let position = 1 + population
        .iter()
        .filter(|entry| entry.value > target.value)
        .count();
    let size = population.len();

    Some(RankResult {
        position,
        population: size,
        value: target.value,
        percentile: 100.0 * position as f64 / size as f64,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use overstats_database::model::{
        profile::{StatCategory, StatCollection},
        region::{Platform, Region},
        users::RankedEntry,
    };

    use super::{FieldPath, position_in, rank, top};
    use crate::error::StoreError;
    use crate::store::Scope;
    use crate::testing::{MemoryStore, registered};

    fn entry(user_id: u64, value: f64) -> RankedEntry {
        RankedEntry {
            user_id,
            handle: format!("player-{user_id}"),
            region: Region::Eu,
            value,
        }
    }

    #[test]
    fn parses_field_paths() {
        assert_eq!(FieldPath::parse("rating"), Some(FieldPath::rating()));
        assert_eq!(
            FieldPath::parse("competitiveStats.careerStats.allHeroes.game.gamesWon"),
            Some(FieldPath::career(
                StatCollection::Competitive,
                "allHeroes",
                StatCategory::Game,
                "gamesWon"
            ))
        );
        assert_eq!(FieldPath::parse(""), None);
        assert_eq!(FieldPath::parse("a..b"), None);
        assert_eq!(FieldPath::rating().to_string(), "rating");
    }

    #[test]
    fn distinct_values_span_one_to_n() {
        let population = vec![entry(4, 40.0), entry(3, 30.0), entry(2, 20.0), entry(1, 10.0)];

        let best = position_in(&population, 4).unwrap();
        assert_eq!(best.position, 1);
        assert_eq!(best.population, 4);
        assert!((best.percentile - 25.0).abs() < f64::EPSILON);

        let worst = position_in(&population, 1).unwrap();
        assert_eq!(worst.position, 4);
        assert!((worst.percentile - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_share_a_position() {
        let population = vec![
            entry(1, 3000.0),
            entry(2, 2800.0),
            entry(3, 2800.0),
            entry(4, 2500.0),
        ];

        assert_eq!(position_in(&population, 2).unwrap().position, 2);
        assert_eq!(position_in(&population, 3).unwrap().position, 2);
        assert_eq!(position_in(&population, 4).unwrap().position, 4);
        assert!(position_in(&population, 99).is_none());
    }

    #[tokio::test]
    async fn ranks_against_the_store() {
        let store = Arc::new(MemoryStore::default());
        store.insert(registered(1, Region::Eu, Some(3000), 0));
        store.insert(registered(2, Region::Us, Some(2800), 0));
        store.insert(registered(3, Region::Psn, Some(2800), 0));
        store.insert(registered(4, Region::Kr, Some(2500), 0));
        store.insert(registered(5, Region::Xbl, None, 0));

        let result = rank(&*store, &FieldPath::rating(), 2, Scope::All).await.unwrap();
        assert_eq!((result.position, result.population), (2, 4));
        assert!((result.percentile - 50.0).abs() < f64::EPSILON);

        let console = rank(
            &*store,
            &FieldPath::rating(),
            3,
            Scope::Platform(Platform::Console),
        )
        .await
        .unwrap();
        assert_eq!((console.position, console.population), (1, 1));

        let missing_profile = rank(&*store, &FieldPath::rating(), 5, Scope::All).await;
        assert!(matches!(missing_profile, Err(StoreError::NotFound)));

        let out_of_scope = rank(
            &*store,
            &FieldPath::rating(),
            1,
            Scope::Platform(Platform::Console),
        )
        .await;
        assert!(matches!(out_of_scope, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn top_orders_ties_by_user_id() {
        let store = MemoryStore::default();
        store.insert(registered(7, Region::Eu, Some(2800), 0));
        store.insert(registered(3, Region::Eu, Some(2800), 0));
        store.insert(registered(9, Region::Eu, Some(3100), 0));

        let entries = top(&store, &FieldPath::rating(), Scope::All, 2).await.unwrap();
        let ids = entries.iter().map(|entry| entry.user_id).collect::<Vec<_>>();
        assert_eq!(ids, vec![9, 3]);
    }
}

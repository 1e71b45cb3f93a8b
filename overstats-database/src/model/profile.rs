use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregate entry in `careerStats` covering every hero.
pub const ALL_HEROES: &str = "allHeroes";

/// Named stat collection inside a profile document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatCollection {
    Competitive,
    QuickPlay,
}

impl StatCollection {
    pub fn key(self) -> &'static str {
        match self {
            StatCollection::Competitive => "competitiveStats",
            StatCollection::QuickPlay => "quickPlayStats",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatCollection::Competitive => "Competitive",
            StatCollection::QuickPlay => "Quick Play",
        }
    }
}

/// Category map inside a hero's career stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatCategory {
    Assists,
    Combat,
    Deaths,
    Game,
    HeroSpecific,
    Miscellaneous,
}

impl StatCategory {
    pub fn key(self) -> &'static str {
        match self {
            StatCategory::Assists => "assists",
            StatCategory::Combat => "combat",
            StatCategory::Deaths => "deaths",
            StatCategory::Game => "game",
            StatCategory::HeroSpecific => "heroSpecific",
            StatCategory::Miscellaneous => "miscellaneous",
        }
    }
}

/// One point-in-time copy of a player's career profile.
///
/// The upstream document is sparse and varies per hero and platform, so this
/// wraps the raw JSON and exposes lookups that return `None` (or zero) for
/// anything absent or of the wrong type instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSnapshot(Value);

impl ProfileSnapshot {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Walk nested objects along `path`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter()
            .try_fold(&self.0, |node, segment| node.as_object()?.get(segment.as_ref()))
    }

    /// Numeric value at `path`. Strings and other non-numbers count as absent.
    pub fn number_at<S: AsRef<str>>(&self, path: &[S]) -> Option<f64> {
        self.get_path(path).and_then(Value::as_f64)
    }

    pub fn int_at<S: AsRef<str>>(&self, path: &[S]) -> Option<i64> {
        self.get_path(path).and_then(value_as_i64)
    }

    pub fn text_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&str> {
        self.get_path(path).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text_at(&["name"])
    }

    pub fn rating(&self) -> i64 {
        self.int_at(&["rating"]).unwrap_or(0)
    }

    /// Composite level: prestige * 100 + level.
    pub fn level(&self) -> i64 {
        let prestige = self.int_at(&["prestige"]).unwrap_or(0);
        let level = self.int_at(&["level"]).unwrap_or(0);
        prestige.saturating_mul(100).saturating_add(level)
    }

    pub fn career_stats(&self, collection: StatCollection, hero: &str) -> Option<HeroStats<'_>> {
        self.get_path(&[collection.key(), "careerStats", hero])
            .and_then(Value::as_object)
            .map(HeroStats)
    }

    /// Heroes of a collection ordered by time played, most played first.
    pub fn top_heroes(&self, collection: StatCollection) -> Vec<TopHero> {
        let Some(heroes) = self
            .get_path(&[collection.key(), "topHeroes"])
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };

        let mut top = heroes
            .iter()
            .map(|(name, entry)| TopHero {
                name: name.clone(),
                time_played_seconds: entry
                    .get("timePlayedInSeconds")
                    .and_then(value_as_i64)
                    .unwrap_or(0),
                time_played: entry
                    .get("timePlayed")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            })
            .collect::<Vec<_>>();

        top.sort_by(|a, b| {
            b.time_played_seconds
                .cmp(&a.time_played_seconds)
                .then_with(|| a.name.cmp(&b.name))
        });
        top
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopHero {
    pub name: String,
    pub time_played_seconds: i64,
    pub time_played: Option<String>,
}

/// Borrowed view over one hero (or aggregate) entry of `careerStats`.
#[derive(Clone, Copy, Debug)]
pub struct HeroStats<'a>(&'a Map<String, Value>);

impl<'a> HeroStats<'a> {
    pub fn metric(&self, category: StatCategory, name: &str) -> Option<&'a Value> {
        self.0.get(category.key())?.as_object()?.get(name)
    }

    pub fn number(&self, category: StatCategory, name: &str) -> Option<f64> {
        self.metric(category, name).and_then(Value::as_f64)
    }

    pub fn text(&self, category: StatCategory, name: &str) -> Option<&'a str> {
        self.metric(category, name).and_then(Value::as_str)
    }

    pub fn int_or_zero(&self, category: StatCategory, name: &str) -> i64 {
        self.metric(category, name).and_then(value_as_i64).unwrap_or(0)
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
}

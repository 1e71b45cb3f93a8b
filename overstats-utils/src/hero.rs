use overstats_database::model::profile::{
    ProfileSnapshot, StatCategory, StatCollection, TopHero,
};

/// Per-hero career numbers, rates normalized to one minute of play.
#[derive(Clone, Debug, PartialEq)]
pub struct HeroSummary {
    pub hero: String,
    pub time_played: Option<String>,
    pub win_rate: Option<f64>,
    pub eliminations_per_min: Option<f64>,
    /// Eliminations per life as reported upstream.
    pub kd_ratio: Option<f64>,
    pub accuracy: Option<String>,
    pub damage_per_min: Option<f64>,
    pub blocked_per_min: Option<f64>,
    pub healing_per_min: Option<f64>,
    pub objective_kills_per_min: Option<f64>,
    pub crits_per_min: Option<f64>,
}

impl HeroSummary {
    /// Summary of `hero` in one collection, or `None` when the profile has no
    /// career stats or time played for that hero.
    pub fn from_profile(
        profile: &ProfileSnapshot,
        collection: StatCollection,
        hero: &str,
    ) -> Option<Self> {
        let played = profile
            .top_heroes(collection)
            .into_iter()
            .find(|top| top.name == hero)?;
        let stats = profile.career_stats(collection, hero)?;
        let seconds = played.time_played_seconds;
        let rate = |category: StatCategory, name: &str| {
            stats
                .number(category, name)
                .and_then(|total| per_minute(total, seconds))
        };

        let games = stats.number(StatCategory::Game, "gamesPlayed").unwrap_or(0.0);
        let wins = stats.number(StatCategory::Game, "gamesWon").unwrap_or(0.0);
        let win_rate = (games > 0.0).then(|| wins / games * 100.0);

        let accuracy = stats
            .text(StatCategory::Combat, "weaponAccuracy")
            .map(str::to_owned)
            .or_else(|| {
                stats
                    .number(StatCategory::Combat, "weaponAccuracy")
                    .map(|value| format!("{value:.0}%"))
            });

        Some(Self {
            hero: played.name,
            time_played: played.time_played,
            win_rate,
            eliminations_per_min: rate(StatCategory::Combat, "eliminations"),
            kd_ratio: stats.number(StatCategory::Combat, "eliminationsPerLife"),
            accuracy,
            damage_per_min: rate(StatCategory::Combat, "damageDone"),
            blocked_per_min: rate(StatCategory::Miscellaneous, "damageBlocked"),
            healing_per_min: rate(StatCategory::Miscellaneous, "healingDone"),
            objective_kills_per_min: rate(StatCategory::Combat, "objectiveKills"),
            crits_per_min: rate(StatCategory::Combat, "criticalHits"),
        })
    }
}

/// `total` spread over `seconds` of play, per minute. Nothing when no time
/// was played.
pub fn per_minute(total: f64, seconds: i64) -> Option<f64> {
    if seconds <= 0 {
        return None;
    }
    Some(total / (seconds as f64 / 60.0))
}

/// Match user input such as `Wrecking Ball`, `wrecking-ball` or `soldier76`
/// against the hero keys of a collection.
pub fn find_hero<'a>(heroes: &'a [TopHero], raw: &str) -> Option<&'a TopHero> {
    let wanted = hero_search_key(raw);
    if wanted.is_empty() {
        return None;
    }
    heroes.iter().find(|hero| hero_search_key(&hero.name) == wanted)
}

fn hero_search_key(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

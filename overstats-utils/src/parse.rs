use overstats_database::model::{
    profile::StatCollection,
    region::{Platform, Region},
};

/// Parse a region token (`eu`, `us`, `kr`, `psn`, `xbl`).
pub fn parse_region(raw: &str) -> Option<Region> {
    raw.split_whitespace().next()?.parse().ok()
}

/// Parse `pc` / `console`, defaulting to PC when nothing was given.
pub fn parse_platform(raw: Option<&str>) -> Option<Platform> {
    match raw.and_then(|value| value.split_whitespace().next()) {
        None => Some(Platform::Pc),
        Some(token) => token.parse().ok(),
    }
}

/// `quick` / `qp` selects quick play; anything else is competitive.
pub fn parse_collection(raw: Option<&str>) -> StatCollection {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("quick" | "qp" | "quickplay") => StatCollection::QuickPlay,
        _ => StatCollection::Competitive,
    }
}

/// Split `wrecking ball quick` into the hero name and an optional trailing
/// mode word. The name is `None` when nothing but a mode was given.
pub fn parse_hero_query(raw: &str) -> (Option<String>, StatCollection) {
    let mut words = raw.split_whitespace().collect::<Vec<_>>();
    let collection = match words.last().map(|word| word.to_ascii_lowercase()).as_deref() {
        Some("quick" | "qp" | "quickplay") => {
            words.pop();
            StatCollection::QuickPlay
        }
        Some("competitive" | "comp") => {
            words.pop();
            StatCollection::Competitive
        }
        _ => StatCollection::Competitive,
    };

    let name = (!words.is_empty()).then(|| words.join(" "));
    (name, collection)
}

/// A handle is usable when it is non-empty and has no whitespace, except
/// console gamertags which may contain spaces.
pub fn is_valid_handle(region: Region, handle: &str) -> bool {
    let handle = handle.trim();
    if handle.is_empty() || handle.len() > 64 {
        return false;
    }

    match region.platform() {
        Platform::Pc => !handle.chars().any(char::is_whitespace),
        Platform::Console => true,
    }
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn not_registered_message() -> &'static str {
    "You have no saved profile yet. Use `!save <region> <BattleTag|console id>` first."
}

pub fn player_not_found_message() -> &'static str {
    "Player not found! Check the region and BattleTag (e.g. `Name#1234`)."
}

pub fn provider_unavailable_message() -> &'static str {
    "The stats service is not responding right now. Please try again later."
}

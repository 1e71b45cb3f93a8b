/// Discord embed builders for reports, profiles and leaderboards.
pub mod embed;
/// Per-hero career summaries.
pub mod hero;
/// Shared formatting helpers (deltas, win rates, hero names).
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Pure parser helpers for command arguments.
pub mod parse;

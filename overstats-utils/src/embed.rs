use poise::serenity_prelude as serenity;

use overstats_database::model::{
    profile::{ALL_HEROES, StatCategory, StatCollection},
    region::Platform,
    users::{RankedEntry, UserRecord},
};
use overstats_sync::{RankResult, Report, SessionReport};

use crate::formatting::{format_change, format_percentile, hero_display_name, win_rate};
use crate::hero::HeroSummary;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0xF9_9E_1A;

const TOP_HEROES_SHOWN: usize = 7;

/// Embed posted after a detected play session.
pub fn session_report_embed(report: &SessionReport) -> serenity::CreateEmbed {
    let games = report.games.delta;
    let description = format!(
        "{} game{} of {} since the last update.\nColumns: before | after | change",
        games.unsigned_abs(),
        if games.abs() == 1 { "" } else { "s" },
        report.collection.label()
    );

    serenity::CreateEmbed::new()
        .title(format!("Session report: {}", report.display_name()))
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
        .field("Rating", format_change(&report.rating), false)
        .field("Wins", format_change(&report.wins), true)
        .field("Losses", format_change(&report.losses), true)
        .field("Ties", format_change(&report.ties), true)
        .field("Level", format_change(&report.level), false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} • {}",
            report.region.as_str().to_ascii_uppercase(),
            report.region.display_handle(&report.handle)
        )))
}

/// Career summary for the `me` command.
pub fn profile_summary_embed(
    record: &UserRecord,
    collection: StatCollection,
    standing: Option<&RankResult>,
) -> serenity::CreateEmbed {
    let handle = record.region.display_handle(&record.handle);
    let builder = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} • {}",
            record.region.as_str().to_ascii_uppercase(),
            collection.label()
        )));

    let Some(profile) = record.profile.as_ref() else {
        return builder
            .title(handle)
            .description("No profile data yet. It will appear after the next refresh.");
    };

    let report = Report::extract(profile, collection);
    let mut lines = vec![format!(
        "**{}** SR • level **{}**",
        report.rating, report.level
    )];

    let record_line = match win_rate(report.wins, report.games) {
        Some(rate) => format!(
            "{}-{}-{} • **{:.2}%** win rate",
            report.wins, report.losses, report.ties, rate
        ),
        None => "No games played".to_owned(),
    };
    lines.push(record_line);

    if let Some(stats) = profile.career_stats(collection, ALL_HEROES) {
        let eliminations = stats.number(StatCategory::Combat, "eliminations").unwrap_or(0.0);
        let deaths = stats.number(StatCategory::Deaths, "deaths").unwrap_or(0.0);
        if deaths > 0.0 {
            lines.push(format!("**{:.2}** K/D", eliminations / deaths));
        }
    }

    if let Some(standing) = standing {
        lines.push(format!(
            "Rank **#{}** of {} • {}",
            standing.position,
            standing.population,
            format_percentile(standing.percentile)
        ));
    }

    if let Some(updated) = record.profile_updated_at {
        lines.push(format!("Updated <t:{updated}:R>"));
    }

    let heroes = profile
        .top_heroes(collection)
        .into_iter()
        .take(TOP_HEROES_SHOWN)
        .map(|hero| match hero.time_played {
            Some(time) => format!("{} ({})", hero_display_name(&hero.name), time),
            None => hero_display_name(&hero.name),
        })
        .collect::<Vec<_>>();

    let builder = builder
        .title(profile.name().map_or(handle, str::to_owned))
        .description(lines.join("\n"));

    if heroes.is_empty() {
        builder
    } else {
        builder.field("Most played", heroes.join("\n"), false)
    }
}

/// Per-hero breakdown for the `hero` command.
pub fn hero_summary_embed(
    record: &UserRecord,
    collection: StatCollection,
    summary: &HeroSummary,
) -> serenity::CreateEmbed {
    let mut lines = Vec::new();
    if let Some(rate) = summary.win_rate {
        lines.push(format!("**{rate:.2}%** hero win rate"));
    }
    if let Some(value) = summary.eliminations_per_min {
        lines.push(format!("**{value:.2}** eliminations per min"));
    }
    if let Some(value) = summary.kd_ratio {
        lines.push(format!("**{value:.2}** K/D"));
    }
    if let Some(accuracy) = &summary.accuracy {
        lines.push(format!("**{accuracy}** accuracy"));
    }
    if let Some(value) = summary.damage_per_min {
        lines.push(format!("**{value:.0}** damage per min"));
    }
    if let Some(value) = summary.blocked_per_min {
        lines.push(format!("**{value:.0}** blocked per min"));
    }
    if let Some(value) = summary.healing_per_min {
        lines.push(format!("**{value:.0}** healing per min"));
    }
    if let Some(value) = summary.objective_kills_per_min {
        lines.push(format!("**{value:.2}** objective kills per min"));
    }
    if let Some(value) = summary.crits_per_min {
        lines.push(format!("**{value:.2}** crits per min"));
    }
    if lines.is_empty() {
        lines.push("No stats recorded for this hero yet.".to_owned());
    }

    let title = match &summary.time_played {
        Some(time) => format!("{} ({time})", hero_display_name(&summary.hero)),
        None => hero_display_name(&summary.hero),
    };

    serenity::CreateEmbed::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(lines.join("\n"))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} • {}",
            record.region.display_handle(&record.handle),
            collection.label()
        )))
}

/// Rating leaderboard for one platform.
pub fn leaderboard_embed(platform: Platform, entries: &[RankedEntry]) -> serenity::CreateEmbed {
    let description = if entries.is_empty() {
        "Nobody is ranked yet.".to_owned()
    } else {
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                format!(
                    "{}. {} ({})",
                    idx + 1,
                    entry.region.display_handle(&entry.handle),
                    entry.value as i64
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    serenity::CreateEmbed::new()
        .title(format!("Rating top: {}", platform.as_str().to_ascii_uppercase()))
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
}

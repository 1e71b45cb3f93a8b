use crate::CommandMeta;
use crate::stats::messages::{not_registered_message, usage_message};
use overstats_core::{Context, Error};
use overstats_database::impls::users::get_user;
use overstats_utils::embed::hero_summary_embed;
use overstats_utils::hero::{HeroSummary, find_hero};
use overstats_utils::parse::parse_hero_query;

pub const META: CommandMeta = CommandMeta {
    name: "hero",
    desc: "Show your per-minute stats for one hero.",
    category: "stats",
    usage: "!hero <name> [competitive|quick]",
};

#[poise::command(prefix_command, slash_command, category = "Stats")]
pub async fn hero(
    ctx: Context<'_>,
    #[description = "Hero name, optionally followed by `quick`"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    let (name, collection) = parse_hero_query(query.as_deref().unwrap_or_default());
    let Some(name) = name else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(record) = get_user(&ctx.data().db, ctx.author().id.get()).await? else {
        ctx.say(not_registered_message()).await?;
        return Ok(());
    };
    let Some(profile) = record.profile.as_ref() else {
        ctx.say("No profile data yet. It will appear after the next refresh.")
            .await?;
        return Ok(());
    };

    let heroes = profile.top_heroes(collection);
    let summary = find_hero(&heroes, &name)
        .and_then(|hero| HeroSummary::from_profile(profile, collection, &hero.name));
    let Some(summary) = summary else {
        ctx.say(format!(
            "No {} stats for `{}` on your profile.",
            collection.label(),
            name
        ))
        .await?;
        return Ok(());
    };

    let embed = hero_summary_embed(&record, collection, &summary);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

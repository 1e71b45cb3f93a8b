use crate::CommandMeta;
use crate::stats::messages::usage_message;
use overstats_core::{Context, Error};
use overstats_sync::{FieldPath, Scope, top as top_by_field};
use overstats_utils::embed::leaderboard_embed;
use overstats_utils::parse::parse_platform;

pub const META: CommandMeta = CommandMeta {
    name: "top",
    desc: "Show the highest rated saved players on PC or console.",
    category: "stats",
    usage: "!top [pc|console]",
};

const LEADERBOARD_SIZE: u32 = 20;

#[poise::command(prefix_command, slash_command, category = "Stats")]
pub async fn top(
    ctx: Context<'_>,
    #[description = "pc (default) or console"] platform: Option<String>,
) -> Result<(), Error> {
    let Some(platform) = parse_platform(platform.as_deref()) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let entries = top_by_field(
        &ctx.data().db,
        &FieldPath::rating(),
        Scope::Platform(platform),
        LEADERBOARD_SIZE,
    )
    .await?;

    ctx.send(poise::CreateReply::default().embed(leaderboard_embed(platform, &entries)))
        .await?;

    Ok(())
}

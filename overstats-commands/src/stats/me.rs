use crate::CommandMeta;
use crate::stats::messages::not_registered_message;
use overstats_core::{Context, Error};
use overstats_database::impls::users::get_user;
use overstats_sync::{FieldPath, Scope, StoreError, rank};
use overstats_utils::embed::profile_summary_embed;
use overstats_utils::parse::parse_collection;

pub const META: CommandMeta = CommandMeta {
    name: "me",
    desc: "Show your saved profile and where you stand on your platform.",
    category: "stats",
    usage: "!me [competitive|quick]",
};

#[poise::command(prefix_command, slash_command, category = "Stats")]
pub async fn me(
    ctx: Context<'_>,
    #[description = "competitive (default) or quick"] mode: Option<String>,
) -> Result<(), Error> {
    let collection = parse_collection(mode.as_deref());
    let db = &ctx.data().db;

    let Some(record) = get_user(db, ctx.author().id.get()).await? else {
        ctx.say(not_registered_message()).await?;
        return Ok(());
    };

    let standing = match rank(
        db,
        &FieldPath::rating(),
        record.id,
        Scope::Platform(record.region.platform()),
    )
    .await
    {
        Ok(result) => Some(result),
        Err(StoreError::NotFound) => None,
        Err(err) => return Err(err.into()),
    };

    let embed = profile_summary_embed(&record, collection, standing.as_ref());
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

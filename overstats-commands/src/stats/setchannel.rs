use crate::CommandMeta;
use crate::stats::messages::{not_registered_message, usage_message};
use overstats_core::{Context, Error};
use overstats_database::impls::users::set_notify_channel;

pub const META: CommandMeta = CommandMeta {
    name: "setchannel",
    desc: "Post your session reports in this channel, or back in DMs with `off`.",
    category: "stats",
    usage: "!setchannel [off]",
};

#[poise::command(prefix_command, slash_command, category = "Stats")]
pub async fn setchannel(
    ctx: Context<'_>,
    #[description = "Use `off` to get reports in DMs again"] mode: Option<String>,
) -> Result<(), Error> {
    let clear = match mode.as_deref().map(|raw| raw.trim().to_ascii_lowercase()) {
        None => ctx.guild_id().is_none(),
        Some(raw) if raw == "off" => true,
        Some(_) => {
            ctx.say(usage_message(META.usage)).await?;
            return Ok(());
        }
    };

    let channel_id = if clear {
        None
    } else {
        Some(ctx.channel_id().get())
    };

    let updated = set_notify_channel(&ctx.data().db, ctx.author().id.get(), channel_id).await?;
    if !updated {
        ctx.say(not_registered_message()).await?;
        return Ok(());
    }

    let reply = match channel_id {
        Some(id) => format!("Session reports will be posted in <#{id}>."),
        None => "Session reports will be sent to you in DMs.".to_owned(),
    };
    ctx.say(reply).await?;

    Ok(())
}

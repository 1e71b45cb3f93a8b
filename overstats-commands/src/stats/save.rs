use tracing::{info, warn};

use crate::CommandMeta;
use crate::stats::messages::{
    player_not_found_message, provider_unavailable_message, usage_message,
};
use overstats_core::{Context, Error};
use overstats_database::impls::users::register_user;
use overstats_database::model::users::NewRegistration;
use overstats_provider::ProviderError;
use overstats_utils::parse::{is_valid_handle, parse_region};

pub const META: CommandMeta = CommandMeta {
    name: "save",
    desc: "Link your Overwatch profile so your sessions get reported.",
    category: "stats",
    usage: "!save <eu|us|kr|psn|xbl> <BattleTag|console id>",
};

#[poise::command(prefix_command, slash_command, category = "Stats")]
pub async fn save(
    ctx: Context<'_>,
    #[description = "Region: eu, us, kr, psn or xbl"] region: Option<String>,
    #[description = "BattleTag (Name#1234) or console id"]
    #[rest]
    handle: Option<String>,
) -> Result<(), Error> {
    let Some(region) = region.as_deref().and_then(parse_region) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };
    let Some(raw_handle) = handle.filter(|raw| is_valid_handle(region, raw)) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };
    let handle = region.normalize_handle(&raw_handle);

    ctx.defer().await?;

    let profile = match ctx.data().provider.fetch_profile(region, &handle).await {
        Ok(profile) => profile,
        Err(ProviderError::NotFound) => {
            ctx.say(player_not_found_message()).await?;
            return Ok(());
        }
        Err(err) => {
            warn!(
                error = %err,
                region = region.as_str(),
                %handle,
                "profile lookup failed during save"
            );
            ctx.say(provider_unavailable_message()).await?;
            return Ok(());
        }
    };

    let user_id = ctx.author().id.get();
    let result = register_user(
        &ctx.data().db,
        &NewRegistration {
            id: user_id,
            handle: handle.clone(),
            region,
            profile,
        },
    )
    .await?;

    info!(
        user_id,
        region = region.as_str(),
        inserted = result.inserted,
        changed = result.changed,
        "profile saved"
    );

    let shown = region.display_handle(&handle);
    let region_label = region.as_str().to_ascii_uppercase();
    let reply = if result.inserted {
        format!(
            "Saved **{shown}** ({region_label}). Session reports will arrive in DMs; \
             use `!setchannel` to post them in a channel instead."
        )
    } else if result.changed {
        format!("Switched your profile to **{shown}** ({region_label}).")
    } else {
        format!("**{shown}** ({region_label}) is already your saved profile.")
    };
    ctx.say(reply).await?;

    Ok(())
}

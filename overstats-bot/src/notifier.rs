use std::sync::Arc;

use poise::serenity_prelude as serenity;

use overstats_sync::{NotificationTarget, Notifier, SessionReport};
use overstats_utils::embed::session_report_embed;

/// Posts session reports through the Discord REST API.
pub struct DiscordNotifier {
    http: Arc<serenity::Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

impl Notifier for DiscordNotifier {
    async fn deliver(
        &self,
        target: NotificationTarget,
        report: &SessionReport,
    ) -> anyhow::Result<()> {
        let http = self.http.as_ref();
        let message = serenity::CreateMessage::new().embed(session_report_embed(report));

        match target {
            NotificationTarget::Channel(channel_id) => {
                serenity::ChannelId::new(channel_id)
                    .send_message(http, message)
                    .await?;
            }
            NotificationTarget::DirectMessage(user_id) => {
                let dm_channel = serenity::UserId::new(user_id)
                    .create_dm_channel(http)
                    .await?;
                dm_channel.send_message(http, message).await?;
            }
        }

        Ok(())
    }
}

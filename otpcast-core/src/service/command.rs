//! Dot-command handling for inbound chat messages.
//!
//! Users drive their broadcast settings from chat: `.active <channel>`,
//! `.deactive <channel>`, `.change <link>`, `.list` and `.id`.

use tracing::debug;

use crate::cache::IdentityCache;
use crate::models::InboundMessage;
use crate::repository::UserSettingsRepository;
use crate::text::clean_id;

/// Parses inbound messages and executes settings commands.
#[derive(Clone)]
pub struct CommandService {
    settings: UserSettingsRepository,
    identity: IdentityCache,
}

impl CommandService {
    #[must_use]
    pub const fn new(settings: UserSettingsRepository, identity: IdentityCache) -> Self {
        Self { settings, identity }
    }

    /// Handle one inbound message. Returns the reply to send back to the
    /// chat, or None when the message is not a command.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<String> {
        let mut args = msg.text.split_whitespace();
        let cmd = args.next()?.to_lowercase();

        // Self-messages act on the session owner; everything else on the
        // (possibly LID-shaped) sender
        let target = if msg.from_self {
            msg.session.as_str().to_string()
        } else {
            clean_id(&msg.sender)
        };
        let user = self.identity.resolve(&target).await;
        debug!(command = %cmd, user = %user, "Command received");

        match cmd.as_str() {
            // Echo the full ids as reported by the gateway; users paste
            // these into .active, so no suffix stripping here
            ".id" => Some(format!(
                "\u{1F464} *User:* `{}`\n\u{1F4CD} *Chat:* `{}`",
                msg.sender, msg.chat,
            )),

            ".active" => {
                let Some(channel) = args.next() else {
                    return Some("\u{274C} Usage: .active <Channel_ID>".to_string());
                };
                match self.settings.add_channel(&user, channel).await {
                    Ok(_) => Some(format!(
                        "\u{2705} Channel Activated!\nMessages will now flow to: {channel}"
                    )),
                    Err(e) => Some(format!("\u{26A0} Error: {e}")),
                }
            }

            ".deactive" => {
                let Some(channel) = args.next() else {
                    return Some("\u{274C} Usage: .deactive <Channel_ID>".to_string());
                };
                match self.settings.remove_channel(&user, channel).await {
                    Ok(_) => Some("\u{2705} Channel Deactivated!".to_string()),
                    Err(e) => Some(format!("\u{26A0} Error: {e}")),
                }
            }

            ".change" => {
                let Some(link) = args.next() else {
                    return Some("\u{274C} Usage: .change <New_Link>".to_string());
                };
                match self.settings.set_custom_link(&user, link).await {
                    Ok(_) => Some(format!(
                        "\u{2705} Footer Link Updated!\nNew Link: {link}"
                    )),
                    Err(e) => Some(format!("\u{26A0} Error: {e}")),
                }
            }

            ".list" => match self.settings.get(&user).await {
                Ok(settings) => {
                    let mut reply = "\u{1F4CB} *Active Channels:*\n".to_string();
                    if settings.channels.is_empty() {
                        reply.push_str("No active channels.");
                    } else {
                        for ch in &settings.channels {
                            reply.push_str(&format!("- `{ch}`\n"));
                        }
                    }
                    reply.push_str(&format!(
                        "\n\u{1F517} *Current Link:*\n{}",
                        settings.custom_link
                    ));
                    Some(reply)
                }
                Err(e) => Some(format!("\u{26A0} Error: {e}")),
            },

            _ => None,
        }
    }
}

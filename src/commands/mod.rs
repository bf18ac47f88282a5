// commands/mod.rs - Command Module Registry
// This file declares all command modules and the small helpers they share
// (TypeMap access and mention parsing).

pub mod general;        // hello / easter_egg
pub mod greet;          // Welcome & goodbye configuration and announcements
pub mod help;           // Help system and command documentation
pub mod info;           // Static PC part descriptions
pub mod moderation;     // kick / ban / mute / clear
pub mod poll;           // Reaction polls
pub mod predict;        // Image classification commands
pub mod quote;          // Quote book
pub mod remind;         // DM reminders

use serenity::{
    client::Context,
    framework::standard::CommandError,
    model::id::{ChannelId, UserId},
    prelude::TypeMapKey,
    utils::{parse_channel, parse_username},
};

/// Clones a shared value out of the client's TypeMap.
pub async fn shared<K>(ctx: &Context) -> Result<K::Value, CommandError>
where
    K: TypeMapKey,
    K::Value: Clone,
{
    let data = ctx.data.read().await;
    data.get::<K>()
        .cloned()
        .ok_or_else(|| format!("{} is not initialised", std::any::type_name::<K>()).into())
}

/// Accepts `<@id>`, `<@!id>` or a bare numeric id.
pub fn parse_user_arg(raw: &str) -> Option<UserId> {
    parse_username(raw)
        .or_else(|| raw.trim().parse::<u64>().ok())
        .map(UserId)
}

/// Accepts `<#id>` or a bare numeric id.
pub fn parse_channel_arg(raw: &str) -> Option<ChannelId> {
    parse_channel(raw)
        .or_else(|| raw.trim().parse::<u64>().ok())
        .map(ChannelId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_arg() {
        assert_eq!(parse_user_arg("<@123>"), Some(UserId(123)));
        assert_eq!(parse_user_arg("<@!456>"), Some(UserId(456)));
        assert_eq!(parse_user_arg("789"), Some(UserId(789)));
        assert_eq!(parse_user_arg("@someone"), None);
    }

    #[test]
    fn test_parse_channel_arg() {
        assert_eq!(parse_channel_arg("<#42>"), Some(ChannelId(42)));
        assert_eq!(parse_channel_arg("42"), Some(ChannelId(42)));
        assert_eq!(parse_channel_arg("#general"), None);
    }
}

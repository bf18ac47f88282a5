// greet.rs - Welcome & Goodbye Module
// Admin commands that configure per-guild join/leave messages, the commands that
// show the current configuration, and the announcement helpers called by the
// member join/leave events in main.rs.
//
// Settings live in memory only (state::WelcomeStore / state::GoodbyeStore).

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::{
        channel::{Channel, ChannelType, Message},
        id::{ChannelId, GuildId},
        mention::Mentionable,
    },
    prelude::TypeMapKey,
};

use crate::commands::parse_channel_arg;
use crate::error::BotError;
use crate::state::{render_template, GoodbyeStore, NotificationStore, WelcomeStore};

const PLACEHOLDER_HINT: &str = "You can use `{user}` for the user's name and `{server}` for the server's name.";

/// Checks that `channel_id` is a text channel of this guild.
async fn resolve_text_channel(ctx: &Context, guild_id: GuildId, channel_id: ChannelId) -> bool {
    match channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => {
            channel.guild_id == guild_id && matches!(channel.kind, ChannelType::Text | ChannelType::News)
        }
        _ => false,
    }
}

async fn set_notification<K>(ctx: &Context, msg: &Message, mut args: Args, kind: &str, audience: &str) -> CommandResult
where
    K: TypeMapKey<Value = NotificationStore>,
{
    let guild_id = msg.guild_id.ok_or("This command only works in a server.")?;

    let raw_channel = args
        .single::<String>()
        .map_err(|_| BotError::MissingArgument("channel"))?;
    let channel_id = parse_channel_arg(&raw_channel).ok_or(BotError::BadArgument("channel"))?;
    let message = args.rest().trim().to_string();
    if message.is_empty() {
        return Err(BotError::MissingArgument("message").into());
    }
    if !resolve_text_channel(ctx, guild_id, channel_id).await {
        return Err(BotError::BadArgument("channel").into());
    }

    {
        let mut data = ctx.data.write().await;
        data.entry::<K>().or_insert_with(NotificationStore::new).set(guild_id, channel_id, message.clone());
    }
    log::info!("[GREET] {} message set for guild {} in channel {}", kind, guild_id, channel_id);

    msg.channel_id
        .say(
            &ctx.http,
            format!(
                "{} message set. {} will receive this message in {}:\n`{}`",
                kind,
                audience,
                channel_id.mention(),
                message
            ),
        )
        .await?;
    msg.channel_id.say(&ctx.http, PLACEHOLDER_HINT).await?;
    Ok(())
}

async fn show_notification<K>(ctx: &Context, msg: &Message, kind: &str) -> CommandResult
where
    K: TypeMapKey<Value = NotificationStore>,
{
    let guild_id = msg.guild_id.ok_or("This command only works in a server.")?;
    let lower = kind.to_lowercase();

    let config = {
        let data = ctx.data.read().await;
        data.get::<K>().and_then(|store| store.get(guild_id)).cloned()
    };

    let reply = match config {
        None => format!("No {} message has been set for this server yet.", lower),
        Some(config) => match config.channel_id.to_channel(ctx).await {
            Ok(_) => format!(
                "Configured {} channel: {}\nConfigured {} message: `{}`",
                lower,
                config.channel_id.mention(),
                lower,
                config.template
            ),
            Err(e) => {
                log::warn!("[GREET] {} channel {} unavailable: {}", kind, config.channel_id, e);
                format!("The configured {} channel was not found or has been deleted.", lower)
            }
        },
    };

    msg.channel_id.say(&ctx.http, reply).await?;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[required_permissions(MANAGE_CHANNELS)]
/// Sets the welcome message and channel for new members
pub async fn setwelcome(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    set_notification::<WelcomeStore>(ctx, msg, args, "Welcome", "New members").await
}

#[command]
#[only_in(guilds)]
#[required_permissions(MANAGE_CHANNELS)]
/// Sets the goodbye message and channel for departing members
pub async fn setgoodbye(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    set_notification::<GoodbyeStore>(ctx, msg, args, "Goodbye", "Departing members").await
}

#[command]
#[only_in(guilds)]
pub async fn showwelcome(ctx: &Context, msg: &Message) -> CommandResult {
    show_notification::<WelcomeStore>(ctx, msg, "Welcome").await
}

#[command]
#[only_in(guilds)]
pub async fn showgoodbye(ctx: &Context, msg: &Message) -> CommandResult {
    show_notification::<GoodbyeStore>(ctx, msg, "Goodbye").await
}

/// Posts the configured message for `guild_id`, if any. `user` is already formatted
/// (a mention for joins, a display name for departures).
pub async fn announce<K>(ctx: &Context, guild_id: GuildId, user: &str, kind: &str)
where
    K: TypeMapKey<Value = NotificationStore>,
{
    let config = {
        let data = ctx.data.read().await;
        data.get::<K>().and_then(|store| store.get(guild_id)).cloned()
    };
    let Some(config) = config else {
        log::debug!("[GREET] No {} configured for guild {}", kind, guild_id);
        return;
    };

    let server = guild_id.name(ctx).unwrap_or_else(|| guild_id.to_string());
    if config.channel_id.to_channel(ctx).await.is_err() {
        log::warn!(
            "[GREET] {} channel for guild {} ({}) not found.",
            kind,
            server,
            guild_id
        );
        return;
    }

    let text = render_template(&config.template, user, &server);
    if let Err(e) = config.channel_id.say(&ctx.http, text).await {
        log::error!("[GREET] Failed to send {} message in guild {}: {}", kind, guild_id, e);
    }
}

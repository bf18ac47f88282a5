// moderation.rs - Moderation Commands
// $kick, $ban, $mute and $clear. Permission gating is done by the framework
// (`required_permissions`); failures are turned into user-facing text by the
// shared error hooks in main.rs.
//
// Key Features:
// - Finds or creates a "Muted" role and denies it send/react/speak in every channel
// - Schedules automatic unmute with a background timer (no early cancellation)
// - Bulk deletes at most 100 messages plus the invoking command; messages older
//   than 14 days are deleted one by one

use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::{
        channel::{Message, PermissionOverwrite, PermissionOverwriteType},
        guild::{Member, Role},
        id::{GuildId, MessageId, UserId},
        permissions::Permissions,
    },
};

use crate::commands::parse_user_arg;
use crate::duration::parse_duration;
use crate::error::BotError;

const MUTED_ROLE: &str = "Muted";
const MAX_PURGE: u64 = 100;

/// What `$clear <amount>` will actually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgePlan {
    /// Nothing is deleted
    Rejected,
    /// Delete `count` messages before the command (plus the command itself)
    Delete { count: u64, capped: bool },
}

impl PurgePlan {
    pub fn from_request(amount: i64) -> Self {
        if amount <= 0 {
            PurgePlan::Rejected
        } else if amount as u64 > MAX_PURGE {
            PurgePlan::Delete { count: MAX_PURGE, capped: true }
        } else {
            PurgePlan::Delete { count: amount as u64, capped: false }
        }
    }
}

/// Messages at least this old (in seconds) are refused by the bulk delete endpoint.
const BULK_DELETE_MAX_AGE: i64 = 14 * 86_400;

/// Message ids split by whether bulk delete still accepts them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AgeSplit {
    pub recent: Vec<MessageId>,
    pub old: Vec<MessageId>,
}

impl AgeSplit {
    /// `messages` pairs each id with its creation time in unix seconds.
    pub fn new(messages: impl IntoIterator<Item = (MessageId, i64)>, now: i64) -> Self {
        let mut split = Self::default();
        for (id, created) in messages {
            if now - created < BULK_DELETE_MAX_AGE {
                split.recent.push(id);
            } else {
                split.old.push(id);
            }
        }
        split
    }
}

fn reason_text(reason: Option<&str>) -> &str {
    reason.unwrap_or("Not specified.")
}

/// Reads the leading member mention and returns the guild member for it.
async fn member_arg(ctx: &Context, guild_id: GuildId, args: &mut Args) -> Result<Member, BotError> {
    let raw = args
        .single::<String>()
        .map_err(|_| BotError::MissingArgument("member"))?;
    let user_id: UserId = parse_user_arg(&raw).ok_or(BotError::BadArgument("member"))?;
    guild_id
        .member(ctx, user_id)
        .await
        .map_err(|_| BotError::BadArgument("member"))
}

fn remaining_text(args: &Args) -> Option<String> {
    let rest = args.rest().trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

#[command]
#[only_in(guilds)]
#[required_permissions(KICK_MEMBERS)]
/// Kicks a member from the server
pub async fn kick(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let guild_id = msg.guild_id.ok_or("This command only works in a server.")?;
    let member = member_arg(ctx, guild_id, &mut args).await?;
    let reason = remaining_text(&args);

    match reason.as_deref() {
        Some(reason) => guild_id.kick_with_reason(&ctx.http, member.user.id, reason).await?,
        None => guild_id.kick(&ctx.http, member.user.id).await?,
    }
    log::info!("[MOD] {} kicked {} ({})", msg.author.name, member.user.name, member.user.id);

    msg.channel_id
        .say(
            &ctx.http,
            format!(
                "{} has been kicked from the server. Reason: {}",
                member.display_name(),
                reason_text(reason.as_deref())
            ),
        )
        .await?;
    Ok(())
}

#[command]
#[only_in(guilds)]
#[required_permissions(BAN_MEMBERS)]
/// Bans a member from the server
pub async fn ban(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let guild_id = msg.guild_id.ok_or("This command only works in a server.")?;
    let member = member_arg(ctx, guild_id, &mut args).await?;
    let reason = remaining_text(&args);

    match reason.as_deref() {
        Some(reason) => guild_id.ban_with_reason(&ctx.http, member.user.id, 0, reason).await?,
        None => guild_id.ban(&ctx.http, member.user.id, 0).await?,
    }
    log::info!("[MOD] {} banned {} ({})", msg.author.name, member.user.name, member.user.id);

    msg.channel_id
        .say(
            &ctx.http,
            format!(
                "{} has been banned from the server. Reason: {}",
                member.display_name(),
                reason_text(reason.as_deref())
            ),
        )
        .await?;
    Ok(())
}

/// Returns the guild's "Muted" role, creating it (and its channel overwrites) when missing.
async fn muted_role(ctx: &Context, msg: &Message, guild_id: GuildId) -> CommandResult<Option<Role>> {
    let roles = guild_id.roles(&ctx.http).await?;
    if let Some(role) = roles.into_values().find(|role| role.name == MUTED_ROLE) {
        return Ok(Some(role));
    }

    msg.channel_id
        .say(&ctx.http, "Muted role not found, attempting to create it...")
        .await?;

    let role = match guild_id
        .create_role(&ctx.http, |r| r.name(MUTED_ROLE).permissions(Permissions::empty()))
        .await
    {
        Ok(role) => role,
        Err(e) => {
            log::warn!("[MUTE] Could not create Muted role in guild {}: {}", guild_id, e);
            msg.channel_id
                .say(&ctx.http, "I do not have sufficient permissions to create the Muted role.")
                .await?;
            return Ok(None);
        }
    };

    let overwrite = PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS | Permissions::SPEAK,
        kind: PermissionOverwriteType::Role(role.id),
    };
    let channels = guild_id.channels(&ctx.http).await?;
    let results = join_all(
        channels
            .keys()
            .map(|channel_id| channel_id.create_permission(&ctx.http, &overwrite)),
    )
    .await;
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::warn!("[MUTE] Failed to set Muted overwrites on {} of {} channels", failed, results.len());
    }

    msg.channel_id
        .say(&ctx.http, "Muted role successfully created and channel permissions set.")
        .await?;
    Ok(Some(role))
}

#[command]
#[only_in(guilds)]
#[required_permissions(MANAGE_ROLES)]
/// Mutes a member for a specified duration
pub async fn mute(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let guild_id = msg.guild_id.ok_or("This command only works in a server.")?;
    let mut member = member_arg(ctx, guild_id, &mut args).await?;

    let duration = match args.single::<String>() {
        Ok(duration) => duration,
        Err(_) => {
            msg.channel_id
                .say(&ctx.http, "Please specify a duration (e.g., 10m, 2h, 1d).")
                .await?;
            return Ok(());
        }
    };
    let seconds = match parse_duration(&duration) {
        Ok(seconds) => seconds,
        Err(e) => {
            log::debug!("[MUTE] Rejected duration '{}': {}", duration, e);
            msg.channel_id
                .say(&ctx.http, "Invalid duration format. Please use a format like '10m', '2h', '1d'.")
                .await?;
            return Ok(());
        }
    };
    let reason = remaining_text(&args);

    let Some(role) = muted_role(ctx, msg, guild_id).await? else {
        return Ok(());
    };

    if member.roles.contains(&role.id) {
        msg.channel_id
            .say(&ctx.http, format!("{} is already muted.", member.display_name()))
            .await?;
        return Ok(());
    }

    member.add_role(&ctx.http, role.id).await?;
    log::info!(
        "[MUTE] {} muted {} for {}s (reason: {})",
        msg.author.name,
        member.user.name,
        seconds,
        reason_text(reason.as_deref())
    );
    msg.channel_id
        .say(
            &ctx.http,
            format!(
                "{} has been muted. Duration: {}, Reason: {}",
                member.display_name(),
                duration,
                reason_text(reason.as_deref())
            ),
        )
        .await?;

    // The timer cannot be cancelled; a manual unmute before it fires is simply repeated.
    let http = ctx.http.clone();
    let channel_id = msg.channel_id;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        if let Err(e) = member.remove_role(&http, role.id).await {
            log::error!("[MUTE] Failed to lift mute for {}: {}", member.user.id, e);
            return;
        }
        let _ = channel_id
            .say(&http, format!("{}'s mute has been lifted.", member.display_name()))
            .await;
    });

    Ok(())
}

#[command]
#[only_in(guilds)]
#[required_permissions(MANAGE_MESSAGES)]
/// Clears a specified number of messages from the channel
pub async fn clear(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    if args.is_empty() {
        return Err(BotError::MissingArgument("amount").into());
    }
    let amount = args
        .single::<i64>()
        .map_err(|_| BotError::BadArgument("amount"))?;

    let count = match PurgePlan::from_request(amount) {
        PurgePlan::Rejected => {
            msg.channel_id.say(&ctx.http, "Please enter a positive number.").await?;
            return Ok(());
        }
        PurgePlan::Delete { count, capped } => {
            if capped {
                msg.channel_id
                    .say(&ctx.http, "You can only delete up to 100 messages at a time.")
                    .await?;
            }
            count
        }
    };

    let history = msg
        .channel_id
        .messages(&ctx.http, |retriever| retriever.before(msg.id).limit(count))
        .await?;
    let split = AgeSplit::new(
        history
            .iter()
            .chain(std::iter::once(msg))
            .map(|m| (m.id, m.timestamp.unix_timestamp())),
        Utc::now().timestamp(),
    );

    // Bulk delete accepts at most 100 ids per request
    for batch in split.recent.chunks(MAX_PURGE as usize) {
        match batch {
            [single] => msg.channel_id.delete_message(&ctx.http, *single).await?,
            _ => msg.channel_id.delete_messages(&ctx.http, batch).await?,
        }
    }
    for id in &split.old {
        msg.channel_id.delete_message(&ctx.http, *id).await?;
    }
    log::info!(
        "[MOD] {} cleared {} messages in {} ({} past the bulk delete window)",
        msg.author.name,
        history.len(),
        msg.channel_id,
        split.old.len()
    );

    let confirmation = msg
        .channel_id
        .say(&ctx.http, format!("{} messages deleted.", history.len()))
        .await?;
    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        let _ = confirmation.delete(&http).await;
    });

    Ok(())
}

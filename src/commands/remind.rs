// remind.rs - Reminder Command
// $remindme <duration> <message> sends the author a DM after the delay.
// If the DM cannot be delivered the reminder is posted in the channel it was requested from.

use std::time::Duration;

use chrono::Utc;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::{channel::Message, mention::Mentionable},
};

use crate::duration::parse_duration;
use crate::error::BotError;

/// Longest accepted reminder delay (7 days).
pub const MAX_REMINDER_SECS: u64 = 7 * 86_400;

#[derive(Debug, PartialEq, Eq)]
pub enum ReminderError {
    InvalidDuration,
    TooLong,
}

/// Validates the requested delay and returns it in seconds.
pub fn reminder_delay(raw: &str) -> Result<u64, ReminderError> {
    let seconds = parse_duration(raw).map_err(|_| ReminderError::InvalidDuration)?;
    if seconds > MAX_REMINDER_SECS {
        return Err(ReminderError::TooLong);
    }
    Ok(seconds)
}

#[command]
/// Sets a personal reminder
pub async fn remindme(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let raw_duration = args
        .single::<String>()
        .map_err(|_| BotError::MissingArgument("duration"))?;
    let reminder = args.rest().trim().to_string();
    if reminder.is_empty() {
        return Err(BotError::MissingArgument("reminder_message").into());
    }

    let seconds = match reminder_delay(&raw_duration) {
        Ok(seconds) => seconds,
        Err(ReminderError::InvalidDuration) => {
            msg.channel_id
                .say(&ctx.http, "Invalid duration format. Please use a format like '10m', '2h', '1d'.")
                .await?;
            return Ok(());
        }
        Err(ReminderError::TooLong) => {
            msg.channel_id
                .say(&ctx.http, "You can set a reminder for a maximum of 7 days.")
                .await?;
            return Ok(());
        }
    };

    let due = Utc::now() + chrono::Duration::seconds(seconds as i64);
    msg.channel_id
        .say(
            &ctx.http,
            format!(
                "Reminder set! I will remind you in your DMs in **{}**: `{}`",
                raw_duration.trim(),
                reminder
            ),
        )
        .await?;
    log::info!(
        "[REMIND] Reminder for {} ({}) due at {}",
        msg.author.name,
        msg.author.id,
        due.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let http = ctx.http.clone();
    let author = msg.author.clone();
    let channel_id = msg.channel_id;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;

        let text = format!("Reminder: **{}**", reminder);
        if let Err(e) = author.direct_message(&http, |m| m.content(&text)).await {
            log::warn!("[REMIND] Could not DM {} ({}): {}", author.name, author.id, e);
            let fallback = format!(
                "{}, I couldn't send you a private message. Please ensure your DMs are open! Reminder: **{}**",
                author.mention(),
                reminder
            );
            if let Err(e) = channel_id.say(&http, fallback).await {
                log::error!("[REMIND] Fallback reminder failed for {}: {}", author.id, e);
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_up_to_seven_days() {
        assert_eq!(reminder_delay("30m"), Ok(1800));
        assert_eq!(reminder_delay("7d"), Ok(604_800));
        assert_eq!(reminder_delay("168h"), Ok(604_800));
    }

    #[test]
    fn test_rejects_longer_than_seven_days() {
        assert_eq!(reminder_delay("8d"), Err(ReminderError::TooLong));
        assert_eq!(reminder_delay("604801s"), Err(ReminderError::TooLong));
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert_eq!(reminder_delay("soon"), Err(ReminderError::InvalidDuration));
        assert_eq!(reminder_delay("0h"), Err(ReminderError::InvalidDuration));
    }
}

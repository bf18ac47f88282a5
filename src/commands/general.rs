// general.rs - Small talk commands
// $hello and $easter_egg; both only need the configured bot name.

use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::channel::Message,
};

use crate::commands::shared;
use crate::state::ConfigKey;

#[command]
/// Bot introduces itself
pub async fn hello(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    msg.channel_id
        .say(&ctx.http, format!("Hello! I am {}, an AI & Moderation bot!", config.bot_name))
        .await?;
    Ok(())
}

#[command]
pub async fn easter_egg(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    msg.channel_id
        .say(&ctx.http, format!("Hey {}, no code today. Try again later!", config.bot_name))
        .await?;
    Ok(())
}

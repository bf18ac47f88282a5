// help.rs - Help Command Module
// Provides the full command listing, personalised with the configured prefix and bot name

use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::channel::Message,
};

use crate::commands::shared;
use crate::state::ConfigKey;

/// Builds the help text. `{{user}}`/`{{server}}` render as literal placeholders.
pub fn help_text(prefix: &str, bot_name: &str) -> String {
    format!(
        "The following commands and syntax are personalized for the **{name}** Discord bot!\n\n\
        **General Commands:**\n\
        `{p}hello` - Bot introduces itself.\n\
        `{p}easter_egg` - Sends a small surprise message.\n\
        `{p}info <part name>` - Gives information about a specific PC part.\n\n\
        **PC Part Prediction Commands:**\n\
        `{p}predict` - Predicts the PC part in a photo you upload. (Attach the photo with the command)\n\
        `{p}net_predict <photo_url>` - Predicts the PC part in a photo from a specified URL.\n\n\
        **Moderation Commands (Admins only):**\n\
        `{p}kick <@user> [reason]` - Kicks a user from the server.\n\
        `{p}ban <@user> [reason]` - Bans a user from the server.\n\
        `{p}mute <@user> [duration (e.g., 10m, 2h)] [reason]` - Mutes a user for a specified duration.\n\
        `{p}clear <number>` - Deletes a specified number of messages from the channel.\n\n\
        **Welcome & Goodbye Commands (Admins only):**\n\
        `{p}setwelcome <#channel> [message]` - Sets the welcome message and channel for new members. (You can use `{{user}}` and `{{server}}` placeholders.)\n\
        `{p}setgoodbye <#channel> [message]` - Sets the goodbye message and channel for departing members. (You can use `{{user}}` and `{{server}}` placeholders.)\n\
        `{p}showwelcome` - Shows the currently set welcome message and channel.\n\
        `{p}showgoodbye` - Shows the currently set goodbye message and channel.\n\n\
        **Poll Commands:**\n\
        `{p}poll \"<question>\" \"<option1>\" \"<option2>\" ...` - Starts a new poll. Enter at least 2, and up to 9 options.\n\n\
        **Reminder Commands:**\n\
        `{p}remindme <time (e.g., 5m, 2h, 1d)> <message>` - Sends you a private reminder after the specified time.\n\n\
        **Quote Commands:**\n\
        `{p}addquote [message]` - Adds a quote from a replied message or the provided text.\n\
        `{p}quote` - Shows a random quote.\n\n\
        **Usage Examples:**\n\
        `{p}predict` (and attach an image)\n\
        `{p}net_predict https://example.com/some_pc_part.jpg`\n\
        `{p}info CPU`\n\
        `{p}setwelcome #general Welcome {{user}}! Thanks for joining {{server}}.`\n\
        `{p}poll \"What's your favorite PC part?\" \"CPU\" \"GPU\" \"RAM\"`\n\
        `{p}remindme 30m Meeting starts soon!`\n\
        `{p}addquote This is a hilarious quote!`\n\n\
        **Please be careful when using! Ensure the object is alone in the provided photo. Otherwise, the chances of a wrong prediction are higher!**\n\n\
        What I can predict:\n\
        0 CPU (Central Processing Unit)\n\
        1 GPU (Graphics Processing Unit)\n\
        2 RAM (Random Access Memory)\n\
        3 Motherboard\n\
        4 Sata SSD\n\
        5 NVMe SSD\n\
        6 HDD\n\
        7 PSU (Power Supply)\n\
        8 Air Cooling\n\n\
        **This Discord bot uses AI for predictions and may give an incorrect answer! Always double-check!**",
        name = bot_name,
        p = prefix
    )
}

#[command]
#[aliases("commands")]
/// Display help information for all available commands
pub async fn help(ctx: &Context, msg: &Message) -> CommandResult {
    let config = shared::<ConfigKey>(ctx).await?;
    let text = help_text(&config.prefix, &config.bot_name);

    // Discord rejects messages over 2000 characters
    for chunk in split_message(&text, 2000) {
        msg.channel_id.say(&ctx.http, chunk).await?;
    }
    Ok(())
}

/// Splits on line boundaries so that every chunk fits in `max_len` bytes.
fn split_message(content: &str, max_len: usize) -> Vec<String> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in content.split('\n') {
        if !current.is_empty() && current_len + 1 + line.len() > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current_len += if current.is_empty() { line.len() } else { line.len() + 1 };
        current.push(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks.into_iter().map(|lines| lines.join("\n")).collect()
}

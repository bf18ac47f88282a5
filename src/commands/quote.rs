// quote.rs - Quote Commands
// $addquote stores either the replied-to message or the given text, tagged with
// the author's display name. $quote shows a random stored quote.

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    http::HttpError,
    model::{channel::Message, id::GuildId, user::User},
    Error as SerenityError,
};

use crate::commands::shared;
use crate::state::{ConfigKey, QuoteBook, QuoteStore};

fn is_not_found(err: &SerenityError) -> bool {
    match err {
        SerenityError::Http(http_err) => match http_err.as_ref() {
            HttpError::UnsuccessfulRequest(response) => response.status_code == reqwest::StatusCode::NOT_FOUND,
            _ => false,
        },
        _ => false,
    }
}

/// Server nickname when there is one, otherwise the account name.
fn quote_author(nick: Option<String>, account_name: &str) -> String {
    nick.filter(|nick| !nick.trim().is_empty())
        .unwrap_or_else(|| account_name.to_string())
}

/// Display name of `author` in `guild_id`. Messages fetched over REST carry no
/// guild id, so the guild always comes from the invoking message.
async fn display_name(ctx: &Context, author: &User, guild_id: Option<GuildId>) -> String {
    let nick = match guild_id {
        Some(guild_id) => author.nick_in(&ctx.http, guild_id).await,
        None => None,
    };
    quote_author(nick, &author.name)
}

fn quote_reply(quote: Option<&str>, prefix: &str) -> String {
    match quote {
        Some(quote) => format!("**Quote:** \"{}\"", quote),
        None => format!("No quotes have been added yet. Use `{}addquote` to add one!", prefix),
    }
}

#[command]
/// Adds a quote from a replied message or directly from the command
pub async fn addquote(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let reference = msg.message_reference.as_ref().and_then(|r| r.message_id);

    let (text, author) = if let Some(message_id) = reference {
        let replied = match msg.channel_id.message(&ctx.http, message_id).await {
            Ok(replied) => replied,
            Err(e) if is_not_found(&e) => {
                msg.channel_id.say(&ctx.http, "The replied message was not found.").await?;
                return Ok(());
            }
            Err(e) => {
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("An error occurred while fetching the replied message: {}", e),
                    )
                    .await?;
                return Ok(());
            }
        };
        if replied.content.trim().is_empty() {
            msg.channel_id
                .say(&ctx.http, "The replied message contains no text content.")
                .await?;
            return Ok(());
        }
        let author = display_name(ctx, &replied.author, msg.guild_id).await;
        (replied.content, author)
    } else {
        let text = args.rest().trim();
        if text.is_empty() {
            let prefix = shared::<ConfigKey>(ctx).await?.prefix.clone();
            msg.channel_id
                .say(
                    &ctx.http,
                    format!(
                        "Please reply to a message or provide text to add a quote. Example: `{}addquote This was hilarious!`",
                        prefix
                    ),
                )
                .await?;
            return Ok(());
        }
        (text.to_string(), display_name(ctx, &msg.author, msg.guild_id).await)
    };

    {
        let mut data = ctx.data.write().await;
        let book = data.entry::<QuoteStore>().or_insert_with(QuoteBook::new);
        let stored = book.add(&text, &author).to_string();
        log::info!("[QUOTE] Added quote #{}: {}", book.len(), stored);
    }

    msg.channel_id.say(&ctx.http, "Quote successfully added!").await?;
    Ok(())
}

#[command]
/// Retrieves a random quote
pub async fn quote(ctx: &Context, msg: &Message) -> CommandResult {
    let prefix = shared::<ConfigKey>(ctx).await?.prefix.clone();
    let reply = {
        let data = ctx.data.read().await;
        let picked = data
            .get::<QuoteStore>()
            .and_then(|book| book.random(&mut rand::thread_rng()));
        quote_reply(picked, &prefix)
    };

    msg.channel_id.say(&ctx.http, reply).await?;
    Ok(())
}

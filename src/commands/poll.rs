// poll.rs - Poll & Voting Command
// $poll "<question>" "<option1>" "<option2>" ... posts an embed with one numbered
// reaction per option.

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::{Message, ReactionType},
    utils::Colour,
};

use crate::error::BotError;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 9;

const NUMBER_EMOJI: [&str; MAX_OPTIONS] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣"];

#[derive(Debug, PartialEq, Eq)]
pub enum PollError {
    TooFewOptions,
    TooManyOptions,
}

impl PollError {
    pub fn message(&self) -> &'static str {
        match self {
            PollError::TooFewOptions => "Please provide at least two options.",
            PollError::TooManyOptions => "You can use a maximum of 9 options.",
        }
    }
}

/// Embed contents and the reactions to add, in order.
#[derive(Debug)]
pub struct PollLayout {
    pub question: String,
    pub description: String,
    pub reactions: Vec<&'static str>,
}

impl PollLayout {
    pub fn new(question: &str, options: &[String]) -> Result<Self, PollError> {
        if options.len() < MIN_OPTIONS {
            return Err(PollError::TooFewOptions);
        }
        if options.len() > MAX_OPTIONS {
            return Err(PollError::TooManyOptions);
        }

        let description = options
            .iter()
            .zip(NUMBER_EMOJI)
            .map(|(option, emoji)| format!("{} {}", emoji, option))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Self {
            question: question.to_string(),
            description,
            reactions: NUMBER_EMOJI[..options.len()].to_vec(),
        })
    }
}

#[command]
#[only_in(guilds)]
/// Creates a poll with up to 9 options
pub async fn poll(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let question = args
        .single_quoted::<String>()
        .map_err(|_| BotError::MissingArgument("question"))?;

    let mut options = Vec::new();
    while !args.is_empty() {
        let option = args
            .single_quoted::<String>()
            .map_err(|_| BotError::BadArgument("option"))?;
        options.push(option);
    }

    let layout = match PollLayout::new(&question, &options) {
        Ok(layout) => layout,
        Err(e) => {
            msg.channel_id.say(&ctx.http, e.message()).await?;
            return Ok(());
        }
    };

    let author = msg
        .author_nick(&ctx.http)
        .await
        .unwrap_or_else(|| msg.author.name.clone());

    let poll_message = msg
        .channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title(&layout.question)
                    .description(&layout.description)
                    .colour(Colour::BLUE)
                    .footer(|f| f.text(format!("Poll started by: {}", author)))
            })
        })
        .await?;

    for emoji in &layout.reactions {
        poll_message
            .react(&ctx.http, ReactionType::Unicode(emoji.to_string()))
            .await?;
    }
    log::info!("[POLL] {} started a poll with {} options", msg.author.name, options.len());
    Ok(())
}

mod classifier;
mod commands;
mod config;
mod duration;
mod error;
mod state;

use std::sync::Arc;
use std::time::Duration;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::{macros::group, DispatchError, StandardFramework},
    model::{
        channel::Message,
        gateway::Ready,
        guild::Member,
        id::GuildId,
        mention::Mentionable,
        user::User,
    },
    prelude::{GatewayIntents, RwLock, TypeMap},
};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::classifier::{load_labels, Classifier, ClassifierError, OnnxModel};
use crate::commands::greet::announce;
use crate::commands::predict::{HttpFetcher, ImageFetcher};
use crate::config::Config;
use crate::error::{classify_command_error, classify_dispatch_error, describe_failure, FailureKind};
use crate::state::{
    ClassifierKey, ConfigKey, FetcherKey, GoodbyeStore, NotificationStore, QuoteBook, QuoteStore,
    WelcomeStore,
};

// Import all command constants generated by the #[command] macro
use crate::commands::general::{EASTER_EGG_COMMAND, HELLO_COMMAND};
use crate::commands::greet::{SETGOODBYE_COMMAND, SETWELCOME_COMMAND, SHOWGOODBYE_COMMAND, SHOWWELCOME_COMMAND};
use crate::commands::help::HELP_COMMAND;
use crate::commands::info::INFO_COMMAND;
use crate::commands::moderation::{BAN_COMMAND, CLEAR_COMMAND, KICK_COMMAND, MUTE_COMMAND};
use crate::commands::poll::POLL_COMMAND;
use crate::commands::predict::{NET_PREDICT_COMMAND, PREDICT_COMMAND};
use crate::commands::quote::{ADDQUOTE_COMMAND, QUOTE_COMMAND};
use crate::commands::remind::REMINDME_COMMAND;

#[group]
#[commands(hello, easter_egg, help, info)]
struct General;

#[group]
#[commands(predict, net_predict)]
struct Vision;

#[group]
#[commands(setwelcome, setgoodbye, showwelcome, showgoodbye)]
struct Greetings;

#[group]
#[commands(kick, ban, mute, clear)]
struct Moderation;

#[group]
#[commands(poll, remindme, addquote, quote)]
struct Community;

// Event handler implementation
struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("[READY] Connected to {} guilds", ready.guilds.len());
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let mention = new_member.mention().to_string();
        announce::<WelcomeStore>(&ctx, new_member.guild_id, &mention, "Welcome").await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        // Departures use the plain name; a mention would not resolve for someone who left
        let name = member_data_if_available
            .map(|member| member.display_name().into_owned())
            .unwrap_or(user.name);
        announce::<GoodbyeStore>(&ctx, guild_id, &name, "Goodbye").await;
    }
}

/// Sends the user-facing text for a failed command to the invoking channel.
async fn report_failure(ctx: &Context, msg: &Message, command_name: &str, kind: FailureKind, detail: &str) {
    let prefix = {
        let data = ctx.data.read().await;
        data.get::<ConfigKey>()
            .map(|config| config.prefix.clone())
            .unwrap_or_else(|| "$".to_string())
    };
    let text = describe_failure(command_name, kind, &prefix, detail);
    if let Err(e) = msg.channel_id.say(&ctx.http, text).await {
        log::error!("[ERROR] Could not report failure of '{}': {}", command_name, e);
    }
}

fn dispatch_detail(error: &DispatchError) -> String {
    match error {
        DispatchError::OnlyForGuilds => "this command can only be used in a server".to_string(),
        other => format!("{:?}", other),
    }
}

fn load_classifier(config: &Config) -> Result<Classifier, ClassifierError> {
    if config.model_base_dir.is_none() {
        log::warn!(
            "[CONFIG] MODEL_BASE_DIRECTORY is not set; falling back to ./{}",
            config.model_dir().display()
        );
    }

    let model_path = config.model_path();
    log::info!("[CLASSIFIER] Loading model from {}", model_path.display());
    let model = OnnxModel::load(&model_path, config.inference_threads)?;
    let labels = load_labels(&config.labels_path());
    Classifier::new(Box::new(model), labels)
}

// Operator console on stdin: quit, help, status
async fn handle_command_line(shutdown_tx: mpsc::Sender<String>, data: Arc<RwLock<TypeMap>>) {
    use tokio::io::AsyncWriteExt;
    use tokio::time::sleep;

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Wait for bot to connect and show connection messages before showing prompt
    sleep(Duration::from_millis(1500)).await;

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    if stdout.write_all(b"\n> ").await.is_err() || stdout.flush().await.is_err() {
        eprintln!("❌ Failed to write initial prompt");
        return;
    }

    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                let command = line.trim().to_lowercase();

                match command.as_str() {
                    "quit" | "q" | "exit" => {
                        println!("⏹️  Shutting down bot...");
                        if shutdown_tx.send("quit".to_string()).await.is_err() {
                            eprintln!("❌ Failed to send shutdown signal");
                        }
                        break;
                    }
                    "help" | "h" => {
                        println!("🤖 Available commands:");
                        println!("  quit, q, exit  - Stop the bot gracefully");
                        println!("  help, h        - Show this help message");
                        println!("  status         - Show bot status");
                    }
                    "status" => print_status(&data).await,
                    "" => {}
                    _ => {
                        println!("❓ Unknown command: '{}'. Type 'help' for available commands.", command);
                    }
                }

                if stdout.write_all(b"> ").await.is_err() || stdout.flush().await.is_err() {
                    eprintln!("❌ Failed to write prompt");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("❌ Error reading command line: {}", e);
                break;
            }
        }
    }
}

async fn print_status(data: &RwLock<TypeMap>) {
    let data = data.read().await;
    println!("🤖 Bot Status: Running");
    if let Some(classifier) = data.get::<ClassifierKey>() {
        let (width, height) = classifier.input_size();
        println!(
            "🧠 Classifier: {} labels, input {}x{}",
            classifier.labels().len(),
            width,
            height
        );
    }
    let welcomes = data.get::<WelcomeStore>().map_or(0, NotificationStore::len);
    let goodbyes = data.get::<GoodbyeStore>().map_or(0, NotificationStore::len);
    let quotes = data.get::<QuoteStore>().map_or(0, QuoteBook::len);
    println!("👋 Welcome configs: {}, goodbye configs: {}", welcomes, goodbyes);
    println!("💬 Quotes stored: {}", quotes);
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("Create a botconfig.txt file in the project root with: DISCORD_TOKEN=your_token_here");
            return;
        }
    };

    // A model that cannot be loaded, or that disagrees with the label count, is fatal
    let classifier = match load_classifier(&config) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            log::error!("❌ Failed to load classifier: {}", e);
            eprintln!("❌ Failed to load classifier: {}", e);
            return;
        }
    };
    log::info!(
        "[CLASSIFIER] Ready with labels: {}",
        classifier.labels().join(", ")
    );

    let http_client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to build HTTP client: {}", e);
            return;
        }
    };
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpFetcher::new(http_client, config.max_download_bytes));

    println!("🤖 Starting {} with prefix: '{}'", config.bot_name, config.prefix);

    let framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&config.prefix)
                .case_insensitivity(true)
                .with_whitespace(true)
        })
        .after(|ctx, msg, command_name, result| {
            Box::pin(async move {
                if let Err(e) = result {
                    log::error!(
                        "❌ Command '{}' failed for user {} ({}): {:?}",
                        command_name,
                        msg.author.name,
                        msg.author.id,
                        e
                    );
                    let kind = classify_command_error(&e);
                    report_failure(ctx, msg, command_name, kind, &e.to_string()).await;
                }
            })
        })
        .on_dispatch_error(|ctx, msg, error, command_name| {
            Box::pin(async move {
                log::debug!("[DISPATCH] '{}' rejected for {}: {:?}", command_name, msg.author.name, error);
                if let Some(kind) = classify_dispatch_error(&error) {
                    report_failure(ctx, msg, command_name, kind, &dispatch_detail(&error)).await;
                }
            })
        })
        .unrecognised_command(|_ctx, msg, unrecognised_command_name| {
            Box::pin(async move {
                log::debug!(
                    "[DISPATCH] Unrecognised command '{}' from {}",
                    unrecognised_command_name,
                    msg.author.name
                );
            })
        })
        .group(&GENERAL_GROUP)
        .group(&VISION_GROUP)
        .group(&GREETINGS_GROUP)
        .group(&MODERATION_GROUP)
        .group(&COMMUNITY_GROUP);

    // Member events need the privileged GUILD_MEMBERS intent
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<ConfigKey>(Arc::clone(&config));
        data.insert::<ClassifierKey>(classifier);
        data.insert::<FetcherKey>(fetcher);
        data.insert::<WelcomeStore>(NotificationStore::new());
        data.insert::<GoodbyeStore>(NotificationStore::new());
        data.insert::<QuoteStore>(QuoteBook::new());
    }

    // Set up command line interface for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);
    let cmd_task = tokio::spawn(handle_command_line(shutdown_tx, Arc::clone(&client.data)));
    let shard_manager = Arc::clone(&client.shard_manager);

    println!("🚀 Bot is running...");
    println!("💡 Use 'quit' command to stop gracefully, or press Ctrl+C");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        shutdown_signal = shutdown_rx.recv() => {
            if let Some(signal) = shutdown_signal {
                println!("📡 Received '{}' command, stopping bot gracefully...", signal);
            }
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    shard_manager.lock().await.shutdown_all().await;
    cmd_task.abort();

    println!("✅ Bot stopped");
}

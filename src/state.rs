// state.rs - In-memory bot state
// Welcome/goodbye settings and the quote book live here. Nothing is persisted:
// everything is lost when the process restarts.
//
// The stores are plain structs; they are shared with command handlers through
// serenity's TypeMap (`ctx.data`) using the keys at the bottom of this file.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::TypeMapKey;

use crate::classifier::Classifier;
use crate::commands::predict::ImageFetcher;
use crate::config::Config;

/// Where and what to post when a member joins or leaves a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub channel_id: ChannelId,
    pub template: String,
}

/// Per-guild notification settings. Last write wins.
#[derive(Debug, Default)]
pub struct NotificationStore {
    configs: HashMap<GuildId, NotificationConfig>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, guild_id: GuildId, channel_id: ChannelId, template: impl Into<String>) {
        self.configs.insert(
            guild_id,
            NotificationConfig {
                channel_id,
                template: template.into(),
            },
        );
    }

    pub fn get(&self, guild_id: GuildId) -> Option<&NotificationConfig> {
        self.configs.get(&guild_id)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }
}

/// Fills the `{user}` and `{server}` placeholders of a stored template.
pub fn render_template(template: &str, user: &str, server: &str) -> String {
    template.replace("{user}", user).replace("{server}", server)
}

/// Append-only list of quotes, each already suffixed with its author.
#[derive(Debug, Default)]
pub struct QuoteBook {
    quotes: Vec<String>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `"<text> - <author>"` and returns the stored string.
    pub fn add(&mut self, text: &str, author: &str) -> &str {
        self.quotes.push(format!("{} - {}", text, author));
        self.quotes.last().map(String::as_str).unwrap_or_default()
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.quotes.choose(rng).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

// TypeMap key for welcome messages
pub struct WelcomeStore;
impl TypeMapKey for WelcomeStore {
    type Value = NotificationStore;
}

// TypeMap key for goodbye messages
pub struct GoodbyeStore;
impl TypeMapKey for GoodbyeStore {
    type Value = NotificationStore;
}

pub struct QuoteStore;
impl TypeMapKey for QuoteStore {
    type Value = QuoteBook;
}

pub struct ClassifierKey;
impl TypeMapKey for ClassifierKey {
    type Value = Arc<Classifier>;
}

pub struct FetcherKey;
impl TypeMapKey for FetcherKey {
    type Value = Arc<dyn ImageFetcher>;
}

// Loaded configuration, needed by hooks that cannot capture it
pub struct ConfigKey;
impl TypeMapKey for ConfigKey {
    type Value = Arc<Config>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_store_set_get_overwrite() {
        let mut store = NotificationStore::new();
        let guild = GuildId(1);
        assert!(store.get(guild).is_none());

        store.set(guild, ChannelId(10), "Welcome {user}!");
        assert_eq!(
            store.get(guild),
            Some(&NotificationConfig {
                channel_id: ChannelId(10),
                template: "Welcome {user}!".to_string(),
            })
        );

        store.set(guild, ChannelId(11), "Hi {user}");
        let config = store.get(guild).unwrap();
        assert_eq!(config.channel_id, ChannelId(11));
        assert_eq!(config.template, "Hi {user}");
        assert_eq!(store.len(), 1);
        assert!(store.get(GuildId(2)).is_none());
    }

    #[test]
    fn test_render_template_replaces_every_placeholder() {
        let rendered = render_template("{user} joined {server}! Hi {user}", "<@5>", "PC Builders");
        assert_eq!(rendered, "<@5> joined PC Builders! Hi <@5>");
        assert_eq!(render_template("no placeholders", "a", "b"), "no placeholders");
    }

    #[test]
    fn test_quote_gets_author_suffix() {
        let mut book = QuoteBook::new();
        assert_eq!(book.add("X", "U"), "X - U");
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_empty_book_has_no_quote() {
        let book = QuoteBook::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(book.is_empty());
        assert_eq!(book.random(&mut rng), None);
    }

    #[test]
    fn test_random_quote_comes_from_book() {
        let mut book = QuoteBook::new();
        book.add("first", "A");
        book.add("first", "A");
        book.add("second", "B");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let quote = book.random(&mut rng).unwrap();
            assert!(quote == "first - A" || quote == "second - B");
        }
        assert_eq!(book.len(), 3);
    }
}

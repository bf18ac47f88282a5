// predict.rs - PC Part Prediction Commands
// This module implements $predict (image attachments) and $net_predict (image URL).
//
// Key Features:
// - Accepts image attachments by content type, falling back to the file extension
// - Downloads URL images with a size cap, distinguishing connection failures from bad status codes
// - Runs the classifier off the async runtime and formats the confidence for Discord
//
// Used by: main.rs (command registration)

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};
use thiserror::Error;

use crate::classifier::{classify_in_background, Classifier, Prediction};
use crate::commands::shared;
use crate::error::BotError;
use crate::state::{ClassifierKey, ConfigKey, FetcherKey};

#[derive(Debug, Error)]
pub enum FetchError {
    /// The host could not be reached at all
    #[error("{0}")]
    Connect(String),
    /// The server answered with something other than 200 OK
    #[error("unexpected status code {0}")]
    Status(u16),
    #[error("the photo is larger than {0} bytes")]
    TooLarge(usize),
    #[error("{0}")]
    Request(String),
}

/// Source of image bytes for URL predictions.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// `reqwest`-backed fetcher that streams the body and stops at `max_bytes`.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

fn request_error(e: reqwest::Error) -> FetchError {
    if e.is_connect() || e.is_timeout() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_error)?;
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        log::debug!("[NET_PREDICT] Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Formats a confidence fraction for display next to a `%` sign.
///
/// By default the raw fraction is printed (0.87 shows as "0.87"), which is how the
/// bot has always answered; `as_percent` scales it to 87.00 instead.
pub fn format_confidence(confidence: f32, as_percent: bool) -> String {
    if as_percent {
        format!("{:.2}", confidence * 100.0)
    } else {
        format!("{:.2}", confidence)
    }
}

/// True when an attachment looks like an image.
pub fn is_image_attachment(content_type: Option<&str>, filename: &str) -> bool {
    match content_type {
        Some(raw) => raw
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false),
        None => mime_guess::from_path(filename)
            .first()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false),
    }
}

fn attachment_reply(prediction: Option<Prediction>, as_percent: bool) -> String {
    match prediction {
        Some(p) => format!(
            "This is a **{}** and I say this with **{}%** confidence.",
            p.label,
            format_confidence(p.confidence, as_percent)
        ),
        None => "Couldn't process the photo.".to_string(),
    }
}

/// Downloads `url`, classifies it and returns the reply text.
pub async fn predict_from_url(
    fetcher: &dyn ImageFetcher,
    classifier: Arc<Classifier>,
    url: &str,
    as_percent: bool,
) -> String {
    match fetcher.fetch(url).await {
        Ok(bytes) => match classify_in_background(classifier, bytes).await {
            Some(p) => format!(
                "The photo in the URL looks like a **{}**. And I say this with a **{}%** confidence.",
                p.label,
                format_confidence(p.confidence, as_percent)
            ),
            None => "Couldn't process the photo in the URL.".to_string(),
        },
        Err(FetchError::Status(code)) => {
            format!("Couldn't download the photo from the URL. Status code: {}", code)
        }
        Err(FetchError::Connect(e)) => format!(
            "Couldn't connect to the URL given: {}. Please make sure the URL is valid.",
            e
        ),
        Err(e) => format!("A problem occurred: {}", e),
    }
}

#[command]
#[description = "Predicts the PC part in an attached photo."]
pub async fn predict(ctx: &Context, msg: &Message) -> CommandResult {
    if msg.attachments.is_empty() {
        msg.channel_id.say(&ctx.http, "To predict, please provide a photo.").await?;
        return Ok(());
    }

    let classifier = shared::<ClassifierKey>(ctx).await?;
    let config = shared::<ConfigKey>(ctx).await?;

    for attachment in &msg.attachments {
        if !is_image_attachment(attachment.content_type.as_deref(), &attachment.filename) {
            msg.channel_id.say(&ctx.http, "Please make sure you attached a photo.").await?;
            continue;
        }

        let _typing = ctx.http.start_typing(msg.channel_id.0)?;
        let bytes = attachment.download().await?;
        log::info!(
            "[PREDICT] {} ({} bytes) from user {} ({})",
            attachment.filename,
            bytes.len(),
            msg.author.name,
            msg.author.id
        );

        let prediction = classify_in_background(Arc::clone(&classifier), bytes).await;
        let reply = attachment_reply(prediction, config.confidence_as_percent);
        msg.channel_id.say(&ctx.http, reply).await?;
    }

    Ok(())
}

#[command]
#[description = "Predicts the PC part in a photo from a URL."]
pub async fn net_predict(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let url = args
        .single::<String>()
        .map_err(|_| BotError::MissingArgument("photo_url"))?;

    let classifier = shared::<ClassifierKey>(ctx).await?;
    let fetcher = shared::<FetcherKey>(ctx).await?;
    let config = shared::<ConfigKey>(ctx).await?;

    let _typing = ctx.http.start_typing(msg.channel_id.0)?;
    log::info!("[NET_PREDICT] {} requested by {} ({})", url, msg.author.name, msg.author.id);

    let reply = predict_from_url(fetcher.as_ref(), classifier, &url, config.confidence_as_percent).await;
    msg.channel_id.say(&ctx.http, reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::{sample_png, stub_classifier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFetcher {
        result: fn() -> Result<Vec<u8>, FetchError>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(result: fn() -> Result<Vec<u8>, FetchError>) -> Self {
            Self { result, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    #[test]
    fn test_confidence_formatting() {
        assert_eq!(format_confidence(0.8734, false), "0.87");
        assert_eq!(format_confidence(0.8734, true), "87.34");
        assert_eq!(format_confidence(1.0, false), "1.00");
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_attachment(Some("image/png"), "a.bin"));
        assert!(is_image_attachment(Some("image/jpeg; charset=binary"), "a"));
        assert!(!is_image_attachment(Some("application/pdf"), "a.png"));
        assert!(is_image_attachment(None, "photo.JPG"));
        assert!(!is_image_attachment(None, "notes.txt"));
        assert!(!is_image_attachment(None, "no_extension"));
    }

    #[test]
    fn test_attachment_reply() {
        let prediction = Prediction { label: "GPU".into(), confidence: 0.5 };
        assert_eq!(
            attachment_reply(Some(prediction), false),
            "This is a **GPU** and I say this with **0.50%** confidence."
        );
        assert_eq!(attachment_reply(None, false), "Couldn't process the photo.");
    }

    #[tokio::test]
    async fn test_not_found_reports_status() {
        let fetcher = StubFetcher::new(|| Err(FetchError::Status(404)));
        let reply = predict_from_url(&fetcher, Arc::new(stub_classifier(9)), "http://x/y.png", false).await;
        assert_eq!(reply, "Couldn't download the photo from the URL. Status code: 404");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_is_distinct() {
        let fetcher = StubFetcher::new(|| Err(FetchError::Connect("dns error".into())));
        let reply = predict_from_url(&fetcher, Arc::new(stub_classifier(9)), "http://nope", false).await;
        assert_eq!(
            reply,
            "Couldn't connect to the URL given: dns error. Please make sure the URL is valid."
        );

        let fetcher = StubFetcher::new(|| Err(FetchError::TooLarge(10)));
        let reply = predict_from_url(&fetcher, Arc::new(stub_classifier(9)), "http://big", false).await;
        assert_eq!(reply, "A problem occurred: the photo is larger than 10 bytes");
    }

    #[tokio::test]
    async fn test_successful_url_prediction() {
        let fetcher = StubFetcher::new(|| Ok(sample_png(10, 10)));
        let reply = predict_from_url(&fetcher, Arc::new(stub_classifier(9)), "http://ok", false).await;
        assert!(reply.starts_with("The photo in the URL looks like a **Air Cooling**."));
        assert!(reply.ends_with("% confidence."));
    }

    #[tokio::test]
    async fn test_undecodable_download() {
        let fetcher = StubFetcher::new(|| Ok(b"<html>not an image</html>".to_vec()));
        let reply = predict_from_url(&fetcher, Arc::new(stub_classifier(9)), "http://html", false).await;
        assert_eq!(reply, "Couldn't process the photo in the URL.");
    }
}

use crate::{
    system::{event::Event, mailbox::Poster},
    view::{bitmap::Bitmap, View, WidgetId},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image server responded with {0}")]
    Status(u16),

    #[error("couldn't decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decoder task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Somewhere image bytes can be fetched from.
#[async_trait]
pub trait ImageSource: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpImageSource {
    http: reqwest::Client,
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ImageError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Loads icons and avatars in the background. Failures are never reported to
/// the user; the widget just keeps its placeholder.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    source: Option<Arc<dyn ImageSource>>,
    poster: Poster,
    timeout: Duration,
    shutdown: CancellationToken,
}

impl ImageFetcher {
    /// With no `source`, every fetch is a no-op.
    pub fn new(
        source: Option<Arc<dyn ImageSource>>,
        poster: Poster,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            poster,
            timeout,
            shutdown,
        }
    }

    /// Fetches `url` into the image widget `target`, abandoning the work as
    /// soon as the widget is destroyed.
    pub fn fetch_for(&self, view: &dyn View, url: &str, target: WidgetId) {
        let Some(destroyed) = view.destroy_notify(target) else {
            return;
        };
        self.fetch(url.to_string(), target, destroyed);
    }

    /// Starts a bounded fetch and decode. On success the bitmap is posted
    /// back to the UI loop as [`Event::ImageLoaded`], unless `destroyed` was
    /// cancelled first.
    pub fn fetch(
        &self,
        url: String,
        target: WidgetId,
        destroyed: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let source = self.source.clone()?;
        let poster = self.poster.clone();
        let timeout = self.timeout;
        let shutdown = self.shutdown.clone();

        Some(tokio::spawn(async move {
            let load = async {
                let bytes = source.fetch(&url).await?;
                let bitmap = tokio::task::spawn_blocking(move || Bitmap::decode(&bytes)).await??;
                Ok::<_, ImageError>(bitmap)
            };

            tokio::select! {
                biased;

                () = destroyed.cancelled() => {
                    tracing::trace!("widget destroyed before {url} loaded");
                }
                () = shutdown.cancelled() => {}
                result = tokio::time::timeout(timeout, load) => match result {
                    Ok(Ok(bitmap)) => {
                        if !destroyed.is_cancelled() {
                            poster.post(Event::ImageLoaded {
                                widget: target,
                                bitmap,
                            });
                        }
                    }
                    Ok(Err(err)) => tracing::debug!("image {url} not loaded: {err}"),
                    Err(_) => tracing::debug!("image {url} timed out"),
                },
            }
        }))
    }
}

#[expect(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        system::{mailbox::Mailbox, Signal},
        testing::{png, StaticImageSource},
    };

    const TIMEOUT: Duration = Duration::from_secs(15);

    fn fetcher(source: StaticImageSource, mailbox: &Mailbox) -> ImageFetcher {
        ImageFetcher::new(
            Some(Arc::new(source)),
            mailbox.poster(),
            TIMEOUT,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn loaded_image_is_posted_back() {
        let mut mailbox = Mailbox::default();
        let source = StaticImageSource::default().with("https://cdn/a.png", png([9, 9, 9]));
        let fetcher = fetcher(source, &mailbox);

        fetcher
            .fetch(
                "https://cdn/a.png".into(),
                WidgetId(7),
                CancellationToken::new(),
            )
            .unwrap()
            .await
            .unwrap();

        let signal = mailbox.next().await;
        assert!(matches!(
            signal,
            Some(Signal::Event(Event::ImageLoaded { widget: WidgetId(7), ref bitmap }))
                if bitmap.pixel(0, 0) == Some([9, 9, 9])
        ));
    }

    #[tokio::test]
    async fn failures_are_silent() {
        let mut mailbox = Mailbox::default();
        let source = StaticImageSource::default().with("https://cdn/bad.png", b"nope".to_vec());
        let fetcher = fetcher(source, &mailbox);

        for url in ["https://cdn/bad.png", "https://cdn/missing.png"] {
            fetcher
                .fetch(url.into(), WidgetId(1), CancellationToken::new())
                .unwrap()
                .await
                .unwrap();
        }

        let mut queue = crate::system::signal::SignalQueue::default();
        assert_eq!(mailbox.drain_into(&mut queue), 0);
    }

    #[tokio::test]
    async fn destroying_the_widget_cancels_the_fetch() {
        let mut mailbox = Mailbox::default();
        let source = StaticImageSource::default().stalled();
        let fetcher = fetcher(source, &mailbox);

        let destroyed = CancellationToken::new();
        let task = fetcher
            .fetch("https://cdn/slow.png".into(), WidgetId(3), destroyed.clone())
            .unwrap();
        destroyed.cancel();

        // finishes promptly instead of waiting out the stalled request
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();

        let mut queue = crate::system::signal::SignalQueue::default();
        assert_eq!(mailbox.drain_into(&mut queue), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_times_out() {
        let mut mailbox = Mailbox::default();
        let source = StaticImageSource::default().stalled();
        let fetcher = fetcher(source, &mailbox);

        let destroyed = CancellationToken::new();
        let task = fetcher
            .fetch("https://cdn/slow.png".into(), WidgetId(3), destroyed.clone())
            .unwrap();
        task.await.unwrap();

        assert!(!destroyed.is_cancelled());
        let mut queue = crate::system::signal::SignalQueue::default();
        assert_eq!(mailbox.drain_into(&mut queue), 0);
    }

    #[tokio::test]
    async fn no_source_means_no_fetch() {
        let mailbox = Mailbox::default();
        let fetcher = ImageFetcher::new(None, mailbox.poster(), TIMEOUT, CancellationToken::new());

        assert!(fetcher
            .fetch("https://cdn/a.png".into(), WidgetId(0), CancellationToken::new())
            .is_none());
    }
}

use super::list_store::ListStore;
use crate::{
    model::{channel::Channel, guild::Guild},
    system::{event::Event, signal::SignalQueue},
    utils::image_fetcher::ImageFetcher,
    view::{Content, Region, Row, View},
};

/// An entity that can be shown as a row in one of the selectable lists.
pub trait PaneItem: Clone + std::fmt::Debug {
    const REGION: Region;

    /// `None` if the entity isn't shown at all.
    fn row(&self) -> Option<Row>;

    fn image_url(&self) -> Option<&str> {
        None
    }
}

impl PaneItem for Guild {
    const REGION: Region = Region::Guilds;

    fn row(&self) -> Option<Row> {
        Some(Row::Guild {
            tooltip: self.name.clone(),
        })
    }

    fn image_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }
}

impl PaneItem for Channel {
    const REGION: Region = Region::Channels;

    fn row(&self) -> Option<Row> {
        self.is_text().then(|| Row::Channel {
            label: format!("#{}", self.name),
        })
    }
}

/// A single-select list over already-fetched entities. Activating a row
/// emits whatever event `on_select` makes of its entity.
#[derive(Debug)]
pub struct ListPane<T: PaneItem> {
    store: ListStore<T>,
    on_select: fn(T) -> Event,
}

pub type GuildPane = ListPane<Guild>;
pub type ChannelPane = ListPane<Channel>;

impl<T: PaneItem> ListPane<T> {
    /// Replaces the pane's region with one row per shown entity, in the
    /// order given.
    pub fn build(
        view: &mut dyn View,
        images: &ImageFetcher,
        entities: Vec<T>,
        on_select: fn(T) -> Event,
    ) -> Self {
        view.replace_content(T::REGION, Content::List);

        let mut store = ListStore::default();
        for entity in entities {
            let Some(row) = entity.row() else {
                continue;
            };
            let Some(handle) = view.append_row(T::REGION, row) else {
                break;
            };

            if let (Some(url), Some(image)) = (entity.image_url(), handle.image) {
                images.fetch_for(view, url, image);
            }
            store.append(entity, handle);
        }

        tracing::debug!("{} pane built with {} rows", T::REGION, store.len());
        Self { store, on_select }
    }

    pub fn activate(&self, index: usize, queue: &mut SignalQueue) {
        match self.store.get(index) {
            Some(entity) => queue.push((self.on_select)(entity.clone())),
            None => tracing::warn!("no row {index} in the {} pane", T::REGION),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &ListStore<T> {
        &self.store
    }
}

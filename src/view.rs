use bitmap::Bitmap;
use tokio_util::sync::CancellationToken;

pub mod bitmap;
pub mod markup;
pub mod render;
pub mod screen;

/// The three columns of the navigation hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Region {
    #[default]
    Guilds,
    Channels,
    Messages,
}

impl Region {
    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Self::Guilds | Self::Channels => Self::Guilds,
            Self::Messages => Self::Channels,
        }
    }

    #[must_use]
    pub const fn right(self) -> Self {
        match self {
            Self::Guilds => Self::Channels,
            Self::Channels | Self::Messages => Self::Messages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(pub(crate) u64);

/// What a row shows. The view decides how; an image slot (guild icon or
/// author avatar) is created for the rows that have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Icon only; the name is shown when the row is under the cursor
    Guild { tooltip: String },

    Channel { label: String },

    /// Avatar, author and body. `author` is markup.
    FullMessage { author: String, body: String },

    /// Body only, continuing the previous row's author
    CompactMessage { body: String },
}

impl Row {
    #[must_use]
    pub const fn has_image(&self) -> bool {
        matches!(self, Self::Guild { .. } | Self::FullMessage { .. })
    }
}

/// The widgets the view created for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHandle {
    pub row: WidgetId,
    pub image: Option<WidgetId>,
}

/// What a region can hold, apart from a list of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    Loading,
    Notice(String),

    /// A list with no rows yet
    List,
}

/// Everything the app needs from whatever draws it. Only the UI loop holds a
/// `View`; background tasks get at most a widget's destroy token.
pub trait View {
    /// Replaces a region's content, destroying every widget it held.
    fn replace_content(&mut self, region: Region, content: Content);

    /// Adds a row at the end of the region's list. Returns `None` if the
    /// region isn't showing a list.
    fn append_row(&mut self, region: Region, row: Row) -> Option<RowHandle>;

    /// A token that is cancelled when `widget` is destroyed. `None` if it
    /// already has been.
    fn destroy_notify(&self, widget: WidgetId) -> Option<CancellationToken>;

    /// Returns `false` if the widget no longer exists.
    fn set_bitmap(&mut self, widget: WidgetId, bitmap: Bitmap) -> bool;

    fn show_loading(&mut self, region: Region) {
        self.replace_content(region, Content::Loading);
    }

    /// Replaces a region's content with a list of `rows`, returning the
    /// handles in row order.
    fn render_list(&mut self, region: Region, rows: Vec<Row>) -> Vec<RowHandle> {
        self.replace_content(region, Content::List);
        rows.into_iter()
            .filter_map(|row| self.append_row(region, row))
            .collect()
    }
}

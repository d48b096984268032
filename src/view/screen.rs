use super::{bitmap::Bitmap, Content, Region, Row, RowHandle, View, WidgetId};
use ratatui::widgets::ListState;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct RowWidget {
    pub id: WidgetId,
    pub row: Row,
    pub image: Option<WidgetId>,
}

#[derive(Debug, Default)]
enum RegionContent {
    #[default]
    Empty,
    Loading,
    Notice(String),
    List(Vec<RowWidget>),
}

#[derive(Debug, Default)]
pub(super) struct RegionState {
    content: RegionContent,
    pub(super) cursor: ListState,
}

#[derive(Debug)]
struct Widget {
    destroyed: CancellationToken,
    bitmap: Option<Bitmap>,
}

/// The retained screen model. Regions hold rows; rows own widgets; every
/// widget carries a token that is cancelled when the widget is destroyed.
#[derive(Debug, Default)]
pub struct Screen {
    guilds: RegionState,
    channels: RegionState,
    messages: RegionState,

    focus: Region,

    widgets: HashMap<WidgetId, Widget>,
    next_widget: u64,
}

impl Screen {
    #[must_use]
    pub const fn focus(&self) -> Region {
        self.focus
    }

    pub fn set_focus(&mut self, region: Region) {
        self.focus = region;
    }

    pub(super) const fn region(&self, region: Region) -> &RegionState {
        match region {
            Region::Guilds => &self.guilds,
            Region::Channels => &self.channels,
            Region::Messages => &self.messages,
        }
    }

    pub(super) fn region_mut(&mut self, region: Region) -> &mut RegionState {
        match region {
            Region::Guilds => &mut self.guilds,
            Region::Channels => &mut self.channels,
            Region::Messages => &mut self.messages,
        }
    }

    /// The region's rows; empty unless it is showing a list.
    #[must_use]
    pub fn rows(&self, region: Region) -> &[RowWidget] {
        match &self.region(region).content {
            RegionContent::List(rows) => rows,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn shows_list(&self, region: Region) -> bool {
        matches!(self.region(region).content, RegionContent::List(..))
    }

    #[must_use]
    pub const fn is_loading(&self, region: Region) -> bool {
        matches!(self.region(region).content, RegionContent::Loading)
    }

    #[must_use]
    pub fn notice(&self, region: Region) -> Option<&str> {
        match &self.region(region).content {
            RegionContent::Notice(notice) => Some(notice),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_alive(&self, widget: WidgetId) -> bool {
        self.widgets.contains_key(&widget)
    }

    #[must_use]
    pub fn bitmap(&self, widget: WidgetId) -> Option<&Bitmap> {
        self.widgets.get(&widget).and_then(|w| w.bitmap.as_ref())
    }

    #[must_use]
    pub fn cursor(&self, region: Region) -> Option<usize> {
        self.region(region)
            .cursor
            .selected()
            .filter(|index| *index < self.rows(region).len())
    }

    /// The row under the cursor, as the index the owning pane knows it by.
    #[must_use]
    pub fn activated_row(&self, region: Region) -> Option<usize> {
        self.cursor(region)
    }

    pub fn move_cursor(&mut self, region: Region, movement: Movement) {
        let num_rows = self.rows(region).len();
        if num_rows == 0 {
            return;
        }
        let last = num_rows - 1;
        let cursor = &mut self.region_mut(region).cursor;

        let next = match (movement, cursor.selected()) {
            (Movement::Top, _) | (Movement::Down, None) => 0,
            (Movement::Bottom, _) | (Movement::Up, None) => last,
            // wrap around at either end
            (Movement::Up, Some(0)) => last,
            (Movement::Up, Some(index)) => (index - 1).min(last),
            (Movement::Down, Some(index)) if index >= last => 0,
            (Movement::Down, Some(index)) => index + 1,
        };
        cursor.select(Some(next));
    }

    /// The full name of the guild under the cursor, which the guild column
    /// is too narrow to show inline.
    #[must_use]
    pub fn tooltip(&self) -> Option<&str> {
        let index = self.cursor(Region::Guilds)?;
        match &self.rows(Region::Guilds).get(index)?.row {
            Row::Guild { tooltip } => Some(tooltip),
            _ => None,
        }
    }

    fn create_widget(&mut self) -> WidgetId {
        let id = WidgetId(self.next_widget);
        self.next_widget += 1;
        self.widgets.insert(
            id,
            Widget {
                destroyed: CancellationToken::new(),
                bitmap: None,
            },
        );
        id
    }

    fn destroy_widget(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.remove(&id) {
            widget.destroyed.cancel();
        }
    }
}

impl View for Screen {
    fn replace_content(&mut self, region: Region, content: Content) {
        let state = self.region_mut(region);
        let old = std::mem::replace(
            &mut state.content,
            match content {
                Content::Empty => RegionContent::Empty,
                Content::Loading => RegionContent::Loading,
                Content::Notice(notice) => RegionContent::Notice(notice),
                Content::List => RegionContent::List(vec![]),
            },
        );
        state.cursor = ListState::default();

        if let RegionContent::List(rows) = old {
            for row in rows {
                self.destroy_widget(row.id);
                if let Some(image) = row.image {
                    self.destroy_widget(image);
                }
            }
        }
    }

    fn append_row(&mut self, region: Region, row: Row) -> Option<RowHandle> {
        if !self.shows_list(region) {
            return None;
        }

        let id = self.create_widget();
        let image = row.has_image().then(|| self.create_widget());

        let state = self.region_mut(region);
        let RegionContent::List(rows) = &mut state.content else {
            return None;
        };

        let old_len = rows.len();
        rows.push(RowWidget { id, row, image });

        match region {
            // keep following the newest message unless the user scrolled away
            Region::Messages => {
                let at_tail = state
                    .cursor
                    .selected()
                    .is_none_or(|index| index + 1 >= old_len);
                if at_tail {
                    state.cursor.select(Some(old_len));
                }
            }
            Region::Guilds | Region::Channels => {
                if state.cursor.selected().is_none() {
                    state.cursor.select(Some(0));
                }
            }
        }

        Some(RowHandle { row: id, image })
    }

    fn destroy_notify(&self, widget: WidgetId) -> Option<CancellationToken> {
        self.widgets.get(&widget).map(|w| w.destroyed.clone())
    }

    fn set_bitmap(&mut self, widget: WidgetId, bitmap: Bitmap) -> bool {
        self.widgets.get_mut(&widget).is_some_and(|w| {
            w.bitmap = Some(bitmap);
            true
        })
    }
}

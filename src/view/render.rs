use super::{
    bitmap::{Bitmap, THUMBNAIL_SIZE},
    markup,
    screen::Screen,
    Region, Row, WidgetId,
};
use ratatui::{
    prelude::*,
    widgets::{Block, List, ListItem, Paragraph, StatefulWidget, Wrap},
};

const GUILD_COLUMN_WIDTH: u16 = THUMBNAIL_SIZE as u16 + 4;
const CHANNEL_COLUMN_WIDTH: u16 = 24;

/// Draws the three columns of `screen` into `area`.
pub fn render_screen(frame: &mut Frame, area: Rect, screen: &mut Screen) {
    let columns = Layout::horizontal([
        Constraint::Length(GUILD_COLUMN_WIDTH),
        Constraint::Length(CHANNEL_COLUMN_WIDTH),
        Constraint::Min(20),
    ])
    .split(area);

    for (region, area) in [Region::Guilds, Region::Channels, Region::Messages]
        .into_iter()
        .zip(columns.iter().copied())
    {
        render_region(frame, area, screen, region);
    }
}

fn render_region(frame: &mut Frame, area: Rect, screen: &mut Screen, region: Region) {
    let focused = screen.focus() == region;
    let border = if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let title = match region {
        Region::Guilds => " Guilds ",
        Region::Channels => " Channels ",
        Region::Messages => " Messages ",
    };
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(border));

    if let Some(notice) = screen.notice(region) {
        let notice = Paragraph::new(notice.to_string())
            .style(Style::default().red())
            .wrap(Wrap::default())
            .block(block);
        frame.render_widget(notice, area);
        return;
    }
    if screen.is_loading(region) {
        let loading = Paragraph::new("Loading…")
            .style(Style::default().gray().italic())
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let block = match (region, screen.tooltip()) {
        (Region::Guilds, Some(name)) if focused => {
            block.title_bottom(Line::from(format!(" {name} ")).bold())
        }
        _ => block,
    };

    let items: Vec<ListItem<'static>> = screen
        .rows(region)
        .iter()
        .map(|widget| list_item(screen, &widget.row, widget.image))
        .collect();

    let highlight = if focused {
        Style::default().bold().bg(Color::Rgb(45, 50, 60))
    } else {
        Style::default().bg(Color::Rgb(30, 32, 36))
    };
    let list = List::new(items).block(block).highlight_style(highlight);

    StatefulWidget::render(
        list,
        area,
        frame.buffer_mut(),
        &mut screen.region_mut(region).cursor,
    );
}

fn list_item(screen: &Screen, row: &Row, image: Option<WidgetId>) -> ListItem<'static> {
    let image = || thumbnail(image.and_then(|widget| screen.bitmap(widget)));

    match row {
        Row::Guild { .. } => ListItem::new(image().into_iter().map(Line::from).collect::<Vec<_>>()),
        Row::Channel { label } => ListItem::new(label.clone()),
        Row::FullMessage { author, body } => {
            let mut cells = image().into_iter();
            let mut body = body_lines(body).into_iter();

            let mut first = cells.next().unwrap_or_default();
            first.push(Span::raw(" "));
            first.extend(markup::to_spans(author, Style::default()));

            let mut lines = vec![Line::from(first)];
            for mut line in cells {
                line.push(Span::raw(" "));
                line.push(Span::raw(body.next().unwrap_or_default()));
                lines.push(Line::from(line));
            }
            lines.extend(body.map(|text| Line::from(indented(text))));
            ListItem::new(lines)
        }
        Row::CompactMessage { body } => ListItem::new(
            body_lines(body)
                .into_iter()
                .map(|text| Line::from(indented(text)))
                .collect::<Vec<_>>(),
        ),
    }
}

/// At least one line, so an empty body still takes up a row.
fn body_lines(body: &str) -> Vec<String> {
    let lines: Vec<String> = body.lines().map(str::to_string).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn indented(text: String) -> Vec<Span<'static>> {
    vec![Span::raw(" ".repeat(THUMBNAIL_SIZE as usize + 1)), Span::raw(text)]
}

/// The image's cells, or a blank square of the same size while it loads.
fn thumbnail(bitmap: Option<&Bitmap>) -> Vec<Vec<Span<'static>>> {
    bitmap.map_or_else(
        || {
            let placeholder = Span::styled(
                " ".repeat(THUMBNAIL_SIZE as usize),
                Style::default().bg(Color::DarkGray),
            );
            vec![vec![placeholder]; THUMBNAIL_SIZE.div_ceil(2) as usize]
        },
        Bitmap::to_cells,
    )
}

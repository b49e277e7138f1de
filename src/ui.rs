use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::{GlobeLayers, Tooltip};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_globe(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.highlighted_name() {
        Some(name) => format!(" Globe · {name} "),
        None => " Globe ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Nothing interactive until the country data is in
    if !app.is_ready() {
        let y = inner.y + inner.height / 2;
        let line = Rect::new(inner.x, y, inner.width, 1.min(inner.height));
        frame.render_widget(
            Paragraph::new("Loading...")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White)),
            line,
        );
        return;
    }

    let layers = app.layers(inner.width as usize, inner.height as usize);

    let cursor = app.mouse_pos.and_then(|(col, row)| {
        let (cx, cy) = (col.checked_sub(inner.x)?, row.checked_sub(inner.y)?);
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(GlobeWidget { layers, cursor }, inner);
}

/// Braille globe with the tooltip overlaid
struct GlobeWidget {
    layers: GlobeLayers,
    cursor: Option<(u16, u16)>,
}

impl GlobeWidget {
    /// Paint a Braille layer in one color, leaving blank cells untouched so
    /// layers underneath show through.
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (col, row, ch) in canvas.glyphs() {
            if col >= area.width as usize || row >= area.height as usize {
                continue;
            }
            let (x, y) = (area.x + col as u16, area.y + row as u16);
            buf[(x, y)].set_char(ch).set_fg(color);
        }
    }

    fn render_tooltip(tip: &Tooltip, area: Rect, buf: &mut Buffer) {
        if tip.row >= area.height {
            return;
        }
        let style = Style::default()
            .fg(Color::White)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD);
        let y = area.y + tip.row;
        for (i, ch) in tip.text.chars().enumerate() {
            let x = area.x + tip.col + i as u16;
            if x >= area.x + area.width {
                break;
            }
            buf[(x, y)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let l = &self.layers;
        // Back to front
        Self::render_layer(&l.stars, Color::Gray, area, buf);
        Self::render_layer(&l.night, Color::DarkGray, area, buf);
        Self::render_layer(&l.day, Color::Blue, area, buf);
        Self::render_layer(&l.borders_night, Color::DarkGray, area, buf);
        Self::render_layer(&l.borders_day, Color::Cyan, area, buf);
        Self::render_layer(&l.limb, Color::LightBlue, area, buf);
        Self::render_layer(&l.moon, Color::White, area, buf);
        Self::render_layer(&l.highlight, Color::Yellow, area, buf);

        if let Some(tip) = &l.tooltip {
            Self::render_tooltip(tip, area, buf);
        }

        if let Some((cx, cy)) = self.cursor {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let country = match (app.is_ready(), app.highlighted_name()) {
        (false, _) => Span::styled("loading countries", dim),
        (true, Some(name)) => Span::styled(name.to_string(), Style::default().fg(Color::Yellow)),
        (true, None) => Span::styled("—", dim),
    };
    let coords = match (app.cursor_coords(), app.center_coords()) {
        (Some(cursor), _) => cursor,
        (None, Some(center)) => format!("centre {center}"),
        (None, None) => "off globe".to_string(),
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        country,
        Span::styled(" | ", dim),
        Span::styled(coords, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | drag:orbit hjkl:orbit +/-:zoom c:centre r:reset q:quit",
            dim,
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

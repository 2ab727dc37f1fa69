use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // now playing
            Constraint::Length(3), // progress
            Constraint::Min(3),    // queue
            Constraint::Length(1), // status
            Constraint::Length(1), // help
        ])
        .split(frame.area());

    draw_now_playing(frame, chunks[0], app);
    draw_progress(frame, chunks[1], app);
    draw_queue(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);
    draw_help(frame, chunks[4]);
}

fn draw_now_playing(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title(" Now Playing ");

    let lines = match app.player.current_track() {
        Some(track) => vec![
            Line::from(Span::styled(
                track.display_title().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(track.artist.clone().unwrap_or_else(|| "Unknown Artist".to_string())),
            Line::from(track.album.clone().unwrap_or_default()),
        ],
        None => vec![Line::from("Nothing loaded")],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_progress(frame: &mut Frame, area: Rect, app: &App) {
    let label = format!(
        "{} / {}",
        format_time(app.player.position_secs()),
        format_time(app.player.duration_secs())
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(f64::from(app.player.percent() / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn draw_queue(frame: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .player
        .queue()
        .tracks()
        .iter()
        .map(|t| ListItem::new(t.display_title().to_string()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Queue "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.queue_state);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::raw(format!(
            " {} ",
            if app.player.is_playing() { "▶" } else { "⏸" }
        )),
        Span::raw(format!("Repeat: {} ", app.player.repeat())),
        Span::raw(format!(
            "Shuffle: {} ",
            if app.player.shuffle_enabled() { "on" } else { "off" }
        )),
        Span::raw(format!("Vol: {:.0}% ", app.player.volume() * 100.0)),
        Span::styled(app.status.clone(), Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = " space play/pause | n next | p prev | r repeat | s shuffle | +/- volume | 0 restart | q quit";
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn format_time(seconds: f32) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }
    let mins = (seconds / 60.0).floor() as u32;
    let secs = (seconds % 60.0).floor() as u32;
    format!("{:02}:{:02}", mins, secs)
}

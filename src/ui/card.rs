//! Profile card rendering
//!
//! [`card_view`] maps the current [`FetchOutcome`] onto one of four card
//! states; [`render`] draws that state as a centered modal. Nothing here
//! talks to the cache or the network.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::data::Profile;
use crate::resource::FetchOutcome;

const CARD_WIDTH: u16 = 64;
const CARD_HEIGHT: u16 = 14;

/// What the card shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardView<'a> {
    /// Loading indicator
    Loading,
    /// Populated profile summary
    Summary(&'a Profile),
    /// Rate-limit notice with a retry action
    RateLimitNotice { retry_after: Option<&'a str> },
    /// Generic failure notice with a retry action
    FailureNotice { reason: &'a str },
}

/// Maps an outcome to the card state that displays it
pub fn card_view(outcome: &FetchOutcome<Profile>) -> CardView<'_> {
    match outcome {
        FetchOutcome::Loading => CardView::Loading,
        FetchOutcome::Success { data } => CardView::Summary(data),
        FetchOutcome::RateLimited { retry_after } => CardView::RateLimitNotice {
            retry_after: retry_after.as_deref(),
        },
        FetchOutcome::Failed { reason } => CardView::FailureNotice { reason },
    }
}

/// Formats a count the way GitHub does (`950`, `1.2k`, `21k`, `3.4m`)
pub fn compact_count(n: u32) -> String {
    fn scaled(value: f64, suffix: &str) -> String {
        let text = format!("{:.1}", value);
        let text = text.strip_suffix(".0").unwrap_or(&text);
        format!("{}{}", text, suffix)
    }

    match n {
        0..=999 => n.to_string(),
        1_000..=999_949 => scaled(f64::from(n) / 1_000.0, "k"),
        _ => scaled(f64::from(n) / 1_000_000.0, "m"),
    }
}

fn retry_hint() -> Line<'static> {
    Line::from(vec![
        Span::raw("Press "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" to retry"),
    ])
}

/// Builds the card body for a view
pub fn card_lines(view: &CardView<'_>) -> Vec<Line<'static>> {
    match view {
        CardView::Loading => vec![Line::from(Span::styled(
            "Loading profile...",
            Style::default().fg(Color::Cyan),
        ))],
        CardView::Summary(profile) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    profile.display_name().to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("@{}", profile.login),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
            ];
            if let Some(bio) = profile.short_bio() {
                lines.push(Line::from(bio.to_string()));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(vec![
                Span::styled(
                    compact_count(profile.public_repos),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" repos  "),
                Span::styled(
                    compact_count(profile.followers),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" followers  "),
                Span::styled(
                    compact_count(profile.following),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(" following"),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Profile ", Style::default().fg(Color::DarkGray)),
                Span::styled(profile.html_url.clone(), Style::default().fg(Color::Blue)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Avatar  ", Style::default().fg(Color::DarkGray)),
                Span::raw(profile.avatar_url.clone()),
            ]));
            lines
        }
        CardView::RateLimitNotice { retry_after } => {
            let when = match retry_after {
                Some(time) => format!("Try again after {}.", time),
                None => "Try again soon.".to_string(),
            };
            vec![
                Line::from(Span::styled(
                    "GitHub rate limit reached.",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(when),
                Line::from(""),
                retry_hint(),
            ]
        }
        CardView::FailureNotice { reason } => vec![
            Line::from(Span::styled(
                reason.to_string(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            retry_hint(),
        ],
    }
}

/// Renders the card as plain text, one line per card line
pub fn plain_text(view: &CardView<'_>) -> String {
    card_lines(view)
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the card modal for the current outcome
pub fn render(frame: &mut Frame, outcome: &FetchOutcome<Profile>) {
    let area = card_area(frame.area());
    let view = card_view(outcome);

    let border_color = match view {
        CardView::Loading | CardView::Summary(_) => Color::Cyan,
        CardView::RateLimitNotice { .. } => Color::Yellow,
        CardView::FailureNotice { .. } => Color::Red,
    };

    let block = Block::default()
        .title(" Profile ")
        .title_bottom(Line::from(" Esc close · ? help ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let paragraph = Paragraph::new(card_lines(&view))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn card_area(area: Rect) -> Rect {
    centered_rect(CARD_WIDTH.min(area.width), CARD_HEIGHT.min(area.height), area)
}

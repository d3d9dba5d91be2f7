// ============================================================================
// Convertisseur - Rendu de l'interface
// ============================================================================
// Un seul écran :
//
//   ┌ solconv ──────────────────────────────────────┐
//   │ 1 SOL = $240 = 1,000,000,000 LP    [fallback] │
//   │ 2 SOL = $480 = 2,000,000,000 LP               │
//   └───────────────────────────────────────────────┘
//   ┌ Solana Amount ─────────────────  [Enter] Copy ┐
//   │ 2█                                            │
//   └───────────────────────────────────────────────┘
//   ... Lamports Amount, USD Amount ...
//   ┌───────────────────────────────────────────────┐
//   │ [Tab] Next field  [Enter] Copy  [Esc] Quit    │
//   └───────────────────────────────────────────────┘
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{format_grouped, Field, PriceState, LAMPORTS_PER_SOL};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    for (field, area) in Field::ALL.into_iter().zip(chunks[1..4].iter()) {
        render_field(frame, app, field, *area);
    }
    render_footer(frame, app, chunks[5]);
}

/// Découpe l'écran : en-tête, trois champs, espace libre, footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // En-tête : taux + résumé
            Constraint::Length(3), // SOL
            Constraint::Length(3), // Lamports
            Constraint::Length(3), // USD
            Constraint::Min(0),    // Espace libre
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// En-tête : taux et résumé
// ============================================================================

/// Ligne du taux : "1 SOL = $240 = 1,000,000,000 LP"
pub fn rate_line(app: &App) -> String {
    format!(
        "1 SOL = ${} = {} LP",
        format_grouped(app.rate().usd_per_sol(), 4),
        format_grouped(LAMPORTS_PER_SOL, 0)
    )
}

/// Ligne de résumé : "2 SOL = $480 = 2,000,000,000 LP"
pub fn summary_line(app: &App) -> String {
    let amounts = app.amounts();
    format!(
        "{} SOL = ${} = {} LP",
        format_grouped(amounts.sol, 12),
        format_grouped(amounts.usd, 4),
        format_grouped(amounts.lamports, 12)
    )
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" solconv ")
        .title_alignment(Alignment::Center);

    // Couleur de la source du prix : vert si cotation réelle
    let (source_text, source_color) = match app.price_state() {
        PriceState::Fetched { fetched_at, .. } => (
            format!("  [live {}]", fetched_at.format("%H:%M:%S UTC")),
            Color::Green,
        ),
        PriceState::Fetching => ("  [loading]".to_string(), Color::Yellow),
        state => (format!("  [{}]", state.source_label()), Color::Gray),
    };

    let text = vec![
        Line::from(vec![
            Span::styled(
                rate_line(app),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(source_text, Style::default().fg(source_color)),
        ]),
        Line::from(Span::styled(
            summary_line(app),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Champs de saisie
// ============================================================================

fn render_field(frame: &mut Frame, app: &App, field: Field, area: Rect) {
    let focused = app.focused == field;
    let border_color = if focused { Color::Green } else { Color::DarkGray };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", field.label()));

    if focused {
        block = block.title(
            Title::from(Span::styled(
                " [Enter] Copy ",
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Right),
        );
    }

    let mut spans = vec![Span::styled(
        app.display(field).to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : raccourcis, statut, confirmation de quit
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[Esc]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Some(message) = &app.status_message {
        Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
    } else {
        let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("[Tab/↑↓]", key_style),
            Span::raw(" Field  "),
            Span::styled("[Enter]", key_style),
            Span::raw(" Copy  "),
            Span::styled("[Ctrl+U]", key_style),
            Span::raw(" Clear  "),
            Span::styled("[Esc]", key_style),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

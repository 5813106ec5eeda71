//! Pelmeni Tapper rendering: counters, the tappable pelmeni, shop, footer,
//! export panel.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};

use super::actions;
use super::logic::{can_afford, format_number};
use super::save::SnapshotStore;
use super::scheduler::IntervalHost;
use super::state::GameState;
use super::{Effects, TapperGame};

/// Pelmeni art, 3 lines x 11 cols. Idle frames wobble slowly.
const PELMENI_ART: &[&[&str]] = &[
    &["  ╭─────╮  ", " ╭╯ ◠ ◠ ╰╮ ", " ╰───────╯ "],
    &["  ╭─────╮  ", " ╭╯ ◡ ◡ ╰╮ ", " ╰───────╯ "],
];

/// Pressed state while a tap is being acknowledged.
const PELMENI_SQUISH_ART: &[&str] = &["           ", " ╭───────╮ ", "╰──◡───◡──╯"];

const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

pub fn render<S: SnapshotStore + 'static, H: IntervalHost>(
    game: &TapperGame<S, H>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    if let Some(bg) = game.background {
        f.render_widget(Block::default().style(Style::default().bg(bg)), area);
    }

    let state = game.session().state();
    let effects = &game.effects;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    render_title(effects, f, chunks[0]);

    let body = chunks[1];
    let (display_area, shop_area) = if is_narrow_layout(area.width) {
        let v = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(6)])
            .split(body);
        (v[0], v[1])
    } else {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);
        (h[0], h[1])
    };

    render_pelmeni(&state, effects, f, display_area, click_state);
    render_shop(&state, effects, f, shop_area, click_state);

    if game.reset_armed {
        render_reset_prompt(f, chunks[2], click_state);
    } else {
        render_footer(&state, f, chunks[2], click_state);
    }

    // Drawn last so its click target sits above everything else.
    if game.show_export {
        render_export(&game.session().export(), f, body, click_state);
    }
}

fn render_title(effects: &Effects, f: &mut Frame, area: Rect) {
    let style = if effects.purchase_flash > 0 {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let title = if effects.purchase_flash > 0 {
        "✦ Пельмени-тапалка ✦"
    } else {
        "Пельмени-тапалка"
    };
    let widget = Paragraph::new(Line::from(Span::styled(title, style)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_pelmeni(
    state: &GameState,
    effects: &Effects,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let art = if effects.squish > 0 {
        PELMENI_SQUISH_ART
    } else {
        let idx = (effects.anim_frame / 5) as usize % PELMENI_ART.len();
        PELMENI_ART[idx]
    };
    let art_color = if effects.squish > 0 { Color::White } else { Color::Yellow };

    let spinner = if state.per_second > 0 {
        SPINNER[(effects.anim_frame / 3) as usize % SPINNER.len()]
    } else {
        ' '
    };
    let rate_style = if effects.pulse > 0 {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        format!("🥟 {}", format_number(state.resource)),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))];
    lines.extend(
        art.iter()
            .map(|row| Line::from(Span::styled(*row, Style::default().fg(art_color)))),
    );
    lines.push(Line::from(vec![
        Span::styled(
            format!("+{} за тап", format_number(state.per_tap)),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{spinner} +{}/сек", format_number(state.per_second)),
            rate_style,
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "[C] ТАП!",
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD),
    )));

    let border_color = if effects.squish > 0 { Color::White } else { Color::Yellow };
    let borders = if area.width >= 60 { Borders::ALL } else { Borders::TOP | Borders::BOTTOM };
    let widget = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(borders)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(widget, area);

    render_particles(effects, f, area);
    render_floaters(effects, f, area);

    click_state.borrow_mut().add_click_target(area, actions::TAP);
}

/// Mini pelmeni flying outward from the centre of the display.
fn render_particles(effects: &Effects, f: &mut Frame, area: Rect) {
    let center_x = (area.x + area.width / 2) as f32;
    let center_y = (area.y + area.height / 2) as f32;

    for particle in &effects.particles {
        let progress = 1.0 - particle.life as f32 / particle.max_life.max(1) as f32;
        let x = (center_x + particle.dx * progress).round();
        let y = (center_y + particle.dy * progress).round();
        if x < area.x as f32 || y < area.y as f32 {
            continue;
        }
        let (x, y) = (x as u16, y as u16);
        if x >= area.x + area.width || y >= area.y + area.height {
            continue;
        }
        let (glyph, color) = if particle.life > particle.max_life / 2 {
            ("●", Color::Yellow)
        } else {
            ("·", Color::DarkGray)
        };
        f.render_widget(
            Paragraph::new(Span::styled(glyph, Style::default().fg(color))),
            Rect::new(x, y, 1, 1),
        );
    }
}

/// Floating "+N" overlays rising from the bottom of the pelmeni display.
fn render_floaters(effects: &Effects, f: &mut Frame, area: Rect) {
    let center_x = area.x + area.width / 2;
    let base_y = area.y + area.height;

    for floater in &effects.floaters {
        let progress = 1.0 - floater.life as f32 / floater.max_life.max(1) as f32;
        let rise = (progress * 5.0) as u16;
        let y = base_y.saturating_sub(2 + rise);
        let x = (center_x as i16 + floater.col_offset).max(area.x as i16) as u16;
        let color = if floater.life > floater.max_life * 2 / 3 {
            Color::White
        } else if floater.life > floater.max_life / 3 {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        if y < area.y || y >= area.y + area.height || x >= area.x + area.width {
            continue;
        }
        let text_len = floater.text.chars().count() as u16;
        let width = text_len.min(area.x + area.width - x);
        if width == 0 {
            continue;
        }
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        f.render_widget(
            Paragraph::new(Span::styled(floater.text.as_str(), style)),
            Rect::new(x, y, width, 1),
        );
    }
}

fn render_shop(
    state: &GameState,
    effects: &Effects,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let border_color = if effects.denied_flash > 0 {
        Color::Red
    } else if effects.purchase_flash > 0 {
        Color::White
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Магазин ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = super::catalog::all()
        .iter()
        .enumerate()
        .map(|(i, upgrade)| {
            let affordable = can_afford(state, upgrade);
            let (key_style, text_style, cost_style) = if affordable {
                (
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::White),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                let dim = Style::default().fg(Color::DarkGray);
                (dim, dim, dim)
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), key_style),
                Span::styled(upgrade.title, text_style),
                Span::styled(format!("  {}", upgrade.description), text_style),
                Span::styled(format!("  🥟{}", format_number(upgrade.cost)), cost_style),
            ])
        })
        .collect();
    let count = lines.len();
    f.render_widget(Paragraph::new(lines), inner);

    let mut cs = click_state.borrow_mut();
    for i in 0..count {
        cs.add_row_target(inner, inner.y + i as u16, actions::BUY_UPGRADE_BASE + i as u16);
    }
}

fn footer_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_footer(
    state: &GameState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = footer_block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(11),
            Constraint::Length(13),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            format!("Тапов: {}", format_number(state.total_taps)),
            Style::default().fg(Color::Gray),
        )),
        cols[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled("[R] Сброс", Style::default().fg(Color::Red))),
        cols[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled("[E] Экспорт", Style::default().fg(Color::Cyan))),
        cols[2],
    );

    let mut cs = click_state.borrow_mut();
    cs.add_click_target(cols[1], actions::RESET);
    cs.add_click_target(cols[2], actions::TOGGLE_EXPORT);
}

fn render_reset_prompt(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let block = footer_block().border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(9),
            Constraint::Length(11),
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(Span::styled(
            "Сбросить весь прогресс?",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: true }),
        cols[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            "[R] Да",
            Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        cols[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled("[Esc] Нет", Style::default().fg(Color::Gray))),
        cols[2],
    );

    let mut cs = click_state.borrow_mut();
    cs.add_click_target(cols[1], actions::RESET_CONFIRM);
    cs.add_click_target(cols[2], actions::RESET_CANCEL);
}

/// Read-only JSON snapshot for the player to copy by hand.
fn render_export(json: &str, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let panel = centered(area, 56, 10);
    f.render_widget(Clear, panel);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Экспорт сохранения ")
        .title_bottom(Line::from(" [E]/[Esc] закрыть ").alignment(Alignment::Right));
    let widget = Paragraph::new(vec![
        Line::from(Span::styled(
            "Скопируйте строку ниже:",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(json, Style::default().fg(Color::White))),
    ])
    .wrap(Wrap { trim: false })
    .block(block);
    f.render_widget(widget, panel);

    click_state.borrow_mut().add_click_target(panel, actions::TOGGLE_EXPORT);
}

/// A `width` x `height` rect centred in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside() {
        let r = centered(Rect::new(0, 3, 80, 20), 56, 10);
        assert_eq!(r, Rect::new(12, 8, 56, 10));
    }

    #[test]
    fn centered_shrinks_to_area() {
        let r = centered(Rect::new(2, 2, 40, 6), 56, 10);
        assert_eq!(r, Rect::new(2, 2, 40, 6));
    }

    #[test]
    fn art_frames_share_dimensions() {
        for frame in PELMENI_ART.iter().chain(std::iter::once(&PELMENI_SQUISH_ART)) {
            assert_eq!(frame.len(), 3);
            for row in frame.iter() {
                assert_eq!(row.chars().count(), 11, "{row:?}");
            }
        }
    }
}

//! Bakery rendering: header, cookie button, producers, shop, achievements.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::*;
use super::save::KeyValueStore;
use super::{catalog, progress, shop_key, BakeryGame, Cookies};

/// Cookie art, 3 lines, 8 chars wide.
const COOKIE_ART: [&str; 3] = ["╭━●━●━╮ ", "━●━━●━●━", "╰━●━●━╯ "];

pub fn render<S: KeyValueStore>(
    game: &BakeryGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    // Side panel for achievements and log when wide enough.
    let (main_area, side_area) = if is_narrow_layout(area.width) {
        (area, None)
    } else {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    };

    let producer_rows = catalog::catalog().len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),             // header + cookie
            Constraint::Length(producer_rows), // producers
            Constraint::Min(4),                // shop
            Constraint::Length(4),             // notice + commands
        ])
        .split(main_area);

    render_header(game, f, chunks[0], click_state);
    render_producers(game, f, chunks[1], click_state);
    render_shop(game, f, chunks[2], click_state);
    render_footer(game, f, chunks[3], click_state);

    if let Some(side) = side_area {
        let side_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(progress::achievements().len() as u16 + 2),
                Constraint::Min(3),
            ])
            .split(side);
        render_achievements(game, f, side_chunks[0]);
        render_log(game, f, side_chunks[1]);
    }
}

/// Bakery name, totals and the cookie itself. The whole panel is the button.
fn render_header<S: KeyValueStore>(
    game: &BakeryGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let economy = game.session.economy();
    let title = if game.session.bakery_name().is_empty() {
        " Cookie Bakery ".to_string()
    } else {
        format!(" {} ", game.session.bakery_name())
    };

    let stats = [
        Line::from(vec![
            Span::styled(
                format!("{} cookies", format_cookies(economy.cookies())),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("{}/s", format_cookies(economy.total_yield_per_tick())),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            if economy.global_multiplier() > 1 {
                format!("production x{}", economy.global_multiplier())
            } else {
                String::new()
            },
            Style::default().fg(Color::Magenta),
        )),
    ];

    let lines: Vec<Line> = COOKIE_ART
        .iter()
        .zip(stats)
        .map(|(art, stat)| {
            let mut spans = vec![
                Span::styled(format!(" {art} "), Style::default().fg(Color::Rgb(200, 140, 60))),
            ];
            spans.extend(stat.spans);
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    f.render_widget(Paragraph::new(lines).block(block), area);

    click_state
        .borrow_mut()
        .add_click_target(area, CLICK_COOKIE);
}

fn render_producers<S: KeyValueStore>(
    game: &BakeryGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let economy = game.session.economy();
    let cookies = economy.cookies();

    // Highlight the affordable producer that pays for itself fastest.
    let best_payback = economy
        .upgrades()
        .iter()
        .filter(|u| cookies >= u.current_cost)
        .filter_map(|u| u.payback_ticks())
        .min();

    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "  key  producer            lvl      cost     +/s",
        Style::default().fg(Color::DarkGray),
    )));

    for (idx, upgrade) in economy.upgrades().iter().enumerate() {
        let can_afford = cookies >= upgrade.current_cost;
        let is_best = can_afford
            && upgrade.payback_ticks().is_some()
            && upgrade.payback_ticks() == best_payback;

        let key_style = if is_best {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else if can_afford {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if can_afford {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let boost = if upgrade.boost > 1 {
            format!(" x{}", upgrade.boost)
        } else {
            String::new()
        };

        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!("  [{}] ", upgrade.def.key), key_style),
                Span::styled(format!("{:<18}", upgrade.def.name), text_style),
                Span::styled(format!("{:>4}", upgrade.level), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:>10}", format_cookies(upgrade.current_cost)), text_style),
                Span::styled(
                    format!("{:>8}", format!("+{}", format_cookies(upgrade.next_level_gain()))),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(boost, Style::default().fg(Color::Magenta)),
            ]),
            BUY_PRODUCER_BASE + idx as u16,
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Producers ");

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_shop<S: KeyValueStore>(
    game: &BakeryGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let cookies = game.session.economy().cookies();
    let mut cl = ClickableList::new();

    for (display_idx, (idx, item)) in game.session.shop().available().enumerate() {
        let Some(key) = shop_key(display_idx) else {
            break;
        };
        let can_afford = cookies >= item.cost;
        let (key_style, text_style) = if can_afford {
            (
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                Style::default().fg(Color::White),
            )
        } else {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
            )
        };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!("  [{key}] "), key_style),
                Span::styled(format!("{:<20}", item.name), text_style),
                Span::styled(format!("{:>10} ", format_cookies(item.cost)), text_style),
                Span::styled(item.description, Style::default().fg(Color::Cyan)),
            ]),
            BUY_SHOP_BASE + idx as u16,
        );
    }

    if cl.is_empty() {
        cl.push(Line::from(Span::styled(
            "  Everything bought. Nice bakery!",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Shop ");

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

/// Notice line plus the command bar, or the reset prompt while confirming.
fn render_footer<S: KeyValueStore>(
    game: &BakeryGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();

    let notice = game.notice.as_ref().map_or(String::new(), |n| n.text.clone());
    cl.push(Line::from(Span::styled(
        format!(" {notice}"),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));

    let hint = Style::default().fg(Color::DarkGray);
    if let Some(draft) = &game.name_draft {
        cl.push(Line::from(vec![
            Span::styled(" Bakery name: ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{draft}_"),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        cl.push(Line::from(Span::styled(" Enter to keep, Esc to cancel", hint)));
    } else if game.confirm_reset {
        cl.push_clickable(
            Line::from(Span::styled(
                " Reset all progress? [Y] yes",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            RESET_CONFIRM,
        );
        // Second row so cancel gets its own target.
        cl.push_clickable(Line::from(Span::styled(" [N] keep baking", hint)), RESET_CANCEL);
    } else {
        cl.push_clickable(Line::from(Span::styled(" [C] bake a cookie", hint)), CLICK_COOKIE);
        cl.push_clickable(Line::from(Span::styled(" [S] save", hint)), SAVE_GAME);
    }

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);

    // Rename and reset sit on the right half of the command rows.
    if game.name_draft.is_none() && !game.confirm_reset && area.height >= 4 {
        let half = area.width / 2;
        let side_buttons = [
            (2, "[M] rename", Color::Cyan, RENAME_BAKERY),
            (3, "[R] reset", Color::Red, RESET_REQUEST),
        ];
        for (row, label, color, action_id) in side_buttons {
            let rect = Rect::new(area.x + half, area.y + row, area.width - half, 1);
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(label, Style::default().fg(color)))),
                rect,
            );
            click_state.borrow_mut().add_click_target(rect, action_id);
        }
    }
}

fn render_achievements<S: KeyValueStore>(game: &BakeryGame<S>, f: &mut Frame, area: Rect) {
    let tracker = game.session.progress();
    let lines: Vec<Line> = progress::achievements()
        .iter()
        .map(|a| {
            if tracker.is_unlocked(a.id) {
                Line::from(Span::styled(
                    format!(" ★ {}", a.name),
                    Style::default().fg(Color::Yellow),
                ))
            } else {
                Line::from(Span::styled(" ☆ ???", Style::default().fg(Color::DarkGray)))
            }
        })
        .collect();

    let title = format!(
        " Achievements {}/{} ",
        tracker.unlocked_count(),
        progress::achievements().len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_log<S: KeyValueStore>(game: &BakeryGame<S>, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let log = game.session.log();
    let lines: Vec<Line> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!(" {}", entry.text), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Log ");
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Format a cookie count with commas (e.g. 1234567 → "1,234,567").
pub fn format_cookies(n: Cookies) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_cookies_basic() {
        assert_eq!(format_cookies(0), "0");
        assert_eq!(format_cookies(123), "123");
        assert_eq!(format_cookies(1234), "1,234");
        assert_eq!(format_cookies(1_234_567), "1,234,567");
        assert_eq!(format_cookies(100_000), "100,000");
    }

    #[test]
    fn format_cookies_max() {
        assert_eq!(format_cookies(u64::MAX), "18,446,744,073,709,551,615");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn format_cookies_strips_back_to_value(n in any::<u64>()) {
            let s = format_cookies(n);
            let digits: String = s.chars().filter(|c| *c != ',').collect();
            prop_assert_eq!(digits.parse::<u64>().unwrap(), n);
        }

        #[test]
        fn format_cookies_groups_of_three(n in any::<u64>()) {
            let s = format_cookies(n);
            let groups: Vec<&str> = s.split(',').collect();
            prop_assert!(!groups[0].is_empty() && groups[0].len() <= 3);
            for g in &groups[1..] {
                prop_assert_eq!(g.len(), 3);
            }
        }
    }
}

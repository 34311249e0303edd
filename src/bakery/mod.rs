//! Cookie Bakery: click for cookies, buy producers, unlock achievements.

pub mod actions;
pub mod catalog;
pub mod economy;
pub mod error;
pub mod progress;
pub mod render;
pub mod save;
pub mod session;
pub mod shop;
pub mod upgrade;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use actions::*;
use error::EconomyError;
use save::KeyValueStore;
use session::{GameSession, Notification};

/// Currency amount. Never negative; accrual saturates.
pub type Cookies = u64;

/// How long a notice stays on screen, in ticks.
const NOTICE_TICKS: u32 = 3;

/// A transient message shown above the help bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub text: String,
    pub ticks_left: u32,
}

/// Browser-facing wrapper: maps keys and clicks onto session intents and
/// turns notifications into on-screen notices.
pub struct BakeryGame<S: KeyValueStore> {
    pub session: GameSession<S>,
    /// Reset waits for an explicit confirmation.
    pub confirm_reset: bool,
    pub notice: Option<Notice>,
    /// Name being typed; `Some` while the rename prompt is open.
    pub name_draft: Option<String>,
}

impl<S: KeyValueStore> BakeryGame<S> {
    pub fn new(store: S) -> Self {
        Self {
            session: GameSession::start(store),
            confirm_reset: false,
            notice: None,
            name_draft: None,
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        };
        self.pump_notifications();
        consumed
    }

    fn handle_key(&mut self, key: char) -> bool {
        if self.name_draft.is_some() {
            return self.edit_name(key);
        }
        let key = key.to_ascii_lowercase();
        if self.confirm_reset {
            return match key {
                'y' => self.handle_click(RESET_CONFIRM),
                'n' | KEY_ESCAPE => self.handle_click(RESET_CANCEL),
                _ => false,
            };
        }
        match key {
            'c' | ' ' => self.handle_click(CLICK_COOKIE),
            's' => self.handle_click(SAVE_GAME),
            'm' => self.handle_click(RENAME_BAKERY),
            'r' => self.handle_click(RESET_REQUEST),
            _ => {
                if let Some(idx) = catalog::catalog().iter().position(|d| d.key == key) {
                    return self.handle_click(BUY_PRODUCER_BASE + idx as u16);
                }
                if let Some(idx) = shop_display_index(key) {
                    let real = self.session.shop().available().nth(idx).map(|(i, _)| i);
                    if let Some(real) = real {
                        return self.handle_click(BUY_SHOP_BASE + real as u16);
                    }
                }
                false
            }
        }
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        match action_id {
            CLICK_COOKIE => self.session.on_cookie_click(),
            SAVE_GAME => {
                self.session.on_save_requested();
                self.show_notice("Saved.");
            }
            RENAME_BAKERY => {
                self.name_draft = Some(self.session.bakery_name().to_string());
            }
            RESET_REQUEST => self.confirm_reset = true,
            RESET_CONFIRM if self.confirm_reset => {
                self.confirm_reset = false;
                self.session.on_reset_confirmed();
            }
            RESET_CANCEL => self.confirm_reset = false,
            id if (BUY_PRODUCER_BASE..BUY_SHOP_BASE).contains(&id) => {
                let idx = (id - BUY_PRODUCER_BASE) as usize;
                let Some(def) = catalog::catalog().get(idx) else {
                    return false;
                };
                let _ = self.session.on_purchase(def.id);
            }
            id if id >= BUY_SHOP_BASE => {
                let idx = (id - BUY_SHOP_BASE) as usize;
                let Some(item) = shop::shop_items().get(idx) else {
                    return false;
                };
                let _ = self.session.on_shop_purchase(item.id);
            }
            _ => return false,
        }
        true
    }

    /// Rename prompt keys: Enter commits, Esc cancels, Backspace deletes.
    fn edit_name(&mut self, key: char) -> bool {
        let Some(draft) = &mut self.name_draft else {
            return false;
        };
        match key {
            KEY_ENTER => {
                let name = std::mem::take(draft);
                self.name_draft = None;
                self.session.set_bakery_name(&name);
            }
            KEY_ESCAPE => self.name_draft = None,
            KEY_BACKSPACE => {
                draft.pop();
            }
            c if !c.is_control() && draft.chars().count() < session::MAX_NAME_LEN => {
                draft.push(c);
            }
            _ => return false,
        }
        true
    }

    pub fn tick(&mut self, delta_ticks: u32) {
        if delta_ticks == 0 {
            return;
        }
        self.session.advance(delta_ticks);
        if let Some(notice) = &mut self.notice {
            notice.ticks_left = notice.ticks_left.saturating_sub(delta_ticks);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }
        self.pump_notifications();
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }

    /// Surface the notifications the player needs to see.
    fn pump_notifications(&mut self) {
        for note in self.session.drain_notifications() {
            match note {
                Notification::PurchaseRejected(EconomyError::InsufficientFunds { .. }) => {
                    self.show_notice("Not enough cookies!");
                }
                Notification::PurchaseRejected(e) => self.show_notice(&e.to_string()),
                Notification::AchievementUnlocked(id) => {
                    let name = progress::find(id).map_or(id, |a| a.name);
                    self.show_notice(&format!("★ {name}"));
                }
                Notification::GameReset => self.show_notice("Progress reset."),
                Notification::ScoreChanged(_)
                | Notification::YieldChanged(_)
                | Notification::UpgradePurchased { .. } => {}
            }
        }
    }

    fn show_notice(&mut self, text: &str) {
        self.notice = Some(Notice {
            text: text.to_string(),
            ticks_left: NOTICE_TICKS,
        });
    }
}

/// Control keys forwarded by the browser shell as chars.
pub const KEY_ENTER: char = '\n';
pub const KEY_ESCAPE: char = '\u{1b}';
pub const KEY_BACKSPACE: char = '\u{8}';

/// Letters bound to commands; shop rows use the rest of the alphabet.
const RESERVED_KEYS: [char; 6] = ['c', 'm', 'n', 'r', 's', 'y'];

fn shop_keys() -> impl Iterator<Item = char> {
    ('a'..='z').filter(|c| !RESERVED_KEYS.contains(c))
}

/// Key label for the n-th shop item still for sale.
pub fn shop_key(display_idx: usize) -> Option<char> {
    shop_keys().nth(display_idx)
}

fn shop_display_index(key: char) -> Option<usize> {
    shop_keys().position(|c| c == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use save::MemoryStore;

    fn game() -> BakeryGame<MemoryStore> {
        BakeryGame::new(MemoryStore::new())
    }

    #[test]
    fn key_c_clicks() {
        let mut g = game();
        assert!(g.handle_input(&InputEvent::Key('c')));
        assert_eq!(g.session.economy().cookies(), 1);
    }

    #[test]
    fn click_target_clicks() {
        let mut g = game();
        g.handle_input(&InputEvent::Click(CLICK_COOKIE));
        assert_eq!(g.session.economy().cookies(), 1);
    }

    #[test]
    fn buy_producer_via_key() {
        let mut g = game();
        for _ in 0..50 {
            g.handle_input(&InputEvent::Key('c'));
        }
        g.handle_input(&InputEvent::Key('1'));
        assert_eq!(g.session.economy().upgrade("clicker").unwrap().level, 1);
    }

    #[test]
    fn unaffordable_purchase_shows_notice() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('5'));
        assert_eq!(
            g.notice.as_ref().map(|n| n.text.as_str()),
            Some("Not enough cookies!")
        );
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut g = game();
        for _ in 0..5 {
            g.handle_input(&InputEvent::Key('c'));
        }
        g.handle_input(&InputEvent::Key('r'));
        assert!(g.confirm_reset);
        assert_eq!(g.session.economy().cookies(), 5);

        // Other keys are ignored while confirming.
        assert!(!g.handle_input(&InputEvent::Key('c')));
        g.handle_input(&InputEvent::Key('y'));
        assert!(!g.confirm_reset);
        assert_eq!(g.session.economy().cookies(), 0);
    }

    #[test]
    fn reset_cancel_keeps_progress() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('c'));
        g.handle_input(&InputEvent::Key('r'));
        g.handle_input(&InputEvent::Key('n'));
        assert!(!g.confirm_reset);
        assert_eq!(g.session.economy().cookies(), 1);
    }

    #[test]
    fn confirm_without_request_does_nothing() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('c'));
        assert!(!g.handle_input(&InputEvent::Click(RESET_CONFIRM)));
        assert_eq!(g.session.economy().cookies(), 1);
    }

    #[test]
    fn shop_keys_skip_command_letters() {
        assert_eq!(shop_key(0), Some('a'));
        assert_eq!(shop_key(1), Some('b'));
        assert_eq!(shop_key(2), Some('d'));
        assert_eq!(shop_display_index('d'), Some(2));
        assert_eq!(shop_display_index('c'), None);
    }

    #[test]
    fn rename_prompt_commits_on_enter() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('m'));
        assert_eq!(g.name_draft.as_deref(), Some(""));
        for c in "Crumbs".chars() {
            g.handle_input(&InputEvent::Key(c));
        }
        g.handle_input(&InputEvent::Key(KEY_BACKSPACE));
        // Command letters are plain text while typing.
        g.handle_input(&InputEvent::Key('s'));
        g.handle_input(&InputEvent::Key(KEY_ENTER));
        assert!(g.name_draft.is_none());
        assert_eq!(g.session.bakery_name(), "Crumbs");
        assert_eq!(g.session.economy().cookies(), 0);
    }

    #[test]
    fn rename_prompt_escape_keeps_old_name() {
        let mut g = game();
        g.session.set_bakery_name("Old Mill");
        g.handle_input(&InputEvent::Click(RENAME_BAKERY));
        g.handle_input(&InputEvent::Key('x'));
        g.handle_input(&InputEvent::Key(KEY_ESCAPE));
        assert!(g.name_draft.is_none());
        assert_eq!(g.session.bakery_name(), "Old Mill");
    }

    #[test]
    fn rename_draft_is_capped() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('m'));
        for _ in 0..40 {
            g.handle_input(&InputEvent::Key('a'));
        }
        assert_eq!(
            g.name_draft.as_ref().map(|d| d.chars().count()),
            Some(session::MAX_NAME_LEN)
        );
    }

    #[test]
    fn shop_letters_never_shadow_other_bindings() {
        let producer_keys: Vec<char> = catalog::catalog().iter().map(|d| d.key).collect();
        for idx in 0..shop::shop_items().len() {
            let key = shop_key(idx).unwrap();
            assert!(!RESERVED_KEYS.contains(&key), "{key}");
            assert!(!producer_keys.contains(&key), "{key}");
        }
    }

    #[test]
    fn every_shop_item_reachable_by_letter() {
        for idx in 0..shop::shop_items().len() {
            let key = shop_key(idx).unwrap();
            assert_eq!(shop_display_index(key), Some(idx));
        }
    }

    #[test]
    fn notice_expires_after_ticks() {
        let mut g = game();
        g.handle_input(&InputEvent::Key('s'));
        assert!(g.notice.is_some());
        g.tick(NOTICE_TICKS);
        assert!(g.notice.is_none());
    }

    #[test]
    fn tick_accrues_yield() {
        let mut g = game();
        for _ in 0..50 {
            g.handle_input(&InputEvent::Key('c'));
        }
        g.handle_input(&InputEvent::Click(BUY_PRODUCER_BASE));
        g.tick(4);
        assert_eq!(g.session.economy().cookies(), 4);
    }
}

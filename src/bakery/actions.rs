//! Semantic action IDs for bakery click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_COOKIE: u16 = 0;
pub const SAVE_GAME: u16 = 1;
pub const RENAME_BAKERY: u16 = 2;

// ── Reset flow (request, then confirm or cancel) ────────────────
pub const RESET_REQUEST: u16 = 10;
pub const RESET_CONFIRM: u16 = 11;
pub const RESET_CANCEL: u16 = 12;

// ── Producer purchase (base + catalog index) ────────────────────
pub const BUY_PRODUCER_BASE: u16 = 100;

// ── Shop purchase (base + shop index) ───────────────────────────
pub const BUY_SHOP_BASE: u16 = 200;

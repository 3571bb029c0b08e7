//! Emoji used across terminal output, with plain-text fallbacks.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Domain
pub static BELL: Emoji<'_, '_> = Emoji("🔔 ", "[N]");
pub static CHAT: Emoji<'_, '_> = Emoji("💬 ", ">");
pub static PIN: Emoji<'_, '_> = Emoji("📍 ", "@");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static MONEY: Emoji<'_, '_> = Emoji("💰 ", "$");
pub static FLAG: Emoji<'_, '_> = Emoji("🚩 ", "[R]");
pub static PERSON: Emoji<'_, '_> = Emoji("👤 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "[T]");

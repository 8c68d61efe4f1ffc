//! User-facing texts and keyboards

use crate::core::config::{Catalog, Channel};

use super::messenger::{Button, Keyboard};

/// Action id carried by the "I have joined" and re-check buttons
pub const CONFIRM_ACTION: &str = "confirmed_request";

pub const WELCOME: &str = "🎬 Assalomu alaykum!\n\nQuyidagi kanallarga obuna bo‘ling:";
pub const JOINED_BUTTON: &str = "✅ Men obuna bo‘ldim";
pub const RECHECK_BUTTON: &str = "✅ Tekshirish";
pub const CONFIRMED_TOAST: &str = "Tasdiqlandi!";
pub const ALREADY_CONFIRMED: &str = "✅ Siz allaqachon tasdiqlangansiz! Kino kodini yuboring:";
pub const SUBSCRIBE_FIRST: &str = "⚠️ Avval barcha kanallarga obuna bo‘ling va 'Men obuna bo‘ldim' tugmasini bosing.";

fn channel_button(channel: &Channel) -> Button {
    Button::link(format!("📢 {}", channel.name), channel.link.clone())
}

/// One link button per channel, one row each, then the action button
pub fn channel_keyboard<'a>(channels: impl IntoIterator<Item = &'a Channel>, action_label: &str) -> Keyboard {
    let mut rows: Keyboard = channels.into_iter().map(|ch| vec![channel_button(ch)]).collect();
    rows.push(vec![Button::action(action_label, CONFIRM_ACTION)]);
    rows
}

/// Prompt shown after a failed check, listing what is still missing
pub fn not_joined_text(missing: &[&Channel]) -> String {
    let mut text = String::from("❌ Siz hali quyidagi kanallarga obuna bo‘lmadingiz:\n\n");
    text.push_str(
        &missing
            .iter()
            .map(|ch| format!("➡️ {}", ch.name))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    text.push_str("\n\nIltimos, obuna bo‘lib, '✅ Tekshirish' tugmasini bosing.");
    text
}

pub fn confirmed_text(catalog: &Catalog) -> String {
    match catalog.sorted_codes().first() {
        Some(example) => format!("✅ Tabriklaymiz! Endi kino kodini yuboring (masalan: {}).", example),
        None => "✅ Tabriklaymiz! Endi kino kodini yuboring.".to_string(),
    }
}

pub fn invalid_code_text(catalog: &Catalog) -> String {
    format!("❌ Noto‘g‘ri kod! Iltimos, {} orasidan birini yozing.", catalog.code_range())
}

pub fn admin_redeemed_text(display_name: &str, user_id: u64, code: &str) -> String {
    format!("🎬 Kino yuborildi: {} ({}) -> kod {}", display_name, user_id, code)
}

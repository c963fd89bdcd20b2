use cqc_core::types::{BotResponse, Language};
use cqc_store::types::{Lead, LeadState};

use crate::messages::text;

use super::buttons;

/// `START`: unknown user or `/start` reset. Greets and asks for a language.
pub fn handle(lead: &mut Lead) -> BotResponse {
    lead.state = LeadState::LanguageSelected;
    BotResponse::text(text(lead.language, "greeting")).with_buttons(buttons(&[
        ("English", "lang_en"),
        ("فارسی", "lang_fa"),
        ("العربية", "lang_ar"),
        ("Русский", "lang_ru"),
    ]))
}

pub fn language_from_payload(payload: &str) -> Option<Language> {
    match payload {
        "lang_en" => Some(Language::En),
        "lang_fa" => Some(Language::Fa),
        "lang_ar" => Some(Language::Ar),
        "lang_ru" => Some(Language::Ru),
        _ => None,
    }
}

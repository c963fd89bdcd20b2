use cqc_core::types::Language;

/// Tiny localisation table for the handful of fixed prompts the state
/// machine emits on entry to each state (spec §4.1's "outbound contract on
/// entry"). Falls back to English for any language/key combination not
/// covered — the CQC's non-goal is free-form NLG, not full i18n coverage.
pub fn text(lang: Language, key: &str) -> String {
    let table: &[(&str, &str)] = match lang {
        Language::Fa => FA,
        Language::Ar => AR,
        Language::Ru => RU,
        Language::En => &[],
    };
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| en(key))
}

fn en(key: &str) -> String {
    EN.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| key.to_string())
}

const EN: &[(&str, &str)] = &[
    ("greeting", "Welcome! Which language would you like to continue in?"),
    ("ask_goal", "Great, thanks. What brings you here today?"),
    ("ask_contact", "Could you share your name and phone number so we can follow up?"),
    ("invalid_phone", "That doesn't look like a valid phone number. Could you try again, e.g. +971501234567?"),
    ("ask_transaction_type", "Are you looking to buy or rent?"),
    ("ask_category", "Are you interested in residential or commercial property?"),
    ("ask_budget", "What budget range works for you?"),
    ("ask_property_type", "Which property type interests you most?"),
    ("zombie_ack", "I'll look at that shortly — first, please pick one of the options above."),
    ("faq_fallback", "I don't have a specific answer for that right now, but let's continue."),
    ("engagement_open", "I'm here to help with anything else about the properties we discussed."),
    ("document_sent", "Here's the brochure for your best match so far."),
    ("document_unavailable", "I don't have a brochure on file for your current match yet — our team can send one over."),
    ("handoff_offer", "Here are a few times our team is available for a viewing:"),
    ("completed", "Thanks for your time — feel free to reach out any time."),
    ("menu_fallback", "Welcome! Reply with a keyword like \"property\" or use the link your agent shared to get started."),
    ("ghost_followup", "A colleague found the property you wanted — when can you talk?"),
];

const FA: &[(&str, &str)] = &[
    ("greeting", "خوش آمدید! می‌خواهید به چه زبانی ادامه دهیم؟"),
    ("ask_contact", "لطفاً نام و شماره تلفن خود را برای پیگیری ارسال کنید."),
    ("invalid_phone", "این شماره معتبر به نظر نمی‌رسد. لطفاً دوباره امتحان کنید."),
];

const AR: &[(&str, &str)] = &[
    ("greeting", "مرحباً! بأي لغة تود أن نكمل؟"),
    ("ask_contact", "هل يمكنك مشاركة اسمك ورقم هاتفك لمتابعتك؟"),
];

const RU: &[(&str, &str)] = &[
    ("greeting", "Добро пожаловать! На каком языке продолжим?"),
    ("ask_contact", "Поделитесь, пожалуйста, именем и номером телефона для связи."),
];

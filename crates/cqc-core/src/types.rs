//! Shared identifiers and wire-neutral message types used across every CQC crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// UUIDv7 — time-sortable, so logs correlate by creation order.
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

id_newtype!(TenantId);
id_newtype!(LeadId);
id_newtype!(PropertyId);
id_newtype!(KnowledgeId);
id_newtype!(SlotId);
id_newtype!(AppointmentId);

/// Inbound transport a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Telegram,
    Gateway,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Telegram => write!(f, "telegram"),
            Channel::Gateway => write!(f, "gateway"),
        }
    }
}

/// Supported dialogue languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fa,
    Ar,
    Ru,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fa => "fa",
            Language::Ar => "ar",
            Language::Ru => "ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "fa" => Some(Language::Fa),
            "ar" => Some(Language::Ar),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }
}

/// A single qualifying button payload carried in/out of the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

/// A normalised channel contact share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactShare {
    pub name: Option<String>,
    pub phone_number: String,
}

/// Canonical inbound message, produced by a transport adapter from its
/// channel-native webhook shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub tenant_hint: Option<TenantId>,
    pub channel: Channel,
    pub channel_identity: String,
    pub text: Option<String>,
    pub button_payload: Option<String>,
    pub contact: Option<ContactShare>,
    pub has_voice: bool,
    pub has_media: bool,
    pub locale_hint: Option<Language>,
}

/// An out-of-band alert to a tenant's configured admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAlert {
    pub chat_id: String,
    pub text: String,
}

/// A worker-initiated send to a lead's channel identity, outside of any
/// inbound turn (Ghost Protocol follow-ups, match-notifier pings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub tenant_id: TenantId,
    pub channel_identity: String,
    pub text: String,
}

/// Neutral outbound record; transport adapters render this to channel form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
    #[serde(default)]
    pub request_contact: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_alert: Option<AdminAlert>,
}

impl BotResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = Some(buttons);
        self
    }

    pub fn with_admin_alert(mut self, alert: AdminAlert) -> Self {
        self.admin_alert = Some(alert);
        self
    }

    pub fn with_request_contact(mut self) -> Self {
        self.request_contact = true;
        self
    }

    pub fn with_document_ref(mut self, document_ref: impl Into<String>) -> Self {
        self.document_ref = Some(document_ref.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_newtype_roundtrips_through_string() {
        let id = LeadId::new();
        let again = LeadId::from(id.as_str());
        assert_eq!(id, again);
    }

    #[test]
    fn language_code_roundtrip() {
        for lang in [Language::En, Language::Fa, Language::Ar, Language::Ru] {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
        }
    }
}

//! Credentials record and the form's field catalogue

use serde::{Deserialize, Serialize};

/// User-supplied keys persisted in the credentials cookie.
///
/// Keys keep the camelCase names the backend expects inside
/// `{"credentials": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialsRecord {
    pub openai_api_key: String,
    pub pinecone_environment: String,
    pub pinecone_index: String,
    pub pinecone_api_key: String,
    #[serde(rename = "forumURL")]
    pub forum_url: String,
    /// Community identifier. Set up outside the credentials form.
    pub community: String,
}

impl CredentialsRecord {
    pub fn has_openai_api_key(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    pub fn has_community(&self) -> bool {
        !self.community.is_empty()
    }
}

/// How a field shows up in the credentials form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVisibility {
    /// Rendered and editable
    Active,
    /// Rendered, but edits are refused
    Disabled,
    /// Carried in the record but not rendered by default
    Hidden,
}

/// Fields of the credentials form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    OpenAiApiKey,
    PineconeApiKey,
    PineconeEnvironment,
    PineconeIndex,
    DiscordApiKey,
    ForumUrl,
}

impl CredentialField {
    /// All fields in form order
    pub fn all() -> &'static [CredentialField] {
        &[
            CredentialField::OpenAiApiKey,
            CredentialField::PineconeApiKey,
            CredentialField::PineconeEnvironment,
            CredentialField::PineconeIndex,
            CredentialField::DiscordApiKey,
            CredentialField::ForumUrl,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialField::OpenAiApiKey => "OpenAI API Key",
            CredentialField::PineconeApiKey => "Pinecone API Key",
            CredentialField::PineconeEnvironment => "Pinecone Environment",
            CredentialField::PineconeIndex => "Pinecone Index Name",
            CredentialField::DiscordApiKey => "Discord API Key (coming soon)",
            CredentialField::ForumUrl => "Discourse Forum URL",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            CredentialField::OpenAiApiKey => "sk-***************************",
            CredentialField::PineconeApiKey => "*****-****-****",
            CredentialField::PineconeEnvironment => "us-west1-gcp",
            CredentialField::PineconeIndex => "book-gpt",
            CredentialField::DiscordApiKey => "**************",
            CredentialField::ForumUrl => "https://meta.discourse.org/",
        }
    }

    pub fn visibility(&self) -> FieldVisibility {
        match self {
            CredentialField::OpenAiApiKey => FieldVisibility::Active,
            CredentialField::DiscordApiKey => FieldVisibility::Disabled,
            CredentialField::PineconeApiKey
            | CredentialField::PineconeEnvironment
            | CredentialField::PineconeIndex
            | CredentialField::ForumUrl => FieldVisibility::Hidden,
        }
    }

    /// Whether the value is a secret that should be masked on display
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            CredentialField::OpenAiApiKey
                | CredentialField::PineconeApiKey
                | CredentialField::DiscordApiKey
        )
    }
}

impl std::fmt::Display for CredentialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Scratch copy of the form fields.
///
/// Holds a slot for every field, including ones the record does not persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsDraft {
    pub openai_api_key: String,
    pub pinecone_environment: String,
    pub pinecone_index: String,
    pub pinecone_api_key: String,
    pub forum_url: String,
    pub discord_api_key: String,
}

impl CredentialsDraft {
    /// Seed a draft from a persisted record
    pub fn from_record(record: &CredentialsRecord) -> Self {
        Self {
            openai_api_key: record.openai_api_key.clone(),
            pinecone_environment: record.pinecone_environment.clone(),
            pinecone_index: record.pinecone_index.clone(),
            pinecone_api_key: record.pinecone_api_key.clone(),
            forum_url: record.forum_url.clone(),
            discord_api_key: String::new(),
        }
    }

    pub fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::OpenAiApiKey => &self.openai_api_key,
            CredentialField::PineconeApiKey => &self.pinecone_api_key,
            CredentialField::PineconeEnvironment => &self.pinecone_environment,
            CredentialField::PineconeIndex => &self.pinecone_index,
            CredentialField::DiscordApiKey => &self.discord_api_key,
            CredentialField::ForumUrl => &self.forum_url,
        }
    }

    pub fn set(&mut self, field: CredentialField, value: impl Into<String>) {
        let slot = match field {
            CredentialField::OpenAiApiKey => &mut self.openai_api_key,
            CredentialField::PineconeApiKey => &mut self.pinecone_api_key,
            CredentialField::PineconeEnvironment => &mut self.pinecone_environment,
            CredentialField::PineconeIndex => &mut self.pinecone_index,
            CredentialField::DiscordApiKey => &mut self.discord_api_key,
            CredentialField::ForumUrl => &mut self.forum_url,
        };
        *slot = value.into();
    }

    /// Build the record to persist. `community` is not part of the form and is
    /// taken from the caller.
    pub fn to_record(&self, community: &str) -> CredentialsRecord {
        CredentialsRecord {
            openai_api_key: self.openai_api_key.clone(),
            pinecone_environment: self.pinecone_environment.clone(),
            pinecone_index: self.pinecone_index.clone(),
            pinecone_api_key: self.pinecone_api_key.clone(),
            forum_url: self.forum_url.clone(),
            community: community.to_string(),
        }
    }
}

/// Mask a secret for display (show first 4 and last 4 chars)
pub fn mask_secret(value: &str) -> String {
    let trimmed = value.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else if chars.len() > 4 {
        let head: String = chars[..4].iter().collect();
        format!("{}...", head)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_uses_camel_case_keys() {
        let record = CredentialsRecord {
            openai_api_key: "sk-test".to_string(),
            forum_url: "https://forum.example".to_string(),
            community: "ouo".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["openaiApiKey"], "sk-test");
        assert_eq!(json["forumURL"], "https://forum.example");
        assert_eq!(json["community"], "ouo");
        assert_eq!(json["pineconeEnvironment"], "");
        assert!(json.get("discordApiKey").is_none());
    }

    #[test]
    fn test_record_missing_fields_default_to_empty() {
        let record: CredentialsRecord =
            serde_json::from_str(r#"{"openaiApiKey":"sk-1","githubPersonalToken":"x"}"#).unwrap();
        assert_eq!(record.openai_api_key, "sk-1");
        assert!(record.forum_url.is_empty());
        assert!(!record.has_community());
    }

    #[test]
    fn test_whitespace_values_count_as_present() {
        let record = CredentialsRecord {
            openai_api_key: "   ".to_string(),
            community: " ".to_string(),
            ..Default::default()
        };
        assert!(record.has_openai_api_key());
        assert!(record.has_community());
        assert!(!CredentialsRecord::default().has_openai_api_key());
    }

    #[test]
    fn test_field_visibility() {
        assert_eq!(CredentialField::OpenAiApiKey.visibility(), FieldVisibility::Active);
        assert_eq!(CredentialField::DiscordApiKey.visibility(), FieldVisibility::Disabled);
        assert_eq!(CredentialField::ForumUrl.visibility(), FieldVisibility::Hidden);
        assert_eq!(CredentialField::all().len(), 6);
    }

    #[test]
    fn test_draft_fields_are_independent() {
        let mut draft = CredentialsDraft::default();
        draft.set(CredentialField::ForumUrl, "https://meta.discourse.org/");
        draft.set(CredentialField::DiscordApiKey, "discord-token");

        assert_eq!(draft.get(CredentialField::ForumUrl), "https://meta.discourse.org/");
        assert_eq!(draft.get(CredentialField::DiscordApiKey), "discord-token");

        let record = draft.to_record("ouo");
        assert_eq!(record.forum_url, "https://meta.discourse.org/");
        assert_eq!(record.community, "ouo");
        assert_eq!(record, CredentialsRecord {
            forum_url: "https://meta.discourse.org/".to_string(),
            community: "ouo".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_draft_from_record_leaves_discord_empty() {
        let record = CredentialsRecord {
            openai_api_key: "sk-abc".to_string(),
            pinecone_index: "book-gpt".to_string(),
            ..Default::default()
        };
        let draft = CredentialsDraft::from_record(&record);
        assert_eq!(draft.openai_api_key, "sk-abc");
        assert_eq!(draft.pinecone_index, "book-gpt");
        assert!(draft.discord_api_key.is_empty());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-1234567890abcdef"), "sk-1...cdef");
        assert_eq!(mask_secret("sk-12345"), "sk-1...");
        assert_eq!(mask_secret("abc"), "****");
    }
}

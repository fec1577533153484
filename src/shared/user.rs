/**
 * User and Session Types
 *
 * Defines the durable session artifact and the user record it carries,
 * plus the transient credential and registration payloads.
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A storefront user as returned by the Auth API.
///
/// Backend profile fields this client doesn't model land in `extra`, so a
/// record read from the store and re-persisted after an update keeps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Apply a shallow merge: fields set in `update` win, everything else is
    /// kept, and unmodeled `extra` keys are merged per-key.
    pub fn merged(&self, update: &UserUpdate) -> UserRecord {
        let mut user = self.clone();
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(name) = &update.name {
            user.name = Some(name.clone());
        }
        if let Some(mobile) = &update.mobile {
            user.mobile = Some(mobile.clone());
        }
        if let Some(picture) = &update.profile_picture {
            user.profile_picture = Some(picture.clone());
        }
        for (key, value) in &update.extra {
            user.extra.insert(key.clone(), value.clone());
        }
        user
    }
}

/// Partial update for a [`UserRecord`]; `None` fields keep existing values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The durable proof-of-login artifact: token plus the user it belongs to.
///
/// Exists in the session store if and only if the controller is
/// authenticated; all writes go through the controller to keep the two from
/// diverging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// Login credentials. Transient: never persisted, never logged.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload for a new storefront account
#[derive(Debug, Clone)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> UserRecord {
        UserRecord {
            id: "42".to_string(),
            email: "a@b.com".to_string(),
            name: Some("Ada".to_string()),
            mobile: None,
            profile_picture: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_merged_overwrites_only_set_fields() {
        let user = sample_user();
        let update = UserUpdate {
            name: Some("Grace".to_string()),
            ..Default::default()
        };

        let merged = user.merged(&update);
        assert_eq!(merged.name.as_deref(), Some("Grace"));
        assert_eq!(merged.email, "a@b.com");
        assert_eq!(merged.id, "42");
    }

    #[test]
    fn test_merged_preserves_extra_fields() {
        let mut user = sample_user();
        user.extra
            .insert("loyaltyTier".to_string(), json!("gold"));

        let update = UserUpdate {
            mobile: Some("555-0100".to_string()),
            ..Default::default()
        };

        let merged = user.merged(&update);
        assert_eq!(merged.extra.get("loyaltyTier"), Some(&json!("gold")));
        assert_eq!(merged.mobile.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_user_record_round_trips_unknown_fields() {
        let raw = json!({
            "id": "7",
            "email": "x@y.com",
            "shippingAddress": {"city": "Lagos"}
        });

        let user: UserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(user.extra.get("shippingAddress").unwrap()["city"], "Lagos");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["shippingAddress"]["city"], "Lagos");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("secret1"));
    }

    #[test]
    fn test_session_serialization() {
        let session = Session {
            token: "tkn".to_string(),
            user: sample_user(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(session, back);
    }
}

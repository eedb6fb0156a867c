//! Identity domain models.

use serde::{Deserialize, Serialize};

use crate::plans::SubscriptionPlan;

/// Authenticated user as exposed by the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscription_plan: SubscriptionPlan,
}

impl UserProfile {
    /// Local part of the email, used as a greeting name when no full name is set.
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>) -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            email: "marie.dupont@example.com".to_string(),
            full_name: full_name.map(str::to_string),
            avatar_url: None,
            subscription_plan: SubscriptionPlan::Free,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_email_local_part() {
        assert_eq!(profile(None).display_name(), "marie.dupont");
        assert_eq!(profile(Some("  ")).display_name(), "marie.dupont");
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(profile(Some("Marie")).display_name(), "Marie");
    }

    #[test]
    fn test_missing_plan_defaults_to_free() {
        let json = r#"{"id":"u","email":"a@b.c","fullName":null,"avatarUrl":null}"#;
        let parsed: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.subscription_plan, SubscriptionPlan::Free);
    }
}

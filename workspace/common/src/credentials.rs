use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials generated when an admission is approved.
///
/// The plaintext default password appears here exactly once, in the
/// response to the approving admin, who relays it to the new member
/// out-of-band. It is never persisted and must never be logged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProvisionedCredentials {
    /// Generated username, e.g. `d101`.
    pub username: String,
    /// The configured default password the member logs in with first.
    pub default_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_both_fields() {
        let creds = ProvisionedCredentials {
            username: "d101".to_string(),
            default_password: "changeme".to_string(),
        };

        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["username"], "d101");
        assert_eq!(json["default_password"], "changeme");
    }
}

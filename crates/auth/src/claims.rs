use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accepted aliases for the organization-id claim, in precedence order.
pub const ORG_ID_KEYS: &[&str] = &["org_id", "orgId", "organization_id", "organizationId"];

/// Accepted aliases for the organization-role claim, in precedence order.
pub const ORG_ROLE_KEYS: &[&str] = &["org_role", "orgRole"];

/// Decoded claim set of a verified identity token.
///
/// The provider's claim shape varies by configuration (snake_case vs
/// camelCase templates), so this is kept as a raw map with alias-aware
/// accessors rather than a fixed struct. First non-empty value wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// External user id (`sub`). Required on every token.
    pub fn sub(&self) -> Option<&str> {
        self.first_non_empty(&["sub"])
    }

    /// Organization id, resolved across the known aliases.
    pub fn organization_id(&self) -> Option<&str> {
        self.first_non_empty(ORG_ID_KEYS)
    }

    /// Organization role, resolved across the known aliases.
    pub fn org_role(&self) -> Option<&str> {
        self.first_non_empty(ORG_ROLE_KEYS)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Raw claim map (for sanitized audit snapshots).
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn first_non_empty(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(Value::as_str)
            .find(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> TokenClaims {
        match value {
            Value::Object(m) => TokenClaims::new(m),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn org_id_alias_precedence() {
        let c = claims(json!({ "organizationId": "org_camel", "org_id": "org_snake" }));
        assert_eq!(c.organization_id(), Some("org_snake"));

        let c = claims(json!({ "orgId": "org_camel" }));
        assert_eq!(c.organization_id(), Some("org_camel"));
    }

    #[test]
    fn empty_values_are_skipped() {
        let c = claims(json!({ "org_id": "", "organization_id": "org_real" }));
        assert_eq!(c.organization_id(), Some("org_real"));

        let c = claims(json!({ "org_role": "", "orgRole": "" }));
        assert_eq!(c.org_role(), None);
    }

    #[test]
    fn non_string_values_are_ignored() {
        let c = claims(json!({ "org_id": 42, "orgId": "org_ok" }));
        assert_eq!(c.organization_id(), Some("org_ok"));
    }

    #[test]
    fn sub_is_required_but_may_be_absent() {
        let c = claims(json!({ "org_id": "org_1" }));
        assert_eq!(c.sub(), None);

        let c = claims(json!({ "sub": "user_ext_1" }));
        assert_eq!(c.sub(), Some("user_ext_1"));
    }
}

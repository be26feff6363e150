use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use dealgate_core::{OrgId, UserId};

/// Derive the storage key for a cached response.
///
/// `api:v1:<endpoint>:<org_id>:<params_hash>[:<user_id>]` where the endpoint
/// has its `/api/` prefix stripped and remaining slashes folded to `:`, and
/// `params_hash` is the first 8 hex characters of the SHA-256 of the
/// canonical (sorted-key) JSON serialization of the query parameters.
///
/// Pure function of its inputs: parameter order cannot change the key, and
/// the embedded `org_id` keeps tenants from ever sharing a record.
pub fn cache_key(
    endpoint: &str,
    org_id: &OrgId,
    params: &BTreeMap<String, String>,
    user_id: Option<&UserId>,
) -> String {
    let endpoint = endpoint.strip_prefix("/api/").unwrap_or(endpoint);
    let endpoint = endpoint.trim_matches('/').replace('/', ":");

    let canonical = serde_json::to_string(params).unwrap_or_default();
    let digest = Sha256::digest(canonical.as_bytes());
    let params_hash: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();

    match user_id {
        Some(user_id) => format!("api:v1:{endpoint}:{org_id}:{params_hash}:{user_id}"),
        None => format!("api:v1:{endpoint}:{org_id}:{params_hash}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn endpoint_is_normalized() {
        let org = OrgId::new("org_a");
        let key = cache_key("/api/deals/active", &org, &BTreeMap::new(), None);
        assert!(key.starts_with("api:v1:deals:active:org_a:"));
    }

    #[test]
    fn organizations_never_share_keys() {
        let p = params(&[("page", "1")]);
        let a = cache_key("/api/deals", &OrgId::new("org_a"), &p, None);
        let b = cache_key("/api/deals", &OrgId::new("org_b"), &p, None);
        assert_ne!(a, b);
    }

    #[test]
    fn every_component_is_load_bearing() {
        let org = OrgId::new("org_a");
        let p1 = params(&[("page", "1")]);
        let p2 = params(&[("page", "2")]);
        let user = UserId::new();

        let base = cache_key("/api/deals", &org, &p1, None);
        assert_ne!(base, cache_key("/api/documents", &org, &p1, None));
        assert_ne!(base, cache_key("/api/deals", &org, &p2, None));
        assert_ne!(base, cache_key("/api/deals", &org, &p1, Some(&user)));
    }

    #[test]
    fn param_order_does_not_matter() {
        let org = OrgId::new("org_a");
        let forward = params(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let reversed = params(&[("c", "3"), ("b", "2"), ("a", "1")]);
        assert_eq!(
            cache_key("/api/deals", &org, &forward, None),
            cache_key("/api/deals", &org, &reversed, None)
        );
    }

    proptest! {
        /// Inserting the same entries in any order yields the same key.
        #[test]
        fn key_is_permutation_invariant(
            entries in proptest::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9]{0,12}"), 0..8),
            seed in any::<u64>(),
        ) {
            let org = OrgId::new("org_prop");

            let ordered: BTreeMap<String, String> = entries.iter().cloned().collect();

            let mut shuffled = entries.clone();
            // Cheap deterministic shuffle.
            let len = shuffled.len().max(1);
            shuffled.rotate_left((seed as usize) % len);
            let reordered: BTreeMap<String, String> = shuffled.into_iter().collect();

            prop_assert_eq!(
                cache_key("/api/deals", &org, &ordered, None),
                cache_key("/api/deals", &org, &reordered, None)
            );
        }
    }
}

use serde::{Deserialize, Serialize};

/// Subscription tier of an organization.
///
/// Tiers are totally ordered (`starter < professional < premium < enterprise`)
/// and entitlement checks are inclusive: an organization at tier `T` may use
/// every feature whose minimum tier is `<= T`.
///
/// Not to be confused with the role enum in `dealgate-auth`: the `enterprise`
/// tier and the `enterprise` role are different axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Starter,
    Professional,
    Premium,
    Enterprise,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Starter => "starter",
            Tier::Professional => "professional",
            Tier::Premium => "premium",
            Tier::Enterprise => "enterprise",
        }
    }

    /// Capitalized name for user-facing upgrade messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Starter => "Starter",
            Tier::Professional => "Professional",
            Tier::Premium => "Premium",
            Tier::Enterprise => "Enterprise",
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Tier::Starter => 1,
            Tier::Professional => 2,
            Tier::Premium => 3,
            Tier::Enterprise => 4,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "starter" => Some(Tier::Starter),
            "professional" => Some(Tier::Professional),
            "premium" => Some(Tier::Premium),
            "enterprise" => Some(Tier::Enterprise),
            _ => None,
        }
    }

    /// Lenient parse for identity-provider metadata.
    ///
    /// Missing, null, or unrecognized values mean a freshly provisioned
    /// tenant, so the default is `starter` rather than an error.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or(Tier::Starter)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Starter
    }
}

impl core::fmt::Display for Tier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_totally_ordered() {
        assert!(Tier::Starter < Tier::Professional);
        assert!(Tier::Professional < Tier::Premium);
        assert!(Tier::Premium < Tier::Enterprise);
        assert!(Tier::Enterprise >= Tier::Starter);
    }

    #[test]
    fn parse_round_trips() {
        for tier in [Tier::Starter, Tier::Professional, Tier::Premium, Tier::Enterprise] {
            assert_eq!(Tier::parse(tier.as_str()), Some(tier));
        }
    }

    #[test]
    fn lenient_parse_defaults_to_starter() {
        assert_eq!(Tier::parse_or_default(None), Tier::Starter);
        assert_eq!(Tier::parse_or_default(Some("")), Tier::Starter);
        assert_eq!(Tier::parse_or_default(Some("platinum")), Tier::Starter);
        assert_eq!(Tier::parse_or_default(Some("premium")), Tier::Premium);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Tier::Premium).unwrap(), "\"premium\"");
        let parsed: Tier = serde_json::from_str("\"enterprise\"").unwrap();
        assert_eq!(parsed, Tier::Enterprise);
    }
}

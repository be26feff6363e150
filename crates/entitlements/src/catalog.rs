//! Static feature catalogue.
//!
//! Code-resident mapping from feature name to the minimum tier that unlocks
//! it. An organization at tier `T` has access to feature `F` iff
//! `T >= min_tier(F)`.

use dealgate_core::Tier;

/// Every gateable feature and its minimum tier.
pub const FEATURE_CATALOG: &[(&str, Tier)] = &[
    // Core product surface, available to every tenant.
    ("deals", Tier::Starter),
    ("documents", Tier::Starter),
    ("events", Tier::Starter),
    ("community", Tier::Starter),
    ("valuations", Tier::Starter),
    ("podcast_audio", Tier::Professional),
    ("transcription_basic", Tier::Professional),
    ("podcast_video", Tier::Premium),
    ("youtube_integration", Tier::Premium),
    ("transcription_ai_enhanced", Tier::Premium),
    ("live_streaming", Tier::Enterprise),
    ("transcription_multi_language", Tier::Enterprise),
];

/// Minimum tier for `feature`, or `None` for a name outside the catalogue.
pub fn min_tier(feature: &str) -> Option<Tier> {
    FEATURE_CATALOG
        .iter()
        .find(|(name, _)| *name == feature)
        .map(|(_, tier)| *tier)
}

pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_CATALOG.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        assert_eq!(min_tier("podcast_audio"), Some(Tier::Professional));
        assert_eq!(min_tier("podcast_video"), Some(Tier::Premium));
        assert_eq!(min_tier("live_streaming"), Some(Tier::Enterprise));
        assert_eq!(min_tier("deals"), Some(Tier::Starter));
        assert_eq!(min_tier("time_travel"), None);
    }

    #[test]
    fn access_is_monotone_in_tier() {
        // If a tier has a feature, every higher tier has it too.
        let tiers = [Tier::Starter, Tier::Professional, Tier::Premium, Tier::Enterprise];
        for (feature, _) in FEATURE_CATALOG {
            for (i, lower) in tiers.iter().enumerate() {
                for higher in &tiers[i..] {
                    let lower_has = *lower >= min_tier(feature).unwrap();
                    let higher_has = *higher >= min_tier(feature).unwrap();
                    assert!(!lower_has || higher_has, "monotonicity broken for {feature}");
                }
            }
        }
    }

    #[test]
    fn feature_names_are_unique() {
        let mut names: Vec<_> = feature_names().collect();
        names.sort_unstable();
        let len_before = names.len();
        names.dedup();
        assert_eq!(names.len(), len_before);
    }
}

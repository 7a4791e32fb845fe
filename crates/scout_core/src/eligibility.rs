/// Decides whether a listing's stated audience permits the profile to
/// qualify. Pure text predicate, no external calls; the seam for a rule
/// table, regex set, or classifier later, without touching the engine.
pub trait EligibilityRule {
    fn is_eligible(&self, eligibility_text: &str, profile_text: &str) -> bool;
}

/// Case-insensitive substring rules, first match wins:
/// 1. "open to all" admits everyone;
/// 2. "university students" admits profiles mentioning "junior";
/// 3. anything else is out.
///
/// A coarse heuristic. An absent eligibility field arrives here as an
/// empty string and falls through to rule 3.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudienceRule;

impl EligibilityRule for AudienceRule {
    fn is_eligible(&self, eligibility_text: &str, profile_text: &str) -> bool {
        let audience = eligibility_text.to_lowercase();
        if audience.contains("open to all") {
            return true;
        }
        audience.contains("university students") && profile_text.to_lowercase().contains("junior")
    }
}

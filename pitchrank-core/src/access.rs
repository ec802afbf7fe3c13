//! Capability checks gating award and claim actions
use std::collections::HashSet;

/// Capability required to award or revoke badges.
pub const AWARD_BADGES: &str = "award_badges";
/// Capability required to claim a player profile.
pub const CLAIM_PROFILE: &str = "claim_profile";

/// Answers whether the current account may perform an action.
/// Supplied by the host application's authorization layer.
pub trait CapabilityCheck {
    fn can_perform(&self, capability: &str) -> bool;
}

impl<F> CapabilityCheck for F
where
    F: Fn(&str) -> bool,
{
    fn can_perform(&self, capability: &str) -> bool {
        self(capability)
    }
}

impl CapabilityCheck for HashSet<String> {
    fn can_perform(&self, capability: &str) -> bool {
        self.contains(capability)
    }
}

/// Grants every capability. Used by trusted tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn can_perform(&self, _capability: &str) -> bool {
        true
    }
}

/// Grants nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl CapabilityCheck for DenyAll {
    fn can_perform(&self, _capability: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_sets_act_as_checks() {
        let pro_only = |cap: &str| cap == AWARD_BADGES;
        assert!(pro_only.can_perform(AWARD_BADGES));
        assert!(!pro_only.can_perform(CLAIM_PROFILE));

        let granted: HashSet<String> = [CLAIM_PROFILE.to_string()].into_iter().collect();
        assert!(granted.can_perform(CLAIM_PROFILE));
        assert!(!granted.can_perform(AWARD_BADGES));

        assert!(AllowAll.can_perform("anything"));
        assert!(!DenyAll.can_perform(AWARD_BADGES));
    }
}

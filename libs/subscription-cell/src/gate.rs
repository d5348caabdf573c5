//! Access gate over the dentist's subscription state.
//!
//! Status transitions are admin-driven and rare, but expiry has to hold on
//! every guarded request without a background sweep. So the stored enum is
//! only the coarse category; the binding check recomputes expiry from the
//! stored end dates against the caller-supplied clock.

use chrono::{DateTime, Utc};
use shared_models::dentist::{DentistProfile, SubscriptionStatus};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    TrialExpired,
    SubscriptionLapsed,
    StoredExpired,
    Cancelled,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::TrialExpired => write!(f, "Your free trial has ended"),
            DenialReason::SubscriptionLapsed => write!(f, "Your subscription has ended"),
            DenialReason::StoredExpired => write!(f, "Your subscription has expired"),
            DenialReason::Cancelled => write!(f, "Your subscription was cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Denied(DenialReason),
    /// Authenticated identity with no provisioned profile. Profile creation
    /// is synchronous with registration, so this is blocked silently rather
    /// than reported as an error.
    Block,
}

/// Evaluate whether a dentist may use the product right now.
pub fn access_decision(profile: Option<&DentistProfile>, now: DateTime<Utc>) -> AccessDecision {
    let Some(profile) = profile else {
        return AccessDecision::Block;
    };

    match profile.subscription_status {
        SubscriptionStatus::Trial => {
            if let Some(trial_end) = profile.trial_ends_at {
                if now > trial_end {
                    return AccessDecision::Denied(DenialReason::TrialExpired);
                }
            }
            AccessDecision::Allow
        }
        SubscriptionStatus::Expired => AccessDecision::Denied(DenialReason::StoredExpired),
        SubscriptionStatus::Cancelled => AccessDecision::Denied(DenialReason::Cancelled),
        SubscriptionStatus::Active => {
            // The stored status can be stale: nothing flips it to expired
            // when the end date passes, so the date comparison is binding.
            if let Some(sub_end) = profile.subscription_ends_at {
                if now > sub_end {
                    return AccessDecision::Denied(DenialReason::SubscriptionLapsed);
                }
            }
            AccessDecision::Allow
        }
    }
}

pub fn is_currently_entitled(profile: &DentistProfile, now: DateTime<Utc>) -> bool {
    access_decision(Some(profile), now) == AccessDecision::Allow
}

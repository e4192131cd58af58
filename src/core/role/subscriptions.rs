//! Moving an environment's DataZone subscriptions to a new principal.
//!
//! Subscription targets hold the IAM principal that receives access to
//! subscribed assets. To repoint them, existing grants are revoked (and the
//! revocation awaited), the target principals are replaced and the grants are
//! recreated for the same listings.

use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::aws::{DataZone, SubscriptionGrant};
use crate::defaults::PollingConfig;
use crate::error::{Error, Result};
use crate::output::{MigrationReport, StepStatus};

const COMPLETED: &str = "COMPLETED";
const FAILED_STATUSES: &[&str] = &["REVOKE_FAILED", "GRANT_AND_REVOKE_FAILED"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRevocation {
    Completed,
    Failed(String),
}

/// Poll a deleted grant until it is gone, completed or failed.
pub fn wait_for_grant_revocation(
    datazone: &dyn DataZone,
    domain_id: &str,
    grant_id: &str,
    polling: &PollingConfig,
) -> Result<GrantRevocation> {
    for attempt in 1..=polling.max_attempts {
        let status = match datazone.subscription_grant_status(domain_id, grant_id) {
            Ok(status) => status,
            Err(e) if e.is_aws_code("ResourceNotFoundException") => {
                return Ok(GrantRevocation::Completed);
            }
            Err(e) => return Err(e),
        };

        if status == COMPLETED {
            return Ok(GrantRevocation::Completed);
        }
        if FAILED_STATUSES.contains(&status.as_str()) {
            return Ok(GrantRevocation::Failed(status));
        }

        log_status!(
            "subscriptions",
            "Grant {} is {} (attempt {}/{})",
            grant_id,
            status,
            attempt,
            polling.max_attempts
        );
        if attempt < polling.max_attempts {
            thread::sleep(polling.delay());
        }
    }

    Err(Error::aws_timeout(
        format!("Subscription grant {} was not revoked in time", grant_id),
        polling.max_attempts,
    ))
}

/// Repoint every subscription target of `environment_id` at `principal_arn`.
pub fn move_subscriptions(
    datazone: &dyn DataZone,
    report: &mut MigrationReport,
    domain_id: &str,
    environment_id: &str,
    principal_arn: &str,
    polling: &PollingConfig,
    settle: Duration,
) -> Result<()> {
    for target_id in datazone.list_subscription_targets(domain_id, environment_id)? {
        let grants = datazone.list_subscription_grants(domain_id, &target_id)?;
        log_status!(
            "subscriptions",
            "Target {} in {} has {} grant(s)",
            target_id,
            environment_id,
            grants.len()
        );

        if !report.execute {
            plan_target(report, &target_id, principal_arn, &grants);
            continue;
        }

        for grant in &grants {
            datazone.delete_subscription_grant(domain_id, &grant.id)?;
            match wait_for_grant_revocation(datazone, domain_id, &grant.id, polling)? {
                GrantRevocation::Completed => report.record(
                    "datazone.revoke_subscription_grant",
                    &target_id,
                    StepStatus::Applied,
                    Some(json!({ "grantId": &grant.id })),
                ),
                GrantRevocation::Failed(status) => report.record(
                    "datazone.revoke_subscription_grant",
                    &target_id,
                    StepStatus::Failed,
                    Some(json!({ "grantId": &grant.id, "status": status })),
                ),
            }
        }

        // Revocation reports COMPLETED slightly before the target accepts updates.
        thread::sleep(settle);

        let principals = vec![principal_arn.to_string()];
        datazone.update_subscription_target_principals(domain_id, environment_id, &target_id, &principals)?;
        report.record(
            "datazone.update_subscription_target",
            &target_id,
            StepStatus::Applied,
            Some(json!({ "principals": principals })),
        );

        for grant in &grants {
            recreate_grant(datazone, report, domain_id, environment_id, &target_id, grant)?;
        }
    }
    Ok(())
}

fn plan_target(report: &mut MigrationReport, target_id: &str, principal_arn: &str, grants: &[SubscriptionGrant]) {
    for grant in grants {
        report.record(
            "datazone.revoke_subscription_grant",
            target_id,
            StepStatus::Planned,
            Some(json!({ "grantId": &grant.id })),
        );
    }
    report.record(
        "datazone.update_subscription_target",
        target_id,
        StepStatus::Planned,
        Some(json!({ "principals": [principal_arn] })),
    );
    for grant in grants {
        report.record(
            "datazone.create_subscription_grant",
            target_id,
            StepStatus::Planned,
            Some(json!({ "listingId": &grant.listing_id, "listingRevision": &grant.listing_revision })),
        );
    }
}

fn recreate_grant(
    datazone: &dyn DataZone,
    report: &mut MigrationReport,
    domain_id: &str,
    environment_id: &str,
    target_id: &str,
    grant: &SubscriptionGrant,
) -> Result<()> {
    let (Some(listing_id), Some(revision)) = (&grant.listing_id, &grant.listing_revision) else {
        report.warn(format!(
            "Grant {} on target {} has no listing; it was revoked but cannot be recreated",
            grant.id, target_id
        ));
        report.record(
            "datazone.create_subscription_grant",
            target_id,
            StepStatus::Skipped,
            Some(json!({ "grantId": &grant.id, "reason": "no listing" })),
        );
        return Ok(());
    };

    let new_id = datazone.create_subscription_grant(domain_id, environment_id, target_id, listing_id, revision)?;
    report.record(
        "datazone.create_subscription_grant",
        target_id,
        StepStatus::Applied,
        Some(json!({ "listingId": listing_id, "listingRevision": revision, "grantId": new_id })),
    );
    Ok(())
}

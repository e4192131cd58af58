//! Copying IAM configuration (managed policies, inline policies, tags)
//! between two roles.

use serde_json::{json, Value};

use crate::aws::{Iam, IamRole, RoleTag};
use crate::error::{Error, Result};
use crate::output::{MigrationReport, StepStatus};

const ROLE_NAME_TAG: &str = "RoleName";

/// Attach every managed policy of `source` to `destination`.
///
/// Policies whose name contains one of `environment_ids` and whose default
/// document mentions the source role ARN first get a new default version
/// with that ARN replaced by the destination's.
pub fn copy_managed_policies(
    iam: &dyn Iam,
    report: &mut MigrationReport,
    source: &IamRole,
    destination: &IamRole,
    environment_ids: &[String],
) -> Result<()> {
    let policy_arns = iam.list_attached_policy_arns(&source.name)?;
    log_status!(
        "role",
        "{} has {} managed policies attached",
        source.name,
        policy_arns.len()
    );

    for policy_arn in &policy_arns {
        let policy = iam.get_policy(policy_arn)?;
        if !environment_ids.iter().any(|id| policy.name.contains(id.as_str())) {
            continue;
        }

        let document = iam.get_policy_document(policy_arn, &policy.default_version_id)?;
        let serialized = serde_json::to_string(&document)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize policy".to_string())))?;
        if !serialized.contains(&source.arn) {
            continue;
        }

        let rewritten = serialized.replace(&source.arn, &destination.arn);
        let rewritten_doc: Value = serde_json::from_str(&rewritten)
            .map_err(|e| Error::internal_json(e.to_string(), Some("parse rewritten policy".to_string())))?;
        report.apply(
            "iam.create_policy_version",
            &policy.name,
            Some(json!({ "policyArn": policy_arn, "document": rewritten_doc })),
            || iam.create_default_policy_version(policy_arn, &rewritten),
        )?;
    }

    for policy_arn in &policy_arns {
        report.apply(
            "iam.attach_role_policy",
            &destination.name,
            Some(json!({ "policyArn": policy_arn })),
            || iam.attach_role_policy(&destination.name, policy_arn),
        )?;
    }
    Ok(())
}

pub fn copy_inline_policies(
    iam: &dyn Iam,
    report: &mut MigrationReport,
    source: &IamRole,
    destination: &IamRole,
) -> Result<()> {
    for policy_name in iam.list_inline_policy_names(&source.name)? {
        let document = iam.get_inline_policy(&source.name, &policy_name)?;
        report.apply(
            "iam.put_role_policy",
            &destination.name,
            Some(json!({ "policyName": &policy_name, "document": &document })),
            || iam.put_inline_policy(&destination.name, &policy_name, &document),
        )?;
    }
    Ok(())
}

/// Source tags with a self-referencing `RoleName` tag pointed at `destination`.
pub fn rewrite_tags(tags: Vec<RoleTag>, source_name: &str, destination_name: &str) -> Vec<RoleTag> {
    tags.into_iter()
        .map(|tag| {
            if tag.key == ROLE_NAME_TAG && tag.value == source_name {
                RoleTag {
                    key: tag.key,
                    value: destination_name.to_string(),
                }
            } else {
                tag
            }
        })
        .collect()
}

pub fn copy_tags(
    iam: &dyn Iam,
    report: &mut MigrationReport,
    source: &IamRole,
    destination: &IamRole,
) -> Result<()> {
    let tags = rewrite_tags(iam.list_role_tags(&source.name)?, &source.name, &destination.name);
    if tags.is_empty() {
        report.record(
            "iam.tag_role",
            &destination.name,
            StepStatus::Skipped,
            Some(json!({ "reason": format!("{} has no tags", source.name) })),
        );
        return Ok(());
    }

    report.apply(
        "iam.tag_role",
        &destination.name,
        Some(json!({ "tags": &tags })),
        || iam.tag_role(&destination.name, &tags),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::fake::FakeAws;
    use crate::aws::ManagedPolicy;

    fn roles(fake: &FakeAws) -> (IamRole, IamRole) {
        fake.add_role("datazone_usr_role_prj1_env", json!({}));
        fake.add_role("byor", json!({}));
        let roles = fake.roles.borrow();
        (roles[0].clone(), roles[1].clone())
    }

    fn add_policy(fake: &FakeAws, role: &str, name: &str, document: Value) -> String {
        let arn = format!("arn:aws:iam::123456789012:policy/{}", name);
        fake.policies.borrow_mut().insert(
            arn.clone(),
            (
                ManagedPolicy {
                    arn: arn.clone(),
                    name: name.to_string(),
                    default_version_id: "v1".to_string(),
                },
                document,
            ),
        );
        fake.attached_policies
            .borrow_mut()
            .entry(role.to_string())
            .or_default()
            .push(arn.clone());
        arn
    }

    #[test]
    fn rewrites_environment_policy_mentioning_source_arn() {
        let fake = FakeAws::new();
        let (project, byor) = roles(&fake);
        let env_policy = add_policy(
            &fake,
            &project.name,
            "env-abc-policy",
            json!({ "Statement": [{ "Resource": project.arn }] }),
        );
        let shared = add_policy(
            &fake,
            &project.name,
            "SharedReadOnly",
            json!({ "Statement": [{ "Resource": project.arn }] }),
        );

        let mut report = MigrationReport::new(true);
        copy_managed_policies(&fake, &mut report, &project, &byor, &["env-abc".to_string()]).unwrap();

        assert_eq!(fake.calls_to("CreatePolicyVersion"), vec![format!("CreatePolicyVersion {}", env_policy)]);
        let policies = fake.policies.borrow();
        assert_eq!(policies[&env_policy].1["Statement"][0]["Resource"], byor.arn);
        assert_eq!(policies[&shared].1["Statement"][0]["Resource"], project.arn);
        assert_eq!(fake.attached_policies.borrow()["byor"], vec![env_policy.clone(), shared.clone()]);
    }

    #[test]
    fn empty_environment_filter_never_rewrites() {
        let fake = FakeAws::new();
        let (project, byor) = roles(&fake);
        add_policy(&fake, &byor.name, "env-abc-policy", json!({ "Resource": byor.arn }));

        let mut report = MigrationReport::new(true);
        copy_managed_policies(&fake, &mut report, &byor, &project, &[]).unwrap();

        assert!(fake.calls_to("CreatePolicyVersion").is_empty());
        assert!(fake.calls_to("GetPolicyVersion").is_empty());
        assert_eq!(fake.calls_to("AttachRolePolicy").len(), 1);
    }

    #[test]
    fn dry_run_reports_rewritten_document() {
        let fake = FakeAws::new();
        let (project, byor) = roles(&fake);
        add_policy(&fake, &project.name, "env-abc", json!({ "Resource": project.arn }));

        let mut report = MigrationReport::new(false);
        copy_managed_policies(&fake, &mut report, &project, &byor, &["env-abc".to_string()]).unwrap();

        assert!(fake.mutating_calls().is_empty());
        let planned = report.steps_named("iam.create_policy_version").next().unwrap();
        assert_eq!(planned.status, StepStatus::Planned);
        assert_eq!(planned.detail.as_ref().unwrap()["document"]["Resource"], byor.arn);
    }

    #[test]
    fn inline_policies_copied_by_name() {
        let fake = FakeAws::new();
        let (project, byor) = roles(&fake);
        fake.inline_policies.borrow_mut().insert(
            project.name.clone(),
            vec![("s3-access".to_string(), json!({ "Statement": [] }))],
        );

        let mut report = MigrationReport::new(true);
        copy_inline_policies(&fake, &mut report, &project, &byor).unwrap();

        let inline = fake.inline_policies.borrow();
        assert_eq!(inline["byor"][0].0, "s3-access");
    }

    #[test]
    fn role_name_tag_points_at_destination() {
        let tags = rewrite_tags(
            vec![
                RoleTag { key: "RoleName".to_string(), value: "src".to_string() },
                RoleTag { key: "RoleName".to_string(), value: "unrelated".to_string() },
                RoleTag { key: "Team".to_string(), value: "src".to_string() },
            ],
            "src",
            "dst",
        );
        assert_eq!(tags[0].value, "dst");
        assert_eq!(tags[1].value, "unrelated");
        assert_eq!(tags[2].value, "src");
    }

    #[test]
    fn no_tags_skips_tag_call() {
        let fake = FakeAws::new();
        let (project, byor) = roles(&fake);
        let mut report = MigrationReport::new(true);
        copy_tags(&fake, &mut report, &project, &byor).unwrap();
        assert!(fake.calls_to("TagRole").is_empty());
        assert_eq!(report.summary.skipped, 1);
    }
}

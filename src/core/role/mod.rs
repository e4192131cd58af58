//! Bringing an existing IAM role into a project.
//!
//! Two flows share the same building blocks:
//!
//! - **replace** (`use-your-own-role`): the bring-in role takes over
//!   everything the project's execution role had (trust, policies, tags,
//!   Lake Formation grants and opt-ins, registered locations, subscriptions)
//!   and becomes the role of every project environment and of the project's
//!   SageMaker domain.
//! - **enhance** (`enhance-project-role`): the project role keeps its place
//!   and absorbs the bring-in role's trust, policies, tags and Lake Formation
//!   permissions.
//!
//! Without `execute` every mutating step is recorded as planned.

mod iam_copy;
mod sagemaker;
mod subscriptions;
mod trust;

pub use iam_copy::{copy_inline_policies, copy_managed_policies, copy_tags, rewrite_tags};
pub use sagemaker::{delete_domain_apps, find_project_domain, project_domain_name, update_domain_role};
pub use subscriptions::{move_subscriptions, wait_for_grant_revocation, GrantRevocation};
pub use trust::{combine_trust_policies, statements};

use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::arn::role_name_from_arn;
use crate::aws::{DataZone, Iam, IamRole, LakeFormation, SageMaker};
use crate::defaults::PollingConfig;
use crate::error::{Error, Result};
use crate::lakeformation;
use crate::output::{MigrationReport, StepStatus};

const PROJECT_ROLE_PREFIX: &str = "datazone_usr_role_";
const USER_ROLE_RESOURCE: &str = "userRoleArn";
const SUBSCRIPTIONLESS_ENVIRONMENTS: &[&str] = &["RedshiftServerless", "Redshift Serverless"];

pub struct RoleServices<'a> {
    pub iam: &'a dyn Iam,
    pub datazone: &'a dyn DataZone,
    pub lakeformation: &'a dyn LakeFormation,
    pub sagemaker: &'a dyn SageMaker,
}

#[derive(Debug, Clone)]
pub struct RoleRequest {
    pub domain_id: String,
    pub project_id: String,
    pub bring_in_role_arn: String,
    pub execute: bool,
}

#[derive(Debug, Clone)]
pub struct Timing {
    pub polling: PollingConfig,
    pub subscription_settle: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub name: String,
    pub arn: String,
}

impl From<&IamRole> for RoleRef {
    fn from(role: &IamRole) -> Self {
        Self {
            name: role.name.clone(),
            arn: role.arn.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRole {
    pub id: String,
    pub name: String,
    pub role_arn: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMigration {
    pub project_role: RoleRef,
    pub bring_in_role: RoleRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environments: Vec<EnvironmentRole>,
    pub report: MigrationReport,
}

/// First IAM role whose name contains `datazone_usr_role_<project>`.
pub fn find_project_role(iam: &dyn Iam, project_id: &str) -> Result<IamRole> {
    let needle = format!("{}{}", PROJECT_ROLE_PREFIX, project_id);
    let name = iam
        .list_role_names()?
        .into_iter()
        .find(|name| name.contains(&needle))
        .ok_or_else(|| {
            Error::role_not_found(needle.clone(), Some(project_id.to_string()))
                .with_hint("Check --project-id and that the caller may list IAM roles")
        })?;
    log_status!("role", "Project role: {}", name);
    iam.get_role(&name)
}

/// Environments of the project with the role each one runs as.
pub fn environments_with_roles(
    datazone: &dyn DataZone,
    domain_id: &str,
    project_id: &str,
    fallback_role_arn: &str,
) -> Result<Vec<EnvironmentRole>> {
    let mut environments = Vec::new();
    for env in datazone.list_environments(domain_id, project_id)? {
        let role_arn = datazone
            .environment_resources(domain_id, &env.id)?
            .into_iter()
            .find(|r| r.name == USER_ROLE_RESOURCE)
            .map(|r| r.value)
            .unwrap_or_else(|| fallback_role_arn.to_string());
        environments.push(EnvironmentRole {
            id: env.id,
            name: env.name,
            role_arn,
        });
    }
    Ok(environments)
}

fn merge_trust(iam: &dyn Iam, report: &mut MigrationReport, base: &IamRole, other: &IamRole, target: &IamRole) -> Result<()> {
    let combined = combine_trust_policies(&base.trust_policy, &other.trust_policy);
    if combined == target.trust_policy {
        report.record("iam.update_trust_policy", &target.name, StepStatus::Unchanged, None);
        return Ok(());
    }
    report.apply(
        "iam.update_trust_policy",
        &target.name,
        Some(json!({ "document": &combined })),
        || iam.update_assume_role_policy(&target.name, &combined),
    )
}

/// Point Lake Formation locations registered with `from` at `to`.
fn move_registered_locations(
    lakeformation: &dyn LakeFormation,
    report: &mut MigrationReport,
    from: &str,
    to: &str,
) -> Result<()> {
    for resource in lakeformation.list_resources(Some(from))? {
        report.apply(
            "lakeformation.update_resource",
            &resource.resource_arn,
            Some(json!({ "roleArn": to })),
            || lakeformation.update_resource(&resource.resource_arn, to),
        )?;
    }
    Ok(())
}

fn swap_environment_role(
    datazone: &dyn DataZone,
    report: &mut MigrationReport,
    domain_id: &str,
    env: &EnvironmentRole,
    new_role_arn: &str,
) -> Result<()> {
    let detail = json!({ "from": &env.role_arn, "to": new_role_arn });
    if !report.execute {
        report.record("datazone.environment_role", &env.id, StepStatus::Planned, Some(detail));
        return Ok(());
    }

    match datazone.disassociate_environment_role(domain_id, &env.id, &env.role_arn) {
        Ok(()) => {}
        Err(e) if e.is_aws_code("ResourceNotFoundException") => {
            log_status!("datazone", "{} is not associated with {}, skipping", env.role_arn, env.id);
        }
        Err(e) => return Err(e),
    }

    if let Err(err) = datazone.associate_environment_role(domain_id, &env.id, new_role_arn) {
        log_status!("datazone", "Association failed, restoring {} on {}", env.role_arn, env.id);
        datazone.associate_environment_role(domain_id, &env.id, &env.role_arn)?;
        return Err(err.with_hint(format!(
            "The original role {} was re-associated with environment {}",
            env.role_arn, env.id
        )));
    }

    report.record("datazone.environment_role", &env.id, StepStatus::Applied, Some(detail));
    Ok(())
}

/// Replace the project's execution role with the bring-in role.
pub fn replace_project_role(
    services: &RoleServices<'_>,
    request: &RoleRequest,
    force_update: bool,
    timing: &Timing,
) -> Result<RoleMigration> {
    let mut report = MigrationReport::new(request.execute);

    let project_role = find_project_role(services.iam, &request.project_id)?;
    let environments = environments_with_roles(
        services.datazone,
        &request.domain_id,
        &request.project_id,
        &project_role.arn,
    )?;
    let environment_ids: Vec<String> = environments.iter().map(|e| e.id.clone()).collect();
    let bring_in_role = services.iam.get_role(role_name_from_arn(&request.bring_in_role_arn))?;
    log_status!(
        "role",
        "Replacing {} with {} across {} environment(s)",
        project_role.name,
        bring_in_role.name,
        environments.len()
    );

    merge_trust(services.iam, &mut report, &project_role, &bring_in_role, &bring_in_role)?;
    copy_managed_policies(services.iam, &mut report, &project_role, &bring_in_role, &environment_ids)?;
    copy_inline_policies(services.iam, &mut report, &project_role, &bring_in_role)?;
    copy_tags(services.iam, &mut report, &project_role, &bring_in_role)?;

    update_domain_role(
        services.sagemaker,
        &mut report,
        &request.project_id,
        &bring_in_role.arn,
        force_update,
        &timing.polling,
    )?;

    move_registered_locations(services.lakeformation, &mut report, &project_role.arn, &bring_in_role.arn)?;

    for env in &environments {
        log_status!("role", "Environment {} ({})", env.name, env.id);
        if SUBSCRIPTIONLESS_ENVIRONMENTS.contains(&env.name.as_str()) {
            report.record(
                "datazone.subscriptions",
                &env.id,
                StepStatus::Skipped,
                Some(json!({ "reason": format!("{} environments have no subscription targets", env.name) })),
            );
        } else {
            move_subscriptions(
                services.datazone,
                &mut report,
                &request.domain_id,
                &env.id,
                &bring_in_role.arn,
                &timing.polling,
                timing.subscription_settle,
            )?;
        }

        lakeformation::copy_grants(services.lakeformation, &mut report, &env.role_arn, &bring_in_role.arn, true)?;
        lakeformation::copy_opt_ins(services.lakeformation, &mut report, &env.role_arn, &bring_in_role.arn)?;
        swap_environment_role(services.datazone, &mut report, &request.domain_id, env, &bring_in_role.arn)?;
    }

    Ok(RoleMigration {
        project_role: RoleRef::from(&project_role),
        bring_in_role: RoleRef::from(&bring_in_role),
        environments,
        report,
    })
}

/// Merge the bring-in role's permissions into the project role.
pub fn enhance_project_role(services: &RoleServices<'_>, request: &RoleRequest) -> Result<RoleMigration> {
    let mut report = MigrationReport::new(request.execute);

    let project_role = find_project_role(services.iam, &request.project_id)?;
    let bring_in_role = services.iam.get_role(role_name_from_arn(&request.bring_in_role_arn))?;
    log_status!("role", "Enhancing {} with {}", project_role.name, bring_in_role.name);

    merge_trust(services.iam, &mut report, &project_role, &bring_in_role, &project_role)?;
    copy_managed_policies(services.iam, &mut report, &bring_in_role, &project_role, &[])?;
    copy_inline_policies(services.iam, &mut report, &bring_in_role, &project_role)?;
    copy_tags(services.iam, &mut report, &bring_in_role, &project_role)?;

    lakeformation::copy_grants(services.lakeformation, &mut report, &bring_in_role.arn, &project_role.arn, false)?;
    lakeformation::copy_opt_ins(services.lakeformation, &mut report, &bring_in_role.arn, &project_role.arn)?;

    Ok(RoleMigration {
        project_role: RoleRef::from(&project_role),
        bring_in_role: RoleRef::from(&bring_in_role),
        environments: Vec::new(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::fake::{aws_error, FakeAws};
    use crate::aws::{
        AppOwner, LfResource, PrincipalPermissions, RegisteredResource, SageMakerApp, SageMakerDomain,
        SubscriptionGrant,
    };

    const PROJECT: &str = "prj1";

    fn timing() -> Timing {
        Timing {
            polling: PollingConfig {
                max_attempts: 2,
                delay_seconds: 0,
            },
            subscription_settle: Duration::ZERO,
        }
    }

    fn services(fake: &FakeAws) -> RoleServices<'_> {
        RoleServices {
            iam: fake,
            datazone: fake,
            lakeformation: fake,
            sagemaker: fake,
        }
    }

    fn trust(service: &str) -> serde_json::Value {
        json!({
            "Version": "2012-10-17",
            "Statement": [{ "Effect": "Allow", "Principal": { "Service": service }, "Action": "sts:AssumeRole" }]
        })
    }

    struct Seeded {
        project_arn: String,
        env_role_arn: String,
        byor_arn: String,
    }

    fn seed(fake: &FakeAws) -> Seeded {
        let project_arn = fake.add_role("datazone_usr_role_prj1_abc", trust("datazone.amazonaws.com"));
        let env_role_arn = fake.add_role("datazone_usr_role_prj1_env1", trust("datazone.amazonaws.com"));
        let byor_arn = fake.add_role("byor", trust("sagemaker.amazonaws.com"));

        fake.add_environment("env-1", "Tooling", &[("userRoleArn", env_role_arn.as_str())]);
        fake.add_environment("env-2", "RedshiftServerless", &[]);

        fake.permissions.borrow_mut().push(PrincipalPermissions {
            principal: env_role_arn.clone(),
            resource: LfResource::database("sales"),
            permissions: vec!["DESCRIBE".to_string()],
            permissions_with_grant_option: vec![],
        });
        fake.registered.borrow_mut().push(RegisteredResource {
            resource_arn: "arn:aws:s3:::lake/raw".to_string(),
            role_arn: Some(project_arn.clone()),
        });
        fake.subscription_targets
            .borrow_mut()
            .insert("env-1".to_string(), vec!["target-1".to_string()]);
        fake.subscription_grants.borrow_mut().insert(
            "target-1".to_string(),
            vec![SubscriptionGrant {
                id: "grant-1".to_string(),
                listing_id: Some("listing-1".to_string()),
                listing_revision: Some("1".to_string()),
            }],
        );
        fake.domains.borrow_mut().push(SageMakerDomain {
            id: "d-sm".to_string(),
            name: "SageMakerUnifiedStudio-prj1".to_string(),
        });

        Seeded {
            project_arn,
            env_role_arn,
            byor_arn,
        }
    }

    fn request(byor_arn: &str, execute: bool) -> RoleRequest {
        RoleRequest {
            domain_id: "dzd_1".to_string(),
            project_id: PROJECT.to_string(),
            bring_in_role_arn: byor_arn.to_string(),
            execute,
        }
    }

    #[test]
    fn project_role_found_by_name_fragment() {
        let fake = FakeAws::new();
        fake.add_role("unrelated", json!({}));
        fake.add_role("datazone_usr_role_prj1_xyz", json!({}));
        assert_eq!(find_project_role(&fake, PROJECT).unwrap().name, "datazone_usr_role_prj1_xyz");
    }

    #[test]
    fn missing_project_role_is_not_found() {
        let fake = FakeAws::new();
        let err = find_project_role(&fake, PROJECT).unwrap_err();
        assert_eq!(err.code.as_str(), "role.not_found");
    }

    #[test]
    fn environment_role_falls_back_to_project_role() {
        let fake = FakeAws::new();
        fake.add_environment("env-1", "Tooling", &[("userRoleArn", "arn:env")]);
        fake.add_environment("env-2", "Lakehouse", &[("other", "x")]);

        let envs = environments_with_roles(&fake, "d", PROJECT, "arn:project").unwrap();
        assert_eq!(envs[0].role_arn, "arn:env");
        assert_eq!(envs[1].role_arn, "arn:project");
    }

    #[test]
    fn replace_moves_everything_to_bring_in_role() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);
        fake.grant_statuses
            .borrow_mut()
            .insert("grant-1".to_string(), ["COMPLETED".to_string()].into_iter().collect());

        let result = replace_project_role(&services(&fake), &request(&seeded.byor_arn, true), false, &timing()).unwrap();

        let byor = fake.roles.borrow()[2].clone();
        assert_eq!(statements(&byor.trust_policy).len(), 2);
        assert_eq!(fake.domain_roles.borrow()["d-sm"], seeded.byor_arn);
        assert_eq!(fake.registered.borrow()[0].role_arn.as_deref(), Some(seeded.byor_arn.as_str()));
        assert_eq!(fake.target_principals.borrow()["target-1"], vec![seeded.byor_arn.clone()]);
        assert_eq!(
            fake.calls_to("GrantPermissions"),
            vec![format!("GrantPermissions {} DESCRIBE", seeded.byor_arn)]
        );
        assert_eq!(fake.environment_roles.borrow()["env-1"], vec![seeded.byor_arn.clone()]);
        assert_eq!(fake.environment_roles.borrow()["env-2"], vec![seeded.byor_arn.clone()]);
        assert!(fake
            .calls_to("DisassociateEnvironmentRole")
            .contains(&format!("DisassociateEnvironmentRole env-1 {}", seeded.env_role_arn)));
        assert!(fake
            .calls_to("DisassociateEnvironmentRole")
            .contains(&format!("DisassociateEnvironmentRole env-2 {}", seeded.project_arn)));
        assert_eq!(fake.calls_to("ListSubscriptionTargets"), vec!["ListSubscriptionTargets env-1"]);
        assert_eq!(result.environments.len(), 2);
    }

    #[test]
    fn replace_dry_run_changes_nothing() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);

        let result = replace_project_role(&services(&fake), &request(&seeded.byor_arn, false), true, &timing()).unwrap();

        assert!(fake.mutating_calls().is_empty());
        assert!(result.report.summary.planned > 0);
        assert_eq!(result.report.summary.applied, 0);
    }

    #[test]
    fn forced_dry_run_plans_app_deletions() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);
        fake.apps.borrow_mut().insert(
            "d-sm".to_string(),
            vec![
                SageMakerApp {
                    name: "default".to_string(),
                    app_type: "JupyterLab".to_string(),
                    owner: Some(AppOwner::UserProfile("analyst".to_string())),
                },
                SageMakerApp {
                    name: "shared".to_string(),
                    app_type: "CodeEditor".to_string(),
                    owner: Some(AppOwner::Space("space-1".to_string())),
                },
            ],
        );

        let result = replace_project_role(&services(&fake), &request(&seeded.byor_arn, false), true, &timing()).unwrap();

        let deletions: Vec<_> = result.report.steps_named("sagemaker.delete_app").collect();
        assert_eq!(deletions.len(), 2);
        assert!(deletions.iter().all(|s| s.status == StepStatus::Planned));
        assert_eq!(fake.calls_to("ListApps").len(), 1);
        assert!(fake.calls_to("DeleteApp").is_empty());
        assert!(fake.calls_to("UpdateDomain").is_empty());
        assert!(fake.domain_roles.borrow().get("d-sm").is_none());
    }

    #[test]
    fn failed_association_restores_original_role() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);
        fake.environments.borrow_mut().truncate(1);
        fake.subscription_targets.borrow_mut().clear();
        fake.fail_next("AssociateEnvironmentRole", aws_error("AssociateEnvironmentRole", "AccessDeniedException"));

        let err = replace_project_role(&services(&fake), &request(&seeded.byor_arn, true), false, &timing()).unwrap_err();

        assert!(err.is_aws_code("AccessDeniedException"));
        assert_eq!(fake.environment_roles.borrow()["env-1"], vec![seeded.env_role_arn.clone()]);
    }

    #[test]
    fn missing_disassociation_is_tolerated() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);
        fake.environments.borrow_mut().truncate(1);
        fake.subscription_targets.borrow_mut().clear();
        fake.fail_next(
            "DisassociateEnvironmentRole",
            aws_error("DisassociateEnvironmentRole", "ResourceNotFoundException"),
        );

        replace_project_role(&services(&fake), &request(&seeded.byor_arn, true), false, &timing()).unwrap();
        assert_eq!(fake.environment_roles.borrow()["env-1"], vec![seeded.byor_arn.clone()]);
    }

    #[test]
    fn enhance_merges_into_project_role() {
        let fake = FakeAws::new();
        let seeded = seed(&fake);
        fake.permissions.borrow_mut().push(PrincipalPermissions {
            principal: seeded.byor_arn.clone(),
            resource: LfResource::table("sales", "orders"),
            permissions: vec!["SELECT".to_string()],
            permissions_with_grant_option: vec![],
        });
        fake.inline_policies.borrow_mut().insert(
            "byor".to_string(),
            vec![("extra".to_string(), json!({ "Statement": [] }))],
        );

        let result = enhance_project_role(&services(&fake), &request(&seeded.byor_arn, true)).unwrap();

        let project = fake.roles.borrow()[0].clone();
        assert_eq!(statements(&project.trust_policy).len(), 2);
        assert_eq!(fake.inline_policies.borrow()["datazone_usr_role_prj1_abc"][0].0, "extra");
        assert_eq!(
            fake.calls_to("GrantPermissions"),
            vec![format!("GrantPermissions {} SELECT", seeded.project_arn)]
        );
        assert!(fake.calls_to("ListEnvironments").is_empty());
        assert!(fake.calls_to("UpdateDomain").is_empty());
        assert!(result.report.warnings.is_empty());
    }

    #[test]
    fn identical_trust_is_left_alone() {
        let fake = FakeAws::new();
        fake.add_role("datazone_usr_role_prj1_abc", trust("datazone.amazonaws.com"));
        let byor_arn = fake.add_role("byor", trust("datazone.amazonaws.com"));

        let result = enhance_project_role(&services(&fake), &request(&byor_arn, true)).unwrap();

        assert!(fake.calls_to("UpdateAssumeRolePolicy").is_empty());
        assert_eq!(result.report.steps_named("iam.update_trust_policy").next().unwrap().status, StepStatus::Unchanged);
    }
}

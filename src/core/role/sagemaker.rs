use std::thread;

use serde_json::json;

use crate::aws::{AppOwner, SageMaker, SageMakerApp, SageMakerDomain};
use crate::defaults::PollingConfig;
use crate::error::{Error, Result};
use crate::output::{MigrationReport, StepStatus};

const DOMAIN_PREFIX: &str = "SageMakerUnifiedStudio-";
const DELETED: &str = "Deleted";

pub fn project_domain_name(project_id: &str) -> String {
    format!("{}{}", DOMAIN_PREFIX, project_id)
}

pub fn find_project_domain(sagemaker: &dyn SageMaker, project_id: &str) -> Result<Option<SageMakerDomain>> {
    let name = project_domain_name(project_id);
    Ok(sagemaker.list_domains()?.into_iter().find(|d| d.name.contains(&name)))
}

fn is_gone(err: &Error) -> bool {
    err.is_aws_code("ResourceNotFoundException") || err.is_aws_code("ValidationException")
}

fn wait_for_app_deletion(
    sagemaker: &dyn SageMaker,
    domain_id: &str,
    app: &SageMakerApp,
    owner: &AppOwner,
    polling: &PollingConfig,
) -> Result<()> {
    for attempt in 1..=polling.max_attempts {
        match sagemaker.app_status(domain_id, app, owner) {
            Ok(status) if status == DELETED => return Ok(()),
            Ok(status) => {
                log_status!("sagemaker", "App {} is {} (attempt {})", app.name, status, attempt);
            }
            Err(e) if is_gone(&e) => return Ok(()),
            Err(e) => return Err(e),
        }
        if attempt < polling.max_attempts {
            thread::sleep(polling.delay());
        }
    }
    Err(Error::aws_timeout(
        format!("SageMaker app {} was not deleted in time", app.name),
        polling.max_attempts,
    ))
}

/// Delete every app in the domain and wait for each deletion to finish.
pub fn delete_domain_apps(
    sagemaker: &dyn SageMaker,
    report: &mut MigrationReport,
    domain_id: &str,
    polling: &PollingConfig,
) -> Result<()> {
    for app in sagemaker.list_apps(domain_id)? {
        let Some(owner) = app.owner.clone() else {
            report.record(
                "sagemaker.delete_app",
                &app.name,
                StepStatus::Skipped,
                Some(json!({ "reason": "app has neither a user profile nor a space" })),
            );
            continue;
        };
        let detail = json!({ "domainId": domain_id, "appType": &app.app_type, "owner": &owner });

        if !report.execute {
            report.record("sagemaker.delete_app", &app.name, StepStatus::Planned, Some(detail));
            continue;
        }

        match sagemaker.delete_app(domain_id, &app, &owner) {
            Ok(()) => {}
            Err(e) if e.is_aws_code("ValidationException") => {
                log_status!("sagemaker", "App {} is already deleted", app.name);
                report.record("sagemaker.delete_app", &app.name, StepStatus::Unchanged, Some(detail));
                continue;
            }
            Err(e) => return Err(e),
        }

        wait_for_app_deletion(sagemaker, domain_id, &app, &owner, polling)?;
        report.record("sagemaker.delete_app", &app.name, StepStatus::Applied, Some(detail));
    }
    Ok(())
}

/// Switch the domain's default user and space execution role. Fails while
/// the domain still has running apps; `force` deletes them first.
pub fn update_domain_role(
    sagemaker: &dyn SageMaker,
    report: &mut MigrationReport,
    project_id: &str,
    role_arn: &str,
    force: bool,
    polling: &PollingConfig,
) -> Result<()> {
    let Some(domain) = find_project_domain(sagemaker, project_id)? else {
        log_status!("sagemaker", "No SageMaker domain for project {}", project_id);
        return Ok(());
    };

    if force {
        delete_domain_apps(sagemaker, report, &domain.id, polling)?;
    } else {
        report.warn(format!(
            "Updating SageMaker domain {} requires all of its apps to be deleted; pass --force-update to delete them",
            domain.id
        ));
    }

    report.apply(
        "sagemaker.update_domain",
        &domain.id,
        Some(json!({ "domainName": &domain.name, "executionRole": role_arn })),
        || sagemaker.update_domain_execution_role(&domain.id, role_arn),
    )
}

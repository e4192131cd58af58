//! In-memory stand-in for every service trait. State lives in `RefCell`s so
//! tests can seed it before a run and inspect it afterwards; every call is
//! appended to `calls` as `"<Operation> <args>"`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::Value;

use super::*;
use crate::{Error, Result};

#[derive(Default)]
pub struct FakeAws {
    pub calls: RefCell<Vec<String>>,
    failures: RefCell<HashMap<String, VecDeque<Error>>>,

    // Athena
    pub named_queries: RefCell<Vec<(String, NamedQuery)>>,
    pub athena_tags: RefCell<Vec<(String, String, String)>>,

    // CodeCommit
    pub branch_heads: RefCell<HashMap<(String, String), String>>,
    pub commits: RefCell<Vec<(String, String, String, Vec<PutFile>)>>,

    // DataZone
    pub environments: RefCell<Vec<EnvironmentSummary>>,
    pub environment_resources: RefCell<HashMap<String, Vec<ProvisionedResource>>>,
    pub connections: RefCell<Vec<(String, String)>>,
    pub connection_workgroups: RefCell<HashMap<String, String>>,
    pub subscription_targets: RefCell<HashMap<String, Vec<String>>>,
    pub subscription_grants: RefCell<HashMap<String, Vec<SubscriptionGrant>>>,
    /// Statuses returned by successive polls; a missing entry means not found.
    pub grant_statuses: RefCell<HashMap<String, VecDeque<String>>>,
    pub target_principals: RefCell<HashMap<String, Vec<String>>>,
    pub environment_roles: RefCell<HashMap<String, Vec<String>>>,

    // IAM
    pub roles: RefCell<Vec<IamRole>>,
    pub policies: RefCell<HashMap<String, (ManagedPolicy, Value)>>,
    pub attached_policies: RefCell<HashMap<String, Vec<String>>>,
    pub inline_policies: RefCell<HashMap<String, Vec<(String, Value)>>>,
    pub role_tags: RefCell<HashMap<String, Vec<RoleTag>>>,

    // Lake Formation
    pub permissions: RefCell<Vec<PrincipalPermissions>>,
    pub opt_ins: RefCell<Vec<(String, LfResource)>>,
    pub registered: RefCell<Vec<RegisteredResource>>,
    pub registrations: RefCell<Vec<RegisterResource>>,
    pub admins: RefCell<DataLakeAdmins>,

    // Glue / S3 Tables
    pub glue_tables: RefCell<HashMap<String, Vec<GlueTable>>>,
    pub catalogs: RefCell<Vec<FederatedCatalog>>,
    pub s3_tables: RefCell<Vec<(String, S3TableSummary)>>,

    // SageMaker
    pub domains: RefCell<Vec<SageMakerDomain>>,
    pub apps: RefCell<HashMap<String, Vec<SageMakerApp>>>,
    pub app_statuses: RefCell<HashMap<String, VecDeque<String>>>,
    pub domain_roles: RefCell<HashMap<String, String>>,

    // S3 / EMR
    pub objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
    pub workspace_locations: RefCell<HashMap<String, String>>,
}

pub fn aws_error(operation: &str, code: &str) -> Error {
    Error::aws_service("fake", operation, Some(code.to_string()), format!("{} raised", code))
}

impl FakeAws {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &str, error: Error) {
        self.failures
            .borrow_mut()
            .entry(operation.to_string())
            .or_default()
            .push_back(error);
    }

    fn call(&self, operation: &str, args: impl AsRef<str>) -> Result<()> {
        let args = args.as_ref();
        self.calls.borrow_mut().push(if args.is_empty() {
            operation.to_string()
        } else {
            format!("{} {}", operation, args)
        });
        match self
            .failures
            .borrow_mut()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn calls_to(&self, operation: &str) -> Vec<String> {
        let prefix = format!("{} ", operation);
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.as_str() == operation || c.starts_with(&prefix))
            .cloned()
            .collect()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        const READS: &[&str] = &["List", "Get", "Describe"];
        self.calls
            .borrow()
            .iter()
            .filter(|c| !READS.iter().any(|r| c.starts_with(r)))
            .cloned()
            .collect()
    }

    pub fn add_role(&self, name: &str, trust_policy: Value) -> String {
        let arn = format!("arn:aws:iam::123456789012:role/{}", name);
        self.roles.borrow_mut().push(IamRole {
            name: name.to_string(),
            arn: arn.clone(),
            trust_policy,
        });
        arn
    }

    pub fn add_environment(&self, id: &str, name: &str, resources: &[(&str, &str)]) {
        self.environments.borrow_mut().push(EnvironmentSummary {
            id: id.to_string(),
            name: name.to_string(),
        });
        self.environment_resources.borrow_mut().insert(
            id.to_string(),
            resources
                .iter()
                .map(|(n, v)| ProvisionedResource {
                    name: n.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        );
    }

    fn pop_status(queue: Option<&mut VecDeque<String>>) -> Option<String> {
        let queue = queue?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Athena for FakeAws {
    fn list_named_query_ids(&self, workgroup: &str) -> Result<Vec<String>> {
        self.call("ListNamedQueries", workgroup)?;
        Ok(self
            .named_queries
            .borrow()
            .iter()
            .filter(|(wg, _)| wg == workgroup)
            .map(|(_, q)| q.id.clone())
            .collect())
    }

    fn get_named_query(&self, query_id: &str) -> Result<NamedQuery> {
        self.call("GetNamedQuery", query_id)?;
        self.named_queries
            .borrow()
            .iter()
            .find(|(_, q)| q.id == query_id)
            .map(|(_, q)| q.clone())
            .ok_or_else(|| aws_error("GetNamedQuery", "InvalidRequestException"))
    }

    fn tag_resource(&self, resource_arn: &str, key: &str, value: &str) -> Result<()> {
        self.call("TagResource", format!("{} {}={}", resource_arn, key, value))?;
        self.athena_tags
            .borrow_mut()
            .push((resource_arn.to_string(), key.to_string(), value.to_string()));
        Ok(())
    }
}

impl CodeCommit for FakeAws {
    fn branch_head(&self, repository: &str, branch: &str) -> Result<String> {
        self.call("GetBranch", format!("{} {}", repository, branch))?;
        self.branch_heads
            .borrow()
            .get(&(repository.to_string(), branch.to_string()))
            .cloned()
            .ok_or_else(|| aws_error("GetBranch", "BranchDoesNotExistException"))
    }

    fn create_commit(
        &self,
        repository: &str,
        branch: &str,
        parent_commit_id: &str,
        files: &[PutFile],
    ) -> Result<String> {
        self.call(
            "CreateCommit",
            format!("{} {} parent={} files={}", repository, branch, parent_commit_id, files.len()),
        )?;
        let mut commits = self.commits.borrow_mut();
        let commit_id = format!("commit-{}", commits.len() + 1);
        commits.push((
            repository.to_string(),
            branch.to_string(),
            parent_commit_id.to_string(),
            files.to_vec(),
        ));
        self.branch_heads
            .borrow_mut()
            .insert((repository.to_string(), branch.to_string()), commit_id.clone());
        Ok(commit_id)
    }
}

impl DataZone for FakeAws {
    fn list_environments(&self, domain_id: &str, project_id: &str) -> Result<Vec<EnvironmentSummary>> {
        self.call("ListEnvironments", format!("{} {}", domain_id, project_id))?;
        Ok(self.environments.borrow().clone())
    }

    fn environment_resources(&self, _domain_id: &str, environment_id: &str) -> Result<Vec<ProvisionedResource>> {
        self.call("GetEnvironment", environment_id)?;
        Ok(self
            .environment_resources
            .borrow()
            .get(environment_id)
            .cloned()
            .unwrap_or_default())
    }

    fn list_connections(&self, _domain_id: &str, project_id: &str, kind: &str) -> Result<Vec<String>> {
        self.call("ListConnections", format!("{} {}", project_id, kind))?;
        Ok(self
            .connections
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .map(|(_, id)| id.clone())
            .collect())
    }

    fn update_connection_workgroup(&self, _domain_id: &str, connection_id: &str, workgroup: &str) -> Result<()> {
        self.call("UpdateConnection", format!("{} {}", connection_id, workgroup))?;
        self.connection_workgroups
            .borrow_mut()
            .insert(connection_id.to_string(), workgroup.to_string());
        Ok(())
    }

    fn list_subscription_targets(&self, _domain_id: &str, environment_id: &str) -> Result<Vec<String>> {
        self.call("ListSubscriptionTargets", environment_id)?;
        Ok(self
            .subscription_targets
            .borrow()
            .get(environment_id)
            .cloned()
            .unwrap_or_default())
    }

    fn list_subscription_grants(&self, _domain_id: &str, target_id: &str) -> Result<Vec<SubscriptionGrant>> {
        self.call("ListSubscriptionGrants", target_id)?;
        Ok(self
            .subscription_grants
            .borrow()
            .get(target_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_subscription_grant(&self, _domain_id: &str, grant_id: &str) -> Result<()> {
        self.call("DeleteSubscriptionGrant", grant_id)?;
        for grants in self.subscription_grants.borrow_mut().values_mut() {
            grants.retain(|g| g.id != grant_id);
        }
        Ok(())
    }

    fn subscription_grant_status(&self, _domain_id: &str, grant_id: &str) -> Result<String> {
        self.call("GetSubscriptionGrant", grant_id)?;
        Self::pop_status(self.grant_statuses.borrow_mut().get_mut(grant_id))
            .ok_or_else(|| aws_error("GetSubscriptionGrant", "ResourceNotFoundException"))
    }

    fn update_subscription_target_principals(
        &self,
        _domain_id: &str,
        _environment_id: &str,
        target_id: &str,
        principals: &[String],
    ) -> Result<()> {
        self.call("UpdateSubscriptionTarget", format!("{} {}", target_id, principals.join(",")))?;
        self.target_principals
            .borrow_mut()
            .insert(target_id.to_string(), principals.to_vec());
        Ok(())
    }

    fn create_subscription_grant(
        &self,
        _domain_id: &str,
        _environment_id: &str,
        target_id: &str,
        listing_id: &str,
        listing_revision: &str,
    ) -> Result<String> {
        self.call(
            "CreateSubscriptionGrant",
            format!("{} {}@{}", target_id, listing_id, listing_revision),
        )?;
        let mut grants = self.subscription_grants.borrow_mut();
        let entry = grants.entry(target_id.to_string()).or_default();
        let id = format!("grant-new-{}", entry.len() + 1);
        entry.push(SubscriptionGrant {
            id: id.clone(),
            listing_id: Some(listing_id.to_string()),
            listing_revision: Some(listing_revision.to_string()),
        });
        Ok(id)
    }

    fn associate_environment_role(&self, _domain_id: &str, environment_id: &str, role_arn: &str) -> Result<()> {
        self.call("AssociateEnvironmentRole", format!("{} {}", environment_id, role_arn))?;
        self.environment_roles
            .borrow_mut()
            .entry(environment_id.to_string())
            .or_default()
            .push(role_arn.to_string());
        Ok(())
    }

    fn disassociate_environment_role(&self, _domain_id: &str, environment_id: &str, role_arn: &str) -> Result<()> {
        self.call("DisassociateEnvironmentRole", format!("{} {}", environment_id, role_arn))?;
        if let Some(roles) = self.environment_roles.borrow_mut().get_mut(environment_id) {
            roles.retain(|r| r != role_arn);
        }
        Ok(())
    }
}

impl Iam for FakeAws {
    fn list_role_names(&self) -> Result<Vec<String>> {
        self.call("ListRoles", "")?;
        Ok(self.roles.borrow().iter().map(|r| r.name.clone()).collect())
    }

    fn get_role(&self, role_name: &str) -> Result<IamRole> {
        self.call("GetRole", role_name)?;
        self.roles
            .borrow()
            .iter()
            .find(|r| r.name == role_name)
            .cloned()
            .ok_or_else(|| aws_error("GetRole", "NoSuchEntity"))
    }

    fn update_assume_role_policy(&self, role_name: &str, document: &Value) -> Result<()> {
        self.call("UpdateAssumeRolePolicy", role_name)?;
        if let Some(role) = self.roles.borrow_mut().iter_mut().find(|r| r.name == role_name) {
            role.trust_policy = document.clone();
        }
        Ok(())
    }

    fn list_attached_policy_arns(&self, role_name: &str) -> Result<Vec<String>> {
        self.call("ListAttachedRolePolicies", role_name)?;
        Ok(self
            .attached_policies
            .borrow()
            .get(role_name)
            .cloned()
            .unwrap_or_default())
    }

    fn get_policy(&self, policy_arn: &str) -> Result<ManagedPolicy> {
        self.call("GetPolicy", policy_arn)?;
        self.policies
            .borrow()
            .get(policy_arn)
            .map(|(p, _)| p.clone())
            .ok_or_else(|| aws_error("GetPolicy", "NoSuchEntity"))
    }

    fn get_policy_document(&self, policy_arn: &str, version_id: &str) -> Result<Value> {
        self.call("GetPolicyVersion", format!("{} {}", policy_arn, version_id))?;
        self.policies
            .borrow()
            .get(policy_arn)
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| aws_error("GetPolicyVersion", "NoSuchEntity"))
    }

    fn create_default_policy_version(&self, policy_arn: &str, document: &str) -> Result<()> {
        self.call("CreatePolicyVersion", policy_arn)?;
        let parsed: Value = serde_json::from_str(document)
            .map_err(|e| Error::internal_json(e.to_string(), None))?;
        if let Some((policy, doc)) = self.policies.borrow_mut().get_mut(policy_arn) {
            policy.default_version_id = format!("{}-next", policy.default_version_id);
            *doc = parsed;
        }
        Ok(())
    }

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.call("AttachRolePolicy", format!("{} {}", role_name, policy_arn))?;
        let mut attached = self.attached_policies.borrow_mut();
        let list = attached.entry(role_name.to_string()).or_default();
        if !list.iter().any(|a| a == policy_arn) {
            list.push(policy_arn.to_string());
        }
        Ok(())
    }

    fn list_inline_policy_names(&self, role_name: &str) -> Result<Vec<String>> {
        self.call("ListRolePolicies", role_name)?;
        Ok(self
            .inline_policies
            .borrow()
            .get(role_name)
            .map(|p| p.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default())
    }

    fn get_inline_policy(&self, role_name: &str, policy_name: &str) -> Result<Value> {
        self.call("GetRolePolicy", format!("{} {}", role_name, policy_name))?;
        self.inline_policies
            .borrow()
            .get(role_name)
            .and_then(|p| p.iter().find(|(n, _)| n == policy_name))
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| aws_error("GetRolePolicy", "NoSuchEntity"))
    }

    fn put_inline_policy(&self, role_name: &str, policy_name: &str, document: &Value) -> Result<()> {
        self.call("PutRolePolicy", format!("{} {}", role_name, policy_name))?;
        let mut inline = self.inline_policies.borrow_mut();
        let list = inline.entry(role_name.to_string()).or_default();
        list.retain(|(n, _)| n != policy_name);
        list.push((policy_name.to_string(), document.clone()));
        Ok(())
    }

    fn list_role_tags(&self, role_name: &str) -> Result<Vec<RoleTag>> {
        self.call("ListRoleTags", role_name)?;
        Ok(self.role_tags.borrow().get(role_name).cloned().unwrap_or_default())
    }

    fn tag_role(&self, role_name: &str, tags: &[RoleTag]) -> Result<()> {
        self.call("TagRole", format!("{} tags={}", role_name, tags.len()))?;
        let mut all = self.role_tags.borrow_mut();
        let existing = all.entry(role_name.to_string()).or_default();
        for tag in tags {
            existing.retain(|t| t.key != tag.key);
            existing.push(tag.clone());
        }
        Ok(())
    }
}

impl LakeFormation for FakeAws {
    fn list_permissions(&self, filter: &PermissionFilter) -> Result<Vec<PrincipalPermissions>> {
        self.call(
            "ListPermissions",
            filter.principal.clone().unwrap_or_default(),
        )?;
        Ok(self
            .permissions
            .borrow()
            .iter()
            .filter(|p| filter.principal.as_ref().map_or(true, |f| &p.principal == f))
            .filter(|p| filter.resource.as_ref().map_or(true, |r| &p.resource == r))
            .cloned()
            .collect())
    }

    fn list_opt_ins(&self, principal: &str, resource: Option<&LfResource>) -> Result<Vec<LfResource>> {
        self.call("ListLakeFormationOptIns", principal)?;
        Ok(self
            .opt_ins
            .borrow()
            .iter()
            .filter(|(p, r)| p == principal && resource.map_or(true, |f| r == f))
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn create_opt_in(&self, principal: &str, resource: &LfResource) -> Result<()> {
        self.call("CreateLakeFormationOptIn", principal)?;
        let mut opt_ins = self.opt_ins.borrow_mut();
        if opt_ins.iter().any(|(p, r)| p == principal && r == resource) {
            return Err(aws_error("CreateLakeFormationOptIn", "InvalidInputException"));
        }
        opt_ins.push((principal.to_string(), resource.clone()));
        Ok(())
    }

    fn grant_permissions(
        &self,
        principal: &str,
        resource: &LfResource,
        permissions: &[String],
        grantable: &[String],
    ) -> Result<()> {
        self.call("GrantPermissions", format!("{} {}", principal, permissions.join(",")))?;
        self.permissions.borrow_mut().push(PrincipalPermissions {
            principal: principal.to_string(),
            resource: resource.clone(),
            permissions: permissions.to_vec(),
            permissions_with_grant_option: grantable.to_vec(),
        });
        Ok(())
    }

    fn list_resources(&self, role_arn: Option<&str>) -> Result<Vec<RegisteredResource>> {
        self.call("ListResources", role_arn.unwrap_or_default())?;
        Ok(self
            .registered
            .borrow()
            .iter()
            .filter(|r| role_arn.map_or(true, |arn| r.role_arn.as_deref() == Some(arn)))
            .cloned()
            .collect())
    }

    fn register_resource(&self, request: &RegisterResource) -> Result<()> {
        self.call("RegisterResource", &request.resource_arn)?;
        let mut registered = self.registered.borrow_mut();
        if registered.iter().any(|r| r.resource_arn == request.resource_arn) {
            return Err(aws_error("RegisterResource", "AlreadyExistsException"));
        }
        registered.push(RegisteredResource {
            resource_arn: request.resource_arn.clone(),
            role_arn: request.role_arn.clone(),
        });
        self.registrations.borrow_mut().push(request.clone());
        Ok(())
    }

    fn update_resource(&self, resource_arn: &str, role_arn: &str) -> Result<()> {
        self.call("UpdateResource", format!("{} {}", resource_arn, role_arn))?;
        for resource in self.registered.borrow_mut().iter_mut() {
            if resource.resource_arn == resource_arn {
                resource.role_arn = Some(role_arn.to_string());
            }
        }
        Ok(())
    }

    fn data_lake_admins(&self) -> Result<DataLakeAdmins> {
        self.call("GetDataLakeSettings", "")?;
        Ok(self.admins.borrow().clone())
    }

    fn set_read_only_admins(&self, principals: &[String]) -> Result<()> {
        self.call("PutDataLakeSettings", principals.join(","))?;
        self.admins.borrow_mut().read_only_admins = principals.to_vec();
        Ok(())
    }
}

impl Glue for FakeAws {
    fn get_table(&self, database: &str, table: &str) -> Result<GlueTable> {
        self.call("GetTable", format!("{}.{}", database, table))?;
        self.glue_tables
            .borrow()
            .get(database)
            .and_then(|tables| tables.iter().find(|t| t.name == table))
            .cloned()
            .ok_or_else(|| aws_error("GetTable", "EntityNotFoundException"))
    }

    fn get_tables(&self, database: &str) -> Result<Vec<GlueTable>> {
        self.call("GetTables", database)?;
        Ok(self.glue_tables.borrow().get(database).cloned().unwrap_or_default())
    }

    fn create_federated_catalog(&self, catalog: &FederatedCatalog) -> Result<()> {
        self.call("CreateCatalog", &catalog.name)?;
        let mut catalogs = self.catalogs.borrow_mut();
        if catalogs.iter().any(|c| c.name == catalog.name) {
            return Err(aws_error("CreateCatalog", "AlreadyExistsException"));
        }
        catalogs.push(catalog.clone());
        Ok(())
    }
}

impl S3Tables for FakeAws {
    fn get_table(&self, bucket_arn: &str, namespace: &str, name: &str) -> Result<()> {
        self.call("GetS3Table", format!("{}.{}", namespace, name))?;
        let found = self.s3_tables.borrow().iter().any(|(b, t)| {
            b == bucket_arn && t.name == name && t.namespace.iter().any(|n| n == namespace)
        });
        if found {
            Ok(())
        } else {
            Err(aws_error("GetTable", "NotFoundException"))
        }
    }

    fn list_tables(&self, bucket_arn: &str, namespace: Option<&str>) -> Result<Vec<S3TableSummary>> {
        self.call("ListS3Tables", namespace.unwrap_or("*"))?;
        Ok(self
            .s3_tables
            .borrow()
            .iter()
            .filter(|(b, t)| {
                b == bucket_arn && namespace.map_or(true, |ns| t.namespace.iter().any(|n| n == ns))
            })
            .map(|(_, t)| t.clone())
            .collect())
    }
}

impl SageMaker for FakeAws {
    fn list_domains(&self) -> Result<Vec<SageMakerDomain>> {
        self.call("ListDomains", "")?;
        Ok(self.domains.borrow().clone())
    }

    fn list_apps(&self, domain_id: &str) -> Result<Vec<SageMakerApp>> {
        self.call("ListApps", domain_id)?;
        Ok(self.apps.borrow().get(domain_id).cloned().unwrap_or_default())
    }

    fn delete_app(&self, domain_id: &str, app: &SageMakerApp, _owner: &AppOwner) -> Result<()> {
        self.call("DeleteApp", format!("{} {}", domain_id, app.name))
    }

    fn app_status(&self, _domain_id: &str, app: &SageMakerApp, _owner: &AppOwner) -> Result<String> {
        self.call("DescribeApp", &app.name)?;
        Self::pop_status(self.app_statuses.borrow_mut().get_mut(&app.name))
            .ok_or_else(|| aws_error("DescribeApp", "ResourceNotFoundException"))
    }

    fn update_domain_execution_role(&self, domain_id: &str, role_arn: &str) -> Result<()> {
        self.call("UpdateDomain", format!("{} {}", domain_id, role_arn))?;
        self.domain_roles
            .borrow_mut()
            .insert(domain_id.to_string(), role_arn.to_string());
        Ok(())
    }
}

impl S3 for FakeAws {
    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        self.call("ListObjectsV2", format!("{} {}", bucket, prefix))?;
        Ok(self
            .objects
            .borrow()
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.call("GetObject", format!("{} {}", bucket, key))?;
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| aws_error("GetObject", "NoSuchKey"))
    }
}

impl EmrWorkspaces for FakeAws {
    fn workspace_storage_location(&self, workspace_id: &str) -> Result<String> {
        self.call("DescribeEditorPrivate", workspace_id)?;
        self.workspace_locations
            .borrow()
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| aws_error("DescribeEditorPrivate", "InvalidRequestException"))
    }
}

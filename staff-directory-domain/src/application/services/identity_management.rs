use crate::{
    application::{ports::IdentityGateway, services::ErrorTranslator},
    domain::{
        entities::*,
        errors::{DirectoryError, DirectoryResult, GatewayOperation},
        validation::{self, ValidationRule},
    },
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Identity command and query surface for the staff directory
pub struct IdentityManagementService {
    gateway: Arc<dyn IdentityGateway>,
    translator: ErrorTranslator,
}

impl IdentityManagementService {
    pub fn new(gateway: Arc<dyn IdentityGateway>) -> Self {
        Self::with_translator(gateway, ErrorTranslator::default())
    }

    pub fn with_translator(gateway: Arc<dyn IdentityGateway>, translator: ErrorTranslator) -> Self {
        Self {
            gateway,
            translator,
        }
    }
}

impl IdentityManagementService {
    /// Validate and register a new identity
    #[instrument(skip(self, candidate), fields(handle = %candidate.handle))]
    pub async fn create_identity(
        &self,
        candidate: &NewIdentity,
        send_invite: bool,
    ) -> DirectoryResult<Identity> {
        info!("Creating identity '{}'", candidate.handle);

        validation::validate_new_identity(candidate)?;

        let created = self
            .gateway
            .create(candidate, send_invite)
            .await
            .map_err(|e| {
                self.translator
                    .translate(GatewayOperation::Create, &candidate.handle, e)
            })?;

        info!("Identity '{}' created in provider", created.handle);
        Ok(created)
    }

    /// Disable an identity; the only removal the directory offers
    #[instrument(skip(self))]
    pub async fn disable_identity(&self, handle: &str) -> DirectoryResult<()> {
        validation::require_handle(handle)?;

        info!("Disabling identity '{}'", handle);

        self.gateway
            .disable(handle)
            .await
            .map_err(|e| self.translator.translate(GatewayOperation::Disable, handle, e))
    }

    #[instrument(skip(self))]
    pub async fn enable_identity(&self, handle: &str) -> DirectoryResult<()> {
        validation::require_handle(handle)?;

        info!("Enabling identity '{}'", handle);

        self.gateway
            .enable(handle)
            .await
            .map_err(|e| self.translator.translate(GatewayOperation::Enable, handle, e))
    }

    /// Set a password the identity will not be asked to rotate
    #[instrument(skip(self, password))]
    pub async fn set_permanent_password(&self, handle: &str, password: &str) -> DirectoryResult<()> {
        validation::require_handle(handle)?;

        info!("Setting permanent password for '{}'", handle);

        validation::validate_password(password)?;

        self.gateway
            .set_password(handle, password, true)
            .await
            .map_err(|e| {
                self.translator
                    .translate(GatewayOperation::SetPassword, handle, e)
            })
    }

    /// Assign groups one at a time, in the order given.
    ///
    /// The first failing group stops the loop; groups assigned before it stay
    /// assigned.
    #[instrument(skip(self, groups), fields(group_count = groups.len()))]
    pub async fn add_to_groups(&self, handle: &str, groups: &[String]) -> DirectoryResult<()> {
        if groups.is_empty() {
            info!("No groups provided for '{}', skipping", handle);
            return Ok(());
        }

        validation::require_handle(handle)?;

        info!("Adding '{}' to groups {:?}", handle, groups);

        for group in groups {
            self.gateway
                .add_to_group(handle, group)
                .await
                .map_err(|e| {
                    self.translator
                        .translate(GatewayOperation::add_to_group(group.as_str()), handle, e)
                })?;
        }

        info!("Added '{}' to {} groups", handle, groups.len());
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn find_by_handle(&self, handle: &str) -> DirectoryResult<Identity> {
        validation::require_handle(handle)?;

        info!("Fetching identity '{}'", handle);

        self.gateway
            .get(handle)
            .await
            .map_err(|e| self.translator.translate(GatewayOperation::Get, handle, e))
    }

    /// List identities; `limit <= 0` defers to the provider's page size
    #[instrument(skip(self))]
    pub async fn list(&self, limit: i32, filter: Option<&str>) -> DirectoryResult<Vec<Identity>> {
        info!("Listing identities, limit={}, filter={:?}", limit, filter);

        let identities = self
            .gateway
            .list(limit, filter)
            .await
            .map_err(|e| self.translator.translate(GatewayOperation::List, "", e))?;

        info!("Found {} identities", identities.len());
        Ok(identities)
    }

    #[instrument(skip(self))]
    pub async fn list_groups(&self, handle: &str) -> DirectoryResult<Vec<String>> {
        validation::require_handle(handle)?;

        self.gateway
            .list_groups(handle)
            .await
            .map_err(|e| {
                self.translator
                    .translate(GatewayOperation::ListGroups, handle, e)
            })
    }

    /// Check the attributes present in a partial update; absent ones are not required
    pub fn validate_updatable_attributes(&self, partial: &Attributes) -> DirectoryResult<()> {
        validation::validate_partial_attributes(partial)
    }

    /// Validate and apply a partial attribute update, returning the refreshed identity
    #[instrument(skip(self, partial), fields(attribute_count = partial.len()))]
    pub async fn update_attributes(
        &self,
        handle: &str,
        partial: &Attributes,
    ) -> DirectoryResult<Identity> {
        validation::require_handle(handle)?;

        if partial.is_empty() {
            return Err(DirectoryError::invalid(ValidationRule::EmptyUpdate));
        }

        info!("Updating {} attributes of '{}'", partial.len(), handle);

        self.validate_updatable_attributes(partial)?;

        self.gateway
            .update_attributes(handle, partial)
            .await
            .map_err(|e| {
                self.translator
                    .translate(GatewayOperation::UpdateAttributes, handle, e)
            })?;

        self.find_by_handle(handle).await
    }

    /// Create a staff identity, place it in its role group and fix its password.
    ///
    /// Steps run in order and stop at the first failure without undoing the
    /// earlier ones.
    #[instrument(skip(self, onboarding), fields(handle = %onboarding.candidate.handle, role = %onboarding.role))]
    pub async fn onboard_staff(&self, onboarding: &StaffOnboarding) -> DirectoryResult<Identity> {
        info!(
            "Onboarding '{}' as {}",
            onboarding.candidate.handle, onboarding.role
        );

        let candidate = onboarding.candidate_with_role();
        let mut created = self
            .create_identity(&candidate, onboarding.send_invite)
            .await?;

        let group = onboarding.role.group_name().to_string();
        self.add_to_groups(&created.handle, std::slice::from_ref(&group))
            .await?;

        self.set_permanent_password(&created.handle, candidate.password())
            .await?;

        created.groups.insert(group);

        info!("Onboarded '{}'", created.handle);
        Ok(created)
    }
}

//! Destination ownership checks.
//!
//! Every destination in a request is checked, in request order, before the
//! request is accepted or rejected. A single failure rejects the request,
//! but all failures are reported together.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StagingError;
use crate::models::{Destination, ValidatedDestination};
use crate::platform::PlatformRegistry;

#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Validated destinations grouped by platform id.
    pub validated: BTreeMap<String, Vec<ValidatedDestination>>,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All validated destinations in request order, or the aggregated failure.
    pub fn into_result(self) -> Result<Vec<ValidatedDestination>, StagingError> {
        if !self.errors.is_empty() {
            return Err(StagingError::ValidationFailed(self.errors));
        }
        let mut destinations: Vec<_> = self.validated.into_values().flatten().collect();
        destinations.sort_by_key(|d| d.position);
        Ok(destinations)
    }
}

pub async fn validate_destinations(
    registry: &PlatformRegistry,
    user_id: Uuid,
    destinations: &[Destination],
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for (position, destination) in destinations.iter().enumerate() {
        match validate_destination(registry, user_id, position, destination).await {
            Ok(validated) => {
                debug!(
                    platform = %validated.platform,
                    workspace_id = %validated.workspace_id,
                    position,
                    "[VALIDATE] Destination accepted"
                );
                outcome
                    .validated
                    .entry(validated.platform.clone())
                    .or_default()
                    .push(validated);
            }
            Err(message) => {
                warn!(
                    platform = %destination.platform,
                    workspace_id = %destination.workspace_id,
                    position,
                    error = %message,
                    "[VALIDATE] Destination rejected"
                );
                outcome.errors.push(message);
            }
        }
    }

    info!(
        destinations = destinations.len(),
        errors = outcome.errors.len(),
        "[VALIDATE] Destination validation complete"
    );
    outcome
}

async fn validate_destination(
    registry: &PlatformRegistry,
    user_id: Uuid,
    position: usize,
    destination: &Destination,
) -> Result<ValidatedDestination, String> {
    let platform_id = destination.platform.as_str();
    let workspace_id = destination.workspace_id.as_str();

    let platform = registry
        .get(platform_id)
        .ok_or_else(|| format!("{platform_id} platform does not exist"))?;

    let integration = platform
        .validator
        .user_has_workspace(user_id, workspace_id)
        .await
        .map_err(|e| format!("could not verify {platform_id} workspace {workspace_id}: {e}"))?
        .ok_or_else(|| format!("unauthorized access to {platform_id} workspace {workspace_id}"))?;

    let page_id = destination.page_id().map(str::to_owned);
    if destination.append {
        let Some(page_id) = page_id.as_deref() else {
            return Err(format!(
                "append requested but page_id is missing for platform {platform_id}"
            ));
        };
        let valid = platform
            .validator
            .is_valid_staging_page(user_id, page_id)
            .await
            .map_err(|e| format!("could not validate page_id {page_id} for {platform_id}: {e}"))?;
        if !valid {
            return Err(format!(
                "page_id {page_id} is not a valid draft for platform {platform_id}"
            ));
        }
    }

    Ok(ValidatedDestination {
        position,
        platform: platform_id.to_owned(),
        workspace_id: workspace_id.to_owned(),
        append: destination.append,
        page_id,
        integration,
        creator: platform.creator.clone(),
    })
}

//! Team rosters, derived from the users of a tenant.

use crate::errors::BoError;
use crate::models::{Identity, Team, TeamListResponse, TeamResponse};
use crate::repositories::Store;
use crate::services::tenancy::effective_tenant_id;
use std::collections::BTreeMap;
use tracing::instrument;

/// Active users of the caller's tenant grouped by team. Every team appears,
/// possibly empty; users without a team are left out.
#[instrument(skip_all, name = "bo.service.team.list")]
pub async fn list_teams(store: &dyn Store, caller: &Identity) -> Result<TeamListResponse, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let mut teams: BTreeMap<Team, Vec<Identity>> =
        Team::ALL.iter().map(|t| (*t, Vec::new())).collect();

    for identity in store.list_identities(tenant).await? {
        if !identity.active {
            continue;
        }
        if let Some(team) = identity.team {
            teams.entry(team).or_default().push(identity);
        }
    }

    Ok(TeamListResponse { teams })
}

/// Active users of one team. `name` must be one of the team names.
#[instrument(skip_all, name = "bo.service.team.get", fields(team = %name))]
pub async fn get_team(store: &dyn Store, caller: &Identity, name: &str) -> Result<TeamResponse, BoError> {
    let team: Team = name
        .parse()
        .map_err(|_| BoError::invalid_field("team", "Invalid user team!"))?;
    let tenant = effective_tenant_id(caller)?;

    let users = store
        .list_identities(tenant)
        .await?
        .into_iter()
        .filter(|i| i.active && i.team == Some(team))
        .collect();

    Ok(TeamResponse { team, users })
}

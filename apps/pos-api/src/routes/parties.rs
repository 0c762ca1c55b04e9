//! Customer listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use atlas_core::Party;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::ListResponse;
use crate::AppState;

/// A customer as the till sees it.
#[derive(Debug, Serialize)]
pub struct PartyDto {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<Party> for PartyDto {
    fn from(party: Party) -> Self {
        PartyDto {
            id: party.id,
            name: party.name,
            phone: party.phone,
            email: party.email,
        }
    }
}

/// `GET /pos/parties`
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<PartyDto>>, ApiError> {
    let parties = state.db.parties().list().await?;

    Ok(Json(ListResponse {
        data: parties.into_iter().map(PartyDto::from).collect(),
    }))
}

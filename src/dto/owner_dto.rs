use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::vehicle_dto::VehicleResponse;
use crate::models::{NewOwner, Owner};
use crate::utils::validation::{validate_not_empty, validate_phone};

// Request para registrar un propietario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOwnerRequest {
    #[validate(length(min = 1, max = 120), custom = "validate_not_empty")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
}

impl From<CreateOwnerRequest> for NewOwner {
    fn from(request: CreateOwnerRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: request.phone,
        }
    }
}

// Propietario con sus vehículos
#[derive(Debug, Serialize)]
pub struct OwnerDetailsResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub vehicles: Vec<VehicleResponse>,
}

impl OwnerDetailsResponse {
    pub fn new(owner: Owner, vehicles: Vec<VehicleResponse>) -> Self {
        Self {
            id: owner.id,
            name: owner.name,
            email: owner.email,
            phone: owner.phone,
            created_at: owner.created_at,
            vehicles,
        }
    }
}

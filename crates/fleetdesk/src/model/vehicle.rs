//! Vehicle records.

use serde::{Deserialize, Serialize};

use super::{CachedLabel, Driver, RecordId};

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// Ready for a trip.
    #[default]
    #[serde(rename = "Disponível")]
    Available,
    /// Currently on a trip.
    #[serde(rename = "Em viagem")]
    OnTrip,
    /// In the workshop.
    #[serde(rename = "Manutenção")]
    Maintenance,
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Disponível"),
            Self::OnTrip => write!(f, "Em viagem"),
            Self::Maintenance => write!(f, "Manutenção"),
        }
    }
}

/// A vehicle in the fleet, stored in the `vehicles` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Stable identity.
    pub id: RecordId,

    /// License plate, also used as the vehicle's display value.
    pub plate: String,

    /// Model name.
    #[serde(default)]
    pub model: String,

    /// Model year as entered.
    #[serde(default)]
    pub year: String,

    /// Operational status.
    #[serde(default)]
    pub status: VehicleStatus,

    /// Back-reference to the assigned driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<RecordId>,

    /// Driver name as it was when the assignment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<CachedLabel>,

    /// Odometer reading as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,

    /// Last known location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Date of the next scheduled maintenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance: Option<String>,
}

impl Vehicle {
    /// Check whether this vehicle is linked to the given driver.
    #[must_use]
    pub fn is_held_by(&self, driver_id: &RecordId) -> bool {
        self.driver_id.as_ref() == Some(driver_id)
    }

    /// Link this vehicle to a driver, snapshotting the driver's name.
    pub fn link_driver(&mut self, driver: &Driver) {
        self.driver_id = Some(driver.id.clone());
        self.driver = Some(CachedLabel::snapshot(&driver.nome));
    }

    /// Drop the driver link and its cached label.
    ///
    /// Returns the identity of the driver that was linked, if any.
    pub fn clear_driver(&mut self) -> Option<RecordId> {
        self.driver = None;
        self.driver_id.take()
    }
}

/// Form input for a new vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NewVehicle {
    pub plate: String,
    pub model: String,
    pub year: String,
    pub status: VehicleStatus,
    /// Driver to assign once the vehicle is saved.
    pub driver_id: Option<RecordId>,
    pub mileage: Option<String>,
    pub location: Option<String>,
    pub next_maintenance: Option<String>,
}

impl NewVehicle {
    /// Build the stored record under the given identity.
    ///
    /// The driver link is left empty; it is established by the assignment
    /// module so both sides stay consistent.
    #[must_use]
    pub fn into_vehicle(self, id: RecordId) -> Vehicle {
        Vehicle {
            id,
            plate: self.plate,
            model: self.model,
            year: self.year,
            status: self.status,
            driver_id: None,
            driver: None,
            mileage: self.mileage.filter(|s| !s.is_empty()),
            location: self.location.filter(|s| !s.is_empty()),
            next_maintenance: self.next_maintenance.filter(|s| !s.is_empty()),
        }
    }
}

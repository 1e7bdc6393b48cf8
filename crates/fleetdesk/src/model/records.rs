//! Flat records without cross-collection invariants.
//!
//! Fuelings and freights snapshot the vehicle plate when they are created;
//! tires are only modelled so their collection loads into typed values.

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A refuelling, stored in the `fuelings` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fueling {
    /// Stable identity.
    pub id: RecordId,
    /// Refuelled vehicle.
    pub vehicle_id: RecordId,
    /// Vehicle plate when the fueling was recorded.
    pub vehicle_plate: String,
    /// Date of the fueling.
    pub date: String,
    /// Volume in litres.
    pub liters: f64,
    /// Unit price.
    pub price_per_liter: f64,
    /// `liters * price_per_liter`, rounded to cents.
    pub total: f64,
    /// Odometer reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<u64>,
    /// Station name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Driver name as typed on the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

/// Form input for a new fueling.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct NewFueling {
    pub vehicle_id: RecordId,
    pub date: String,
    pub liters: f64,
    pub price_per_liter: f64,
    pub odometer: Option<u64>,
    pub station: Option<String>,
    pub driver: Option<String>,
}

/// Total cost of a fueling, rounded to two decimal places.
#[must_use]
pub fn fueling_total(liters: f64, price_per_liter: f64) -> f64 {
    (liters * price_per_liter * 100.0).round() / 100.0
}

/// Cargo risk classification of a freight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk.
    #[serde(rename = "Baixo")]
    Low,
    /// Medium risk.
    #[default]
    #[serde(rename = "Médio")]
    Medium,
    /// High risk.
    #[serde(rename = "Alto")]
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Baixo"),
            Self::Medium => write!(f, "Médio"),
            Self::High => write!(f, "Alto"),
        }
    }
}

/// A freight order, stored in the `freights` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freight {
    /// Stable identity.
    pub id: RecordId,
    /// Order reference.
    pub order: String,
    /// Vehicle carrying the freight.
    pub vehicle_id: RecordId,
    /// Vehicle plate when the freight was recorded.
    pub vehicle_plate: String,
    /// Origin city.
    pub origin: String,
    /// Destination city.
    pub destination: String,
    /// Departure date.
    pub date: String,
    /// Freight value.
    pub value: f64,
    /// Risk classification.
    #[serde(default)]
    pub risk: RiskLevel,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Form input for a new freight.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct NewFreight {
    pub order: String,
    pub vehicle_id: RecordId,
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub value: f64,
    pub risk: RiskLevel,
    pub notes: Option<String>,
}

/// Lifecycle status of a tire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TireStatus {
    /// In stock.
    #[default]
    #[serde(rename = "Estoque")]
    InStock,
    /// Mounted on a vehicle.
    #[serde(rename = "Em uso")]
    InUse,
    /// Scrapped.
    #[serde(rename = "Descartado")]
    Discarded,
}

/// A position change within a tire cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TireMovement {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_position: Option<String>,
    pub to_position: String,
}

/// One install-to-removal period of a tire on a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TireCycle {
    pub id: String,
    pub install_date: String,
    pub install_odometer: u64,
    pub vehicle_id: RecordId,
    pub vehicle_plate: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_odometer: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub km_run: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movements: Option<Vec<TireMovement>>,
}

/// A tire, stored in the `tires` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Tire {
    pub id: RecordId,
    pub serial: String,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tread_depth: Option<String>,
    #[serde(default)]
    pub status: TireStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_estimate_km: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_km: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recaps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Vec<TireCycle>>,
}

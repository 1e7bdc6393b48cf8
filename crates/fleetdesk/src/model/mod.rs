//! Record types for every persisted collection.
//!
//! Vehicles and drivers carry the two halves of the assignment relation:
//! `Vehicle::driver_id` and `Driver::veiculo_atual_id`. The matching
//! `driver` and `veiculo_atual` fields are [`CachedLabel`]s copied at
//! assignment time, not live joins.

mod driver;
mod id;
mod records;
mod vehicle;

pub use driver::{format_cpf, format_phone, Driver, DriverStatus, NewDriver};
pub use id::{CachedLabel, RecordId};
pub use records::{
    fueling_total, Freight, Fueling, NewFreight, NewFueling, RiskLevel, Tire, TireCycle,
    TireMovement, TireStatus,
};
pub use vehicle::{NewVehicle, Vehicle, VehicleStatus};

//! Driver and vehicle assignment.
//!
//! The assignment relation is a partial one-to-one mapping kept on both
//! sides: `Vehicle::driver_id` and `Driver::veiculo_atual_id`. Both entry
//! points scan and clear any conflicting links before writing the new one,
//! so a caller never has to unassign first.
//!
//! Unknown identities are not errors. They produce a not-found
//! [`AssignmentOutcome`] and nothing is written.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Driver, RecordId, Vehicle};
use crate::storage::{self, Collection, RecordStore, WriteBatch};

/// Result of an assignment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The driver and vehicle now point at each other.
    Assigned {
        /// The linked driver.
        driver_id: RecordId,
        /// The linked vehicle.
        vehicle_id: RecordId,
    },
    /// The pivot record's link was cleared.
    Unassigned {
        /// Identity the pivot was linked to before the call.
        previous: Option<RecordId>,
    },
    /// The referenced vehicle does not exist; nothing changed.
    VehicleNotFound(RecordId),
    /// The referenced driver does not exist; nothing changed.
    DriverNotFound(RecordId),
}

impl AssignmentOutcome {
    /// Check whether the call changed the collections.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Assigned { .. } | Self::Unassigned { .. })
    }
}

/// Link `driver_id` to `vehicle_id`, or clear the vehicle's driver when
/// `driver_id` is `None`.
///
/// Operates on loaded collections; see [`Assignments`] for the persisted
/// version.
pub fn apply_driver_to_vehicle(
    vehicles: &mut [Vehicle],
    drivers: &mut [Driver],
    driver_id: Option<&RecordId>,
    vehicle_id: &RecordId,
) -> AssignmentOutcome {
    let Some(vehicle_index) = vehicles.iter().position(|v| &v.id == vehicle_id) else {
        return AssignmentOutcome::VehicleNotFound(vehicle_id.clone());
    };

    let Some(driver_id) = driver_id else {
        let previous = vehicles[vehicle_index].clear_driver();
        if let Some(previous_id) = &previous {
            if let Some(holder) = drivers.iter_mut().find(|d| &d.id == previous_id) {
                if holder.holds(vehicle_id) {
                    holder.clear_vehicle();
                }
            }
        }
        return AssignmentOutcome::Unassigned { previous };
    };

    let Some(driver_index) = drivers.iter().position(|d| &d.id == driver_id) else {
        return AssignmentOutcome::DriverNotFound(driver_id.clone());
    };

    for other in vehicles.iter_mut() {
        if &other.id != vehicle_id && other.is_held_by(driver_id) {
            debug!("Releasing vehicle {} from driver {}", other.id, driver_id);
            other.clear_driver();
        }
    }
    for other in drivers.iter_mut() {
        if &other.id != driver_id && other.holds(vehicle_id) {
            debug!("Releasing driver {} from vehicle {}", other.id, vehicle_id);
            other.clear_vehicle();
        }
    }

    link(&mut vehicles[vehicle_index], &mut drivers[driver_index])
}

/// Link `vehicle_id` to `driver_id`, or clear the driver's vehicle when
/// `vehicle_id` is `None`.
///
/// Mirror image of [`apply_driver_to_vehicle`] with the driver as pivot.
pub fn apply_vehicle_to_driver(
    vehicles: &mut [Vehicle],
    drivers: &mut [Driver],
    vehicle_id: Option<&RecordId>,
    driver_id: &RecordId,
) -> AssignmentOutcome {
    let Some(driver_index) = drivers.iter().position(|d| &d.id == driver_id) else {
        return AssignmentOutcome::DriverNotFound(driver_id.clone());
    };

    let Some(vehicle_id) = vehicle_id else {
        let previous = drivers[driver_index].clear_vehicle();
        if let Some(previous_id) = &previous {
            if let Some(held) = vehicles.iter_mut().find(|v| &v.id == previous_id) {
                if held.is_held_by(driver_id) {
                    held.clear_driver();
                }
            }
        }
        return AssignmentOutcome::Unassigned { previous };
    };

    let Some(vehicle_index) = vehicles.iter().position(|v| &v.id == vehicle_id) else {
        return AssignmentOutcome::VehicleNotFound(vehicle_id.clone());
    };

    for other in drivers.iter_mut() {
        if &other.id != driver_id && other.holds(vehicle_id) {
            debug!("Releasing driver {} from vehicle {}", other.id, vehicle_id);
            other.clear_vehicle();
        }
    }
    for other in vehicles.iter_mut() {
        if &other.id != vehicle_id && other.is_held_by(driver_id) {
            debug!("Releasing vehicle {} from driver {}", other.id, driver_id);
            other.clear_driver();
        }
    }

    link(&mut vehicles[vehicle_index], &mut drivers[driver_index])
}

fn link(vehicle: &mut Vehicle, driver: &mut Driver) -> AssignmentOutcome {
    vehicle.link_driver(driver);
    driver.link_vehicle(vehicle);
    AssignmentOutcome::Assigned {
        driver_id: driver.id.clone(),
        vehicle_id: vehicle.id.clone(),
    }
}

/// A violation of the one-to-one assignment relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Several vehicles name the same driver.
    DriverHeldTwice {
        /// The shared driver.
        driver_id: RecordId,
        /// Vehicles naming that driver, in collection order.
        vehicles: Vec<RecordId>,
    },
    /// Several drivers name the same vehicle.
    VehicleHeldTwice {
        /// The shared vehicle.
        vehicle_id: RecordId,
        /// Drivers naming that vehicle, in collection order.
        drivers: Vec<RecordId>,
    },
    /// A vehicle names a driver that does not name it back.
    VehicleLinkUnreturned {
        /// The vehicle holding the link.
        vehicle_id: RecordId,
        /// The driver it names.
        driver_id: RecordId,
    },
    /// A driver names a vehicle that does not name it back.
    DriverLinkUnreturned {
        /// The driver holding the link.
        driver_id: RecordId,
        /// The vehicle it names.
        vehicle_id: RecordId,
    },
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(ids: &[RecordId]) -> String {
            ids.iter()
                .map(RecordId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            Self::DriverHeldTwice { driver_id, vehicles } => {
                write!(f, "driver {driver_id} is held by vehicles {}", join(vehicles))
            }
            Self::VehicleHeldTwice { vehicle_id, drivers } => {
                write!(f, "vehicle {vehicle_id} is held by drivers {}", join(drivers))
            }
            Self::VehicleLinkUnreturned {
                vehicle_id,
                driver_id,
            } => write!(
                f,
                "vehicle {vehicle_id} names driver {driver_id}, which does not name it back"
            ),
            Self::DriverLinkUnreturned {
                driver_id,
                vehicle_id,
            } => write!(
                f,
                "driver {driver_id} names vehicle {vehicle_id}, which does not name it back"
            ),
        }
    }
}

/// Report every violation of the assignment relation without repairing it.
#[must_use]
pub fn find_inconsistencies(vehicles: &[Vehicle], drivers: &[Driver]) -> Vec<Inconsistency> {
    let mut found = Vec::new();

    let mut holders: BTreeMap<&RecordId, Vec<RecordId>> = BTreeMap::new();
    for vehicle in vehicles {
        if let Some(driver_id) = &vehicle.driver_id {
            holders.entry(driver_id).or_default().push(vehicle.id.clone());
        }
    }
    for (driver_id, held_by) in holders {
        if held_by.len() > 1 {
            found.push(Inconsistency::DriverHeldTwice {
                driver_id: driver_id.clone(),
                vehicles: held_by,
            });
        }
    }

    let mut holders: BTreeMap<&RecordId, Vec<RecordId>> = BTreeMap::new();
    for driver in drivers {
        if let Some(vehicle_id) = &driver.veiculo_atual_id {
            holders.entry(vehicle_id).or_default().push(driver.id.clone());
        }
    }
    for (vehicle_id, held_by) in holders {
        if held_by.len() > 1 {
            found.push(Inconsistency::VehicleHeldTwice {
                vehicle_id: vehicle_id.clone(),
                drivers: held_by,
            });
        }
    }

    for vehicle in vehicles {
        if let Some(driver_id) = &vehicle.driver_id {
            let returned = drivers
                .iter()
                .any(|d| &d.id == driver_id && d.holds(&vehicle.id));
            if !returned {
                found.push(Inconsistency::VehicleLinkUnreturned {
                    vehicle_id: vehicle.id.clone(),
                    driver_id: driver_id.clone(),
                });
            }
        }
    }
    for driver in drivers {
        if let Some(vehicle_id) = &driver.veiculo_atual_id {
            let returned = vehicles
                .iter()
                .any(|v| &v.id == vehicle_id && v.is_held_by(&driver.id));
            if !returned {
                found.push(Inconsistency::DriverLinkUnreturned {
                    driver_id: driver.id.clone(),
                    vehicle_id: vehicle_id.clone(),
                });
            }
        }
    }

    found
}

/// Assignment operations over a record store.
///
/// Each call loads both collections, applies the change, and writes both
/// back through one [`WriteBatch`] (vehicles first). Not-found outcomes
/// write nothing.
#[derive(Debug)]
pub struct Assignments<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> Assignments<'a, S> {
    /// Operate on the given store.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Assign a driver to a vehicle, or unassign the vehicle with `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to read or write, or if either
    /// collection holds records that do not decode.
    pub fn assign_driver_to_vehicle(
        &self,
        driver_id: Option<&RecordId>,
        vehicle_id: &RecordId,
    ) -> Result<AssignmentOutcome> {
        self.run(|vehicles, drivers| {
            apply_driver_to_vehicle(vehicles, drivers, driver_id, vehicle_id)
        })
    }

    /// Assign a vehicle to a driver, or unassign the driver with `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to read or write, or if either
    /// collection holds records that do not decode.
    pub fn assign_vehicle_to_driver(
        &self,
        vehicle_id: Option<&RecordId>,
        driver_id: &RecordId,
    ) -> Result<AssignmentOutcome> {
        self.run(|vehicles, drivers| {
            apply_vehicle_to_driver(vehicles, drivers, vehicle_id, driver_id)
        })
    }

    fn run<F>(&self, change: F) -> Result<AssignmentOutcome>
    where
        F: FnOnce(&mut [Vehicle], &mut [Driver]) -> AssignmentOutcome,
    {
        let mut vehicles: Vec<Vehicle> =
            storage::load_for_update(self.store, Collection::Vehicles)?;
        let mut drivers: Vec<Driver> = storage::load_for_update(self.store, Collection::Drivers)?;

        let outcome = change(&mut vehicles, &mut drivers);
        if !outcome.is_applied() {
            debug!("Assignment not applied: {:?}", outcome);
            return Ok(outcome);
        }
        if outcome == (AssignmentOutcome::Unassigned { previous: None }) {
            debug!("Pivot was already unassigned");
            return Ok(outcome);
        }

        WriteBatch::new()
            .put(Collection::Vehicles, &vehicles)?
            .put(Collection::Drivers, &drivers)?
            .commit(self.store)?;

        info!("Assignment applied: {:?}", outcome);
        Ok(outcome)
    }
}

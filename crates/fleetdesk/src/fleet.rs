//! Record lifecycle over a store.
//!
//! [`Fleet`] is what the list views and forms talk to: create records with a
//! generated identity, toggle statuses, delete, and change assignments. Every
//! link change goes through [`crate::assignment`].

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::assignment::{find_inconsistencies, AssignmentOutcome, Assignments, Inconsistency};
use crate::error::{Error, Result};
use crate::model::{
    fueling_total, Driver, Freight, Fueling, NewDriver, NewFreight, NewFueling, NewVehicle,
    RecordId, Tire, Vehicle, VehicleStatus,
};
use crate::storage::{self, Collection, RecordStore};

/// Fleet records backed by a [`RecordStore`].
#[derive(Debug)]
pub struct Fleet<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> Fleet<S> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn assignments(&self) -> Assignments<'_, S> {
        Assignments::new(&self.store)
    }

    /// Load a collection that is about to be saved back.
    fn load_for_update<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        storage::load_for_update(&self.store, collection)
    }

    /// All vehicles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn vehicles(&self) -> Result<Vec<Vehicle>> {
        storage::load(&self.store, Collection::Vehicles)
    }

    /// All drivers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn drivers(&self) -> Result<Vec<Driver>> {
        storage::load(&self.store, Collection::Drivers)
    }

    /// Look up a vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn vehicle(&self, id: &RecordId) -> Result<Option<Vehicle>> {
        Ok(self.vehicles()?.into_iter().find(|v| &v.id == id))
    }

    /// Look up a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn driver(&self, id: &RecordId) -> Result<Option<Driver>> {
        Ok(self.drivers()?.into_iter().find(|d| &d.id == id))
    }

    /// All fuelings, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn fuelings(&self) -> Result<Vec<Fueling>> {
        storage::load(&self.store, Collection::Fuelings)
    }

    /// All freights, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn freights(&self) -> Result<Vec<Freight>> {
        storage::load(&self.store, Collection::Freights)
    }

    /// All tires.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn tires(&self) -> Result<Vec<Tire>> {
        storage::load(&self.store, Collection::Tires)
    }

    /// Register a vehicle.
    ///
    /// When the form names a driver, the vehicle is saved first and the
    /// driver is then assigned through the assignment module. An unknown
    /// driver leaves the vehicle unassigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn add_vehicle(&self, new: NewVehicle) -> Result<Vehicle> {
        let driver_id = new.driver_id.clone();
        let vehicle = new.into_vehicle(RecordId::generate());
        let id = vehicle.id.clone();

        let mut vehicles: Vec<Vehicle> = self.load_for_update(Collection::Vehicles)?;
        vehicles.insert(0, vehicle);
        storage::save(&self.store, Collection::Vehicles, &vehicles)?;
        info!("Added vehicle {} ({})", id, vehicles[0].plate);

        if let Some(driver_id) = driver_id {
            let outcome = self.assign_driver_to_vehicle(Some(&driver_id), &id)?;
            if !outcome.is_applied() {
                warn!("Vehicle {} saved without driver: {:?}", id, outcome);
            }
        }

        self.vehicle(&id)?
            .ok_or_else(|| Error::internal(format!("vehicle {id} vanished after save")))
    }

    /// Register a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn add_driver(&self, new: NewDriver) -> Result<Driver> {
        let driver = new.into_driver(RecordId::generate());

        let mut drivers: Vec<Driver> = self.load_for_update(Collection::Drivers)?;
        drivers.insert(0, driver.clone());
        storage::save(&self.store, Collection::Drivers, &drivers)?;
        info!("Added driver {} ({})", driver.id, driver.nome);
        Ok(driver)
    }

    /// See [`Assignments::assign_driver_to_vehicle`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn assign_driver_to_vehicle(
        &self,
        driver_id: Option<&RecordId>,
        vehicle_id: &RecordId,
    ) -> Result<AssignmentOutcome> {
        self.assignments()
            .assign_driver_to_vehicle(driver_id, vehicle_id)
    }

    /// See [`Assignments::assign_vehicle_to_driver`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn assign_vehicle_to_driver(
        &self,
        vehicle_id: Option<&RecordId>,
        driver_id: &RecordId,
    ) -> Result<AssignmentOutcome> {
        self.assignments()
            .assign_vehicle_to_driver(vehicle_id, driver_id)
    }

    /// Change a vehicle's status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown vehicle, or an error if the
    /// store fails.
    pub fn set_vehicle_status(&self, id: &RecordId, status: VehicleStatus) -> Result<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self.load_for_update(Collection::Vehicles)?;
        let vehicle = vehicles
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| Error::not_found("vehicle", id.as_str()))?;
        vehicle.status = status;
        let updated = vehicle.clone();

        storage::save(&self.store, Collection::Vehicles, &vehicles)?;
        info!("Vehicle {} is now {}", id, status);
        Ok(updated)
    }

    /// Flip a driver between on-trip and available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown driver, or an error if the
    /// store fails.
    pub fn toggle_driver_trip(&self, id: &RecordId) -> Result<Driver> {
        let mut drivers: Vec<Driver> = self.load_for_update(Collection::Drivers)?;
        let driver = drivers
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| Error::not_found("driver", id.as_str()))?;
        driver.status = driver.status.toggled_trip();
        let updated = driver.clone();

        storage::save(&self.store, Collection::Drivers, &drivers)?;
        info!("Driver {} is now {}", id, updated.status);
        Ok(updated)
    }

    /// Delete a vehicle, releasing its driver first.
    ///
    /// Returns `false` if no such vehicle exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove_vehicle(&self, id: &RecordId) -> Result<bool> {
        if !self.assignments().assign_driver_to_vehicle(None, id)?.is_applied() {
            return Ok(false);
        }

        let mut vehicles: Vec<Vehicle> = self.load_for_update(Collection::Vehicles)?;
        vehicles.retain(|v| &v.id != id);
        storage::save(&self.store, Collection::Vehicles, &vehicles)?;
        info!("Removed vehicle {}", id);
        Ok(true)
    }

    /// Delete a driver, releasing their vehicle first.
    ///
    /// Returns `false` if no such driver exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove_driver(&self, id: &RecordId) -> Result<bool> {
        if !self.assignments().assign_vehicle_to_driver(None, id)?.is_applied() {
            return Ok(false);
        }

        let mut drivers: Vec<Driver> = self.load_for_update(Collection::Drivers)?;
        drivers.retain(|d| &d.id != id);
        storage::save(&self.store, Collection::Drivers, &drivers)?;
        info!("Removed driver {}", id);
        Ok(true)
    }

    /// Record a fueling, snapshotting the vehicle plate and computing the total.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-finite quantity or price,
    /// [`Error::NotFound`] for an unknown vehicle, or an error if the store
    /// fails.
    pub fn add_fueling(&self, new: NewFueling) -> Result<Fueling> {
        require_finite("liters", new.liters)?;
        require_finite("price per liter", new.price_per_liter)?;
        let vehicle = self
            .vehicle(&new.vehicle_id)?
            .ok_or_else(|| Error::not_found("vehicle", new.vehicle_id.as_str()))?;

        let fueling = Fueling {
            id: RecordId::generate(),
            vehicle_id: vehicle.id,
            vehicle_plate: vehicle.plate,
            date: new.date,
            liters: new.liters,
            price_per_liter: new.price_per_liter,
            total: fueling_total(new.liters, new.price_per_liter),
            odometer: new.odometer,
            station: new.station.filter(|s| !s.is_empty()),
            driver: new.driver.filter(|s| !s.is_empty()),
        };

        let mut fuelings: Vec<Fueling> = self.load_for_update(Collection::Fuelings)?;
        fuelings.insert(0, fueling.clone());
        storage::save(&self.store, Collection::Fuelings, &fuelings)?;
        info!("Added fueling {} for {}", fueling.id, fueling.vehicle_plate);
        Ok(fueling)
    }

    /// Record a freight, snapshotting the vehicle plate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-finite value,
    /// [`Error::NotFound`] for an unknown vehicle, or an error if the store
    /// fails.
    pub fn add_freight(&self, new: NewFreight) -> Result<Freight> {
        require_finite("value", new.value)?;
        let vehicle = self
            .vehicle(&new.vehicle_id)?
            .ok_or_else(|| Error::not_found("vehicle", new.vehicle_id.as_str()))?;

        let freight = Freight {
            id: RecordId::generate(),
            order: new.order,
            vehicle_id: vehicle.id,
            vehicle_plate: vehicle.plate,
            origin: new.origin,
            destination: new.destination,
            date: new.date,
            value: new.value,
            risk: new.risk,
            notes: new.notes.filter(|s| !s.is_empty()),
        };

        let mut freights: Vec<Freight> = self.load_for_update(Collection::Freights)?;
        freights.insert(0, freight.clone());
        storage::save(&self.store, Collection::Freights, &freights)?;
        info!("Added freight {} for {}", freight.order, freight.vehicle_plate);
        Ok(freight)
    }

    /// Delete a fueling.
    ///
    /// Returns `false` if no such fueling exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove_fueling(&self, id: &RecordId) -> Result<bool> {
        let mut fuelings: Vec<Fueling> = self.load_for_update(Collection::Fuelings)?;
        let before = fuelings.len();
        fuelings.retain(|f| &f.id != id);
        if fuelings.len() == before {
            return Ok(false);
        }

        storage::save(&self.store, Collection::Fuelings, &fuelings)?;
        info!("Removed fueling {}", id);
        Ok(true)
    }

    /// Delete a freight.
    ///
    /// Returns `false` if no such freight exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn remove_freight(&self, id: &RecordId) -> Result<bool> {
        let mut freights: Vec<Freight> = self.load_for_update(Collection::Freights)?;
        let before = freights.len();
        freights.retain(|f| &f.id != id);
        if freights.len() == before {
            return Ok(false);
        }

        storage::save(&self.store, Collection::Freights, &freights)?;
        info!("Removed freight {}", id);
        Ok(true)
    }

    /// Report assignment violations in the stored collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn check_consistency(&self) -> Result<Vec<Inconsistency>> {
        Ok(find_inconsistencies(&self.vehicles()?, &self.drivers()?))
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            field,
            message: format!("{value} is not a number"),
        })
    }
}

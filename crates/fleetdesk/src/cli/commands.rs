//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::model::{DriverStatus, RiskLevel, VehicleStatus};

/// Vehicle commands.
#[derive(Debug, Subcommand)]
pub enum VehicleCommand {
    /// Register a vehicle
    Add(AddVehicleArgs),

    /// List vehicles, newest first
    List(ListArgs),

    /// Show one vehicle
    Show {
        /// Vehicle id
        id: String,
    },

    /// Change a vehicle's status
    Status {
        /// Vehicle id
        id: String,
        /// New status
        #[arg(value_enum)]
        status: VehicleStatusArg,
    },

    /// Delete a vehicle, releasing its driver
    Remove {
        /// Vehicle id
        id: String,
    },
}

/// Arguments for `vehicle add`.
#[derive(Debug, Args)]
pub struct AddVehicleArgs {
    /// License plate
    #[arg(short, long)]
    pub plate: String,

    /// Model name
    #[arg(short, long, default_value = "")]
    pub model: String,

    /// Model year
    #[arg(short, long, default_value = "")]
    pub year: String,

    /// Initial status
    #[arg(short, long, value_enum, default_value = "available")]
    pub status: VehicleStatusArg,

    /// Driver to assign once the vehicle is saved
    #[arg(short, long, value_name = "DRIVER_ID")]
    pub driver: Option<String>,

    /// Odometer reading
    #[arg(long)]
    pub mileage: Option<String>,

    /// Last known location
    #[arg(long)]
    pub location: Option<String>,

    /// Date of the next scheduled maintenance
    #[arg(long)]
    pub next_maintenance: Option<String>,
}

/// Driver commands.
#[derive(Debug, Subcommand)]
pub enum DriverCommand {
    /// Register a driver
    Add(AddDriverArgs),

    /// List drivers, newest first
    List(ListArgs),

    /// Show one driver
    Show {
        /// Driver id
        id: String,
    },

    /// Toggle a driver between on trip and available
    Trip {
        /// Driver id
        id: String,
    },

    /// Delete a driver, releasing their vehicle
    Remove {
        /// Driver id
        id: String,
    },
}

/// Arguments for `driver add`.
#[derive(Debug, Args)]
pub struct AddDriverArgs {
    /// Full name
    #[arg(short, long)]
    pub name: String,

    /// CPF document number, digits or formatted
    #[arg(long, default_value = "")]
    pub cpf: String,

    /// Phone number
    #[arg(short, long, default_value = "")]
    pub phone: String,

    /// Contact e-mail
    #[arg(short, long)]
    pub email: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Driving license number
    #[arg(long, default_value = "")]
    pub license: String,

    /// Driving license category
    #[arg(long, default_value = "")]
    pub license_category: String,

    /// Driving license expiry date
    #[arg(long, default_value = "")]
    pub license_expiry: String,

    /// Hiring date
    #[arg(long)]
    pub hired: Option<String>,

    /// Salary
    #[arg(long)]
    pub salary: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Initial status
    #[arg(short, long, value_enum, default_value = "available")]
    pub status: DriverStatusArg,
}

/// Arguments for `assign`.
#[derive(Debug, Args)]
pub struct AssignArgs {
    /// Driver id
    #[arg(short, long)]
    pub driver: String,

    /// Vehicle id
    #[arg(long)]
    pub vehicle: String,
}

/// Arguments for `unassign`. Exactly one side must be named.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct UnassignArgs {
    /// Clear the driver of this vehicle
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Clear the vehicle of this driver
    #[arg(short, long)]
    pub driver: Option<String>,
}

/// Fueling commands.
#[derive(Debug, Subcommand)]
pub enum FuelCommand {
    /// Record a fueling
    Add(AddFuelArgs),

    /// List fuelings, newest first
    List(ListArgs),

    /// Delete a fueling
    Remove {
        /// Fueling id
        id: String,
    },
}

/// Arguments for `fuel add`.
#[derive(Debug, Args)]
pub struct AddFuelArgs {
    /// Vehicle id
    #[arg(long)]
    pub vehicle: String,

    /// Volume in litres
    #[arg(short, long)]
    pub liters: f64,

    /// Price per litre
    #[arg(short, long)]
    pub price: f64,

    /// Date of the fueling (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Odometer reading
    #[arg(short, long)]
    pub odometer: Option<u64>,

    /// Station name
    #[arg(short, long)]
    pub station: Option<String>,

    /// Driver name
    #[arg(short, long)]
    pub driver: Option<String>,
}

/// Freight commands.
#[derive(Debug, Subcommand)]
pub enum FreightCommand {
    /// Record a freight
    Add(AddFreightArgs),

    /// List freights, newest first
    List(ListArgs),

    /// Delete a freight
    Remove {
        /// Freight id
        id: String,
    },
}

/// Arguments for `freight add`.
#[derive(Debug, Args)]
pub struct AddFreightArgs {
    /// Order reference
    #[arg(long)]
    pub order: String,

    /// Vehicle id
    #[arg(long)]
    pub vehicle: String,

    /// Origin city
    #[arg(long, default_value = "")]
    pub origin: String,

    /// Destination city
    #[arg(long, default_value = "")]
    pub destination: String,

    /// Departure date (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Freight value
    #[arg(long, default_value = "0")]
    pub value: f64,

    /// Cargo risk
    #[arg(short, long, value_enum, default_value = "medium")]
    pub risk: RiskArg,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments shared by list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format (defaults to `display.default_format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Consistency check arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Record store commands.
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Show database statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List stored collection keys
    Keys,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Vehicle status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleStatusArg {
    /// Disponível
    Available,
    /// Em viagem
    OnTrip,
    /// Manutenção
    Maintenance,
}

impl From<VehicleStatusArg> for VehicleStatus {
    fn from(arg: VehicleStatusArg) -> Self {
        match arg {
            VehicleStatusArg::Available => Self::Available,
            VehicleStatusArg::OnTrip => Self::OnTrip,
            VehicleStatusArg::Maintenance => Self::Maintenance,
        }
    }
}

/// Driver status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverStatusArg {
    /// Disponível
    Available,
    /// Em viagem
    OnTrip,
    /// Ativo
    Active,
    /// Inativo
    Inactive,
}

impl From<DriverStatusArg> for DriverStatus {
    fn from(arg: DriverStatusArg) -> Self {
        match arg {
            DriverStatusArg::Available => Self::Available,
            DriverStatusArg::OnTrip => Self::OnTrip,
            DriverStatusArg::Active => Self::Active,
            DriverStatusArg::Inactive => Self::Inactive,
        }
    }
}

/// Freight risk argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RiskArg {
    /// Baixo
    Low,
    /// Médio
    Medium,
    /// Alto
    High,
}

impl From<RiskArg> for RiskLevel {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Low => Self::Low,
            RiskArg::Medium => Self::Medium,
            RiskArg::High => Self::High,
        }
    }
}

/// Output format for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One record per line
    Plain,
    /// Aligned columns
    #[default]
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_status_arg_conversion() {
        assert_eq!(
            VehicleStatus::from(VehicleStatusArg::Available),
            VehicleStatus::Available
        );
        assert_eq!(
            VehicleStatus::from(VehicleStatusArg::OnTrip),
            VehicleStatus::OnTrip
        );
        assert_eq!(
            VehicleStatus::from(VehicleStatusArg::Maintenance),
            VehicleStatus::Maintenance
        );
    }

    #[test]
    fn test_driver_status_arg_conversion() {
        assert_eq!(
            DriverStatus::from(DriverStatusArg::Inactive),
            DriverStatus::Inactive
        );
        assert_eq!(
            DriverStatus::from(DriverStatusArg::OnTrip),
            DriverStatus::OnTrip
        );
    }

    #[test]
    fn test_risk_arg_conversion() {
        assert_eq!(RiskLevel::from(RiskArg::Medium), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(RiskArg::High), RiskLevel::High);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_output_format_serde_names() {
        assert_eq!(serde_json::to_string(&OutputFormat::Plain).unwrap(), r#""plain""#);
        let format: OutputFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, OutputFormat::Json);
    }
}

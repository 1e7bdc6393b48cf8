//! Command-line interface for fleetdesk.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddDriverArgs, AddFreightArgs, AddFuelArgs, AddVehicleArgs, AssignArgs, CheckCommand,
    ConfigCommand, DriverCommand, DriverStatusArg, FreightCommand, FuelCommand, ListArgs,
    OutputFormat, RiskArg, StoreCommand, UnassignArgs, VehicleCommand, VehicleStatusArg,
};

use crate::logging::Verbosity;

/// fleetdesk - Local fleet records
///
/// Keeps vehicles, drivers, fuelings and freights in a local database and
/// guarantees that each driver holds at most one vehicle and vice versa.
#[derive(Debug, Parser)]
#[command(name = "fleetdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage vehicles
    #[command(subcommand)]
    Vehicle(VehicleCommand),

    /// Manage drivers
    #[command(subcommand)]
    Driver(DriverCommand),

    /// Assign a driver to a vehicle, releasing any previous links
    Assign(AssignArgs),

    /// Clear the assignment of a vehicle or a driver
    Unassign(UnassignArgs),

    /// Manage fuelings
    #[command(subcommand)]
    Fuel(FuelCommand),

    /// Manage freights
    #[command(subcommand)]
    Freight(FreightCommand),

    /// Report broken driver and vehicle links
    Check(CheckCommand),

    /// Inspect the record store
    #[command(subcommand)]
    Store(StoreCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "fleetdesk");
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["fleetdesk", "-q", "check"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["fleetdesk", "check"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["fleetdesk", "-v", "check"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["fleetdesk", "-vv", "check"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["fleetdesk", "-c", "/custom/config.toml", "check"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_vehicle_add() {
        let cli = parse(&[
            "fleetdesk", "vehicle", "add", "--plate", "ABC1D23", "--model", "FH 540", "--driver",
            "17",
        ]);
        let Command::Vehicle(VehicleCommand::Add(args)) = cli.command else {
            panic!("expected vehicle add");
        };
        assert_eq!(args.plate, "ABC1D23");
        assert_eq!(args.driver.as_deref(), Some("17"));
        assert_eq!(args.status, VehicleStatusArg::Available);
    }

    #[test]
    fn test_parse_vehicle_status() {
        let cli = parse(&["fleetdesk", "vehicle", "status", "v1", "maintenance"]);
        assert!(matches!(
            cli.command,
            Command::Vehicle(VehicleCommand::Status {
                status: VehicleStatusArg::Maintenance,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_assign() {
        let cli = parse(&["fleetdesk", "assign", "--driver", "d1", "--vehicle", "v1"]);
        let Command::Assign(args) = cli.command else {
            panic!("expected assign");
        };
        assert_eq!(args.driver, "d1");
        assert_eq!(args.vehicle, "v1");
    }

    #[test]
    fn test_parse_unassign_requires_one_side() {
        assert!(Cli::try_parse_from(["fleetdesk", "unassign"]).is_err());
        assert!(
            Cli::try_parse_from(["fleetdesk", "unassign", "--vehicle", "v1", "--driver", "d1"])
                .is_err()
        );

        let cli = parse(&["fleetdesk", "unassign", "--driver", "d1"]);
        let Command::Unassign(args) = cli.command else {
            panic!("expected unassign");
        };
        assert_eq!(args.driver.as_deref(), Some("d1"));
        assert!(args.vehicle.is_none());
    }

    #[test]
    fn test_parse_list_format() {
        let cli = parse(&["fleetdesk", "driver", "list", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Command::Driver(DriverCommand::List(ListArgs {
                format: Some(OutputFormat::Json)
            }))
        ));

        let cli = parse(&["fleetdesk", "fuel", "list"]);
        assert!(matches!(
            cli.command,
            Command::Fuel(FuelCommand::List(ListArgs { format: None }))
        ));
    }

    #[test]
    fn test_parse_freight_add() {
        let cli = parse(&[
            "fleetdesk", "freight", "add", "--order", "PO-9", "--vehicle", "v1", "--risk", "high",
        ]);
        let Command::Freight(FreightCommand::Add(args)) = cli.command else {
            panic!("expected freight add");
        };
        assert_eq!(args.risk, RiskArg::High);
        assert!(args.date.is_none());
    }

    #[test]
    fn test_parse_freight_add_defaults_to_medium_risk() {
        let cli = parse(&["fleetdesk", "freight", "add", "--order", "PO-9", "--vehicle", "v1"]);
        let Command::Freight(FreightCommand::Add(args)) = cli.command else {
            panic!("expected freight add");
        };
        assert_eq!(args.risk, RiskArg::Medium);
    }

    #[test]
    fn test_parse_fuel_and_freight_remove() {
        let cli = parse(&["fleetdesk", "fuel", "remove", "f1"]);
        assert!(matches!(
            cli.command,
            Command::Fuel(FuelCommand::Remove { ref id }) if id == "f1"
        ));

        let cli = parse(&["fleetdesk", "freight", "remove", "fr1"]);
        assert!(matches!(
            cli.command,
            Command::Freight(FreightCommand::Remove { ref id }) if id == "fr1"
        ));
    }

    #[test]
    fn test_parse_store_stats() {
        let cli = parse(&["fleetdesk", "store", "stats", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::Stats { json: true })
        ));
    }
}

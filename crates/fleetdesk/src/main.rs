//! `fleetdesk` - CLI for local fleet records
//!
//! This binary manages vehicles, drivers and their assignments in the local
//! record store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use serde::Serialize;

use fleetdesk::cli::{
    AddDriverArgs, AddFreightArgs, AddFuelArgs, AddVehicleArgs, AssignArgs, CheckCommand, Cli,
    Command, ConfigCommand, DriverCommand, FreightCommand, FuelCommand, ListArgs, OutputFormat,
    StoreCommand, UnassignArgs, VehicleCommand,
};
use fleetdesk::model::{
    Driver, Freight, Fueling, NewDriver, NewFreight, NewFueling, NewVehicle, RecordId, Vehicle,
};
use fleetdesk::{init_logging, AssignmentOutcome, Config, Fleet, RecordStore, SqliteStore};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Vehicle(cmd) => handle_vehicle(&open_fleet(&config)?, &config, cmd),
        Command::Driver(cmd) => handle_driver(&open_fleet(&config)?, &config, cmd),
        Command::Assign(args) => handle_assign(&open_fleet(&config)?, args),
        Command::Unassign(args) => handle_unassign(&open_fleet(&config)?, args),
        Command::Fuel(cmd) => handle_fuel(&open_fleet(&config)?, &config, cmd),
        Command::Freight(cmd) => handle_freight(&open_fleet(&config)?, &config, cmd),
        Command::Check(cmd) => handle_check(&open_fleet(&config)?, &cmd),
        Command::Store(cmd) => handle_store(open_fleet(&config)?.store(), cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_fleet(config: &Config) -> anyhow::Result<Fleet<SqliteStore>> {
    let path = config.database_path();
    let store = SqliteStore::open(&path)
        .with_context(|| format!("opening record store at {}", path.display()))?;
    Ok(Fleet::new(store))
}

fn handle_assign(fleet: &Fleet<SqliteStore>, args: AssignArgs) -> anyhow::Result<()> {
    let outcome = fleet.assign_driver_to_vehicle(
        Some(&RecordId::new(args.driver)),
        &RecordId::new(args.vehicle),
    )?;
    report_outcome(&outcome)
}

fn handle_check(fleet: &Fleet<SqliteStore>, cmd: &CheckCommand) -> anyhow::Result<()> {
    let problems = fleet.check_consistency()?;
    if cmd.json {
        let messages: Vec<String> = problems.iter().map(ToString::to_string).collect();
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else if problems.is_empty() {
        println!("Assignments are consistent.");
    } else {
        for problem in &problems {
            println!("{problem}");
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        bail!("{} assignment problem(s) found", problems.len())
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn report_outcome(outcome: &AssignmentOutcome) -> anyhow::Result<()> {
    match outcome {
        AssignmentOutcome::Assigned {
            driver_id,
            vehicle_id,
        } => println!("Driver {driver_id} now holds vehicle {vehicle_id}"),
        AssignmentOutcome::Unassigned {
            previous: Some(previous),
        } => println!("Released {previous}"),
        AssignmentOutcome::Unassigned { previous: None } => println!("Nothing was assigned"),
        AssignmentOutcome::VehicleNotFound(id) => bail!("vehicle not found: {id}"),
        AssignmentOutcome::DriverNotFound(id) => bail!("driver not found: {id}"),
    }
    Ok(())
}

fn handle_unassign(fleet: &Fleet<SqliteStore>, args: UnassignArgs) -> anyhow::Result<()> {
    let outcome = match (args.vehicle, args.driver) {
        (Some(vehicle), _) => fleet.assign_driver_to_vehicle(None, &RecordId::new(vehicle))?,
        (None, Some(driver)) => fleet.assign_vehicle_to_driver(None, &RecordId::new(driver))?,
        (None, None) => bail!("name a --vehicle or a --driver"),
    };
    report_outcome(&outcome)
}

fn handle_vehicle(
    fleet: &Fleet<SqliteStore>,
    config: &Config,
    cmd: VehicleCommand,
) -> anyhow::Result<()> {
    match cmd {
        VehicleCommand::Add(args) => {
            let vehicle = fleet.add_vehicle(new_vehicle(args))?;
            println!("{}", vehicle.id);
        }
        VehicleCommand::List(args) => {
            let vehicles = config.limit(fleet.vehicles()?);
            print_list(&vehicles, list_format(config, &args), vehicle_row, &VEHICLE_HEADER)?;
        }
        VehicleCommand::Show { id } => {
            let id = RecordId::new(id);
            let Some(vehicle) = fleet.vehicle(&id)? else {
                bail!("vehicle not found: {id}");
            };
            println!("{}", serde_json::to_string_pretty(&vehicle)?);
        }
        VehicleCommand::Status { id, status } => {
            let vehicle = fleet.set_vehicle_status(&RecordId::new(id), status.into())?;
            println!("{} {}", vehicle.plate, vehicle.status);
        }
        VehicleCommand::Remove { id } => {
            let id = RecordId::new(id);
            if !fleet.remove_vehicle(&id)? {
                bail!("vehicle not found: {id}");
            }
            println!("Removed vehicle {id}");
        }
    }
    Ok(())
}

fn new_vehicle(args: AddVehicleArgs) -> NewVehicle {
    NewVehicle {
        plate: args.plate,
        model: args.model,
        year: args.year,
        status: args.status.into(),
        driver_id: args.driver.map(RecordId::new),
        mileage: args.mileage,
        location: args.location,
        next_maintenance: args.next_maintenance,
    }
}

fn handle_driver(
    fleet: &Fleet<SqliteStore>,
    config: &Config,
    cmd: DriverCommand,
) -> anyhow::Result<()> {
    match cmd {
        DriverCommand::Add(args) => {
            let driver = fleet.add_driver(new_driver(args))?;
            println!("{}", driver.id);
        }
        DriverCommand::List(args) => {
            let drivers = config.limit(fleet.drivers()?);
            print_list(&drivers, list_format(config, &args), driver_row, &DRIVER_HEADER)?;
        }
        DriverCommand::Show { id } => {
            let id = RecordId::new(id);
            let Some(driver) = fleet.driver(&id)? else {
                bail!("driver not found: {id}");
            };
            println!("{}", serde_json::to_string_pretty(&driver)?);
        }
        DriverCommand::Trip { id } => {
            let driver = fleet.toggle_driver_trip(&RecordId::new(id))?;
            println!("{} {}", driver.nome, driver.status);
        }
        DriverCommand::Remove { id } => {
            let id = RecordId::new(id);
            if !fleet.remove_driver(&id)? {
                bail!("driver not found: {id}");
            }
            println!("Removed driver {id}");
        }
    }
    Ok(())
}

fn new_driver(args: AddDriverArgs) -> NewDriver {
    NewDriver {
        nome: args.name,
        cpf: args.cpf,
        telefone: args.phone,
        email: args.email,
        endereco: args.address,
        cnh: args.license,
        categoria_cnh: args.license_category,
        vencimento_cnh: args.license_expiry,
        data_admissao: args.hired,
        salario: args.salary,
        observacoes: args.notes,
        status: args.status.into(),
    }
}

fn handle_fuel(fleet: &Fleet<SqliteStore>, config: &Config, cmd: FuelCommand) -> anyhow::Result<()> {
    match cmd {
        FuelCommand::Add(args) => {
            let fueling = fleet.add_fueling(new_fueling(args))?;
            println!("{} {:.2}", fueling.id, fueling.total);
        }
        FuelCommand::List(args) => {
            let fuelings = config.limit(fleet.fuelings()?);
            print_list(&fuelings, list_format(config, &args), fueling_row, &FUELING_HEADER)?;
        }
        FuelCommand::Remove { id } => {
            let id = RecordId::new(id);
            if !fleet.remove_fueling(&id)? {
                bail!("fueling not found: {id}");
            }
            println!("Removed fueling {id}");
        }
    }
    Ok(())
}

fn new_fueling(args: AddFuelArgs) -> NewFueling {
    NewFueling {
        vehicle_id: RecordId::new(args.vehicle),
        date: args.date.unwrap_or_else(today),
        liters: args.liters,
        price_per_liter: args.price,
        odometer: args.odometer,
        station: args.station,
        driver: args.driver,
    }
}

fn handle_freight(
    fleet: &Fleet<SqliteStore>,
    config: &Config,
    cmd: FreightCommand,
) -> anyhow::Result<()> {
    match cmd {
        FreightCommand::Add(args) => {
            let freight = fleet.add_freight(new_freight(args))?;
            println!("{}", freight.id);
        }
        FreightCommand::List(args) => {
            let freights = config.limit(fleet.freights()?);
            print_list(&freights, list_format(config, &args), freight_row, &FREIGHT_HEADER)?;
        }
        FreightCommand::Remove { id } => {
            let id = RecordId::new(id);
            if !fleet.remove_freight(&id)? {
                bail!("freight not found: {id}");
            }
            println!("Removed freight {id}");
        }
    }
    Ok(())
}

fn new_freight(args: AddFreightArgs) -> NewFreight {
    NewFreight {
        order: args.order,
        vehicle_id: RecordId::new(args.vehicle),
        origin: args.origin,
        destination: args.destination,
        date: args.date.unwrap_or_else(today),
        value: args.value,
        risk: args.risk.into(),
        notes: args.notes,
    }
}

fn handle_store(store: &SqliteStore, cmd: StoreCommand) -> anyhow::Result<()> {
    match cmd {
        StoreCommand::Stats { json } => {
            let stats = store.stats()?;
            let last_write = stats.last_write.map(|t| t.to_rfc3339());
            if json {
                let status = serde_json::json!({
                    "database_path": store.path(),
                    "collections": stats.collections,
                    "payload_bytes": stats.payload_bytes,
                    "db_size_bytes": stats.db_size_bytes,
                    "last_write": last_write,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("fleetdesk store");
                println!("---------------");
                println!("Database:      {}", store.path().display());
                println!("Collections:   {}", stats.collections);
                println!("Payload bytes: {}", stats.payload_bytes);
                println!("File size:     {}", stats.db_size_bytes);
                println!(
                    "Last write:    {}",
                    last_write.as_deref().unwrap_or("never")
                );
            }
        }
        StoreCommand::Keys => {
            for key in store.keys()? {
                println!("{key}");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Display]");
                println!("  Default format:  {:?}", config.display.default_format);
                println!("  List limit:      {}", config.display.list_limit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn list_format(config: &Config, args: &ListArgs) -> OutputFormat {
    args.format.unwrap_or(config.display.default_format)
}

const VEHICLE_HEADER: [&str; 5] = ["ID", "PLATE", "MODEL", "STATUS", "DRIVER"];
const DRIVER_HEADER: [&str; 5] = ["ID", "NAME", "CPF", "STATUS", "VEHICLE"];
const FUELING_HEADER: [&str; 5] = ["ID", "DATE", "PLATE", "LITERS", "TOTAL"];
const FREIGHT_HEADER: [&str; 5] = ["ORDER", "DATE", "PLATE", "ROUTE", "VALUE"];

fn vehicle_row(v: &Vehicle) -> Vec<String> {
    vec![
        v.id.to_string(),
        v.plate.clone(),
        v.model.clone(),
        v.status.to_string(),
        v.driver.as_ref().map(ToString::to_string).unwrap_or_default(),
    ]
}

fn driver_row(d: &Driver) -> Vec<String> {
    vec![
        d.id.to_string(),
        d.nome.clone(),
        d.cpf.clone(),
        d.status.to_string(),
        d.veiculo_atual
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    ]
}

fn fueling_row(f: &Fueling) -> Vec<String> {
    vec![
        f.id.to_string(),
        f.date.clone(),
        f.vehicle_plate.clone(),
        format!("{:.2}", f.liters),
        format!("{:.2}", f.total),
    ]
}

fn freight_row(f: &Freight) -> Vec<String> {
    vec![
        f.order.clone(),
        f.date.clone(),
        f.vehicle_plate.clone(),
        format!("{} -> {}", f.origin, f.destination),
        format!("{:.2}", f.value),
    ]
}

fn print_list<T: Serialize>(
    records: &[T],
    format: OutputFormat,
    row: fn(&T) -> Vec<String>,
    header: &[&str],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => {
            for record in records {
                println!("{}", row(record).join("\t"));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = records.iter().map(row).collect();
            let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
            for cells in &rows {
                for (width, cell) in widths.iter_mut().zip(cells) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let header: Vec<String> = header.iter().map(ToString::to_string).collect();
            print_row(&header, &widths);
            for cells in &rows {
                print_row(cells, &widths);
            }
            if rows.is_empty() {
                println!("(no records)");
            }
        }
    }
    Ok(())
}

fn print_row(cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    println!("{}", line.join("  ").trim_end());
}

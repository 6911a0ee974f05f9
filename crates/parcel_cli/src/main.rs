//! Command-line front end for parcel tracking.
//!
//! # Responsibility
//! - Own the database connection and logging setup for one invocation.
//! - Map subcommands onto `ParcelService` use cases and print the results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parcel_core::db::open_db;
use parcel_core::{
    default_log_level, init_logging, ClientId, Parcel, ParcelNumber, ParcelRepository,
    ParcelService, ParcelStore,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parcel-tracker", version, about = "Track parcel shipments in SQLite")]
struct Cli {
    /// SQLite database file; created when missing.
    #[arg(long, value_name = "PATH", default_value = "tracker.db")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new parcel.
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// Show one parcel.
    Show { number: ParcelNumber },
    /// List all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Advance a parcel to its next status.
    NextStatus { number: ParcelNumber },
    /// Change the address of a registered parcel.
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
    /// Walk one client through the full parcel lifecycle.
    Demo,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Show { .. } => "show",
            Self::List { .. } => "list",
            Self::NextStatus { .. } => "next_status",
            Self::SetAddress { .. } => "set_address",
            Self::Delete { .. } => "delete",
            Self::Demo => "demo",
        }
    }

    /// Builds the start-of-command log line. Addresses are left out.
    fn log_line(&self) -> String {
        let target = match self {
            Self::Register { client, .. } | Self::List { client } => format!(" client={client}"),
            Self::Show { number }
            | Self::NextStatus { number }
            | Self::SetAddress { number, .. }
            | Self::Delete { number } => format!(" number={number}"),
            Self::Demo => String::new(),
        };
        format!(
            "event=cli_command module=cli status=start command={}{target}",
            self.name()
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("initializing logging")?;
    }

    let conn = open_db(&cli.db).with_context(|| format!("opening {}", cli.db.display()))?;
    let service = ParcelService::new(ParcelStore::try_new(&conn)?);
    info!("{}", cli.command.log_line());

    run(&service, cli.command)
}

fn run<R: ParcelRepository>(service: &ParcelService<R>, command: Command) -> Result<()> {
    match command {
        Command::Register { client, address } => {
            let parcel = service.register(client, address)?;
            print_registered(&parcel);
        }
        Command::Show { number } => {
            print_parcel(&service.parcel(number)?);
        }
        Command::List { client } => print_client_parcels(service, client)?,
        Command::NextStatus { number } => match service.next_status(number)? {
            Some(status) => println!("Parcel #{number} has a new status: {status}"),
            None => println!("Parcel #{number} has no next status"),
        },
        Command::SetAddress { number, address } => {
            service.change_address(number, &address)?;
            println!("Parcel #{number} will be delivered to {address}");
        }
        Command::Delete { number } => {
            service.delete(number)?;
            println!("Parcel #{number} deleted");
        }
        Command::Demo => run_demo(service)?,
    }
    Ok(())
}

fn run_demo<R: ParcelRepository>(service: &ParcelService<R>) -> Result<()> {
    let client: ClientId = 1;
    let address = "Psk, Sadovaya 5, apt. 13";

    let parcel = service.register(client, address)?;
    print_registered(&parcel);

    let new_address = "Saratov, Vesennyaya 14, apt. 7";
    service.change_address(parcel.number, new_address)?;
    println!("Parcel #{} will be delivered to {new_address}", parcel.number);

    if let Some(status) = service.next_status(parcel.number)? {
        println!("Parcel #{} has a new status: {status}", parcel.number);
    }
    print_client_parcels(service, client)?;

    // Sent parcels are protected; the rejection is part of the walkthrough.
    if let Err(err) = service.delete(parcel.number) {
        println!("Parcel #{} was not deleted: {err}", parcel.number);
    }
    print_client_parcels(service, client)?;

    let parcel = service.register(client, address)?;
    print_registered(&parcel);
    service.delete(parcel.number)?;
    println!("Parcel #{} deleted", parcel.number);
    print_client_parcels(service, client)
}

fn print_client_parcels<R: ParcelRepository>(
    service: &ParcelService<R>,
    client: ClientId,
) -> Result<()> {
    let parcels = service.client_parcels(client)?;
    println!("Parcels of client {client}:");
    for parcel in &parcels {
        print_parcel(parcel);
    }
    println!();
    Ok(())
}

fn print_registered(parcel: &Parcel) {
    println!(
        "New parcel #{} to {} from client {} registered at {}",
        parcel.number, parcel.address, parcel.client, parcel.created_at
    );
}

fn print_parcel(parcel: &Parcel) {
    println!(
        "Parcel #{} to {} from client {} registered at {}, status {}",
        parcel.number, parcel.address, parcel.client, parcel.created_at, parcel.status
    );
}

#[cfg(test)]
mod tests {
    use super::{run, Command};
    use parcel_core::db::open_db_in_memory;
    use parcel_core::{ParcelService, ParcelStatus, ParcelStore};

    #[test]
    fn log_line_never_contains_addresses() {
        let commands = [
            Command::SetAddress {
                number: 1,
                address: "Saratov, Vesennyaya 14".to_string(),
            },
            Command::Register {
                client: 5,
                address: "Saratov, Vesennyaya 14".to_string(),
            },
        ];

        for command in &commands {
            let line = command.log_line();
            assert!(!line.contains("Vesennyaya"), "address in log line: {line}");
        }
        assert_eq!(
            commands[0].log_line(),
            "event=cli_command module=cli status=start command=set_address number=1"
        );
        assert_eq!(
            commands[1].log_line(),
            "event=cli_command module=cli status=start command=register client=5"
        );
    }

    #[test]
    fn demo_leaves_one_sent_parcel_for_client() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(ParcelStore::try_new(&conn).unwrap());

        run(&service, Command::Demo).unwrap();

        let parcels = service.client_parcels(1).unwrap();
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].status, ParcelStatus::Sent);
        assert_eq!(parcels[0].address, "Saratov, Vesennyaya 14, apt. 7");
    }

    #[test]
    fn delete_of_sent_parcel_fails() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(ParcelStore::try_new(&conn).unwrap());
        let number = service.register(2, "addr").unwrap().number;
        run(&service, Command::NextStatus { number }).unwrap();

        assert!(run(&service, Command::Delete { number }).is_err());
        assert_eq!(service.parcel(number).unwrap().status, ParcelStatus::Sent);
    }

    #[test]
    fn show_missing_parcel_fails() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(ParcelStore::try_new(&conn).unwrap());

        assert!(run(&service, Command::Show { number: 404 }).is_err());
    }

    #[test]
    fn set_address_on_registered_parcel_succeeds() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(ParcelStore::try_new(&conn).unwrap());
        let number = service.register(3, "old").unwrap().number;

        run(
            &service,
            Command::SetAddress {
                number,
                address: "new".to_string(),
            },
        )
        .unwrap();

        assert_eq!(service.parcel(number).unwrap().address, "new");
    }

    #[test]
    fn register_and_list_succeed() {
        let conn = open_db_in_memory().unwrap();
        let service = ParcelService::new(ParcelStore::try_new(&conn).unwrap());

        run(
            &service,
            Command::Register {
                client: 9,
                address: "somewhere".to_string(),
            },
        )
        .unwrap();
        run(&service, Command::List { client: 9 }).unwrap();

        assert_eq!(service.client_parcels(9).unwrap().len(), 1);
    }
}

//! Command-line surface of the `parking` binary.
//!
//! ```text
//! parking client create --name N --surname S --plate P [--card C]
//! parking client get <ID>
//! parking client list
//! parking client sessions <ID>
//! parking lot create --address A --places N [--available M] [--closed]
//! parking lot get <ID>
//! parking lot list
//! parking enter <CLIENT_ID> <LOT_ID>
//! parking exit <CLIENT_ID> <LOT_ID>
//! parking health
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::commands::{
    CreateClientRequest, CreateLotRequest, HealthResponse, MessageResponse, ParkingRequest,
    ParkingService,
};
use crate::error::ApiResult;
use parking_core::validation::parse_id;
use parking_core::{Client, ParkingLot, ParkingSession, ValidationError};
use parking_db::SqliteStore;

const ENV_HELP: &str = "\
Environment:
  PARKING_DB_PATH, PARKING_DB_MAX_CONNECTIONS, PARKING_DB_BUSY_TIMEOUT_MS,
  PARKING_DB_RUN_MIGRATIONS, RUST_LOG";

#[derive(Debug, Parser)]
#[command(name = "parking")]
#[command(about = "Parking lot backend: clients, lots and parking sessions")]
#[command(after_help = ENV_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One invocation of the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, look up and list clients
    Client {
        #[command(subcommand)]
        action: ClientCommand,
    },
    /// Create, look up and list parking lots
    Lot {
        #[command(subcommand)]
        action: LotCommand,
    },
    /// Admit a client's vehicle into a lot
    Enter {
        #[arg(value_parser = record_id)]
        client_id: i64,
        #[arg(value_parser = record_id)]
        lot_id: i64,
    },
    /// Pay and leave a lot
    Exit {
        #[arg(value_parser = record_id)]
        client_id: i64,
        #[arg(value_parser = record_id)]
        lot_id: i64,
    },
    /// Database and migration status
    Health,
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        plate: String,
        /// Payment credential; without one the client cannot exit
        #[arg(long = "card")]
        payment_credential: Option<String>,
    },
    Get {
        #[arg(value_parser = record_id)]
        id: i64,
    },
    List,
    /// Parking history, in entry order
    Sessions {
        #[arg(value_parser = record_id)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum LotCommand {
    Create {
        #[arg(long)]
        address: String,
        #[arg(long = "places")]
        total_places: i64,
        /// Defaults to --places
        #[arg(long = "available")]
        available_places: Option<i64>,
        /// Store the lot closed
        #[arg(long)]
        closed: bool,
    },
    Get {
        #[arg(value_parser = record_id)]
        id: i64,
    },
    List,
}

/// Reply of a successful command, printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Client(Client),
    Clients(Vec<Client>),
    Sessions(Vec<ParkingSession>),
    Lot(ParkingLot),
    Lots(Vec<ParkingLot>),
    Message(MessageResponse),
    Health(HealthResponse),
}

impl Command {
    /// Runs the command against the service.
    pub async fn run(self, service: &ParkingService<SqliteStore>) -> ApiResult<Reply> {
        let reply = match self {
            Command::Client { action } => match action {
                ClientCommand::Create {
                    name,
                    surname,
                    plate,
                    payment_credential,
                } => Reply::Client(
                    service
                        .create_client(CreateClientRequest {
                            name,
                            surname,
                            payment_credential,
                            plate,
                        })
                        .await?,
                ),
                ClientCommand::Get { id } => Reply::Client(service.get_client(id).await?),
                ClientCommand::List => Reply::Clients(service.list_clients().await?),
                ClientCommand::Sessions { id } => {
                    Reply::Sessions(service.list_client_sessions(id).await?)
                }
            },
            Command::Lot { action } => match action {
                LotCommand::Create {
                    address,
                    total_places,
                    available_places,
                    closed,
                } => Reply::Lot(
                    service
                        .create_lot(CreateLotRequest {
                            address,
                            opened: !closed,
                            total_places,
                            available_places,
                        })
                        .await?,
                ),
                LotCommand::Get { id } => Reply::Lot(service.get_lot(id).await?),
                LotCommand::List => Reply::Lots(service.list_lots().await?),
            },
            Command::Enter { client_id, lot_id } => {
                Reply::Message(service.enter(ParkingRequest { client_id, lot_id }).await?)
            }
            Command::Exit { client_id, lot_id } => {
                Reply::Message(service.exit(ParkingRequest { client_id, lot_id }).await?)
            }
            Command::Health => Reply::Health(service.health().await?),
        };
        Ok(reply)
    }
}

fn record_id(raw: &str) -> Result<i64, ValidationError> {
    parse_id("id", raw)
}

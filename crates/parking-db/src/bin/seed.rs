//! # Seed Data Generator
//!
//! Populates the database with demo clients and lots for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./parking.db
//! cargo run -p parking-db --bin seed
//!
//! # Specify database path and lot capacity
//! cargo run -p parking-db --bin seed -- --db ./data/parking.db --places 25
//! ```
//!
//! Every third client has no payment credential, so the `NO_PAYMENT_METHOD`
//! path can be tried by hand. The last lot is created closed.

use std::env;

use parking_core::validation::{validate_new_client, validate_new_lot};
use parking_core::{NewClient, NewParkingLot};
use parking_db::{Database, DbConfig};

/// (name, surname, plate)
const CLIENTS: &[(&str, &str, &str)] = &[
    ("Luke", "Skywalker", "X001JW"),
    ("Leia", "Organa", "T004NT"),
    ("Han", "Solo", "F4LCON"),
    ("Padme", "Amidala", "N001NB"),
    ("Lando", "Calrissian", "C1TY01"),
    ("Mace", "Windu", "P0RPL3"),
];

const LOTS: &[&str] = &[
    "Coruscant Jedi Spaceport",
    "Mos Eisley Docking Bay 94",
    "Cloud City Landing Platform",
    "Theed Royal Hangar",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./parking.db");
    let mut places: i64 = 10;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--places" | "-p" => {
                if i + 1 < args.len() {
                    places = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Parking Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./parking.db)");
                println!("  -p, --places <N>     Places per lot (default: 10)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Parking Seed Data Generator");
    println!("===========================");
    println!("Database: {}", db_path);
    println!("Places per lot: {}", places);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.lots().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} lots", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (idx, (name, surname, plate)) in CLIENTS.iter().enumerate() {
        let payment_credential = if idx % 3 == 2 {
            None
        } else {
            Some(format!("4000-0000-0000-{:04}", idx + 1))
        };

        let client = validate_new_client(NewClient {
            name: name.to_string(),
            surname: surname.to_string(),
            payment_credential,
            plate: plate.to_string(),
        })?;

        let created = db.clients().insert(&client).await?;
        println!(
            "  client {:>3}  {} {} ({}){}",
            created.id,
            created.name,
            created.surname,
            created.plate,
            if created.can_pay() { "" } else { "  [no payment method]" }
        );
    }

    for (idx, address) in LOTS.iter().enumerate() {
        let lot = validate_new_lot(NewParkingLot {
            address: address.to_string(),
            opened: idx + 1 < LOTS.len(),
            total_places: places,
            available_places: places,
        })?;

        let created = db.lots().insert(&lot).await?;
        println!(
            "  lot    {:>3}  {} ({} places, {})",
            created.id,
            created.address,
            created.total_places,
            if created.opened { "open" } else { "closed" }
        );
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

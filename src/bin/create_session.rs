use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use finboard::{create_user, get_user_by_name, initialize_db, issue_token};

/// A utility for creating a user and issuing an API token for them.
///
/// The token is printed once, only its digest is stored in the database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    ///
    /// The database is created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// The name of the user to issue the token to.
    #[arg(long, short)]
    name: String,

    /// Issue a token for an existing user instead of creating a new one.
    #[arg(long)]
    existing: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);

    if args.existing && !db_path.is_file() {
        eprintln!("No database found at {db_path:#?}.");
        exit(1);
    }

    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;

    let user = if args.existing {
        get_user_by_name(&args.name, &conn).inspect_err(|_| {
            eprintln!("Could not find a user named \"{}\".", args.name.trim());
        })?
    } else {
        println!("Creating user \"{}\"...", args.name.trim());
        create_user(&args.name, &conn)?
    };

    let token = issue_token(user.id, &conn)?;

    println!("Issued a token for {} (ID {}):", user.name, user.id);
    println!("{token}");
    println!("Send it with each request as the header 'Authorization: Bearer {token}'.");

    Ok(())
}

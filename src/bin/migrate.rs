use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use tracing_subscriber::EnvFilter;

use expense_edge::{
    OwnerColumnUpgrade, add_owner_column, assign_unowned_transactions,
    count_unowned_transactions, get_user_by_email,
};

/// A utility for upgrading an ExpenseEdge database so that transactions record
/// which user created them.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// Give every transaction without an owner to the user with this email.
    #[arg(long)]
    assign_to_email: Option<String>,

    /// Report what would change without writing to the database.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let mut connection = Connection::open(db_path)?;
    let transaction =
        SqlTransaction::new(&mut connection, TransactionBehavior::Exclusive)?;

    match add_owner_column(&transaction)? {
        OwnerColumnUpgrade::Added => {
            tracing::info!("Added the user_id column to the transactions table in {db_path:?}")
        }
        OwnerColumnUpgrade::AlreadyPresent => {
            tracing::info!("The transactions table in {db_path:?} already has the user_id column")
        }
    }

    let unowned = count_unowned_transactions(&transaction)?;
    tracing::info!("{unowned} transactions do not belong to any user");

    if let Some(email) = args.assign_to_email.as_deref() {
        let user = match get_user_by_email(email, &transaction) {
            Ok(user) => user,
            Err(error) => {
                tracing::error!("Could not find the user with email {email}: {error}");
                exit(1);
            }
        };

        let assigned = assign_unowned_transactions(user.id, &transaction)?;
        tracing::info!(
            "Assigned {assigned} transactions without an owner to user {} ({email})",
            user.id
        );
    } else if unowned > 0 {
        tracing::warn!(
            "Transactions without an owner are hidden from every user. \
            Rerun with --assign-to-email to give them to a user."
        );
    }

    if args.dry_run {
        transaction.rollback()?;
        tracing::info!("Dry run, no changes were written");
    } else {
        transaction.commit()?;
        tracing::info!("Migration complete");
    }

    Ok(())
}

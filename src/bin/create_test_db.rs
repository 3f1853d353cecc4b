use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use expense_edge::{
    PasswordHash, SqliteTransactionStore, TransactionInput, TransactionRepository,
    TransactionType, ValidatedPassword, create_legacy_transaction_table, create_user,
    initialize_db,
};

const TEST_EMAIL: &str = "test@example.com";
const TEST_PASSWORD: &str = "test";

/// A utility for creating a test database for the ExpenseEdge server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Create the transactions table without the user_id column, like a
    /// database from before transactions had owners.
    #[arg(long)]
    legacy: bool,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    if args.legacy {
        println!("Using the legacy transactions table");
        create_legacy_transaction_table(&connection)?;
    }

    initialize_db(&connection)?;

    println!("Creating test user {TEST_EMAIL} with the password '{TEST_PASSWORD}'...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let email: EmailAddress = TEST_EMAIL.parse()?;
    let user = create_user(email, password_hash, &connection)?;

    println!("Creating sample transactions...");

    let connection = Arc::new(Mutex::new(connection));
    let store = SqliteTransactionStore::new(connection);
    let transactions = TransactionRepository::new(Arc::new(store))?;

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for months_ago in 0..6 {
        let month_start = start_of_month(today - Duration::days(30 * months_ago));

        for (day, amount, type_, category, description) in sample_month(months_ago) {
            let date = month_start + Duration::days(day);

            if date > today {
                continue;
            }

            transactions.create_transaction(
                Some(user.id),
                TransactionInput {
                    amount: amount.to_string(),
                    type_,
                    category: category.to_owned(),
                    description: description.to_owned(),
                    date: date.to_string(),
                },
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions");
    println!("Success!");

    Ok(())
}

fn start_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The transactions for one month: day offset, amount, type, category and description.
fn sample_month(months_ago: i64) -> [(i64, f64, TransactionType, &'static str, &'static str); 6] {
    // Vary the spending a little so the charts are not flat.
    let extra = (months_ago % 3) as f64 * 45.5;

    [
        (0, 4200.0, TransactionType::Income, "Salary", "Monthly pay"),
        (2, 1650.0, TransactionType::Expense, "Housing", "Rent"),
        (6, 182.35 + extra, TransactionType::Expense, "Food", "Groceries"),
        (11, 64.9, TransactionType::Expense, "Utilities", "Power bill"),
        (17, 350.0 + extra * 4.0, TransactionType::Income, "Freelance", "Website fixes"),
        (23, 89.0 + extra, TransactionType::Expense, "Entertainment", "Concert tickets"),
    ]
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, macros::date};

use accounting_rs::{
    CategoryKind, CategoryName, INTERNAL_CREDIT, INTERNAL_DEBIT, Movement, Subscription,
    SubscriptionKind, create_account, create_category, create_movement, initialize_db,
    save_subscription,
};

/// A utility for creating a test database for the web server of accounting_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating accounts...");
    let current = create_account("Compte courant", "BE68539007547034", &conn)?;
    let savings = create_account("Compte épargne", "BE71096123456769", &conn)?;

    println!("Creating categories...");
    let subscriptions = create_category(
        CategoryName::new("Cotisations")?,
        CategoryKind::Credit,
        &conn,
    )?;
    let donations = create_category(CategoryName::new("Dons")?, CategoryKind::Credit, &conn)?;
    let rent = create_category(CategoryName::new("Loyer")?, CategoryKind::Debit, &conn)?;
    let supplies = create_category(CategoryName::new("Fournitures")?, CategoryKind::Debit, &conn)?;
    let internal_credit = create_category(
        CategoryName::new(INTERNAL_CREDIT)?,
        CategoryKind::Credit,
        &conn,
    )?;
    let internal_debit = create_category(
        CategoryName::new(INTERNAL_DEBIT)?,
        CategoryKind::Debit,
        &conn,
    )?;

    println!("Creating movements...");
    let start = date!(2024 - 01 - 01);
    let members = [
        ("Alice Dupont", "BE43068999999501"),
        ("Bruno Lambert", "BE62510007547061"),
        ("Chloé Martin", "BE56001234567888"),
    ];

    create_movement(
        Movement::build(current.id, start, Decimal::new(2_000_00, 2), "Solde initial"),
        &conn,
    )?;

    let mut month = start;
    while month <= date!(2025 - 12 - 01) {
        for (i, (name, iban)) in members.iter().enumerate() {
            let movement = create_movement(
                Movement::build(
                    current.id,
                    day_of(month, 3 + i as u8),
                    Decimal::new(15_00, 2),
                    &format!("Cotisation {name}"),
                )
                .counter_party(name, iban)
                .category_id(Some(subscriptions.id)),
                &conn,
            )?;

            save_subscription(
                &Subscription {
                    id: None,
                    movement_id: movement.id,
                    member_name: (*name).to_owned(),
                    kind: SubscriptionKind::Monthly,
                    start_month: month,
                    end_month: month,
                    comment: String::new(),
                },
                &conn,
            )?;
        }

        create_movement(
            Movement::build(current.id, day_of(month, 5), Decimal::new(-650_00, 2), "Loyer local")
                .counter_party("Immo SPRL", "BE71096123456769")
                .category_id(Some(rent.id)),
            &conn,
        )?;

        // An uncategorised purchase every other month.
        if month.month() as u8 % 2 == 0 {
            create_movement(
                Movement::build(
                    current.id,
                    day_of(month, 18),
                    Decimal::new(-42_37, 2),
                    "Papeterie",
                )
                .counter_party("Bureau Plus", "BE20001234567856"),
                &conn,
            )?;
        }

        month = next_month(month);
    }

    create_movement(
        Movement::build(current.id, date!(2025 - 03 - 14), Decimal::new(-85_90, 2), "Cartouches")
            .counter_party("Bureau Plus", "BE20001234567856")
            .category_id(Some(supplies.id)),
        &conn,
    )?;
    create_movement(
        Movement::build(current.id, date!(2025 - 06 - 21), Decimal::new(250_00, 2), "Don fête")
            .category_id(Some(donations.id)),
        &conn,
    )?;

    // Moving money to the savings account shows on both accounts.
    let transfer_date = date!(2025 - 09 - 30);
    create_movement(
        Movement::build(current.id, transfer_date, Decimal::new(-500_00, 2), "Épargne")
            .counter_party("Compte épargne", &savings.iban)
            .category_id(Some(internal_debit.id)),
        &conn,
    )?;
    create_movement(
        Movement::build(savings.id, transfer_date, Decimal::new(500_00, 2), "Épargne")
            .counter_party("Compte courant", &current.iban)
            .category_id(Some(internal_credit.id)),
        &conn,
    )?;

    println!("Success!");

    Ok(())
}

fn day_of(month: Date, day: u8) -> Date {
    month.replace_day(day).unwrap_or(month)
}

fn next_month(month: Date) -> Date {
    // Months are always the first of the month, so 31 days later is in the next one.
    day_of(month + Duration::days(31), 1)
}

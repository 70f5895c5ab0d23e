//! Database seeder for POS reporting development and testing.
//!
//! Seeds districts, branches, terminals and today's exchange rates for local
//! development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use posrecon_db::entities::{branches, districts, terminals};
use posrecon_db::{ExchangeRateRepository, RateUpdate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
};

/// District name, then its branches.
const DISTRICTS: [(&str, [&str; 2]); 3] = [
    ("Central", ["Main Branch", "Market Street"]),
    ("North", ["Airport", "University"]),
    ("South", ["Harbour", "Riverside"]),
];

/// Terminal code, merchant name, branch, retired.
const TERMINALS: [(&str, &str, &str, bool); 8] = [
    ("10000001", "City Grocer", "Main Branch", false),
    ("10000002", "Blue Cafe", "Main Branch", false),
    ("10000003", "Market Pharmacy", "Market Street", false),
    ("10000004", "Duty Free", "Airport", false),
    ("10000005", "Campus Books", "University", false),
    ("10000006", "Harbour Fuel", "Harbour", false),
    ("10000007", "River Hotel", "Riverside", false),
    ("10000008", "Closed Kiosk", "Riverside", true),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = posrecon_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding districts and branches...");
    seed_districts(&db).await;

    println!("Seeding terminals...");
    seed_terminals(&db).await;

    println!("Seeding exchange rates...");
    seed_exchange_rates(&db).await;

    println!("Seeding complete!");
}

/// Seeds districts and their branches.
async fn seed_districts(db: &DatabaseConnection) {
    for (district_name, branch_names) in DISTRICTS {
        let district = match districts::Entity::find()
            .filter(districts::Column::Name.eq(district_name))
            .one(db)
            .await
        {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                let model = districts::ActiveModel {
                    id: NotSet,
                    name: Set(district_name.to_string()),
                    created_at: NotSet,
                };
                match model.insert(db).await {
                    Ok(created) => created,
                    Err(e) => {
                        eprintln!("Failed to insert district {district_name}: {e}");
                        continue;
                    }
                }
            }
            Err(e) => {
                eprintln!("Failed to look up district {district_name}: {e}");
                continue;
            }
        };

        for branch_name in branch_names {
            if find_branch(db, branch_name).await.is_some() {
                println!("  Branch {branch_name} already exists, skipping...");
                continue;
            }
            let branch = branches::ActiveModel {
                id: NotSet,
                name: Set(branch_name.to_string()),
                district_id: Set(Some(district.id)),
                created_at: NotSet,
            };
            if let Err(e) = branch.insert(db).await {
                eprintln!("Failed to insert branch {branch_name}: {e}");
            } else {
                println!("  Created branch {branch_name} in {district_name}");
            }
        }
    }
}

async fn find_branch(db: &DatabaseConnection, name: &str) -> Option<branches::Model> {
    branches::Entity::find()
        .filter(branches::Column::Name.eq(name))
        .one(db)
        .await
        .ok()
        .flatten()
}

/// Seeds terminals with a zero grand total.
async fn seed_terminals(db: &DatabaseConnection) {
    let mut inserted = 0;

    for (code, merchant, branch_name, retired) in TERMINALS {
        if terminals::Entity::find()
            .filter(terminals::Column::Code.eq(code))
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            continue;
        }

        let terminal = terminals::ActiveModel {
            id: NotSet,
            code: Set(code.to_string()),
            display_name: Set(Some(merchant.to_string())),
            branch_id: Set(find_branch(db, branch_name).await.map(|b| b.id)),
            is_retired: Set(retired),
            grand_total: Set(Decimal::ZERO),
            grand_total_updated_at: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        };

        if let Err(e) = terminal.insert(db).await {
            eprintln!("Failed to insert terminal {code}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Created {inserted} terminals");
}

/// Seeds today's rates so an extract for today can be ingested.
async fn seed_exchange_rates(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let repo = ExchangeRateRepository::new(db.clone());
    let update = RateUpdate {
        vc: dec!(4100.00),
        mc: dec!(4100.00),
        cup: dec!(565.50),
    };

    match repo.update_rates(update, today).await {
        Ok(rates) => {
            for rate in rates {
                println!("  {} = {} (as of {today})", rate.currency, rate.rate);
            }
        }
        Err(e) => eprintln!("Failed to update exchange rates: {e}"),
    }
}

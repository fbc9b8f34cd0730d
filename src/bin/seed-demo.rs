//! Demo plan seed script
//!
//! Writes one sample weekly plan through the same validation and store path
//! the API uses, then prints the stored summaries.
//!
//! Usage:
//!   FIREBASE_DATABASE_URL=... ./seed-demo --child-name "Mia" --age 6
//!
//! Environment variables: the same as the API (`PLAN_STORE_BACKEND`,
//! `FIREBASE_DATABASE_URL`, `FIREBASE_AUTH`, `PLAN_COLLECTION`).

use anyhow::Context;
use clap::Parser;

use nutricare_api::{
    config::Config,
    db::build_store,
    models::plan::{CreatePlanRequest, DayMeals, DayName},
    services::plans::PlanService,
};

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed a demo weekly meal plan")]
struct Args {
    /// Child the plan belongs to
    #[arg(long, default_value = "Demo Child")]
    child_name: String,
    /// Age in years (3 to 18)
    #[arg(long, default_value_t = 7)]
    age: i64,
    /// Parent email stored with the plan
    #[arg(long, env = "DEMO_PARENT_EMAIL")]
    email: Option<String>,
}

const DEMO_MEALS: [(&str, &str, &str, &str); 7] = [
    ("Oatmeal with Berries", "Chicken Wrap", "Apple Slices", "Vegetable Pasta"),
    ("Scrambled Eggs", "Lentil Soup", "Yogurt", "Baked Salmon"),
    ("Whole Grain Toast", "Turkey Sandwich", "Carrot Sticks", "Bean Chili"),
    ("Banana Pancakes", "Rice and Beans", "Cheese Cubes", "Chicken Stir Fry"),
    ("Muesli", "Tuna Salad", "Grapes", "Homemade Pizza"),
    ("French Toast", "Veggie Burger", "Popcorn", "Fish Tacos"),
    ("Fruit Smoothie", "Roast Chicken", "Pear", "Vegetable Curry"),
];

fn demo_week() -> Vec<DayMeals> {
    DayName::WEEK
        .into_iter()
        .zip(DEMO_MEALS)
        .map(|(day, (breakfast, lunch, snack, dinner))| DayMeals {
            day,
            breakfast: breakfast.into(),
            lunch: lunch.into(),
            snack: snack.into(),
            dinner: dinner.into(),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let store = build_store(&config)?.context("No plan store configured (set FIREBASE_DATABASE_URL)")?;
    let plans = PlanService::new(Some(store));

    println!("=== Seed Demo Plan ===");

    let plan = plans
        .create(CreatePlanRequest {
            child_name: args.child_name,
            age: args.age,
            email: args.email,
            days: demo_week(),
        })
        .await
        .context("Failed to save demo plan")?;
    println!("  Saved plan {} for {}", plan.id, plan.child_name);

    for (id, summary) in plans.list().await? {
        println!("  {} (ID: {id}), age {}", summary.child_name, summary.age);
    }

    println!("=== Done ===");
    Ok(())
}

//! Development seed script. Populates a fresh database with a sample team.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SEED_PASSWORD: &str = "Test123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = maven_jobs::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== Maven Jobs Seed Script ===");

    let hash = maven_jobs::services::auth::hash_password(SEED_PASSWORD)?;

    let hod = seed_user(&pool, "hod@maven.local", "Head of Department", &["HOD", "ADMIN"], None, &hash).await?;
    let manager = seed_user(&pool, "manager@maven.local", "Team Manager", &["MANAGER"], Some(hod), &hash).await?;
    let lg1 = seed_user(&pool, "leadgen1@maven.local", "LeadGen One", &["LEADGEN"], Some(manager), &hash).await?;
    let lg2 = seed_user(&pool, "leadgen2@maven.local", "LeadGen Two", &["LEADGEN"], Some(manager), &hash).await?;
    let fse = seed_user(&pool, "fse@maven.local", "Field Sales", &["FSE"], Some(manager), &hash).await?;
    seed_user(&pool, "ops@maven.local", "Operations Desk", &["OPERATIONS"], None, &hash).await?;

    seed_corporate_leads(&pool, lg1, "Northwind Traders", false).await?;
    seed_corporate_leads(&pool, lg2, "Brightlane Labs", true).await?;
    seed_domestic_client(&pool, fse).await?;

    println!("\n=== Seed complete! ===");
    println!("All seed users log in with password {SEED_PASSWORD}");

    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    roles: &[&str],
    manager_id: Option<Uuid>,
    hash: &str,
) -> anyhow::Result<Uuid> {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, password_hash, name, roles, manager_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
        SET password_hash = EXCLUDED.password_hash,
            roles = EXCLUDED.roles,
            manager_id = EXCLUDED.manager_id
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(hash)
    .bind(name)
    .bind(&roles)
    .bind(manager_id)
    .fetch_one(pool)
    .await?;

    println!("[done] User {email} ({})", roles.join(", "));
    Ok(id)
}

async fn seed_corporate_leads(
    pool: &PgPool,
    leadgen_id: Uuid,
    company: &str,
    startup: bool,
) -> anyhow::Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM corporate_leadgen_leads WHERE company_name = $1)",
    )
    .bind(company)
    .fetch_one(pool)
    .await?;
    if exists {
        println!("[skip] Lead {company} already exists");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let lead_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO corporate_leadgen_leads (leadgen_id, company_name, contact_person, is_startup, sourcing_date)
        VALUES ($1, $2, 'Priya Sharma', $3, $4)
        RETURNING id
        "#,
    )
    .bind(leadgen_id)
    .bind(company)
    .bind(startup)
    .bind(today)
    .fetch_one(pool)
    .await?;

    let calls = [
        (2, "Not Picked", None),
        (1, "Picked", Some("Franchise discussed")),
        (0, "Interested", Some("Form shared")),
    ];
    for (days_ago, status, franchise) in calls {
        sqlx::query(
            r#"
            INSERT INTO corporate_leads_interaction
                (lead_id, leadgen_id, contact_date, contact_person, status, franchise_status)
            VALUES ($1, $2, $3, 'Priya Sharma', $4, $5)
            "#,
        )
        .bind(lead_id)
        .bind(leadgen_id)
        .bind(today - Duration::days(days_ago))
        .bind(status)
        .bind(franchise)
        .execute(pool)
        .await?;
    }

    println!("[done] Lead {company} with {} calls", calls.len());
    Ok(())
}

async fn seed_domestic_client(pool: &PgPool, fse_id: Uuid) -> anyhow::Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM domestic_clients WHERE client_name = 'Harbor Logistics')",
    )
    .fetch_one(pool)
    .await?;
    if exists {
        println!("[skip] Domestic client already exists");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let client_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO domestic_clients (fse_id, client_name, contact_person, location, sourcing_date)
        VALUES ($1, 'Harbor Logistics', 'Arjun Mehta', 'Pune', $2)
        RETURNING id
        "#,
    )
    .bind(fse_id)
    .bind(today)
    .fetch_one(pool)
    .await?;

    for (days_ago, status) in [(3, "Visited"), (1, "Onboarded")] {
        sqlx::query(
            r#"
            INSERT INTO domestic_clients_interaction (client_id, fse_id, contact_date, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(client_id)
        .bind(fse_id)
        .bind(today - Duration::days(days_ago))
        .bind(status)
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO job_descriptions (client_id, title, description, location, openings, created_by)
        VALUES ($1, 'Warehouse Supervisor', 'Supervise inbound and outbound shifts.', 'Pune', 2, $2)
        "#,
    )
    .bind(client_id)
    .bind(fse_id)
    .execute(pool)
    .await?;

    println!("[done] Domestic client Harbor Logistics with visits and a job description");
    Ok(())
}

//! Utility to seed demo client profiles into the database.

use dotenvy::dotenv;
use rust_credit_api::db_storage::PgClientStore;
use rust_credit_api::models::{CreateClientRequest, CreditMix, MinPayment, ScoreLabel};
use rust_credit_api::repository::ClientRepository;
use rust_credit_api::scoring::compute_score;
use sqlx::postgres::PgPoolOptions;
use std::env;

fn demo_clients() -> Vec<CreateClientRequest> {
    vec![
        CreateClientRequest {
            nom: Some("Martin".to_string()),
            prenom: Some("Sophie".to_string()),
            age: Some(42),
            credit_utilization_ratio: Some(8.5),
            payment_of_min_amount: Some(MinPayment::Yes),
            credit_mix: Some(CreditMix::Good),
            num_of_delayed_payment: Some(0),
            credit_history_age_months: Some(180),
            monthly_balance: Some(3200.0),
            outstanding_debt: Some(4500.0),
            amount_invested_monthly: Some(650.0),
            num_credit_inquiries: Some(1),
            credit_score: Some(ScoreLabel::Good),
            ..Default::default()
        },
        CreateClientRequest {
            nom: Some("Bernard".to_string()),
            prenom: Some("Luc".to_string()),
            age: Some(35),
            credit_utilization_ratio: Some(24.0),
            payment_of_min_amount: Some(MinPayment::Yes),
            credit_mix: Some(CreditMix::Standard),
            num_of_delayed_payment: Some(2),
            credit_history_age_months: Some(72),
            monthly_balance: Some(900.0),
            outstanding_debt: Some(8000.0),
            amount_invested_monthly: Some(150.0),
            num_credit_inquiries: Some(3),
            credit_score: Some(ScoreLabel::Standard),
            ..Default::default()
        },
        CreateClientRequest {
            nom: Some("Dubois".to_string()),
            prenom: Some("Camille".to_string()),
            age: Some(28),
            credit_utilization_ratio: Some(41.0),
            payment_of_min_amount: Some(MinPayment::NotMentioned),
            credit_mix: Some(CreditMix::Standard),
            num_of_delayed_payment: Some(4),
            credit_history_age_months: Some(30),
            monthly_balance: Some(420.0),
            outstanding_debt: Some(6100.0),
            amount_invested_monthly: Some(60.0),
            num_credit_inquiries: Some(5),
            ..Default::default()
        },
        CreateClientRequest {
            nom: Some("Petit".to_string()),
            prenom: Some("Hugo".to_string()),
            age: Some(23),
            credit_utilization_ratio: Some(67.0),
            payment_of_min_amount: Some(MinPayment::No),
            credit_mix: Some(CreditMix::Bad),
            num_of_delayed_payment: Some(11),
            credit_history_age_months: Some(8),
            monthly_balance: Some(50.0),
            outstanding_debt: Some(9800.0),
            amount_invested_monthly: Some(0.0),
            num_credit_inquiries: Some(12),
            credit_score: Some(ScoreLabel::Poor),
            ..Default::default()
        },
        CreateClientRequest {
            nom: Some("Roux".to_string()),
            prenom: Some("Emma".to_string()),
            age: Some(55),
            credit_utilization_ratio: Some(15.0),
            payment_of_min_amount: Some(MinPayment::Yes),
            credit_mix: Some(CreditMix::Good),
            num_of_delayed_payment: Some(1),
            credit_history_age_months: Some(240),
            monthly_balance: Some(2100.0),
            outstanding_debt: Some(3000.0),
            amount_invested_monthly: Some(320.0),
            num_credit_inquiries: Some(0),
            ..Default::default()
        },
        CreateClientRequest {
            nom: Some("Moreau".to_string()),
            prenom: Some("Nina".to_string()),
            age: Some(31),
            credit_utilization_ratio: Some(33.0),
            credit_mix: Some(CreditMix::Standard),
            num_of_delayed_payment: Some(6),
            credit_history_age_months: Some(40),
            monthly_balance: Some(600.0),
            outstanding_debt: Some(7400.0),
            amount_invested_monthly: Some(90.0),
            num_credit_inquiries: Some(4),
            ..Default::default()
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url = env::var("DB_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .expect("DB_URL or DATABASE_URL must be set");

    let pool = PgPoolOptions::new().connect(&database_url).await?;
    let store = PgClientStore::new(pool);
    store.ensure_schema().await?;

    let mut seeded = 0usize;
    for request in demo_clients() {
        let client = store.create(request).await?;
        let score = compute_score(&client);
        println!(
            "Seeded {} {} -> score {} grade {}",
            client.prenom.as_deref().unwrap_or("-"),
            client.nom.as_deref().unwrap_or("-"),
            score.score,
            score.grade.as_str()
        );
        seeded += 1;
    }

    println!("Done: {} demo clients", seeded);
    Ok(())
}

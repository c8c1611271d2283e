//! PostgreSQL-backed client storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{AppError, ResultExt};
use crate::models::{
    Client, CreateClientRequest, CreditMix, MinPayment, PaginatedResponse, ScoreLabel,
    UpdateClientRequest,
};
use crate::repository::{
    apply_update, new_client_from_request, total_pages, ClientQuery, ClientRepository,
};

/// Raw database row for a client.
///
/// Categorical fields are stored as TEXT and parsed on the way out; values
/// that fail to parse degrade to `None` rather than erroring.
#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    nom: Option<String>,
    prenom: Option<String>,
    age: Option<i32>,
    num_of_delayed_payment: Option<i32>,
    changed_credit_limit: Option<f64>,
    num_credit_inquiries: Option<i32>,
    credit_mix: Option<String>,
    outstanding_debt: Option<f64>,
    credit_utilization_ratio: Option<f64>,
    credit_history_age: Option<String>,
    credit_history_age_months: Option<i32>,
    payment_of_min_amount: Option<String>,
    total_emi_per_month: Option<f64>,
    amount_invested_monthly: Option<f64>,
    payment_behaviour: Option<String>,
    monthly_balance: Option<f64>,
    credit_score: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            nom: row.nom,
            prenom: row.prenom,
            age: row.age,
            num_of_delayed_payment: row.num_of_delayed_payment,
            changed_credit_limit: row.changed_credit_limit,
            num_credit_inquiries: row.num_credit_inquiries,
            credit_mix: row.credit_mix.as_deref().and_then(|s| CreditMix::from_str(s).ok()),
            outstanding_debt: row.outstanding_debt,
            credit_utilization_ratio: row.credit_utilization_ratio,
            credit_history_age: row.credit_history_age,
            credit_history_age_months: row.credit_history_age_months,
            payment_of_min_amount: row
                .payment_of_min_amount
                .as_deref()
                .and_then(|s| MinPayment::from_str(s).ok()),
            total_emi_per_month: row.total_emi_per_month,
            amount_invested_monthly: row.amount_invested_monthly,
            payment_behaviour: row.payment_behaviour,
            monthly_balance: row.monthly_balance,
            credit_score: row.credit_score.as_deref().and_then(|s| ScoreLabel::from_str(s).ok()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, nom, prenom, age, num_of_delayed_payment, changed_credit_limit, \
     num_credit_inquiries, credit_mix, outstanding_debt, credit_utilization_ratio, \
     credit_history_age, credit_history_age_months, payment_of_min_amount, total_emi_per_month, \
     amount_invested_monthly, payment_behaviour, monthly_balance, credit_score, created_at, \
     updated_at";

/// Client storage over a PostgreSQL pool.
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the clients table and its indexes if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id UUID PRIMARY KEY,
                nom TEXT,
                prenom TEXT,
                age INTEGER,
                num_of_delayed_payment INTEGER,
                changed_credit_limit DOUBLE PRECISION,
                num_credit_inquiries INTEGER,
                credit_mix TEXT,
                outstanding_debt DOUBLE PRECISION,
                credit_utilization_ratio DOUBLE PRECISION,
                credit_history_age TEXT,
                credit_history_age_months INTEGER,
                payment_of_min_amount TEXT,
                total_emi_per_month DOUBLE PRECISION,
                amount_invested_monthly DOUBLE PRECISION,
                payment_behaviour TEXT,
                monthly_balance DOUBLE PRECISION,
                credit_score TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("creating clients table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_clients_created_at ON clients (created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .context("creating clients created_at index")?;

        Ok(())
    }

    async fn insert(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id, nom, prenom, age, num_of_delayed_payment, changed_credit_limit,
                num_credit_inquiries, credit_mix, outstanding_debt, credit_utilization_ratio,
                credit_history_age, credit_history_age_months, payment_of_min_amount,
                total_emi_per_month, amount_invested_monthly, payment_behaviour,
                monthly_balance, credit_score, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            "#,
        )
        .bind(client.id)
        .bind(&client.nom)
        .bind(&client.prenom)
        .bind(client.age)
        .bind(client.num_of_delayed_payment)
        .bind(client.changed_credit_limit)
        .bind(client.num_credit_inquiries)
        .bind(client.credit_mix.map(|v| v.to_string()))
        .bind(client.outstanding_debt)
        .bind(client.credit_utilization_ratio)
        .bind(&client.credit_history_age)
        .bind(client.credit_history_age_months)
        .bind(client.payment_of_min_amount.map(|v| v.to_string()))
        .bind(client.total_emi_per_month)
        .bind(client.amount_invested_monthly)
        .bind(&client.payment_behaviour)
        .bind(client.monthly_balance)
        .bind(client.credit_score.map(|v| v.to_string()))
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .context("inserting client")?;

        Ok(())
    }

    async fn write_back(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE clients SET
                nom = $2, prenom = $3, age = $4, num_of_delayed_payment = $5,
                changed_credit_limit = $6, num_credit_inquiries = $7, credit_mix = $8,
                outstanding_debt = $9, credit_utilization_ratio = $10, credit_history_age = $11,
                credit_history_age_months = $12, payment_of_min_amount = $13,
                total_emi_per_month = $14, amount_invested_monthly = $15, payment_behaviour = $16,
                monthly_balance = $17, credit_score = $18, updated_at = $19
            WHERE id = $1
            "#,
        )
        .bind(client.id)
        .bind(&client.nom)
        .bind(&client.prenom)
        .bind(client.age)
        .bind(client.num_of_delayed_payment)
        .bind(client.changed_credit_limit)
        .bind(client.num_credit_inquiries)
        .bind(client.credit_mix.map(|v| v.to_string()))
        .bind(client.outstanding_debt)
        .bind(client.credit_utilization_ratio)
        .bind(&client.credit_history_age)
        .bind(client.credit_history_age_months)
        .bind(client.payment_of_min_amount.map(|v| v.to_string()))
        .bind(client.total_emi_per_month)
        .bind(client.amount_invested_monthly)
        .bind(&client.payment_behaviour)
        .bind(client.monthly_balance)
        .bind(client.credit_score.map(|v| v.to_string()))
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .context("updating client")?;

        Ok(())
    }
}

#[async_trait]
impl ClientRepository for PgClientStore {
    async fn list(&self, query: &ClientQuery) -> Result<PaginatedResponse<Client>, AppError> {
        // Filters use NULL-guarded binds; only the whitelisted sort column is
        // interpolated into the statement.
        let filter = "($1::text IS NULL OR nom ILIKE '%' || $1 || '%' OR prenom ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR credit_mix = $2) \
             AND ($3::text IS NULL OR credit_score = $3)";

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM clients WHERE {}", filter))
                .bind(&query.search)
                .bind(&query.credit_mix)
                .bind(&query.credit_score)
                .fetch_one(&self.pool)
                .await
                .context("counting clients")?;

        let statement = format!(
            "SELECT {} FROM clients WHERE {} ORDER BY {} {} LIMIT $4 OFFSET $5",
            CLIENT_COLUMNS,
            filter,
            query.sort_by.column(),
            query.sort_order.keyword(),
        );

        let rows: Vec<ClientRow> = sqlx::query_as(&statement)
            .bind(&query.search)
            .bind(&query.credit_mix)
            .bind(&query.credit_score)
            .bind(i64::from(query.page_size))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .context("listing clients")?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(Client::from).collect(),
            total: total as u64,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(total as u64, query.page_size),
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let row: Option<ClientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM clients WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching client")?;

        Ok(row.map(Client::from))
    }

    async fn create(&self, data: CreateClientRequest) -> Result<Client, AppError> {
        let client = new_client_from_request(data);
        self.insert(&client).await?;
        Ok(client)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateClientRequest,
    ) -> Result<Option<Client>, AppError> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let merged = apply_update(existing, changes);
        self.write_back(&merged).await?;
        Ok(Some(merged))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting client")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Client>, AppError> {
        let rows: Vec<ClientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM clients ORDER BY created_at DESC",
            CLIENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("listing all clients")?;

        Ok(rows.into_iter().map(Client::from).collect())
    }
}

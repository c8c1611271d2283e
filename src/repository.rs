//! Storage interface for client profiles.
//!
//! The scoring engine never touches storage; handlers go through this trait
//! so the PostgreSQL and in-memory backends stay interchangeable.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Client, CreateClientRequest, PaginatedResponse, UpdateClientRequest};

/// Whitelisted sort columns for client listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Nom,
    Prenom,
    Age,
    OutstandingDebt,
}

impl SortField {
    /// Parses a query-string value; unknown values are rejected so they can
    /// never reach an ORDER BY clause.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(SortField::CreatedAt),
            "nom" => Some(SortField::Nom),
            "prenom" => Some(SortField::Prenom),
            "age" => Some(SortField::Age),
            "outstanding_debt" => Some(SortField::OutstandingDebt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Nom => "nom",
            SortField::Prenom => "prenom",
            SortField::Age => "age",
            SortField::OutstandingDebt => "outstanding_debt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated listing query passed to a repository.
#[derive(Debug, Clone)]
pub struct ClientQuery {
    pub search: Option<String>,
    pub credit_mix: Option<String>,
    pub credit_score: Option<String>,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

impl Default for ClientQuery {
    fn default() -> Self {
        Self {
            search: None,
            credit_mix: None,
            credit_score: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ClientQuery {
    /// Builds a validated query from raw query parameters.
    ///
    /// Unknown sort fields/orders are rejected; page and page size are
    /// normalized into their allowed ranges.
    pub fn from_params(params: &crate::models::ClientQueryParams) -> Result<Self, AppError> {
        let sort_by = match params.sort_by.as_deref() {
            Some(raw) => SortField::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown sort field '{}'", raw)))?,
            None => SortField::default(),
        };
        let sort_order = match params.sort_order.as_deref() {
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown sort order '{}'", raw)))?,
            None => SortOrder::default(),
        };

        Ok(Self {
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            credit_mix: params.credit_mix.clone().filter(|s| !s.is_empty()),
            credit_score: params.credit_score.clone().filter(|s| !s.is_empty()),
            page: params.page.unwrap_or(1).max(1),
            page_size: params
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            sort_by,
            sort_order,
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Computes the page count for a listing result.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if total == 0 {
        0
    } else {
        total.div_ceil(u64::from(page_size)) as u32
    }
}

/// Capability set for client persistence.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Lists clients matching the query, paginated.
    async fn list(&self, query: &ClientQuery) -> Result<PaginatedResponse<Client>, AppError>;

    /// Fetches a single client, `None` when absent.
    async fn get(&self, id: Uuid) -> Result<Option<Client>, AppError>;

    /// Creates a client and returns the stored record.
    async fn create(&self, data: CreateClientRequest) -> Result<Client, AppError>;

    /// Applies a partial update; `None` when the client does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: UpdateClientRequest,
    ) -> Result<Option<Client>, AppError>;

    /// Deletes a client; `false` when it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Returns every client, newest first. Backs dashboard aggregation and
    /// the CSV export.
    async fn list_all(&self) -> Result<Vec<Client>, AppError>;
}

/// Materializes a create request into a client record.
pub fn new_client_from_request(data: CreateClientRequest) -> Client {
    Client {
        id: Uuid::new_v4(),
        nom: data.nom,
        prenom: data.prenom,
        age: data.age,
        num_of_delayed_payment: data.num_of_delayed_payment,
        changed_credit_limit: data.changed_credit_limit,
        num_credit_inquiries: data.num_credit_inquiries,
        credit_mix: data.credit_mix,
        outstanding_debt: data.outstanding_debt,
        credit_utilization_ratio: data.credit_utilization_ratio,
        credit_history_age: data.credit_history_age,
        credit_history_age_months: data.credit_history_age_months,
        payment_of_min_amount: data.payment_of_min_amount,
        total_emi_per_month: data.total_emi_per_month,
        amount_invested_monthly: data.amount_invested_monthly,
        payment_behaviour: data.payment_behaviour,
        monthly_balance: data.monthly_balance,
        credit_score: data.credit_score,
        created_at: Utc::now(),
        updated_at: None,
    }
}

/// Merges a partial update into an existing record; provided fields replace,
/// absent fields are kept.
pub fn apply_update(mut client: Client, changes: UpdateClientRequest) -> Client {
    if changes.nom.is_some() {
        client.nom = changes.nom;
    }
    if changes.prenom.is_some() {
        client.prenom = changes.prenom;
    }
    if changes.age.is_some() {
        client.age = changes.age;
    }
    if changes.num_of_delayed_payment.is_some() {
        client.num_of_delayed_payment = changes.num_of_delayed_payment;
    }
    if changes.changed_credit_limit.is_some() {
        client.changed_credit_limit = changes.changed_credit_limit;
    }
    if changes.num_credit_inquiries.is_some() {
        client.num_credit_inquiries = changes.num_credit_inquiries;
    }
    if changes.credit_mix.is_some() {
        client.credit_mix = changes.credit_mix;
    }
    if changes.outstanding_debt.is_some() {
        client.outstanding_debt = changes.outstanding_debt;
    }
    if changes.credit_utilization_ratio.is_some() {
        client.credit_utilization_ratio = changes.credit_utilization_ratio;
    }
    if changes.credit_history_age.is_some() {
        client.credit_history_age = changes.credit_history_age;
    }
    if changes.credit_history_age_months.is_some() {
        client.credit_history_age_months = changes.credit_history_age_months;
    }
    if changes.payment_of_min_amount.is_some() {
        client.payment_of_min_amount = changes.payment_of_min_amount;
    }
    if changes.total_emi_per_month.is_some() {
        client.total_emi_per_month = changes.total_emi_per_month;
    }
    if changes.amount_invested_monthly.is_some() {
        client.amount_invested_monthly = changes.amount_invested_monthly;
    }
    if changes.payment_behaviour.is_some() {
        client.payment_behaviour = changes.payment_behaviour;
    }
    if changes.monthly_balance.is_some() {
        client.monthly_balance = changes.monthly_balance;
    }
    if changes.credit_score.is_some() {
        client.credit_score = changes.credit_score;
    }
    client.updated_at = Some(Utc::now());
    client
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::scoring::CreditScore;

// ============ Domain Enumerations ============

/// Categorical quality label for the diversity of credit products held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditMix {
    Good,
    Standard,
    Bad,
}

impl FromStr for CreditMix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" => Ok(CreditMix::Good),
            "Standard" => Ok(CreditMix::Standard),
            "Bad" => Ok(CreditMix::Bad),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CreditMix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CreditMix::Good => "Good",
            CreditMix::Standard => "Standard",
            CreditMix::Bad => "Bad",
        };
        f.write_str(s)
    }
}

/// Whether the client pays at least the minimum amount due.
///
/// `NM` ("not mentioned") is carried through from the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinPayment {
    Yes,
    No,
    #[serde(rename = "NM")]
    NotMentioned,
}

impl FromStr for MinPayment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(MinPayment::Yes),
            "No" => Ok(MinPayment::No),
            "NM" => Ok(MinPayment::NotMentioned),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MinPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MinPayment::Yes => "Yes",
            MinPayment::No => "No",
            MinPayment::NotMentioned => "NM",
        };
        f.write_str(s)
    }
}

/// Optional external score label attached to a client by an upstream system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLabel {
    Good,
    Standard,
    Poor,
}

impl FromStr for ScoreLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" => Ok(ScoreLabel::Good),
            "Standard" => Ok(ScoreLabel::Standard),
            "Poor" => Ok(ScoreLabel::Poor),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoreLabel::Good => "Good",
            ScoreLabel::Standard => "Standard",
            ScoreLabel::Poor => "Poor",
        };
        f.write_str(s)
    }
}

// ============ Client Model ============

/// A client profile with its credit-behaviour features.
///
/// All feature fields are optional; the scoring engine treats absent numeric
/// values as zero and absent categorical values as their neutral branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier for the client.
    pub id: Uuid,
    /// Last name.
    pub nom: Option<String>,
    /// First name.
    pub prenom: Option<String>,
    /// Age in years.
    pub age: Option<i32>,
    /// Count of delayed payments on record.
    pub num_of_delayed_payment: Option<i32>,
    /// Change in credit limit over the observation window.
    pub changed_credit_limit: Option<f64>,
    /// Count of recent credit inquiries.
    pub num_credit_inquiries: Option<i32>,
    /// Quality of the credit product mix.
    pub credit_mix: Option<CreditMix>,
    /// Total outstanding debt.
    pub outstanding_debt: Option<f64>,
    /// Credit utilization as a percentage.
    pub credit_utilization_ratio: Option<f64>,
    /// Raw credit history age label (e.g. "10 Years and 2 Months"), not scored.
    pub credit_history_age: Option<String>,
    /// Credit history length in months.
    pub credit_history_age_months: Option<i32>,
    /// Whether the minimum amount is paid.
    pub payment_of_min_amount: Option<MinPayment>,
    /// Total monthly EMI, not scored.
    pub total_emi_per_month: Option<f64>,
    /// Amount invested monthly.
    pub amount_invested_monthly: Option<f64>,
    /// Raw payment behaviour label, not scored.
    pub payment_behaviour: Option<String>,
    /// End-of-month balance.
    pub monthly_balance: Option<f64>,
    /// External score label from an upstream system.
    pub credit_score: Option<ScoreLabel>,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A client together with its computed credit score.
#[derive(Debug, Clone, Serialize)]
pub struct ClientWithScore {
    #[serde(flatten)]
    pub client: Client,
    pub score: CreditScore,
}

// ============ API Request/Response Models ============

/// Request payload for creating a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateClientRequest {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub age: Option<i32>,
    pub num_of_delayed_payment: Option<i32>,
    pub changed_credit_limit: Option<f64>,
    pub num_credit_inquiries: Option<i32>,
    pub credit_mix: Option<CreditMix>,
    pub outstanding_debt: Option<f64>,
    pub credit_utilization_ratio: Option<f64>,
    pub credit_history_age: Option<String>,
    pub credit_history_age_months: Option<i32>,
    pub payment_of_min_amount: Option<MinPayment>,
    pub total_emi_per_month: Option<f64>,
    pub amount_invested_monthly: Option<f64>,
    pub payment_behaviour: Option<String>,
    pub monthly_balance: Option<f64>,
    pub credit_score: Option<ScoreLabel>,
}

/// Request payload for partially updating a client.
///
/// Absent fields are left unchanged.
pub type UpdateClientRequest = CreateClientRequest;

/// Query parameters for client listing.
#[derive(Debug, Default, Deserialize)]
pub struct ClientQueryParams {
    /// Case-insensitive substring match on nom/prenom.
    pub search: Option<String>,
    /// Filter by credit mix label.
    pub credit_mix: Option<String>,
    /// Filter by external score label.
    pub credit_score: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Result of a bulk client import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<String>,
}

// ============ Score Simulation ============

/// Request for a what-if score simulation.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub client_id: Uuid,
    /// Hypothetical field changes, merged over the stored profile.
    pub changes: UpdateClientRequest,
}

/// One factor whose contribution moved in a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct FactorDelta {
    pub factor: &'static str,
    pub current_points: i32,
    pub new_points: i32,
    pub score_impact: i32,
}

/// Outcome of a what-if score simulation. The stored profile is untouched.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSimulation {
    pub current_score: CreditScore,
    pub projected_score: CreditScore,
    pub changes: Vec<FactorDelta>,
}

// ============ Dashboard Statistics ============

/// Count of clients per credit grade.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GradeDistribution {
    #[serde(rename = "A")]
    pub a: u64,
    #[serde(rename = "B")]
    pub b: u64,
    #[serde(rename = "C")]
    pub c: u64,
    #[serde(rename = "D")]
    pub d: u64,
    #[serde(rename = "E")]
    pub e: u64,
}

/// Aggregate statistics backing the dashboard view.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Number of client profiles.
    pub total_clients: u64,
    /// Mean computed score, rounded; 0 when there are no clients.
    pub average_score: i32,
    /// Clients with grade A.
    pub low_risk: u64,
    /// Clients with grade D or E.
    pub high_risk: u64,
    /// Counts per grade.
    pub grade_distribution: GradeDistribution,
    /// The five most recently created clients.
    pub recent_clients: Vec<ClientWithScore>,
}

// ============ Auth Models ============

/// An authenticated user as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request payload.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: AuthUser,
    pub token: String,
}

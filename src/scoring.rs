//! Credit scoring engine.
//!
//! Maps a [`Client`](crate::models::Client) to a numeric score, letter grade
//! and risk level. The computation is a pure additive point model: every
//! factor contributes a fixed number of points picked by an ordered
//! threshold ladder, the sum is clamped to [300, 850], and grade/risk are
//! derived from the clamped score. The function is total: absent fields take
//! their neutral branch and out-of-domain values fall through the ladders
//! without error.

use serde::{Deserialize, Serialize};

use crate::models::{Client, CreditMix, MinPayment, ScoreLabel};

/// Lowest possible score.
pub const SCORE_MIN: i32 = 300;
/// Highest possible score.
pub const SCORE_MAX: i32 = 850;
/// Every score starts from this base before factor points are applied.
const SCORE_BASE: i32 = 400;

/// Letter grade bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Derives the grade from a clamped score.
    pub fn from_score(score: i32) -> Self {
        if score >= 750 {
            Grade::A
        } else if score >= 650 {
            Grade::B
        } else if score >= 550 {
            Grade::C
        } else if score >= 450 {
            Grade::D
        } else {
            Grade::E
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

/// Qualitative risk label derived from the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl From<Grade> for RiskLevel {
    fn from(grade: Grade) -> Self {
        match grade {
            Grade::A => RiskLevel::Low,
            Grade::B | Grade::C => RiskLevel::Medium,
            Grade::D => RiskLevel::High,
            Grade::E => RiskLevel::VeryHigh,
        }
    }
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

/// Computed credit score result.
///
/// `grade` and `risk_level` are always derived from `score`, never set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScore {
    pub score: i32,
    pub grade: Grade,
    pub risk_level: RiskLevel,
}

/// Computes the credit score for a client.
///
/// Deterministic and side-effect free; calling it twice on the same value
/// yields the same result.
pub fn compute_score(client: &Client) -> CreditScore {
    let total = SCORE_BASE
        + utilization_points(client)
        + min_payment_points(client)
        + credit_mix_points(client)
        + delayed_payment_points(client)
        + history_points(client)
        + balance_ratio_points(client)
        + invested_points(client)
        + inquiry_points(client)
        + label_points(client);

    let score = total.clamp(SCORE_MIN, SCORE_MAX);
    let grade = Grade::from_score(score);

    CreditScore {
        score,
        grade,
        risk_level: RiskLevel::from(grade),
    }
}

fn utilization_points(client: &Client) -> i32 {
    let u = client.credit_utilization_ratio.unwrap_or(0.0);
    if u < 10.0 {
        150
    } else if u < 20.0 {
        120
    } else if u < 30.0 {
        80
    } else if u < 50.0 {
        40
    } else {
        0
    }
}

fn min_payment_points(client: &Client) -> i32 {
    match client.payment_of_min_amount {
        Some(MinPayment::Yes) => 100,
        Some(MinPayment::NotMentioned) => 50,
        Some(MinPayment::No) | None => 0,
    }
}

fn credit_mix_points(client: &Client) -> i32 {
    match client.credit_mix {
        Some(CreditMix::Good) => 80,
        Some(CreditMix::Standard) => 50,
        Some(CreditMix::Bad) | None => 10,
    }
}

fn delayed_payment_points(client: &Client) -> i32 {
    let d = client.num_of_delayed_payment.unwrap_or(0);
    if d > 10 {
        -100
    } else if d > 5 {
        -60
    } else if d > 2 {
        -30
    } else if d > 0 {
        -10
    } else {
        0
    }
}

fn history_points(client: &Client) -> i32 {
    let months = client.credit_history_age_months.unwrap_or(0);
    if months >= 120 {
        100
    } else if months >= 60 {
        80
    } else if months >= 24 {
        50
    } else if months >= 12 {
        25
    } else {
        0
    }
}

fn balance_ratio_points(client: &Client) -> i32 {
    // Denominator floors at 1 so a zero debt never divides by zero.
    let debt = client.outstanding_debt.unwrap_or(0.0).max(1.0);
    let ratio = client.monthly_balance.unwrap_or(0.0) / debt;
    if ratio > 0.5 {
        70
    } else if ratio > 0.2 {
        50
    } else if ratio > 0.1 {
        30
    } else {
        10
    }
}

fn invested_points(client: &Client) -> i32 {
    let invested = client.amount_invested_monthly.unwrap_or(0.0);
    if invested > 500.0 {
        50
    } else if invested > 200.0 {
        35
    } else if invested > 50.0 {
        20
    } else {
        5
    }
}

fn inquiry_points(client: &Client) -> i32 {
    let q = client.num_credit_inquiries.unwrap_or(0);
    if q > 10 {
        -50
    } else if q > 5 {
        -30
    } else if q > 3 {
        -15
    } else {
        0
    }
}

fn label_points(client: &Client) -> i32 {
    match client.credit_score {
        Some(ScoreLabel::Good) => 50,
        Some(ScoreLabel::Standard) => 25,
        Some(ScoreLabel::Poor) => -25,
        None => 0,
    }
}

// ============ Factor Breakdown ============

/// Direction of a factor's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl Impact {
    fn from_points(points: i32) -> Self {
        match points {
            p if p > 0 => Impact::Positive,
            p if p < 0 => Impact::Negative,
            _ => Impact::Neutral,
        }
    }
}

/// A single factor's contribution to the computed score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreFactor {
    pub name: &'static str,
    pub points: i32,
    pub impact: Impact,
    pub description: String,
}

/// Breaks the score down into per-factor contributions.
///
/// The points here are exactly the ones summed by [`compute_score`]; the
/// clamp and base are not part of any factor.
pub fn score_factors(client: &Client) -> Vec<ScoreFactor> {
    let factors = [
        (
            "credit_utilization",
            utilization_points(client),
            format!(
                "utilization ratio at {:.1}%",
                client.credit_utilization_ratio.unwrap_or(0.0)
            ),
        ),
        (
            "payment_of_min_amount",
            min_payment_points(client),
            match client.payment_of_min_amount {
                Some(flag) => format!("minimum payment flag '{}'", flag),
                None => "minimum payment flag not provided".to_string(),
            },
        ),
        (
            "credit_mix",
            credit_mix_points(client),
            match client.credit_mix {
                Some(mix) => format!("credit mix rated '{}'", mix),
                None => "credit mix not provided".to_string(),
            },
        ),
        (
            "delayed_payments",
            delayed_payment_points(client),
            format!(
                "{} delayed payment(s) on record",
                client.num_of_delayed_payment.unwrap_or(0)
            ),
        ),
        (
            "credit_history_length",
            history_points(client),
            format!(
                "{} month(s) of credit history",
                client.credit_history_age_months.unwrap_or(0)
            ),
        ),
        (
            "balance_to_debt_ratio",
            balance_ratio_points(client),
            format!(
                "monthly balance {:.2} against outstanding debt {:.2}",
                client.monthly_balance.unwrap_or(0.0),
                client.outstanding_debt.unwrap_or(0.0)
            ),
        ),
        (
            "monthly_investment",
            invested_points(client),
            format!(
                "{:.2} invested monthly",
                client.amount_invested_monthly.unwrap_or(0.0)
            ),
        ),
        (
            "credit_inquiries",
            inquiry_points(client),
            format!(
                "{} recent credit inquiries",
                client.num_credit_inquiries.unwrap_or(0)
            ),
        ),
        (
            "external_score_label",
            label_points(client),
            match client.credit_score {
                Some(label) => format!("upstream label '{}'", label),
                None => "no upstream label".to_string(),
            },
        ),
    ];

    factors
        .into_iter()
        .map(|(name, points, description)| ScoreFactor {
            name,
            points,
            impact: Impact::from_points(points),
            description,
        })
        .collect()
}

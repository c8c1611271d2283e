//! Credit report assembly and rendering.
//!
//! Builds the per-client report consumed by document renderers and the
//! export endpoints. Report prose is French, matching the product's report
//! language; layout and styling belong to the downstream renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Client, CreditMix, MinPayment};
use crate::scoring::{score_factors, CreditScore, Grade, ScoreFactor};

/// Full credit report for a single client.
#[derive(Debug, Clone, Serialize)]
pub struct CreditReport {
    pub client: Client,
    pub score: CreditScore,
    pub factors: Vec<ScoreFactor>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Assembles the report for a client and its computed score.
pub fn build_report(client: &Client, score: CreditScore) -> CreditReport {
    CreditReport {
        client: client.clone(),
        score,
        factors: score_factors(client),
        risk_factors: risk_factors(client, score),
        recommendations: recommendations(client),
        generated_at: Utc::now(),
    }
}

/// Qualitative risk observations shown in the report's assessment section.
fn risk_factors(client: &Client, score: CreditScore) -> Vec<String> {
    let mut factors = Vec::new();

    let utilization = client.credit_utilization_ratio.unwrap_or(0.0);
    if utilization > 30.0 {
        factors.push(format!(
            "Ratio d'utilisation élevé ({:.1}%)",
            utilization
        ));
    }
    if client.num_of_delayed_payment.unwrap_or(0) > 0 {
        factors.push(format!(
            "Paiements en retard ({})",
            client.num_of_delayed_payment.unwrap_or(0)
        ));
    }
    if client.payment_of_min_amount == Some(MinPayment::No) {
        factors.push("Ne paie pas le minimum requis".to_string());
    }
    if client.credit_mix == Some(CreditMix::Bad) {
        factors.push("Mauvaise diversification de crédit".to_string());
    }
    if score.grade == Grade::A {
        factors.push("Excellent profil de crédit - Risque faible".to_string());
    }

    if factors.is_empty() {
        factors.push("Aucun facteur de risque significatif identifié".to_string());
    }

    factors
}

/// Actionable suggestions derived from the same thresholds as the risk
/// factors.
fn recommendations(client: &Client) -> Vec<String> {
    let mut out = Vec::new();

    if client.credit_utilization_ratio.unwrap_or(0.0) > 30.0 {
        out.push("Réduire le ratio d'utilisation sous 30%".to_string());
    }
    if client.num_of_delayed_payment.unwrap_or(0) > 0 {
        out.push("Régulariser les paiements en retard".to_string());
    }
    if client.payment_of_min_amount == Some(MinPayment::No) {
        out.push("Payer au moins le montant minimum exigé".to_string());
    }
    if client.credit_mix == Some(CreditMix::Bad) {
        out.push("Diversifier les types de crédit détenus".to_string());
    }
    if client.num_credit_inquiries.unwrap_or(0) > 3 {
        out.push("Limiter les nouvelles demandes de crédit".to_string());
    }

    out
}

fn field_or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// Renders the report as plain text for download.
pub fn render_text(report: &CreditReport) -> String {
    let client = &report.client;
    let mut out = String::new();

    out.push_str("CreditScore AI — Rapport d'Évaluation de Crédit\n");
    out.push_str(&format!(
        "Généré le: {}\n",
        report.generated_at.format("%d/%m/%Y")
    ));
    out.push_str(&format!(
        "\nClient: {} {}\n",
        field_or_dash(&client.prenom),
        field_or_dash(&client.nom)
    ));
    out.push_str(&format!(
        "Score: {}  Grade: {}  Risque: {}\n",
        report.score.score,
        report.score.grade.as_str(),
        report.score.risk_level.as_str()
    ));

    out.push_str("\nInformations Personnelles\n");
    out.push_str(&format!("  Nom: {}\n", field_or_dash(&client.nom)));
    out.push_str(&format!("  Prénom: {}\n", field_or_dash(&client.prenom)));
    out.push_str(&format!(
        "  Âge: {}\n",
        client
            .age
            .map(|a| format!("{} ans", a))
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  Historique: {}\n",
        field_or_dash(&client.credit_history_age)
    ));

    out.push_str("\nInformations de Crédit\n");
    out.push_str(&format!(
        "  Dettes Impayées: ${:.2}\n",
        client.outstanding_debt.unwrap_or(0.0)
    ));
    out.push_str(&format!(
        "  Ratio d'Utilisation: {:.1}%\n",
        client.credit_utilization_ratio.unwrap_or(0.0)
    ));
    out.push_str(&format!(
        "  Credit Mix: {}\n",
        client
            .credit_mix
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    out.push_str(&format!(
        "  Paiements en Retard: {}\n",
        client.num_of_delayed_payment.unwrap_or(0)
    ));
    out.push_str(&format!(
        "  Demandes de Crédit: {}\n",
        client.num_credit_inquiries.unwrap_or(0)
    ));

    out.push_str("\nInformations de Paiement\n");
    out.push_str(&format!(
        "  Paiement Minimum: {}\n",
        match client.payment_of_min_amount {
            Some(MinPayment::Yes) => "Oui",
            Some(MinPayment::No) => "Non",
            Some(MinPayment::NotMentioned) | None => "N/A",
        }
    ));
    out.push_str(&format!(
        "  EMI Mensuel: ${:.2}\n",
        client.total_emi_per_month.unwrap_or(0.0)
    ));
    out.push_str(&format!(
        "  Solde Mensuel: ${:.2}\n",
        client.monthly_balance.unwrap_or(0.0)
    ));
    out.push_str(&format!(
        "  Investissement Mensuel: ${:.2}\n",
        client.amount_invested_monthly.unwrap_or(0.0)
    ));

    out.push_str("\nÉvaluation des Risques\n");
    out.push_str(&format!(
        "  Niveau de Risque: {}\n",
        report.score.risk_level.as_str()
    ));
    for factor in &report.risk_factors {
        out.push_str(&format!("  • {}\n", factor));
    }

    if !report.recommendations.is_empty() {
        out.push_str("\nRecommandations\n");
        for rec in &report.recommendations {
            out.push_str(&format!("  • {}\n", rec));
        }
    }

    out.push_str(
        "\nCe rapport est généré par CreditScore AI à titre informatif uniquement.\n\
         Il ne constitue pas un conseil financier.\n",
    );

    out
}

// ============ CSV Export ============

pub const CSV_HEADER: &str = "id,nom,prenom,age,credit_utilization_ratio,payment_of_min_amount,\
     credit_mix,num_of_delayed_payment,credit_history_age_months,monthly_balance,\
     outstanding_debt,amount_invested_monthly,num_credit_inquiries,credit_score_label,\
     score,grade,risk_level";

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_num<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One CSV line per client, with its computed score appended.
pub fn csv_line(client: &Client, score: CreditScore) -> String {
    [
        client.id.to_string(),
        csv_escape(client.nom.as_deref().unwrap_or("")),
        csv_escape(client.prenom.as_deref().unwrap_or("")),
        opt_num(client.age),
        opt_num(client.credit_utilization_ratio),
        opt_num(client.payment_of_min_amount),
        opt_num(client.credit_mix),
        opt_num(client.num_of_delayed_payment),
        opt_num(client.credit_history_age_months),
        opt_num(client.monthly_balance),
        opt_num(client.outstanding_debt),
        opt_num(client.amount_invested_monthly),
        opt_num(client.num_credit_inquiries),
        opt_num(client.credit_score),
        score.score.to_string(),
        score.grade.as_str().to_string(),
        score.risk_level.as_str().to_string(),
    ]
    .join(",")
}

/// Renders the full client list as CSV.
pub fn render_csv(clients: &[(Client, CreditScore)]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for (client, score) in clients {
        out.push_str(&csv_line(client, *score));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::compute_score;
    use chrono::Utc;
    use uuid::Uuid;

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            nom: Some("Dupont, fils".to_string()),
            prenom: Some("Jean".to_string()),
            age: Some(35),
            num_of_delayed_payment: Some(3),
            changed_credit_limit: None,
            num_credit_inquiries: Some(1),
            credit_mix: Some(CreditMix::Bad),
            outstanding_debt: Some(5000.0),
            credit_utilization_ratio: Some(45.0),
            credit_history_age: Some("4 Years".to_string()),
            credit_history_age_months: Some(48),
            payment_of_min_amount: Some(MinPayment::No),
            total_emi_per_month: Some(120.0),
            amount_invested_monthly: None,
            payment_behaviour: None,
            monthly_balance: Some(250.0),
            credit_score: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn risk_factors_cover_all_flags() {
        let client = client();
        let report = build_report(&client, compute_score(&client));

        assert!(report
            .risk_factors
            .iter()
            .any(|f| f.starts_with("Ratio d'utilisation élevé")));
        assert!(report
            .risk_factors
            .iter()
            .any(|f| f.starts_with("Paiements en retard")));
        assert!(report
            .risk_factors
            .contains(&"Ne paie pas le minimum requis".to_string()));
        assert!(report
            .risk_factors
            .contains(&"Mauvaise diversification de crédit".to_string()));
    }

    #[test]
    fn clean_profile_reports_no_risk_factors() {
        let mut clean = client();
        clean.credit_utilization_ratio = Some(5.0);
        clean.num_of_delayed_payment = Some(0);
        clean.payment_of_min_amount = Some(MinPayment::Yes);
        clean.credit_mix = Some(CreditMix::Good);

        let report = build_report(&clean, compute_score(&clean));
        assert!(report
            .risk_factors
            .iter()
            .all(|f| !f.starts_with("Ratio d'utilisation")));
        assert!(!report.risk_factors.is_empty());
    }

    #[test]
    fn text_rendering_contains_sections() {
        let client = client();
        let report = build_report(&client, compute_score(&client));
        let text = render_text(&report);

        assert!(text.contains("Rapport d'Évaluation de Crédit"));
        assert!(text.contains("Informations Personnelles"));
        assert!(text.contains("Informations de Crédit"));
        assert!(text.contains("Informations de Paiement"));
        assert!(text.contains("Évaluation des Risques"));
        assert!(text.contains("Jean"));
    }

    #[test]
    fn csv_escapes_commas_in_names() {
        let client = client();
        let line = csv_line(&client, compute_score(&client));
        assert!(line.contains("\"Dupont, fils\""));
        assert_eq!(
            line.split(',').count(),
            CSV_HEADER.split(',').count() + 1 // the escaped comma inside quotes
        );
    }

    #[test]
    fn csv_has_header_and_one_line_per_client() {
        let c = client();
        let score = compute_score(&c);
        let csv = render_csv(&[(c.clone(), score), (c, score)]);
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("id,nom"));
    }
}

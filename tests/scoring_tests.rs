/// Unit tests for the credit scoring engine
/// Covers the documented scenarios, threshold boundaries and derivations
use chrono::Utc;
use rust_credit_api::core::models::{Client, CreditMix, MinPayment, ScoreLabel};
use rust_credit_api::core::scoring::{
    compute_score, score_factors, CreditScore, Grade, Impact, RiskLevel, SCORE_MAX, SCORE_MIN,
};
use uuid::Uuid;

fn client() -> Client {
    Client {
        id: Uuid::new_v4(),
        nom: None,
        prenom: None,
        age: None,
        num_of_delayed_payment: None,
        changed_credit_limit: None,
        num_credit_inquiries: None,
        credit_mix: None,
        outstanding_debt: None,
        credit_utilization_ratio: None,
        credit_history_age: None,
        credit_history_age_months: None,
        payment_of_min_amount: None,
        total_emi_per_month: None,
        amount_invested_monthly: None,
        payment_behaviour: None,
        monthly_balance: None,
        credit_score: None,
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn empty_profile_lands_on_575_c_medium() {
        let result = compute_score(&client());
        assert_eq!(
            result,
            CreditScore {
                score: 575,
                grade: Grade::C,
                risk_level: RiskLevel::Medium,
            }
        );
    }

    #[test]
    fn best_case_profile_clamps_to_850() {
        let mut c = client();
        c.credit_utilization_ratio = Some(5.0);
        c.payment_of_min_amount = Some(MinPayment::Yes);
        c.credit_mix = Some(CreditMix::Good);
        c.num_of_delayed_payment = Some(0);
        c.credit_history_age_months = Some(130);
        c.monthly_balance = Some(600.0);
        c.outstanding_debt = Some(500.0);
        c.amount_invested_monthly = Some(600.0);
        c.num_credit_inquiries = Some(1);
        c.credit_score = Some(ScoreLabel::Good);

        // Raw sum is 1000 before the clamp
        let result = compute_score(&c);
        assert_eq!(result.score, SCORE_MAX);
        assert_eq!(result.grade, Grade::A);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn worst_case_profile_clamps_to_300() {
        let mut c = client();
        c.credit_utilization_ratio = Some(60.0);
        c.payment_of_min_amount = Some(MinPayment::No);
        c.credit_mix = Some(CreditMix::Bad);
        c.num_of_delayed_payment = Some(12);
        c.credit_history_age_months = Some(0);
        c.monthly_balance = Some(0.0);
        c.outstanding_debt = Some(1000.0);
        c.amount_invested_monthly = Some(0.0);
        c.num_credit_inquiries = Some(15);
        c.credit_score = Some(ScoreLabel::Poor);

        // Raw sum is 250 before the clamp
        let result = compute_score(&c);
        assert_eq!(result.score, SCORE_MIN);
        assert_eq!(result.grade, Grade::E);
        assert_eq!(result.risk_level, RiskLevel::VeryHigh);
    }
}

#[cfg(test)]
mod boundary_tests {
    use super::*;

    #[test]
    fn utilization_ten_falls_into_lower_bucket() {
        let mut below = client();
        below.credit_utilization_ratio = Some(9.99);
        let mut at = client();
        at.credit_utilization_ratio = Some(10.0);

        assert_eq!(compute_score(&below).score, 575);
        assert_eq!(compute_score(&at).score, 545);
    }

    #[test]
    fn utilization_ladder_steps() {
        let expectations = [
            (0.0, 575),
            (19.9, 545),
            (20.0, 505),
            (29.9, 505),
            (30.0, 465),
            (49.9, 465),
            (50.0, 425),
            (95.0, 425),
        ];
        for (ratio, expected) in expectations {
            let mut c = client();
            c.credit_utilization_ratio = Some(ratio);
            assert_eq!(
                compute_score(&c).score,
                expected,
                "utilization {} should score {}",
                ratio,
                expected
            );
        }
    }

    #[test]
    fn delayed_payment_penalties() {
        let expectations = [(0, 0), (1, -10), (2, -10), (3, -30), (6, -60), (11, -100)];
        let baseline = compute_score(&client()).score;
        for (delayed, delta) in expectations {
            let mut c = client();
            c.num_of_delayed_payment = Some(delayed);
            assert_eq!(
                compute_score(&c).score,
                baseline + delta,
                "{} delayed payments should shift the score by {}",
                delayed,
                delta
            );
        }
    }

    #[test]
    fn history_bonuses() {
        let expectations = [(0, 0), (11, 0), (12, 25), (24, 50), (60, 80), (120, 100)];
        let baseline = compute_score(&client()).score;
        for (months, delta) in expectations {
            let mut c = client();
            c.credit_history_age_months = Some(months);
            assert_eq!(compute_score(&c).score, baseline + delta);
        }
    }

    #[test]
    fn inquiry_penalties() {
        let expectations = [(0, 0), (3, 0), (4, -15), (6, -30), (11, -50)];
        let baseline = compute_score(&client()).score;
        for (inquiries, delta) in expectations {
            let mut c = client();
            c.num_credit_inquiries = Some(inquiries);
            assert_eq!(compute_score(&c).score, baseline + delta);
        }
    }

    #[test]
    fn zero_outstanding_debt_never_divides_by_zero() {
        let mut c = client();
        c.outstanding_debt = Some(0.0);
        c.monthly_balance = Some(0.6);

        // ratio floors the denominator at 1: 0.6 / 1 > 0.5
        assert_eq!(compute_score(&c).score, 575 + 60);
    }

    #[test]
    fn investment_buckets() {
        let expectations = [(0.0, 0), (50.0, 0), (50.01, 15), (200.5, 30), (501.0, 45)];
        let baseline = compute_score(&client()).score;
        for (invested, delta) in expectations {
            let mut c = client();
            c.amount_invested_monthly = Some(invested);
            assert_eq!(compute_score(&c).score, baseline + delta);
        }
    }
}

#[cfg(test)]
mod derivation_tests {
    use super::*;

    #[test]
    fn grade_buckets_cover_the_whole_range() {
        for score in 750..=SCORE_MAX {
            assert_eq!(Grade::from_score(score), Grade::A);
        }
        for score in 650..750 {
            assert_eq!(Grade::from_score(score), Grade::B);
        }
        for score in 550..650 {
            assert_eq!(Grade::from_score(score), Grade::C);
        }
        for score in 450..550 {
            assert_eq!(Grade::from_score(score), Grade::D);
        }
        for score in SCORE_MIN..450 {
            assert_eq!(Grade::from_score(score), Grade::E);
        }
    }

    #[test]
    fn computed_grade_matches_rederivation() {
        let mut c = client();
        c.credit_utilization_ratio = Some(35.0);
        c.num_of_delayed_payment = Some(7);

        let result = compute_score(&c);
        assert_eq!(result.grade, Grade::from_score(result.score));
        assert_eq!(result.risk_level, RiskLevel::from(result.grade));
    }

    #[test]
    fn risk_level_table() {
        assert_eq!(RiskLevel::from(Grade::A), RiskLevel::Low);
        assert_eq!(RiskLevel::from(Grade::B), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(Grade::C), RiskLevel::Medium);
        assert_eq!(RiskLevel::from(Grade::D), RiskLevel::High);
        assert_eq!(RiskLevel::from(Grade::E), RiskLevel::VeryHigh);
    }

    #[test]
    fn idempotent_for_the_same_input() {
        let mut c = client();
        c.credit_utilization_ratio = Some(18.0);
        c.credit_mix = Some(CreditMix::Standard);
        c.monthly_balance = Some(400.0);
        c.outstanding_debt = Some(900.0);

        assert_eq!(compute_score(&c), compute_score(&c));
    }
}

#[cfg(test)]
mod factor_tests {
    use super::*;

    #[test]
    fn nine_factors_are_reported() {
        assert_eq!(score_factors(&client()).len(), 9);
    }

    #[test]
    fn penalties_are_marked_negative() {
        let mut c = client();
        c.num_of_delayed_payment = Some(8);
        c.num_credit_inquiries = Some(12);

        let factors = score_factors(&c);
        let delayed = factors
            .iter()
            .find(|f| f.name == "delayed_payments")
            .unwrap();
        assert_eq!(delayed.points, -60);
        assert_eq!(delayed.impact, Impact::Negative);

        let inquiries = factors
            .iter()
            .find(|f| f.name == "credit_inquiries")
            .unwrap();
        assert_eq!(inquiries.points, -50);
        assert_eq!(inquiries.impact, Impact::Negative);
    }

    #[test]
    fn factor_sum_reconstructs_unclamped_score() {
        let mut c = client();
        c.credit_utilization_ratio = Some(25.0);
        c.payment_of_min_amount = Some(MinPayment::NotMentioned);
        c.credit_history_age_months = Some(70);

        let sum: i32 = score_factors(&c).iter().map(|f| f.points).sum();
        assert_eq!(compute_score(&c).score, 400 + sum);
    }
}

#[cfg(test)]
mod serialization_tests {
    use super::*;

    #[test]
    fn credit_score_uses_camel_case_risk_level() {
        let result = compute_score(&client());
        let value = serde_json::to_value(result).unwrap();

        assert_eq!(value["score"], 575);
        assert_eq!(value["grade"], "C");
        assert_eq!(value["riskLevel"], "Medium");
    }

    #[test]
    fn very_high_risk_serializes_with_space() {
        let value = serde_json::to_value(RiskLevel::VeryHigh).unwrap();
        assert_eq!(value, "Very High");
    }
}

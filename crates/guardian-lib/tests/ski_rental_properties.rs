//! Property-based tests for the ski-rental algorithm.
//!
//! 1. The guarantee is strictly decreasing in trust and equals 2 at full trust
//! 2. Low-uncertainty thresholds ignore trust
//! 3. High-uncertainty thresholds are the trust-weighted blend
//! 4. Once the algorithm commits it keeps committing
//! 5. Step-by-step replay matches the closed-form cost
//! 6. The realised ratio is at least 1 whenever the optimum is positive

use guardian_lib::{
    simulate, Action, FixedPredictor, LearningAugmentedAlgorithm, Prediction, ProblemParams,
    SkiRentalLaa, SkiRentalOutcome, TrustLevel, UncertaintyRegime,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn trust_strategy() -> impl Strategy<Value = f64> {
    (1u32..=1000).prop_map(|n| n as f64 / 1000.0)
}

fn params_strategy() -> impl Strategy<Value = ProblemParams> {
    (1u32..=1000, 1u32..=50)
        .prop_map(|(commit, step)| ProblemParams::new(commit as f64, step as f64).unwrap())
}

fn prediction_strategy() -> impl Strategy<Value = Prediction> {
    (0.0f64..200.0, 0.0f64..100.0).prop_map(|(p, u)| Prediction::new(p, u))
}

fn laa_for(params: ProblemParams, prediction: Prediction) -> SkiRentalLaa<FixedPredictor> {
    SkiRentalLaa::new(FixedPredictor::from(prediction), params)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn guarantee_decreases_with_trust(a in trust_strategy(), b in trust_strategy()) {
        prop_assume!(a < b);
        let ga = TrustLevel::new(a).unwrap().guarantee();
        let gb = TrustLevel::new(b).unwrap().guarantee();
        prop_assert!(ga > gb);
        prop_assert!(gb >= 2.0);
    }

    #[test]
    fn low_uncertainty_ignores_trust(
        params in params_strategy(),
        predicted in 0.0f64..200.0,
        fraction in 0.0f64..=0.2,
        trust in trust_strategy(),
    ) {
        let prediction = Prediction::new(predicted, predicted * fraction);
        let laa = laa_for(params, prediction);
        let breakdown = laa.threshold(trust).unwrap();
        prop_assert_eq!(breakdown.regime, UncertaintyRegime::Low);
        prop_assert_eq!(breakdown.threshold, predicted);
    }

    #[test]
    fn high_uncertainty_blends(
        params in params_strategy(),
        predicted in 1.0f64..200.0,
        extra in 0.01f64..100.0,
        trust in trust_strategy(),
    ) {
        let prediction = Prediction::new(predicted, predicted * 0.2 + extra);
        let laa = laa_for(params, prediction);
        let breakdown = laa.threshold(trust).unwrap();
        let expected = (1.0 - trust) * params.break_even() + trust * predicted;
        prop_assert_eq!(breakdown.regime, UncertaintyRegime::High);
        prop_assert!(close(breakdown.threshold, expected));
        prop_assert!(breakdown.commit_step >= 1);
        prop_assert!(breakdown.commit_step as f64 >= breakdown.threshold);
    }

    #[test]
    fn commit_is_absorbing(
        params in params_strategy(),
        prediction in prediction_strategy(),
        trust in trust_strategy(),
    ) {
        let laa = laa_for(params, prediction);
        let mut committed = false;
        for step in 1..=250u64 {
            let decision = laa.decide(&step, trust).unwrap();
            prop_assert_eq!(decision.guarantee, TrustLevel::new(trust).unwrap().guarantee());
            if committed {
                prop_assert_eq!(decision.action, Action::Commit);
            }
            committed |= decision.action == Action::Commit;
        }
    }

    #[test]
    fn replay_matches_closed_form(
        params in params_strategy(),
        prediction in prediction_strategy(),
        trust in trust_strategy(),
        actual in 0.0f64..300.0,
    ) {
        let laa = laa_for(params, prediction);
        let report = simulate(&laa, actual, trust).unwrap();
        prop_assert!(
            close(report.online_cost, report.algorithm_cost),
            "online {} vs closed form {}",
            report.online_cost,
            report.algorithm_cost
        );
        if let Some(step) = report.commit_step {
            prop_assert_eq!(step, report.threshold.commit_step);
        }
    }

    #[test]
    fn ratio_at_least_one(
        params in params_strategy(),
        prediction in prediction_strategy(),
        trust in trust_strategy(),
        actual in 0.0f64..300.0,
    ) {
        let laa = laa_for(params, prediction);
        let outcome = SkiRentalOutcome::new(actual, prediction.into());
        let algorithm = laa.compute_algorithm_cost(&outcome, trust).unwrap();
        let optimal = laa.compute_optimal_cost(&outcome).unwrap();
        let ratio = laa.compute_competitive_ratio(&outcome, trust).unwrap();
        prop_assert!(algorithm + 1e-9 >= optimal);
        if optimal > 0.0 {
            prop_assert!(close(ratio, algorithm / optimal));
            prop_assert!(ratio >= 1.0 - 1e-12);
        } else {
            prop_assert_eq!(ratio, 1.0);
        }
    }
}

// ── Worked examples ─────────────────────────────────────────────────────

fn reference_laa(predicted: f64, uncertainty: f64) -> SkiRentalLaa<FixedPredictor> {
    SkiRentalLaa::from_costs(FixedPredictor::new(predicted, uncertainty), 100.0, 10.0).unwrap()
}

#[test]
fn worked_example_costs() {
    let cases = [
        // (prediction, uncertainty, actual, expected cost)
        (15.0, 1.0, 16.0, 240.0),
        (5.0, 1.0, 4.0, 40.0),
        (7.0, 5.0, 12.0, 170.0),
    ];
    for (predicted, uncertainty, actual, expected) in cases {
        let laa = reference_laa(predicted, uncertainty);
        let outcome = SkiRentalOutcome::new(actual, Prediction::new(predicted, uncertainty).into());
        let cost = laa.compute_algorithm_cost(&outcome, 0.8).unwrap();
        assert!(
            (cost - expected).abs() < 1e-9,
            "prediction {} actual {}: cost {} != {}",
            predicted,
            actual,
            cost,
            expected
        );
    }
}

#[test]
fn worked_example_optimal() {
    let laa = reference_laa(10.0, 1.0);
    let recorded = Prediction::new(10.0, 1.0).into();
    assert_eq!(
        laa.compute_optimal_cost(&SkiRentalOutcome::new(12.0, recorded))
            .unwrap(),
        100.0
    );
    assert_eq!(
        laa.compute_optimal_cost(&SkiRentalOutcome::new(8.0, recorded))
            .unwrap(),
        80.0
    );
}

#[test]
fn threshold_above_duration_reaches_pay_branch() {
    for actual in [0.0, 1.0, 5.5, 19.0, 19.99] {
        let laa = reference_laa(20.0, 1.0);
        let report = simulate(&laa, actual, 0.8).unwrap();
        assert!(!report.committed());
        assert!((report.algorithm_cost - actual * 10.0).abs() < 1e-9);
    }
}

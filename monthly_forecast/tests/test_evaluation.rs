mod common;

use approx::assert_abs_diff_eq;
use common::{counting_series, ColumnModel, MeanModel};
use monthly_forecast::{build_features, evaluate, ChronologicalSplit, ForecastError};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(12, 0.8, 9, 3)]
#[case(10, 0.8, 8, 2)]
#[case(5, 0.8, 4, 1)]
#[case(2, 0.8, 1, 1)]
#[case(1, 0.8, 1, 0)]
#[case(12, 1.0, 12, 0)]
#[case(3, 0.1, 1, 2)]
fn test_split_sizes(
    #[case] n: usize,
    #[case] fraction: f64,
    #[case] train: usize,
    #[case] eval: usize,
) {
    let split = ChronologicalSplit::new(n, fraction).unwrap();
    assert_eq!(
        split,
        ChronologicalSplit {
            train_size: train,
            eval_size: eval
        }
    );
}

#[test]
fn test_split_partitions_every_row() {
    for fraction in [0.5, 0.75, 0.8, 0.9, 1.0] {
        for n in 1..=200 {
            let split = ChronologicalSplit::new(n, fraction).unwrap();
            let expected = ((n as f64 * fraction).floor() as usize).max(1);

            assert_eq!(split.train_size, expected);
            assert_eq!(split.train_size + split.eval_size, n);
            assert!(split.train_size >= 1);
        }
    }
}

#[test]
fn test_split_rejects_bad_input() {
    assert!(matches!(
        ChronologicalSplit::new(0, 0.8),
        Err(ForecastError::InsufficientHistory { .. })
    ));
    for fraction in [0.0, -0.2, 1.5, f64::NAN] {
        assert!(matches!(
            ChronologicalSplit::new(10, fraction),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_evaluate_scores_the_tail() {
    // 24 months with 12 lags leaves 12 rows labelled 13..=24
    let matrix = build_features(&counting_series(24), 12).unwrap();

    let evaluation = evaluate(&MeanModel, &matrix, 0.8).unwrap();

    assert_eq!(evaluation.split.train_size, 9);
    assert_eq!(evaluation.split.eval_size, 3);
    assert_eq!(evaluation.label, "80/20");
    assert_eq!(evaluation.periods, matrix.periods()[9..].to_vec());
    assert_eq!(evaluation.actual, vec![22.0, 23.0, 24.0]);

    // Trained on labels 13..=21 only
    assert_eq!(evaluation.predicted, vec![17.0, 17.0, 17.0]);
    assert_abs_diff_eq!(evaluation.metrics.mae, 6.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
        evaluation.metrics.rmse,
        ((25.0 + 36.0 + 49.0) / 3.0_f64).sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_evaluate_single_row_has_undefined_metrics() {
    let matrix = build_features(&counting_series(13), 12).unwrap();
    assert_eq!(matrix.len(), 1);

    let evaluation = evaluate(&MeanModel, &matrix, 0.8).unwrap();

    assert_eq!(evaluation.split.train_size, 1);
    assert!(evaluation.actual.is_empty());
    assert!(evaluation.predicted.is_empty());
    assert!(evaluation.metrics.mape.is_nan());
    assert!(evaluation.metrics.r2.is_nan());
    assert!(evaluation.metrics.mae.is_nan());
    assert!(evaluation.metrics.rmse.is_nan());
}

#[test]
fn test_evaluate_uses_one_step_rows() {
    // Held-out rows keep their true lags; a lag-1 model is off by exactly one
    let matrix = build_features(&counting_series(30), 3).unwrap();
    let model = ColumnModel {
        column: 0,
        offset: 0.0,
    };

    let evaluation = evaluate(&model, &matrix, 0.5).unwrap();

    assert!(evaluation
        .actual
        .iter()
        .zip(&evaluation.predicted)
        .all(|(a, p)| a - p == 1.0));
    assert_abs_diff_eq!(evaluation.metrics.mae, 1.0, epsilon = 1e-12);
}

#[test]
fn test_evaluate_without_rows_fails() {
    let matrix = build_features(&counting_series(6), 12).unwrap();

    let result = evaluate(&MeanModel, &matrix, 0.8);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistory {
            available: 6,
            required: 13
        })
    ));
}

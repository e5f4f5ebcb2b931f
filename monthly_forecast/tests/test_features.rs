use chrono::{Datelike, NaiveDate};
use monthly_forecast::features::{build_features, named_features, FeatureSchema, FeatureSpec};
use monthly_forecast::{ForecastError, RegularSeries};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()
}

/// Target 1..=n with two exogenous columns derived from it
fn series(n: usize) -> RegularSeries {
    let target: Vec<f64> = (1..=n).map(|v| v as f64).collect();
    let quantity: Vec<f64> = target.iter().map(|v| v * 10.0).collect();
    let cost: Vec<f64> = target.iter().map(|v| v * -1.0).collect();
    RegularSeries::from_monthly_values(
        start(),
        "Sales",
        target,
        vec!["Quantity".to_string(), "Cost".to_string()],
        vec![quantity, cost],
    )
    .unwrap()
}

#[rstest]
#[case(24, 12, 12)]
#[case(13, 12, 1)]
#[case(12, 12, 0)]
#[case(5, 12, 0)]
#[case(0, 3, 0)]
#[case(10, 1, 9)]
fn test_row_count_drops_warmup(#[case] n: usize, #[case] lag: usize, #[case] rows: usize) {
    let matrix = build_features(&series(n), lag).unwrap();

    assert_eq!(matrix.len(), rows);
    assert_eq!(matrix.labels().len(), rows);
    assert_eq!(matrix.periods().len(), rows);
}

#[test]
fn test_schema_column_order() {
    let schema = FeatureSchema::new("Sales", &["Quantity".to_string()], 3).unwrap();

    assert_eq!(
        schema.names(),
        vec![
            "lag_Sales_1",
            "lag_Sales_2",
            "lag_Sales_3",
            "lag_Quantity_1",
            "lag_Quantity_2",
            "lag_Quantity_3",
            "month",
            "year",
        ]
    );
    assert_eq!(schema.len(), 8);
    assert_eq!(schema.position(&FeatureSpec::Year), Some(7));
    assert_eq!(schema.position_by_name("lag_Quantity_2"), Some(4));
}

#[test]
fn test_schema_rejects_bad_layouts() {
    let result = FeatureSchema::new("Sales", &[], 0);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

    let result = FeatureSchema::new("Sales", &["Cost".to_string(), "Cost".to_string()], 2);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

    // An exogenous column named like the target would repeat lag_Sales_k
    let result = FeatureSchema::new("Sales", &["Sales".to_string()], 2);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_build_features_rejects_exogenous_named_like_target() {
    let series = RegularSeries::from_monthly_values(
        start(),
        "Sales",
        vec![1.0; 6],
        vec!["Sales".to_string()],
        vec![vec![2.0; 6]],
    )
    .unwrap();

    let result = build_features(&series, 2);

    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_lag_columns_read_earlier_periods() {
    let lag = 4;
    let data = series(20);
    let matrix = build_features(&data, lag).unwrap();

    for (row_idx, period) in matrix.periods().iter().enumerate() {
        let i = row_idx + lag;
        assert_eq!(*period, data.periods()[i]);
        assert_eq!(matrix.labels()[row_idx], data.target()[i]);

        for k in 1..=lag {
            let target_lag = matrix.column(&format!("lag_Sales_{}", k)).unwrap();
            assert_eq!(target_lag[row_idx], data.target()[i - k]);

            let quantity_lag = matrix.column(&format!("lag_Quantity_{}", k)).unwrap();
            assert_eq!(quantity_lag[row_idx], data.exogenous("Quantity").unwrap()[i - k]);
        }
    }
}

#[test]
fn test_calendar_features_follow_period() {
    let matrix = build_features(&series(30), 12).unwrap();
    let months = matrix.column("month").unwrap();
    let years = matrix.column("year").unwrap();

    for (i, period) in matrix.periods().iter().enumerate() {
        assert_eq!(months[i], period.month() as f64);
        assert_eq!(years[i], period.year() as f64);
    }
    // Jan 2020 + 12 months
    assert_eq!(matrix.periods()[0], NaiveDate::from_ymd_opt(2021, 1, 31).unwrap());
}

#[test]
fn test_labels_do_not_leak_into_same_row() {
    let matrix = build_features(&series(15), 2).unwrap();
    let lag1 = matrix.column("lag_Sales_1").unwrap();

    for (label, previous) in matrix.labels().iter().zip(&lag1) {
        assert_eq!(*label - 1.0, *previous);
    }
}

#[test]
fn test_require_rows_reports_history() {
    let matrix = build_features(&series(10), 12).unwrap();

    match matrix.require_rows() {
        Err(ForecastError::InsufficientHistory {
            available,
            required,
        }) => {
            assert_eq!(available, 10);
            assert_eq!(required, 13);
        }
        other => panic!("expected insufficient history, got {:?}", other),
    }
    assert!(build_features(&series(13), 12).unwrap().require_rows().is_ok());
}

#[test]
fn test_split_at_keeps_order() {
    let matrix = build_features(&series(22), 2).unwrap();
    let (train, test) = matrix.split_at(16);

    assert_eq!(train.len(), 16);
    assert_eq!(test.len(), 4);
    assert!(train.periods().last().unwrap() < test.periods().first().unwrap());
    assert_eq!(train.schema(), matrix.schema());
}

#[test]
fn test_named_features_requires_full_window() {
    let period = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
    let quantity = [1.0, 2.0];

    let result = named_features("Sales", &[1.0, 2.0, 3.0], &[("Quantity", &quantity[..])], period, 3);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientHistory {
            available: 2,
            required: 3
        })
    ));
}

#[test]
fn test_reindex_fills_missing_and_drops_unknown() {
    let schema = FeatureSchema::new("Sales", &["Quantity".to_string()], 2).unwrap();
    let period = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();

    // Row built without the Quantity history but with an extra Cost column
    let cost = [7.0, 8.0];
    let named = named_features("Sales", &[1.0, 2.0, 3.0], &[("Cost", &cost[..])], period, 2).unwrap();

    let aligned = schema.align(named.clone());
    assert_eq!(aligned.row, vec![3.0, 2.0, 0.0, 0.0, 6.0, 2021.0]);
    assert_eq!(
        aligned.missing,
        vec![
            FeatureSpec::ExogenousLag {
                column: "Quantity".to_string(),
                lag: 1
            },
            FeatureSpec::ExogenousLag {
                column: "Quantity".to_string(),
                lag: 2
            },
        ]
    );
    assert_eq!(aligned.unexpected.len(), 2);

    assert_eq!(schema.reindex(named), aligned.row);
}

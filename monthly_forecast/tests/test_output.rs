mod common;

use common::month_end;
use monthly_forecast::output::{MetricsTable, OutputTable};
use monthly_forecast::{EvaluationMetrics, PeriodValue};
use pretty_assertions::assert_eq;

fn pv(y: i32, m: u32, value: f64) -> PeriodValue {
    PeriodValue {
        period: month_end(y, m),
        value,
    }
}

#[test]
fn test_merge_is_an_outer_join() {
    let actual = vec![pv(2023, 1, 10.0), pv(2023, 2, 20.0), pv(2023, 3, 30.0)];
    let fitted = vec![pv(2023, 2, 19.0), pv(2023, 3, 31.0)];
    let forecast = vec![pv(2023, 5, 45.0), pv(2023, 4, 40.0)];

    let table = OutputTable::merge(&actual, &forecast, &fitted);

    assert_eq!(table.len(), 5);
    let periods: Vec<_> = table.rows().iter().map(|r| r.period).collect();
    assert_eq!(
        periods,
        (1..=5).map(|m| month_end(2023, m)).collect::<Vec<_>>()
    );

    let jan = table.get(month_end(2023, 1)).unwrap();
    assert_eq!((jan.actual, jan.forecast, jan.fitted), (Some(10.0), None, None));

    let mar = table.get(month_end(2023, 3)).unwrap();
    assert_eq!((mar.actual, mar.forecast, mar.fitted), (Some(30.0), None, Some(31.0)));

    let apr = table.get(month_end(2023, 4)).unwrap();
    assert_eq!((apr.actual, apr.forecast, apr.fitted), (None, Some(40.0), None));

    assert!(table.get(month_end(2023, 6)).is_none());
}

#[test]
fn test_merge_keeps_periods_only_in_fitted() {
    let fitted = vec![pv(2022, 12, 5.0)];
    let actual = vec![pv(2023, 1, 10.0)];

    let table = OutputTable::merge(&actual, &[], &fitted);

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].fitted, Some(5.0));
    assert_eq!(table.rows()[0].actual, None);
}

#[test]
fn test_merged_table_csv() {
    let table = OutputTable::merge(&[pv(2023, 1, 10.0)], &[pv(2023, 2, 12.5)], &[pv(2023, 1, 9.5)]);

    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();

    assert_eq!(
        text,
        "Month,Actual,Forecast,Fitted\n2023-01-31,10.0,,9.5\n2023-02-28,,12.5,\n"
    );
}

#[test]
fn test_merged_table_dataframe() {
    let table = OutputTable::merge(&[pv(2023, 1, 10.0)], &[pv(2023, 2, 12.5)], &[]);

    let df = table.to_dataframe().unwrap();

    assert_eq!(df.shape(), (2, 4));
    assert_eq!(
        df.get_column_names(),
        vec!["Month", "Actual", "Forecast", "Fitted"]
    );
    assert_eq!(df.column("Actual").unwrap().null_count(), 1);
    assert_eq!(df.column("Fitted").unwrap().null_count(), 2);
}

#[test]
fn test_metrics_table() {
    let metrics = EvaluationMetrics {
        mape: 0.1,
        r2: 0.9,
        mae: 2.0,
        rmse: 3.0,
    };

    let table = MetricsTable::from_metrics(&metrics, "80/20");

    let names: Vec<&str> = table.rows().iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(
        names,
        vec!["MAPE (80/20)", "R2 (80/20)", "MAE (80/20)", "RMSE (80/20)"]
    );
    assert!(table.rows().iter().all(|r| r.split == "80/20"));
    assert_eq!(table.value("RMSE"), Some(3.0));
    assert_eq!(table.value("R2"), Some(0.9));
    assert_eq!(table.value("SMAPE"), None);

    let df = table.to_dataframe().unwrap();
    assert_eq!(df.shape(), (4, 3));

    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert!(text.starts_with("Metric,Value,Split\nMAPE (80/20),0.1,80/20\n"));
}

#[test]
fn test_metrics_table_with_undefined_metrics() {
    let table = MetricsTable::from_metrics(&EvaluationMetrics::undefined(), "80/20");

    assert_eq!(table.len(), 4);
    assert!(table.value("MAE").unwrap().is_nan());
}

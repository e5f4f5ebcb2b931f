use monthly_forecast::{Pipeline, PipelineConfig, RawRecord, Regressor};
use tracing_subscriber::EnvFilter;

/// Three years of seasonal orders, several per month, with one empty month
fn synthetic_orders() -> Vec<RawRecord> {
    let mut records = Vec::new();
    for month_index in 0..36u32 {
        if month_index == 17 {
            continue;
        }
        let year = 2021 + month_index / 12;
        let month = month_index % 12 + 1;
        let season = 1.0 + 0.3 * ((month as f64) * std::f64::consts::PI / 6.0).sin();
        let trend = 1.0 + month_index as f64 * 0.01;

        for day in [3, 14, 25] {
            let quantity = (20.0 * season * trend).round();
            let unit_price = 12.5;
            let sales = quantity * unit_price;
            let cost = sales * 0.6;
            records.push(RawRecord::new(
                format!("{}-{:02}-{:02}", year, month, day),
                sales,
                vec![quantity, unit_price, cost, sales - cost],
            ));
        }
    }
    records.push(RawRecord::new("not a date", 1.0e9, vec![0.0, 0.0, 0.0, 0.0]));
    records
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pipeline = Pipeline::gradient_boosting(PipelineConfig::default())?;
    let output = pipeline.run(&synthetic_orders())?;

    println!("Forecast using {}:", pipeline.model().name());
    for point in &output.forecast {
        println!("  {}: {:.2}", point.period, point.value);
    }
    println!();
    println!("{}", output.evaluation.metrics);

    let mut stdout = std::io::stdout();
    output.tables.merged.write_csv(&mut stdout)?;
    output.tables.metrics.write_csv(&mut stdout)?;

    Ok(())
}

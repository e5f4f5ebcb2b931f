//! # Monthly Forecast Workspace
//!
//! Umbrella crate re-exporting the workspace members.
//!
//! ## Example
//!
//! ```
//! use monthly_forecast_workspace::monthly_forecast::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! assert_eq!(config.horizon, 6);
//! assert_eq!(config.split_label(), "80/20");
//! ```

pub use forecast_math;
pub use monthly_forecast;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_default_booster() {
        let config = monthly_forecast::PipelineConfig::default();
        assert_eq!(config.model, forecast_math::BoosterConfig::default());
        assert!(config.validate().is_ok());
    }
}

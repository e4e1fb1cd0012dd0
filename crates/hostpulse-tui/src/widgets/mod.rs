pub mod metric_chart;
pub mod pct_bar;
pub mod status_indicator;

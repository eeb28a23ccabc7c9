//! Concrete adapter implementations for ports.

pub mod address_view;
pub mod csv_adapter;
pub mod explorer;
pub mod file_config_adapter;
pub mod http;
pub mod svg_chart;
pub mod svg_report_adapter;
pub mod text_report;
pub mod yahoo_adapter;

pub mod google_analytics;

pub use google_analytics::GoogleAnalytics;

pub mod stats;

pub use stats::SiteKeyStats;

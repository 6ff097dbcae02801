//! Repositories: stateless structs with associated async functions over a
//! `PgPool`. SQL lives here and nowhere else.

pub mod config_analysis_repo;
pub mod config_file_repo;
pub mod config_finding_repo;
pub mod config_standard_repo;

pub use config_analysis_repo::ConfigAnalysisRepo;
pub use config_file_repo::ConfigFileRepo;
pub use config_finding_repo::ConfigFindingRepo;
pub use config_standard_repo::ConfigStandardRepo;

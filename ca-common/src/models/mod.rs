//! Domain models shared by the ContractAnalyser services

pub mod analysis;
pub mod artifact;
pub mod contract;
pub mod user;

pub use analysis::{
    AdvancedAnalysis, AnalysisResult, ContractDate, Finding, JurisdictionSummary, RiskLevel,
};
pub use artifact::RedlinedClauseArtifact;
pub use contract::ContractDocument;
pub use user::{AppSettings, UserProfile};

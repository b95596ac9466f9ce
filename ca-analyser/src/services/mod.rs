//! Analysis pipeline services
//!
//! Provider clients sit behind traits ([`llm_client::LlmProvider`],
//! [`email_client::EmailSender`]) so handlers and tests can swap them.
//! Renderers and scoring are pure; [`pipeline`] chains everything together.

pub mod analysis_engine;
pub mod artifact_renderer;
pub mod blob_store;
pub mod delivery;
pub mod email_client;
pub mod html;
pub mod llm_client;
pub mod pipeline;
pub mod report_renderer;
pub mod retention;
pub mod scoring;
pub mod translator;

pub use analysis_engine::{AnalysisEngine, AnalysisError, AnalysisOutcome, AnalysisRequest};
pub use blob_store::{BlobError, BlobStore};
pub use delivery::{DeliveryDispatcher, DeliveryError, DeliveryStatus};
pub use email_client::{EmailSender, ResendClient};
pub use llm_client::{LlmError, LlmProvider, OpenAiClient};
pub use translator::Translator;

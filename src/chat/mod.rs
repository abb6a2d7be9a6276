//! Portfolio chat core
//!
//! Leaf-first: spelling normalization, intent classification, per-session
//! context, SQL templates and resolution, SQL text utilities, insight
//! narration, and the orchestrator that ties a turn together.

pub mod context;
pub mod envelope;
pub mod insights;
pub mod intent;
pub mod normalizer;
pub mod orchestrator;
pub mod resolver;
pub mod sql_text;
pub mod templates;

pub use context::{ConversationState, ConversationTurn, Role};
pub use envelope::ResponseEnvelope;
pub use insights::InsightSummarizer;
pub use intent::{classify, Intent};
pub use normalizer::{normalize, Question};
pub use orchestrator::{QueryOrchestrator, TurnPhase};
pub use resolver::{DelegationRequest, ModificationContext, Resolution, SqlResolver};

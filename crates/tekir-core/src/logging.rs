//! Structured logging field names shared across Tekir crates.
//!
//! Spans declare these fields (often as `tracing::field::Empty`) and code
//! records them through the constants, so log queries stay consistent.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Configuration defect, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (client and table construction) |
//! | DEBUG | Decision points (model resolution, binding lookups) |
//! | TRACE | Per-chunk stream data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event. Values: "inference", "routing"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem. Examples: "openai", "mock", "reasoning"
pub const COMPONENT: &str = "component";

/// Logical operation name. Examples: "generate", "stream", "route"
pub const OPERATION: &str = "op";

// ─── Routing fields ────────────────────────────────────────────────────────

/// Stable model identifier (e.g. "deepseek-reasoning").
pub const MODEL_ID: &str = "model_id";

/// Upstream model slug (e.g. "deepseek/deepseek-r1").
pub const MODEL: &str = "model";

/// Selected provider id.
pub const PROVIDER_ID: &str = "provider_id";

/// Whether reasoning was requested.
pub const REASONING: &str = "reasoning";

/// Active binding environment ("test", "production").
pub const ENVIRONMENT: &str = "environment";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Byte length of the prompt messages.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Byte length of extracted reasoning text.
pub const REASONING_LEN: &str = "reasoning_len";

/// HTTP status returned by an upstream backend.
pub const HTTP_STATUS: &str = "http_status";

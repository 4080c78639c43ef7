// Validation of model answers
// Structural checks, the built-in syntax validator and critique sources

pub mod feedback;
pub mod format;
pub mod syntax;
pub mod traits;

pub use feedback::{FeedbackMode, FeedbackRequest, FeedbackSource, HumanFeedback, ModelFeedback, is_no_feedback};
pub use format::{HeaderValidator, REQUIRED_HEADINGS};
pub use syntax::{DEFAULT_UNSUPPORTED_KEYWORDS, SyntaxValidator};
pub use traits::{ErrorKind, ValidationOutcome, Validator};

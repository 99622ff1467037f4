//! Prompts for the chart interpreter.
//!
//! Callers can override the question via
//! [`crate::interpret::InterpreterConfig::question`] and the system message
//! via [`crate::interpret::InterpreterConfig::system_prompt`]; these
//! constants are used only when no override is provided.

/// Question asked about every image unless the caller supplies one.
pub const CHART_QUESTION: &str = "What does the plot/chart/graph say?";

/// System prompt for the captioning profile.
///
/// Short, descriptive output: the profile caps the answer at 80 tokens.
pub const CAPTION_SYSTEM_PROMPT: &str = "You describe images of charts, plots and graphs \
taken from PDF pages. Reply with one or two plain sentences that state what the figure shows: \
the quantities plotted, the overall trend and any notable values. Do not use Markdown.";

/// System prompt for the document question-answering profile.
pub const DOCQA_SYSTEM_PROMPT: &str = "You answer questions about a single image of a \
document page or figure. Answer only from what is visible in the image. Reply with the answer \
alone, without restating the question, without preamble and without Markdown. If the image \
does not contain the answer, reply with an empty string.";

//! Grounded-answer prompt.
//!
//! The whole document context is inlined on every turn; nothing is cached
//! between questions.

const INSTRUCTION: &str = "Answer the user's question strictly based on the following text \
extracted from several PDF documents. If the answer cannot be found in the text, say that \
the provided documents do not contain that information.";

pub const CONTEXT_START: &str = "--- EXTRACTED CONTEXT ---";
pub const CONTEXT_END: &str = "--- END OF CONTEXT ---";

/// Build the prompt for one turn.
pub fn render(context: &str, question: &str) -> String {
    format!(
        "{INSTRUCTION}\n\n{CONTEXT_START}\n{context}\n{CONTEXT_END}\n\nUSER QUESTION:\n{question}"
    )
}

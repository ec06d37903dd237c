//! Prompt construction for bill analysis.

/// Maximum number of characters of bill text embedded in a prompt.
pub const MAX_BILL_CHARS: usize = 10_000;

/// System instruction sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "You are an Australian Parliamentary Bill Analyst responsible for \
understanding, analysing, and summarising legislative bills. You use simple language that is \
accessible to the general public and avoid technical jargon where possible.";

const PROMPT_HEADER: &str = "Analyse the following Australian parliamentary bill.
Summarise it in simple English that a 12-year-old could follow, and explain the bill's main purpose.
Highlight the key provisions or changes it proposes.

Provide:
1. A summary
2. Key points
3. Possible arguments for
4. Possible arguments against

Bill text:
";

const PROMPT_FOOTER: &str = "

Please use British English. Use simple language that is accessible to the general public and avoid technical jargon where possible.
Format your response as a JSON object with exactly these keys: \"summary\" (a string), \"key_points\" (a list of strings), \"arguments_for\" (a list of strings), \"arguments_against\" (a list of strings).
";

/// Returns the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so the cut never lands inside a code point.
/// Words may be split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Embeds (truncated) bill text into the fixed analysis template.
///
/// The text is inserted verbatim.
pub fn build_prompt(bill_text: &str) -> String {
    let excerpt = truncate_chars(bill_text, MAX_BILL_CHARS);
    let mut prompt =
        String::with_capacity(PROMPT_HEADER.len() + excerpt.len() + PROMPT_FOOTER.len());
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(excerpt);
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

/// Character count of the template without any bill text.
pub fn template_overhead() -> usize {
    PROMPT_HEADER.chars().count() + PROMPT_FOOTER.chars().count()
}

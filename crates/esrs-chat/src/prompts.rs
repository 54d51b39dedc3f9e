//! Prompt construction for classification and question answering.

/// Prompt asking for the single industry code of a company description.
pub fn classification_prompt(company_description: &str, context: &str) -> String {
    format!(
        "You are a NACE classification assistant.
Your job is to identify and return the exact NACE code.

Instructions:
- Analyze the company description.
- Use the context provided for reference.
- Respond with ONLY the NACE code (e.g., 'A01.1' or 'B05').
- Don't forget to include the letter

Company description:
{company_description}

Context:
{context}
"
    )
}

const ANSWER_INSTRUCTIONS: &str = "Instructions:
- Follow the ESRS standards.
- Use the context provided for reference.
- No need to include summary tables
- Answer must be complete and accurate
- Give brief and concise answers
- Prioritize information quality over aesthetics
- Don't show tables, only plain text
- Don't say what was provided in context
- Give answer in markdown format
- Don't include numeric lists, only bullet points";

/// Prompt answering `question` from retrieved context and the full transcript.
pub fn answer_prompt(question: &str, context: &str, history: &[String]) -> String {
    format!(
        "{ANSWER_INSTRUCTIONS}
Question: {question}
Context:
{context}
Take into account the previous conversation:
{}
",
        history.join("\n")
    )
}

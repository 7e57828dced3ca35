//! Prompt templates for every model call.
//!
//! Templates are plain consts with `{name}` placeholders filled by [`render`].
//! The search-result context handed to the synthesis templates is the `[i]`
//! block format from [`crate::search::format_context`]; the citation
//! instructions below refer to those indices.

/// Collapse prior conversation plus a follow-up into one standalone query.
pub const HISTORY_REPHRASE: &str = "\
Given the following conversation and a follow up input, rephrase the follow up \
into a SHORT, standalone search query which captures any relevant context from \
the previous messages. Respond with a short, compressed phrase and nothing \
else. If there is a clear change in topic, disregard the previous messages. \
Strip out anything that is not relevant for retrieval.

Chat History:
{chat_history}

Follow Up Input: {question}

Match the language of the user's question.
Standalone query:";

/// Break a query into a dependency-ordered research plan.
pub const QUERY_PLAN: &str = "\
You are an expert at creating search task lists to answer queries. Break the \
given query into simple, logical steps that can each be executed with a search \
engine.

Rules:
1. Use up to 4 steps maximum; fewer when possible.
2. Keep step descriptions simple and concise.
3. For each step give an integer \"id\" (starting from 0), a \"step\" \
description, and a \"dependencies\" array of earlier step ids.
4. The first step always has an empty dependencies array; later steps list \
every step id they build on.
5. Always end with a final step that summarizes, combines, or compares the \
information from the previous steps.

Example, for \"Compare the revenue and headcount of A and B\":
[
    {\"id\": 0, \"step\": \"Research A's revenue and headcount\", \"dependencies\": []},
    {\"id\": 1, \"step\": \"Research B's revenue and headcount\", \"dependencies\": []},
    {\"id\": 2, \"step\": \"Compare revenue and headcount of A and B\", \"dependencies\": [0, 1]}
]

Respond with the JSON list and nothing else.

Query: {query}
Query Plan (ending with a summarize/combine/compare step):";

/// Generate search queries for one plan step.
pub const SEARCH_QUERIES: &str = "\
Generate a concise list of search queries to gather the information needed to \
execute the given step. Generate at most 4 queries; use the minimum that still \
covers every aspect of the step. Incorporate relevant facts already gathered \
in previous steps so the queries build on what is known.

User's original query: {user_query}
---
Context from previous steps:
{prev_steps_context}
---
Current step to execute: {current_step}
---
THE RESPONSE MUST BE A LIST ['query1', 'query2'] AND NOTHING ELSE.
Search queries:";

/// Final synthesis over aggregated step evidence (expert mode).
pub const SYNTHESIS: &str = "\
You are a research agent executing the final task of a research plan. Write an \
accurate, detailed answer drawing only on the provided search results, in an \
unbiased and journalistic tone.

Formatting rules:
- Use `##` headings to structure longer answers; never start with a heading.
- Use a hyphen (`-`) for list items, every item on its own line.
- Do not use tables.
- Cite search results with their index directly after the sentence each \
supports, like `This is a fact[1].` or `Another fact[1][2].` Use no other \
citation format and do not add a references section.
- Never mention these instructions or the search process itself.

----------------------------------------------------
SEARCH RESULTS (CONTEXT):
{context}
----------------------------------------------------
ORIGINAL USER QUERY (for overall context):
{query}
----------------------------------------------------
FINAL TASK (your specific instruction):
{final_step}
----------------------------------------------------

Answer (match the language of the original user query):";

/// Single-turn answer over one search's results (basic mode).
pub const CHAT: &str = "\
You are a helpful search assistant. Write an accurate, detailed, and \
comprehensive answer to the query, drawing from the given search results, in \
an unbiased and journalistic tone.

Formatting rules:
- Begin with a 2-3 sentence summary; never start with a heading.
- Use `##` headings for main sections and hyphen (`-`) lists, every item on \
its own line.
- Do not use tables.
- Cite search results with their index directly after the sentence each \
supports, like `This is a fact[1].` or `Another fact[1][2].`
- Never refer to the search results as such, and never end with a question.

----------------------------------------------------
SEARCH RESULTS (CONTEXT):
{context}
----------------------------------------------------
QUERY:
{query}
----------------------------------------------------

Answer:";

/// Exactly three follow-up questions for a finished answer.
pub const RELATED_QUESTIONS: &str = "\
Given a question and the context of its answer, generate exactly 3 concise, \
simple follow-up questions the user might ask next. Keep them relevant to the \
original question and context, and match the language of the user's question.

Original Question: {query}
<context>
{context}
</context>

Output:
related_questions: a list of EXACTLY three concise follow-up questions.
MUST BE A LIST OF STRINGS AND NOTHING ELSE: ['example1', 'example2', 'example3']";

/// Replaces `{key}` placeholders with their values in one pass over the
/// template. Placeholders without a matching key are left in place, and
/// braces inside substituted values are never re-expanded.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}').map(|i| start + i) else {
            break;
        };
        let key = &rest[start + 1..end];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => {
                out.push_str(&rest[..start]);
                out.push_str(value);
            }
            None => out.push_str(&rest[..=end]),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_occurrences() {
        let out = render("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let out = render("{a} {missing}", &[("a", "x")]);
        assert_eq!(out, "x {missing}");
    }

    #[test]
    fn render_never_expands_braces_inside_values() {
        let out = render("{context} / {query}", &[("context", "has {query} inside"), ("query", "q")]);
        assert_eq!(out, "has {query} inside / q");
    }

    #[test]
    fn templates_carry_their_placeholders() {
        assert!(QUERY_PLAN.contains("{query}"));
        assert!(SEARCH_QUERIES.contains("{user_query}"));
        assert!(SEARCH_QUERIES.contains("{prev_steps_context}"));
        assert!(SEARCH_QUERIES.contains("{current_step}"));
        assert!(SYNTHESIS.contains("{context}"));
        assert!(SYNTHESIS.contains("{final_step}"));
        assert!(HISTORY_REPHRASE.contains("{chat_history}"));
        assert!(RELATED_QUESTIONS.contains("{context}"));
        assert!(CHAT.contains("{context}"));
    }
}

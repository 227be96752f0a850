//! Fixed reply texts for the non-generative paths.

use crate::domain::Source;

/// Signature used in every canned reply
pub fn assistant_name(location: &str) -> String {
    format!("{location} Event Info Assistant")
}

fn sign(location: &str, paragraphs: &[&str]) -> String {
    format!(
        "Hi,\n\n{}\n\nRegards,\n{}",
        paragraphs.join("\n\n"),
        assistant_name(location)
    )
}

/// Polite refusal for requests that trip the safety gate
pub fn refusal(location: &str) -> String {
    sign(
        location,
        &[&format!(
            "Sorry, I can't help with that request. If you're looking for information about public events in {location}, \
             tell me what kind of events you're interested in (culture, tech, business, sports) and your preferred dates."
        )],
    )
}

/// Apology when no usable sources were found
pub fn insufficient_sources(location: &str) -> String {
    sign(
        location,
        &[&format!(
            "I couldn't find enough reliable recent information about events in {location} right now. \
             If you share the type of event (culture/tech/business/sports) and a date range (e.g., this weekend), \
             I can try again."
        )],
    )
}

/// Degraded reply listing raw sources when the generator is not configured
pub fn generator_unconfigured(location: &str, sources: &[Source]) -> String {
    let listing = sources
        .iter()
        .map(|s| format!("- {}: {}", s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n");

    sign(
        location,
        &[
            "I found some sources, but the reply generator is not configured on this server yet. \
             An administrator needs to set OPENAI_API_KEY.",
            &format!("Sources I found:\n{listing}"),
        ],
    )
}

/// Fallback when the pipeline produced no reply text at all
pub fn try_again(location: &str) -> String {
    sign(
        location,
        &["Sorry, I couldn't generate a reply right now. Please try again with more details."],
    )
}

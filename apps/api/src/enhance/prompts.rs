// Prompt builders for the two enhancement call sites.
// The model must return only the rewritten text: no preamble, no quotes.

pub const SUMMARY_RULES: &str = "\
- 2-3 sentences max
- Strong action words
- No first person (I, my, me)
- Return ONLY the improved summary";

pub const BULLET_RULES: &str = "\
- Start with action verb
- Add metrics if possible
- 1-2 lines max
- Return ONLY the improved bullet";

/// Summary prompt. `target_job` adds a tailoring line when present.
pub fn summary_prompt(summary: &str, target_job: Option<&str>) -> String {
    let job_context = match target_job.map(str::trim) {
        Some(job) if !job.is_empty() => format!("\nTarget job: {job}"),
        _ => String::new(),
    };
    format!(
        "Improve this CV summary. Rules:\n{SUMMARY_RULES}\n\nOriginal: {summary}{job_context}\n\nImproved:"
    )
}

pub fn bullet_prompt(bullet: &str) -> String {
    format!("Improve this CV bullet point. Rules:\n{BULLET_RULES}\n\nOriginal: {bullet}\n\nImproved:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_includes_target_job() {
        let p = summary_prompt("I write code.", Some("Staff Engineer"));
        assert!(p.contains("Original: I write code."));
        assert!(p.contains("\nTarget job: Staff Engineer"));
        assert!(p.ends_with("Improved:"));
    }

    #[test]
    fn test_summary_prompt_omits_blank_target_job() {
        let p = summary_prompt("I write code.", Some("  "));
        assert!(!p.contains("Target job"));
    }

    #[test]
    fn test_bullet_prompt_has_bullet_rules() {
        let p = bullet_prompt("did stuff");
        assert!(p.contains("Start with action verb"));
        assert!(p.contains("Original: did stuff"));
    }
}

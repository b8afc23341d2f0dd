//! Extraction step: pulls structured fragments (repro steps, environment
//! info, stack trace) out of the issue body for the draft step to quote
//! back (spec §4.3, step 2 "extract").

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContext {
    pub repro_steps: Option<String>,
    pub environment: Option<String>,
    pub stack_trace: Option<String>,
}

fn section_after(body: &str, headers: &[&str]) -> Option<String> {
    let lower = body.to_lowercase();
    for header in headers {
        if let Some(idx) = lower.find(header) {
            let rest = &body[idx + header.len()..];
            let end = rest.find("\n\n").unwrap_or(rest.len().min(400));
            let chunk = rest[..end].trim();
            if !chunk.is_empty() {
                return Some(chunk.to_string());
            }
        }
    }
    None
}

pub fn extract(body: Option<&str>) -> ExtractedContext {
    let Some(body) = body else { return ExtractedContext::default() };

    let repro_steps = section_after(body, &["steps to reproduce", "to reproduce", "repro steps"]);
    let environment = section_after(body, &["environment", "version info", "system info"]);
    let stack_trace = body
        .find("```")
        .and_then(|start| {
            let rest = &body[start + 3..];
            rest.find("```").map(|end| rest[..end].trim().to_string())
        })
        .filter(|s| !s.is_empty());

    ExtractedContext { repro_steps, environment, stack_trace }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_repro_section() {
        let body = "Steps to reproduce\n1. open app\n2. click button\n\nOther notes here.";
        let ctx = extract(Some(body));
        assert!(ctx.repro_steps.unwrap().contains("open app"));
    }

    #[test]
    fn extracts_fenced_stack_trace() {
        let body = "Crash log:\n```\npanic at line 5\n```\nend";
        let ctx = extract(Some(body));
        assert_eq!(ctx.stack_trace.unwrap(), "panic at line 5");
    }

    #[test]
    fn empty_body_yields_empty_context() {
        assert_eq!(extract(None), ExtractedContext::default());
    }
}

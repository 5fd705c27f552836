//! Renders the extraction probe: a self-contained polling script executed in
//! the page's context. Arguments are embedded through JSON serialization so
//! nothing is shared across the execution-context boundary.
use serde_json::Value;

use crate::domain::model::ProbeRequest;

/// Builds the probe expression for one invocation. The script polls
/// `querySelectorAll` up to `max_attempts` times, returning
/// `[{title, link}]` as soon as anything matches and `[]` on exhaustion.
/// Titles are trimmed text content; links are the resolved `href` or "".
pub fn render_probe_script(probe: &ProbeRequest) -> String {
    let selector = Value::String(probe.selector.clone()).to_string();
    format!(
        r#"(async () => {{
  const selector = {selector};
  const maxAttempts = {max_attempts};
  const pollMs = {poll_ms};
  for (let attempt = 0; attempt < maxAttempts; attempt++) {{
    const elements = document.querySelectorAll(selector);
    if (elements.length > 0) {{
      return Array.from(elements).map((el) => ({{
        title: (el.textContent || '').trim(),
        link: el.href || '',
      }}));
    }}
    await new Promise((resolve) => setTimeout(resolve, pollMs));
  }}
  return [];
}})()"#,
        selector = selector,
        max_attempts = probe.max_attempts,
        poll_ms = probe.poll_interval_ms,
    )
}

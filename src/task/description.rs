//! Markdown card descriptions.

use crate::core::DescriptionConfig;
use crate::git::DEFAULT_WEB_URL;
use crate::review::{Conclusion, Conclusions};

/// End marker of the comment block heading a task record.
const COMMENT_END: &str = "-->";

/// Static parts of a card description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionTemplate {
    /// Web URL of the hosted repository, without trailing slash
    pub web_url: String,
    /// Testing badge lines with `{branch}` placeholders
    pub badges: Vec<String>,
}

impl DescriptionTemplate {
    /// Build the template from configuration.
    ///
    /// `detected_web_url` is used when the configuration leaves the web URL
    /// unset.
    pub fn from_config(config: &DescriptionConfig, detected_web_url: Option<String>) -> Self {
        let web_url = config
            .web_url
            .clone()
            .or(detected_web_url)
            .unwrap_or_else(|| DEFAULT_WEB_URL.to_string());
        Self { web_url: web_url.trim_end_matches('/').to_string(), badges: config.badges.clone() }
    }

    /// Render the description of a task.
    pub fn render(
        &self,
        name: &str,
        on_review: bool,
        conclusions: &Conclusions,
        task_record: Option<&str>,
    ) -> String {
        let mut doc = format!("# Task Name\n\n{name}\n\n");

        if on_review && !conclusions.is_empty() {
            doc.push_str("# Reviews\n\n");
            doc.push_str(reviews_section(conclusions).trim());
            doc.push_str("\n\n");
        }

        if !self.badges.is_empty() {
            doc.push_str("# Testing\n\n");
            let badges: Vec<String> =
                self.badges.iter().map(|b| format!("* {}", b.replace("{branch}", name))).collect();
            doc.push_str(&badges.join("\n"));
            doc.push_str("\n\n");
        }

        doc.push_str(&format!(
            "# Github\n\n* [Branch on github]({web}/tree/{name})\n* [Diff on github]({web}/compare/{name})\n\n",
            web = self.web_url,
        ));

        if let Some(record) = task_record {
            doc.push_str(strip_leading_comment(record));
            doc.push_str("\n\n");
        }

        doc.trim().to_string()
    }
}

impl Default for DescriptionTemplate {
    fn default() -> Self {
        Self::from_config(&DescriptionConfig::default(), None)
    }
}

/// Sorted bullets for every non-pending conclusion.
fn reviews_section(conclusions: &Conclusions) -> String {
    let mut bullets: Vec<String> = conclusions
        .iter()
        .filter(|(_, conclusion)| **conclusion != Conclusion::Open)
        .map(|(author, conclusion)| format!("* {author}: {conclusion}"))
        .collect();
    bullets.sort();
    bullets.join("\n")
}

/// Drop everything up to the end of the first comment block.
fn strip_leading_comment(record: &str) -> &str {
    match record.find(COMMENT_END) {
        Some(index) => record[index + COMMENT_END.len()..].trim_start(),
        None => record,
    }
}

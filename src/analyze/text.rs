//! Catch-all text analyzer. Scans for email addresses; a single unrecognized
//! domain across the file is taken to be the template authors' own, which
//! makes the domain and the author address worth abstracting.

use std::path::Path;

use regex::Regex;

use crate::error::Result;
use crate::scan;
use crate::template_def::{Mappings, Pattern};

use super::{AbstractCandidate, Analyzer, FileAnalysis, MappingKind};

const EMAIL_PATTERN: &str = r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b";

const PUBLIC_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "protonmail.com",
    "zoho.com",
    "gmx.com",
    "icloud.com",
    "yandex.com",
    "aol.com",
    "mail.com",
    "tutanota.com",
    "fastmail.com",
];

struct Text {
    file: String,
    emails: Vec<String>,
    domain: String,
    vars: Vec<String>,
}

pub(super) fn accepts(_base_dir: &Path, _file: &str) -> bool {
    true
}

pub(super) fn build(base_dir: &Path, file: &str) -> Result<Box<dyn Analyzer>> {
    let raw = std::fs::read(scan::join_file(base_dir, file))?;
    let content = String::from_utf8_lossy(&raw);
    let email_re = Regex::new(EMAIL_PATTERN)?;

    let mut emails: Vec<String> = Vec::new();
    let mut vars: Vec<String> = Vec::new();
    let mut unrecognized: Vec<String> = Vec::new();

    for line in content.lines() {
        for hit in email_re.find_iter(line) {
            let email = hit.as_str();
            if embedded_in_url_or_env(line, hit.start(), hit.end()) {
                continue;
            }
            if emails.iter().any(|e| e == email) {
                continue;
            }
            emails.push(email.to_string());
            if !vars.iter().any(|v| v == "author_email") {
                vars.push("author_email".to_string());
            }
            if let Some((_, domain)) = email.split_once('@') {
                if !PUBLIC_PROVIDERS.contains(&domain)
                    && !unrecognized.iter().any(|d| d == domain)
                {
                    unrecognized.push(domain.to_string());
                    if !vars.iter().any(|v| v == "project_domain") {
                        vars.push("project_domain".to_string());
                    }
                }
            }
        }
    }

    let domain = match unrecognized.as_slice() {
        [single] => single.clone(),
        _ => String::new(),
    };

    Ok(Box::new(Text {
        file: file.to_string(),
        emails,
        domain,
        vars,
    }))
}

/// An email-shaped string preceded by `$`, `:`, `/`, or `@`, or followed by
/// `/`, `?`, or `:` is part of a URL or an environment reference, not a real
/// address.
fn embedded_in_url_or_env(line: &str, start: usize, end: usize) -> bool {
    if let Some(before) = line[..start].chars().next_back() {
        if matches!(before, '$' | ':' | '/' | '@') {
            return true;
        }
    }
    if let Some(after) = line[end..].chars().next() {
        if matches!(after, '/' | '?' | ':') {
            return true;
        }
    }
    false
}

impl Analyzer for Text {
    fn abstract_candidates(&self) -> Result<Vec<AbstractCandidate>> {
        let mut candidates = Vec::new();
        if self.domain.is_empty() {
            return Ok(candidates);
        }

        candidates.push(AbstractCandidate {
            kind: MappingKind::Content,
            name: "project_domain".to_string(),
            key: self.domain.clone(),
            value: "{{project_domain}}".to_string(),
            priority: 1,
        });

        let suffix = format!("@{}", self.domain);
        if let Some(email) = self.emails.iter().find(|e| e.ends_with(&suffix)) {
            candidates.push(AbstractCandidate {
                kind: MappingKind::Content,
                name: "author_email".to_string(),
                key: email.clone(),
                value: "{{author_email}}".to_string(),
                priority: 2,
            });
        }

        Ok(candidates)
    }

    fn file_analyses(&self) -> Result<Vec<FileAnalysis>> {
        let content: Mappings = self
            .emails
            .iter()
            .map(|email| (email.clone(), "{{author_email}}".to_string()))
            .collect();

        Ok(vec![FileAnalysis {
            pattern: Some(Pattern {
                pattern: self.file.clone(),
                content,
                ..Pattern::default()
            }),
            vars: self.vars.clone(),
            ..FileAnalysis::default()
        }])
    }

    fn file_name(&self) -> &str {
        &self.file
    }
}

//! Repository security scan results.
//!
//! The demo scanner returns a fixed catalog of findings for any accepted
//! repository reference; the risk score is derived from the finding count.

use serde::Serialize;

/// Severity levels reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

/// One finding in a scan report.
#[derive(Debug, Clone, Serialize)]
pub struct ScanIssue {
    pub id: String,
    pub file: String,
    pub line: u32,
    pub category: String,
    pub severity: Severity,
    pub confidence: u8,
    pub suggestion: String,
}

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub issues: Vec<ScanIssue>,
    pub risk_score: u32,
}

/// Runs the demo scan for a validated repository reference.
pub fn run_scan(repo_ref: &str) -> ScanReport {
    tracing::info!("Scanning: {}", repo_ref);

    let issues = issue_catalog();
    let risk_score = risk_score(issues.len());

    tracing::info!(
        "{} issues for {} | Risk: {}/100",
        issues.len(),
        repo_ref,
        risk_score
    );

    ScanReport { issues, risk_score }
}

/// Twelve points per finding, capped at 95.
pub fn risk_score(issue_count: usize) -> u32 {
    std::cmp::min(issue_count as u32 * 12, 95)
}

fn issue(
    id: &str,
    file: &str,
    line: u32,
    category: &str,
    severity: Severity,
    confidence: u8,
    suggestion: &str,
) -> ScanIssue {
    ScanIssue {
        id: id.to_string(),
        file: file.to_string(),
        line,
        category: category.to_string(),
        severity,
        confidence,
        suggestion: suggestion.to_string(),
    }
}

fn issue_catalog() -> Vec<ScanIssue> {
    vec![
        issue(
            "1",
            "src/components/Login.jsx",
            42,
            "XSS Vulnerability",
            Severity::High,
            92,
            "npm install dompurify\nconst cleanInput = DOMPurify.sanitize(userInput);",
        ),
        issue(
            "2",
            "src/utils/database.js",
            18,
            "SQL Injection",
            Severity::Critical,
            98,
            "Use parameterized queries: db.query(\"SELECT * FROM users WHERE id=?\", [id])",
        ),
        issue(
            "3",
            "src/hooks/useFetchData.ts",
            33,
            "Memory Leak",
            Severity::Medium,
            85,
            "Abort in-flight requests on unmount with an AbortController cleanup",
        ),
        issue(
            "4",
            ".env.local",
            5,
            "OpenAI API Key Leaked",
            Severity::Critical,
            99,
            "Regenerate NEXT_PUBLIC_OPENAI_API_KEY and add .env* to .gitignore",
        ),
        issue(
            "5",
            "package.json",
            15,
            "lodash Vulnerable (XSS)",
            Severity::High,
            95,
            "npm install lodash@4.17.21",
        ),
        issue(
            "6",
            "src/config.js",
            8,
            "AWS Access Key Exposed",
            Severity::Critical,
            99,
            "Rotate the IAM access key and run git rm --cached src/config.js",
        ),
    ]
}

//! Input classification for scan submissions.
//!
//! Decides whether user-supplied text names a repository or carries a code
//! snippet, and whether the requested scan type accepts that kind of input.
//! This is the single shared implementation consumed by every submission
//! endpoint, so the server-side gate and any pre-check can never disagree.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Repository reference, optionally prefixed with a scheme, `www.` and
/// `github.com/`.
static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((https?://)?(www\.)?(github\.com/))?[\w.-]+/[\w.-]+$").unwrap()
});

/// Tokens strongly indicative of source code.
static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(function|const|let|var|useEffect|useState|fetch|axios|console\.log|import|export|class|async|await|interface|type|return|if|for|while|switch|case|break)\b",
    )
    .unwrap()
});

/// Narrower `owner/repo` shape used by the PR-automation gate. No URL
/// prefixes are tolerated here.
static STRICT_REPO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*/[A-Za-z0-9._-]*$").unwrap());

/// Reduced keyword set for the PR-automation gate, including non-JS markers
/// like `def`.
static STRICT_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(function|const|console\.log|useEffect|fetch|def|class|if|return)\b").unwrap()
});

/// The downstream workflow a submission is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Security,
    Review,
    PrAutomation,
    Architecture,
    RbacManagement,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Security => "security",
            ScanType::Review => "review",
            ScanType::PrAutomation => "pr_automation",
            ScanType::Architecture => "architecture",
            ScanType::RbacManagement => "rbac_management",
        }
    }

    /// Uppercase label used in user-facing messages.
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Whether this workflow can run against an ad-hoc code snippet.
    /// Everything else requires a repository reference.
    pub fn accepts_code(&self) -> bool {
        matches!(self, ScanType::Review | ScanType::PrAutomation)
    }
}

impl FromStr for ScanType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "security" => Ok(ScanType::Security),
            "review" => Ok(ScanType::Review),
            "pr_automation" => Ok(ScanType::PrAutomation),
            "architecture" => Ok(ScanType::Architecture),
            "rbac_management" => Ok(ScanType::RbacManagement),
            other => Err(format!("Unknown scan type '{}'", other)),
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of artifact the input was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputCategory {
    Repo,
    Code,
    Invalid,
}

/// Outcome of classifying one submission. Never an error: rejections are
/// reported through `valid` and `error`.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub valid: bool,
    pub category: InputCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Classification {
    fn repo(repo_ref: &str) -> Self {
        Classification {
            valid: true,
            category: InputCategory::Repo,
            repo_ref: Some(repo_ref.to_string()),
            error: None,
        }
    }

    fn code() -> Self {
        Classification {
            valid: true,
            category: InputCategory::Code,
            repo_ref: None,
            error: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Classification {
            valid: false,
            category: InputCategory::Invalid,
            repo_ref: None,
            error: Some(error.into()),
        }
    }
}

/// Classifies raw user input for the given scan type.
///
/// Rules run in priority order: empty input is rejected before any pattern
/// matching; PR automation then applies its own stricter gate which
/// short-circuits rejection (a pass still flows through the general rules);
/// a repository match wins over a code match and is accepted by every scan
/// type; a code match is accepted only by code-accepting scan types.
pub fn classify(raw_input: &str, scan_type: ScanType) -> Classification {
    let input = raw_input.trim();

    if input.is_empty() {
        return Classification::invalid("Empty input - enter a GitHub repo or a code snippet");
    }

    // The PR-automation gate is intentionally independent of the general
    // patterns below; the two regimes are allowed to disagree.
    if scan_type == ScanType::PrAutomation
        && !STRICT_REPO_PATTERN.is_match(input)
        && !STRICT_CODE_PATTERN.is_match(input)
    {
        return Classification::invalid(
            "PR_AUTOMATION requires:\n\
             - GitHub repo: owner/repo\n\
             - Real code: console.log(\"debug\")\n\
             Random text is not allowed",
        );
    }

    if REPO_PATTERN.is_match(input) {
        return Classification::repo(input);
    }

    if CODE_PATTERN.is_match(input) {
        if scan_type.accepts_code() {
            return Classification::code();
        }
        return Classification::invalid(format!(
            "{} requires a GitHub repo only (owner/repo)",
            scan_type.label()
        ));
    }

    Classification::invalid(rejection_message(scan_type))
}

/// Builds the rejection message enumerating the accepted input forms for a
/// scan type. The code-snippet line only appears for code-accepting types.
fn rejection_message(scan_type: ScanType) -> String {
    let mut message = format!(
        "Invalid input\n\n{} accepts:\n- GitHub repo: rish0000-dot/Portfolio\n",
        scan_type.label()
    );
    if scan_type.accepts_code() {
        message.push_str("- Code snippet: console.log(\"debug\")\n");
    }
    message.push_str("Random text is not accepted");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SCAN_TYPES: [ScanType; 5] = [
        ScanType::Security,
        ScanType::Review,
        ScanType::PrAutomation,
        ScanType::Architecture,
        ScanType::RbacManagement,
    ];

    #[test]
    fn repo_shapes_are_accepted_by_every_scan_type() {
        let plain = ["rish0000-dot/Portfolio", "foo/bar", "owner-1/repo.name"];

        for scan_type in ALL_SCAN_TYPES {
            for input in plain {
                let result = classify(input, scan_type);
                assert!(result.valid, "{} should be valid for {}", input, scan_type);
                assert_eq!(result.category, InputCategory::Repo);
                assert_eq!(result.repo_ref.as_deref(), Some(input));
            }
        }
    }

    #[test]
    fn url_prefixed_repo_shapes_pass_the_general_pattern() {
        // PR automation is excluded here: its strict gate does not tolerate
        // URL prefixes (covered separately below).
        let prefixed = [
            "github.com/foo/bar",
            "www.github.com/foo/bar",
            "https://github.com/foo/bar",
            "http://www.github.com/some.owner/some-repo",
        ];

        for scan_type in [
            ScanType::Security,
            ScanType::Review,
            ScanType::Architecture,
            ScanType::RbacManagement,
        ] {
            for input in prefixed {
                let result = classify(input, scan_type);
                assert!(result.valid, "{} should be valid for {}", input, scan_type);
                assert_eq!(result.category, InputCategory::Repo);
            }
        }
    }

    #[test]
    fn repo_ref_is_trimmed() {
        let result = classify("  foo/bar  ", ScanType::Security);
        assert!(result.valid);
        assert_eq!(result.repo_ref.as_deref(), Some("foo/bar"));
    }

    #[test]
    fn url_prefix_without_github_host_is_not_a_repo() {
        let result = classify("https://example.com/foo/bar", ScanType::Security);
        assert!(!result.valid);
        assert_eq!(result.category, InputCategory::Invalid);
    }

    #[test]
    fn code_snippets_are_accepted_only_by_code_accepting_scan_types() {
        let snippets = ["const x = 1", "console.log('hi')", "async function run() {}"];

        for snippet in snippets {
            let accepted = classify(snippet, ScanType::Review);
            assert!(accepted.valid, "{} should pass review", snippet);
            assert_eq!(accepted.category, InputCategory::Code);
            assert!(accepted.repo_ref.is_none());

            let rejected = classify(snippet, ScanType::RbacManagement);
            assert!(!rejected.valid);
            assert_eq!(rejected.category, InputCategory::Invalid);
            assert!(
                rejected
                    .error
                    .as_deref()
                    .unwrap()
                    .contains("requires a GitHub repo only")
            );
        }
    }

    #[test]
    fn security_scan_rejects_code_snippets() {
        let result = classify("fetch('/api')", ScanType::Security);
        assert!(!result.valid);
        assert!(
            result
                .error
                .as_deref()
                .unwrap()
                .contains("SECURITY requires a GitHub repo only")
        );
    }

    #[test]
    fn whitespace_only_input_is_rejected_before_pattern_matching() {
        for scan_type in ALL_SCAN_TYPES {
            for input in ["", "   ", "\n\t  "] {
                let result = classify(input, scan_type);
                assert!(!result.valid);
                assert_eq!(result.category, InputCategory::Invalid);
                assert!(result.error.as_deref().unwrap().contains("Empty input"));
            }
        }
    }

    #[test]
    fn prose_rejection_lists_accepted_forms_per_scan_type() {
        let prose = "just some english prose";

        let review = classify(prose, ScanType::Review);
        assert!(!review.valid);
        let review_error = review.error.unwrap();
        assert!(review_error.contains("GitHub repo: rish0000-dot/Portfolio"));
        assert!(review_error.contains("Code snippet"));

        let rbac = classify(prose, ScanType::RbacManagement);
        assert!(!rbac.valid);
        let rbac_error = rbac.error.unwrap();
        assert!(rbac_error.contains("GitHub repo: rish0000-dot/Portfolio"));
        assert!(!rbac_error.contains("Code snippet"));
    }

    #[test]
    fn pr_automation_accepts_simple_repo_via_strict_gate() {
        let result = classify("owner/repo", ScanType::PrAutomation);
        assert!(result.valid);
        assert_eq!(result.category, InputCategory::Repo);
    }

    #[test]
    fn pr_automation_strict_gate_rejects_plain_text() {
        let result = classify("random text no keywords", ScanType::PrAutomation);
        assert!(!result.valid);
        assert!(result.error.as_deref().unwrap().contains("PR_AUTOMATION"));
        assert!(result.error.as_deref().unwrap().contains("not allowed"));
    }

    #[test]
    fn strict_gate_rejects_url_prefixed_repo_the_general_rules_would_accept() {
        // The two pattern tiers are independent: a URL-prefixed reference
        // passes the general repo pattern but not the strict one.
        let input = "https://github.com/foo/bar";
        assert!(classify(input, ScanType::Security).valid);
        assert!(!classify(input, ScanType::PrAutomation).valid);
    }

    #[test]
    fn strict_gate_pass_does_not_bypass_general_rules() {
        // `def` clears the strict code set but is unknown to the general
        // keyword set, so the general rules still reject it.
        let result = classify("def greet", ScanType::PrAutomation);
        assert!(!result.valid);
        assert_eq!(result.category, InputCategory::Invalid);
    }

    #[test]
    fn scan_type_parsing_is_case_insensitive_and_closed() {
        assert_eq!("SECURITY".parse::<ScanType>().unwrap(), ScanType::Security);
        assert_eq!(
            "pr_automation".parse::<ScanType>().unwrap(),
            ScanType::PrAutomation
        );
        assert!("magic_scan".parse::<ScanType>().is_err());
    }
}

//! Demo backend
//!
//! Produces an analysis locally, without contacting the API, after a short
//! simulated delay. The result always has the same shape but its content is
//! read off the policy text: headings ending in `:` open sections, and lines
//! starting with `-`, `*` or `•` are bullets within them.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::error::Result;
use crate::models::{
    Amount, AnalysisRequest, AnalysisResult, Coverage, Deductible, PolicyFlags, RiskLevel,
};

use super::AnalysisBackend;

/// Longest first line still treated as the policy's title
const MAX_TITLE_LEN: usize = 80;

const LEGAL_TERMS: &[&str] = &[
    "arbitration",
    "indemnif",
    "waiver",
    "subrogation",
    "notwithstanding",
];

/// Words too generic to signal a conflict between coverage and exclusions
const STOPWORDS: &[&str] = &[
    "excluded", "exclusion", "covered", "coverage", "included", "policy", "insurance", "first",
    "months", "annual", "annually", "other", "except", "under", "after", "within",
];

/// Local stand-in for the analysis API
#[derive(Clone, Debug)]
pub struct DemoBackend {
    delay: Duration,
}

impl DemoBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Demo backend with no simulated delay
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Build a result from the request without waiting
    pub fn synthesize(request: &AnalysisRequest) -> AnalysisResult {
        let sections = PolicySections::parse(&request.policy_text);
        let lower = request.policy_text.to_lowercase();

        let exclusions = sections.exclusions();
        let covered = sections.covered(&exclusions);
        let deductibles = sections.deductibles();
        let amount = largest_dollar_amount(&request.policy_text);

        let has_waiting_period = lower.contains("waiting period");
        let network_restricted = lower.contains("network");

        let score = exclusions.len()
            + usize::from(has_waiting_period)
            + usize::from(network_restricted)
            + usize::from(amount.is_none());
        let risk = match score {
            0..=3 => RiskLevel::Low,
            4..=6 => RiskLevel::Medium,
            _ => RiskLevel::High,
        };

        let flags = PolicyFlags {
            needs_legal_review: risk == RiskLevel::High
                || LEGAL_TERMS.iter().any(|term| lower.contains(term)),
            inconsistent_clauses_detected: has_conflict(&covered, &exclusions),
        };

        let mut actions = Vec::new();
        if !exclusions.is_empty() {
            actions.push(format!(
                "Review the {} listed exclusion{} before relying on this policy",
                exclusions.len(),
                if exclusions.len() == 1 { "" } else { "s" }
            ));
        }
        if !deductibles.is_empty() {
            actions.push("Budget for the listed deductibles".to_string());
        }
        if has_waiting_period {
            actions.push("Note the waiting period before coverage starts".to_string());
        }
        if network_restricted {
            actions.push("Confirm your providers are in the insurer's network".to_string());
        }
        if amount.is_none() {
            actions.push("Ask the insurer for the coverage limits in writing".to_string());
        }
        if flags.needs_legal_review {
            actions.push("Have a licensed professional review the legal terms".to_string());
        }
        if flags.inconsistent_clauses_detected {
            actions.push(
                "Ask the insurer to clarify clauses that both cover and exclude the same item"
                    .to_string(),
            );
        }
        if actions.is_empty() {
            actions.push("Keep a copy of the policy and review it at renewal".to_string());
        }

        let coverage_type = sections
            .title
            .map(str::to_string)
            .unwrap_or_else(|| request.policy_type.label().to_string());

        AnalysisResult {
            coverage: Some(Coverage {
                coverage_type: Some(coverage_type),
                coverage_amount: Some(Amount::Text(
                    amount
                        .map(format_dollars)
                        .unwrap_or_else(|| "Not specified".to_string()),
                )),
                coverage_breakdown: Some(json!({
                    "covered": covered,
                    "policyType": request.policy_type.label(),
                    "jurisdiction": request.jurisdiction.label(),
                })),
            }),
            risk_level: Some(risk),
            deductibles: Some(deductibles),
            exclusions: Some(exclusions),
            flags: Some(flags),
            required_actions: Some(actions),
        }
    }
}

#[async_trait]
impl AnalysisBackend for DemoBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::synthesize(request))
    }

    fn is_demo(&self) -> bool {
        true
    }

    fn host(&self) -> &str {
        "demo://local"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Coverage,
    Deductible,
    Exclusion,
    Other,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        let h = heading.to_lowercase();
        if h.contains("exclu") {
            Self::Exclusion
        } else if h.contains("deductible") {
            Self::Deductible
        } else if h.contains("cover") || h.contains("benefit") {
            Self::Coverage
        } else {
            Self::Other
        }
    }
}

/// Policy text split into a title and per-section bullets
#[derive(Debug, Default)]
struct PolicySections<'a> {
    title: Option<&'a str>,
    bullets: Vec<(Section, &'a str)>,
    /// Every non-empty line, bullets included, in order
    lines: Vec<&'a str>,
}

impl<'a> PolicySections<'a> {
    fn parse(text: &'a str) -> Self {
        let mut sections = PolicySections::default();
        let mut current = Section::Other;

        for (index, line) in text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
        {
            sections.lines.push(line);

            if let Some(bullet) = strip_bullet(line) {
                if !bullet.is_empty() {
                    sections.bullets.push((current, bullet));
                }
            } else if line.ends_with(':') {
                current = Section::from_heading(line);
            } else if index == 0 && line.chars().count() <= MAX_TITLE_LEN {
                sections.title = Some(line);
            }
        }

        sections
    }

    fn in_section(&self, section: Section) -> impl Iterator<Item = &'a str> + '_ {
        self.bullets
            .iter()
            .filter(move |(s, _)| *s == section)
            .map(|(_, b)| *b)
    }

    fn exclusions(&self) -> Vec<String> {
        let mut found: Vec<String> = self
            .in_section(Section::Exclusion)
            .map(str::to_string)
            .collect();

        for (section, bullet) in &self.bullets {
            if *section == Section::Exclusion {
                continue;
            }
            let lower = bullet.to_lowercase();
            if (lower.contains("excluded") || lower.contains("not covered"))
                && !found.iter().any(|f| f == bullet)
            {
                found.push(bullet.to_string());
            }
        }
        found
    }

    fn covered(&self, exclusions: &[String]) -> Vec<String> {
        self.in_section(Section::Coverage)
            .filter(|b| !exclusions.iter().any(|e| e == b))
            .map(str::to_string)
            .collect()
    }

    fn deductibles(&self) -> Vec<Deductible> {
        let listed: Vec<&str> = self.in_section(Section::Deductible).collect();
        let source: Vec<&str> = if listed.is_empty() {
            self.lines
                .iter()
                .map(|l| strip_bullet(*l).unwrap_or(*l))
                .filter(|l| l.to_lowercase().contains("deductible") && l.contains('$'))
                .collect()
        } else {
            listed
        };

        source
            .into_iter()
            .map(|line| match line.split_once(':') {
                Some((label, amount)) if !label.trim().is_empty() && !amount.trim().is_empty() => {
                    Deductible::Itemized {
                        kind: label.trim().to_string(),
                        amount: Some(Amount::Text(amount.trim().to_string())),
                    }
                }
                _ => Deductible::Text(line.to_string()),
            })
            .collect()
    }
}

fn strip_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('*'))
        .or_else(|| line.strip_prefix('•'))
        .map(str::trim)
}

fn dollar_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\s?(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?").expect("valid regex")
    })
}

/// Largest whole-dollar figure mentioned in the text
fn largest_dollar_amount(text: &str) -> Option<u64> {
    dollar_regex()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .max()
}

fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${}", out)
}

fn significant_words(line: &str) -> Vec<String> {
    line.to_lowercase()
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.len() >= 5 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Whether something excluded is also listed as covered
fn has_conflict(covered: &[String], exclusions: &[String]) -> bool {
    let covered_words: Vec<String> = covered.iter().flat_map(|c| significant_words(c)).collect();
    exclusions
        .iter()
        .flat_map(|e| significant_words(e))
        .any(|word| covered_words.contains(&word))
}

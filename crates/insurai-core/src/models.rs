//! Data models for InsurAI
//!
//! Request and response types for the analysis API. Field names follow the
//! API's camelCase wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Sample health policy used by `insurai sample` and `analyze --sample`
pub const SAMPLE_POLICY: &str = "Comprehensive Health Insurance Policy

Coverage Details:
- Medical expenses up to $100,000 annually
- Prescription drug coverage included
- Dental and vision excluded
- Emergency room visits covered
- Preventive care covered at 100%

Deductible:
- Annual deductible: $1,000
- Per-incident deductible: $50

Exclusions:
- Pre-existing conditions (first 6 months)
- Cosmetic procedures
- Experimental treatments

Terms:
- 30-day waiting period for non-emergency care
- Network providers required for full coverage
- Out-of-network coverage at 60%";

/// Language tag sent with every request
pub const REQUEST_LANGUAGE: &str = "en";

/// Kind of insurance policy being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    #[default]
    Health,
    Auto,
    Life,
    Home,
    Travel,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Auto => "auto",
            Self::Life => "life",
            Self::Home => "home",
            Self::Travel => "travel",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Health => "Health Insurance",
            Self::Auto => "Auto Insurance",
            Self::Life => "Life Insurance",
            Self::Home => "Home Insurance",
            Self::Travel => "Travel Insurance",
        }
    }

    pub fn all() -> &'static [PolicyType] {
        &[
            Self::Health,
            Self::Auto,
            Self::Life,
            Self::Home,
            Self::Travel,
        ]
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown policy type '{}'. Expected one of: health, auto, life, home, travel",
                    s
                )
            })
    }
}

/// Legal jurisdiction the policy is written under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    #[default]
    US,
    CA,
    UK,
    EU,
    AU,
}

impl Jurisdiction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::US => "US",
            Self::CA => "CA",
            Self::UK => "UK",
            Self::EU => "EU",
            Self::AU => "AU",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::US => "United States",
            Self::CA => "Canada",
            Self::UK => "United Kingdom",
            Self::EU => "European Union",
            Self::AU => "Australia",
        }
    }

    pub fn all() -> &'static [Jurisdiction] {
        &[Self::US, Self::CA, Self::UK, Self::EU, Self::AU]
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|j| j.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "Unknown jurisdiction '{}'. Expected one of: US, CA, UK, EU, AU",
                    s
                )
            })
    }
}

/// Body of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub policy_text: String,
    pub policy_type: PolicyType,
    pub jurisdiction: Jurisdiction,
    pub language: String,
}

impl AnalysisRequest {
    pub fn new(policy_text: &str, policy_type: PolicyType, jurisdiction: Jurisdiction) -> Self {
        Self {
            policy_text: policy_text.to_string(),
            policy_type,
            jurisdiction,
            language: REQUEST_LANGUAGE.to_string(),
        }
    }

    /// Whether there is anything to analyze once surrounding whitespace is ignored
    pub fn has_text(&self) -> bool {
        !self.policy_text.trim().is_empty()
    }
}

/// Overall risk assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🔴",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown risk level '{}'", other)),
        }
    }
}

/// Unknown or malformed risk levels are treated as absent
fn deserialize_risk_level<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// A money amount as the API sends it: either preformatted text or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Text(s) => write!(f, "{}", s),
            Amount::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Amount::Number(n) => write!(f, "{:.2}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_amount: Option<Amount>,
    /// Free-form breakdown; its shape is up to the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_breakdown: Option<serde_json::Value>,
}

/// A deductible entry: itemized, a plain description, or anything else the
/// API sent, kept as-is so one odd entry does not reject the whole result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deductible {
    Itemized {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<Amount>,
    },
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for Deductible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deductible::Itemized {
                kind,
                amount: Some(amount),
            } => write!(f, "{}: {}", kind, amount),
            Deductible::Itemized { kind, amount: None } => write!(f, "{}: Not specified", kind),
            Deductible::Text(s) => write!(f, "{}", s),
            Deductible::Other(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFlags {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub needs_legal_review: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub inconsistent_clauses_detected: bool,
}

/// A `null` flag counts as not raised
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl PolicyFlags {
    pub fn any(&self) -> bool {
        self.needs_legal_review || self.inconsistent_clauses_detected
    }
}

/// Structured analysis returned by the API (or synthesized in demo mode)
///
/// Every field is optional; a missing field is simply not shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    #[serde(
        default,
        deserialize_with = "deserialize_risk_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductibles: Option<Vec<Deductible>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<PolicyFlags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
}

/// Contact details the API includes with credential errors
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ApiContact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

/// Structured error body returned with non-2xx responses
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub contact: Option<ApiContact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_type_parse() {
        assert_eq!("health".parse::<PolicyType>().unwrap(), PolicyType::Health);
        assert_eq!("TRAVEL".parse::<PolicyType>().unwrap(), PolicyType::Travel);
        assert!("boat".parse::<PolicyType>().is_err());
    }

    #[test]
    fn test_jurisdiction_parse() {
        assert_eq!("uk".parse::<Jurisdiction>().unwrap(), Jurisdiction::UK);
        assert_eq!(Jurisdiction::EU.label(), "European Union");
        assert!("FR".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let request = AnalysisRequest::new("Some policy", PolicyType::Auto, Jurisdiction::CA);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["policyText"], "Some policy");
        assert_eq!(json["policyType"], "auto");
        assert_eq!(json["jurisdiction"], "CA");
        assert_eq!(json["language"], "en");
    }

    #[test]
    fn test_request_has_text() {
        let blank = AnalysisRequest::new("  \n\t ", PolicyType::Health, Jurisdiction::US);
        assert!(!blank.has_text());
        let filled = AnalysisRequest::new(" x ", PolicyType::Health, Jurisdiction::US);
        assert!(filled.has_text());
    }

    #[test]
    fn test_result_mixed_deductibles() {
        let json = r#"{
            "coverage": {"coverageType": "Comprehensive", "coverageAmount": 250000},
            "riskLevel": "HIGH",
            "deductibles": [{"type": "Annual", "amount": "$500"}, "Waived for preventive care"],
            "exclusions": ["Flood"],
            "flags": {"needsLegalReview": true},
            "requiredActions": ["Call the insurer"],
            "modelVersion": "ignored"
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        let coverage = result.coverage.unwrap();
        assert_eq!(coverage.coverage_type.as_deref(), Some("Comprehensive"));
        assert_eq!(coverage.coverage_amount.unwrap().to_string(), "250000");
        assert_eq!(result.risk_level, Some(RiskLevel::High));

        let deductibles = result.deductibles.unwrap();
        assert_eq!(deductibles[0].to_string(), "Annual: $500");
        assert_eq!(deductibles[1].to_string(), "Waived for preventive care");

        let flags = result.flags.unwrap();
        assert!(flags.needs_legal_review);
        assert!(!flags.inconsistent_clauses_detected);
    }

    #[test]
    fn test_result_all_fields_optional() {
        let result: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result, AnalysisResult::default());
    }

    #[test]
    fn test_unknown_risk_level_is_absent() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"riskLevel": "moderate", "exclusions": ["War"]}"#).unwrap();
        assert!(result.risk_level.is_none());
        assert_eq!(result.exclusions.unwrap(), vec!["War".to_string()]);
    }

    #[test]
    fn test_null_flag_is_not_raised() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"flags": {"needsLegalReview": null, "inconsistentClausesDetected": true},
                "riskLevel": "low"}"#,
        )
        .unwrap();
        let flags = result.flags.unwrap();
        assert!(!flags.needs_legal_review);
        assert!(flags.inconsistent_clauses_detected);
        assert_eq!(result.risk_level, Some(RiskLevel::Low));
    }

    #[test]
    fn test_off_shape_deductibles_keep_the_result() {
        let json = r#"{
            "deductibles": [
                {"type": "Annual"},
                {"type": "Per visit", "amount": null},
                {"amount": "$75"},
                250
            ],
            "exclusions": ["Flood"]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        let deductibles = result.deductibles.unwrap();
        assert_eq!(
            deductibles[0],
            Deductible::Itemized {
                kind: "Annual".to_string(),
                amount: None,
            }
        );
        assert_eq!(deductibles[0].to_string(), "Annual: Not specified");
        assert_eq!(deductibles[1].to_string(), "Per visit: Not specified");
        assert!(matches!(deductibles[2], Deductible::Other(_)));
        assert_eq!(deductibles[3].to_string(), "250");
        assert_eq!(result.exclusions.unwrap(), vec!["Flood".to_string()]);
    }

    #[test]
    fn test_api_error_body() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": "Invalid demo password", "message": "bad pw",
                "contact": {"email": "a@b.c", "linkedin": "https://linkedin.com/in/x"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.as_deref(), Some("Invalid demo password"));
        assert_eq!(body.contact.unwrap().email.as_deref(), Some("a@b.c"));
    }
}

//! Core types for the Jinko workflow
//!
//! Defines the values that flow between the controller and the remote API:
//! - Draft scripts and generation requests
//! - Audit results, violations and the injected audit context
//! - Identity assets, upload slots and render jobs
//! - Vault entries, narrations and service health

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

/// Identifier correlating the notices and log lines of one user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Ulid);

impl OperationId {
    /// Generate new operation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Copywriting tone requested from the generation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    /// High-end listing voice
    #[default]
    Luxury,
    /// Clean, contemporary voice
    Modern,
    /// Warm, inviting voice
    Cozy,
    /// Neutral brokerage voice
    Professional,
}

impl Tone {
    /// Wire name of the tone
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Luxury => "Luxury",
            Tone::Modern => "Modern",
            Tone::Cozy => "Cozy",
            Tone::Professional => "Professional",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "luxury" => Ok(Tone::Luxury),
            "modern" => Ok(Tone::Modern),
            "cozy" => Ok(Tone::Cozy),
            "professional" => Ok(Tone::Professional),
            other => Err(format!("unknown tone: {other}")),
        }
    }
}

/// Input of the Origin view, forwarded to the generation engine as-is
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Property address
    pub address: String,
    /// Bed/bath/square footage summary
    pub specs: String,
    /// Key features (pool, view, upgrades)
    pub features: String,
    /// Requested tone
    pub tone: Tone,
}

impl GenerationRequest {
    /// Create new request with the default tone
    #[inline]
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        specs: impl Into<String>,
        features: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            specs: specs.into(),
            features: features.into(),
            tone: Tone::default(),
        }
    }

    /// With tone
    #[inline]
    #[must_use]
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// The single working script of a session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftScript {
    /// Script text
    pub text: String,
}

impl DraftScript {
    /// Check if the draft holds no text
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Verdict of a compliance audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// Script is certified
    Pass,
    /// Script has violations; any verdict other than `PASS` reads as this
    #[serde(other)]
    Fail,
}

/// Read `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A flagged phrase in an audited script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Offending text
    #[serde(default, deserialize_with = "null_as_default")]
    pub phrase: String,
    /// Why the phrase is a risk
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    /// Legal category, when the audit engine names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl Violation {
    /// Create new violation
    #[inline]
    #[must_use]
    pub fn new(phrase: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            reason: reason.into(),
            citation: None,
        }
    }
}

/// Response of the compliance audit engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Verdict
    pub status: AuditStatus,
    /// Corrected script (the audited script itself on PASS)
    #[serde(default, deserialize_with = "null_as_default")]
    pub final_text: String,
    /// Flagged phrases, in the order the engine reported them
    #[serde(default, deserialize_with = "null_as_default")]
    pub violations: Vec<Violation>,
}

impl AuditResult {
    /// Passing result
    #[inline]
    #[must_use]
    pub fn pass(final_text: impl Into<String>) -> Self {
        Self {
            status: AuditStatus::Pass,
            final_text: final_text.into(),
            violations: Vec::new(),
        }
    }

    /// Failing result with a suggested rewrite
    #[inline]
    #[must_use]
    pub fn fail(final_text: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            status: AuditStatus::Fail,
            final_text: final_text.into(),
            violations,
        }
    }

    /// Check if the audit passed
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.status == AuditStatus::Pass
    }

    /// Suggested rewrite of a failed audit, if the engine produced one
    #[must_use]
    pub fn remediation(&self) -> Option<&str> {
        match self.status {
            AuditStatus::Fail if !self.final_text.is_empty() => Some(&self.final_text),
            _ => None,
        }
    }
}

/// Jurisdiction and brokerage context sent with every audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditContext {
    /// Two-letter state code
    pub state: String,
    /// Brokerage name used for branding checks
    pub brokerage: String,
    /// Rule set name
    pub rules: String,
    /// Whether the listing agent owns the property
    pub is_owner: bool,
}

impl Default for AuditContext {
    fn default() -> Self {
        Self {
            state: "AZ".to_string(),
            brokerage: "Jinko Realty".to_string(),
            rules: "Standard FHA".to_string(),
            is_owner: false,
        }
    }
}

/// Storage key of an uploaded object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(pub String);

impl FileKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write-once destination granted by the storage service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSlot {
    /// Signed destination URL
    pub upload_url: String,
    /// Key the object will be stored under
    pub file_key: FileKey,
}

/// Image file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFile {
    /// Original file name
    pub filename: String,
    /// MIME type
    pub content_type: String,
    /// Raw payload
    pub bytes: Vec<u8>,
}

impl IdentityFile {
    /// Create new file
    #[inline]
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Identity image recorded for the session after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAsset {
    /// Storage key
    pub file_key: FileKey,
    /// MIME type of the uploaded image
    pub content_type: String,
}

/// Opaque render job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepted render submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Job identifier
    pub job_id: JobId,
}

/// Response of the render engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResponse {
    /// Job accepted
    Started(JobId),
    /// Job refused with the engine's message
    Rejected(String),
}

/// Kind of a stored asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetKind {
    /// Uploaded identity image
    Identity,
    /// Rendered avatar video
    Video,
    /// Anything the storage service reports that this client does not know
    #[serde(other)]
    Other,
}

/// Stored asset as listed by the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    /// Storage key
    pub key: String,
    /// Asset kind
    #[serde(rename = "type")]
    pub kind: AssetKind,
    /// Access URL
    pub url: String,
    /// Creation date as reported by storage
    #[serde(rename = "date")]
    pub created_at: String,
}

impl VaultEntry {
    /// Last path segment of the key
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Synthesized narration of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// Voice used
    pub voice_id: String,
    /// Encoded audio (mp3)
    pub audio: Vec<u8>,
}

/// Health report of the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    /// Human-readable status line
    pub status: String,
    /// Service version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_defaults_to_luxury() {
        assert_eq!(Tone::default(), Tone::Luxury);
        assert_eq!(GenerationRequest::default().tone, Tone::Luxury);
    }

    #[test]
    fn tone_parses_case_insensitively() {
        assert_eq!("MODERN".parse::<Tone>().unwrap(), Tone::Modern);
        assert_eq!(" cozy ".parse::<Tone>().unwrap(), Tone::Cozy);
        assert!("gothic".parse::<Tone>().is_err());
    }

    #[test]
    fn remediation_requires_failed_audit_with_text() {
        let failed = AuditResult::fail("...revised...", vec![]);
        assert_eq!(failed.remediation(), Some("...revised..."));

        let empty = AuditResult::fail("", vec![]);
        assert_eq!(empty.remediation(), None);

        let passed = AuditResult::pass("fine");
        assert_eq!(passed.remediation(), None);
    }

    #[test]
    fn audit_result_tolerates_missing_fields() {
        let result: AuditResult = serde_json::from_str(r#"{"status":"PASS"}"#).unwrap();
        assert!(result.is_pass());
        assert!(result.final_text.is_empty());
        assert!(result.violations.is_empty());
    }

    #[test]
    fn violation_without_reason_still_decodes() {
        let result: AuditResult = serde_json::from_str(
            r#"{"status":"FAIL","violations":[{"phrase":"no kids","citation":"Familial Status"}],"final_text":"rev"}"#,
        )
        .unwrap();
        assert_eq!(result.violations[0].phrase, "no kids");
        assert!(result.violations[0].reason.is_empty());
        assert_eq!(result.remediation(), Some("rev"));
    }

    #[test]
    fn null_violations_read_as_empty() {
        let result: AuditResult =
            serde_json::from_str(r#"{"status":"FAIL","violations":null,"final_text":"rev"}"#)
                .unwrap();
        assert!(result.violations.is_empty());
        assert_eq!(result.remediation(), Some("rev"));

        let result: AuditResult =
            serde_json::from_str(r#"{"status":"PASS","violations":null,"final_text":null}"#)
                .unwrap();
        assert!(result.is_pass());
        assert!(result.final_text.is_empty());
    }

    #[test]
    fn unknown_verdict_reads_as_fail() {
        for status in ["REVIEW", "pass", "Pass", ""] {
            let json = format!(r#"{{"status":"{status}","final_text":"rev"}}"#);
            let result: AuditResult = serde_json::from_str(&json).unwrap();
            assert_eq!(result.status, AuditStatus::Fail, "status {status:?}");
            assert!(!result.is_pass());
            assert_eq!(result.remediation(), Some("rev"));
        }
    }

    #[test]
    fn violation_citation_is_optional() {
        let v: Violation =
            serde_json::from_str(r#"{"phrase":"no kids allowed","reason":"familial status"}"#)
                .unwrap();
        assert_eq!(v.citation, None);

        let v: Violation = serde_json::from_str(
            r#"{"phrase":"adults only","citation":"FHA 3604(c)","reason":"familial status"}"#,
        )
        .unwrap();
        assert_eq!(v.citation.as_deref(), Some("FHA 3604(c)"));
    }

    #[test]
    fn vault_entry_uses_storage_field_names() {
        let entry: VaultEntry = serde_json::from_str(
            r#"{"key":"uploads/17_me.png","type":"IDENTITY","url":"https://s3/x","date":"2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, AssetKind::Identity);
        assert_eq!(entry.created_at, "2024-05-01");
        assert_eq!(entry.display_name(), "17_me.png");
    }

    #[test]
    fn unknown_asset_kind_is_tolerated() {
        let entry: VaultEntry = serde_json::from_str(
            r#"{"key":"audio.mp3","type":"AUDIO","url":"u","date":"d"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, AssetKind::Other);
        assert_eq!(entry.display_name(), "audio.mp3");
    }

    #[test]
    fn audit_context_defaults() {
        let ctx = AuditContext::default();
        assert_eq!(ctx.state, "AZ");
        assert_eq!(ctx.brokerage, "Jinko Realty");
        assert_eq!(ctx.rules, "Standard FHA");
        assert!(!ctx.is_owner);
    }
}

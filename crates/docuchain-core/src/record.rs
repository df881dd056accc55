//! DocumentRecord: the fingerprint and metadata of one issued document.
//!
//! Records are immutable once sealed into a block. They are built through
//! [`DocumentRecordBuilder`], which trims and bounds every text field.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Fingerprint;

/// Maximum length in bytes of any metadata field.
pub const MAX_FIELD_LEN: usize = 256;

/// The fingerprint and metadata of one issued document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// SHA-256 of the document bytes.
    pub fingerprint: Fingerprint,

    /// Organization that issued the document.
    pub issuer_org: String,

    /// Document category (diploma, certificate, ...).
    pub doc_type: String,

    /// Human-readable title.
    pub doc_title: String,

    /// Name of the person the document was issued to.
    pub recipient_name: String,

    /// Recipient identifier (ID number or email). Used for lookups.
    pub recipient_id: String,

    /// Original file name, if known.
    #[serde(default)]
    pub file_name: Option<String>,

    /// Issuance time (Unix milliseconds).
    pub issued_at: i64,
}

impl DocumentRecord {
    /// Check the field invariants: non-empty, trimmed, bounded.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_required("issuer_org", &self.issuer_org)?;
        check_required("doc_type", &self.doc_type)?;
        check_required("doc_title", &self.doc_title)?;
        check_required("recipient_name", &self.recipient_name)?;
        check_required("recipient_id", &self.recipient_id)?;
        if let Some(name) = &self.file_name {
            check_len("file_name", name)?;
        }
        Ok(())
    }
}

/// Builder for [`DocumentRecord`].
#[derive(Debug, Clone)]
pub struct DocumentRecordBuilder {
    fingerprint: Fingerprint,
    issuer_org: String,
    doc_type: String,
    doc_title: String,
    recipient_name: String,
    recipient_id: String,
    file_name: Option<String>,
    issued_at: i64,
}

impl DocumentRecordBuilder {
    /// Start a record for the given fingerprint.
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            issuer_org: String::new(),
            doc_type: String::new(),
            doc_title: String::new(),
            recipient_name: String::new(),
            recipient_id: String::new(),
            file_name: None,
            issued_at: 0,
        }
    }

    pub fn issuer_org(mut self, value: impl Into<String>) -> Self {
        self.issuer_org = value.into();
        self
    }

    pub fn doc_type(mut self, value: impl Into<String>) -> Self {
        self.doc_type = value.into();
        self
    }

    pub fn doc_title(mut self, value: impl Into<String>) -> Self {
        self.doc_title = value.into();
        self
    }

    pub fn recipient_name(mut self, value: impl Into<String>) -> Self {
        self.recipient_name = value.into();
        self
    }

    pub fn recipient_id(mut self, value: impl Into<String>) -> Self {
        self.recipient_id = value.into();
        self
    }

    /// Set the original file name. Blank names are dropped.
    pub fn file_name(mut self, value: Option<String>) -> Self {
        self.file_name = value;
        self
    }

    /// Set the issuance time (Unix milliseconds).
    pub fn issued_at(mut self, millis: i64) -> Self {
        self.issued_at = millis;
        self
    }

    /// Trim all fields and validate the record.
    pub fn build(self) -> Result<DocumentRecord, CoreError> {
        let file_name = self
            .file_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let record = DocumentRecord {
            fingerprint: self.fingerprint,
            issuer_org: self.issuer_org.trim().to_string(),
            doc_type: self.doc_type.trim().to_string(),
            doc_title: self.doc_title.trim().to_string(),
            recipient_name: self.recipient_name.trim().to_string(),
            recipient_id: self.recipient_id.trim().to_string(),
            file_name,
            issued_at: self.issued_at,
        };
        record.validate()?;
        Ok(record)
    }
}

fn check_required(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::EmptyField(field));
    }
    check_len(field, value)
}

fn check_len(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.len() > MAX_FIELD_LEN {
        return Err(CoreError::FieldTooLong {
            field,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DocumentRecordBuilder {
        DocumentRecordBuilder::new(Fingerprint::of(b"diploma.pdf bytes"))
            .issuer_org("  State University ")
            .doc_type("Diploma")
            .doc_title("BSc Computer Science")
            .recipient_name("Ada Lovelace")
            .recipient_id("ada@example.org")
            .issued_at(1_736_870_400_000)
    }

    #[test]
    fn test_build_trims_fields() {
        let record = builder().build().unwrap();
        assert_eq!(record.issuer_org, "State University");
        assert_eq!(record.file_name, None);
        assert_eq!(record.issued_at, 1_736_870_400_000);
    }

    #[test]
    fn test_blank_field_rejected() {
        let result = builder().recipient_id("   ").build();
        assert_eq!(result, Err(CoreError::EmptyField("recipient_id")));
    }

    #[test]
    fn test_oversized_field_rejected() {
        let result = builder().doc_title("x".repeat(MAX_FIELD_LEN + 1)).build();
        assert!(matches!(
            result,
            Err(CoreError::FieldTooLong { field: "doc_title", .. })
        ));

        let exact = builder().doc_title("x".repeat(MAX_FIELD_LEN)).build();
        assert!(exact.is_ok());
    }

    #[test]
    fn test_blank_file_name_dropped() {
        let record = builder().file_name(Some("  ".into())).build().unwrap();
        assert_eq!(record.file_name, None);

        let record = builder().file_name(Some(" scan.png ".into())).build().unwrap();
        assert_eq!(record.file_name.as_deref(), Some("scan.png"));
    }

    #[test]
    fn test_json_field_order() {
        let record = builder().build().unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let fp = json.find("fingerprint").unwrap();
        let issuer = json.find("issuer_org").unwrap();
        let issued = json.find("issued_at").unwrap();
        assert!(fp < issuer && issuer < issued);
    }
}

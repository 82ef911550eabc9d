use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

pub const MAX_TEMPLATE_BYTES: usize = 5 * 1024 * 1024;
pub const INVALID_TEMPLATE: &str = "Invalid Contract Type File Template";
pub const DUPLICATE_CONTRACT_TYPE: &str = "Duplicate contract type value violates";
pub const CONTRACT_TYPE_NOT_FOUND: &str = "Contract type is not found";

const SALARY_PREFIX_LEN: usize = 3;
const SALARY_SUFFIX_LEN: usize = 5;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Salary as stored: three random characters, the base64 value, five random characters.
pub fn obfuscate_salary(total_salary: &str) -> String {
    format!(
        "{}{}{}",
        random_alphanumeric(SALARY_PREFIX_LEN),
        STANDARD.encode(total_salary.as_bytes()),
        random_alphanumeric(SALARY_SUFFIX_LEN)
    )
}

/// Inverse of [`obfuscate_salary`]; `None` when the stored value is malformed.
pub fn reveal_salary(stored: &str) -> Option<String> {
    if stored.len() < SALARY_PREFIX_LEN + SALARY_SUFFIX_LEN || !stored.is_ascii() {
        return None;
    }
    let encoded = &stored[SALARY_PREFIX_LEN..stored.len() - SALARY_SUFFIX_LEN];
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Pdf,
    Doc,
    Docx,
}

impl TemplateKind {
    pub fn extension(self) -> &'static str {
        match self {
            TemplateKind::Pdf => "pdf",
            TemplateKind::Doc => "doc",
            TemplateKind::Docx => "docx",
        }
    }
}

/// Recognizes a base64 template by its leading bytes. Word 2007+ files are zip
/// containers and legacy Word files are OLE compound documents.
pub fn sniff_template(base64_content: &str) -> Option<TemplateKind> {
    let bytes = STANDARD.decode(base64_content.trim()).ok()?;
    if bytes.is_empty() || bytes.len() > MAX_TEMPLATE_BYTES {
        return None;
    }
    if bytes.starts_with(PDF_MAGIC) {
        Some(TemplateKind::Pdf)
    } else if bytes.starts_with(ZIP_MAGIC) {
        Some(TemplateKind::Docx)
    } else if bytes.starts_with(OLE_MAGIC) {
        Some(TemplateKind::Doc)
    } else {
        None
    }
}

/// `<name with spaces as underscores>_<unix seconds>.<ext>`
pub fn template_file_name(type_name: &str, unix_seconds: i64, kind: TemplateKind) -> String {
    format!(
        "{}_{}.{}",
        type_name.trim().replace(' ', "_"),
        unix_seconds,
        kind.extension()
    )
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ContractType {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub file_template_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contract row joined with its type and holder, salary still obfuscated.
#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub avatar: Option<String>,
    pub branch: Option<i32>,
    pub contract_type_id: i32,
    pub contract_type_name: String,
    pub insurance_salary: f64,
    pub total_salary: String,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: Option<NaiveDate>,
    pub currency_unit: i32,
    pub file_name: String,
    pub labor_contract_number: Option<String>,
    pub contract_creation_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContractItem {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    /// Base64 avatar image, empty when the user has none.
    pub avatar: String,
    pub branch: Option<i32>,
    pub contract_type_id: i32,
    pub contract_type_name: String,
    pub insurance_salary: f64,
    pub total_salary: String,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: Option<NaiveDate>,
    pub currency_unit: i32,
    pub file_name: String,
    pub labor_contract_number: Option<String>,
    pub contract_creation_date: Option<NaiveDate>,
}

impl ContractItem {
    pub fn from_row(row: ContractRow, avatar: String) -> Self {
        Self {
            total_salary: reveal_salary(&row.total_salary).unwrap_or_default(),
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            avatar,
            branch: row.branch,
            contract_type_id: row.contract_type_id,
            contract_type_name: row.contract_type_name,
            insurance_salary: row.insurance_salary,
            contract_start_date: row.contract_start_date,
            contract_end_date: row.contract_end_date,
            currency_unit: row.currency_unit,
            file_name: row.file_name,
            labor_contract_number: row.labor_contract_number,
            contract_creation_date: row.contract_creation_date,
        }
    }
}

pub struct NewContract {
    pub user_id: i32,
    pub contract_type_id: i32,
    pub insurance_salary: f64,
    pub total_salary: String,
    pub contract_start_date: NaiveDate,
    pub contract_end_date: Option<NaiveDate>,
    pub currency_unit: i32,
    pub file_name: String,
    pub labor_contract_number: Option<String>,
    pub contract_creation_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_is_hidden_and_recoverable() {
        let stored = obfuscate_salary("15000000");
        assert_eq!(stored.len(), 3 + STANDARD.encode("15000000").len() + 5);
        assert!(!stored.contains("15000000"));
        assert_eq!(reveal_salary(&stored).as_deref(), Some("15000000"));
    }

    #[test]
    fn test_reveal_rejects_short_or_garbled_values() {
        assert_eq!(reveal_salary("abc"), None);
        assert_eq!(reveal_salary("abc!!!!12345"), None);
    }

    #[test]
    fn test_sniff_template_by_magic_bytes() {
        let pdf = STANDARD.encode(b"%PDF-1.7\n...");
        let docx = STANDARD.encode(b"PK\x03\x04word/document.xml");
        let mut ole = OLE_MAGIC.to_vec();
        ole.extend_from_slice(b"legacy");
        let doc = STANDARD.encode(ole);

        assert_eq!(sniff_template(&pdf), Some(TemplateKind::Pdf));
        assert_eq!(sniff_template(&docx), Some(TemplateKind::Docx));
        assert_eq!(sniff_template(&doc), Some(TemplateKind::Doc));
    }

    #[test]
    fn test_sniff_template_rejects_other_content() {
        assert_eq!(sniff_template(&STANDARD.encode(b"\x89PNG\r\n")), None);
        assert_eq!(sniff_template("not base64 at all"), None);
        assert_eq!(sniff_template(""), None);

        let mut oversized = PDF_MAGIC.to_vec();
        oversized.resize(MAX_TEMPLATE_BYTES + 1, b'0');
        assert_eq!(sniff_template(&STANDARD.encode(oversized)), None);
    }

    #[test]
    fn test_template_file_name() {
        assert_eq!(
            template_file_name("Full time contract", 1700000000, TemplateKind::Docx),
            "Full_time_contract_1700000000.docx"
        );
    }
}

mod local;

pub use local::LocalBlobStorage;

use crate::error::Result;
use axum::async_trait;

/// Named files grouped in folders. Content crosses this boundary as base64,
/// which is how clients send and receive documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(&self, folder: &str, name: &str, base64_content: &str) -> Result<()>;
    async fn download(&self, folder: &str, name: &str) -> Result<String>;
    async fn delete(&self, folder: &str, name: &str) -> Result<()>;
    fn public_url(&self, folder: &str, name: &str) -> String;
}

/// `<unix millis>_<file name with spaces as underscores>`, unique per upload.
pub fn timestamped_name(file_name: &str, unix_millis: i64) -> String {
    format!("{}_{}", unix_millis, file_name.trim().replace(' ', "_"))
}

pub mod folders {
    pub const AVATARS: &str = "avatars";
    pub const CONTRACT_TYPES: &str = "contract_types";

    pub fn contracts(organization_id: i32) -> String {
        format!("contracts/{}", organization_id)
    }

    /// Temporary renders of contracts, removed by the client when done.
    pub fn previews(organization_id: i32) -> String {
        format!("previews/{}", organization_id)
    }

    pub fn cvs(organization_id: i32, job_name: &str) -> String {
        format!("cvs/{}/{}", organization_id, job_name.trim().replace(' ', "_"))
    }

    pub fn detail_jobs(organization_id: i32) -> String {
        format!("detail_jobs/{}", organization_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{folders, timestamped_name};

    #[test]
    fn test_timestamped_name() {
        assert_eq!(timestamped_name("an contract.pdf", 1700000000123), "1700000000123_an_contract.pdf");
    }

    #[test]
    fn test_cv_folder_replaces_spaces() {
        assert_eq!(folders::cvs(4, "Senior Rust Engineer"), "cvs/4/Senior_Rust_Engineer");
        assert_eq!(folders::contracts(4), "contracts/4");
    }
}

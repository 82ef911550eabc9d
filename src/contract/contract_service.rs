use super::{
    contract_models::{
        obfuscate_salary, sniff_template, template_file_name, ContractItem, ContractRow,
        ContractType, NewContract, CONTRACT_TYPE_NOT_FOUND, DUPLICATE_CONTRACT_TYPE, INVALID_TEMPLATE,
    },
    contract_repository::{ContractFilter, ContractRepository},
};
use crate::{
    error::{map_duplicate, AppError, Result},
    storage::{folders, timestamped_name, BlobStorage},
    user::UserRepository,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

pub struct CreateContract<'a> {
    pub contract: NewContract,
    pub contract_content: &'a str,
}

#[derive(Clone)]
pub struct ContractService {
    db: PgPool,
    repo: ContractRepository,
    users: UserRepository,
    storage: Arc<dyn BlobStorage>,
}

impl ContractService {
    pub fn new(db: PgPool, repo: ContractRepository, users: UserRepository, storage: Arc<dyn BlobStorage>) -> Self {
        Self {
            db,
            repo,
            users,
            storage,
        }
    }

    pub fn repository(&self) -> &ContractRepository {
        &self.repo
    }

    async fn with_avatars(&self, rows: Vec<ContractRow>) -> Vec<ContractItem> {
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let avatar = match row.avatar.as_deref().filter(|a| !a.is_empty()) {
                Some(name) => self
                    .storage
                    .download(folders::AVATARS, name)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(user_id = row.user_id, "Avatar unavailable: {}", e);
                        String::new()
                    }),
                None => String::new(),
            };
            items.push(ContractItem::from_row(row, avatar));
        }
        items
    }

    pub async fn current_list(
        &self,
        organization_id: i32,
        filter: &ContractFilter,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<ContractItem>, i64)> {
        let (rows, total) = self
            .repo
            .current_list(organization_id, filter, current_page, row_per_page)
            .await?;

        Ok((self.with_avatars(rows).await, total))
    }

    pub async fn by_user(
        &self,
        organization_id: i32,
        user_id: i32,
        current_page: i64,
        row_per_page: i64,
    ) -> Result<(Vec<ContractItem>, i64)> {
        let (rows, total) = self
            .repo
            .by_user(organization_id, user_id, current_page, row_per_page)
            .await?;

        Ok((rows.into_iter().map(|row| ContractItem::from_row(row, String::new())).collect(), total))
    }

    /// Uploads the signed document, stores the contract with its salary hidden
    /// and moves the holder's contract expiration to the new end date.
    pub async fn create_contract(&self, organization_id: i32, request: CreateContract<'_>) -> Result<i32> {
        let mut contract = request.contract;
        let folder = folders::contracts(organization_id);
        let stored_name = timestamped_name(&contract.file_name, Utc::now().timestamp_millis());
        self.storage
            .upload(&folder, &stored_name, request.contract_content)
            .await?;

        contract.file_name = stored_name;
        contract.total_salary = obfuscate_salary(&contract.total_salary);

        let inserted = async {
            let mut tx = self.db.begin().await?;
            let id = self.repo.insert_with_tx(&mut tx, organization_id, &contract).await?;
            self.users
                .update_contract_expiration_with_tx(&mut tx, contract.user_id, contract.contract_end_date)
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(id)
        }
        .await;

        if inserted.is_err() {
            if let Err(e) = self.storage.delete(&folder, &contract.file_name).await {
                warn!(file = %contract.file_name, "Orphaned contract file: {}", e);
            }
        }
        inserted
    }

    async fn upload_template(&self, name: &str, content: Option<&str>) -> Result<Option<String>> {
        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        let kind = sniff_template(content).ok_or_else(|| AppError::BadRequest(INVALID_TEMPLATE.to_string()))?;
        let file_name = template_file_name(name, Utc::now().timestamp(), kind);
        self.storage
            .upload(folders::CONTRACT_TYPES, &file_name, content)
            .await?;

        Ok(Some(file_name))
    }

    async fn discard_template(&self, file_name: &str) {
        if file_name.is_empty() {
            return;
        }
        if let Err(e) = self.storage.delete(folders::CONTRACT_TYPES, file_name).await {
            warn!(file = file_name, "Failed to delete contract template: {}", e);
        }
    }

    pub async fn create_contract_type(
        &self,
        organization_id: i32,
        name: &str,
        template: Option<&str>,
    ) -> Result<ContractType> {
        let template_name = self.upload_template(name, template).await?.unwrap_or_default();

        let created = async {
            let mut tx = self.db.begin().await?;
            let created = self
                .repo
                .insert_type_with_tx(&mut tx, organization_id, name, &template_name)
                .await?;
            tx.commit().await?;
            Ok::<_, AppError>(created)
        }
        .await
        .map_err(|e| map_duplicate(e, DUPLICATE_CONTRACT_TYPE));

        if created.is_err() {
            self.discard_template(&template_name).await;
        }
        created
    }

    /// The type with its template as base64, `None` when it has no template.
    pub async fn contract_type(&self, organization_id: i32, id: i32) -> Result<(ContractType, Option<String>)> {
        let contract_type = self
            .repo
            .find_type(organization_id, id)
            .await?
            .ok_or_else(|| AppError::BadRequest(CONTRACT_TYPE_NOT_FOUND.to_string()))?;

        if contract_type.file_template_name.is_empty() {
            return Ok((contract_type, None));
        }
        let template = self
            .storage
            .download(folders::CONTRACT_TYPES, &contract_type.file_template_name)
            .await?;

        Ok((contract_type, Some(template)))
    }

    /// Renames the type; a new template replaces the old file.
    pub async fn edit_contract_type(
        &self,
        organization_id: i32,
        id: i32,
        name: &str,
        template: Option<&str>,
    ) -> Result<ContractType> {
        let existing = self
            .repo
            .find_type(organization_id, id)
            .await?
            .ok_or_else(|| AppError::BadRequest(CONTRACT_TYPE_NOT_FOUND.to_string()))?;

        let uploaded = self.upload_template(name, template).await?;
        let template_name = uploaded.as_deref().unwrap_or(&existing.file_template_name);

        let updated = self
            .repo
            .update_type(organization_id, id, name, template_name)
            .await
            .map_err(|e| map_duplicate(e, DUPLICATE_CONTRACT_TYPE));

        match (&updated, uploaded.as_deref()) {
            (Ok(_), Some(_)) => self.discard_template(&existing.file_template_name).await,
            (Err(_), Some(new_template)) => self.discard_template(new_template).await,
            _ => {}
        }
        updated
    }

    pub async fn remove_contract_types(&self, organization_id: i32, ids: &[i32]) -> Result<usize> {
        let templates = self.repo.delete_types(organization_id, ids).await?;
        for template in &templates {
            self.discard_template(template).await;
        }

        Ok(templates.len())
    }

    pub async fn preview(&self, organization_id: i32, file_name: &str, file_content: &str) -> Result<String> {
        let folder = folders::previews(organization_id);
        self.storage.upload(&folder, file_name, file_content).await?;

        Ok(self.storage.public_url(&folder, file_name))
    }

    pub async fn delete_preview(&self, organization_id: i32, file_name: &str) -> Result<()> {
        self.storage
            .delete(&folders::previews(organization_id), file_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockBlobStorage;

    fn service(storage: MockBlobStorage) -> ContractService {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        ContractService::new(
            pool.clone(),
            ContractRepository::new(pool.clone()),
            UserRepository::new(pool),
            Arc::new(storage),
        )
    }

    #[tokio::test]
    async fn test_unrecognized_template_is_rejected_before_upload() {
        let service = service(MockBlobStorage::new());
        let png = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, b"\x89PNG\r\n\x1a\n");

        let result = service.create_contract_type(1, "Probation", Some(&png)).await;

        assert!(matches!(result, Err(AppError::BadRequest(m)) if m == INVALID_TEMPLATE));
    }

    #[tokio::test]
    async fn test_preview_uploads_to_organization_folder() {
        let mut storage = MockBlobStorage::new();
        storage
            .expect_upload()
            .withf(|folder, name, content| folder == "previews/4" && name == "draft.pdf" && content == "JVBERi0=")
            .times(1)
            .returning(|_, _, _| Ok(()));
        storage
            .expect_public_url()
            .withf(|folder, name| folder == "previews/4" && name == "draft.pdf")
            .returning(|folder, name| format!("/files/{}/{}", folder, name));

        let url = service(storage).preview(4, "draft.pdf", "JVBERi0=").await.unwrap();

        assert_eq!(url, "/files/previews/4/draft.pdf");
    }

    #[tokio::test]
    async fn test_delete_preview() {
        let mut storage = MockBlobStorage::new();
        storage
            .expect_delete()
            .withf(|folder, name| folder == "previews/4" && name == "draft.pdf")
            .times(1)
            .returning(|_, _| Ok(()));

        assert!(service(storage).delete_preview(4, "draft.pdf").await.is_ok());
    }
}

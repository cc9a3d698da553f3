//! User repository.
//!
//! Uses a dual-document pattern:
//! - Profile doc at `users/{user_id}` (includes the password hash)
//! - Email index at `user_emails/{email}` for uniqueness and login lookup

use std::collections::HashMap;

use tracing::{info, warn};

use jobgrid_models::{Role, UserId, UserProfile};

use crate::client::StoreClient;
use crate::error::{StoreError, StoreResult};
use crate::types::{Document, Filter, ToDocValue, Value};

/// Collection holding user profiles.
const USERS: &str = "users";

/// Collection holding the email uniqueness index.
const EMAIL_INDEX: &str = "user_emails";

/// A user as persisted: profile plus credential hash.
///
/// The hash lives outside [`UserProfile`] so profile reads can never
/// serialize it.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub profile: UserProfile,
    pub password_hash: String,
}

/// Repository for user documents.
#[derive(Clone)]
pub struct UserRepository {
    client: StoreClient,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }

    /// Normalized email used as the index document id.
    fn email_key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Create a user.
    ///
    /// The email index is claimed first; a conflict there means the
    /// address is taken. If the profile write then fails, the claim is
    /// released best-effort.
    pub async fn create(&self, user: &StoredUser) -> StoreResult<()> {
        let email_key = Self::email_key(&user.profile.email);

        let mut index_fields = HashMap::new();
        index_fields.insert(
            "user_id".to_string(),
            user.profile.user_id.as_str().to_doc_value(),
        );
        self.client
            .create_document(EMAIL_INDEX, &email_key, index_fields)
            .await?;

        let fields = stored_user_to_fields(user);
        match self
            .client
            .create_document(USERS, user.profile.user_id.as_str(), fields)
            .await
        {
            Ok(_) => {
                info!("Created user {} ({})", user.profile.user_id, user.profile.role);
                Ok(())
            }
            Err(e) => {
                // Release the email claim so the address isn't stranded.
                if let Err(cleanup) = self.client.delete_document(EMAIL_INDEX, &email_key).await {
                    warn!("Failed to release email index {}: {}", email_key, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &UserId) -> StoreResult<Option<StoredUser>> {
        let doc = self.client.get_document(USERS, user_id.as_str()).await?;
        match doc {
            Some(d) => Ok(Some(document_to_stored_user(&d)?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email via the index document.
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let key = Self::email_key(email);
        let index = self.client.get_document(EMAIL_INDEX, &key).await?;

        let user_id: String = match index.as_ref().and_then(|d| d.get("user_id")) {
            Some(id) => id,
            None => return Ok(None),
        };

        self.get(&UserId::from(user_id)).await
    }

    /// Overwrite a user's mutable profile fields.
    pub async fn update_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), profile.name.to_doc_value());
        fields.insert("phone".to_string(), profile.phone.to_doc_value());
        fields.insert("resume".to_string(), profile.resume.to_doc_value());
        fields.insert("skills".to_string(), profile.skills.to_doc_value());
        fields.insert("experience".to_string(), profile.experience.to_doc_value());
        fields.insert(
            "company_name".to_string(),
            profile.company_name.to_doc_value(),
        );
        fields.insert(
            "company_description".to_string(),
            profile.company_description.to_doc_value(),
        );
        fields.insert("website".to_string(), profile.website.to_doc_value());
        fields.insert("updated_at".to_string(), profile.updated_at.to_doc_value());

        let mask = fields.keys().cloned().collect();
        self.client
            .patch_document(USERS, profile.user_id.as_str(), fields, mask)
            .await?;
        Ok(())
    }

    /// List every user profile (admin surface). Passwords stay behind.
    pub async fn list_all(&self) -> StoreResult<Vec<UserProfile>> {
        let mut profiles = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_documents(USERS, Some(300), page_token.as_deref())
                .await?;

            for doc in page.documents.unwrap_or_default() {
                match document_to_stored_user(&doc) {
                    Ok(user) => profiles.push(user.profile),
                    Err(e) => warn!("Skipping malformed user document: {}", e),
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(profiles)
    }

    /// Count all users.
    pub async fn count_all(&self) -> StoreResult<u64> {
        Ok(self.list_all().await?.len() as u64)
    }

    /// Count users holding a given role.
    pub async fn count_by_role(&self, role: Role) -> StoreResult<u64> {
        let query = crate::types::StructuredQuery {
            from: vec![crate::types::CollectionSelector {
                collection_id: USERS.to_string(),
                all_descendants: None,
            }],
            r#where: Some(Filter::eq(
                "role",
                Value::StringValue(role.as_str().to_string()),
            )),
            order_by: None,
            limit: None,
        };
        let docs = self.client.run_query(query).await?;
        Ok(docs.len() as u64)
    }
}

// =============================================================================
// Field mapping
// =============================================================================

fn stored_user_to_fields(user: &StoredUser) -> HashMap<String, Value> {
    let p = &user.profile;
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), p.name.to_doc_value());
    fields.insert("email".to_string(), p.email.to_doc_value());
    fields.insert("role".to_string(), p.role.as_str().to_doc_value());
    fields.insert(
        "password_hash".to_string(),
        user.password_hash.to_doc_value(),
    );
    fields.insert("phone".to_string(), p.phone.to_doc_value());
    fields.insert("resume".to_string(), p.resume.to_doc_value());
    fields.insert("skills".to_string(), p.skills.to_doc_value());
    fields.insert("experience".to_string(), p.experience.to_doc_value());
    fields.insert("company_name".to_string(), p.company_name.to_doc_value());
    fields.insert(
        "company_description".to_string(),
        p.company_description.to_doc_value(),
    );
    fields.insert("website".to_string(), p.website.to_doc_value());
    fields.insert("created_at".to_string(), p.created_at.to_doc_value());
    fields.insert("updated_at".to_string(), p.updated_at.to_doc_value());
    fields
}

fn document_to_stored_user(doc: &Document) -> StoreResult<StoredUser> {
    let user_id = doc
        .doc_id()
        .ok_or_else(|| StoreError::invalid_document("user document without a name"))?;

    let role_str: String = doc
        .get("role")
        .ok_or_else(|| StoreError::invalid_document(format!("user {} missing role", user_id)))?;
    let role: Role = role_str
        .parse()
        .map_err(|e: String| StoreError::invalid_document(e))?;

    let profile = UserProfile {
        user_id: UserId::from(user_id),
        name: doc.get("name").unwrap_or_default(),
        email: doc
            .get("email")
            .ok_or_else(|| StoreError::invalid_document(format!("user {} missing email", user_id)))?,
        role,
        phone: doc.get("phone"),
        resume: doc.get("resume"),
        skills: doc.get("skills").unwrap_or_default(),
        experience: doc.get("experience").unwrap_or_default(),
        company_name: doc.get("company_name"),
        company_description: doc.get("company_description").unwrap_or_default(),
        website: doc.get("website").unwrap_or_default(),
        created_at: doc.get("created_at").unwrap_or_else(chrono::Utc::now),
        updated_at: doc.get("updated_at").unwrap_or_else(chrono::Utc::now),
    };

    Ok(StoredUser {
        profile,
        password_hash: doc.get("password_hash").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored_user() -> StoredUser {
        StoredUser {
            profile: UserProfile {
                user_id: UserId::from("u-1"),
                name: "Alice".to_string(),
                email: "Alice@Example.com".to_string(),
                role: Role::JobSeeker,
                phone: Some("+49 160".to_string()),
                resume: None,
                skills: vec!["rust".to_string()],
                experience: "3 years".to_string(),
                company_name: None,
                company_description: String::new(),
                website: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            password_hash: "$argon2id$...".to_string(),
        }
    }

    #[test]
    fn test_email_key_is_normalized() {
        assert_eq!(
            UserRepository::email_key("  Alice@Example.COM "),
            "alice@example.com"
        );
    }

    #[test]
    fn test_user_field_mapping_round_trip() {
        let user = stored_user();
        let fields = stored_user_to_fields(&user);

        let doc = Document {
            name: Some("projects/p/databases/d/documents/users/u-1".to_string()),
            fields: Some(fields),
            create_time: None,
            update_time: None,
        };

        let parsed = document_to_stored_user(&doc).unwrap();
        assert_eq!(parsed.profile.user_id, user.profile.user_id);
        assert_eq!(parsed.profile.role, Role::JobSeeker);
        assert_eq!(parsed.profile.skills, vec!["rust".to_string()]);
        assert_eq!(parsed.password_hash, user.password_hash);
    }

    #[test]
    fn test_document_without_role_is_invalid() {
        let doc = Document {
            name: Some("users/u-2".to_string()),
            fields: Some(HashMap::new()),
            create_time: None,
            update_time: None,
        };
        assert!(document_to_stored_user(&doc).is_err());
    }
}

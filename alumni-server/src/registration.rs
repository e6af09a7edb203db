//! Registration pipeline
//!
//! validation → duplicate pre-check → image ingestion → insert
//!
//! The pre-check only spares the common case an upload; the store's unique
//! email index decides races, and its `DuplicateKey` comes back as the same
//! `DuplicateEmail` failure.

use shared::models::{MaritalStatus, Member, MemberCreate, MembershipCategory};
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::MemberStore;
use crate::error::RegisterError;
use crate::image::{ImageIngest, UploadedImage};
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, require, validate_email,
    validate_optional_text,
};
use shared::error::{AppError, ErrorCode};

/// A submission, normalized at the HTTP boundary
///
/// Text values are trimmed and blank values are absent. Only the first
/// occurrence of a repeated field counts, even when that occurrence is blank.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name_bengali: Option<String>,
    pub name_english: Option<String>,
    pub ssc_batch: Option<String>,
    pub address_present: Option<String>,
    pub address_permanent: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub membership_category: Option<String>,
    pub image: Option<UploadedImage>,
    /// Text fields already seen in the body
    seen: HashSet<String>,
}

impl RegistrationForm {
    /// Record a text field by its form name.
    ///
    /// Returns `false` for names the form does not have.
    pub fn set_text(&mut self, name: &str, value: &str) -> bool {
        let first = !self.seen.contains(name);
        let Some(slot) = self.slot(name) else {
            return false;
        };
        if first {
            let value = value.trim();
            *slot = (!value.is_empty()).then(|| value.to_string());
            self.seen.insert(name.to_string());
        }
        true
    }

    /// Attach the photo; empty parts and any part after the first are ignored.
    pub fn set_image(&mut self, image: UploadedImage) {
        if self.image.is_none() && !image.bytes.is_empty() {
            self.image = Some(image);
        }
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name {
            "name_bengali" => &mut self.name_bengali,
            "name_english" => &mut self.name_english,
            "ssc_batch" => &mut self.ssc_batch,
            "address_present" => &mut self.address_present,
            "address_permanent" => &mut self.address_permanent,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "occupation" => &mut self.occupation,
            "marital_status" => &mut self.marital_status,
            "membership_category" => &mut self.membership_category,
            _ => return None,
        };
        Some(slot)
    }

    /// Check the submission and build the record to insert (image still unresolved).
    ///
    /// Email is checked first so a submission without one always gets
    /// "Email is required!".
    pub fn validate(self) -> Result<(MemberCreate, Option<UploadedImage>), RegisterError> {
        let email = require(&self.email, "Email")?.to_lowercase();
        require(&self.name_bengali, "Name (Bengali)")?;
        require(&self.name_english, "Name (English)")?;
        require(&self.phone, "Phone")?;
        let category = require(&self.membership_category, "Membership category")?;

        validate_email(&email)?;

        let membership_category = category
            .parse::<MembershipCategory>()
            .map_err(|_| AppError::new(ErrorCode::InvalidMembershipCategory))?;
        let marital_status = self
            .marital_status
            .as_deref()
            .map(str::parse::<MaritalStatus>)
            .transpose()
            .map_err(|_| AppError::new(ErrorCode::InvalidMaritalStatus))?;

        validate_optional_text(&self.name_bengali, "Name (Bengali)", MAX_NAME_LEN)?;
        validate_optional_text(&self.name_english, "Name (English)", MAX_NAME_LEN)?;
        validate_optional_text(&self.ssc_batch, "SSC batch", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&self.address_present, "Present address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&self.address_permanent, "Permanent address", MAX_ADDRESS_LEN)?;
        validate_optional_text(&self.phone, "Phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&self.occupation, "Occupation", MAX_NAME_LEN)?;

        let data = MemberCreate {
            name_bengali: self.name_bengali,
            name_english: self.name_english,
            ssc_batch: self.ssc_batch,
            address_present: self.address_present,
            address_permanent: self.address_permanent,
            phone: self.phone,
            email,
            occupation: self.occupation,
            marital_status,
            membership_category: Some(membership_category),
            image: String::new(),
        };
        Ok((data, self.image))
    }
}

/// Runs submissions through the pipeline against the configured collaborators
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn MemberStore>,
    images: Arc<dyn ImageIngest>,
}

impl Registrar {
    pub fn new(store: Arc<dyn MemberStore>, images: Arc<dyn ImageIngest>) -> Self {
        Self { store, images }
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<Member, RegisterError> {
        let (mut data, image) = form.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "Registration rejected by validation");
        })?;

        if self.store.find_by_email(&data.email).await?.is_some() {
            tracing::warn!(email = %data.email, "Registration rejected: email already registered");
            return Err(RegisterError::DuplicateEmail(data.email));
        }

        if let Some(image) = image {
            data.image = self.images.ingest(image).await?;
        }

        let email = data.email.clone();
        let member = self.store.insert(data).await.inspect_err(|e| {
            if let crate::db::StoreError::DuplicateKey(_) = e {
                tracing::warn!(email = %email, "Registration lost insert race on email");
            }
        })?;

        tracing::info!(member_id = member.id, email = %member.email, "Member registered");
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use crate::image::IngestError;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory store with call counters; `race` makes the pre-check miss
    /// while the insert still reports a duplicate.
    #[derive(Default)]
    struct MockStore {
        rows: Mutex<Vec<Member>>,
        race: bool,
        finds: AtomicUsize,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl MemberStore for MockStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            if self.race {
                return Ok(None);
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|m| m.email == email).cloned())
        }

        async fn insert(&self, data: MemberCreate) -> Result<Member, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.race {
                return Err(StoreError::DuplicateKey(data.email));
            }
            let mut rows = self.rows.lock().unwrap();
            let member = Member {
                id: rows.len() as i64 + 1,
                name_bengali: data.name_bengali,
                name_english: data.name_english,
                ssc_batch: data.ssc_batch,
                address_present: data.address_present,
                address_permanent: data.address_permanent,
                phone: data.phone,
                email: data.email,
                occupation: data.occupation,
                marital_status: data.marital_status.map(|s| s.to_string()),
                membership_category: data.membership_category.map(|c| c.to_string()),
                image: data.image,
                created_at: 0,
            };
            rows.push(member.clone());
            Ok(member)
        }
    }

    #[derive(Default)]
    struct MockIngest {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageIngest for MockIngest {
        async fn ingest(&self, _image: UploadedImage) -> Result<String, IngestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(IngestError::Upload("host unreachable".into()))
            } else {
                Ok("https://img.example/photo.png".into())
            }
        }
    }

    fn registrar(store: &Arc<MockStore>, ingest: &Arc<MockIngest>) -> Registrar {
        Registrar::new(store.clone(), ingest.clone())
    }

    fn rahim() -> RegistrationForm {
        let mut form = RegistrationForm::default();
        form.set_text("name_bengali", "রহিম");
        form.set_text("name_english", "Rahim");
        form.set_text("phone", "01700000000");
        form.set_text("email", "a@x.com");
        form.set_text("membership_category", "General Member");
        form
    }

    fn photo() -> UploadedImage {
        UploadedImage {
            file_name: Some("me.png".into()),
            content_type: Some("image/png".into()),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn form_keeps_first_value_and_drops_blanks() {
        let mut form = RegistrationForm::default();
        assert!(form.set_text("email", "  first@x.com "));
        assert!(form.set_text("email", "second@x.com"));
        assert!(form.set_text("phone", "   "));
        assert!(!form.set_text("favourite_colour", "blue"));

        assert_eq!(form.email.as_deref(), Some("first@x.com"));
        assert!(form.phone.is_none());

        // A blank first value still claims the field
        assert!(form.set_text("phone", "01700000000"));
        assert!(form.phone.is_none());

        form.set_image(UploadedImage {
            bytes: Bytes::new(),
            ..photo()
        });
        assert!(form.image.is_none());
        form.set_image(photo());
        assert!(form.image.is_some());
    }

    #[test]
    fn blank_first_email_is_reported_missing() {
        let mut form = RegistrationForm::default();
        form.set_text("name_bengali", "রহিম");
        form.set_text("name_english", "Rahim");
        form.set_text("phone", "01700000000");
        form.set_text("membership_category", "General Member");
        form.set_text("email", "");
        form.set_text("email", "b@x.com");
        assert_eq!(form.email, None);

        let RegisterError::Validation(app) = form.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(app.message, "Email is required!");
    }

    #[test]
    fn email_is_checked_before_other_required_fields() {
        let err = RegistrationForm::default().validate().unwrap_err();
        let RegisterError::Validation(app) = err else {
            panic!("expected validation error");
        };
        assert_eq!(app.message, "Email is required!");

        let mut form = rahim();
        form.phone = None;
        let RegisterError::Validation(app) = form.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(app.message, "Phone is required!");
    }

    #[test]
    fn validation_normalizes_and_types_fields() {
        let mut form = rahim();
        form.email = Some("Rahim@X.com".into());
        form.set_text("marital_status", "Married");

        let (data, image) = form.validate().unwrap();
        assert_eq!(data.email, "rahim@x.com");
        assert_eq!(data.marital_status, Some(MaritalStatus::Married));
        assert_eq!(data.membership_category, Some(MembershipCategory::General));
        assert_eq!(data.image, "");
        assert!(image.is_none());
    }

    #[test]
    fn unknown_category_and_status_are_rejected() {
        let mut form = rahim();
        form.membership_category = Some("Gold Member".into());
        let RegisterError::Validation(app) = form.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(app.code, ErrorCode::InvalidMembershipCategory);

        let mut form = rahim();
        form.marital_status = Some("divorced".into());
        let RegisterError::Validation(app) = form.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(app.code, ErrorCode::InvalidMaritalStatus);
    }

    #[tokio::test]
    async fn missing_email_touches_neither_store_nor_ingest() {
        let store = Arc::new(MockStore::default());
        let ingest = Arc::new(MockIngest::default());

        let mut form = rahim();
        form.email = None;
        form.set_image(photo());

        let err = registrar(&store, &ingest).register(form).await.unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)));
        assert_eq!(store.finds.load(Ordering::SeqCst), 0);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(ingest.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registers_without_photo() {
        let store = Arc::new(MockStore::default());
        let ingest = Arc::new(MockIngest::default());

        let member = registrar(&store, &ingest).register(rahim()).await.unwrap();
        assert_eq!(member.email, "a@x.com");
        assert_eq!(member.image, "");
        assert_eq!(ingest.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stores_ingested_photo_reference() {
        let store = Arc::new(MockStore::default());
        let ingest = Arc::new(MockIngest::default());

        let mut form = rahim();
        form.set_image(photo());
        let member = registrar(&store, &ingest).register(form).await.unwrap();
        assert_eq!(member.image, "https://img.example/photo.png");
    }

    #[tokio::test]
    async fn resubmission_is_a_duplicate_without_ingesting() {
        let store = Arc::new(MockStore::default());
        let ingest = Arc::new(MockIngest::default());
        let registrar = registrar(&store, &ingest);

        registrar.register(rahim()).await.unwrap();

        let mut again = rahim();
        again.set_image(photo());
        let err = registrar.register(again).await.unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateEmail(_)));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert_eq!(ingest.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lost_insert_race_is_reported_as_duplicate() {
        let store = Arc::new(MockStore {
            race: true,
            ..Default::default()
        });
        let ingest = Arc::new(MockIngest::default());

        let err = registrar(&store, &ingest).register(rahim()).await.unwrap_err();
        assert!(matches!(err, RegisterError::DuplicateEmail(ref e) if e == "a@x.com"));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_ingest_aborts_before_insert() {
        let store = Arc::new(MockStore::default());
        let ingest = Arc::new(MockIngest {
            fail: true,
            ..Default::default()
        });

        let mut form = rahim();
        form.set_image(photo());
        let err = registrar(&store, &ingest).register(form).await.unwrap_err();
        assert!(matches!(err, RegisterError::Upload(_)));
        assert_eq!(ingest.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use todo_store::ItemStore;
use todo_types::{Item, ItemId, Page, PageRequest, ENTITY_NAME};

use crate::error::{ApiError, ApiResult};
use crate::problem::FieldError;

/// Item as received from a client, before validation.
///
/// Both fields are optional here so that a missing `description` surfaces as
/// a field validation failure rather than a body parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemPayload {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: Some(description.into()),
        }
    }

    pub fn with_id(id: ItemId, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            description: Some(description.into()),
        }
    }
}

impl From<Item> for ItemPayload {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            description: Some(item.description),
        }
    }
}

/// Request-level rules over an [`ItemStore`].
///
/// Each operation validates its input before touching the store and reports
/// failures as [`ApiError`] values. The service keeps no state of its own.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Save a new item. The payload must not carry an id.
    pub fn create(&self, payload: ItemPayload) -> ApiResult<Item> {
        let description = validate_description(payload.description)?;
        if payload.id.is_some() {
            return Err(ApiError::bad_request_alert(
                format!("A new {ENTITY_NAME} cannot already have an ID"),
                ENTITY_NAME,
                "idexists",
            ));
        }
        let saved = self.store.save(Item::new(description))?;
        debug!(id = ?saved.id, "item created");
        Ok(saved)
    }

    /// Replace the item stored under the payload's id.
    ///
    /// The id is not required to exist already: the record is written under
    /// it either way.
    pub fn update(&self, payload: ItemPayload) -> ApiResult<Item> {
        let description = validate_description(payload.description)?;
        let Some(id) = payload.id else {
            return Err(ApiError::bad_request_alert("Invalid id", ENTITY_NAME, "idnull"));
        };
        let saved = self.store.save(Item::with_id(id, description))?;
        debug!(%id, "item updated");
        Ok(saved)
    }

    pub fn list(&self, request: &PageRequest) -> ApiResult<Page<Item>> {
        Ok(self.store.find_page(request)?)
    }

    pub fn get(&self, id: ItemId) -> ApiResult<Item> {
        self.store.find_by_id(id)?.ok_or(ApiError::NotFound)
    }

    /// Delete by id. Deleting an absent id succeeds.
    pub fn delete(&self, id: ItemId) -> ApiResult<()> {
        let existed = self.store.delete_by_id(id)?;
        debug!(%id, existed, "item delete");
        Ok(())
    }
}

impl std::fmt::Debug for ItemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemService").finish_non_exhaustive()
    }
}

fn validate_description(description: Option<String>) -> ApiResult<String> {
    let constraint = match description {
        Some(d) if !d.trim().is_empty() => return Ok(d),
        Some(_) => "NotBlank",
        None => "NotNull",
    };
    Err(ApiError::FieldValidation {
        field_errors: vec![FieldError::new(ENTITY_NAME, "description", constraint)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use todo_store::{InMemoryItemStore, StoreError, StoreResult};

    const DEFAULT_DESCRIPTION: &str = "AAAAAAAAAA";
    const UPDATED_DESCRIPTION: &str = "BBBBBBBBBB";

    fn service() -> (ItemService, Arc<InMemoryItemStore>) {
        let store = Arc::new(InMemoryItemStore::new());
        (ItemService::new(store.clone()), store)
    }

    /// A store whose every operation fails.
    struct BrokenStore;

    impl ItemStore for BrokenStore {
        fn save(&self, _item: Item) -> StoreResult<Item> {
            Err(StoreError::LockPoisoned)
        }
        fn find_by_id(&self, _id: ItemId) -> StoreResult<Option<Item>> {
            Err(StoreError::LockPoisoned)
        }
        fn find_page(&self, _request: &PageRequest) -> StoreResult<Page<Item>> {
            Err(StoreError::LockPoisoned)
        }
        fn delete_by_id(&self, _id: ItemId) -> StoreResult<bool> {
            Err(StoreError::LockPoisoned)
        }
        fn count(&self) -> StoreResult<u64> {
            Err(StoreError::LockPoisoned)
        }
    }

    #[test]
    fn create_assigns_fresh_id() {
        let (service, store) = service();
        let a = service.create(ItemPayload::new(DEFAULT_DESCRIPTION)).unwrap();
        let b = service.create(ItemPayload::new(DEFAULT_DESCRIPTION)).unwrap();
        assert!(a.id.is_some());
        assert_ne!(a.id, b.id);
        assert_eq!(a.description, DEFAULT_DESCRIPTION);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn create_with_id_is_rejected() {
        let (service, store) = service();
        let err = service
            .create(ItemPayload::with_id(ItemId::new(1), DEFAULT_DESCRIPTION))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.alert_key(), Some(("items", "idexists")));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn create_without_description_is_rejected() {
        let (service, store) = service();
        let err = service.create(ItemPayload::default()).unwrap_err();
        match err {
            ApiError::FieldValidation { field_errors } => {
                assert_eq!(field_errors[0].field, "description");
                assert_eq!(field_errors[0].message, "NotNull");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn create_with_blank_description_is_rejected() {
        let (service, store) = service();
        let err = service.create(ItemPayload::new("   ")).unwrap_err();
        assert!(matches!(
            &err,
            ApiError::FieldValidation { field_errors } if field_errors[0].message == "NotBlank"
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn field_rule_checked_before_id_rule() {
        let (service, _) = service();
        let payload = ItemPayload {
            id: Some(ItemId::new(3)),
            description: None,
        };
        assert!(matches!(
            service.create(payload).unwrap_err(),
            ApiError::FieldValidation { .. }
        ));
    }

    #[test]
    fn update_without_id_is_rejected() {
        let (service, store) = service();
        let err = service.update(ItemPayload::new(DEFAULT_DESCRIPTION)).unwrap_err();
        assert_eq!(err.alert_key(), Some(("items", "idnull")));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn update_replaces_record() {
        let (service, store) = service();
        let created = service.create(ItemPayload::new(DEFAULT_DESCRIPTION)).unwrap();
        let id = created.id.unwrap();

        let updated = service
            .update(ItemPayload::with_id(id, UPDATED_DESCRIPTION))
            .unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(service.get(id).unwrap().description, UPDATED_DESCRIPTION);
    }

    #[test]
    fn update_of_unknown_id_upserts() {
        let (service, store) = service();
        let id = ItemId::new(500);
        let saved = service.update(ItemPayload::with_id(id, DEFAULT_DESCRIPTION)).unwrap();
        assert_eq!(saved.id, Some(id));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(service.get(id).unwrap().description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let (service, _) = service();
        let err = service.get(ItemId::new(u64::MAX)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn delete_is_idempotent() {
        let (service, store) = service();
        let id = service.create(ItemPayload::new("x")).unwrap().id.unwrap();
        service.delete(id).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        service.delete(id).unwrap();
        assert_eq!(service.get(id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_failures_are_store_kind() {
        let service = ItemService::new(Arc::new(BrokenStore));
        assert_eq!(
            service.create(ItemPayload::new("x")).unwrap_err().kind(),
            ErrorKind::Store
        );
        assert_eq!(service.get(ItemId::new(1)).unwrap_err().kind(), ErrorKind::Store);
        assert_eq!(service.delete(ItemId::new(1)).unwrap_err().kind(), ErrorKind::Store);
    }

    #[test]
    fn validation_precedes_store_access() {
        let service = ItemService::new(Arc::new(BrokenStore));
        let err = service.update(ItemPayload::new("no id")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn payload_ignores_unknown_fields() {
        let payload: ItemPayload =
            serde_json::from_str(r#"{"description":"x","extra":true}"#).unwrap();
        assert!(payload.id.is_none());
        assert_eq!(payload.description.as_deref(), Some("x"));
    }
}

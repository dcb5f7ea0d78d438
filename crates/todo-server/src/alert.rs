//! Advisory `X-{app}-alert` / `X-{app}-error` / `X-{app}-params` headers.
//!
//! These headers tell a client which entity and action a response concerns.
//! They are purely informational and carry no part of the data contract.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug)]
pub struct Alerts {
    alert: HeaderName,
    error: HeaderName,
    params: HeaderName,
}

impl Alerts {
    pub fn new(application_name: &str) -> ServerResult<Self> {
        let name = |suffix: &str| {
            HeaderName::from_bytes(format!("x-{application_name}-{suffix}").as_bytes())
                .map_err(|e| ServerError::Config(format!("invalid application name: {e}")))
        };
        Ok(Self {
            alert: name("alert")?,
            error: name("error")?,
            params: name("params")?,
        })
    }

    pub fn alert_header(&self) -> &HeaderName {
        &self.alert
    }

    pub fn error_header(&self) -> &HeaderName {
        &self.error
    }

    pub fn params_header(&self) -> &HeaderName {
        &self.params
    }

    pub fn entity_created(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(&format!("A new {entity} is created with identifier {id}"), id)
    }

    pub fn entity_updated(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(&format!("A {entity} is updated with identifier {id}"), id)
    }

    pub fn entity_deleted(&self, entity: &str, id: &str) -> HeaderMap {
        self.alert(&format!("A {entity} is deleted with identifier {id}"), id)
    }

    pub fn failure(&self, entity: &str, error_key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.error, &format!("error.{error_key}"));
        insert(&mut headers, &self.params, &encode(entity));
        headers
    }

    fn alert(&self, message: &str, param: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, &self.alert, message);
        insert(&mut headers, &self.params, &encode(param));
        headers
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn insert(headers: &mut HeaderMap, name: &HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name.clone(), v);
        }
        Err(_) => tracing::warn!(header = %name, "dropping alert header with invalid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_alert() {
        let alerts = Alerts::new("todoApp").unwrap();
        let headers = alerts.entity_created("items", "5");
        assert_eq!(
            headers.get("x-todoapp-alert").unwrap(),
            "A new items is created with identifier 5"
        );
        assert_eq!(headers.get("X-todoApp-params").unwrap(), "5");
    }

    #[test]
    fn updated_and_deleted_alerts() {
        let alerts = Alerts::new("todoApp").unwrap();
        assert_eq!(
            alerts.entity_updated("items", "1").get(alerts.alert_header()).unwrap(),
            "A items is updated with identifier 1"
        );
        assert_eq!(
            alerts.entity_deleted("items", "1").get(alerts.alert_header()).unwrap(),
            "A items is deleted with identifier 1"
        );
    }

    #[test]
    fn failure_alert() {
        let alerts = Alerts::new("todoApp").unwrap();
        let headers = alerts.failure("items", "idexists");
        assert_eq!(headers.get(alerts.error_header()).unwrap(), "error.idexists");
        assert_eq!(headers.get(alerts.params_header()).unwrap(), "items");
        assert!(headers.get(alerts.alert_header()).is_none());
    }

    #[test]
    fn params_are_url_encoded() {
        let alerts = Alerts::new("todoApp").unwrap();
        let headers = alerts.failure("my items", "x");
        assert_eq!(headers.get(alerts.params_header()).unwrap(), "my+items");
    }

    #[test]
    fn rejects_unusable_name() {
        assert!(Alerts::new("bad name").is_err());
    }
}

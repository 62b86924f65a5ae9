//! Canned-response transport for test mode.
//!
//! Used when the provider is configured with `test_mode`, so acceptance
//! tests and documentation examples run without a Shieldoo instance. Every
//! server-assigned value is the literal `mockup`.

use crate::client::{ApiRequest, Transport};
use crate::types::Entity;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Value used for every server-assigned field.
pub const MOCKUP_VALUE: &str = "mockup";

/// Transport answering every call locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockupTransport;

#[async_trait]
impl Transport for MockupTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<String> {
        debug!(
            method = %request.method(),
            entity = %request.entity(),
            "answering from mockup transport"
        );

        let entity = request.entity();
        let response = match *request.method() {
            Method::GET => match (request.name(), request.id()) {
                (Some(name), _) => lookup(entity, name),
                (None, Some(_)) => lookup(entity, MOCKUP_VALUE),
                (None, None) => json!([]),
            },
            Method::POST | Method::PUT => {
                let mut object = match request.body() {
                    Some(Value::Object(object)) => object.clone(),
                    _ => Map::new(),
                };
                assign(entity, &mut object);
                Value::Object(object)
            }
            Method::DELETE => return Ok(String::new()),
            ref other => {
                return Err(Error::Api {
                    status: "405 Method Not Allowed".to_string(),
                    body: format!("{other} is not supported"),
                })
            }
        };
        Ok(response.to_string())
    }
}

fn lookup(entity: Entity, name: &str) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), Value::from(name));
    assign(entity, &mut object);
    Value::Object(object)
}

fn assign(entity: Entity, object: &mut Map<String, Value>) {
    object.insert("id".to_string(), Value::from(MOCKUP_VALUE));
    if entity == Entity::Servers {
        object.insert("ipAddress".to_string(), Value::from(MOCKUP_VALUE));
        object.insert("configuration".to_string(), Value::from(MOCKUP_VALUE));
    }
}

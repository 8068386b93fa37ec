use async_trait::async_trait;
use lowdefy_api::{
  ApiError, BoxError, ConnectionRegistry, RequestContext, RequestResolver, RequestRunner,
  ResolverInput,
};
use lowdefy_config::BuildArtifact;
use serde_json::{Value, json};

/// Echoes what it was given.
struct Echo;

#[async_trait]
impl RequestResolver for Echo {
  async fn resolve(&self, input: ResolverInput) -> Result<Value, BoxError> {
    Ok(json!({ "request": input.request, "connection": input.connection }))
  }
}

struct Refused;

#[async_trait]
impl RequestResolver for Refused {
  async fn resolve(&self, _input: ResolverInput) -> Result<Value, BoxError> {
    Err("connection refused".into())
  }
}

fn artifact() -> BuildArtifact {
  BuildArtifact {
    pages: vec![json!({
      "id": "home",
      "type": "PageHeaderMenu",
      "requests": [
        {
          "id": "get_users",
          "type": "Find",
          "connectionId": "users",
          "properties": { "filter": { "name": { "_payload": "name" } } }
        },
        {
          "id": "refused",
          "type": "Refuse",
          "connectionId": "users",
          "properties": {}
        },
        {
          "id": "missing_connection",
          "type": "Find",
          "connectionId": "orders",
          "properties": {}
        },
        {
          "id": "wrong_type",
          "type": "Aggregate",
          "connectionId": "users",
          "properties": {}
        },
        {
          "id": "bad_operator",
          "type": "Find",
          "connectionId": "users",
          "properties": { "_not_an_operator": 1 }
        }
      ]
    })],
    connections: vec![json!({
      "id": "users",
      "type": "Store",
      "properties": { "owner": { "_user": "sub" } }
    })],
    ..BuildArtifact::default()
  }
}

fn runner() -> RequestRunner {
  let mut connections = ConnectionRegistry::new();
  connections.register("Store", "Find", Echo);
  connections.register("Store", "Refuse", Refused);
  RequestRunner::new(artifact(), connections)
}

fn context() -> RequestContext {
  RequestContext {
    page_id: "home".to_string(),
    payload: json!({ "name": "ada" }),
    user: json!({ "sub": "user_1" }),
  }
}

#[tokio::test]
async fn test_run_evaluates_properties() {
  let response = runner().run(&context(), "get_users").await.unwrap();
  assert_eq!(response.id, "get_users");
  assert!(response.success);
  assert_eq!(
    response.response,
    json!({
      "request": { "filter": { "name": "ada" } },
      "connection": { "owner": "user_1" }
    })
  );
}

#[tokio::test]
async fn test_unknown_page() {
  let ctx = RequestContext {
    page_id: "settings".to_string(),
    ..context()
  };
  let err = runner().run(&ctx, "get_users").await.unwrap_err();
  assert!(matches!(err, ApiError::PageNotFound { .. }));
}

#[tokio::test]
async fn test_unknown_request() {
  let err = runner().run(&context(), "delete_users").await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Request \"delete_users\" does not exist on page \"home\"."
  );
}

#[tokio::test]
async fn test_unknown_connection() {
  let err = runner()
    .run(&context(), "missing_connection")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    ApiError::ConnectionNotFound { ref connection_id, .. } if connection_id == "orders"
  ));
}

#[tokio::test]
async fn test_unsupported_request_type() {
  let err = runner().run(&context(), "wrong_type").await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Request type \"Aggregate\" can not be used with connection type \"Store\"."
  );
}

#[tokio::test]
async fn test_operator_error() {
  let err = runner().run(&context(), "bad_operator").await.unwrap_err();
  match err {
    ApiError::Operator { request_id, message } => {
      assert_eq!(request_id, "bad_operator");
      assert!(message.contains("_not_an_operator"), "{message}");
    }
    other => panic!("expected operator error, got {other:?}"),
  }
}

#[tokio::test]
async fn test_resolver_error() {
  let err = runner().run(&context(), "refused").await.unwrap_err();
  match err {
    ApiError::Request(err) => {
      assert_eq!(err.message, "connection refused");
      assert_eq!(err.request_id, "refused");
      assert_eq!(err.request_type, "Refuse");
    }
    other => panic!("expected request error, got {other:?}"),
  }
}

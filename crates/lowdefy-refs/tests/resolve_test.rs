//! Integration tests for RefResolver over in-memory and on-disk configs.

use async_trait::async_trait;
use lowdefy_refs::{
  BoxError, ContentResolver, ContentResolverRegistry, FsLoader, MemoryLoader, RefError,
  RefResolver, TransformerRegistry,
};
use serde_json::{Value, json};

fn contains_ref(value: &Value) -> bool {
  match value {
    Value::Object(map) => map.contains_key("_ref") || map.values().any(contains_ref),
    Value::Array(items) => items.iter().any(contains_ref),
    _ => false,
  }
}

#[tokio::test]
async fn test_nested_refs_are_substituted() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      r#"
lowdefy: 4.0.0
pages:
  - _ref: pages/home.yaml
  - _ref: pages/about.yaml
"#,
    )
    .with_file(
      "pages/home.yaml",
      r#"
id: home
type: Box
blocks:
  - _ref: ../shared/header.yaml
"#,
    )
    .with_file("pages/about.yaml", "id: about\ntype: Box")
    .with_file("shared/header.yaml", "id: header\ntype: Title");

  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();

  assert_eq!(
    doc.value,
    json!({
      "lowdefy": "4.0.0",
      "pages": [
        { "id": "home", "type": "Box", "blocks": [{ "id": "header", "type": "Title" }] },
        { "id": "about", "type": "Box" }
      ]
    })
  );
  assert!(!contains_ref(&doc.value));
  assert_eq!(
    doc.graph.dependencies("lowdefy.yaml"),
    vec!["pages/about.yaml", "pages/home.yaml"]
  );
  assert_eq!(doc.graph.dependents("shared/header.yaml"), vec!["pages/home.yaml"]);
}

#[tokio::test]
async fn test_chain_of_refs_terminates() {
  let mut loader = MemoryLoader::new().with_file("lowdefy.yaml", "next:\n  _ref: f0.yaml");
  for i in 0..20 {
    loader.insert(format!("f{i}.yaml"), format!("n: {i}\nnext:\n  _ref: f{}.yaml", i + 1));
  }
  loader.insert("f20.yaml", "n: 20");

  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert!(!contains_ref(&doc.value));
  assert_eq!(doc.graph.len(), 22);
}

#[tokio::test]
async fn test_same_file_referenced_twice_is_not_a_cycle() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "a:\n  _ref: b.yaml\nc:\n  _ref: b.yaml")
    .with_file("b.yaml", "1");
  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert_eq!(doc.value, json!({ "a": 1, "c": 1 }));
}

#[tokio::test]
async fn test_self_reference_is_circular() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "a:\n  _ref: a.yaml")
    .with_file("a.yaml", "self:\n  _ref: a.yaml");

  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  match err {
    RefError::Circular { cycle } => assert_eq!(cycle, vec!["a.yaml", "a.yaml"]),
    other => panic!("expected circular error, got {other:?}"),
  }
}

#[tokio::test]
async fn test_indirect_cycle_names_full_path() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "a:\n  _ref: a.yaml")
    .with_file("a.yaml", "b:\n  _ref: b.yaml")
    .with_file("b.yaml", "c:\n  _ref: c.yaml")
    .with_file("c.yaml", "a:\n  _ref: a.yaml");

  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Circular reference detected: a.yaml -> b.yaml -> c.yaml -> a.yaml."
  );
}

#[tokio::test]
async fn test_root_in_cycle() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "a:\n  _ref: a.yaml")
    .with_file("a.yaml", "root:\n  _ref: lowdefy.yaml");

  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert!(matches!(
    err,
    RefError::Circular { cycle } if cycle == vec!["lowdefy.yaml", "a.yaml", "lowdefy.yaml"]
  ));
}

#[tokio::test]
async fn test_missing_reference() {
  let loader = MemoryLoader::new().with_file("lowdefy.yaml", "a:\n  _ref: pages/missing.yaml");
  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert_eq!(
    err.to_string(),
    "Tried to reference file \"pages/missing.yaml\" from \"lowdefy.yaml\", but file does not exist."
  );
}

#[tokio::test]
async fn test_key_projection() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      "title:\n  _ref:\n    path: meta.json\n    key: app.title\nmissing:\n  _ref:\n    path: meta.json\n    key: app.nope",
    )
    .with_file("meta.json", r#"{"app": {"title": "Shop"}}"#);

  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert!(matches!(err, RefError::KeyNotFound { key, path, .. } if key == "app.nope" && path == "meta.json"));
}

#[tokio::test]
async fn test_key_projection_success() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "title:\n  _ref:\n    path: meta.json\n    key: app.title")
    .with_file("meta.json", r#"{"app": {"title": "Shop"}}"#);
  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert_eq!(doc.value, json!({ "title": "Shop" }));
}

#[tokio::test]
async fn test_vars_flow_into_nested_refs() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      r#"
page:
  _ref:
    path: page.yaml
    vars:
      title: Orders
"#,
    )
    .with_file(
      "page.yaml",
      r#"
id: orders
header:
  _ref:
    path: header.yaml
    vars:
      text:
        _var: title
"#,
    )
    .with_file(
      "header.yaml",
      "content:\n  _var: text\nsize:\n  _var:\n    name: size\n    default: 3",
    );

  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert_eq!(
    doc.value,
    json!({ "page": { "id": "orders", "header": { "content": "Orders", "size": 3 } } })
  );
}

#[tokio::test]
async fn test_njk_template_ref() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      "pages:\n  - _ref:\n      path: templates/page.yaml.njk\n      vars:\n        ids: [a, b]",
    )
    .with_file(
      "templates/page.yaml.njk",
      "blocks:\n{% for id in ids %}  - id: {{ id }}\n    type: Box\n{% endfor %}",
    );

  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert_eq!(
    doc.value,
    json!({
      "pages": [{ "blocks": [{ "id": "a", "type": "Box" }, { "id": "b", "type": "Box" }] }]
    })
  );
}

#[tokio::test]
async fn test_text_file_ref() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "html:\n  _ref: content/intro.html")
    .with_file("content/intro.html", "<p>Hi</p>");
  let doc = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap();
  assert_eq!(doc.value, json!({ "html": "<p>Hi</p>" }));
}

#[tokio::test]
async fn test_transformer_runs_with_vars() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      "items:\n  _ref:\n    path: items.yaml\n    transformer: tag\n    vars:\n      tag: new",
    )
    .with_file("items.yaml", "- a\n- b");

  let mut transformers = TransformerRegistry::new();
  transformers.register("tag", |node: Value, vars: &Value| -> Result<Value, BoxError> {
    let tag = vars["tag"].as_str().unwrap_or_default().to_string();
    let items = node
      .as_array()
      .ok_or("expected an array")?
      .iter()
      .map(|v| json!({ "name": v, "tag": tag }))
      .collect();
    Ok(Value::Array(items))
  });

  let doc = RefResolver::new(loader)
    .with_transformers(transformers)
    .resolve("lowdefy.yaml")
    .await
    .unwrap();
  assert_eq!(
    doc.value,
    json!({ "items": [{ "name": "a", "tag": "new" }, { "name": "b", "tag": "new" }] })
  );
}

#[tokio::test]
async fn test_transformer_error_carries_ref_id() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "x:\n  _ref:\n    path: a.yaml\n    transformer: fail")
    .with_file("a.yaml", "1");

  let mut transformers = TransformerRegistry::new();
  transformers.register("fail", |_: Value, _: &Value| -> Result<Value, BoxError> {
    Err("boom".into())
  });

  let err = RefResolver::new(loader)
    .with_transformers(transformers)
    .resolve("lowdefy.yaml")
    .await
    .unwrap_err();
  match err {
    RefError::Transformer {
      transformer,
      ref_id,
      path,
      message,
    } => {
      assert_eq!(transformer, "fail");
      assert_eq!(path, "a.yaml");
      assert_eq!(message, "boom");
      assert!(uuid_like(&ref_id));
    }
    other => panic!("expected transformer error, got {other:?}"),
  }
}

fn uuid_like(id: &str) -> bool {
  id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}

#[tokio::test]
async fn test_unregistered_transformer() {
  let loader = MemoryLoader::new()
    .with_file("lowdefy.yaml", "x:\n  _ref:\n    path: a.yaml\n    transformer: nope")
    .with_file("a.yaml", "1");
  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert!(matches!(err, RefError::Transformer { .. }));
}

struct EchoResolver;

#[async_trait]
impl ContentResolver for EchoResolver {
  async fn resolve(&self, path: Option<&str>, vars: &Value) -> Result<Value, BoxError> {
    Ok(json!({ "path": path, "vars": vars, "nested": { "_ref": "extra.yaml" } }))
  }
}

#[tokio::test]
async fn test_custom_content_resolver() {
  let loader = MemoryLoader::new()
    .with_file(
      "lowdefy.yaml",
      "x:\n  _ref:\n    resolver: echo\n    path: virtual.yaml\n    vars:\n      a: 1",
    )
    .with_file("extra.yaml", "true");

  let mut resolvers = ContentResolverRegistry::new();
  resolvers.register("echo", EchoResolver);

  let doc = RefResolver::new(loader)
    .with_resolvers(resolvers)
    .resolve("lowdefy.yaml")
    .await
    .unwrap();
  assert_eq!(
    doc.value,
    json!({ "x": { "path": "virtual.yaml", "vars": { "a": 1 }, "nested": true } })
  );
}

#[tokio::test]
async fn test_invalid_ref_definition() {
  let loader = MemoryLoader::new().with_file("lowdefy.yaml", "x:\n  _ref:\n    key: a");
  let err = RefResolver::new(loader).resolve("lowdefy.yaml").await.unwrap_err();
  assert!(matches!(err, RefError::InvalidDefinition { .. }));
}

#[tokio::test]
async fn test_fs_loader_resolution() {
  let dir = tempfile::tempdir().unwrap();
  std::fs::create_dir_all(dir.path().join("pages")).unwrap();
  std::fs::write(
    dir.path().join("lowdefy.yaml"),
    "pages:\n  - _ref: pages/home.json",
  )
  .unwrap();
  std::fs::write(dir.path().join("pages/home.json"), r#"{"id": "home", "type": "Box"}"#).unwrap();

  let doc = RefResolver::new(FsLoader::new(dir.path()))
    .resolve("lowdefy.yaml")
    .await
    .unwrap();
  assert_eq!(doc.value, json!({ "pages": [{ "id": "home", "type": "Box" }] }));
}

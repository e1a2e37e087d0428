//! Integration tests for layered configuration composition.

use cfgtree::{Configuration, ConfigurationBuilder, ConfigurationError, bind, entries};
use serde::Deserialize;

#[tokio::test]
async fn test_combines_key_value_pairs_from_different_providers() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Mem1:KeyInMem1", "ValueInMem1")])
        .add_in_memory([("Mem2:KeyInMem2", "ValueInMem2")])
        .add_in_memory([("Mem3:KeyInMem3", "ValueInMem3")])
        .build()
        .await
        .unwrap();

    assert_eq!(config.get("mem1:keyinmem1").as_deref(), Some("ValueInMem1"));
    assert_eq!(config.get("Mem2:KeyInMem2").as_deref(), Some("ValueInMem2"));
    assert_eq!(config.get("MEM3:KEYINMEM3").as_deref(), Some("ValueInMem3"));
    assert_eq!(config.get("NotExist"), None);
}

#[tokio::test]
async fn test_later_provider_wins_on_read() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Mem1:KeyInMem1", "V1")])
        .add_in_memory([("Mem1:KeyInMem1", "V2")])
        .build()
        .await
        .unwrap();

    assert_eq!(config.get("mem1:keyinmem1").as_deref(), Some("V2"));
}

#[tokio::test]
async fn test_set_fans_out_to_every_provider() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Key", "low")])
        .add_in_memory([("Key", "high")])
        .build()
        .await
        .unwrap();

    config.set("Key", Some("written".to_owned())).unwrap();

    assert_eq!(config.get("Key").as_deref(), Some("written"));
    for provider in config.providers() {
        assert_eq!(provider.get("Key"), Some(Some("written".to_owned())));
    }
}

#[tokio::test]
async fn test_set_with_no_providers_fails() {
    let config = ConfigurationBuilder::new().build().await.unwrap();

    assert_eq!(config.get("anything"), None);
    assert!(config.children().is_empty());
    let err = config.set("k", Some("v".to_owned())).unwrap_err();
    assert!(matches!(err, ConfigurationError::ProviderRegistryEmpty));
}

#[tokio::test]
async fn test_case_insensitive_set_and_get() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("placeholder", "x")])
        .build()
        .await
        .unwrap();

    config.set("Key1", Some("v".to_owned())).unwrap();

    assert_eq!(config.get("Key1").as_deref(), Some("v"));
    assert_eq!(config.get("key1").as_deref(), Some("v"));
    assert_eq!(config.get("KEY1").as_deref(), Some("v"));
}

#[tokio::test]
async fn test_empty_segment_sections() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Key1::Key3", "ValueInMem3")])
        .build()
        .await
        .unwrap();

    let top = config.children();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].key(), "Key1");

    let mid = top[0].children();
    assert_eq!(mid.len(), 1);
    assert_eq!(mid[0].key(), "");

    let leaf = mid[0].children();
    assert_eq!(leaf.len(), 1);
    assert_eq!(leaf[0].key(), "Key3");
    assert_eq!(leaf[0].value().as_deref(), Some("ValueInMem3"));
}

#[tokio::test]
async fn test_children_deduplicate_across_providers() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("App:Name", "a"), ("App:Port", "1")])
        .add_in_memory([("app:name", "b"), ("app:extra", "c")])
        .build()
        .await
        .unwrap();

    let keys: Vec<String> = config
        .section("App")
        .children()
        .iter()
        .map(|child| child.key().to_owned())
        .collect();
    assert_eq!(keys, vec!["extra", "Name", "Port"]);
}

#[tokio::test]
async fn test_section_existence() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Has:Value", "v")])
        .build()
        .await
        .unwrap();
    config.set("NullLeaf", None).unwrap();

    // Value present.
    assert!(config.section("Has:Value").exists());
    // Branch with a child but no own value.
    assert!(config.section("Has").exists());
    // Null value and no children.
    assert!(!config.section("NullLeaf").exists());
    // Entirely absent.
    assert!(!config.section("Missing").exists());
}

#[tokio::test]
async fn test_required_section() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("App:Name", "demo")])
        .build()
        .await
        .unwrap();

    assert!(config.required_section("App").is_ok());
    let err = config.required_section("Nope").unwrap_err();
    assert!(matches!(err, ConfigurationError::SectionNotFound(_)));
}

#[tokio::test]
async fn test_section_structural_equality() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("A:B", "v")])
        .build()
        .await
        .unwrap();

    assert_eq!(config.section("A"), config.section("A"));
    assert_ne!(config.section("A"), config.section("A:B"));

    let other = ConfigurationBuilder::new()
        .add_in_memory([("A:B", "v")])
        .build()
        .await
        .unwrap();
    assert_ne!(config.section("A"), other.section("A"));
}

#[tokio::test]
async fn test_chained_configuration() {
    let inner = ConfigurationBuilder::new()
        .add_in_memory([("Mem1:KeyInMem1", "ValueInMem1")])
        .add_in_memory([("Mem2:KeyInMem2", "ValueInMem2")])
        .build()
        .await
        .unwrap();

    let chained = ConfigurationBuilder::new()
        .add_chained(inner)
        .add_in_memory([("Extra", "on-top")])
        .build()
        .await
        .unwrap();

    assert_eq!(
        chained.get("mem1:keyinmem1").as_deref(),
        Some("ValueInMem1")
    );
    assert_eq!(
        chained.get("Mem2:KeyInMem2").as_deref(),
        Some("ValueInMem2")
    );
    assert_eq!(chained.get("Extra").as_deref(), Some("on-top"));
    assert_eq!(chained.get("NotExist"), None);

    let keys: Vec<String> = chained
        .children()
        .iter()
        .map(|child| child.key().to_owned())
        .collect();
    assert_eq!(keys, vec!["Extra", "Mem1", "Mem2"]);
}

#[tokio::test]
async fn test_entries_walk_the_whole_tree() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("A:B", "ab"), ("A:C:D", "acd"), ("E", "e")])
        .build()
        .await
        .unwrap();

    let walked: Vec<(String, Option<String>)> = entries(&config).collect();
    assert_eq!(
        walked,
        vec![
            ("A".to_owned(), None),
            ("A:B".to_owned(), Some("ab".to_owned())),
            ("A:C".to_owned(), None),
            ("A:C:D".to_owned(), Some("acd".to_owned())),
            ("E".to_owned(), Some("e".to_owned())),
        ]
    );
}

#[tokio::test]
async fn test_relative_entries_trim_the_section_prefix() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("App:Db:Host", "h"), ("App:Name", "n")])
        .build()
        .await
        .unwrap();

    let section = config.section("App");
    let walked: Vec<String> = cfgtree::entries_relative(&section)
        .map(|(key, _)| key)
        .collect();
    assert_eq!(walked, vec!["Db", "Db:Host", "Name"]);
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct ServerSettings {
    host: String,
    port: u16,
    debug: bool,
    tags: Vec<String>,
}

#[tokio::test]
async fn test_bind_typed_settings() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([
            ("Server:Host", "localhost"),
            ("Server:Port", "8080"),
            ("Server:Debug", "true"),
            ("Server:Tags:0", "primary"),
            ("Server:Tags:1", "edge"),
        ])
        .build()
        .await
        .unwrap();

    let settings: ServerSettings = bind(&config.section("Server")).unwrap();
    assert_eq!(
        settings,
        ServerSettings {
            host: "localhost".to_owned(),
            port: 8080,
            debug: true,
            tags: vec!["primary".to_owned(), "edge".to_owned()],
        }
    );
}

#[tokio::test]
async fn test_bind_failure_carries_section_path() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("Server:Port", "not-a-number")])
        .build()
        .await
        .unwrap();

    let err = bind::<ServerSettings>(&config.section("Server")).unwrap_err();
    match err {
        ConfigurationError::Parse { path, .. } => assert_eq!(path, "Server"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_env_snapshot_layering() {
    let config = ConfigurationBuilder::new()
        .add_in_memory([("App:Port", "1000")])
        .add_env_snapshot([("APP__PORT", "2000"), ("IGNORED", "x")])
        .build()
        .await
        .unwrap();

    assert_eq!(config.get("App:Port").as_deref(), Some("2000"));
    assert_eq!(config.get("IGNORED"), None);
}

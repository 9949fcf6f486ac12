//! Tests for the path-addressed document operations.

#[cfg(test)]
mod tests {
    use crate::document::{ContentType, Document, DocumentError};
    use crate::path::Separator;
    use crate::value::{from_json, Map, Value};
    use pretty_assertions::assert_eq;

    fn doc(json: &str) -> Document {
        Document::new(from_json(json).unwrap())
    }

    fn json(s: &str) -> Value {
        from_json(s).unwrap()
    }

    const DEPLOYMENT: &str = r#"{
        "kind": "DeploymentConfig",
        "spec": {
            "replicas": 1,
            "template": {
                "spec": {
                    "containers": [
                        {
                            "name": "router",
                            "env": [
                                {"name": "ROUTER_SERVICE_NAME", "value": "router"},
                                {"name": "STATS_PASSWORD", "value": "secret"}
                            ],
                            "ports": [{"containerPort": 80}]
                        }
                    ]
                }
            }
        }
    }"#;

    #[test]
    fn test_get_nested_key_and_index() {
        let d = doc(DEPLOYMENT);
        assert_eq!(
            d.get("spec.template.spec.containers[0].name").unwrap(),
            Some(&Value::from("router"))
        );
        assert_eq!(
            d.get("spec.template.spec.containers[0].env[1].value").unwrap(),
            Some(&Value::from("secret"))
        );
    }

    #[test]
    fn test_get_root() {
        let d = doc(r#"{"a": 1}"#);
        assert_eq!(d.get("").unwrap(), Some(&json(r#"{"a": 1}"#)));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let d = doc(DEPLOYMENT);
        assert_eq!(d.get("spec.missing.deeper").unwrap(), None);
        assert_eq!(d.get("spec.template.spec.containers[1]").unwrap(), None);
        assert_eq!(d.get("spec.replicas.value").unwrap(), None);
        assert_eq!(d.get("spec[0]").unwrap(), None);
    }

    #[test]
    fn test_get_negative_index() {
        let d = doc(r#"{"a": [1, 2, 3]}"#);
        assert_eq!(d.get("a[-1]").unwrap(), Some(&Value::Int(3)));
        assert_eq!(d.get("a[-3]").unwrap(), Some(&Value::Int(1)));
        assert_eq!(d.get("a[-4]").unwrap(), None);
    }

    #[test]
    fn test_oversized_index_is_not_found() {
        let mut d = doc(r#"{"a": [1]}"#);
        assert_eq!(d.get("a[99999999999999999999]").unwrap(), None);
        assert_eq!(d.get("a[-99999999999999999999]").unwrap(), None);
        assert!(!d.put("a[99999999999999999999]", Value::Int(2)).unwrap());
        assert!(!d.remove("a[-99999999999999999999]").unwrap());
        assert_eq!(d.root(), &json(r#"{"a": [1]}"#));
    }

    #[test]
    fn test_get_invalid_path_errors() {
        let d = doc(DEPLOYMENT);
        assert!(matches!(
            d.get("spec..replicas"),
            Err(DocumentError::InvalidPath(_))
        ));
        assert!(matches!(d.get("spec.re plicas"), Err(DocumentError::InvalidPath(_))));
    }

    #[test]
    fn test_put_round_trip_and_noop() {
        let mut d = doc(DEPLOYMENT);
        let value = json(r#"{"intervalSeconds": 1, "maxSurge": "50%"}"#);

        assert!(d.put("spec.strategy.rollingParams", value.clone()).unwrap());
        assert_eq!(d.get("spec.strategy.rollingParams").unwrap(), Some(&value));

        assert!(!d.put("spec.strategy.rollingParams", value).unwrap());
    }

    #[test]
    fn test_put_vivifies_intermediate_maps() {
        let mut d = Document::default();
        assert!(d
            .put("spec.template.spec.containers", Value::List(vec![]))
            .unwrap());
        assert_eq!(
            d.root(),
            &json(r#"{"spec": {"template": {"spec": {"containers": []}}}}"#)
        );
    }

    #[test]
    fn test_put_replaces_null_intermediate() {
        let mut d = doc(r#"{"a": null}"#);
        assert!(d.put("a.b", Value::Int(1)).unwrap());
        assert_eq!(d.root(), &json(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_put_through_scalar_is_refused() {
        let mut d = doc(DEPLOYMENT);
        let before = d.clone();
        assert!(!d.put("spec.replicas.count", Value::Int(2)).unwrap());
        assert_eq!(d, before);
    }

    #[test]
    fn test_put_by_index_overwrites_but_never_appends() {
        let mut d = doc(r#"{"a": [1, 2]}"#);
        assert!(d.put("a[1]", Value::Int(5)).unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json("[1, 5]")));

        assert!(!d.put("a[2]", Value::Int(9)).unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json("[1, 5]")));
    }

    #[test]
    fn test_put_through_missing_index_is_refused() {
        let mut d = doc(r#"{"a": []}"#);
        assert!(!d.put("a[0].b", Value::Int(1)).unwrap());
        assert_eq!(d.root(), &json(r#"{"a": []}"#));
    }

    #[test]
    fn test_failed_put_leaves_no_partial_vivification() {
        let mut d = doc(r#"{"a": {"x": 1}}"#);
        assert!(!d.put("a.new.deeper[0]", Value::Int(1)).unwrap());
        assert_eq!(d.root(), &json(r#"{"a": {"x": 1}}"#));
    }

    #[test]
    fn test_put_with_custom_separator() {
        let mut d = Document::default().with_separator(Separator::Hash);
        assert!(d
            .put("metadata#annotations#router.openshift.io/haproxy", Value::from("on"))
            .unwrap());
        assert_eq!(
            d.root(),
            &json(r#"{"metadata": {"annotations": {"router.openshift.io/haproxy": "on"}}}"#)
        );
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let mut d = doc(DEPLOYMENT);
        assert!(d.remove("spec.template.spec.containers[0].env[0]").unwrap());
        assert_eq!(
            d.get("spec.template.spec.containers[0].env[0].name").unwrap(),
            Some(&Value::from("STATS_PASSWORD"))
        );

        assert!(d.remove("spec.replicas").unwrap());
        assert_eq!(d.get("spec.replicas").unwrap(), None);
    }

    #[test]
    fn test_remove_index_zero() {
        let mut d = doc(r#"{"a": ["first", "second"]}"#);
        assert!(d.remove("a[0]").unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json(r#"["second"]"#)));
    }

    #[test]
    fn test_remove_missing() {
        let mut d = doc(DEPLOYMENT);
        assert!(!d.remove("spec.nothing").unwrap());
        assert!(!d.remove("spec.nothing.below").unwrap());
        assert!(!d.remove("spec.template.spec.containers[4]").unwrap());
    }

    #[test]
    fn test_remove_root_clears() {
        let mut d = doc(DEPLOYMENT);
        assert!(d.remove("").unwrap());
        assert_eq!(d.root(), &Value::Map(Map::new()));
    }

    #[test]
    fn test_pop_key_and_item() {
        let mut d = doc(r#"{"m": {"a": 1, "b": 2}, "l": ["x", "y", "x"]}"#);
        assert!(d.pop("m", &Value::from("a")).unwrap());
        assert!(!d.pop("m", &Value::from("a")).unwrap());
        assert!(d.pop("l", &Value::from("x")).unwrap());
        assert_eq!(d.root(), &json(r#"{"m": {"b": 2}, "l": ["y", "x"]}"#));
    }

    #[test]
    fn test_append_creates_list() {
        let mut d = doc(r#"{"spec": {}}"#);
        assert!(d.append("spec.items", Value::Int(1)).unwrap());
        assert!(d.append("spec.items", Value::Int(1)).unwrap());
        assert_eq!(d.get("spec.items").unwrap(), Some(&json("[1, 1]")));
    }

    #[test]
    fn test_append_to_non_list_fails() {
        let mut d = doc(r#"{"spec": {"replicas": 1}}"#);
        assert!(!d.append("spec.replicas", Value::Int(1)).unwrap());
        assert!(!d.append("spec", Value::Int(1)).unwrap());
    }

    #[test]
    fn test_update_list_already_present_is_noop() {
        let mut d = doc(r#"{"a": [1, 2]}"#);
        assert!(!d.update("a", Value::Int(2), None, None).unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json("[1, 2]")));
    }

    #[test]
    fn test_update_list_absent_value_appends() {
        let mut d = doc(r#"{"a": [1, 2]}"#);
        assert!(d.update("a", Value::Int(3), None, None).unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json("[1, 2, 3]")));
    }

    #[test]
    fn test_update_list_by_index_replaces() {
        let mut d = doc(r#"{"a": [1, 2]}"#);
        assert!(d.update("a", Value::Int(7), Some(0), None).unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json("[7, 2]")));

        assert!(!d.update("a", Value::Int(7), Some(0), None).unwrap());
    }

    #[test]
    fn test_update_list_index_out_of_range() {
        let mut d = doc(r#"{"a": [1]}"#);
        assert!(matches!(
            d.update("a", Value::Int(7), Some(3), None),
            Err(DocumentError::IndexOutOfRange { index: 3, len: 1, .. })
        ));
    }

    #[test]
    fn test_update_list_by_current_value() {
        let mut d = doc(r#"{"env": [{"name": "A", "value": "1"}, {"name": "B", "value": "2"}]}"#);
        let current = json(r#"{"name": "B", "value": "2"}"#);
        let replacement = json(r#"{"name": "B", "value": "3"}"#);

        assert!(d
            .update("env", replacement.clone(), None, Some(&current))
            .unwrap());
        assert_eq!(d.get("env[1]").unwrap(), Some(&replacement));

        assert!(!d
            .update("env", json(r#"{"name": "C"}"#), None, Some(&current))
            .unwrap());
        assert_eq!(d.get("env").unwrap().and_then(Value::as_list).map(Vec::len), Some(2));
    }

    #[test]
    fn test_update_map_merges() {
        let mut d = doc(r#"{"limits": {"cpu": "1", "memory": "1G"}}"#);
        assert!(d
            .update("limits", json(r#"{"memory": "2G"}"#), None, None)
            .unwrap());
        assert_eq!(
            d.get("limits").unwrap(),
            Some(&json(r#"{"cpu": "1", "memory": "2G"}"#))
        );
    }

    #[test]
    fn test_update_map_with_scalar_is_type_mismatch() {
        let mut d = doc(r#"{"limits": {"cpu": "1"}}"#);
        assert!(matches!(
            d.update("limits", Value::from("2G"), None, None),
            Err(DocumentError::TypeMismatch { .. })
        ));
        assert_eq!(d.get("limits").unwrap(), Some(&json(r#"{"cpu": "1"}"#)));
    }

    #[test]
    fn test_update_missing_target_is_unchanged() {
        let mut d = doc(r#"{}"#);
        assert!(!d.update("a.b", Value::Int(1), None, None).unwrap());
    }

    #[test]
    fn test_exists() {
        let d = doc(r#"{"l": [1, 2], "m": {"a": 1, "b": 2}, "s": "x"}"#);
        assert!(d.exists("l", &Value::Int(2)).unwrap());
        assert!(!d.exists("l", &Value::Int(3)).unwrap());

        assert!(d.exists("m", &json(r#"{"a": 1}"#)).unwrap());
        assert!(!d.exists("m", &json(r#"{"a": 2}"#)).unwrap());
        assert!(!d.exists("m", &json(r#"{"c": 1}"#)).unwrap());
        assert!(d.exists("m", &Value::from("b")).unwrap());

        assert!(d.exists("s", &Value::from("x")).unwrap());
        assert!(!d.exists("missing", &Value::from("x")).unwrap());
    }

    #[test]
    fn test_write_and_reload_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("router.yml");

        let mut d = Document::open(&file, ContentType::Yaml).unwrap();
        assert!(d.put("spec.replicas", Value::Int(2)).unwrap());
        d.write().unwrap();

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.contains("replicas: 2"));
        assert!(!dir.path().join("router.yml.yedit").exists());

        let reloaded = Document::open(&file, ContentType::Yaml).unwrap();
        assert_eq!(reloaded.get("spec.replicas").unwrap(), Some(&Value::Int(2)));
    }

    #[test]
    fn test_write_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("svc.json");
        std::fs::write(&file, r#"{"a": 1}"#).unwrap();

        let mut d = Document::open(&file, ContentType::Json)
            .unwrap()
            .with_backup(true);
        d.put("a", Value::Int(2)).unwrap();
        d.write().unwrap();

        let backup = std::fs::read_to_string(dir.path().join("svc.json.orig")).unwrap();
        assert_eq!(from_json(&backup).unwrap(), json(r#"{"a": 1}"#));
        let current = std::fs::read_to_string(&file).unwrap();
        assert_eq!(from_json(&current).unwrap(), json(r#"{"a": 2}"#));
    }

    #[test]
    fn test_create_only_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("new.yml");

        let mut fresh = Document::open(&file, ContentType::Yaml).unwrap();
        assert!(fresh.create("a", Value::Int(1)).unwrap());
        fresh.write().unwrap();

        let mut existing = Document::open(&file, ContentType::Yaml).unwrap();
        assert!(!existing.create("b", Value::Int(1)).unwrap());
    }

    #[test]
    fn test_write_without_filename_fails() {
        let d = Document::default();
        assert!(matches!(d.write(), Err(DocumentError::MissingFilename)));
    }
}

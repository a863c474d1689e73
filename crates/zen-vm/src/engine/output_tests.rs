use std::sync::Arc;

use indexmap::IndexMap;
use indoc::indoc;
use serde_json::json;
use zen_core::Colors;

use super::{Heap, LoadedClass, Output, RuntimeError, Value};

fn point() -> Output {
    Output::Object {
        class: "geo/Point".into(),
        fields: vec![
            ("x".into(), Output::Int(1)),
            (
                "tags".into(),
                Output::Array(vec![Output::String("a".into()), Output::Null]),
            ),
            ("empty".into(), Output::Map(vec![])),
        ],
    }
}

#[test]
fn values_copy_out_of_the_heap() {
    let mut heap = Heap::new();
    let inner = heap.alloc_array(vec![Value::Long(2)]);
    let shared = heap.alloc_array(vec![inner.clone(), inner]);
    let mut fields = IndexMap::new();
    fields.insert("items".to_string(), shared);
    let object = heap.alloc_instance(Arc::new(LoadedClass::builtin("app/Box", &[])), fields);

    let output = Output::from_value(&heap, &object);

    let pair = Output::Array(vec![Output::Long(2)]);
    assert_eq!(
        output,
        Output::Object {
            class: "app/Box".into(),
            fields: vec![("items".into(), Output::Array(vec![pair.clone(), pair]))],
        }
    );
}

#[test]
fn cycles_are_cut() {
    let mut heap = Heap::new();
    let list = heap.alloc_array(vec![Value::Null]);
    heap.store_element(&list, Value::Int(0), list.clone()).unwrap();

    let output = Output::from_value(&heap, &list);

    assert_eq!(output, Output::Array(vec![Output::Cycle]));
    assert_eq!(output.to_string(), r#"["<cycle>"]"#);
}

#[test]
fn outputs_rebuild_on_another_heap() {
    let original = Output::Map(vec![(
        Output::String("xs".into()),
        Output::Array(vec![Output::Int(1), Output::Double(0.5)]),
    )]);
    let mut heap = Heap::new();

    let value = original.clone().into_value(&mut heap).unwrap();

    assert!(matches!(value, Value::Map(_)));
    assert_eq!(heap.len(), 2);
    assert_eq!(Output::from_value(&heap, &value), original);
}

#[test]
fn objects_do_not_cross_threads() {
    let err = point().into_value(&mut Heap::new()).unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::TypeMismatch { operation: "thread argument", found: "object" }
    ));
}

#[test]
fn serializes_as_json() {
    let map = Output::Map(vec![
        (Output::Int(1), Output::String("one".into())),
        (Output::Null, Output::Cycle),
    ]);

    assert_eq!(
        serde_json::to_value(point()).unwrap(),
        json!({"$class": "geo/Point", "x": 1, "tags": ["a", null], "empty": {}})
    );
    assert_eq!(
        serde_json::to_value(map).unwrap(),
        json!({"1": "one", "null": "<cycle>"})
    );
    assert_eq!(serde_json::to_value(Output::Double(f64::NAN)).unwrap(), json!(null));
}

#[test]
fn formats_pretty_json() {
    assert_eq!(
        point().format(true, Colors::OFF),
        indoc! {r#"
            {
              "$class": "geo/Point",
              "x": 1,
              "tags": [
                "a",
                null
              ],
              "empty": {}
            }"#}
    );
}

#[test]
fn formats_compact_json_with_colors() {
    assert_eq!(
        Output::String("a\"b".into()).format(false, Colors::ON),
        "\x1b[32m\"a\\\"b\"\x1b[0m"
    );
    assert_eq!(
        Output::Array(vec![Output::Int(1), Output::Null]).format(false, Colors::ON),
        "\x1b[2m[\x1b[0m1\x1b[2m,\x1b[0m\x1b[2mnull\x1b[0m\x1b[2m]\x1b[0m"
    );
    assert_eq!(
        point().to_string(),
        r#"{"$class":"geo/Point","x":1,"tags":["a",null],"empty":{}}"#
    );
}

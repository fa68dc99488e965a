use std::thread;

use registry::{
    memoize, model_converter, model_ref, model_schema, ConverterRegistry, ConverterRegistryReader,
};
use schema::{Converter, FieldSchema, Model, ModelInstance, ModelSchema};

/// Helper model that refers to itself through `children`.
struct TreeNode {
    label: Option<String>,
}

impl Model for TreeNode {
    fn schema() -> ModelSchema {
        ModelSchema::new(
            "TreeNode",
            vec![
                FieldSchema::required("label", Converter::string()),
                FieldSchema::optional("children", Converter::list_of(model_ref::<TreeNode>())),
            ],
        )
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(instance: &ModelInstance) -> Self { Self { label: instance.value("label") } }

    fn to_instance(&self) -> ModelInstance {
        let mut instance = ModelInstance::new(model_schema::<Self>());
        instance.put("label", self.label.as_ref());
        instance
    }
}

struct Leaf;

impl Model for Leaf {
    fn schema() -> ModelSchema {
        ModelSchema::new("Leaf", vec![FieldSchema::optional("weight", Converter::float())])
    }

    fn converter() -> &'static Converter { model_converter::<Self>() }

    fn from_instance(_: &ModelInstance) -> Self { Leaf }

    fn to_instance(&self) -> ModelInstance { ModelInstance::new(model_schema::<Self>()) }
}

#[test]
fn test_model_converter_is_memoized() {
    let first = TreeNode::converter();
    let second = TreeNode::converter();
    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(model_schema::<TreeNode>(), model_schema::<TreeNode>()));
}

#[test]
fn test_recursive_schema_resolves_lazily() {
    let schema = model_schema::<TreeNode>();
    let children = schema.field("children").expect("children field declared");
    match &children.converter {
        Converter::ListOf(container) => match container.inner.as_ref() {
            Converter::Model(reference) => assert_eq!(reference.name(), "TreeNode"),
            other => panic!("expected model converter, got {:?}", other.kind_name()),
        },
        other => panic!("expected list converter, got {:?}", other.kind_name()),
    }
}

#[test]
fn test_reader_lists_registered_models() {
    let _ = Leaf::converter();
    let _ = TreeNode::converter();
    let registry = ConverterRegistry::global();

    assert!(registry.model_count() >= 2);
    assert!(registry.list_models().contains(&"Leaf"));
    assert_eq!(registry.get_model("TreeNode").map(|schema| schema.name), Some("TreeNode"));
    assert!(registry.get_model("Nonexistent").is_none());

    let models = registry.list_models();
    let mut sorted = models.clone();
    sorted.sort();
    assert_eq!(models, sorted);
}

#[test]
fn test_memoize_builds_once_per_type() {
    struct Amount;
    let first = memoize::<Amount>(|| Converter::union_of([Converter::int(), Converter::string()]));
    let second = memoize::<Amount>(|| panic!("converter should already be memoized"));
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_concurrent_first_use_yields_one_converter() {
    struct Concurrent;
    impl Model for Concurrent {
        fn schema() -> ModelSchema { ModelSchema::new("Concurrent", vec![]) }
        fn converter() -> &'static Converter { model_converter::<Self>() }
        fn from_instance(_: &ModelInstance) -> Self { Concurrent }
        fn to_instance(&self) -> ModelInstance { ModelInstance::new(model_schema::<Self>()) }
    }

    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| Concurrent::converter() as *const Converter as usize))
        .collect();
    let addresses: Vec<usize> =
        handles.into_iter().map(|handle| handle.join().expect("thread panicked")).collect();
    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
}

//! End-to-end pipeline tests: decode, prune, assemble, render

use std::collections::BTreeMap;

use hclgen_core::{
    AttributeSchema, BlockSchema, Document, Nesting, Resource, TypeKind, Value,
    output_references, provider_document, render, render_resources,
};
use indexmap::IndexMap;

fn bag(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn instance_schema() -> BlockSchema {
    BlockSchema::new()
        .with_attribute("ami", AttributeSchema::new(TypeKind::String))
        .with_attribute("description", AttributeSchema::new(TypeKind::String).optional())
        .with_attribute("instance_type", AttributeSchema::new(TypeKind::String).optional())
        .with_attribute("monitoring", AttributeSchema::new(TypeKind::Bool).optional())
        .with_attribute(
            "subnet_ids",
            AttributeSchema::new(TypeKind::List(Box::new(TypeKind::String))).optional(),
        )
        .with_attribute(
            "tags",
            AttributeSchema::new(TypeKind::Map(Box::new(TypeKind::String))).optional(),
        )
        .with_block(
            "root_block_device",
            Nesting::List,
            BlockSchema::new()
                .with_attribute("volume_size", AttributeSchema::new(TypeKind::Int).optional())
                .with_attribute("volume_type", AttributeSchema::new(TypeKind::String).optional()),
        )
}

fn instance(name: &str, attributes: BTreeMap<String, String>) -> Resource {
    let mut resource = Resource::new(
        "i-1234",
        name,
        "aws_instance",
        "aws",
        attributes,
        vec![],
        IndexMap::new(),
    );
    resource.decode_state(&instance_schema()).unwrap();
    resource
}

#[test]
fn test_full_resource_pipeline() {
    let resource = instance(
        "web",
        bag(&[
            ("ami", "ami-123"),
            ("description", ""),
            ("instance_type", "t2.micro"),
            ("monitoring", "true"),
            ("subnet_ids.#", "2"),
            ("subnet_ids.0", "subnet-b"),
            ("subnet_ids.1", "subnet-a"),
            ("tags.%", "2"),
            ("tags.env", "prod"),
            ("tags.Name", "web"),
            ("root_block_device.#", "1"),
            ("root_block_device.0.volume_size", "50"),
            ("root_block_device.0.volume_type", "gp2"),
        ]),
    );

    let bytes = render_resources(&[resource], IndexMap::new(), "hcl", true).unwrap();
    let expected = concat!(
        "resource \"aws_instance\" \"tfer--web\" {\n",
        "  ami           = \"ami-123\"\n",
        "  instance_type = \"t2.micro\"\n",
        "  monitoring    = true\n",
        "  root_block_device {\n",
        "    volume_size = 50\n",
        "    volume_type = \"gp2\"\n",
        "  }\n",
        "  subnet_ids = [\"subnet-a\", \"subnet-b\"]\n",
        "  tags = {\n",
        "    Name = \"web\"\n",
        "    env  = \"prod\"\n",
        "  }\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_rendering_is_idempotent() {
    let make = || {
        instance(
            "web",
            bag(&[("ami", "ami-123"), ("tags.%", "1"), ("tags.env", "prod")]),
        )
    };
    let first = render_resources(&[make()], IndexMap::new(), "hcl", true).unwrap();
    let second = render_resources(&[make()], IndexMap::new(), "hcl", true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sort_is_stable_under_input_permutation() {
    let web = instance("web", bag(&[("ami", "ami-123")]));
    let db = instance("db", bag(&[("ami", "ami-456")]));

    let forward =
        render_resources(&[web.clone(), db.clone()], IndexMap::new(), "hcl", true).unwrap();
    let backward = render_resources(&[db, web], IndexMap::new(), "hcl", true).unwrap();

    let expected = concat!(
        "resource \"aws_instance\" \"tfer--db\" {\n",
        "  ami = \"ami-456\"\n",
        "}\n",
        "\n",
        "resource \"aws_instance\" \"tfer--web\" {\n",
        "  ami = \"ami-123\"\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(forward.clone()).unwrap(), expected);
    assert_eq!(forward, backward);
}

#[test]
fn test_ordering_hint_preserves_source_order() {
    let schema = BlockSchema::new()
        .with_attribute("name", AttributeSchema::new(TypeKind::String).optional())
        .with_block(
            "build",
            Nesting::List,
            BlockSchema::new()
                .with_attribute("timeout", AttributeSchema::new(TypeKind::String).optional())
                .with_block(
                    "step",
                    Nesting::List,
                    BlockSchema::new()
                        .with_attribute("name", AttributeSchema::new(TypeKind::String).optional()),
                ),
        );

    let mut resource = Resource::new(
        "trigger-1",
        "build",
        "google_cloudbuild_trigger",
        "google",
        bag(&[
            ("name", "trigger"),
            ("build.#", "1"),
            ("build.0.timeout", "600s"),
            ("build.0.step.#", "2"),
            ("build.0.step.0.name", "z-step"),
            ("build.0.step.1.name", "a-step"),
        ]),
        vec![],
        IndexMap::new(),
    );
    resource.preserve_order = vec!["build.step".to_string()];
    resource.decode_state(&schema).unwrap();

    let bytes = render_resources(&[resource], IndexMap::new(), "hcl", true).unwrap();
    let expected = concat!(
        "resource \"google_cloudbuild_trigger\" \"tfer--build\" {\n",
        "  build {\n",
        "    step {\n",
        "      name = \"z-step\"\n",
        "    }\n",
        "    step {\n",
        "      name = \"a-step\"\n",
        "    }\n",
        "    timeout = \"600s\"\n",
        "  }\n",
        "  name = \"trigger\"\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_heredoc_round_trip() {
    let schema = BlockSchema::new()
        .with_attribute("name", AttributeSchema::new(TypeKind::String).optional())
        .with_attribute("policy", AttributeSchema::new(TypeKind::String));

    let mut resource = Resource::new(
        "policy-1",
        "policy",
        "aws_iam_policy",
        "aws",
        bag(&[("name", "p"), ("policy", "<<EOF\n{\"a\":1}\nEOF")]),
        vec![],
        IndexMap::new(),
    );
    resource.decode_state(&schema).unwrap();

    let bytes = render_resources(&[resource], IndexMap::new(), "hcl", true).unwrap();
    let expected = concat!(
        "resource \"aws_iam_policy\" \"tfer--policy\" {\n",
        "  name = \"p\"\n",
        "  policy = <<EOF\n",
        "{\n",
        "  \"a\": 1\n",
        "}\n",
        "EOF\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_map_stays_assignment_singleton_becomes_block() {
    let resource = instance(
        "web",
        bag(&[
            ("ami", "ami-123"),
            ("tags.%", "1"),
            ("tags.env", "prod"),
            ("root_block_device.#", "1"),
            ("root_block_device.0.volume_size", "50"),
        ]),
    );

    let bytes = render_resources(&[resource], IndexMap::new(), "hcl", true).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("  root_block_device {\n"), "{text}");
    assert!(text.contains("  tags = {\n"), "{text}");
    assert!(text.contains("env = \"prod\""), "{text}");
}

#[test]
fn test_decode_prune_round_trip_removes_only_optional_zeros() {
    let schema = BlockSchema::new()
        .with_attribute("ami", AttributeSchema::new(TypeKind::String))
        .with_attribute("description", AttributeSchema::new(TypeKind::String).optional())
        .with_attribute("cpu_count", AttributeSchema::new(TypeKind::Int).optional())
        .with_attribute(
            "tags",
            AttributeSchema::new(TypeKind::Map(Box::new(TypeKind::String))).optional(),
        );

    let mut resource = Resource::new(
        "i-1",
        "web",
        "aws_instance",
        "aws",
        bag(&[
            ("ami", "ami-123"),
            ("description", ""),
            ("cpu_count", "0"),
            ("tags.%", "0"),
        ]),
        vec![],
        IndexMap::new(),
    );
    resource.decode_state(&schema).unwrap();

    let item = resource.item.as_ref().unwrap().as_map().unwrap();
    assert_eq!(item.len(), 1);
    assert_eq!(item["ami"], Value::from("ami-123"));
}

#[test]
fn test_duplicate_resource_names_render_once() {
    let first = instance("web", bag(&[("ami", "ami-first")]));
    let second = instance("web", bag(&[("ami", "ami-second")]));

    let bytes = render_resources(&[first, second], IndexMap::new(), "hcl", true).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.matches("resource \"aws_instance\"").count(), 1);
    assert!(text.contains("ami-first"));
    assert!(!text.contains("ami-second"));
}

#[test]
fn test_provider_document_rendering() {
    let mut provider_data = IndexMap::new();
    provider_data.insert("project".to_string(), Value::from("my-proj"));
    let document = provider_document("google", "~> 4.0", Some("hashicorp/google"), provider_data);

    let bytes = render(&document, "hcl", true).unwrap();
    let expected = concat!(
        "provider \"google\" {\n",
        "  project = \"my-proj\"\n",
        "}\n",
        "terraform {\n",
        "  required_providers {\n",
        "    google = {\n",
        "      source  = \"hashicorp/google\"\n",
        "      version = \"~> 4.0\"\n",
        "    }\n",
        "  }\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_output_references_rendering() {
    let mut resource = Resource::new_simple("i-1", "web", "aws_instance", "aws", vec![]);
    resource.attributes.insert("id".to_string(), "i-1".to_string());

    let outputs = output_references(&[resource]);
    let mut data = IndexMap::new();
    data.insert("output".to_string(), Value::Map(outputs));
    let bytes = render(&Document::from_data(data), "hcl", true).unwrap();

    let expected = concat!(
        "output \"aws_instance_tfer--web_id\" {\n",
        "  value = \"${aws_instance.tfer--web.id}\"\n",
        "}\n",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_json_format_bypasses_canonicalization() {
    let resource = instance("web", bag(&[("ami", "ami-123")]));
    let bytes = render_resources(&[resource], IndexMap::new(), "json", true).unwrap();
    let expected = concat!(
        "{\n",
        "  \"resource\": {\n",
        "    \"aws_instance\": {\n",
        "      \"tfer--web\": {\n",
        "        \"ami\": \"ami-123\"\n",
        "      }\n",
        "    }\n",
        "  }\n",
        "}",
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[test]
fn test_failed_decode_is_isolated_to_that_resource() {
    let schema = instance_schema();
    let good = instance("web", bag(&[("ami", "ami-123")]));
    let mut bad = Resource::new(
        "i-2",
        "db",
        "aws_instance",
        "aws",
        bag(&[("ami", "ami-456"), ("monitoring", "maybe")]),
        vec![],
        IndexMap::new(),
    );
    let err = bad.decode_state(&schema).unwrap_err();
    assert!(err.is_recoverable());

    // the undecoded resource is skipped; the rest of the document renders
    let bytes = render_resources(&[good, bad], IndexMap::new(), "hcl", true).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("tfer--web"));
    assert!(!text.contains("tfer--db"));
}

#[test]
fn test_unknown_format_returns_no_partial_bytes() {
    let resource = instance("web", bag(&[("ami", "ami-123")]));
    let err = render_resources(&[resource], IndexMap::new(), "yaml", true).unwrap_err();
    assert_eq!(err.to_string(), "error: unknown output format 'yaml'");
}

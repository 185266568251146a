//! End-to-end tests of the compiler entry points.
mod common;
use common::*;
use kumitate::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

fn template_json() -> String {
    json!({
        "4": {"inputs": {"ckpt_name": "model.safetensors"}, "class_type": "CheckpointLoaderSimple"},
        "10": {
            "inputs": {"lora_name": "old.safetensors", "strength_model": 1.0, "model": ["4", 0]},
            "class_type": "LoraLoaderModelOnly",
            "mode": 4
        },
        "5": {"inputs": {"width": 512, "height": 512, "batch_size": 1}, "class_type": "EmptyLatentImage"},
        "6": {
            "inputs": {"text": "{{positive_prompt}}, highly detailed", "clip": ["4", 1]},
            "class_type": "CLIPTextEncode"
        },
        "3": {
            "inputs": {
                "seed": "{{seed}}", "steps": 20, "model": ["10", 0],
                "positive": ["6", 0], "latent_image": ["5", 0]
            },
            "class_type": "KSampler"
        }
    })
    .to_string()
}

#[cfg(test)]
mod compiler_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prepare_pipeline() {
        let compiler = create_test_compiler();
        let request: SubmissionRequest = serde_json::from_value(json!({
            "values": {"seed": 1234, "positive_prompt": "a fox"},
            "overrides": {"5": {"width": 1024}, "404": {"width": 1}},
            "modifiers": [{"name": "detail.safetensors", "strength": 0.8}]
        }))
        .unwrap();

        let compiled = compiler.prepare(&template_json(), &request).unwrap();
        assert!(compiled.warnings.is_empty(), "{:?}", compiled.warnings);

        let output: Value = serde_json::from_str(&compiled.content).unwrap();
        assert!(output.get("10").is_none(), "bypassed node must be removed");
        assert_eq!(output["3"]["inputs"]["model"], json!(["101", 0]));
        assert_eq!(output["101"]["inputs"]["model"], json!(["4", 0]));
        assert_eq!(output["101"]["class_type"], json!("LoraLoaderModelOnly"));
        assert_eq!(output["3"]["inputs"]["seed"], json!(1234));
        assert_eq!(output["6"]["inputs"]["text"], json!("a fox, highly detailed"));
        assert_eq!(output["5"]["inputs"]["width"], json!(1024));

        let workflow = Workflow::from_canonical_json(&compiled.content).unwrap();
        assert!(workflow.dangling_connections().is_empty());
    }

    #[test]
    fn test_prepare_with_empty_request_preserves_graph() {
        let compiler = create_test_compiler();
        let compiled = compiler
            .prepare(SIMPLE_CANONICAL_JSON, &SubmissionRequest::default())
            .unwrap();

        let output: Value = serde_json::from_str(&compiled.content).unwrap();
        let input: Value = serde_json::from_str(SIMPLE_CANONICAL_JSON).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_prepare_from_layout_collects_warnings() {
        let compiler = Compiler::new(Arc::new(NodeSchema::new()));
        let compiled = compiler
            .prepare(SIMPLE_LAYOUT_JSON, &SubmissionRequest::default())
            .unwrap();

        assert_eq!(compiled.warnings.len(), 6);
        assert!(compiled.warnings.iter().all(|w| w.contains("no schema available")));
    }

    #[test]
    fn test_prepare_extends_dual_path_chains() {
        let compiler = create_test_compiler();
        let text = create_dual_path_workflow().to_canonical_json().unwrap();
        let request = SubmissionRequest {
            high_noise_modifiers: vec![ModifierSelection::new("motion.safetensors", 1.0)],
            ..SubmissionRequest::default()
        };

        let compiled = compiler.prepare(&text, &request).unwrap();
        let output: Value = serde_json::from_str(&compiled.content).unwrap();

        assert_eq!(output["20"]["inputs"]["model"], json!(["101", 0]));
        assert_eq!(output["101"]["inputs"]["model"], json!(["10", 0]));
        assert_eq!(output["21"]["inputs"]["model"], json!(["11", 0]));
    }

    #[test]
    fn test_parse_error_returns_original_text() {
        let compiler = create_test_compiler();
        let broken = "{\"3\": {\"inputs\": ";

        let err = compiler
            .prepare(broken, &SubmissionRequest::default())
            .unwrap_err();

        assert!(matches!(err, CompileError::Parse { .. }));
        assert_eq!(err.original(), Some(broken));
        assert!(err.to_string().starts_with("Failed to parse workflow JSON"));
    }

    #[test]
    fn test_unrecognized_document() {
        let compiler = create_test_compiler();

        let err = compiler.parse("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CompileError::UnrecognizedFormat { .. }));

        let err = compiler.parse(r#"{"3": {"inputs": {}}}"#).unwrap_err();
        assert!(matches!(err, CompileError::UnrecognizedFormat { .. }));
    }

    #[test]
    fn test_canonical_node_without_class_type() {
        let err = Workflow::from_canonical_json(r#"{"3": {"inputs": {}}}"#).unwrap_err();
        match err {
            CompileError::InvalidNode { node_id, .. } => assert_eq!(node_id, "3"),
            other => panic!("expected InvalidNode, got {other:?}"),
        }
    }

    #[test]
    fn test_format_detection() {
        let compiler = create_test_compiler();
        assert_eq!(
            compiler.parse(SIMPLE_LAYOUT_JSON).unwrap().format,
            WorkflowFormat::Layout
        );
        assert_eq!(
            compiler.parse(SIMPLE_CANONICAL_JSON).unwrap().format,
            WorkflowFormat::Canonical
        );
    }

    #[test]
    fn test_canonical_extras_round_trip() {
        let mut workflow = Workflow::from_canonical_json(SIMPLE_CANONICAL_JSON).unwrap();
        workflow.groups.push(Group {
            id: 3,
            title: "Prompts".to_string(),
            member_node_ids: vec!["6".to_string(), "7".to_string()],
        });
        workflow.notes.push(Note {
            id: "40".to_string(),
            title: "Note".to_string(),
            content: "keep cfg low".to_string(),
        });
        workflow.node_mut("5").unwrap().mode = NodeMode::Muted;

        let text = workflow.to_canonical_json().unwrap();
        let reparsed = Workflow::from_canonical_json(&text).unwrap();

        assert_eq!(reparsed, workflow);
    }

    #[test]
    fn test_compiler_is_shared_across_threads() {
        let compiler = create_test_compiler();
        let request = SubmissionRequest {
            modifiers: vec![ModifierSelection::new("detail.safetensors", 0.8)],
            ..SubmissionRequest::default()
        };
        let expected = compiler.prepare(&template_json(), &request).unwrap();

        std::thread::scope(|scope| {
            let mut handles = Vec::new();
            for _ in 0..4 {
                handles.push(scope.spawn(|| compiler.prepare(&template_json(), &request)));
            }
            for handle in handles {
                assert_eq!(handle.join().unwrap().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_compiler_from_schema_cache() {
        let cache = SchemaCache::new(NodeSchema::new());
        let blind = Compiler::new(cache.snapshot());
        assert_eq!(blind.parse(SIMPLE_LAYOUT_JSON).unwrap().warnings.len(), 6);

        cache.replace(create_test_schema());
        let informed = Compiler::new(cache.snapshot());
        assert!(informed.parse(SIMPLE_LAYOUT_JSON).unwrap().warnings.is_empty());
        assert!(blind.schema().is_empty());
    }
}

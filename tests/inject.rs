//! Tests for modifier chain injection and dual-path chain extension.
mod common;
use common::*;
use kumitate::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn two_node_graph() -> Workflow {
    Workflow::new()
        .with_node(
            Node::new("1", "CheckpointLoaderSimple")
                .with_literal("ckpt_name", "model.safetensors")
                .with_output("MODEL", "MODEL")
                .with_output("CLIP", "CLIP")
                .with_output("VAE", "VAE"),
        )
        .with_node(Node::new("2", "KSampler").with_connection("model", "1", 0))
}

fn loras() -> Vec<ModifierSelection> {
    vec![
        ModifierSelection::new("detail.safetensors", 0.8),
        ModifierSelection::new("style.safetensors", 0.5),
    ]
}

/// Classifies samplers by their title instead of the start step.
#[derive(Debug)]
struct TitleConvention;

impl NoisePathConvention for TitleConvention {
    fn classify(&self, sampler: &Node) -> Option<NoisePath> {
        match sampler.title.as_deref()? {
            "Expert A" => Some(NoisePath::High),
            "Expert B" => Some(NoisePath::Low),
            _ => None,
        }
    }
}

#[cfg(test)]
mod inject_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fresh_chain_injection() {
        let compiler = create_test_compiler();
        let mut workflow = two_node_graph();

        assert!(compiler.inject_chain(&mut workflow, &loras()));

        assert_eq!(workflow.len(), 4);
        assert_eq!(workflow.node("2").unwrap().connection("model"), Some(("102", 0)));

        let first = workflow.node("101").expect("first modifier inserted");
        assert_eq!(first.class_type, "LoraLoaderModelOnly");
        assert_eq!(first.title.as_deref(), Some("Modifier: detail.safetensors"));
        assert_eq!(first.literal("lora_name"), Some(&json!("detail.safetensors")));
        assert_eq!(first.literal("strength_model"), Some(&json!(0.8)));
        assert_eq!(first.connection("model"), Some(("1", 0)));

        let second = workflow.node("102").unwrap();
        assert_eq!(second.connection("model"), Some(("101", 0)));
        assert_eq!(second.literal("strength_model"), Some(&json!(0.5)));
    }

    #[test]
    fn test_injection_only_moves_primary_output_consumers() {
        let compiler = create_test_compiler();
        let mut workflow = Workflow::from_canonical_json(SIMPLE_CANONICAL_JSON).unwrap();

        assert!(compiler.inject_chain(&mut workflow, &loras()[..1]));

        assert_eq!(workflow.node("3").unwrap().connection("model"), Some(("101", 0)));
        assert_eq!(workflow.node("6").unwrap().connection("clip"), Some(("4", 1)));
        assert_eq!(workflow.node("8").unwrap().connection("vae"), Some(("4", 2)));
        assert_eq!(workflow.node("101").unwrap().connection("model"), Some(("4", 0)));
    }

    #[test]
    fn test_injected_ids_follow_highest_existing_id() {
        let compiler = create_test_compiler();
        let mut workflow = two_node_graph().with_node(Node::new("250", "SaveImage"));

        assert!(compiler.inject_chain(&mut workflow, &loras()));

        assert!(workflow.contains("251"));
        assert!(workflow.contains("252"));
        assert_eq!(workflow.node("2").unwrap().connection("model"), Some(("252", 0)));
    }

    #[test]
    fn test_injection_noop_cases() {
        let compiler = create_test_compiler();

        let mut workflow = two_node_graph();
        assert!(!compiler.inject_chain(&mut workflow, &[]));
        assert_eq!(workflow, two_node_graph());

        let mut no_source = Workflow::new().with_node(Node::new("2", "KSampler"));
        let before = no_source.clone();
        assert!(!compiler.inject_chain(&mut no_source, &loras()));
        assert_eq!(no_source, before);

        let mut no_consumer =
            Workflow::new().with_node(Node::new("1", "CheckpointLoaderSimple").with_literal("ckpt_name", "a"));
        let before = no_consumer.clone();
        assert!(!compiler.inject_chain(&mut no_consumer, &loras()));
        assert_eq!(no_consumer, before);
    }

    #[test]
    fn test_model_source_priority() {
        let compiler = create_test_compiler();
        let mut workflow = Workflow::new()
            .with_node(Node::new("1", "UNETLoader").with_literal("unet_name", "unet.safetensors"))
            .with_node(Node::new("2", "CheckpointLoaderSimple").with_literal("ckpt_name", "ckpt"))
            .with_node(
                Node::new("3", "KSampler")
                    .with_connection("model", "2", 0)
                    .with_connection("unused_model", "1", 0),
            );

        assert!(compiler.inject_chain(&mut workflow, &loras()[..1]));

        let sampler = workflow.node("3").unwrap();
        assert_eq!(sampler.connection("model"), Some(("101", 0)));
        assert_eq!(sampler.connection("unused_model"), Some(("1", 0)));
    }

    #[test]
    fn test_custom_modifier_type() {
        let compiler = Compiler::builder(Arc::new(create_test_schema()))
            .with_modifier_type("LoraLoader", "lora", "strength", "model_in")
            .build();
        let mut workflow = two_node_graph();

        assert!(compiler.inject_chain(&mut workflow, &loras()[..1]));

        let modifier = workflow.node("101").unwrap();
        assert_eq!(modifier.class_type, "LoraLoader");
        assert_eq!(modifier.literal("lora"), Some(&json!("detail.safetensors")));
        assert_eq!(modifier.connection("model_in"), Some(("1", 0)));
    }

    #[test]
    fn test_high_noise_extension() {
        let compiler = create_test_compiler();
        let mut workflow = create_dual_path_workflow();

        let chain = [ModifierSelection::new("motion.safetensors", 1.0)];
        assert!(compiler.extend_chain(&mut workflow, NoisePath::High, &chain));

        assert_eq!(workflow.node("101").unwrap().connection("model"), Some(("10", 0)));
        assert_eq!(workflow.node("20").unwrap().connection("model"), Some(("101", 0)));
        // The low-noise path is untouched.
        assert_eq!(workflow.node("21").unwrap().connection("model"), Some(("11", 0)));
    }

    #[test]
    fn test_low_noise_extension() {
        let compiler = create_test_compiler();
        let mut workflow = create_dual_path_workflow();

        assert!(compiler.extend_chain(&mut workflow, NoisePath::Low, &loras()));

        assert_eq!(workflow.node("101").unwrap().connection("model"), Some(("11", 0)));
        assert_eq!(workflow.node("102").unwrap().connection("model"), Some(("101", 0)));
        assert_eq!(workflow.node("21").unwrap().connection("model"), Some(("102", 0)));
        assert_eq!(workflow.node("20").unwrap().connection("model"), Some(("10", 0)));
    }

    #[test]
    fn test_extension_through_patch_node() {
        let compiler = create_test_compiler();
        let mut workflow = create_dual_path_workflow().with_node(
            Node::new("40", "PatchSageAttentionKJ")
                .with_literal("sage_attention", "auto")
                .with_connection("model", "10", 0),
        );
        workflow
            .node_mut("20")
            .unwrap()
            .inputs
            .insert("model".to_string(), InputValue::connection("40", 0));

        let chain = [ModifierSelection::new("motion.safetensors", 1.0)];
        assert!(compiler.extend_chain(&mut workflow, NoisePath::High, &chain));

        assert_eq!(workflow.node("101").unwrap().connection("model"), Some(("10", 0)));
        assert_eq!(workflow.node("40").unwrap().connection("model"), Some(("101", 0)));
        assert_eq!(workflow.node("20").unwrap().connection("model"), Some(("40", 0)));
    }

    #[test]
    fn test_extension_gives_up_on_model_cycle() {
        let compiler = create_test_compiler();
        let mut workflow = create_dual_path_workflow()
            .with_node(Node::new("40", "PatchSageAttentionKJ").with_connection("model", "41", 0))
            .with_node(Node::new("41", "PatchSageAttentionKJ").with_connection("model", "40", 0));
        workflow
            .node_mut("20")
            .unwrap()
            .inputs
            .insert("model".to_string(), InputValue::connection("40", 0));
        let before = workflow.clone();

        let chain = [ModifierSelection::new("motion.safetensors", 1.0)];
        assert!(!compiler.extend_chain(&mut workflow, NoisePath::High, &chain));
        assert_eq!(workflow, before);
    }

    #[test]
    fn test_extension_without_sampling_pattern_is_noop() {
        let compiler = create_test_compiler();
        let mut workflow = two_node_graph();

        assert!(!compiler.extend_chain(&mut workflow, NoisePath::High, &loras()));
        assert_eq!(workflow, two_node_graph());
    }

    #[test]
    fn test_custom_noise_path_convention() {
        let compiler = Compiler::builder(Arc::new(create_test_schema()))
            .with_noise_path_convention(Arc::new(TitleConvention))
            .build();
        let mut workflow = create_dual_path_workflow();
        workflow.node_mut("30").unwrap().title = Some("Expert B".to_string());
        workflow.node_mut("31").unwrap().title = Some("Expert A".to_string());

        let chain = [ModifierSelection::new("motion.safetensors", 1.0)];
        assert!(compiler.extend_chain(&mut workflow, NoisePath::High, &chain));

        assert_eq!(workflow.node("21").unwrap().connection("model"), Some(("101", 0)));
        assert_eq!(workflow.node("101").unwrap().connection("model"), Some(("11", 0)));
    }

    #[test]
    fn test_start_step_convention() {
        let convention = StartStepConvention::default();
        let high = Node::new("1", "KSamplerAdvanced").with_literal("start_at_step", 0);
        let low = Node::new("2", "KSamplerAdvanced").with_literal("start_at_step", 4);
        let plain = Node::new("3", "KSampler").with_literal("start_at_step", 0);

        assert_eq!(convention.classify(&high), Some(NoisePath::High));
        assert_eq!(convention.classify(&low), Some(NoisePath::Low));
        assert_eq!(convention.classify(&plain), None);
    }
}

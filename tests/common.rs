//! Common test utilities: a small stock-node schema and workflow fixtures.
use kumitate::prelude::*;
use std::sync::Arc;

/// Schema covering the stock text-to-image node set plus the modifier loader.
#[allow(dead_code)]
pub fn create_test_schema() -> NodeSchema {
    NodeSchema::new()
        .with_class(
            "CheckpointLoaderSimple",
            ClassSchema::new()
                .input(InputDefinition::choice(
                    "ckpt_name",
                    &["model.safetensors", "other.safetensors"],
                ))
                .output("MODEL", "MODEL")
                .output("CLIP", "CLIP")
                .output("VAE", "VAE"),
        )
        .with_class(
            "CLIPTextEncode",
            ClassSchema::new()
                .input(InputDefinition::widget("text", "STRING"))
                .input(InputDefinition::connection("clip", "CLIP"))
                .output("CONDITIONING", "CONDITIONING"),
        )
        .with_class(
            "KSampler",
            ClassSchema::new()
                .input(InputDefinition::connection("model", "MODEL"))
                .input(InputDefinition::widget("seed", "INT").with_control_after_generate())
                .input(InputDefinition::widget("steps", "INT"))
                .input(InputDefinition::widget("cfg", "FLOAT"))
                .input(InputDefinition::choice("sampler_name", &["euler", "dpmpp_2m"]))
                .input(InputDefinition::choice("scheduler", &["normal", "karras"]))
                .input(InputDefinition::connection("positive", "CONDITIONING"))
                .input(InputDefinition::connection("negative", "CONDITIONING"))
                .input(InputDefinition::connection("latent_image", "LATENT"))
                .input(InputDefinition::widget("denoise", "FLOAT"))
                .output("LATENT", "LATENT"),
        )
        .with_class(
            "EmptyLatentImage",
            ClassSchema::new()
                .input(InputDefinition::widget("width", "INT"))
                .input(InputDefinition::widget("height", "INT"))
                .input(InputDefinition::widget("batch_size", "INT"))
                .output("LATENT", "LATENT"),
        )
        .with_class(
            "VAEDecode",
            ClassSchema::new()
                .input(InputDefinition::connection("samples", "LATENT"))
                .input(InputDefinition::connection("vae", "VAE"))
                .output("IMAGE", "IMAGE"),
        )
        .with_class(
            "SaveImage",
            ClassSchema::new()
                .input(InputDefinition::connection("images", "IMAGE"))
                .input(InputDefinition::widget("filename_prefix", "STRING")),
        )
        .with_class(
            "LoadImage",
            ClassSchema::new()
                .input(InputDefinition::choice("image", &["cat.png", "dog.png"]))
                .output("IMAGE", "IMAGE")
                .output("MASK", "MASK"),
        )
        .with_class(
            "LoraLoaderModelOnly",
            ClassSchema::new()
                .input(InputDefinition::connection("model", "MODEL"))
                .input(InputDefinition::choice("lora_name", &["detail.safetensors"]))
                .input(InputDefinition::widget("strength_model", "FLOAT"))
                .output("MODEL", "MODEL"),
        )
}

#[allow(dead_code)]
pub fn create_test_compiler() -> Compiler {
    Compiler::new(Arc::new(create_test_schema()))
}

/// Text-to-image graph as saved by the editor.
///
/// Nodes 6 and 7 sit inside the "Prompts" group; the "Empty" group contains nothing.
#[allow(dead_code)]
pub const SIMPLE_LAYOUT_JSON: &str = r#"{
    "last_node_id": 9,
    "last_link_id": 9,
    "nodes": [
        {
            "id": 4, "type": "CheckpointLoaderSimple", "pos": [0, 0], "size": [315, 98], "mode": 0,
            "inputs": [],
            "outputs": [
                {"name": "MODEL", "type": "MODEL", "links": [1]},
                {"name": "CLIP", "type": "CLIP", "links": [3, 5]},
                {"name": "VAE", "type": "VAE", "links": [8]}
            ],
            "widgets_values": ["model.safetensors"]
        },
        {
            "id": 6, "type": "CLIPTextEncode", "title": "Positive Prompt", "pos": [400, 0], "mode": 0,
            "inputs": [{"name": "clip", "type": "CLIP", "link": 3}],
            "outputs": [{"name": "CONDITIONING", "type": "CONDITIONING", "links": [4]}],
            "widgets_values": ["a cat sitting on a windowsill"]
        },
        {
            "id": 7, "type": "CLIPTextEncode", "pos": [400, 300], "mode": 0,
            "inputs": [{"name": "clip", "type": "CLIP", "link": 5}],
            "outputs": [{"name": "CONDITIONING", "type": "CONDITIONING", "links": [6]}],
            "widgets_values": ["blurry, low quality"]
        },
        {
            "id": 5, "type": "EmptyLatentImage", "pos": [400, 600], "mode": 0,
            "inputs": [],
            "outputs": [{"name": "LATENT", "type": "LATENT", "links": [2]}],
            "widgets_values": [512, 768, 1]
        },
        {
            "id": 3, "type": "KSampler", "pos": [800, 0], "mode": 0,
            "inputs": [
                {"name": "model", "type": "MODEL", "link": 1},
                {"name": "positive", "type": "CONDITIONING", "link": 4},
                {"name": "negative", "type": "CONDITIONING", "link": 6},
                {"name": "latent_image", "type": "LATENT", "link": 2}
            ],
            "outputs": [{"name": "LATENT", "type": "LATENT", "links": [7]}],
            "widgets_values": [42, "randomize", 20, 7.5, "euler", "normal", 1.0]
        },
        {
            "id": 8, "type": "VAEDecode", "pos": [1200, 0], "mode": 0,
            "inputs": [
                {"name": "samples", "type": "LATENT", "link": 7},
                {"name": "vae", "type": "VAE", "link": 8}
            ],
            "outputs": [{"name": "IMAGE", "type": "IMAGE", "links": [9]}]
        },
        {
            "id": 9, "type": "SaveImage", "pos": [1500, 0], "mode": 0,
            "inputs": [{"name": "images", "type": "IMAGE", "link": 9}],
            "outputs": [],
            "widgets_values": ["ComfyUI"]
        }
    ],
    "links": [
        [1, 4, 0, 3, 0, "MODEL"],
        [2, 5, 0, 3, 3, "LATENT"],
        [3, 4, 1, 6, 0, "CLIP"],
        [4, 6, 0, 3, 1, "CONDITIONING"],
        [5, 4, 1, 7, 0, "CLIP"],
        [6, 7, 0, 3, 2, "CONDITIONING"],
        [7, 3, 0, 8, 0, "LATENT"],
        [8, 4, 2, 8, 1, "VAE"],
        [9, 8, 0, 9, 0, "IMAGE"]
    ],
    "groups": [
        {"id": 1, "title": "Prompts", "bounding": [350, -50, 400, 400]},
        {"id": 2, "title": "Empty", "bounding": [5000, 5000, 10, 10]}
    ],
    "version": 0.4
}"#;

/// The same text-to-image graph in the server's submission format.
#[allow(dead_code)]
pub const SIMPLE_CANONICAL_JSON: &str = r#"{
    "3": {
        "inputs": {
            "seed": 42, "steps": 20, "cfg": 7.5, "sampler_name": "euler", "scheduler": "normal",
            "denoise": 1.0, "model": ["4", 0], "positive": ["6", 0], "negative": ["7", 0],
            "latent_image": ["5", 0]
        },
        "class_type": "KSampler"
    },
    "4": {"inputs": {"ckpt_name": "model.safetensors"}, "class_type": "CheckpointLoaderSimple"},
    "5": {"inputs": {"width": 512, "height": 768, "batch_size": 1}, "class_type": "EmptyLatentImage"},
    "6": {
        "inputs": {"text": "a cat sitting on a windowsill", "clip": ["4", 1]},
        "class_type": "CLIPTextEncode",
        "_meta": {"title": "Positive Prompt"}
    },
    "7": {"inputs": {"text": "blurry, low quality", "clip": ["4", 1]}, "class_type": "CLIPTextEncode"},
    "8": {"inputs": {"samples": ["3", 0], "vae": ["4", 2]}, "class_type": "VAEDecode"},
    "9": {"inputs": {"filename_prefix": "ComfyUI", "images": ["8", 0]}, "class_type": "SaveImage"}
}"#;

/// Builds a layout document with the given nodes, links and groups.
#[allow(dead_code)]
pub fn layout_json(nodes: serde_json::Value, links: serde_json::Value) -> String {
    serde_json::json!({ "nodes": nodes, "links": links, "groups": [] }).to_string()
}

/// A dual-path (two-expert) video graph: each expert model passes through a mandatory
/// modifier and a model-sampling node before reaching its advanced sampler.
#[allow(dead_code)]
pub fn create_dual_path_workflow() -> Workflow {
    Workflow::new()
        .with_node(
            Node::new("1", "UNETLoader")
                .with_literal("unet_name", "high_noise.safetensors")
                .with_output("MODEL", "MODEL"),
        )
        .with_node(
            Node::new("2", "UNETLoader")
                .with_literal("unet_name", "low_noise.safetensors")
                .with_output("MODEL", "MODEL"),
        )
        .with_node(
            Node::new("10", "LoraLoaderModelOnly")
                .with_literal("lora_name", "lightning_high.safetensors")
                .with_literal("strength_model", 1.0)
                .with_connection("model", "1", 0),
        )
        .with_node(
            Node::new("11", "LoraLoaderModelOnly")
                .with_literal("lora_name", "lightning_low.safetensors")
                .with_literal("strength_model", 1.0)
                .with_connection("model", "2", 0),
        )
        .with_node(
            Node::new("20", "ModelSamplingSD3")
                .with_literal("shift", 8.0)
                .with_connection("model", "10", 0),
        )
        .with_node(
            Node::new("21", "ModelSamplingSD3")
                .with_literal("shift", 8.0)
                .with_connection("model", "11", 0),
        )
        .with_node(
            Node::new("30", "KSamplerAdvanced")
                .with_literal("start_at_step", 0)
                .with_literal("end_at_step", 10)
                .with_connection("model", "20", 0),
        )
        .with_node(
            Node::new("31", "KSamplerAdvanced")
                .with_literal("start_at_step", 10)
                .with_literal("end_at_step", 10000)
                .with_connection("model", "21", 0)
                .with_connection("latent_image", "30", 0),
        )
}

/// How a heuristic rule matches a lowercase input name.
#[derive(Debug, Clone, Copy)]
enum Match {
    Contains(&'static str),
    Prefix(&'static str),
    Exact(&'static str),
}

impl Match {
    fn matches(self, name: &str) -> bool {
        match self {
            Match::Contains(token) => name.contains(token),
            Match::Prefix(token) => name.starts_with(token),
            Match::Exact(token) => name == token,
        }
    }
}

/// Name rules, checked in order. `latent_image` must resolve before the image rule.
const RULES: &[(Match, &str)] = &[
    (Match::Prefix("latent"), "LATENT"),
    (Match::Exact("samples"), "LATENT"),
    (Match::Contains("model"), "MODEL"),
    (Match::Contains("unet"), "MODEL"),
    (Match::Prefix("clip"), "CLIP"),
    (Match::Contains("vae"), "VAE"),
    (Match::Contains("positive"), "CONDITIONING"),
    (Match::Contains("negative"), "CONDITIONING"),
    (Match::Contains("conditioning"), "CONDITIONING"),
    (Match::Exact("cond"), "CONDITIONING"),
    (Match::Prefix("cond_"), "CONDITIONING"),
    (Match::Contains("image"), "IMAGE"),
    (Match::Contains("pixels"), "IMAGE"),
    (Match::Contains("mask"), "MASK"),
    (Match::Contains("noise"), "NOISE"),
];

/// Best-effort guess of a port's type from its input name.
///
/// This is an approximation: custom or renamed ports can be misclassified, and the
/// schema remains the authority wherever it is available.
pub fn infer_type_from_name(name: &str) -> Option<&'static str> {
    let name = name.to_ascii_lowercase();
    RULES
        .iter()
        .find(|(rule, _)| rule.matches(&name))
        .map(|(_, inferred)| *inferred)
}

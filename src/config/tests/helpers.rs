//! Layer builders for configuration tests.

use ortho_config::MergeComposer;
use serde_json::{Value, json};

use crate::BlogifyConfig;

/// Configuration source, in ascending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Defaults,
    File,
    Environment,
    Cli,
}

impl Layer {
    /// Host name used for this source's API base in precedence tests.
    const fn host(self) -> &'static str {
        match self {
            Self::Defaults => "defaults",
            Self::File => "file",
            Self::Environment => "env",
            Self::Cli => "cli",
        }
    }

    fn push(self, composer: &mut MergeComposer, value: Value) {
        match self {
            Self::Defaults => composer.push_defaults(value),
            Self::File => composer.push_file(value, None),
            Self::Environment => composer.push_environment(value),
            Self::Cli => composer.push_cli(value),
        }
    }
}

/// Merges `layers`, pushed in order, into a [`BlogifyConfig`].
pub fn merge(layers: &[(Layer, Value)]) -> BlogifyConfig {
    let mut composer = MergeComposer::new();
    for (layer, value) in layers {
        layer.push(&mut composer, value.clone());
    }
    BlogifyConfig::merge_from_layers(composer.layers()).expect("layers should merge")
}

/// One layer per source, each pointing `api_base` at `http://<host>/`.
pub fn api_base_layers(sources: &[Layer]) -> Vec<(Layer, Value)> {
    sources
        .iter()
        .map(|layer| {
            let api_base = format!("http://{}/", layer.host());
            (*layer, json!({ "api_base": api_base }))
        })
        .collect()
}

//! Crafting rules - which recipes a crafting building will take on

use serde::{Deserialize, Serialize};

use crate::config::CraftingConfig;

/// A stack of items, as used in recipe inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
    /// Namespaced tags such as `minecraft:planks`
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_empty() || self.count == 0
    }

    /// Tagged as planks or logs
    pub fn is_sawn_timber(&self) -> bool {
        self.tags
            .iter()
            .map(|t| tag_path(t))
            .any(|path| path == "planks" || path == "logs")
    }

    /// Planks, logs, or anything tagged as wood
    pub fn is_wooden(&self) -> bool {
        self.is_sawn_timber() || self.tags.iter().any(|t| tag_path(t).contains("wood"))
    }
}

/// A crafting recipe
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recipe {
    pub inputs: Vec<ItemStack>,
    pub output: ItemStack,
}

/// Whether a sawmill will learn this recipe.
///
/// At least one non-empty input must be wooden, and wooden inputs must make
/// up more than `min_wood_ratio` of the counted inputs. Plank and log inputs
/// count as wooden but are left out of the total unless
/// `count_planks_and_logs` is set, so a recipe of nothing but planks and logs
/// is always accepted.
pub fn sawmill_accepts(recipe: &Recipe, config: &CraftingConfig) -> bool {
    let mut wooden = 0usize;
    let mut counted = 0usize;

    for stack in recipe.inputs.iter().filter(|s| !s.is_empty()) {
        if stack.is_sawn_timber() {
            wooden += 1;
            if config.count_planks_and_logs {
                counted += 1;
            }
            continue;
        }
        if stack.is_wooden() {
            wooden += 1;
        }
        counted += 1;
    }

    if wooden == 0 {
        return false;
    }
    counted == 0 || wooden as f64 / counted as f64 > config.min_wood_ratio
}

fn tag_path(tag: &str) -> &str {
    tag.rsplit_once(':').map_or(tag, |(_, path)| path)
}

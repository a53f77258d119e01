use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::orp::compute_orp_index;

/// A token split around its optimal recognition point.
///
/// `prefix + highlight + suffix` always reproduces the source token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderModel {
    pub prefix: String,
    pub highlight: String,
    pub suffix: String,
}

impl RenderModel {
    pub fn new(
        prefix: impl Into<String>,
        highlight: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            highlight: highlight.into(),
            suffix: suffix.into(),
        }
    }

    /// The original token.
    pub fn text(&self) -> String {
        [self.prefix.as_str(), &self.highlight, &self.suffix].concat()
    }
}

pub fn build_render_model(token: &str) -> RenderModel {
    let orp_idx = compute_orp_index(token);

    // byte offsets of the highlighted grapheme; empty tokens have none
    let mut bounds = token.grapheme_indices(true).skip(orp_idx);
    let Some((start, grapheme)) = bounds.next() else {
        return RenderModel::new(token, "", "");
    };
    let end = start + grapheme.len();

    RenderModel::new(&token[..start], grapheme, &token[end..])
}

pub fn build_render_models<S: AsRef<str>>(tokens: &[S]) -> Vec<RenderModel> {
    tokens
        .iter()
        .map(|t| build_render_model(t.as_ref()))
        .collect()
}

use serde::Serialize;

use crate::classification::domain::pattern_classifier::CatPattern;
use crate::shared::color::Rgb;
use crate::shared::error::CoreError;

/// Near-white used for bellies, points and patches.
pub const LIGHT: Rgb = Rgb::new(230, 230, 230);
/// Fixed coat color for orange cats; their extracted colors are ignored.
pub const ORANGE: Rgb = Rgb::new(242, 153, 26);

/// Mask and material colors for rendering a cat avatar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvatarAppearance {
    pub mask: CatPattern,
    pub major_color: Rgb,
    pub pattern_color: Option<Rgb>,
    pub sub_color: Option<Rgb>,
}

impl AvatarAppearance {
    /// Maps a pattern and dominance-ranked coat colors to avatar materials.
    ///
    /// When fewer colors are available than the pattern uses, the missing
    /// slots repeat the last one.
    pub fn build(pattern: CatPattern, colors: &[Rgb]) -> Result<Self, CoreError> {
        let last = *colors
            .last()
            .ok_or_else(|| CoreError::invalid("no coat colors to build an avatar from"))?;
        let color = |i: usize| colors.get(i).copied().unwrap_or(last);

        let (major_color, pattern_color, sub_color) = match pattern {
            CatPattern::Bicolor => (color(1), Some(LIGHT), None),
            CatPattern::Calico => (color(0), Some(color(1)), Some(color(2))),
            CatPattern::Colorpoint => (LIGHT, Some(color(1)), None),
            CatPattern::Mix => (color(0), Some(color(1)), Some(LIGHT)),
            CatPattern::Orange => (ORANGE, None, None),
            CatPattern::Solid => (color(0), None, None),
            CatPattern::Tabby => (color(0), Some(color(1)), None),
        };

        Ok(Self {
            mask: pattern,
            major_color,
            pattern_color,
            sub_color,
        })
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detection::domain::face_normalizer::NormalizedImage;
use crate::shared::error::CoreError;

/// Coat pattern categories, in the order of the classifier's output vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatPattern {
    Bicolor,
    Calico,
    Colorpoint,
    Mix,
    Orange,
    Solid,
    Tabby,
}

impl CatPattern {
    pub const ALL: &[CatPattern] = &[
        CatPattern::Bicolor,
        CatPattern::Calico,
        CatPattern::Colorpoint,
        CatPattern::Mix,
        CatPattern::Orange,
        CatPattern::Solid,
        CatPattern::Tabby,
    ];

    pub fn from_index(index: usize) -> Option<CatPattern> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatPattern::Bicolor => "Bicolor",
            CatPattern::Calico => "Calico",
            CatPattern::Colorpoint => "Colorpoint",
            CatPattern::Mix => "Mix",
            CatPattern::Orange => "Orange",
            CatPattern::Solid => "Solid",
            CatPattern::Tabby => "Tabby",
        }
    }
}

impl fmt::Display for CatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Most likely pattern and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub pattern: CatPattern,
    pub confidence: f32,
}

/// Domain interface for the coat pattern classifier.
pub trait PatternClassifier: Send {
    fn classify(
        &mut self,
        image: &NormalizedImage,
    ) -> Result<Prediction, Box<dyn std::error::Error>>;
}

/// Picks the highest-scoring label. The first maximum wins ties.
pub fn prediction_from_scores(scores: &[f32]) -> Result<Prediction, CoreError> {
    if scores.len() != CatPattern::ALL.len() {
        return Err(CoreError::invalid(format!(
            "expected {} class scores, got {}",
            CatPattern::ALL.len(),
            scores.len()
        )));
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(CoreError::invalid(format!("non-finite class score {bad}")));
    }

    let (index, confidence) = scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, s)| {
            if s > best.1 {
                (i, s)
            } else {
                best
            }
        });
    let pattern = CatPattern::from_index(index)
        .ok_or_else(|| CoreError::invalid(format!("no label for class {index}")))?;

    Ok(Prediction {
        pattern,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_picks_highest_score() {
        let p = prediction_from_scores(&[0.05, 0.1, 0.05, 0.1, 0.6, 0.05, 0.05]).unwrap();
        assert_eq!(p.pattern, CatPattern::Orange);
        assert_relative_eq!(p.confidence, 0.6);
    }

    #[test]
    fn test_first_maximum_wins_ties() {
        let p = prediction_from_scores(&[0.0, 0.4, 0.0, 0.0, 0.0, 0.4, 0.2]).unwrap();
        assert_eq!(p.pattern, CatPattern::Calico);
    }

    #[test]
    fn test_wrong_score_count_is_invalid() {
        assert!(matches!(
            prediction_from_scores(&[0.5, 0.5]),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[rstest]
    #[case::all_nan([f32::NAN; 7])]
    #[case::one_nan([0.1, 0.2, f32::NAN, 0.1, 0.3, 0.2, 0.1])]
    #[case::infinite([0.0, f32::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0])]
    #[case::negative_infinite([f32::NEG_INFINITY; 7])]
    fn test_non_finite_scores_are_invalid(#[case] scores: [f32; 7]) {
        assert!(matches!(
            prediction_from_scores(&scores),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_label_order() {
        let labels: Vec<&str> = CatPattern::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            vec!["Bicolor", "Calico", "Colorpoint", "Mix", "Orange", "Solid", "Tabby"]
        );
        assert_eq!(CatPattern::from_index(6), Some(CatPattern::Tabby));
        assert_eq!(CatPattern::from_index(7), None);
        assert_eq!(CatPattern::Colorpoint.to_string(), "Colorpoint");
    }
}

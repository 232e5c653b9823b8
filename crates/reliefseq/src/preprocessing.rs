//! Score normalization applied between a scoring pass and the removal step.

use crate::scores::ScoreSet;

/// Outcome of a normalization request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Scores were mapped linearly from `[min, max]` onto `[0, 1]`.
    Rescaled { min: f64, max: f64 },
    /// The scorer asked for raw scores.
    Skipped,
    /// All scores were equal, so there is no range to map.
    Degenerate,
}

/// Min-max rescale a score set in place to the unit interval.
///
/// Applying this twice within one pass is a caller error: the second call
/// sees the already rescaled range.
pub fn normalize_scores(scores: &mut ScoreSet, should_normalize: bool) -> Normalization {
    if !should_normalize {
        log::debug!("Scorer output is not rescaled");
        return Normalization::Skipped;
    }

    let Some((min, max)) = scores.min_max() else {
        return Normalization::Degenerate;
    };
    if min == max {
        log::warn!("Relief min and max scores are the same ({}). No normalization necessary", min);
        return Normalization::Degenerate;
    }

    log::debug!("Normalizing scores from [{}, {}] to [0, 1]", min, max);
    let range = max - min;
    for s in scores.iter_mut() {
        s.score = (s.score - min) / range;
    }

    Normalization::Rescaled { min, max }
}

use std::fmt;

use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound score above which a description counts as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.2;
/// Compound score below which a description counts as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.2;

/// Bucketed polarity of a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Thresholds are exclusive: exactly ±0.2 is `Neutral`.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that maps free text to a compound polarity in [-1, 1].
pub trait SentimentScorer {
    fn compound(&self, text: &str) -> f64;
}

/// Lexicon-based VADER scorer.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        VaderScorer {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_fixed_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.25), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.5), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.2), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.2), SentimentLabel::Neutral);
    }

    #[test]
    fn empty_text_scores_zero() {
        let scorer = VaderScorer::new();
        assert_eq!(scorer.compound(""), 0.0);
        assert_eq!(scorer.compound("   "), 0.0);
    }

    #[test]
    fn vader_polarity_direction() {
        let scorer = VaderScorer::new();
        let good = scorer.compound("A wonderful, happy and beautiful love story.");
        let bad = scorer.compound("A horrible, violent and terrible murder.");
        assert!(good > POSITIVE_THRESHOLD, "got {good}");
        assert!(bad < NEGATIVE_THRESHOLD, "got {bad}");
        assert!((-1.0..=1.0).contains(&good));
    }
}

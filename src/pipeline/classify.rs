//! Classifier — keyword baseline, sentiment polarity, rules override.

use std::sync::Arc;

use tracing::debug;

use crate::error::PipelineError;
use crate::pipeline::rules::Rules;
use crate::pipeline::types::Category;

/// Keywords that short-circuit straight to `necessary`.
const NECESSARY_KEYWORDS: [&str; 3] = ["invoice", "payment due", "monthly statement"];

/// Stateless sentiment scoring capability.
///
/// Implementations return a polarity in `[-1.0, 1.0]`; positive values
/// indicate positive sentiment. Injected so the classifier can be tested
/// with a deterministic fake.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<f64, PipelineError>;
}

/// VADER lexicon scorer — the production [`SentimentScorer`].
#[derive(Debug, Default)]
pub struct VaderScorer;

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> Result<f64, PipelineError> {
        // The score map borrows from the analyzer, so it must outlive it.
        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        // The compound score is the single normalized polarity in [-1, 1].
        Ok(scores.get("compound").copied().unwrap_or(0.0))
    }
}

/// Message classifier.
///
/// Pure with respect to its inputs: identical (text, sender, rules)
/// always yields the identical category, assuming the scorer is
/// deterministic.
pub struct Classifier {
    scorer: Arc<dyn SentimentScorer>,
    threshold: f64,
}

impl Classifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>, threshold: f64) -> Self {
        Self { scorer, threshold }
    }

    /// Classify message text into a [`Category`].
    ///
    /// Baseline first: billing keywords win outright, then polarity
    /// above the threshold or a "thank you" marks the message important.
    /// A supplied rules document is applied after the baseline and fully
    /// replaces its result on a sender match.
    pub fn classify(
        &self,
        text: &str,
        sender: &str,
        rules: Option<&Rules>,
    ) -> Result<Category, PipelineError> {
        let lowered = text.to_lowercase();

        let baseline = if NECESSARY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            Category::Necessary
        } else {
            let polarity = self.scorer.score(text)?;
            debug!(polarity, threshold = self.threshold, "Scored message");
            if polarity > self.threshold || lowered.contains("thank you") {
                Category::Important
            } else {
                Category::Neither
            }
        };

        Ok(match rules {
            Some(rules) => rules.apply(baseline, sender),
            None => baseline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer that returns a fixed polarity.
    struct FixedScorer(f64);

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> Result<f64, PipelineError> {
            Ok(self.0)
        }
    }

    /// Scorer that always fails.
    struct FailingScorer;

    impl SentimentScorer for FailingScorer {
        fn score(&self, _text: &str) -> Result<f64, PipelineError> {
            Err(PipelineError::Scoring("model unavailable".into()))
        }
    }

    fn classifier(polarity: f64) -> Classifier {
        Classifier::new(Arc::new(FixedScorer(polarity)), 0.4)
    }

    #[test]
    fn invoice_keyword_short_circuits_to_necessary() {
        // Keyword match skips polarity entirely.
        let c = Classifier::new(Arc::new(FailingScorer), 0.4);
        let cat = c
            .classify("Your invoice #4521 payment due March 1", "billing@x.com", None)
            .unwrap();
        assert_eq!(cat, Category::Necessary);
    }

    #[test]
    fn monthly_statement_is_necessary() {
        let cat = classifier(0.0)
            .classify("Your Monthly Statement is ready", "bank@x.com", None)
            .unwrap();
        assert_eq!(cat, Category::Necessary);
    }

    #[test]
    fn thank_you_is_important_regardless_of_polarity() {
        let cat = classifier(-1.0)
            .classify("Thank you so much for your help!", "friend@x.com", None)
            .unwrap();
        assert_eq!(cat, Category::Important);
    }

    #[test]
    fn high_polarity_is_important() {
        let cat = classifier(0.9)
            .classify("what a wonderful day", "friend@x.com", None)
            .unwrap();
        assert_eq!(cat, Category::Important);
    }

    #[test]
    fn polarity_at_threshold_is_not_important() {
        // Strictly greater-than.
        let cat = classifier(0.4)
            .classify("fine I guess", "x@y.com", None)
            .unwrap();
        assert_eq!(cat, Category::Neither);
    }

    #[test]
    fn neutral_text_is_neither() {
        let cat = classifier(0.0)
            .classify("Meeting moved to 3pm", "work@x.com", None)
            .unwrap();
        assert_eq!(cat, Category::Neither);
    }

    #[test]
    fn empty_text_is_neither() {
        let cat = classifier(0.0).classify("", "x@y.com", None).unwrap();
        assert_eq!(cat, Category::Neither);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let cat = classifier(0.0)
            .classify("PAYMENT DUE tomorrow", "x@y.com", None)
            .unwrap();
        assert_eq!(cat, Category::Necessary);
    }

    #[test]
    fn whitelist_overrides_baseline() {
        let rules = Rules {
            whitelist: vec!["boss@corp.com".into()],
            blacklist: vec![],
        };
        // Baseline would be Necessary; whitelist replaces it.
        let cat = classifier(0.0)
            .classify("invoice attached", "boss@corp.com", Some(&rules))
            .unwrap();
        assert_eq!(cat, Category::Important);
    }

    #[test]
    fn blacklist_overrides_baseline() {
        let rules = Rules {
            whitelist: vec![],
            blacklist: vec!["noreply".into()],
        };
        let cat = classifier(0.0)
            .classify("invoice attached", "noreply@shop.com", Some(&rules))
            .unwrap();
        assert_eq!(cat, Category::Neither);
    }

    #[test]
    fn no_rules_means_no_override() {
        let cat = classifier(0.0)
            .classify("invoice attached", "noreply@shop.com", None)
            .unwrap();
        assert_eq!(cat, Category::Necessary);
    }

    #[test]
    fn scorer_failure_propagates() {
        let c = Classifier::new(Arc::new(FailingScorer), 0.4);
        assert!(c.classify("just some text", "x@y.com", None).is_err());
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier(0.3);
        let first = c.classify("see you at lunch", "x@y.com", None).unwrap();
        for _ in 0..3 {
            assert_eq!(c.classify("see you at lunch", "x@y.com", None).unwrap(), first);
        }
    }

    #[test]
    fn vader_polarity_is_bounded() {
        let scorer = VaderScorer;
        for text in [
            "",
            "I love this, it is wonderful!",
            "This is terrible and awful.",
        ] {
            let polarity = scorer.score(text).unwrap();
            assert!((-1.0..=1.0).contains(&polarity), "polarity {polarity} for {text:?}");
        }
    }

    #[test]
    fn vader_scores_empty_text_neutral() {
        let cat = Classifier::new(Arc::new(VaderScorer), 0.4)
            .classify("", "x@y.com", None)
            .unwrap();
        assert_eq!(cat, Category::Neither);
    }
}

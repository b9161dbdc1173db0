// File: src/evaluation.rs
//! Read-only quality metrics over a built index. Every test word is weighted
//! by its frequency; the positions scored are all aksaras after the leading
//! start marker.

use crate::core::engine::PredictiveIndex;
use crate::core::types::{AksaraSequence, WeightedWord, OOV_MARKER};
use crate::error::{PredictorError, Result};
use log::info;

/// Clicks charged when no shown prediction helps: open the full grid, pick.
const MISS_CLICKS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub entropy: f64,
    pub perplexity: f64,
    pub coverage: f64,
    pub probabilistic_coverage: f64,
    pub clicks_per_aksara: f64,
}

/// Cross-entropy in bits per aksara under the backoff model.
pub fn entropy(index: &PredictiveIndex, words: &[WeightedWord]) -> Result<f64> {
    let mut bits = 0.0;
    let mut weight_sum = 0.0;
    for word in words {
        let weight = word.frequency as f64;
        let aksaras = word.aksaras.as_slice();
        for i in 1..aksaras.len() {
            let probs = index.probabilities(&word.aksaras.slice(0..i));
            let p = probs
                .get(&aksaras[i])
                .or_else(|| probs.get(OOV_MARKER))
                .copied()
                .unwrap_or(0.0)
                .max(f64::MIN_POSITIVE);
            bits -= weight * p.log2();
            weight_sum += weight;
        }
    }
    ratio(bits, weight_sum, "entropy")
}

pub fn perplexity(entropy: f64) -> f64 {
    2f64.powf(entropy)
}

/// Share of positions where one of the shown predictions starts the rest of
/// the word.
pub fn keyboard_coverage(
    index: &PredictiveIndex,
    words: &[WeightedWord],
    use_probabilistic_model: bool,
) -> Result<f64> {
    let budget = index.config().aksara_budget;
    let mut covered = 0.0;
    let mut weight_sum = 0.0;
    for word in words {
        let weight = word.frequency as f64;
        for i in 1..word.len() {
            let context = word.aksaras.slice(0..i);
            let shown = if use_probabilistic_model {
                index.get_model_predictions(&context, budget / 2)
            } else {
                index.get_most_likely_predictions(&context, budget)
            };
            if longest_match(&shown, &word.aksaras.suffix(i)).is_some() {
                covered += weight;
            }
            weight_sum += weight;
        }
    }
    ratio(covered, weight_sum, "keyboard coverage")
}

/// Simulated clicks per typed aksara. A helpful prediction costs one click and
/// types its whole length; the longest helpful one is always taken.
pub fn clicks_per_aksara(index: &PredictiveIndex, words: &[WeightedWord]) -> Result<f64> {
    let budget = index.config().aksara_budget;
    let mut clicks = 0.0;
    let mut typed = 0.0;
    for word in words {
        let weight = word.frequency as f64;
        let mut i = 1;
        while i < word.len() {
            let shown = index.get_most_likely_predictions(&word.aksaras.slice(0..i), budget);
            match longest_match(&shown, &word.aksaras.suffix(i)) {
                Some(advance) => {
                    clicks += weight;
                    i += advance;
                }
                None => {
                    clicks += weight * MISS_CLICKS;
                    i += 1;
                }
            }
        }
        typed += weight * word.len().saturating_sub(1) as f64;
    }
    ratio(clicks, typed, "clicks per aksara")
}

pub fn evaluate(index: &PredictiveIndex, words: &[WeightedWord]) -> Result<EvaluationReport> {
    let entropy = entropy(index, words)?;
    let report = EvaluationReport {
        entropy,
        perplexity: perplexity(entropy),
        coverage: keyboard_coverage(index, words, false)?,
        probabilistic_coverage: keyboard_coverage(index, words, true)?,
        clicks_per_aksara: clicks_per_aksara(index, words)?,
    };
    info!(
        "evaluated {} words: entropy {:.4}, perplexity {:.4}, coverage {:.4}/{:.4}, clicks {:.4}",
        words.len(),
        report.entropy,
        report.perplexity,
        report.coverage,
        report.probabilistic_coverage,
        report.clicks_per_aksara
    );
    Ok(report)
}

fn longest_match(shown: &[AksaraSequence], rest: &AksaraSequence) -> Option<usize> {
    shown
        .iter()
        .filter(|p| !p.is_empty() && rest.starts_with(p))
        .map(AksaraSequence::len)
        .max()
}

fn ratio(numerator: f64, denominator: f64, metric: &'static str) -> Result<f64> {
    if denominator <= 0.0 {
        return Err(PredictorError::UndefinedMetric(metric));
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredictorConfig;

    fn word(text: &str, freq: i64) -> WeightedWord {
        WeightedWord::new(AksaraSequence::from_chars(text), freq)
    }

    fn corpus() -> Vec<WeightedWord> {
        vec![word("@ef", 4), word("@abcd", 1), word("@afd", 2)]
    }

    #[test]
    fn test_empty_test_set_is_undefined() {
        let index = PredictiveIndex::build(&corpus(), PredictorConfig::default());
        assert!(matches!(entropy(&index, &[]), Err(PredictorError::UndefinedMetric(_))));
        assert!(matches!(
            keyboard_coverage(&index, &[], false),
            Err(PredictorError::UndefinedMetric(_))
        ));
        assert!(matches!(clicks_per_aksara(&index, &[]), Err(PredictorError::UndefinedMetric(_))));
        // A bare start marker has nothing to predict.
        assert!(entropy(&index, &[word("@", 3)]).is_err());
    }

    #[test]
    fn test_perplexity_is_power_of_two() {
        assert_eq!(perplexity(0.0), 1.0);
        assert!((perplexity(3.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_lower_on_training_data() {
        let index = PredictiveIndex::build(&corpus(), PredictorConfig::default());
        let seen = entropy(&index, &corpus()).unwrap();
        let unseen = entropy(&index, &[word("@zzz", 1)]).unwrap();
        assert!(seen > 0.0);
        assert!(seen < unseen);
    }

    #[test]
    fn test_coverage_on_training_words() {
        let index = PredictiveIndex::build(&corpus(), PredictorConfig::default());
        // "@ef": "e" after "@" and "f" after "@e" are both shown.
        let ranked = keyboard_coverage(&index, &[word("@ef", 1)], false).unwrap();
        assert_eq!(ranked, 1.0);

        let prob = keyboard_coverage(&index, &corpus(), true).unwrap();
        assert!((0.0..=1.0).contains(&prob));
    }

    #[test]
    fn test_clicks_use_long_predictions() {
        let index = PredictiveIndex::build(&corpus(), PredictorConfig::default());
        // "ef" is shown after "@", so the whole word costs one click for two aksaras.
        let clicks = clicks_per_aksara(&index, &[word("@ef", 1)]).unwrap();
        assert_eq!(clicks, 0.5);

        // Nothing follows "@" with "z", every aksara is a miss.
        let clicks = clicks_per_aksara(&index, &[word("@zz", 1)]).unwrap();
        assert_eq!(clicks, MISS_CLICKS);
    }

    #[test]
    fn test_evaluate_report() {
        let index = PredictiveIndex::build(&corpus(), PredictorConfig::default());
        let report = evaluate(&index, &corpus()).unwrap();
        assert!((report.perplexity - perplexity(report.entropy)).abs() < 1e-9);
        assert!(report.coverage > 0.0 && report.coverage <= 1.0);
        assert!(report.clicks_per_aksara > 0.0);
    }
}

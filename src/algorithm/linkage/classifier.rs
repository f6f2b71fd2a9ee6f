//! Match classification of candidate pairs
//!
//! Classifiers implement [`PairClassifier`]. The default [`EcmClassifier`]
//! fits a two-class latent model to the binary agreement patterns of all
//! candidate pairs (Fellegi-Sunter with conditional independence between
//! fields) using expectation-maximization. [`ThresholdClassifier`] is the
//! fixed-rule fallback used when the model cannot be fitted.

use thiserror::Error;

use crate::algorithm::linkage::types::ComparisonVector;
use crate::config::EmConfig;

/// Number of distinct agreement patterns over the comparison fields
const PATTERNS: usize = 1 << ComparisonVector::LEN;

/// Probabilities are kept inside `[PROB_FLOOR, 1 - PROB_FLOOR]`
const PROB_FLOOR: f64 = 1e-6;

/// Why a classifier could not produce decisions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierFailure {
    #[error("{pairs} candidate pairs, at least {minimum} required")]
    TooFewPairs { pairs: usize, minimum: usize },

    #[error("no variance in the '{field}' comparison")]
    ZeroVariance { field: &'static str },

    #[error("degenerate estimates: {0}")]
    Degenerate(String),

    #[error("log-likelihood is not finite")]
    NonFiniteLikelihood,

    #[error("classifier returned {actual} decisions for {expected} pairs")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Strategy deciding which candidate pairs are matches
pub trait PairClassifier: Send + Sync {
    /// Short name recorded in the run summary
    fn name(&self) -> &'static str;

    /// Fit on the whole candidate set and return one decision per vector
    fn fit_and_classify(
        &self,
        vectors: &[ComparisonVector],
    ) -> Result<Vec<bool>, ClassifierFailure>;
}

/// Fixed rule: a pair matches when its aggregate score reaches the threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdClassifier {
    pub threshold: f64,
}

impl ThresholdClassifier {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Apply the rule; never fails
    #[must_use]
    pub fn classify(&self, vectors: &[ComparisonVector]) -> Vec<bool> {
        vectors
            .iter()
            .map(|vector| vector.aggregate() >= self.threshold)
            .collect()
    }
}

impl PairClassifier for ThresholdClassifier {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn fit_and_classify(
        &self,
        vectors: &[ComparisonVector],
    ) -> Result<Vec<bool>, ClassifierFailure> {
        Ok(self.classify(vectors))
    }
}

/// Index of an agreement pattern; field `k` sets bit `k`
fn pattern_index(agreement: [bool; ComparisonVector::LEN]) -> usize {
    agreement
        .iter()
        .enumerate()
        .filter(|(_, agrees)| **agrees)
        .fold(0, |index, (bit, _)| index | (1 << bit))
}

fn agrees(pattern: usize, field: usize) -> bool {
    pattern & (1 << field) != 0
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROB_FLOOR, 1.0 - PROB_FLOOR)
}

/// Fitted parameters of the latent-class model
#[derive(Debug, Clone, PartialEq)]
pub struct EcmModel {
    /// P(field agrees | match)
    pub m: [f64; ComparisonVector::LEN],
    /// P(field agrees | non-match)
    pub u: [f64; ComparisonVector::LEN],
    /// Share of matches among candidate pairs
    pub match_prior: f64,
    /// EM iterations run
    pub iterations: usize,
    /// Whether the parameter change fell below the tolerance
    pub converged: bool,
}

impl EcmModel {
    fn class_likelihoods(&self, pattern: usize) -> (f64, f64) {
        (0..ComparisonVector::LEN).fold(
            (self.match_prior, 1.0 - self.match_prior),
            |(lm, lu), k| {
                if agrees(pattern, k) {
                    (lm * self.m[k], lu * self.u[k])
                } else {
                    (lm * (1.0 - self.m[k]), lu * (1.0 - self.u[k]))
                }
            },
        )
    }

    /// Posterior match probability of an agreement pattern
    #[must_use]
    pub fn posterior(&self, pattern: usize) -> f64 {
        let (lm, lu) = self.class_likelihoods(pattern);
        lm / (lm + lu)
    }

    fn log_likelihood(&self, counts: &[usize; PATTERNS]) -> f64 {
        counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .map(|(pattern, &n)| {
                let (lm, lu) = self.class_likelihoods(pattern);
                n as f64 * (lm + lu).ln()
            })
            .sum()
    }

    /// Make the "match" class the one with higher agreement probabilities
    fn orient(&mut self) {
        let separation: f64 = self.m.iter().zip(&self.u).map(|(m, u)| m - u).sum();
        if separation < 0.0 {
            std::mem::swap(&mut self.m, &mut self.u);
            self.match_prior = 1.0 - self.match_prior;
        }
    }
}

/// Expectation-maximization classifier over binary agreement patterns
#[derive(Debug, Clone, Default)]
pub struct EcmClassifier {
    config: EmConfig,
}

impl EcmClassifier {
    #[must_use]
    pub const fn new(config: EmConfig) -> Self {
        Self { config }
    }

    fn pattern_counts(&self, vectors: &[ComparisonVector]) -> [usize; PATTERNS] {
        let mut counts = [0usize; PATTERNS];
        for vector in vectors {
            counts[pattern_index(vector.agreement(self.config.binarize_threshold))] += 1;
        }
        counts
    }

    /// Fit the model to the candidate set
    pub fn fit(&self, vectors: &[ComparisonVector]) -> Result<EcmModel, ClassifierFailure> {
        let total = vectors.len();
        if total < self.config.min_pairs {
            return Err(ClassifierFailure::TooFewPairs {
                pairs: total,
                minimum: self.config.min_pairs,
            });
        }

        let counts = self.pattern_counts(vectors);
        for (k, &field) in ComparisonVector::FIELDS.iter().enumerate() {
            let agreeing: usize = (0..PATTERNS)
                .filter(|&p| agrees(p, k))
                .map(|p| counts[p])
                .sum();
            if agreeing == 0 || agreeing == total {
                return Err(ClassifierFailure::ZeroVariance { field });
            }
        }

        let mut model = EcmModel {
            m: [self.config.initial_m; ComparisonVector::LEN],
            u: [self.config.initial_u; ComparisonVector::LEN],
            match_prior: self.config.initial_match_prior,
            iterations: 0,
            converged: false,
        };

        let n = total as f64;
        while model.iterations < self.config.max_iterations {
            model.iterations += 1;

            // E-step: expected number of matches per pattern
            let mut matched = [0.0; PATTERNS];
            for (pattern, &count) in counts.iter().enumerate() {
                matched[pattern] = count as f64 * model.posterior(pattern);
            }
            let expected_matches: f64 = matched.iter().sum();
            let expected_non_matches = n - expected_matches;
            if !(expected_matches > 0.0 && expected_non_matches > 0.0) {
                return Err(ClassifierFailure::Degenerate(format!(
                    "expected match count {expected_matches:.3} of {total}"
                )));
            }

            // M-step
            let mut next = model.clone();
            for k in 0..ComparisonVector::LEN {
                let (agree_m, agree_u) = (0..PATTERNS).filter(|&p| agrees(p, k)).fold(
                    (0.0, 0.0),
                    |(am, au), p| (am + matched[p], au + counts[p] as f64 - matched[p]),
                );
                next.m[k] = clamp_probability(agree_m / expected_matches);
                next.u[k] = clamp_probability(agree_u / expected_non_matches);
            }
            next.match_prior = clamp_probability(expected_matches / n);

            let change = next
                .m
                .iter()
                .zip(&model.m)
                .chain(next.u.iter().zip(&model.u))
                .map(|(a, b)| (a - b).abs())
                .fold((next.match_prior - model.match_prior).abs(), f64::max);

            model.m = next.m;
            model.u = next.u;
            model.match_prior = next.match_prior;

            if !change.is_finite() {
                return Err(ClassifierFailure::NonFiniteLikelihood);
            }
            if change < self.config.tolerance {
                model.converged = true;
                break;
            }
        }

        if !model.log_likelihood(&counts).is_finite() {
            return Err(ClassifierFailure::NonFiniteLikelihood);
        }

        model.orient();
        if model.m.iter().zip(&model.u).all(|(m, u)| (m - u).abs() < PROB_FLOOR) {
            return Err(ClassifierFailure::Degenerate(
                "match and non-match classes are indistinguishable".to_string(),
            ));
        }

        log::debug!(
            "EM fitted in {} iterations (converged: {}): prior={:.4}, m={:?}, u={:?}",
            model.iterations,
            model.converged,
            model.match_prior,
            model.m,
            model.u
        );
        Ok(model)
    }
}

impl PairClassifier for EcmClassifier {
    fn name(&self) -> &'static str {
        "ecm"
    }

    fn fit_and_classify(
        &self,
        vectors: &[ComparisonVector],
    ) -> Result<Vec<bool>, ClassifierFailure> {
        let model = self.fit(vectors)?;
        let is_match: [bool; PATTERNS] = std::array::from_fn(|p| model.posterior(p) > 0.5);
        Ok(vectors
            .iter()
            .map(|v| is_match[pattern_index(v.agreement(self.config.binarize_threshold))])
            .collect())
    }
}

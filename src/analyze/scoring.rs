//! Normalization and composite influence score.
//!
//! Audience, engagement and regularity are min–max normalized across the
//! sources of the current window. When every source has the same value
//! (including the single-source case) each one gets `1.0`.
//! Diversity is divided by the fixed theme-catalog size and clipped to `[0,1]`.
//!
//! sub-score = norm × weight × 100, total = sum of the four sub-scores
//! (clamped to `[0,100]`).

use serde::Serialize;
use std::cmp::Ordering;

use super::Weights;
use crate::source_metrics::SourceMetrics;

/// One row of the influence ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceScore {
    pub source_id: String,
    pub audience_raw: f64,
    pub engagement_raw: f64,
    pub regularity_raw: f64,
    pub diversity_raw: usize,
    pub audience_norm: f64,
    pub engagement_norm: f64,
    pub regularity_norm: f64,
    pub diversity_norm: f64,
    pub audience_score: f64,
    pub engagement_score: f64,
    pub regularity_score: f64,
    pub diversity_score: f64,
    pub total_score: f64,
    /// 1-based position after sorting.
    pub rank: usize,
}

impl SourceScore {
    pub fn sub_score_sum(&self) -> f64 {
        self.audience_score + self.engagement_score + self.regularity_score + self.diversity_score
    }
}

/// Min–max normalize into `[0,1]`; all `1.0` when max == min.
pub fn min_max(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() || max == min {
        return vec![1.0; values.len()];
    }
    let span = max - min;
    values
        .iter()
        .map(|v| ((v - min) / span).clamp(0.0, 1.0))
        .collect()
}

/// Share of the theme catalog a source covers, clipped to `[0,1]`.
pub fn diversity_norm(distinct_themes: usize, catalog_size: usize) -> f64 {
    if catalog_size == 0 {
        return 0.0;
    }
    (distinct_themes as f64 / catalog_size as f64).clamp(0.0, 1.0)
}

/// Descending total, then ascending source id.
pub fn ranking_order(a: &SourceScore, b: &SourceScore) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.source_id.cmp(&b.source_id))
}

/// Score every source and return them ranked.
pub fn score_sources(metrics: &[SourceMetrics], w: &Weights, catalog_size: usize) -> Vec<SourceScore> {
    let audience = min_max(&metrics.iter().map(|m| m.audience_raw).collect::<Vec<_>>());
    let engagement = min_max(&metrics.iter().map(|m| m.engagement_raw).collect::<Vec<_>>());
    let regularity = min_max(&metrics.iter().map(|m| m.regularity_raw).collect::<Vec<_>>());

    let mut scores: Vec<SourceScore> = metrics
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let diversity = diversity_norm(m.diversity_raw, catalog_size);
            let audience_score = audience[i] * w.audience * 100.0;
            let engagement_score = engagement[i] * w.engagement * 100.0;
            let regularity_score = regularity[i] * w.regularity * 100.0;
            let diversity_score = diversity * w.diversity * 100.0;
            SourceScore {
                source_id: m.source_id.clone(),
                audience_raw: m.audience_raw,
                engagement_raw: m.engagement_raw,
                regularity_raw: m.regularity_raw,
                diversity_raw: m.diversity_raw,
                audience_norm: audience[i],
                engagement_norm: engagement[i],
                regularity_norm: regularity[i],
                diversity_norm: diversity,
                audience_score,
                engagement_score,
                regularity_score,
                diversity_score,
                // Clamp only absorbs float drift; weights already sum to 1.
                total_score: (audience_score + engagement_score + regularity_score + diversity_score)
                    .clamp(0.0, 100.0),
                rank: 0,
            }
        })
        .collect();

    scores.sort_by(ranking_order);
    for (i, s) in scores.iter_mut().enumerate() {
        s.rank = i + 1;
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(src: &str, audience: f64, engagement: f64, regularity: f64, diversity: usize) -> SourceMetrics {
        SourceMetrics {
            source_id: src.into(),
            post_count: 1,
            audience_raw: audience,
            engagement_raw: engagement,
            regularity_raw: regularity,
            diversity_raw: diversity,
        }
    }

    #[test]
    fn min_max_spans_unit_interval() {
        let n = min_max(&[10.0, 20.0, 30.0]);
        assert_eq!(n, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn min_max_degenerate_is_all_ones() {
        assert_eq!(min_max(&[5.0, 5.0, 5.0]), vec![1.0, 1.0, 1.0]);
        assert_eq!(min_max(&[7.0]), vec![1.0]);
        assert!(min_max(&[]).is_empty());
    }

    #[test]
    fn diversity_is_clipped() {
        assert!((diversity_norm(3, 7) - 3.0 / 7.0).abs() < 1e-12);
        assert_eq!(diversity_norm(9, 7), 1.0);
    }

    #[test]
    fn single_source_gets_full_min_max_components() {
        let s = score_sources(&[m("A", 100.0, 5.0, 2.0, 7)], &Weights::default(), 7);
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].audience_norm, 1.0);
        assert_eq!(s[0].engagement_norm, 1.0);
        assert_eq!(s[0].regularity_norm, 1.0);
        assert!((s[0].total_score - 100.0).abs() < 1e-9);
        assert_eq!(s[0].rank, 1);
    }

    #[test]
    fn weighted_sub_scores_sum_to_total() {
        let metrics = vec![
            m("A", 100.0, 50.0, 3.0, 2),
            m("B", 300.0, 10.0, 1.0, 5),
            m("C", 200.0, 30.0, 2.0, 1),
        ];
        let scores = score_sources(&metrics, &Weights::default(), 7);
        for s in &scores {
            assert!((s.sub_score_sum() - s.total_score).abs() < 1e-9);
            assert!((0.0..=100.0).contains(&s.total_score));
        }
        // A: audience 0, engagement 1, regularity 1, diversity 2/7
        let a = scores.iter().find(|s| s.source_id == "A").unwrap();
        let expected = 0.0 + 40.0 + 20.0 + (2.0 / 7.0) * 10.0;
        assert!((a.total_score - expected).abs() < 1e-9);
    }

    #[test]
    fn ties_break_on_source_id() {
        let metrics = vec![m("zeta", 1.0, 1.0, 1.0, 1), m("alpha", 1.0, 1.0, 1.0, 1)];
        let scores = score_sources(&metrics, &Weights::default(), 7);
        assert_eq!(scores[0].source_id, "alpha");
        assert_eq!(scores[1].source_id, "zeta");
        assert_eq!(scores[0].total_score, scores[1].total_score);
        assert_eq!((scores[0].rank, scores[1].rank), (1, 2));
    }
}

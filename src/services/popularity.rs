use crate::dataset::Table;

/// Popularity of every book, with the global ranking precomputed
///
/// The score is `rating * ln(1 + num_ratings)`; the order is descending
/// score with ties broken by ascending id.
#[derive(Debug, Clone)]
pub struct PopularityRanking {
    scores: Vec<f64>,
    order: Vec<usize>,
    max: f64,
}

impl PopularityRanking {
    pub fn build(table: &Table) -> Self {
        let scores: Vec<f64> = table.iter().map(|b| b.popularity_score()).collect();

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then_with(|| a.cmp(&b)));

        let max = order.first().map(|&id| scores[id]).unwrap_or(0.0);

        Self { scores, order, max }
    }

    /// Raw score of book `id`
    pub fn score(&self, id: usize) -> Option<f64> {
        self.scores.get(id).copied()
    }

    /// Score of book `id` divided by the dataset maximum, in [0, 1]
    pub fn normalized(&self, id: usize) -> Option<f64> {
        let score = self.score(id)?;
        if self.max > 0.0 {
            Some(score / self.max)
        } else {
            Some(0.0)
        }
    }

    /// All book ids, most popular first
    pub fn ranked(&self) -> &[usize] {
        &self.order
    }

    pub fn approximate_memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.scores.capacity() * std::mem::size_of::<f64>()
            + self.order.capacity() * std::mem::size_of::<usize>()
    }
}

/// Min-max scales `values` to [0, 1]
///
/// A constant (or single-element) input maps every value to 1.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| if range > f64::EPSILON { (v - min) / range } else { 1.0 })
        .collect()
}

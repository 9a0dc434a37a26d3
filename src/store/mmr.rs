//! Cosine similarity and Maximal Marginal Relevance reranking.
//!
//! MMR = λ × sim(query, doc) − (1 − λ) × max sim(doc, already selected)
//!
//! λ = 1.0 is pure relevance, λ = 0.0 pure diversity.

pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; zero when either vector has no magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let denom = magnitude(a) * magnitude(b);
    if denom == 0.0 {
        return 0.0;
    }
    let dot: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| x * y)
        .sum();
    dot / denom
}

/// Indices of `vectors` ordered by descending cosine similarity to `query`, at most `k`.
pub fn top_k_by_similarity(query: &[f32], vectors: &[&[f32]], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = vectors
        .iter()
        .enumerate()
        .map(|(idx, v)| (idx, cosine_similarity(query, v)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

/// Greedy MMR selection over `candidates` (index, vector).
///
/// Returns `(index, relevance)` pairs in selection order; the first pick is always the
/// candidate most similar to the query.
pub fn mmr_rerank(
    query: &[f32],
    candidates: &[(usize, &[f32])],
    k: usize,
    lambda: f32
) -> Vec<(usize, f32)> {
    if candidates.is_empty() || k == 0 {
        return Vec::new();
    }

    let lambda = lambda.clamp(0.0, 1.0);
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|(_, v)| cosine_similarity(query, v))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &cand) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(candidates[cand].1, candidates[s].1))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
            let score = lambda * relevance[cand] - (1.0 - lambda) * redundancy;

            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.remove(best_pos));
    }

    selected
        .into_iter()
        .map(|i| (candidates[i].0, relevance[i]))
        .collect()
}

//! One-dimensional clustering used by word, text and table extraction.

/// Sort `values` and group them into runs where each value lies within
/// `tolerance` of the previous one.
///
/// The clusters are returned in ascending order, each sorted.
pub fn cluster_values(values: &[f64], tolerance: f64) -> Vec<Vec<f64>> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(current) if current.last().is_some_and(|&last| value - last <= tolerance) => {
                current.push(value);
            }
            _ => clusters.push(vec![value]),
        }
    }
    clusters
}

/// Group items by a numeric key, clustering the keys with `tolerance`.
///
/// Groups come out in ascending key order; within a group the original
/// order of the items is preserved.
pub fn cluster_by<T, F>(items: Vec<T>, key: F, tolerance: f64) -> Vec<Vec<T>>
where
    F: Fn(&T) -> f64,
{
    let keys: Vec<f64> = items.iter().map(&key).collect();
    let clusters = cluster_values(&keys, tolerance);

    let mut groups: Vec<Vec<T>> = (0..clusters.len()).map(|_| Vec::new()).collect();
    for (item, k) in items.into_iter().zip(keys) {
        let index = clusters
            .iter()
            .position(|c| c.first().is_some_and(|&lo| k >= lo) && c.last().is_some_and(|&hi| k <= hi));
        match index {
            Some(i) => groups[i].push(item),
            None => log::debug!("dropping item with unclusterable key {}", k),
        }
    }
    groups
}

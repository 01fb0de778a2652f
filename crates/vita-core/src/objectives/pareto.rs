use super::fitness::Fitness;
use super::optimize::Optimize;

/// `true` if `a` dominates `b`: at least as good on every objective and
/// strictly better on at least one.
pub fn dominates(a: &Fitness, b: &Fitness, directions: &[Optimize]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), directions.len());

    let mut strictly_better_somewhere = false;
    for (i, dir) in directions.iter().enumerate() {
        let (av, bv) = (a.get(i), b.get(i));
        if dir.is_better(bv, av) {
            return false;
        }
        if dir.is_better(av, bv) {
            strictly_better_somewhere = true;
        }
    }
    strictly_better_somewhere
}

/// Returns the indices of the non-dominated members of `candidates`.
pub fn pareto_front(candidates: &[Fitness], directions: &[Optimize]) -> Vec<usize> {
    let mut front = Vec::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let dominated = candidates
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && dominates(other, candidate, directions));
        if !dominated {
            front.push(i);
        }
    }
    front
}

/// Crowding distance (NSGA-II) over a front, used by Pareto selection and
/// replacement to break ties toward less-crowded regions of the front
/// (spec §4.9, §4.10).
pub fn crowding_distance(front: &[Fitness], directions: &[Optimize]) -> Vec<f64> {
    let n = front.len();
    if n == 0 {
        return Vec::new();
    }
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distances = vec![0.0; n];
    for (obj_idx, _) in directions.iter().enumerate() {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            front[a]
                .get(obj_idx)
                .partial_cmp(&front[b].get(obj_idx))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        let lo = front[order[0]].get(obj_idx);
        let hi = front[order[n - 1]].get(obj_idx);
        let span = hi - lo;
        if span <= 0.0 {
            continue;
        }

        for w in 1..n - 1 {
            let prev = front[order[w - 1]].get(obj_idx);
            let next = front[order[w + 1]].get(obj_idx);
            if distances[order[w]].is_finite() {
                distances[order[w]] += (next - prev).abs() / span;
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominance_requires_no_worse_and_one_better() {
        let dirs = [Optimize::Minimize, Optimize::Minimize];
        let a = Fitness::new(vec![1.0, 2.0]);
        let b = Fitness::new(vec![1.0, 3.0]);
        assert!(dominates(&a, &b, &dirs));
        assert!(!dominates(&b, &a, &dirs));
    }

    #[test]
    fn equal_fitness_does_not_dominate() {
        let dirs = [Optimize::Minimize];
        let a = Fitness::scalar(1.0);
        let b = Fitness::scalar(1.0);
        assert!(!dominates(&a, &b, &dirs));
    }

    #[test]
    fn front_excludes_dominated_points() {
        let dirs = [Optimize::Minimize, Optimize::Minimize];
        let pts = vec![
            Fitness::new(vec![1.0, 4.0]),
            Fitness::new(vec![2.0, 2.0]),
            Fitness::new(vec![3.0, 1.0]),
            Fitness::new(vec![5.0, 5.0]),
        ];
        let front = pareto_front(&pts, &dirs);
        assert_eq!(front, vec![0, 1, 2]);
    }

    #[test]
    fn extremes_have_infinite_crowding_distance() {
        let dirs = [Optimize::Minimize];
        let front = vec![Fitness::scalar(1.0), Fitness::scalar(2.0), Fitness::scalar(3.0)];
        let dist = crowding_distance(&front, &dirs);
        assert!(dist[0].is_infinite());
        assert!(dist[2].is_infinite());
        assert!(dist[1].is_finite());
    }
}

use log::info;

/// Histogram of empty-link depths in a [`RbTree`](crate::RbTree),
/// gathered by [`RbTree::validate`](crate::RbTree::validate). An empty
/// link hanging under a node at depth `d` is sampled at `d + 1`, so the
/// deepest sample is the height of the tree.
#[derive(Clone, Debug, Default)]
pub struct Depth {
    samples: usize,
    total: usize,
    counts: Vec<u64>, // counts[depth] = number of empty links at depth.
}

impl Depth {
    /// Histogram sized for a tree holding `entries` values. Red-black
    /// height stays within `2 * log2(entries + 1)`, the histogram still
    /// grows if a broken tree goes deeper.
    pub(crate) fn for_entries(entries: usize) -> Depth {
        let bits = (usize::BITS - (entries + 1).leading_zeros()) as usize;
        Depth {
            samples: 0,
            total: 0,
            counts: vec![0; (2 * bits) + 1],
        }
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        if depth >= self.counts.len() {
            self.counts.resize(depth + 1, 0);
        }
        self.counts[depth] += 1;
        self.samples += 1;
        self.total += depth;
    }

    /// Return number of empty links sampled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return the shallowest sampled depth, 0 when nothing is sampled.
    pub fn min(&self) -> usize {
        self.counts.iter().position(|n| *n > 0).unwrap_or(0)
    }

    /// Return the deepest sampled depth, which is the tree height.
    pub fn max(&self) -> usize {
        self.counts.iter().rposition(|n| *n > 0).unwrap_or(0)
    }

    /// Return the average depth, rounded down.
    pub fn mean(&self) -> usize {
        match self.samples {
            0 => 0,
            n => self.total / n,
        }
    }

    /// Return (percentile, depth) pairs from the 90th percentile upwards,
    /// one pair per depth where the cumulative share crosses a new
    /// percentile.
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let (mut acc, mut floor) = (0_u64, 90_u8);
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 0)
            .filter_map(|(depth, n)| {
                acc += n;
                let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
                if perc >= floor {
                    floor = perc;
                    Some((perc, depth))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Log depth statistics in human readable format.
    pub fn log_summary(&self, prefix: &str) {
        info!(
            "{}depth (min, mean, max): {:?}",
            prefix,
            (self.min(), self.mean(), self.max())
        );
        for (perc, depth) in self.percentiles().into_iter() {
            info!("{}  {} percentile = {}", prefix, perc, depth);
        }
    }
}

// Ratcliff/Obershelp matching blocks: find the longest common contiguous run,
// then recurse on the unmatched regions left and right of it.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchingBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Non-overlapping matching blocks of `a` and `b`, ordered by position.
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<MatchingBlock> {
    let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
    for (j, item) in b.iter().enumerate() {
        b2j.entry(item).or_default().push(j);
    }

    let mut runs = RunTable::new(b.len());
    let mut queue = vec![(0, a.len(), 0, b.len())];
    let mut blocks = Vec::new();

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let found = longest_match(a, &b2j, &mut runs, alo, ahi, blo, bhi);
        if found.size == 0 {
            continue;
        }

        if alo < found.a && blo < found.b {
            queue.push((alo, found.a, blo, found.b));
        }
        if found.a + found.size < ahi && found.b + found.size < bhi {
            queue.push((found.a + found.size, ahi, found.b + found.size, bhi));
        }
        blocks.push(found);
    }

    blocks.sort_by_key(|block| (block.a, block.b));
    blocks
}

/// Number of elements covered by matching blocks.
pub fn matched_len<T: Eq + Hash>(a: &[T], b: &[T]) -> usize {
    matching_blocks(a, b).iter().map(|block| block.size).sum()
}

/// Run lengths for the previous and current row, indexed by `j + 1`.
///
/// Allocated once per `matching_blocks` call. Only touched slots are reset,
/// so a row costs as much as its matches, not the width of `b`.
struct RunTable {
    prev: Vec<usize>,
    cur: Vec<usize>,
    prev_touched: Vec<usize>,
    cur_touched: Vec<usize>,
}

impl RunTable {
    fn new(b_len: usize) -> Self {
        Self {
            prev: vec![0; b_len + 1],
            cur: vec![0; b_len + 1],
            prev_touched: Vec::new(),
            cur_touched: Vec::new(),
        }
    }

    fn next_row(&mut self) {
        for &slot in &self.prev_touched {
            self.prev[slot] = 0;
        }
        self.prev_touched.clear();
        std::mem::swap(&mut self.prev, &mut self.cur);
        std::mem::swap(&mut self.prev_touched, &mut self.cur_touched);
    }
}

// Earliest `a` start wins among equally long runs, then earliest `b` start.
fn longest_match<T: Eq + Hash>(
    a: &[T],
    b2j: &HashMap<&T, Vec<usize>>,
    runs: &mut RunTable,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchingBlock {
    let mut best = MatchingBlock {
        a: alo,
        b: blo,
        size: 0,
    };

    for (i, item) in a.iter().enumerate().take(ahi).skip(alo) {
        if let Some(positions) = b2j.get(item) {
            let first = positions.partition_point(|&j| j < blo);
            for &j in positions[first..].iter().take_while(|&&j| j < bhi) {
                // prev[j] is the run ending at b[j - 1]; zero at j == blo
                // because slots outside the window are never written.
                let run = runs.prev[j] + 1;
                runs.cur[j + 1] = run;
                runs.cur_touched.push(j + 1);

                if run > best.size {
                    best = MatchingBlock {
                        a: i + 1 - run,
                        b: j + 1 - run,
                        size: run,
                    };
                }
            }
        }

        runs.next_row();
    }

    // Clears the final row so the next window starts from zero.
    runs.next_row();
    best
}

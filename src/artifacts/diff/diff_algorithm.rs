//! Myers' shortest edit script
//!
//! The search explores edit distances `d = 0, 1, ...` and records, for every diagonal
//! `k = x - y`, how far along `a` a path with `d` edits can reach. Backtracking through
//! the recorded frontiers recovers one shortest script.

use derive_new::new;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Delete { value: T },
    Insert { value: T },
    Equal { value: T },
}

impl<T> Edit<T> {
    pub fn value(&self) -> &T {
        match self {
            Edit::Delete { value } | Edit::Insert { value } | Edit::Equal { value } => value,
        }
    }

    /// Line marker: `-`, `+` or a space
    pub fn marker(&self) -> char {
        match self {
            Edit::Delete { .. } => '-',
            Edit::Insert { .. } => '+',
            Edit::Equal { .. } => ' ',
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Edit<U> {
        match self {
            Edit::Delete { value } => Edit::Delete { value: f(value) },
            Edit::Insert { value } => Edit::Insert { value: f(value) },
            Edit::Equal { value } => Edit::Equal { value: f(value) },
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Equal { .. })
    }
}

impl<T: fmt::Display> fmt::Display for Edit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.marker(), self.value())
    }
}

/// Furthest x reached on each diagonal
#[derive(Debug, Clone)]
struct Frontier {
    reach: Vec<usize>,
    offset: isize,
}

impl Frontier {
    fn new(max_edits: usize) -> Self {
        // diagonals -(max + 1)..=(max + 1) are read while extending the outermost ones
        Frontier {
            reach: vec![0; 2 * max_edits + 3],
            offset: max_edits as isize + 1,
        }
    }

    fn get(&self, k: isize) -> usize {
        self.reach[(self.offset + k) as usize]
    }

    fn set(&mut self, k: isize, x: usize) {
        self.reach[(self.offset + k) as usize] = x;
    }

    /// Whether the best path onto diagonal `k` in round `d` steps down from `k + 1`
    /// (an insertion) rather than right from `k - 1` (a deletion)
    fn steps_down(&self, k: isize, d: isize) -> bool {
        k == -d || (k != d && self.get(k - 1) < self.get(k + 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<'d, T: Eq + Clone> MyersDiff<'d, T> {
    /// Frontier snapshots taken at the start of every round, up to the round reaching the end
    fn trace(&self) -> Vec<Frontier> {
        let (n, m) = (self.a.len(), self.b.len());
        let mut frontier = Frontier::new(n + m);
        let mut trace = Vec::new();

        for d in 0..=(n + m) as isize {
            trace.push(frontier.clone());

            for k in (-d..=d).step_by(2) {
                let mut x = if frontier.steps_down(k, d) {
                    frontier.get(k + 1)
                } else {
                    frontier.get(k - 1) + 1
                };
                let mut y = (x as isize - k) as usize;

                while x < n && y < m && self.a[x] == self.b[y] {
                    x += 1;
                    y += 1;
                }
                frontier.set(k, x);

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    pub fn diff(&self) -> Vec<Edit<T>> {
        let (mut x, mut y) = (self.a.len(), self.b.len());
        let mut edits = Vec::new();

        for (d, frontier) in self.trace().iter().enumerate().rev() {
            let d = d as isize;
            let (prev_x, prev_y) = if d == 0 {
                (0, 0)
            } else {
                let k = x as isize - y as isize;
                let prev_k = if frontier.steps_down(k, d) { k + 1 } else { k - 1 };
                let prev_x = frontier.get(prev_k);
                (prev_x, (prev_x as isize - prev_k) as usize)
            };

            while x > prev_x && y > prev_y {
                x -= 1;
                y -= 1;
                edits.push(Edit::Equal {
                    value: self.a[x].clone(),
                });
            }

            if d > 0 {
                if x == prev_x {
                    edits.push(Edit::Insert {
                        value: self.b[prev_y].clone(),
                    });
                } else {
                    edits.push(Edit::Delete {
                        value: self.a[prev_x].clone(),
                    });
                }
            }

            (x, y) = (prev_x, prev_y);
        }

        edits.reverse();
        edits
    }
}

/// Line diff of two texts
///
/// Lines compare together with their terminators, so a missing final newline is a
/// change. Edit values carry the line without its terminator.
pub fn diff_lines<'d>(a: &'d str, b: &'d str) -> Vec<Edit<&'d str>> {
    let a = a.split_inclusive('\n').collect::<Vec<_>>();
    let b = b.split_inclusive('\n').collect::<Vec<_>>();

    MyersDiff::new(&a, &b)
        .diff()
        .into_iter()
        .map(|edit| edit.map(strip_terminator))
        .collect()
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

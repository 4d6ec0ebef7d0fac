use std::collections::VecDeque;

/// Formatted chat lines in the order they were accepted.
///
/// Unbounded unless a limit is given, in which case only the newest
/// `limit` lines are kept.
#[derive(Debug, Default)]
pub struct History {
    lines: VecDeque<String>,
    limit: Option<usize>,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            lines: VecDeque::new(),
            limit,
        }
    }

    pub fn append(&mut self, line: String) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.lines.len() >= limit {
                self.lines.pop_front();
            }
        }

        self.lines.push_back(line);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

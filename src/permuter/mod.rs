//! Lazy, feedback-driven enumeration of ordered tuples over a set.
//!
//! Given an ordered sequence `S` of distinct elements, the Permuter produces
//! every non-empty ordered tuple whose elements are a subset of `S`, in
//! depth-first order, such that each tuple is emitted before any strict
//! extension of it. After each emitted tuple the consumer supplies a
//! [`Feedback`] token: `Proceed` descends into extensions of the
//! just-emitted tuple; `Skip` does not descend.
//!
//! There is no native generator here (see spec §9): the DFS is realized as
//! an explicit stack of `(path, rest, i)` frames, advanced one step per
//! call to [`Permuter::next`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Descend into extensions of the just-emitted tuple.
    Proceed,
    /// Do not descend; advance to the next sibling.
    Skip,
}

#[derive(Debug, Clone)]
struct Frame<T> {
    path: Vec<T>,
    rest: Vec<T>,
    i: usize,
}

/// A depth-first iterator object over non-empty ordered tuples of a subset
/// of `S`. Construct with [`Permuter::new`], drive with repeated calls to
/// [`Permuter::next`], each consuming the [`Feedback`] for the previously
/// emitted tuple.
#[derive(Debug, Clone)]
pub struct Permuter<T: Clone> {
    stack: Vec<Frame<T>>,
    /// Set once a tuple has been emitted and we're waiting on feedback for
    /// it; `next` uses this to decide whether to push a child frame.
    pending_child: Option<Frame<T>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PermuterError {
    #[error("Permuter requires a non-empty input set")]
    EmptyInput,
    #[error("Permuter input set contains a duplicate element")]
    DuplicateElement,
}

impl<T: Clone + PartialEq> Permuter<T> {
    pub fn new(elements: Vec<T>) -> Result<Self, PermuterError> {
        if elements.is_empty() {
            return Err(PermuterError::EmptyInput);
        }
        for i in 0..elements.len() {
            for j in (i + 1)..elements.len() {
                if elements[i] == elements[j] {
                    return Err(PermuterError::DuplicateElement);
                }
            }
        }
        Ok(Self {
            stack: vec![Frame {
                path: Vec::new(),
                rest: elements,
                i: 0,
            }],
            pending_child: None,
        })
    }

    /// Emit the next tuple, or `None` once the enumeration is exhausted.
    /// `feedback` is ignored on the very first call (nothing has been
    /// emitted yet to give feedback about).
    pub fn next(&mut self, feedback: Feedback) -> Option<Vec<T>> {
        if let Some(child) = self.pending_child.take() {
            if feedback == Feedback::Proceed {
                self.stack.push(child);
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            if frame.i >= frame.rest.len() {
                self.stack.pop();
                continue;
            }

            let idx = frame.i;
            frame.i += 1;

            let mut path = frame.path.clone();
            path.push(frame.rest[idx].clone());

            let mut child_rest = frame.rest.clone();
            child_rest.remove(idx);

            self.pending_child = Some(Frame {
                path: path.clone(),
                rest: child_rest,
                i: 0,
            });

            return Some(path);
        }
    }

    /// Drain the whole enumeration, always feeding `Proceed`. Convenience
    /// for tests and for callers that want the full set (P2).
    pub fn collect_all(mut self) -> Vec<Vec<T>> {
        let mut out = Vec::new();
        while let Some(tuple) = self.next(Feedback::Proceed) {
            out.push(tuple);
        }
        out
    }
}

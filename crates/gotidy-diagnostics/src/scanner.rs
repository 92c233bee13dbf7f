// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line scanner with a one-slot pushback buffer

/// Iterator adapter that can hand back the item it most recently yielded
///
/// Block parsers only know a block has ended after reading the first line
/// that does not belong to it; [`RewindScanner::rewind`] returns that line
/// so the next call to `next` delivers it again.
///
/// ```
/// use gotidy_diagnostics::RewindScanner;
///
/// let mut scanner = RewindScanner::new("a\nb".lines());
/// assert_eq!(scanner.next(), Some("a"));
/// scanner.rewind();
/// assert_eq!(scanner.next(), Some("a"));
/// assert_eq!(scanner.next(), Some("b"));
/// ```
#[derive(Debug, Clone)]
pub struct RewindScanner<I: Iterator> {
    inner: I,
    last: Option<I::Item>,
    replay: bool,
}

impl<I: Iterator> RewindScanner<I> {
    /// Wrap an iterator
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            last: None,
            replay: false,
        }
    }

    /// Push the most recently yielded item back
    ///
    /// Only one item is buffered: rewinding twice without reading in between
    /// replays the same item once. Rewinding before anything was read, or
    /// after the end was reached, does nothing.
    pub fn rewind(&mut self) {
        self.replay = self.last.is_some();
    }
}

impl<'a> RewindScanner<std::str::Lines<'a>> {
    /// Scan the lines of a text
    #[must_use]
    pub fn lines(text: &'a str) -> Self {
        Self::new(text.lines())
    }
}

impl<I> Iterator for RewindScanner<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.replay {
            self.replay = false;
            return self.last.clone();
        }

        self.last = self.inner.next();
        self.last.clone()
    }
}

// Unless explicitly stated otherwise all files in this repository are licensed under the Apache License, Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2024 Datadog, Inc.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A line/column pair, both 1-based. Columns count bytes, like compiler diagnostics do.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, Builder, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position (line: {}, col: {})", self.line, self.col)
    }
}

/// A point in a source file: its byte offset and the matching [`Position`].
#[derive(Deserialize, Debug, Serialize, Clone, Copy, Builder, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub offset: usize,
    pub position: Position,
}

impl SourceLocation {
    pub const fn new(offset: usize, position: Position) -> Self {
        Self { offset, position }
    }
}

/// A contiguous span of a source file. `end` is exclusive.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, Builder, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub const fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        Self { begin, end }
    }

    /// Returns true if `other` lies entirely within this range (bounds inclusive).
    pub fn fully_contains(&self, other: &SourceRange) -> bool {
        self.begin.offset <= other.begin.offset && other.end.offset <= self.end.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(begin: usize, end: usize) -> SourceRange {
        SourceRange::new(
            SourceLocation::new(begin, Position::new(1, begin as u32 + 1)),
            SourceLocation::new(end, Position::new(1, end as u32 + 1)),
        )
    }

    #[test]
    fn test_fully_contains() {
        let body = range(10, 50);
        assert!(body.fully_contains(&range(12, 30)));
        assert!(body.fully_contains(&range(10, 50)));
        assert!(!body.fully_contains(&range(5, 30)));
        assert!(!body.fully_contains(&range(40, 51)));
        assert!(!body.fully_contains(&range(60, 70)));
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution identifiers.

crate::define_id! {
    /// Platform-assigned identifier of one execution.
    ///
    /// Doubles as the workspace key: every job carrying the same execution id
    /// runs in the same directory until the platform signals the execution
    /// finished.
    pub struct ExecutionId;
}

impl ExecutionId {
    /// Fallback key for requests that arrive without an execution id.
    pub fn from_timestamp(epoch_ms: u64) -> Self {
        Self::new(epoch_ms.to_string())
    }

    /// True when the id can be used as a single path segment.
    ///
    /// Rejects empty ids, `.`/`..`, and anything containing a path separator
    /// or NUL, all of which would resolve outside the workspace root.
    pub fn is_path_safe(&self) -> bool {
        let s = self.as_str();
        !s.is_empty()
            && s != "."
            && s != ".."
            && !s.contains(['/', '\\', '\0'])
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;

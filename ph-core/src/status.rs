/* Copyright (C) 2025 Pedro Henrique / phkaiser13
* File: ph-core/src/status.rs
* The closed outcome taxonomy every core operation terminates with.
* SPDX-License-Identifier: Apache-2.0 */

use thiserror::Error;

/// Every externally visible operation in the core terminates with exactly
/// one of these. The set is closed: adding a variant is a breaking change.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    #[error("success")]
    Success,
    #[error("invalid arguments")]
    InvalidArgs,
    #[error("not found")]
    NotFound,
    #[error("i/o error")]
    Io,
    #[error("worker execution failed")]
    ExecFailed,
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("memory allocation failed")]
    MemoryAlloc,
    #[error("configuration read error")]
    ConfigRead,
    #[error("initialization failed")]
    InitFailed,
    #[error("general error")]
    General,
}

impl Status {
    /// `true` iff the core did its job and any invoked worker reported zero.
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Stable process exit code. `0` for success, a distinct small positive
    /// integer per failure kind otherwise; the exact non-zero values are not
    /// part of the contract, only their stability across runs.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::InvalidArgs => 2,
            Status::NotFound => 3,
            Status::Io => 4,
            Status::ExecFailed => 5,
            Status::BufferTooSmall => 6,
            Status::MemoryAlloc => 7,
            Status::ConfigRead => 8,
            Status::InitFailed => 9,
            Status::General => 1,
        }
    }
}

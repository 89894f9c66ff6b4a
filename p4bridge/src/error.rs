/*
Copyright (c) 2022 VMware, Inc.
SPDX-License-Identifier: MIT
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Translation errors, mapped onto canonical RPC status codes.

use thiserror::Error as ThisError;

/// The subset of canonical RPC codes the shim surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Code {
    Ok = 0,
    Unknown = 2,
    InvalidArgument = 3,
    NotFound = 5,
    AlreadyExists = 6,
    FailedPrecondition = 9,
    Unimplemented = 12,
}

impl Code {
    pub fn from_i32(code: i32) -> Code {
        match code {
            0 => Code::Ok,
            3 => Code::InvalidArgument,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            9 => Code::FailedPrecondition,
            12 => Code::Unimplemented,
            _ => Code::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum Error {
    /// Parse failure, unknown field id, wrong action for a table, or an
    /// otherwise malformed update.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A cross-entity dependency is missing.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    /// An insert found its key already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// A modify or delete missed its key.
    #[error("not found: {0}")]
    NotFound(String),
    /// The logical table, profile or direction is not supported.
    #[error("unimplemented: {0}")]
    Unimplemented(String),
    /// A target RPC failure, with the target's message where available.
    #[error("unknown: {0}")]
    Unknown(String),
}

impl Error {
    pub fn code(&self) -> Code {
        match self {
            Error::InvalidArgument(_) => Code::InvalidArgument,
            Error::FailedPrecondition(_) => Code::FailedPrecondition,
            Error::AlreadyExists(_) => Code::AlreadyExists,
            Error::NotFound(_) => Code::NotFound,
            Error::Unimplemented(_) => Code::Unimplemented,
            Error::Unknown(_) => Code::Unknown,
        }
    }

    /// Rebuilds an error from a wire code and message.  `Ok` and unrecognized
    /// codes collapse to `Unknown`.
    pub fn from_wire(code: i32, message: impl Into<String>) -> Error {
        let message = message.into();
        match Code::from_i32(code) {
            Code::InvalidArgument => Error::InvalidArgument(message),
            Code::FailedPrecondition => Error::FailedPrecondition(message),
            Code::AlreadyExists => Error::AlreadyExists(message),
            Code::NotFound => Error::NotFound(message),
            Code::Unimplemented => Error::Unimplemented(message),
            Code::Ok | Code::Unknown => Error::Unknown(message),
        }
    }

    pub fn to_wire(&self) -> p4rt::Error {
        p4rt::Error {
            canonical_code: self.code() as i32,
            message: self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

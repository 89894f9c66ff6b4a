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

//! `p4bridge` sits between a P4Runtime controller and a P4Runtime target.
//! The controller programs a compact logical pipeline (BNG-style interface,
//! attachment, routing, ACL and punt tables); the target runs a concrete
//! fabric.p4-style pipeline.  Every logical write is translated into zero or
//! more equivalent physical writes, mirrored into in-memory stores, and
//! proxied to the target.  Reads, capability discovery, pipeline
//! configuration and the bidirectional stream pass through.

pub mod catalog;
pub mod channel;
pub mod entity;
pub mod error;
pub mod fabric;
mod fabric_helper;
pub mod parse;
pub mod service;
pub mod store;
pub mod translate;
pub mod wire;

pub use channel::{LoopbackTarget, StreamPair, TargetChannel};
pub use error::{Code, Error, Result};
pub use fabric::FabricProcessor;
pub use service::{PipelineBundle, Shim};
pub use translate::{Processor, Translator};

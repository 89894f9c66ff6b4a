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

//! The shim service: the `Write` translation pipeline, pipeline-config
//! verification and swap, and the pass-through operations.
//!
//! One coarse lock serializes the whole `Write` path, the downstream proxy
//! RPC included, so the in-memory stores mirror the target after every
//! committed update.  The other operations do not take the lock.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use tracing::{debug, info, warn};

use p4rt::{
    write_request, CapabilitiesRequest, CapabilitiesResponse, GetForwardingPipelineConfigRequest,
    GetForwardingPipelineConfigResponse, ReadRequest, ReadResponse,
    SetForwardingPipelineConfigRequest, SetForwardingPipelineConfigResponse, StreamMessageRequest,
    StreamMessageResponse, Update, WriteRequest, WriteResponse,
};

use crate::channel::TargetChannel;
use crate::error::{Code, Error, Result};
use crate::store::{LogicalStore, P4rtStore};
use crate::translate::{self, Translator};

/// The schema blobs the shim serves with: the logical schema the controller
/// must present, and the target schema and device config that replace it on
/// the way down.
#[derive(Clone, Debug, Default)]
pub struct PipelineBundle {
    pub logical_p4info: Vec<u8>,
    pub target_p4info: Vec<u8>,
    pub target_device_config: Vec<u8>,
}

struct State {
    /// Raw logical entries, keyed by wire identity.
    server_store: P4rtStore,
    /// Mirror of what has been written to the target.
    target_store: P4rtStore,
    /// Indexed view of the logical pipeline.
    logical: LogicalStore,
    translator: Translator,
}

pub struct Shim<C: TargetChannel> {
    state: Mutex<State>,
    target: C,
    bundle: PipelineBundle,
}

impl<C: TargetChannel> Shim<C> {
    pub fn new(target: C, translator: Translator, bundle: PipelineBundle) -> Shim<C> {
        Shim {
            state: Mutex::new(State {
                server_store: P4rtStore::new(),
                target_store: P4rtStore::new(),
                logical: LogicalStore::new(),
                translator,
            }),
            target,
            bundle,
        }
    }

    /// A copy of the raw logical entry store.
    pub fn server_snapshot(&self) -> P4rtStore {
        self.state.lock().unwrap().server_store.clone()
    }

    /// A copy of the target mirror store.
    pub fn mirror_snapshot(&self) -> P4rtStore {
        self.state.lock().unwrap().target_store.clone()
    }

    pub fn capabilities(&self, req: &CapabilitiesRequest) -> Result<CapabilitiesResponse> {
        debug!("ctrl >> CapabilitiesRequest");
        self.target.capabilities(req)
    }

    /// Translates and applies a logical write.  Updates run one by one;
    /// a failed update is skipped and the rest still run (the only accepted
    /// atomicity mode).  The error carries one detail record per update, in
    /// request order.
    pub fn write(&self, req: &WriteRequest) -> std::result::Result<WriteResponse, p4rt::Status> {
        debug!("ctrl >> WriteRequest with {} updates", req.updates.len());
        if req.atomicity != write_request::Atomicity::ContinueOnError as i32 {
            let err = Error::Unimplemented(format!("write atomicity {}", req.atomicity));
            return Err(p4rt::Status {
                code: err.code() as i32,
                message: err.to_string(),
                details: Vec::new(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let mut details = Vec::with_capacity(req.updates.len());
        let mut failed = 0usize;
        for u in &req.updates {
            match self.write_update(&mut state, req, u) {
                Ok(()) => details.push(p4rt::Error {
                    canonical_code: Code::Ok as i32,
                    message: String::new(),
                }),
                Err(e) => {
                    warn!("update failed: {}", e);
                    failed += 1;
                    details.push(e.to_wire());
                }
            }
        }
        if failed == 0 {
            Ok(WriteResponse {})
        } else {
            Err(p4rt::Status {
                code: Code::Unknown as i32,
                message: format!("{} of {} updates failed", failed, req.updates.len()),
                details,
            })
        }
    }

    fn write_update(&self, state: &mut State, req: &WriteRequest, u: &Update) -> Result<()> {
        let State {
            ref mut server_store,
            ref mut target_store,
            ref mut logical,
            ref translator,
        } = *state;
        // Validate the logical update against both stores before anything
        // else; nothing is committed unless the whole chain succeeds.
        server_store.apply(u, true)?;
        logical.apply(u, true)?;
        let physical = translator.translate(u, logical, target_store)?;
        if physical.is_empty() {
            debug!("translation produced no physical updates");
        } else {
            let physical_req = WriteRequest {
                device_id: req.device_id,
                role_id: req.role_id,
                election_id: req.election_id,
                updates: physical.clone(),
                atomicity: req.atomicity,
            };
            debug!(">> trgt WriteRequest with {} updates", physical.len());
            self.target.write(&physical_req)?;
        }
        // The target accepted the write (or none was needed); mirror it.
        translate::commit(u, &physical, logical, server_store, target_store);
        Ok(())
    }

    pub fn read(&self, req: &ReadRequest) -> Result<Vec<ReadResponse>> {
        debug!("ctrl >> ReadRequest");
        self.target.read(req)
    }

    /// Verifies the controller's schema against the bundled logical schema,
    /// then forwards the request with the target's schema and device config
    /// swapped in.
    pub fn set_forwarding_pipeline_config(
        &self,
        req: &SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse> {
        debug!("ctrl >> SetForwardingPipelineConfigRequest");
        let config = req
            .config
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("request carries no config".to_string()))?;
        if config.p4info != self.bundle.logical_p4info {
            return Err(Error::InvalidArgument("p4info not supported".to_string()));
        }
        let mut forwarded = req.clone();
        if let Some(c) = forwarded.config.as_mut() {
            c.p4info = self.bundle.target_p4info.clone();
            c.p4_device_config = self.bundle.target_device_config.clone();
        }
        self.target.set_forwarding_pipeline_config(&forwarded)
    }

    pub fn get_forwarding_pipeline_config(
        &self,
        req: &GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse> {
        debug!("ctrl >> GetForwardingPipelineConfigRequest");
        self.target.get_forwarding_pipeline_config(req)
    }

    /// A pure bidirectional proxy: everything from the controller goes to
    /// the target and vice versa.  Returns when either side closes; closing
    /// one side closes the other.
    pub fn stream_channel(
        &self,
        from_ctrl: Receiver<StreamMessageRequest>,
        to_ctrl: Sender<StreamMessageResponse>,
    ) -> Result<()> {
        info!("stream channel opened");
        let pair = self.target.stream_channel()?;
        let to_target = pair.tx;
        let from_target = pair.rx;
        thread::scope(|s| {
            s.spawn(move || {
                for msg in from_ctrl {
                    if to_target.send(msg).is_err() {
                        break;
                    }
                }
                // Dropping the sender tells the target we are done.
            });
            s.spawn(move || {
                for msg in from_target {
                    if to_ctrl.send(msg).is_err() {
                        break;
                    }
                }
            });
        });
        info!("stream channel closed");
        Ok(())
    }
}

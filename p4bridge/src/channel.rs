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

//! The downstream client seam.  The service talks to the target exclusively
//! through [`TargetChannel`]; the deployment's RPC skeleton plugs in here.
//! [`LoopbackTarget`] is an in-process stand-in for a switch, used by the
//! tests and for bring-up.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::thread;

use tracing::debug;

use p4rt::{
    entity, CapabilitiesRequest, CapabilitiesResponse, Entity, ForwardingPipelineConfig,
    GetForwardingPipelineConfigRequest, GetForwardingPipelineConfigResponse, MasterArbitrationUpdate,
    ReadRequest, ReadResponse, SetForwardingPipelineConfigRequest,
    SetForwardingPipelineConfigResponse, StreamMessageRequest, StreamMessageResponse, WriteRequest,
    WriteResponse,
};

use crate::error::{Error, Result};
use crate::store::P4rtStore;

/// The two ends of an open stream towards the target.
pub struct StreamPair {
    pub tx: Sender<StreamMessageRequest>,
    pub rx: Receiver<StreamMessageResponse>,
}

/// Client handle to the single downstream target.
pub trait TargetChannel: Send + Sync {
    fn capabilities(&self, req: &CapabilitiesRequest) -> Result<CapabilitiesResponse>;
    fn write(&self, req: &WriteRequest) -> Result<WriteResponse>;
    fn read(&self, req: &ReadRequest) -> Result<Vec<ReadResponse>>;
    fn set_forwarding_pipeline_config(
        &self,
        req: &SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse>;
    fn get_forwarding_pipeline_config(
        &self,
        req: &GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse>;
    fn stream_channel(&self) -> Result<StreamPair>;
}

impl<T: TargetChannel + ?Sized> TargetChannel for std::sync::Arc<T> {
    fn capabilities(&self, req: &CapabilitiesRequest) -> Result<CapabilitiesResponse> {
        (**self).capabilities(req)
    }

    fn write(&self, req: &WriteRequest) -> Result<WriteResponse> {
        (**self).write(req)
    }

    fn read(&self, req: &ReadRequest) -> Result<Vec<ReadResponse>> {
        (**self).read(req)
    }

    fn set_forwarding_pipeline_config(
        &self,
        req: &SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse> {
        (**self).set_forwarding_pipeline_config(req)
    }

    fn get_forwarding_pipeline_config(
        &self,
        req: &GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse> {
        (**self).get_forwarding_pipeline_config(req)
    }

    fn stream_channel(&self) -> Result<StreamPair> {
        (**self).stream_channel()
    }
}

/// An in-process target.  Writes land in its own entity store with the same
/// validation a switch would perform; the stream end echoes arbitration
/// updates back to the caller.
#[derive(Default)]
pub struct LoopbackTarget {
    store: Mutex<P4rtStore>,
    config: Mutex<Option<ForwardingPipelineConfig>>,
}

impl LoopbackTarget {
    pub fn new() -> LoopbackTarget {
        LoopbackTarget::default()
    }

    /// A copy of the target's entity store, for assertions.
    pub fn snapshot(&self) -> P4rtStore {
        self.store.lock().unwrap().clone()
    }
}

impl TargetChannel for LoopbackTarget {
    fn capabilities(&self, _req: &CapabilitiesRequest) -> Result<CapabilitiesResponse> {
        Ok(CapabilitiesResponse {
            p4runtime_api_version: "1.3.0".to_string(),
        })
    }

    fn write(&self, req: &WriteRequest) -> Result<WriteResponse> {
        let mut store = self.store.lock().unwrap();
        for u in &req.updates {
            store.apply(u, true).map_err(|e| Error::Unknown(e.to_string()))?;
        }
        for u in &req.updates {
            store
                .apply(u, false)
                .map_err(|e| Error::Unknown(e.to_string()))?;
        }
        Ok(WriteResponse {})
    }

    fn read(&self, req: &ReadRequest) -> Result<Vec<ReadResponse>> {
        let store = self.store.lock().unwrap();
        let mut responses = Vec::new();
        for wanted in &req.entities {
            let entities: Vec<Entity> = match wanted.entity.as_ref() {
                Some(entity::Entity::TableEntry(pattern)) => store
                    .filter_table_entries(|e| pattern.table_id == 0 || e.table_id == pattern.table_id)
                    .into_iter()
                    .map(|e| Entity {
                        entity: Some(entity::Entity::TableEntry(e.clone())),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            responses.push(ReadResponse { entities });
        }
        Ok(responses)
    }

    fn set_forwarding_pipeline_config(
        &self,
        req: &SetForwardingPipelineConfigRequest,
    ) -> Result<SetForwardingPipelineConfigResponse> {
        *self.config.lock().unwrap() = req.config.clone();
        Ok(SetForwardingPipelineConfigResponse {})
    }

    fn get_forwarding_pipeline_config(
        &self,
        _req: &GetForwardingPipelineConfigRequest,
    ) -> Result<GetForwardingPipelineConfigResponse> {
        Ok(GetForwardingPipelineConfigResponse {
            config: self.config.lock().unwrap().clone(),
        })
    }

    fn stream_channel(&self) -> Result<StreamPair> {
        let (req_tx, req_rx) = channel::<StreamMessageRequest>();
        let (resp_tx, resp_rx) = channel::<StreamMessageResponse>();
        thread::spawn(move || {
            for msg in req_rx {
                match msg.update {
                    Some(p4rt::stream_message_request::Update::Arbitration(arb)) => {
                        let reply = StreamMessageResponse {
                            update: Some(p4rt::stream_message_response::Update::Arbitration(
                                MasterArbitrationUpdate {
                                    device_id: arb.device_id,
                                    election_id: arb.election_id,
                                    status: arb.status,
                                },
                            )),
                        };
                        if resp_tx.send(reply).is_err() {
                            break;
                        }
                    }
                    other => debug!("loopback stream ignoring {:?}", other),
                }
            }
        });
        Ok(StreamPair {
            tx: req_tx,
            rx: resp_rx,
        })
    }
}

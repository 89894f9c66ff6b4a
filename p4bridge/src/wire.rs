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

//! A compact framed transport for the service operations: one byte of
//! method tag, a big-endian length, and the protobuf-encoded message.  Unary
//! calls use one connection each; a stream turns its connection into a
//! duplex message pipe.  A deployment that fronts the shim with a full RPC
//! skeleton replaces this module at the [`TargetChannel`] seam.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use prost::Message;
use tracing::{debug, warn};

use p4rt::{
    CapabilitiesRequest, GetForwardingPipelineConfigRequest, ReadRequest, ReadResponse,
    SetForwardingPipelineConfigRequest, StreamMessageRequest, StreamMessageResponse, WriteRequest,
};

use crate::channel::{StreamPair, TargetChannel};
use crate::error::{Error, Result};
use crate::service::Shim;

const TAG_CAPABILITIES: u8 = 0x01;
const TAG_WRITE: u8 = 0x02;
const TAG_READ: u8 = 0x03;
const TAG_SET_CONFIG: u8 = 0x04;
const TAG_GET_CONFIG: u8 = 0x05;
const TAG_STREAM_OPEN: u8 = 0x06;
const TAG_STREAM_MSG: u8 = 0x07;
const TAG_STREAM_CLOSE: u8 = 0x08;
const TAG_OK: u8 = 0x80;
const TAG_ERR: u8 = 0x81;
const TAG_ITEM: u8 = 0x82;

const MAX_FRAME_LEN: usize = 64 << 20;

fn io_err(e: io::Error) -> Error {
    Error::Unknown(format!("transport: {}", e))
}

fn decode_err(e: prost::DecodeError) -> Error {
    Error::InvalidArgument(format!("malformed frame: {}", e))
}

fn write_frame<W: Write>(w: &mut W, tag: u8, payload: &[u8]) -> io::Result<()> {
    w.write_u8(tag)?;
    w.write_u32::<BigEndian>(payload.len() as u32)?;
    w.write_all(payload)?;
    w.flush()
}

fn write_msg<W: Write, M: Message>(w: &mut W, tag: u8, msg: &M) -> io::Result<()> {
    write_frame(w, tag, &msg.encode_to_vec())
}

fn read_frame<R: Read>(r: &mut R) -> io::Result<(u8, Vec<u8>)> {
    let tag = r.read_u8()?;
    let len = r.read_u32::<BigEndian>()? as usize;
    if len > MAX_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes", len),
        ));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    Ok((tag, payload))
}

fn status_of(e: &Error) -> p4rt::Status {
    p4rt::Status {
        code: e.code() as i32,
        message: e.to_string(),
        details: Vec::new(),
    }
}

/// Client side of the framed transport; implements the downstream channel
/// against a configured address, dialing per call.
pub struct Client {
    addr: String,
}

impl Client {
    pub fn connect(addr: impl Into<String>) -> Client {
        Client { addr: addr.into() }
    }

    fn unary<Req: Message, Resp: Message + Default>(&self, tag: u8, req: &Req) -> Result<Resp> {
        let mut stream = TcpStream::connect(&self.addr).map_err(io_err)?;
        write_msg(&mut stream, tag, req).map_err(io_err)?;
        let (rtag, payload) = read_frame(&mut stream).map_err(io_err)?;
        match rtag {
            TAG_OK => Resp::decode(payload.as_slice()).map_err(decode_err),
            TAG_ERR => {
                let status = p4rt::Status::decode(payload.as_slice()).map_err(decode_err)?;
                Err(Error::from_wire(status.code, status.message))
            }
            other => Err(Error::Unknown(format!("unexpected frame tag {:#x}", other))),
        }
    }
}

impl TargetChannel for Client {
    fn capabilities(&self, req: &CapabilitiesRequest) -> Result<p4rt::CapabilitiesResponse> {
        self.unary(TAG_CAPABILITIES, req)
    }

    fn write(&self, req: &WriteRequest) -> Result<p4rt::WriteResponse> {
        self.unary(TAG_WRITE, req)
    }

    fn read(&self, req: &ReadRequest) -> Result<Vec<ReadResponse>> {
        let mut stream = TcpStream::connect(&self.addr).map_err(io_err)?;
        write_msg(&mut stream, TAG_READ, req).map_err(io_err)?;
        let mut responses = Vec::new();
        loop {
            let (rtag, payload) = read_frame(&mut stream).map_err(io_err)?;
            match rtag {
                TAG_ITEM => {
                    responses.push(ReadResponse::decode(payload.as_slice()).map_err(decode_err)?)
                }
                TAG_OK => return Ok(responses),
                TAG_ERR => {
                    let status = p4rt::Status::decode(payload.as_slice()).map_err(decode_err)?;
                    return Err(Error::from_wire(status.code, status.message));
                }
                other => return Err(Error::Unknown(format!("unexpected frame tag {:#x}", other))),
            }
        }
    }

    fn set_forwarding_pipeline_config(
        &self,
        req: &SetForwardingPipelineConfigRequest,
    ) -> Result<p4rt::SetForwardingPipelineConfigResponse> {
        self.unary(TAG_SET_CONFIG, req)
    }

    fn get_forwarding_pipeline_config(
        &self,
        req: &GetForwardingPipelineConfigRequest,
    ) -> Result<p4rt::GetForwardingPipelineConfigResponse> {
        self.unary(TAG_GET_CONFIG, req)
    }

    fn stream_channel(&self) -> Result<StreamPair> {
        let mut stream = TcpStream::connect(&self.addr).map_err(io_err)?;
        write_frame(&mut stream, TAG_STREAM_OPEN, &[]).map_err(io_err)?;
        let reader = stream.try_clone().map_err(io_err)?;
        let (req_tx, req_rx) = channel::<StreamMessageRequest>();
        let (resp_tx, resp_rx) = channel::<StreamMessageResponse>();
        thread::spawn(move || {
            let mut stream = stream;
            for msg in req_rx {
                if write_msg(&mut stream, TAG_STREAM_MSG, &msg).is_err() {
                    break;
                }
            }
            let _ = write_frame(&mut stream, TAG_STREAM_CLOSE, &[]);
            let _ = stream.shutdown(Shutdown::Both);
        });
        thread::spawn(move || {
            let mut reader = reader;
            loop {
                match read_frame(&mut reader) {
                    Ok((TAG_STREAM_MSG, payload)) => {
                        let Ok(msg) = StreamMessageResponse::decode(payload.as_slice()) else {
                            break;
                        };
                        if resp_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        });
        Ok(StreamPair {
            tx: req_tx,
            rx: resp_rx,
        })
    }
}

/// Accepts controller connections and dispatches them to the shim, one
/// thread per connection.
pub fn serve<C: TargetChannel + 'static>(listener: TcpListener, shim: Arc<Shim<C>>) -> io::Result<()> {
    for conn in listener.incoming() {
        match conn {
            Ok(stream) => {
                let shim = Arc::clone(&shim);
                thread::spawn(move || {
                    if let Err(e) = handle_conn(stream, shim) {
                        debug!("connection ended: {}", e);
                    }
                });
            }
            Err(e) => warn!("accept failed: {}", e),
        }
    }
    Ok(())
}

fn respond<W: Write, M: Message>(stream: &mut W, result: Result<M>) -> io::Result<()> {
    match result {
        Ok(msg) => write_msg(stream, TAG_OK, &msg),
        Err(e) => write_msg(stream, TAG_ERR, &status_of(&e)),
    }
}

fn handle_conn<C: TargetChannel>(mut stream: TcpStream, shim: Arc<Shim<C>>) -> io::Result<()> {
    let (tag, payload) = read_frame(&mut stream)?;
    match tag {
        TAG_CAPABILITIES => {
            let result = CapabilitiesRequest::decode(payload.as_slice())
                .map_err(decode_err)
                .and_then(|req| shim.capabilities(&req));
            respond(&mut stream, result)
        }
        TAG_WRITE => match WriteRequest::decode(payload.as_slice()) {
            Err(e) => write_msg(&mut stream, TAG_ERR, &status_of(&decode_err(e))),
            Ok(req) => match shim.write(&req) {
                Ok(resp) => write_msg(&mut stream, TAG_OK, &resp),
                Err(status) => write_msg(&mut stream, TAG_ERR, &status),
            },
        },
        TAG_READ => {
            let result = ReadRequest::decode(payload.as_slice())
                .map_err(decode_err)
                .and_then(|req| shim.read(&req));
            match result {
                Ok(responses) => {
                    for r in &responses {
                        write_msg(&mut stream, TAG_ITEM, r)?;
                    }
                    write_frame(&mut stream, TAG_OK, &[])
                }
                Err(e) => write_msg(&mut stream, TAG_ERR, &status_of(&e)),
            }
        }
        TAG_SET_CONFIG => {
            let result = SetForwardingPipelineConfigRequest::decode(payload.as_slice())
                .map_err(decode_err)
                .and_then(|req| shim.set_forwarding_pipeline_config(&req));
            respond(&mut stream, result)
        }
        TAG_GET_CONFIG => {
            let result = GetForwardingPipelineConfigRequest::decode(payload.as_slice())
                .map_err(decode_err)
                .and_then(|req| shim.get_forwarding_pipeline_config(&req));
            respond(&mut stream, result)
        }
        TAG_STREAM_OPEN => handle_stream(stream, shim),
        other => {
            warn!("unexpected frame tag {:#x}", other);
            write_msg(
                &mut stream,
                TAG_ERR,
                &status_of(&Error::Unimplemented(format!("frame tag {:#x}", other))),
            )
        }
    }
}

fn handle_stream<C: TargetChannel>(stream: TcpStream, shim: Arc<Shim<C>>) -> io::Result<()> {
    let reader = stream.try_clone()?;
    let (req_tx, req_rx) = channel::<StreamMessageRequest>();
    let (resp_tx, resp_rx) = channel::<StreamMessageResponse>();
    let read_side = thread::spawn(move || {
        let mut reader = reader;
        loop {
            match read_frame(&mut reader) {
                Ok((TAG_STREAM_MSG, payload)) => {
                    let Ok(msg) = StreamMessageRequest::decode(payload.as_slice()) else {
                        break;
                    };
                    if req_tx.send(msg).is_err() {
                        break;
                    }
                }
                _ => break,
            }
        }
    });
    let write_side = thread::spawn(move || {
        let mut stream = stream;
        for msg in resp_rx {
            if write_msg(&mut stream, TAG_STREAM_MSG, &msg).is_err() {
                break;
            }
        }
        let _ = write_frame(&mut stream, TAG_STREAM_CLOSE, &[]);
        let _ = stream.shutdown(Shutdown::Both);
    });
    if let Err(e) = shim.stream_channel(req_rx, resp_tx) {
        warn!("stream channel failed: {}", e);
    }
    let _ = read_side.join();
    let _ = write_side.join();
    Ok(())
}

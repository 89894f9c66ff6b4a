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

//! Typed records for the logical pipeline, and the fixed-width keys used to
//! index them.  All match and action-parameter values are opaque big-endian
//! byte strings; comparisons are byte-wise.

use std::fmt;

use p4rt::TableEntry;

/// The traffic direction an attachment-level entry belongs to, owned by the
/// logical table the entry was parsed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Unspecified,
    Upstream,
    Downstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Unspecified => "?",
            Direction::Upstream => "UP",
            Direction::Downstream => "DOWN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IfTypeEntry {
    pub port: Vec<u8>,
    pub if_type: Vec<u8>,
}

impl fmt::Display for IfTypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port: {}, IfType: {}",
            hex::encode(&self.port),
            hex::encode(&self.if_type)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MyStationEntry {
    pub port: Vec<u8>,
    pub eth_dst: Vec<u8>,
}

impl fmt::Display for MyStationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port: {}, EthDst: {}",
            hex::encode(&self.port),
            hex::encode(&self.eth_dst)
        )
    }
}

/// A subscriber attachment.  The state of an attachment is spread over
/// several logical tables, so every field except the line id may be missing
/// until accumulation completes.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AttachmentEntry {
    pub direction: Direction,
    pub line_id: Vec<u8>,
    pub port: Option<Vec<u8>>,
    pub s_tag: Option<Vec<u8>>,
    pub c_tag: Option<Vec<u8>>,
    pub mac_addr: Option<Vec<u8>>,
    pub ipv4_addr: Option<Vec<u8>>,
    pub pppoe_sess_id: Option<Vec<u8>>,
}

impl AttachmentEntry {
    /// An attachment is complete when every canonical field is known.
    pub fn is_complete(&self) -> bool {
        self.port.is_some()
            && self.s_tag.is_some()
            && self.c_tag.is_some()
            && self.mac_addr.is_some()
            && self.ipv4_addr.is_some()
            && self.pppoe_sess_id.is_some()
    }
}

fn opt_hex(v: &Option<Vec<u8>>) -> String {
    match v {
        Some(b) => hex::encode(b),
        None => "-".to_string(),
    }
}

impl fmt::Display for AttachmentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dir: {}, LineId: {}, Port: {}, STag: {}, CTag: {}, MacAddr: {}, Ipv4Addr: {}, PppoeSessId: {}",
            self.direction,
            hex::encode(&self.line_id),
            opt_hex(&self.port),
            opt_hex(&self.s_tag),
            opt_hex(&self.c_tag),
            opt_hex(&self.mac_addr),
            opt_hex(&self.ipv4_addr),
            opt_hex(&self.pppoe_sess_id)
        )
    }
}

/// An action profile member of an ECMP-capable routing table.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NextHopEntry {
    pub id: u32,
    pub port: Vec<u8>,
    pub mac_addr: Vec<u8>,
}

impl fmt::Display for NextHopEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Id: {}, Port: {}, MacAddr: {}",
            self.id,
            hex::encode(&self.port),
            hex::encode(&self.mac_addr)
        )
    }
}

/// An ECMP group of next hops.  The wire representation works fine as-is; no
/// higher-level abstraction is needed.
pub type NextHopGroup = p4rt::ActionProfileGroup;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RouteV4Entry {
    pub direction: Direction,
    pub ipv4_addr: Vec<u8>,
    pub prefix_len: i32,
    pub next_hop_group_id: u32,
}

impl fmt::Display for RouteV4Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dir: {}, Ipv4Addr: {}, PrefixLen: {}, NextHopGroupId: {}",
            self.direction,
            hex::encode(&self.ipv4_addr),
            self.prefix_len,
            self.next_hop_group_id
        )
    }
}

/// An entry of the logical ACL table.  The wire entry is kept whole; the
/// processor maps its fields onto the physical ACL table.
#[derive(Clone, Debug, PartialEq)]
pub struct AclEntry(pub TableEntry);

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PppoePuntedEntry {
    pub pppoe_code: Vec<u8>,
    pub pppoe_proto: Option<Vec<u8>>,
}

impl fmt::Display for PppoePuntedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PppoeCode: {}, PppoeProto: {}",
            hex::encode(&self.pppoe_code),
            opt_hex(&self.pppoe_proto)
        )
    }
}

/// A 2-byte port number key.  Values narrower than the schema width are
/// right-aligned, values wider keep their trailing bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PortKey([u8; 2]);

impl PortKey {
    pub fn from_bytes(b: &[u8]) -> PortKey {
        PortKey(canonicalize(b))
    }
}

/// A 4-byte subscriber line id key, canonicalized like [`PortKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineIdKey([u8; 4]);

impl LineIdKey {
    pub fn from_bytes(b: &[u8]) -> LineIdKey {
        LineIdKey(canonicalize(b))
    }
}

fn canonicalize<const N: usize>(b: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let take = b.len().min(N);
    out[N - take..].copy_from_slice(&b[b.len() - take..]);
    out
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ipv4LpmKey(String);

impl Ipv4LpmKey {
    pub fn new(addr: &[u8], prefix_len: i32) -> Ipv4LpmKey {
        Ipv4LpmKey(format!("{}/{}", hex::encode(addr), prefix_len))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CtrlPuntedKey(String);

impl CtrlPuntedKey {
    pub fn new(pppoe_code: &[u8], pppoe_proto: Option<&[u8]>) -> CtrlPuntedKey {
        CtrlPuntedKey(format!(
            "{}/{}",
            hex::encode(pppoe_code),
            pppoe_proto.map(hex::encode).unwrap_or_default()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_completeness() {
        let mut a = AttachmentEntry {
            direction: Direction::Upstream,
            line_id: vec![0, 0, 0, 1],
            port: Some(vec![0, 1]),
            s_tag: Some(vec![0, 100]),
            c_tag: Some(vec![0, 10]),
            mac_addr: Some(vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01]),
            ipv4_addr: Some(vec![10, 0, 0, 1]),
            pppoe_sess_id: Some(vec![1, 1]),
        };
        assert!(a.is_complete());
        for clear in 0..6 {
            let mut b = a.clone();
            match clear {
                0 => b.port = None,
                1 => b.s_tag = None,
                2 => b.c_tag = None,
                3 => b.mac_addr = None,
                4 => b.ipv4_addr = None,
                _ => b.pppoe_sess_id = None,
            }
            assert!(!b.is_complete());
        }
        a.line_id = vec![];
        assert!(a.is_complete(), "line id does not participate");
    }

    #[test]
    fn key_canonicalization() {
        assert_eq!(PortKey::from_bytes(&[0x01]), PortKey::from_bytes(&[0x00, 0x01]));
        assert_ne!(PortKey::from_bytes(&[0x01]), PortKey::from_bytes(&[0x01, 0x00]));
        assert_eq!(
            LineIdKey::from_bytes(&[0x01, 0x02]),
            LineIdKey::from_bytes(&[0x00, 0x00, 0x01, 0x02])
        );
    }

    #[test]
    fn lpm_key_distinguishes_prefix_len() {
        assert_ne!(
            Ipv4LpmKey::new(&[10, 0, 0, 0], 8),
            Ipv4LpmKey::new(&[10, 0, 0, 0], 16)
        );
        assert_eq!(
            Ipv4LpmKey::new(&[10, 0, 0, 0], 8),
            Ipv4LpmKey::new(&[10, 0, 0, 0], 8)
        );
    }
}

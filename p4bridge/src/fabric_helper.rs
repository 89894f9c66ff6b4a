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

//! Builders for the physical fabric.p4 entries the processor emits.

use byteorder::{BigEndian, ByteOrder};

use p4rt::{Action, ActionProfileMember, FieldMatch, TableAction, TableEntry};

use crate::catalog::fabric::*;
use crate::entity::NextHopEntry;
use crate::fabric::{ETH_TYPE_IPV4, FWD_TYPE_IPV4_UNICAST};

const VLAN_ID_MASK: [u8; 2] = [0x0f, 0xff];
const ETH_FULL_MASK: [u8; 6] = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff];

pub fn vlan_id_value(vlan_id: u16) -> Vec<u8> {
    let mut b = vec![0u8; 2];
    BigEndian::write_u16(&mut b, vlan_id);
    b
}

pub fn eth_type_value(eth_type: u16) -> Vec<u8> {
    let mut b = vec![0u8; 2];
    BigEndian::write_u16(&mut b, eth_type);
    b
}

pub fn next_id_value(next_id: u32) -> Vec<u8> {
    let mut b = vec![0u8; 4];
    BigEndian::write_u32(&mut b, next_id);
    b
}

/// A numeric view of an id value, right-aligned big-endian.
pub fn id_of(bytes: &[u8]) -> u32 {
    let mut b = [0u8; 4];
    let take = bytes.len().min(4);
    b[4 - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    BigEndian::read_u32(&b)
}

pub fn egress_vlan_pop_entry(port: &[u8], internal_vlan: u16) -> TableEntry {
    TableEntry {
        table_id: TBL_EGRESS_VLAN,
        r#match: vec![
            FieldMatch::exact(HDR_EGRESS_VLAN_VLAN_ID, vlan_id_value(internal_vlan)),
            FieldMatch::exact(HDR_EGRESS_VLAN_EG_PORT, port.to_vec()),
        ],
        action: Some(TableAction::direct(Action::new(ACTION_POP_VLAN))),
        priority: 0,
    }
}

/// The permit entry of the ingress-port-vlan table.  With `vlan_id` the
/// entry matches tagged traffic (ternary tags under the 12-bit mask);
/// without it, untagged.  With `internal_vlan` the action assigns the
/// internal tag, otherwise it plainly permits.
pub fn ingress_port_vlan_entry_permit(
    port: &[u8],
    vlan_id: Option<&[u8]>,
    inner_vlan_id: Option<&[u8]>,
    internal_vlan: Option<Vec<u8>>,
    priority: i32,
) -> TableEntry {
    let mut fields = vec![FieldMatch::exact(HDR_INGRESS_PORT_VLAN_IG_PORT, port.to_vec())];
    match vlan_id {
        Some(vlan_id) => {
            fields.push(FieldMatch::exact(HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID, vec![0x01]));
            fields.push(FieldMatch::ternary(
                HDR_INGRESS_PORT_VLAN_VLAN_ID,
                vlan_id.to_vec(),
                VLAN_ID_MASK.to_vec(),
            ));
            if let Some(inner) = inner_vlan_id {
                fields.push(FieldMatch::ternary(
                    HDR_INGRESS_PORT_VLAN_INNER_VLAN_ID,
                    inner.to_vec(),
                    VLAN_ID_MASK.to_vec(),
                ));
            }
        }
        None => {
            fields.push(FieldMatch::exact(HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID, vec![0x00]));
        }
    }
    let action = match internal_vlan {
        Some(internal_vlan) => Action::new(ACTION_PERMIT_WITH_INTERNAL_VLAN)
            .with_param(PARAM_PERMIT_WITH_INTERNAL_VLAN_VLAN_ID, internal_vlan),
        None => Action::new(ACTION_PERMIT),
    };
    TableEntry {
        table_id: TBL_INGRESS_PORT_VLAN,
        r#match: fields,
        action: Some(TableAction::direct(action)),
        priority,
    }
}

pub fn fwd_classifier_entry(port: &[u8], eth_dst: &[u8], priority: i32) -> TableEntry {
    TableEntry {
        table_id: TBL_FWD_CLASSIFIER,
        r#match: vec![
            FieldMatch::exact(HDR_FWD_CLASSIFIER_IG_PORT, port.to_vec()),
            FieldMatch::ternary(HDR_FWD_CLASSIFIER_ETH_DST, eth_dst.to_vec(), ETH_FULL_MASK.to_vec()),
            FieldMatch::exact(HDR_FWD_CLASSIFIER_IP_ETH_TYPE, eth_type_value(ETH_TYPE_IPV4)),
        ],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_FORWARDING_TYPE)
                .with_param(PARAM_SET_FORWARDING_TYPE_FWD_TYPE, vec![FWD_TYPE_IPV4_UNICAST]),
        )),
        priority,
    }
}

pub fn pppoe_punt_entry(pppoe_code: &[u8], pppoe_proto: Option<&[u8]>, priority: i32) -> TableEntry {
    let mut fields = vec![FieldMatch::exact(HDR_PPPOE_CP_PPPOE_CODE, pppoe_code.to_vec())];
    if let Some(proto) = pppoe_proto {
        fields.push(FieldMatch::ternary(
            HDR_PPPOE_CP_PPPOE_PROTOCOL,
            proto.to_vec(),
            vec![0xff, 0xff],
        ));
    }
    TableEntry {
        table_id: TBL_PPPOE_CP,
        r#match: fields,
        action: Some(TableAction::direct(Action::new(ACTION_UPSTREAM_PUNT_TO_CPU))),
        priority,
    }
}

pub fn line_map_entry(s_tag: &[u8], c_tag: &[u8], line_id: &[u8]) -> TableEntry {
    TableEntry {
        table_id: TBL_LINE_MAP,
        r#match: vec![
            FieldMatch::exact(HDR_LINE_MAP_S_TAG, s_tag.to_vec()),
            FieldMatch::exact(HDR_LINE_MAP_C_TAG, c_tag.to_vec()),
        ],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_LINE).with_param(PARAM_SET_LINE_LINE_ID, line_id.to_vec()),
        )),
        priority: 0,
    }
}

pub fn pppoe_term_v4_entry(line_id: &[u8], ipv4_addr: &[u8], pppoe_sess_id: &[u8]) -> TableEntry {
    TableEntry {
        table_id: TBL_PPPOE_TERM_V4,
        r#match: vec![
            FieldMatch::exact(HDR_PPPOE_TERM_V4_LINE_ID, line_id.to_vec()),
            FieldMatch::exact(HDR_PPPOE_TERM_V4_IPV4_SRC, ipv4_addr.to_vec()),
            FieldMatch::exact(HDR_PPPOE_TERM_V4_PPPOE_SESSION_ID, pppoe_sess_id.to_vec()),
        ],
        action: Some(TableAction::direct(Action::new(ACTION_TERM_ENABLED_V4))),
        priority: 0,
    }
}

pub fn line_session_map_entry(line_id: &[u8], pppoe_sess_id: &[u8]) -> TableEntry {
    TableEntry {
        table_id: TBL_LINE_SESSION_MAP,
        r#match: vec![FieldMatch::exact(HDR_LINE_SESSION_MAP_LINE_ID, line_id.to_vec())],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_SESSION)
                .with_param(PARAM_SET_SESSION_PPPOE_SESSION_ID, pppoe_sess_id.to_vec()),
        )),
        priority: 0,
    }
}

pub fn routing_v4_entry(ipv4_addr: &[u8], prefix_len: i32, next_id: u32) -> TableEntry {
    TableEntry {
        table_id: TBL_ROUTING_V4,
        r#match: vec![FieldMatch::lpm(HDR_ROUTING_V4_IPV4_DST, ipv4_addr.to_vec(), prefix_len)],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_NEXT_ID_ROUTING_V4)
                .with_param(PARAM_SET_NEXT_ID_ROUTING_V4_NEXT_ID, next_id_value(next_id)),
        )),
        priority: 0,
    }
}

pub fn next_hashed_entry(next_id: u32, group_id: u32) -> TableEntry {
    TableEntry {
        table_id: TBL_NEXT_HASHED,
        r#match: vec![FieldMatch::exact(HDR_NEXT_HASHED_NEXT_ID, next_id_value(next_id))],
        action: Some(TableAction::group_ref(group_id)),
        priority: 0,
    }
}

pub fn next_vlan_entry(next_id: u32, vlan_id: Vec<u8>) -> TableEntry {
    TableEntry {
        table_id: TBL_NEXT_VLAN,
        r#match: vec![FieldMatch::exact(HDR_NEXT_VLAN_NEXT_ID, next_id_value(next_id))],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_VLAN).with_param(PARAM_SET_VLAN_VLAN_ID, vlan_id),
        )),
        priority: 0,
    }
}

pub fn next_vlan_push_double_entry(next_id: u32, s_tag: &[u8], c_tag: &[u8]) -> TableEntry {
    TableEntry {
        table_id: TBL_NEXT_VLAN,
        r#match: vec![FieldMatch::exact(HDR_NEXT_VLAN_NEXT_ID, next_id_value(next_id))],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_DOUBLE_VLAN)
                .with_param(PARAM_SET_DOUBLE_VLAN_OUTER_VLAN_ID, s_tag.to_vec())
                .with_param(PARAM_SET_DOUBLE_VLAN_INNER_VLAN_ID, c_tag.to_vec()),
        )),
        priority: 0,
    }
}

pub fn hashed_selector_member(e: &NextHopEntry, smac: &[u8]) -> ActionProfileMember {
    ActionProfileMember {
        action_profile_id: ACTPROF_HASHED_SELECTOR,
        member_id: e.id,
        action: Some(
            Action::new(ACTION_ROUTING_HASHED)
                .with_param(PARAM_ROUTING_HASHED_PORT_NUM, e.port.clone())
                .with_param(PARAM_ROUTING_HASHED_DMAC, e.mac_addr.clone())
                .with_param(PARAM_ROUTING_HASHED_SMAC, smac.to_vec()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_of_is_right_aligned() {
        assert_eq!(id_of(&[0x00, 0x00, 0x00, 0x09]), 9);
        assert_eq!(id_of(&[0x01, 0x00]), 256);
        assert_eq!(id_of(&[0x09]), 9);
        assert_eq!(id_of(&next_id_value(123456)), 123456);
    }

    #[test]
    fn untagged_permit_matches_vlan_invalid() {
        let e = ingress_port_vlan_entry_permit(&[0x00, 0x01], None, None, Some(vlan_id_value(4094)), 1);
        assert_eq!(e.field(HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID).unwrap().exact_value(), Some(&[0x00u8][..]));
        assert!(e.field(HDR_INGRESS_PORT_VLAN_VLAN_ID).is_none());
        let act = e.direct_action().unwrap();
        assert_eq!(act.action_id, ACTION_PERMIT_WITH_INTERNAL_VLAN);
        assert_eq!(act.param(PARAM_PERMIT_WITH_INTERNAL_VLAN_VLAN_ID), Some(&[0x0f, 0xfe][..]));
    }

    #[test]
    fn tagged_permit_uses_ternary_tags() {
        let e = ingress_port_vlan_entry_permit(
            &[0x00, 0x01],
            Some(&[0x00, 0x64]),
            Some(&[0x00, 0x0a]),
            None,
            1,
        );
        assert_eq!(e.field(HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID).unwrap().exact_value(), Some(&[0x01u8][..]));
        assert_eq!(
            e.field(HDR_INGRESS_PORT_VLAN_VLAN_ID).unwrap().ternary_value(),
            Some((&[0x00u8, 0x64][..], &VLAN_ID_MASK[..]))
        );
        assert_eq!(e.direct_action().unwrap().action_id, ACTION_PERMIT);
    }
}

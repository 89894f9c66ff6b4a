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

//! Conversions between wire table entries and typed logical records, both
//! directions.  Parsers are strict: an unknown match field, a wrong match
//! kind, a wrong action, or an unknown action parameter for a known table is
//! an `InvalidArgument`.  Missing match fields are tolerated; absence is the
//! attachment accumulator's concern.

use p4rt::{Action, ActionProfileMember, FieldMatch, TableAction, TableEntry};

use crate::catalog::logical::*;
use crate::entity::{
    AclEntry, AttachmentEntry, Direction, IfTypeEntry, MyStationEntry, NextHopEntry, NextHopGroup,
    PppoePuntedEntry, RouteV4Entry,
};
use crate::error::{Error, Result};

fn expect_table(t: &TableEntry, table_id: u32) -> Result<()> {
    if t.table_id != table_id {
        return Err(Error::InvalidArgument(format!(
            "unexpected table id {} (want {})",
            t.table_id, table_id
        )));
    }
    Ok(())
}

fn exact_of(m: &FieldMatch) -> Result<Vec<u8>> {
    m.exact_value()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| Error::InvalidArgument(format!("field {} must be an exact match", m.field_id)))
}

fn direct_action(t: &TableEntry) -> Result<&Action> {
    t.direct_action()
        .ok_or_else(|| Error::InvalidArgument("entry carries no direct action".to_string()))
}

fn invalid_field(field_id: u32) -> Error {
    Error::InvalidArgument(format!("invalid match field id {}", field_id))
}

fn invalid_action(action_id: u32) -> Error {
    Error::InvalidArgument(format!("invalid action id {}", action_id))
}

fn invalid_param(param_id: u32) -> Error {
    Error::InvalidArgument(format!("invalid action parameter id {}", param_id))
}

pub fn if_type(t: &TableEntry) -> Result<IfTypeEntry> {
    expect_table(t, TBL_IF_TYPES)?;
    let mut entry = IfTypeEntry::default();
    for m in &t.r#match {
        match m.field_id {
            HDR_IF_TYPES_PORT => entry.port = exact_of(m)?,
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_SET_IF_TYPE {
        return Err(invalid_action(act.action_id));
    }
    for p in &act.params {
        match p.param_id {
            PARAM_SET_IF_TYPE_IF_TYPE => entry.if_type = p.value.clone(),
            other => return Err(invalid_param(other)),
        }
    }
    Ok(entry)
}

pub fn build_if_type(e: &IfTypeEntry) -> TableEntry {
    TableEntry {
        table_id: TBL_IF_TYPES,
        r#match: vec![FieldMatch::exact(HDR_IF_TYPES_PORT, e.port.clone())],
        action: Some(TableAction::direct(
            Action::new(ACTION_SET_IF_TYPE).with_param(PARAM_SET_IF_TYPE_IF_TYPE, e.if_type.clone()),
        )),
        priority: 0,
    }
}

pub fn my_station(t: &TableEntry) -> Result<MyStationEntry> {
    expect_table(t, TBL_MY_STATIONS)?;
    let mut entry = MyStationEntry::default();
    for m in &t.r#match {
        match m.field_id {
            HDR_MY_STATIONS_PORT => entry.port = exact_of(m)?,
            HDR_MY_STATIONS_ETH_DST => entry.eth_dst = exact_of(m)?,
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_SET_MY_STATION {
        return Err(invalid_action(act.action_id));
    }
    Ok(entry)
}

pub fn build_my_station(e: &MyStationEntry) -> TableEntry {
    TableEntry {
        table_id: TBL_MY_STATIONS,
        r#match: vec![
            FieldMatch::exact(HDR_MY_STATIONS_PORT, e.port.clone()),
            FieldMatch::exact(HDR_MY_STATIONS_ETH_DST, e.eth_dst.clone()),
        ],
        action: Some(TableAction::direct(Action::new(ACTION_SET_MY_STATION))),
        priority: 0,
    }
}

pub fn upstream_line(t: &TableEntry) -> Result<AttachmentEntry> {
    expect_table(t, TBL_UPSTREAM_LINES)?;
    let mut a = AttachmentEntry {
        direction: Direction::Upstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_UPSTREAM_LINES_PORT => a.port = Some(exact_of(m)?),
            HDR_UPSTREAM_LINES_C_TAG => a.c_tag = Some(exact_of(m)?),
            HDR_UPSTREAM_LINES_S_TAG => a.s_tag = Some(exact_of(m)?),
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_UPSTREAM_SET_LINE {
        return Err(invalid_action(act.action_id));
    }
    for p in &act.params {
        match p.param_id {
            PARAM_UPSTREAM_SET_LINE_LINE_ID => a.line_id = p.value.clone(),
            other => return Err(invalid_param(other)),
        }
    }
    Ok(a)
}

pub fn build_upstream_line(a: &AttachmentEntry) -> TableEntry {
    let mut fields = Vec::new();
    if let Some(ref port) = a.port {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_LINES_PORT, port.clone()));
    }
    if let Some(ref c_tag) = a.c_tag {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_LINES_C_TAG, c_tag.clone()));
    }
    if let Some(ref s_tag) = a.s_tag {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_LINES_S_TAG, s_tag.clone()));
    }
    TableEntry {
        table_id: TBL_UPSTREAM_LINES,
        r#match: fields,
        action: Some(TableAction::direct(
            Action::new(ACTION_UPSTREAM_SET_LINE)
                .with_param(PARAM_UPSTREAM_SET_LINE_LINE_ID, a.line_id.clone()),
        )),
        priority: 0,
    }
}

pub fn upstream_attachment_v4(t: &TableEntry) -> Result<AttachmentEntry> {
    expect_table(t, TBL_UPSTREAM_ATTACHMENTS_V4)?;
    let mut a = AttachmentEntry {
        direction: Direction::Upstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_UPSTREAM_ATTACHMENTS_V4_LINE_ID => a.line_id = exact_of(m)?,
            HDR_UPSTREAM_ATTACHMENTS_V4_ETH_SRC => a.mac_addr = Some(exact_of(m)?),
            HDR_UPSTREAM_ATTACHMENTS_V4_IPV4_SRC => a.ipv4_addr = Some(exact_of(m)?),
            HDR_UPSTREAM_ATTACHMENTS_V4_PPPOE_SESS_ID => a.pppoe_sess_id = Some(exact_of(m)?),
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_NOP {
        return Err(invalid_action(act.action_id));
    }
    Ok(a)
}

pub fn build_upstream_attachment_v4(a: &AttachmentEntry) -> TableEntry {
    let mut fields = vec![FieldMatch::exact(
        HDR_UPSTREAM_ATTACHMENTS_V4_LINE_ID,
        a.line_id.clone(),
    )];
    if let Some(ref mac) = a.mac_addr {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_ATTACHMENTS_V4_ETH_SRC, mac.clone()));
    }
    if let Some(ref ipv4) = a.ipv4_addr {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_ATTACHMENTS_V4_IPV4_SRC, ipv4.clone()));
    }
    if let Some(ref sess) = a.pppoe_sess_id {
        fields.push(FieldMatch::exact(
            HDR_UPSTREAM_ATTACHMENTS_V4_PPPOE_SESS_ID,
            sess.clone(),
        ));
    }
    TableEntry {
        table_id: TBL_UPSTREAM_ATTACHMENTS_V4,
        r#match: fields,
        action: Some(TableAction::direct(Action::new(ACTION_NOP))),
        priority: 0,
    }
}

pub fn downstream_line_v4(t: &TableEntry) -> Result<AttachmentEntry> {
    expect_table(t, TBL_DOWNSTREAM_LINES_V4)?;
    let mut a = AttachmentEntry {
        direction: Direction::Downstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_DOWNSTREAM_LINES_V4_IPV4_DST => a.ipv4_addr = Some(exact_of(m)?),
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_DOWNSTREAM_SET_LINE {
        return Err(invalid_action(act.action_id));
    }
    for p in &act.params {
        match p.param_id {
            PARAM_DOWNSTREAM_SET_LINE_LINE_ID => a.line_id = p.value.clone(),
            other => return Err(invalid_param(other)),
        }
    }
    Ok(a)
}

pub fn build_downstream_line_v4(a: &AttachmentEntry) -> TableEntry {
    let mut fields = Vec::new();
    if let Some(ref ipv4) = a.ipv4_addr {
        fields.push(FieldMatch::exact(HDR_DOWNSTREAM_LINES_V4_IPV4_DST, ipv4.clone()));
    }
    TableEntry {
        table_id: TBL_DOWNSTREAM_LINES_V4,
        r#match: fields,
        action: Some(TableAction::direct(
            Action::new(ACTION_DOWNSTREAM_SET_LINE)
                .with_param(PARAM_DOWNSTREAM_SET_LINE_LINE_ID, a.line_id.clone()),
        )),
        priority: 0,
    }
}

pub fn downstream_vids(t: &TableEntry) -> Result<AttachmentEntry> {
    expect_table(t, TBL_DOWNSTREAM_VIDS)?;
    let mut a = AttachmentEntry {
        direction: Direction::Downstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_DOWNSTREAM_VIDS_LINE_ID => a.line_id = exact_of(m)?,
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_DOWNSTREAM_SET_VIDS {
        return Err(invalid_action(act.action_id));
    }
    for p in &act.params {
        match p.param_id {
            PARAM_DOWNSTREAM_SET_VIDS_C_TAG => a.c_tag = Some(p.value.clone()),
            PARAM_DOWNSTREAM_SET_VIDS_S_TAG => a.s_tag = Some(p.value.clone()),
            other => return Err(invalid_param(other)),
        }
    }
    Ok(a)
}

pub fn build_downstream_vids(a: &AttachmentEntry) -> TableEntry {
    let mut action = Action::new(ACTION_DOWNSTREAM_SET_VIDS);
    if let Some(ref c_tag) = a.c_tag {
        action = action.with_param(PARAM_DOWNSTREAM_SET_VIDS_C_TAG, c_tag.clone());
    }
    if let Some(ref s_tag) = a.s_tag {
        action = action.with_param(PARAM_DOWNSTREAM_SET_VIDS_S_TAG, s_tag.clone());
    }
    TableEntry {
        table_id: TBL_DOWNSTREAM_VIDS,
        r#match: vec![FieldMatch::exact(HDR_DOWNSTREAM_VIDS_LINE_ID, a.line_id.clone())],
        action: Some(TableAction::direct(action)),
        priority: 0,
    }
}

pub fn downstream_pppoe_session(t: &TableEntry) -> Result<AttachmentEntry> {
    expect_table(t, TBL_DOWNSTREAM_PPPOE_SESSIONS)?;
    let mut a = AttachmentEntry {
        direction: Direction::Downstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_DOWNSTREAM_PPPOE_SESSIONS_LINE_ID => a.line_id = exact_of(m)?,
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_DOWNSTREAM_SET_PPPOE_SESS {
        return Err(invalid_action(act.action_id));
    }
    for p in &act.params {
        match p.param_id {
            PARAM_DOWNSTREAM_SET_PPPOE_SESS_PPPOE_SESS_ID => {
                a.pppoe_sess_id = Some(p.value.clone())
            }
            other => return Err(invalid_param(other)),
        }
    }
    Ok(a)
}

pub fn build_downstream_pppoe_session(a: &AttachmentEntry) -> TableEntry {
    let mut action = Action::new(ACTION_DOWNSTREAM_SET_PPPOE_SESS);
    if let Some(ref sess) = a.pppoe_sess_id {
        action = action.with_param(PARAM_DOWNSTREAM_SET_PPPOE_SESS_PPPOE_SESS_ID, sess.clone());
    }
    TableEntry {
        table_id: TBL_DOWNSTREAM_PPPOE_SESSIONS,
        r#match: vec![FieldMatch::exact(
            HDR_DOWNSTREAM_PPPOE_SESSIONS_LINE_ID,
            a.line_id.clone(),
        )],
        action: Some(TableAction::direct(action)),
        priority: 0,
    }
}

pub fn route_v4(t: &TableEntry) -> Result<RouteV4Entry> {
    expect_table(t, TBL_ROUTES_V4)?;
    let mut e = RouteV4Entry {
        direction: Direction::Upstream,
        ..Default::default()
    };
    for m in &t.r#match {
        match m.field_id {
            HDR_ROUTES_V4_IPV4_DST => {
                let (value, prefix_len) = m.lpm_value().ok_or_else(|| {
                    Error::InvalidArgument(format!("field {} must be an LPM match", m.field_id))
                })?;
                e.ipv4_addr = value.to_vec();
                e.prefix_len = prefix_len;
            }
            other => return Err(invalid_field(other)),
        }
    }
    e.next_hop_group_id = t
        .action
        .as_ref()
        .and_then(|a| a.group_id())
        .ok_or_else(|| {
            Error::InvalidArgument("route entry must reference a next-hop group".to_string())
        })?;
    Ok(e)
}

pub fn build_route_v4(e: &RouteV4Entry) -> TableEntry {
    TableEntry {
        table_id: TBL_ROUTES_V4,
        r#match: vec![FieldMatch::lpm(
            HDR_ROUTES_V4_IPV4_DST,
            e.ipv4_addr.clone(),
            e.prefix_len,
        )],
        action: Some(TableAction::group_ref(e.next_hop_group_id)),
        priority: 0,
    }
}

pub fn next_hop(m: &ActionProfileMember) -> Result<NextHopEntry> {
    if m.action_profile_id != ACTPROF_ECMP {
        return Err(Error::InvalidArgument(format!(
            "unexpected action profile id {}",
            m.action_profile_id
        )));
    }
    let act = m
        .action
        .as_ref()
        .ok_or_else(|| Error::InvalidArgument("member carries no action".to_string()))?;
    if act.action_id != ACTION_ROUTE_V4 {
        return Err(invalid_action(act.action_id));
    }
    let mut e = NextHopEntry {
        id: m.member_id,
        ..Default::default()
    };
    for p in &act.params {
        match p.param_id {
            PARAM_ROUTE_V4_PORT => e.port = p.value.clone(),
            PARAM_ROUTE_V4_DMAC => e.mac_addr = p.value.clone(),
            other => return Err(invalid_param(other)),
        }
    }
    Ok(e)
}

pub fn build_next_hop(e: &NextHopEntry) -> ActionProfileMember {
    ActionProfileMember {
        action_profile_id: ACTPROF_ECMP,
        member_id: e.id,
        action: Some(
            Action::new(ACTION_ROUTE_V4)
                .with_param(PARAM_ROUTE_V4_PORT, e.port.clone())
                .with_param(PARAM_ROUTE_V4_DMAC, e.mac_addr.clone()),
        ),
    }
}

pub fn next_hop_group(g: &NextHopGroup) -> Result<NextHopGroup> {
    if g.action_profile_id != ACTPROF_ECMP {
        return Err(Error::InvalidArgument(format!(
            "unexpected action profile id {}",
            g.action_profile_id
        )));
    }
    Ok(g.clone())
}

const ACL_MATCH_FIELDS: [u32; 9] = [
    HDR_ACLS_PORT,
    HDR_ACLS_ETH_SRC,
    HDR_ACLS_ETH_DST,
    HDR_ACLS_ETH_TYPE,
    HDR_ACLS_IPV4_SRC,
    HDR_ACLS_IPV4_DST,
    HDR_ACLS_IPV4_PROTO,
    HDR_ACLS_L4_SPORT,
    HDR_ACLS_L4_DPORT,
];

pub fn acl(t: &TableEntry) -> Result<AclEntry> {
    expect_table(t, TBL_ACLS)?;
    for m in &t.r#match {
        if !ACL_MATCH_FIELDS.contains(&m.field_id) {
            return Err(invalid_field(m.field_id));
        }
        if m.ternary_value().is_none() {
            return Err(Error::InvalidArgument(format!(
                "field {} must be a ternary match",
                m.field_id
            )));
        }
    }
    let act = direct_action(t)?;
    match act.action_id {
        ACTION_ACL_PUNT | ACTION_ACL_DROP => {}
        ACTION_ACL_SET_PORT => {
            for p in &act.params {
                if p.param_id != PARAM_ACL_SET_PORT_PORT {
                    return Err(invalid_param(p.param_id));
                }
            }
        }
        other => return Err(invalid_action(other)),
    }
    Ok(AclEntry(t.clone()))
}

pub fn pppoe_punt(t: &TableEntry) -> Result<PppoePuntedEntry> {
    expect_table(t, TBL_UPSTREAM_PPPOE_PUNTS)?;
    let mut e = PppoePuntedEntry::default();
    for m in &t.r#match {
        match m.field_id {
            HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_CODE => e.pppoe_code = exact_of(m)?,
            HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_PROTO => e.pppoe_proto = Some(exact_of(m)?),
            other => return Err(invalid_field(other)),
        }
    }
    let act = direct_action(t)?;
    if act.action_id != ACTION_UPSTREAM_PUNT {
        return Err(invalid_action(act.action_id));
    }
    Ok(e)
}

pub fn build_pppoe_punt(e: &PppoePuntedEntry) -> TableEntry {
    let mut fields = vec![FieldMatch::exact(
        HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_CODE,
        e.pppoe_code.clone(),
    )];
    if let Some(ref proto) = e.pppoe_proto {
        fields.push(FieldMatch::exact(HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_PROTO, proto.clone()));
    }
    TableEntry {
        table_id: TBL_UPSTREAM_PPPOE_PUNTS,
        r#match: fields,
        action: Some(TableAction::direct(Action::new(ACTION_UPSTREAM_PUNT))),
        priority: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PORT1: [u8; 2] = [0x00, 0x01];

    fn if_type_entry(field_id: u32, action_id: u32, param_id: u32) -> TableEntry {
        TableEntry {
            table_id: TBL_IF_TYPES,
            r#match: vec![FieldMatch::exact(field_id, PORT1.to_vec())],
            action: Some(TableAction::direct(
                Action::new(action_id).with_param(param_id, vec![IF_TYPE_CORE]),
            )),
            priority: 0,
        }
    }

    #[test]
    fn if_type_parses() {
        let e = if_type(&if_type_entry(
            HDR_IF_TYPES_PORT,
            ACTION_SET_IF_TYPE,
            PARAM_SET_IF_TYPE_IF_TYPE,
        ))
        .unwrap();
        assert_eq!(
            e,
            IfTypeEntry {
                port: PORT1.to_vec(),
                if_type: vec![IF_TYPE_CORE],
            }
        );
    }

    #[test]
    fn if_type_rejects_bad_ids() {
        // Wrong match field id.
        assert!(if_type(&if_type_entry(
            HDR_IF_TYPES_PORT - 1,
            ACTION_SET_IF_TYPE,
            PARAM_SET_IF_TYPE_IF_TYPE
        ))
        .is_err());
        // Wrong action id.
        assert!(if_type(&if_type_entry(
            HDR_IF_TYPES_PORT,
            ACTION_SET_IF_TYPE - 1,
            PARAM_SET_IF_TYPE_IF_TYPE
        ))
        .is_err());
        // Wrong action parameter id.
        assert!(if_type(&if_type_entry(
            HDR_IF_TYPES_PORT,
            ACTION_SET_IF_TYPE,
            PARAM_SET_IF_TYPE_IF_TYPE + 1
        ))
        .is_err());
        // Wrong table id.
        let mut t = if_type_entry(HDR_IF_TYPES_PORT, ACTION_SET_IF_TYPE, PARAM_SET_IF_TYPE_IF_TYPE);
        t.table_id = TBL_MY_STATIONS;
        assert!(if_type(&t).is_err());
    }

    #[test]
    fn if_type_rejects_wrong_match_kind() {
        let mut t = if_type_entry(HDR_IF_TYPES_PORT, ACTION_SET_IF_TYPE, PARAM_SET_IF_TYPE_IF_TYPE);
        t.r#match = vec![FieldMatch::ternary(HDR_IF_TYPES_PORT, PORT1.to_vec(), vec![0xff, 0xff])];
        assert!(if_type(&t).is_err());
    }

    #[test]
    fn upstream_line_tolerates_missing_fields() {
        // Only the s-tag is known; the accumulator fills the rest in later.
        let t = TableEntry {
            table_id: TBL_UPSTREAM_LINES,
            r#match: vec![FieldMatch::exact(HDR_UPSTREAM_LINES_S_TAG, vec![0x00, 0x64])],
            action: Some(TableAction::direct(
                Action::new(ACTION_UPSTREAM_SET_LINE)
                    .with_param(PARAM_UPSTREAM_SET_LINE_LINE_ID, vec![0, 0, 0, 1]),
            )),
            priority: 0,
        };
        let a = upstream_line(&t).unwrap();
        assert_eq!(a.direction, Direction::Upstream);
        assert_eq!(a.line_id, vec![0, 0, 0, 1]);
        assert_eq!(a.s_tag, Some(vec![0x00, 0x64]));
        assert_eq!(a.port, None);
        assert_eq!(a.c_tag, None);
    }

    #[test]
    fn downstream_parsers_stamp_direction() {
        let lines = build_downstream_line_v4(&AttachmentEntry {
            line_id: vec![0, 0, 0, 1],
            ipv4_addr: Some(vec![10, 0, 0, 1]),
            ..Default::default()
        });
        assert_eq!(downstream_line_v4(&lines).unwrap().direction, Direction::Downstream);

        let vids = build_downstream_vids(&AttachmentEntry {
            line_id: vec![0, 0, 0, 1],
            s_tag: Some(vec![0, 100]),
            c_tag: Some(vec![0, 10]),
            ..Default::default()
        });
        assert_eq!(downstream_vids(&vids).unwrap().direction, Direction::Downstream);

        let sess = build_downstream_pppoe_session(&AttachmentEntry {
            line_id: vec![0, 0, 0, 1],
            pppoe_sess_id: Some(vec![1, 1]),
            ..Default::default()
        });
        assert_eq!(
            downstream_pppoe_session(&sess).unwrap().direction,
            Direction::Downstream
        );
    }

    #[test]
    fn route_v4_roundtrip() {
        let e = RouteV4Entry {
            direction: Direction::Upstream,
            ipv4_addr: vec![10, 1, 0, 0],
            prefix_len: 16,
            next_hop_group_id: 9,
        };
        assert_eq!(route_v4(&build_route_v4(&e)).unwrap(), e);
    }

    #[test]
    fn route_v4_requires_lpm_and_group() {
        let mut t = build_route_v4(&RouteV4Entry {
            direction: Direction::Upstream,
            ipv4_addr: vec![10, 1, 0, 0],
            prefix_len: 16,
            next_hop_group_id: 9,
        });
        t.r#match = vec![FieldMatch::exact(HDR_ROUTES_V4_IPV4_DST, vec![10, 1, 0, 0])];
        assert!(route_v4(&t).is_err());

        let mut t = build_route_v4(&RouteV4Entry {
            direction: Direction::Upstream,
            ipv4_addr: vec![10, 1, 0, 0],
            prefix_len: 16,
            next_hop_group_id: 9,
        });
        t.action = Some(TableAction::direct(Action::new(ACTION_NOP)));
        assert!(route_v4(&t).is_err());
    }

    #[test]
    fn next_hop_roundtrip() {
        let e = NextHopEntry {
            id: 7,
            port: vec![0x00, 0x02],
            mac_addr: vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
        };
        assert_eq!(next_hop(&build_next_hop(&e)).unwrap(), e);
    }

    #[test]
    fn acl_rejects_unknown_field_and_exact_match() {
        let punt = TableAction::direct(Action::new(ACTION_ACL_PUNT));
        let good = TableEntry {
            table_id: TBL_ACLS,
            r#match: vec![FieldMatch::ternary(HDR_ACLS_PORT, PORT1.to_vec(), vec![0xff, 0xff])],
            action: Some(punt.clone()),
            priority: 10,
        };
        assert!(acl(&good).is_ok());

        let if_type_match = TableEntry {
            r#match: vec![FieldMatch::ternary(HDR_ACLS_IF_TYPE, vec![0x01], vec![0xff])],
            ..good.clone()
        };
        assert!(acl(&if_type_match).is_err());

        let exact_match = TableEntry {
            r#match: vec![FieldMatch::exact(HDR_ACLS_PORT, PORT1.to_vec())],
            ..good
        };
        assert!(acl(&exact_match).is_err());
    }

    #[test]
    fn pppoe_punt_proto_is_optional() {
        let without = PppoePuntedEntry {
            pppoe_code: vec![0x09],
            pppoe_proto: None,
        };
        assert_eq!(pppoe_punt(&build_pppoe_punt(&without)).unwrap(), without);

        let with = PppoePuntedEntry {
            pppoe_code: vec![0x09],
            pppoe_proto: Some(vec![0xc0, 0x21]),
        };
        assert_eq!(pppoe_punt(&build_pppoe_punt(&with)).unwrap(), with);
    }

    #[test]
    fn build_parse_identity() {
        let if_type_rec = IfTypeEntry {
            port: PORT1.to_vec(),
            if_type: vec![IF_TYPE_CORE],
        };
        assert_eq!(if_type(&build_if_type(&if_type_rec)).unwrap(), if_type_rec);

        let station = MyStationEntry {
            port: PORT1.to_vec(),
            eth_dst: vec![0x00, 0xaa, 0x00, 0x00, 0x00, 0x01],
        };
        assert_eq!(my_station(&build_my_station(&station)).unwrap(), station);

        let line = AttachmentEntry {
            direction: Direction::Upstream,
            line_id: vec![0, 0, 0, 1],
            port: Some(PORT1.to_vec()),
            s_tag: Some(vec![0x00, 0x64]),
            c_tag: Some(vec![0x00, 0x0a]),
            ..Default::default()
        };
        assert_eq!(upstream_line(&build_upstream_line(&line)).unwrap(), line);
    }
}

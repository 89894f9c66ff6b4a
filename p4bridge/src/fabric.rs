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

//! The change processor for ONF's fabric.p4.

use tracing::{debug, info, trace, warn};

use p4rt::{update, ActionProfileGroup, FieldMatch, TableEntry, Update};

use crate::catalog::fabric::*;
use crate::catalog::logical;
use crate::entity::{
    AclEntry, AttachmentEntry, Direction, IfTypeEntry, LineIdKey, MyStationEntry, NextHopEntry,
    NextHopGroup, PortKey, PppoePuntedEntry, RouteV4Entry,
};
use crate::error::{Error, Result};
use crate::fabric_helper::*;
use crate::store::{group_key, member_key, table_entry_key, P4rtStore};
use crate::translate::{Ctx, Processor};

pub const DEFAULT_INTERNAL_TAG: u16 = 4094;
pub const DEFAULT_PRIORITY: i32 = 1;
pub const ETH_TYPE_IPV4: u16 = 0x0800;
pub const FWD_TYPE_IPV4_UNICAST: u8 = 0x02;

pub struct FabricProcessor;

/// Insert the entry, or modify it when the target already holds its key.
fn upsert(target: &P4rtStore, entry: TableEntry) -> Update {
    let utype = if target.table_entry(&table_entry_key(&entry)).is_some() {
        update::Type::Modify
    } else {
        update::Type::Insert
    };
    Update::table_entry(utype, entry)
}

fn required<'a>(field: &'a Option<Vec<u8>>, what: &str) -> Result<&'a [u8]> {
    field
        .as_deref()
        .ok_or_else(|| Error::InvalidArgument(format!("complete attachment is missing {}", what)))
}

/// The target entries installed for an upstream line: its line-map mapping
/// and its PPPoE termination entries.
fn upstream_entries_by_line<'a>(target: &'a P4rtStore, line_id: &[u8]) -> Vec<&'a TableEntry> {
    let mut entries = target.filter_table_entries(|e| {
        e.table_id == TBL_LINE_MAP
            && e.direct_action().map_or(false, |a| {
                a.action_id == ACTION_SET_LINE && a.param(PARAM_SET_LINE_LINE_ID) == Some(line_id)
            })
    });
    entries.extend(target.filter_table_entries(|e| {
        e.table_id == TBL_PPPOE_TERM_V4
            && e.field(HDR_PPPOE_TERM_V4_LINE_ID)
                .and_then(FieldMatch::exact_value)
                == Some(line_id)
    }));
    entries
}

impl FabricProcessor {
    fn install_upstream(&self, ctx: &Ctx, a: &AttachmentEntry) -> Result<Vec<Update>> {
        let port = required(&a.port, "port")?;
        let s_tag = required(&a.s_tag, "s_tag")?;
        let c_tag = required(&a.c_tag, "c_tag")?;
        let ipv4 = required(&a.ipv4_addr, "ipv4_addr")?;
        let sess = required(&a.pppoe_sess_id, "pppoe_sess_id")?;
        Ok(vec![
            upsert(
                ctx.target,
                ingress_port_vlan_entry_permit(port, Some(s_tag), Some(c_tag), None, DEFAULT_PRIORITY),
            ),
            upsert(ctx.target, line_map_entry(s_tag, c_tag, &a.line_id)),
            upsert(ctx.target, pppoe_term_v4_entry(&a.line_id, ipv4, sess)),
        ])
    }

    fn install_downstream(&self, ctx: &Ctx, a: &AttachmentEntry) -> Result<Vec<Update>> {
        let port = required(&a.port, "port")?;
        let s_tag = required(&a.s_tag, "s_tag")?;
        let c_tag = required(&a.c_tag, "c_tag")?;
        let ipv4 = required(&a.ipv4_addr, "ipv4_addr")?;
        let sess = required(&a.pppoe_sess_id, "pppoe_sess_id")?;
        let line = id_of(&a.line_id);

        // The line id doubles as group and member id under the hashed
        // selector.  An independently installed next-hop group on the same
        // numeric id would be silently clobbered; reject the collision.
        if ctx.logical.next_hop_group(line).is_some() {
            return Err(Error::AlreadyExists(format!(
                "next-hop group {} collides with line id",
                line
            )));
        }

        let station = ctx
            .logical
            .my_station(&PortKey::from_bytes(port))
            .ok_or_else(|| {
                Error::FailedPrecondition(format!(
                    "no my-station entry on port {}",
                    hex::encode(port)
                ))
            })?;
        let mac_addr = required(&a.mac_addr, "mac_addr")?;
        let member = hashed_selector_member(
            &NextHopEntry {
                id: line,
                port: port.to_vec(),
                mac_addr: mac_addr.to_vec(),
            },
            &station.eth_dst,
        );
        let member_utype = if ctx
            .target
            .member(&member_key(ACTPROF_HASHED_SELECTOR, line))
            .is_some()
        {
            update::Type::Modify
        } else {
            update::Type::Insert
        };
        let group = ActionProfileGroup {
            action_profile_id: ACTPROF_HASHED_SELECTOR,
            group_id: line,
            members: vec![p4rt::action_profile_group::Member {
                member_id: line,
                weight: 1,
            }],
            max_size: 1,
        };
        let group_utype = if ctx
            .target
            .group(&group_key(ACTPROF_HASHED_SELECTOR, line))
            .is_some()
        {
            update::Type::Modify
        } else {
            update::Type::Insert
        };

        // The member must exist before the group references it, and the
        // group before the entries pointing at it.
        let mut updates = vec![
            Update::member(member_utype, member),
            Update::group(group_utype, group),
        ];
        updates.push(upsert(ctx.target, line_map_entry(s_tag, c_tag, &a.line_id)));
        updates.push(upsert(ctx.target, routing_v4_entry(ipv4, 32, line)));
        updates.push(upsert(ctx.target, next_hashed_entry(line, line)));
        updates.push(upsert(ctx.target, next_vlan_push_double_entry(line, s_tag, c_tag)));
        updates.push(upsert(ctx.target, line_session_map_entry(&a.line_id, sess)));
        Ok(updates)
    }

    fn remove_upstream(&self, ctx: &Ctx, a: &AttachmentEntry) -> Result<Vec<Update>> {
        let mut deletes: Vec<TableEntry> = Vec::new();
        if let (Some(port), Some(s_tag), Some(c_tag)) = (&a.port, &a.s_tag, &a.c_tag) {
            let probe =
                ingress_port_vlan_entry_permit(port, Some(s_tag), Some(c_tag), None, DEFAULT_PRIORITY);
            match ctx.target.table_entry(&table_entry_key(&probe)) {
                Some(stored) => deletes.push(stored.clone()),
                None => debug!(
                    "ingress-port-vlan entry for line {} already absent",
                    hex::encode(&a.line_id)
                ),
            }
        }
        let shared_with_downstream = ctx
            .logical
            .down_attachment(&LineIdKey::from_bytes(&a.line_id))
            .is_some();
        for e in upstream_entries_by_line(ctx.target, &a.line_id) {
            if shared_with_downstream && e.table_id == TBL_LINE_MAP {
                // The downstream attachment still maps through this entry.
                continue;
            }
            deletes.push(e.clone());
        }
        if deletes.is_empty() {
            info!(
                "no physical entries left for upstream line {}",
                hex::encode(&a.line_id)
            );
        }
        Ok(deletes
            .into_iter()
            .map(|e| Update::table_entry(update::Type::Delete, e))
            .collect())
    }

    fn remove_downstream(&self, ctx: &Ctx, a: &AttachmentEntry) -> Result<Vec<Update>> {
        let line = id_of(&a.line_id);
        let next_id = next_id_value(line);
        let shared_with_upstream = ctx
            .logical
            .up_attachment(&LineIdKey::from_bytes(&a.line_id))
            .is_some();
        // A next-hop group installed independently under this numeric id
        // owns the group-scoped state; only line-scoped entries may go.
        let foreign_group = ctx.logical.next_hop_group(line).is_some();

        let mut deletes: Vec<TableEntry> = Vec::new();
        if !shared_with_upstream {
            deletes.extend(
                ctx.target
                    .filter_table_entries(|e| {
                        e.table_id == TBL_LINE_MAP
                            && e.direct_action().map_or(false, |act| {
                                act.action_id == ACTION_SET_LINE
                                    && act.param(PARAM_SET_LINE_LINE_ID) == Some(&a.line_id[..])
                            })
                    })
                    .into_iter()
                    .cloned(),
            );
        }
        if !foreign_group {
            deletes.extend(
                ctx.target
                    .filter_table_entries(|e| {
                        e.table_id == TBL_ROUTING_V4
                            && e.direct_action().map_or(false, |act| {
                                act.param(PARAM_SET_NEXT_ID_ROUTING_V4_NEXT_ID) == Some(&next_id[..])
                            })
                    })
                    .into_iter()
                    .cloned(),
            );
            deletes.extend(
                ctx.target
                    .filter_table_entries(|e| {
                        e.table_id == TBL_NEXT_HASHED
                            && e.field(HDR_NEXT_HASHED_NEXT_ID)
                                .and_then(FieldMatch::exact_value)
                                == Some(&next_id[..])
                    })
                    .into_iter()
                    .cloned(),
            );
            deletes.extend(
                ctx.target
                    .filter_table_entries(|e| {
                        e.table_id == TBL_NEXT_VLAN
                            && e.field(HDR_NEXT_VLAN_NEXT_ID)
                                .and_then(FieldMatch::exact_value)
                                == Some(&next_id[..])
                    })
                    .into_iter()
                    .cloned(),
            );
        }
        deletes.extend(
            ctx.target
                .filter_table_entries(|e| {
                    e.table_id == TBL_LINE_SESSION_MAP
                        && e.field(HDR_LINE_SESSION_MAP_LINE_ID)
                            .and_then(FieldMatch::exact_value)
                            == Some(&a.line_id[..])
                })
                .into_iter()
                .cloned(),
        );

        // Table entries first, then the group they reference, then its
        // member.
        let mut updates: Vec<Update> = deletes
            .into_iter()
            .map(|e| Update::table_entry(update::Type::Delete, e))
            .collect();
        if !foreign_group {
            if let Some(g) = ctx.target.group(&group_key(ACTPROF_HASHED_SELECTOR, line)) {
                updates.push(Update::group(update::Type::Delete, g.clone()));
            }
            if let Some(m) = ctx.target.member(&member_key(ACTPROF_HASHED_SELECTOR, line)) {
                updates.push(Update::member(update::Type::Delete, m.clone()));
            }
        }
        if updates.is_empty() {
            info!(
                "no physical entries left for downstream line {}",
                hex::encode(&a.line_id)
            );
        }
        Ok(updates)
    }
}

impl Processor for FabricProcessor {
    fn handle_if_type(&self, _ctx: &Ctx, e: &IfTypeEntry, utype: update::Type) -> Result<Vec<Update>> {
        trace!("IfTypeEntry={{ {} }}", e);
        match e.if_type.first().copied() {
            Some(logical::IF_TYPE_CORE) => Ok(vec![
                Update::table_entry(
                    utype,
                    ingress_port_vlan_entry_permit(
                        &e.port,
                        None,
                        None,
                        Some(vlan_id_value(DEFAULT_INTERNAL_TAG)),
                        DEFAULT_PRIORITY,
                    ),
                ),
                Update::table_entry(utype, egress_vlan_pop_entry(&e.port, DEFAULT_INTERNAL_TAG)),
            ]),
            Some(logical::IF_TYPE_ACCESS) => {
                warn!("if_type ACCESS not implemented for port {}", hex::encode(&e.port));
                Ok(Vec::new())
            }
            _ => {
                warn!("if_type {:?} not implemented", e.if_type);
                Ok(Vec::new())
            }
        }
    }

    fn handle_my_station(
        &self,
        _ctx: &Ctx,
        e: &MyStationEntry,
        utype: update::Type,
    ) -> Result<Vec<Update>> {
        trace!("MyStationEntry={{ {} }}", e);
        Ok(vec![Update::table_entry(
            utype,
            fwd_classifier_entry(&e.port, &e.eth_dst, DEFAULT_PRIORITY),
        )])
    }

    fn handle_attachment(&self, ctx: &Ctx, a: &AttachmentEntry, complete: bool) -> Result<Vec<Update>> {
        trace!("AttachmentEntry={{ {} }}, complete={}", a, complete);
        match (a.direction, complete) {
            (Direction::Upstream, true) => self.install_upstream(ctx, a),
            (Direction::Downstream, true) => self.install_downstream(ctx, a),
            (Direction::Upstream, false) => self.remove_upstream(ctx, a),
            (Direction::Downstream, false) => self.remove_downstream(ctx, a),
            (Direction::Unspecified, _) => Err(Error::InvalidArgument(
                "attachment with unspecified direction".to_string(),
            )),
        }
    }

    fn handle_route_v4(&self, _ctx: &Ctx, e: &RouteV4Entry, utype: update::Type) -> Result<Vec<Update>> {
        trace!("RouteV4Entry={{ {} }}", e);
        if e.direction != Direction::Upstream {
            return Err(Error::InvalidArgument(format!(
                "route direction {} is undefined for this target",
                e.direction
            )));
        }
        Ok(vec![
            Update::table_entry(
                utype,
                routing_v4_entry(&e.ipv4_addr, e.prefix_len, e.next_hop_group_id),
            ),
            Update::table_entry(
                utype,
                next_vlan_entry(e.next_hop_group_id, vlan_id_value(DEFAULT_INTERNAL_TAG)),
            ),
        ])
    }

    fn handle_next_hop(&self, ctx: &Ctx, e: &NextHopEntry, utype: update::Type) -> Result<Vec<Update>> {
        trace!("NextHopEntry={{ {} }}", e);
        let station = ctx
            .logical
            .my_station(&PortKey::from_bytes(&e.port))
            .ok_or_else(|| {
                Error::FailedPrecondition(format!(
                    "no my-station entry on port {}",
                    hex::encode(&e.port)
                ))
            })?;
        Ok(vec![Update::member(
            utype,
            hashed_selector_member(e, &station.eth_dst),
        )])
    }

    fn handle_next_hop_group(
        &self,
        _ctx: &Ctx,
        g: &NextHopGroup,
        utype: update::Type,
    ) -> Result<Vec<Update>> {
        trace!("NextHopGroup id={}", g.group_id);
        let group = Update::group(
            utype,
            ActionProfileGroup {
                action_profile_id: ACTPROF_HASHED_SELECTOR,
                group_id: g.group_id,
                members: g.members.clone(),
                max_size: g.max_size,
            },
        );
        let hashed = Update::table_entry(utype, next_hashed_entry(g.group_id, g.group_id));
        // The referencing entry goes in after the group, and out before it.
        if utype == update::Type::Delete {
            Ok(vec![hashed, group])
        } else {
            Ok(vec![group, hashed])
        }
    }

    fn handle_acl(&self, _ctx: &Ctx, e: &AclEntry, utype: update::Type) -> Result<Vec<Update>> {
        let t = &e.0;
        let mut fields = Vec::new();
        for m in &t.r#match {
            let (value, mask) = m.ternary_value().ok_or_else(|| {
                Error::InvalidArgument(format!("ACL field {} must be a ternary match", m.field_id))
            })?;
            let phys_id = match m.field_id {
                logical::HDR_ACLS_PORT => HDR_ACL_IG_PORT,
                logical::HDR_ACLS_ETH_SRC => HDR_ACL_ETH_SRC,
                logical::HDR_ACLS_ETH_DST => HDR_ACL_ETH_DST,
                logical::HDR_ACLS_ETH_TYPE => HDR_ACL_ETH_TYPE,
                logical::HDR_ACLS_IPV4_SRC => HDR_ACL_IPV4_SRC,
                logical::HDR_ACLS_IPV4_DST => HDR_ACL_IPV4_DST,
                logical::HDR_ACLS_IPV4_PROTO => HDR_ACL_IP_PROTO,
                logical::HDR_ACLS_L4_SPORT => HDR_ACL_L4_SPORT,
                logical::HDR_ACLS_L4_DPORT => HDR_ACL_L4_DPORT,
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "ACL match field {} has no physical counterpart",
                        other
                    )))
                }
            };
            fields.push(FieldMatch::ternary(phys_id, value.to_vec(), mask.to_vec()));
        }
        let action = t
            .direct_action()
            .ok_or_else(|| Error::InvalidArgument("ACL entry carries no action".to_string()))?;
        let phys_action = match action.action_id {
            logical::ACTION_ACL_PUNT => ACTION_ACL_PUNT_TO_CPU,
            logical::ACTION_ACL_DROP => ACTION_ACL_DROP,
            logical::ACTION_ACL_SET_PORT => {
                warn!("ACL set_port not implemented");
                return Ok(Vec::new());
            }
            other => return Err(Error::InvalidArgument(format!("ACL action {}", other))),
        };
        Ok(vec![Update::table_entry(
            utype,
            TableEntry {
                table_id: TBL_ACL,
                r#match: fields,
                action: Some(p4rt::TableAction::direct(p4rt::Action::new(phys_action))),
                priority: t.priority,
            },
        )])
    }

    fn handle_pppoe_punt(
        &self,
        _ctx: &Ctx,
        e: &PppoePuntedEntry,
        utype: update::Type,
    ) -> Result<Vec<Update>> {
        trace!("PppoePuntedEntry={{ {} }}", e);
        Ok(vec![Update::table_entry(
            utype,
            pppoe_punt_entry(&e.pppoe_code, e.pppoe_proto.as_deref(), DEFAULT_PRIORITY),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{IfTypeEntry, MyStationEntry};
    use crate::store::LogicalStore;
    use p4rt::entity;
    use pretty_assertions::assert_eq;

    fn ctx_empty() -> (LogicalStore, P4rtStore) {
        (LogicalStore::new(), P4rtStore::new())
    }

    fn table_entry_of(u: &Update) -> &TableEntry {
        match u.kind() {
            Some(entity::Entity::TableEntry(e)) => e,
            other => panic!("expected a table entry, got {:?}", other),
        }
    }

    #[test]
    fn core_interface_up() {
        // A core interface yields the untagged permit with the internal tag
        // plus the egress pop entry, in that order.
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let updates = FabricProcessor
            .handle_if_type(
                &ctx,
                &IfTypeEntry {
                    port: vec![0x00, 0x01],
                    if_type: vec![logical::IF_TYPE_CORE],
                },
                update::Type::Insert,
            )
            .unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.utype() == update::Type::Insert));

        let ipv = table_entry_of(&updates[0]);
        assert_eq!(ipv.table_id, TBL_INGRESS_PORT_VLAN);
        assert_eq!(
            ipv.field(HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID).unwrap().exact_value(),
            Some(&[0x00u8][..])
        );
        assert_eq!(
            ipv.direct_action().unwrap().param(PARAM_PERMIT_WITH_INTERNAL_VLAN_VLAN_ID),
            Some(&[0x0f, 0xfe][..])
        );
        assert_eq!(ipv.priority, DEFAULT_PRIORITY);

        let pop = table_entry_of(&updates[1]);
        assert_eq!(pop.table_id, TBL_EGRESS_VLAN);
        assert_eq!(
            pop.field(HDR_EGRESS_VLAN_VLAN_ID).unwrap().exact_value(),
            Some(&[0x0f, 0xfe][..])
        );
        assert_eq!(
            pop.field(HDR_EGRESS_VLAN_EG_PORT).unwrap().exact_value(),
            Some(&[0x00, 0x01][..])
        );
    }

    #[test]
    fn access_interface_is_a_noop() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let updates = FabricProcessor
            .handle_if_type(
                &ctx,
                &IfTypeEntry {
                    port: vec![0x00, 0x02],
                    if_type: vec![logical::IF_TYPE_ACCESS],
                },
                update::Type::Insert,
            )
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn my_station_maps_to_fwd_classifier() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let eth_dst = vec![0x00, 0xaa, 0x00, 0x00, 0x00, 0x01];
        let updates = FabricProcessor
            .handle_my_station(
                &ctx,
                &MyStationEntry {
                    port: vec![0x00, 0x01],
                    eth_dst: eth_dst.clone(),
                },
                update::Type::Insert,
            )
            .unwrap();
        assert_eq!(updates.len(), 1);
        let e = table_entry_of(&updates[0]);
        assert_eq!(e.table_id, TBL_FWD_CLASSIFIER);
        assert_eq!(e.priority, 1);
        assert_eq!(
            e.field(HDR_FWD_CLASSIFIER_ETH_DST).unwrap().ternary_value(),
            Some((&eth_dst[..], &[0xffu8; 6][..]))
        );
        assert_eq!(
            e.field(HDR_FWD_CLASSIFIER_IP_ETH_TYPE).unwrap().exact_value(),
            Some(&[0x08, 0x00][..])
        );
        let act = e.direct_action().unwrap();
        assert_eq!(act.action_id, ACTION_SET_FORWARDING_TYPE);
        assert_eq!(act.param(PARAM_SET_FORWARDING_TYPE_FWD_TYPE), Some(&[0x02u8][..]));
    }

    #[test]
    fn route_requires_upstream_direction() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let err = FabricProcessor
            .handle_route_v4(
                &ctx,
                &RouteV4Entry {
                    direction: Direction::Downstream,
                    ipv4_addr: vec![10, 1, 0, 0],
                    prefix_len: 16,
                    next_hop_group_id: 9,
                },
                update::Type::Insert,
            )
            .unwrap_err();
        assert_eq!(err.code(), crate::Code::InvalidArgument);
    }

    #[test]
    fn next_hop_requires_my_station() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let err = FabricProcessor
            .handle_next_hop(
                &ctx,
                &NextHopEntry {
                    id: 7,
                    port: vec![0x00, 0x02],
                    mac_addr: vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
                },
                update::Type::Insert,
            )
            .unwrap_err();
        assert_eq!(err.code(), crate::Code::FailedPrecondition);
    }

    #[test]
    fn group_ordering_reverses_on_delete() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let g = NextHopGroup {
            action_profile_id: logical::ACTPROF_ECMP,
            group_id: 9,
            members: vec![p4rt::action_profile_group::Member {
                member_id: 7,
                weight: 1,
            }],
            max_size: 1,
        };
        let insert = FabricProcessor
            .handle_next_hop_group(&ctx, &g, update::Type::Insert)
            .unwrap();
        assert!(matches!(
            insert[0].kind(),
            Some(entity::Entity::ActionProfileGroup(_))
        ));
        assert!(matches!(insert[1].kind(), Some(entity::Entity::TableEntry(_))));

        let delete = FabricProcessor
            .handle_next_hop_group(&ctx, &g, update::Type::Delete)
            .unwrap();
        assert!(matches!(delete[0].kind(), Some(entity::Entity::TableEntry(_))));
        assert!(matches!(
            delete[1].kind(),
            Some(entity::Entity::ActionProfileGroup(_))
        ));
    }

    #[test]
    fn acl_punt_maps_fields() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let logical_entry = TableEntry {
            table_id: logical::TBL_ACLS,
            r#match: vec![
                FieldMatch::ternary(logical::HDR_ACLS_PORT, vec![0x00, 0x01], vec![0xff, 0xff]),
                FieldMatch::ternary(logical::HDR_ACLS_ETH_TYPE, vec![0x88, 0x63], vec![0xff, 0xff]),
            ],
            action: Some(p4rt::TableAction::direct(p4rt::Action::new(
                logical::ACTION_ACL_PUNT,
            ))),
            priority: 10,
        };
        let updates = FabricProcessor
            .handle_acl(&ctx, &AclEntry(logical_entry), update::Type::Insert)
            .unwrap();
        let e = table_entry_of(&updates[0]);
        assert_eq!(e.table_id, TBL_ACL);
        assert_eq!(e.priority, 10);
        assert!(e.field(HDR_ACL_IG_PORT).is_some());
        assert!(e.field(HDR_ACL_ETH_TYPE).is_some());
        assert_eq!(e.direct_action().unwrap().action_id, ACTION_ACL_PUNT_TO_CPU);
    }

    #[test]
    fn acl_set_port_is_a_logged_noop() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let logical_entry = TableEntry {
            table_id: logical::TBL_ACLS,
            r#match: vec![],
            action: Some(p4rt::TableAction::direct(
                p4rt::Action::new(logical::ACTION_ACL_SET_PORT)
                    .with_param(logical::PARAM_ACL_SET_PORT_PORT, vec![0x00, 0x03]),
            )),
            priority: 1,
        };
        let updates = FabricProcessor
            .handle_acl(&ctx, &AclEntry(logical_entry), update::Type::Insert)
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn pppoe_punt_with_and_without_proto() {
        let (logical_store, target) = ctx_empty();
        let ctx = Ctx {
            logical: &logical_store,
            target: &target,
        };
        let updates = FabricProcessor
            .handle_pppoe_punt(
                &ctx,
                &PppoePuntedEntry {
                    pppoe_code: vec![0x09],
                    pppoe_proto: Some(vec![0xc0, 0x21]),
                },
                update::Type::Insert,
            )
            .unwrap();
        let e = table_entry_of(&updates[0]);
        assert_eq!(e.table_id, TBL_PPPOE_CP);
        assert_eq!(e.priority, 1);
        assert_eq!(
            e.field(HDR_PPPOE_CP_PPPOE_PROTOCOL).unwrap().ternary_value(),
            Some((&[0xc0u8, 0x21][..], &[0xffu8, 0xff][..]))
        );

        let updates = FabricProcessor
            .handle_pppoe_punt(
                &ctx,
                &PppoePuntedEntry {
                    pppoe_code: vec![0x09],
                    pppoe_proto: None,
                },
                update::Type::Insert,
            )
            .unwrap();
        assert!(table_entry_of(&updates[0]).field(HDR_PPPOE_CP_PPPOE_PROTOCOL).is_none());
    }
}

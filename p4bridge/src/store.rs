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

//! In-memory stores: a map store of P4Runtime entities keyed by identity
//! ([`P4rtStore`], used both for the raw logical entries and as the mirror of
//! the target), and the indexed view of the logical pipeline
//! ([`LogicalStore`]).

use std::collections::HashMap;

use tracing::{debug, warn};

use p4rt::{entity, field_match, update, ActionProfileGroup, ActionProfileMember, TableEntry, Update};

use crate::catalog::logical::*;
use crate::entity::{
    AttachmentEntry, Direction, IfTypeEntry, Ipv4LpmKey, LineIdKey, MyStationEntry, NextHopEntry,
    NextHopGroup, PortKey, RouteV4Entry,
};
use crate::error::{Error, Result};
use crate::parse;

/// Returns a string that uniquely identifies a table entry.  Uniqueness is
/// determined by the `(table id, match fields, priority)` triple, as the
/// P4Runtime spec defines it; the match list is rendered in source order.
pub fn table_entry_key(t: &TableEntry) -> String {
    let mut key = format!("{}-", t.table_id);
    for (i, m) in t.r#match.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        match &m.field_match_type {
            Some(field_match::FieldMatchType::Exact(e)) => {
                key.push_str(&format!("{}:e:{}", m.field_id, hex::encode(&e.value)));
            }
            Some(field_match::FieldMatchType::Ternary(t)) => {
                key.push_str(&format!(
                    "{}:t:{}/{}",
                    m.field_id,
                    hex::encode(&t.value),
                    hex::encode(&t.mask)
                ));
            }
            Some(field_match::FieldMatchType::Lpm(l)) => {
                key.push_str(&format!(
                    "{}:l:{}/{}",
                    m.field_id,
                    hex::encode(&l.value),
                    l.prefix_len
                ));
            }
            None => {
                key.push_str(&format!("{}:_", m.field_id));
            }
        }
    }
    key.push_str(&format!("-{}", t.priority));
    key
}

/// Returns a string that uniquely identifies an action profile group.
pub fn group_key(action_profile_id: u32, group_id: u32) -> String {
    format!("{}-{}", action_profile_id, group_id)
}

/// Returns a string that uniquely identifies an action profile member.
pub fn member_key(action_profile_id: u32, member_id: u32) -> String {
    format!("{}-{}", action_profile_id, member_id)
}

/// A store of P4Runtime entities with map semantics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct P4rtStore {
    table_entries: HashMap<String, TableEntry>,
    groups: HashMap<String, ActionProfileGroup>,
    members: HashMap<String, ActionProfileMember>,
}

fn apply_slot<T: Clone>(
    map: &mut HashMap<String, T>,
    kind: &str,
    key: String,
    utype: update::Type,
    value: &T,
) -> Result<()> {
    match utype {
        update::Type::Insert => {
            if map.contains_key(&key) {
                return Err(Error::AlreadyExists(format!("{} {}", kind, key)));
            }
            map.insert(key, value.clone());
        }
        update::Type::Modify => {
            if !map.contains_key(&key) {
                return Err(Error::NotFound(format!("{} {}", kind, key)));
            }
            map.insert(key, value.clone());
        }
        update::Type::Delete => {
            if map.remove(&key).is_none() {
                return Err(Error::NotFound(format!("{} {}", kind, key)));
            }
        }
        update::Type::Unspecified => {
            return Err(Error::InvalidArgument("unspecified update type".to_string()));
        }
    }
    Ok(())
}

impl P4rtStore {
    pub fn new() -> P4rtStore {
        P4rtStore::default()
    }

    /// Applies a single update.  With `dry_run` all checks run but the store
    /// is left untouched.
    pub fn apply(&mut self, u: &Update, dry_run: bool) -> Result<()> {
        let utype = u.utype();
        match u.kind() {
            Some(entity::Entity::TableEntry(e)) => {
                let key = table_entry_key(e);
                self.apply_table_entry(key, utype, e, dry_run)
            }
            Some(entity::Entity::ActionProfileGroup(g)) => {
                let key = group_key(g.action_profile_id, g.group_id);
                self.apply_group(key, utype, g, dry_run)
            }
            Some(entity::Entity::ActionProfileMember(m)) => {
                let key = member_key(m.action_profile_id, m.member_id);
                self.apply_member(key, utype, m, dry_run)
            }
            None => {
                warn!("storing this entity kind is not implemented, ignoring: {:?}", u);
                Ok(())
            }
        }
    }

    fn apply_table_entry(
        &mut self,
        key: String,
        utype: update::Type,
        e: &TableEntry,
        dry_run: bool,
    ) -> Result<()> {
        if dry_run {
            return self.check_slot(self.table_entries.contains_key(&key), "table entry", key, utype);
        }
        apply_slot(&mut self.table_entries, "table entry", key, utype, e)
    }

    fn apply_group(
        &mut self,
        key: String,
        utype: update::Type,
        g: &ActionProfileGroup,
        dry_run: bool,
    ) -> Result<()> {
        if dry_run {
            return self.check_slot(self.groups.contains_key(&key), "group", key, utype);
        }
        apply_slot(&mut self.groups, "group", key, utype, g)
    }

    fn apply_member(
        &mut self,
        key: String,
        utype: update::Type,
        m: &ActionProfileMember,
        dry_run: bool,
    ) -> Result<()> {
        if dry_run {
            return self.check_slot(self.members.contains_key(&key), "member", key, utype);
        }
        apply_slot(&mut self.members, "member", key, utype, m)
    }

    fn check_slot(&self, present: bool, kind: &str, key: String, utype: update::Type) -> Result<()> {
        match utype {
            update::Type::Insert if present => Err(Error::AlreadyExists(format!("{} {}", kind, key))),
            update::Type::Modify | update::Type::Delete if !present => {
                Err(Error::NotFound(format!("{} {}", kind, key)))
            }
            update::Type::Unspecified => {
                Err(Error::InvalidArgument("unspecified update type".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn put_table_entry(&mut self, e: TableEntry) {
        debug!("put_table_entry: {:?}", e);
        self.table_entries.insert(table_entry_key(&e), e);
    }

    pub fn table_entry(&self, key: &str) -> Option<&TableEntry> {
        self.table_entries.get(key)
    }

    pub fn remove_table_entry(&mut self, e: &TableEntry) {
        debug!("remove_table_entry: {:?}", e);
        self.table_entries.remove(&table_entry_key(e));
    }

    /// Returns the table entries that satisfy `f`, in unspecified order.
    pub fn filter_table_entries(&self, f: impl Fn(&TableEntry) -> bool) -> Vec<&TableEntry> {
        self.table_entries.values().filter(|e| f(e)).collect()
    }

    pub fn table_entry_count(&self) -> usize {
        self.table_entries.len()
    }

    pub fn group(&self, key: &str) -> Option<&ActionProfileGroup> {
        self.groups.get(key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn member(&self, key: &str) -> Option<&ActionProfileMember> {
        self.members.get(key)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Indexed view of the logical pipeline, keyed by domain tuples rather than
/// wire identity.  ACL and punt entries are not indexed here; their logical
/// state lives in the raw entry store.
#[derive(Clone, Debug, Default)]
pub struct LogicalStore {
    if_types: HashMap<PortKey, IfTypeEntry>,
    my_stations: HashMap<PortKey, MyStationEntry>,
    up_attachments: HashMap<LineIdKey, AttachmentEntry>,
    down_attachments: HashMap<LineIdKey, AttachmentEntry>,
    routes_v4: HashMap<Ipv4LpmKey, RouteV4Entry>,
    next_hops: HashMap<u32, NextHopEntry>,
    next_hop_groups: HashMap<u32, NextHopGroup>,
}

impl LogicalStore {
    pub fn new() -> LogicalStore {
        LogicalStore::default()
    }

    pub fn if_type(&self, key: &PortKey) -> Option<&IfTypeEntry> {
        self.if_types.get(key)
    }

    pub fn my_station(&self, key: &PortKey) -> Option<&MyStationEntry> {
        self.my_stations.get(key)
    }

    pub fn up_attachment(&self, key: &LineIdKey) -> Option<&AttachmentEntry> {
        self.up_attachments.get(key)
    }

    pub fn down_attachment(&self, key: &LineIdKey) -> Option<&AttachmentEntry> {
        self.down_attachments.get(key)
    }

    pub fn route_v4(&self, key: &Ipv4LpmKey) -> Option<&RouteV4Entry> {
        self.routes_v4.get(key)
    }

    pub fn next_hop(&self, id: u32) -> Option<&NextHopEntry> {
        self.next_hops.get(&id)
    }

    pub fn next_hop_group(&self, id: u32) -> Option<&NextHopGroup> {
        self.next_hop_groups.get(&id)
    }

    /// Evaluates a snapshot of the attachment touched by the given table
    /// entry: what the entry contributes, overlaid on the record stored for
    /// `(direction, line id)`.  The entry's direction and line id are
    /// authoritative; any other absent field is inherited from the store.
    /// Downstream attachments additionally inherit `port` and `mac_addr`
    /// from the upstream attachment of the same line, since no downstream
    /// table carries them.  Returns the snapshot and its completeness.
    pub fn eval_attachment(&self, t: &TableEntry) -> Result<(AttachmentEntry, bool)> {
        let mut a = match t.table_id {
            TBL_UPSTREAM_LINES => parse::upstream_line(t)?,
            TBL_UPSTREAM_ATTACHMENTS_V4 => parse::upstream_attachment_v4(t)?,
            TBL_DOWNSTREAM_LINES_V4 => parse::downstream_line_v4(t)?,
            TBL_DOWNSTREAM_VIDS => parse::downstream_vids(t)?,
            TBL_DOWNSTREAM_PPPOE_SESSIONS => parse::downstream_pppoe_session(t)?,
            other => {
                return Err(Error::Unimplemented(format!(
                    "attachment-level table {}",
                    other
                )))
            }
        };
        if a.line_id.is_empty() {
            return Err(Error::InvalidArgument(
                "attachment entry carries no line id".to_string(),
            ));
        }
        let key = LineIdKey::from_bytes(&a.line_id);
        let stored = match a.direction {
            Direction::Upstream => self.up_attachments.get(&key),
            Direction::Downstream => self.down_attachments.get(&key),
            Direction::Unspecified => None,
        };
        if let Some(s) = stored {
            if a.port.is_none() {
                a.port = s.port.clone();
            }
            if a.s_tag.is_none() {
                a.s_tag = s.s_tag.clone();
            }
            if a.c_tag.is_none() {
                a.c_tag = s.c_tag.clone();
            }
            if a.mac_addr.is_none() {
                a.mac_addr = s.mac_addr.clone();
            }
            if a.ipv4_addr.is_none() {
                a.ipv4_addr = s.ipv4_addr.clone();
            }
            if a.pppoe_sess_id.is_none() {
                a.pppoe_sess_id = s.pppoe_sess_id.clone();
            }
        }
        if a.direction == Direction::Downstream {
            if let Some(up) = self.up_attachments.get(&key) {
                if a.port.is_none() {
                    a.port = up.port.clone();
                }
                if a.mac_addr.is_none() {
                    a.mac_addr = up.mac_addr.clone();
                }
            }
        }
        let complete = a.is_complete();
        Ok((a, complete))
    }

    /// Applies a single logical update.  The dry-run pass only validates
    /// (strict parsing); key-existence semantics are the raw entry store's
    /// concern.
    pub fn apply(&mut self, u: &Update, dry_run: bool) -> Result<()> {
        let utype = u.utype();
        match u.kind() {
            Some(entity::Entity::TableEntry(t)) => self.apply_table_entry(t, utype, dry_run),
            Some(entity::Entity::ActionProfileMember(m)) => {
                if m.action_profile_id != ACTPROF_ECMP {
                    warn!(
                        "action profile {} not implemented, ignoring",
                        m.action_profile_id
                    );
                    return Ok(());
                }
                let e = parse::next_hop(m)?;
                if !dry_run {
                    if utype == update::Type::Delete {
                        self.next_hops.remove(&e.id);
                    } else {
                        self.next_hops.insert(e.id, e);
                    }
                }
                Ok(())
            }
            Some(entity::Entity::ActionProfileGroup(g)) => {
                if g.action_profile_id != ACTPROF_ECMP {
                    warn!(
                        "action profile {} not implemented, ignoring",
                        g.action_profile_id
                    );
                    return Ok(());
                }
                let group = parse::next_hop_group(g)?;
                if !dry_run {
                    if utype == update::Type::Delete {
                        self.next_hop_groups.remove(&group.group_id);
                    } else {
                        self.next_hop_groups.insert(group.group_id, group);
                    }
                }
                Ok(())
            }
            None => {
                warn!("storing this entity kind is not implemented, ignoring: {:?}", u);
                Ok(())
            }
        }
    }

    fn apply_table_entry(&mut self, t: &TableEntry, utype: update::Type, dry_run: bool) -> Result<()> {
        match t.table_id {
            TBL_IF_TYPES => {
                let e = parse::if_type(t)?;
                if !dry_run {
                    let key = PortKey::from_bytes(&e.port);
                    if utype == update::Type::Delete {
                        self.if_types.remove(&key);
                    } else {
                        self.if_types.insert(key, e);
                    }
                }
            }
            TBL_MY_STATIONS => {
                let e = parse::my_station(t)?;
                if !dry_run {
                    let key = PortKey::from_bytes(&e.port);
                    if utype == update::Type::Delete {
                        self.my_stations.remove(&key);
                    } else {
                        self.my_stations.insert(key, e);
                    }
                }
            }
            TBL_UPSTREAM_LINES
            | TBL_UPSTREAM_ATTACHMENTS_V4
            | TBL_DOWNSTREAM_LINES_V4
            | TBL_DOWNSTREAM_VIDS
            | TBL_DOWNSTREAM_PPPOE_SESSIONS => {
                self.apply_attachment(t, utype, dry_run)?;
            }
            TBL_ROUTES_V4 => {
                let e = parse::route_v4(t)?;
                if !dry_run {
                    let key = Ipv4LpmKey::new(&e.ipv4_addr, e.prefix_len);
                    if utype == update::Type::Delete {
                        self.routes_v4.remove(&key);
                    } else {
                        self.routes_v4.insert(key, e);
                    }
                }
            }
            TBL_ACLS => {
                // Validated here, mirrored only in the raw entry store.
                parse::acl(t)?;
            }
            TBL_UPSTREAM_PPPOE_PUNTS => {
                parse::pppoe_punt(t)?;
            }
            other => {
                warn!("table {} not indexed by the logical store, ignoring", other);
            }
        }
        Ok(())
    }

    fn apply_attachment(&mut self, t: &TableEntry, utype: update::Type, dry_run: bool) -> Result<()> {
        let (a, _) = self.eval_attachment(t)?;
        if dry_run {
            return Ok(());
        }
        let key = LineIdKey::from_bytes(&a.line_id);
        let map = match a.direction {
            Direction::Upstream => &mut self.up_attachments,
            Direction::Downstream => &mut self.down_attachments,
            Direction::Unspecified => {
                return Err(Error::InvalidArgument(
                    "attachment with unspecified direction".to_string(),
                ))
            }
        };
        if utype != update::Type::Delete {
            map.insert(key, a);
            return Ok(());
        }
        // Deleting one contributing table clears only that table's fields;
        // the record goes away once no contribution remains.
        let Some(stored) = map.get_mut(&key) else {
            debug!("attachment delete for line {} with no stored record", hex::encode(&a.line_id));
            return Ok(());
        };
        match t.table_id {
            TBL_UPSTREAM_LINES => {
                stored.port = None;
                stored.s_tag = None;
                stored.c_tag = None;
            }
            TBL_UPSTREAM_ATTACHMENTS_V4 => {
                stored.mac_addr = None;
                stored.ipv4_addr = None;
                stored.pppoe_sess_id = None;
            }
            TBL_DOWNSTREAM_LINES_V4 => stored.ipv4_addr = None,
            TBL_DOWNSTREAM_VIDS => {
                stored.s_tag = None;
                stored.c_tag = None;
            }
            TBL_DOWNSTREAM_PPPOE_SESSIONS => stored.pppoe_sess_id = None,
            _ => {}
        }
        let empty = match stored.direction {
            Direction::Downstream => {
                // Port and MAC are inherited, not contributed.
                stored.s_tag.is_none()
                    && stored.c_tag.is_none()
                    && stored.ipv4_addr.is_none()
                    && stored.pppoe_sess_id.is_none()
            }
            _ => {
                stored.port.is_none()
                    && stored.s_tag.is_none()
                    && stored.c_tag.is_none()
                    && stored.mac_addr.is_none()
                    && stored.ipv4_addr.is_none()
                    && stored.pppoe_sess_id.is_none()
            }
        };
        if empty {
            map.remove(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4rt::{Action, FieldMatch, TableAction};
    use pretty_assertions::assert_eq;

    fn mock_entry(table_id: u32, values: &[(u32, u8)], priority: i32) -> TableEntry {
        TableEntry {
            table_id,
            r#match: values
                .iter()
                .map(|&(id, v)| FieldMatch::exact(id, vec![v]))
                .collect(),
            action: Some(TableAction::direct(Action::new(1).with_param(1, vec![0x0a]))),
            priority,
        }
    }

    #[test]
    fn table_entry_key_is_canonical() {
        let e1 = mock_entry(1, &[(1, 0x01), (2, 0x02)], 1);
        let same_as_e1 = mock_entry(1, &[(1, 0x01), (2, 0x02)], 1);
        let e2 = mock_entry(2, &[(3, 0x03), (4, 0x04)], 1);
        assert_eq!(table_entry_key(&e1), table_entry_key(&same_as_e1));
        assert_ne!(table_entry_key(&e1), table_entry_key(&e2));

        let other_priority = mock_entry(1, &[(1, 0x01), (2, 0x02)], 2);
        assert_ne!(table_entry_key(&e1), table_entry_key(&other_priority));

        let other_value = mock_entry(1, &[(1, 0x01), (2, 0x03)], 1);
        assert_ne!(table_entry_key(&e1), table_entry_key(&other_value));

        // A different action does not participate in identity.
        let mut other_action = mock_entry(1, &[(1, 0x01), (2, 0x02)], 1);
        other_action.action = Some(TableAction::group_ref(7));
        assert_eq!(table_entry_key(&e1), table_entry_key(&other_action));
    }

    #[test]
    fn key_distinguishes_match_kinds() {
        let exact = TableEntry {
            table_id: 1,
            r#match: vec![FieldMatch::exact(1, vec![0x0a])],
            action: None,
            priority: 0,
        };
        let ternary = TableEntry {
            table_id: 1,
            r#match: vec![FieldMatch::ternary(1, vec![0x0a], vec![0xff])],
            action: None,
            priority: 0,
        };
        let lpm = TableEntry {
            table_id: 1,
            r#match: vec![FieldMatch::lpm(1, vec![0x0a], 8)],
            action: None,
            priority: 0,
        };
        assert_ne!(table_entry_key(&exact), table_entry_key(&ternary));
        assert_ne!(table_entry_key(&exact), table_entry_key(&lpm));
        assert_ne!(table_entry_key(&ternary), table_entry_key(&lpm));
    }

    #[test]
    fn store_roundtrip() {
        let mut s = P4rtStore::new();
        let e = mock_entry(1, &[(1, 0x01)], 1);
        s.put_table_entry(e.clone());
        assert_eq!(s.table_entry(&table_entry_key(&e)), Some(&e));
        s.remove_table_entry(&e);
        assert_eq!(s.table_entry(&table_entry_key(&e)), None);
    }

    #[test]
    fn filter_table_entries() {
        let mut s = P4rtStore::new();
        s.put_table_entry(mock_entry(1, &[(1, 0x01)], 1));
        s.put_table_entry(mock_entry(2, &[(1, 0x02)], 1));
        assert_eq!(s.filter_table_entries(|e| e.table_id == 1).len(), 1);
        assert_eq!(s.filter_table_entries(|e| e.table_id <= 99).len(), 2);
        assert_eq!(s.filter_table_entries(|_| false).len(), 0);
    }

    #[test]
    fn apply_validates_and_commits() {
        let mut s = P4rtStore::new();
        let e = mock_entry(1, &[(1, 0x01)], 1);
        let insert = Update::table_entry(update::Type::Insert, e.clone());
        let modify = Update::table_entry(update::Type::Modify, e.clone());
        let delete = Update::table_entry(update::Type::Delete, e.clone());

        assert_eq!(
            s.apply(&modify, false).unwrap_err().code(),
            crate::Code::NotFound
        );
        assert_eq!(
            s.apply(&delete, false).unwrap_err().code(),
            crate::Code::NotFound
        );
        s.apply(&insert, false).unwrap();
        assert_eq!(
            s.apply(&insert, false).unwrap_err().code(),
            crate::Code::AlreadyExists
        );
        s.apply(&modify, false).unwrap();
        s.apply(&delete, false).unwrap();
        assert_eq!(s.table_entry_count(), 0);
    }

    #[test]
    fn dry_run_is_pure() {
        let mut s = P4rtStore::new();
        let e1 = mock_entry(1, &[(1, 0x01)], 1);
        s.apply(&Update::table_entry(update::Type::Insert, e1.clone()), false)
            .unwrap();
        let before = s.clone();

        let e2 = mock_entry(1, &[(1, 0x02)], 1);
        s.apply(&Update::table_entry(update::Type::Insert, e2), true)
            .unwrap();
        s.apply(&Update::table_entry(update::Type::Modify, e1.clone()), true)
            .unwrap();
        s.apply(&Update::table_entry(update::Type::Delete, e1), true)
            .unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn group_and_member_slots() {
        let mut s = P4rtStore::new();
        let member = ActionProfileMember {
            action_profile_id: 291115404,
            member_id: 7,
            action: Some(Action::new(1)),
        };
        let group = ActionProfileGroup {
            action_profile_id: 291115404,
            group_id: 9,
            members: vec![p4rt::action_profile_group::Member {
                member_id: 7,
                weight: 1,
            }],
            max_size: 1,
        };
        s.apply(&Update::member(update::Type::Insert, member.clone()), false)
            .unwrap();
        s.apply(&Update::group(update::Type::Insert, group.clone()), false)
            .unwrap();
        assert!(s.member(&member_key(291115404, 7)).is_some());
        assert!(s.group(&group_key(291115404, 9)).is_some());
        assert_eq!(
            s.apply(&Update::group(update::Type::Insert, group.clone()), false)
                .unwrap_err()
                .code(),
            crate::Code::AlreadyExists
        );
        s.apply(&Update::group(update::Type::Delete, group), false)
            .unwrap();
        s.apply(&Update::member(update::Type::Delete, member), false)
            .unwrap();
        assert_eq!(s.group_count(), 0);
        assert_eq!(s.member_count(), 0);
    }
}

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

//! `p4rt` is a hand-maintained model of the subset of the P4Runtime v1 wire
//! protocol that the shim manipulates.  Field tags match the upstream
//! `p4/v1/p4runtime.proto` schema, so the encoded bytes of these messages are
//! wire-compatible with the official bindings for the modeled subset.  The
//! forwarding-pipeline schema itself is deliberately kept opaque: the shim
//! only ever compares and swaps serialized schema blobs, and an embedded
//! message field and a `bytes` field share the same wire representation.

/// A 128-bit election id, high word first.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Uint128 {
    #[prost(uint64, tag = "1")]
    pub high: u64,
    #[prost(uint64, tag = "2")]
    pub low: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldMatch {
    #[prost(uint32, tag = "1")]
    pub field_id: u32,
    #[prost(oneof = "field_match::FieldMatchType", tags = "2, 3, 4")]
    pub field_match_type: Option<field_match::FieldMatchType>,
}

pub mod field_match {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Exact {
        #[prost(bytes = "vec", tag = "1")]
        pub value: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Ternary {
        #[prost(bytes = "vec", tag = "1")]
        pub value: Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub mask: Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Lpm {
        #[prost(bytes = "vec", tag = "1")]
        pub value: Vec<u8>,
        #[prost(int32, tag = "2")]
        pub prefix_len: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum FieldMatchType {
        #[prost(message, tag = "2")]
        Exact(Exact),
        #[prost(message, tag = "3")]
        Ternary(Ternary),
        #[prost(message, tag = "4")]
        Lpm(Lpm),
    }
}

impl FieldMatch {
    pub fn exact(field_id: u32, value: impl Into<Vec<u8>>) -> FieldMatch {
        FieldMatch {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Exact(field_match::Exact {
                value: value.into(),
            })),
        }
    }

    pub fn ternary(
        field_id: u32,
        value: impl Into<Vec<u8>>,
        mask: impl Into<Vec<u8>>,
    ) -> FieldMatch {
        FieldMatch {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Ternary(field_match::Ternary {
                value: value.into(),
                mask: mask.into(),
            })),
        }
    }

    pub fn lpm(field_id: u32, value: impl Into<Vec<u8>>, prefix_len: i32) -> FieldMatch {
        FieldMatch {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Lpm(field_match::Lpm {
                value: value.into(),
                prefix_len,
            })),
        }
    }

    /// The exact-match value, if this is an exact match.
    pub fn exact_value(&self) -> Option<&[u8]> {
        match self.field_match_type {
            Some(field_match::FieldMatchType::Exact(ref e)) => Some(&e.value),
            _ => None,
        }
    }

    pub fn ternary_value(&self) -> Option<(&[u8], &[u8])> {
        match self.field_match_type {
            Some(field_match::FieldMatchType::Ternary(ref t)) => Some((&t.value, &t.mask)),
            _ => None,
        }
    }

    pub fn lpm_value(&self) -> Option<(&[u8], i32)> {
        match self.field_match_type {
            Some(field_match::FieldMatchType::Lpm(ref l)) => Some((&l.value, l.prefix_len)),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Action {
    #[prost(uint32, tag = "1")]
    pub action_id: u32,
    #[prost(message, repeated, tag = "4")]
    pub params: Vec<action::Param>,
}

pub mod action {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Param {
        #[prost(uint32, tag = "2")]
        pub param_id: u32,
        #[prost(bytes = "vec", tag = "3")]
        pub value: Vec<u8>,
    }
}

impl Action {
    pub fn new(action_id: u32) -> Action {
        Action {
            action_id,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param_id: u32, value: impl Into<Vec<u8>>) -> Action {
        self.params.push(action::Param {
            param_id,
            value: value.into(),
        });
        self
    }

    /// The value of the parameter with the given id, if present.
    pub fn param(&self, param_id: u32) -> Option<&[u8]> {
        self.params
            .iter()
            .find(|p| p.param_id == param_id)
            .map(|p| p.value.as_slice())
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableAction {
    #[prost(oneof = "table_action::Type", tags = "1, 2, 3")]
    pub r#type: Option<table_action::Type>,
}

pub mod table_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "1")]
        Action(super::Action),
        #[prost(uint32, tag = "2")]
        ActionProfileMemberId(u32),
        #[prost(uint32, tag = "3")]
        ActionProfileGroupId(u32),
    }
}

impl TableAction {
    pub fn direct(action: Action) -> TableAction {
        TableAction {
            r#type: Some(table_action::Type::Action(action)),
        }
    }

    pub fn group_ref(group_id: u32) -> TableAction {
        TableAction {
            r#type: Some(table_action::Type::ActionProfileGroupId(group_id)),
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self.r#type {
            Some(table_action::Type::Action(ref a)) => Some(a),
            _ => None,
        }
    }

    pub fn group_id(&self) -> Option<u32> {
        match self.r#type {
            Some(table_action::Type::ActionProfileGroupId(id)) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableEntry {
    #[prost(uint32, tag = "1")]
    pub table_id: u32,
    #[prost(message, repeated, tag = "2")]
    pub r#match: Vec<FieldMatch>,
    #[prost(message, optional, tag = "3")]
    pub action: Option<TableAction>,
    #[prost(int32, tag = "4")]
    pub priority: i32,
}

impl TableEntry {
    /// The entry's direct action, if the entry carries one (as opposed to an
    /// action profile reference).
    pub fn direct_action(&self) -> Option<&Action> {
        self.action.as_ref().and_then(|a| a.as_action())
    }

    /// The match field with the given id, if present.
    pub fn field(&self, field_id: u32) -> Option<&FieldMatch> {
        self.r#match.iter().find(|m| m.field_id == field_id)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionProfileMember {
    #[prost(uint32, tag = "1")]
    pub action_profile_id: u32,
    #[prost(uint32, tag = "2")]
    pub member_id: u32,
    #[prost(message, optional, tag = "3")]
    pub action: Option<Action>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionProfileGroup {
    #[prost(uint32, tag = "1")]
    pub action_profile_id: u32,
    #[prost(uint32, tag = "2")]
    pub group_id: u32,
    #[prost(message, repeated, tag = "3")]
    pub members: Vec<action_profile_group::Member>,
    #[prost(int32, tag = "4")]
    pub max_size: i32,
}

pub mod action_profile_group {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Member {
        #[prost(uint32, tag = "1")]
        pub member_id: u32,
        #[prost(int32, tag = "2")]
        pub weight: i32,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entity {
    #[prost(oneof = "entity::Entity", tags = "2, 3, 4")]
    pub entity: Option<entity::Entity>,
}

pub mod entity {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Entity {
        #[prost(message, tag = "2")]
        TableEntry(super::TableEntry),
        #[prost(message, tag = "3")]
        ActionProfileMember(super::ActionProfileMember),
        #[prost(message, tag = "4")]
        ActionProfileGroup(super::ActionProfileGroup),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Update {
    #[prost(enumeration = "update::Type", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub entity: Option<Entity>,
}

pub mod update {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Unspecified = 0,
        Insert = 1,
        Modify = 2,
        Delete = 3,
    }
}

impl Update {
    pub fn new(utype: update::Type, entity: entity::Entity) -> Update {
        Update {
            r#type: utype as i32,
            entity: Some(Entity {
                entity: Some(entity),
            }),
        }
    }

    pub fn table_entry(utype: update::Type, entry: TableEntry) -> Update {
        Update::new(utype, entity::Entity::TableEntry(entry))
    }

    pub fn member(utype: update::Type, member: ActionProfileMember) -> Update {
        Update::new(utype, entity::Entity::ActionProfileMember(member))
    }

    pub fn group(utype: update::Type, group: ActionProfileGroup) -> Update {
        Update::new(utype, entity::Entity::ActionProfileGroup(group))
    }

    /// The update type, with out-of-range wire values mapped to `Unspecified`.
    pub fn utype(&self) -> update::Type {
        update::Type::try_from(self.r#type).unwrap_or(update::Type::Unspecified)
    }

    pub fn kind(&self) -> Option<&entity::Entity> {
        self.entity.as_ref().and_then(|e| e.entity.as_ref())
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(uint64, tag = "2")]
    pub role_id: u64,
    #[prost(message, optional, tag = "3")]
    pub election_id: Option<Uint128>,
    #[prost(message, repeated, tag = "4")]
    pub updates: Vec<Update>,
    #[prost(enumeration = "write_request::Atomicity", tag = "5")]
    pub atomicity: i32,
}

pub mod write_request {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Atomicity {
        ContinueOnError = 0,
        RollbackOnError = 1,
        DataplaneAtomic = 2,
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct WriteResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(message, repeated, tag = "2")]
    pub entities: Vec<Entity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    #[prost(message, repeated, tag = "1")]
    pub entities: Vec<Entity>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CapabilitiesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CapabilitiesResponse {
    #[prost(string, tag = "1")]
    pub p4runtime_api_version: String,
}

/// The pipeline configuration.  The schema (`p4info`) is carried as an opaque
/// serialized blob; see the crate docs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ForwardingPipelineConfig {
    #[prost(bytes = "vec", tag = "1")]
    pub p4info: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub p4_device_config: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub cookie: Option<forwarding_pipeline_config::Cookie>,
}

pub mod forwarding_pipeline_config {
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct Cookie {
        #[prost(uint64, tag = "1")]
        pub cookie: u64,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetForwardingPipelineConfigRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(message, optional, tag = "3")]
    pub election_id: Option<Uint128>,
    #[prost(
        enumeration = "set_forwarding_pipeline_config_request::Action",
        tag = "4"
    )]
    pub action: i32,
    #[prost(message, optional, tag = "5")]
    pub config: Option<ForwardingPipelineConfig>,
}

pub mod set_forwarding_pipeline_config_request {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Action {
        Unspecified = 0,
        Verify = 1,
        VerifyAndSave = 2,
        VerifyAndCommit = 3,
        Commit = 4,
        ReconcileAndCommit = 5,
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SetForwardingPipelineConfigResponse {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetForwardingPipelineConfigRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetForwardingPipelineConfigResponse {
    #[prost(message, optional, tag = "1")]
    pub config: Option<ForwardingPipelineConfig>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MasterArbitrationUpdate {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(message, optional, tag = "3")]
    pub election_id: Option<Uint128>,
    #[prost(message, optional, tag = "4")]
    pub status: Option<Status>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PacketMetadata {
    #[prost(uint32, tag = "1")]
    pub metadata_id: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PacketOut {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub metadata: Vec<PacketMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PacketIn {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub metadata: Vec<PacketMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamMessageRequest {
    #[prost(oneof = "stream_message_request::Update", tags = "1, 2")]
    pub update: Option<stream_message_request::Update>,
}

pub mod stream_message_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Update {
        #[prost(message, tag = "1")]
        Arbitration(super::MasterArbitrationUpdate),
        #[prost(message, tag = "2")]
        Packet(super::PacketOut),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamMessageResponse {
    #[prost(oneof = "stream_message_response::Update", tags = "1, 2")]
    pub update: Option<stream_message_response::Update>,
}

pub mod stream_message_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Update {
        #[prost(message, tag = "1")]
        Arbitration(super::MasterArbitrationUpdate),
        #[prost(message, tag = "2")]
        Packet(super::PacketIn),
    }
}

/// A `google.rpc.Status`-shaped failure record.  `details` carries one
/// [`Error`] per update of the failed write, in request order.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<Error>,
}

/// Per-update error detail, as in `p4.v1.Error`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(int32, tag = "1")]
    pub canonical_code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn update_roundtrip() {
        let entry = TableEntry {
            table_id: 42,
            r#match: vec![
                FieldMatch::exact(1, vec![0x00, 0x01]),
                FieldMatch::ternary(2, vec![0x0a], vec![0xff]),
            ],
            action: Some(TableAction::direct(
                Action::new(7).with_param(1, vec![0x0f, 0xfe]),
            )),
            priority: 1,
        };
        let update = Update::table_entry(update::Type::Insert, entry.clone());
        let bytes = update.encode_to_vec();
        let decoded = Update::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, update);
        assert_eq!(decoded.utype(), update::Type::Insert);
        match decoded.kind() {
            Some(entity::Entity::TableEntry(e)) => assert_eq!(e, &entry),
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn accessors() {
        let entry = TableEntry {
            table_id: 1,
            r#match: vec![FieldMatch::lpm(3, vec![10, 1, 0, 0], 16)],
            action: Some(TableAction::group_ref(9)),
            priority: 0,
        };
        assert_eq!(entry.field(3).unwrap().lpm_value(), Some((&[10u8, 1, 0, 0][..], 16)));
        assert_eq!(entry.field(3).unwrap().exact_value(), None);
        assert!(entry.direct_action().is_none());
        assert_eq!(entry.action.as_ref().unwrap().group_id(), Some(9));
    }

    #[test]
    fn unknown_update_type_is_unspecified() {
        let update = Update {
            r#type: 99,
            entity: None,
        };
        assert_eq!(update.utype(), update::Type::Unspecified);
    }
}

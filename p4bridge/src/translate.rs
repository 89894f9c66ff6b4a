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

//! Translation of logical updates into ordered sequences of physical
//! updates.
//!
//! Logical tables hold either device-level or attachment-level state.
//! Device-level updates are parsed and handed straight to the change
//! processor.  Attachment-level state is spread over several tables, so the
//! translator first evaluates a snapshot of the attachment (stored record
//! overlaid with what this update contributes) and passes the snapshot to
//! the processor together with a flag telling whether it is complete.  A
//! processor typically installs the target-side entries of a complete
//! attachment and tears everything down for an incomplete or deleted one.

use p4rt::{entity, update, Update};

use crate::catalog::logical::*;
use crate::entity::{
    AclEntry, AttachmentEntry, IfTypeEntry, MyStationEntry, NextHopEntry, NextHopGroup,
    PppoePuntedEntry, RouteV4Entry,
};
use crate::error::{Error, Result};
use crate::parse;
use crate::store::{LogicalStore, P4rtStore};

/// Read access to both stores during translation.  The processor is the only
/// component that consults the logical store for cross-entity dependencies.
pub struct Ctx<'a> {
    pub logical: &'a LogicalStore,
    pub target: &'a P4rtStore,
}

/// A processor of changes in the logical pipeline state, producing the
/// physical updates that keep the target equivalent.  The returned list is
/// the exact apply order; the server does not reorder it.
pub trait Processor: Send {
    fn handle_if_type(&self, ctx: &Ctx, e: &IfTypeEntry, utype: update::Type)
        -> Result<Vec<Update>>;
    fn handle_my_station(
        &self,
        ctx: &Ctx,
        e: &MyStationEntry,
        utype: update::Type,
    ) -> Result<Vec<Update>>;
    /// `complete` tells whether every canonical attachment field is known.
    /// An incomplete (or deleted) attachment asks for removal of whatever
    /// was installed for it.
    fn handle_attachment(&self, ctx: &Ctx, a: &AttachmentEntry, complete: bool)
        -> Result<Vec<Update>>;
    fn handle_route_v4(&self, ctx: &Ctx, e: &RouteV4Entry, utype: update::Type)
        -> Result<Vec<Update>>;
    fn handle_next_hop(&self, ctx: &Ctx, e: &NextHopEntry, utype: update::Type)
        -> Result<Vec<Update>>;
    fn handle_next_hop_group(
        &self,
        ctx: &Ctx,
        g: &NextHopGroup,
        utype: update::Type,
    ) -> Result<Vec<Update>>;
    fn handle_acl(&self, ctx: &Ctx, e: &AclEntry, utype: update::Type) -> Result<Vec<Update>>;
    fn handle_pppoe_punt(
        &self,
        ctx: &Ctx,
        e: &PppoePuntedEntry,
        utype: update::Type,
    ) -> Result<Vec<Update>>;
}

/// A translator of logical updates.
pub enum Translator {
    /// Echoes every update unchanged.  Contract tests and bring-up.
    Dummy,
    /// Store-backed translation through a change processor.
    Processor(Box<dyn Processor>),
}

impl Translator {
    /// Translates one logical update into the ordered physical updates that
    /// apply the equivalent change to the target.  Pure: neither store is
    /// mutated.  The produced sequence is validated against a scratch copy
    /// of the target store, so a duplicate insert or a delete of a missing
    /// key surfaces here rather than on the target.
    pub fn translate(
        &self,
        u: &Update,
        logical: &LogicalStore,
        target: &P4rtStore,
    ) -> Result<Vec<Update>> {
        let utype = u.utype();
        if utype == update::Type::Unspecified {
            return Err(Error::InvalidArgument("unspecified update type".to_string()));
        }
        let physical = match self {
            Translator::Dummy => vec![u.clone()],
            Translator::Processor(p) => dispatch(p.as_ref(), u, utype, logical, target)?,
        };
        let mut scratch = target.clone();
        for pu in &physical {
            scratch.apply(pu, false)?;
        }
        Ok(physical)
    }
}

fn dispatch(
    processor: &dyn Processor,
    u: &Update,
    utype: update::Type,
    logical: &LogicalStore,
    target: &P4rtStore,
) -> Result<Vec<Update>> {
    let ctx = Ctx { logical, target };
    match u.kind() {
        Some(entity::Entity::TableEntry(t)) => match t.table_id {
            TBL_IF_TYPES => processor.handle_if_type(&ctx, &parse::if_type(t)?, utype),
            TBL_MY_STATIONS => processor.handle_my_station(&ctx, &parse::my_station(t)?, utype),
            TBL_UPSTREAM_LINES
            | TBL_UPSTREAM_ATTACHMENTS_V4
            | TBL_DOWNSTREAM_LINES_V4
            | TBL_DOWNSTREAM_VIDS
            | TBL_DOWNSTREAM_PPPOE_SESSIONS => {
                let (a, complete) = logical.eval_attachment(t)?;
                // A delete always walks the removal path, whatever the
                // accumulated record looks like.
                let complete = complete && utype != update::Type::Delete;
                processor.handle_attachment(&ctx, &a, complete)
            }
            TBL_ROUTES_V4 => processor.handle_route_v4(&ctx, &parse::route_v4(t)?, utype),
            TBL_ACLS => processor.handle_acl(&ctx, &parse::acl(t)?, utype),
            TBL_UPSTREAM_PPPOE_PUNTS => {
                processor.handle_pppoe_punt(&ctx, &parse::pppoe_punt(t)?, utype)
            }
            other => Err(Error::Unimplemented(format!("table {}", other))),
        },
        Some(entity::Entity::ActionProfileMember(m)) => {
            if m.action_profile_id != ACTPROF_ECMP {
                return Err(Error::Unimplemented(format!(
                    "action profile {}",
                    m.action_profile_id
                )));
            }
            processor.handle_next_hop(&ctx, &parse::next_hop(m)?, utype)
        }
        Some(entity::Entity::ActionProfileGroup(g)) => {
            if g.action_profile_id != ACTPROF_ECMP {
                return Err(Error::Unimplemented(format!(
                    "action profile {}",
                    g.action_profile_id
                )));
            }
            processor.handle_next_hop_group(&ctx, &parse::next_hop_group(g)?, utype)
        }
        None => Err(Error::Unimplemented("entity kind".to_string())),
    }
}

/// Commits a translated update: the physical updates to the target mirror,
/// then the logical update to both logical-side stores.  Must follow a
/// successful `translate` and a successful target write; a failure at this
/// point means the dry run and the commit disagree, which is a bug, and the
/// process dies rather than run with diverged state.
pub fn commit(
    u: &Update,
    physical: &[Update],
    logical: &mut LogicalStore,
    server: &mut P4rtStore,
    target: &mut P4rtStore,
) {
    for pu in physical {
        target
            .apply(pu, false)
            .expect("target mirror diverged from its dry run");
    }
    server
        .apply(u, false)
        .expect("server store diverged from its dry run");
    logical
        .apply(u, false)
        .expect("logical store diverged from its dry run");
}

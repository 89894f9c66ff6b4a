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

//! Identifier catalogs for the logical and the fabric pipeline schemas.
//! Numeric ids are the preamble ids of the respective P4Info files, bundled
//! as compile-time constants; the schema received from the controller is
//! checked against the bundled blob at pipeline-config time instead of being
//! interpreted at runtime.

/// The logical pipeline exposed upward to the controller.
pub mod logical {
    pub const ACTION_NOP: u32 = 28485346;

    // IngressPipe.if_types
    pub const TBL_IF_TYPES: u32 = 38498675;
    pub const HDR_IF_TYPES_PORT: u32 = 1;
    pub const ACTION_SET_IF_TYPE: u32 = 18538368;
    pub const PARAM_SET_IF_TYPE_IF_TYPE: u32 = 1;

    // IngressPipe.my_stations
    pub const TBL_MY_STATIONS: u32 = 49392761;
    pub const HDR_MY_STATIONS_PORT: u32 = 1;
    pub const HDR_MY_STATIONS_ETH_DST: u32 = 2;
    pub const ACTION_SET_MY_STATION: u32 = 29456969;

    // IngressPipe.upstream.lines
    pub const TBL_UPSTREAM_LINES: u32 = 33956689;
    pub const HDR_UPSTREAM_LINES_PORT: u32 = 1;
    pub const HDR_UPSTREAM_LINES_C_TAG: u32 = 2;
    pub const HDR_UPSTREAM_LINES_S_TAG: u32 = 3;
    pub const ACTION_UPSTREAM_SET_LINE: u32 = 17659136;
    pub const PARAM_UPSTREAM_SET_LINE_LINE_ID: u32 = 1;

    // IngressPipe.upstream.attachments_v4
    pub const TBL_UPSTREAM_ATTACHMENTS_V4: u32 = 44507663;
    pub const HDR_UPSTREAM_ATTACHMENTS_V4_LINE_ID: u32 = 1;
    pub const HDR_UPSTREAM_ATTACHMENTS_V4_ETH_SRC: u32 = 2;
    pub const HDR_UPSTREAM_ATTACHMENTS_V4_IPV4_SRC: u32 = 3;
    pub const HDR_UPSTREAM_ATTACHMENTS_V4_PPPOE_SESS_ID: u32 = 4;

    // IngressPipe.upstream.pppoe_punts
    pub const TBL_UPSTREAM_PPPOE_PUNTS: u32 = 39053621;
    pub const HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_CODE: u32 = 1;
    pub const HDR_UPSTREAM_PPPOE_PUNTS_PPPOE_PROTO: u32 = 2;
    pub const ACTION_UPSTREAM_PUNT: u32 = 27908888;

    // IngressPipe.downstream.lines_v4
    pub const TBL_DOWNSTREAM_LINES_V4: u32 = 44334275;
    pub const HDR_DOWNSTREAM_LINES_V4_IPV4_DST: u32 = 1;
    pub const ACTION_DOWNSTREAM_SET_LINE: u32 = 17097684;
    pub const PARAM_DOWNSTREAM_SET_LINE_LINE_ID: u32 = 1;

    // IngressPipe.downstream.vids
    pub const TBL_DOWNSTREAM_VIDS: u32 = 34456456;
    pub const HDR_DOWNSTREAM_VIDS_LINE_ID: u32 = 1;
    pub const ACTION_DOWNSTREAM_SET_VIDS: u32 = 23385620;
    pub const PARAM_DOWNSTREAM_SET_VIDS_C_TAG: u32 = 1;
    pub const PARAM_DOWNSTREAM_SET_VIDS_S_TAG: u32 = 2;

    // IngressPipe.downstream.pppoe_sessions
    pub const TBL_DOWNSTREAM_PPPOE_SESSIONS: u32 = 39589935;
    pub const HDR_DOWNSTREAM_PPPOE_SESSIONS_LINE_ID: u32 = 1;
    pub const ACTION_DOWNSTREAM_SET_PPPOE_SESS: u32 = 27412451;
    pub const PARAM_DOWNSTREAM_SET_PPPOE_SESS_PPPOE_SESS_ID: u32 = 1;

    // IngressPipe.routing.routes_v4
    pub const TBL_ROUTES_V4: u32 = 40572658;
    pub const HDR_ROUTES_V4_IPV4_DST: u32 = 1;
    pub const ACTPROF_ECMP: u32 = 293424976;
    pub const ACTION_ROUTE_V4: u32 = 21408227;
    pub const PARAM_ROUTE_V4_PORT: u32 = 1;
    pub const PARAM_ROUTE_V4_DMAC: u32 = 2;

    // IngressPipe.acl.acls
    pub const TBL_ACLS: u32 = 43911884;
    pub const HDR_ACLS_PORT: u32 = 1;
    pub const HDR_ACLS_IF_TYPE: u32 = 2;
    pub const HDR_ACLS_ETH_SRC: u32 = 3;
    pub const HDR_ACLS_ETH_DST: u32 = 4;
    pub const HDR_ACLS_ETH_TYPE: u32 = 5;
    pub const HDR_ACLS_IPV4_SRC: u32 = 6;
    pub const HDR_ACLS_IPV4_DST: u32 = 7;
    pub const HDR_ACLS_IPV4_PROTO: u32 = 8;
    pub const HDR_ACLS_L4_SPORT: u32 = 9;
    pub const HDR_ACLS_L4_DPORT: u32 = 10;
    pub const ACTION_ACL_PUNT: u32 = 22515864;
    pub const ACTION_ACL_DROP: u32 = 29272903;
    pub const ACTION_ACL_SET_PORT: u32 = 21835758;
    pub const PARAM_ACL_SET_PORT_PORT: u32 = 1;

    // Values of the if_type action parameter.
    pub const IF_TYPE_UNKNOWN: u8 = 0x00;
    pub const IF_TYPE_CORE: u8 = 0x01;
    pub const IF_TYPE_ACCESS: u8 = 0x02;
}

/// The fabric.p4 pipeline programmed on the target.
pub mod fabric {
    // FabricIngress.filtering.ingress_port_vlan
    pub const TBL_INGRESS_PORT_VLAN: u32 = 33611649;
    pub const HDR_INGRESS_PORT_VLAN_IG_PORT: u32 = 1;
    pub const HDR_INGRESS_PORT_VLAN_VLAN_IS_VALID: u32 = 2;
    pub const HDR_INGRESS_PORT_VLAN_VLAN_ID: u32 = 3;
    pub const HDR_INGRESS_PORT_VLAN_INNER_VLAN_ID: u32 = 4;
    pub const ACTION_PERMIT: u32 = 16886764;
    pub const ACTION_PERMIT_WITH_INTERNAL_VLAN: u32 = 16794911;
    pub const PARAM_PERMIT_WITH_INTERNAL_VLAN_VLAN_ID: u32 = 1;

    // FabricIngress.filtering.fwd_classifier
    pub const TBL_FWD_CLASSIFIER: u32 = 33596298;
    pub const HDR_FWD_CLASSIFIER_IG_PORT: u32 = 1;
    pub const HDR_FWD_CLASSIFIER_ETH_DST: u32 = 2;
    pub const HDR_FWD_CLASSIFIER_ETH_TYPE: u32 = 3;
    pub const HDR_FWD_CLASSIFIER_IP_ETH_TYPE: u32 = 4;
    pub const ACTION_SET_FORWARDING_TYPE: u32 = 16840921;
    pub const PARAM_SET_FORWARDING_TYPE_FWD_TYPE: u32 = 1;

    // FabricIngress.forwarding.routing_v4
    pub const TBL_ROUTING_V4: u32 = 33562650;
    pub const HDR_ROUTING_V4_IPV4_DST: u32 = 1;
    pub const ACTION_SET_NEXT_ID_ROUTING_V4: u32 = 16777434;
    pub const PARAM_SET_NEXT_ID_ROUTING_V4_NEXT_ID: u32 = 1;

    // FabricIngress.next.hashed
    pub const TBL_NEXT_HASHED: u32 = 33608588;
    pub const HDR_NEXT_HASHED_NEXT_ID: u32 = 1;
    pub const ACTION_ROUTING_HASHED: u32 = 16815357;
    pub const PARAM_ROUTING_HASHED_PORT_NUM: u32 = 1;
    pub const PARAM_ROUTING_HASHED_DMAC: u32 = 2;
    pub const PARAM_ROUTING_HASHED_SMAC: u32 = 3;
    pub const ACTPROF_HASHED_SELECTOR: u32 = 291115404;

    // FabricIngress.next.next_vlan
    pub const TBL_NEXT_VLAN: u32 = 33599709;
    pub const HDR_NEXT_VLAN_NEXT_ID: u32 = 1;
    pub const ACTION_SET_VLAN: u32 = 16790685;
    pub const PARAM_SET_VLAN_VLAN_ID: u32 = 1;
    pub const ACTION_SET_DOUBLE_VLAN: u32 = 16803337;
    pub const PARAM_SET_DOUBLE_VLAN_OUTER_VLAN_ID: u32 = 1;
    pub const PARAM_SET_DOUBLE_VLAN_INNER_VLAN_ID: u32 = 2;

    // FabricEgress.egress_next.egress_vlan
    pub const TBL_EGRESS_VLAN: u32 = 33599342;
    pub const HDR_EGRESS_VLAN_VLAN_ID: u32 = 1;
    pub const HDR_EGRESS_VLAN_EG_PORT: u32 = 2;
    pub const ACTION_POP_VLAN: u32 = 16790030;

    // FabricIngress.acl.acl
    pub const TBL_ACL: u32 = 33618978;
    pub const HDR_ACL_IG_PORT: u32 = 1;
    pub const HDR_ACL_IP_PROTO: u32 = 2;
    pub const HDR_ACL_L4_SPORT: u32 = 3;
    pub const HDR_ACL_L4_DPORT: u32 = 4;
    pub const HDR_ACL_ETH_DST: u32 = 5;
    pub const HDR_ACL_ETH_SRC: u32 = 6;
    pub const HDR_ACL_ETH_TYPE: u32 = 8;
    pub const HDR_ACL_IPV4_SRC: u32 = 9;
    pub const HDR_ACL_IPV4_DST: u32 = 10;
    pub const ACTION_ACL_PUNT_TO_CPU: u32 = 16829684;
    pub const ACTION_ACL_DROP: u32 = 16820765;

    // FabricIngress.bng_ingress.t_line_map
    pub const TBL_LINE_MAP: u32 = 33594775;
    pub const HDR_LINE_MAP_S_TAG: u32 = 1;
    pub const HDR_LINE_MAP_C_TAG: u32 = 2;
    pub const ACTION_SET_LINE: u32 = 16829385;
    pub const PARAM_SET_LINE_LINE_ID: u32 = 1;

    // FabricIngress.bng_ingress.upstream.t_pppoe_cp
    pub const TBL_PPPOE_CP: u32 = 33603300;
    pub const HDR_PPPOE_CP_PPPOE_CODE: u32 = 1;
    pub const HDR_PPPOE_CP_PPPOE_PROTOCOL: u32 = 2;
    pub const ACTION_UPSTREAM_PUNT_TO_CPU: u32 = 16830893;

    // FabricIngress.bng_ingress.upstream.t_pppoe_term_v4
    pub const TBL_PPPOE_TERM_V4: u32 = 33595047;
    pub const HDR_PPPOE_TERM_V4_LINE_ID: u32 = 1;
    pub const HDR_PPPOE_TERM_V4_IPV4_SRC: u32 = 2;
    pub const HDR_PPPOE_TERM_V4_PPPOE_SESSION_ID: u32 = 3;
    pub const ACTION_TERM_ENABLED_V4: u32 = 16856023;

    // FabricEgress.bng_egress.downstream.t_session_encap
    pub const TBL_LINE_SESSION_MAP: u32 = 33601734;
    pub const HDR_LINE_SESSION_MAP_LINE_ID: u32 = 1;
    pub const ACTION_SET_SESSION: u32 = 16794505;
    pub const PARAM_SET_SESSION_PPPOE_SESSION_ID: u32 = 1;
}

//! Nokia SR OS state catalogs.

use super::{Catalog, SchemaDescriptor};

/// SR OS state root namespace
pub const SROS_STATE_NS: &str = "urn:nokia.com:sros:ns:yang:sr:state";

/// Composite `router` query: every child except `route-table` and `bgp`.
const ROUTER_ELEMENT: &str = concat!(
    "\n",
    "  <router>\n",
    "    <router-name/>\n",
    "    <vrtr-id/>\n",
    "    <oper-router-id/>\n",
    "    <gtp/>\n",
    "    <aggregates/>\n",
    "    <wlan-gw-tunnel/>\n",
    "    <sfm-overload/>\n",
    "    <interface/>\n",
    "    <ipv4/>\n",
    "    <ipv6/>\n",
    "    <tunnel-interface/>\n",
    "    <pcp/>\n",
    "    <tunnel-table/>\n",
    "    <network-domains/>\n",
    "    <dhcp6/>\n",
    "    <bier/>\n",
    "    <dhcp-server/>\n",
    "    <igmp/>\n",
    "    <isis/>\n",
    "    <l2tp/>\n",
    "    <label-fib/>\n",
    "    <ldp/>\n",
    "    <mld/>\n",
    "    <mpls/>\n",
    "    <msdp/>\n",
    "    <nat/>\n",
    "    <origin-validation/>\n",
    "    <ospf/>\n",
    "    <ospf3/>\n",
    "    <p2mp-sr-tree/>\n",
    "    <pcep/>\n",
    "    <pim/>\n",
    "    <radius/>\n",
    "    <rib-api/>\n",
    "    <rip/>\n",
    "    <ripng/>\n",
    "    <route-fib/>\n",
    "    <rsvp/>\n",
    "    <segment-routing/>\n",
    "    <static-routes/>\n",
    "    <tunnel-fib/>\n",
    "    <twamp-light/>\n",
    "    <wpp/>\n",
    "  </router>\n",
);

/// Subtrees the device cannot return within the command timeout.
///
/// Never queried; listed so the gap in the `router` entry is visible to
/// callers and reports.
pub static SROS_EXCLUDED: [SchemaDescriptor; 2] = [
    SchemaDescriptor::new(
        "\n  <router>\n    <route-table/>\n  </router>\n",
        "urn:nokia.com:sros:ns:yang:sr:state:router:route-table",
    ),
    SchemaDescriptor::new(
        "\n  <router>\n    <bgp/>\n  </router>\n",
        "urn:nokia.com:sros:ns:yang:sr:state:router:bgp",
    ),
];

/// State schema revision 2019-12-03, SR OS releases 2x.
pub static SROS_STATE_2019_12_03: [SchemaDescriptor; 43] = [
    SchemaDescriptor::new("<aaa />", "urn:nokia.com:sros:ns:yang:sr:state:aaa"),
    SchemaDescriptor::new(
        "<application-assurance />",
        "urn:nokia.com:sros:ns:yang:sr:state:application-assurance",
    ),
    SchemaDescriptor::new("<aps />", "urn:nokia.com:sros:ns:yang:sr:state:aps"),
    SchemaDescriptor::new("<bfd />", "urn:nokia.com:sros:ns:yang:sr:state:bfd"),
    SchemaDescriptor::new("<call-trace />", "urn:nokia.com:sros:ns:yang:sr:state:call-trace"),
    SchemaDescriptor::new("<card />", "urn:nokia.com:sros:ns:yang:sr:state:card"),
    SchemaDescriptor::new("<cflowd />", "urn:nokia.com:sros:ns:yang:sr:state:cflowd"),
    SchemaDescriptor::new("<chassis />", "urn:nokia.com:sros:ns:yang:sr:state:chassis"),
    SchemaDescriptor::new("<cpm />", "urn:nokia.com:sros:ns:yang:sr:state:cpm"),
    SchemaDescriptor::new("<esa />", "urn:nokia.com:sros:ns:yang:sr:state:esa"),
    SchemaDescriptor::new("<eth-cfm />", "urn:nokia.com:sros:ns:yang:sr:state:eth-cfm"),
    SchemaDescriptor::new("<eth-ring />", "urn:nokia.com:sros:ns:yang:sr:state:eth-ring"),
    SchemaDescriptor::new("<filter />", "urn:nokia.com:sros:ns:yang:sr:state:filter"),
    SchemaDescriptor::new("<fwd-path-ext />", "urn:nokia.com:sros:ns:yang:sr:state:fwd-path-ext"),
    SchemaDescriptor::new(
        "<group-encryption />",
        "urn:nokia.com:sros:ns:yang:sr:state:group-encryption",
    ),
    SchemaDescriptor::new("<ipsec />", "urn:nokia.com:sros:ns:yang:sr:state:ipsec"),
    SchemaDescriptor::new("<isa />", "urn:nokia.com:sros:ns:yang:sr:state:isa"),
    SchemaDescriptor::new("<lag />", "urn:nokia.com:sros:ns:yang:sr:state:lag"),
    SchemaDescriptor::new("<log />", "urn:nokia.com:sros:ns:yang:sr:state:log"),
    SchemaDescriptor::new("<macsec />", "urn:nokia.com:sros:ns:yang:sr:state:macsec"),
    SchemaDescriptor::new("<mcac />", "urn:nokia.com:sros:ns:yang:sr:state:mcac"),
    SchemaDescriptor::new("<mirror />", "urn:nokia.com:sros:ns:yang:sr:state:mirror"),
    SchemaDescriptor::new(
        "<multicast-management />",
        "urn:nokia.com:sros:ns:yang:sr:state:multicast-management",
    ),
    SchemaDescriptor::new(
        "<multilink-bundle />",
        "urn:nokia.com:sros:ns:yang:sr:state:multilink-bundle",
    ),
    SchemaDescriptor::new("<mvpn-extranet />", "urn:nokia.com:sros:ns:yang:sr:state:mvpn-extranet"),
    SchemaDescriptor::new("<oam-pm />", "urn:nokia.com:sros:ns:yang:sr:state:oam-pm"),
    SchemaDescriptor::new("<openflow />", "urn:nokia.com:sros:ns:yang:sr:state:openflow"),
    SchemaDescriptor::new(
        "<policy-options />",
        "urn:nokia.com:sros:ns:yang:sr:state:policy-options",
    ),
    SchemaDescriptor::new("<port />", "urn:nokia.com:sros:ns:yang:sr:state:port"),
    SchemaDescriptor::new("<port-xc />", "urn:nokia.com:sros:ns:yang:sr:state:port-xc"),
    SchemaDescriptor::new("<pw-port />", "urn:nokia.com:sros:ns:yang:sr:state:pw-port"),
    SchemaDescriptor::new("<python />", "urn:nokia.com:sros:ns:yang:sr:state:python"),
    SchemaDescriptor::new("<qos />", "urn:nokia.com:sros:ns:yang:sr:state:qos"),
    SchemaDescriptor::new("<redundancy />", "urn:nokia.com:sros:ns:yang:sr:state:redundancy"),
    SchemaDescriptor::new(ROUTER_ELEMENT, "urn:nokia.com:sros:ns:yang:sr:state:router"),
    SchemaDescriptor::new("<satellite />", "urn:nokia.com:sros:ns:yang:sr:state:satellite"),
    SchemaDescriptor::new("<service />", "urn:nokia.com:sros:ns:yang:sr:state:service"),
    SchemaDescriptor::new("<sfm />", "urn:nokia.com:sros:ns:yang:sr:state:sfm"),
    SchemaDescriptor::new(
        "<subscriber-mgmt />",
        "urn:nokia.com:sros:ns:yang:sr:state:subscriber-mgmt",
    ),
    SchemaDescriptor::new("<system />", "urn:nokia.com:sros:ns:yang:sr:state:system"),
    SchemaDescriptor::new("<test-oam />", "urn:nokia.com:sros:ns:yang:sr:state:test-oam"),
    SchemaDescriptor::new("<users />", "urn:nokia.com:sros:ns:yang:sr:state:users"),
    SchemaDescriptor::new("<vrrp />", "urn:nokia.com:sros:ns:yang:sr:state:vrrp"),
];

/// Catalog for SR OS 2x (releases 21 and 22)
pub static SROS_2X: Catalog = Catalog::new("sros-2x", SROS_STATE_NS, &SROS_STATE_2019_12_03)
    .with_excluded(&SROS_EXCLUDED);

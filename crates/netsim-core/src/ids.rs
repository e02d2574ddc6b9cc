/// Opaque handles into the tables owned by `Scenario`. NICs, Links, Hosts and
/// Routers never hold references to each other directly (spec.md §9,
/// "Back-references without cycles"); every cross-component lookup goes
/// through `Scenario` via one of these indices.
macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

id_type!(NicId);
id_type!(LinkId);
id_type!(HostId);
id_type!(RouterId);

/// Whichever kind of node a NIC is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Host(HostId),
    Router(RouterId),
}

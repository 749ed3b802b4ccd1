//! Monitoring lists group components that a team watches for advisories.

use chrono::{DateTime, Utc};
use vilocify_jsonapi::{Attribute, ModelType, ToMany};

use crate::inventory::Component;
use crate::membership::Subscription;

jsonapi_model! {
    /// A named set of components, nestable through parent/child lists.
    MonitoringList => MONITORING_LIST
}

impl MonitoringList {
    pub const NAME: Attribute<String> = Attribute::writable("name");
    pub const COMMENT: Attribute<Option<String>> = Attribute::writable("comment");
    pub const ACTIVE: Attribute<bool> = Attribute::writable("active");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("updatedAt");

    pub const COMPONENTS: ToMany<Component> = ToMany::new("components");
    pub const SUBSCRIPTIONS: ToMany<Subscription> = ToMany::new("subscriptions");
    pub const PARENTS: ToMany<MonitoringList> = ToMany::named("parents", "parents");
    pub const CHILDREN: ToMany<MonitoringList> = ToMany::named("children", "children");
}

static MONITORING_LIST: ModelType = ModelType {
    name: "MonitoringList",
    type_name: None,
    attributes: &[
        MonitoringList::NAME.spec(),
        MonitoringList::COMMENT.spec(),
        MonitoringList::ACTIVE.spec(),
        MonitoringList::CREATED_AT.spec(),
        MonitoringList::UPDATED_AT.spec(),
    ],
    relationships: &[
        MonitoringList::COMPONENTS.spec(),
        MonitoringList::SUBSCRIPTIONS.spec(),
        MonitoringList::PARENTS.spec(),
        MonitoringList::CHILDREN.spec(),
    ],
};

//! Monitored components and requests for new ones.

use chrono::{DateTime, NaiveDate, Utc};
use vilocify_jsonapi::{Attribute, ModelType, ToMany, ToOne};

use crate::advisory::Notification;
use crate::membership::Membership;
use crate::monitoring::MonitoringList;

jsonapi_model! {
    /// A vendor product in a specific version.
    Component => COMPONENT
}

impl Component {
    pub const VENDOR: Attribute<Option<String>> = Attribute::writable("vendor");
    pub const NAME: Attribute<Option<String>> = Attribute::writable("name");
    pub const VERSION: Attribute<Option<String>> = Attribute::writable("version");
    pub const URL: Attribute<Option<String>> = Attribute::writable("url");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::writable("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::writable("updatedAt");
    pub const EOL_ON: Attribute<Option<NaiveDate>> = Attribute::writable("endOfLifeOn");
    pub const IS_EOL: Attribute<bool> = Attribute::writable("endOfLife");
    pub const ACTIVE: Attribute<bool> = Attribute::writable("active");
    pub const DEACTIVATED_AT: Attribute<Option<DateTime<Utc>>> = Attribute::writable("deactivatedAt");
    pub const DEACTIVATION_REASON: Attribute<Option<String>> =
        Attribute::writable("deactivationReason");

    pub const MONITORING_LISTS: ToMany<MonitoringList> = ToMany::new("monitoring_lists");
    pub const NOTIFICATIONS: ToMany<Notification> = ToMany::new("notifications");
}

static COMPONENT: ModelType = ModelType {
    name: "Component",
    type_name: None,
    attributes: &[
        Component::VENDOR.spec(),
        Component::NAME.spec(),
        Component::VERSION.spec(),
        Component::URL.spec(),
        Component::CREATED_AT.spec(),
        Component::UPDATED_AT.spec(),
        Component::EOL_ON.spec(),
        Component::IS_EOL.spec(),
        Component::ACTIVE.spec(),
        Component::DEACTIVATED_AT.spec(),
        Component::DEACTIVATION_REASON.spec(),
    ],
    relationships: &[
        Component::MONITORING_LISTS.spec(),
        Component::NOTIFICATIONS.spec(),
    ],
};

jsonapi_model! {
    /// A request to add a component to the Vilocify catalogue.
    ComponentRequest => COMPONENT_REQUEST
}

impl ComponentRequest {
    pub const VENDOR: Attribute<Option<String>> = Attribute::writable("vendor");
    pub const NAME: Attribute<String> = Attribute::writable("name");
    pub const VERSION: Attribute<String> = Attribute::writable("version");
    pub const COMMENT: Attribute<Option<String>> = Attribute::writable("comment");
    pub const PRIORITIZED: Attribute<bool> = Attribute::writable("prioritized");
    pub const SECURITY_URL: Attribute<Option<String>> = Attribute::writable("securityUrl");
    pub const COMPONENT_URL: Attribute<Option<String>> = Attribute::writable("componentUrl");
    pub const STATE: Attribute<String> = Attribute::read_only("state");
    pub const REJECTION_REASONS: Attribute<Option<Vec<String>>> =
        Attribute::read_only("rejectionReasons");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("updatedAt");

    pub const COMPONENT: ToOne<Component> = ToOne::new("component");
    pub const MEMBERSHIP: ToOne<Membership> = ToOne::new("membership");
}

static COMPONENT_REQUEST: ModelType = ModelType {
    name: "ComponentRequest",
    type_name: None,
    attributes: &[
        ComponentRequest::VENDOR.spec(),
        ComponentRequest::NAME.spec(),
        ComponentRequest::VERSION.spec(),
        ComponentRequest::COMMENT.spec(),
        ComponentRequest::PRIORITIZED.spec(),
        ComponentRequest::SECURITY_URL.spec(),
        ComponentRequest::COMPONENT_URL.spec(),
        ComponentRequest::STATE.spec(),
        ComponentRequest::REJECTION_REASONS.spec(),
        ComponentRequest::CREATED_AT.spec(),
        ComponentRequest::UPDATED_AT.spec(),
    ],
    relationships: &[
        ComponentRequest::COMPONENT.spec(),
        ComponentRequest::MEMBERSHIP.spec(),
    ],
};

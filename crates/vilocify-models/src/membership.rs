//! Organisation members and their monitoring list subscriptions.

use chrono::{DateTime, Utc};
use vilocify_jsonapi::{Attribute, ModelType, ToOne};

use crate::monitoring::MonitoringList;

jsonapi_model! {
    /// A user's membership in an organisation.
    ///
    /// Identity fields are fixed once the membership is created.
    Membership => MEMBERSHIP
}

impl Membership {
    pub const USERNAME: Attribute<String> = Attribute::write_once("userName");
    pub const EMAIL: Attribute<String> = Attribute::write_once("userEmail");
    pub const ROLE: Attribute<String> = Attribute::write_once("role");
    pub const EXPIRES_AT: Attribute<Option<DateTime<Utc>>> = Attribute::writable("expiresAt");
    pub const INVITATION_STATE: Attribute<String> = Attribute::read_only("invitationState");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("updatedAt");
}

static MEMBERSHIP: ModelType = ModelType {
    name: "Membership",
    type_name: None,
    attributes: &[
        Membership::USERNAME.spec(),
        Membership::EMAIL.spec(),
        Membership::ROLE.spec(),
        Membership::EXPIRES_AT.spec(),
        Membership::INVITATION_STATE.spec(),
        Membership::CREATED_AT.spec(),
        Membership::UPDATED_AT.spec(),
    ],
    relationships: &[],
};

jsonapi_model! {
    /// Notification delivery for one member on one monitoring list.
    Subscription => SUBSCRIPTION
}

impl Subscription {
    pub const ROLE: Attribute<String> = Attribute::writable("role");
    pub const PRIORITIES: Attribute<Vec<String>> = Attribute::writable("priorities");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::read_only("updatedAt");

    pub const MEMBERSHIP: ToOne<Membership> = ToOne::new("membership");
    pub const MONITORING_LIST: ToOne<MonitoringList> = ToOne::new("monitoring_list");
}

static SUBSCRIPTION: ModelType = ModelType {
    name: "Subscription",
    type_name: None,
    attributes: &[
        Subscription::ROLE.spec(),
        Subscription::PRIORITIES.spec(),
        Subscription::CREATED_AT.spec(),
        Subscription::UPDATED_AT.spec(),
    ],
    relationships: &[
        Subscription::MEMBERSHIP.spec(),
        Subscription::MONITORING_LIST.spec(),
    ],
};

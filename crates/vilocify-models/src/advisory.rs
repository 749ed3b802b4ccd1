//! Security notifications and the vulnerabilities they describe.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use vilocify_jsonapi::{Attribute, ModelType, ToMany};

use crate::inventory::Component;

jsonapi_model! {
    /// A single vulnerability, usually identified by a CVE.
    Vulnerability => VULNERABILITY
}

impl Vulnerability {
    pub const CVE: Attribute<Option<String>> = Attribute::writable("cve");
    pub const CWE: Attribute<Option<String>> = Attribute::writable("cwe");
    pub const DESCRIPTION: Attribute<String> = Attribute::writable("description");
    pub const CVSS: Attribute<Vec<Value>> = Attribute::writable("cvss");
    pub const MITIGATING_FACTOR: Attribute<Option<String>> = Attribute::writable("mitigatingFactor");
    pub const NOTE: Attribute<Option<String>> = Attribute::writable("note");
    pub const DELETED: Attribute<bool> = Attribute::writable("deleted");
}

static VULNERABILITY: ModelType = ModelType {
    name: "Vulnerability",
    type_name: Some("vulnerabilities"),
    attributes: &[
        Vulnerability::CVE.spec(),
        Vulnerability::CWE.spec(),
        Vulnerability::DESCRIPTION.spec(),
        Vulnerability::CVSS.spec(),
        Vulnerability::MITIGATING_FACTOR.spec(),
        Vulnerability::NOTE.spec(),
        Vulnerability::DELETED.spec(),
    ],
    relationships: &[],
};

jsonapi_model! {
    /// An advisory published to subscribers of affected components.
    Notification => NOTIFICATION
}

impl Notification {
    pub const TITLE: Attribute<String> = Attribute::writable("title");
    pub const PRIORITY: Attribute<String> = Attribute::writable("priority");
    pub const ACTION: Attribute<String> = Attribute::writable("action");
    pub const SOLUTION: Attribute<String> = Attribute::writable("solution");
    pub const DESCRIPTION: Attribute<String> = Attribute::writable("description");
    pub const VENDOR_AFFECTED_COMPONENTS: Attribute<String> =
        Attribute::writable("vendorAffectedComponents");
    pub const REFERENCES: Attribute<Vec<String>> = Attribute::writable("references");
    pub const ADVISORIES: Attribute<Vec<BTreeMap<String, String>>> = Attribute::writable("advisories");
    pub const CVES: Attribute<Vec<String>> = Attribute::writable("cves");
    pub const ATTACK_VECTOR: Attribute<Option<String>> = Attribute::writable("attackVector");
    pub const CVSS: Attribute<Option<String>> = Attribute::writable("cvss");
    pub const HISTORY: Attribute<Vec<Value>> = Attribute::writable("history");
    pub const KIND: Attribute<String> = Attribute::writable("type");
    pub const THIRD_PARTY_PUBLISHED_ON: Attribute<String> = Attribute::writable("thirdPartyPublishedOn");
    pub const CREATED_AT: Attribute<DateTime<Utc>> = Attribute::writable("createdAt");
    pub const UPDATED_AT: Attribute<DateTime<Utc>> = Attribute::writable("updatedAt");

    pub const VULNERABILITIES: ToMany<Vulnerability> = ToMany::new("vulnerabilities");
    pub const COMPONENTS: ToMany<Component> = ToMany::new("components");
}

static NOTIFICATION: ModelType = ModelType {
    name: "Notification",
    type_name: None,
    attributes: &[
        Notification::TITLE.spec(),
        Notification::PRIORITY.spec(),
        Notification::ACTION.spec(),
        Notification::SOLUTION.spec(),
        Notification::DESCRIPTION.spec(),
        Notification::VENDOR_AFFECTED_COMPONENTS.spec(),
        Notification::REFERENCES.spec(),
        Notification::ADVISORIES.spec(),
        Notification::CVES.spec(),
        Notification::ATTACK_VECTOR.spec(),
        Notification::CVSS.spec(),
        Notification::HISTORY.spec(),
        Notification::KIND.spec(),
        Notification::THIRD_PARTY_PUBLISHED_ON.spec(),
        Notification::CREATED_AT.spec(),
        Notification::UPDATED_AT.spec(),
    ],
    relationships: &[
        Notification::VULNERABILITIES.spec(),
        Notification::COMPONENTS.spec(),
    ],
};

//! Built-in form schemas.
//!
//! Field names are the wire names the backend expects, so they appear
//! unchanged in submitted payloads (`tenantProperties.0.totalRooms`).

use leasedesk_core::{
    derive::Derivation,
    pattern::Pattern,
    schema::{FieldSpec, FormSchema, GroupSpec, RecordSchema, SchemaError},
};

pub const OWNER_DETAILS: &str = "ownerDetails";
pub const TENANT_INTAKE: &str = "tenantIntake";

pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
pub const PROPERTY_TYPES: [&str; 4] = ["Apartment", "House", "Condo", "Townhouse"];
pub const RELATIONSHIPS: [&str; 4] = ["Friend", "Family", "Colleague", "Other"];

/// Properties offered on the tenant screen until the backend supplies a list.
pub const SAMPLE_PROPERTIES: [&str; 3] = [
    "Sunrise Apartments",
    "Green Valley Residency",
    "Lakeview Towers",
];

///
/// owner_details
///
/// Owner profile plus one row per tenant property. The property rows follow
/// `numTenantProperties`, and each row's `emptyRooms` is kept at
/// `totalRooms - filledRooms`.
///
pub fn owner_details() -> Result<FormSchema, SchemaError> {
    let property = RecordSchema::new()
        .with_field(FieldSpec::choice("propertyType", "Property Type", PROPERTY_TYPES).required())
        .with_field(FieldSpec::text("address", "Address").required())
        .with_field(
            FieldSpec::digits("totalRooms", "Total Rooms")
                .required()
                .pattern(Pattern::Integer),
        )
        .with_field(
            FieldSpec::digits("filledRooms", "Occupied Rooms")
                .required()
                .pattern(Pattern::Integer)
                .at_most("totalRooms", "occupied cannot exceed total"),
        )
        .with_field(FieldSpec::derived(
            "emptyRooms",
            "Empty Rooms",
            Derivation::remaining("totalRooms", "filledRooms"),
        ));

    let root = RecordSchema::new()
        .with_field(FieldSpec::text("firstName", "First Name").required())
        .with_field(FieldSpec::text("lastName", "Last Name").required())
        .with_field(FieldSpec::text("personalAddress", "Personal Address").required())
        .with_field(
            FieldSpec::text("contactNumber", "Contact Number")
                .required()
                .pattern(Pattern::PhoneNumber)
                .live(),
        )
        .with_field(
            FieldSpec::text("email", "Email")
                .required()
                .pattern(Pattern::Email)
                .live(),
        )
        .with_field(FieldSpec::choice("gender", "Gender", GENDERS).required())
        .with_field(
            FieldSpec::count("numTenantProperties", "Number of Tenant Properties")
                .required()
                .pattern(Pattern::Integer)
                .min(1, "Minimum 1 tenant property is required")
                .default_value("1")
                .live(),
        )
        .with_group(GroupSpec::count_driven(
            "tenantProperties",
            "Tenant Properties",
            "numTenantProperties",
            property,
        ));

    FormSchema::new(OWNER_DETAILS, root)
}

///
/// tenant_intake
///
/// Tenant details per room of one property. Rooms and contacts are added
/// by the user; roommates follow each room's `numRoommates`.
///
pub fn tenant_intake<I, S>(properties: I) -> Result<FormSchema, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let roommate = RecordSchema::new()
        .with_field(FieldSpec::text("name", "Name"))
        .with_field(FieldSpec::choice("relationship", "Relationship", RELATIONSHIPS));

    let contact = RecordSchema::new().with_field(
        FieldSpec::text("number", "Contact Number")
            .required()
            .pattern(Pattern::PhoneNumber),
    );

    let room = RecordSchema::new()
        .with_field(FieldSpec::text("tenantName", "Tenant Name").required())
        .with_field(
            FieldSpec::count("numRoommates", "Number of Roommates")
                .required()
                .pattern(Pattern::Integer),
        )
        .with_group(GroupSpec::count_driven(
            "roommates",
            "Roommates",
            "numRoommates",
            roommate,
        ))
        .with_field(FieldSpec::date("startDate", "Start Date").required())
        .with_field(
            FieldSpec::date("endDate", "End Date")
                .at_least("startDate", "End date cannot precede start date"),
        )
        .with_field(FieldSpec::flag("verified", "Verified"))
        .with_group(GroupSpec::action_driven("contacts", "Contacts", 1, contact))
        .with_field(FieldSpec::attachment("photo", "Photo"));

    let root = RecordSchema::new()
        .with_field(FieldSpec::choice("property", "Property", properties).required())
        .with_group(GroupSpec::action_driven("rooms", "Rooms", 1, room));

    FormSchema::new(TENANT_INTAKE, root)
}

///
/// TESTS
///

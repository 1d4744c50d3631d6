// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed exchange records
//!
//! A record is one `#id=TYPE(field,field,...);` line. The type table is
//! closed: lines naming a type outside it are a fatal error, never silently
//! skipped. Each type carries its field-name table so consumers walk the
//! graph by name instead of by raw index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe record identifier
///
/// Wraps the raw record number (e.g. `#123` becomes `RecordId(123)`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct RecordId(pub u32);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        RecordId(id)
    }
}

/// Closed table of registered record types
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum RecordType {
    // Spatial structure
    Project,
    Site,
    Building,
    BuildingStorey,
    Space,

    // Elements
    BuildingElementProxy,
    Wall,
    FlowSegment,
    FlowTerminal,

    // Properties
    PropertySet,
    PropertySingleValue,

    // Relationships
    RelDefinesByProperties,
    RelContainedInSpatialStructure,
    RelAggregates,

    // Ownership and provenance
    OwnerHistory,
    Person,
    Organization,
    PersonAndOrganization,
    Application,

    // Placement and context
    CartesianPoint,
    Direction,
    Axis2Placement3D,
    LocalPlacement,
    SiUnit,
    UnitAssignment,
    GeometricRepresentationContext,
}

impl RecordType {
    /// Parse a type name into a registered record type
    ///
    /// Returns None for names outside the closed table.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "IFCPROJECT" => Some(RecordType::Project),
            "IFCSITE" => Some(RecordType::Site),
            "IFCBUILDING" => Some(RecordType::Building),
            "IFCBUILDINGSTOREY" => Some(RecordType::BuildingStorey),
            "IFCSPACE" => Some(RecordType::Space),
            "IFCBUILDINGELEMENTPROXY" => Some(RecordType::BuildingElementProxy),
            "IFCWALL" => Some(RecordType::Wall),
            "IFCFLOWSEGMENT" => Some(RecordType::FlowSegment),
            "IFCFLOWTERMINAL" => Some(RecordType::FlowTerminal),
            "IFCPROPERTYSET" => Some(RecordType::PropertySet),
            "IFCPROPERTYSINGLEVALUE" => Some(RecordType::PropertySingleValue),
            "IFCRELDEFINESBYPROPERTIES" => Some(RecordType::RelDefinesByProperties),
            "IFCRELCONTAINEDINSPATIALSTRUCTURE" => {
                Some(RecordType::RelContainedInSpatialStructure)
            }
            "IFCRELAGGREGATES" => Some(RecordType::RelAggregates),
            "IFCOWNERHISTORY" => Some(RecordType::OwnerHistory),
            "IFCPERSON" => Some(RecordType::Person),
            "IFCORGANIZATION" => Some(RecordType::Organization),
            "IFCPERSONANDORGANIZATION" => Some(RecordType::PersonAndOrganization),
            "IFCAPPLICATION" => Some(RecordType::Application),
            "IFCCARTESIANPOINT" => Some(RecordType::CartesianPoint),
            "IFCDIRECTION" => Some(RecordType::Direction),
            "IFCAXIS2PLACEMENT3D" => Some(RecordType::Axis2Placement3D),
            "IFCLOCALPLACEMENT" => Some(RecordType::LocalPlacement),
            "IFCSIUNIT" => Some(RecordType::SiUnit),
            "IFCUNITASSIGNMENT" => Some(RecordType::UnitAssignment),
            "IFCGEOMETRICREPRESENTATIONCONTEXT" => {
                Some(RecordType::GeometricRepresentationContext)
            }
            _ => None,
        }
    }

    /// Get the type name as it appears in exchange text
    pub fn name(&self) -> &'static str {
        match self {
            RecordType::Project => "IFCPROJECT",
            RecordType::Site => "IFCSITE",
            RecordType::Building => "IFCBUILDING",
            RecordType::BuildingStorey => "IFCBUILDINGSTOREY",
            RecordType::Space => "IFCSPACE",
            RecordType::BuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
            RecordType::Wall => "IFCWALL",
            RecordType::FlowSegment => "IFCFLOWSEGMENT",
            RecordType::FlowTerminal => "IFCFLOWTERMINAL",
            RecordType::PropertySet => "IFCPROPERTYSET",
            RecordType::PropertySingleValue => "IFCPROPERTYSINGLEVALUE",
            RecordType::RelDefinesByProperties => "IFCRELDEFINESBYPROPERTIES",
            RecordType::RelContainedInSpatialStructure => "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            RecordType::RelAggregates => "IFCRELAGGREGATES",
            RecordType::OwnerHistory => "IFCOWNERHISTORY",
            RecordType::Person => "IFCPERSON",
            RecordType::Organization => "IFCORGANIZATION",
            RecordType::PersonAndOrganization => "IFCPERSONANDORGANIZATION",
            RecordType::Application => "IFCAPPLICATION",
            RecordType::CartesianPoint => "IFCCARTESIANPOINT",
            RecordType::Direction => "IFCDIRECTION",
            RecordType::Axis2Placement3D => "IFCAXIS2PLACEMENT3D",
            RecordType::LocalPlacement => "IFCLOCALPLACEMENT",
            RecordType::SiUnit => "IFCSIUNIT",
            RecordType::UnitAssignment => "IFCUNITASSIGNMENT",
            RecordType::GeometricRepresentationContext => "IFCGEOMETRICREPRESENTATIONCONTEXT",
        }
    }

    /// Declared field names in schema order
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            RecordType::Project => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "LongName",
                "Phase",
                "RepresentationContexts",
                "UnitsInContext",
            ],
            RecordType::Site => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "LongName",
                "CompositionType",
                "RefLatitude",
                "RefLongitude",
                "RefElevation",
                "LandTitleNumber",
                "SiteAddress",
            ],
            RecordType::Building => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "LongName",
                "CompositionType",
                "ElevationOfRefHeight",
                "ElevationOfTerrain",
                "BuildingAddress",
            ],
            RecordType::BuildingStorey => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "LongName",
                "CompositionType",
                "Elevation",
            ],
            RecordType::Space => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "LongName",
                "CompositionType",
                "InteriorOrExteriorSpace",
                "ElevationWithFlooring",
            ],
            RecordType::BuildingElementProxy => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "Tag",
                "CompositionType",
            ],
            RecordType::Wall | RecordType::FlowSegment | RecordType::FlowTerminal => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "ObjectType",
                "ObjectPlacement",
                "Representation",
                "Tag",
            ],
            RecordType::PropertySet => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "HasProperties",
            ],
            RecordType::PropertySingleValue => &["Name", "Description", "NominalValue", "Unit"],
            RecordType::RelDefinesByProperties => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "RelatedObjects",
                "RelatingPropertyDefinition",
            ],
            RecordType::RelContainedInSpatialStructure => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "RelatedElements",
                "RelatingStructure",
            ],
            RecordType::RelAggregates => &[
                "GlobalId",
                "OwnerHistory",
                "Name",
                "Description",
                "RelatingObject",
                "RelatedObjects",
            ],
            RecordType::OwnerHistory => &[
                "OwningUser",
                "OwningApplication",
                "State",
                "ChangeAction",
                "LastModifiedDate",
                "LastModifyingUser",
                "LastModifyingApplication",
                "CreationDate",
            ],
            RecordType::Person => &[
                "Id",
                "FamilyName",
                "GivenName",
                "MiddleNames",
                "PrefixTitles",
                "SuffixTitles",
                "Roles",
                "Addresses",
            ],
            RecordType::Organization => &["Id", "Name", "Description", "Roles", "Addresses"],
            RecordType::PersonAndOrganization => &["ThePerson", "TheOrganization", "Roles"],
            RecordType::Application => &[
                "ApplicationDeveloper",
                "Version",
                "ApplicationFullName",
                "ApplicationIdentifier",
            ],
            RecordType::CartesianPoint => &["Coordinates"],
            RecordType::Direction => &["DirectionRatios"],
            RecordType::Axis2Placement3D => &["Location", "Axis", "RefDirection"],
            RecordType::LocalPlacement => &["PlacementRelTo", "RelativePlacement"],
            RecordType::SiUnit => &["Dimensions", "UnitType", "Prefix", "Name"],
            RecordType::UnitAssignment => &["Units"],
            RecordType::GeometricRepresentationContext => &[
                "ContextIdentifier",
                "ContextType",
                "CoordinateSpaceDimension",
                "Precision",
                "WorldCoordinateSystem",
                "TrueNorth",
            ],
        }
    }

    /// Index of a named field, if declared
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names().iter().position(|n| *n == name)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One raw record field
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// Undefined value (`$`)
    Null,
    /// Text content, quote delimiters stripped; bare tokens stay verbatim
    Str(String),
    /// Unresolved back-reference to another record (`#id`)
    Ref(RecordId),
    /// Parenthesized group of fields
    Tuple(Vec<Field>),
}

impl Field {
    /// Check if this is the undefined value
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Try to get as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as back-reference
    pub fn as_ref_id(&self) -> Option<RecordId> {
        match self {
            Field::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as tuple
    pub fn as_tuple(&self) -> Option<&[Field]> {
        match self {
            Field::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

/// One parsed exchange record
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeRecord {
    /// Record number
    pub id: RecordId,
    /// Registered record type
    pub record_type: RecordType,
    /// Raw fields in declaration order
    pub fields: Vec<Field>,
}

impl ExchangeRecord {
    /// Field at a declared name, if present
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.record_type
            .field_index(name)
            .and_then(|index| self.fields.get(index))
    }

    /// Field at a raw index
    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }
}

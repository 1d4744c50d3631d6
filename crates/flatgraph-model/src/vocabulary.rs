// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference vocabulary
//!
//! A compact set of asset types used by tests and the exchange pipeline. The
//! full production vocabulary lives outside this crate; these types exercise
//! every attribute shape: scalar, repeated scalar, embedded value object,
//! repeated embedded value object and quantity wrapper.

use crate::descriptor::{
    AttributeDescriptor, AttributeShape, GeometryKind, TypeDescriptor, ValueKind,
};

/// Identifier value object (`assetId`)
pub static IDENTIFICATOR: TypeDescriptor = TypeDescriptor {
    uri: "",
    short_name: "DtcIdentificator",
    attributes: &[
        AttributeDescriptor {
            name: "identificator",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
        AttributeDescriptor {
            name: "toegekendDoor",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
    ],
    wraps_value: None,
    geometry_kinds: &[],
};

/// Length quantity wrapping a single float (`waarde`)
pub static KWANT_WRD_IN_METER: TypeDescriptor = TypeDescriptor {
    uri: "",
    short_name: "KwantWrdInMeter",
    attributes: &[
        AttributeDescriptor {
            name: "waarde",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Float),
        },
        AttributeDescriptor {
            name: "standaardEenheid",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
    ],
    wraps_value: Some("waarde"),
    geometry_kinds: &[],
};

/// Attached document reference
pub static DOCUMENT: TypeDescriptor = TypeDescriptor {
    uri: "",
    short_name: "DtcDocument",
    attributes: &[
        AttributeDescriptor {
            name: "bestandsnaam",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
        AttributeDescriptor {
            name: "uri",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
    ],
    wraps_value: None,
    geometry_kinds: &[],
};

// Shared capability blocks, repeated per type instead of inherited.
const ASSET_ID: AttributeDescriptor = AttributeDescriptor {
    name: "assetId",
    repeatable: false,
    shape: AttributeShape::Complex(&IDENTIFICATOR),
};
const NAAM: AttributeDescriptor = AttributeDescriptor {
    name: "naam",
    repeatable: false,
    shape: AttributeShape::Scalar(ValueKind::Text),
};
const TOESTAND: AttributeDescriptor = AttributeDescriptor {
    name: "toestand",
    repeatable: false,
    shape: AttributeShape::Scalar(ValueKind::Text),
};
const NOTITIE: AttributeDescriptor = AttributeDescriptor {
    name: "notitie",
    repeatable: false,
    shape: AttributeShape::Scalar(ValueKind::Text),
};
const DATUM_OPRICHTING: AttributeDescriptor = AttributeDescriptor {
    name: "datumOprichtingObject",
    repeatable: false,
    shape: AttributeShape::Scalar(ValueKind::Date),
};
const DOCUMENTEN: AttributeDescriptor = AttributeDescriptor {
    name: "documenten",
    repeatable: true,
    shape: AttributeShape::Complex(&DOCUMENT),
};

/// Light pole
pub static LICHTMAST: TypeDescriptor = TypeDescriptor {
    uri: "https://data.assets.example/ns/onderwerp#Lichtmast",
    short_name: "Lichtmast",
    attributes: &[
        ASSET_ID,
        NAAM,
        TOESTAND,
        NOTITIE,
        DATUM_OPRICHTING,
        DOCUMENTEN,
        AttributeDescriptor {
            name: "hoogte",
            repeatable: false,
            shape: AttributeShape::Complex(&KWANT_WRD_IN_METER),
        },
        AttributeDescriptor {
            name: "labels",
            repeatable: true,
            shape: AttributeShape::Scalar(ValueKind::Text),
        },
    ],
    wraps_value: None,
    geometry_kinds: &[GeometryKind::Point],
};

/// Road section
pub static WEGDEEL: TypeDescriptor = TypeDescriptor {
    uri: "https://data.assets.example/ns/onderwerp#Wegdeel",
    short_name: "Wegdeel",
    attributes: &[
        ASSET_ID,
        NAAM,
        TOESTAND,
        NOTITIE,
        DATUM_OPRICHTING,
        DOCUMENTEN,
        AttributeDescriptor {
            name: "breedte",
            repeatable: false,
            shape: AttributeShape::Complex(&KWANT_WRD_IN_METER),
        },
        AttributeDescriptor {
            name: "oppervlakte",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Float),
        },
    ],
    wraps_value: None,
    geometry_kinds: &[GeometryKind::Polygon],
};

/// Cable or pipe run
pub static LEIDING: TypeDescriptor = TypeDescriptor {
    uri: "https://data.assets.example/ns/onderwerp#Leiding",
    short_name: "Leiding",
    attributes: &[
        ASSET_ID,
        NAAM,
        TOESTAND,
        NOTITIE,
        DATUM_OPRICHTING,
        DOCUMENTEN,
        AttributeDescriptor {
            name: "lengte",
            repeatable: false,
            shape: AttributeShape::Complex(&KWANT_WRD_IN_METER),
        },
        AttributeDescriptor {
            name: "aantalKabels",
            repeatable: false,
            shape: AttributeShape::Scalar(ValueKind::Integer),
        },
    ],
    wraps_value: None,
    geometry_kinds: &[GeometryKind::Line],
};

/// All entity types in the reference vocabulary
pub static ALL: [&TypeDescriptor; 3] = [&LICHTMAST, &WEGDEEL, &LEIDING];

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Graph construction benchmark over a synthetic exchange document.

use criterion::{criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use std::hint::black_box;

fn synthetic_document(elements: usize) -> String {
    let mut doc = String::from(
        "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
         #1=IFCPROJECT('p',$,'Areaal',$,$,$,$,$,$);\n",
    );
    let mut id = 1u32;
    for n in 0..elements {
        let element = id + 1;
        let type_prop = id + 2;
        let name_prop = id + 3;
        let pset = id + 4;
        let relation = id + 5;
        id += 5;
        let _ = write!(
            doc,
            "#{element}=IFCBUILDINGELEMENTPROXY('e{n}',$,'LM-{n}',$,$,$,$,$,$);\n\
             #{type_prop}=IFCPROPERTYSINGLEVALUE('typeURI',$,IFCLABEL('https://data.assets.example/ns/onderwerp#Lichtmast'),$);\n\
             #{name_prop}=IFCPROPERTYSINGLEVALUE('naam',$,IFCLABEL('Mast {n}'),$);\n\
             #{pset}=IFCPROPERTYSET('ps{n}',$,'Kenmerken',$,(#{type_prop},#{name_prop}));\n\
             #{relation}=IFCRELDEFINESBYPROPERTIES('r{n}',$,$,$,(#{element}),#{pset});\n",
        );
    }
    doc.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    doc
}

fn bench_graph_build(c: &mut Criterion) {
    let doc = synthetic_document(2000);
    c.bench_function("graph_build_2k_elements", |b| {
        b.iter(|| flatgraph_ifc::parse(black_box(&doc)).unwrap())
    });
}

fn bench_extract(c: &mut Criterion) {
    let doc = synthetic_document(500);
    let registry = flatgraph_model::TypeRegistry::standard();
    let parser = flatgraph_ifc::ExchangeParser::new();
    let graph = parser.parse(&doc).unwrap();
    c.bench_function("extract_500_elements", |b| {
        b.iter(|| parser.extract(black_box(&graph), &registry).unwrap())
    });
}

criterion_group!(benches, bench_graph_build, bench_extract);
criterion_main!(benches);

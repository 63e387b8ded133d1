use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use xmljson::{convert_document, from_xml_str, xml_to_json, ConversionOptions};

const SIMPLE_XML: &str = "<root><name>test</name><value>42</value></root>";
const ATTR_XML: &str = "<root id=\"1\" name='test'><item value=\"42\" /><item value=\"43\" /></root>";

fn catalog_xml(items: usize) -> String {
    let mut xml = String::from("<catalog xmlns:px=\"urn:pricing\">");
    for i in 0..items {
        xml.push_str(&format!(
            "<product sku=\"{i}\"><name>Item {i}</name><px:price currency=\"EUR\">{i}.99</px:price><tag>a</tag><tag>b</tag></product>"
        ));
    }
    xml.push_str("</catalog>");
    xml
}

fn bench_simple(c: &mut Criterion) {
    let options = ConversionOptions::default();
    c.bench_function("xml_to_json_simple", |b| {
        b.iter(|| xml_to_json(black_box(SIMPLE_XML), &options))
    });
}

fn bench_attr(c: &mut Criterion) {
    let options = ConversionOptions::default();
    c.bench_function("xml_to_json_attr", |b| {
        b.iter(|| xml_to_json(black_box(ATTR_XML), &options))
    });
}

fn bench_convert_only(c: &mut Criterion) {
    let options = ConversionOptions::default();
    let xml = catalog_xml(500);
    if let Ok(document) = from_xml_str(&xml) {
        c.bench_function("convert_catalog_500", |b| {
            b.iter(|| convert_document(black_box(&document), &options))
        });
    }
}

criterion_group!(benches, bench_simple, bench_attr, bench_convert_only);
criterion_main!(benches);

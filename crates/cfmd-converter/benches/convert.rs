//! Benchmarks for storage format conversion.

#![allow(clippy::format_push_string)]

use std::hint::black_box;

use cfmd_converter::{ConvertOptions, Converter, Document};
use criterion::{Criterion, criterion_group, criterion_main};

fn generate_page(sections: usize) -> String {
    let mut content = String::new();
    for i in 0..sections {
        content.push_str(&format!("<h2>Section {i}</h2>"));
        content.push_str("<p>Paragraph with <strong>bold</strong>, <em>italic</em> and <code>code</code>.</p>");
        content.push_str(
            r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>First line</p><p>Second line</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        content.push_str(
            "<ac:structured-macro ac:name=\"code\"><ac:parameter ac:name=\"language\">rust</ac:parameter><ac:plain-text-body><![CDATA[fn main() {\n    println!(\"hi\");\n}]]></ac:plain-text-body></ac:structured-macro>",
        );
        content.push_str("<ul><li>one<ul><li>nested</li></ul></li><li>two</li></ul>");
        content.push_str(concat!(
            "<table><tbody>",
            "<tr><th>Name</th><th>Notes</th></tr>",
            "<tr><td>Alpha</td><td><ul><li>a</li><li>b</li></ul></td></tr>",
            "<tr><td>Beta</td><td><p>one</p><p>two</p></td></tr>",
            "</tbody></table>",
        ));
        content.push_str(&format!(
            r#"<p><ac:image><ri:attachment ri:filename="image-{i}.png"/></ac:image></p>"#
        ));
    }
    content
}

fn bench_convert_html(c: &mut Criterion) {
    let converter = Converter::new(ConvertOptions::default());
    let small = generate_page(5);
    let large = generate_page(100);

    c.bench_function("convert_html_small", |b| {
        b.iter(|| converter.convert_html(black_box(&small)));
    });
    c.bench_function("convert_html_large", |b| {
        b.iter(|| converter.convert_html(black_box(&large)));
    });
}

fn bench_convert_document(c: &mut Criterion) {
    let converter = Converter::new(ConvertOptions::default());
    let document = Document {
        id: "1".to_owned(),
        title: "Bench".to_owned(),
        space_key: "BENCH".to_owned(),
        content: generate_page(50),
        ..Document::default()
    };

    c.bench_function("convert_document", |b| {
        b.iter(|| converter.convert_document(black_box(&document), "https://wiki.example.com"));
    });
}

criterion_group!(benches, bench_convert_html, bench_convert_document);
criterion_main!(benches);

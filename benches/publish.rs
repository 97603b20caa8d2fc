use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn sample_blog(paragraphs: usize) -> String {
    let mut text = String::from("# Growing tomatoes at home\n\n");
    for index in 0..paragraphs {
        text.push_str(&format!(
            "Paragraph {index} covers **soil**, watering and sunlight for tomato plants. \
             Good compost keeps the soil healthy.\n\n"
        ));
        if index % 4 == 3 {
            text.push_str("---\n\n## Next steps\n\n");
        }
    }
    text.push_str("For more information visit the garden centre --- or the library.\n");
    text
}

fn bench_render(c: &mut Criterion) {
    for &paragraphs in &[4usize, 32, 256] {
        let text = sample_blog(paragraphs);
        c.bench_with_input(BenchmarkId::new("render", paragraphs), &text, |b, text| {
            b.iter(|| black_box(blogsmith::render(text)));
        });
    }
}

fn bench_publish(c: &mut Criterion) {
    let keywords = ["tomato", "compost", "soil", "sunlight"];
    let urls = [
        "https://example.com/tomato",
        "https://example.com/compost",
        "https://example.com/soil",
        "https://example.com/sun",
    ];
    for &paragraphs in &[4usize, 32, 256] {
        let text = sample_blog(paragraphs);
        c.bench_with_input(BenchmarkId::new("publish", paragraphs), &text, |b, text| {
            b.iter(|| black_box(blogsmith::publish(text, &keywords, &urls)));
        });
    }
}

fn bench_preserve(c: &mut Criterion) {
    let original = sample_blog(16);
    let rewritten = original.replace("\n\n", " ").replace("# ", "");
    c.bench_function("preserve::flattened_rewrite", |b| {
        b.iter(|| black_box(blogsmith::preserve(&original, &rewritten)));
    });
}

criterion_group!(benches, bench_render, bench_publish, bench_preserve);
criterion_main!(benches);

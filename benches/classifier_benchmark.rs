use criterion::{black_box, criterion_group, criterion_main, Criterion};
use expense_categorizer::corpus::{class_definitions, training_corpus};
use expense_categorizer::{Classifier, VectorizerConfig};

fn build_classifier(config: VectorizerConfig) -> Classifier {
    class_definitions(training_corpus())
        .into_iter()
        .try_fold(
            Classifier::builder().with_vectorizer_config(config),
            |builder, class| builder.add_class(class),
        )
        .and_then(|builder| builder.build())
        .unwrap()
}

fn bench_transform(c: &mut Criterion) {
    let classifier = build_classifier(VectorizerConfig::default());
    let mut group = c.benchmark_group("Transform");

    // Configure sampling
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| {
        b.iter(|| classifier.features(black_box("uber to airport")))
    });

    group.bench_function("long_text", |b| {
        b.iter(|| {
            classifier.features(black_box(
                "Dinner with friends at the new sushi place downtown, then a taxi home \
                 and movie tickets for the late show. Split the bill three ways.",
            ))
        })
    });

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let configs = vec![
        ("unigrams", VectorizerConfig {
            ngram_range: (1, 1),
            ..VectorizerConfig::default()
        }),
        ("bigrams", VectorizerConfig::default()),
        ("no_stop_words", VectorizerConfig {
            stop_words: false,
            ..VectorizerConfig::default()
        }),
    ];

    for (name, config) in configs {
        let classifier = build_classifier(config);
        group.bench_function(format!("classify_{}", name), |b| {
            b.iter(|| classifier.classify(black_box("new laptop from amazon")))
        });
    }

    let classifier = build_classifier(VectorizerConfig::default());
    group.bench_function("predict_with_confidence", |b| {
        b.iter(|| classifier.predict_with_confidence(black_box("netflix subscription")))
    });

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fit");
    group.sample_size(20);

    group.bench_function("training_corpus", |b| {
        b.iter(|| build_classifier(black_box(VectorizerConfig::default())))
    });

    group.finish();
}

criterion_group!(benches, bench_transform, bench_prediction, bench_fit);
criterion_main!(benches);

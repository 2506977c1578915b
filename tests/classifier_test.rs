use expense_categorizer::corpus::{class_definitions, training_corpus};
use expense_categorizer::{Category, Classifier, ClassifierError};
use std::sync::Arc;
use std::thread;

fn setup_test_classifier() -> Classifier {
    class_definitions(training_corpus())
        .into_iter()
        .try_fold(Classifier::builder(), |builder, class| builder.add_class(class))
        .and_then(|builder| builder.build())
        .expect("Failed to create classifier")
}

#[test]
fn test_corpus_accuracy() {
    let classifier = setup_test_classifier();
    let corpus = training_corpus();
    let correct = corpus
        .iter()
        .filter(|example| classifier.classify(example.text) == example.label)
        .count();
    let accuracy = correct as f64 / corpus.len() as f64;
    assert!(accuracy >= 0.9, "accuracy {:.3} below threshold", accuracy);
}

#[test]
fn test_expected_categories() {
    let classifier = setup_test_classifier();
    let cases = [
        ("lunch at chipotle", Category::Food),
        ("uber to airport", Category::Travel),
        ("netflix subscription", Category::Bills),
        ("new laptop from amazon", Category::Shopping),
        ("movie tickets", Category::Entertainment),
    ];
    for (text, expected) in cases {
        assert_eq!(classifier.classify(text), expected, "text: {}", text);
    }
}

#[test]
fn test_punctuation_and_case_do_not_matter() {
    let classifier = setup_test_classifier();
    assert_eq!(classifier.classify("Uber, to the AIRPORT!"), Category::Travel);
    assert_eq!(
        classifier.features("Uber, to the AIRPORT!"),
        classifier.features("uber airport")
    );
}

#[test]
fn test_empty_and_unknown_text_use_highest_prior() {
    let classifier = setup_test_classifier();
    let default = classifier.info().default_category;

    // Shopping and Entertainment share the largest prior; Shopping is declared first.
    assert_eq!(default, Category::Shopping);
    for text in ["", "   ", "xyzzy plugh quux", "!!!", "the and of"] {
        for _ in 0..3 {
            assert_eq!(classifier.classify(text), default, "text: {:?}", text);
        }
    }
}

#[test]
fn test_classification_is_deterministic() {
    let first = setup_test_classifier();
    let second = setup_test_classifier();
    for text in ["gaming subscription", "grocery shopping", "gas", "road trip snacks"] {
        assert_eq!(first.classify(text), first.classify(text));
        assert_eq!(first.predict(text), second.predict(text));
    }
}

#[test]
fn test_predict_returns_probabilities() {
    let classifier = setup_test_classifier();
    let (label, scores) = classifier.predict("concert tickets");
    assert_eq!(label, Category::Entertainment);
    assert_eq!(scores.len(), Category::COUNT);
    assert!(scores.values().all(|&p| (0.0..=1.0).contains(&p)));
    let best = Category::ALL
        .iter()
        .copied()
        .fold(Category::Food, |best, c| if scores[&c] > scores[&best] { c } else { best });
    assert_eq!(best, label);
}

#[test]
fn test_unusual_input_always_yields_a_category() {
    let classifier = setup_test_classifier();
    let long = "coffee ".repeat(10_000);
    for text in ["日本のラーメン", "🍕🍕🍕", "\0\t\n", "1234567890", long.as_str()] {
        let category = classifier.classify(text);
        assert!(Category::ALL.contains(&category));
    }
    assert_eq!(classifier.classify(&long), Category::Food);
}

#[test]
fn test_thread_safety() -> Result<(), ClassifierError> {
    let classifier = Arc::new(setup_test_classifier());
    let expected = classifier.classify("uber ride");

    let mut handles = vec![];
    for _ in 0..4 {
        let classifier = Arc::clone(&classifier);
        handles.push(thread::spawn(move || {
            (0..100)
                .map(|_| classifier.classify("uber ride"))
                .collect::<Vec<_>>()
        }));
    }

    for handle in handles {
        let results = handle.join().expect("classifier thread panicked");
        assert!(results.iter().all(|&c| c == expected));
    }
    Ok(())
}

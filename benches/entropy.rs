use criterion::{Criterion, black_box, criterion_group, criterion_main};
use wordseer::{Dictionary, analyze_guess_against, best_guess, generate_pattern};

fn entropy_benchmark(c: &mut Criterion) {
    let dictionary = Dictionary::bundled(5).expect("bundled list has five-letter words");
    let words = dictionary.words();
    let guesses = ["CRANE", "SLATE", "AROSE"];

    c.bench_function("generate_pattern/bundled", |b| {
        b.iter(|| {
            for target in words {
                generate_pattern(black_box("CRANE"), target, 5);
            }
        });
    });

    c.bench_function("analyze_guess/bundled", |b| {
        b.iter(|| {
            for guess in guesses {
                analyze_guess_against(black_box(guess), words.iter().map(|word| word.as_str()), 5);
            }
        });
    });

    let sample: Vec<String> = words.iter().take(80).cloned().collect();
    c.bench_function("best_guess/subset", |b| {
        b.iter(|| best_guess(black_box(&sample), 5));
    });
}

criterion_group!(benches, entropy_benchmark);
criterion_main!(benches);

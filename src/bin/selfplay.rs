use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use wordseer::{Dictionary, play_random_game, wordnet_sources};

const DEFAULT_WORDNET_ROOT: &str = "./WordNet-3.0";
const DEFAULT_GAMES: usize = 100;
const DEFAULT_WORD_SIZE: usize = 5;

struct Config {
    games: usize,
    word_size: usize,
    seed: Option<u64>,
    wordnet_root: PathBuf,
    bundled: bool,
    json: bool,
}

#[derive(Serialize)]
struct SelfPlayReport {
    word_size: usize,
    dictionary_words: usize,
    games: usize,
    wins: usize,
    losses: usize,
    round_histogram: Vec<RoundCount>,
}

#[derive(Serialize)]
struct RoundCount {
    rounds: usize,
    wins: usize,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = parse_args()?;
    let dictionary = if config.bundled {
        Dictionary::bundled(config.word_size)?
    } else {
        Dictionary::load(config.word_size, &wordnet_sources(&config.wordnet_root))?
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let bar = ProgressBar::new(config.games as u64);
    bar.set_message("Playing games");
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<16} {bar:40.cyan/blue} {pos:>5}/{len:<5} [{elapsed_precise}]")
            .expect("valid template"),
    );

    let mut wins = 0;
    let mut losses = 0;
    let mut rounds_won = vec![0usize; config.word_size + 2];
    for _ in 0..config.games {
        let outcome = play_random_game(&dictionary, &mut rng);
        if outcome.is_win() {
            wins += 1;
            rounds_won[outcome.rounds] += 1;
        } else {
            losses += 1;
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if config.json {
        let report = SelfPlayReport {
            word_size: config.word_size,
            dictionary_words: dictionary.len(),
            games: config.games,
            wins,
            losses,
            round_histogram: rounds_won
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(rounds, count)| RoundCount {
                    rounds,
                    wins: *count,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Played {} games over {} words of {} letters.",
            config.games,
            dictionary.len(),
            config.word_size
        );
        println!("Success: {wins} Fail: {losses}");
        for (rounds, count) in rounds_won.iter().enumerate().filter(|(_, count)| **count > 0) {
            println!("  solved in {rounds} guesses: {count}");
        }
    }

    Ok(())
}

fn parse_args() -> Result<Config, Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut idx = 0;
    let mut games = DEFAULT_GAMES;
    let mut word_size = DEFAULT_WORD_SIZE;
    let mut seed = None;
    let mut wordnet_root = PathBuf::from(DEFAULT_WORDNET_ROOT);
    let mut bundled = false;
    let mut json = false;

    while idx < args.len() {
        let arg = &args[idx];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--games" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --games"))?;
                games = value.parse()?;
            }
            "--size" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --size (3 to 8)"))?;
                word_size = value.parse()?;
            }
            "--seed" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --seed"))?;
                seed = Some(value.parse()?);
            }
            "--wordnet" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| {
                    String::from("missing value for --wordnet; supply a WordNet root directory")
                })?;
                wordnet_root = PathBuf::from(value);
            }
            "--bundled" => {
                bundled = true;
            }
            "--json" => {
                json = true;
            }
            _ => {
                return Err(format!("unknown argument: {arg}").into());
            }
        }
        idx += 1;
    }

    Ok(Config {
        games,
        word_size,
        seed,
        wordnet_root,
        bundled,
        json,
    })
}

fn print_usage() {
    println!("Batch self-play harness for the solver.");
    println!(
        "Usage: selfplay [--games N] [--size N] [--seed S] [--wordnet DIR] [--bundled] [--json]"
    );
    println!("Plays N random games (default {DEFAULT_GAMES}) and reports wins and losses.");
    println!("--seed makes the run reproducible; --json emits a machine-readable report.");
}

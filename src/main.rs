use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use wordseer::{
    Color, Dictionary, EntropyTable, FeedbackOutcome, MAX_WORD_SIZE, MIN_WORD_SIZE, Session,
    analyze_guess_against, wordnet_sources,
};

const DEFAULT_WORDNET_ROOT: &str = "./WordNet-3.0";

struct Config {
    word_size: Option<usize>,
    wordnet_root: PathBuf,
    bundled: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = parse_args()?;
    let word_size = match config.word_size {
        Some(size) => size,
        None => prompt_word_size()?,
    };

    let dictionary = if config.bundled {
        Dictionary::bundled(word_size)?
    } else {
        Dictionary::load(word_size, &wordnet_sources(&config.wordnet_root))?
    };
    println!("Loaded {} words of {word_size} letters.", dictionary.len());
    println!();

    let mut session = Session::new(&dictionary);
    print_commands();

    let stdin = io::stdin();
    loop {
        let Some(line) = read_line(&stdin)? else { break };
        let command = line.trim().to_string();

        match command.as_str() {
            "guess" => {
                println!("Finding next guess...");
                match ranked_guess_with_progress(session.candidates(), word_size) {
                    Some(guess) => {
                        session.set_word(&guess)?;
                        println!("{guess}");
                    }
                    None => {
                        println!("No candidates remain.");
                        continue;
                    }
                }
            }
            "word" => {
                print!("Enter your word: ");
                io::stdout().flush()?;
                let Some(line) = read_line(&stdin)? else { break };
                match session.set_word(line.trim()) {
                    Ok(()) => println!("You can now start providing results."),
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                }
            }
            "remove" => {
                match session.remove_last() {
                    Some(word) => println!("Removing {word} from the dictionary."),
                    None => println!("No guess to remove."),
                }
                continue;
            }
            "quit" => {
                session.quit();
                println!("Quitting game.");
                break;
            }
            "" => continue,
            _ => {}
        }

        // Any other command counts as a request to score the working guess.
        if !session.begin_feedback() {
            continue;
        }

        match collect_feedback(&stdin, word_size)? {
            FeedbackInput::Colors(colors) => match session.apply_feedback(&colors)? {
                FeedbackOutcome::Won => {
                    println!("You won!");
                    break;
                }
                FeedbackOutcome::Narrowed {
                    next_guess: Some(next),
                    remaining,
                } => {
                    println!("{remaining} candidates remain.");
                    println!("Next guess should be: {next}");
                }
                FeedbackOutcome::Narrowed {
                    next_guess: None, ..
                } => {
                    println!("No words match that feedback.");
                    println!("A result may be wrong; 'remove' the guess or restart.");
                }
            },
            FeedbackInput::Aborted => session.abort_feedback(),
        }
    }

    Ok(())
}

enum FeedbackInput {
    Colors(Vec<Color>),
    Aborted,
}

/// Prompts for one color token per letter. Typing `quit` or `remove` abandons
/// the round; unrecognized tokens re-prompt the same letter.
fn collect_feedback(stdin: &io::Stdin, word_size: usize) -> io::Result<FeedbackInput> {
    let mut colors = Vec::with_capacity(word_size);
    while colors.len() < word_size {
        print!(
            "Enter pattern for letter {} (gn for Green, y for Yellow, gr for Gray): ",
            colors.len() + 1
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(FeedbackInput::Aborted);
        }
        let token = line.trim();
        if token == "quit" || token == "remove" {
            return Ok(FeedbackInput::Aborted);
        }
        match Color::from_token(token) {
            Some(color) => colors.push(color),
            None => println!("Invalid input!"),
        }
    }
    Ok(FeedbackInput::Colors(colors))
}

/// Ranks the candidates the way the library does, but renders a progress bar
/// while the quadratic pass runs.
fn ranked_guess_with_progress(candidates: &[String], word_size: usize) -> Option<String> {
    if candidates.len() <= 1 {
        return candidates.first().cloned();
    }

    let bar = ProgressBar::new(candidates.len() as u64);
    bar.set_message("Scoring candidates");
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:<20} {bar:40.cyan/blue} {pos:>5}/{len:<5} [{elapsed_precise}]")
            .expect("valid template"),
    );

    let mut table = EntropyTable::new();
    for (i, guess) in candidates.iter().enumerate() {
        let others = candidates
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, word)| word.as_str());
        let analysis = analyze_guess_against(guess, others, word_size);
        table.insert(analysis.entropy_bits(), guess.clone());
        bar.inc(1);
    }
    bar.finish_and_clear();

    table.best().and_then(|words| words.first().cloned())
}

fn prompt_word_size() -> Result<usize, Box<dyn Error>> {
    let stdin = io::stdin();
    loop {
        print!("Enter the size of the word ({MIN_WORD_SIZE}-{MAX_WORD_SIZE}): ");
        io::stdout().flush()?;
        let Some(line) = read_line(&stdin)? else {
            return Err("no word size provided".into());
        };
        match line.trim().parse::<usize>() {
            Ok(size) if (MIN_WORD_SIZE..=MAX_WORD_SIZE).contains(&size) => return Ok(size),
            _ => println!("Please enter a number between {MIN_WORD_SIZE} and {MAX_WORD_SIZE}."),
        }
    }
}

fn read_line(stdin: &io::Stdin) -> io::Result<Option<String>> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn parse_args() -> Result<Config, Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut idx = 0;
    let mut word_size = None;
    let mut wordnet_root = PathBuf::from(DEFAULT_WORDNET_ROOT);
    let mut bundled = false;

    while idx < args.len() {
        let arg = &args[idx];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--size" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| String::from("missing value for --size (3 to 8)"))?;
                word_size = Some(value.parse()?);
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
            _ => {
                return Err(format!("unknown argument: {arg}").into());
            }
        }
        idx += 1;
    }

    Ok(Config {
        word_size,
        wordnet_root,
        bundled,
    })
}

fn print_usage() {
    println!("Entropy-guided word-guessing solver.");
    println!("Usage: wordseer [--size N] [--wordnet DIR] [--bundled]");
    println!("Without --size the solver prompts once for a word length (3-8).");
    println!("--wordnet points at a WordNet installation (default {DEFAULT_WORDNET_ROOT}).");
    println!("--bundled uses the built-in word list instead of WordNet files.");
}

fn print_commands() {
    println!("Commands:");
    println!("  word    - enter your word");
    println!("  guess   - get the first/next guess");
    println!("  remove  - remove the last guess from the dictionary");
    println!("  quit    - exit the game");
}

use akshar_core::evaluation::evaluate;
use akshar_core::persistence::save_to_disk;
use akshar_core::{AksaraSequence, PredictiveIndex, PredictorConfig, START_MARKER};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use log::{error, warn};
use std::io::{stdin, stdout, Write};
use std::path::Path;

const USAGE: &str = "usage: akshar_predict <corpus.txt | trie.bin> [config.json]";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(source) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = match args.get(1) {
        Some(path) => match PredictorConfig::from_json_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => PredictorConfig::default(),
    };

    let mut index = match open_index(Path::new(source), config) {
        Ok(index) => index,
        Err(e) => {
            error!("could not open {}: {}", source, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut index) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Trie files load directly. A corpus is built once and its trie cached next
/// to it as `<stem>.bin`.
fn open_index(path: &Path, config: PredictorConfig) -> akshar_core::Result<PredictiveIndex> {
    if path.extension().is_some_and(|ext| ext == "bin") {
        return PredictiveIndex::from_file(path, config);
    }
    let cached = path.with_extension("bin");
    if cached.exists() {
        return PredictiveIndex::from_file(&cached, config);
    }
    let index = PredictiveIndex::from_corpus_file(path, config)?;
    if let Err(e) = save_to_disk(&index, &cached) {
        warn!("could not cache trie at {}: {}", cached.display(), e);
    }
    Ok(index)
}

fn run(index: &mut PredictiveIndex) -> std::io::Result<()> {
    let mut context = fresh_context();
    let mut status = String::new();

    loop {
        let mut predictions = index.predict(&context);
        // Buttons are laid out alphabetically, not by rank.
        predictions.sort_by_key(AksaraSequence::text);
        print_ui(index, &context, &predictions, &status)?;
        status.clear();

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => context = fresh_context(),
            s if s.starts_with(':') => status = handle_command(index, s),
            s => {
                // Either a button number or space-separated aksaras.
                let chosen = s
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| predictions.get(n).cloned())
                    .unwrap_or_else(|| AksaraSequence::from_spaced(s));
                context = context.concat(&chosen);
            }
        }
    }
    Ok(())
}

fn fresh_context() -> AksaraSequence {
    AksaraSequence::new(vec![START_MARKER.to_string()])
}

fn handle_command(index: &mut PredictiveIndex, cmd: &str) -> String {
    let mut parts = cmd.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();

    match (name, arg) {
        (":cf", Some(v)) => match v.parse::<f64>() {
            Ok(v) => {
                index.set_context_weight(v);
                format!("context factor = {}", v)
            }
            Err(_) => format!("not a number: {}", v),
        },
        (":pf", Some(v)) => match v.parse::<f64>() {
            Ok(v) => {
                index.set_prediction_weight(v);
                format!("prediction factor = {}", v)
            }
            Err(_) => format!("not a number: {}", v),
        },
        (":budget", Some(v)) => match v.parse::<usize>() {
            Ok(v) => {
                index.set_prediction_count(v);
                format!("aksara budget = {}", v)
            }
            Err(_) => format!("not a number: {}", v),
        },
        (":eval", Some(path)) => match akshar_core::corpus::read_corpus(Path::new(path))
            .and_then(|words| evaluate(index, &words))
        {
            Ok(r) => format!(
                "entropy {:.4}  perplexity {:.4}  coverage {:.4} (model {:.4})  clicks/aksara {:.4}",
                r.entropy, r.perplexity, r.coverage, r.probabilistic_coverage, r.clicks_per_aksara
            ),
            Err(e) => format!("evaluation failed: {}", e),
        },
        (":save", Some(path)) => match save_to_disk(index, Path::new(path)) {
            Ok(()) => format!("saved to {}", path),
            Err(e) => format!("save failed: {}", e),
        },
        _ => "commands: :cf <x>  :pf <x>  :budget <n>  :eval <corpus>  :save <file>".to_string(),
    }
}

fn print_ui(
    index: &PredictiveIndex,
    context: &AksaraSequence,
    predictions: &[AksaraSequence],
    status: &str,
) -> std::io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let config = index.config();
    println!("{}", "Aksara Predictor".bold());
    println!("---------------------------------------------------------------");
    println!("Type aksaras separated by spaces, or a button number to pick it.");
    println!("[Enter] starts a new word. ':help' lists commands. 'exit' quits.\n");
    println!(
        "context factor {}  prediction factor {}  budget {}  vocabulary {}",
        config.context_factor,
        config.prediction_factor,
        config.aksara_budget,
        index.vocabulary().len()
    );

    println!("\nContext: [{}]", context.to_string().cyan());
    if predictions.is_empty() {
        println!("\nNo predictions.");
    } else {
        println!("\nButtons:");
        for (i, p) in predictions.iter().enumerate() {
            println!("  {:>2}: {}", i + 1, p.to_string().green());
        }
    }
    if !status.is_empty() {
        println!("\n{}", status.yellow());
    }
    print!("\n> ");
    out.flush()
}

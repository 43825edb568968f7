use log::info;

use rs_dice_core::model::corpus::Words;
use rs_dice_core::model::source::DirectoryWordSource;
use rs_dice_core::{GenerationParameters, Generator, PassphrasePolicy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Honours RUST_LOG, ex. RUST_LOG=debug to see aborted generations
    env_logger::init();

    // Word lists are plain text files, one word per line: ./data/<name>.txt
    let source = DirectoryWordSource::new("./data")?;
    info!("available corpora: {}", source.list_corpora()?.join(", "));

    // The complex word list is much bigger; only load it when needed
    let use_extended = false;
    let extended = if use_extended { Some("words-complex") } else { None };
    let words = Words::load(&source, "words-simple", extended)?;

    // Policy shared by every generation: symbols, word lengths and search budget
    let policy = PassphrasePolicy::new();
    let generator = Generator::with_policy(policy)?;

    // 3 words separated by a space, between 20 and 64 characters
    let mut input = GenerationParameters::new();
    input.use_extended_corpus = use_extended;

    // A passphrase needs at least one word
    match input.set_word_count(0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Invalid word count: {e}"),
    }
    input.set_word_count(3)?;

    for i in 0..10 {
        println!("Generated passphrase {}: {}", i + 1, generator.generate(&words, &input)?);
    }

    // Many passphrases at once, spread over the CPU cores
    for passphrase in generator.generate_batch(&words, &input, 5) {
        println!("Batch passphrase: {}", passphrase?);
    }

    // Impossible constraints fail instead of looping forever
    let mut impossible = GenerationParameters::new();
    impossible.set_word_count(90)?;
    impossible.max_length = 10;
    match generator.generate(&words, &impossible) {
        Ok(p) => println!("Should not happen: {p}"),
        Err(e) => println!("Impossible parameters rejected: {e}"),
    }

    Ok(())
}

//! Text preprocessing for speech synthesis
//!
//! Expands digit runs into words before text reaches a TTS engine, so
//! "I have 42 apples" is spoken as "I have forty two apples". Everything
//! else passes through untouched.

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

/// Spell out a non-negative integer in English words.
pub fn number_to_words(value: u64) -> String {
    if value < 20 {
        return ONES[value as usize].to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let mut remainder = value;

    for (scale, name) in SCALES {
        if remainder >= scale {
            parts.push(number_to_words(remainder / scale));
            parts.push(name.to_string());
            remainder %= scale;
        }
    }

    if remainder >= 100 {
        parts.push(ONES[(remainder / 100) as usize].to_string());
        parts.push("hundred".to_string());
        remainder %= 100;
    }

    if remainder >= 20 {
        parts.push(TENS[(remainder / 10) as usize].to_string());
        remainder %= 10;
    }

    if remainder > 0 {
        parts.push(ONES[remainder as usize].to_string());
    }

    parts.join(" ")
}

/// Replace every digit run in `text` with its spelled-out form.
///
/// Runs too long to fit in a u64 are left as-is rather than mangled.
pub fn expand_numbers(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut digits = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        flush_digits(&mut output, &mut digits);
        output.push(ch);
    }
    flush_digits(&mut output, &mut digits);

    output
}

fn flush_digits(output: &mut String, digits: &mut String) {
    if digits.is_empty() {
        return;
    }
    match digits.parse::<u64>() {
        Ok(value) => output.push_str(&number_to_words(value)),
        Err(_) => output.push_str(digits),
    }
    digits.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_numbers() {
        assert_eq!(number_to_words(0), "zero");
        assert_eq!(number_to_words(7), "seven");
        assert_eq!(number_to_words(13), "thirteen");
        assert_eq!(number_to_words(42), "forty two");
        assert_eq!(number_to_words(90), "ninety");
    }

    #[test]
    fn test_large_numbers() {
        assert_eq!(number_to_words(100), "one hundred");
        assert_eq!(number_to_words(215), "two hundred fifteen");
        assert_eq!(number_to_words(1_000), "one thousand");
        assert_eq!(
            number_to_words(1_234_567),
            "one million two hundred thirty four thousand five hundred sixty seven"
        );
    }

    #[test]
    fn test_expand_numbers_in_sentence() {
        assert_eq!(
            expand_numbers("I have 42 apples"),
            "I have forty two apples"
        );
        assert_eq!(expand_numbers("room 101."), "room one hundred one.");
    }

    #[test]
    fn test_expand_leaves_text_untouched() {
        assert_eq!(expand_numbers("no digits here"), "no digits here");
        assert_eq!(expand_numbers(""), "");
    }

    #[test]
    fn test_expand_overflowing_run_passes_through() {
        let long = "9".repeat(40);
        assert_eq!(expand_numbers(&long), long);
    }
}
